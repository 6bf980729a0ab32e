use std::any::Any;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use eyre::{bail, eyre, Result, WrapErr};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use tracing_chrome::ChromeLayerBuilder;
use tracing_subscriber::{self, fmt::format::FmtSpan, prelude::*, EnvFilter, Layer, Registry};

use spowm_core::api::table_size_hint;
use spowm_core::multiexp::suggested_window_width;
use spowm_core::{
    mulmod_all, powmod_all, spowm_naive, spowm_with_config, MultiExpConfig, Strategy,
};

/// Products of modular powers, prod_i base_i^exp_i mod M.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute a product of powers and print it as hex
    ProdPow(RequestArgs),
    /// Compute a product of powers with every strategy and compare the results
    Check(RequestArgs),
    /// Time every strategy on a random workload
    Profile(ProfileArgs),
}

#[derive(Args, Debug, Clone)]
struct EngineArgs {
    /// Evaluation strategy: single-shot, batched, naive or auto
    #[clap(long)]
    strategy: Option<Strategy>,

    /// Bases per precomputed table
    #[clap(short, long)]
    window_width: Option<usize>,
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Modulus as big-endian hex
    #[clap(short, long)]
    modulus: String,

    /// A base/exponent pair as BASE_HEX:EXP_HEX, repeatable
    #[clap(short, long = "pair", required = true)]
    pairs: Vec<String>,

    #[clap(flatten)]
    engine: EngineArgs,
}

#[derive(Args, Debug)]
struct ProfileArgs {
    /// Output formats
    #[clap(short, long, value_enum)]
    format: Option<Vec<Format>>,

    /// Number of base/exponent pairs
    #[clap(short, long, default_value_t = 1024)]
    size: usize,

    /// Exponent length in bits
    #[clap(long, default_value_t = 256)]
    exponent_bits: usize,

    /// Modulus length in bits
    #[clap(long, default_value_t = 2048)]
    modulus_bits: usize,

    /// Seed for the workload generator
    #[clap(long, default_value_t = 0)]
    seed: u64,

    #[clap(flatten)]
    engine: EngineArgs,
}

#[derive(Debug, Clone, ValueEnum, PartialEq)]
enum Format {
    Default,
    Chrome,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = match &cli.command {
        Commands::Profile(args) => args.format.clone(),
        _ => None,
    };
    let _guards = init_tracing(format.as_deref());

    match cli.command {
        Commands::ProdPow(args) => prod_pow(args),
        Commands::Check(args) => check(args),
        Commands::Profile(args) => profile(args),
    }
}

/// Log output on stderr so stdout carries only results.
fn stderr_layer(span_events: FmtSpan) -> impl Layer<Registry> + Send + Sync + 'static {
    tracing_subscriber::fmt::layer()
        .compact()
        .with_span_events(span_events)
        .with_writer(std::io::stderr)
        .with_target(false)
}

/// Installs the global subscriber. `RUST_LOG` filters the event log; `profile`
/// can add span timings and a Chrome trace on top. The returned guards flush
/// the trace file when dropped.
fn init_tracing(format: Option<&[Format]>) -> Vec<Box<dyn Any>> {
    let log_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let mut layers = vec![stderr_layer(FmtSpan::NONE).with_filter(log_filter).boxed()];
    let mut guards: Vec<Box<dyn Any>> = vec![];

    let format = format.unwrap_or_default();
    if format.contains(&Format::Default) {
        layers.push(stderr_layer(FmtSpan::CLOSE).boxed());
    }
    if format.contains(&Format::Chrome) {
        let (chrome_layer, guard) = ChromeLayerBuilder::new().include_args(true).build();
        layers.push(chrome_layer.boxed());
        guards.push(Box::new(guard));
    }

    tracing_subscriber::registry().with(layers).init();
    if !guards.is_empty() {
        tracing::info!("writing Chrome trace to trace-<timestamp>.json");
    }
    guards
}

/// Environment defaults with command-line flags layered on top.
fn engine_config(args: &EngineArgs) -> Result<MultiExpConfig> {
    let mut config = MultiExpConfig::from_env().wrap_err("reading SPOWM_* environment")?;
    if let Some(strategy) = args.strategy {
        config = config.with_strategy(strategy);
    }
    if let Some(window_width) = args.window_width {
        config = config.with_window_width(window_width);
    }
    config.validate()?;
    Ok(config)
}

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim().trim_start_matches("0x");
    let padded;
    let digits = if s.len() % 2 == 1 {
        padded = format!("0{s}");
        padded.as_str()
    } else {
        s
    };
    hex::decode(digits).wrap_err_with(|| format!("invalid hex value {s:?}"))
}

/// Left-pads every buffer to the longest one so the array has a single width.
fn pad_uniform(buffers: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    let width = buffers.iter().map(Vec::len).max().unwrap_or(0);
    buffers
        .into_iter()
        .map(|b| {
            let mut padded = vec![0u8; width - b.len()];
            padded.extend_from_slice(&b);
            padded
        })
        .collect()
}

struct Request {
    bases: Vec<Vec<u8>>,
    exponents: Vec<Vec<u8>>,
    modulus: Vec<u8>,
}

impl TryFrom<&RequestArgs> for Request {
    type Error = eyre::Report;

    fn try_from(args: &RequestArgs) -> Result<Self> {
        let mut bases = Vec::with_capacity(args.pairs.len());
        let mut exponents = Vec::with_capacity(args.pairs.len());
        for pair in &args.pairs {
            let (base, exponent) = pair
                .split_once(':')
                .ok_or_else(|| eyre!("expected BASE:EXP, got {pair:?}"))?;
            bases.push(parse_hex(base)?);
            exponents.push(parse_hex(exponent)?);
        }
        Ok(Self {
            bases: pad_uniform(bases),
            exponents: pad_uniform(exponents),
            modulus: parse_hex(&args.modulus)?,
        })
    }
}

fn prod_pow(args: RequestArgs) -> Result<()> {
    let config = engine_config(&args.engine)?;
    let request = Request::try_from(&args)?;
    let result = spowm_with_config(&request.bases, &request.exponents, &request.modulus, &config)?;
    println!("{}", hex::encode(result));
    Ok(())
}

fn check(args: RequestArgs) -> Result<()> {
    let config = engine_config(&args.engine)?;
    let request = Request::try_from(&args)?;
    let (bases, exponents, modulus) = (&request.bases, &request.exponents, &request.modulus);

    let single_shot = spowm_with_config(
        bases,
        exponents,
        modulus,
        &config.clone().with_strategy(Strategy::SingleShot),
    )?;
    let results = [
        ("single-shot", single_shot.clone()),
        (
            "batched",
            spowm_with_config(
                bases,
                exponents,
                modulus,
                &config.clone().with_strategy(Strategy::Batched),
            )?,
        ),
        ("naive", spowm_naive(bases, exponents, modulus)?),
        (
            "elementwise",
            mulmod_all(&powmod_all(bases, exponents, modulus)?, modulus)?,
        ),
    ];

    for (name, result) in &results {
        println!("{name:>12}: {}", hex::encode(result));
    }
    if results.iter().any(|(_, result)| *result != single_shot) {
        bail!("strategies disagree");
    }
    tracing::info!("all strategies agree");
    Ok(())
}

fn random_buffer(rng: &mut impl RngCore, bits: usize) -> Vec<u8> {
    let mut buf = vec![0u8; bits.div_ceil(8)];
    rng.fill_bytes(&mut buf);
    if bits % 8 != 0 {
        buf[0] &= (1u8 << (bits % 8)) - 1;
    }
    buf
}

fn profile(args: ProfileArgs) -> Result<()> {
    if args.size == 0 || args.modulus_bits < 2 {
        bail!("profile needs at least one pair and a modulus of at least 2 bits");
    }
    let config = engine_config(&args.engine)?;
    let mut rng = ChaCha20Rng::seed_from_u64(args.seed);

    let mut modulus = random_buffer(&mut rng, args.modulus_bits);
    // odd, full length
    modulus[0] |= 1u8 << ((args.modulus_bits - 1) % 8);
    if let Some(last) = modulus.last_mut() {
        *last |= 1;
    }
    let bases: Vec<_> = (0..args.size)
        .map(|_| random_buffer(&mut rng, args.modulus_bits - 1))
        .collect();
    let exponents: Vec<_> = (0..args.size)
        .map(|_| random_buffer(&mut rng, args.exponent_bits))
        .collect();

    tracing::info!(
        size = args.size,
        exponent_bits = args.exponent_bits,
        modulus_bits = args.modulus_bits,
        window_width = config.window_width,
        suggested_window_width = suggested_window_width(args.exponent_bits),
        table_bytes = table_size_hint(config.window_width, &modulus),
        "generated workload"
    );

    let mut reference: Option<Vec<u8>> = None;
    for strategy in [Strategy::SingleShot, Strategy::Batched, Strategy::Naive] {
        let span = tracing::info_span!("profile", %strategy);
        let _guard = span.enter();

        let start = Instant::now();
        let result = spowm_with_config(
            &bases,
            &exponents,
            &modulus,
            &config.clone().with_strategy(strategy),
        )?;
        tracing::info!(elapsed_ms = start.elapsed().as_secs_f64() * 1e3, "done");

        match &reference {
            Some(expected) if *expected != result => bail!("{strategy} disagrees with single-shot"),
            Some(_) => {}
            None => reference = Some(result),
        }
    }
    Ok(())
}

use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};

use crate::utils::errors::SpowmError;
use crate::utils::math::Math;
use crate::window_table::{check_window_width, MAX_WINDOW_WIDTH};

/// Default number of bases per window table (tables of 128 entries).
pub const DEFAULT_WINDOW_WIDTH: usize = 7;

pub const WINDOW_WIDTH_ENV: &str = "SPOWM_WINDOW_WIDTH";
pub const STRATEGY_ENV: &str = "SPOWM_STRATEGY";

/// How a product of powers is evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Strategy {
    /// One window table per block, all blocks swept together. Every squaring is
    /// shared by the whole request; memory grows with the number of pairs.
    SingleShot,
    /// One reusable window table, blocks swept one after another and their
    /// partial products multiplied together. Peak memory is bounded by the
    /// window width.
    Batched,
    /// One modular exponentiation per pair.
    Naive,
    /// Picks one of the above from the request size.
    #[default]
    Auto,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiExpConfig {
    pub window_width: usize,
    pub strategy: Strategy,
    /// `Auto` evaluates requests with fewer pairs than this naively.
    pub naive_cutoff: usize,
    /// `Auto` switches to [`Strategy::Batched`] above this many pairs.
    pub single_shot_limit: usize,
}

impl Default for MultiExpConfig {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            strategy: Strategy::Auto,
            naive_cutoff: 2,
            single_shot_limit: 1 << 12,
        }
    }
}

impl MultiExpConfig {
    pub fn with_window_width(mut self, window_width: usize) -> Self {
        self.window_width = window_width;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_naive_cutoff(mut self, naive_cutoff: usize) -> Self {
        self.naive_cutoff = naive_cutoff;
        self
    }

    pub fn with_single_shot_limit(mut self, single_shot_limit: usize) -> Self {
        self.single_shot_limit = single_shot_limit;
        self
    }

    /// Defaults overlaid with `SPOWM_WINDOW_WIDTH` and `SPOWM_STRATEGY`.
    pub fn from_env() -> Result<Self, SpowmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SpowmError> {
        let mut config = Self::default();
        if let Some(value) = lookup(WINDOW_WIDTH_ENV) {
            config.window_width =
                value
                    .trim()
                    .parse()
                    .map_err(|_| SpowmError::InvalidConfig {
                        key: WINDOW_WIDTH_ENV,
                        value: value.clone(),
                    })?;
        }
        if let Some(value) = lookup(STRATEGY_ENV) {
            config.strategy =
                Strategy::from_str(value.trim()).map_err(|_| SpowmError::InvalidConfig {
                    key: STRATEGY_ENV,
                    value: value.clone(),
                })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SpowmError> {
        check_window_width(self.window_width)
    }

    /// The concrete strategy used for a request of `num_pairs` pairs. Never `Auto`.
    pub fn resolve(&self, num_pairs: usize) -> Strategy {
        match self.strategy {
            Strategy::Auto if num_pairs < self.naive_cutoff => Strategy::Naive,
            Strategy::Auto if num_pairs > self.single_shot_limit => Strategy::Batched,
            Strategy::Auto => Strategy::SingleShot,
            strategy => strategy,
        }
    }
}

/// Window width minimising the approximate multiplication count for exponents
/// of `exponent_bits` bits.
///
/// A block of `w` pairs costs about `2^w` multiplications to tabulate and one
/// per exponent bit to sweep, so the per-pair cost is `(2^w + bits) / w`.
pub fn suggested_window_width(exponent_bits: usize) -> usize {
    if exponent_bits < 2 {
        return 1;
    }
    let upper = (exponent_bits.log_2() + 1).min(MAX_WINDOW_WIDTH);
    (1..=upper)
        .min_by(|&a, &b| {
            // (2^a + bits) / a  vs  (2^b + bits) / b, cross-multiplied in u128
            let bits = exponent_bits as u128;
            let cost_a = (a.pow2() as u128 + bits) * b as u128;
            let cost_b = (b.pow2() as u128 + bits) * a as u128;
            cost_a.cmp(&cost_b)
        })
        .unwrap_or(DEFAULT_WINDOW_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = MultiExpConfig::default();
        assert_eq!(config.window_width, 7);
        assert_eq!(config.strategy, Strategy::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn strategy_names_are_kebab_case() {
        assert_eq!(Strategy::SingleShot.to_string(), "single-shot");
        assert_eq!(Strategy::from_str("batched").unwrap(), Strategy::Batched);
        assert!(Strategy::from_str("windowed").is_err());
    }

    #[test]
    fn env_overrides() {
        let config = MultiExpConfig::from_lookup(lookup(&[
            (WINDOW_WIDTH_ENV, "5"),
            (STRATEGY_ENV, "naive"),
        ]))
        .unwrap();
        assert_eq!(config.window_width, 5);
        assert_eq!(config.strategy, Strategy::Naive);

        let config = MultiExpConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, MultiExpConfig::default());
    }

    #[test]
    fn bad_env_values_are_rejected() {
        let err = MultiExpConfig::from_lookup(lookup(&[(WINDOW_WIDTH_ENV, "seven")])).unwrap_err();
        assert_eq!(
            err,
            SpowmError::InvalidConfig {
                key: WINDOW_WIDTH_ENV,
                value: "seven".to_string()
            }
        );
        assert!(MultiExpConfig::from_lookup(lookup(&[(WINDOW_WIDTH_ENV, "0")])).is_err());
        assert!(MultiExpConfig::from_lookup(lookup(&[(STRATEGY_ENV, "fast")])).is_err());
    }

    #[test]
    fn auto_resolution() {
        let config = MultiExpConfig::default()
            .with_naive_cutoff(3)
            .with_single_shot_limit(100);
        assert_eq!(config.resolve(1), Strategy::Naive);
        assert_eq!(config.resolve(2), Strategy::Naive);
        assert_eq!(config.resolve(3), Strategy::SingleShot);
        assert_eq!(config.resolve(100), Strategy::SingleShot);
        assert_eq!(config.resolve(101), Strategy::Batched);

        let fixed = config.with_strategy(Strategy::Batched);
        assert_eq!(fixed.resolve(1), Strategy::Batched);
    }

    #[test]
    fn window_width_suggestions() {
        assert_eq!(suggested_window_width(0), 1);
        assert_eq!(suggested_window_width(256), 6);
        assert!(suggested_window_width(3072) > suggested_window_width(256));
        assert!(suggested_window_width(usize::MAX >> 8) <= MAX_WINDOW_WIDTH);
        assert_eq!(suggested_window_width(usize::MAX), MAX_WINDOW_WIDTH);
    }
}

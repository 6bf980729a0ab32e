#![allow(clippy::len_without_is_empty)]
#![allow(clippy::too_long_first_doc_paragraph)]

pub mod api;
pub mod codec;
pub mod elementwise;
pub mod multiexp;
pub mod naive;
pub mod utils;
pub mod window_table;

pub use api::{mulmod, mulmod_all, powmod_all, spowm, spowm_batched, spowm_naive, spowm_with_config};
pub use multiexp::{prod_pow, MultiExpConfig, Strategy};
pub use utils::errors::{ErrorKind, SpowmError};

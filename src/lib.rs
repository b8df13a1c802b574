pub mod utils;
pub mod types;
pub mod interfaces;
pub mod price_infra;
pub mod storage;
pub mod collector;
pub mod core;
pub mod error;
pub mod config;
pub mod observability;
pub mod api;

pub use crate::collector::{Poller, Registry};
pub use crate::core::{CurrencyService, PriceQuery};
pub use crate::error::{Error, Result};
pub use crate::types::{Price, Sample};

pub mod connectors;
pub mod symbols;

pub use connectors::coingecko::CoingeckoConnector;
pub use symbols::{canonical_symbol, to_coingecko_id};

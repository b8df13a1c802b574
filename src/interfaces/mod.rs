pub mod price_source;
pub mod sample_store;

pub use price_source::PriceSource;
pub use sample_store::SampleStore;

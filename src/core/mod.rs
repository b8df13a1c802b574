pub mod currency_service;
pub mod price_query;

pub use currency_service::CurrencyService;
pub use price_query::PriceQuery;

pub mod price;
pub mod sample;
pub mod timestamp;

pub use price::Price;
pub use sample::Sample;

pub mod poller;
pub mod registry;

pub use poller::Poller;
pub use registry::Registry;

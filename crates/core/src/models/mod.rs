pub mod holding;
pub mod quote;
pub mod snapshot;

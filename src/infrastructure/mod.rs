pub mod analysis;
pub mod fetch;
pub mod observability;
pub mod persistence;

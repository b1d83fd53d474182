pub mod error;
pub mod migrate;
pub mod snapshot_store;

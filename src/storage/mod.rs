pub mod client;
pub mod error;
pub mod query;

pub use client::BucketClient;
pub use error::{BucketError, StoreError, StoreResult};
pub use query::{meta, Direction, ObjectQuery};

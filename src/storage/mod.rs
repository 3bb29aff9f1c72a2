pub mod client;
pub mod error;
pub mod types;

pub use client::StorageClient;
pub use error::StorageError;
pub use types::ObjectMetadata;

pub mod client;
pub mod error;
pub mod types;

pub use client::DataprocClient;
pub use error::DataprocError;
pub use types::ClusterResource;

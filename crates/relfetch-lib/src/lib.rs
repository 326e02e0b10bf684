pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod release;
pub mod repository;

pub use config::Config;
pub use error::RelFetchError;

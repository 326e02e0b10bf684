mod loader;
mod model;
mod secret;

pub use loader::{load_config, load_config_with_environment};
pub use model::{Config, DEFAULT_DOWNLOAD_PARALLELISM, LATEST_TAG};
pub use secret::Secret;

pub mod env;
mod loader;

pub use env::{ApiConfig, AppConfig, DirectoryConfig, DisplayConfig};
pub use loader::{load_config, parse_api_url};

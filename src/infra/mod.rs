pub mod config;
pub mod logging;

pub use config::AppConfig;
pub use logging::init_logging;

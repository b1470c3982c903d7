//! Adapter implementations of the application ports.

mod file_loader;
mod http_provider;
mod process_value_provider;
mod system_environment;

pub use file_loader::TokioFileLoader;
pub use http_provider::HttpProviderClient;
pub use process_value_provider::ProcessValueProvider;
pub use system_environment::{home_dir, system_environment};

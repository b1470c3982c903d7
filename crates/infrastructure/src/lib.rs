//! Nimbus Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod serialization;

pub use adapters::{
    HttpProviderClient, ProcessValueProvider, TokioFileLoader, home_dir, system_environment,
};
pub use serialization::{
    DocumentError, DocumentFormat, from_json_str, from_yaml_str, load_document, render_document,
    to_json_stable, to_yaml_string,
};

//! Nimbus application layer
//!
//! The variable resolution engine, the ports it reads sources through, and
//! the use cases built on top of it.

pub mod error;
pub mod ports;
pub mod use_cases;
pub mod variable_resolver;

#[cfg(test)]
mod test_support;

pub use error::{ResolveError, ResolveResult};
pub use use_cases::{ResolveService, ResolveServiceInput, ResolveServiceOutput};
pub use variable_resolver::{VariableResolver, VariableSyntax};

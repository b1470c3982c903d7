//! Application use cases (business logic orchestration).

mod resolve_service;

pub use resolve_service::{ResolveService, ResolveServiceInput, ResolveServiceOutput};

//! `caseworks-tenancy` — per-request tenant identity and the process-wide
//! tenant metadata cache.
//!
//! The request-scoped slot here is the central isolation boundary of the
//! system: every tenant-aware data access reads it, and it must never be
//! visible to any other in-flight or subsequent request.

pub mod config;
pub mod context;
pub mod registry;

pub use config::TenancyConfig;
pub use context::{TenancyError, TenantContext, TenantScope};
pub use registry::{TenantInfo, TenantRegistry};

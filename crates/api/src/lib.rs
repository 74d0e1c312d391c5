//! HTTP API: server, routing, and request/response mapping.
//!
//! Per-request pipeline: tenant resolution → authentication → authorization
//! gate → handler. Tenant resolution is infallible and its teardown clears
//! the tenant slot on every exit path; authentication never rejects (it only
//! establishes or withholds a principal); the gate is the sole place that
//! turns a missing principal or missing role into a client-visible failure.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;

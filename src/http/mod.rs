//! HTTP client module for edge service checks
//!
//! Provides the timeout-bounded client shared by every check phase.

mod client;

pub use client::{HttpClient, HttpError, HttpResponse};

//! Maestro upsert client
//!
//! The destination side of the exporter:
//! - [`MaestroClient`]: the capability trait the engine writes through
//! - [`HttpMaestroClient`]: reqwest-backed implementation with lazy
//!   cookie-session authentication
//! - [`DryRunMaestroClient`]: no-I/O stand-in that synthesizes ids and
//!   records every would-be mutation

pub mod client;
pub mod dry_run;
pub mod error;
mod http;

pub use client::MaestroClient;
pub use dry_run::DryRunMaestroClient;
pub use error::MaestroError;
pub use http::{HttpMaestroClient, MaestroConnection};

//! Jenkins query client
//!
//! The source side of the exporter:
//! - [`JenkinsClient`]: the capability trait the engine traverses through
//! - [`HttpJenkinsClient`]: reqwest-backed implementation against the
//!   Jenkins JSON API and the raw `config.xml` endpoints

pub mod client;
pub mod error;
mod http;

pub use client::JenkinsClient;
pub use error::JenkinsError;
pub use http::HttpJenkinsClient;

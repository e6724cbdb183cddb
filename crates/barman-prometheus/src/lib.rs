//! Prometheus metrics backend for the barman-cloud collection pipeline.
//!
//! This crate provides [`PrometheusSink`], an implementation of
//! [`barman_collect::MetricsSink`] that binds the pipeline's descriptor
//! table to a `prometheus` registry.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use barman_collect::MetricsSink;
//! use barman_prometheus::PrometheusSink;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // One sink per scrape: every series starts fresh, so two scrapes of an
//! // unchanged file encode identically and stale label sets cannot linger.
//! let sink = Arc::new(PrometheusSink::new()?);
//!
//! // Hand `sink` to Exporter::collect(...), then serve the text exposition:
//! let body = sink.encode_text()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## HTTP Server
//! This crate does NOT serve the `/metrics` endpoint. Encode the gathered
//! families with your application's HTTP framework (see `barman-exporterd`).

mod backend;
pub use backend::PrometheusSink;

pub use prometheus::{Encoder, Registry, TextEncoder};

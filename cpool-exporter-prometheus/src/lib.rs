//! Prometheus metrics exporter for cryptonight mining pool statistics.
//!
//! This crate polls one or more pool daemons over HTTP, inflates their
//! deflate-compressed JSON stats payload, and re-exposes selected fields
//! as gauges on an HTTP `/metrics` endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │  Pool daemons   │────>│    Collector     │────>│   HTTP Server   │
//! │  (GET /stats)   │     │ (fetch+translate)│     │   (/metrics)    │
//! └─────────────────┘     └──────────────────┘     └─────────────────┘
//! ```
//!
//! Every scrape of `/metrics` re-resolves configuration from the
//! environment and visits each configured pool sequentially; nothing is
//! cached between scrapes.
//!
//! # Usage
//!
//! ```bash
//! export CPOOL_DIAL_ADDR="192.168.1.10;192.168.1.11"
//! cpool-exporter-prometheus --web.listen-address 0.0.0.0:10335
//! ```
//!
//! # Configuration
//!
//! See [`config::PoolConfig`] for the environment variables.

pub mod collector;
pub mod config;
pub mod fetcher;
pub mod http;
pub mod mapping;
pub mod stats;

pub use collector::{SharedCollector, StatsCollector};
pub use config::PoolConfig;
pub use fetcher::StatsFetcher;
pub use http::HttpServer;

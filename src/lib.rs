//! # pagecrop
//!
//! Harvests the canonical URL, title and last-modified text of randomly
//! selected pages and appends them to a CSV file.
//!
//! ## Architecture
//!
//! ```text
//! Harvester → HarvestWorker × count → PageFetcher → FieldExtractor → RecordSink
//! ```
//!
//! Every worker owns one browser session. Workers share nothing except the
//! record sink, and a failing worker never affects the others.
//!
//! ## Quick Start
//!
//! ```bash
//! # 20 random Wikipedia pages with a visible browser
//! pagecrop
//!
//! # Headless, custom Chrome, 50 pages, 4 browsers at a time
//! pagecrop --headless true --binary_location /opt/chrome/chrome -c 50 -j 4
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the session
/// factory, fetcher, extractor, sink and harvester for one run.
pub mod app;

/// Browser-automation seam.
///
/// - [`Session`](browser::Session): one browser context, owned by one worker
/// - [`SessionFactory`](browser::SessionFactory): creates sessions
/// - [`ChromeSessionFactory`](browser::ChromeSessionFactory): chromiumoxide implementation
pub mod browser;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from TOML and overridden by CLI flags.
pub mod config;

/// Core domain model: the harvested [`Record`](domain::Record).
pub mod domain;

/// Field extraction from captured HTML using `scraper`.
pub mod extractor;

/// Page loading with bounded retries.
pub mod fetcher;

/// Batch orchestration under a bounded worker pool.
pub mod orchestrator;

/// Append-only record persistence.
///
/// - [`RecordSink`](sink::RecordSink): trait for record destinations
/// - [`CsvSink`](sink::CsvSink): headerless CSV file
pub mod sink;

/// The per-page harvest task.
pub mod worker;

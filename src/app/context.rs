use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::app::{HarvestError, Result};
use crate::browser::{ChromeSessionFactory, SessionFactory};
use crate::config::HarvestConfig;
use crate::extractor::FieldExtractor;
use crate::fetcher::PageFetcher;
use crate::orchestrator::{destination_name, Harvester};
use crate::sink::{CsvSink, RecordSink};
use crate::worker::HarvestWorker;

/// Wires the components of one run together.
pub struct AppContext {
    pub config: HarvestConfig,
    pub destination: PathBuf,
    pub harvester: Harvester,
}

impl AppContext {
    /// Build a context that drives real Chrome sessions.
    pub fn new(config: HarvestConfig) -> Result<Self> {
        let sessions = Arc::new(ChromeSessionFactory::new(
            config.headless,
            config.binary_location.clone(),
        ));
        Self::with_sessions(config, sessions)
    }

    /// Build a context around any session factory.
    pub fn with_sessions(config: HarvestConfig, sessions: Arc<dyn SessionFactory>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| HarvestError::Config(e.to_string()))?;

        let destination = Self::destination_path(&config)?;
        let sink: Arc<dyn RecordSink> = Arc::new(CsvSink::new(&destination)?);
        let extractor = Arc::new(FieldExtractor::new(&config.extractor)?);

        let worker = HarvestWorker {
            sessions,
            fetcher: PageFetcher::new(&config.fetcher),
            extractor,
            sink,
            target: config.fetcher.target_url.clone(),
            settle_delay: config.settle_delay(),
        };
        let harvester = Harvester::new(worker, config.concurrency, destination.clone());

        Ok(Self {
            config,
            destination,
            harvester,
        })
    }

    fn destination_path(config: &HarvestConfig) -> Result<PathBuf> {
        let output = &config.output;
        let offset = output
            .offset()
            .map_err(|e| HarvestError::Config(e.to_string()))?;
        let name = destination_name(Utc::now(), offset, &output.prefix, &output.extension);
        Ok(output.directory.join(name))
    }
}

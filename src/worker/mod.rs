//! One harvest task: fetch → settle → extract → append.
//!
//! ```text
//! Starting → Fetching → Ready → Extracting → Writing → Done
//!                     ↘ Failed ──────────────────────↗
//! ```
//!
//! The worker owns its session for its whole life and closes it on every
//! path. No error escapes [`HarvestWorker::run`]; the caller receives a
//! [`WorkerOutcome`] instead.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::app::{ErrorKind, HarvestError, Result};
use crate::browser::{Session, SessionFactory};
use crate::domain::Record;
use crate::extractor::FieldExtractor;
use crate::fetcher::{FetchOutcome, PageFetcher};
use crate::sink::RecordSink;

/// What one worker produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    Success(Record),
    Failed(ErrorKind),
}

impl WorkerOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkerOutcome::Success(_))
    }
}

/// Everything a worker needs, shared by all workers of a batch.
pub struct HarvestWorker {
    pub sessions: Arc<dyn SessionFactory>,
    pub fetcher: PageFetcher,
    pub extractor: Arc<FieldExtractor>,
    pub sink: Arc<dyn RecordSink>,
    pub target: String,
    pub settle_delay: Duration,
}

impl HarvestWorker {
    pub async fn run(&self, id: usize) -> WorkerOutcome {
        let mut session = match self.sessions.new_session().await {
            Ok(session) => session,
            Err(e) => {
                error!(worker = id, "Could not start browser session: {}", e);
                return WorkerOutcome::Failed(e.kind());
            }
        };

        let result = self.harvest(session.as_ref()).await;

        if let Err(e) = session.close().await {
            warn!(worker = id, "Failed to close browser session: {}", e);
        }

        match result {
            Ok(record) => {
                debug!(worker = id, "Harvested {}", record.url());
                WorkerOutcome::Success(record)
            }
            Err(e @ HarvestError::Connection { .. }) => {
                warn!(worker = id, "Error connecting to {}", self.target);
                WorkerOutcome::Failed(e.kind())
            }
            Err(e) => {
                error!(worker = id, "Harvest failed: {}", e);
                WorkerOutcome::Failed(e.kind())
            }
        }
    }

    async fn harvest(&self, session: &dyn Session) -> Result<Record> {
        match self.fetcher.acquire(session, &self.target).await {
            FetchOutcome::Ready => {}
            FetchOutcome::Failed { attempts } => {
                return Err(HarvestError::Connection {
                    target: self.target.clone(),
                    attempts,
                });
            }
        }

        tokio::time::sleep(self.settle_delay).await;

        let document = session.current_document().await?;
        let record = self.extractor.extract(&document)?;
        self.sink.append(&record)?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::config::{ExtractorConfig, FetcherConfig};

    const PAGE: &str = r#"<html><head>
<link rel="canonical" href="https://en.wikipedia.org/wiki/Tokio">
</head><body><div id="content"><h1 id="firstHeading">Tokio</h1></div>
<ul><li id="footer-info-lastmod">This page was last edited on 9 July 2024</li></ul>
</body></html>"#;

    struct FakeSession {
        reachable: bool,
        document: String,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Session for FakeSession {
        async fn navigate(&self, _url: &str) -> Result<()> {
            if self.reachable {
                Ok(())
            } else {
                Err(HarvestError::Navigation("net::ERR_NAME_NOT_RESOLVED".into()))
            }
        }

        async fn wait_for_element(&self, _selector: &str, _timeout: Duration) -> Result<bool> {
            Ok(true)
        }

        async fn current_document(&self) -> Result<String> {
            Ok(self.document.clone())
        }

        async fn close(&mut self) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FakeFactory {
        reachable: bool,
        document: String,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SessionFactory for FakeFactory {
        async fn new_session(&self) -> Result<Box<dyn Session>> {
            Ok(Box::new(FakeSession {
                reachable: self.reachable,
                document: self.document.clone(),
                closed: self.closed.clone(),
            }))
        }
    }

    struct BrokenFactory;

    #[async_trait]
    impl SessionFactory for BrokenFactory {
        async fn new_session(&self) -> Result<Box<dyn Session>> {
            Err(HarvestError::Browser("chrome not found".into()))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        rows: Mutex<Vec<Record>>,
        fail: bool,
    }

    impl RecordSink for MemorySink {
        fn append(&self, record: &Record) -> Result<()> {
            if self.fail {
                return Err(HarvestError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.rows.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn worker(sessions: Arc<dyn SessionFactory>, sink: Arc<dyn RecordSink>) -> HarvestWorker {
        HarvestWorker {
            sessions,
            fetcher: PageFetcher::new(&FetcherConfig::default()),
            extractor: Arc::new(FieldExtractor::new(&ExtractorConfig::default()).unwrap()),
            sink,
            target: "https://en.wikipedia.org/wiki/Special:Random".to_string(),
            settle_delay: Duration::ZERO,
        }
    }

    fn factory(reachable: bool, document: &str) -> (Arc<FakeFactory>, Arc<AtomicUsize>) {
        let closed = Arc::new(AtomicUsize::new(0));
        let factory = Arc::new(FakeFactory {
            reachable,
            document: document.to_string(),
            closed: closed.clone(),
        });
        (factory, closed)
    }

    #[tokio::test]
    async fn test_success_appends_one_record() {
        let (sessions, closed) = factory(true, PAGE);
        let sink = Arc::new(MemorySink::default());

        let outcome = worker(sessions, sink.clone()).run(0).await;

        let expected = Record::new(
            "https://en.wikipedia.org/wiki/Tokio",
            "Tokio",
            "This page was last edited on 9 July 2024",
        )
        .unwrap();
        assert_eq!(outcome, WorkerOutcome::Success(expected.clone()));
        assert_eq!(*sink.rows.lock().unwrap(), vec![expected]);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreachable_target_writes_nothing() {
        let (sessions, closed) = factory(false, PAGE);
        let sink = Arc::new(MemorySink::default());

        let outcome = worker(sessions, sink.clone()).run(1).await;

        assert_eq!(outcome, WorkerOutcome::Failed(ErrorKind::Connection));
        assert!(sink.rows.lock().unwrap().is_empty());
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_field_closes_session() {
        let (sessions, closed) = factory(true, "<html><body><div id=\"content\"></div></body></html>");
        let sink = Arc::new(MemorySink::default());

        let outcome = worker(sessions, sink.clone()).run(2).await;

        assert_eq!(outcome, WorkerOutcome::Failed(ErrorKind::MissingField));
        assert!(sink.rows.lock().unwrap().is_empty());
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sink_failure_is_reported() {
        let (sessions, closed) = factory(true, PAGE);
        let sink = Arc::new(MemorySink {
            fail: true,
            ..Default::default()
        });

        let outcome = worker(sessions, sink).run(3).await;

        assert_eq!(outcome, WorkerOutcome::Failed(ErrorKind::Io));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_session_start_failure() {
        let sink = Arc::new(MemorySink::default());
        let outcome = worker(Arc::new(BrokenFactory), sink).run(4).await;
        assert_eq!(outcome, WorkerOutcome::Failed(ErrorKind::Session));
    }
}

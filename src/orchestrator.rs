// Drives one fetch pass: one browser session, titles in order, one
// event per resolved title.
use crate::adapters::{AggregatorAdapter, RawQuote, adapter_for};
use crate::model::{
    SessionError, TitlePriceRecord, TitleTarget, VendorId, VendorPriceSnapshot, VendorRefs,
};
use crate::normalizer;
use crate::session::PageSession;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Ordered event stream of one pass. `Error` is per-title noise and does
/// not end the stream; `Completed` and `Fatal` are terminal.
#[derive(Debug, Clone)]
pub enum PassEvent {
    Progress(String),
    TitleUpdated(TitlePriceRecord),
    Error(String),
    Completed,
    Fatal(String),
}

/// Cooperative cancellation. Titles resolve atomically: the token is
/// polled between titles, and a title caught mid-fetch is discarded
/// rather than emitted half-filled. Replaces abrupt worker teardown so
/// the browser session always gets closed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Pass gate: at most one pass runs at a time. A start request while one
/// is running is silently ignored.
#[derive(Debug, Clone, Default)]
pub struct FetchOrchestrator {
    running: Arc<AtomicBool>,
}

impl FetchOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Starts a pass on a background task. Returns `false` (no-op) when a
    /// pass is already running. `connect` establishes the one browser
    /// session used for the whole pass; a connect failure is fatal.
    pub fn start<C, F>(
        &self,
        connect: C,
        targets: Vec<TitleTarget>,
        tx: UnboundedSender<PassEvent>,
        cancel: CancelToken,
    ) -> bool
    where
        C: FnOnce() -> F + Send + 'static,
        F: Future<Output = Result<Arc<dyn PageSession>, SessionError>> + Send + 'static,
    {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("pass already running, start request ignored");
            return false;
        }

        let running = self.running.clone();
        let worker = {
            let tx = tx.clone();
            tokio::spawn(async move { run_pass(connect, targets, &tx, cancel).await })
        };
        tokio::spawn(async move {
            // The worker is supervised: a panic inside the pass still
            // clears the gate and surfaces as a Fatal event instead of
            // silently ending the stream.
            let terminal = match worker.await {
                Ok(terminal) => terminal,
                Err(e) => Some(PassEvent::Fatal(format!("fetch pass aborted: {}", e))),
            };
            // Gate clears before the terminal event so a consumer seeing
            // Completed/Fatal can immediately start the next pass.
            running.store(false, Ordering::SeqCst);
            if let Some(ev) = terminal {
                let _ = tx.send(ev);
            }
        });
        true
    }
}

/// Runs the pass and returns the terminal event to emit, if any
/// (a cancelled pass ends silently).
async fn run_pass<C, F>(
    connect: C,
    targets: Vec<TitleTarget>,
    tx: &UnboundedSender<PassEvent>,
    cancel: CancelToken,
) -> Option<PassEvent>
where
    C: FnOnce() -> F,
    F: Future<Output = Result<Arc<dyn PageSession>, SessionError>>,
{
    let _ = tx.send(PassEvent::Progress("Starting browser session...".into()));
    let session = match connect().await {
        Ok(s) => s,
        Err(e) => {
            warn!("browser session failed to start: {}", e);
            return Some(PassEvent::Fatal(format!(
                "browser session failed to start: {}",
                e
            )));
        }
    };

    let total = targets.len();
    let mut cancelled = false;

    for (index, target) in targets.into_iter().enumerate() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        let _ = tx.send(PassEvent::Progress(format!(
            "Fetching prices for {} ({}/{})...",
            target.name,
            index + 1,
            total
        )));

        let Some(record) = fetch_title(session.as_ref(), &target, &cancel).await else {
            cancelled = true;
            break;
        };
        for (vendor, snapshot) in &record.vendors {
            if let Some(message) = &snapshot.error {
                let _ = tx.send(PassEvent::Error(format!(
                    "{}: {} failed: {}",
                    record.name, vendor, message
                )));
            }
        }
        let _ = tx.send(PassEvent::TitleUpdated(record));
    }

    // The session closes on every exit path, cancellation included.
    let _ = tx.send(PassEvent::Progress("Closing browser session...".into()));
    if let Err(e) = session.close().await {
        warn!("browser session close failed: {}", e);
    }

    if cancelled {
        info!("pass cancelled, no terminal event emitted");
        None
    } else {
        Some(PassEvent::Completed)
    }
}

/// Resolves every tracked vendor for one title. Vendor failures are
/// isolated: each becomes an error-bearing snapshot, never an abort.
/// Returns `None` when cancellation strikes mid-title, so a record is
/// either complete or not emitted at all.
async fn fetch_title(
    session: &dyn PageSession,
    target: &TitleTarget,
    cancel: &CancelToken,
) -> Option<TitlePriceRecord> {
    let mut record = TitlePriceRecord::new(&target.name);

    match &target.refs {
        VendorRefs::Aggregator(page_url) => {
            record.aggregator_link = Some(page_url.clone());
            match AggregatorAdapter.fetch_rows(session, page_url).await {
                Ok(quotes) => {
                    for (vendor, quote) in quotes {
                        record.vendors.insert(vendor, snapshot_from(quote, None));
                    }
                }
                Err(e) => {
                    warn!("{}: aggregator page failed: {}", target.name, e);
                    // The shared page covers both PC vendors; fail both.
                    for vendor in [VendorId::Steam, VendorId::Gog] {
                        record
                            .vendors
                            .insert(vendor, VendorPriceSnapshot::failed(None, e.to_string()));
                    }
                }
            }
        }
        VendorRefs::Direct(refs) => {
            for (vendor, url) in refs.iter() {
                if cancel.is_cancelled() {
                    return None;
                }
                let snapshot = match adapter_for(vendor).fetch(session, url).await {
                    Ok(quote) => snapshot_from(quote, Some(url.to_string())),
                    Err(e) => {
                        warn!("{}: {} fetch failed: {}", target.name, vendor, e);
                        VendorPriceSnapshot::failed(Some(url.to_string()), e.to_string())
                    }
                };
                record.vendors.insert(vendor, snapshot);
            }
        }
    }

    Some(record)
}

/// Normalizes a raw quote. An unparsable current-price text is recorded
/// as an error so a scrape glitch cannot masquerade as a free game.
fn snapshot_from(quote: RawQuote, fallback_link: Option<String>) -> VendorPriceSnapshot {
    let link = quote.link.or(fallback_link);
    match normalizer::try_parse_price(&quote.current_text) {
        Some(current) => {
            let base = normalizer::parse_price(&quote.base_text);
            VendorPriceSnapshot::ok(current, base, link)
        }
        None => VendorPriceSnapshot::failed(
            link,
            format!("unparsable price text `{}`", quote.current_text),
        ),
    }
}

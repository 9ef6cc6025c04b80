//! The run loop: one store after another, paced, failure-tolerant.
//!
//! Each URL moves through `Pending → Rendering → Extracting → Recorded`, or
//! ends in `Failed` when the page cannot be loaded. A failed store adds no
//! offers and never stops the run. Stores are processed strictly in order
//! and one at a time, so every store's offers stay contiguous for the
//! grouped table encoder.
//!
//! Cancellation is cooperative: it is checked between stores and cuts the
//! pacing delay short, and whatever was collected so far is returned.

use crate::dedup::dedup;
use crate::error::{RenderError, RunError};
use crate::identity::resolve;
use crate::models::OfferRecord;
use crate::render::Renderer;
use crate::scrapers::offers::extract;
use rand::{rng, Rng};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Bounds of the randomized delay between stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

impl Pacing {
    pub const NONE: Pacing = Pacing {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// A delay drawn uniformly from `min..=max`.
    pub fn next_delay(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rng().random_range(min..=max))
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_secs(5))
    }
}

/// Snapshot passed to the progress callback after every store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Stores processed so far, successful or not.
    pub processed: usize,
    pub total: usize,
    /// Offers collected so far, before deduplication.
    pub offers: usize,
}

/// Where a single store ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreState {
    Pending,
    Rendering,
    Extracting,
    Recorded { offers: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub url: String,
    pub state: StoreState,
}

/// Outcome of a run that got past setup.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Deduplicated offers in store order.
    pub offers: Vec<OfferRecord>,
    /// Offers collected before deduplication.
    pub raw_count: usize,
    /// One entry per input URL, in input order.
    pub stores: Vec<StoreStatus>,
    /// Whether the run stopped early on request.
    pub cancelled: bool,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.stores
            .iter()
            .filter(|s| matches!(s.state, StoreState::Recorded { .. } | StoreState::Failed { .. }))
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &StoreStatus> {
        self.stores
            .iter()
            .filter(|s| matches!(s.state, StoreState::Failed { .. }))
    }
}

type ProgressFn<'a> = Box<dyn FnMut(Progress) + 'a>;

/// A configured run over a fixed list of store URLs.
pub struct OfferRun<'a> {
    urls: &'a [String],
    pacing: Pacing,
    cancel: CancellationToken,
    on_progress: Option<ProgressFn<'a>>,
}

impl<'a> OfferRun<'a> {
    pub fn new(urls: &'a [String]) -> Self {
        Self {
            urls,
            pacing: Pacing::default(),
            cancel: CancellationToken::new(),
            on_progress: None,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Stop between stores once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Call `f` once per store after it has been processed.
    pub fn on_progress(mut self, f: impl FnMut(Progress) + 'a) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Build the renderer with `setup`, then process every URL.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Setup`] if `setup` fails; no URL is touched in
    /// that case. Per-store failures are reported in [`RunReport::stores`].
    #[instrument(level = "info", skip_all, fields(total = self.urls.len()))]
    pub async fn run<R, F>(mut self, setup: F) -> Result<RunReport, RunError>
    where
        R: Renderer,
        F: FnOnce() -> Result<R, RenderError>,
    {
        let renderer = setup().map_err(|e| {
            error!(error = %e, "Renderer setup failed; aborting run");
            RunError::Setup(e)
        })?;

        let urls = self.urls;
        let total = urls.len();
        let t0 = Instant::now();
        let mut offers: Vec<OfferRecord> = Vec::new();
        let mut stores = urls
            .iter()
            .map(|url| StoreStatus {
                url: url.clone(),
                state: StoreState::Pending,
            })
            .collect::<Vec<_>>();
        let mut cancelled = false;

        info!(total, "Starting scraping process");

        for (i, url) in urls.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(processed = i, total, "Run cancelled; keeping collected offers");
                cancelled = true;
                break;
            }

            info!(index = i + 1, total, store = %resolve(url), "Processing store");
            stores[i].state = StoreState::Rendering;
            let state = match renderer.render(url).await {
                Ok(page) => {
                    stores[i].state = StoreState::Extracting;
                    debug!(%url, state = ?stores[i].state, "Page rendered");
                    let found = extract(&page, url);
                    let count = found.len();
                    offers.extend(found);
                    StoreState::Recorded { offers: count }
                }
                Err(e) => {
                    warn!(%url, error = %e, "Store failed; continuing");
                    StoreState::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            stores[i].state = state;

            if let Some(notify) = self.on_progress.as_mut() {
                notify(Progress {
                    processed: i + 1,
                    total,
                    offers: offers.len(),
                });
            }

            if i + 1 < total && self.pause().await {
                warn!(processed = i + 1, total, "Run cancelled; keeping collected offers");
                cancelled = true;
                break;
            }
        }

        let raw_count = offers.len();
        let offers = dedup(offers);
        let report = RunReport {
            offers,
            raw_count,
            stores,
            cancelled,
        };

        info!(
            processed = report.processed(),
            failed = report.failed().count(),
            raw = raw_count,
            unique = report.offers.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Run complete"
        );
        Ok(report)
    }

    /// Sleep for the pacing delay. Returns `true` if cancelled meanwhile.
    async fn pause(&self) -> bool {
        let delay = self.pacing.next_delay();
        if delay.is_zero() {
            return self.cancel.is_cancelled();
        }
        debug!(?delay, "Pacing before next store");
        tokio::select! {
            _ = self.cancel.cancelled() => true,
            _ = sleep(delay) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::fake::FakePage;
    use crate::scrapers::strategies::CONTAINER_STRATEGIES;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned container texts per URL; unknown URLs fail.
    #[derive(Default)]
    struct FakeRenderer {
        pages: HashMap<String, Vec<&'static str>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeRenderer {
        fn with(mut self, url: &str, containers: &[&'static str]) -> Self {
            self.pages.insert(url.to_string(), containers.to_vec());
            self
        }
    }

    impl Renderer for &FakeRenderer {
        type Page = FakePage;

        async fn render(&self, url: &str) -> Result<FakePage, RenderError> {
            self.calls.borrow_mut().push(url.to_string());
            let containers = self
                .pages
                .get(url)
                .ok_or_else(|| RenderError::Unavailable(format!("no page for {url}")))?;
            let mut page = FakePage::new();
            for text in containers {
                page.add(FakePage::ROOT, CONTAINER_STRATEGIES[0].pattern, text);
            }
            Ok(page)
        }
    }

    const A: &str = "https://www.swiggy.com/restaurants/burger-singh-ganeshguri-guwahati-579784";
    const B: &str = "https://www.swiggy.com/restaurants/burger-singh-purnea-698848";
    const C: &str = "https://www.swiggy.com/city/delhi/burger-singh-rajouri-garden-rest1";

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_single_store_single_offer() {
        let renderer = FakeRenderer::default().with(A, &["20% off\nUse code BURGER20"]);
        let urls = urls(&[A]);

        let report = OfferRun::new(&urls)
            .with_pacing(Pacing::NONE)
            .run(|| Ok(&renderer))
            .await
            .unwrap();

        assert_eq!(report.offers.len(), 1);
        let offer = &report.offers[0];
        assert_eq!(offer.title, "20% off");
        assert_eq!(offer.description, "Use code BURGER20");
        assert_eq!(offer.store_name, "Burger Singh Ganeshguri Guwahati");
        assert_eq!(report.stores[0].state, StoreState::Recorded { offers: 1 });
        assert!(!report.cancelled);

        let table = crate::outputs::table::encode(&report.offers, Default::default()).unwrap();
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "store_name,store_url,title,description");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with(&format!("Burger Singh Ganeshguri Guwahati,{A},")));
    }

    #[tokio::test]
    async fn test_duplicates_across_renders_collapse() {
        let renderer = FakeRenderer::default().with(A, &["20% off\nBURGER20"]);
        // Same store listed twice, e.g. re-rendered later in the list.
        let urls = urls(&[A, A]);

        let report = OfferRun::new(&urls)
            .with_pacing(Pacing::NONE)
            .run(|| Ok(&renderer))
            .await
            .unwrap();

        assert_eq!(report.raw_count, 2);
        assert_eq!(report.offers.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_store_does_not_halt_run() {
        let renderer = FakeRenderer::default()
            .with(A, &["20% off\nBURGER20"])
            .with(C, &["Free fries\nAbove 299"]);
        let urls = urls(&[A, B, C]);
        let mut seen = Vec::new();

        let report = OfferRun::new(&urls)
            .with_pacing(Pacing::NONE)
            .on_progress(|p| seen.push(p))
            .run(|| Ok(&renderer))
            .await
            .unwrap();

        assert_eq!(*renderer.calls.borrow(), urls);
        assert_eq!(report.processed(), 3);
        assert!(matches!(report.stores[1].state, StoreState::Failed { .. }));
        assert_eq!(report.failed().count(), 1);
        let stores = report
            .offers
            .iter()
            .map(|o| o.store_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(stores, vec!["Burger Singh Ganeshguri Guwahati", "delhi-burger-singh-rajouri-garden"]);
        assert_eq!(
            seen,
            vec![
                Progress { processed: 1, total: 3, offers: 1 },
                Progress { processed: 2, total: 3, offers: 1 },
                Progress { processed: 3, total: 3, offers: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_offers_keep_store_then_container_order() {
        let renderer = FakeRenderer::default()
            .with(A, &["a-one", "a-two"])
            .with(B, &["b-one", "b-two"]);
        let urls = urls(&[A, B]);

        let report = OfferRun::new(&urls)
            .with_pacing(Pacing::NONE)
            .run(|| Ok(&renderer))
            .await
            .unwrap();

        let titles = report.offers.iter().map(|o| o.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["a-one", "a-two", "b-one", "b-two"]);
    }

    #[tokio::test]
    async fn test_setup_failure_is_fatal() {
        let urls = urls(&[A, B]);
        let mut progress_calls = 0;

        let result = OfferRun::new(&urls)
            .with_pacing(Pacing::NONE)
            .on_progress(|_| progress_calls += 1)
            .run(|| -> Result<&FakeRenderer, RenderError> {
                Err(RenderError::Unavailable("no browser".to_string()))
            })
            .await;

        assert!(matches!(result, Err(RunError::Setup(_))));
        assert_eq!(progress_calls, 0);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let renderer = FakeRenderer::default().with(A, &[]);
        let urls = urls(&[A]);

        let report = OfferRun::new(&urls)
            .with_pacing(Pacing::NONE)
            .run(|| Ok(&renderer))
            .await
            .unwrap();

        assert!(report.offers.is_empty());
        assert_eq!(report.stores[0].state, StoreState::Recorded { offers: 0 });
    }

    #[tokio::test]
    async fn test_cancel_before_start_processes_nothing() {
        let renderer = FakeRenderer::default().with(A, &["20% off\nBURGER20"]);
        let urls = urls(&[A, B]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = OfferRun::new(&urls)
            .with_pacing(Pacing::NONE)
            .with_cancellation(cancel)
            .run(|| Ok(&renderer))
            .await
            .unwrap();

        assert!(report.cancelled);
        assert!(renderer.calls.borrow().is_empty());
        assert!(report.stores.iter().all(|s| s.state == StoreState::Pending));
    }

    #[tokio::test]
    async fn test_cancel_mid_run_returns_collected_offers() {
        let renderer = FakeRenderer::default()
            .with(A, &["20% off\nBURGER20"])
            .with(B, &["Flat 50 off"]);
        let urls = urls(&[A, B, C]);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let report = OfferRun::new(&urls)
            .with_pacing(Pacing::NONE)
            .with_cancellation(cancel)
            .on_progress(move |p| {
                if p.processed == 1 {
                    trigger.cancel();
                }
            })
            .run(|| Ok(&renderer))
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.offers.len(), 1);
        assert_eq!(report.processed(), 1);
        assert_eq!(*renderer.calls.borrow(), vec![A.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_pacing_delay() {
        let renderer = FakeRenderer::default().with(A, &["20% off\nBURGER20"]);
        let urls = urls(&[A, B]);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let run = OfferRun::new(&urls)
            .with_pacing(Pacing::new(Duration::from_secs(60), Duration::from_secs(60)))
            .with_cancellation(cancel)
            .run(|| Ok(&renderer));
        let stop = async move {
            sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        };

        let (report, ()) = tokio::join!(run, stop);
        let report = report.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.offers.len(), 1);
        assert_eq!(*renderer.calls.borrow(), vec![A.to_string()]);
    }

    #[test]
    fn test_pacing_delay_within_bounds() {
        let pacing = Pacing::new(Duration::from_millis(200), Duration::from_millis(50));
        assert_eq!(pacing.min, Duration::from_millis(50));
        for _ in 0..100 {
            let d = pacing.next_delay();
            assert!(d >= Duration::from_millis(50) && d <= Duration::from_millis(200));
        }
        assert_eq!(Pacing::NONE.next_delay(), Duration::ZERO);
    }
}

pub mod card;

use log::{ debug, info, warn };
use std::sync::atomic::{ AtomicBool, AtomicU64, Ordering };
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::models::weather::WeatherSnapshot;
use crate::weather::{ fetch_or_placeholder, WeatherSource, WeatherTarget };
use self::card::{ card_fields, render_page, CardFields };

/// When a page goes back to the weather API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    /// Fetched once when the server starts.
    Static,
    /// Fetched on every request.
    OnDemand,
    /// Cached; stale copies are served while a background refresh runs.
    Periodic(Duration),
    /// Fetched on every request, tagged as running on the edge runtime.
    Edge,
}

pub struct StrategyInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub pros: &'static [&'static str],
    pub cons: &'static [&'static str],
}

impl RenderStrategy {
    pub fn all(revalidate: Duration) -> [RenderStrategy; 4] {
        [
            RenderStrategy::Static,
            RenderStrategy::OnDemand,
            RenderStrategy::Periodic(revalidate),
            RenderStrategy::Edge,
        ]
    }

    pub fn path(&self) -> &'static str {
        match self {
            RenderStrategy::Static => "/ssg",
            RenderStrategy::OnDemand => "/ssr",
            RenderStrategy::Periodic(_) => "/isr",
            RenderStrategy::Edge => "/edge",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            RenderStrategy::Static => "SSG",
            RenderStrategy::OnDemand => "SSR",
            RenderStrategy::Periodic(_) => "ISR",
            RenderStrategy::Edge => "Edge",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RenderStrategy::Static => "Static Site Generation (SSG)",
            RenderStrategy::OnDemand => "Server-Side Rendering (SSR)",
            RenderStrategy::Periodic(_) => "Incremental Static Regeneration (ISR)",
            RenderStrategy::Edge => "Edge Rendering",
        }
    }

    pub fn label(&self) -> String {
        match self {
            RenderStrategy::Static => "Build-time".to_string(),
            RenderStrategy::OnDemand => "Server runtime".to_string(),
            RenderStrategy::Periodic(interval) => format!("Cached ({}s)", interval.as_secs()),
            RenderStrategy::Edge => "Edge Function".to_string(),
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            RenderStrategy::Static => "Static Site Generation (build-time)",
            RenderStrategy::OnDemand => "Server-Side Rendering (on-demand)",
            RenderStrategy::Periodic(_) => "Incremental Static Regeneration (revalidate)",
            RenderStrategy::Edge => "Edge Function Rendering (low latency)",
        }
    }

    pub fn cache_control(&self) -> String {
        match self {
            RenderStrategy::Static => "public, max-age=31536000, immutable".to_string(),
            RenderStrategy::OnDemand | RenderStrategy::Edge => "no-store".to_string(),
            RenderStrategy::Periodic(interval) =>
                format!("public, s-maxage={}, stale-while-revalidate", interval.as_secs()),
        }
    }

    pub fn info(&self) -> StrategyInfo {
        match self {
            RenderStrategy::Static => StrategyInfo {
                title: "Static Site Generation (SSG)",
                description: "Pages are pre-rendered once and served as static HTML. This is the fastest option as pages are generated once and cached.",
                pros: &[
                    "Fastest page loads",
                    "Content is immediately available",
                    "No runtime computation per request",
                ],
                cons: &[
                    "Content is stale until the next build",
                    "Not suitable for frequently changing data",
                ],
            },
            RenderStrategy::OnDemand => StrategyInfo {
                title: "Server-Side Rendering (SSR)",
                description: "Pages are rendered on-demand for each request on the server. This ensures fresh data on every page load but requires server computation time.",
                pros: &["Always fresh data on every request", "Dynamic content per request"],
                cons: &[
                    "Slower than static, requires server processing",
                    "Depends on upstream response time",
                    "Cannot be cached effectively",
                ],
            },
            RenderStrategy::Periodic(_) => StrategyInfo {
                title: "Incremental Static Regeneration (ISR)",
                description: "Pages are served from a cache and regenerated in the background after a specified time interval.",
                pros: &["Fast like static pages", "Content stays relatively fresh"],
                cons: &[
                    "First visitor after revalidation sees stale data",
                    "Revalidation timing needs tuning",
                ],
            },
            RenderStrategy::Edge => StrategyInfo {
                title: "Edge Function Rendering",
                description: "Code runs on edge nodes closest to the user. Provides low-latency dynamic rendering with global distribution.",
                pros: &["Low latency near users", "Fast dynamic rendering"],
                cons: &["Limited runtime environment", "Cold start latency possible"],
            },
        }
    }
}

#[derive(Debug, Clone)]
struct CachedSnapshot {
    snapshot: WeatherSnapshot,
    fetched_at: Instant,
}

/// Output of one page render.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub strategy: RenderStrategy,
    pub fields: CardFields,
    pub html: String,
    pub render_time: Duration,
}

/// One page wrapping the weather fetch in a caching policy. Each renderer owns
/// its cache.
#[derive(Clone)]
pub struct PageRenderer {
    strategy: RenderStrategy,
    source: Arc<dyn WeatherSource>,
    target: WeatherTarget,
    cache: Arc<RwLock<Option<CachedSnapshot>>>,
    refreshing: Arc<AtomicBool>,
    fetches: Arc<AtomicU64>,
}

impl PageRenderer {
    pub fn new(strategy: RenderStrategy, source: Arc<dyn WeatherSource>, target: WeatherTarget) -> Self {
        Self {
            strategy,
            source,
            target,
            cache: Arc::new(RwLock::new(None)),
            refreshing: Arc::new(AtomicBool::new(false)),
            fetches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of upstream fetches this page has made.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Fills the cache ahead of the first request. Only cached strategies
    /// keep the result.
    pub async fn prerender(&self) {
        match self.strategy {
            RenderStrategy::Static | RenderStrategy::Periodic(_) => {
                let snapshot = self.fetch_fresh().await;
                info!("Pre-rendered {} with data from {}", self.strategy.path(), snapshot.time);
                self.store(snapshot).await;
            }
            RenderStrategy::OnDemand | RenderStrategy::Edge => {}
        }
    }

    pub async fn snapshot(&self) -> WeatherSnapshot {
        match self.strategy {
            RenderStrategy::OnDemand | RenderStrategy::Edge => self.fetch_fresh().await,
            RenderStrategy::Static => {
                if let Some(cached) = self.cache.read().await.as_ref() {
                    return cached.snapshot.clone();
                }
                self.fill_cache().await
            }
            RenderStrategy::Periodic(interval) => {
                let cached = self.cache.read().await.clone();
                match cached {
                    Some(entry) if entry.fetched_at.elapsed() < interval => entry.snapshot,
                    Some(entry) => {
                        self.spawn_refresh(entry.fetched_at);
                        entry.snapshot
                    }
                    None => self.fill_cache().await,
                }
            }
        }
    }

    pub async fn render(&self) -> RenderedPage {
        let started = Instant::now();
        let snapshot = self.snapshot().await;
        let fields = card_fields(self.strategy.title(), &snapshot, &self.strategy.label());
        let render_time = started.elapsed();
        let html = render_page(&self.strategy, &fields, render_time);

        RenderedPage {
            strategy: self.strategy,
            fields,
            html,
            render_time,
        }
    }

    async fn fetch_fresh(&self) -> WeatherSnapshot {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        fetch_or_placeholder(self.source.as_ref(), &self.target).await
    }

    async fn store(&self, snapshot: WeatherSnapshot) {
        *self.cache.write().await = Some(CachedSnapshot { snapshot, fetched_at: Instant::now() });
    }

    async fn fill_cache(&self) -> WeatherSnapshot {
        let mut guard = self.cache.write().await;
        // Another request may have filled it while we waited for the lock.
        if let Some(cached) = guard.as_ref() {
            return cached.snapshot.clone();
        }
        let snapshot = self.fetch_fresh().await;
        *guard = Some(CachedSnapshot { snapshot: snapshot.clone(), fetched_at: Instant::now() });
        snapshot
    }

    /// Starts one background regeneration. `seen` is the fetch time of the
    /// stale entry the caller served; if the cache has moved past it by the
    /// time the task runs, nothing is fetched.
    fn spawn_refresh(&self, seen: Instant) {
        if self.refreshing.swap(true, Ordering::SeqCst) {
            debug!("Regeneration of {} already in progress", self.strategy.path());
            return;
        }

        let page = self.clone();
        tokio::spawn(async move {
            let current = page.cache.read().await.as_ref().map(|c| c.fetched_at);
            if current.map(|t| t > seen).unwrap_or(false) {
                debug!("{} was regenerated by an earlier request", page.strategy.path());
                page.refreshing.store(false, Ordering::SeqCst);
                return;
            }

            let snapshot = page.fetch_fresh().await;
            if snapshot.is_placeholder() {
                warn!("Regenerated {} with placeholder data", page.strategy.path());
            } else {
                info!("Regenerated {}", page.strategy.path());
            }
            page.store(snapshot).await;
            page.refreshing.store(false, Ordering::SeqCst);
        });
    }
}

/// The four demo pages, each with its own cache.
#[derive(Clone)]
pub struct Pages {
    pub ssg: PageRenderer,
    pub ssr: PageRenderer,
    pub isr: PageRenderer,
    pub edge: PageRenderer,
}

impl Pages {
    pub fn new(source: Arc<dyn WeatherSource>, target: WeatherTarget, revalidate: Duration) -> Self {
        let page = |strategy| PageRenderer::new(strategy, source.clone(), target.clone());
        Self {
            ssg: page(RenderStrategy::Static),
            ssr: page(RenderStrategy::OnDemand),
            isr: page(RenderStrategy::Periodic(revalidate)),
            edge: page(RenderStrategy::Edge),
        }
    }

    pub fn all(&self) -> [&PageRenderer; 4] {
        [&self.ssg, &self.ssr, &self.isr, &self.edge]
    }

    pub async fn prerender(&self) {
        self.ssg.prerender().await;
        self.isr.prerender().await;
    }
}

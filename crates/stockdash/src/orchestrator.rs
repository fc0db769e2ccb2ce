//! Binds the resource store to the dashboard's views and parameters.

use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use stockdash_core::{
    AssembledSection, Block, NestedRecord, ResourceFetcher, ResourceKey, SectionDefinition,
    Ticker, TimePeriod, TimeSeries, ValuationParams, assemble, merge_records, visible_sections,
};
use stockdash_store::{ResourceState, ResourceStore, Status};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::financials::financial_sections;
use crate::views::{
    CompanyOverview, Quote, Readout, ValuationSummary, price_history, summary_blocks,
};

/// A tab of the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    /// Company description and market metrics.
    #[default]
    Description,
    /// Price history chart.
    Chart,
    /// Financial ratio charts.
    Financials,
    /// Valuation ratios.
    Valuation,
    /// AI-written summary.
    AiSummary,
}

impl View {
    /// Every view in tab order.
    pub const ALL: [Self; 5] = [
        Self::Description,
        Self::Chart,
        Self::Financials,
        Self::Valuation,
        Self::AiSummary,
    ];
}

/// Parameters that determine which resources the views read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewParams {
    /// Ticker every view is about.
    pub ticker: Ticker,
    /// Window of the price chart.
    pub chart_period: TimePeriod,
    /// Inputs of the valuation view.
    pub valuation: ValuationParams,
}

impl ViewParams {
    /// Parameters for `ticker` with every other setting at its default.
    #[must_use]
    pub fn for_ticker(ticker: impl Into<Ticker>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Default::default()
        }
    }
}

/// Returns the resources `view` reads under `params`.
#[must_use]
pub fn required_keys(view: View, params: &ViewParams) -> Vec<ResourceKey> {
    let ticker = params.ticker.clone();
    match view {
        View::Description | View::Financials => vec![ResourceKey::Snapshot(ticker)],
        View::Chart => vec![ResourceKey::History(ticker, params.chart_period)],
        View::Valuation => vec![ResourceKey::Valuation(ticker, params.valuation)],
        View::AiSummary => vec![ResourceKey::AiSummary(ticker)],
    }
}

#[derive(Debug, Default)]
struct Session {
    params: ViewParams,
    active: Option<View>,
}

/// Decides when each resource is fetched as the user moves between views and
/// changes parameters, and shapes the results for rendering.
///
/// - A resource is fetched the first time a view that reads it is activated.
/// - Changing a parameter invalidates the resources it identified and reloads
///   what the active view needs.
/// - Each reader consults only its own resource, so one failure never hides
///   another view's data.
///
/// # Example
///
/// ```rust,ignore
/// let dash = ViewOrchestrator::new(fetcher);
/// dash.set_ticker("AAPL").await;
/// dash.activate(View::Chart).await;
/// if let Readout::Ready(series) = dash.chart().await {
///     draw(series.points());
/// }
/// ```
pub struct ViewOrchestrator {
    store: Arc<ResourceStore>,
    fetcher: Arc<dyn ResourceFetcher>,
    sections: Vec<SectionDefinition>,
    session: RwLock<Session>,
}

impl fmt::Debug for ViewOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewOrchestrator")
            .field("fetcher", &self.fetcher.name())
            .field("sections", &self.sections.len())
            .finish_non_exhaustive()
    }
}

impl ViewOrchestrator {
    /// Create an orchestrator with an empty store.
    #[must_use]
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self::with_store(Arc::new(ResourceStore::new()), fetcher)
    }

    /// Create an orchestrator over an existing store.
    #[must_use]
    pub fn with_store(store: Arc<ResourceStore>, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self {
            store,
            fetcher,
            sections: financial_sections(),
            session: RwLock::new(Session::default()),
        }
    }

    /// Replace the section tables used by the financials view.
    #[must_use]
    pub fn with_sections(mut self, sections: Vec<SectionDefinition>) -> Self {
        self.sections = sections;
        self
    }

    /// Start from `params` instead of the defaults.
    #[must_use]
    pub fn with_params(mut self, params: ViewParams) -> Self {
        self.session.get_mut().params = params;
        self
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    /// Returns the current parameters.
    pub async fn params(&self) -> ViewParams {
        self.session.read().await.params.clone()
    }

    /// Returns the active view, if any view has been activated.
    pub async fn active_view(&self) -> Option<View> {
        self.session.read().await.active
    }

    /// Makes `view` active and loads what it reads.
    ///
    /// Resources already loaded, loading or failed are left as they are.
    #[instrument(skip(self))]
    pub async fn activate(&self, view: View) {
        let params = {
            let mut session = self.session.write().await;
            session.active = Some(view);
            session.params.clone()
        };
        self.load(required_keys(view, &params)).await;
    }

    /// Switches every view to `ticker`.
    ///
    /// All resources of the previous ticker are invalidated, so responses
    /// still in flight for it are discarded.
    #[instrument(skip(self, ticker))]
    pub async fn set_ticker(&self, ticker: impl Into<Ticker>) {
        let ticker = ticker.into();
        let previous = {
            let mut session = self.session.write().await;
            if session.params.ticker == ticker {
                return;
            }
            std::mem::replace(&mut session.params.ticker, ticker.clone())
        };

        let count = self
            .store
            .invalidate_matching(|key| key.ticker() == &previous)
            .await;
        debug!(from = %previous, to = %ticker, invalidated = count, "Ticker changed");

        self.load_active().await;
    }

    /// Changes the price chart window.
    #[instrument(skip(self))]
    pub async fn set_chart_period(&self, period: TimePeriod) {
        let stale = {
            let mut session = self.session.write().await;
            if session.params.chart_period == period {
                return;
            }
            let stale = ResourceKey::History(session.params.ticker.clone(), session.params.chart_period);
            session.params.chart_period = period;
            stale
        };

        self.store.invalidate(&stale).await;
        self.load_active().await;
    }

    /// Changes the valuation inputs.
    #[instrument(skip(self))]
    pub async fn set_valuation_params(&self, valuation: ValuationParams) {
        let stale = {
            let mut session = self.session.write().await;
            if session.params.valuation == valuation {
                return;
            }
            let stale = ResourceKey::Valuation(session.params.ticker.clone(), session.params.valuation);
            session.params.valuation = valuation;
            stale
        };

        self.store.invalidate(&stale).await;
        self.load_active().await;
    }

    /// Fetches a fresh price quote and returns the merged quote.
    ///
    /// Only price fields change; the rest of the snapshot stays as loaded.
    #[instrument(skip(self))]
    pub async fn refresh_price(&self) -> Readout<Quote> {
        let key = ResourceKey::PriceQuote(self.params().await.ticker);
        self.store
            .force_refresh(&key, self.fetcher.as_ref(), merge_records)
            .await;
        self.price_quote().await
    }

    /// Refetches everything the active view reads.
    #[instrument(skip(self))]
    pub async fn refresh_active(&self) {
        let keys = self.active_keys().await;
        for key in &keys {
            self.store.invalidate(key).await;
        }
        self.load(keys).await;
    }

    async fn active_keys(&self) -> Vec<ResourceKey> {
        let session = self.session.read().await;
        session
            .active
            .map(|view| required_keys(view, &session.params))
            .unwrap_or_default()
    }

    async fn load_active(&self) {
        let keys = self.active_keys().await;
        self.load(keys).await;
    }

    async fn load(&self, keys: Vec<ResourceKey>) {
        if keys.is_empty() {
            return;
        }
        let fetcher = self.fetcher.as_ref();
        join_all(keys.iter().map(|key| self.store.ensure_loaded(key, fetcher))).await;
    }

    async fn read<T>(&self, key: &ResourceKey, shape: impl FnOnce(&NestedRecord) -> T) -> Readout<T> {
        match self.store.peek(key).await {
            Some(state) => Readout::from_state(&state, shape),
            None => Readout::Idle,
        }
    }

    /// The description view.
    pub async fn description(&self) -> Readout<CompanyOverview> {
        let key = ResourceKey::Snapshot(self.params().await.ticker);
        self.read(&key, CompanyOverview::from_record).await
    }

    /// The price header: the snapshot's price with any refreshed quote laid
    /// over it.
    ///
    /// A refresh in flight reads as loading and a failed refresh as failed;
    /// otherwise the readout follows the snapshot.
    pub async fn price_quote(&self) -> Readout<Quote> {
        let ticker = self.params().await.ticker;
        let quote = self
            .store
            .peek(&ResourceKey::PriceQuote(ticker.clone()))
            .await
            .unwrap_or_default();

        match quote.status {
            Status::Loading => return Readout::Loading,
            Status::Failed => {
                if let Some(error) = quote.error {
                    return Readout::Failed(error);
                }
            }
            Status::Idle | Status::Loaded => {}
        }

        let snapshot = self
            .store
            .peek(&ResourceKey::Snapshot(ticker))
            .await
            .unwrap_or_default();
        overlay_quote(&snapshot, quote.data)
    }

    /// The price chart.
    pub async fn chart(&self) -> Readout<TimeSeries> {
        let params = self.params().await;
        let key = ResourceKey::History(params.ticker, params.chart_period);
        self.read(&key, price_history).await
    }

    /// The financials view: sections that have at least one chart.
    pub async fn financials(&self) -> Readout<Vec<AssembledSection>> {
        let key = ResourceKey::Snapshot(self.params().await.ticker);
        self.read(&key, |record| visible_sections(assemble(record, &self.sections)))
            .await
    }

    /// The valuation view.
    pub async fn valuation(&self) -> Readout<ValuationSummary> {
        let params = self.params().await;
        let style = params.valuation.style;
        let key = ResourceKey::Valuation(params.ticker, params.valuation);
        self.read(&key, |record| ValuationSummary::from_record(record, style))
            .await
    }

    /// The AI summary view.
    pub async fn summary(&self) -> Readout<Vec<Block>> {
        let key = ResourceKey::AiSummary(self.params().await.ticker);
        self.read(&key, summary_blocks).await
    }
}

fn overlay_quote(snapshot: &ResourceState, quote: Option<NestedRecord>) -> Readout<Quote> {
    match (Readout::from_state(snapshot, Clone::clone), quote) {
        (Readout::Ready(base), Some(update)) => {
            Readout::Ready(Quote::from_record(&merge_records(Some(&base), update)))
        }
        (Readout::Ready(base), None) => Readout::Ready(Quote::from_record(&base)),
        (_, Some(update)) => Readout::Ready(Quote::from_record(&update)),
        (other, None) => other.map(|base| Quote::from_record(&base)),
    }
}

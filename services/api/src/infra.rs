use ba7ath::error::AppError;
use ba7ath::registry::{
    load_dataset, national_aggregate, wilaya_aggregate, CompanyRecord, DatasetSnapshot,
    IngestOutcome, NationalAggregate, Wilaya, WilayaAggregate,
};
use ba7ath::scoring::{rank_profiles, RankedRiskProfile, RiskEngine, ScoringConfig, ScoringError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything derived from one dataset snapshot: aggregates for all 24
/// wilayas, the national rollup, and the ranked risk profiles. Built
/// once per snapshot version and then served read-only, so request
/// handlers never recompute.
pub(crate) struct RiskBoard {
    pub(crate) snapshot: DatasetSnapshot,
    pub(crate) national: NationalAggregate,
    pub(crate) aggregates: BTreeMap<Wilaya, WilayaAggregate>,
    pub(crate) ranked: Vec<RankedRiskProfile>,
}

impl RiskBoard {
    pub(crate) fn build(
        snapshot: DatasetSnapshot,
        engine: &RiskEngine,
    ) -> Result<Self, ScoringError> {
        let national = national_aggregate(&snapshot.companies);
        let mut aggregates = BTreeMap::new();
        let mut profiles = Vec::with_capacity(Wilaya::ordered().len());
        for wilaya in Wilaya::ordered() {
            let aggregate = wilaya_aggregate(&snapshot.companies, wilaya);
            profiles.push(engine.profile(&aggregate)?);
            aggregates.insert(wilaya, aggregate);
        }

        Ok(Self {
            snapshot,
            national,
            aggregates,
            ranked: rank_profiles(profiles),
        })
    }

    pub(crate) fn ranked_for(&self, wilaya: Wilaya) -> Option<&RankedRiskProfile> {
        self.ranked
            .iter()
            .find(|entry| entry.profile.wilaya == wilaya)
    }

    pub(crate) fn aggregate_for(&self, wilaya: Wilaya) -> Option<&WilayaAggregate> {
        self.aggregates.get(&wilaya)
    }

    /// 1-based position of a wilaya in the company-count ordering, ties
    /// broken by name ascending; 0 when the wilaya has no companies.
    pub(crate) fn count_rank(&self, wilaya: Wilaya) -> usize {
        let mut counts: Vec<(Wilaya, usize)> = self
            .national
            .wilayas
            .iter()
            .map(|(wilaya, count)| (*wilaya, *count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name_ar().cmp(b.0.name_ar())));
        counts
            .iter()
            .position(|(candidate, _)| *candidate == wilaya)
            .map(|position| position + 1)
            .unwrap_or(0)
    }
}

/// Holds the active board and swaps in rebuilt ones on refresh. Readers
/// grab an `Arc` and keep a consistent view for the whole request even
/// while a refresh lands.
pub(crate) struct DatasetStore {
    board: Mutex<Arc<RiskBoard>>,
    next_version: AtomicU64,
}

impl DatasetStore {
    pub(crate) fn new(board: RiskBoard) -> Self {
        let next_version = board.snapshot.version + 1;
        Self {
            board: Mutex::new(Arc::new(board)),
            next_version: AtomicU64::new(next_version),
        }
    }

    pub(crate) fn current(&self) -> Arc<RiskBoard> {
        self.board.lock().expect("dataset mutex poisoned").clone()
    }

    pub(crate) fn install(
        &self,
        companies: Vec<CompanyRecord>,
        engine: &RiskEngine,
    ) -> Result<Arc<RiskBoard>, ScoringError> {
        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        let board = Arc::new(RiskBoard::build(
            DatasetSnapshot::new(version, companies),
            engine,
        )?);
        *self.board.lock().expect("dataset mutex poisoned") = board.clone();
        Ok(board)
    }
}

/// Shared state behind every data route.
pub(crate) struct ApiContext {
    pub(crate) store: DatasetStore,
    pub(crate) engine: RiskEngine,
    pub(crate) data_path: PathBuf,
}

pub(crate) fn default_scoring_config() -> ScoringConfig {
    ScoringConfig::v2()
}

/// Loads the registry export and builds the first board. A missing or
/// unreadable file degrades to an empty dataset so the service can come
/// up and be refreshed later; the dashboards already treat absent
/// profiles as "not yet computed".
pub(crate) fn bootstrap_context(
    data_path: PathBuf,
    engine: RiskEngine,
) -> Result<ApiContext, AppError> {
    let outcome = match load_dataset(&data_path) {
        Ok(outcome) => {
            info!(
                total = outcome.companies.len(),
                skipped = outcome.skipped,
                path = %data_path.display(),
                "registry dataset loaded"
            );
            outcome
        }
        Err(err) => {
            warn!(
                error = %err,
                path = %data_path.display(),
                "could not load registry dataset, starting empty"
            );
            IngestOutcome {
                companies: Vec::new(),
                skipped: 0,
            }
        }
    };

    let board = RiskBoard::build(DatasetSnapshot::new(1, outcome.companies), &engine)?;
    Ok(ApiContext {
        store: DatasetStore::new(board),
        engine,
        data_path,
    })
}

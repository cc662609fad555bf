//! The project store: single owner of the project collection.
//!
//! State lives in a [`tokio::sync::watch`] channel. Reads are cheap
//! snapshots, and every change notifies subscribers, so a front end
//! re-renders from [`ProjectStore::subscribe`] instead of polling.
//!
//! Lifecycle:
//!
//! 1. [`ProjectStore::new`] starts in [`StorePhase::Loading`]. Mutations are
//!    rejected with [`StoreError::NotReady`].
//! 2. [`ProjectStore::load_projects`] reads the persisted blob once and moves
//!    to [`StorePhase::Ready`], whatever the outcome of the read.
//! 3. Each mutation updates memory, then awaits its own persistence write.
//!    Writes are serialized and always carry the latest collection.
//!
//! Persistence is best-effort: storage failures are logged and never undo an
//! in-memory change.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use crate::db::KeyValueStore;
use crate::models::{Investment, NewProject, Project};

/// Key the serialized project collection is stored under.
pub const PROJECTS_KEY: &str = "octosolar-projects";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorePhase {
    #[default]
    Loading,
    Ready,
}

/// Everything a subscriber sees.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreState {
    pub phase: StorePhase,
    pub projects: Vec<Project>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("project store is still loading")]
    NotReady,

    #[error("project {0} not found")]
    ProjectNotFound(i64),

    #[error("investor name is required")]
    MissingInvestorName,

    #[error("investment amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("investment of {requested} exceeds remaining funding of {remaining}")]
    ExceedsRemaining { requested: Decimal, remaining: Decimal },
}

pub struct ProjectStore {
    backend: Box<dyn KeyValueStore>,
    state: watch::Sender<StoreState>,
    /// Held for the whole of every backend read or write.
    persist_lock: Mutex<()>,
}

impl ProjectStore {
    /// A store in the loading phase. Call [`load_projects`](Self::load_projects)
    /// before mutating.
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            backend,
            state,
            persist_lock: Mutex::new(()),
        }
    }

    /// A store that has already loaded whatever `backend` holds.
    pub async fn open(backend: Box<dyn KeyValueStore>) -> Self {
        let store = Self::new(backend);
        store.load_projects().await;
        store
    }

    pub fn phase(&self) -> StorePhase {
        self.state.borrow().phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == StorePhase::Loading
    }

    /// Copy of the current collection, in creation order.
    pub fn projects(&self) -> Vec<Project> {
        self.state.borrow().projects.clone()
    }

    pub fn project(&self, id: i64) -> Option<Project> {
        self.state.borrow().projects.iter().find(|p| p.id == id).cloned()
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// A receiver notified after every change to phase or collection.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Hydrates the collection from the backend and marks the store ready.
    ///
    /// A missing blob, a backend failure or malformed JSON all leave the
    /// collection empty. Only the first call reads; later calls are no-ops.
    pub async fn load_projects(&self) {
        let _guard = self.persist_lock.lock().await;

        if self.phase() == StorePhase::Ready {
            debug!("projects already loaded; skipping reload");
            return;
        }

        let projects = match self.backend.get(PROJECTS_KEY).await {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Project>>(&json) {
                Ok(projects) => {
                    info!(count = projects.len(), "loaded saved projects");
                    projects
                }
                Err(e) => {
                    warn!(error = %e, "saved projects are malformed; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                info!("no saved projects yet");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "could not read saved projects; starting empty");
                Vec::new()
            }
        };

        self.state.send_modify(|state| {
            state.projects = projects;
            state.phase = StorePhase::Ready;
        });
    }

    /// Writes the full collection to the backend.
    ///
    /// Skipped while loading and when the collection is empty. Failures are
    /// logged and otherwise ignored.
    pub async fn save_projects(&self) {
        let _guard = self.persist_lock.lock().await;

        let payload = {
            let state = self.state.borrow();
            if state.phase == StorePhase::Loading || state.projects.is_empty() {
                return;
            }
            serde_json::to_string(&state.projects).map(|json| (json, state.projects.len()))
        };

        match payload {
            Ok((json, count)) => match self.backend.set(PROJECTS_KEY, &json).await {
                Ok(()) => debug!(count, bytes = json.len(), "saved projects"),
                Err(e) => error!(error = %e, "error saving projects"),
            },
            Err(e) => error!(error = %e, "error serializing projects"),
        }
    }

    /// Lists a new project with no funding and persists the collection.
    ///
    /// The caller supplies the estimator-derived fields; no business rules
    /// are checked here.
    pub async fn add_project(&self, new: NewProject) -> Result<Project, StoreError> {
        let now = Utc::now();
        let mut outcome = Err(StoreError::NotReady);

        self.state.send_if_modified(|state| {
            if state.phase != StorePhase::Ready {
                return false;
            }
            let project = Project::from_new(next_id(&state.projects, now), new, now);
            state.projects.push(project.clone());
            outcome = Ok(project);
            true
        });

        let project = outcome?;
        info!(
            project_id = project.id,
            name = %project.project_name,
            goal = %project.goal_amount,
            "project listed"
        );

        self.save_projects().await;
        Ok(project)
    }

    /// Records `amount` from `investor_name` against `project_id` and
    /// persists the collection.
    ///
    /// # Errors
    ///
    /// * [`StoreError::NotReady`] while loading
    /// * [`StoreError::MissingInvestorName`] for a blank name
    /// * [`StoreError::NonPositiveAmount`] for `amount <= 0`
    /// * [`StoreError::ProjectNotFound`] for an unknown id
    /// * [`StoreError::ExceedsRemaining`] when the goal would be overshot
    ///
    /// On any error the collection is left unchanged.
    pub async fn invest_in_project(
        &self,
        project_id: i64,
        amount: Decimal,
        investor_name: &str,
    ) -> Result<Investment, StoreError> {
        let now = Utc::now();
        let mut outcome = Err(StoreError::NotReady);

        self.state.send_if_modified(|state| {
            outcome = record_investment(state, project_id, amount, investor_name, now);
            outcome.is_ok()
        });

        let investment = match outcome {
            Ok(investment) => investment,
            Err(e) => {
                warn!(project_id, %amount, error = %e, "investment rejected");
                return Err(e);
            }
        };
        info!(project_id, investor = %investment.name, %amount, "investment recorded");

        self.save_projects().await;
        Ok(investment)
    }

    /// Empties the collection and deletes the persisted blob. Irreversible.
    ///
    /// Returns how many projects were removed. A failed delete is logged;
    /// the in-memory collection is cleared regardless.
    pub async fn clear_all_data(&self) -> Result<usize, StoreError> {
        let _guard = self.persist_lock.lock().await;
        let mut outcome = Err(StoreError::NotReady);

        self.state.send_if_modified(|state| {
            if state.phase != StorePhase::Ready {
                return false;
            }
            let removed = state.projects.len();
            state.projects.clear();
            outcome = Ok(removed);
            removed > 0
        });

        let removed = outcome?;
        match self.backend.delete(PROJECTS_KEY).await {
            Ok(()) => info!(removed, "all project data cleared"),
            Err(e) => error!(error = %e, "error deleting saved projects"),
        }
        Ok(removed)
    }
}

/// Millisecond creation timestamp, bumped past the newest existing id when
/// the clock has not advanced.
fn next_id(
    projects: &[Project],
    now: DateTime<Utc>,
) -> i64 {
    let candidate = now.timestamp_millis();
    match projects.iter().map(|p| p.id).max() {
        Some(last) if candidate <= last => last + 1,
        _ => candidate,
    }
}

fn record_investment(
    state: &mut StoreState,
    project_id: i64,
    amount: Decimal,
    investor_name: &str,
    now: DateTime<Utc>,
) -> Result<Investment, StoreError> {
    if state.phase != StorePhase::Ready {
        return Err(StoreError::NotReady);
    }

    let name = investor_name.trim();
    if name.is_empty() {
        return Err(StoreError::MissingInvestorName);
    }
    if amount <= Decimal::ZERO {
        return Err(StoreError::NonPositiveAmount(amount));
    }

    let project = state
        .projects
        .iter_mut()
        .find(|p| p.id == project_id)
        .ok_or(StoreError::ProjectNotFound(project_id))?;

    let remaining = project.remaining_funding();
    if amount > remaining {
        return Err(StoreError::ExceedsRemaining {
            requested: amount,
            remaining,
        });
    }

    let investment = Investment {
        name: name.to_string(),
        amount,
        date: now,
    };
    project.investors.push(investment.clone());
    project.current_funding += amount;

    Ok(investment)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::db::{MemoryKeyValueStore, StorageError};

    // ── test backends ────────────────────────────────────────────────────

    /// Wraps a memory store and fails whichever operations are switched on.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryKeyValueStore,
        fail_get: bool,
        fail_set: bool,
        fail_delete: bool,
        sets: AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail_get {
                return Err(StorageError::Backend("get failed".to_string()));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            if self.fail_set {
                return Err(StorageError::Backend("set failed".to_string()));
            }
            self.inner.set(key, value).await
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            if self.fail_delete {
                return Err(StorageError::Backend("delete failed".to_string()));
            }
            self.inner.delete(key).await
        }
    }

    // ── helpers ──────────────────────────────────────────────────────────

    fn new_project(
        name: &str,
        goal: Decimal,
    ) -> NewProject {
        NewProject {
            project_name: name.to_string(),
            location: "Chicago, IL".to_string(),
            address: "2450 N Lincoln Ave".to_string(),
            roof_size: dec!(1200),
            goal_amount: goal,
            system_size: dec!(6.0),
            roi: dec!(4.5),
            monthly_savings: dec!(113),
            annual_co2_saved: dec!(9.0),
            submitted_at: None,
        }
    }

    async fn ready_store() -> (ProjectStore, MemoryKeyValueStore) {
        let backend = MemoryKeyValueStore::new();
        let store = ProjectStore::open(Box::new(backend.clone())).await;
        (store, backend)
    }

    async fn stored_projects(backend: &MemoryKeyValueStore) -> Option<Vec<Project>> {
        backend
            .get(PROJECTS_KEY)
            .await
            .unwrap()
            .map(|json| serde_json::from_str(&json).unwrap())
    }

    // ── lifecycle ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn new_store_is_loading_and_rejects_mutations() {
        let store = ProjectStore::new(Box::new(MemoryKeyValueStore::new()));

        assert!(store.is_loading());
        assert_eq!(
            store.add_project(new_project("Early", dec!(18000))).await,
            Err(StoreError::NotReady)
        );
        assert_eq!(
            store.invest_in_project(1, dec!(100), "Alice").await,
            Err(StoreError::NotReady)
        );
        assert_eq!(store.clear_all_data().await, Err(StoreError::NotReady));
        assert!(store.projects().is_empty());
    }

    #[tokio::test]
    async fn open_on_empty_backend_is_ready_and_empty() {
        let (store, _) = ready_store().await;

        assert_eq!(store.phase(), StorePhase::Ready);
        assert!(store.projects().is_empty());
    }

    #[tokio::test]
    async fn malformed_blob_loads_as_empty() {
        let backend = MemoryKeyValueStore::new();
        backend.set(PROJECTS_KEY, "{not json").await.unwrap();

        let store = ProjectStore::open(Box::new(backend)).await;

        assert_eq!(store.phase(), StorePhase::Ready);
        assert!(store.projects().is_empty());
    }

    #[tokio::test]
    async fn backend_read_failure_loads_as_empty() {
        let backend = FlakyStore {
            fail_get: true,
            ..Default::default()
        };

        let store = ProjectStore::open(Box::new(backend)).await;

        assert_eq!(store.phase(), StorePhase::Ready);
        assert!(store.projects().is_empty());
    }

    #[tokio::test]
    async fn second_load_does_not_reread() {
        let (store, backend) = ready_store().await;
        store.add_project(new_project("Kept", dec!(18000))).await.unwrap();
        backend.set(PROJECTS_KEY, "[]").await.unwrap();

        store.load_projects().await;

        assert_eq!(store.projects().len(), 1);
    }

    // ── add_project ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn add_project_starts_unfunded_and_persists() {
        let (store, backend) = ready_store().await;

        let project = store.add_project(new_project("Lincoln Park", dec!(18000))).await.unwrap();

        assert_eq!(project.current_funding, Decimal::ZERO);
        assert!(project.investors.is_empty());
        assert_eq!(project.submitted_at, project.created_at);
        assert_eq!(store.projects(), vec![project.clone()]);
        assert_eq!(stored_projects(&backend).await, Some(vec![project]));
    }

    #[tokio::test]
    async fn add_project_assigns_distinct_increasing_ids() {
        let (store, _) = ready_store().await;

        let mut ids = Vec::new();
        for i in 0..5 {
            let project = store
                .add_project(new_project(&format!("Roof {i}"), dec!(10000)))
                .await
                .unwrap();
            ids.push(project.id);
        }

        assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids not increasing: {ids:?}");
    }

    #[test]
    fn next_id_bumps_past_existing_ids() {
        let now = Utc::now();
        let mut existing = Project::from_new(0, new_project("Future", dec!(1)), now);
        existing.id = now.timestamp_millis() + 10;

        assert_eq!(next_id(&[existing.clone()], now), existing.id + 1);
        assert_eq!(next_id(&[], now), now.timestamp_millis());
    }

    // ── invest_in_project ────────────────────────────────────────────────

    #[tokio::test]
    async fn investment_updates_funding_and_investors() {
        let (store, backend) = ready_store().await;
        let project = store.add_project(new_project("Lincoln Park", dec!(18000))).await.unwrap();
        let before = Utc::now();

        let investment = store.invest_in_project(project.id, dec!(500), "Alice").await.unwrap();

        let after = Utc::now();
        let updated = store.project(project.id).unwrap();
        assert_eq!(updated.current_funding, dec!(500));
        assert_eq!(updated.investors, vec![investment.clone()]);
        assert_eq!(investment.name, "Alice");
        assert_eq!(investment.amount, dec!(500));
        assert!(investment.date >= before && investment.date <= after);
        assert_eq!(stored_projects(&backend).await, Some(vec![updated]));
    }

    #[tokio::test]
    async fn repeat_investor_gets_separate_entries() {
        let (store, _) = ready_store().await;
        let project = store.add_project(new_project("Lincoln Park", dec!(18000))).await.unwrap();

        store.invest_in_project(project.id, dec!(500), "Alice").await.unwrap();
        store.invest_in_project(project.id, dec!(250), "Alice").await.unwrap();

        let updated = store.project(project.id).unwrap();
        assert_eq!(updated.investors.len(), 2);
        assert_eq!(updated.current_funding, dec!(750));
    }

    #[tokio::test]
    async fn unknown_project_is_rejected_without_changes() {
        let (store, _) = ready_store().await;
        let project = store.add_project(new_project("Lincoln Park", dec!(18000))).await.unwrap();
        let before = store.snapshot();

        let result = store.invest_in_project(project.id + 999, dec!(500), "Alice").await;

        assert_eq!(result, Err(StoreError::ProjectNotFound(project.id + 999)));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn investment_beyond_goal_is_rejected() {
        let (store, _) = ready_store().await;
        let project = store.add_project(new_project("Small", dec!(1000))).await.unwrap();
        store.invest_in_project(project.id, dec!(800), "Alice").await.unwrap();

        let result = store.invest_in_project(project.id, dec!(201), "Bob").await;

        assert_eq!(
            result,
            Err(StoreError::ExceedsRemaining {
                requested: dec!(201),
                remaining: dec!(200),
            })
        );
        assert_eq!(store.project(project.id).unwrap().current_funding, dec!(800));
    }

    #[tokio::test]
    async fn investment_filling_goal_exactly_is_accepted() {
        let (store, _) = ready_store().await;
        let project = store.add_project(new_project("Small", dec!(1000))).await.unwrap();

        store.invest_in_project(project.id, dec!(1000), "Alice").await.unwrap();

        assert!(store.project(project.id).unwrap().is_funded());
    }

    #[tokio::test]
    async fn non_positive_amount_and_blank_name_are_rejected() {
        let (store, _) = ready_store().await;
        let project = store.add_project(new_project("Lincoln Park", dec!(18000))).await.unwrap();

        assert_eq!(
            store.invest_in_project(project.id, Decimal::ZERO, "Alice").await,
            Err(StoreError::NonPositiveAmount(Decimal::ZERO))
        );
        assert_eq!(
            store.invest_in_project(project.id, dec!(-5), "Alice").await,
            Err(StoreError::NonPositiveAmount(dec!(-5)))
        );
        assert_eq!(
            store.invest_in_project(project.id, dec!(5), "   ").await,
            Err(StoreError::MissingInvestorName)
        );
        assert!(store.project(project.id).unwrap().investors.is_empty());
    }

    #[tokio::test]
    async fn investor_name_is_trimmed() {
        let (store, _) = ready_store().await;
        let project = store.add_project(new_project("Lincoln Park", dec!(18000))).await.unwrap();

        let investment = store.invest_in_project(project.id, dec!(5), "  Alice ").await.unwrap();

        assert_eq!(investment.name, "Alice");
    }

    #[tokio::test]
    async fn funding_always_equals_sum_of_investments() {
        let (store, _) = ready_store().await;
        let a = store.add_project(new_project("A", dec!(18000))).await.unwrap();
        let b = store.add_project(new_project("B", dec!(22000))).await.unwrap();

        let moves = [
            (a.id, dec!(500), "Alice"),
            (b.id, dec!(1200.50), "Bob"),
            (a.id, dec!(17000), "Carol"),
            (a.id, dec!(900), "Dave"), // rejected, exceeds remaining
            (b.id, dec!(0.25), "Alice"),
            (b.id + 1_000_000, dec!(10), "Eve"), // rejected, unknown
        ];
        for (id, amount, name) in moves {
            let _ = store.invest_in_project(id, amount, name).await;
        }

        for project in store.projects() {
            assert_eq!(project.current_funding, project.invested_total(), "{}", project.project_name);
        }
        assert_eq!(store.project(a.id).unwrap().current_funding, dec!(17500));
        assert_eq!(store.project(b.id).unwrap().current_funding, dec!(1200.75));
    }

    // ── persistence ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn reload_restores_identical_collection() {
        let (store, backend) = ready_store().await;
        let a = store.add_project(new_project("A", dec!(18000))).await.unwrap();
        store.add_project(new_project("B", dec!(22000))).await.unwrap();
        store.invest_in_project(a.id, dec!(500), "Alice").await.unwrap();

        let reloaded = ProjectStore::open(Box::new(backend.clone())).await;

        assert_eq!(reloaded.projects(), store.projects());
    }

    #[tokio::test]
    async fn save_is_skipped_for_empty_collection() {
        let (store, backend) = ready_store().await;

        store.save_projects().await;

        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn failed_save_keeps_in_memory_change() {
        let backend = FlakyStore {
            fail_set: true,
            ..Default::default()
        };
        let store = ProjectStore::open(Box::new(backend)).await;

        let project = store.add_project(new_project("Unsaved", dec!(18000))).await.unwrap();
        store.invest_in_project(project.id, dec!(100), "Alice").await.unwrap();

        assert_eq!(store.project(project.id).unwrap().current_funding, dec!(100));
    }

    #[tokio::test]
    async fn every_mutation_writes_once() {
        let backend = std::sync::Arc::new(FlakyStore::default());
        let store = ProjectStore::open(Box::new(SharedFlaky(backend.clone()))).await;

        let project = store.add_project(new_project("Counted", dec!(18000))).await.unwrap();
        store.invest_in_project(project.id, dec!(100), "Alice").await.unwrap();
        let _ = store.invest_in_project(project.id, dec!(-1), "Alice").await;

        assert_eq!(backend.sets.load(Ordering::SeqCst), 2);
    }

    struct SharedFlaky(std::sync::Arc<FlakyStore>);

    #[async_trait]
    impl KeyValueStore for SharedFlaky {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key).await
        }
        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.set(key, value).await
        }
        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.0.delete(key).await
        }
    }

    // ── clear_all_data ───────────────────────────────────────────────────

    #[tokio::test]
    async fn clear_all_data_empties_memory_and_backend() {
        let (store, backend) = ready_store().await;
        store.add_project(new_project("A", dec!(18000))).await.unwrap();
        store.add_project(new_project("B", dec!(22000))).await.unwrap();

        let removed = store.clear_all_data().await.unwrap();

        assert_eq!(removed, 2);
        assert!(store.projects().is_empty());
        assert_eq!(backend.get(PROJECTS_KEY).await, Ok(None));
    }

    #[tokio::test]
    async fn clear_all_data_survives_delete_failure() {
        let backend = FlakyStore {
            fail_delete: true,
            ..Default::default()
        };
        let store = ProjectStore::open(Box::new(backend)).await;
        store.add_project(new_project("A", dec!(18000))).await.unwrap();

        assert_eq!(store.clear_all_data().await, Ok(1));
        assert!(store.projects().is_empty());
    }

    // ── subscriptions ────────────────────────────────────────────────────

    #[tokio::test]
    async fn subscribers_see_load_and_mutations() {
        let store = ProjectStore::new(Box::new(MemoryKeyValueStore::new()));
        let mut rx = store.subscribe();
        assert_eq!(rx.borrow_and_update().phase, StorePhase::Loading);

        store.load_projects().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().phase, StorePhase::Ready);

        store.add_project(new_project("Watched", dec!(18000))).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().projects.len(), 1);
    }

    #[tokio::test]
    async fn rejected_mutation_does_not_notify() {
        let (store, _) = ready_store().await;
        let mut rx = store.subscribe();
        let _ = rx.borrow_and_update();

        let _ = store.invest_in_project(42, dec!(10), "Alice").await;

        assert!(!rx.has_changed().unwrap());
    }
}

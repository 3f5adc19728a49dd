use crate::audit::{self, AuditEvent, AuditSink, TracingAudit};
use crate::case::{CaseRegistry, ProcessRepository};
use crate::classifier::Thresholds;
use crate::config::{AuditTarget, Config};
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::responsible::Responsibles;
use crate::store::Store;
use crate::timeline::Timeline;
use std::path::Path;
use std::sync::Arc;

/// Entry point to the deadline engine.
///
/// Owns the store handle and the collaborators every component shares: the
/// process repository cases are read from, the audit sink, and the status
/// thresholds. Components are borrowed views: `engine.ledger().extend(..)`.
pub struct Engine {
    store: Store,
    cases: Arc<dyn ProcessRepository>,
    audit: Arc<dyn AuditSink>,
    thresholds: Thresholds,
}

impl Engine {
    /// An engine whose store also serves as process repository and audit sink.
    pub fn new(store: Store) -> Self {
        Self {
            cases: Arc::new(store.clone()),
            audit: Arc::new(store.clone()),
            store,
            thresholds: Thresholds::default(),
        }
    }

    /// Load `.prazos/config.yaml` under `root` and open the configured database.
    /// A config with error-level findings is rejected before anything opens.
    pub fn open(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        config.ensure_valid()?;
        let store = Store::open(&config.database_path(root))?;
        let engine = Self::new(store).with_thresholds(config.thresholds);
        Ok(match config.audit {
            AuditTarget::Store => engine,
            AuditTarget::Log => engine.with_audit(Arc::new(TracingAudit)),
        })
    }

    pub fn with_repository(mut self, cases: Arc<dyn ProcessRepository>) -> Self {
        self.cases = cases;
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub(crate) fn cases(&self) -> &dyn ProcessRepository {
        self.cases.as_ref()
    }

    pub(crate) fn emit(&self, event: AuditEvent) {
        audit::emit(self.audit.as_ref(), event);
    }

    // -----------------------------------------------------------------------
    // Components
    // -----------------------------------------------------------------------

    pub fn registry(&self) -> CaseRegistry<'_> {
        CaseRegistry { engine: self }
    }

    pub fn ledger(&self) -> Ledger<'_> {
        Ledger { engine: self }
    }

    pub fn timeline(&self) -> Timeline<'_> {
        Timeline { engine: self }
    }

    pub fn responsibles(&self) -> Responsibles<'_> {
        Responsibles { engine: self }
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard { engine: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::tests::{new_case, officer};
    use crate::case::Case;
    use crate::error::PrazoError;
    use crate::store::tests::open_tmp;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct BrokenSink;

    impl AuditSink for BrokenSink {
        fn record(&self, _event: &AuditEvent) -> Result<()> {
            Err(PrazoError::Storage("audit disk full".to_string()))
        }
    }

    /// Delegates to the store but remembers which cases were looked up.
    struct CountingRepo {
        inner: Store,
        lookups: Mutex<Vec<u64>>,
    }

    impl ProcessRepository for CountingRepo {
        fn get(&self, case_id: u64) -> Result<Case> {
            if let Ok(mut seen) = self.lookups.lock() {
                seen.push(case_id);
            }
            self.inner.get(case_id)
        }

        fn list_open(&self) -> Result<Vec<Case>> {
            self.inner.list_open()
        }

        fn mark_concluded(&self, case_id: u64, on: NaiveDate, by: &str) -> Result<Case> {
            self.inner.mark_concluded(case_id, on, by)
        }
    }

    #[test]
    fn audit_failure_does_not_fail_the_mutation() {
        let (_dir, store) = open_tmp();
        let engine = Engine::new(store).with_audit(Arc::new(BrokenSink));
        let s = officer();
        engine
            .registry()
            .register(&s, new_case("SR", "Portaria", Some("2025-01-01")))
            .unwrap();

        let ensured = engine.ledger().ensure_initialized(&s, 1).unwrap();
        assert!(ensured.created);
        assert!(crate::audit::list(engine.store(), None).unwrap().is_empty());
    }

    #[test]
    fn ledger_reads_cases_through_the_repository() {
        let (_dir, store) = open_tmp();
        let repo = Arc::new(CountingRepo {
            inner: store.clone(),
            lookups: Mutex::new(Vec::new()),
        });
        let engine = Engine::new(store).with_repository(repo.clone());
        let s = officer();
        engine
            .registry()
            .register(&s, new_case("IPM", "Portaria", Some("2025-03-01")))
            .unwrap();

        engine.ledger().ensure_initialized(&s, 1).unwrap();
        assert!(repo.lookups.lock().unwrap().contains(&1));
    }

    #[test]
    fn open_honours_configured_audit_target() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.audit = AuditTarget::Log;
        config.thresholds.attention_days = 20;
        config.save(dir.path()).unwrap();

        let engine = Engine::open(dir.path()).unwrap();
        assert_eq!(engine.thresholds().attention_days, 20);
        engine
            .registry()
            .register(&officer(), new_case("SV", "Portaria", None))
            .unwrap();
        assert!(crate::audit::list(engine.store(), None).unwrap().is_empty());
    }

    #[test]
    fn open_rejects_inverted_thresholds() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.thresholds.urgent_days = 12;
        config.thresholds.attention_days = 10;
        config.save(dir.path()).unwrap();

        let err = Engine::open(dir.path()).err().unwrap();
        assert!(matches!(err, PrazoError::Validation(_)));
        assert!(err.to_string().contains("urgent_days (12)"));
        assert!(!dir.path().join(".prazos/prazos.redb").exists());
    }
}

//! SurveyService - the orchestrator.
//!
//! The service is the only component allowed to mutate responses. It owns the
//! catalog, the response store, and the aggregation cache, and keeps the store
//! and cache in step: every create/update/delete validates first, then applies
//! the store write and the matching cache deltas inside one critical section.
//!
//! ## Locking
//!
//! The cache lives behind the service's `RwLock`, which doubles as the gate for
//! every multi-step operation. Mutations hold it for writing; read views hold
//! it for reading, so they never observe a store write whose cache delta has
//! not landed yet. Store and catalog locks are only taken while the gate is
//! held, never the other way round. Snapshot encoding and I/O run outside it.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use survey_store::{SurveyConfig, SurveyService, SurveyResponse};
//!
//! let service = Arc::new(SurveyService::new(SurveyConfig::default()));
//! service.load(surveys, responses)?;
//!
//! let response = SurveyResponse::new("u00", 1, "post").answer(1, 2);
//! service.create(response)?;
//! let charts = service.report_rates(1)?;
//! service.backup()?;
//! ```

mod report;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error, info, warn};

use crate::aggregation::{AggregationCache, Delta};
use crate::catalog::{AnswerId, QuestionId, Survey, SurveyCatalog, SurveyId};
use crate::config::SurveyConfig;
use crate::error::{Result, SurveyError, ValidationFailure};
use crate::response::{InMemoryResponseStore, ResponseId, ResponseStore, SurveyResponse};
use crate::scoring::{score_domain, DomainScore, ScoringScheme};
use crate::snapshot::{FileSnapshotStore, Snapshot, SnapshotCodec, SnapshotStore};

pub use report::RateReport;

pub struct SurveyService<S = InMemoryResponseStore> {
    config: SurveyConfig,
    catalog: SurveyCatalog,
    responses: S,
    cache: RwLock<AggregationCache>,
    snapshots: Box<dyn SnapshotStore>,
}

/// Check `response` against its survey (`None` when the catalog lacks it):
/// the question ids must match exactly and every answered choice must name
/// one of the survey's answers.
fn conformance(
    survey: Option<&Survey>,
    response: &SurveyResponse,
) -> std::result::Result<(), ValidationFailure> {
    let survey = survey.ok_or(ValidationFailure::UnknownSurvey(response.survey_id))?;

    let expected = survey.question_ids();
    let actual: BTreeSet<QuestionId> = response.answers.keys().copied().collect();
    if expected != actual {
        return Err(ValidationFailure::QuestionMismatch {
            missing: expected.difference(&actual).copied().collect(),
            unexpected: actual.difference(&expected).copied().collect(),
        });
    }

    match response
        .answered()
        .find(|(_, answer_id)| survey.answer(*answer_id).is_none())
    {
        Some((question_id, answer_id)) => Err(ValidationFailure::UnknownAnswer {
            question_id,
            answer_id,
        }),
        None => Ok(()),
    }
}

/// The first response that does not fit `surveys`, with the reason.
fn first_misfit<'a>(
    surveys: &[Survey],
    responses: impl IntoIterator<Item = &'a SurveyResponse>,
) -> Option<(ResponseId, ValidationFailure)> {
    let by_id: BTreeMap<SurveyId, &Survey> = surveys.iter().map(|s| (s.id, s)).collect();
    responses.into_iter().find_map(|response| {
        conformance(by_id.get(&response.survey_id).copied(), response)
            .err()
            .map(|failure| (response.id, failure))
    })
}

impl SurveyService<InMemoryResponseStore> {
    /// An empty service backed by memory, snapshotting to `config.snapshot_path`.
    pub fn new(config: SurveyConfig) -> Self {
        let snapshots = FileSnapshotStore::new(config.snapshot_path.clone());
        Self::with_parts(config, snapshots)
    }
}

impl<S: ResponseStore + Default> SurveyService<S> {
    /// A service over a fresh `S`. The store is created here and never handed
    /// out, so every write to it goes through the service.
    pub fn with_parts(config: SurveyConfig, snapshots: impl SnapshotStore + 'static) -> Self {
        let cache = AggregationCache::new(config.eligible_response_types.clone());
        Self {
            config,
            catalog: SurveyCatalog::new(),
            responses: S::default(),
            cache: RwLock::new(cache),
            snapshots: Box::new(snapshots),
        }
    }
}

impl<S: ResponseStore> SurveyService<S> {
    pub fn config(&self) -> &SurveyConfig {
        &self.config
    }

    fn codec(&self) -> SnapshotCodec {
        self.config.snapshot_format
    }

    fn read_gate(&self) -> Result<RwLockReadGuard<'_, AggregationCache>> {
        self.cache
            .read()
            .map_err(|_| SurveyError::LockPoisoned("service read"))
    }

    fn write_gate(&self) -> Result<RwLockWriteGuard<'_, AggregationCache>> {
        self.cache
            .write()
            .map_err(|_| SurveyError::LockPoisoned("service write"))
    }

    /// Seed the service at startup: install the catalog, append the initial
    /// responses, and rebuild the cache from everything now in the store.
    ///
    /// Every response, already stored or new, must fit the new catalog as
    /// [`validate`](Self::validate) would check it. The first that does not
    /// is returned as a `Validation` error and nothing is installed.
    pub fn load(&self, surveys: Vec<Survey>, responses: Vec<SurveyResponse>) -> Result<()> {
        let mut cache = self.write_gate()?;

        let mut all = self.responses.all()?;
        all.extend(responses.iter().cloned());
        if let Some((response_id, failure)) = first_misfit(&surveys, &all) {
            warn!(response_id = %response_id, error = %failure, "rejected survey data load");
            return Err(SurveyError::validation(response_id, failure));
        }
        let rebuilt =
            AggregationCache::rebuild(self.config.eligible_response_types.clone(), &surveys, &all)?;

        let loaded = responses.len();
        self.swap_catalog(surveys, || self.responses.bulk_append(responses))?;
        *cache = rebuilt;

        info!(surveys = self.catalog.len()?, responses = loaded, "survey data loaded");
        Ok(())
    }

    /// Replace the catalog, then run `write` against the store. If the store
    /// write fails the previous catalog is put back.
    fn swap_catalog(&self, surveys: Vec<Survey>, write: impl FnOnce() -> Result<()>) -> Result<()> {
        let previous = self.catalog.all()?;
        self.catalog.replace_all(surveys)?;
        if let Err(err) = write() {
            self.catalog.replace_all(previous)?;
            return Err(err);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // validation
    // ------------------------------------------------------------------

    /// True iff the survey exists and the response covers exactly its questions.
    pub fn is_valid(&self, response: &SurveyResponse) -> bool {
        let actual: BTreeSet<QuestionId> = response.answers.keys().copied().collect();
        matches!(
            self.catalog.question_ids(response.survey_id),
            Ok(Some(expected)) if expected == actual
        )
    }

    /// The `is_valid` check with a reason, plus: every answered choice must
    /// name one of the survey's answer ids.
    pub fn validate(&self, response: &SurveyResponse) -> Result<()> {
        let survey = self.catalog.get(response.survey_id)?;
        conformance(survey.as_ref(), response)
            .map_err(|failure| SurveyError::validation(response.id, failure))
    }

    // ------------------------------------------------------------------
    // mutations
    // ------------------------------------------------------------------

    /// Store a new response. Returns true if a response with the same id
    /// already existed and was replaced.
    pub fn create(&self, response: SurveyResponse) -> Result<bool> {
        self.save(response)
    }

    /// Replace a response by id. An unknown id is stored as new; the return
    /// value tells the caller which case happened.
    pub fn update(&self, response: SurveyResponse) -> Result<bool> {
        self.save(response)
    }

    fn save(&self, response: SurveyResponse) -> Result<bool> {
        let mut cache = self.write_gate()?;

        if let Err(err) = self.validate(&response) {
            warn!(response_id = %response.id, error = %err, "rejected survey response");
            return Err(err);
        }

        let previous = self.responses.get(&response.id)?;
        if let Some(old) = &previous {
            cache.check(Delta::Decrement, old)?;
        }
        cache.check(Delta::Increment, &response)?;

        if let Some(old) = &previous {
            cache.apply(Delta::Decrement, old)?;
        }
        let replaced = match self.responses.upsert(response.clone()) {
            Ok(replaced) => replaced,
            Err(err) => {
                if let Some(old) = &previous {
                    cache.apply(Delta::Increment, old)?;
                }
                return Err(err);
            }
        };
        cache.apply(Delta::Increment, &response)?;

        debug!(
            response_id = %response.id,
            survey_id = response.survey_id,
            replaced,
            "saved survey response"
        );
        Ok(replaced)
    }

    /// Remove a response and its cache contribution. Returns the removed response.
    pub fn delete(&self, id: &ResponseId) -> Result<SurveyResponse> {
        let mut cache = self.write_gate()?;

        let existing = self
            .responses
            .get(id)?
            .ok_or(SurveyError::NotFound(*id))?;
        cache.apply(Delta::Decrement, &existing)?;

        match self.responses.delete(id) {
            Ok(true) => {
                debug!(response_id = %id, "deleted survey response");
                Ok(existing)
            }
            Ok(false) => {
                cache.apply(Delta::Increment, &existing)?;
                Err(SurveyError::NotFound(*id))
            }
            Err(err) => {
                cache.apply(Delta::Increment, &existing)?;
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // read views
    // ------------------------------------------------------------------

    pub fn surveys(&self) -> Result<Vec<Survey>> {
        let _gate = self.read_gate()?;
        self.catalog.all()
    }

    pub fn survey(&self, id: SurveyId) -> Result<Option<Survey>> {
        let _gate = self.read_gate()?;
        self.catalog.get(id)
    }

    pub fn response(&self, id: &ResponseId) -> Result<Option<SurveyResponse>> {
        let _gate = self.read_gate()?;
        self.responses.get(id)
    }

    /// Every response from one respondent, in insertion order.
    pub fn responses_for(&self, respondent: &str) -> Result<Vec<SurveyResponse>> {
        let _gate = self.read_gate()?;
        self.responses.filter(&|r| r.respondent == respondent)
    }

    pub fn responses_where(
        &self,
        predicate: &dyn Fn(&SurveyResponse) -> bool,
    ) -> Result<Vec<SurveyResponse>> {
        let _gate = self.read_gate()?;
        self.responses.filter(predicate)
    }

    pub fn answer_count(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<u64> {
        Ok(self.read_gate()?.answer_count(survey_id, question_id, answer_id))
    }

    pub fn non_null_count(&self, survey_id: SurveyId, question_id: QuestionId) -> Result<Option<u64>> {
        Ok(self.read_gate()?.non_null_count(survey_id, question_id))
    }

    /// A copy of the current cache state.
    pub fn cache_state(&self) -> Result<AggregationCache> {
        Ok(self.read_gate()?.clone())
    }

    /// Rebuild a cache from the store and compare it with the live one.
    pub fn verify_cache(&self) -> Result<bool> {
        let cache = self.read_gate()?;
        let rebuilt = AggregationCache::rebuild(
            cache.eligible().clone(),
            &self.catalog.all()?,
            &self.responses.all()?,
        )?;
        let consistent = rebuilt == *cache;
        if !consistent {
            error!("aggregation cache diverged from stored responses");
        }
        Ok(consistent)
    }

    // ------------------------------------------------------------------
    // scoring
    // ------------------------------------------------------------------

    pub fn score_respondent(
        &self,
        survey_id: SurveyId,
        respondent: &str,
        scheme: &ScoringScheme,
    ) -> Result<DomainScore> {
        let (survey, responses) = {
            let _gate = self.read_gate()?;
            let survey = self
                .catalog
                .get(survey_id)?
                .ok_or(SurveyError::SurveyNotFound(survey_id))?;
            let responses = self
                .responses
                .filter(&|r| r.survey_id == survey_id && r.respondent == respondent)?;
            (survey, responses)
        };
        score_domain(&survey, &responses, respondent, scheme)
    }

    // ------------------------------------------------------------------
    // snapshots
    // ------------------------------------------------------------------

    /// A consistent in-memory copy of the catalog and responses.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let _gate = self.read_gate()?;
        Ok(Snapshot::new(self.catalog.all()?, self.responses.all()?))
    }

    /// Copy state under the read lock, then encode and persist it outside.
    pub fn backup(&self) -> Result<Snapshot> {
        let snapshot = self.snapshot()?;
        let bytes = self.codec().serialize(&snapshot)?;

        if let Err(err) = self.snapshots.save(&bytes) {
            error!(location = %self.snapshots.location(), error = %err, "snapshot backup failed");
            return Err(err);
        }

        info!(
            location = %self.snapshots.location(),
            surveys = snapshot.surveys.len(),
            responses = snapshot.responses.len(),
            bytes = bytes.len(),
            "exported data snapshot"
        );
        Ok(snapshot)
    }

    /// Load the latest snapshot and replace all in-memory state with it.
    ///
    /// Decoding and the cache rebuild happen before the write lock is taken;
    /// any failure leaves the current state untouched.
    pub fn restore(&self) -> Result<Snapshot> {
        let bytes = match self.snapshots.load() {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(location = %self.snapshots.location(), error = %err, "no snapshot to restore");
                return Err(err);
            }
        };
        let snapshot = self.codec().deserialize(&bytes)?;
        self.install(&snapshot)?;

        info!(
            taken_at = %snapshot.taken_at,
            surveys = snapshot.surveys.len(),
            responses = snapshot.responses.len(),
            "restored data snapshot"
        );
        Ok(snapshot)
    }

    /// Replace catalog, store, and cache with the contents of `snapshot`.
    ///
    /// A snapshot holding a response that does not fit its survey is
    /// schema-incompatible: the result is a `Serialization` error and the
    /// current state is kept.
    pub fn install(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some((response_id, failure)) = first_misfit(&snapshot.surveys, &snapshot.responses) {
            warn!(response_id = %response_id, error = %failure, "incompatible snapshot");
            return Err(SurveyError::Serialization(format!(
                "snapshot response {response_id} does not fit its survey: {failure}"
            )));
        }
        let rebuilt = AggregationCache::rebuild(
            self.config.eligible_response_types.clone(),
            &snapshot.surveys,
            &snapshot.responses,
        )?;

        let mut cache = self.write_gate()?;
        self.swap_catalog(snapshot.surveys.clone(), || {
            self.responses.replace_all(snapshot.responses.clone())
        })?;
        *cache = rebuilt;
        Ok(())
    }
}

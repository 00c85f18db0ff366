//! survey_store - an in-memory survey response store.
//!
//! Surveys (questions and answer choices) are loaded once; responses are
//! created, updated, and deleted through [`SurveyService`], which validates
//! each response against its survey and keeps an [`AggregationCache`] of
//! per-answer counts in step with the stored responses. Reports read the
//! cache instead of rescanning, whole-state [`Snapshot`]s back everything up
//! to a [`SnapshotStore`], and [`ScoringScheme`]s turn a respondent's answers
//! into normalized per-category scores.

mod aggregation;
mod catalog;
mod config;
mod error;
mod response;
mod scoring;
mod service;
mod snapshot;

pub use aggregation::{AggregationCache, Delta, EligibleTypes};
pub use catalog::{Answer, AnswerId, Question, QuestionId, Survey, SurveyCatalog, SurveyId};
pub use config::{SurveyConfig, DEFAULT_SNAPSHOT_PATH};
pub use error::{Result, SurveyError, ValidationFailure};
pub use response::{Choice, InMemoryResponseStore, ResponseId, ResponseStore, SurveyResponse};
pub use scoring::{score_domain, DomainScore, ScoreGroup, ScoringScheme};
pub use service::{RateReport, SurveyService};
pub use snapshot::{
    FileSnapshotStore, InMemorySnapshotStore, Snapshot, SnapshotCodec, SnapshotStore,
    SNAPSHOT_FORMAT_VERSION,
};

//! ResponseStore - abstract CRUD storage for survey responses.

use crate::error::Result;

use super::{ResponseId, SurveyResponse};

/// Concurrency-safe CRUD over the response collection.
///
/// Every method is atomic with respect to the others: readers never see a
/// partially written response and writers never interleave. Implementations
/// are expected to favour readers (dashboards query far more often than
/// respondents submit).
pub trait ResponseStore: Send + Sync {
    /// Replace the response with the same id in place, or append it.
    /// Returns true if an existing response was replaced.
    fn upsert(&self, response: SurveyResponse) -> Result<bool>;

    /// Append a batch without checking for duplicate ids.
    fn bulk_append(&self, responses: Vec<SurveyResponse>) -> Result<()>;

    /// Swap the entire collection in one step.
    fn replace_all(&self, responses: Vec<SurveyResponse>) -> Result<()>;

    /// First response matching the predicate, in insertion order.
    fn find_first(&self, predicate: &dyn Fn(&SurveyResponse) -> bool)
        -> Result<Option<SurveyResponse>>;

    /// All responses matching the predicate, in insertion order.
    fn filter(&self, predicate: &dyn Fn(&SurveyResponse) -> bool) -> Result<Vec<SurveyResponse>>;

    /// Remove the response with the given id. Returns true if it existed.
    fn delete(&self, id: &ResponseId) -> Result<bool>;

    fn len(&self) -> Result<usize>;

    fn get(&self, id: &ResponseId) -> Result<Option<SurveyResponse>> {
        self.find_first(&|r| r.id == *id)
    }

    fn all(&self) -> Result<Vec<SurveyResponse>> {
        self.filter(&|_| true)
    }
}

//! SurveyCatalog - lock-guarded, loader-ordered survey list.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use crate::error::{Result, SurveyError};

use super::{QuestionId, Survey, SurveyId};

/// Read-mostly survey catalog. Clone-friendly via Arc.
///
/// Mutation only happens at load and restore, both of which run inside the
/// service's write lock, so the internal lock is only ever contended by readers.
#[derive(Clone, Default)]
pub struct SurveyCatalog {
    surveys: Arc<RwLock<Vec<Survey>>>,
}

impl SurveyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SurveyId) -> Result<Option<Survey>> {
        let surveys = self
            .surveys
            .read()
            .map_err(|_| SurveyError::LockPoisoned("catalog read"))?;
        Ok(surveys.iter().find(|s| s.id == id).cloned())
    }

    pub fn all(&self) -> Result<Vec<Survey>> {
        let surveys = self
            .surveys
            .read()
            .map_err(|_| SurveyError::LockPoisoned("catalog read"))?;
        Ok(surveys.clone())
    }

    pub fn question_ids(&self, id: SurveyId) -> Result<Option<BTreeSet<QuestionId>>> {
        let surveys = self
            .surveys
            .read()
            .map_err(|_| SurveyError::LockPoisoned("catalog read"))?;
        Ok(surveys.iter().find(|s| s.id == id).map(Survey::question_ids))
    }

    pub fn replace_all(&self, surveys: Vec<Survey>) -> Result<()> {
        let mut current = self
            .surveys
            .write()
            .map_err(|_| SurveyError::LockPoisoned("catalog write"))?;
        *current = surveys;
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        let surveys = self
            .surveys
            .read()
            .map_err(|_| SurveyError::LockPoisoned("catalog read"))?;
        Ok(surveys.len())
    }
}

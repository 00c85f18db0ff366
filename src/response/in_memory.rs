//! InMemoryResponseStore - Vec-backed response store.

use std::sync::RwLock;

use crate::error::{Result, SurveyError};

use super::{ResponseId, ResponseStore, SurveyResponse};

/// In-memory response store backed by a `Vec`, preserving insertion order.
///
/// Lookups are linear scans. Deliberately not `Clone`: whoever owns the
/// store is the only writer, and for a service that is the service itself.
#[derive(Default)]
pub struct InMemoryResponseStore {
    storage: RwLock<Vec<SurveyResponse>>,
}

impl InMemoryResponseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseStore for InMemoryResponseStore {
    fn upsert(&self, response: SurveyResponse) -> Result<bool> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| SurveyError::LockPoisoned("response write"))?;

        match storage.iter_mut().find(|r| r.id == response.id) {
            Some(existing) => {
                *existing = response;
                Ok(true)
            }
            None => {
                storage.push(response);
                Ok(false)
            }
        }
    }

    fn bulk_append(&self, responses: Vec<SurveyResponse>) -> Result<()> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| SurveyError::LockPoisoned("response write"))?;
        storage.extend(responses);
        Ok(())
    }

    fn replace_all(&self, responses: Vec<SurveyResponse>) -> Result<()> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| SurveyError::LockPoisoned("response write"))?;
        *storage = responses;
        Ok(())
    }

    fn find_first(
        &self,
        predicate: &dyn Fn(&SurveyResponse) -> bool,
    ) -> Result<Option<SurveyResponse>> {
        let storage = self
            .storage
            .read()
            .map_err(|_| SurveyError::LockPoisoned("response read"))?;
        Ok(storage.iter().find(|r| predicate(r)).cloned())
    }

    fn filter(&self, predicate: &dyn Fn(&SurveyResponse) -> bool) -> Result<Vec<SurveyResponse>> {
        let storage = self
            .storage
            .read()
            .map_err(|_| SurveyError::LockPoisoned("response read"))?;
        Ok(storage.iter().filter(|r| predicate(r)).cloned().collect())
    }

    fn delete(&self, id: &ResponseId) -> Result<bool> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| SurveyError::LockPoisoned("response write"))?;

        match storage.iter().position(|r| r.id == *id) {
            Some(index) => {
                storage.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn len(&self) -> Result<usize> {
        let storage = self
            .storage
            .read()
            .map_err(|_| SurveyError::LockPoisoned("response read"))?;
        Ok(storage.len())
    }
}

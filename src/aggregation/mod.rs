//! Aggregation Cache - incrementally maintained answer counts.
//!
//! For every (survey, question, answer) triple the cache holds the number of
//! eligible responses that chose that answer, and for every (survey, question)
//! pair the number of eligible responses that answered it at all. The counts
//! are derived state: [`AggregationCache::rebuild`] over the full response set
//! is the definition of correct, and the incremental path must always agree
//! with it.
//!
//! Counts only change through [`AggregationCache::apply`]. An update is a
//! decrement of the old version followed by an increment of the new one, never
//! an in-place edit.

mod eligible;

use std::collections::BTreeMap;

use crate::catalog::{AnswerId, QuestionId, Survey, SurveyId};
use crate::error::{Result, SurveyError};
use crate::response::SurveyResponse;

pub use eligible::EligibleTypes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    Increment,
    Decrement,
}

impl Delta {
    fn step(self, count: u64) -> Option<u64> {
        match self {
            Delta::Increment => count.checked_add(1),
            Delta::Decrement => count.checked_sub(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationCache {
    eligible: EligibleTypes,
    answer_counts: BTreeMap<(SurveyId, QuestionId, AnswerId), u64>,
    non_null_counts: BTreeMap<(SurveyId, QuestionId), u64>,
}

impl Default for AggregationCache {
    fn default() -> Self {
        Self::new(EligibleTypes::default())
    }
}

impl AggregationCache {
    /// An empty cache; nothing is trusted until [`reset`](Self::reset) runs.
    pub fn new(eligible: EligibleTypes) -> Self {
        Self {
            eligible,
            answer_counts: BTreeMap::new(),
            non_null_counts: BTreeMap::new(),
        }
    }

    pub fn eligible(&self) -> &EligibleTypes {
        &self.eligible
    }

    /// Zero every triple and pair the catalog knows about, dropping anything else.
    pub fn reset(&mut self, catalog: &[Survey]) {
        self.answer_counts.clear();
        self.non_null_counts.clear();

        for survey in catalog {
            for question_id in survey.questions.keys() {
                self.non_null_counts.insert((survey.id, *question_id), 0);
                for answer_id in survey.answers.keys() {
                    self.answer_counts
                        .insert((survey.id, *question_id, *answer_id), 0);
                }
            }
        }
    }

    /// Reset, then replay every response as an increment, in order.
    pub fn rebuild(
        eligible: EligibleTypes,
        catalog: &[Survey],
        responses: &[SurveyResponse],
    ) -> Result<Self> {
        let mut cache = Self::new(eligible);
        cache.reset(catalog);
        for response in responses {
            cache.apply(Delta::Increment, response)?;
        }
        Ok(cache)
    }

    /// Verify that `apply(delta, response)` would succeed, without mutating.
    ///
    /// Every affected key must already be initialized, and a decrement must
    /// not take any count below zero.
    pub fn check(&self, delta: Delta, response: &SurveyResponse) -> Result<()> {
        if !self.eligible.contains(&response.response_type) {
            return Ok(());
        }

        let survey_id = response.survey_id;
        for (question_id, answer_id) in response.answered() {
            let pair = self
                .non_null_counts
                .get(&(survey_id, question_id))
                .copied()
                .ok_or(SurveyError::CacheInconsistency {
                    survey_id,
                    question_id,
                    answer_id: None,
                })?;
            let triple = self
                .answer_counts
                .get(&(survey_id, question_id, answer_id))
                .copied()
                .ok_or(SurveyError::CacheInconsistency {
                    survey_id,
                    question_id,
                    answer_id: Some(answer_id),
                })?;

            if delta.step(pair).is_none() || delta.step(triple).is_none() {
                return Err(SurveyError::CacheInconsistency {
                    survey_id,
                    question_id,
                    answer_id: Some(answer_id),
                });
            }
        }
        Ok(())
    }

    /// Move the counts of every answered question in `response` by one.
    ///
    /// Ineligible response types are a no-op. All-or-nothing: on error no
    /// count has changed.
    pub fn apply(&mut self, delta: Delta, response: &SurveyResponse) -> Result<()> {
        self.check(delta, response)?;
        if !self.eligible.contains(&response.response_type) {
            return Ok(());
        }

        let survey_id = response.survey_id;
        for (question_id, answer_id) in response.answered() {
            // check() guarantees both keys exist and the step cannot wrap
            if let Some(count) = self.non_null_counts.get_mut(&(survey_id, question_id)) {
                *count = delta.step(*count).unwrap_or(*count);
            }
            if let Some(count) = self
                .answer_counts
                .get_mut(&(survey_id, question_id, answer_id))
            {
                *count = delta.step(*count).unwrap_or(*count);
            }
        }
        Ok(())
    }

    pub fn answer_count(&self, survey_id: SurveyId, question_id: QuestionId, answer_id: AnswerId) -> u64 {
        self.answer_counts
            .get(&(survey_id, question_id, answer_id))
            .copied()
            .unwrap_or(0)
    }

    /// `None` when the pair was never initialized, as opposed to `Some(0)`.
    pub fn non_null_count(&self, survey_id: SurveyId, question_id: QuestionId) -> Option<u64> {
        self.non_null_counts.get(&(survey_id, question_id)).copied()
    }

    /// Answer counts for one question, ascending by answer id.
    pub fn answer_counts_for(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
    ) -> Vec<(AnswerId, u64)> {
        self.answer_counts
            .range((survey_id, question_id, AnswerId::MIN)..=(survey_id, question_id, AnswerId::MAX))
            .map(|((_, _, answer_id), count)| (*answer_id, *count))
            .collect()
    }
}

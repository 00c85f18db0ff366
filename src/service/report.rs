//! Answer-rate reports, from the cache or from a full scan.

use serde::{Deserialize, Serialize};

use crate::aggregation::AggregationCache;
use crate::catalog::{AnswerId, QuestionId, Survey, SurveyId};
use crate::error::{Result, SurveyError};
use crate::response::ResponseStore;

use super::SurveyService;

/// Percentage of answering respondents that chose each answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateReport {
    pub survey_id: SurveyId,
    pub question_id: QuestionId,
    pub dimension_name: String,
    pub measure_name: String,
    pub dimension_values: Vec<AnswerId>,
    pub measure_values: Vec<f64>,
}

/// One report per question with a known, non-zero denominator.
fn rates(survey: &Survey, cache: &AggregationCache) -> Vec<RateReport> {
    survey
        .questions
        .keys()
        .filter_map(|question_id| {
            let answered = cache.non_null_count(survey.id, *question_id)?;
            if answered == 0 {
                return None;
            }
            let (dimension_values, measure_values) = cache
                .answer_counts_for(survey.id, *question_id)
                .into_iter()
                .map(|(answer_id, count)| (answer_id, 100.0 * count as f64 / answered as f64))
                .unzip();

            Some(RateReport {
                survey_id: survey.id,
                question_id: *question_id,
                dimension_name: "answer".to_string(),
                measure_name: "percentage".to_string(),
                dimension_values,
                measure_values,
            })
        })
        .collect()
}

impl<S: ResponseStore> SurveyService<S> {
    /// Rates from the incrementally maintained cache.
    pub fn report_rates(&self, survey_id: SurveyId) -> Result<Vec<RateReport>> {
        let cache = self.read_gate()?;
        let survey = self
            .catalog
            .get(survey_id)?
            .ok_or(SurveyError::SurveyNotFound(survey_id))?;
        Ok(rates(&survey, &cache))
    }

    /// Rates recomputed by scanning every stored response of the survey.
    pub fn report_rates_live(&self, survey_id: SurveyId) -> Result<Vec<RateReport>> {
        let (survey, responses, eligible) = {
            let cache = self.read_gate()?;
            let survey = self
                .catalog
                .get(survey_id)?
                .ok_or(SurveyError::SurveyNotFound(survey_id))?;
            let responses = self.responses.filter(&|r| r.survey_id == survey_id)?;
            (survey, responses, cache.eligible().clone())
        };

        let scanned =
            AggregationCache::rebuild(eligible, std::slice::from_ref(&survey), &responses)?;
        Ok(rates(&survey, &scanned))
    }
}

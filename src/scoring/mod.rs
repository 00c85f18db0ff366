//! Domain scoring - summed, optionally reverse-keyed item scores per group.
//!
//! A [`ScoringScheme`] says which questions belong to which named group, which
//! of them are reverse-keyed, and the top of the 1-based answer scale. Scoring
//! one respondent picks a single response (the scheme's preferred type if
//! present, otherwise the first), sums each group, and normalizes the sum to
//! `[0, 1]` between the group's minimum and maximum possible totals.

mod big_five;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{QuestionId, Survey, SurveyId};
use crate::error::{Result, SurveyError};
use crate::response::{Choice, ResponseId, SurveyResponse};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreGroup {
    pub name: String,
    pub items: Vec<QuestionId>,
}

impl ScoreGroup {
    pub fn new(name: impl Into<String>, items: impl IntoIterator<Item = QuestionId>) -> Self {
        Self {
            name: name.into(),
            items: items.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringScheme {
    scale_max: u32,
    preferred_type: String,
    groups: Vec<ScoreGroup>,
    reversed: BTreeSet<QuestionId>,
}

impl ScoringScheme {
    pub fn new(
        scale_max: u32,
        preferred_type: impl Into<String>,
        groups: Vec<ScoreGroup>,
        reversed: impl IntoIterator<Item = QuestionId>,
    ) -> Result<Self> {
        if scale_max < 2 {
            return Err(SurveyError::Scheme(format!(
                "scale maximum must be at least 2, got {scale_max}"
            )));
        }
        if groups.is_empty() {
            return Err(SurveyError::Scheme("no score groups".into()));
        }
        if let Some(empty) = groups.iter().find(|g| g.items.is_empty()) {
            return Err(SurveyError::Scheme(format!("group {} has no items", empty.name)));
        }

        let reversed: BTreeSet<QuestionId> = reversed.into_iter().collect();
        let grouped: BTreeSet<QuestionId> =
            groups.iter().flat_map(|g| g.items.iter().copied()).collect();
        if let Some(stray) = reversed.iter().find(|q| !grouped.contains(q)) {
            return Err(SurveyError::Scheme(format!(
                "reversed item {stray} is not in any group"
            )));
        }

        Ok(Self {
            scale_max,
            preferred_type: preferred_type.into(),
            groups,
            reversed,
        })
    }

    pub fn scale_max(&self) -> u32 {
        self.scale_max
    }

    pub fn preferred_type(&self) -> &str {
        &self.preferred_type
    }

    pub fn groups(&self) -> &[ScoreGroup] {
        &self.groups
    }

    pub fn is_reversed(&self, question_id: QuestionId) -> bool {
        self.reversed.contains(&question_id)
    }

    fn median(&self) -> f64 {
        (1.0 + f64::from(self.scale_max)) / 2.0
    }

    /// Item value after median substitution and reverse keying.
    fn item_value(&self, survey: &Survey, response: &SurveyResponse, question_id: QuestionId) -> f64 {
        let raw = match response.choice(question_id) {
            Some(Choice::Answered(answer_id)) => survey
                .answer(answer_id)
                .map(|a| f64::from(a.value))
                .unwrap_or_else(|| self.median()),
            Some(Choice::Unanswered) | None => self.median(),
        };

        if self.is_reversed(question_id) {
            f64::from(self.scale_max) - raw + 1.0
        } else {
            raw
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    pub survey_id: SurveyId,
    pub respondent_id: String,
    pub response_id: ResponseId,
    pub categories: Vec<String>,
    pub scores: Vec<f64>,
}

/// Score one respondent's response to `survey` under `scheme`.
///
/// `responses` may contain other respondents or surveys; only the matching
/// ones are considered. Scores are clamped to `[0, 1]` so answer ordinals
/// outside the scale cannot escape the range.
pub fn score_domain(
    survey: &Survey,
    responses: &[SurveyResponse],
    respondent: &str,
    scheme: &ScoringScheme,
) -> Result<DomainScore> {
    let mut candidates = responses
        .iter()
        .filter(|r| r.survey_id == survey.id && r.respondent == respondent);
    let chosen = candidates
        .clone()
        .find(|r| r.response_type == scheme.preferred_type)
        .or_else(|| candidates.next())
        .ok_or_else(|| SurveyError::NoEligibleResponse {
            survey_id: survey.id,
            respondent: respondent.to_string(),
        })?;

    let scale_max = f64::from(scheme.scale_max);
    let mut categories = Vec::with_capacity(scheme.groups.len());
    let mut scores = Vec::with_capacity(scheme.groups.len());

    for group in &scheme.groups {
        let sum: f64 = group
            .items
            .iter()
            .map(|q| scheme.item_value(survey, chosen, *q))
            .sum();
        let n = group.items.len() as f64;
        let (min_sum, max_sum) = (n, n * scale_max);

        categories.push(group.name.clone());
        scores.push(((sum - min_sum) / (max_sum - min_sum)).clamp(0.0, 1.0));
    }

    Ok(DomainScore {
        survey_id: survey.id,
        respondent_id: chosen.respondent.clone(),
        response_id: chosen.id,
        categories,
        scores,
    })
}

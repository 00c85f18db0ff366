use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{AnswerId, QuestionId, SurveyId};

pub type Result<T> = std::result::Result<T, SurveyError>;

/// Why a response was rejected before any mutation happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("survey {0} is not in the catalog")]
    UnknownSurvey(SurveyId),

    #[error("question set mismatch (missing {missing:?}, unexpected {unexpected:?})")]
    QuestionMismatch {
        missing: Vec<QuestionId>,
        unexpected: Vec<QuestionId>,
    },

    #[error("question {question_id} answered with unknown answer {answer_id}")]
    UnknownAnswer {
        question_id: QuestionId,
        answer_id: AnswerId,
    },
}

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("invalid response {response_id}: {failure}")]
    Validation {
        response_id: Uuid,
        failure: ValidationFailure,
    },

    #[error("response not found: {0}")]
    NotFound(Uuid),

    #[error("survey not found: {0}")]
    SurveyNotFound(SurveyId),

    #[error(
        "aggregation cache inconsistent at survey {survey_id} question {question_id} (answer {answer_id:?})"
    )]
    CacheInconsistency {
        survey_id: SurveyId,
        question_id: QuestionId,
        answer_id: Option<AnswerId>,
    },

    #[error("snapshot serialization error: {0}")]
    Serialization(String),

    #[error("snapshot storage error: {0}")]
    StorageIo(#[from] std::io::Error),

    #[error("no eligible response for respondent {respondent} in survey {survey_id}")]
    NoEligibleResponse {
        survey_id: SurveyId,
        respondent: String,
    },

    #[error("invalid scoring scheme: {0}")]
    Scheme(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

impl SurveyError {
    pub(crate) fn validation(response_id: Uuid, failure: ValidationFailure) -> Self {
        SurveyError::Validation {
            response_id,
            failure,
        }
    }

    /// True for the negative-result kinds a caller reports as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SurveyError::NotFound(_) | SurveyError::SurveyNotFound(_)
        )
    }
}

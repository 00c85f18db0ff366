//! Survey responses and the store that holds them.
//!
//! A response maps every question of its survey to a [`Choice`]. The shape is
//! only checked when the service validates it, so partially built responses
//! are fine until then.

mod in_memory;
mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{AnswerId, QuestionId, SurveyId};

pub use in_memory::InMemoryResponseStore;
pub use store::ResponseStore;

pub type ResponseId = Uuid;

/// The answer recorded for one question.
///
/// A question id missing from [`SurveyResponse::answers`] is a third state
/// ("never presented") that validation rejects; `Unanswered` is "presented,
/// nothing selected". Serialized as `null` / answer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<AnswerId>", into = "Option<AnswerId>")]
pub enum Choice {
    Unanswered,
    Answered(AnswerId),
}

impl Choice {
    pub fn answer_id(self) -> Option<AnswerId> {
        match self {
            Choice::Answered(id) => Some(id),
            Choice::Unanswered => None,
        }
    }

    pub fn is_answered(self) -> bool {
        matches!(self, Choice::Answered(_))
    }
}

impl From<Option<AnswerId>> for Choice {
    fn from(value: Option<AnswerId>) -> Self {
        match value {
            Some(id) => Choice::Answered(id),
            None => Choice::Unanswered,
        }
    }
}

impl From<Choice> for Option<AnswerId> {
    fn from(choice: Choice) -> Self {
        choice.answer_id()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub id: ResponseId,
    /// Not unique: one respondent usually has a "pre" and a "post" response.
    pub respondent: String,
    pub survey_id: SurveyId,
    pub response_type: String,
    pub answers: BTreeMap<QuestionId, Choice>,
}

impl SurveyResponse {
    /// Create a response with a freshly generated identity.
    pub fn new(
        respondent: impl Into<String>,
        survey_id: SurveyId,
        response_type: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            respondent: respondent.into(),
            survey_id,
            response_type: response_type.into(),
            answers: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: ResponseId) -> Self {
        self.id = id;
        self
    }

    pub fn answer(mut self, question_id: QuestionId, answer_id: AnswerId) -> Self {
        self.answers.insert(question_id, Choice::Answered(answer_id));
        self
    }

    pub fn skip(mut self, question_id: QuestionId) -> Self {
        self.answers.insert(question_id, Choice::Unanswered);
        self
    }

    pub fn choice(&self, question_id: QuestionId) -> Option<Choice> {
        self.answers.get(&question_id).copied()
    }

    /// (question, answer) pairs for every answered question, in question order.
    pub fn answered(&self) -> impl Iterator<Item = (QuestionId, AnswerId)> + '_ {
        self.answers
            .iter()
            .filter_map(|(q, c)| c.answer_id().map(|a| (*q, a)))
    }
}

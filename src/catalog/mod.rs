//! Survey Catalog - survey, question, and answer definitions.
//!
//! Surveys are loaded once at startup and replaced wholesale only by a
//! snapshot restore. Question and answer ids are dense (`1..=N`) within a
//! survey, so both maps iterate in id order.
//!
//! ## Example
//!
//! ```ignore
//! use survey_store::{Answer, Question, Survey, SurveyCatalog};
//!
//! let survey = Survey::new(1, "Big Five", "I see myself as")
//!     .with_question(Question::new(1, "talkative", "Is talkative"))
//!     .with_answer(Answer::new(1, "Disagree strongly", 1));
//!
//! let catalog = SurveyCatalog::new();
//! catalog.replace_all(vec![survey])?;
//! let loaded = catalog.get(1)?;
//! ```

mod in_memory;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub use in_memory::SurveyCatalog;

pub type SurveyId = u32;
pub type QuestionId = u32;
pub type AnswerId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub short_wording: String,
    pub full_wording: String,
}

impl Question {
    pub fn new(
        id: QuestionId,
        short_wording: impl Into<String>,
        full_wording: impl Into<String>,
    ) -> Self {
        Self {
            id,
            short_wording: short_wording.into(),
            full_wording: full_wording.into(),
        }
    }
}

/// An answer choice. `value` is the ordinal used for scoring, never identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub label: String,
    pub value: i32,
}

impl Answer {
    pub fn new(id: AnswerId, label: impl Into<String>, value: i32) -> Self {
        Self {
            id,
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    pub id: SurveyId,
    pub name: String,
    pub group: String,
    pub questions: BTreeMap<QuestionId, Question>,
    pub answers: BTreeMap<AnswerId, Answer>,
}

impl Survey {
    pub fn new(id: SurveyId, name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            group: group.into(),
            questions: BTreeMap::new(),
            answers: BTreeMap::new(),
        }
    }

    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.insert(question.id, question);
        self
    }

    pub fn with_answer(mut self, answer: Answer) -> Self {
        self.answers.insert(answer.id, answer);
        self
    }

    pub fn question_ids(&self) -> BTreeSet<QuestionId> {
        self.questions.keys().copied().collect()
    }

    pub fn answer(&self, id: AnswerId) -> Option<&Answer> {
        self.answers.get(&id)
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The response types that count toward aggregate statistics.
///
/// Defaults to `{"post"}`: only post-survey responses feed the rate charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EligibleTypes(BTreeSet<String>);

impl EligibleTypes {
    pub const DEFAULT_TYPE: &'static str = "post";

    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(types.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, response_type: &str) -> bool {
        self.0.contains(response_type)
    }
}

impl Default for EligibleTypes {
    fn default() -> Self {
        Self::new([Self::DEFAULT_TYPE])
    }
}

//! The 44-item Big Five Inventory key.

use super::{ScoreGroup, ScoringScheme};

const EXTRAVERSION: [u32; 8] = [1, 6, 11, 16, 21, 26, 31, 36];
const AGREEABLENESS: [u32; 9] = [2, 7, 12, 17, 22, 27, 32, 37, 42];
const CONSCIENTIOUSNESS: [u32; 9] = [3, 8, 13, 18, 23, 28, 33, 38, 43];
const NEUROTICISM: [u32; 8] = [4, 9, 14, 19, 24, 29, 34, 39];
const OPENNESS: [u32; 10] = [5, 10, 15, 20, 25, 30, 35, 40, 41, 44];

const REVERSED: [u32; 16] = [2, 6, 8, 9, 12, 18, 21, 23, 24, 27, 31, 34, 35, 37, 41, 43];

impl ScoringScheme {
    /// Five categories on a 1-5 agreement scale, preferring "post" responses.
    pub fn big_five() -> Self {
        Self {
            scale_max: 5,
            preferred_type: "post".to_string(),
            groups: vec![
                ScoreGroup::new("Extraversion", EXTRAVERSION),
                ScoreGroup::new("Agreeableness", AGREEABLENESS),
                ScoreGroup::new("Conscientiousness", CONSCIENTIOUSNESS),
                ScoreGroup::new("Neuroticism", NEUROTICISM),
                ScoreGroup::new("Openness", OPENNESS),
            ],
            reversed: REVERSED.into_iter().collect(),
        }
    }
}

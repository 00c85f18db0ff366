//! Cache and store stay in step over long mutation sequences.

use survey_store::{AggregationCache, EligibleTypes, ResponseId, SurveyResponse};

use crate::support;

/// Small deterministic generator so failures replay identically.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u32) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) % u64::from(bound)) as u32
    }
}

const TYPES: [&str; 3] = ["pre", "post", "new"];

fn random_response(rng: &mut Lcg, respondent: &str) -> SurveyResponse {
    let kind = TYPES[rng.next(3) as usize];
    if rng.next(2) == 0 {
        let response = SurveyResponse::new(respondent, 1, kind);
        match rng.next(3) {
            0 => response.skip(1),
            n => response.answer(1, n),
        }
    } else {
        (1..=2).fold(SurveyResponse::new(respondent, 2, kind), |r, q| match rng.next(6) {
            0 => r.skip(q),
            n => r.answer(q, n),
        })
    }
}

#[test]
fn mixed_operations_match_a_rebuild() {
    let service = support::service();
    let mut rng = Lcg(7);
    let mut live: Vec<ResponseId> = Vec::new();

    for step in 0..300 {
        match rng.next(4) {
            0 | 1 => {
                let response = random_response(&mut rng, &format!("u{step:03}"));
                live.push(response.id);
                service.create(response).unwrap();
            }
            2 if !live.is_empty() => {
                let id = live[rng.next(live.len() as u32) as usize];
                let current = service.response(&id).unwrap().unwrap();
                let replacement = random_response(&mut rng, &current.respondent);
                // keep the id and survey so update replaces in place
                let replacement = SurveyResponse {
                    id,
                    survey_id: current.survey_id,
                    answers: if replacement.survey_id == current.survey_id {
                        replacement.answers
                    } else {
                        current.answers
                    },
                    ..replacement
                };
                assert!(service.update(replacement).unwrap());
            }
            3 if !live.is_empty() => {
                let id = live.swap_remove(rng.next(live.len() as u32) as usize);
                service.delete(&id).unwrap();
            }
            _ => {}
        }

        if step % 50 == 0 {
            assert!(service.verify_cache().unwrap(), "diverged at step {step}");
        }
    }

    let snapshot = service.snapshot().unwrap();
    let rebuilt =
        AggregationCache::rebuild(EligibleTypes::default(), &snapshot.surveys, &snapshot.responses)
            .unwrap();
    assert_eq!(service.cache_state().unwrap(), rebuilt);
}

#[test]
fn rejected_operations_do_not_drift_the_cache() {
    let service = support::service();
    let before = service.cache_state().unwrap();

    for _ in 0..20 {
        let _ = service.create(SurveyResponse::new("x", 2, "post").answer(1, 1));
        let _ = service.create(SurveyResponse::new("x", 1, "post").answer(1, 42));
        let _ = service.delete(&unknown_id());
    }

    assert_eq!(service.cache_state().unwrap(), before);
    assert!(service.verify_cache().unwrap());
}

fn unknown_id() -> ResponseId {
    SurveyResponse::new("ghost", 1, "post").id
}

#[test]
fn counts_match_the_worked_example_after_churn() {
    let service = support::service();
    let ids: Vec<_> = (0..4)
        .map(|i| {
            let response = SurveyResponse::new(format!("w{i}"), 1, "post").answer(1, 1);
            let id = response.id;
            service.create(response).unwrap();
            id
        })
        .collect();

    service.delete(&ids[0]).unwrap();
    service
        .update(SurveyResponse::new("w1", 1, "post").with_id(ids[1]).skip(1))
        .unwrap();

    // sample "post" answered 2; w2 and w3 answered 1; w1 skipped
    assert_eq!(service.answer_count(1, 1, 1).unwrap(), 2);
    assert_eq!(service.answer_count(1, 1, 2).unwrap(), 1);
    assert_eq!(service.non_null_count(1, 1).unwrap(), Some(3));

    let reports = service.report_rates(1).unwrap();
    assert_eq!(reports.len(), 1);
    assert!((reports[0].measure_values[0] - 66.67).abs() < 0.01);
    assert!((reports[0].measure_values[1] - 33.33).abs() < 0.01);
    assert_eq!(reports, service.report_rates_live(1).unwrap());
}

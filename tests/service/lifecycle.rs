//! Response lifecycle: absent -> present -> present -> absent.

use survey_store::{
    Choice, InMemorySnapshotStore, SurveyConfig, SurveyError, SurveyResponse, SurveyService,
    ValidationFailure,
};

use crate::support;

#[test]
fn load_installs_catalog_and_counts() {
    let service = support::service();

    assert_eq!(service.surveys().unwrap().len(), 3);
    assert_eq!(service.responses_for("Shawn").unwrap().len(), 2);
    // only the "post" response for survey 1 is counted
    assert_eq!(service.answer_count(1, 1, 2).unwrap(), 1);
    assert_eq!(service.non_null_count(1, 1).unwrap(), Some(1));
    assert_eq!(service.non_null_count(2, 2).unwrap(), Some(1));
    assert!(service.verify_cache().unwrap());
}

fn empty_service() -> SurveyService {
    SurveyService::with_parts(SurveyConfig::default(), InMemorySnapshotStore::new())
}

#[test]
fn service_builds_and_owns_its_store() {
    let service = empty_service();
    assert!(service.responses_where(&|_| true).unwrap().is_empty());

    service
        .load(support::surveys(), support::sample_responses())
        .unwrap();
    service
        .create(SurveyResponse::new("u00", 1, "post").answer(1, 1))
        .unwrap();

    // the service hands out copies only, never the store
    let mut copies = service.responses_for("u00").unwrap();
    copies[0].answers.insert(1, Choice::Answered(2));
    assert_eq!(service.responses_for("u00").unwrap()[0].choice(1), Some(Choice::Answered(1)));
    assert_eq!(service.responses_where(&|_| true).unwrap().len(), 7);
    assert!(service.verify_cache().unwrap());
}

#[test]
fn load_rejects_responses_that_do_not_fit() {
    let service = empty_service();
    let ghost = SurveyResponse::new("ghost", 99, "pre").answer(7, 42);

    let err = service
        .load(support::surveys(), vec![ghost.clone()])
        .unwrap_err();
    assert!(matches!(
        err,
        SurveyError::Validation {
            response_id,
            failure: ValidationFailure::UnknownSurvey(99),
        } if response_id == ghost.id
    ));
    assert!(service.surveys().unwrap().is_empty());
    assert!(service.response(&ghost.id).unwrap().is_none());
}

#[test]
fn reload_cannot_orphan_stored_responses() {
    let service = support::service();

    // survey 2 responses are already stored
    let err = service.load(vec![support::test_survey()], Vec::new()).unwrap_err();
    assert!(matches!(
        err,
        SurveyError::Validation {
            failure: ValidationFailure::UnknownSurvey(2),
            ..
        }
    ));
    assert_eq!(service.surveys().unwrap().len(), 3);
    assert!(service.verify_cache().unwrap());
}

#[test]
fn create_then_fetch() {
    let service = support::service();
    let response = SurveyResponse::new("u00", 2, "post").answer(1, 3).skip(2);

    assert!(!service.create(response.clone()).unwrap());

    let stored = service.response(&response.id).unwrap().unwrap();
    assert_eq!(stored, response);
    assert_eq!(service.answer_count(2, 1, 3).unwrap(), 1);
}

#[test]
fn update_replaces_payload_and_moves_counts() {
    let service = support::service();
    let mut response = SurveyResponse::new("u00", 2, "post").answer(1, 1).answer(2, 3);
    service.create(response.clone()).unwrap();

    response.answers.insert(1, Choice::Unanswered);
    response.answers.insert(2, Choice::Answered(4));
    assert!(service.update(response.clone()).unwrap());

    let stored = service.response(&response.id).unwrap().unwrap();
    assert_eq!(stored.choice(1), Some(Choice::Unanswered));
    assert_eq!(stored.choice(2), Some(Choice::Answered(4)));
    assert_eq!(service.responses_where(&|r| r.id == response.id).unwrap().len(), 1);

    // sample data already holds one post response answering 2 to q1, 1 to q2
    assert_eq!(service.answer_count(2, 1, 1).unwrap(), 0);
    assert_eq!(service.non_null_count(2, 1).unwrap(), Some(1));
    assert_eq!(service.answer_count(2, 2, 3).unwrap(), 0);
    assert_eq!(service.answer_count(2, 2, 4).unwrap(), 1);
    assert!(service.verify_cache().unwrap());
}

#[test]
fn update_of_unknown_id_creates() {
    let service = support::service();
    let response = SurveyResponse::new("late", 1, "post").answer(1, 1);

    assert!(!service.update(response.clone()).unwrap());
    assert!(service.response(&response.id).unwrap().is_some());
}

#[test]
fn update_changing_type_leaves_the_cache() {
    let service = support::service();
    let mut response = SurveyResponse::new("u00", 1, "post").answer(1, 1);
    service.create(response.clone()).unwrap();
    assert_eq!(service.answer_count(1, 1, 1).unwrap(), 1);

    response.response_type = "pre".into();
    service.update(response).unwrap();
    assert_eq!(service.answer_count(1, 1, 1).unwrap(), 0);
    assert!(service.verify_cache().unwrap());
}

#[test]
fn delete_then_lookup() {
    let service = support::service();
    let response = SurveyResponse::new("u00", 1, "post").answer(1, 1);
    service.create(response.clone()).unwrap();
    assert_eq!(service.answer_count(1, 1, 1).unwrap(), 1);
    assert_eq!(service.non_null_count(1, 1).unwrap(), Some(2));

    let removed = service.delete(&response.id).unwrap();
    assert_eq!(removed, response);
    assert!(service.response(&response.id).unwrap().is_none());
    assert_eq!(service.answer_count(1, 1, 1).unwrap(), 0);
    assert_eq!(service.non_null_count(1, 1).unwrap(), Some(1));

    let err = service.delete(&response.id).unwrap_err();
    assert!(matches!(err, SurveyError::NotFound(id) if id == response.id));
    assert_eq!(service.non_null_count(1, 1).unwrap(), Some(1));
}

#[test]
fn missing_question_is_rejected_without_side_effects() {
    let service = support::service();
    let before = service.cache_state().unwrap();
    let response = SurveyResponse::new("u00", 2, "post").answer(1, 1);

    assert!(!service.is_valid(&response));
    let err = service.create(response.clone()).unwrap_err();
    match err {
        SurveyError::Validation {
            failure: ValidationFailure::QuestionMismatch { missing, unexpected },
            ..
        } => {
            assert_eq!(missing, vec![2]);
            assert!(unexpected.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(service.response(&response.id).unwrap().is_none());
    assert_eq!(service.cache_state().unwrap(), before);
}

#[test]
fn extra_question_is_rejected() {
    let service = support::service();
    let response = SurveyResponse::new("u00", 1, "post").answer(1, 1).answer(9, 1);

    assert!(!service.is_valid(&response));
    assert!(matches!(
        service.create(response).unwrap_err(),
        SurveyError::Validation {
            failure: ValidationFailure::QuestionMismatch { .. },
            ..
        }
    ));
}

#[test]
fn unknown_survey_is_rejected() {
    let service = support::service();
    let response = SurveyResponse::new("u00", 77, "post").answer(1, 1);

    assert!(!service.is_valid(&response));
    assert!(matches!(
        service.update(response).unwrap_err(),
        SurveyError::Validation {
            failure: ValidationFailure::UnknownSurvey(77),
            ..
        }
    ));
}

#[test]
fn unknown_answer_id_is_rejected_but_shape_is_valid() {
    let service = support::service();
    let before = service.cache_state().unwrap();
    let response = SurveyResponse::new("u00", 1, "post").answer(1, 9);

    assert!(service.is_valid(&response));
    assert!(matches!(
        service.create(response.clone()).unwrap_err(),
        SurveyError::Validation {
            failure: ValidationFailure::UnknownAnswer {
                question_id: 1,
                answer_id: 9
            },
            ..
        }
    ));
    assert!(service.response(&response.id).unwrap().is_none());
    assert_eq!(service.cache_state().unwrap(), before);
}

#[test]
fn invalid_update_keeps_previous_version() {
    let service = support::service();
    let response = SurveyResponse::new("u00", 2, "post").answer(1, 1).answer(2, 2);
    service.create(response.clone()).unwrap();

    let mut broken = response.clone();
    broken.answers.remove(&2);
    assert!(service.update(broken).is_err());

    assert_eq!(service.response(&response.id).unwrap().unwrap(), response);
    assert_eq!(service.answer_count(2, 2, 2).unwrap(), 1);
}

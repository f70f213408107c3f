//! Tests for the claim assessment service

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use domain_claims::{
    ClaimAssessmentService, ClaimError, ClaimSession, PromptTemplate, Report, SessionStage,
};
use test_utils::{
    AnswerFixtures, ClaimFixtures, FailingReportRenderer, ImageFixtures, JsonReportRenderer,
    ScriptedVisionModel, TestClaimBuilder,
};

fn service_with(model: Arc<ScriptedVisionModel>) -> ClaimAssessmentService {
    ClaimAssessmentService::new(model, Arc::new(JsonReportRenderer))
}

#[tokio::test]
async fn test_rear_bumper_scenario() {
    let model = Arc::new(ScriptedVisionModel::answering(AnswerFixtures::sectioned()));
    let service = service_with(model.clone());
    let mut session = ClaimSession::new();

    service
        .submit(
            &mut session,
            ClaimFixtures::metadata(),
            "Rear bumper collision",
            vec![ImageFixtures::jpeg("rear-left.jpg"), ImageFixtures::png("rear-right.png")],
        )
        .unwrap();

    let run = service.analyze(&mut session).await.unwrap();
    assert_eq!(run.results.len(), 2);
    assert_eq!(model.call_count(), 2);

    let exported = service
        .export_report(&mut session, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        .unwrap();
    assert_eq!(exported.sheet_count, 3);
    assert_eq!(exported.file_name, "claim_C-100_20240301_120000.json");
    assert_eq!(exported.content_type, "application/json");

    let report: serde_json::Value = serde_json::from_slice(&exported.bytes).unwrap();
    assert_eq!(report["claim_id"], "C-100");
    assert_eq!(report["sheets"].as_array().unwrap().len(), 3);
    assert_eq!(session.stage(), SessionStage::ReportReady);
}

#[tokio::test]
async fn test_claim_without_images_makes_no_model_call() {
    let model = Arc::new(ScriptedVisionModel::answering("ok"));
    let service = service_with(model.clone());
    let mut session = ClaimSession::new();
    let builder = TestClaimBuilder::new();

    let result = service.submit(&mut session, builder.metadata(), builder.description(), Vec::new());

    assert!(matches!(result, Err(ClaimError::NoImages)));
    assert_eq!(session.stage(), SessionStage::New);
    assert!(service.analyze(&mut session).await.is_err());
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_rejected_submission_keeps_previous_claim() {
    let service = service_with(Arc::new(ScriptedVisionModel::answering("ok")));
    let mut session = ClaimSession::new();
    let builder = TestClaimBuilder::new().with_jpeg_images(1);
    service
        .submit(&mut session, builder.metadata(), builder.description(), builder.uploads())
        .unwrap();

    let result = service.submit(
        &mut session,
        builder.metadata(),
        "",
        vec![ImageFixtures::jpeg("x.jpg")],
    );

    assert!(matches!(result, Err(ClaimError::EmptyDescription)));
    assert_eq!(session.stage(), SessionStage::ImagesCollected);
    assert_eq!(session.claim().unwrap().image_count(), 1);
}

#[tokio::test]
async fn test_export_before_analysis_is_rejected() {
    let service = service_with(Arc::new(ScriptedVisionModel::answering("ok")));
    let mut session = ClaimSession::new();
    let builder = TestClaimBuilder::new().with_jpeg_images(1);
    service
        .submit(&mut session, builder.metadata(), builder.description(), builder.uploads())
        .unwrap();

    let result = service.export_report(&mut session, Utc::now());
    assert!(matches!(result, Err(ClaimError::InvalidStateTransition { .. })));
}

#[tokio::test]
async fn test_render_failure_keeps_claim_for_retry() {
    let model = Arc::new(ScriptedVisionModel::answering("ok"));
    let failing = ClaimAssessmentService::new(model.clone(), Arc::new(FailingReportRenderer));
    let working = service_with(model);
    let mut session = ClaimSession::new();
    let builder = TestClaimBuilder::new().with_jpeg_images(2);
    failing
        .submit(&mut session, builder.metadata(), builder.description(), builder.uploads())
        .unwrap();
    failing.analyze(&mut session).await.unwrap();

    let result = failing.export_report(&mut session, Utc::now());

    assert!(matches!(result, Err(ClaimError::ReportGeneration(_))));
    assert_eq!(session.stage(), SessionStage::Analyzed);
    assert_eq!(session.claim().unwrap().image_count(), 2);
    assert_eq!(session.analysis().unwrap().results.len(), 2);

    let retried = working.export_report(&mut session, Utc::now()).unwrap();
    assert_eq!(retried.sheet_count, 3);
}

#[tokio::test]
async fn test_export_is_repeatable_with_same_structure() {
    let service = service_with(Arc::new(ScriptedVisionModel::answering(AnswerFixtures::json())));
    let mut session = ClaimSession::new();
    let builder = TestClaimBuilder::new().with_jpeg_images(2);
    service
        .submit(&mut session, builder.metadata(), builder.description(), builder.uploads())
        .unwrap();
    service.analyze(&mut session).await.unwrap();
    let generated_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    let first = service.export_report(&mut session, generated_at).unwrap();
    let second = service.export_report(&mut session, generated_at).unwrap();

    let first: Report = serde_json::from_slice(&first.bytes).unwrap();
    let second: Report = serde_json::from_slice(&second.bytes).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_reset_clears_session() {
    let service = service_with(Arc::new(ScriptedVisionModel::answering("ok")));
    let mut session = ClaimSession::new();
    let builder = TestClaimBuilder::new().with_jpeg_images(1);
    service
        .submit(&mut session, builder.metadata(), builder.description(), builder.uploads())
        .unwrap();

    service.reset(&mut session);

    assert_eq!(session.stage(), SessionStage::New);
    assert!(session.claim().is_none());
}

#[tokio::test]
async fn test_custom_prompt_reaches_the_model() {
    let model = Arc::new(ScriptedVisionModel::answering("ok"));
    let service = service_with(model.clone())
        .with_prompt(PromptTemplate::new("Describe the damage. Claimant says: {description}"));
    let mut session = ClaimSession::new();

    service
        .submit(
            &mut session,
            ClaimFixtures::metadata(),
            "Hail on the roof",
            vec![ImageFixtures::jpeg("roof.jpg")],
        )
        .unwrap();
    service.analyze(&mut session).await.unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, "Describe the damage. Claimant says: Hail on the roof");
}

//! Property tests for the analysis pipeline
//!
//! For any valid claim: one result per image, in upload order, with failures
//! confined to the images whose calls failed.

use std::sync::Arc;

use chrono::Utc;
use proptest::prelude::*;

use domain_claims::{Claim, ClaimAssessmentService, ClaimSession, ReportBuilder};
use test_utils::{
    fake_claim_metadata, fake_description, uploads_with_failures_strategy, JsonReportRenderer,
    ScriptedVisionModel,
};

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_results_match_images_and_failures_stay_isolated(
        (uploads, failing) in uploads_with_failures_strategy(8)
    ) {
        let image_count = uploads.len();
        let failing_indices: Vec<usize> = failing
            .iter()
            .enumerate()
            .filter(|(_, fails)| **fails)
            .map(|(position, _)| position + 1)
            .collect();

        let model = Arc::new(ScriptedVisionModel::failing_on(failing_indices.clone(), "DAMAGE: dent"));
        let service = ClaimAssessmentService::new(model.clone(), Arc::new(JsonReportRenderer));
        let mut session = ClaimSession::new();
        service
            .submit(&mut session, fake_claim_metadata(), fake_description(), uploads)
            .unwrap();

        let run = block_on(service.analyze(&mut session)).unwrap().clone();

        prop_assert_eq!(model.call_count(), image_count);
        prop_assert_eq!(run.results.len(), image_count);
        for (position, result) in run.results.iter().enumerate() {
            let index = position + 1;
            prop_assert_eq!(result.image.index, index);
            prop_assert_eq!(result.is_success(), !failing_indices.contains(&index));
        }

        let claim = session.claim().unwrap();
        let report = ReportBuilder::build(claim, &run, Utc::now()).unwrap();
        prop_assert_eq!(report.sheet_count(), image_count + 1);
    }

    #[test]
    fn prop_claim_without_images_is_rejected(description in "[a-zA-Z ]{0,40}") {
        let result = Claim::submit(fake_claim_metadata(), description, Vec::new());
        prop_assert!(result.is_err());
    }
}

//! End-to-end tests for the HTTP API
//!
//! The router runs in-process under axum-test with a scripted vision model and
//! the real XLSX renderer.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::Value;

use domain_claims::{ClaimAssessmentService, ReportRenderer};
use infra_adapters::{XlsxReportRenderer, XLSX_CONTENT_TYPE};
use interface_api::{config::ApiConfig, create_router};
use test_utils::*;

fn server_with(model: Arc<ScriptedVisionModel>, renderer: Arc<dyn ReportRenderer>, config: ApiConfig) -> TestServer {
    let service = ClaimAssessmentService::new(model, renderer);
    TestServer::new(create_router(service, config)).unwrap()
}

fn server(model: Arc<ScriptedVisionModel>) -> TestServer {
    server_with(model, Arc::new(XlsxReportRenderer::new()), ApiConfig::default())
}

fn png_part(file_name: &str) -> Part {
    Part::bytes(ImageFixtures::png_bytes())
        .file_name(file_name)
        .mime_type("image/png")
}

fn jpeg_part(file_name: &str) -> Part {
    Part::bytes(ImageFixtures::jpeg_bytes())
        .file_name(file_name)
        .mime_type("image/jpeg")
}

fn claim_form() -> MultipartForm {
    MultipartForm::new()
        .add_text("claim_id", ClaimFixtures::claim_id())
        .add_text("policy_number", ClaimFixtures::policy_number())
        .add_text("incident_date", "2024-03-01")
        .add_text("description", ClaimFixtures::description())
}

fn rear_bumper_claim() -> MultipartForm {
    claim_form()
        .add_part("images", png_part("rear-1.png"))
        .add_part("images", jpeg_part("rear-2.jpg"))
}

// ============================================================================
// Pages
// ============================================================================

mod page_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let server = server(Arc::new(ScriptedVisionModel::answering("ok")));

        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], "llava");
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_form_page_is_served() {
        let server = server(Arc::new(ScriptedVisionModel::answering("ok")));

        let response = server.get("/").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("Claim Damage Assessment"));
        assert!(html.contains("name=\"images\""));
    }

    #[tokio::test]
    async fn test_new_session_is_empty() {
        let server = server(Arc::new(ScriptedVisionModel::answering("ok")));

        let body: Value = server.get("/api/v1/claim").await.json();

        assert_eq!(body["stage"], "NEW");
        assert!(body["claim"].is_null());
        assert!(body["analysis"].is_null());
    }
}

// ============================================================================
// Full claim flow
// ============================================================================

mod flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_rear_bumper_claim_end_to_end() {
        let model = Arc::new(ScriptedVisionModel::answering(AnswerFixtures::sectioned()));
        let server = server(model.clone());

        let submitted = server.post("/api/v1/claim").multipart(rear_bumper_claim()).await;
        submitted.assert_status(StatusCode::CREATED);
        let body: Value = submitted.json();
        assert_eq!(body["stage"], "IMAGES_COLLECTED");
        assert_eq!(body["claim"]["claim_id"], "C-100");
        assert_eq!(body["claim"]["incident_date"], "2024-03-01");
        assert_eq!(body["claim"]["images"].as_array().map(Vec::len), Some(2));
        assert_eq!(model.call_count(), 0);

        let analysis = server.post("/api/v1/claim/analysis").await;
        analysis.assert_status_ok();
        let run: Value = analysis.json();
        assert_eq!(model.call_count(), 2);
        assert_eq!(run["succeeded"], 2);
        assert_eq!(run["failed"], 0);
        assert_eq!(run["results"][0]["file_name"], "rear-1.png");
        assert_eq!(run["results"][1]["file_name"], "rear-2.jpg");
        assert_eq!(run["results"][0]["severity"], "Moderate");

        let report = server.get("/api/v1/claim/report").await;
        report.assert_status_ok();
        assert_eq!(report.header("content-type"), XLSX_CONTENT_TYPE);
        let disposition = report.header("content-disposition");
        let disposition = disposition.to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"claim_C-100_"));
        assert!(disposition.ends_with(".xlsx\""));

        let bytes = report.as_bytes();
        assert_eq!(
            xlsx_sheet_names(bytes),
            vec!["Claim Summary", "Image 1 - rear-1", "Image 2 - rear-2"]
        );
        assert_eq!(xlsx_field(bytes, "Claim Summary", "Claim ID").as_deref(), Some("C-100"));
        assert_eq!(
            xlsx_field(bytes, "Claim Summary", "Description").as_deref(),
            Some("Rear bumper collision")
        );

        let session: Value = server.get("/api/v1/claim").await.json();
        assert_eq!(session["stage"], "REPORT_READY");
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_image_does_not_stop_the_others() {
        let model = Arc::new(ScriptedVisionModel::failing_on([1], AnswerFixtures::sectioned()));
        let server = server(model.clone());
        server.post("/api/v1/claim").multipart(rear_bumper_claim()).await;

        let run: Value = server.post("/api/v1/claim/analysis").await.json();

        assert_eq!(model.call_count(), 2);
        assert_eq!(run["results"][0]["status"], "failed");
        assert!(run["results"][0]["error"].as_str().unwrap().contains("scripted-model"));
        assert_eq!(run["results"][1]["status"], "succeeded");

        let report = server.get("/api/v1/claim/report").await;
        report.assert_status_ok();
        assert_eq!(xlsx_sheet_names(report.as_bytes()).len(), 3);
    }

    #[tokio::test]
    async fn test_report_can_be_downloaded_again() {
        let server = server(Arc::new(ScriptedVisionModel::answering(AnswerFixtures::json())));
        server.post("/api/v1/claim").multipart(rear_bumper_claim()).await;
        server.post("/api/v1/claim/analysis").await;

        let first = server.get("/api/v1/claim/report").await;
        let second = server.get("/api/v1/claim/report").await;

        first.assert_status_ok();
        second.assert_status_ok();
        assert_eq!(
            xlsx_sheet_rows(first.as_bytes(), "Image 1 - rear-1"),
            xlsx_sheet_rows(second.as_bytes(), "Image 1 - rear-1")
        );
    }

    #[tokio::test]
    async fn test_repair_details_reach_response_and_workbook() {
        let server = server(Arc::new(ScriptedVisionModel::answering(AnswerFixtures::repair_details())));
        server.post("/api/v1/claim").multipart(rear_bumper_claim()).await;

        let run: Value = server.post("/api/v1/claim/analysis").await.json();
        assert_eq!(run["results"][0]["replacement_parts"], "tail light");
        assert_eq!(run["results"][0]["repair_time"], "2 days");

        let report = server.get("/api/v1/claim/report").await;
        let bytes = report.as_bytes();
        assert_eq!(
            xlsx_field(bytes, "Image 1 - rear-1", "Special Requirements").as_deref(),
            Some("Requires specialized tools/skills")
        );
        assert_eq!(
            xlsx_field(bytes, "Image 2 - rear-2", "Inspection Areas").as_deref(),
            Some("trunk floor, rear frame rail")
        );
    }

    #[tokio::test]
    async fn test_reset_starts_a_new_session() {
        let server = server(Arc::new(ScriptedVisionModel::answering("DAMAGE: dent")));
        let before: Value = server.post("/api/v1/claim").multipart(rear_bumper_claim()).await.json();

        let after: Value = server.delete("/api/v1/claim").await.json();

        assert_eq!(after["stage"], "NEW");
        assert!(after["claim"].is_null());
        assert_ne!(after["session_id"], before["session_id"]);
    }
}

// ============================================================================
// Rejected requests
// ============================================================================

mod rejection_tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_without_images_is_rejected() {
        let model = Arc::new(ScriptedVisionModel::answering("ok"));
        let server = server(model.clone());

        let response = server.post("/api/v1/claim").multipart(claim_form()).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"], "validation_error");
        assert_eq!(model.call_count(), 0);

        let session: Value = server.get("/api/v1/claim").await.json();
        assert_eq!(session["stage"], "NEW");
    }

    #[tokio::test]
    async fn test_blank_description_is_rejected() {
        let server = server(Arc::new(ScriptedVisionModel::answering("ok")));
        let form = MultipartForm::new()
            .add_text("claim_id", "C-100")
            .add_text("description", "   ")
            .add_part("images", png_part("rear.png"));

        let response = server.post("/api/v1/claim").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_malformed_incident_date_is_rejected() {
        let server = server(Arc::new(ScriptedVisionModel::answering("ok")));
        let form = MultipartForm::new()
            .add_text("incident_date", "01/03/2024")
            .add_text("description", "Hail damage")
            .add_part("images", png_part("roof.png"));

        let response = server.post("/api/v1/claim").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("incident_date"));
    }

    #[tokio::test]
    async fn test_unsupported_image_format_is_rejected() {
        let server = server(Arc::new(ScriptedVisionModel::answering("ok")));
        let form = claim_form().add_part(
            "images",
            Part::bytes(ImageFixtures::gif_bytes())
                .file_name("dash.gif")
                .mime_type("image/gif"),
        );

        let response = server.post("/api/v1/claim").multipart(form).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("dash.gif"));
    }

    #[tokio::test]
    async fn test_analysis_before_submission_conflicts() {
        let model = Arc::new(ScriptedVisionModel::answering("ok"));
        let server = server(model.clone());

        let response = server.post("/api/v1/claim/analysis").await;

        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["error"], "conflict");
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_report_before_analysis_conflicts() {
        let server = server(Arc::new(ScriptedVisionModel::answering("ok")));
        server.post("/api/v1/claim").multipart(rear_bumper_claim()).await;

        let response = server.get("/api/v1/claim/report").await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_render_failure_keeps_the_analysis() {
        let server = server_with(
            Arc::new(ScriptedVisionModel::answering("DAMAGE: dent")),
            Arc::new(FailingReportRenderer),
            ApiConfig::default(),
        );
        server.post("/api/v1/claim").multipart(rear_bumper_claim()).await;
        server.post("/api/v1/claim/analysis").await;

        let response = server.get("/api/v1/claim/report").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let session: Value = server.get("/api/v1/claim").await.json();
        assert_eq!(session["stage"], "ANALYZED");
        assert_eq!(session["analysis"]["succeeded"], 2);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_refused() {
        let config = ApiConfig {
            max_upload_mb: 1,
            ..ApiConfig::default()
        };
        let server = server_with(
            Arc::new(ScriptedVisionModel::answering("ok")),
            Arc::new(XlsxReportRenderer::new()),
            config,
        );
        let mut big = ImageFixtures::jpeg_bytes();
        big.resize(2 * 1024 * 1024, 0);
        let form = claim_form().add_part(
            "images",
            Part::bytes(big).file_name("huge.jpg").mime_type("image/jpeg"),
        );

        let response = server.post("/api/v1/claim").multipart(form).await;

        assert!(response.status_code().is_client_error());
        let session: Value = server.get("/api/v1/claim").await.json();
        assert_eq!(session["stage"], "NEW");
    }
}

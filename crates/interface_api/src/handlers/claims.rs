//! Claims handlers
//!
//! All handlers work on the single shared [`ClaimSession`](domain_claims::ClaimSession).
//! The session lock is held for the whole request, so an analysis run blocks
//! other claim requests until every image has been assessed.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use domain_claims::{ClaimMetadata, ImageUpload};

use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Form field carrying one uploaded image; may repeat
pub const IMAGE_FIELD: &str = "images";

/// Parsed multipart claim form
#[derive(Debug, Default)]
struct ClaimForm {
    claim_id: String,
    policy_number: String,
    incident_date: String,
    description: String,
    uploads: Vec<ImageUpload>,
}

impl ClaimForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = ClaimForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "claim_id" => form.claim_id = field.text().await?,
                "policy_number" => form.policy_number = field.text().await?,
                "incident_date" => form.incident_date = field.text().await?,
                "description" => form.description = field.text().await?,
                IMAGE_FIELD | "images[]" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was picked
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.uploads.push(ImageUpload::new(file_name, bytes.to_vec()));
                }
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    fn metadata(&self) -> Result<ClaimMetadata, ApiError> {
        let date = self.incident_date.trim();
        let incident_date = if date.is_empty() {
            None
        } else {
            Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                ApiError::Validation(format!(
                    "incident_date must be a date in YYYY-MM-DD form, got '{}'",
                    date
                ))
            })?)
        };

        Ok(ClaimMetadata::new(
            self.claim_id.as_str(),
            self.policy_number.as_str(),
            incident_date,
        ))
    }
}

/// Returns the session stage and whatever has been collected so far
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.session.lock().await;
    Json(SessionResponse::from(&*session))
}

/// Collects a claim from the multipart form
///
/// Replaces any previous claim and results. Invalid input is rejected before
/// anything in the session changes.
pub async fn submit_claim(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let form = ClaimForm::read(multipart).await?;
    let metadata = form.metadata()?;

    let mut session = state.session.lock().await;
    state
        .service
        .submit(&mut session, metadata, form.description, form.uploads)?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from(&*session))))
}

/// Sends every image of the current claim to the model, one after another
pub async fn run_analysis(
    State(state): State<AppState>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let mut session = state.session.lock().await;
    let run = state.service.analyze(&mut session).await?;
    Ok(Json(AnalysisResponse::from(run)))
}

/// Builds the report for the latest analysis and returns it as a download
pub async fn download_report(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut session = state.session.lock().await;
    let report = state.service.export_report(&mut session, Utc::now())?;

    info!(file_name = %report.file_name, sheets = report.sheet_count, "Report downloaded");

    let disposition = format!("attachment; filename=\"{}\"", report.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, report.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response())
}

/// Discards the claim and starts a new session
pub async fn reset_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let mut session = state.session.lock().await;
    state.service.reset(&mut session);
    Json(SessionResponse::from(&*session))
}

//! Pre-built Test Fixtures
//!
//! Provides ready-to-use payloads and model answers. Image fixtures only need
//! valid magic bytes; nothing in the pipeline decodes pixels.

use chrono::NaiveDate;
use domain_claims::{ClaimMetadata, ImageUpload};

/// Fixture for uploaded image payloads
pub struct ImageFixtures;

impl ImageFixtures {
    /// PNG signature followed by an IHDR chunk header
    pub fn png_bytes() -> Vec<u8> {
        vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
        ]
    }

    /// JPEG SOI marker followed by a JFIF APP0 header
    pub fn jpeg_bytes() -> Vec<u8> {
        vec![
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00,
            0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
        ]
    }

    /// GIF header, a raster format that is not accepted
    pub fn gif_bytes() -> Vec<u8> {
        b"GIF89a\x01\x00\x01\x00\x00\x00\x00".to_vec()
    }

    pub fn png(file_name: &str) -> ImageUpload {
        ImageUpload::new(file_name, Self::png_bytes())
    }

    pub fn jpeg(file_name: &str) -> ImageUpload {
        ImageUpload::new(file_name, Self::jpeg_bytes())
    }

    pub fn gif(file_name: &str) -> ImageUpload {
        ImageUpload::new(file_name, Self::gif_bytes())
    }
}

/// Fixture for claim form data
pub struct ClaimFixtures;

impl ClaimFixtures {
    pub fn claim_id() -> &'static str {
        "C-100"
    }

    pub fn policy_number() -> &'static str {
        "POL-2024-000042"
    }

    pub fn incident_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    pub fn description() -> &'static str {
        "Rear bumper collision"
    }

    pub fn metadata() -> ClaimMetadata {
        ClaimMetadata::new(Self::claim_id(), Self::policy_number(), Some(Self::incident_date()))
    }
}

/// Fixture for model answers
pub struct AnswerFixtures;

impl AnswerFixtures {
    /// Answer that follows the requested section layout
    pub fn sectioned() -> &'static str {
        "DAMAGE: The rear bumper is dented on the left corner with paint scratches. \
Severity: Moderate.\n\
REPAIR: Bumper cover needs repair and repainting; the left reflector should be replaced. \
Repair complexity: Medium.\n\
CONSISTENCY: The damage matches a low-speed rear collision as described."
    }

    /// Answer formatted as JSON, as some models do when asked for structure
    pub fn json() -> &'static str {
        r#"Here is the analysis:
{"location": "front bumper", "type": "crack", "severity": "Severe", "repair_complexity": "Complex", "repair": ["bumper", "grille"]}"#
    }

    /// JSON answer carrying the parts, timing and safety keys
    pub fn repair_details() -> &'static str {
        r#"{"replacement_parts": ["tail light"], "inspection_areas": ["trunk floor", "rear frame rail"], "repair_time": "2 days", "specialized_requirements": true, "safety_considerations": "Critical: check frame alignment before driving"}"#
    }

    /// Answer with no recognisable structure at all
    pub fn unstructured() -> &'static str {
        "The photo is too dark to judge the condition of the vehicle."
    }
}

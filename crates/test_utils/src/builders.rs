//! Test Data Builders
//!
//! Provides a builder for claims with sensible defaults, so tests only
//! specify the fields they care about.

use chrono::NaiveDate;
use domain_claims::{Claim, ClaimError, ClaimMetadata, ImageUpload};

use crate::fixtures::{ClaimFixtures, ImageFixtures};

/// Builder for constructing test claims
pub struct TestClaimBuilder {
    claim_id: String,
    policy_number: String,
    incident_date: Option<NaiveDate>,
    description: String,
    uploads: Vec<ImageUpload>,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// Creates a builder for claim C-100 with no images
    pub fn new() -> Self {
        Self {
            claim_id: ClaimFixtures::claim_id().to_string(),
            policy_number: ClaimFixtures::policy_number().to_string(),
            incident_date: Some(ClaimFixtures::incident_date()),
            description: ClaimFixtures::description().to_string(),
            uploads: Vec::new(),
        }
    }

    pub fn with_claim_id(mut self, claim_id: impl Into<String>) -> Self {
        self.claim_id = claim_id.into();
        self
    }

    pub fn with_policy_number(mut self, policy_number: impl Into<String>) -> Self {
        self.policy_number = policy_number.into();
        self
    }

    pub fn with_incident_date(mut self, date: Option<NaiveDate>) -> Self {
        self.incident_date = date;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_upload(mut self, upload: ImageUpload) -> Self {
        self.uploads.push(upload);
        self
    }

    /// Adds `count` JPEG images named `photo-1.jpg`, `photo-2.jpg`, ...
    pub fn with_jpeg_images(mut self, count: usize) -> Self {
        let start = self.uploads.len();
        self.uploads.extend(
            (start + 1..=start + count).map(|n| ImageFixtures::jpeg(&format!("photo-{}.jpg", n))),
        );
        self
    }

    pub fn metadata(&self) -> ClaimMetadata {
        ClaimMetadata::new(&self.claim_id, &self.policy_number, self.incident_date)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn uploads(&self) -> Vec<ImageUpload> {
        self.uploads.clone()
    }

    /// Submits the claim, returning the validation error if any
    pub fn try_build(self) -> Result<Claim, ClaimError> {
        Claim::submit(self.metadata(), self.description, self.uploads)
    }

    /// Submits the claim, panicking on invalid input
    pub fn build(self) -> Claim {
        self.try_build().expect("test claim should be valid")
    }
}

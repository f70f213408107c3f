//! Property-Based Test Generators
//!
//! Provides proptest strategies for claim uploads, plus `fake`-based
//! helpers for filling claim forms with plausible data.

use fake::faker::lorem::en::Sentence;
use fake::Fake;
use proptest::collection::vec;
use proptest::prelude::*;

use domain_claims::{ClaimMetadata, ImageUpload};

use crate::fixtures::ImageFixtures;

/// Strategy for a single PNG or JPEG upload with a random file name
pub fn image_upload_strategy() -> impl Strategy<Value = ImageUpload> {
    ("[a-z][a-z0-9_-]{0,11}", any::<bool>()).prop_map(|(stem, png)| {
        if png {
            ImageFixtures::png(&format!("{}.png", stem))
        } else {
            ImageFixtures::jpeg(&format!("{}.jpg", stem))
        }
    })
}

/// Strategy for a non-empty upload list of at most `max` images
pub fn uploads_strategy(max: usize) -> impl Strategy<Value = Vec<ImageUpload>> {
    vec(image_upload_strategy(), 1..=max)
}

/// Strategy for uploads paired with a per-image "call fails" flag
pub fn uploads_with_failures_strategy(
    max: usize,
) -> impl Strategy<Value = (Vec<ImageUpload>, Vec<bool>)> {
    uploads_strategy(max).prop_flat_map(|uploads| {
        let n = uploads.len();
        (Just(uploads), vec(any::<bool>(), n))
    })
}

/// Random but well-formed claim metadata
pub fn fake_claim_metadata() -> ClaimMetadata {
    let claim_number: u32 = (100..100_000).fake();
    let policy_number: u32 = (1_000_000..9_999_999).fake();
    ClaimMetadata::new(
        format!("C-{}", claim_number),
        format!("POL-{}", policy_number),
        None,
    )
}

/// Random claimant description
pub fn fake_description() -> String {
    Sentence(4..12).fake()
}

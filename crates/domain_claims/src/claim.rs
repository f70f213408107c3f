//! Claim intake
//!
//! A [`Claim`] is built once from the submitted form. All input validation
//! happens in [`Claim::submit`]; a claim that exists is ready for analysis.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClaimError;

/// Raster formats accepted for damage photos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Detects the format from the file's magic bytes
    ///
    /// Returns `None` for anything other than PNG or JPEG.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes) {
            Ok(image::ImageFormat::Png) => Some(ImageFormat::Png),
            Ok(image::ImageFormat::Jpeg) => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// MIME type used when the image is sent to the model
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
        }
    }
}

/// A raw file as received from the upload surface
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Points at one image of a claim by upload position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    /// 1-based position in upload order
    pub index: usize,
    /// Original file name
    pub file_name: String,
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image {} ({})", self.index, self.file_name)
    }
}

/// A validated damage photo
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimImage {
    /// 1-based position in upload order
    pub index: usize,
    /// Original file name
    pub file_name: String,
    /// Detected format
    pub format: ImageFormat,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl ClaimImage {
    fn from_upload(index: usize, upload: ImageUpload) -> Result<Self, ClaimError> {
        let file_name = if upload.file_name.trim().is_empty() {
            format!("image-{}", index)
        } else {
            upload.file_name.trim().to_string()
        };

        if upload.bytes.is_empty() {
            return Err(ClaimError::EmptyImage { file_name });
        }

        let format = ImageFormat::detect(&upload.bytes)
            .ok_or_else(|| ClaimError::UnsupportedImageFormat { file_name: file_name.clone() })?;

        Ok(Self {
            index,
            file_name,
            format,
            bytes: upload.bytes,
        })
    }

    pub fn reference(&self) -> ImageReference {
        ImageReference {
            index: self.index,
            file_name: self.file_name.clone(),
        }
    }

    /// Encodes the image as standard base64 for transport
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Identifying details of a claim as typed into the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimMetadata {
    /// Claim identifier
    pub claim_id: String,
    /// Policy number
    pub policy_number: String,
    /// Date of the incident, if given
    pub incident_date: Option<NaiveDate>,
}

impl ClaimMetadata {
    pub fn new(
        claim_id: impl Into<String>,
        policy_number: impl Into<String>,
        incident_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            claim_id: claim_id.into().trim().to_string(),
            policy_number: policy_number.into().trim().to_string(),
            incident_date,
        }
    }
}

/// A submitted claim ready for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    /// Form metadata
    pub metadata: ClaimMetadata,
    /// Claimant's description of the incident
    pub description: String,
    /// Photos in upload order
    pub images: Vec<ClaimImage>,
    /// Submission timestamp
    pub submitted_at: DateTime<Utc>,
}

impl Claim {
    /// Validates the form input and creates a claim
    ///
    /// Rejects the whole submission if there are no images, the description is
    /// blank, or any image is empty or not PNG/JPEG. Images keep upload order
    /// and are numbered from 1.
    pub fn submit(
        metadata: ClaimMetadata,
        description: impl Into<String>,
        uploads: Vec<ImageUpload>,
    ) -> Result<Self, ClaimError> {
        if uploads.is_empty() {
            return Err(ClaimError::NoImages);
        }

        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(ClaimError::EmptyDescription);
        }

        let images = uploads
            .into_iter()
            .enumerate()
            .map(|(position, upload)| ClaimImage::from_upload(position + 1, upload))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            metadata,
            description,
            images,
            submitted_at: Utc::now(),
        })
    }

    pub fn claim_id(&self) -> &str {
        &self.metadata.claim_id
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

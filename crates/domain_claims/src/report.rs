//! Report model
//!
//! A [`Report`] is a renderer-neutral table model: one summary sheet for the
//! claim and one sheet per analysed image. Building it is pure, so the same
//! claim, run and timestamp always give the same report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::{AnalysisOutcome, AnalysisRun, ImageAnalysisResult};
use crate::claim::{Claim, ClaimImage};
use crate::error::ClaimError;
use crate::parsing::{RepairComplexity, Severity};

/// Name of the claim summary sheet
pub const SUMMARY_SHEET_NAME: &str = "Claim Summary";

/// Longest sheet name spreadsheet applications accept
pub const MAX_SHEET_NAME_LEN: usize = 31;

const NOT_AVAILABLE: &str = "N/A";

/// Visual emphasis of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellStyle {
    Plain,
    /// Header or field label
    Label,
    Good,
    Caution,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    pub style: CellStyle,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: CellStyle::Plain,
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: CellStyle::Label,
        }
    }

    pub fn styled(text: impl Into<String>, style: CellStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A named sheet of rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn key_value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: vec![vec![Cell::label("Field"), Cell::label("Value")]],
        }
    }

    fn push(&mut self, field: &str, value: Cell) {
        self.rows.push(vec![Cell::label(field), value]);
    }

    /// Looks up the value cell for a field label
    pub fn value_of(&self, field: &str) -> Option<&Cell> {
        self.rows
            .iter()
            .skip(1)
            .find(|row| row.first().is_some_and(|cell| cell.text == field))
            .and_then(|row| row.get(1))
    }
}

/// The complete report for one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub claim_id: String,
    pub generated_at: DateTime<Utc>,
    pub sheets: Vec<Sheet>,
}

impl Report {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Download name such as `claim_C-100_20240301_101500.xlsx`
    pub fn file_name(&self, extension: &str) -> String {
        let claim: String = self
            .claim_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let claim = if claim.is_empty() { "unnamed".to_string() } else { claim };
        format!(
            "claim_{}_{}.{}",
            claim,
            self.generated_at.format("%Y%m%d_%H%M%S"),
            extension
        )
    }
}

/// Builds reports from a claim and its analysis run
pub struct ReportBuilder;

impl ReportBuilder {
    /// Builds the summary sheet plus one sheet per image result
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::ResultCountMismatch`] if the run does not hold
    /// exactly one result per claim image.
    pub fn build(
        claim: &Claim,
        run: &AnalysisRun,
        generated_at: DateTime<Utc>,
    ) -> Result<Report, ClaimError> {
        if run.results.len() != claim.images.len() {
            return Err(ClaimError::ResultCountMismatch {
                expected: claim.images.len(),
                actual: run.results.len(),
            });
        }

        let mut sheets = Vec::with_capacity(run.results.len() + 1);
        sheets.push(summary_sheet(claim, run, generated_at));
        sheets.extend(
            claim
                .images
                .iter()
                .zip(&run.results)
                .map(|(image, result)| image_sheet(image, result)),
        );

        Ok(Report {
            claim_id: claim.claim_id().to_string(),
            generated_at,
            sheets,
        })
    }
}

fn summary_sheet(claim: &Claim, run: &AnalysisRun, generated_at: DateTime<Utc>) -> Sheet {
    let meta = &claim.metadata;
    let mut sheet = Sheet::key_value(SUMMARY_SHEET_NAME);

    sheet.push("Claim ID", Cell::plain(&meta.claim_id));
    sheet.push("Policy Number", Cell::plain(&meta.policy_number));
    sheet.push(
        "Incident Date",
        Cell::plain(
            meta.incident_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
    );
    sheet.push("Description", Cell::plain(&claim.description));
    sheet.push("Images Submitted", Cell::plain(claim.image_count().to_string()));
    sheet.push("Analyses Succeeded", Cell::plain(run.succeeded_count().to_string()));

    let failed = run.failed_count();
    let failed_style = if failed > 0 { CellStyle::Alert } else { CellStyle::Plain };
    sheet.push("Analyses Failed", Cell::styled(failed.to_string(), failed_style));

    sheet.push("Analysis Run", Cell::plain(run.id.to_string()));
    sheet.push("Analysis Completed", Cell::plain(run.completed_at.to_rfc3339()));
    sheet.push("Report Generated", Cell::plain(generated_at.to_rfc3339()));
    sheet
}

fn image_sheet(image: &ClaimImage, result: &ImageAnalysisResult) -> Sheet {
    let mut sheet = Sheet::key_value(image_sheet_name(image.index, &image.file_name));

    sheet.push("Image", Cell::plain(format!("Image {}", image.index)));
    sheet.push("File Name", Cell::plain(&image.file_name));
    sheet.push("Format", Cell::plain(image.format.label()));

    match &result.outcome {
        AnalysisOutcome::Succeeded { raw_text, parsed } => {
            sheet.push("Status", Cell::styled("Analyzed", CellStyle::Good));
            sheet.push("Location", optional(parsed.location.as_deref()));
            sheet.push("Damage Type", optional(parsed.damage_type.as_deref()));
            sheet.push(
                "Severity",
                parsed
                    .severity
                    .map(|s| Cell::styled(s.as_str(), severity_style(s)))
                    .unwrap_or_else(|| Cell::plain(NOT_AVAILABLE)),
            );
            sheet.push(
                "Repair Complexity",
                parsed
                    .repair_complexity
                    .map(|c| Cell::styled(c.as_str(), complexity_style(c)))
                    .unwrap_or_else(|| Cell::plain(NOT_AVAILABLE)),
            );
            sheet.push("Parts to Replace", optional(parsed.replacement_parts.as_deref()));
            sheet.push("Inspection Areas", optional(parsed.inspection_areas.as_deref()));
            sheet.push("Estimated Repair Time", optional(parsed.repair_time.as_deref()));
            sheet.push(
                "Special Requirements",
                optional(parsed.specialized_requirements.as_deref()),
            );
            sheet.push(
                "Safety Notes",
                parsed
                    .safety_notes
                    .as_deref()
                    .map(|notes| Cell::styled(notes, safety_style(notes)))
                    .unwrap_or_else(|| Cell::plain(NOT_AVAILABLE)),
            );
            sheet.push("Damage", optional(parsed.damage.as_deref()));
            sheet.push("Repair", optional(parsed.repair.as_deref()));
            sheet.push("Consistency", optional(parsed.consistency.as_deref()));
            sheet.push("Error", Cell::plain(""));
            sheet.push("Raw Assessment", Cell::plain(raw_text));
        }
        AnalysisOutcome::Failed { error } => {
            sheet.push("Status", Cell::styled("Failed", CellStyle::Alert));
            for field in [
                "Location",
                "Damage Type",
                "Severity",
                "Repair Complexity",
                "Parts to Replace",
                "Inspection Areas",
                "Estimated Repair Time",
                "Special Requirements",
                "Safety Notes",
                "Damage",
                "Repair",
                "Consistency",
            ] {
                sheet.push(field, Cell::plain(NOT_AVAILABLE));
            }
            sheet.push("Error", Cell::styled(error, CellStyle::Alert));
            sheet.push("Raw Assessment", Cell::plain(""));
        }
    }

    sheet
}

fn optional(value: Option<&str>) -> Cell {
    Cell::plain(value.unwrap_or(NOT_AVAILABLE))
}

fn severity_style(severity: Severity) -> CellStyle {
    match severity {
        Severity::Minor => CellStyle::Good,
        Severity::Moderate => CellStyle::Caution,
        Severity::Severe => CellStyle::Alert,
    }
}

fn complexity_style(complexity: RepairComplexity) -> CellStyle {
    match complexity {
        RepairComplexity::Easy => CellStyle::Good,
        RepairComplexity::Medium => CellStyle::Caution,
        RepairComplexity::Complex => CellStyle::Alert,
    }
}

fn safety_style(notes: &str) -> CellStyle {
    if notes.to_lowercase().contains("critical") {
        CellStyle::Alert
    } else {
        CellStyle::Plain
    }
}

/// `Image {n} - {stem}`, stripped of characters sheet names cannot hold and
/// cut to [`MAX_SHEET_NAME_LEN`]. The numeric prefix keeps names unique.
fn image_sheet_name(index: usize, file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(file_name);
    let stem: String = stem
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\' | '\''))
        .collect();

    let prefix = format!("Image {}", index);
    let stem = stem.trim();
    if stem.is_empty() {
        return prefix;
    }

    format!("{} - {}", prefix, stem)
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect::<String>()
        .trim_end()
        .to_string()
}

//! Report export: section layout plus PDF and CSV renderers.

pub mod filename;
pub mod images;
pub mod layout;
pub mod pdf;
pub mod spreadsheet;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::dossier::catalog::FieldCatalog;
use crate::dossier::projection::{CategorySelector, ViewType};

pub use filename::export_filename;
pub use images::{HttpImageSource, ImageFetchError, ImageSource, OfflineImageSource};
pub use layout::{
    member_name, zip_family_members, CellValue, FamilyMemberRow, MemberReport, ReportBuilder,
    ReportOptions, ReportRow, ReportSection,
};
pub use pdf::{PageGeometry, PdfRenderer};
pub use spreadsheet::render_spreadsheet;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("pdf generation failed: {0}")]
    Pdf(String),
    #[error("spreadsheet generation failed: {0}")]
    Spreadsheet(#[from] csv::Error),
    #[error("report output failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Pdf,
    #[serde(alias = "csv")]
    Spreadsheet,
}

impl ReportFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "csv" | "spreadsheet" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Spreadsheet => "csv",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Spreadsheet => "text/csv; charset=utf-8",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A rendered report, ready to be written to disk or streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Builds and renders member reports against one catalog.
#[derive(Debug)]
pub struct ReportExporter<'a> {
    builder: ReportBuilder<'a>,
    images: &'a dyn ImageSource,
}

impl<'a> ReportExporter<'a> {
    pub fn new(
        catalog: &'a FieldCatalog,
        images: &'a dyn ImageSource,
        options: ReportOptions,
    ) -> Self {
        Self {
            builder: ReportBuilder::new(catalog, options),
            images,
        }
    }

    pub fn export(
        &self,
        record: &Value,
        selector: CategorySelector,
        view: ViewType,
        format: ReportFormat,
        generated_at: NaiveDateTime,
    ) -> Result<ReportArtifact, RenderError> {
        let report = self.builder.build(record, selector, view, generated_at);
        let rendered = match format {
            ReportFormat::Pdf => PdfRenderer::new(self.images).render(&report),
            ReportFormat::Spreadsheet => render_spreadsheet(&report),
        };

        let bytes = rendered.map_err(|err| {
            error!(error = %err, member = %report.member_name, %format, "report rendering failed");
            err
        })?;

        let filename = export_filename(&report.member_name, selector, view, generated_at, format);
        info!(
            %filename,
            sections = report.sections.len(),
            fields = report.field_count(),
            bytes = bytes.len(),
            "report exported"
        );

        Ok(ReportArtifact {
            filename,
            content_type: format.content_type(),
            bytes,
        })
    }
}

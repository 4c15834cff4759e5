//! Export run configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::domain::foundation::SourceId;
use crate::domain::rendering::OutputSyntax;
use crate::ports::{SortDirection, SourceQuery};

/// What to export and how to write it
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Source ids to export (comma-separated)
    #[serde(default)]
    pub source_ids: String,

    /// Root directory of the exported documents
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output syntax (rich or plain)
    #[serde(default)]
    pub syntax: OutputSyntax,

    /// Extension of written documents, without a dot
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Property to sort source queries by
    pub sort_property: Option<String>,

    /// Direction of the sort
    #[serde(default)]
    pub sort_direction: SortDirection,

    /// Delete output of pages removed from their source
    #[serde(default)]
    pub prune_removed: bool,
}

impl ExportConfig {
    /// Parse the configured source ids
    pub fn source_id_list(&self) -> Result<Vec<SourceId>, ValidationError> {
        self.source_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| SourceId::parse(id).map_err(|_| ValidationError::InvalidSourceId(id.to_string())))
            .collect()
    }

    /// Query used for every source
    pub fn query(&self) -> SourceQuery {
        SourceQuery {
            sort_property: self
                .sort_property
                .as_ref()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            direction: self.sort_direction,
        }
    }

    /// Validate export configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source_id_list()?.is_empty() {
            return Err(ValidationError::MissingRequired("EXPORT__SOURCE_IDS"));
        }

        let extension = self.file_extension.trim_start_matches('.');
        if extension.is_empty() || extension.contains(|c: char| c == '/' || c == '\\') {
            return Err(ValidationError::InvalidFileExtension(
                self.file_extension.clone(),
            ));
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            source_ids: String::new(),
            output_dir: default_output_dir(),
            syntax: OutputSyntax::default(),
            file_extension: default_file_extension(),
            sort_property: None,
            sort_direction: SortDirection::default(),
            prune_removed: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./content")
}

fn default_file_extension() -> String {
    "md".to_string()
}

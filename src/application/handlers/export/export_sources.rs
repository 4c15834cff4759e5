//! ExportSourcesHandler - Exports every page of the configured sources.
//!
//! Sources and the pages inside each source are exported concurrently.
//! Each page is one unit of work: a failure is logged, counted in the report
//! and does not affect any other page.

use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use super::{AssembledDocument, DocumentAssembler, ExportError, SyncLedger};
use crate::domain::content::{page_file_stem, SourceMetadata};
use crate::domain::foundation::{PageId, SourceId};
use crate::domain::rendering::{DocumentScope, OutputSyntax, WarningLog};
use crate::ports::{
    file_name_with_extension, AssetResolver, ContentApi, ExportStorage, SourceQuery, StorageError,
};

/// Command to export a set of sources.
#[derive(Debug, Clone)]
pub struct ExportSourcesCommand {
    pub source_ids: Vec<SourceId>,
    pub syntax: OutputSyntax,
    /// Extension of the written documents, without a dot.
    pub file_extension: String,
    pub query: SourceQuery,
    /// Delete the output of pages that left their source.
    pub prune_removed: bool,
}

impl ExportSourcesCommand {
    pub fn new(source_ids: Vec<SourceId>) -> Self {
        Self {
            source_ids,
            syntax: OutputSyntax::default(),
            file_extension: "md".to_string(),
            query: SourceQuery::default(),
            prune_removed: false,
        }
    }
}

/// A page or source that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFailure {
    pub source_id: SourceId,
    /// `None` when the source itself could not be read.
    pub page_id: Option<PageId>,
    pub message: String,
}

/// Outcome of an export run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    pub exported: usize,
    pub skipped: usize,
    pub failed: usize,
    pub pruned: usize,
    pub failures: Vec<ExportFailure>,
    pub warnings: WarningLog,
}

impl ExportReport {
    pub fn merge(&mut self, other: ExportReport) {
        self.exported += other.exported;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.pruned += other.pruned;
        self.failures.extend(other.failures);
        self.warnings.merge(other.warnings);
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, source_id: SourceId, page_id: Option<PageId>, error: &ExportError) {
        self.failed += 1;
        self.failures.push(ExportFailure {
            source_id,
            page_id,
            message: error.to_string(),
        });
    }
}

enum PageOutcome {
    Exported(WarningLog),
    Skipped,
}

/// Handler for exporting sources.
pub struct ExportSourcesHandler {
    content: Arc<dyn ContentApi>,
    storage: Arc<dyn ExportStorage>,
    ledger: Arc<SyncLedger>,
    assembler: DocumentAssembler,
}

impl ExportSourcesHandler {
    pub fn new(
        content: Arc<dyn ContentApi>,
        storage: Arc<dyn ExportStorage>,
        assets: Arc<dyn AssetResolver>,
        ledger: Arc<SyncLedger>,
    ) -> Self {
        Self {
            assembler: DocumentAssembler::new(content.clone(), assets),
            content,
            storage,
            ledger,
        }
    }

    pub async fn handle(&self, cmd: ExportSourcesCommand) -> ExportReport {
        let reports = join_all(
            cmd.source_ids
                .iter()
                .map(|source_id| self.export_source(*source_id, &cmd)),
        )
        .await;

        let mut report = ExportReport::default();
        for source_report in reports {
            report.merge(source_report);
        }
        report
    }

    async fn export_source(&self, source_id: SourceId, cmd: &ExportSourcesCommand) -> ExportReport {
        let mut report = ExportReport::default();

        let listing = async {
            let source = self.content.get_source(&source_id).await?;
            let page_ids = self.content.query_source(&source_id, &cmd.query).await?;
            Ok::<_, ExportError>((source, page_ids))
        };
        let (source, page_ids) = match listing.await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!(source_id = %source_id, error = %e, "Source export failed");
                report.fail(source_id, None, &e);
                return report;
            }
        };

        let folder = source.folder_name();
        tracing::info!(
            source_id = %source_id,
            title = %source.title,
            pages = page_ids.len(),
            "Exporting source"
        );

        let outcomes = join_all(
            page_ids
                .iter()
                .map(|page_id| self.export_page(&source, &folder, page_id, cmd)),
        )
        .await;

        for (page_id, outcome) in page_ids.iter().zip(outcomes) {
            match outcome {
                Ok(PageOutcome::Exported(warnings)) => {
                    report.exported += 1;
                    report.warnings.merge(warnings);
                }
                Ok(PageOutcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    tracing::error!(
                        source_id = %source_id,
                        page_id = %page_id,
                        error = %e,
                        "Page export failed"
                    );
                    report.fail(source_id, Some(*page_id), &e);
                }
            }
        }

        if cmd.prune_removed {
            match self.prune(&source, &folder, &page_ids, cmd).await {
                Ok(pruned) => report.pruned += pruned,
                Err(e) => {
                    tracing::error!(source_id = %source_id, error = %e, "Pruning failed");
                    report.fail(source_id, None, &e);
                }
            }
        }

        report
    }

    async fn export_page(
        &self,
        source: &SourceMetadata,
        folder: &str,
        page_id: &PageId,
        cmd: &ExportSourcesCommand,
    ) -> Result<PageOutcome, ExportError> {
        let page = self.content.get_page(page_id).await?;
        let stem = page.file_stem();
        let file_name = file_name_with_extension(&stem, &cmd.file_extension);

        if !self
            .ledger
            .is_stale(&source.id, &page, folder, &file_name)
            .await?
        {
            tracing::info!(page_id = %page.id, title = %page.title, "Page unchanged, skipping");
            return Ok(PageOutcome::Skipped);
        }

        let scope = DocumentScope {
            source_id: source.id,
            source_folder: folder.to_string(),
            page_id: page.id,
            page_title: page.title.clone(),
            page_stem: stem.clone(),
        };
        let AssembledDocument { content, warnings } =
            self.assembler.assemble(&scope, cmd.syntax).await?;

        let path = self
            .storage
            .write_text(folder, &stem, &cmd.file_extension, &content)
            .await?;
        self.ledger.record(source, &page).await?;

        tracing::info!(page_id = %page.id, path = %path, "Exported page");
        Ok(PageOutcome::Exported(warnings))
    }

    /// Deletes the output of pages recorded for `source` that its query no
    /// longer returns. Returns the number of pruned pages.
    async fn prune(
        &self,
        source: &SourceMetadata,
        folder: &str,
        live: &[PageId],
        cmd: &ExportSourcesCommand,
    ) -> Result<usize, ExportError> {
        let live: HashSet<&PageId> = live.iter().collect();
        let mut removed = Vec::new();

        for (page_id, record) in self.ledger.records(&source.id).await {
            if live.contains(&page_id) {
                continue;
            }
            let file_name = file_name_with_extension(
                &page_file_stem(&record.title, &page_id),
                &cmd.file_extension,
            );
            match self.storage.delete(folder, &file_name).await {
                Ok(()) | Err(StorageError::NotFound { .. }) => {}
                Err(e) => return Err(e.into()),
            }
            tracing::warn!(page_id = %page_id, file = %file_name, "Pruned removed page");
            removed.push(page_id);
        }

        self.ledger.forget(&source.id, &removed).await?;
        Ok(removed.len())
    }
}

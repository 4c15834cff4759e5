//! Notion Export binary
//!
//! Reads configuration from the environment, exports every configured source
//! into the output directory and exits non-zero when any page failed.

use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use notion_export::adapters::{
    ContentClientPool, HttpAssetDownloader, JsonSyncLogStore, LocalExportStorage,
    NotionClientConfig, NotionHttpClient, StoredAssetResolver,
};
use notion_export::application::{
    ExportReport, ExportSourcesCommand, ExportSourcesHandler, SyncLedger,
};
use notion_export::config::{AppConfig, LoggingConfig, ValidationError};
use notion_export::ports::{
    AssetError, ContentApi, ContentApiError, ExportStorage, SyncLogError,
};

#[derive(Debug, Error)]
enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error(transparent)]
    Content(#[from] ContentApiError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    SyncLog(#[from] SyncLogError),
}

fn init_tracing(logging: &LoggingConfig) {
    let json = logging.json;
    tracing_subscriber::registry()
        .with(logging.env_filter())
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer()))
        .init();
}

fn build_pool(config: &AppConfig) -> Result<ContentClientPool, ContentApiError> {
    let notion = &config.notion;
    let clients = notion
        .api_key_list()
        .into_iter()
        .map(|key| {
            let client_config = NotionClientConfig::new(key)
                .with_base_url(notion.base_url.clone())
                .with_api_version(notion.api_version.clone())
                .with_timeout(notion.timeout())
                .with_page_size(notion.page_size);
            Ok(Arc::new(NotionHttpClient::new(client_config)?) as Arc<dyn ContentApi>)
        })
        .collect::<Result<Vec<_>, ContentApiError>>()?;

    Ok(ContentClientPool::new(clients))
}

async fn run(config: AppConfig) -> Result<ExportReport, StartupError> {
    let source_ids = config.export.source_id_list()?;

    let pool = Arc::new(build_pool(&config)?);
    let storage: Arc<dyn ExportStorage> =
        Arc::new(LocalExportStorage::new(config.export.output_dir.clone()));
    let downloader = Arc::new(HttpAssetDownloader::new(config.notion.timeout())?);
    let assets = Arc::new(StoredAssetResolver::new(storage.clone(), downloader));
    let ledger = SyncLedger::load(
        Arc::new(JsonSyncLogStore::in_dir(&config.export.output_dir)),
        storage.clone(),
    )
    .await?;

    tracing::info!(
        sources = source_ids.len(),
        clients = pool.client_count(),
        output_dir = %config.export.output_dir.display(),
        syntax = %config.export.syntax,
        "Starting export"
    );

    let ledger = Arc::new(ledger);
    let handler = ExportSourcesHandler::new(pool.clone(), storage, assets, ledger.clone());
    let report = handler
        .handle(ExportSourcesCommand {
            source_ids,
            syntax: config.export.syntax,
            file_extension: config.export.file_extension.trim_start_matches('.').to_string(),
            query: config.export.query(),
            prune_removed: config.export.prune_removed,
        })
        .await;
    ledger.persist().await?;

    for (page_id, page) in report.warnings.iter() {
        let omitted: Vec<&str> = page.omitted.iter().map(|t| t.as_str()).collect();
        tracing::warn!(
            page_id = %page_id,
            title = %page.page_title,
            omitted = ?omitted,
            "Page contains block types that were not exported"
        );
    }

    tracing::info!(
        exported = report.exported,
        skipped = report.skipped,
        failed = report.failed,
        pruned = report.pruned,
        requests = pool.request_count(),
        "Export finished"
    );

    Ok(report)
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "Export aborted");
            ExitCode::FAILURE
        }
    }
}

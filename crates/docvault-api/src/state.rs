//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use docvault_core::config::AppConfig;
use docvault_core::traits::access::AccessOracle;
use docvault_core::traits::notify::EventSink;
use docvault_core::traits::storage::ObjectStore;

use docvault_database::repositories::document::DocumentRepository;
use docvault_database::repositories::folder::FolderRepository;
use docvault_database::repositories::sweep::SweepRepository;

use docvault_service::access::PermitAllOracle;
use docvault_service::document::archive::ArchiveService;
use docvault_service::document::download::DownloadService;
use docvault_service::document::service::DocumentService;
use docvault_service::document::upload::UploadService;
use docvault_service::document::version::VersionService;
use docvault_service::folder::paths::PathPropagator;
use docvault_service::folder::service::FolderService;
use docvault_service::folder::stats::StatsService;
use docvault_service::notify::{EventDispatcher, TracingSink};
use docvault_service::sweep::SweepService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Object store backend.
    pub store: Arc<dyn ObjectStore>,

    /// Folder CRUD service.
    pub folder_service: Arc<FolderService>,
    /// Folder rename/move propagation.
    pub path_service: Arc<PathPropagator>,
    /// Stats aggregator.
    pub stats_service: Arc<StatsService>,
    /// Upload / version-creation service.
    pub upload_service: Arc<UploadService>,
    /// Document CRUD service.
    pub document_service: Arc<DocumentService>,
    /// Version history reads.
    pub version_service: Arc<VersionService>,
    /// Download streaming.
    pub download_service: Arc<DownloadService>,
    /// Archive (ZIP) export.
    pub archive_service: Arc<ArchiveService>,
    /// Deferred storage repair.
    pub sweep_service: Arc<SweepService>,
}

impl AppState {
    /// Wire repositories and services with the default collaborator
    /// bindings (permit-all oracle, tracing event sink).
    pub fn new(config: Arc<AppConfig>, db_pool: PgPool, store: Arc<dyn ObjectStore>) -> Self {
        Self::with_collaborators(
            config,
            db_pool,
            store,
            Arc::new(PermitAllOracle),
            Arc::new(TracingSink),
        )
    }

    /// Wire repositories and services around the given external
    /// collaborators.
    pub fn with_collaborators(
        config: Arc<AppConfig>,
        db_pool: PgPool,
        store: Arc<dyn ObjectStore>,
        access: Arc<dyn AccessOracle>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let folder_repo = Arc::new(FolderRepository::new(db_pool.clone()));
        let document_repo = Arc::new(DocumentRepository::new(db_pool.clone()));
        let sweep_repo = Arc::new(SweepRepository::new(db_pool.clone()));

        let events = EventDispatcher::new(sink);
        let stats_service = Arc::new(StatsService::new(Arc::clone(&folder_repo)));
        let sweep_service = Arc::new(SweepService::new(sweep_repo, Arc::clone(&store)));

        let folder_service = Arc::new(FolderService::new(
            Arc::clone(&folder_repo),
            Arc::clone(&document_repo),
            Arc::clone(&access),
            events.clone(),
        ));
        let path_service = Arc::new(PathPropagator::new(
            Arc::clone(&folder_repo),
            Arc::clone(&sweep_service),
            Arc::clone(&stats_service),
            Arc::clone(&access),
            events.clone(),
        ));
        let upload_service = Arc::new(UploadService::new(
            Arc::clone(&document_repo),
            Arc::clone(&folder_repo),
            Arc::clone(&store),
            Arc::clone(&access),
            Arc::clone(&stats_service),
            events.clone(),
            config.storage.clone(),
        ));
        let document_service = Arc::new(DocumentService::new(
            Arc::clone(&document_repo),
            Arc::clone(&folder_repo),
            Arc::clone(&store),
            Arc::clone(&sweep_service),
            Arc::clone(&stats_service),
            Arc::clone(&access),
            events.clone(),
        ));
        let version_service = Arc::new(VersionService::new(
            Arc::clone(&document_repo),
            Arc::clone(&folder_repo),
            Arc::clone(&access),
        ));
        let download_service = Arc::new(DownloadService::new(
            Arc::clone(&document_repo),
            Arc::clone(&folder_repo),
            Arc::clone(&store),
            Arc::clone(&access),
        ));
        let archive_service = Arc::new(ArchiveService::new(
            Arc::clone(&folder_repo),
            Arc::clone(&document_repo),
            Arc::clone(&store),
            Arc::clone(&access),
        ));

        Self {
            config,
            db_pool,
            store,
            folder_service,
            path_service,
            stats_service,
            upload_service,
            document_service,
            version_service,
            download_service,
            archive_service,
            sweep_service,
        }
    }
}

//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{ApiServer, OtlpGrpcServer};
use crate::core::banner;
use crate::core::cli::{self, CliConfig};
use crate::core::config::AppConfig;
use crate::core::constants::{DEFAULT_LOG_FILTER, ENV_LOG};
use crate::core::replying::ReplyingState;
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::{RoomHub, SqliteService};
use crate::domain::traces::IngestService;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub database: Arc<SqliteService>,
    pub rooms: Arc<RoomHub>,
    pub ingest: Arc<IngestService>,
    pub replying: ReplyingState,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let cli_config = cli::parse();
        tracing::trace!(?cli_config, "Parsed CLI overrides");

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init().await?;

        let database = Arc::new(
            SqliteService::init(&storage)
                .await
                .context("Failed to open span store")?,
        );

        let rooms = Arc::new(RoomHub::new());
        let ingest = Arc::new(IngestService::new(
            Arc::new(database.clone()),
            rooms.clone(),
            config.storage.orphan_spans,
        ));
        let shutdown = ShutdownService::new(database.clone());

        tracing::debug!(
            data_dir = %storage.data_dir().display(),
            orphan_spans = %config.storage.orphan_spans,
            "Services initialized"
        );

        Ok(Self {
            shutdown,
            config,
            storage,
            database,
            rooms,
            ingest,
            replying: ReplyingState::new(),
        })
    }

    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        if app.config.otel.grpc_enabled {
            let grpc_server =
                OtlpGrpcServer::new(&app.config.otel, &app.config.server.host, app.ingest.clone());
            let shutdown = app.shutdown.clone();
            let handle = tokio::spawn(async move {
                if let Err(e) = grpc_server.start(shutdown.subscribe()).await {
                    tracing::error!(error = %e, "OTLP gRPC server error");
                    // Stop the HTTP server too
                    shutdown.trigger();
                }
            });

            app.shutdown.register(handle).await;
        }

        banner::print_banner(&app.config, &app.storage.data_dir().display().to_string());

        let shutdown = app.shutdown.clone();
        let result = ApiServer::new(app).start().await;
        match result {
            Ok(app) => {
                app.shutdown.shutdown().await;
                tracing::debug!(rooms = app.rooms.room_count(), "Server stopped");
                Ok(())
            }
            Err(e) => {
                // Still checkpoint and close the store
                shutdown.shutdown().await;
                Err(e)
            }
        }
    }

    async fn start_background_tasks(&self) {
        self.shutdown
            .register(
                self.database
                    .start_checkpoint_task(self.shutdown.subscribe()),
            )
            .await;

        tracing::debug!("Background tasks started");
    }
}

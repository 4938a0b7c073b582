pub mod api;
pub mod cli;
pub mod collection;
pub mod config;
pub mod devlog;
pub mod document;
pub mod engine;
pub mod errors;
pub mod import;
pub mod logger;
pub mod observe;
pub mod query;
pub mod service;
pub mod store;
pub mod types;
pub mod vehicle;
pub mod wal;

use crate::api::{AppState, CorsPolicy};
use crate::config::AppConfig;
use crate::engine::{ERROR_LOGS, Engine, VEHICLES};
use crate::errors::AppError;
use crate::observe::{ErrorLogStore, ErrorSink, FanoutSink, LogSink};
use crate::service::VehicleService;
use crate::store::RecordStore;
use std::sync::Arc;

/// The wired application: one engine, the vehicle service and the error log.
pub struct App {
    engine: Engine,
    vehicles_store: Arc<dyn RecordStore>,
    pub vehicles: VehicleService,
    pub error_logs: ErrorLogStore,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").field("engine", &self.engine).finish_non_exhaustive()
    }
}

impl App {
    /// Opens the store described by `cfg` and wires the error sinks.
    ///
    /// # Errors
    /// Data directory or log replay failures.
    pub fn open(cfg: &AppConfig) -> Result<Self, AppError> {
        let engine = if cfg.in_memory { Engine::in_memory() } else { Engine::open(&cfg.data_dir)? };
        Self::with_engine(engine, cfg.persist_error_logs)
    }

    /// Everything in memory, error logs persisted to the in-memory `errorlogs` collection.
    ///
    /// # Errors
    /// Never in practice; shares the signature of [`App::open`].
    pub fn in_memory() -> Result<Self, AppError> {
        Self::with_engine(Engine::in_memory(), true)
    }

    /// # Errors
    /// Collection open failures.
    pub fn with_engine(engine: Engine, persist_error_logs: bool) -> Result<Self, AppError> {
        let vehicles_store: Arc<dyn RecordStore> = engine.collection(VEHICLES)?;
        let error_logs = ErrorLogStore::new(engine.collection(ERROR_LOGS)?);
        let mut sink = FanoutSink::default().with(Arc::new(LogSink));
        if persist_error_logs {
            sink = sink.with(Arc::new(error_logs.clone()));
        }
        let sink: Arc<dyn ErrorSink> = Arc::new(sink);
        Ok(Self {
            engine,
            vehicles: VehicleService::new(vehicles_store.clone(), sink),
            vehicles_store,
            error_logs,
        })
    }

    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    #[must_use]
    pub fn vehicles_store(&self) -> &Arc<dyn RecordStore> {
        &self.vehicles_store
    }

    #[must_use]
    pub fn state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(self.vehicles.clone(), self.error_logs.clone()))
    }

    /// Serves the HTTP API on `cfg.bind` until the listener fails.
    ///
    /// # Errors
    /// Invalid CORS origin, bind or accept failures.
    pub async fn serve(&self, cfg: &AppConfig) -> Result<(), AppError> {
        let cors = CorsPolicy::new(&cfg.cors_origin)?;
        api::serve(self.state(), cors, &cfg.bind).await?;
        Ok(())
    }
}

/// Installs logging from `cfg`.
///
/// # Errors
/// Invalid level, log directory or appender failures, or a logger already installed.
pub fn init(cfg: &AppConfig) -> Result<(), AppError> {
    logger::init(cfg.log.dir.as_deref(), &cfg.log.level, cfg.log.retention)?;
    Ok(())
}

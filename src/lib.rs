pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::funds::FundsQuery;
use crate::core::config::AppConfig;
use crate::core::{Clock, FundListService, SystemClock};
use crate::providers::{AmfiFeedProvider, HistoryCache, HistoryProvider, UniverseCache};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Funds(FundsQuery),
    Returns(Vec<String>),
    Houses,
}

/// Providers wired to shared caches, ready to serve commands.
pub struct App {
    pub universe: AmfiFeedProvider,
    pub history: HistoryProvider,
    pub concurrency: usize,
}

impl App {
    pub fn new(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let universe_cache = Arc::new(UniverseCache::new(
            config.providers.amfi.freshness()?,
            Arc::clone(&clock),
        ));
        let history_cache = Arc::new(HistoryCache::new());

        Ok(Self {
            universe: AmfiFeedProvider::new(&config.providers.amfi, universe_cache)?,
            history: HistoryProvider::new(&config.providers.history, history_cache, clock)?,
            concurrency: config.concurrency,
        })
    }

    pub fn list_service(&self) -> FundListService<'_> {
        FundListService::new(&self.universe).with_returns(&self.history)
    }

    pub async fn execute(&self, command: AppCommand) -> Result<()> {
        let service = self.list_service();
        match command {
            AppCommand::Funds(query) => cli::funds::run(&service, &query, self.concurrency).await,
            AppCommand::Returns(codes) => cli::returns::run(&service, &self.history, &codes).await,
            AppCommand::Houses => cli::funds::run_houses(&service).await,
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fundscope starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    App::new(&config, Arc::new(SystemClock))?
        .execute(command)
        .await
}

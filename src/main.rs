// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod app;
mod config;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use deplist_core::{
    ApiClient, ApiError, CatalogError, DisplayController, PositionCatalog, RefreshScheduler,
    ResizeDebouncer, SchedulerConfig,
};
use log::{error, info, warn};
use thiserror::Error;

use crate::app::DeplistApp;
use crate::config::AppConfig;

/// ATC departure list and weather display.
#[derive(Debug, Parser)]
#[command(name = "deplist-desktop", version, about)]
struct Cli {
    /// Backend API root, e.g. http://localhost:5000/api
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Root of the health endpoint (defaults to the API root's host)
    #[arg(long, value_name = "URL")]
    health_base: Option<String>,

    /// Position catalog JSON to use instead of the built-in one
    #[arg(long, value_name = "FILE")]
    positions: Option<PathBuf>,

    /// Sector group to open at startup
    #[arg(long, value_name = "ID")]
    sector: Option<String>,

    /// Print where the config file lives and exit
    #[arg(long)]
    print_config_path: bool,
}

#[derive(Debug, Error)]
enum StartupError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("config error: {0}")]
    Config(#[from] confy::ConfyError),

    #[error("window error: {0}")]
    Window(#[from] eframe::Error),
}

fn main() -> Result<(), StartupError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.print_config_path {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(());
    }

    info!("Starting departure list display...");

    let persisted = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {e}");
        AppConfig::default()
    });
    let config = apply_overrides(persisted.clone(), &cli);

    let catalog = match &config.positions_file {
        Some(path) => {
            info!("Loading position catalog from {}", path.display());
            PositionCatalog::load(path)?
        }
        None => PositionCatalog::builtin()?,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("deplist-fetch")
        .enable_all()
        .build()
        .map_err(StartupError::Runtime)?;

    let api = ApiClient::new(&config.api_base, &config.effective_health_base(), config.request_timeout())?;
    info!("Backend: {}", api.api_base());
    let scheduler = RefreshScheduler::new(
        runtime.handle().clone(),
        api,
        SchedulerConfig {
            departure_refresh: config.departure_refresh(),
            weather_refresh: config.weather_refresh(),
        },
    );

    let mut controller = DisplayController::new(
        catalog,
        scheduler,
        ResizeDebouncer::new(config.resize_settle()),
    );

    match initial_sector(controller.catalog(), cli.sector.as_deref(), config.last_sector.as_deref()) {
        Some(sector_id) => {
            controller.select_sector(&sector_id);
        }
        None => error!("Position catalog has no sector groups"),
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_title("Departure List Display"),
        ..Default::default()
    };

    eframe::run_native(
        "Departure List Display",
        options,
        Box::new(move |_cc| Ok(Box::new(DeplistApp::new(controller, persisted, runtime)))),
    )?;

    Ok(())
}

/// Command-line values win over the config file for this run only.
fn apply_overrides(mut config: AppConfig, cli: &Cli) -> AppConfig {
    if let Some(api_base) = &cli.api_base {
        config.api_base.clone_from(api_base);
    }
    if let Some(health_base) = &cli.health_base {
        config.health_base = Some(health_base.clone());
    }
    if let Some(positions) = &cli.positions {
        config.positions_file = Some(positions.clone());
    }
    config
}

/// Requested sector if it exists, else the one open last time, else the
/// first group.
fn initial_sector(catalog: &PositionCatalog, requested: Option<&str>, last: Option<&str>) -> Option<String> {
    let known = |id: &str| catalog.sector_groups.iter().any(|g| g.id == id);

    if let Some(id) = requested {
        if known(id) {
            return Some(id.to_string());
        }
        warn!("Unknown sector {id}, ignoring");
    }

    last.filter(|id| known(id))
        .map(str::to_string)
        .or_else(|| catalog.sector_groups.first().map(|g| g.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_sector() {
        let catalog = PositionCatalog::builtin().unwrap();
        let first = catalog.sector_groups[0].id.clone();

        assert_eq!(initial_sector(&catalog, Some("HEATHROW"), Some("TC_EAST")).as_deref(), Some("HEATHROW"));
        assert_eq!(initial_sector(&catalog, Some("NOPE"), Some("TC_EAST")).as_deref(), Some("TC_EAST"));
        assert_eq!(initial_sector(&catalog, None, Some("GONE")), Some(first.clone()));
        assert_eq!(initial_sector(&catalog, None, None), Some(first));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "deplist-desktop",
            "--api-base",
            "http://ops:8080/api",
            "--positions",
            "/tmp/positions.json",
        ]);
        let config = apply_overrides(AppConfig::default(), &cli);
        assert_eq!(config.api_base, "http://ops:8080/api");
        assert_eq!(config.positions_file, Some(PathBuf::from("/tmp/positions.json")));
        assert_eq!(config.health_base, None);
        assert!(!cli.print_config_path);
    }
}

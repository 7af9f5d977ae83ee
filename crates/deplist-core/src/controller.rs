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

//! Application state for the display.
//!
//! The controller is the single owner of the current selection, the mounted
//! content and the refresh timers. Every selection change goes through
//! [`DisplayController::select_sector`] or
//! [`DisplayController::select_position`], which bump the generation, stop
//! the old timers and start new ones in one step.

use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::departures::DepartureBoard;
use crate::layout::{check_height_percentages, ResizeDebouncer};
use crate::positions::{LayoutMode, PositionCatalog, ResolvedPosition};
use crate::scheduler::{Generation, RefreshEvent, RefreshScheduler};
use crate::status::{ConnectionStatus, DiagnosticLevel, DisplayStatus};
use crate::weather::WeatherPanel;

/// What the content area currently shows.
#[derive(Debug, Default)]
pub enum DisplayContent {
    /// No position resolved.
    #[default]
    Empty,
    /// Weather column beside the departure lists.
    Standard {
        weather: WeatherPanel,
        board: DepartureBoard,
    },
    /// Weather only, no departure container.
    WeatherOnly { weather: WeatherPanel },
}

impl DisplayContent {
    #[must_use]
    pub fn weather(&self) -> Option<&WeatherPanel> {
        match self {
            Self::Empty => None,
            Self::Standard { weather, .. } | Self::WeatherOnly { weather } => Some(weather),
        }
    }

    fn weather_mut(&mut self) -> Option<&mut WeatherPanel> {
        match self {
            Self::Empty => None,
            Self::Standard { weather, .. } | Self::WeatherOnly { weather } => Some(weather),
        }
    }

    #[must_use]
    pub fn board(&self) -> Option<&DepartureBoard> {
        match self {
            Self::Standard { board, .. } => Some(board),
            Self::Empty | Self::WeatherOnly { .. } => None,
        }
    }

    fn board_mut(&mut self) -> Option<&mut DepartureBoard> {
        match self {
            Self::Standard { board, .. } => Some(board),
            Self::Empty | Self::WeatherOnly { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct DisplayController {
    catalog: PositionCatalog,
    scheduler: RefreshScheduler,
    generation: Generation,
    sector_id: Option<String>,
    position: Option<ResolvedPosition>,
    content: DisplayContent,
    debouncer: ResizeDebouncer,
    status: DisplayStatus,
}

impl DisplayController {
    /// Take ownership of the catalog and scheduler. Catalog warnings are
    /// logged and kept as diagnostics.
    #[must_use]
    pub fn new(catalog: PositionCatalog, scheduler: RefreshScheduler, debouncer: ResizeDebouncer) -> Self {
        let mut status = DisplayStatus::new();
        for warning in catalog.validate() {
            warn!("Position catalog: {warning}");
            status.add_diagnostic(DiagnosticLevel::Warning, warning.to_string());
        }

        Self {
            catalog,
            scheduler,
            generation: Generation::default(),
            sector_id: None,
            position: None,
            content: DisplayContent::Empty,
            debouncer,
            status,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &PositionCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn sector_id(&self) -> Option<&str> {
        self.sector_id.as_deref()
    }

    #[must_use]
    pub fn position(&self) -> Option<&ResolvedPosition> {
        self.position.as_ref()
    }

    #[must_use]
    pub fn content(&self) -> &DisplayContent {
        &self.content
    }

    #[must_use]
    pub fn status(&self) -> &DisplayStatus {
        &self.status
    }

    /// Whether a sidebar button should show as active.
    #[must_use]
    pub fn is_highlighted(&self, position_id: &str) -> bool {
        self.position
            .as_ref()
            .is_some_and(|p| p.is_highlighted(position_id))
    }

    pub fn clear_diagnostics(&mut self) {
        self.status.clear_diagnostics();
    }

    /// A relayout is waiting for the container size to settle.
    #[must_use]
    pub fn resize_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Switch sector group and open its default position.
    ///
    /// Returns false when the sector has no resolvable position; the
    /// content area is then cleared and weather polling stops.
    pub fn select_sector(&mut self, sector_id: &str) -> bool {
        info!("Sector selected: {sector_id}");
        self.sector_id = Some(sector_id.to_string());

        let opened = match self.catalog.default_position(sector_id).map(str::to_string) {
            Some(position_id) => self.select_position(&position_id),
            None => {
                warn!("Sector {sector_id} has no positions");
                false
            }
        };
        if !opened {
            self.clear_content();
        }
        opened
    }

    /// Open a position of the current sector. Aliases render their target.
    pub fn select_position(&mut self, position_id: &str) -> bool {
        let Some(sector_id) = self.sector_id.clone() else {
            warn!("Position {position_id} selected with no sector");
            return false;
        };

        // A click that resolves to nothing leaves the current display alone.
        let Some(resolved) = self.catalog.resolve_position(&sector_id, position_id) else {
            warn!("Position {position_id} in {sector_id} could not be resolved");
            return false;
        };

        self.generation = self.generation.next();
        self.scheduler.stop_all();
        self.debouncer.reset();

        info!(
            "Position selected: {} -> {} ({})",
            resolved.clicked_id, resolved.target_id, self.generation
        );

        let weather = WeatherPanel::mount(&resolved, &self.catalog);
        let plan = weather.plan();

        self.content = match resolved.layout {
            LayoutMode::WeatherOnly => DisplayContent::WeatherOnly { weather },
            LayoutMode::Standard => {
                if let Some(total) = check_height_percentages(&resolved.sections) {
                    let message = format!(
                        "{}: section heights add up to {total}%, not 100%",
                        resolved.target_id
                    );
                    warn!("{message}");
                    self.status.add_diagnostic(DiagnosticLevel::Warning, message);
                }
                let mut board = DepartureBoard::new();
                board.mount(&resolved.target_id, &resolved.sections);
                DisplayContent::Standard { weather, board }
            }
        };
        self.position = Some(resolved);

        self.scheduler.start_departure_polling(self.generation);
        if !plan.is_empty() {
            self.scheduler.start_weather_polling(self.generation, plan);
        }
        true
    }

    /// Nothing to show: drop content and weather polling. Departure polling
    /// keeps the connection indicator alive.
    fn clear_content(&mut self) {
        self.generation = self.generation.next();
        self.scheduler.stop_all();
        self.debouncer.reset();
        self.position = None;
        self.content = DisplayContent::Empty;
        self.scheduler.start_departure_polling(self.generation);
    }

    /// Feed the measured departure container height, observed at `at`.
    /// Returns true when a relayout happened; the cached snapshot is
    /// re-rendered as of `now` and an immediate departure fetch follows.
    pub fn on_container_height(&mut self, height: f32, at: Instant, now: DateTime<Utc>) -> bool {
        let Some(board) = self.content.board_mut() else {
            return false;
        };
        let Some(settled) = self.debouncer.observe(height, at) else {
            return false;
        };

        debug!("Departure container settled at {settled}px");
        board.apply_layout(settled, now);
        self.scheduler.fetch_departures_now(self.generation);
        true
    }

    /// Flip a section's started-aircraft filter and re-render it at once.
    pub fn toggle_show_started(&mut self, section: usize, now: DateTime<Utc>) -> bool {
        self.content
            .board_mut()
            .is_some_and(|board| board.toggle_show_started(section, now))
    }

    /// Apply every completed fetch. Returns the number of events applied.
    pub fn pump_events(&mut self, now: DateTime<Utc>) -> usize {
        let mut applied = 0;
        while let Some(event) = self.scheduler.poll_event() {
            if self.handle_event(event, now) {
                applied += 1;
            }
        }
        applied
    }

    /// Apply one fetch result. Results from an earlier generation are
    /// dropped without touching any state.
    pub fn handle_event(&mut self, event: RefreshEvent, now: DateTime<Utc>) -> bool {
        if event.generation() != self.generation {
            debug!(
                "Discarding result from {} (current {})",
                event.generation(),
                self.generation
            );
            return false;
        }

        match event {
            RefreshEvent::Departures { result, health, .. } => {
                let healthy = match health {
                    Ok(healthy) => healthy,
                    Err(e) => {
                        debug!("Health probe failed: {e}");
                        false
                    }
                };
                let fetched = match result {
                    Ok(snapshot) => {
                        self.status.last_departures_at = Some(now);
                        if let Some(board) = self.content.board_mut() {
                            board.update(snapshot, now);
                        }
                        true
                    }
                    Err(e) => {
                        // Keep the previous render until the next good tick.
                        warn!("Departures fetch failed: {e}");
                        false
                    }
                };
                // Connected only when both halves of the tick succeeded.
                self.status.set_connection_status(if fetched && healthy {
                    ConnectionStatus::Connected
                } else {
                    ConnectionStatus::Disconnected
                });
            }
            RefreshEvent::Weather { airport, result, .. } => {
                let report = match result {
                    Ok(report) => Some(report),
                    Err(e) => {
                        warn!("Weather fetch for {airport} failed: {e}");
                        self.status
                            .add_diagnostic(DiagnosticLevel::Warning, format!("Weather {airport}: {e}"));
                        None
                    }
                };
                if let Some(panel) = self.content.weather_mut() {
                    panel.apply_report(&airport, report);
                }
            }
            RefreshEvent::Composite { index, results, .. } => {
                let results: Vec<_> = results
                    .into_iter()
                    .map(|(airport, result)| {
                        let report = result
                            .map_err(|e| warn!("Weather fetch for {airport} failed: {e}"))
                            .ok();
                        (airport, report)
                    })
                    .collect();
                if let Some(panel) = self.content.weather_mut() {
                    panel.apply_composite(index, &results);
                }
            }
        }
        true
    }

    /// Stop all timers, e.g. on shutdown.
    pub fn shutdown(&mut self) {
        self.scheduler.stop_all();
    }
}

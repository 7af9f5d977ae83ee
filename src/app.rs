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

//! The eframe application: pumps fetch results into the controller and
//! draws the sidebar, status strip and content area each frame.

use std::time::{Duration, Instant};

use chrono::Utc;
use deplist_core::{DisplayContent, DisplayController};
use egui_extras::{Size, StripBuilder};
use log::{info, warn};
use tokio::runtime::Runtime;

use crate::config::AppConfig;
use crate::ui::{self, departure_panel, sidebar, status_bar::StatusBar, weather_panel, DialTextures, UiAction};

/// Fetch results are applied at least this often even without input.
const REPAINT_INTERVAL: Duration = Duration::from_millis(250);

/// Frame cadence while a window resize is settling.
const RESIZE_POLL: Duration = Duration::from_millis(50);

const SIDEBAR_WIDTH: f32 = 170.0;
const WEATHER_COLUMN_WIDTH: f32 = 280.0;

pub struct DeplistApp {
    controller: DisplayController,
    dials: DialTextures,
    status_bar: StatusBar,
    /// Settings as loaded from disk, without command-line overrides.
    persisted: AppConfig,
    // Dropped after the controller so timer tasks are cancelled first.
    _runtime: Runtime,
}

impl std::fmt::Debug for DeplistApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeplistApp")
            .field("sector", &self.controller.sector_id())
            .field("generation", &self.controller.generation())
            .finish_non_exhaustive()
    }
}

impl DeplistApp {
    pub fn new(controller: DisplayController, persisted: AppConfig, runtime: Runtime) -> Self {
        Self {
            controller,
            dials: DialTextures::new(),
            status_bar: StatusBar::new(),
            persisted,
            _runtime: runtime,
        }
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::SelectSector(sector_id) => {
                self.controller.select_sector(&sector_id);
                self.persisted.last_sector = Some(sector_id);
                if let Err(e) = self.persisted.save() {
                    warn!("Failed to save config: {e}");
                }
            }
            UiAction::SelectPosition(position_id) => {
                self.controller.select_position(&position_id);
            }
            UiAction::ToggleStarted(section) => {
                if !self.controller.toggle_show_started(section, Utc::now()) {
                    warn!("No departure section {section} to toggle");
                }
            }
            UiAction::ClearDiagnostics => self.controller.clear_diagnostics(),
        }
    }

    fn content(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) -> Option<f32> {
        let generation = self.controller.generation();
        let dials = &mut self.dials;

        match self.controller.content() {
            DisplayContent::Empty => {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("Select a position")
                        .color(egui::Color32::from_rgb(130, 130, 130))
                        .size(18.0));
                });
                None
            }
            DisplayContent::WeatherOnly { weather } => {
                weather_panel::show(ui, weather, generation, dials);
                None
            }
            DisplayContent::Standard { weather, board } if weather.is_empty() => {
                Some(departure_panel::show(ui, board, actions))
            }
            DisplayContent::Standard { weather, board } => {
                let mut height = None;
                StripBuilder::new(ui)
                    .size(Size::exact(WEATHER_COLUMN_WIDTH))
                    .size(Size::remainder())
                    .horizontal(|mut strip| {
                        strip.cell(|ui| weather_panel::show(ui, weather, generation, dials));
                        strip.cell(|ui| height = Some(departure_panel::show(ui, board, actions)));
                    });
                height
            }
        }
    }
}

impl eframe::App for DeplistApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Utc::now();
        self.controller.pump_events(now);
        ctx.request_repaint_after(REPAINT_INTERVAL);

        let mut actions = Vec::new();

        egui::SidePanel::left("positions")
            .resizable(false)
            .exact_width(SIDEBAR_WIDTH)
            .show(ctx, |ui| sidebar::show(ui, &self.controller, &mut actions));

        egui::TopBottomPanel::bottom("status")
            .show(ctx, |ui| self.status_bar.show(ui, self.controller.status(), now, &mut actions));

        let mut departures_height = None;
        egui::CentralPanel::default()
            .frame(egui::Frame::new()
                .fill(ui::BACKGROUND)
                .inner_margin(egui::Margin::same(8)))
            .show(ctx, |ui| departures_height = self.content(ui, &mut actions));

        if let Some(height) = departures_height {
            if self.controller.on_container_height(height, Instant::now(), now) {
                ctx.request_repaint();
            } else if self.controller.resize_pending() {
                ctx.request_repaint_after(RESIZE_POLL);
            }
        }

        for action in actions {
            info!("UI action: {action:?}");
            self.apply(action);
        }
    }
}

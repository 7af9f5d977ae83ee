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

//! Connection indicator and diagnostics strip along the bottom edge.

use chrono::{DateTime, Utc};
use deplist_core::status::{DiagnosticLevel, DiagnosticMessage};
use deplist_core::{ConnectionStatus, DisplayStatus};

use super::UiAction;

const MAX_MESSAGE_CHARS: usize = 80;

#[derive(Debug, Default)]
pub struct StatusBar {
    pub expanded: bool,
}

impl StatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        status: &DisplayStatus,
        now: DateTime<Utc>,
        actions: &mut Vec<UiAction>,
    ) {
        ui.horizontal(|ui| {
            let (status_color, status_icon) = match status.connection {
                ConnectionStatus::Connected => (egui::Color32::from_rgb(100, 255, 100), "●"),
                ConnectionStatus::Connecting => (egui::Color32::from_rgb(255, 200, 100), "◐"),
                ConnectionStatus::Disconnected => (egui::Color32::from_rgb(255, 100, 100), "○"),
            };

            ui.label(egui::RichText::new(status_icon)
                .color(status_color)
                .size(12.0));
            ui.label(egui::RichText::new(status.connection.label().to_uppercase())
                .color(status_color)
                .size(10.0)
                .monospace()
                .strong());

            ui.separator();

            let updated = status
                .last_departures_at
                .map_or_else(|| "--".to_string(), |at| format_age(now, at));
            ui.label(egui::RichText::new(format!("Updated {updated}"))
                .color(egui::Color32::from_rgb(180, 180, 180))
                .size(10.0)
                .monospace());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let icon = if self.expanded { "▼" } else { "▲" };
                if ui.button(egui::RichText::new(icon).size(10.0))
                    .on_hover_text(if self.expanded { "Hide messages" } else { "Show messages" })
                    .clicked() {
                    self.expanded = !self.expanded;
                }

                if let Some(latest) = status.latest_diagnostic() {
                    diagnostic_line(ui, latest);
                }
            });
        });

        if !self.expanded {
            return;
        }

        ui.separator();
        if status.latest_diagnostic().is_some()
            && ui.small_button("Clear").on_hover_text("Clear messages").clicked()
        {
            actions.push(UiAction::ClearDiagnostics);
        }
        egui::ScrollArea::vertical()
            .max_height(14.0 * 8.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                if status.latest_diagnostic().is_none() {
                    ui.label(egui::RichText::new("No messages")
                        .color(egui::Color32::from_rgb(100, 100, 100))
                        .size(9.0)
                        .italics());
                }
                // Newest first
                for diagnostic in status.diagnostics().rev() {
                    ui.horizontal(|ui| diagnostic_line(ui, diagnostic));
                }
            });
    }
}

fn diagnostic_line(ui: &mut egui::Ui, diagnostic: &DiagnosticMessage) {
    let (icon, color) = match diagnostic.level {
        DiagnosticLevel::Info => ("ℹ", egui::Color32::from_rgb(100, 180, 255)),
        DiagnosticLevel::Warning => ("⚠", egui::Color32::from_rgb(255, 200, 100)),
        DiagnosticLevel::Error => ("✕", egui::Color32::from_rgb(255, 100, 100)),
    };

    ui.label(egui::RichText::new(icon).color(color).size(10.0));
    ui.label(egui::RichText::new(diagnostic.timestamp.format("%H:%M:%S").to_string())
        .color(egui::Color32::from_rgb(100, 100, 100))
        .size(9.0)
        .monospace());
    ui.label(egui::RichText::new(truncate(&diagnostic.message, MAX_MESSAGE_CHARS))
        .color(egui::Color32::from_rgb(180, 180, 180))
        .size(9.0))
        .on_hover_text(&diagnostic.message);
}

/// "3s ago" style age of the last successful update.
fn format_age(now: DateTime<Utc>, at: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds().max(0);
    if seconds < 60 {
        format!("{seconds}s ago")
    } else if seconds < 3600 {
        format!("{}m {}s ago", seconds / 60, seconds % 60)
    } else {
        at.format("%H:%M:%SZ").to_string()
    }
}

fn truncate(message: &str, max_chars: usize) -> String {
    if message.chars().count() > max_chars {
        let head: String = message.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        message.to_string()
    }
}

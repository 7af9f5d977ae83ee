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

//! Weather boxes, composite grids and their wind dials.

use deplist_core::weather::{
    CompositeCell, CompositeView, PanelMode, WeatherBox, WeatherField, COMPOSITE_COLUMNS,
};
use deplist_core::{Generation, WeatherPanel};
use egui::{Color32, RichText};

use super::{parse_color, DialTextures, PANEL_TEXT};

const BOX_MARGIN: i8 = 8;
const BOX_SPACING: f32 = 8.0;
const DIAL_MAX: f32 = 200.0;
const FALLBACK_FILL: Color32 = Color32::from_rgb(0x41, 0x69, 0xe1);
const COMPOSITE_FILL: Color32 = Color32::from_rgb(30, 38, 46);
const MUTED: Color32 = Color32::from_rgb(150, 150, 150);

/// Draw the panel into `ui`. Standard mode stacks everything in a column;
/// weather-only mode puts the boxes side by side across the full width.
pub fn show(ui: &mut egui::Ui, panel: &WeatherPanel, generation: Generation, dials: &mut DialTextures) {
    if panel.is_empty() {
        return;
    }

    match panel.mode() {
        PanelMode::Standard => {
            egui::ScrollArea::vertical()
                .id_salt("weather_column")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let width = ui.available_width();
                    for (slot, weather_box) in panel.boxes().iter().enumerate() {
                        standard_box(ui, slot, weather_box, generation, dials, width);
                        ui.add_space(BOX_SPACING);
                    }
                    for (index, view) in panel.composites().iter().enumerate() {
                        composite_grid(ui, index, view, width);
                        ui.add_space(BOX_SPACING);
                    }
                });
        }
        PanelMode::WeatherOnly => {
            let count = panel.boxes().len() + panel.composites().len();
            #[allow(clippy::cast_precision_loss, reason = "a handful of boxes")]
            let width = ((ui.available_width() - BOX_SPACING * (count.saturating_sub(1)) as f32)
                / count.max(1) as f32)
                .max(120.0);

            egui::ScrollArea::horizontal()
                .id_salt("weather_row")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.horizontal_top(|ui| {
                        ui.spacing_mut().item_spacing.x = BOX_SPACING;
                        for (slot, weather_box) in panel.boxes().iter().enumerate() {
                            ui.vertical(|ui| standard_box(ui, slot, weather_box, generation, dials, width));
                        }
                        for (index, view) in panel.composites().iter().enumerate() {
                            ui.vertical(|ui| composite_grid(ui, index, view, width));
                        }
                    });
                });
        }
    }
}

fn standard_box(
    ui: &mut egui::Ui,
    slot: usize,
    weather_box: &WeatherBox,
    generation: Generation,
    dials: &mut DialTextures,
    width: f32,
) {
    let fill = parse_color(&weather_box.color, FALLBACK_FILL);
    let inner_width = width - 2.0 * f32::from(BOX_MARGIN);

    egui::Frame::new()
        .fill(fill)
        .corner_radius(6.0)
        .inner_margin(egui::Margin::same(BOX_MARGIN))
        .show(ui, |ui| {
            ui.set_width(inner_width);

            let title = ui.label(RichText::new(&weather_box.label)
                .color(PANEL_TEXT)
                .size(16.0)
                .strong());
            if let Some(raw) = weather_box.report().and_then(|r| r.raw.as_deref()) {
                title.on_hover_text(raw);
            }
            ui.add_space(4.0);

            let (Some(fields), Some(report)) = (weather_box.fields(), weather_box.report()) else {
                let text = weather_box.placeholder().unwrap_or_default();
                ui.label(RichText::new(text).color(PANEL_TEXT).size(12.0).italics());
                return;
            };

            field_grid(ui, ("wx_fields", slot), &fields.rows, 13.0);

            ui.add_space(4.0);
            ui.horizontal(|ui| {
                pressure(ui, "QNH", &fields.qnh);
                ui.add_space(12.0);
                pressure(ui, "QFE", &fields.qfe);
            });

            let dial_size = inner_width.min(DIAL_MAX);
            if let Some(texture) = dials.get(
                ui.ctx(),
                generation,
                slot,
                weather_box.revision,
                dial_size,
                &report.wind,
            ) {
                ui.add_space(4.0);
                ui.vertical_centered(|ui| {
                    ui.add(egui::Image::from_texture(egui::load::SizedTexture::new(
                        texture.id(),
                        egui::vec2(dial_size, dial_size),
                    )));
                });
            }
        });
}

fn pressure(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.label(RichText::new(format!("{label}:"))
        .color(PANEL_TEXT)
        .size(13.0)
        .monospace());
    ui.label(RichText::new(value)
        .color(PANEL_TEXT)
        .size(18.0)
        .monospace()
        .strong());
}

fn field_grid(ui: &mut egui::Ui, id: impl std::hash::Hash, rows: &[WeatherField], size: f32) {
    egui::Grid::new(id)
        .num_columns(2)
        .spacing([8.0, 1.0])
        .show(ui, |ui| {
            for row in rows {
                ui.label(RichText::new(&row.label).color(PANEL_TEXT).size(size).monospace());
                ui.label(RichText::new(&row.value).color(PANEL_TEXT).size(size).monospace().strong());
                ui.end_row();
            }
        });
}

fn composite_grid(ui: &mut egui::Ui, index: usize, view: &CompositeView, width: f32) {
    let inner_width = width - 2.0 * f32::from(BOX_MARGIN);

    egui::Frame::new()
        .fill(COMPOSITE_FILL)
        .stroke(egui::Stroke::new(1.0, Color32::from_rgb(60, 80, 100)))
        .corner_radius(6.0)
        .inner_margin(egui::Margin::same(BOX_MARGIN))
        .show(ui, |ui| {
            ui.set_width(inner_width);

            let Some(cells) = &view.cells else {
                ui.label(RichText::new("Fetching weather...").color(MUTED).size(12.0).italics());
                return;
            };

            #[allow(clippy::cast_precision_loss, reason = "three columns")]
            let cell_width = inner_width / COMPOSITE_COLUMNS as f32 - 4.0;
            egui::Grid::new(("wx_composite", index))
                .num_columns(COMPOSITE_COLUMNS)
                .spacing([4.0, 6.0])
                .min_col_width(cell_width)
                .max_col_width(cell_width)
                .show(ui, |ui| {
                    for row in cells.chunks(COMPOSITE_COLUMNS) {
                        for cell in row {
                            ui.vertical(|ui| composite_cell(ui, index, cell));
                        }
                        ui.end_row();
                    }
                });
        });
}

fn composite_cell(ui: &mut egui::Ui, index: usize, cell: &CompositeCell) {
    let color = Color32::from_rgb(100, 180, 220);
    ui.label(RichText::new(&cell.airport).color(color).size(12.0).monospace().strong());

    match &cell.rows {
        Some(rows) => field_grid(ui, ("wx_cell", index, &cell.airport), rows, 10.0),
        None => {
            ui.label(RichText::new("NO DATA")
                .color(Color32::from_rgb(255, 100, 100))
                .size(10.0)
                .monospace());
        }
    }
}

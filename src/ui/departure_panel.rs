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

//! Departure list sections.

use deplist_core::departures::{DepartureRow, SectionView};
use deplist_core::{DepartureBoard, HEADER_HEIGHT, ROW_HEIGHT};
use egui::{Align2, Color32, FontId, RichText};
use egui_extras::{Size, StripBuilder};

use super::UiAction;

const HEADER_FILL: Color32 = Color32::from_rgb(30, 38, 46);
const ROW_FILL: Color32 = Color32::from_rgb(18, 22, 26);
const STARTED_FILL: Color32 = Color32::from_rgb(64, 64, 64);
const ROW_TEXT: Color32 = Color32::from_rgb(100, 255, 100);
const STARTED_TEXT: Color32 = Color32::from_rgb(170, 170, 170);
const SEPARATOR: Color32 = Color32::from_rgb(40, 50, 60);

/// Left edge of each column as a fraction of the row width:
/// callsign, squawk, SID, route glyph, status marker.
const COLUMNS: [f32; 5] = [0.0, 0.30, 0.48, 0.68, 0.80];

/// Draw every section and return the height that was available to them,
/// which feeds the resize debouncer.
pub fn show(ui: &mut egui::Ui, board: &DepartureBoard, actions: &mut Vec<UiAction>) -> f32 {
    let available = ui.available_height();

    // Sections appear once the container has been measured.
    if !board.is_laid_out() {
        return available;
    }

    ui.scope(|ui| {
        ui.spacing_mut().item_spacing = egui::Vec2::ZERO;

        let views: Vec<SectionView<'_>> = board.views().collect();
        let mut builder = StripBuilder::new(ui);
        for view in &views {
            let height = view.state.geometry.map_or(0.0, |g| g.height);
            builder = builder.size(Size::exact(height));
        }

        builder.vertical(|mut strip| {
            for (index, view) in views.iter().enumerate() {
                strip.cell(|ui| section(ui, index, view, actions));
            }
        });
    });

    available
}

fn section(ui: &mut egui::Ui, index: usize, view: &SectionView<'_>, actions: &mut Vec<UiAction>) {
    let width = ui.available_width();

    // Header
    let (header_rect, _) = ui.allocate_exact_size(egui::vec2(width, HEADER_HEIGHT), egui::Sense::hover());
    ui.painter().rect_filled(header_rect, 0.0, HEADER_FILL);
    let mut header_ui = ui.new_child(
        egui::UiBuilder::new()
            .max_rect(header_rect.shrink2(egui::vec2(6.0, 0.0)))
            .layout(egui::Layout::left_to_right(egui::Align::Center)),
    );
    header_ui.label(RichText::new(&view.state.label)
        .color(Color32::from_rgb(100, 180, 220))
        .size(13.0)
        .monospace()
        .strong());
    header_ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        if ui.button(RichText::new(view.state.toggle_text()).size(10.0).monospace())
            .clicked() {
            actions.push(UiAction::ToggleStarted(index));
        }
        ui.add_space(8.0);
        ui.label(RichText::new(view.listing.more_text())
            .color(if view.listing.overflow > 0 {
                Color32::from_rgb(255, 200, 100)
            } else {
                Color32::from_rgb(130, 130, 130)
            })
            .size(11.0)
            .monospace());
    });

    // Rows
    for row in &view.listing.rows {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, ROW_HEIGHT), egui::Sense::hover());
        paint_row(ui.painter(), rect, row);
    }
}

fn paint_row(painter: &egui::Painter, rect: egui::Rect, row: &DepartureRow) {
    let (fill, color) = if row.is_started() {
        (STARTED_FILL, STARTED_TEXT)
    } else {
        (ROW_FILL, ROW_TEXT)
    };
    painter.rect_filled(rect, 0.0, fill);
    painter.hline(rect.x_range(), rect.bottom() - 0.5, egui::Stroke::new(1.0, SEPARATOR));

    let font = FontId::monospace(15.0);
    let marker = row.marker.text();
    let cells = [
        row.callsign.as_str(),
        row.squawk.as_str(),
        row.sid.as_str(),
        row.route.as_str(),
        marker.as_str(),
    ];
    for (offset, text) in COLUMNS.iter().zip(cells) {
        let pos = egui::pos2(rect.left() + 6.0 + offset * rect.width(), rect.center().y);
        painter.text(pos, Align2::LEFT_CENTER, text, font.clone(), color);
    }
}

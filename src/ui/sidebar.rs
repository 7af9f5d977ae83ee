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

//! Sector selector and the eight-slot position bank.

use deplist_core::DisplayController;

use super::UiAction;

const SLOT_SIZE: egui::Vec2 = egui::vec2(150.0, 34.0);

pub fn show(ui: &mut egui::Ui, controller: &DisplayController, actions: &mut Vec<UiAction>) {
    let catalog = controller.catalog();
    let current = controller.sector_id();

    ui.label(egui::RichText::new("SECTOR")
        .color(egui::Color32::from_rgb(150, 150, 150))
        .size(10.0)
        .strong());

    let selected_name = current
        .and_then(|id| catalog.sector_groups.iter().find(|g| g.id == id))
        .map_or("Select sector", |g| g.name.as_str());

    egui::ComboBox::from_id_salt("sector_select")
        .selected_text(selected_name)
        .width(SLOT_SIZE.x)
        .show_ui(ui, |ui| {
            for group in &catalog.sector_groups {
                let is_current = current == Some(group.id.as_str());
                if ui.selectable_label(is_current, &group.name).clicked() && !is_current {
                    actions.push(UiAction::SelectSector(group.id.clone()));
                }
            }
        });

    ui.add_space(10.0);
    ui.label(egui::RichText::new("POSITIONS")
        .color(egui::Color32::from_rgb(150, 150, 150))
        .size(10.0)
        .strong());
    ui.add_space(2.0);

    let Some(sector_id) = current else {
        return;
    };

    // Empty slots keep their place so the bank never reflows.
    for position in catalog.position_slots(sector_id) {
        match position {
            Some(position) => {
                let highlighted = controller.is_highlighted(&position.id);
                let text = egui::RichText::new(&position.name)
                    .size(12.0)
                    .monospace()
                    .strong();
                let button = egui::Button::new(text)
                    .selected(highlighted)
                    .min_size(SLOT_SIZE);
                let response = ui.add(button);
                let response = match &position.alias_for {
                    Some(target) => response.on_hover_text(format!("Shows {target}")),
                    None => response,
                };
                if response.clicked() {
                    actions.push(UiAction::SelectPosition(position.id.clone()));
                }
            }
            None => {
                ui.add_enabled(false, egui::Button::new("").min_size(SLOT_SIZE));
            }
        }
    }
}

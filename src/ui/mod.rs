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

//! UI components for the departure list display.
//!
//! Each panel draws from the controller's state and reports clicks back as
//! [`UiAction`]s, which the app applies once the frame has been laid out.

pub mod departure_panel;
pub mod sidebar;
pub mod status_bar;
pub mod weather_panel;
pub mod wind_dial_texture;

pub use wind_dial_texture::DialTextures;

use egui::Color32;

/// Background of the main display area.
pub const BACKGROUND: Color32 = Color32::from_rgb(12, 16, 20);

/// Text drawn on airport-coloured surfaces.
pub const PANEL_TEXT: Color32 = Color32::from_rgb(235, 235, 235);

/// Input collected while drawing a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    SelectSector(String),
    SelectPosition(String),
    ToggleStarted(usize),
    ClearDiagnostics,
}

/// Parse a catalog colour such as `#4169e1`, falling back to `fallback`.
pub fn parse_color(hex: &str, fallback: Color32) -> Color32 {
    Color32::from_hex(hex).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#4169e1", Color32::BLACK), Color32::from_rgb(0x41, 0x69, 0xe1));
        assert_eq!(parse_color("royalblue", Color32::BLACK), Color32::BLACK);
        assert_eq!(parse_color("", Color32::RED), Color32::RED);
    }
}

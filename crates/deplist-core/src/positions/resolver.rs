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

//! Resolution of a clicked (sector, position) pair to renderable content.

use std::collections::BTreeSet;

use log::debug;

use super::{
    DepartureSectionConfig, LayoutMode, PositionCatalog, PositionConfig, SectorConfig,
    WeatherSectionConfig,
};

/// Number of position buttons in the sidebar bank.
pub const POSITION_SLOTS: usize = 8;

/// Effective configuration for a selected position.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPosition {
    pub sector_id: String,
    /// Id of the button the operator pressed (may be an alias).
    pub clicked_id: String,
    /// Id of the real position whose content is rendered.
    pub target_id: String,
    pub name: String,
    pub layout: LayoutMode,
    pub weather_sections: Vec<WeatherSectionConfig>,
    pub sections: Vec<DepartureSectionConfig>,
    /// Position buttons that show as active: the target plus its linked ids.
    pub highlight: BTreeSet<String>,
}

impl ResolvedPosition {
    #[must_use]
    pub fn is_highlighted(&self, position_id: &str) -> bool {
        self.highlight.contains(position_id)
    }
}

/// Follow `alias_for` links inside one sector until a real position is found.
///
/// Returns `None` for a missing target or a cycle.
fn follow_alias<'a>(sector: &'a SectorConfig, start: &'a PositionConfig) -> Option<&'a PositionConfig> {
    let mut current = start;
    for _ in 0..=sector.positions.len() {
        match &current.alias_for {
            None => return Some(current),
            Some(target) => current = sector.position(target)?,
        }
    }
    None
}

impl PositionCatalog {
    /// Resolve a position click. Unknown ids and broken aliases yield `None`.
    #[must_use]
    pub fn resolve_position(&self, sector_id: &str, position_id: &str) -> Option<ResolvedPosition> {
        let sector = self.sector(sector_id)?;
        let clicked = sector.position(position_id)?;
        let target = follow_alias(sector, clicked)?;

        debug!("Position {position_id} in {sector_id} resolved to {}", target.id);

        let highlight = std::iter::once(target.id.clone())
            .chain(target.linked_positions.iter().cloned())
            .collect();

        Some(ResolvedPosition {
            sector_id: sector_id.to_string(),
            clicked_id: clicked.id.clone(),
            target_id: target.id.clone(),
            name: target.name.clone(),
            layout: target.layout,
            weather_sections: target.weather_sections.clone(),
            sections: target.sections.clone(),
            highlight,
        })
    }

    /// Position to open when a sector tab is selected.
    ///
    /// Uses the configured default when it exists, otherwise the first entry.
    #[must_use]
    pub fn default_position(&self, sector_id: &str) -> Option<&str> {
        let sector = self.sector(sector_id)?;
        sector
            .default_position
            .as_deref()
            .and_then(|id| sector.position(id))
            .or_else(|| sector.positions.first())
            .map(|p| p.id.as_str())
    }

    /// The sidebar button bank for a sector; slots beyond the configured
    /// positions are `None` and render disabled.
    #[must_use]
    pub fn position_slots(&self, sector_id: &str) -> [Option<&PositionConfig>; POSITION_SLOTS] {
        let mut slots = [None; POSITION_SLOTS];
        if let Some(sector) = self.sector(sector_id) {
            for (slot, position) in slots.iter_mut().zip(&sector.positions) {
                *slot = Some(position);
            }
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PositionCatalog {
        PositionCatalog::from_json(
            r#"{
            "sector_groups": [
                {"id": "TC_NORTH", "name": "TC NORTH"},
                {"id": "EMPTY", "name": "EMPTY"},
                {"id": "NODEFAULT", "name": "NODEFAULT"}
            ],
            "sectors": {
                "TC_NORTH": {
                    "default_position": "NW_DEPS",
                    "positions": [
                        {"id": "NW_DEPS", "name": "NW DEPS", "linked_positions": ["BNN"],
                         "weather_sections": [{"airport": "EGGW", "label": "LUTON"}],
                         "sections": [{"airport": "EGLL", "label": "EGLL ULTIB", "height_percent": 100, "sids": ["ULTIB"]}]},
                        {"id": "BNN", "name": "BNN", "alias_for": "NW_DEPS"},
                        {"id": "CHAIN", "name": "CHAIN", "alias_for": "BNN"},
                        {"id": "LOOP_A", "name": "A", "alias_for": "LOOP_B"},
                        {"id": "LOOP_B", "name": "B", "alias_for": "LOOP_A"},
                        {"id": "DANGLING", "name": "D", "alias_for": "MISSING"}
                    ]
                },
                "EMPTY": {"positions": []},
                "NODEFAULT": {
                    "default_position": "GONE",
                    "positions": [{"id": "FIRST", "name": "FIRST"}, {"id": "SECOND", "name": "SECOND"}]
                }
            }
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_alias_renders_target_content() {
        let catalog = catalog();
        let direct = catalog.resolve_position("TC_NORTH", "NW_DEPS").unwrap();
        let alias = catalog.resolve_position("TC_NORTH", "BNN").unwrap();

        assert_eq!(alias.target_id, "NW_DEPS");
        assert_eq!(alias.clicked_id, "BNN");
        assert_eq!(alias.sections, direct.sections);
        assert_eq!(alias.weather_sections, direct.weather_sections);
        assert_eq!(alias.highlight, direct.highlight);
    }

    #[test]
    fn test_alias_click_highlights_target_and_linked() {
        let resolved = catalog().resolve_position("TC_NORTH", "BNN").unwrap();
        assert!(resolved.is_highlighted("NW_DEPS"));
        assert!(resolved.is_highlighted("BNN"));
        assert!(!resolved.is_highlighted("CHAIN"));
        assert_eq!(resolved.highlight.len(), 2);
    }

    #[test]
    fn test_alias_chain_resolves_transitively() {
        let resolved = catalog().resolve_position("TC_NORTH", "CHAIN").unwrap();
        assert_eq!(resolved.target_id, "NW_DEPS");
    }

    #[test]
    fn test_broken_lookups_fail_silently() {
        let catalog = catalog();
        assert!(catalog.resolve_position("TC_NORTH", "NOPE").is_none());
        assert!(catalog.resolve_position("TC_NORTH", "DANGLING").is_none());
        assert!(catalog.resolve_position("TC_NORTH", "LOOP_A").is_none());
        assert!(catalog.resolve_position("NOWHERE", "NW_DEPS").is_none());
    }

    #[test]
    fn test_default_position_selection() {
        let catalog = catalog();
        assert_eq!(catalog.default_position("TC_NORTH"), Some("NW_DEPS"));
        assert_eq!(catalog.default_position("NODEFAULT"), Some("FIRST"));
        assert_eq!(catalog.default_position("EMPTY"), None);
        assert_eq!(catalog.default_position("NOWHERE"), None);
    }

    #[test]
    fn test_position_slots_pad_with_disabled_buttons() {
        let catalog = catalog();
        let slots = catalog.position_slots("NODEFAULT");
        assert_eq!(slots[0].map(|p| p.id.as_str()), Some("FIRST"));
        assert_eq!(slots[1].map(|p| p.id.as_str()), Some("SECOND"));
        assert!(slots[2..].iter().all(Option::is_none));
        assert!(catalog.position_slots("EMPTY").iter().all(Option::is_none));
    }
}

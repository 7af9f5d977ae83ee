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

//! Static position catalog.
//!
//! The catalog enumerates sector groups and, per sector group, the working
//! positions an operator can select. Each position is either a real position
//! carrying its own weather and departure sections, or an alias that points
//! at a sibling. The catalog is a load-time asset; nothing here mutates it
//! after construction.

mod resolver;

pub use resolver::{ResolvedPosition, POSITION_SLOTS};

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::{height_percent_total, PERCENT_TOLERANCE};

/// Colour used for weather boxes whose airport has no entry in the colour table.
pub const DEFAULT_AIRPORT_COLOR: &str = "#4169e1";

const BUILTIN_CATALOG: &str = include_str!("../../assets/positions.json");

/// Errors raised while loading a position catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read position catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid position catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level navigation tab.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SectorGroup {
    pub id: String,
    pub name: String,
}

/// Keyword found in a filed route and the short glyph shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteIndicator {
    pub keyword: String,
    pub display: String,
}

/// One departure list section within a position.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepartureSectionConfig {
    /// ICAO code of the departure airport.
    pub airport: String,
    pub label: String,
    /// Share of the departure container height; siblings should sum to 100.
    pub height_percent: f64,
    /// SID name prefixes, matched case-sensitively against the assigned SID.
    #[serde(default)]
    pub sids: Vec<String>,
    #[serde(default)]
    pub route_indicators: Vec<RouteIndicator>,
    /// When non-empty, the filed route must contain at least one of these.
    #[serde(default)]
    pub required_route_keywords: Vec<String>,
}

/// Weather box declaration.
///
/// Untagged so the catalog can write a plain `{airport, label}` for a
/// standard box and `{type: "composite", airports: [...]}` for a grid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WeatherSectionConfig {
    Composite {
        #[serde(rename = "type")]
        kind: CompositeTag,
        airports: Vec<String>,
    },
    Standard {
        airport: String,
        label: String,
    },
}

/// Marker for the `type: "composite"` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeTag {
    Composite,
}

/// How a position arranges its content area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Weather column beside the departure lists.
    #[default]
    Standard,
    /// Weather panels across the full width, no departure container at all.
    WeatherOnly,
}

/// A named working position within a sector group.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionConfig {
    pub id: String,
    pub name: String,
    /// When set, this entry has no content of its own.
    #[serde(default)]
    pub alias_for: Option<String>,
    #[serde(default)]
    pub layout: LayoutMode,
    #[serde(default)]
    pub weather_sections: Vec<WeatherSectionConfig>,
    #[serde(default)]
    pub sections: Vec<DepartureSectionConfig>,
    /// Sibling ids sharing the same physical console; highlighted together.
    #[serde(default)]
    pub linked_positions: Vec<String>,
}

impl PositionConfig {
    #[must_use]
    pub fn is_alias(&self) -> bool {
        self.alias_for.is_some()
    }
}

/// Positions belonging to one sector group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SectorConfig {
    #[serde(default)]
    pub default_position: Option<String>,
    #[serde(default)]
    pub positions: Vec<PositionConfig>,
}

impl SectorConfig {
    /// Find a position entry by id.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<&PositionConfig> {
        self.positions.iter().find(|p| p.id == id)
    }
}

/// A configuration-time problem. Never fatal; logged and shown as a diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogWarning {
    MissingAliasTarget { sector: String, position: String, target: String },
    UnknownLinkedPosition { sector: String, position: String, linked: String },
    UnknownDefaultPosition { sector: String, default: String },
    UnknownSector { sector: String },
    HeightPercentMismatch { sector: String, position: String, total: f64 },
}

impl std::fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAliasTarget { sector, position, target } => {
                write!(f, "{sector}/{position}: alias target {target} does not exist")
            }
            Self::UnknownLinkedPosition { sector, position, linked } => {
                write!(f, "{sector}/{position}: linked position {linked} is not a sibling")
            }
            Self::UnknownDefaultPosition { sector, default } => {
                write!(f, "{sector}: default position {default} does not exist")
            }
            Self::UnknownSector { sector } => {
                write!(f, "{sector}: positions configured for an undeclared sector group")
            }
            Self::HeightPercentMismatch { sector, position, total } => {
                write!(f, "{sector}/{position}: section heights add up to {total}%, not 100%")
            }
        }
    }
}

/// The full static configuration for the display.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionCatalog {
    pub sector_groups: Vec<SectorGroup>,
    #[serde(default)]
    pub airport_colors: BTreeMap<String, String>,
    #[serde(default = "default_airport_color")]
    pub default_airport_color: String,
    #[serde(default)]
    pub sectors: BTreeMap<String, SectorConfig>,
}

fn default_airport_color() -> String {
    DEFAULT_AIRPORT_COLOR.to_string()
}

impl PositionCatalog {
    /// Parse a catalog from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    #[must_use]
    pub fn sector(&self, sector_id: &str) -> Option<&SectorConfig> {
        self.sectors.get(sector_id)
    }

    /// Background colour for an airport's weather box.
    #[must_use]
    pub fn airport_color(&self, icao: &str) -> &str {
        self.airport_colors
            .get(icao)
            .map_or(self.default_airport_color.as_str(), String::as_str)
    }

    /// Check cross-references that the loader cannot express in types.
    #[must_use]
    pub fn validate(&self) -> Vec<CatalogWarning> {
        let mut warnings = Vec::new();
        let declared: HashSet<&str> = self.sector_groups.iter().map(|s| s.id.as_str()).collect();

        for (sector_id, sector) in &self.sectors {
            if !declared.contains(sector_id.as_str()) {
                warnings.push(CatalogWarning::UnknownSector { sector: sector_id.clone() });
            }

            let ids: HashSet<&str> = sector.positions.iter().map(|p| p.id.as_str()).collect();

            if let Some(default) = &sector.default_position {
                if !ids.contains(default.as_str()) {
                    warnings.push(CatalogWarning::UnknownDefaultPosition {
                        sector: sector_id.clone(),
                        default: default.clone(),
                    });
                }
            }

            for position in &sector.positions {
                if let Some(target) = &position.alias_for {
                    if !ids.contains(target.as_str()) {
                        warnings.push(CatalogWarning::MissingAliasTarget {
                            sector: sector_id.clone(),
                            position: position.id.clone(),
                            target: target.clone(),
                        });
                    }
                    continue;
                }

                for linked in &position.linked_positions {
                    if !ids.contains(linked.as_str()) {
                        warnings.push(CatalogWarning::UnknownLinkedPosition {
                            sector: sector_id.clone(),
                            position: position.id.clone(),
                            linked: linked.clone(),
                        });
                    }
                }

                if position.layout == LayoutMode::Standard && !position.sections.is_empty() {
                    let total = height_percent_total(&position.sections);
                    if (total - 100.0).abs() > PERCENT_TOLERANCE {
                        warnings.push(CatalogWarning::HeightPercentMismatch {
                            sector: sector_id.clone(),
                            position: position.id.clone(),
                            total,
                        });
                    }
                }
            }
        }

        warnings
    }
}

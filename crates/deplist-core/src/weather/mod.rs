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

//! Weather panel model.
//!
//! Reports come from the backend already decoded from METAR. This module
//! turns them into display text and keeps the per-box state of the panel
//! (fetching, loaded, unavailable) so the front end only has to draw it.

pub mod wind_dial;

use log::debug;
use serde::{Deserialize, Deserializer};

use crate::positions::{LayoutMode, PositionCatalog, ResolvedPosition, WeatherSectionConfig};

/// Number of cloud rows in a standard box, filled or not.
pub const CLOUD_ROWS: usize = 3;

/// Column count of the composite grid.
pub const COMPOSITE_COLUMNS: usize = 3;

const MISSING_PRESSURE: &str = "N/A";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub direction: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub gust: Option<f64>,
    #[serde(default)]
    pub variable_from: Option<f64>,
    #[serde(default)]
    pub variable_to: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloudLayer {
    pub cover: String,
    /// Base in feet.
    pub height: u32,
}

impl CloudLayer {
    fn text(&self) -> String {
        format!("{} {}", self.cover, self.height)
    }
}

/// `GET /weather/{ICAO}` response. Every field may be missing or null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WeatherReport {
    /// Undecoded METAR.
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub airport: Option<String>,
    /// Time of issue, "HHMM".
    #[serde(default)]
    pub toi: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cavok: bool,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clouds: Vec<CloudLayer>,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub dewpoint: Option<f64>,
    #[serde(default)]
    pub qnh: Option<String>,
    #[serde(default)]
    pub qfe: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wind: Wind,
}

impl WeatherReport {
    /// Cloud layers highest first; empty under CAVOK.
    #[must_use]
    pub fn clouds_highest_first(&self) -> Vec<&CloudLayer> {
        if self.cavok {
            return Vec::new();
        }
        let mut layers: Vec<_> = self.clouds.iter().collect();
        layers.sort_by(|a, b| b.height.cmp(&a.height));
        layers
    }
}

/// Round half towards positive infinity, so -2.5 becomes -2.
#[must_use]
pub fn round_half_up(value: f64) -> i64 {
    #[allow(clippy::cast_possible_truncation, reason = "weather values are small")]
    let rounded = (value + 0.5).floor() as i64;
    rounded
}

/// Two-digit temperature, negatives as "M" plus the magnitude.
#[must_use]
pub fn format_temperature(celsius: f64) -> String {
    let rounded = round_half_up(celsius);
    if rounded >= 0 {
        format!("{rounded:02}")
    } else {
        format!("M{:02}", rounded.unsigned_abs())
    }
}

/// "1013hPa" becomes "1013A"; missing or empty becomes "N/A".
#[must_use]
pub fn format_pressure(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .map_or_else(|| MISSING_PRESSURE.to_string(), |v| v.replace("hPa", "A"))
}

/// One label/value line. Labels carry their colon; continuation rows have
/// an empty label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherField {
    pub label: String,
    pub value: String,
}

impl WeatherField {
    fn new(label: &str, value: impl Into<String>) -> Self {
        let label = if label.is_empty() {
            String::new()
        } else {
            format!("{label}:")
        };
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Text content of a standard box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherFields {
    pub rows: Vec<WeatherField>,
    pub qnh: String,
    pub qfe: String,
}

/// Field rows for a standard box in display order.
#[must_use]
pub fn standard_fields(report: &WeatherReport) -> WeatherFields {
    let mut rows = Vec::with_capacity(7);

    if let Some(toi) = report.toi.as_deref().filter(|t| !t.is_empty()) {
        rows.push(WeatherField::new("TOI", toi));
    }

    let (visibility, wx) = if report.cavok {
        (String::new(), "CAVOK".to_string())
    } else {
        (
            report.visibility.clone().unwrap_or_default(),
            report.weather.clone().unwrap_or_default(),
        )
    };
    rows.push(WeatherField::new("VISIBILITY", visibility));
    rows.push(WeatherField::new("WX", wx));

    let clouds = report.clouds_highest_first();
    for i in 0..CLOUD_ROWS {
        let label = if i == 0 { "CLOUD" } else { "" };
        let value = clouds.get(i).map(|c| c.text()).unwrap_or_default();
        rows.push(WeatherField::new(label, value));
    }

    if let (Some(temp), Some(dewpoint)) = (report.temp, report.dewpoint) {
        rows.push(WeatherField::new(
            "TEMP/DP",
            format!("{}/{}", format_temperature(temp), format_temperature(dewpoint)),
        ));
    }

    WeatherFields {
        rows,
        qnh: format_pressure(report.qnh.as_deref()),
        qfe: format_pressure(report.qfe.as_deref()),
    }
}

/// One airport in a composite grid. `rows` is `None` when the fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeCell {
    pub airport: String,
    pub rows: Option<Vec<WeatherField>>,
}

impl CompositeCell {
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        self.rows.is_none()
    }
}

/// Compact cell content for a composite grid.
#[must_use]
pub fn composite_cell(airport: &str, report: Option<&WeatherReport>) -> CompositeCell {
    let Some(report) = report else {
        return CompositeCell {
            airport: airport.to_string(),
            rows: None,
        };
    };

    let temp = report.temp.map_or_else(|| "--".to_string(), format_temperature);
    let dewpoint = report.dewpoint.map_or_else(|| "--".to_string(), format_temperature);
    let toi = report.toi.as_deref().filter(|t| !t.is_empty()).unwrap_or("--");

    let mut rows = vec![
        WeatherField::new("TOI", format!("{toi}Z")),
        WeatherField::new("TEMP/DP", format!("{temp}/{dewpoint}")),
        WeatherField::new("QNH", format_pressure(report.qnh.as_deref())),
    ];

    if report.cavok {
        rows.push(WeatherField::new("CLD", "CAVOK"));
    } else if report.clouds.is_empty() {
        rows.push(WeatherField::new("CLD", "SKC"));
    } else {
        for (i, layer) in report.clouds_highest_first().into_iter().enumerate() {
            rows.push(WeatherField::new(if i == 0 { "CLD" } else { "" }, layer.text()));
        }
    }

    CompositeCell {
        airport: airport.to_string(),
        rows: Some(rows),
    }
}

/// Lifecycle of one standard box.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxContent {
    /// Placeholder shown until the first response arrives.
    Fetching,
    Loaded(Box<WeatherReport>),
    /// The last fetch failed. Title and background stay in place.
    Unavailable,
}

/// A single-airport weather box.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherBox {
    pub airport: String,
    pub label: String,
    pub color: String,
    pub content: BoxContent,
    /// Bumped on every content change; keys rasterised dial caches.
    pub revision: u64,
}

impl WeatherBox {
    #[must_use]
    pub fn fields(&self) -> Option<WeatherFields> {
        match &self.content {
            BoxContent::Loaded(report) => Some(standard_fields(report)),
            BoxContent::Fetching | BoxContent::Unavailable => None,
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&WeatherReport> {
        match &self.content {
            BoxContent::Loaded(report) => Some(report.as_ref()),
            BoxContent::Fetching | BoxContent::Unavailable => None,
        }
    }

    /// Text shown in the field area when there is no report.
    #[must_use]
    pub fn placeholder(&self) -> Option<&'static str> {
        match self.content {
            BoxContent::Fetching => Some("Fetching weather..."),
            BoxContent::Unavailable => Some("Weather unavailable"),
            BoxContent::Loaded(_) => None,
        }
    }
}

/// A grid of compact cells for several airports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeView {
    pub airports: Vec<String>,
    /// `None` until the first batch completes.
    pub cells: Option<Vec<CompositeCell>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelMode {
    /// A column beside the departure lists.
    #[default]
    Standard,
    /// Boxes side by side across the whole window.
    WeatherOnly,
}

impl From<LayoutMode> for PanelMode {
    fn from(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Standard => Self::Standard,
            LayoutMode::WeatherOnly => Self::WeatherOnly,
        }
    }
}

/// What the weather timer has to fetch each tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherPlan {
    /// Airports of standard boxes, deduplicated, in panel order.
    pub airports: Vec<String>,
    /// Airport groups of composite views, by view index.
    pub composites: Vec<Vec<String>>,
}

impl WeatherPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty() && self.composites.is_empty()
    }
}

/// The weather side of a mounted position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherPanel {
    mode: PanelMode,
    boxes: Vec<WeatherBox>,
    composites: Vec<CompositeView>,
    next_revision: u64,
}

impl WeatherPanel {
    /// Build placeholder boxes for a resolved position.
    #[must_use]
    pub fn mount(position: &ResolvedPosition, catalog: &PositionCatalog) -> Self {
        let mut boxes = Vec::new();
        let mut composites = Vec::new();

        for section in &position.weather_sections {
            match section {
                WeatherSectionConfig::Standard { airport, label } => boxes.push(WeatherBox {
                    airport: airport.clone(),
                    label: label.clone(),
                    color: catalog.airport_color(airport).to_string(),
                    content: BoxContent::Fetching,
                    revision: 0,
                }),
                WeatherSectionConfig::Composite { airports, .. } => composites.push(CompositeView {
                    airports: airports.clone(),
                    cells: None,
                }),
            }
        }

        debug!(
            "Weather panel for {}: {} boxes, {} composite views",
            position.target_id,
            boxes.len(),
            composites.len()
        );

        Self {
            mode: position.layout.into(),
            boxes,
            composites,
            next_revision: 1,
        }
    }

    #[must_use]
    pub fn mode(&self) -> PanelMode {
        self.mode
    }

    #[must_use]
    pub fn boxes(&self) -> &[WeatherBox] {
        &self.boxes
    }

    #[must_use]
    pub fn composites(&self) -> &[CompositeView] {
        &self.composites
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty() && self.composites.is_empty()
    }

    /// Nothing is still waiting on its first response.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.boxes.iter().all(|b| b.content != BoxContent::Fetching)
            && self.composites.iter().all(|c| c.cells.is_some())
    }

    #[must_use]
    pub fn plan(&self) -> WeatherPlan {
        let mut airports: Vec<String> = Vec::new();
        for b in &self.boxes {
            if !airports.contains(&b.airport) {
                airports.push(b.airport.clone());
            }
        }
        WeatherPlan {
            airports,
            composites: self.composites.iter().map(|c| c.airports.clone()).collect(),
        }
    }

    /// Store a fetch result in every box showing `airport`. `None` marks
    /// the boxes unavailable. Returns how many boxes changed.
    pub fn apply_report(&mut self, airport: &str, report: Option<WeatherReport>) -> usize {
        let mut updated = 0;
        for weather_box in self.boxes.iter_mut().filter(|b| b.airport == airport) {
            weather_box.content = match &report {
                Some(report) => BoxContent::Loaded(Box::new(report.clone())),
                None => BoxContent::Unavailable,
            };
            weather_box.revision = self.next_revision;
            self.next_revision += 1;
            updated += 1;
        }
        updated
    }

    /// Rebuild composite view `index` from a completed batch. Airports
    /// missing from `results` or with `None` show as no data.
    pub fn apply_composite(
        &mut self,
        index: usize,
        results: &[(String, Option<WeatherReport>)],
    ) -> bool {
        let Some(view) = self.composites.get_mut(index) else {
            return false;
        };
        let cells = view
            .airports
            .iter()
            .map(|airport| {
                let report = results
                    .iter()
                    .find(|(icao, _)| icao == airport)
                    .and_then(|(_, report)| report.as_ref());
                composite_cell(airport, report)
            })
            .collect();
        view.cells = Some(cells);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> WeatherReport {
        serde_json::from_str(
            r#"{
                "raw": "EGLL 011220Z 24012KT 9999 FEW020 BKN045 07/M03 Q1013",
                "airport": "EGLL",
                "toi": "1220",
                "cavok": false,
                "visibility": "10KM+",
                "weather": null,
                "clouds": [{"cover": "FEW", "height": 2000}, {"cover": "BKN", "height": 4500}],
                "temp": 7.0,
                "dewpoint": -3.0,
                "qnh": "1013hPa",
                "wind": {"direction": 240, "speed": 12, "gust": null,
                         "variable_from": null, "variable_to": null}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_report_tolerates_nulls_and_missing_fields() {
        let report: WeatherReport =
            serde_json::from_str(r#"{"cavok": null, "clouds": null, "wind": null}"#).unwrap();
        assert!(!report.cavok);
        assert!(report.clouds.is_empty());
        assert_eq!(report.wind, Wind::default());
    }

    #[test]
    fn test_temperature_formatting() {
        assert_eq!(format_temperature(-3.0), "M03");
        assert_eq!(format_temperature(7.0), "07");
        assert_eq!(format_temperature(23.0), "23");
        assert_eq!(format_temperature(-0.4), "00");
        assert_eq!(format_temperature(-2.5), "M02");
        assert_eq!(format_temperature(2.5), "03");
    }

    #[test]
    fn test_temp_dp_row_needs_both_values() {
        let fields = standard_fields(&report());
        assert_eq!(fields.rows.last().unwrap().value, "07/M03");

        let blankers: [fn(&mut WeatherReport); 2] = [|r| r.temp = None, |r| r.dewpoint = None];
        for blank in blankers {
            let mut partial = report();
            blank(&mut partial);
            let fields = standard_fields(&partial);
            assert!(fields.rows.iter().all(|row| row.label != "TEMP/DP:"));
        }
    }

    #[test]
    fn test_three_cloud_rows_highest_first() {
        let mut single = report();
        single.clouds.truncate(1);
        let rows = standard_fields(&single).rows;

        assert_eq!(rows[0], WeatherField::new("TOI", "1220"));
        assert_eq!(rows[3], WeatherField::new("CLOUD", "FEW 2000"));
        assert_eq!(rows[4], WeatherField::new("", ""));
        assert_eq!(rows[5], WeatherField::new("", ""));

        let rows = standard_fields(&report()).rows;
        assert_eq!(rows[3].value, "BKN 4500");
        assert_eq!(rows[4].value, "FEW 2000");
    }

    #[test]
    fn test_cavok_blanks_visibility_and_clouds() {
        let mut cavok = report();
        cavok.cavok = true;
        let rows = standard_fields(&cavok).rows;

        assert_eq!(rows[1], WeatherField::new("VISIBILITY", ""));
        assert_eq!(rows[2], WeatherField::new("WX", "CAVOK"));
        assert!(rows[3..6].iter().all(|r| r.value.is_empty()));
    }

    #[test]
    fn test_missing_toi_omits_row() {
        let mut no_toi = report();
        no_toi.toi = None;
        assert_eq!(standard_fields(&no_toi).rows[0].label, "VISIBILITY:");
    }

    #[test]
    fn test_pressure_formatting() {
        assert_eq!(format_pressure(Some("1013hPa")), "1013A");
        assert_eq!(format_pressure(Some("")), "N/A");
        assert_eq!(format_pressure(None), "N/A");
        let fields = standard_fields(&report());
        assert_eq!((fields.qnh.as_str(), fields.qfe.as_str()), ("1013A", "N/A"));
    }

    #[test]
    fn test_composite_cell_variants() {
        let cell = composite_cell("EGLL", Some(&report()));
        let rows = cell.rows.unwrap();
        assert_eq!(rows[0].value, "1220Z");
        assert_eq!(rows[1].value, "07/M03");
        assert_eq!(rows[2].value, "1013A");
        assert_eq!(rows[3], WeatherField::new("CLD", "BKN 4500"));
        assert_eq!(rows[4], WeatherField::new("", "FEW 2000"));

        let mut sparse = WeatherReport {
            temp: Some(-1.0),
            ..WeatherReport::default()
        };
        let rows = composite_cell("EGBB", Some(&sparse)).rows.unwrap();
        assert_eq!(rows[0].value, "--Z");
        assert_eq!(rows[1].value, "M01/--");
        assert_eq!(rows[2].value, "N/A");
        assert_eq!(rows[3], WeatherField::new("CLD", "SKC"));

        sparse.cavok = true;
        sparse.clouds = report().clouds;
        let rows = composite_cell("EGBB", Some(&sparse)).rows.unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].value, "CAVOK");

        assert!(composite_cell("EGNX", None).is_no_data());
    }

    fn panel() -> WeatherPanel {
        let catalog = PositionCatalog::from_json(
            r##"{
                "sector_groups": [{"id": "S", "name": "S"}],
                "airport_colors": {"EGLL": "#00ff00"},
                "default_airport_color": "#4169e1",
                "sectors": {"S": {"positions": [{
                    "id": "P", "name": "P",
                    "weather_sections": [
                        {"airport": "EGLL", "label": "HEATHROW"},
                        {"type": "composite", "airports": ["EGBB", "EGNX"]},
                        {"airport": "EGWU", "label": "NORTHOLT"},
                        {"airport": "EGLL", "label": "HEATHROW 2"}
                    ]
                }]}}
            }"##,
        )
        .unwrap();
        let position = catalog.resolve_position("S", "P").unwrap();
        WeatherPanel::mount(&position, &catalog)
    }

    #[test]
    fn test_mount_creates_placeholders() {
        let panel = panel();
        assert_eq!(panel.mode(), PanelMode::Standard);
        assert_eq!(panel.boxes().len(), 3);
        assert_eq!(panel.composites().len(), 1);
        assert_eq!(panel.boxes()[0].color, "#00ff00");
        assert_eq!(panel.boxes()[1].color, "#4169e1");
        assert_eq!(panel.boxes()[0].placeholder(), Some("Fetching weather..."));
        assert!(!panel.is_loaded());
        assert_eq!(
            panel.plan(),
            WeatherPlan {
                airports: vec!["EGLL".to_string(), "EGWU".to_string()],
                composites: vec![vec!["EGBB".to_string(), "EGNX".to_string()]],
            }
        );
    }

    #[test]
    fn test_reports_land_by_airport_not_index() {
        let mut panel = panel();
        assert_eq!(panel.apply_report("EGWU", None), 1);
        assert_eq!(panel.apply_report("EGLL", Some(report())), 2);
        assert_eq!(panel.apply_report("KJFK", Some(report())), 0);

        let boxes = panel.boxes();
        assert_eq!(boxes[1].placeholder(), Some("Weather unavailable"));
        assert_eq!(boxes[1].label, "NORTHOLT");
        assert!(boxes[0].fields().is_some());
        assert!(boxes[2].fields().is_some());
        assert!(boxes[0].revision > 0 && boxes[0].revision != boxes[2].revision);
    }

    #[test]
    fn test_composite_failure_isolated_to_one_cell() {
        let mut panel = panel();
        let results = vec![
            ("EGNX".to_string(), None),
            ("EGBB".to_string(), Some(report())),
        ];
        assert!(panel.apply_composite(0, &results));
        assert!(!panel.apply_composite(5, &results));

        let cells = panel.composites()[0].cells.as_ref().unwrap();
        assert_eq!(cells[0].airport, "EGBB");
        assert!(!cells[0].is_no_data());
        assert!(cells[1].is_no_data());
    }
}

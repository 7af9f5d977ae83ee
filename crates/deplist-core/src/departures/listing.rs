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

//! The per-section pipeline: membership, visibility, staleness, ordering,
//! pagination and row formatting.

use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};

use super::board::SectionRuntimeState;
use super::{AircraftRecord, DepartureStatus};
use crate::positions::RouteIndicator;

/// How long an airborne aircraft stays on the list after its status change.
pub const AIRBORNE_DISPLAY_WINDOW: Duration = Duration::from_secs(180);

const NO_VALUE: &str = "----";

/// Status column content for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMarker {
    /// STUP/PUSH: no glyph, the whole row is greyed.
    Started,
    /// "/"
    Taxi,
    /// "X"
    Departed,
    /// "X MM" with the UTC minute of the status change.
    Airborne(Option<u32>),
}

impl StatusMarker {
    fn for_record(record: &AircraftRecord) -> Self {
        match record.status {
            DepartureStatus::Taxi => Self::Taxi,
            DepartureStatus::Departing => Self::Departed,
            DepartureStatus::Airborne => Self::Airborne(record.timestamp.map(|t| t.minute())),
            DepartureStatus::StartUp | DepartureStatus::Pushback | DepartureStatus::Unknown => {
                Self::Started
            }
        }
    }

    #[must_use]
    pub fn text(self) -> String {
        match self {
            Self::Started => String::new(),
            Self::Taxi => "/".to_string(),
            Self::Departed | Self::Airborne(None) => "X".to_string(),
            Self::Airborne(Some(minute)) => format!("X {minute:02}"),
        }
    }
}

/// One rendered aircraft line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureRow {
    pub callsign: String,
    pub squawk: String,
    pub sid: String,
    /// Glyph from the first route indicator whose keyword is in the route.
    pub route: String,
    pub marker: StatusMarker,
}

impl DepartureRow {
    fn from_record(record: &AircraftRecord, indicators: &[RouteIndicator]) -> Self {
        let squawk = record
            .squawk
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_VALUE)
            .to_string();

        Self {
            callsign: record.callsign.clone(),
            squawk,
            sid: sid_display(record.sid.as_deref()),
            route: route_indicator(record.route.as_deref(), indicators).to_string(),
            marker: StatusMarker::for_record(record),
        }
    }

    /// Row gets the grey "started" treatment.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.marker == StatusMarker::Started
    }
}

/// SID name with the numeric transition designator removed, e.g. "BPK7G" -> "BPK".
#[must_use]
pub fn sid_display(sid: Option<&str>) -> String {
    match sid.filter(|s| !s.is_empty()) {
        Some(sid) => sid
            .find(|c: char| c.is_ascii_digit())
            .map_or(sid, |idx| &sid[..idx])
            .to_string(),
        None => NO_VALUE.to_string(),
    }
}

fn route_indicator<'a>(route: Option<&str>, indicators: &'a [RouteIndicator]) -> &'a str {
    let Some(route) = route else {
        return "";
    };
    indicators
        .iter()
        .find(|ri| route.contains(ri.keyword.as_str()))
        .map_or("", |ri| ri.display.as_str())
}

/// Does the aircraft belong to this section at all?
#[must_use]
pub fn section_matches(state: &SectionRuntimeState, record: &AircraftRecord) -> bool {
    let Some(sid) = record.sid.as_deref().filter(|s| !s.is_empty()) else {
        return false;
    };
    if !state.sids.iter().any(|prefix| sid.starts_with(prefix.as_str())) {
        return false;
    }
    if state.required_route_keywords.is_empty() {
        return true;
    }
    record.route.as_deref().is_some_and(|route| {
        state
            .required_route_keywords
            .iter()
            .any(|keyword| route.contains(keyword.as_str()))
    })
}

fn is_current(record: &AircraftRecord, now: DateTime<Utc>) -> bool {
    match record.status {
        DepartureStatus::Airborne => record.timestamp.is_some_and(|changed| {
            // A timestamp in the future counts as fresh.
            (now - changed)
                .to_std()
                .map_or(true, |age| age <= AIRBORNE_DISPLAY_WINDOW)
        }),
        DepartureStatus::Unknown => false,
        _ => true,
    }
}

/// Result of running one section's pipeline over a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionListing {
    pub rows: Vec<DepartureRow>,
    /// Qualifying aircraft that did not fit.
    pub overflow: usize,
}

impl SectionListing {
    #[must_use]
    pub fn more_text(&self) -> String {
        format!("MORE {}", self.overflow)
    }
}

/// Filter, sort and paginate the aircraft of one airport for a section.
#[must_use]
pub fn build_listing(
    state: &SectionRuntimeState,
    aircraft: &[AircraftRecord],
    now: DateTime<Utc>,
) -> SectionListing {
    let mut visible: Vec<&AircraftRecord> = aircraft
        .iter()
        .filter(|record| section_matches(state, record))
        .filter(|record| state.show_started || !record.status.is_started())
        .filter(|record| is_current(record, now))
        .collect();

    visible.sort_by(|a, b| {
        a.status
            .rank()
            .cmp(&b.status.rank())
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    });

    let overflow = visible.len().saturating_sub(state.max_rows);
    let rows = visible
        .into_iter()
        .take(state.max_rows)
        .map(|record| DepartureRow::from_record(record, &state.route_indicators))
        .collect();

    SectionListing { rows, overflow }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap()
    }

    fn state(sids: &[&str]) -> SectionRuntimeState {
        let config = crate::positions::DepartureSectionConfig {
            airport: "EGLL".to_string(),
            label: "EGLL DEPS".to_string(),
            height_percent: 100.0,
            sids: sids.iter().map(ToString::to_string).collect(),
            route_indicators: Vec::new(),
            required_route_keywords: Vec::new(),
        };
        let mut state = SectionRuntimeState::new("TEST", 0, &config);
        state.max_rows = 20;
        state
    }

    fn aircraft(callsign: &str, sid: &str, status: DepartureStatus, secs_ago: i64) -> AircraftRecord {
        AircraftRecord {
            callsign: callsign.to_string(),
            squawk: Some("4521".to_string()),
            sid: Some(sid.to_string()),
            route: Some("BPK Q295 BRAIN".to_string()),
            status,
            timestamp: Some(now() - chrono::Duration::seconds(secs_ago)),
        }
    }

    fn callsigns(listing: &SectionListing) -> Vec<&str> {
        listing.rows.iter().map(|r| r.callsign.as_str()).collect()
    }

    #[test]
    fn test_sid_prefix_match_is_case_sensitive_prefix() {
        let record = aircraft("BAW1", "BPK7G", DepartureStatus::Taxi, 10);
        assert!(section_matches(&state(&["BPK"]), &record));
        assert!(!section_matches(&state(&["BPL"]), &record));
        assert!(!section_matches(&state(&["bpk"]), &record));
        assert!(!section_matches(&state(&["PK7"]), &record));
    }

    #[test]
    fn test_missing_or_empty_sid_never_matches() {
        let mut record = aircraft("BAW1", "", DepartureStatus::Taxi, 10);
        assert!(!section_matches(&state(&["BPK"]), &record));
        record.sid = None;
        assert!(!section_matches(&state(&["BPK"]), &record));
    }

    #[test]
    fn test_required_route_keyword_and_semantics() {
        let mut section = state(&["MATCH"]);
        section.required_route_keywords = vec!["ITVIP".to_string()];

        let mut with_keyword = aircraft("EZY1", "MATCH2A", DepartureStatus::Taxi, 10);
        with_keyword.route = Some("MATCH Q295 ITVIP M85".to_string());
        let mut without_keyword = with_keyword.clone();
        without_keyword.route = Some("MATCH Q295 BRAIN".to_string());
        let mut wrong_sid = with_keyword.clone();
        wrong_sid.sid = Some("DET2Y".to_string());
        let mut no_route = with_keyword.clone();
        no_route.route = None;

        assert!(section_matches(&section, &with_keyword));
        assert!(!section_matches(&section, &without_keyword));
        assert!(!section_matches(&section, &wrong_sid));
        assert!(!section_matches(&section, &no_route));
    }

    #[test]
    fn test_status_ordering_with_equal_timestamps() {
        let input = vec![
            aircraft("TAXI1", "BPK7G", DepartureStatus::Taxi, 30),
            aircraft("AIR1", "BPK7G", DepartureStatus::Airborne, 30),
            aircraft("STUP1", "BPK7G", DepartureStatus::StartUp, 30),
            aircraft("DEPA1", "BPK7G", DepartureStatus::Departing, 30),
        ];
        let listing = build_listing(&state(&["BPK"]), &input, now());
        assert_eq!(callsigns(&listing), vec!["AIR1", "DEPA1", "TAXI1", "STUP1"]);
    }

    #[test]
    fn test_oldest_first_within_rank_and_push_ties_stup() {
        let input = vec![
            aircraft("NEW", "BPK7G", DepartureStatus::StartUp, 5),
            aircraft("OLD", "BPK7G", DepartureStatus::Pushback, 500),
            aircraft("MID", "BPK7G", DepartureStatus::StartUp, 100),
        ];
        let listing = build_listing(&state(&["BPK"]), &input, now());
        assert_eq!(callsigns(&listing), vec!["OLD", "MID", "NEW"]);
    }

    #[test]
    fn test_airborne_staleness_window() {
        let input = vec![
            aircraft("FRESH", "BPK7G", DepartureStatus::Airborne, 179),
            aircraft("STALE", "BPK7G", DepartureStatus::Airborne, 181),
            aircraft("OLDDEPA", "BPK7G", DepartureStatus::Departing, 86_400),
            aircraft("OLDTAXI", "BPK7G", DepartureStatus::Taxi, 86_400),
        ];
        let listing = build_listing(&state(&["BPK"]), &input, now());
        assert_eq!(callsigns(&listing), vec!["FRESH", "OLDDEPA", "OLDTAXI"]);
    }

    #[test]
    fn test_unknown_status_is_dropped() {
        let input = vec![aircraft("ODD", "BPK7G", DepartureStatus::Unknown, 1)];
        assert!(build_listing(&state(&["BPK"]), &input, now()).rows.is_empty());
    }

    #[test]
    fn test_hide_started_drops_stup_and_push() {
        let input = vec![
            aircraft("STUP1", "BPK7G", DepartureStatus::StartUp, 10),
            aircraft("PUSH1", "BPK7G", DepartureStatus::Pushback, 10),
            aircraft("TAXI1", "BPK7G", DepartureStatus::Taxi, 10),
        ];
        let mut section = state(&["BPK"]);
        section.show_started = false;
        let listing = build_listing(&section, &input, now());
        assert_eq!(callsigns(&listing), vec!["TAXI1"]);
    }

    #[test]
    fn test_overflow_is_counted() {
        let input: Vec<_> = (0..12)
            .map(|i| aircraft(&format!("BAW{i}"), "BPK7G", DepartureStatus::Taxi, i))
            .collect();
        let mut section = state(&["BPK"]);
        section.max_rows = 8;

        let listing = build_listing(&section, &input, now());
        assert_eq!(listing.rows.len(), 8);
        assert_eq!(listing.more_text(), "MORE 4");

        let listing = build_listing(&section, &input[..8], now());
        assert_eq!(listing.rows.len(), 8);
        assert_eq!(listing.more_text(), "MORE 0");

        let listing = build_listing(&section, &input[..3], now());
        assert_eq!(listing.more_text(), "MORE 0");
    }

    #[test]
    fn test_row_formatting() {
        let mut section = state(&["MATCH"]);
        section.route_indicators = vec![
            RouteIndicator { keyword: "M85".to_string(), display: "ITVIP".to_string() },
            RouteIndicator { keyword: "M84".to_string(), display: "DVR".to_string() },
        ];

        let mut airborne = aircraft("EZY1", "MATCH2A", DepartureStatus::Airborne, 0);
        airborne.timestamp = Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 7, 59).unwrap());
        airborne.route = Some("MATCH M84 DVR M85".to_string());
        let mut taxi = aircraft("EZY2", "MATCH", DepartureStatus::Taxi, 10);
        taxi.squawk = None;
        taxi.route = Some("MATCH Q295".to_string());
        let depa = aircraft("EZY3", "MATCH2A", DepartureStatus::Departing, 10);
        let push = aircraft("EZY4", "MATCH2A", DepartureStatus::Pushback, 10);

        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 9, 0).unwrap();
        let listing = build_listing(&section, &[taxi, push, depa, airborne], now);
        let rows = &listing.rows;

        assert_eq!(rows[0].callsign, "EZY1");
        assert_eq!(rows[0].sid, "MATCH");
        assert_eq!(rows[0].route, "DVR");
        assert_eq!(rows[0].marker.text(), "X 07");
        assert_eq!(rows[1].marker.text(), "X");
        assert_eq!(rows[2].squawk, "----");
        assert_eq!(rows[2].route, "");
        assert_eq!(rows[2].marker.text(), "/");
        assert!(rows[3].is_started());
        assert_eq!(rows[3].marker.text(), "");
    }

    #[test]
    fn test_sid_display_strips_transition() {
        assert_eq!(sid_display(Some("BPK7G")), "BPK");
        assert_eq!(sid_display(Some("ULTIB1J")), "ULTIB");
        assert_eq!(sid_display(Some("LAM")), "LAM");
        assert_eq!(sid_display(Some("")), "----");
        assert_eq!(sid_display(None), "----");
    }
}

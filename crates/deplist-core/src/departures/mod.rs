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

//! Departure list records and the per-section filtering engine.
//!
//! Aircraft records arrive as a snapshot keyed by airport on every poll and
//! replace the previous snapshot wholesale. Sections own only UI state
//! (the started-aircraft toggle and their row limit); everything shown is
//! recomputed from the latest snapshot.

mod board;
mod listing;

pub use board::{DepartureBoard, SectionKey, SectionRuntimeState, SectionView};
pub use listing::{
    build_listing, section_matches, sid_display, DepartureRow, SectionListing, StatusMarker,
    AIRBORNE_DISPLAY_WINDOW,
};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Ground and air states reported for a departing aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum DepartureStatus {
    #[serde(rename = "STUP")]
    StartUp,
    #[serde(rename = "PUSH")]
    Pushback,
    #[serde(rename = "TAXI")]
    Taxi,
    #[serde(rename = "DEPA")]
    Departing,
    #[serde(rename = "AIRBORNE")]
    Airborne,
    /// Anything the feed sends that this display does not know about.
    #[serde(other)]
    Unknown,
}

impl DepartureStatus {
    /// Sort rank: airborne first, ground-start states last.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Airborne => 0,
            Self::Departing => 1,
            Self::Taxi => 2,
            Self::StartUp | Self::Pushback => 3,
            Self::Unknown => 4,
        }
    }

    /// STUP and PUSH, the states hidden by the "show started" toggle.
    #[must_use]
    pub fn is_started(self) -> bool {
        matches!(self, Self::StartUp | Self::Pushback)
    }
}

/// One aircraft as served by the departures endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AircraftRecord {
    pub callsign: String,
    #[serde(default)]
    pub squawk: Option<String>,
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    pub status: DepartureStatus,
    /// Instant of the last status change.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// All aircraft known to the backend, keyed by ICAO airport code.
pub type DepartureSnapshot = HashMap<String, Vec<AircraftRecord>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_deserializes_backend_payload() {
        let json = r#"{
            "EGLL": [
                {"callsign": "BAW123", "airport": "EGLL", "status": "TAXI", "sid": "BPK7G",
                 "squawk": "1234", "route": "BPK L620 DVR", "timestamp": "2025-03-01T12:00:05.123456+00:00"},
                {"callsign": "EZY9", "status": "CLEAR", "timestamp": "2025-03-01T12:00:00+00:00"}
            ]
        }"#;
        let snapshot: DepartureSnapshot = serde_json::from_str(json).unwrap();
        let egll = &snapshot["EGLL"];

        assert_eq!(egll[0].status, DepartureStatus::Taxi);
        assert_eq!(egll[0].sid.as_deref(), Some("BPK7G"));
        assert!(egll[0].timestamp.is_some());
        assert_eq!(egll[1].status, DepartureStatus::Unknown);
        assert_eq!(egll[1].squawk, None);
    }

    #[test]
    fn test_status_rank_order() {
        let mut statuses = [
            DepartureStatus::Taxi,
            DepartureStatus::Airborne,
            DepartureStatus::StartUp,
            DepartureStatus::Departing,
            DepartureStatus::Pushback,
        ];
        statuses.sort_by_key(|s| s.rank());
        assert_eq!(statuses[0], DepartureStatus::Airborne);
        assert_eq!(statuses[1], DepartureStatus::Departing);
        assert_eq!(statuses[2], DepartureStatus::Taxi);
        assert!(statuses[3].is_started() && statuses[4].is_started());
    }
}

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

use chrono::{DateTime, Utc};
use log::debug;

use super::listing::{build_listing, SectionListing};
use super::DepartureSnapshot;
use crate::layout::SectionGeometry;
use crate::positions::{DepartureSectionConfig, RouteIndicator};

/// Identifies a mounted section. Two sections of one position may share an
/// airport, so the index is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionKey {
    pub position_id: String,
    pub index: usize,
    pub airport: String,
}

/// Everything the pipeline needs to know about one mounted section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRuntimeState {
    pub key: SectionKey,
    pub label: String,
    pub height_percent: f64,
    pub sids: Vec<String>,
    pub route_indicators: Vec<RouteIndicator>,
    pub required_route_keywords: Vec<String>,
    /// None until the container has been measured.
    pub geometry: Option<SectionGeometry>,
    pub max_rows: usize,
    pub show_started: bool,
}

impl SectionRuntimeState {
    #[must_use]
    pub fn new(position_id: &str, index: usize, config: &DepartureSectionConfig) -> Self {
        Self {
            key: SectionKey {
                position_id: position_id.to_string(),
                index,
                airport: config.airport.clone(),
            },
            label: config.label.clone(),
            height_percent: config.height_percent,
            sids: config.sids.clone(),
            route_indicators: config.route_indicators.clone(),
            required_route_keywords: config.required_route_keywords.clone(),
            geometry: None,
            max_rows: 0,
            show_started: true,
        }
    }

    fn set_geometry(&mut self, geometry: SectionGeometry) {
        self.max_rows = geometry.max_rows;
        self.geometry = Some(geometry);
    }

    /// Button caption: names the action a click would perform.
    #[must_use]
    pub fn toggle_text(&self) -> &'static str {
        if self.show_started {
            "HIDE STARTED"
        } else {
            "SHOW STARTED"
        }
    }
}

/// A section paired with what it currently shows.
#[derive(Debug, Clone, Copy)]
pub struct SectionView<'a> {
    pub state: &'a SectionRuntimeState,
    pub listing: &'a SectionListing,
}

/// The departure lists of the selected position.
///
/// Holds the last snapshot so that a relayout or a toggle can re-render
/// without waiting for the next poll.
#[derive(Debug, Default)]
pub struct DepartureBoard {
    sections: Vec<SectionRuntimeState>,
    listings: Vec<SectionListing>,
    snapshot: Option<DepartureSnapshot>,
}

impl DepartureBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all sections with those of a newly selected position.
    pub fn mount(&mut self, position_id: &str, sections: &[DepartureSectionConfig]) {
        self.sections = sections
            .iter()
            .enumerate()
            .map(|(index, config)| SectionRuntimeState::new(position_id, index, config))
            .collect();
        self.listings = vec![SectionListing::default(); self.sections.len()];
        self.snapshot = None;
        debug!("Mounted {} departure sections for {position_id}", self.sections.len());
    }

    /// Empty the board, e.g. for a weather-only position.
    pub fn clear(&mut self) {
        self.sections.clear();
        self.listings.clear();
        self.snapshot = None;
    }

    /// Size sections for a measured container height and re-render the
    /// cached snapshot as of `now`. Toggle state survives.
    pub fn apply_layout(&mut self, available_height: f32, now: DateTime<Utc>) {
        for section in &mut self.sections {
            section.set_geometry(SectionGeometry::for_height(
                available_height,
                section.height_percent,
            ));
        }
        self.render(now);
    }

    #[must_use]
    pub fn is_laid_out(&self) -> bool {
        self.sections.iter().all(|s| s.geometry.is_some())
    }

    /// Take a fresh snapshot from the backend and re-render every section.
    pub fn update(&mut self, snapshot: DepartureSnapshot, now: DateTime<Utc>) {
        self.snapshot = Some(snapshot);
        self.render(now);
    }

    /// Flip one section's started-aircraft filter. Returns false for an
    /// unknown index.
    pub fn toggle_show_started(&mut self, index: usize, now: DateTime<Utc>) -> bool {
        let Some(section) = self.sections.get_mut(index) else {
            return false;
        };
        section.show_started = !section.show_started;
        debug!(
            "Section {} ({}) show_started={}",
            index, section.key.airport, section.show_started
        );
        self.render_section(index, now);
        true
    }

    #[must_use]
    pub fn sections(&self) -> &[SectionRuntimeState] {
        &self.sections
    }

    #[must_use]
    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn views(&self) -> impl Iterator<Item = SectionView<'_>> {
        self.sections
            .iter()
            .zip(&self.listings)
            .map(|(state, listing)| SectionView { state, listing })
    }

    fn render(&mut self, now: DateTime<Utc>) {
        for index in 0..self.sections.len() {
            self.render_section(index, now);
        }
    }

    fn render_section(&mut self, index: usize, now: DateTime<Utc>) {
        let (Some(section), Some(snapshot)) = (self.sections.get(index), &self.snapshot) else {
            return;
        };
        if section.geometry.is_none() {
            return;
        }
        // An airport missing from the snapshot has no departures.
        let aircraft = snapshot
            .get(&section.key.airport)
            .map_or(&[][..], Vec::as_slice);
        let listing = build_listing(section, aircraft, now);
        if let Some(slot) = self.listings.get_mut(index) {
            *slot = listing;
        }
    }
}

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

//! Departure section geometry.
//!
//! Sections are sized as a percentage of the measured departure container
//! height. The container height is unknown until the front end has laid it
//! out once, so geometry is always computed from a measurement, never at
//! construction time.

use std::time::{Duration, Instant};

use crate::positions::DepartureSectionConfig;

/// Height of a section header in pixels.
pub const HEADER_HEIGHT: f32 = 25.0;

/// Height of one departure row in pixels.
pub const ROW_HEIGHT: f32 = 28.0;

/// Quiet period after the last size change before re-laying out.
pub const RESIZE_SETTLE: Duration = Duration::from_millis(250);

/// Allowed slack when checking that section percentages sum to 100.
pub const PERCENT_TOLERANCE: f64 = 0.01;

/// Computed size of one departure section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionGeometry {
    /// Whole section including header.
    pub height: f32,
    /// Space left for rows under the header.
    pub list_height: f32,
    pub max_rows: usize,
}

impl SectionGeometry {
    #[must_use]
    pub fn for_height(available_height: f32, height_percent: f64) -> Self {
        #[allow(clippy::cast_possible_truncation, reason = "pixel heights fit in f32")]
        let height = (height_percent / 100.0 * f64::from(available_height)).floor() as f32;
        let height = height.max(0.0);
        let list_height = (height - HEADER_HEIGHT).max(0.0);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "list height is clamped non-negative before flooring"
        )]
        let max_rows = (list_height / ROW_HEIGHT).floor() as usize;

        Self {
            height,
            list_height,
            max_rows,
        }
    }
}

/// Size every section of a position for the given container height.
#[must_use]
pub fn compute_layout(sections: &[DepartureSectionConfig], available_height: f32) -> Vec<SectionGeometry> {
    sections
        .iter()
        .map(|s| SectionGeometry::for_height(available_height, s.height_percent))
        .collect()
}

#[must_use]
pub fn height_percent_total(sections: &[DepartureSectionConfig]) -> f64 {
    sections.iter().map(|s| s.height_percent).sum()
}

/// Returns the offending total when the percentages do not add up to 100.
#[must_use]
pub fn check_height_percentages(sections: &[DepartureSectionConfig]) -> Option<f64> {
    if sections.is_empty() {
        return None;
    }
    let total = height_percent_total(sections);
    ((total - 100.0).abs() > PERCENT_TOLERANCE).then_some(total)
}

/// Debounces container height changes.
///
/// The first measurement settles immediately so a freshly mounted position
/// is laid out on its first frame; later changes wait for [`RESIZE_SETTLE`]
/// of quiet before being reported.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    settle: Duration,
    settled_height: Option<f32>,
    pending: Option<(f32, Instant)>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(RESIZE_SETTLE)
    }
}

impl ResizeDebouncer {
    #[must_use]
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            settled_height: None,
            pending: None,
        }
    }

    /// Forget the settled height, e.g. after a position switch.
    pub fn reset(&mut self) {
        self.settled_height = None;
        self.pending = None;
    }

    #[must_use]
    pub fn settled_height(&self) -> Option<f32> {
        self.settled_height
    }

    /// A changed height is waiting out the settle window.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a measurement. Returns a height when a layout pass is due.
    pub fn observe(&mut self, height: f32, now: Instant) -> Option<f32> {
        if height <= 0.0 {
            return None;
        }

        let Some(settled) = self.settled_height else {
            self.settled_height = Some(height);
            self.pending = None;
            return Some(height);
        };

        if (height - settled).abs() < 0.5 {
            self.pending = None;
            return None;
        }

        match self.pending {
            Some((pending_height, since)) if (pending_height - height).abs() < 0.5 => {
                if now.duration_since(since) >= self.settle {
                    self.settled_height = Some(height);
                    self.pending = None;
                    Some(height)
                } else {
                    None
                }
            }
            _ => {
                self.pending = Some((height, now));
                None
            }
        }
    }
}

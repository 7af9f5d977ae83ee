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

//! Wind direction dial.
//!
//! A ring of 36 ten-degree segments drawn as SVG. Segments are rotated five
//! degrees anticlockwise so that segment "01" sits centred on 010; every
//! other annotation (bearing numbers, cardinal letters, arrow) uses the
//! unshifted bearing.
//!
//! The output is a self-contained SVG document sized `size` x `size`; the
//! front end rasterises it.

use std::f32::consts::PI;

use super::{round_half_up, Wind};

pub const SEGMENT_COUNT: usize = 36;
const SEGMENT_WIDTH_DEG: f32 = 10.0;
const SEGMENT_GAP_DEG: f32 = 2.0;
const SEGMENT_ROTATION_DEG: f32 = -5.0;

pub const ACTIVE_COLOR: &str = "#ffffff";
pub const INACTIVE_COLOR: &str = "#00aa00";
const TEXT_COLOR: &str = "#ffffff";

const CARDINALS: [(&str, f32); 4] = [("N", 0.0), ("E", 90.0), ("S", 180.0), ("W", 270.0)];

/// Nearest multiple of ten degrees, folded into 0..360.
fn to_segment_bearing(degrees: f64) -> i64 {
    (round_half_up(degrees / 10.0) * 10).rem_euclid(360)
}

/// Whether segment `index` (bearing `index * 10`) is lit for this wind.
///
/// A variable range lights every segment inside it, wrapping through north
/// when `from > to`. Otherwise the single segment nearest the steady
/// direction is lit. No direction and no range lights nothing.
#[must_use]
pub fn segment_active(index: usize, wind: &Wind) -> bool {
    #[allow(clippy::cast_possible_wrap, reason = "segment index is below 36")]
    let bearing = (index % SEGMENT_COUNT) as i64 * 10;

    if let (Some(from), Some(to)) = (wind.variable_from, wind.variable_to) {
        let from = to_segment_bearing(from);
        let to = to_segment_bearing(to);
        return if from <= to {
            bearing >= from && bearing <= to
        } else {
            bearing >= from || bearing <= to
        };
    }

    wind.direction
        .is_some_and(|direction| to_segment_bearing(direction) == bearing)
}

/// Bearings (in degrees) of every lit segment, ascending.
#[must_use]
pub fn active_segments(wind: &Wind) -> Vec<u16> {
    (0..SEGMENT_COUNT)
        .filter(|&i| segment_active(i, wind))
        .filter_map(|i| u16::try_from(i * 10).ok())
        .collect()
}

/// Two-digit tens-of-degrees label; north reads "36", never "00".
#[must_use]
pub fn bearing_label(bearing: u16) -> String {
    match bearing % 360 {
        0 => "36".to_string(),
        b => format!("{:02}", b / 10),
    }
}

/// Speeds printed in the centre badge and the Min/Max corners.
#[must_use]
pub fn speed_labels(wind: &Wind) -> (i64, i64) {
    let min = wind.speed.map_or(0, round_half_up);
    let max = wind.gust.map_or(min, round_half_up);
    (min, max)
}

#[derive(Clone, Copy)]
struct TextStyle {
    /// Font size as a fraction of the dial size.
    scale: f32,
    fill: &'static str,
    bold: bool,
    /// Vertically centred on the anchor point rather than sitting on it.
    centered: bool,
}

const BEARING_STYLE: TextStyle = TextStyle {
    scale: 0.03,
    fill: TEXT_COLOR,
    bold: false,
    centered: true,
};
const CARDINAL_STYLE: TextStyle = TextStyle {
    scale: 0.09,
    fill: TEXT_COLOR,
    bold: true,
    centered: true,
};
const SPEED_STYLE: TextStyle = TextStyle {
    scale: 0.08,
    fill: TEXT_COLOR,
    bold: true,
    centered: true,
};
const CORNER_CAPTION_STYLE: TextStyle = TextStyle {
    scale: 0.06,
    fill: INACTIVE_COLOR,
    bold: false,
    centered: false,
};
const CORNER_VALUE_STYLE: TextStyle = TextStyle {
    scale: 0.07,
    fill: TEXT_COLOR,
    bold: true,
    centered: false,
};

struct Dial {
    size: f32,
    center: f32,
    outer: f32,
    inner: f32,
}

impl Dial {
    fn new(size: f32) -> Self {
        Self {
            size,
            center: size / 2.0,
            outer: size * 0.4,
            inner: size * 0.35,
        }
    }

    fn point(&self, bearing: f32, radius: f32) -> (f32, f32) {
        let angle = (bearing - 90.0) * PI / 180.0;
        (
            self.center + radius * angle.cos(),
            self.center + radius * angle.sin(),
        )
    }

    fn segment_point(&self, bearing: f32, radius: f32) -> (f32, f32) {
        self.point(bearing + SEGMENT_ROTATION_DEG, radius)
    }

    fn segment_path(&self, index: usize) -> String {
        #[allow(clippy::cast_precision_loss, reason = "segment index is below 36")]
        let index = index as f32;
        let start = index * SEGMENT_WIDTH_DEG + SEGMENT_GAP_DEG / 2.0;
        let end = (index + 1.0) * SEGMENT_WIDTH_DEG - SEGMENT_GAP_DEG / 2.0;

        let (sox, soy) = self.segment_point(start, self.outer);
        let (eox, eoy) = self.segment_point(end, self.outer);
        let (six, siy) = self.segment_point(start, self.inner);
        let (eix, eiy) = self.segment_point(end, self.inner);
        let (ro, ri) = (self.outer, self.inner);

        format!(
            "M {sox:.2} {soy:.2} A {ro:.2} {ro:.2} 0 0 1 {eox:.2} {eoy:.2} \
             L {eix:.2} {eiy:.2} A {ri:.2} {ri:.2} 0 0 0 {six:.2} {siy:.2} Z"
        )
    }

    fn text(&self, (x, y): (f32, f32), style: TextStyle, body: &str) -> String {
        let TextStyle {
            scale,
            fill,
            bold,
            centered,
        } = style;
        let font = self.size * scale;
        let weight = if bold { r#" font-weight="bold""# } else { "" };
        let baseline = if centered {
            r#" dominant-baseline="middle""#
        } else {
            ""
        };
        format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle"{baseline} fill="{fill}" font-size="{font:.2}" font-family="sans-serif"{weight}>{body}</text>"#
        )
    }

    fn arrow(&self, direction: f32) -> String {
        let length = self.size * 0.08;
        let half_width = self.size * 0.03;
        let tip_radius = self.inner - self.size * 0.01;

        let (tx, ty) = self.point(direction, tip_radius);
        let (bx, by) = self.point(direction, tip_radius - length);
        let (lx, ly) = self.point(direction + 90.0, half_width);
        let (rx, ry) = self.point(direction + 270.0, half_width);
        let (lx, ly) = (bx + lx - self.center, by + ly - self.center);
        let (rx, ry) = (bx + rx - self.center, by + ry - self.center);

        format!(
            r#"<polygon points="{tx:.2},{ty:.2} {lx:.2},{ly:.2} {rx:.2},{ry:.2}" fill="{TEXT_COLOR}"/>"#
        )
    }
}

/// Build the dial SVG for a square of `size` pixels.
///
/// Returns `None` when the container has not been measured yet (zero or
/// non-finite size); the caller retries once it has a real size.
#[must_use]
pub fn render_svg(size: f32, wind: &Wind) -> Option<String> {
    if !size.is_finite() || size <= 0.0 {
        return None;
    }
    let dial = Dial::new(size);
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#
    );

    for index in 0..SEGMENT_COUNT {
        let fill = if segment_active(index, wind) {
            ACTIVE_COLOR
        } else {
            INACTIVE_COLOR
        };
        svg.push_str(&format!(r#"<path d="{}" fill="{fill}"/>"#, dial.segment_path(index)));
    }

    let label_radius = dial.outer + size * 0.03;
    for bearing in (0..360u16).step_by(30) {
        let at = dial.point(f32::from(bearing), label_radius);
        svg.push_str(&dial.text(at, BEARING_STYLE, &bearing_label(bearing)));
    }

    let cardinal_radius = dial.inner * 0.55;
    for (letter, bearing) in CARDINALS {
        let at = dial.point(bearing, cardinal_radius);
        svg.push_str(&dial.text(at, CARDINAL_STYLE, letter));
    }

    let (width, height) = (size * 0.2, size * 0.14);
    svg.push_str(&format!(
        r##"<rect x="{:.2}" y="{:.2}" width="{width:.2}" height="{height:.2}" fill="#000000" stroke="#ffffff" stroke-width="1.5" rx="5" ry="5"/>"##,
        dial.center - width / 2.0,
        dial.center - height / 2.0,
    ));

    let (min, max) = speed_labels(wind);
    svg.push_str(&dial.text((dial.center, dial.center), SPEED_STYLE, &min.to_string()));

    if let Some(direction) = wind.direction {
        if wind.speed.is_some_and(|s| s > 0.0) {
            #[allow(clippy::cast_possible_truncation, reason = "bearing in degrees")]
            svg.push_str(&dial.arrow(direction as f32));
        }
    }

    for (caption, value, x) in [("Min", min, 0.08), ("Max", max, 0.92)] {
        svg.push_str(&dial.text((size * x, size * 0.08), CORNER_CAPTION_STYLE, caption));
        svg.push_str(&dial.text((size * x, size * 0.15), CORNER_VALUE_STYLE, &value.to_string()));
    }

    svg.push_str("</svg>");
    Some(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steady(direction: f64, speed: f64) -> Wind {
        Wind {
            direction: Some(direction),
            speed: Some(speed),
            ..Wind::default()
        }
    }

    #[test]
    fn test_variable_range_wraps_through_north() {
        let wind = Wind {
            direction: Some(10.0),
            speed: Some(8.0),
            variable_from: Some(350.0),
            variable_to: Some(20.0),
            ..Wind::default()
        };
        assert_eq!(active_segments(&wind), vec![0, 10, 20, 350]);
        assert!(!segment_active(18, &wind));
    }

    #[test]
    fn test_variable_range_without_wrap() {
        let wind = Wind {
            variable_from: Some(180.0),
            variable_to: Some(240.0),
            ..Wind::default()
        };
        assert_eq!(active_segments(&wind), vec![180, 190, 200, 210, 220, 230, 240]);
    }

    #[test]
    fn test_steady_wind_lights_one_segment() {
        assert_eq!(active_segments(&steady(123.0, 12.0)), vec![120]);
        assert_eq!(active_segments(&steady(125.0, 12.0)), vec![130]);
        assert_eq!(active_segments(&steady(358.0, 12.0)), vec![0]);
        assert_eq!(active_segments(&steady(0.0, 0.0)), vec![0]);
    }

    #[test]
    fn test_no_direction_lights_nothing() {
        assert!(active_segments(&Wind::default()).is_empty());
    }

    #[test]
    fn test_bearing_labels() {
        assert_eq!(bearing_label(0), "36");
        assert_eq!(bearing_label(10), "01");
        assert_eq!(bearing_label(90), "09");
        assert_eq!(bearing_label(270), "27");
        assert_eq!(bearing_label(360), "36");
    }

    #[test]
    fn test_speed_labels() {
        assert_eq!(speed_labels(&Wind::default()), (0, 0));
        let mut wind = steady(240.0, 14.5);
        assert_eq!(speed_labels(&wind), (15, 15));
        wind.gust = Some(27.2);
        assert_eq!(speed_labels(&wind), (15, 27));
    }

    #[test]
    fn test_zero_size_draws_nothing() {
        assert!(render_svg(0.0, &steady(90.0, 5.0)).is_none());
        assert!(render_svg(f32::NAN, &steady(90.0, 5.0)).is_none());
    }

    #[test]
    fn test_svg_contents() {
        let svg = render_svg(200.0, &steady(123.0, 12.0)).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<path").count(), SEGMENT_COUNT);
        assert_eq!(svg.matches(r##"fill="#ffffff"/>"##).count(), 2); // one segment plus the arrow
        assert!(svg.contains(">36</text>"));
        assert!(!svg.contains(">00</text>"));
        assert!(svg.contains("<polygon"));
    }

    #[test]
    fn test_calm_wind_has_no_arrow() {
        let svg = render_svg(200.0, &steady(0.0, 0.0)).unwrap();
        assert!(!svg.contains("<polygon"));
        assert!(svg.contains(">0</text>"));
    }
}

//! Pure geometry of the life wheel.
//!
//! Angles follow the screen convention: slice 0 starts at 12 o'clock and
//! slices advance clockwise. Every function here is deterministic and free of
//! rendering concerns so it can back both the SVG output and pointer hover.

use std::f64::consts::{FRAC_PI_2, TAU};

use wheel_core::scoring::{clamp_score, overall_score, percentage};

/// Number of concentric grid rings drawn behind the slices.
pub const GRID_RINGS: u32 = 10;
/// Radial gap reserved for outer labels.
pub const LABEL_MARGIN: f64 = 50.0;
/// Radial gap without labels.
pub const PLAIN_MARGIN: f64 = 20.0;
/// Distance of the label anchor beyond the outer radius.
pub const LABEL_OFFSET: f64 = 25.0;
/// Upper bound of the inner (hub) radius.
pub const MAX_INNER_RADIUS: f64 = 40.0;
/// Fraction of the filled depth at which a slice's percentage is written.
pub const PERCENT_TEXT_DEPTH: f64 = 0.75;

/// One wedge of the wheel.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub label: String,
    /// Raw score; clamped to `0..=10` wherever it is used.
    pub score: f64,
    pub color: String,
    /// Owning area name, set for subcategory wedges.
    pub parent_label: Option<String>,
}

impl Segment {
    #[must_use]
    pub fn new(label: impl Into<String>, score: f64, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            score,
            color: color.into(),
            parent_label: None,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_label = Some(parent.into());
        self
    }

    #[must_use]
    pub fn clamped_score(&self) -> f64 {
        clamp_score(self.score)
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        percentage(self.score)
    }

    /// Hover text: `"Parent - Name: 80%"` with a parent, `"Name: 80%"` otherwise.
    #[must_use]
    pub fn tooltip(&self) -> String {
        match &self.parent_label {
            Some(parent) => format!("{parent} - {}: {}%", self.label, self.percentage()),
            None => format!("{}: {}%", self.label, self.percentage()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelConfig {
    /// Width and height of the square drawing area.
    pub size: f64,
    pub inner_radius_ratio: f64,
    pub show_labels: bool,
    pub show_percentages: bool,
    pub interactive: bool,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            size: 400.0,
            inner_radius_ratio: 0.2,
            show_labels: false,
            show_percentages: true,
            interactive: true,
        }
    }
}

impl WheelConfig {
    #[must_use]
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    #[must_use]
    pub fn with_percentages(mut self, show: bool) -> Self {
        self.show_percentages = show;
        self
    }

    #[must_use]
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.size / 2.0, self.size / 2.0)
    }

    #[must_use]
    pub fn max_radius(&self) -> f64 {
        let margin = if self.show_labels {
            LABEL_MARGIN
        } else {
            PLAIN_MARGIN
        };
        (self.size / 2.0 - margin).max(0.0)
    }

    #[must_use]
    pub fn inner_radius(&self) -> f64 {
        (self.max_radius() * self.inner_radius_ratio.clamp(0.0, 1.0)).min(MAX_INNER_RADIUS)
    }

    /// Radius reached by a slice with `score`.
    #[must_use]
    pub fn fill_radius(&self, score: f64) -> f64 {
        let inner = self.inner_radius();
        inner + (self.max_radius() - inner) * clamp_score(score) / 10.0
    }

    /// Radii of the grid rings, innermost first.
    #[must_use]
    pub fn grid_radii(&self) -> Vec<f64> {
        let inner = self.inner_radius();
        let depth = self.max_radius() - inner;
        (1..=GRID_RINGS)
            .map(|i| inner + depth * f64::from(i) / f64::from(GRID_RINGS))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from `self` in direction `angle` (radians, screen coordinates).
    #[must_use]
    pub fn polar(self, radius: f64, angle: f64) -> Self {
        Self::new(self.x + radius * angle.cos(), self.y + radius * angle.sin())
    }
}

/// Angle covered by one slice; zero when there are no slices.
#[must_use]
pub fn angle_step(count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = count as f64;
    TAU / n
}

/// Start and end angle of slice `index`, in canvas radians.
#[must_use]
pub fn slice_angles(index: usize, count: usize) -> (f64, f64) {
    let step = angle_step(count);
    #[allow(clippy::cast_precision_loss)]
    let i = index as f64;
    (i * step - FRAC_PI_2, (i + 1.0) * step - FRAC_PI_2)
}

/// Rounded percentage of the clamped mean segment score.
#[must_use]
pub fn center_percentage(segments: &[Segment]) -> u8 {
    percentage(overall_score(segments.iter().map(|s| s.score)))
}

/// Precomputed drawing data for one slice.
#[derive(Clone, Debug, PartialEq)]
pub struct SliceGeometry {
    pub index: usize,
    pub start_angle: f64,
    pub end_angle: f64,
    /// Full-depth background wedge.
    pub background_path: String,
    /// Score wedge; `None` when the score is zero.
    pub fill_path: Option<String>,
    pub fill_radius: f64,
    pub label_anchor: Point,
    /// `None` when the score is zero or percentages are hidden.
    pub percent_anchor: Option<Point>,
}

/// Complete wheel layout for a segment list.
#[derive(Clone, Debug, PartialEq)]
pub struct WheelLayout {
    pub config: WheelConfig,
    pub slices: Vec<SliceGeometry>,
    pub grid_radii: Vec<f64>,
    /// Divider lines from inner to outer radius, one per slice.
    pub dividers: Vec<(Point, Point)>,
    pub center_percentage: u8,
}

impl WheelLayout {
    #[must_use]
    pub fn compute(segments: &[Segment], config: WheelConfig) -> Self {
        let center = config.center();
        let inner = config.inner_radius();
        let outer = config.max_radius();
        let count = segments.len();
        let step = angle_step(count);

        let slices = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                let (start, end) = slice_angles(index, count);
                let mid = start + step / 2.0;
                let fill_radius = config.fill_radius(segment.score);
                let filled = segment.clamped_score() > 0.0;

                SliceGeometry {
                    index,
                    start_angle: start,
                    end_angle: end,
                    background_path: arc_path(center, inner, outer, start, end),
                    fill_path: filled.then(|| arc_path(center, inner, fill_radius, start, end)),
                    fill_radius,
                    label_anchor: center.polar(outer + LABEL_OFFSET, mid),
                    percent_anchor: (filled && config.show_percentages).then(|| {
                        center.polar(inner + (fill_radius - inner) * PERCENT_TEXT_DEPTH, mid)
                    }),
                }
            })
            .collect();

        let dividers = (0..count)
            .map(|index| {
                let (start, _) = slice_angles(index, count);
                (center.polar(inner, start), center.polar(outer, start))
            })
            .collect();

        Self {
            config,
            slices,
            grid_radii: if count == 0 {
                Vec::new()
            } else {
                config.grid_radii()
            },
            dividers,
            center_percentage: center_percentage(segments),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// SVG path data for the annular wedge between `inner` and `outer` radius,
/// from `start` to `end` angle (clockwise on screen).
///
/// A full turn is split into two half arcs since a single SVG arc cannot
/// start and end on the same point.
#[must_use]
pub fn arc_path(center: Point, inner: f64, outer: f64, start: f64, end: f64) -> String {
    let sweep = end - start;
    if sweep >= TAU - 1e-9 {
        let mid = start + sweep / 2.0;
        let o0 = center.polar(outer, start);
        let o1 = center.polar(outer, mid);
        let i0 = center.polar(inner, start);
        let i1 = center.polar(inner, mid);
        return format!(
            "M {} {} A {outer:.3} {outer:.3} 0 1 1 {} {} A {outer:.3} {outer:.3} 0 1 1 {} {} Z \
             M {} {} A {inner:.3} {inner:.3} 0 1 0 {} {} A {inner:.3} {inner:.3} 0 1 0 {} {} Z",
            fmt(o0.x),
            fmt(o0.y),
            fmt(o1.x),
            fmt(o1.y),
            fmt(o0.x),
            fmt(o0.y),
            fmt(i0.x),
            fmt(i0.y),
            fmt(i1.x),
            fmt(i1.y),
            fmt(i0.x),
            fmt(i0.y),
        );
    }

    let large = u8::from(sweep > std::f64::consts::PI);
    let os = center.polar(outer, start);
    let oe = center.polar(outer, end);
    let ie = center.polar(inner, end);
    let is = center.polar(inner, start);
    format!(
        "M {} {} A {outer:.3} {outer:.3} 0 {large} 1 {} {} L {} {} A {inner:.3} {inner:.3} 0 {large} 0 {} {} Z",
        fmt(os.x),
        fmt(os.y),
        fmt(oe.x),
        fmt(oe.y),
        fmt(ie.x),
        fmt(ie.y),
        fmt(is.x),
        fmt(is.y),
    )
}

fn fmt(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    // avoid "-0.000"
    if rounded == 0.0 {
        "0.000".to_string()
    } else {
        format!("{rounded:.3}")
    }
}

//
// ─── HIT TESTING ───────────────────────────────────────────────────────────────
//

/// Segment under the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub label: String,
    pub score: f64,
    pub parent_label: Option<String>,
    pub tooltip: String,
}

/// Maps a point in drawing coordinates to the slice beneath it.
///
/// Points inside the hub or beyond the outer radius hit nothing.
#[must_use]
pub fn hit_test(segments: &[Segment], config: &WheelConfig, point: Point) -> Option<Hit> {
    if segments.is_empty() {
        return None;
    }
    let center = config.center();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    let distance = dx.hypot(dy);
    if distance < config.inner_radius() || distance > config.max_radius() {
        return None;
    }

    let mut angle = dy.atan2(dx) + FRAC_PI_2;
    if angle < 0.0 {
        angle += TAU;
    }
    if angle >= TAU {
        angle -= TAU;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = ((angle / angle_step(segments.len())).floor() as usize).min(segments.len() - 1);
    let segment = &segments[index];
    Some(Hit {
        index,
        label: segment.label.clone(),
        score: segment.score,
        parent_label: segment.parent_label.clone(),
        tooltip: segment.tooltip(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four() -> Vec<Segment> {
        vec![
            Segment::new("Pessoal", 8.0, "#FF6B6B"),
            Segment::new("Qualidade de Vida", 6.0, "#4ECDC4"),
            Segment::new("Profissional", 0.0, "#45B7D1"),
            Segment::new("Relacionamentos", 12.0, "#FFA07A"),
        ]
    }

    #[test]
    fn radii_follow_label_margin() {
        let plain = WheelConfig::default();
        assert_eq!(plain.max_radius(), 180.0);
        assert_eq!(plain.inner_radius(), 36.0);

        let labelled = plain.with_labels(true);
        assert_eq!(labelled.max_radius(), 150.0);
        assert_eq!(labelled.inner_radius(), 30.0);

        let big = plain.with_size(800.0);
        assert_eq!(big.inner_radius(), MAX_INNER_RADIUS);
    }

    #[test]
    fn fill_radius_clamps_score() {
        let config = WheelConfig::default();
        assert_eq!(config.fill_radius(0.0), 36.0);
        assert_eq!(config.fill_radius(10.0), 180.0);
        assert_eq!(config.fill_radius(25.0), 180.0);
        assert_eq!(config.fill_radius(-3.0), 36.0);
        assert!((config.fill_radius(5.0) - 108.0).abs() < 1e-9);
    }

    #[test]
    fn first_slice_starts_at_twelve_oclock() {
        let (start, end) = slice_angles(0, 4);
        assert!((start + FRAC_PI_2).abs() < 1e-12);
        assert!(end.abs() < 1e-12);
    }

    #[test]
    fn midpoint_of_each_slice_hits_that_slice() {
        let config = WheelConfig::default();
        let center = config.center();
        let mid_radius = (config.inner_radius() + config.max_radius()) / 2.0;

        for count in 1..=12 {
            let segments: Vec<Segment> = (0..count)
                .map(|i| Segment::new(format!("S{i}"), 5.0, "#000"))
                .collect();
            for index in 0..count {
                let (start, end) = slice_angles(index, count);
                let point = center.polar(mid_radius, (start + end) / 2.0);
                let hit = hit_test(&segments, &config, point)
                    .unwrap_or_else(|| panic!("slice {index} of {count} missed"));
                assert_eq!(hit.index, index, "slice {index} of {count}");
                assert_eq!(hit.label, segments[index].label);
            }
        }
    }

    #[test]
    fn hub_and_outside_miss() {
        let config = WheelConfig::default();
        let segments = four();
        let center = config.center();
        assert_eq!(hit_test(&segments, &config, center), None);
        assert_eq!(
            hit_test(&segments, &config, center.polar(config.max_radius() + 1.0, 0.3)),
            None
        );
        assert_eq!(hit_test(&[], &config, center.polar(100.0, 0.3)), None);
    }

    #[test]
    fn point_straight_up_is_first_slice_and_right_is_second() {
        let config = WheelConfig::default();
        let segments = four();
        let center = config.center();
        let up = Point::new(center.x + 0.01, center.y - 100.0);
        assert_eq!(hit_test(&segments, &config, up).unwrap().index, 0);
        let right = Point::new(center.x + 100.0, center.y + 0.01);
        assert_eq!(hit_test(&segments, &config, right).unwrap().index, 1);
        let left = Point::new(center.x - 100.0, center.y - 0.01);
        assert_eq!(hit_test(&segments, &config, left).unwrap().index, 3);
    }

    #[test]
    fn tooltip_text_includes_parent_when_present() {
        let area = Segment::new("Pessoal", 8.0, "#FF6B6B");
        assert_eq!(area.tooltip(), "Pessoal: 80%");
        let sub = Segment::new("Espiritualidade", 7.33, "#4ECDC4").with_parent("Qualidade de Vida");
        assert_eq!(sub.tooltip(), "Qualidade de Vida - Espiritualidade: 73%");
    }

    #[test]
    fn layout_skips_fill_and_percent_for_zero_scores() {
        let layout = WheelLayout::compute(&four(), WheelConfig::default());
        assert_eq!(layout.slices.len(), 4);
        assert!(layout.slices[0].fill_path.is_some());
        assert!(layout.slices[2].fill_path.is_none());
        assert!(layout.slices[2].percent_anchor.is_none());
        assert_eq!(layout.grid_radii.len(), 10);
        assert_eq!(layout.dividers.len(), 4);
        // (8 + 6 + 0 + 10) / 4 = 6.0
        assert_eq!(layout.center_percentage, 60);
    }

    #[test]
    fn empty_layout_draws_nothing() {
        let layout = WheelLayout::compute(&[], WheelConfig::default());
        assert!(layout.is_empty());
        assert!(layout.grid_radii.is_empty());
        assert!(layout.dividers.is_empty());
        assert_eq!(layout.center_percentage, 0);
    }

    #[test]
    fn quarter_arc_path_uses_small_arc_flag() {
        let config = WheelConfig::default();
        let (start, end) = slice_angles(0, 4);
        let path = arc_path(config.center(), 36.0, 180.0, start, end);
        assert!(path.starts_with("M 200.000 20.000 A 180.000 180.000 0 0 1 380.000 200.000"));
        assert!(path.ends_with("A 36.000 36.000 0 0 0 200.000 164.000 Z"));
    }

    #[test]
    fn single_segment_draws_a_full_ring() {
        let layout = WheelLayout::compute(
            &[Segment::new("Only", 5.0, "#000")],
            WheelConfig::default(),
        );
        let path = &layout.slices[0].background_path;
        assert_eq!(path.matches(" A ").count(), 4);
    }
}

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt::Write as _;

use super::geometry::{Segment, WheelConfig, WheelLayout};

pub const BACKGROUND_FILL: &str = "#f0f0f0";
pub const SEPARATOR_STROKE: &str = "#fff";
pub const SEPARATOR_WIDTH: f64 = 1.5;
pub const FILL_OPACITY: f64 = 0.85;

/// How a label is placed: rotation in degrees and text anchor.
///
/// Labels on the left half are turned upside up and right-aligned.
#[must_use]
pub fn label_orientation(mid_angle: f64) -> (f64, &'static str) {
    let flipped = mid_angle > FRAC_PI_2 && mid_angle < 3.0 * FRAC_PI_2;
    let rotation = if flipped { mid_angle + PI } else { mid_angle };
    (rotation.to_degrees(), if flipped { "end" } else { "start" })
}

/// Grid ring stroke; every second ring is darker.
#[must_use]
pub fn grid_stroke(ring: usize) -> &'static str {
    if (ring + 1) % 2 == 0 { "#ccc" } else { "#e8e8e8" }
}

/// Standalone SVG document for the wheel. Zero segments give an empty canvas.
#[must_use]
pub fn render_svg(segments: &[Segment], config: &WheelConfig) -> String {
    let layout = WheelLayout::compute(segments, *config);
    let size = config.size;
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}" class="wheel">"#
    );

    if !layout.is_empty() {
        write_body(&mut out, segments, &layout);
    }

    out.push_str("</svg>");
    out
}

fn write_body(out: &mut String, segments: &[Segment], layout: &WheelLayout) {
    let config = &layout.config;
    let center = config.center();
    let inner = config.inner_radius();

    for (slice, segment) in layout.slices.iter().zip(segments) {
        let _ = write!(
            out,
            r#"<path class="wheel-bg" d="{}" fill="{BACKGROUND_FILL}" stroke="{SEPARATOR_STROKE}" stroke-width="{SEPARATOR_WIDTH}"/>"#,
            slice.background_path
        );
        if let Some(fill) = &slice.fill_path {
            let _ = write!(
                out,
                r#"<path class="wheel-fill" d="{fill}" fill="{}" fill-opacity="{FILL_OPACITY}" stroke="{SEPARATOR_STROKE}" stroke-width="{SEPARATOR_WIDTH}"><title>{}</title></path>"#,
                escape(&segment.color),
                escape(&segment.tooltip())
            );
        }
        if config.show_labels {
            let mid = (slice.start_angle + slice.end_angle) / 2.0;
            let (rotation, anchor) = label_orientation(mid);
            let p = slice.label_anchor;
            let _ = write!(
                out,
                r#"<text class="wheel-label" x="{:.3}" y="{:.3}" text-anchor="{anchor}" dominant-baseline="middle" transform="rotate({rotation:.3} {:.3} {:.3})">{}</text>"#,
                p.x,
                p.y,
                p.x,
                p.y,
                escape(&segment.label)
            );
        }
        if let Some(p) = slice.percent_anchor {
            let _ = write!(
                out,
                r#"<text class="wheel-percent" x="{:.3}" y="{:.3}" text-anchor="middle" dominant-baseline="middle">{}%</text>"#,
                p.x,
                p.y,
                segment.percentage()
            );
        }
    }

    for (ring, radius) in layout.grid_radii.iter().enumerate() {
        let _ = write!(
            out,
            r#"<circle class="wheel-grid" cx="{:.3}" cy="{:.3}" r="{radius:.3}" fill="none" stroke="{}" stroke-width="0.75"/>"#,
            center.x,
            center.y,
            grid_stroke(ring)
        );
    }

    for (from, to) in &layout.dividers {
        let _ = write!(
            out,
            r##"<line class="wheel-divider" x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" stroke="#ddd" stroke-width="1"/>"##,
            from.x, from.y, to.x, to.y
        );
    }

    let _ = write!(
        out,
        r##"<circle class="wheel-hub" cx="{:.3}" cy="{:.3}" r="{inner:.3}" fill="white" stroke="#ccc" stroke-width="1.5"/>"##,
        center.x, center.y
    );
    let _ = write!(
        out,
        r#"<text class="wheel-center" x="{:.3}" y="{:.3}" text-anchor="middle" dominant-baseline="middle">{}%</text>"#,
        center.x, center.y, layout.center_percentage
    );
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_wheel_is_a_bare_canvas() {
        let svg = render_svg(&[], &WheelConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(!svg.contains("<path"));
        assert!(!svg.contains("wheel-center"));
    }

    #[test]
    fn zero_score_draws_background_only() {
        let segments = vec![
            Segment::new("A", 0.0, "#111111"),
            Segment::new("B", 10.0, "#222222"),
        ];
        let svg = render_svg(&segments, &WheelConfig::default());
        assert_eq!(svg.matches("wheel-bg").count(), 2);
        assert_eq!(svg.matches("wheel-fill").count(), 1);
        assert_eq!(svg.matches("wheel-percent").count(), 1);
        assert!(svg.contains(">100%</text>"));
        assert!(svg.contains(">50%</text>"));
        assert_eq!(svg.matches("wheel-grid").count(), 10);
        assert_eq!(svg.matches("wheel-divider").count(), 2);
    }

    #[test]
    fn labels_are_escaped_and_optional() {
        let segments = vec![Segment::new("Work & <Life>", 5.0, "#333")];
        let plain = render_svg(&segments, &WheelConfig::default());
        assert!(!plain.contains("wheel-label"));

        let labelled = render_svg(&segments, &WheelConfig::default().with_labels(true));
        assert!(labelled.contains("Work &amp; &lt;Life&gt;"));
    }

    #[test]
    fn left_half_labels_are_flipped() {
        assert_eq!(label_orientation(0.0).1, "start");
        let (rotation, anchor) = label_orientation(PI);
        assert_eq!(anchor, "end");
        assert!((rotation - 360.0).abs() < 1e-9);
    }
}

use dioxus::prelude::*;

use super::geometry::{Hit, Point, Segment, WheelConfig, hit_test};
use super::svg::render_svg;

/// Radial diagram with hover tooltips.
///
/// The canvas is pinned to `config.size` pixels so pointer offsets map 1:1
/// onto drawing coordinates.
#[component]
pub fn WheelDiagram(segments: Vec<Segment>, #[props(default)] config: WheelConfig) -> Element {
    let mut hover = use_signal(|| None::<(Hit, Point)>);

    let markup = render_svg(&segments, &config);
    let size = config.size;
    let interactive = config.interactive && !segments.is_empty();
    let canvas_class = if interactive {
        "wheel-canvas interactive"
    } else {
        "wheel-canvas"
    };
    let tooltip = hover.read().clone();

    rsx! {
        div { class: "wheel-container",
            div {
                class: canvas_class,
                style: "width: {size}px; height: {size}px;",
                dangerous_inner_html: "{markup}",
                onmousemove: move |evt: MouseEvent| {
                    if !interactive {
                        return;
                    }
                    let at = evt.element_coordinates();
                    let point = Point::new(at.x, at.y);
                    hover.set(hit_test(&segments, &config, point).map(|hit| (hit, point)));
                },
                onmouseleave: move |_| hover.set(None),
            }
            {tooltip.map(|(hit, at)| {
                let top = at.y - 10.0;
                rsx! {
                    div { class: "wheel-tooltip", style: "left: {at.x}px; top: {top}px;",
                        "{hit.tooltip}"
                    }
                }
            })}
        }
    }
}

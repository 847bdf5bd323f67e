use crate::config::{LayoutConfig, RenderConfig};
use crate::interaction::InteractionState;
use crate::layout::Layout;
use crate::scene::{
    CLOUD_GRADIENT_ID, GRID_PATTERN_ID, Group, Primitive, SHADOW_FILTER_ID, Scene, Stroke,
    Transform, build_scene,
};
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write;
use std::path::Path;

pub fn render_svg(
    layout: &Layout,
    state: &InteractionState,
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    render_scene(&build_scene(layout, state, theme, config))
}

pub fn render_scene(scene: &Scene) -> String {
    let mut svg = String::new();
    let width = scene.width;
    let height = scene.height;

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" font-family=\"{}\">",
        escape_xml(&scene.font_family)
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&scene.background)
    );

    svg.push_str("<defs>");
    if let Some((size, color)) = &scene.defs.grid {
        let _ = write!(
            svg,
            "<pattern id=\"{GRID_PATTERN_ID}\" width=\"{size}\" height=\"{size}\" patternUnits=\"userSpaceOnUse\"><path d=\"M {size} 0 L 0 0 0 {size}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\"/></pattern>",
            escape_xml(color)
        );
    }
    let (start, end) = &scene.defs.cloud_gradient;
    let _ = write!(
        svg,
        "<linearGradient id=\"{CLOUD_GRADIENT_ID}\" x1=\"0\" x2=\"1\" y1=\"0\" y2=\"1\"><stop offset=\"0%\" stop-color=\"{}\"/><stop offset=\"100%\" stop-color=\"{}\"/></linearGradient>",
        escape_xml(start),
        escape_xml(end)
    );
    if scene.defs.shadow {
        let _ = write!(
            svg,
            "<filter id=\"{SHADOW_FILTER_ID}\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"140%\"><feDropShadow dx=\"0\" dy=\"2\" stdDeviation=\"4\" flood-opacity=\"0.25\"/></filter>"
        );
    }
    svg.push_str("</defs>");

    for item in &scene.children {
        write_primitive(&mut svg, item);
    }

    svg.push_str("</svg>");
    svg
}

fn write_primitive(svg: &mut String, item: &Primitive) {
    match item {
        Primitive::Rect(rect) => {
            let _ = write!(
                svg,
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"",
                rect.x, rect.y, rect.width, rect.height
            );
            if rect.radius > 0.0 {
                let _ = write!(svg, " rx=\"{0}\" ry=\"{0}\"", rect.radius);
            }
            let _ = write!(svg, " fill=\"{}\"", escape_xml(&rect.fill));
            write_stroke(svg, rect.stroke.as_ref());
            svg.push_str("/>");
        }
        Primitive::Line(line) => {
            let _ = write!(
                svg,
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"",
                line.start.x, line.start.y, line.end.x, line.end.y
            );
            write_stroke(svg, Some(&line.stroke));
            svg.push_str("/>");
        }
        Primitive::Path(path) => {
            let _ = write!(
                svg,
                "<path d=\"{}\" fill=\"{}\"",
                escape_xml(&path.d),
                escape_xml(&path.fill)
            );
            write_stroke(svg, path.stroke.as_ref());
            svg.push_str("/>");
        }
        Primitive::Text(text) => {
            let _ = write!(
                svg,
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-size=\"{}\"",
                text.x,
                text.y,
                text.anchor.as_str(),
                text.font_size
            );
            if text.font_weight != 400 {
                let _ = write!(svg, " font-weight=\"{}\"", text.font_weight);
            }
            let _ = write!(
                svg,
                " fill=\"{}\">{}</text>",
                escape_xml(&text.fill),
                escape_xml(&text.content)
            );
        }
        Primitive::Group(group) => write_group(svg, group),
    }
}

fn write_group(svg: &mut String, group: &Group) {
    svg.push_str("<g");
    if let Some(id) = &group.id {
        let _ = write!(svg, " id=\"{}\"", escape_xml(id));
    }
    if let Some(class) = &group.class {
        let _ = write!(svg, " class=\"{}\"", escape_xml(class));
    }
    if let Some(transform) = group.transform.filter(|t| !t.is_identity()) {
        let _ = write!(svg, " transform=\"{}\"", transform_attr(&transform));
    }
    if let Some(filter) = &group.filter {
        let _ = write!(svg, " filter=\"{}\"", escape_xml(filter));
    }
    for (key, value) in &group.data {
        let _ = write!(svg, " data-{}=\"{}\"", key, escape_xml(value));
    }
    svg.push('>');
    if let Some(title) = &group.title {
        let _ = write!(svg, "<title>{}</title>", escape_xml(title));
    }
    for child in &group.children {
        write_primitive(svg, child);
    }
    svg.push_str("</g>");
}

fn write_stroke(svg: &mut String, stroke: Option<&Stroke>) {
    let Some(stroke) = stroke else {
        return;
    };
    let _ = write!(
        svg,
        " stroke=\"{}\" stroke-width=\"{}\"",
        escape_xml(&stroke.color),
        stroke.width
    );
    if let Some(dash) = &stroke.dash {
        let _ = write!(svg, " stroke-dasharray=\"{}\"", escape_xml(dash));
    }
}

fn transform_attr(transform: &Transform) -> String {
    let Transform { translate, scale } = *transform;
    if scale == 1.0 {
        format!("translate({:.2},{:.2})", translate.x, translate.y)
    } else {
        format!(
            "translate({:.2},{:.2}) scale({})",
            translate.x, translate.y, scale
        )
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
            tracing::info!(path = %path.display(), bytes = svg.len(), "wrote svg");
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(1200.0, 780.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid output size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let scale_x = render_cfg.width / size.width() as f32;
    let scale_y = render_cfg.height / size.height() as f32;
    let scale = scale_x.min(scale_y).max(0.1);
    let out_w = ((size.width() as f32) * scale).round().max(1.0) as u32;
    let out_h = ((size.height() as f32) * scale).round().max(1.0) as u32;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(out_w, out_h)
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    if let Some(color) = parse_hex_color(&render_cfg.background) {
        pixmap.fill(color);
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    tracing::info!(path = %output.display(), width = out_w, height = out_h, "wrote png");
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

#[cfg(feature = "png")]
fn parse_hex_color(value: &str) -> Option<resvg::tiny_skia::Color> {
    let hex = value.trim().strip_prefix('#')?;
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
    let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
    let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
    Some(resvg::tiny_skia::Color::from_rgba8(r, g, b, 255))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ElementRef;
    use crate::layout::default_layout;

    fn fast_config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn render_svg_basic() {
        let svg = render_svg(
            default_layout(),
            &InteractionState::new(),
            &Theme::classic(),
            &fast_config(),
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("PSBA CPE-1"));
        assert!(svg.contains("Extranet (MPLS)"));
        assert!(svg.contains("<pattern id=\"grid\""));
        assert!(!svg.contains("id=\"tooltip\""));
    }

    #[test]
    fn cloud_links_are_dashed_in_output() {
        let svg = render_svg(
            default_layout(),
            &InteractionState::new(),
            &Theme::classic(),
            &fast_config(),
        );
        assert_eq!(svg.matches("stroke-dasharray=\"8 8\"").count(), 4);
        assert!(svg.contains(
            "<line x1=\"586.00\" y1=\"168.00\" x2=\"220.00\" y2=\"220.00\" stroke=\"#1f2937\""
        ));
    }

    #[test]
    fn edge_snapped_segments_are_written() {
        let svg = render_svg(
            default_layout(),
            &InteractionState::new(),
            &Theme::classic(),
            &fast_config(),
        );
        assert!(svg.contains("x1=\"220.00\" y1=\"300.00\" x2=\"220.00\" y2=\"390.00\""));
        assert!(svg.contains("x1=\"480.00\" y1=\"470.00\" x2=\"350.00\" y2=\"580.00\""));
    }

    #[test]
    fn interaction_state_shows_up_in_markup() {
        let layout = default_layout();
        let mut state = InteractionState::new();
        state.on_enter(layout, &ElementRef::device("ndc-fw"));
        state.zoom_in();
        let svg = render_svg(layout, &state, &Theme::classic(), &fast_config());
        assert!(svg.contains("class=\"device fw active\""));
        assert!(svg.contains("id=\"tooltip\""));
        assert!(svg.contains("scale(1.1)"));
        assert!(svg.contains("110%"));
    }

    #[test]
    fn svg_output_is_written_to_file() {
        let svg = render_svg(
            default_layout(),
            &InteractionState::new(),
            &Theme::classic(),
            &fast_config(),
        );
        let path = std::env::temp_dir().join(format!("topodiag-{}.svg", std::process::id()));
        write_output_svg(&svg, Some(&path)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(written, svg);
        assert!(written.ends_with("</svg>"));
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn identity_transform_is_omitted() {
        let mut svg = String::new();
        write_group(
            &mut svg,
            &Group {
                id: Some("g".to_string()),
                transform: Some(Transform::IDENTITY),
                ..Group::default()
            },
        );
        assert_eq!(svg, "<g id=\"g\"></g>");
    }
}

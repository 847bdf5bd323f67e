//! Drawable primitive tree produced from a resolved layout and the current
//! interaction state. The SVG writer in `render` consumes it verbatim, so no
//! geometry is recomputed downstream.

use crate::config::LayoutConfig;
use crate::interaction::{Focus, InteractionState};
use crate::ir::{DeviceTier, ElementRef};
use crate::layout::{CloudLayout, DeviceLayout, Layout, LinkLayout, Point};
use crate::text_metrics::{measure_block, text_width};
use crate::theme::Theme;

/// Outline of the MPLS cloud, drawn relative to the cloud origin.
pub const CLOUD_PATH: &str = "M200 80c0-26.5-21.5-48-48-48-10.2 0-19.7 3.2-27.4 8.7C118.7 25.5 98.7 16 76 16 42.7 16 16 42.7 16 76c0 3 .2 5.9.7 8.8C7.3 91.8 0 104.4 0 119c0 26.5 21.5 48 48 48h224c26.5 0 48-21.5 48-48 0-21.6-14.2-39.8-33.7-45.8 0-.7.1-1.4.1-2.2z";

pub const GRID_PATTERN_ID: &str = "grid";
pub const CLOUD_GRADIENT_ID: &str = "cloudGrad";
pub const SHADOW_FILTER_ID: &str = "softShadow";

const LINK_WIDTH: f32 = 2.5;
const LINK_ACTIVE_WIDTH: f32 = 4.0;
const LINK_HIT_WIDTH: f32 = 14.0;
const LINK_DASH: &str = "8 8";
const DEVICE_STROKE_WIDTH: f32 = 1.5;
const DEVICE_ACTIVE_STROKE_WIDTH: f32 = 3.0;
const CORNER_RADIUS: f32 = 12.0;
const TOOLTIP_TITLE_SIZE: f32 = 13.0;
const TOOLTIP_BODY_SIZE: f32 = 12.0;
const TOOLTIP_LINE_HEIGHT: f32 = 1.4;
const LEGEND_ORIGIN: Point = Point::new(24.0, 24.0);
const LEGEND_WIDTH: f32 = 260.0;
const LEGEND_ROW: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate: Point,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate: Point::new(0.0, 0.0),
        scale: 1.0,
    };

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            translate: Point::new(x, y),
            scale: 1.0,
        }
    }

    /// Uniform scale about `center`, expressed as translate-then-scale.
    pub fn zoom_about(center: Point, scale: f32) -> Self {
        Self {
            translate: Point::new((1.0 - scale) * center.x, (1.0 - scale) * center.y),
            scale,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f32,
    pub dash: Option<String>,
}

impl Stroke {
    pub fn solid(color: &str, width: f32) -> Self {
        Self {
            color: color.to_string(),
            width,
            dash: None,
        }
    }

    pub fn dashed(color: &str, width: f32, dash: &str) -> Self {
        Self {
            color: color.to_string(),
            width,
            dash: Some(dash.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub fill: String,
    pub stroke: Option<Stroke>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    pub start: Point,
    pub end: Point,
    pub stroke: Stroke,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathShape {
    pub d: String,
    pub fill: String,
    pub stroke: Option<Stroke>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextShape {
    pub x: f32,
    pub y: f32,
    pub content: String,
    pub anchor: TextAnchor,
    pub font_size: f32,
    pub font_weight: u16,
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub id: Option<String>,
    pub class: Option<String>,
    pub transform: Option<Transform>,
    pub filter: Option<String>,
    /// Native tooltip text (`<title>`).
    pub title: Option<String>,
    /// `data-*` attributes used by hosts to wire pointer callbacks.
    pub data: Vec<(String, String)>,
    pub children: Vec<Primitive>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect(RectShape),
    Line(LineShape),
    Path(PathShape),
    Text(TextShape),
    Group(Group),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Defs {
    pub grid: Option<(f32, String)>,
    pub cloud_gradient: (String, String),
    pub shadow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub font_family: String,
    pub defs: Defs,
    pub children: Vec<Primitive>,
}

impl Scene {
    /// Depth-first search for a group by id.
    pub fn find_group(&self, id: &str) -> Option<&Group> {
        fn walk<'a>(items: &'a [Primitive], id: &str) -> Option<&'a Group> {
            for item in items {
                if let Primitive::Group(group) = item {
                    if group.id.as_deref() == Some(id) {
                        return Some(group);
                    }
                    if let Some(found) = walk(&group.children, id) {
                        return Some(found);
                    }
                }
            }
            None
        }
        walk(&self.children, id)
    }
}

pub fn device_group_id(id: &str) -> String {
    format!("device-{id}")
}

pub fn link_group_id(id: &str) -> String {
    format!("link-{id}")
}

pub fn build_scene(
    layout: &Layout,
    state: &InteractionState,
    theme: &Theme,
    config: &LayoutConfig,
) -> Scene {
    let mut children = Vec::new();

    if config.show_grid {
        children.push(Primitive::Rect(RectShape {
            x: 0.0,
            y: 0.0,
            width: layout.width,
            height: layout.height,
            radius: 0.0,
            fill: format!("url(#{GRID_PATTERN_ID})"),
            stroke: None,
        }));
    }

    let center = Point::new(layout.width / 2.0, layout.height / 2.0);
    let mut viewport = Group {
        id: Some("viewport".to_string()),
        transform: Some(Transform::zoom_about(center, state.zoom.scale())),
        ..Group::default()
    };
    viewport.children.push(cloud_group(&layout.cloud, theme));
    for site in &layout.sites {
        viewport.children.push(Primitive::Text(TextShape {
            x: site.label_anchor.x,
            y: site.label_anchor.y,
            content: site.name.clone(),
            anchor: TextAnchor::Start,
            font_size: 18.0,
            font_weight: 700,
            fill: theme.text_color.clone(),
        }));
    }
    for link in &layout.links {
        let active = state.is_active(&ElementRef::link(&link.id));
        viewport.children.push(link_group(link, active, theme, config));
    }
    for device in &layout.devices {
        let active = state.is_active(&ElementRef::device(&device.id));
        viewport.children.push(device_group(device, active, theme));
    }
    if let Some(focus) = state.tooltip() {
        viewport.children.push(tooltip_group(focus, layout, theme, config));
    }
    children.push(Primitive::Group(viewport));

    if config.show_legend {
        children.push(legend_group(theme));
    }
    if config.show_zoom_controls {
        children.push(zoom_controls_group(layout, state, theme));
    }

    tracing::debug!(
        zoom = state.zoom.scale(),
        hover = ?state.hover.as_ref().map(|f| f.element.to_string()),
        selected = ?state.selected.as_ref().map(|f| f.element.to_string()),
        "built scene"
    );

    Scene {
        width: layout.width,
        height: layout.height,
        background: theme.background.clone(),
        font_family: theme.font_family.clone(),
        defs: Defs {
            grid: config
                .show_grid
                .then(|| (config.grid_size, theme.grid_color.clone())),
            cloud_gradient: (theme.cloud_fill_start.clone(), theme.cloud_fill_end.clone()),
            shadow: true,
        },
        children,
    }
}

fn text(x: f32, y: f32, content: &str, size: f32, weight: u16, fill: &str) -> Primitive {
    Primitive::Text(TextShape {
        x,
        y,
        content: content.to_string(),
        anchor: TextAnchor::Middle,
        font_size: size,
        font_weight: weight,
        fill: fill.to_string(),
    })
}

fn cloud_group(cloud: &CloudLayout, theme: &Theme) -> Primitive {
    let label_x = cloud.anchor.x - cloud.origin.x;
    Primitive::Group(Group {
        id: Some(format!("cloud-{}", cloud.id)),
        class: Some("cloud".to_string()),
        transform: Some(Transform::translate(cloud.origin.x, cloud.origin.y)),
        filter: Some(format!("url(#{SHADOW_FILTER_ID})")),
        title: Some(cloud.label.clone()),
        data: Vec::new(),
        children: vec![
            Primitive::Path(PathShape {
                d: CLOUD_PATH.to_string(),
                fill: format!("url(#{CLOUD_GRADIENT_ID})"),
                stroke: Some(Stroke::solid(&theme.cloud_stroke, 2.0)),
            }),
            text(label_x, 88.0, &cloud.label, 16.0, 600, &theme.title_color),
            text(label_x, 108.0, &cloud.subtitle, 12.0, 400, &theme.muted_text_color),
        ],
    })
}

fn link_group(link: &LinkLayout, active: bool, theme: &Theme, config: &LayoutConfig) -> Primitive {
    let (color, width) = if active {
        (theme.active_color.as_str(), LINK_ACTIVE_WIDTH)
    } else {
        (theme.link_color.as_str(), LINK_WIDTH)
    };
    let stroke = if link.dashed {
        Stroke::dashed(color, width, LINK_DASH)
    } else {
        Stroke::solid(color, width)
    };

    let mut children = vec![
        Primitive::Line(LineShape {
            start: link.start,
            end: link.end,
            stroke: Stroke::solid("transparent", LINK_HIT_WIDTH),
        }),
        Primitive::Line(LineShape {
            start: link.start,
            end: link.end,
            stroke,
        }),
    ];
    if config.show_link_labels && link.dashed {
        let mid = link.midpoint();
        children.push(text(
            mid.x,
            mid.y - config.link_label_offset,
            &link.label,
            11.0,
            400,
            &theme.muted_text_color,
        ));
    }

    Primitive::Group(Group {
        id: Some(link_group_id(&link.id)),
        class: Some(class_list("link", active)),
        title: Some(link.label.clone()),
        data: element_data("link", &link.id),
        children,
        ..Group::default()
    })
}

fn device_group(device: &DeviceLayout, active: bool, theme: &Theme) -> Primitive {
    let palette = theme.palette(device.tier);
    let rect = device.rect;
    let stroke = if active {
        Stroke::solid(&theme.active_color, DEVICE_ACTIVE_STROKE_WIDTH)
    } else {
        Stroke::solid(&palette.stroke, DEVICE_STROKE_WIDTH)
    };
    let mid_x = rect.width / 2.0;

    let mut children = vec![Primitive::Rect(RectShape {
        x: 0.0,
        y: 0.0,
        width: rect.width,
        height: rect.height,
        radius: CORNER_RADIUS,
        fill: palette.fill.clone(),
        stroke: Some(stroke),
    })];

    match device.tier {
        DeviceTier::Fw => {
            // Two stacked appliances above the caption.
            let unit_width = (rect.width - 60.0).max(rect.width * 0.5);
            let unit_x = mid_x - unit_width / 2.0;
            for offset in [12.0, 42.0] {
                children.push(Primitive::Rect(RectShape {
                    x: unit_x,
                    y: offset,
                    width: unit_width,
                    height: 24.0,
                    radius: 4.0,
                    fill: theme.fw_unit_fill.clone(),
                    stroke: Some(Stroke::solid(&palette.stroke, 1.0)),
                }));
            }
            children.push(text(
                mid_x,
                rect.height - 16.0,
                &format!("{} \u{2013} {}", device.label, device.subtitle),
                12.0,
                400,
                &theme.text_color,
            ));
        }
        DeviceTier::Cpe | DeviceTier::Wan => {
            children.push(text(
                mid_x,
                rect.height * 0.425,
                &device.label,
                theme.font_size,
                700,
                &theme.title_color,
            ));
            children.push(text(
                mid_x,
                rect.height * 0.7,
                &device.subtitle,
                12.0,
                400,
                &theme.muted_text_color,
            ));
        }
    }

    Primitive::Group(Group {
        id: Some(device_group_id(&device.id)),
        class: Some(class_list(&format!("device {}", device.tier.as_str()), active)),
        transform: Some(Transform::translate(rect.x, rect.y)),
        filter: None,
        title: Some(match &device.description {
            Some(text) => format!("{} ({})\n{}", device.label, device.subtitle, text),
            None => format!("{} ({})", device.label, device.subtitle),
        }),
        data: element_data("device", &device.id),
        children,
    })
}

/// Tooltip box above the anchor, flipped below when it would leave the canvas.
fn tooltip_group(focus: &Focus, layout: &Layout, theme: &Theme, config: &LayoutConfig) -> Primitive {
    let pad = config.tooltip_padding;
    let fast = config.fast_text_metrics;
    let inner_max = (config.tooltip_max_width - pad * 2.0).max(40.0);
    let title_width = text_width(&focus.label, TOOLTIP_TITLE_SIZE, &theme.font_family, fast);
    let body = focus.text.as_deref().map(|text| {
        measure_block(
            text,
            TOOLTIP_BODY_SIZE,
            &theme.font_family,
            inner_max,
            TOOLTIP_LINE_HEIGHT,
            fast,
        )
    });

    let content_width = body
        .as_ref()
        .map_or(title_width, |block| block.width.max(title_width));
    let width = content_width.min(inner_max.max(title_width)) + pad * 2.0;
    let title_height = TOOLTIP_TITLE_SIZE * TOOLTIP_LINE_HEIGHT;
    let height = pad * 2.0 + title_height + body.as_ref().map_or(0.0, |block| block.height);

    let x = (focus.anchor.x - width / 2.0).clamp(4.0, (layout.width - width - 4.0).max(4.0));
    let above = focus.anchor.y - config.tooltip_gap - height;
    let y = if above >= 4.0 {
        above
    } else {
        focus.anchor.y + config.tooltip_gap
    };

    let mut children = vec![
        Primitive::Rect(RectShape {
            x: 0.0,
            y: 0.0,
            width,
            height,
            radius: 6.0,
            fill: theme.tooltip_background.clone(),
            stroke: None,
        }),
        Primitive::Text(TextShape {
            x: pad,
            y: pad + TOOLTIP_TITLE_SIZE,
            content: focus.label.clone(),
            anchor: TextAnchor::Start,
            font_size: TOOLTIP_TITLE_SIZE,
            font_weight: 700,
            fill: theme.tooltip_text_color.clone(),
        }),
    ];
    if let Some(block) = body {
        let line_step = TOOLTIP_BODY_SIZE * TOOLTIP_LINE_HEIGHT;
        for (idx, line) in block.lines.iter().enumerate() {
            children.push(Primitive::Text(TextShape {
                x: pad,
                y: pad + title_height + TOOLTIP_BODY_SIZE + idx as f32 * line_step,
                content: line.clone(),
                anchor: TextAnchor::Start,
                font_size: TOOLTIP_BODY_SIZE,
                font_weight: 400,
                fill: theme.tooltip_text_color.clone(),
            }));
        }
    }

    Primitive::Group(Group {
        id: Some("tooltip".to_string()),
        class: Some("tooltip".to_string()),
        transform: Some(Transform::translate(x, y)),
        data: element_data(focus.element.kind.as_str(), &focus.element.id),
        children,
        ..Group::default()
    })
}

fn legend_group(theme: &Theme) -> Primitive {
    let mut children = vec![text(16.0, 24.0, "Legend", 14.0, 700, &theme.text_color)];
    let mut row_y = 40.0;
    let mut push_row = |children: &mut Vec<Primitive>, swatch: RectShape, caption: &str| {
        children.push(Primitive::Rect(RectShape { y: row_y, ..swatch }));
        children.push(Primitive::Text(TextShape {
            x: 44.0,
            y: row_y + 9.0,
            content: caption.to_string(),
            anchor: TextAnchor::Start,
            font_size: 12.0,
            font_weight: 400,
            fill: theme.muted_text_color.clone(),
        }));
        row_y += LEGEND_ROW;
    };
    let swatch = |fill: &str, stroke: Option<Stroke>| RectShape {
        x: 16.0,
        y: 0.0,
        width: 20.0,
        height: 10.0,
        radius: 0.0,
        fill: fill.to_string(),
        stroke,
    };

    push_row(
        &mut children,
        swatch(&theme.link_color, None),
        "Solid link: On-site connection",
    );
    push_row(
        &mut children,
        swatch("none", Some(Stroke::dashed(&theme.link_color, 1.0, "6 6"))),
        "Dashed link: MPLS path",
    );
    push_row(
        &mut children,
        swatch(&theme.cloud_fill_end, Some(Stroke::solid(&theme.cloud_stroke, 1.0))),
        "Cloud: Extranet (MPLS)",
    );
    for tier in DeviceTier::ALL {
        let palette = theme.palette(tier);
        push_row(
            &mut children,
            swatch(&palette.fill, Some(Stroke::solid(&palette.stroke, 1.0))),
            tier.display_name(),
        );
    }
    let height = row_y + 6.0;

    children.insert(
        0,
        Primitive::Rect(RectShape {
            x: 0.0,
            y: 0.0,
            width: LEGEND_WIDTH,
            height,
            radius: CORNER_RADIUS,
            fill: theme.legend_background.clone(),
            stroke: Some(Stroke::solid(&theme.legend_border, 1.0)),
        }),
    );

    Primitive::Group(Group {
        id: Some("legend".to_string()),
        class: Some("legend".to_string()),
        transform: Some(Transform::translate(LEGEND_ORIGIN.x, LEGEND_ORIGIN.y)),
        children,
        ..Group::default()
    })
}

fn zoom_controls_group(layout: &Layout, state: &InteractionState, theme: &Theme) -> Primitive {
    const BUTTON: f32 = 28.0;
    const GAP: f32 = 6.0;
    let buttons = [("zoom-out", "\u{2212}"), ("zoom-in", "+"), ("zoom-reset", "\u{27F2}")];
    let panel_width = buttons.len() as f32 * (BUTTON + GAP) + 56.0;

    let mut children = Vec::new();
    for (idx, (action, glyph)) in buttons.iter().enumerate() {
        let x = idx as f32 * (BUTTON + GAP);
        children.push(Primitive::Group(Group {
            id: Some(format!("control-{action}")),
            class: Some("zoom-button".to_string()),
            transform: Some(Transform::translate(x, 0.0)),
            title: Some(action.replace('-', " ")),
            data: vec![("action".to_string(), action.to_string())],
            children: vec![
                Primitive::Rect(RectShape {
                    x: 0.0,
                    y: 0.0,
                    width: BUTTON,
                    height: BUTTON,
                    radius: 6.0,
                    fill: theme.legend_background.clone(),
                    stroke: Some(Stroke::solid(&theme.legend_border, 1.0)),
                }),
                text(BUTTON / 2.0, 19.0, glyph, 14.0, 700, &theme.text_color),
            ],
            ..Group::default()
        }));
    }
    children.push(Primitive::Text(TextShape {
        x: buttons.len() as f32 * (BUTTON + GAP) + 4.0,
        y: 19.0,
        content: format!("{}%", state.zoom.percent()),
        anchor: TextAnchor::Start,
        font_size: 12.0,
        font_weight: 600,
        fill: theme.muted_text_color.clone(),
    }));

    Primitive::Group(Group {
        id: Some("zoom-controls".to_string()),
        class: Some("zoom-controls".to_string()),
        transform: Some(Transform::translate(layout.width - panel_width - 24.0, 24.0)),
        children,
        ..Group::default()
    })
}

fn class_list(base: &str, active: bool) -> String {
    if active {
        format!("{base} active")
    } else {
        base.to_string()
    }
}

fn element_data(kind: &str, id: &str) -> Vec<(String, String)> {
    vec![
        ("kind".to_string(), kind.to_string()),
        ("id".to_string(), id.to_string()),
    ]
}

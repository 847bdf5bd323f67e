pub mod geometry;
pub(crate) mod types;
pub use geometry::{Point, Rect, Side, Size, absolute_box, bottom_center, edge_point, facing_sides};
pub use types::*;

use crate::config::LayoutConfig;
use crate::error::TopologyError;
use crate::ir::{DeviceTier, LinkEnd, LinkSpec, Topology};
use once_cell::sync::Lazy;
use std::collections::HashMap;

const CANVAS_MARGIN: f32 = 20.0;

static DEFAULT_LAYOUT: Lazy<Layout> = Lazy::new(|| {
    compute_layout(&Topology::dual_site(), &LayoutConfig::default())
        .expect("built-in topology is valid")
});

/// Layout of the built-in topology with default sizes, computed once per process.
pub fn default_layout() -> &'static Layout {
    &DEFAULT_LAYOUT
}

/// Pairs two already-resolved points. No edge snapping happens here; callers
/// pass the edge point of each endpoint.
pub fn build_link(id: &str, label: &str, start: Point, end: Point, dashed: bool) -> LinkLayout {
    LinkLayout {
        id: id.to_string(),
        label: label.to_string(),
        start,
        end,
        dashed,
        from: None,
        to: None,
        description: None,
    }
}

pub fn compute_layout(topology: &Topology, config: &LayoutConfig) -> Result<Layout, TopologyError> {
    topology.validate()?;
    for tier in DeviceTier::ALL {
        let size = config.tier_size(tier);
        if !size.is_positive() {
            return Err(TopologyError::InvalidSize {
                what: format!("{} tier", tier.as_str()),
                width: size.width,
                height: size.height,
            });
        }
    }

    let sites: Vec<SiteLayout> = topology
        .sites
        .iter()
        .map(|site| SiteLayout {
            id: site.id.clone(),
            name: site.name.clone(),
            origin: site.origin,
            label_anchor: Point::new(site.origin.x, site.origin.y - config.site_label_offset),
        })
        .collect();

    let mut devices = Vec::with_capacity(topology.devices.len());
    for spec in &topology.devices {
        let site = topology
            .site(&spec.site)
            .ok_or_else(|| TopologyError::UnknownSite {
                device: spec.id.clone(),
                site: spec.site.clone(),
            })?;
        let rect = absolute_box(site.origin, spec.dx, spec.dy, config.tier_size(spec.tier));
        devices.push(DeviceLayout {
            id: spec.id.clone(),
            label: spec.label.clone(),
            subtitle: site.name.clone(),
            site: site.id.clone(),
            tier: spec.tier,
            rect,
            description: topology.hover_text.get(&spec.id).cloned(),
        });
    }
    check_site_overlaps(&devices)?;

    let cloud = CloudLayout {
        id: topology.cloud.id.clone(),
        label: topology.cloud.label.clone(),
        subtitle: topology.cloud.subtitle.clone(),
        origin: topology.cloud.origin,
        bounds: topology.cloud.bounds,
        anchor: bottom_center(&topology.cloud.bounds),
    };

    let rects: HashMap<&str, Rect> = devices
        .iter()
        .map(|device| (device.id.as_str(), device.rect))
        .collect();
    let mut links = Vec::with_capacity(topology.links.len());
    for spec in &topology.links {
        let (from, to) = resolve_link_ends(spec, &rects, &cloud)?;
        let base = build_link(&spec.id, &spec.label, from.0, to.0, spec.dashed);
        links.push(LinkLayout {
            from: Some(from.1),
            to: Some(to.1),
            description: topology.hover_text.get(&spec.id).cloned(),
            ..base
        });
    }

    let mut layout = Layout {
        title: topology.title.clone(),
        width: config.canvas_width,
        height: config.canvas_height,
        cloud,
        sites,
        devices,
        links,
    };
    let content = layout.content_bounds();
    layout.width = layout.width.max(content.right() + CANVAS_MARGIN);
    layout.height = layout.height.max(content.bottom() + CANVAS_MARGIN);

    tracing::debug!(
        devices = layout.devices.len(),
        links = layout.links.len(),
        width = layout.width,
        height = layout.height,
        "computed topology layout"
    );
    Ok(layout)
}

type ResolvedEnd = (Point, Attachment);

fn resolve_link_ends(
    spec: &LinkSpec,
    rects: &HashMap<&str, Rect>,
    cloud: &CloudLayout,
) -> Result<(ResolvedEnd, ResolvedEnd), TopologyError> {
    let lookup = |id: &str| {
        rects
            .get(id)
            .copied()
            .ok_or_else(|| TopologyError::UnknownElement {
                link: spec.id.clone(),
                element: id.to_string(),
            })
    };
    let cloud_end = || {
        (
            cloud.anchor,
            Attachment {
                element: cloud.id.clone(),
                side: Side::Bottom,
            },
        )
    };
    let device_end = |id: &str, rect: Rect, side: Side| {
        (
            rect.edge_point(side),
            Attachment {
                element: id.to_string(),
                side,
            },
        )
    };

    match (&spec.from, &spec.to) {
        (LinkEnd::Cloud, LinkEnd::Device { id, side }) => {
            let rect = lookup(id)?;
            Ok((cloud_end(), device_end(id, rect, side.unwrap_or(Side::Top))))
        }
        (LinkEnd::Device { id, side }, LinkEnd::Cloud) => {
            let rect = lookup(id)?;
            Ok((device_end(id, rect, side.unwrap_or(Side::Top)), cloud_end()))
        }
        (
            LinkEnd::Device { id: from_id, side: from_side },
            LinkEnd::Device { id: to_id, side: to_side },
        ) => {
            let from_rect = lookup(from_id)?;
            let to_rect = lookup(to_id)?;
            let (auto_from, auto_to) = facing_sides(&from_rect, &to_rect);
            Ok((
                device_end(from_id, from_rect, from_side.unwrap_or(auto_from)),
                device_end(to_id, to_rect, to_side.unwrap_or(auto_to)),
            ))
        }
        (LinkEnd::Cloud, LinkEnd::Cloud) => Err(TopologyError::SelfLink(spec.id.clone())),
    }
}

fn check_site_overlaps(devices: &[DeviceLayout]) -> Result<(), TopologyError> {
    for (idx, first) in devices.iter().enumerate() {
        for second in &devices[idx + 1..] {
            if first.site == second.site && first.rect.intersects(&second.rect) {
                return Err(TopologyError::Overlap {
                    site: first.site.clone(),
                    first: first.id.clone(),
                    second: second.id.clone(),
                });
            }
        }
    }
    Ok(())
}

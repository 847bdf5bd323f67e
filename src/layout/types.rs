use super::geometry::{Point, Rect, Side};
use crate::interaction::Focus;
use crate::ir::{DeviceTier, ElementKind, ElementRef};

#[derive(Debug, Clone)]
pub struct SiteLayout {
    pub id: String,
    pub name: String,
    pub origin: Point,
    pub label_anchor: Point,
}

#[derive(Debug, Clone)]
pub struct DeviceLayout {
    pub id: String,
    pub label: String,
    /// Name of the owning site.
    pub subtitle: String,
    pub site: String,
    pub tier: DeviceTier,
    pub rect: Rect,
    pub description: Option<String>,
}

/// Where a link end terminates.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub element: String,
    pub side: Side,
}

#[derive(Debug, Clone)]
pub struct LinkLayout {
    pub id: String,
    pub label: String,
    pub start: Point,
    pub end: Point,
    pub dashed: bool,
    pub from: Option<Attachment>,
    pub to: Option<Attachment>,
    pub description: Option<String>,
}

impl LinkLayout {
    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }
}

#[derive(Debug, Clone)]
pub struct CloudLayout {
    pub id: String,
    pub label: String,
    pub subtitle: String,
    pub origin: Point,
    pub bounds: Rect,
    pub anchor: Point,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub cloud: CloudLayout,
    pub sites: Vec<SiteLayout>,
    pub devices: Vec<DeviceLayout>,
    pub links: Vec<LinkLayout>,
}

impl Layout {
    pub fn device(&self, id: &str) -> Option<&DeviceLayout> {
        self.devices.iter().find(|device| device.id == id)
    }

    pub fn link(&self, id: &str) -> Option<&LinkLayout> {
        self.links.iter().find(|link| link.id == id)
    }

    /// Bounds of the element a link attaches to; the cloud counts as an element here.
    pub fn element_bounds(&self, id: &str) -> Option<Rect> {
        if id == self.cloud.id {
            return Some(self.cloud.bounds);
        }
        self.device(id).map(|device| device.rect)
    }

    /// Tooltip record for an element: devices anchor at their top-center,
    /// links at the segment midpoint.
    pub fn focus_for(&self, element: &ElementRef) -> Option<Focus> {
        match element.kind {
            ElementKind::Device => self.device(&element.id).map(|device| Focus {
                element: element.clone(),
                label: format!("{} ({})", device.label, device.subtitle),
                text: device.description.clone(),
                anchor: device.rect.edge_point(Side::Top),
            }),
            ElementKind::Link => self.link(&element.id).map(|link| Focus {
                element: element.clone(),
                label: link.label.clone(),
                text: link.description.clone(),
                anchor: link.midpoint(),
            }),
        }
    }

    pub fn content_bounds(&self) -> Rect {
        self.devices
            .iter()
            .fold(self.cloud.bounds, |acc, device| acc.union(&device.rect))
    }
}

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::TopologyError;
use crate::layout::geometry::{Point, Rect, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceTier {
    Cpe,
    Wan,
    Fw,
}

impl DeviceTier {
    pub const ALL: [DeviceTier; 3] = [DeviceTier::Cpe, DeviceTier::Wan, DeviceTier::Fw];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cpe => "cpe",
            Self::Wan => "wan",
            Self::Fw => "fw",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Cpe => "CPE router",
            Self::Wan => "WAN router",
            Self::Fw => "Firewall cluster",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Device,
    Link,
}

impl ElementKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "device" => Some(Self::Device),
            "link" => Some(Self::Link),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Link => "link",
        }
    }
}

/// Identifies one interactive element of the diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: String,
}

impl ElementRef {
    pub fn device(id: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Device,
            id: id.into(),
        }
    }

    pub fn link(id: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Link,
            id: id.into(),
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

#[derive(Debug, Clone)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub origin: Point,
}

#[derive(Debug, Clone)]
pub struct DeviceSpec {
    pub id: String,
    pub label: String,
    pub site: String,
    pub tier: DeviceTier,
    pub dx: f32,
    pub dy: f32,
}

/// One end of a link. A device end may pin a side; otherwise the facing
/// side is chosen at layout time. The cloud is only ever reached through its
/// bottom-center point.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEnd {
    Cloud,
    Device { id: String, side: Option<Side> },
}

impl LinkEnd {
    pub fn device(id: impl Into<String>) -> Self {
        Self::Device {
            id: id.into(),
            side: None,
        }
    }

    pub fn element_id<'a>(&'a self, cloud_id: &'a str) -> &'a str {
        match self {
            Self::Cloud => cloud_id,
            Self::Device { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinkSpec {
    pub id: String,
    pub label: String,
    pub from: LinkEnd,
    pub to: LinkEnd,
    pub dashed: bool,
}

#[derive(Debug, Clone)]
pub struct CloudSpec {
    pub id: String,
    pub label: String,
    pub subtitle: String,
    /// Translation applied to the hand-drawn cloud outline.
    pub origin: Point,
    /// Hand-fit visual bounds of the outline in absolute coordinates.
    pub bounds: Rect,
}

#[derive(Debug, Clone)]
pub struct Topology {
    pub title: String,
    pub sites: Vec<Site>,
    pub devices: Vec<DeviceSpec>,
    pub links: Vec<LinkSpec>,
    pub cloud: CloudSpec,
    /// Descriptive tooltip text keyed by element id.
    pub hover_text: BTreeMap<String, String>,
}

// (suffix, label, tier, dx, dy)
const SITE_DEVICES: [(&str, &str, DeviceTier, f32, f32); 5] = [
    ("cpe-1", "PSBA CPE-1", DeviceTier::Cpe, 0.0, 0.0),
    ("cpe-2", "PSBA CPE-2", DeviceTier::Cpe, 260.0, 0.0),
    ("wan-1", "DHCW WAN-1", DeviceTier::Wan, 0.0, 170.0),
    ("wan-2", "DHCW WAN-2", DeviceTier::Wan, 260.0, 170.0),
    ("fw", "Check Point Edge FW Cluster", DeviceTier::Fw, 130.0, 360.0),
];

// (from suffix, to suffix, label)
const SITE_LINKS: [(&str, &str, &str); 4] = [
    ("cpe-1", "wan-1", "CPE-1 to WAN-1"),
    ("cpe-2", "wan-2", "CPE-2 to WAN-2"),
    ("wan-1", "fw", "WAN-1 to FW cluster"),
    ("wan-2", "fw", "WAN-2 to FW cluster"),
];

const SITES: [(&str, &str, f32, f32); 2] = [("ndc", "NDC", 120.0, 220.0), ("cdc", "CDC", 720.0, 220.0)];

impl Topology {
    /// The built-in NDC/CDC topology sharing one MPLS extranet cloud.
    pub fn dual_site() -> Self {
        let cloud = CloudSpec {
            id: "extranet".to_string(),
            label: "Extranet (MPLS)".to_string(),
            subtitle: "Single MPLS Cloud".to_string(),
            origin: Point::new(450.0, 40.0),
            bounds: Rect::new(450.0, 48.0, 272.0, 120.0),
        };

        let mut sites = Vec::new();
        let mut devices = Vec::new();
        let mut links = Vec::new();
        let mut hover_text = BTreeMap::new();

        for (site_id, site_name, ox, oy) in SITES {
            sites.push(Site {
                id: site_id.to_string(),
                name: site_name.to_string(),
                origin: Point::new(ox, oy),
            });

            for (suffix, label, tier, dx, dy) in SITE_DEVICES {
                let id = format!("{site_id}-{suffix}");
                hover_text.insert(id.clone(), device_hover_text(tier, site_name));
                devices.push(DeviceSpec {
                    id,
                    label: label.to_string(),
                    site: site_id.to_string(),
                    tier,
                    dx,
                    dy,
                });
            }

            for (from, to, label) in SITE_LINKS {
                let id = format!("{site_id}-{from}-{to}");
                hover_text.insert(id.clone(), format!("On-site cable at {site_name}"));
                links.push(LinkSpec {
                    id,
                    label: format!("{site_name} {label}"),
                    from: LinkEnd::device(format!("{site_id}-{from}")),
                    to: LinkEnd::device(format!("{site_id}-{to}")),
                    dashed: false,
                });
            }
        }

        for (site_id, site_name, _, _) in SITES {
            for cpe in ["cpe-1", "cpe-2"] {
                let id = format!("extranet-{site_id}-{cpe}");
                let upper = cpe.to_ascii_uppercase();
                hover_text.insert(
                    id.clone(),
                    format!("MPLS circuit from the extranet to {site_name} {upper}"),
                );
                links.push(LinkSpec {
                    id,
                    label: format!("Extranet\u{2192}{site_name} {upper}"),
                    from: LinkEnd::Cloud,
                    to: LinkEnd::device(format!("{site_id}-{cpe}")),
                    dashed: true,
                });
            }
        }

        Self {
            title: "NDC / CDC edge connectivity".to_string(),
            sites,
            devices,
            links,
            cloud,
            hover_text,
        }
    }

    pub fn site(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|site| site.id == id)
    }

    pub fn device(&self, id: &str) -> Option<&DeviceSpec> {
        self.devices.iter().find(|device| device.id == id)
    }

    /// Checks ids and references. Sizes are checked by the layout engine,
    /// which owns the tier size table.
    pub fn validate(&self) -> Result<(), TopologyError> {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(self.cloud.id.as_str());
        for site in &self.sites {
            if !seen.insert(site.id.as_str()) {
                return Err(TopologyError::DuplicateId(site.id.clone()));
            }
        }
        for device in &self.devices {
            if !seen.insert(device.id.as_str()) {
                return Err(TopologyError::DuplicateId(device.id.clone()));
            }
            if self.site(&device.site).is_none() {
                return Err(TopologyError::UnknownSite {
                    device: device.id.clone(),
                    site: device.site.clone(),
                });
            }
        }
        for link in &self.links {
            if !seen.insert(link.id.as_str()) {
                return Err(TopologyError::DuplicateId(link.id.clone()));
            }
            for end in [&link.from, &link.to] {
                if let LinkEnd::Device { id, .. } = end
                    && self.device(id).is_none()
                {
                    return Err(TopologyError::UnknownElement {
                        link: link.id.clone(),
                        element: id.clone(),
                    });
                }
            }
            if link.from.element_id(&self.cloud.id) == link.to.element_id(&self.cloud.id) {
                return Err(TopologyError::SelfLink(link.id.clone()));
            }
        }
        if !(self.cloud.bounds.width > 0.0 && self.cloud.bounds.height > 0.0) {
            return Err(TopologyError::InvalidSize {
                what: format!("cloud `{}`", self.cloud.id),
                width: self.cloud.bounds.width,
                height: self.cloud.bounds.height,
            });
        }
        Ok(())
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::dual_site()
    }
}

fn device_hover_text(tier: DeviceTier, site_name: &str) -> String {
    match tier {
        DeviceTier::Cpe => {
            format!("PSBA-managed CPE terminating an MPLS circuit at {site_name}")
        }
        DeviceTier::Wan => {
            format!("DHCW WAN router handing {site_name} traffic to the edge firewalls")
        }
        DeviceTier::Fw => {
            format!("Active/standby Check Point firewall pair protecting the {site_name} core")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dual_site_table_is_valid() {
        let topology = Topology::dual_site();
        assert_eq!(topology.sites.len(), 2);
        assert_eq!(topology.devices.len(), 10);
        assert_eq!(topology.links.len(), 12);
        assert!(topology.validate().is_ok());
    }

    #[test]
    fn only_cloud_links_are_dashed() {
        let topology = Topology::dual_site();
        for link in &topology.links {
            let touches_cloud = link.from == LinkEnd::Cloud || link.to == LinkEnd::Cloud;
            assert_eq!(link.dashed, touches_cloud, "{}", link.id);
        }
    }

    #[test]
    fn every_element_has_hover_text() {
        let topology = Topology::dual_site();
        for device in &topology.devices {
            assert!(topology.hover_text.contains_key(&device.id), "{}", device.id);
        }
        for link in &topology.links {
            assert!(topology.hover_text.contains_key(&link.id), "{}", link.id);
        }
        assert_eq!(
            topology.hover_text.len(),
            topology.devices.len() + topology.links.len()
        );
    }

    #[test]
    fn rejects_unknown_site() {
        let mut topology = Topology::dual_site();
        topology.devices[0].site = "dr".to_string();
        assert_eq!(
            topology.validate(),
            Err(TopologyError::UnknownSite {
                device: "ndc-cpe-1".to_string(),
                site: "dr".to_string(),
            })
        );
    }

    #[test]
    fn rejects_dangling_link_end() {
        let mut topology = Topology::dual_site();
        topology.links[0].to = LinkEnd::device("ndc-wan-9");
        assert!(matches!(
            topology.validate(),
            Err(TopologyError::UnknownElement { element, .. }) if element == "ndc-wan-9"
        ));
    }

    #[test]
    fn rejects_duplicate_ids_and_self_links() {
        let mut topology = Topology::dual_site();
        topology.devices[1].id = "ndc-cpe-1".to_string();
        assert_eq!(
            topology.validate(),
            Err(TopologyError::DuplicateId("ndc-cpe-1".to_string()))
        );

        let mut topology = Topology::dual_site();
        topology.links[0].to = LinkEnd::device("ndc-cpe-1");
        assert_eq!(
            topology.validate(),
            Err(TopologyError::SelfLink("ndc-cpe-1-wan-1".to_string()))
        );
    }

    #[test]
    fn tokens_round_trip() {
        let tiers: Vec<_> = DeviceTier::ALL.iter().map(|tier| tier.as_str()).collect();
        assert_eq!(tiers, ["cpe", "wan", "fw"]);
        assert_eq!(ElementKind::from_token("link"), Some(ElementKind::Link));
        assert_eq!(ElementKind::from_token("cloud"), None);
        assert_eq!(ElementRef::device("ndc-fw").to_string(), "device:ndc-fw");
    }
}

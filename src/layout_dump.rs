use crate::interaction::InteractionState;
use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
    pub cloud: CloudDump,
    pub sites: Vec<SiteDump>,
    pub devices: Vec<DeviceDump>,
    pub links: Vec<LinkDump>,
    pub active: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CloudDump {
    pub id: String,
    pub label: String,
    pub bounds: [f32; 4],
    pub anchor: [f32; 2],
}

#[derive(Debug, Serialize)]
pub struct SiteDump {
    pub id: String,
    pub name: String,
    pub origin: [f32; 2],
}

#[derive(Debug, Serialize)]
pub struct DeviceDump {
    pub id: String,
    pub label: String,
    pub site: String,
    pub tier: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub id: String,
    pub label: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub from_side: Option<String>,
    pub to_side: Option<String>,
    pub dashed: bool,
    pub points: [[f32; 2]; 2],
    pub active: bool,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, state: &InteractionState) -> Self {
        let devices = layout
            .devices
            .iter()
            .map(|device| DeviceDump {
                id: device.id.clone(),
                label: device.label.clone(),
                site: device.site.clone(),
                tier: device.tier.as_str().to_string(),
                x: device.rect.x,
                y: device.rect.y,
                width: device.rect.width,
                height: device.rect.height,
                active: state.is_active(&crate::ir::ElementRef::device(&device.id)),
            })
            .collect();

        let links = layout
            .links
            .iter()
            .map(|link| LinkDump {
                id: link.id.clone(),
                label: link.label.clone(),
                from: link.from.as_ref().map(|a| a.element.clone()),
                to: link.to.as_ref().map(|a| a.element.clone()),
                from_side: link.from.as_ref().map(|a| a.side.as_str().to_string()),
                to_side: link.to.as_ref().map(|a| a.side.as_str().to_string()),
                dashed: link.dashed,
                points: [[link.start.x, link.start.y], [link.end.x, link.end.y]],
                active: state.is_active(&crate::ir::ElementRef::link(&link.id)),
            })
            .collect();

        let cloud = &layout.cloud;
        LayoutDump {
            title: layout.title.clone(),
            width: layout.width,
            height: layout.height,
            zoom: state.zoom.scale(),
            cloud: CloudDump {
                id: cloud.id.clone(),
                label: cloud.label.clone(),
                bounds: [cloud.bounds.x, cloud.bounds.y, cloud.bounds.width, cloud.bounds.height],
                anchor: [cloud.anchor.x, cloud.anchor.y],
            },
            sites: layout
                .sites
                .iter()
                .map(|site| SiteDump {
                    id: site.id.clone(),
                    name: site.name.clone(),
                    origin: [site.origin.x, site.origin.y],
                })
                .collect(),
            devices,
            links,
            active: state
                .active_elements()
                .into_iter()
                .map(|element| element.to_string())
                .collect(),
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &Layout,
    state: &InteractionState,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, state);
    serde_json::to_writer_pretty(writer, &dump)?;
    tracing::info!(path = %path.display(), "wrote layout dump");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ElementRef;
    use crate::layout::default_layout;

    #[test]
    fn dump_serialises_resolved_geometry() {
        let layout = default_layout();
        let mut state = InteractionState::new();
        state.on_click(layout, &ElementRef::device("ndc-cpe-1"));
        let value = serde_json::to_value(LayoutDump::from_layout(layout, &state)).unwrap();

        assert_eq!(value["devices"].as_array().unwrap().len(), 10);
        assert_eq!(value["links"].as_array().unwrap().len(), 12);
        assert_eq!(value["cloud"]["anchor"], serde_json::json!([586.0, 168.0]));
        assert_eq!(value["active"], serde_json::json!(["device:ndc-cpe-1"]));

        let first = &value["devices"][0];
        assert_eq!(first["id"], "ndc-cpe-1");
        assert_eq!(first["active"], true);
        assert_eq!(first["x"], 120.0);

        let link = &value["links"][0];
        assert_eq!(link["from_side"], "bottom");
        assert_eq!(link["to_side"], "top");
        assert_eq!(link["points"], serde_json::json!([[220.0, 300.0], [220.0, 390.0]]));
    }

    #[test]
    fn dump_is_written_as_json() {
        let path = std::env::temp_dir().join(format!("topodiag-dump-{}.json", std::process::id()));
        write_layout_dump(&path, default_layout(), &InteractionState::new()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(
            value["links"][0]["points"],
            serde_json::json!([[220.0, 300.0], [220.0, 390.0]])
        );
        assert_eq!(value["active"], serde_json::json!([]));
    }
}

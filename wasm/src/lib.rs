use serde::Deserialize;
use topology_diagram::{
    ElementKind, ElementRef, InteractionState, Layout, RenderOptions, Topology, Zoom,
    compute_layout, render_svg,
};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    show_legend: Option<bool>,
    show_zoom_controls: Option<bool>,
}

fn build_render_options(options: ViewOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("contrast") {
        RenderOptions::high_contrast()
    } else {
        RenderOptions::classic()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(show) = options.show_legend {
        render_options.layout.show_legend = show;
    }
    if let Some(show) = options.show_zoom_controls {
        render_options.layout.show_zoom_controls = show;
    }
    // No system fonts inside the browser sandbox.
    render_options.layout.fast_text_metrics = true;

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<RenderOptions, JsValue> {
    let options = match options_json {
        Some(raw) => serde_json::from_str::<ViewOptions>(&raw)
            .map_err(|error| JsValue::from_str(&error.to_string()))?,
        None => ViewOptions::default(),
    };
    Ok(build_render_options(options))
}

fn element_ref(kind: &str, id: &str) -> Result<ElementRef, JsValue> {
    let kind = ElementKind::from_token(kind)
        .ok_or_else(|| JsValue::from_str(&format!("unknown element kind `{kind}`")))?;
    Ok(ElementRef {
        kind,
        id: id.to_string(),
    })
}

/// Diagram plus its UI state; the host forwards pointer events and
/// re-renders after each call.
#[wasm_bindgen]
pub struct TopologyView {
    layout: Layout,
    state: InteractionState,
    options: RenderOptions,
}

#[wasm_bindgen]
impl TopologyView {
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: Option<String>) -> Result<TopologyView, JsValue> {
        let options = parse_options(options_json)?;
        let layout = compute_layout(&Topology::dual_site(), &options.layout)
            .map_err(|error| JsValue::from_str(&error.to_string()))?;
        Ok(Self {
            layout,
            state: InteractionState::new(),
            options,
        })
    }

    #[wasm_bindgen(js_name = onEnter)]
    pub fn on_enter(&mut self, kind: &str, id: &str) -> Result<(), JsValue> {
        let element = element_ref(kind, id)?;
        self.state.on_enter(&self.layout, &element);
        Ok(())
    }

    #[wasm_bindgen(js_name = onLeave)]
    pub fn on_leave(&mut self) {
        self.state.on_leave();
    }

    #[wasm_bindgen(js_name = onClick)]
    pub fn on_click(&mut self, kind: &str, id: &str) -> Result<(), JsValue> {
        let element = element_ref(kind, id)?;
        self.state.on_click(&self.layout, &element);
        Ok(())
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) {
        self.state.zoom_in();
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) {
        self.state.zoom_out();
    }

    #[wasm_bindgen(js_name = zoomReset)]
    pub fn zoom_reset(&mut self) {
        self.state.reset_zoom();
    }

    /// Snaps a host-supplied factor (wheel or pinch) to the nearest zoom step.
    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, scale: f32) {
        self.state.zoom = Zoom::from_scale(scale);
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f32 {
        self.state.zoom.scale()
    }

    #[wasm_bindgen(js_name = renderSvg)]
    pub fn render_svg(&self) -> String {
        render_svg(&self.layout, &self.state, &self.options.theme, &self.options.layout)
    }
}

#[wasm_bindgen]
pub fn render_topology_svg(options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    topology_diagram::render_with_options(&InteractionState::new(), &options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use topology_diagram::{InteractionState, render_with_options};

    use crate::{TopologyView, ViewOptions, build_render_options};

    #[test]
    fn renders_default_view() {
        let svg = render_with_options(
            &InteractionState::new(),
            &build_render_options(ViewOptions::default()),
        )
        .expect("built-in topology should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Check Point Edge FW Cluster"));
        assert!(svg.contains("id=\"legend\""));
    }

    #[test]
    fn options_toggle_overlays() {
        let options = build_render_options(ViewOptions {
            theme: Some("contrast".to_string()),
            show_legend: Some(false),
            ..ViewOptions::default()
        });
        assert!(!options.layout.show_legend);
        assert!(options.layout.fast_text_metrics);
        let svg = render_with_options(&InteractionState::new(), &options).unwrap();
        assert!(!svg.contains("id=\"legend\""));
    }

    #[test]
    fn set_zoom_snaps_to_steps() {
        let mut view = TopologyView::new(None).unwrap();
        view.set_zoom(1.34);
        assert_eq!(view.zoom(), 1.3);
        assert!(view.render_svg().contains("130%"));
        view.set_zoom(9.0);
        assert_eq!(view.zoom(), 2.5);
        view.zoom_in();
        assert_eq!(view.zoom(), 2.5);
        view.set_zoom(f32::NAN);
        assert_eq!(view.zoom(), 1.0);
    }
}

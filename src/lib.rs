#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod interaction;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod scene;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::{run, run_with};
pub use config::{Config, LayoutConfig, RenderConfig};
pub use error::{ConfigError, TopologyError};
pub use interaction::{Event, Focus, InteractionState, Zoom};
pub use ir::{DeviceTier, ElementKind, ElementRef, Topology};
pub use layout::{Layout, compute_layout, default_layout};
pub use render::render_svg;
pub use scene::build_scene;
pub use theme::Theme;

/// Theme and layout settings for one render.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self {
            theme: Theme::classic(),
            layout: LayoutConfig::default(),
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            theme: Theme::high_contrast(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::classic()
    }
}

/// Lays out the built-in topology with `options` and renders it in `state`.
pub fn render_with_options(
    state: &InteractionState,
    options: &RenderOptions,
) -> Result<String, TopologyError> {
    let layout = compute_layout(&Topology::dual_site(), &options.layout)?;
    Ok(render_svg(&layout, state, &options.theme, &options.layout))
}

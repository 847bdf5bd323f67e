use crate::error::ConfigError;
use crate::ir::DeviceTier;
use crate::layout::geometry::Size;
use crate::theme::Theme;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#[0-9a-fA-F]{3,8}|(rgb|rgba|hsl|hsla)\(\s*[0-9.,%\s]+\)|[a-zA-Z]+)$").unwrap()
});

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub device_size: Size,
    pub firewall_size: Size,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub site_label_offset: f32,
    pub link_label_offset: f32,
    pub show_link_labels: bool,
    pub show_legend: bool,
    pub show_zoom_controls: bool,
    pub show_grid: bool,
    pub grid_size: f32,
    pub tooltip_padding: f32,
    pub tooltip_max_width: f32,
    pub tooltip_gap: f32,
    /// Skip system font lookup and use estimated glyph widths.
    pub fast_text_metrics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            device_size: Size::new(200.0, 80.0),
            firewall_size: Size::new(200.0, 90.0),
            canvas_width: 1200.0,
            canvas_height: 780.0,
            site_label_offset: 30.0,
            link_label_offset: 6.0,
            show_link_labels: true,
            show_legend: true,
            show_zoom_controls: true,
            show_grid: true,
            grid_size: 40.0,
            tooltip_padding: 8.0,
            tooltip_max_width: 300.0,
            tooltip_gap: 10.0,
            fast_text_metrics: false,
        }
    }
}

impl LayoutConfig {
    /// Box size implied by a device tier.
    pub fn tier_size(&self, tier: DeviceTier) -> Size {
        match tier {
            DeviceTier::Cpe | DeviceTier::Wan => self.device_size,
            DeviceTier::Fw => self.firewall_size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 780.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    grid_color: Option<String>,
    text_color: Option<String>,
    link_color: Option<String>,
    active_color: Option<String>,
    cpe_stroke: Option<String>,
    cpe_fill: Option<String>,
    wan_stroke: Option<String>,
    wan_fill: Option<String>,
    fw_stroke: Option<String>,
    fw_fill: Option<String>,
    cloud_stroke: Option<String>,
    tooltip_background: Option<String>,
    tooltip_text_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOverrides {
    device_width: Option<f32>,
    device_height: Option<f32>,
    firewall_width: Option<f32>,
    firewall_height: Option<f32>,
    canvas_width: Option<f32>,
    canvas_height: Option<f32>,
    show_link_labels: Option<bool>,
    show_legend: Option<bool>,
    show_zoom_controls: Option<bool>,
    show_grid: Option<bool>,
    grid_size: Option<f32>,
    tooltip_max_width: Option<f32>,
    fast_text_metrics: Option<bool>,
}

pub fn theme_by_name(name: &str) -> Result<Theme, ConfigError> {
    match name {
        "classic" | "default" => Ok(Theme::classic()),
        "contrast" | "high-contrast" => Ok(Theme::high_contrast()),
        other => Err(ConfigError::UnknownTheme(other.to_string())),
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_config(&contents, &path.display().to_string())?;
    tracing::info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Parses a JSON or JSON5 config document on top of the defaults.
pub fn parse_config(contents: &str, origin: &str) -> Result<Config, ConfigError> {
    let parsed: ConfigFile = json5::from_str(contents).map_err(|err| ConfigError::Parse {
        path: origin.to_string(),
        message: err.to_string(),
    })?;
    apply_config_file(Config::default(), parsed)
}

fn apply_config_file(mut config: Config, parsed: ConfigFile) -> Result<Config, ConfigError> {
    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = theme_by_name(theme_name)?;
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = positive("fontSize", v)?;
        }
        if let Some(v) = vars.background {
            config.theme.background = color("background", v)?;
            config.render.background = config.theme.background.clone();
        }
        if let Some(v) = vars.grid_color {
            config.theme.grid_color = color("gridColor", v)?;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = color("textColor", v)?;
        }
        if let Some(v) = vars.link_color {
            config.theme.link_color = color("linkColor", v)?;
        }
        if let Some(v) = vars.active_color {
            config.theme.active_color = color("activeColor", v)?;
        }
        let tier_overrides = [
            (DeviceTier::Cpe, "cpe", vars.cpe_stroke, vars.cpe_fill),
            (DeviceTier::Wan, "wan", vars.wan_stroke, vars.wan_fill),
            (DeviceTier::Fw, "fw", vars.fw_stroke, vars.fw_fill),
        ];
        for (tier, prefix, stroke, fill) in tier_overrides {
            let palette = config.theme.palette_mut(tier);
            if let Some(v) = stroke {
                palette.stroke = color(&format!("{prefix}Stroke"), v)?;
            }
            if let Some(v) = fill {
                palette.fill = color(&format!("{prefix}Fill"), v)?;
            }
        }
        if let Some(v) = vars.cloud_stroke {
            config.theme.cloud_stroke = color("cloudStroke", v)?;
        }
        if let Some(v) = vars.tooltip_background {
            config.theme.tooltip_background = color("tooltipBackground", v)?;
        }
        if let Some(v) = vars.tooltip_text_color {
            config.theme.tooltip_text_color = color("tooltipTextColor", v)?;
        }
    }

    if let Some(layout) = parsed.layout {
        let cfg = &mut config.layout;
        if let Some(v) = layout.device_width {
            cfg.device_size.width = positive("deviceWidth", v)?;
        }
        if let Some(v) = layout.device_height {
            cfg.device_size.height = positive("deviceHeight", v)?;
        }
        if let Some(v) = layout.firewall_width {
            cfg.firewall_size.width = positive("firewallWidth", v)?;
        }
        if let Some(v) = layout.firewall_height {
            cfg.firewall_size.height = positive("firewallHeight", v)?;
        }
        if let Some(v) = layout.canvas_width {
            cfg.canvas_width = positive("canvasWidth", v)?;
        }
        if let Some(v) = layout.canvas_height {
            cfg.canvas_height = positive("canvasHeight", v)?;
        }
        if let Some(v) = layout.grid_size {
            cfg.grid_size = positive("gridSize", v)?;
        }
        if let Some(v) = layout.tooltip_max_width {
            cfg.tooltip_max_width = positive("tooltipMaxWidth", v)?;
        }
        if let Some(v) = layout.show_link_labels {
            cfg.show_link_labels = v;
        }
        if let Some(v) = layout.show_legend {
            cfg.show_legend = v;
        }
        if let Some(v) = layout.show_zoom_controls {
            cfg.show_zoom_controls = v;
        }
        if let Some(v) = layout.show_grid {
            cfg.show_grid = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            cfg.fast_text_metrics = v;
        }
    }

    Ok(config)
}

fn color(key: &str, value: String) -> Result<String, ConfigError> {
    if COLOR_RE.is_match(value.trim()) {
        Ok(value.trim().to_string())
    } else {
        Err(ConfigError::InvalidColor {
            key: key.to_string(),
            value,
        })
    }
}

fn positive(key: &str, value: f32) -> Result<f32, ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive {
            key: key.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tier_sizes() {
        let config = LayoutConfig::default();
        assert_eq!(config.tier_size(DeviceTier::Cpe), Size::new(200.0, 80.0));
        assert_eq!(config.tier_size(DeviceTier::Wan), Size::new(200.0, 80.0));
        assert_eq!(config.tier_size(DeviceTier::Fw), Size::new(200.0, 90.0));
    }

    #[test]
    fn parses_json5_overrides() {
        let config = parse_config(
            r##"{
                // comments are allowed
                theme: "contrast",
                themeVariables: { activeColor: "#ff00aa", cpeFill: "rgb(1, 2, 3)" },
                layout: { showLegend: false, firewallHeight: 100 },
            }"##,
            "inline",
        )
        .expect("config should parse");
        assert_eq!(config.theme.active_color, "#ff00aa");
        assert_eq!(config.theme.cpe.fill, "rgb(1, 2, 3)");
        assert_eq!(config.theme.wan.stroke, Theme::high_contrast().wan.stroke);
        assert!(!config.layout.show_legend);
        assert_eq!(config.layout.firewall_size, Size::new(200.0, 100.0));
    }

    #[test]
    fn plain_json_is_accepted() {
        let config = parse_config(r#"{"themeVariables": {"fontSize": 12}}"#, "inline").unwrap();
        assert_eq!(config.theme.font_size, 12.0);
    }

    #[test]
    fn rejects_bad_colour() {
        let err = parse_config(r#"{"themeVariables": {"linkColor": "url(#x)"}}"#, "inline")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColor { ref key, .. } if key == "linkColor"));
    }

    #[test]
    fn rejects_unknown_theme_and_non_positive_sizes() {
        assert!(matches!(
            parse_config(r#"{"theme": "neon"}"#, "inline"),
            Err(ConfigError::UnknownTheme(_))
        ));
        assert!(matches!(
            parse_config(r#"{"layout": {"deviceWidth": 0}}"#, "inline"),
            Err(ConfigError::NonPositive { .. })
        ));
    }

    #[test]
    fn missing_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.canvas_width, 1200.0);
        assert_eq!(config.render.background, config.theme.background);
    }
}

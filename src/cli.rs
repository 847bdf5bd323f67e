use crate::config::{Config, load_config, theme_by_name};
use crate::interaction::{Event, InteractionState};
use crate::ir::Topology;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_png, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "topodiag", version, about = "Render the NDC/CDC edge topology diagram")]
pub struct Args {
    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Theme name (classic, contrast); overrides the config file
    #[arg(short = 't', long = "theme")]
    pub theme: Option<String>,

    /// PNG width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// PNG height
    #[arg(short = 'H', long = "height", default_value_t = 780.0)]
    pub height: f32,

    /// Interaction event replayed before rendering, e.g. `enter:device:ndc-cpe-1`,
    /// `click:link:extranet-cdc-cpe-2`, `leave`, `zoom-in`. Repeatable.
    #[arg(long = "event", value_name = "EVENT")]
    pub events: Vec<Event>,

    /// Also write the resolved layout as JSON
    #[arg(long = "dump-layout", value_name = "PATH")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    run_with(Args::parse())
}

pub fn run_with(args: Args) -> Result<()> {
    let config = resolve_config(&args)?;

    let topology = Topology::dual_site();
    let layout = compute_layout(&topology, &config.layout)?;

    let mut state = InteractionState::new();
    for event in &args.events {
        state.apply(&layout, event);
    }

    let svg = render_svg(&layout, &state, &config.theme, &config.layout);
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(args.output.as_deref(), "png")?;
            write_output_png(&svg, &output, &config.render)?;
        }
    }

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &layout, &state)?;
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(name) = args.theme.as_deref() {
        config.theme = theme_by_name(name)?;
        config.render.background = config.theme.background.clone();
    }
    config.render.width = args.width;
    config.render.height = args.height;
    Ok(config)
}

fn ensure_output(output: Option<&Path>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.to_path_buf());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn parses_repeated_events() {
        let args = Args::try_parse_from([
            "topodiag",
            "--event",
            "zoom-in",
            "--event",
            "click:device:ndc-fw",
            "-t",
            "contrast",
        ])
        .unwrap();
        assert_eq!(args.events.len(), 2);
        assert_eq!(args.events[0], Event::ZoomIn);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.theme.active_color, crate::theme::Theme::high_contrast().active_color);
    }

    #[test]
    fn rejects_malformed_events() {
        assert!(Args::try_parse_from(["topodiag", "--event", "hover:ndc"]).is_err());
    }

    #[test]
    fn png_requires_output_path() {
        assert!(ensure_output(None, "png").is_err());
        assert_eq!(
            ensure_output(Some(Path::new("out.png")), "png").unwrap(),
            PathBuf::from("out.png")
        );
    }

    #[test]
    fn run_with_replays_events_into_dump() {
        let dir = std::env::temp_dir();
        let pid = std::process::id();
        let svg_path = dir.join(format!("topodiag-run-{pid}.svg"));
        let dump_path = dir.join(format!("topodiag-run-{pid}.json"));
        let args = Args::try_parse_from([
            OsString::from("topodiag"),
            OsString::from("-o"),
            svg_path.clone().into_os_string(),
            OsString::from("--event"),
            OsString::from("click:device:ndc-fw"),
            OsString::from("--dump-layout"),
            dump_path.clone().into_os_string(),
        ])
        .unwrap();
        run_with(args).unwrap();

        let svg = std::fs::read_to_string(&svg_path).unwrap();
        let dump = std::fs::read_to_string(&dump_path).unwrap();
        let _ = std::fs::remove_file(&svg_path);
        let _ = std::fs::remove_file(&dump_path);

        assert!(svg.contains("class=\"device fw active\""));
        let value: serde_json::Value = serde_json::from_str(&dump).unwrap();
        assert_eq!(value["active"], serde_json::json!(["device:ndc-fw"]));
    }
}

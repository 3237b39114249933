use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "foxbar", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a progress bar as a PNG.
    Render(RenderArgs),
    /// Print the computed track and fill rectangles as JSON.
    Geometry(BarArgs),
}

#[derive(Args, Debug)]
struct BarArgs {
    /// Bar config JSON (widget option names, camelCase). Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fill percentage.
    #[arg(long, allow_negative_numbers = true)]
    percent: Option<f64>,

    /// Unscaled width.
    #[arg(long)]
    width: Option<f64>,

    /// Unscaled height.
    #[arg(long)]
    height: Option<f64>,

    /// Device scale multiplier.
    #[arg(long)]
    scale: Option<f64>,

    /// Fill color (hex).
    #[arg(long)]
    fill: Option<String>,

    /// Track color (hex).
    #[arg(long)]
    background: Option<String>,

    /// Grow the fill vertically.
    #[arg(long)]
    vertical: bool,

    /// Anchor the fill to the trailing edge.
    #[arg(long)]
    from_end: bool,

    /// Paint the track background.
    #[arg(long)]
    opaque: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    bar: BarArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Backend to use; defaults to the FOXBAR_BACKEND environment selection.
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
    Svg,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Geometry(args) => cmd_geometry(args),
    }
}

fn read_config_json(path: &Path) -> anyhow::Result<foxbar::ProgressBarConfig> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let cfg: foxbar::ProgressBarConfig =
        serde_json::from_reader(r).with_context(|| "parse bar config JSON")?;
    Ok(cfg)
}

fn build_config(args: &BarArgs) -> anyhow::Result<foxbar::ProgressBarConfig> {
    let mut cfg = match &args.config {
        Some(path) => read_config_json(path)?,
        None => foxbar::ProgressBarConfig::default(),
    };

    if let Some(pct) = args.percent {
        cfg.progress_percentage = pct;
    }
    if let Some(w) = args.width {
        cfg.width = w;
    }
    if let Some(h) = args.height {
        cfg.height = h;
    }
    if let Some(s) = args.scale {
        cfg.screen_scale = s;
        cfg.respect_screen_scale = true;
    }
    if let Some(fill) = &args.fill {
        cfg.fill_color = fill.parse()?;
    }
    if let Some(bg) = &args.background {
        cfg.background_color = bg.parse()?;
    }
    if args.vertical {
        cfg.orientation = foxbar::Orientation::Vertical;
    }
    if args.from_end {
        cfg.fill_direction = foxbar::FillDirection::FromEnd;
    }
    if args.opaque {
        cfg.transparent = false;
    }

    cfg.validate()?;
    Ok(cfg)
}

fn make_backend(choice: Option<BackendChoice>) -> anyhow::Result<Box<dyn foxbar::RasterBackend>> {
    let kind = match choice {
        Some(BackendChoice::Cpu) => foxbar::BackendKind::Cpu,
        Some(BackendChoice::Svg) => foxbar::BackendKind::Svg,
        None => foxbar::BackendKind::from_env()?,
    };
    Ok(foxbar::create_backend(
        kind,
        &foxbar::RenderSettings::from_env(),
    ))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = build_config(&args.bar)?;
    let backend = make_backend(args.backend)?;

    let image = foxbar::render_bar(&cfg, backend.as_ref())?;
    image.save_png(&args.out)?;

    eprintln!(
        "wrote {} ({}x{})",
        args.out.display(),
        image.width(),
        image.height()
    );
    Ok(())
}

fn cmd_geometry(args: BarArgs) -> anyhow::Result<()> {
    let cfg = build_config(&args)?;
    let geometry = foxbar::compute_geometry(&cfg)?;
    println!("{}", serde_json::to_string_pretty(&geometry)?);
    Ok(())
}

use std::{
    f32::consts::PI,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use waveline_core::{Color, PixmapSurface, WaveLineView, WaveformConfig};

fn main() -> waveline_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            config,
            width,
            height,
            seconds,
            output,
            transparent,
            min_contrast,
        } => {
            let mut config = load_config(config.as_deref())?;
            if transparent {
                config.background_color = Color::TRANSPARENT;
            }
            if let Some(min_ratio) = min_contrast {
                ensure_readable_line(&mut config, min_ratio);
            }
            run_render(config, width, height, seconds, &output)
        }
        Commands::Config { output } => run_config(output.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> waveline_core::Result<WaveformConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            WaveformConfig::load(path)
        }
        None => Ok(WaveformConfig::default()),
    }
}

/// Swaps the line color for black or white when it is hard to see on the
/// background. A transparent background leaves the line color alone.
fn ensure_readable_line(config: &mut WaveformConfig, min_ratio: f64) {
    let background = config.background_color;
    if background.is_transparent() {
        return;
    }
    let candidates = [config.line_color, Color::BLACK, Color::WHITE];
    if let Some(picked) = Color::pick_contrasting(&candidates, background, min_ratio) {
        if picked != config.line_color {
            tracing::info!(
                from = %config.line_color,
                to = %picked,
                "line color adjusted for contrast"
            );
            config.line_color = picked;
        }
    }
}

fn run_render(
    config: WaveformConfig,
    width: u32,
    height: u32,
    seconds: f32,
    output: &Path,
) -> waveline_core::Result<()> {
    tracing::info!(width, height, seconds, ?output, "rendering waveform");

    let interval = config.frame_interval();
    let mut view = WaveLineView::new(config);
    let (surface, handle) = PixmapSurface::new(width, height);

    view.on_surface_created(surface);
    view.on_surface_changed(width, height);
    view.start_anim();

    let started = Instant::now();
    let duration = Duration::from_secs_f32(seconds.max(0.0));
    while started.elapsed() < duration {
        view.update_amplitude(synthetic_amplitude(started.elapsed().as_secs_f32()));
        thread::sleep(interval);
    }

    // Pausing keeps the last waveform frame in the front buffer.
    view.on_pause();
    handle.save_png(output)?;
    tracing::info!(
        frames = handle.published_frames()?,
        ?output,
        "saved last published frame"
    );

    view.on_surface_destroyed();
    view.release();
    Ok(())
}

fn run_config(output: Option<&Path>) -> waveline_core::Result<()> {
    let json = WaveformConfig::default().to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(?path, "wrote default configuration");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Speech-like envelope: a slow swell with a faster flutter on top.
fn synthetic_amplitude(t: f32) -> f32 {
    let swell = 0.5 + 0.4 * (t * 2.0 * PI * 0.5).sin();
    let flutter = 0.1 * (t * 2.0 * PI * 3.0).sin();
    (swell + flutter).clamp(0.0, 1.0)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Volume-driven waveform renderer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Animate the waveform headlessly and save the last frame as PNG.
    Render {
        /// JSON configuration file; defaults are used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 720)]
        width: u32,
        #[arg(long, default_value_t = 240)]
        height: u32,
        /// How long to animate before capturing.
        #[arg(short, long, default_value_t = 2.0)]
        seconds: f32,
        #[arg(short, long, default_value = "waveline.png")]
        output: PathBuf,
        /// Clear to transparent instead of painting the background color.
        #[arg(long)]
        transparent: bool,
        /// Minimum contrast ratio between line and background; the line falls
        /// back to black or white below it.
        #[arg(long)]
        min_contrast: Option<f64>,
    },
    /// Print or write the default configuration.
    Config {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

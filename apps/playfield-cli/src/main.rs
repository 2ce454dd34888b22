use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec2;
use playfield_assets::{AssetCache, TiledMap};
use playfield_common::{FollowMode, PlayConfig, StepMode};
use playfield_kernel::ManualClock;
use playfield_physics::RapierWorld;
use playfield_render::{
    DrawLog, RecordingBatch, RecordingDebugRenderer, RecordingMapRenderer, RecordingSurface,
};
use playfield_screen::{Capabilities, Entity, FrameContext, PlayScreen, Screen};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "playfield-cli", about = "Headless host for the playfield play screen")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the default configuration as YAML
    Config,
    /// Run the play screen for a number of frames
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// YAML config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON asset manifest; a generated demo level is used when omitted
    #[arg(short, long)]
    manifest: Option<PathBuf>,
    /// Number of display frames to run
    #[arg(short, long, default_value = "120")]
    frames: u32,
    /// Simulated display frame time in milliseconds
    #[arg(long, default_value = "16.667")]
    frame_ms: f64,
    #[arg(long, value_enum)]
    step_mode: Option<StepArg>,
    #[arg(long, value_enum)]
    follow: Option<FollowArg>,
    /// Smoothing rate for `--follow lerp`, per second
    #[arg(long, default_value = "8.0")]
    lerp_rate: f32,
    /// Vertical gravity in m/s^2
    #[arg(long, allow_hyphen_values = true)]
    gravity: Option<f32>,
    /// Initial horizontal player velocity in m/s
    #[arg(long, allow_hyphen_values = true)]
    kick: Option<f32>,
    /// Turn off the physics wireframe overlay
    #[arg(long)]
    no_debug: bool,
    /// Print the draw calls of the last frame
    #[arg(long)]
    dump_frame: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StepArg {
    Gated,
    Accumulate,
}

#[derive(Clone, Copy, ValueEnum)]
enum FollowArg {
    Set,
    Translate,
    Lerp,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("playfield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", playfield_common::crate_info());
            println!("kernel: {}", playfield_kernel::crate_info());
            println!("physics: {}", playfield_physics::crate_info());
            println!("assets: {}", playfield_assets::crate_info());
            println!("render: {}", playfield_render::crate_info());
            println!("screen: {}", playfield_screen::crate_info());
        }
        Commands::Config => {
            print!("{}", PlayConfig::default().to_yaml_string()?);
        }
        Commands::Run(args) => run(args)?,
    }

    Ok(())
}

fn load_config(args: &RunArgs) -> Result<PlayConfig> {
    let mut config = match &args.config {
        Some(path) => PlayConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PlayConfig::default(),
    };
    if let Some(mode) = args.step_mode {
        config.step_mode = match mode {
            StepArg::Gated => StepMode::Gated,
            StepArg::Accumulate => StepMode::Accumulate,
        };
    }
    if let Some(follow) = args.follow {
        config.camera.mode = match follow {
            FollowArg::Set => FollowMode::Set,
            FollowArg::Translate => FollowMode::Translate,
            FollowArg::Lerp => FollowMode::Lerp {
                rate: args.lerp_rate,
            },
        };
    }
    if let Some(g) = args.gravity {
        config.gravity = [0.0, g];
    }
    if args.no_debug {
        config.debug_draw = false;
    }
    config.validate()?;
    Ok(config)
}

fn frame_time(frame_ms: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(frame_ms / 1000.0)
        .with_context(|| format!("frame time out of range: {frame_ms} ms"))
}

/// A small level matching the configured asset paths.
fn demo_assets(config: &PlayConfig) -> AssetCache {
    let mut cache = AssetCache::new();
    let tiles_x = (config.viewport.width / 16.0).ceil() as u32;
    let tiles_y = (config.viewport.height / 16.0).ceil() as u32;
    cache.insert_map(&config.assets.map, TiledMap::filled("demo", tiles_x, tiles_y, 16, 1));
    cache.insert_texture(&config.assets.hud, config.viewport.width as u32, 64);
    cache.insert_texture(
        &config.assets.player,
        config.player.width as u32,
        config.player.height as u32,
    );
    cache
}

fn run(args: RunArgs) -> Result<()> {
    let config = load_config(&args)?;
    let assets = match &args.manifest {
        Some(path) => AssetCache::load(path)
            .with_context(|| format!("loading manifest {}", path.display()))?,
        None => demo_assets(&config),
    };

    let log = DrawLog::new();
    let clock = ManualClock::new();
    let gravity = Vec2::from(config.gravity);
    let mut screen = PlayScreen::new(
        config,
        Rc::new(assets),
        Capabilities {
            physics: Box::new(RapierWorld::new(gravity)),
            map_renderer: Box::new(RecordingMapRenderer::new(log.clone())),
            debug_renderer: Box::new(RecordingDebugRenderer::new(log.clone())),
            clock: Box::new(clock.clone()),
        },
    );
    let mut surface = RecordingSurface::new(log.clone());
    let mut batch = RecordingBatch::new(log.clone());

    screen.show()?;
    if let (Some(kick), Some(player)) = (args.kick, screen.player().map(|p| p.body())) {
        screen
            .physics_mut()
            .set_linear_velocity(player, Vec2::new(kick, 0.0));
    }

    let frame_time = frame_time(args.frame_ms)?;
    for frame in 0..args.frames {
        if frame > 0 {
            clock.advance(frame_time);
        }
        log.clear();
        screen.render(
            frame_time.as_secs_f32(),
            &mut FrameContext {
                surface: &mut surface,
                batch: &mut batch,
            },
        )?;
        if frame % 60 == 0 {
            tracing::debug!(frame, steps = screen.steps_taken(), "progress");
        }
    }

    println!("Frames: {}", args.frames);
    println!("Steps: {}", screen.steps_taken());
    if let Some(player) = screen.player() {
        let p = player.position();
        println!("Player: ({:.3}, {:.3}) m", p.x, p.y);
    }
    let c = screen.camera().position();
    println!("Camera: ({:.1}, {:.1}) px", c.x, c.y);
    if args.dump_frame {
        println!("Last frame:");
        print!("{}", log.to_text());
    }

    screen.dispose()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(argv: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Run(args) => args,
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn frame_time_rejects_out_of_range() {
        assert_eq!(frame_time(20.0).unwrap(), Duration::from_millis(20));
        assert!(frame_time(1e300).is_err());
        assert!(frame_time(f64::INFINITY).is_err());
        assert!(frame_time(f64::NAN).is_err());
        assert!(frame_time(-5.0).is_err());
    }

    #[test]
    fn follow_lerp_uses_rate() {
        let args = run_args(&["playfield-cli", "run", "--follow", "lerp", "--lerp-rate", "3.5"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.camera.mode, FollowMode::Lerp { rate: 3.5 });
    }

    #[test]
    fn negative_lerp_rate_rejected() {
        let args = run_args(&["playfield-cli", "run", "--follow", "lerp", "--lerp-rate=-1"]);
        assert!(load_config(&args).is_err());
    }
}

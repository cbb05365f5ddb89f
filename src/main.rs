use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use particle_field::{render_headless, run_window, FieldConfig, HeadlessOptions, Preset, RunError};

#[derive(Parser)]
#[command(name = "particle-field", version, about = "Ambient particle-field animation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Animate the field in a window until it is closed.
    Window {
        #[command(flatten)]
        field: FieldArgs,
        /// Seed for particle placement; random when omitted.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Render frames offscreen and write the last one as PNG.
    Render {
        #[command(flatten)]
        field: FieldArgs,
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 720)]
        height: u32,
        #[arg(long, default_value_t = 300)]
        frames: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Frame before which the viewport is resized (needs --resize-to).
        #[arg(long, requires = "resize_to")]
        resize_at: Option<u64>,
        /// New viewport size as WIDTHxHEIGHT.
        #[arg(long, value_parser = parse_size, requires = "resize_at")]
        resize_to: Option<(u32, u32)>,
        #[arg(long, short, default_value = "particle-field.png")]
        out: PathBuf,
    },
}

#[derive(Args)]
struct FieldArgs {
    /// Built-in tuning: dense, balanced or sparse.
    #[arg(long, default_value_t = Preset::Dense)]
    preset: Preset,
    /// JSON config file; overrides --preset.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl FieldArgs {
    fn resolve(&self) -> Result<FieldConfig, RunError> {
        match &self.config {
            Some(path) => Ok(FieldConfig::load(path)?),
            None => Ok(FieldConfig::from(self.preset)),
        }
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok((w, h))
}

fn run(cli: Cli) -> Result<(), RunError> {
    match cli.command {
        Command::Window { field, seed } => run_window(field.resolve()?, seed),
        Command::Render {
            field,
            width,
            height,
            frames,
            seed,
            resize_at,
            resize_to,
            out,
        } => {
            let options = HeadlessOptions {
                width,
                height,
                frames,
                seed,
                config: field.resolve()?,
                resize: resize_at.zip(resize_to).map(|(at, (w, h))| (at, w, h)),
            };
            let run = render_headless(&options)?;
            run.canvas.save_png(&out)?;

            if let Some(stats) = run.last {
                log::info!(
                    "rendered {} frames: {} particles, {} connections in the last frame",
                    stats.frame,
                    stats.particles,
                    stats.connections
                );
            }
            log::info!("wrote {}", out.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

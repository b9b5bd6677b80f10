#![deny(unsafe_code)]
//! CLI binary for the strata layered renderer.
//!
//! Subcommands:
//! - `render <scene.json>`: build the scene's layer stack and write a PNG
//! - `list`: print available layer kinds, gradients and blend methods
//! - `params <kind>`: print a layer kind's parameter vocabulary as JSON

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use std::path::{Path, PathBuf};
use std::process;
use strata_core::{BlendMethod, Gradient, Layer, Scene, Time};
use strata_layers::scene::build_canvas;
use strata_layers::LayerKind;
use tracing::{debug, info, trace};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "strata", about = "Layered 2D renderer CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a scene description to a PNG.
    Render {
        /// Scene file (JSON).
        scene: PathBuf,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Evaluation time in seconds, overriding the scene's.
        #[arg(short, long)]
        time: Option<f64>,

        /// Render quality (0 best, 8 and above draft), overriding the scene's.
        #[arg(short, long)]
        quality: Option<i32>,
    },
    /// List available layer kinds, gradients and blend methods.
    List,
    /// Print the parameter vocabulary of a layer kind.
    Params {
        /// Layer kind name (e.g. "warp").
        kind: String,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_scene(path: &Path) -> Result<Scene, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::SceneRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::SceneParse {
        path: path.to_path_buf(),
        source,
    })
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let layers = LayerKind::list_layers();
            let gradients = Gradient::list_names();
            let methods = BlendMethod::NAMES;
            if cli.json {
                let info = serde_json::json!({
                    "layers": layers,
                    "gradients": gradients,
                    "blend_methods": methods,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Layers:");
                for name in layers {
                    println!("  {name}");
                }
                println!("Gradients:");
                println!("  {}", gradients.join(", "));
                println!("Blend methods:");
                println!("  {}", methods.join(", "));
            }
        }
        Command::Params { kind } => {
            let layer = LayerKind::from_name(&kind)?;
            let params = layer
                .param_vocab()
                .into_iter()
                .map(|desc| {
                    let default = layer.get_param(desc.name)?.to_json();
                    let mut entry = serde_json::to_value(desc)?;
                    entry["default"] = default;
                    Ok(entry)
                })
                .collect::<Result<Vec<_>, CliError>>()?;
            let info = serde_json::json!({"kind": kind, "params": params});
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Render {
            scene,
            output,
            time,
            quality,
        } => {
            let mut desc = load_scene(&scene)?;
            if let Some(t) = time {
                if !t.is_finite() {
                    return Err(CliError::Flag {
                        flag: "time",
                        value: t.to_string(),
                    });
                }
                desc.time = Time::from_seconds(t);
            }
            if let Some(q) = quality {
                desc.quality = q;
            }

            let canvas = build_canvas(&desc)?;
            info!(
                width = desc.width,
                height = desc.height,
                layers = canvas.layer_count(),
                "scene loaded"
            );
            let mut progress = |done: u64, total: u64| {
                trace!(done, total, "render progress");
                true
            };
            let surface = canvas.render(desc.time, desc.quality, &mut progress)?;
            strata_layers::snapshot::write_png(&surface, &output)
                .map_err(|e| CliError::output(&output, e))?;
            debug!(output = %output.display(), "png written");

            if cli.json {
                let info = serde_json::json!({
                    "scene": scene.display().to_string(),
                    "width": desc.width,
                    "height": desc.height,
                    "layers": canvas.layer_count(),
                    "time": desc.time.seconds(),
                    "quality": desc.quality,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({}x{}, {} layers, t={}) -> {}",
                    scene.display(),
                    desc.width,
                    desc.height,
                    canvas.layer_count(),
                    desc.time,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

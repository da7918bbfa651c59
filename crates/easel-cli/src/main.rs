use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use easel_core::EngineConfig;
use easel_scene::PropertyValue;
use easel_script::{Compiler, ScriptMode};
use easel_session::Session;

#[derive(Parser)]
#[command(
    name = "easel",
    version,
    about = "Easel — assemble Manim scenes and render them",
    long_about = "Easel assembles mathematical-animation scenes from simple object \
descriptions, compiles them into Manim scripts, and drives Manim to produce \
still previews or videos."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the compiled Manim script for a scene file
    Script {
        /// Path to the scene JSON file
        #[arg()]
        file: PathBuf,

        /// Script form: preview (static) or render (animated)
        #[arg(long, default_value = "render")]
        mode: String,
    },

    /// Render a still preview image of a scene file
    Preview {
        /// Path to the scene JSON file
        #[arg()]
        file: PathBuf,

        /// Directory to write media output under
        #[arg(short, long)]
        media_dir: Option<PathBuf>,
    },

    /// Render a scene file to video
    Render {
        /// Path to the scene JSON file
        #[arg()]
        file: PathBuf,

        /// Directory to write media output under
        #[arg(short, long)]
        media_dir: Option<PathBuf>,
    },

    /// Display engine availability info
    Info,
}

/// One object entry in a scene JSON file.
///
/// This little format exists so the CLI can stand in for a GUI; it feeds
/// the same session command surface a visual editor would.
#[derive(Debug, Deserialize)]
struct SceneEntry {
    #[serde(rename = "type")]
    object_type: String,
    #[serde(default)]
    properties: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    animation: Option<String>,
}

fn load_scene(session: &Session, file: &PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let entries: Vec<SceneEntry> =
        serde_json::from_str(&text).with_context(|| format!("invalid scene file {}", file.display()))?;

    for entry in entries {
        let id = session.add_object(&entry.object_type)?;
        for (name, value) in &entry.properties {
            let value = match value {
                serde_json::Value::Number(n) => PropertyValue::Number(
                    n.as_f64()
                        .with_context(|| format!("property '{}' is not a finite number", name))?,
                ),
                serde_json::Value::String(s) => PropertyValue::Text(s.clone()),
                other => bail!("property '{}' has unsupported value: {}", name, other),
            };
            session.set_property(&id, name, value)?;
        }
        if let Some(animation) = &entry.animation {
            session.set_animation(&id, animation)?;
        }
    }
    Ok(())
}

fn engine_config(media_dir: Option<PathBuf>) -> EngineConfig {
    match media_dir {
        Some(dir) => EngineConfig::default().with_media_dir(dir),
        None => EngineConfig::default(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Script { file, mode } => {
            let mode = match mode.as_str() {
                "preview" => ScriptMode::Preview,
                "render" => ScriptMode::Render,
                other => bail!("unknown mode '{}', expected preview or render", other),
            };
            let session = Session::new(EngineConfig::default())?;
            load_scene(&session, &file)?;
            let script = Compiler::compile(&session.snapshot(), mode)?;
            print!("{}", script.source);
        }

        Commands::Preview { file, media_dir } => {
            let session = Session::new(engine_config(media_dir))?;
            load_scene(&session, &file)?;
            eprintln!("Rendering preview...");
            let artifact = session.request_preview()?.wait().await?;
            println!("{}", artifact.path.display());
        }

        Commands::Render { file, media_dir } => {
            let session = Session::new(engine_config(media_dir))?;
            load_scene(&session, &file)?;
            eprintln!("Rendering video...");
            let artifact = session.request_render()?.wait().await?;
            println!("{}", artifact.path.display());
        }

        Commands::Info => {
            let config = EngineConfig::default();
            let session = Session::new(config.clone())?;
            println!("engine command: {} {}", config.program, config.module_args.join(" "));
            if session.engine_available().await {
                println!("engine: available");
            } else {
                println!(
                    "engine: not found — install Manim Community so `{} {} --version` succeeds",
                    config.program,
                    config.module_args.join(" ")
                );
            }
        }
    }

    Ok(())
}

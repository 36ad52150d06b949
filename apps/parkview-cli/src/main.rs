mod replay;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use parkview_assets::{AssetStore, CpuTextures, ModelStatus, TextureLoader};
use parkview_render::SceneCatalog;
use parkview_scene::{AppConfig, SceneTable, theme_park};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parkview-cli", about = "Headless tools for the park viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Scene table (YAML or JSON); defaults to the built-in theme park
    #[arg(short, long, global = true)]
    scene: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// List catalog entries with their placement at a point in time
    Catalog {
        /// Seconds since start
        #[arg(short, long, default_value = "0")]
        time: f32,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Check that the scene, its models and its skybox all load
    Validate {
        /// Fail if any model or texture is missing
        #[arg(long)]
        strict: bool,
    },
    /// Run a scripted flythrough twice and compare the rendered call streams
    Replay {
        /// Number of frames at 60 fps
        #[arg(short, long, default_value = "120")]
        frames: usize,
    },
    /// Print the resolved scene table as YAML
    Export,
}

struct Loaded {
    config: AppConfig,
    table: SceneTable,
    assets: AssetStore,
    catalog: SceneCatalog,
}

fn load(cli: &Cli) -> Result<Loaded> {
    let mut config = match &cli.config {
        Some(path) => {
            AppConfig::load(path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => AppConfig::default(),
    };
    if let Some(scene) = &cli.scene {
        config.scene = Some(scene.clone());
    }
    let table = match &config.scene {
        Some(path) => {
            SceneTable::load(path).with_context(|| format!("loading scene {}", path.display()))?
        }
        None => theme_park(),
    };
    let mut assets = AssetStore::new();
    for model in &table.models {
        assets.register_model(&model.key, &model.path);
    }
    let catalog = SceneCatalog::from_table(&table, |key| assets.handle_for(key))?;
    Ok(Loaded {
        config,
        table,
        assets,
        catalog,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info => {
            println!("parkview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", parkview_scene::crate_info());
            println!("assets: {}", parkview_assets::crate_info());
            println!("input: {}", parkview_input::crate_info());
            println!("render: {}", parkview_render::crate_info());
            let park = theme_park();
            println!(
                "built-in scene: {} models, {} objects",
                park.models.len(),
                park.objects.len()
            );
        }
        Commands::Catalog { time, json } => {
            let loaded = load(&cli)?;
            let entries: Vec<_> = loaded
                .catalog
                .iter()
                .zip(&loaded.table.objects)
                .map(|(object, spec)| {
                    let matrix = object.model_matrix(*time);
                    serde_json::json!({
                        "name": object.name,
                        "model": spec.model,
                        "handle": format!("{:016x}", object.model.0),
                        "ready": loaded.assets.is_ready(object.model),
                        "animated": object.animation.is_some(),
                        "origin": matrix.w_axis.truncate().to_array(),
                        "matrix": matrix.to_cols_array(),
                    })
                })
                .collect();
            if *json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("{} entries at t={time}s", loaded.catalog.len());
                for (i, object) in loaded.catalog.iter().enumerate() {
                    let origin = object.model_matrix(*time).w_axis;
                    println!(
                        "{i:>3}  {:<26} {:>9.2} {:>9.2} {:>9.2}{}",
                        object.name,
                        origin.x,
                        origin.y,
                        origin.z,
                        if object.animation.is_some() { "  (animated)" } else { "" }
                    );
                }
            }
        }
        Commands::Validate { strict } => {
            let loaded = load(&cli)?;
            println!(
                "scene: {} models, {} objects",
                loaded.table.models.len(),
                loaded.catalog.len()
            );
            for key in loaded.table.unused_models() {
                println!("  unused model '{key}'");
            }

            let mut problems = 0;
            for model in &loaded.table.models {
                let status = loaded
                    .assets
                    .handle_for(&model.key)
                    .and_then(|h| loaded.assets.get(h))
                    .map(|entry| entry.status.clone());
                if let Some(ModelStatus::Failed(reason)) = status {
                    println!("  model '{}' unavailable: {reason}", model.key);
                    problems += 1;
                }
            }

            let mut textures = CpuTextures::new();
            match textures.load_cubemap(&loaded.table.skybox.faces) {
                Ok(handle) => {
                    let size = textures.cubemap(handle).map(|c| c.face_size).unwrap_or(0);
                    println!("  skybox: ok, {size}px faces");
                }
                Err(e) => {
                    println!("  skybox unavailable: {e}");
                    problems += 1;
                }
            }

            println!("Validation: {problems} problem(s)");
            if *strict && problems > 0 {
                bail!("{problems} asset(s) failed to load");
            }
        }
        Commands::Replay { frames } => {
            let loaded = load(&cli)?;
            let script = replay::demo_script(*frames);
            // Any non-empty handle works; the recorder never samples it.
            let cubemap = parkview_common::TextureHandle(1);

            let first = replay::run(&loaded.config, &loaded.catalog, &loaded.assets, cubemap, &script);
            let second = replay::run(&loaded.config, &loaded.catalog, &loaded.assets, cubemap, &script);

            println!(
                "Replay: frames={}, draws={}, digest={}",
                first.frames, first.draws, first.digest
            );
            println!(
                "Camera: pos=({:.3}, {:.3}, {:.3}) yaw={:.2} pitch={:.2} fov={:.2}",
                first.position.x,
                first.position.y,
                first.position.z,
                first.yaw_degrees,
                first.pitch_degrees,
                first.fov_degrees
            );
            println!(
                "Match: {}",
                if first == second { "OK" } else { "MISMATCH" }
            );
            if first != second {
                bail!("replay digests differ: {} vs {}", first.digest, second.digest);
            }
        }
        Commands::Export => {
            let loaded = load(&cli)?;
            print!("{}", loaded.table.to_yaml_string()?);
        }
    }

    Ok(())
}

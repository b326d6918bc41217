use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use glam::{Vec2, Vec3};
use playground_assets::{GltfSource, ManifestSource, ProceduralCharacter};
use playground_common::{BackendKind, ObjectOptions, PlaygroundConfig};
use tracing_subscriber::EnvFilter;

mod scenario;
mod stage;

use scenario::{Rain, RainShape};
use stage::Stage;

const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Parser)]
#[command(name = "playground-cli", about = "Headless physics playground")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Physics backend, overriding the configuration
    #[arg(long)]
    backend: Option<BackendKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Drop a box onto the ground plane and report its height
    Drop {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "240")]
        frames: u32,
        /// Print the final poses as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop objects one after another at random spots while the simulation runs
    Rain {
        /// Number of objects
        #[arg(short, long, default_value = "50")]
        count: u32,
        /// Shape of every object
        #[arg(long, value_enum, default_value = "box")]
        shape: RainShape,
        /// Frames between two spawns
        #[arg(long, default_value = "60")]
        interval: u32,
        /// Seed for the spawn points
        #[arg(long, default_value = "0")]
        seed: u64,
        /// Frames to run after the last spawn
        #[arg(long, default_value = "300")]
        settle: u32,
        /// Print the final poses as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drive the character through a scripted keyboard session
    Walk {
        /// Character manifest (.json) or glTF file (.gltf); defaults to the built-in rig
        #[arg(long)]
        asset: Option<PathBuf>,
        /// Print the rendered scene at the end
        #[arg(long)]
        render: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => PlaygroundConfig::load(path)?,
        None => PlaygroundConfig::default(),
    };
    if let Some(backend) = cli.backend {
        config.physics.backend = backend;
    }

    match cli.command {
        Commands::Info => {
            println!("playground-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("physics: {}", playground_physics::crate_info());
            println!("scene: {}", playground_scene::crate_info());
            println!("kernel: {}", playground_kernel::crate_info());
            println!("input: {}", playground_input::crate_info());
            println!("assets: {}", playground_assets::crate_info());
            println!("character: {}", playground_character::crate_info());
            println!("render: {}", playground_render::crate_info());
            println!("backend: {:?}", config.physics.backend);
        }
        Commands::Drop { frames, json } => run_drop(config, frames, json)?,
        Commands::Rain {
            count,
            shape,
            interval,
            seed,
            settle,
            json,
        } => {
            let rain = Rain {
                shape,
                count,
                interval,
                seed,
            };
            run_rain(config, &rain, settle, json)?
        }
        Commands::Walk { asset, render } => run_walk(config, asset, render)?,
    }

    Ok(())
}

fn run_drop(config: PlaygroundConfig, frames: u32, json: bool) -> Result<()> {
    let mut stage = pollster::block_on(Stage::new(config))?;
    stage.add_ground()?;
    let cube = stage.add_cuboid(
        "box",
        ObjectOptions::at(Vec3::new(1.0, 10.0, -3.0))
            .with_size(Vec3::ONE)
            .with_mass(1.0),
        0xff0000,
    )?;

    for n in 1..=frames {
        stage.frame(FRAME_DT);
        if !json && n % 10 == 0 {
            println!("frame {n:>4}: box y = {:.4}", stage.body_position(cube)?.y);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&stage.poses())?);
    }
    stage.teardown();
    Ok(())
}

fn run_rain(config: PlaygroundConfig, rain: &Rain, settle: u32, json: bool) -> Result<()> {
    let mut stage = pollster::block_on(Stage::new(config))?;
    stage.add_ground()?;
    let spawned = rain.run(&mut stage, settle, FRAME_DT)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stage.poses())?);
    } else {
        for pose in stage.poses().iter().filter(|p| p.name != "plane") {
            let p = pose.position;
            println!("{:>10}: ({:.2}, {:.2}, {:.2})", pose.name, p.x, p.y, p.z);
        }
        println!("{} objects", spawned.len());
    }
    stage.teardown();
    Ok(())
}

/// Joystick gesture, relative to where the drag started.
#[derive(Clone, Copy)]
enum Stick {
    Drag(f32, f32),
    Jump,
    Release,
}

/// One scripted input step: key changes or a joystick gesture, then a
/// number of frames.
struct Step {
    down: &'static [&'static str],
    up: &'static [&'static str],
    stick: Option<Stick>,
    frames: u32,
}

const fn keys(down: &'static [&'static str], up: &'static [&'static str], frames: u32) -> Step {
    Step { down, up, stick: None, frames }
}

const fn stick(gesture: Stick, frames: u32) -> Step {
    Step { down: &[], up: &[], stick: Some(gesture), frames }
}

const JOYSTICK_ORIGIN: Vec2 = Vec2::new(120.0, 120.0);

const WALK_SCRIPT: &[Step] = &[
    keys(&[], &[], 30),
    keys(&["w"], &[], 60),
    keys(&["a"], &[], 30),
    keys(&["Shift"], &["a"], 60),
    keys(&[" "], &[" "], 60),
    keys(&[], &["Shift", "w"], 40),
    stick(Stick::Drag(-10.0, 0.0), 40),
    stick(Stick::Drag(0.0, -40.0), 40),
    stick(Stick::Jump, 60),
    stick(Stick::Release, 40),
];

fn run_walk(config: PlaygroundConfig, asset: Option<PathBuf>, render: bool) -> Result<()> {
    let mut stage = pollster::block_on(Stage::new(config))?;
    stage.add_ground()?;
    stage.add_wall()?;

    let spawn = Vec3::new(0.0, 1.5, 0.0);
    let hero = match asset {
        Some(path) if path.extension().is_some_and(|e| e == "gltf") => {
            pollster::block_on(stage.spawn_character(&GltfSource::new(path), spawn))?
        }
        Some(path) => {
            pollster::block_on(stage.spawn_character(&ManifestSource::new(path), spawn))?
        }
        None => pollster::block_on(stage.spawn_character(&ProceduralCharacter, spawn))?,
    };

    let mut frame = 0u32;
    let mut previous = None;
    for step in WALK_SCRIPT {
        for key in step.down {
            stage.key_down(key);
        }
        for key in step.up {
            stage.key_up(key);
        }
        match step.stick {
            Some(Stick::Drag(dx, dy)) => {
                if !stage.joystick_pressed() {
                    stage.joystick_press(JOYSTICK_ORIGIN);
                }
                if let Some(reading) = stage.joystick_drag(JOYSTICK_ORIGIN + Vec2::new(dx, dy)) {
                    tracing::debug!(?reading.direction, reading.strong, "joystick");
                }
            }
            Some(Stick::Jump) => stage.joystick_jump(),
            Some(Stick::Release) => stage.joystick_release(),
            None => {}
        }
        for _ in 0..step.frames {
            frame += 1;
            let state = stage.frame(FRAME_DT);
            if state != previous {
                let p = stage.body_position(hero)?;
                match (previous, state) {
                    (Some(from), Some(to)) => println!(
                        "frame {frame:>4}: {from} -> {to} at ({:.2}, {:.2}, {:.2})",
                        p.x, p.y, p.z
                    ),
                    (None, Some(to)) => println!("frame {frame:>4}: start {to}"),
                    _ => {}
                }
                previous = state;
            }
        }
    }

    let p = stage.body_position(hero)?;
    println!("final position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
    let camera = stage.rig().camera.position;
    println!("camera: ({:.2}, {:.2}, {:.2})", camera.x, camera.y, camera.z);
    if render {
        print!("{}", stage.last_render());
    }
    stage.teardown();
    Ok(())
}

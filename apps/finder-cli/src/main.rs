use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use finder_common::TransformId;
use finder_input::Key;
use finder_kernel::{TransformSystem, WorldSpaceInfo};
use finder_render::RecordingSurface;
use finder_scene::{Engine, EngineConfig, FrameContext, HeadlessFrame, SampleScene, Scene};
use glam::Vec3;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "finder-cli", about = "Headless tools for the finder engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine config file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the active configuration summary
    Info,
    /// Run the sample scene on a recording GPU surface
    Run {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Keys held for the whole run
        #[arg(long, value_enum)]
        hold: Vec<HeldKey>,
        /// Press Escape on this frame
        #[arg(long)]
        quit_at: Option<u32>,
    },
    /// Build a transform chain and show how a root move cascades
    Hierarchy {
        /// Number of transforms in the chain
        #[arg(short, long, default_value = "4")]
        depth: u64,
        /// Position assigned to the root
        #[arg(long, num_args = 3, default_values_t = [1.0, 2.0, 3.0])]
        position: Vec<f32>,
        /// Symmetric world bound
        #[arg(long, default_value = "100")]
        bound: f32,
    },
    /// Print the effective configuration as YAML
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum HeldKey {
    W,
    A,
    S,
    D,
    Space,
    Shift,
    Ctrl,
}

impl From<HeldKey> for Key {
    fn from(key: HeldKey) -> Self {
        match key {
            HeldKey::W => Key::W,
            HeldKey::A => Key::A,
            HeldKey::S => Key::S,
            HeldKey::D => Key::D,
            HeldKey::Space => Key::Space,
            HeldKey::Shift => Key::LeftShift,
            HeldKey::Ctrl => Key::LeftControl,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("finder-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "window: {} {}x{}",
                config.window.title, config.window.width, config.window.height
            );
            println!("world bound: {}", config.world_bound);
            println!("fov: {}", config.fov);
            println!("texture: {}", config.assets.texture.display());
            println!(
                "shaders: {} / {}",
                config.assets.vertex_shader.display(),
                config.assets.fragment_shader.display()
            );
        }
        Commands::Run {
            frames,
            dt,
            hold,
            quit_at,
        } => run_sample(&config, frames, dt, &hold, quit_at)?,
        Commands::Hierarchy {
            depth,
            position,
            bound,
        } => {
            let position = Vec3::from_slice(&position);
            hierarchy_demo(depth, position, bound)?;
        }
        Commands::Config => print!("{}", config.to_yaml()?),
    }

    Ok(())
}

fn run_sample(
    config: &EngineConfig,
    frames: u32,
    dt: f32,
    hold: &[HeldKey],
    quit_at: Option<u32>,
) -> anyhow::Result<()> {
    let scene = Scene::new(
        "sample",
        config.world_space(),
        config.camera(),
        SampleScene::new(config.material()),
    )?;
    let mut engine = Engine::new(RecordingSurface::new());
    engine.add_scene(scene)?;

    let mut ctx = HeadlessFrame::new(config.window.width, config.window.height, dt);
    for key in hold {
        ctx.input.press((*key).into());
    }

    let mut drawn = 0;
    let mut ran = 0;
    for frame in 0..frames {
        if quit_at == Some(frame) {
            ctx.input.press(Key::Escape);
        }
        let stats = engine.frame(&mut ctx)?;
        drawn += stats.drawn;
        ran += 1;
        ctx.end_frame();
        if ctx.exit_requested() {
            tracing::info!(frame, "exit requested");
            break;
        }
    }

    let gpu = engine.gpu();
    println!("frames: {ran}, draws: {drawn}");
    println!(
        "live resources: buffers={} textures={} programs={}",
        gpu.live_buffers(),
        gpu.live_textures(),
        gpu.live_programs()
    );

    engine.shutdown();
    let gpu = engine.gpu();
    println!(
        "after shutdown: buffers={} textures={} programs={}",
        gpu.live_buffers(),
        gpu.live_textures(),
        gpu.live_programs()
    );
    Ok(())
}

fn hierarchy_demo(depth: u64, position: Vec3, bound: f32) -> anyhow::Result<()> {
    let mut transforms = TransformSystem::new(Some(WorldSpaceInfo::new(Vec3::splat(bound))));
    let ids: Vec<TransformId> = (1..=depth.max(1)).map(TransformId).collect();
    for (i, id) in ids.iter().enumerate() {
        transforms.create_transform(
            Vec3::ONE,
            Vec3::ZERO,
            Vec3::new(0.0, i as f32, 0.0),
            *id,
        )?;
    }
    for pair in ids.windows(2) {
        transforms.attach_child(pair[0], pair[1])?;
    }

    println!("before:");
    for id in &ids {
        println!("  {id}: {}", transforms.position(*id)?);
    }

    match transforms.set_position(ids[0], position) {
        Ok(()) => println!("set {} position to {position}", ids[0]),
        Err(e) => println!("rejected: {e}"),
    }

    println!("after:");
    for id in &ids {
        println!("  {id}: {}", transforms.position(*id)?);
    }
    Ok(())
}

mod camera;
mod config;
mod sink;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use strata_fluid::FluidSolver;
use strata_lighting::{LightSink, Lighting};
use strata_runtime::Simulation;
use strata_world::{ChunkGrid, NoiseGenerator, PresentationSink};

use crate::camera::PanningCamera;
use crate::config::{AppConfig, parse_view};
use crate::sink::{CountingSink, LatestField};

#[derive(Parser, Debug)]
#[command(version, about = "Headless driver for the strata tile simulation", long_about = None)]
struct Args {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Frames to run before shutting down
    #[arg(long, default_value_t = 600)]
    frames: u32,
    /// Target frame time in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Camera pan speed in world units per second
    #[arg(long, default_value_t = 64.0)]
    pan_speed: f32,
    /// View size in world units, WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720")]
    view: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    cfg.validate()?;
    let view_size = parse_view(&args.view)?;
    let registry = Arc::new(cfg.registry()?);
    log::info!(
        "loaded {} block types, {} layers, chunk {}x{}",
        registry.len(),
        cfg.grid.layer_count(),
        cfg.grid.chunk_width,
        cfg.grid.chunk_height
    );

    let generator = Arc::new(NoiseGenerator::new(cfg.worldgen.clone()));
    let presentation = Arc::new(CountingSink::default());
    let grid = Arc::new(
        ChunkGrid::new(&cfg.grid, generator)?
            .with_sink(Arc::clone(&presentation) as Arc<dyn PresentationSink>),
    );

    let fluid = if cfg.runtime.fluid {
        Some(FluidSolver::new(Arc::clone(&grid), cfg.fluid.clone())?)
    } else {
        None
    };
    let lighting = if cfg.runtime.lighting {
        Some(Lighting::new(
            Arc::clone(&grid),
            Arc::clone(&registry),
            cfg.lighting.clone(),
        )?)
    } else {
        None
    };
    let light_out = Arc::new(LatestField::default());
    let sim = Simulation::start(
        Arc::clone(&grid),
        fluid,
        lighting,
        Some(Arc::clone(&light_out) as Arc<dyn LightSink>),
    );

    // Start with the surface row in the middle of the view.
    let surface_y = cfg.worldgen.surface_row as f32 * cfg.grid.block_size[1];
    let mut camera = PanningCamera::new(
        [0.0, surface_y - view_size[1] * 0.5],
        view_size,
        args.pan_speed,
    );
    let frame_time = Duration::from_millis(args.frame_ms);
    let mut stall_reported = false;
    let mut last = Instant::now();

    for frame in 0..args.frames {
        let t0 = Instant::now();
        camera.update(t0.duration_since(last).as_secs_f32());
        last = t0;

        let diff = sim.frame(&camera);
        if !diff.is_empty() {
            log::debug!(
                "frame {frame}: {} chunks entered, {} left",
                diff.entered.len(),
                diff.left.len()
            );
        }

        let status = sim.status();
        if status.any_stalled() && !stall_reported {
            log::warn!("background loop stalled: {:?}", status);
            stall_reported = true;
        }

        if frame % cfg.runtime.stats_every == 0 {
            let reports = sim.drain_fluid_reports();
            let active: usize = reports.iter().map(|r| r.stats.active).sum();
            let liquid = reports.last().map_or(0.0, |r| r.stats.total_liquid);
            let (generated, updated, cleared) = presentation.snapshot();
            let brightest = light_out.latest().map_or(0.0, |f| f.max_value());
            log::info!(
                "frame {frame}: chunks={} generated={generated} updated={updated} \
                 cleared={cleared} fluid_ticks={} active_cells={active} liquid={liquid:.2}",
                grid.chunk_count(),
                sim.fluid_ticks(),
            );
            log::info!(
                "frame {frame}: light_fields={} brightest={brightest:.2}",
                light_out.received()
            );
        }

        thread::sleep(frame_time.saturating_sub(t0.elapsed()));
    }

    sim.shutdown();
    log::info!(
        "done: {} chunks resident, revision {}",
        grid.chunk_count(),
        grid.revision()
    );
    Ok(())
}

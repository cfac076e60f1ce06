//! Runs a show without a window and dumps every `FRAME_EVERY`-th frame as a PNG.
//!
//! Usage: `engine-headless-frames [scene.ron] [ticks]`
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;
use stamp_field::prelude::*;
use stamp_field_examples::{
    build_show, init_tracing, load_scene, save_raster_png, CounterFileDensity, SceneConfig,
};
use tracing::info;

const DEFAULT_TICKS: u64 = 3000;
const FRAME_EVERY: u64 = 100;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let scene = match args.next() {
        Some(path) => load_scene(path)?,
        None => SceneConfig::default(),
    };
    let ticks = match args.next() {
        Some(n) => n.parse()?,
        None => DEFAULT_TICKS,
    };

    let (registry, spec) = build_show(&scene)?;
    let graph = PatternGraph::compile(&spec, &registry, scene.engine.size)?;
    let seed = match scene.seed {
        Some(seed) => seed,
        None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs(),
    };
    info!("Seed {}.", seed);
    let rng = StdRng::seed_from_u64(seed);

    let mut engine = match &scene.counter_file {
        Some(path) => Engine::new(
            scene.engine.clone(),
            graph,
            CounterFileDensity::new(path),
            rng,
        )?,
        None => Engine::new(
            scene.engine.clone(),
            graph,
            ConstantDensity(scene.density),
            rng,
        )?,
    };

    let mut sink = FnSink::new(|event| {
        if let EngineEvent::PatternChanged { change, name } = event {
            info!("Tick {}: now showing '{}' ({:?}).", change.tick, name, change.reason);
        }
    });

    for tick in 0..ticks {
        match engine.tick_with_events(&mut sink) {
            TickOutcome::Stopped => break,
            TickOutcome::Paused => continue,
            TickOutcome::Rendered { .. } => {}
        }
        if tick % FRAME_EVERY == 0 {
            let out = format!("engine-headless-frames/frame-{tick:06}.png");
            save_raster_png(engine.raster(), &out)?;
            info!(
                "Wrote {} ({}).",
                out,
                engine.overlay_text().unwrap_or_default()
            );
        }
    }

    Ok(())
}

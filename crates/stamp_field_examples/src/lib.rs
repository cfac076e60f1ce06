#![forbid(unsafe_code)]

mod density;
mod output;
mod scene;

pub use density::CounterFileDensity;
pub use output::{save_hue_field_png, save_raster_png, save_spread_field_png};
pub use scene::{build_show, load_scene, ImportedSpread, SceneConfig};

/// Install a `tracing` fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

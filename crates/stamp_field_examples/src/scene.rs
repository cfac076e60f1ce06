use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use stamp_field::prelude::*;
use tracing::info;

/// Spread field loaded from a record file and used by one rainbow chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedSpread {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub layout: ImportLayout,
}

/// A show: engine settings plus the patterns to cycle through.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub engine: EngineConfig,
    /// RNG seed; the current time when absent.
    pub seed: Option<u64>,
    /// Raw density used when no counter file is given.
    pub density: u16,
    /// File an external counter writes the density into.
    pub counter_file: Option<PathBuf>,
    pub base_spread: f64,
    pub flag_spread: f64,
    pub flag_duration_ticks: u32,
    pub flag_transition_ticks: u32,
    pub chain_duration_ticks: u32,
    /// Spread fields for the rainbow chains. A generated ramp is used when empty.
    pub imported: Vec<ImportedSpread>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            seed: None,
            density: 40,
            counter_file: None,
            base_spread: 10_000.0,
            flag_spread: 5.0,
            flag_duration_ticks: 1000,
            flag_transition_ticks: 100,
            chain_duration_ticks: 1000 / 3,
            imported: Vec::new(),
        }
    }
}

/// Read a RON scene file.
pub fn load_scene(path: impl AsRef<Path>) -> anyhow::Result<SceneConfig> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).with_context(|| format!("reading '{}'", path.display()))?;
    let scene: SceneConfig =
        ron::from_str(&text).with_context(|| format!("parsing '{}'", path.display()))?;
    scene.engine.validate()?;
    Ok(scene)
}

const FLAGS: [(&str, &[(u16, u16, u16)]); 5] = [
    ("pride", presets::palettes::PRIDE),
    ("progress", presets::palettes::PROGRESS),
    ("bisexual", presets::palettes::BISEXUAL),
    ("transgender", presets::palettes::TRANSGENDER),
    ("asexual", presets::palettes::ASEXUAL),
];

const RAINBOWS: [(&str, f64); 3] = [("rainbow_1", 0.0), ("rainbow_2", 50.0), ("rainbow_3", 100.0)];

/// Build the field registry and pattern graph for a scene.
///
/// The first pattern is a white-noise rainbow that also serves as the base. Each flag is a
/// standalone pattern, and every spread field gets a three-step rainbow chain.
pub fn build_show(scene: &SceneConfig) -> anyhow::Result<(FieldRegistry, PatternGraphSpec)> {
    let size = scene.engine.size;
    let mut registry = FieldRegistry::new();

    for (name, offset) in RAINBOWS {
        registry.register_hue(name, presets::rainbow(size, offset));
    }
    for (name, palette) in FLAGS {
        registry.register_hue(name, presets::flag(size, palette));
    }
    registry.register_spread("white_noise", presets::uniform_spread(size, scene.base_spread));
    registry.register_spread("flag", presets::uniform_spread(size, scene.flag_spread));

    let mut chain_spreads = Vec::new();
    for import in &scene.imported {
        let field = load_field_file(&import.path, size, import.layout, ImportDefaults::default())
            .with_context(|| format!("importing spread '{}'", import.name))?;
        if !field.is_complete() {
            info!(
                "Spread '{}' covers {} of {} records.",
                import.name, field.records_read, field.records_expected
            );
        }
        registry.register_spread(import.name.clone(), field.spread);
        chain_spreads.push(import.name.clone());
    }
    if chain_spreads.is_empty() {
        registry.register_spread("ramp", presets::spread_ramp(size, 10.0));
        chain_spreads.push("ramp".to_string());
    }

    let mut spec = PatternGraphSpec::new()
        .with_pattern(PatternSpec::new("white_noise", "rainbow_1", "white_noise"))
        .with_base("white_noise");
    for (name, _) in FLAGS {
        spec.add(
            PatternSpec::new(format!("{name}_flag"), name, "flag")
                .with_duration(scene.flag_duration_ticks)
                .with_transition(scene.flag_transition_ticks),
        );
    }
    let hues: Vec<&str> = RAINBOWS.iter().map(|(name, _)| *name).collect();
    for spread in &chain_spreads {
        spec.add_chain(
            &format!("{spread}_rainbow_"),
            &hues,
            spread,
            scene.chain_duration_ticks,
            0,
        );
    }

    Ok((registry, spec))
}

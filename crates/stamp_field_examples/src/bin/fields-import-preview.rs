//! Previews a field record file, or a generated one when no path is given.
//!
//! Usage: `fields-import-preview [field.bin] [raw|headered]`
use std::io::Cursor;

use stamp_field::prelude::*;
use stamp_field_examples::{init_tracing, save_hue_field_png, save_spread_field_png};
use tracing::info;

const SIZE: RasterSize = RasterSize::new(656, 416);

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let path = args.next();
    let layout = match args.next().as_deref() {
        Some("raw") => ImportLayout::Raw,
        Some("headered") | None => ImportLayout::Headered,
        Some(other) => anyhow::bail!("unknown layout '{other}' (expected raw or headered)"),
    };

    let imported = match path {
        Some(path) => load_field_file(path, SIZE, layout, ImportDefaults::default())?,
        None => {
            // Rainbow hue over a left-to-right spread ramp, encoded then decoded again.
            let hue = presets::rainbow(SIZE, 0.0);
            let spread = presets::spread_ramp(SIZE, 12.0);
            let mut bytes = Vec::new();
            encode_field_records(&mut bytes, &hue, &spread, layout)?;
            info!("Encoded {} bytes.", bytes.len());
            decode_field_records(Cursor::new(bytes), SIZE, layout, ImportDefaults::default())?
        }
    };

    info!(
        "Read {} of {} records.",
        imported.records_read, imported.records_expected
    );
    save_hue_field_png(&imported.hue, "fields-import-preview-hue.png")?;
    save_spread_field_png(&imported.spread, "fields-import-preview-spread.png")?;
    Ok(())
}

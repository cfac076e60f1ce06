//! Binary field import and export.
//!
//! The format is a stream of 6-byte records, one per pixel in row-major order:
//!
//! | bytes | content |
//! |---|---|
//! | 0..4 | spread, `u32` little-endian, capped at [`MAX_RAW_SPREAD`] |
//! | 4..6 | hue in degrees, `u16` big-endian |
//!
//! The [`ImportLayout::Headered`] variant prefixes the records with `cols` and `rows` as
//! little-endian `u16`s and stores `rows × cols` records. Data that ends early is not an
//! error: cells without a record keep the caller's [`ImportDefaults`].
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::field::{HueCell, HueField, RasterSize, SpreadField, MAX_RAW_SPREAD};

/// Size of a single pixel record in bytes.
pub const RECORD_SIZE: usize = 6;

/// How records map onto the raster.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImportLayout {
    /// Records cover the raster directly, row-major.
    Raw,
    /// A `(cols, rows)` header precedes `rows × cols` records. Records outside the raster are
    /// skipped.
    #[default]
    Headered,
}

/// Values for cells the stream does not cover.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImportDefaults {
    pub spread: f64,
    pub hue: HueCell,
}

impl Default for ImportDefaults {
    fn default() -> Self {
        Self {
            spread: 5.0,
            hue: HueCell::vivid(180.0),
        }
    }
}

/// Fields decoded from a record stream.
#[derive(Clone, Debug)]
pub struct ImportedField {
    pub hue: HueField,
    pub spread: SpreadField,
    /// Number of records that were read in full.
    pub records_read: usize,
    /// Number of records the layout called for.
    pub records_expected: usize,
}

impl ImportedField {
    pub fn is_complete(&self) -> bool {
        self.records_read >= self.records_expected
    }
}

/// Decode a record stream into a hue and a spread field for a raster of `size`.
pub fn decode_field_records<R: Read>(
    mut reader: R,
    size: RasterSize,
    layout: ImportLayout,
    defaults: ImportDefaults,
) -> Result<ImportedField> {
    let mut hue = HueField::filled(size, defaults.hue);
    let mut spread = SpreadField::filled(size, defaults.spread);

    let (cols, rows) = match layout {
        ImportLayout::Raw => (size.width as usize, size.height as usize),
        ImportLayout::Headered => {
            let mut header = [0u8; 4];
            if !read_full(&mut reader, &mut header)? {
                warn!("Field stream has no header; keeping defaults.");
                return Ok(ImportedField {
                    hue,
                    spread,
                    records_read: 0,
                    records_expected: 0,
                });
            }
            let cols = u16::from_le_bytes([header[0], header[1]]) as usize;
            let rows = u16::from_le_bytes([header[2], header[3]]) as usize;
            (cols, rows)
        }
    };

    let records_expected = cols * rows;
    let mut records_read = 0;
    let mut record = [0u8; RECORD_SIZE];
    'rows: for row in 0..rows {
        for col in 0..cols {
            if !read_full(&mut reader, &mut record)? {
                break 'rows;
            }
            records_read += 1;
            if col >= size.width as usize || row >= size.height as usize {
                continue;
            }
            let (s, h) = parse_record(&record);
            let idx = size.index(col as u32, row as u32);
            spread.set(idx, s);
            hue.set(idx, HueCell::vivid(h));
        }
    }

    if records_read < records_expected {
        warn!(
            "Field stream ended after {} of {} records; keeping defaults for the rest.",
            records_read, records_expected
        );
    }

    Ok(ImportedField {
        hue,
        spread,
        records_read,
        records_expected,
    })
}

/// Decode a field file from disk.
pub fn load_field_file(
    path: impl AsRef<Path>,
    size: RasterSize,
    layout: ImportLayout,
    defaults: ImportDefaults,
) -> Result<ImportedField> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let imported = decode_field_records(BufReader::new(file), size, layout, defaults)?;
    info!(
        "Loaded field '{}' ({} records).",
        path.display(),
        imported.records_read
    );
    Ok(imported)
}

/// Encode a hue and a spread field into a record stream.
///
/// Spread is rounded and capped; hue is truncated to whole degrees.
pub fn encode_field_records<W: Write>(
    writer: W,
    hue: &HueField,
    spread: &SpreadField,
    layout: ImportLayout,
) -> Result<()> {
    if hue.size() != spread.size() {
        return Err(Error::Import(format!(
            "hue field is {}x{} but spread field is {}x{}",
            hue.size().width,
            hue.size().height,
            spread.size().width,
            spread.size().height
        )));
    }
    let size = hue.size();
    let mut writer = BufWriter::new(writer);

    if layout == ImportLayout::Headered {
        let cols = u16::try_from(size.width)
            .map_err(|_| Error::Import(format!("width {} exceeds header range", size.width)))?;
        let rows = u16::try_from(size.height)
            .map_err(|_| Error::Import(format!("height {} exceeds header range", size.height)))?;
        writer.write_all(&cols.to_le_bytes())?;
        writer.write_all(&rows.to_le_bytes())?;
    }

    for idx in 0..size.pixel_count() {
        let s = spread.at(idx).round().clamp(0.0, MAX_RAW_SPREAD) as u32;
        let h = hue.at(idx).hue as u16;
        writer.write_all(&s.to_le_bytes())?;
        writer.write_all(&h.to_be_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_record(record: &[u8; RECORD_SIZE]) -> (f64, f64) {
    let raw_spread = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
    let spread = (raw_spread as f64).min(MAX_RAW_SPREAD);
    let hue = u16::from_be_bytes([record[4], record[5]]) as f64;
    (spread, hue)
}

/// Fill `buf` completely. Returns `false` when the stream ends first.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(spread: u32, hue: u16) -> Vec<u8> {
        let mut out = spread.to_le_bytes().to_vec();
        out.extend_from_slice(&hue.to_be_bytes());
        out
    }

    #[test]
    fn raw_records_fill_row_major() {
        let size = RasterSize::new(2, 1);
        let mut bytes = record(12, 200);
        bytes.extend(record(7, 10));
        let imported =
            decode_field_records(&bytes[..], size, ImportLayout::Raw, ImportDefaults::default())
                .unwrap();
        assert!(imported.is_complete());
        assert_eq!(imported.spread.as_slice(), &[12.0, 7.0]);
        assert_eq!(imported.hue.get(0, 0).unwrap().hue, 200.0);
        assert_eq!(imported.hue.get(1, 0).unwrap().hue, 10.0);
    }

    #[test]
    fn hue_is_big_endian_and_spread_is_capped() {
        let size = RasterSize::new(1, 1);
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x2C];
        let imported =
            decode_field_records(&bytes[..], size, ImportLayout::Raw, ImportDefaults::default())
                .unwrap();
        assert_eq!(imported.spread.at(0), MAX_RAW_SPREAD);
        assert_eq!(imported.hue.at(0).hue, 300.0);
    }

    #[test]
    fn short_stream_keeps_defaults() {
        let size = RasterSize::new(3, 1);
        let mut bytes = record(1, 90);
        bytes.extend_from_slice(&[0x02, 0x00]);
        let defaults = ImportDefaults {
            spread: 5.0,
            hue: HueCell::new(180.0, 0.5, 0.5),
        };
        let imported = decode_field_records(&bytes[..], size, ImportLayout::Raw, defaults).unwrap();
        assert_eq!(imported.records_read, 1);
        assert!(!imported.is_complete());
        assert_eq!(imported.spread.as_slice(), &[1.0, 5.0, 5.0]);
        assert_eq!(imported.hue.at(2), defaults.hue);
    }

    #[test]
    fn header_places_records_and_skips_outside_raster() {
        let size = RasterSize::new(2, 2);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&3u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend(record(10, 1));
        bytes.extend(record(20, 2));
        bytes.extend(record(30, 3));
        let imported = decode_field_records(
            &bytes[..],
            size,
            ImportLayout::Headered,
            ImportDefaults::default(),
        )
        .unwrap();
        assert_eq!(imported.records_read, 3);
        assert_eq!(imported.spread.as_slice(), &[10.0, 20.0, 5.0, 5.0]);
    }

    #[test]
    fn missing_header_is_all_defaults() {
        let size = RasterSize::new(2, 2);
        let imported = decode_field_records(
            &[0x01][..],
            size,
            ImportLayout::Headered,
            ImportDefaults::default(),
        )
        .unwrap();
        assert_eq!(imported.records_read, 0);
        assert!(imported.spread.as_slice().iter().all(|s| *s == 5.0));
    }

    #[test]
    fn encoder_writes_header_and_records() {
        let size = RasterSize::new(2, 1);
        let hue = HueField::from_fn(size, |x, _| HueCell::vivid(100.0 + x as f64));
        let spread = SpreadField::from_fn(size, |x, _| 3.4 + x as f64);
        let mut out = Vec::new();
        encode_field_records(&mut out, &hue, &spread, ImportLayout::Headered).unwrap();

        let mut expected = vec![2, 0, 1, 0];
        expected.extend(record(3, 100));
        expected.extend(record(4, 101));
        assert_eq!(out, expected);

        let back = decode_field_records(
            &out[..],
            size,
            ImportLayout::Headered,
            ImportDefaults::default(),
        )
        .unwrap();
        assert_eq!(back.spread.as_slice(), &[3.0, 4.0]);
    }

    #[test]
    fn encoder_rejects_mismatched_sizes() {
        let hue = HueField::filled(RasterSize::new(2, 1), HueCell::vivid(0.0));
        let spread = SpreadField::filled(RasterSize::new(1, 2), 1.0);
        let err = encode_field_records(Vec::new(), &hue, &spread, ImportLayout::Raw).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }
}

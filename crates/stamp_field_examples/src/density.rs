use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use stamp_field::engine::density::DensitySource;
use tracing::warn;

/// Reads the density as a little-endian `u16` from a file on every poll.
///
/// An external people counter rewrites the file; a missing or short file reads as 0.
#[derive(Debug, Clone)]
pub struct CounterFileDensity {
    path: PathBuf,
    failing: bool,
}

impl CounterFileDensity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            failing: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        File::open(&self.path)?.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }
}

impl DensitySource for CounterFileDensity {
    fn poll(&mut self) -> u16 {
        match self.read() {
            Ok(value) => {
                self.failing = false;
                value
            }
            Err(e) => {
                // Only the first failure in a row is logged.
                if !self.failing {
                    warn!(
                        "Reading density from '{}' failed: {}; using 0.",
                        self.path.display(),
                        e
                    );
                    self.failing = true;
                }
                0
            }
        }
    }
}

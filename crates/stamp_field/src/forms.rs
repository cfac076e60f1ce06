//! Stencil catalog for drawing stamps.
//!
//! Each [`GeometricForm`] is a small boolean bitmap with an anchor cell; a stamp is drawn by
//! placing the anchor on the stamp position and painting every set cell. The catalog is built
//! once from a [`ShapeCatalog`] and indexed by the stamp's form index.
use glam::UVec2;
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sampling::rand_index;

/// Radii used by the size-varying catalogs.
pub const CATALOG_RADII: [u8; 5] = [1, 3, 5, 7, 10];

/// Radius used by the fixed-size catalogs.
pub const DEFAULT_RADIUS: u8 = 3;

/// Which stencils to build at startup.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShapeCatalog {
    /// One circle of [`DEFAULT_RADIUS`].
    Single,
    /// Triangle, square and circle of [`DEFAULT_RADIUS`].
    #[default]
    MultiGeometry,
    /// Circles at every radius in [`CATALOG_RADII`].
    MultiSize,
    /// Every geometry at every radius.
    Product,
}

/// Basic stencil geometries.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Geometry {
    Triangle,
    Square,
    Circle,
}

/// An immutable stencil with its anchor cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeometricForm {
    width: u32,
    height: u32,
    anchor: UVec2,
    cells: Vec<bool>,
}

impl GeometricForm {
    /// Build a form from explicit cells in row-major order.
    pub fn from_cells(width: u32, height: u32, anchor: UVec2, cells: Vec<bool>) -> Result<Self> {
        if cells.len() != (width as usize) * (height as usize) {
            return Err(Error::InvalidConfig(format!(
                "form cells: expected {} cells for {}x{}, got {}",
                width as usize * height as usize,
                width,
                height,
                cells.len()
            )));
        }
        if width == 0 || height == 0 || anchor.x >= width || anchor.y >= height {
            return Err(Error::InvalidConfig(format!(
                "form anchor {anchor} outside {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            anchor,
            cells,
        })
    }

    /// Build a `(2r+1)²` form by evaluating `paint(x, y)` for every cell.
    fn square_grid(radius: u8, paint: impl Fn(u32, u32) -> bool) -> Self {
        let r = radius as u32;
        let side = 2 * r + 1;
        let mut cells = Vec::with_capacity((side * side) as usize);
        for y in 0..side {
            for x in 0..side {
                cells.push(paint(x, y));
            }
        }
        Self {
            width: side,
            height: side,
            anchor: UVec2::splat(r),
            cells,
        }
    }

    /// Triangle with its apex on the anchor and its base along the bottom row.
    ///
    /// Row `y` (from `r` down to `2r`) paints columns `2r - y ..= y`.
    pub fn triangle(radius: u8) -> Self {
        let r = radius as u32;
        Self::square_grid(radius, |x, y| y >= r && x + y >= 2 * r && x <= y)
    }

    /// Fully painted square.
    pub fn square(radius: u8) -> Self {
        Self::square_grid(radius, |_, _| true)
    }

    /// Disk of cells whose Euclidean distance from the anchor is at most `radius`.
    pub fn circle(radius: u8) -> Self {
        let r = radius as f32;
        Self::square_grid(radius, |x, y| {
            let dx = x as f32 - r;
            let dy = y as f32 - r;
            (dx * dx + dy * dy).sqrt() <= r
        })
    }

    pub fn of(geometry: Geometry, radius: u8) -> Self {
        match geometry {
            Geometry::Triangle => Self::triangle(radius),
            Geometry::Square => Self::square(radius),
            Geometry::Circle => Self::circle(radius),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn anchor(&self) -> UVec2 {
        self.anchor
    }

    /// Whether the cell at `(x, y)` is painted. Out-of-range cells are not.
    pub fn is_painted(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.cells[(y * self.width + x) as usize]
    }

    /// Number of painted cells.
    pub fn painted_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// Offsets of painted cells relative to the anchor.
    pub fn painted_offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (ax, ay) = (self.anchor.x as i32, self.anchor.y as i32);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, painted)| **painted)
            .map(move |(i, _)| {
                let x = (i as u32 % self.width) as i32;
                let y = (i as u32 / self.width) as i32;
                (x - ax, y - ay)
            })
    }
}

/// The set of stencils stamps can be drawn with.
#[derive(Clone, Debug)]
pub struct FormLibrary {
    forms: Vec<GeometricForm>,
}

impl FormLibrary {
    /// Build the stencils for a catalog option.
    pub fn from_catalog(catalog: ShapeCatalog) -> Self {
        const GEOMETRIES: [Geometry; 3] = [Geometry::Triangle, Geometry::Square, Geometry::Circle];
        let forms = match catalog {
            ShapeCatalog::Single => vec![GeometricForm::circle(DEFAULT_RADIUS)],
            ShapeCatalog::MultiGeometry => GEOMETRIES
                .iter()
                .map(|g| GeometricForm::of(*g, DEFAULT_RADIUS))
                .collect(),
            ShapeCatalog::MultiSize => CATALOG_RADII
                .iter()
                .map(|r| GeometricForm::circle(*r))
                .collect(),
            ShapeCatalog::Product => GEOMETRIES
                .iter()
                .flat_map(|g| CATALOG_RADII.iter().map(move |r| GeometricForm::of(*g, *r)))
                .collect(),
        };
        Self { forms }
    }

    /// Build a library from custom stencils.
    pub fn from_forms(forms: Vec<GeometricForm>) -> Result<Self> {
        if forms.is_empty() {
            return Err(Error::InvalidConfig("form library must not be empty".into()));
        }
        if forms.len() > u16::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "form library holds at most {} forms",
                u16::MAX
            )));
        }
        Ok(Self { forms })
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<&GeometricForm> {
        self.forms.get(index as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeometricForm> {
        self.forms.iter()
    }

    /// Uniformly pick a form index.
    pub fn pick(&self, rng: &mut dyn RngCore) -> u16 {
        rand_index(rng, self.forms.len()) as u16
    }
}

impl Default for FormLibrary {
    fn default() -> Self {
        Self::from_catalog(ShapeCatalog::default())
    }
}

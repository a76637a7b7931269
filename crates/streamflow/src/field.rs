//! Discretely sampled 2D vector fields.
//!
//! A field is a `width x height` lattice of vectors. Node `(x, y)` sits at column `x` and row
//! `y`, and continuous positions share that index space. Fields are immutable once built.

use crate::config::FieldSource;
use crate::error::{FieldError, FieldResult};
use crate::synth::NoiseField;
use glam::DVec2;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scalar encoding of a raw field file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    F32,
    #[default]
    F64,
}

impl ValueType {
    pub const fn size(self) -> usize {
        match self {
            ValueType::F32 => 4,
            ValueType::F64 => 8,
        }
    }

    fn decode(self, chunk: &[u8]) -> f64 {
        match self {
            ValueType::F32 => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(chunk);
                f32::from_le_bytes(buf) as f64
            }
            ValueType::F64 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(chunk);
                f64::from_le_bytes(buf)
            }
        }
    }
}

/// How a flat little-endian file maps onto the lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFormat {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub value_type: ValueType,
    /// `true`: the file holds `height` rows of `width` columns, so node `(x, y)` is record
    /// `y * width + x`. This matches plotting with x to the right.
    /// `false`: the file is x-major, node `(x, y)` is record `x * height + y`.
    #[serde(default = "default_transpose")]
    pub transpose: bool,
}

fn default_transpose() -> bool {
    true
}

impl RawFormat {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            value_type: ValueType::F64,
            transpose: true,
        }
    }

    /// Number of bytes a file in this format must contain
    pub fn byte_len(&self) -> usize {
        self.width * self.height * 2 * self.value_type.size()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VectorField {
    width: usize,
    height: usize,
    /// Row-major, index `y * width + x`
    vectors: Vec<DVec2>,
}

impl VectorField {
    /// Build a field from row-major vectors.
    ///
    /// Fails fast when either axis has fewer than two nodes, since no cell could be
    /// interpolated, or when the vector count doesn't match the dimensions.
    pub fn new(width: usize, height: usize, vectors: Vec<DVec2>) -> FieldResult<Self> {
        if width < 2 || height < 2 {
            return Err(FieldError::InvalidDimensions { width, height });
        }
        let expected = width * height;
        if vectors.len() != expected {
            return Err(FieldError::SizeMismatch {
                expected,
                actual: vectors.len(),
            });
        }
        if let Some(i) = vectors.iter().position(|v| !v.is_finite()) {
            return Err(FieldError::NonFinite {
                x: i % width,
                y: i / width,
            });
        }

        Ok(Self {
            width,
            height,
            vectors,
        })
    }

    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> DVec2,
    ) -> FieldResult<Self> {
        let mut vectors = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                vectors.push(f(x, y));
            }
        }
        Self::new(width, height, vectors)
    }

    pub fn constant(width: usize, height: usize, vector: DVec2) -> FieldResult<Self> {
        Self::new(width, height, vec![vector; width * height])
    }

    pub fn zero(width: usize, height: usize) -> FieldResult<Self> {
        Self::constant(width, height, DVec2::ZERO)
    }

    /// Decode a flat buffer of little-endian `(u, v)` pairs
    pub fn from_le_bytes(bytes: &[u8], format: &RawFormat) -> FieldResult<Self> {
        let RawFormat { width, height, .. } = *format;
        if width < 2 || height < 2 {
            return Err(FieldError::InvalidDimensions { width, height });
        }

        let record = 2 * format.value_type.size();
        if bytes.len() != format.byte_len() {
            return Err(FieldError::SizeMismatch {
                expected: width * height,
                actual: bytes.len() / record,
            });
        }

        let records: Vec<DVec2> = bytes
            .chunks_exact(record)
            .map(|pair| {
                let (u, v) = pair.split_at(format.value_type.size());
                DVec2::new(format.value_type.decode(u), format.value_type.decode(v))
            })
            .collect();

        if format.transpose {
            Self::new(width, height, records)
        } else {
            Self::from_fn(width, height, |x, y| records[x * height + y])
        }
    }

    pub fn load_raw(path: impl AsRef<Path>, format: &RawFormat) -> FieldResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());

        let field = Self::from_le_bytes(&bytes, format)?;
        info!(
            "Loaded {}x{} vector field from {} (max speed {:.3})",
            field.width,
            field.height,
            path.display(),
            field.max_magnitude()
        );
        Ok(field)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn vectors(&self) -> &[DVec2] {
        &self.vectors
    }

    /// Vector at node `(x, y)`. Panics when the node is outside the lattice.
    pub fn get(&self, x: usize, y: usize) -> DVec2 {
        assert!(
            x < self.width && y < self.height,
            "node ({x}, {y}) outside {}x{} field",
            self.width,
            self.height
        );
        self.vectors[y * self.width + x]
    }

    /// All nodes as `(x, y, vector)`, row by row
    pub fn nodes(&self) -> impl Iterator<Item = (usize, usize, DVec2)> + '_ {
        self.vectors
            .iter()
            .enumerate()
            .map(|(i, &v)| (i % self.width, i / self.width, v))
    }

    /// Whether `p` lies in the half-open integration domain `[0, W-1) x [0, H-1)`
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < (self.width - 1) as f64 && p.y < (self.height - 1) as f64
    }

    pub fn max_magnitude(&self) -> f64 {
        self.vectors.iter().map(|v| v.length()).fold(0.0, f64::max)
    }
}

impl FieldSource {
    /// Build the configured field
    pub fn load(&self) -> FieldResult<VectorField> {
        match self {
            FieldSource::Raw { path, format } => VectorField::load_raw(path, format),
            FieldSource::Noise {
                width,
                height,
                seed,
                frequency,
                amplitude,
            } => {
                info!(
                    "Generating {}x{} noise field (seed {}, frequency {}, amplitude {})",
                    width, height, seed, frequency, amplitude
                );
                NoiseField::new(*seed, *frequency, *amplitude).to_field(*width, *height)
            }
            FieldSource::Constant {
                width,
                height,
                vector: [u, v],
            } => VectorField::constant(*width, *height, DVec2::new(*u, *v)),
        }
    }
}

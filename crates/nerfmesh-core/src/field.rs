//! Radiance-field capability and chunked evaluation.
//!
//! A [`RadianceField`] maps positionally encoded `(position, direction)` rows
//! to colour and density. [`BatchedEvaluator`] feeds it bounded chunks so that
//! peak memory is set by the chunk size rather than the lattice size.

use glam::Vec3;

use crate::error::{Error, Result};

/// Default number of points evaluated per model call.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Default number of frequency bands for positions.
pub const DEFAULT_XYZ_FREQS: u32 = 10;

/// Default number of frequency bands for viewing directions.
pub const DEFAULT_DIR_FREQS: u32 = 4;

/// Colour and density returned for one query point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FieldSample {
    pub rgb: [f32; 3],
    pub sigma: f32,
}

impl FieldSample {
    pub fn new(rgb: [f32; 3], sigma: f32) -> Self {
        Self { rgb, sigma }
    }
}

/// Sinusoidal positional encoding.
///
/// Maps `x` to `[x, sin(2^0 x), cos(2^0 x), ..., sin(2^(L-1) x), cos(2^(L-1) x)]`,
/// giving `3 + 6L` channels for a 3-vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Embedding {
    n_freqs: u32,
}

impl Embedding {
    pub fn new(n_freqs: u32) -> Self {
        Self { n_freqs }
    }

    #[must_use]
    pub fn n_freqs(&self) -> u32 {
        self.n_freqs
    }

    /// Returns the number of output channels for a 3-vector input.
    #[must_use]
    pub fn channels(&self) -> usize {
        3 + 3 * 2 * self.n_freqs as usize
    }

    /// Appends the encoding of `v` to `out`.
    #[allow(clippy::cast_possible_wrap)]
    pub fn encode_into(&self, v: Vec3, out: &mut Vec<f32>) {
        out.extend_from_slice(&v.to_array());
        for band in 0..self.n_freqs {
            let scaled = v * 2.0_f32.powi(band as i32);
            out.extend(scaled.to_array().iter().map(|c| c.sin()));
            out.extend(scaled.to_array().iter().map(|c| c.cos()));
        }
    }

    /// Returns the encoding of `v`.
    #[must_use]
    pub fn encode(&self, v: Vec3) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.channels());
        self.encode_into(v, &mut out);
        out
    }
}

/// A chunk of encoded query rows: `[xyz encoding | direction encoding]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBatch {
    data: Vec<f32>,
    xyz_channels: usize,
    dir_channels: usize,
    rows: usize,
}

impl EncodedBatch {
    /// Encodes matching slices of positions and directions.
    ///
    /// # Panics
    /// Panics if `points` and `dirs` differ in length.
    pub fn encode(points: &[Vec3], dirs: &[Vec3], xyz: Embedding, dir: Embedding) -> Self {
        assert_eq!(points.len(), dirs.len(), "points and directions must pair up");
        let xyz_channels = xyz.channels();
        let dir_channels = dir.channels();
        let mut data = Vec::with_capacity(points.len() * (xyz_channels + dir_channels));
        for (&p, &d) in points.iter().zip(dirs) {
            xyz.encode_into(p, &mut data);
            dir.encode_into(d, &mut data);
        }
        Self {
            data,
            xyz_channels,
            dir_channels,
            rows: points.len(),
        }
    }

    /// Returns the number of query rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Returns the number of channels per row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.xyz_channels + self.dir_channels
    }

    #[must_use]
    pub fn xyz_channels(&self) -> usize {
        self.xyz_channels
    }

    #[must_use]
    pub fn dir_channels(&self) -> usize {
        self.dir_channels
    }

    /// Returns the flat row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns one encoded row.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f32] {
        let w = self.width();
        &self.data[index * w..(index + 1) * w]
    }

    /// Recovers the raw position of a row from its identity channels.
    #[must_use]
    pub fn position(&self, index: usize) -> Vec3 {
        Vec3::from_slice(&self.row(index)[..3])
    }

    /// Recovers the raw direction of a row from its identity channels.
    #[must_use]
    pub fn direction(&self, index: usize) -> Vec3 {
        let start = self.xyz_channels;
        Vec3::from_slice(&self.row(index)[start..start + 3])
    }
}

/// A model mapping encoded query rows to colour and density.
///
/// Implementations must return exactly one sample per row, in row order,
/// and must not carry state from one call to the next.
pub trait RadianceField {
    fn evaluate(&self, batch: &EncodedBatch) -> Result<Vec<FieldSample>>;
}

impl<T: RadianceField + ?Sized> RadianceField for Box<T> {
    fn evaluate(&self, batch: &EncodedBatch) -> Result<Vec<FieldSample>> {
        (**self).evaluate(batch)
    }
}

/// Splits a query set into bounded chunks and evaluates them in order.
#[derive(Debug, Clone, Copy)]
pub struct BatchedEvaluator {
    chunk_size: usize,
    xyz_embedding: Embedding,
    dir_embedding: Embedding,
}

impl BatchedEvaluator {
    /// Creates an evaluator with the default encodings.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::invalid_config("chunk size must be at least 1"));
        }
        Ok(Self {
            chunk_size,
            xyz_embedding: Embedding::new(DEFAULT_XYZ_FREQS),
            dir_embedding: Embedding::new(DEFAULT_DIR_FREQS),
        })
    }

    /// Replaces the position and direction encodings.
    #[must_use]
    pub fn with_embeddings(mut self, xyz: Embedding, dir: Embedding) -> Self {
        self.xyz_embedding = xyz;
        self.dir_embedding = dir;
        self
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the number of model calls needed for `count` points.
    #[must_use]
    pub fn num_chunks(&self, count: usize) -> usize {
        count.div_ceil(self.chunk_size)
    }

    /// Evaluates `model` over all points, at most `chunk_size` per call.
    ///
    /// The output has one sample per point in input order. The first failing
    /// chunk aborts the run; nothing partial is returned.
    pub fn evaluate<M: RadianceField + ?Sized>(
        &self,
        model: &M,
        points: &[Vec3],
        dirs: &[Vec3],
    ) -> Result<Vec<FieldSample>> {
        if points.len() != dirs.len() {
            return Err(Error::SizeMismatch {
                expected: points.len(),
                actual: dirs.len(),
            });
        }

        log::debug!(
            "Evaluating {} points in {} chunk(s) of up to {}",
            points.len(),
            self.num_chunks(points.len()),
            self.chunk_size
        );

        let mut samples = Vec::with_capacity(points.len());
        for (chunk, (xyz, dir)) in points
            .chunks(self.chunk_size)
            .zip(dirs.chunks(self.chunk_size))
            .enumerate()
        {
            let batch = EncodedBatch::encode(xyz, dir, self.xyz_embedding, self.dir_embedding);
            let out = model.evaluate(&batch).map_err(|e| Error::ModelFailure {
                chunk,
                message: e.to_string(),
            })?;
            if out.len() != batch.len() {
                return Err(Error::SizeMismatch {
                    expected: batch.len(),
                    actual: out.len(),
                });
            }
            log::trace!("chunk {chunk}: {} samples", out.len());
            samples.extend(out);
        }

        Ok(samples)
    }
}

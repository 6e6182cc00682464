use std::ops::{Add, Mul};

use ndarray::{s, Array1, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};

/// Weight matrices of a network, one per connection between consecutive
/// layers, stored in a single contiguous buffer.
///
/// The per-matrix views returned by [`get`](Matrices::get) and
/// [`get_mut`](Matrices::get_mut) alias the flat buffer, so writing through
/// either representation is visible through the other. The flat
/// representation is what optimizers and random initialization work on.
#[derive(Debug, Clone)]
pub struct Matrices {
    shapes: Vec<(usize, usize)>,
    offsets: Vec<usize>,
    flat: Array1<f64>,
}

impl Matrices {
    /// Zero-initialized matrices with the given `(rows, cols)` shapes.
    pub fn new(shapes: Vec<(usize, usize)>) -> Self {
        let mut offsets = Vec::with_capacity(shapes.len());
        let mut total = 0;
        for &(rows, cols) in &shapes {
            offsets.push(total);
            total += rows * cols;
        }
        Self {
            shapes,
            offsets,
            flat: Array1::zeros(total),
        }
    }

    pub fn shapes(&self) -> &[(usize, usize)] {
        &self.shapes
    }

    /// Number of matrices.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// View of the `index`-th matrix, sharing the flat buffer.
    pub fn get(&self, index: usize) -> ArrayView2<f64> {
        let (rows, cols) = self.shapes[index];
        let offset = self.offsets[index];
        self.flat
            .slice(s![offset..offset + rows * cols])
            .into_shape((rows, cols))
            .unwrap()
    }

    /// Mutable view of the `index`-th matrix, sharing the flat buffer.
    pub fn get_mut(&mut self, index: usize) -> ArrayViewMut2<f64> {
        let (rows, cols) = self.shapes[index];
        let offset = self.offsets[index];
        self.flat
            .slice_mut(s![offset..offset + rows * cols])
            .into_shape((rows, cols))
            .unwrap()
    }

    /// All entries as one long vector.
    pub fn flat(&self) -> ArrayView1<f64> {
        self.flat.view()
    }

    pub fn flat_mut(&mut self) -> ArrayViewMut1<f64> {
        self.flat.view_mut()
    }

    /// Replace every entry at once. The vector length must match exactly.
    pub fn set_flat(&mut self, values: Array1<f64>) {
        assert!(
            values.len() == self.flat.len(),
            "flat vector must have length {}, got {}",
            self.flat.len(),
            values.len()
        );
        self.flat = values;
    }
}

impl Add<&Matrices> for &Matrices {
    type Output = Matrices;

    fn add(self, other: &Matrices) -> Matrices {
        assert!(
            self.shapes == other.shapes,
            "matrices must have the same shapes"
        );
        Matrices {
            shapes: self.shapes.clone(),
            offsets: self.offsets.clone(),
            flat: &self.flat + &other.flat,
        }
    }
}

impl Mul<f64> for &Matrices {
    type Output = Matrices;

    fn mul(self, scalar: f64) -> Matrices {
        Matrices {
            shapes: self.shapes.clone(),
            offsets: self.offsets.clone(),
            flat: &self.flat * scalar,
        }
    }
}

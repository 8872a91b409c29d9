use std::ops::{Index, IndexMut};

use ndarray::{Array2, ArrayView1, ArrayView2};

/// Destination of a Jacobian: anything with a row/column count and writable
/// `(row, col)` cells.
pub trait JacobianSink {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    fn set(&mut self, row: usize, col: usize, value: f64);
}

/// Caller-allocated derivative matrix, row-major, one row per output slot.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeMatrix {
    data: Array2<f64>,
}

impl DerivativeMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get((row, col)).copied()
    }

    pub fn row(&self, row: usize) -> ArrayView1<'_, f64> {
        self.data.row(row)
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }
}

impl From<Array2<f64>> for DerivativeMatrix {
    fn from(data: Array2<f64>) -> Self {
        Self { data }
    }
}

impl Index<(usize, usize)> for DerivativeMatrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[[row, col]]
    }
}

impl IndexMut<(usize, usize)> for DerivativeMatrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[[row, col]]
    }
}

impl JacobianSink for DerivativeMatrix {
    fn rows(&self) -> usize {
        self.data.nrows()
    }

    fn cols(&self) -> usize {
        self.data.ncols()
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[[row, col]] = value;
    }
}

impl JacobianSink for Array2<f64> {
    fn rows(&self) -> usize {
        self.nrows()
    }

    fn cols(&self) -> usize {
        self.ncols()
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        self[[row, col]] = value;
    }
}

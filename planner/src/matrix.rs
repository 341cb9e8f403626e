use std::ops::{Index, IndexMut};

use serde::Serialize;

/// Fixed-size, row-major two-dimensional array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Matrix<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::default(); rows * cols],
        }
    }
}

impl<T> Matrix<T> {
    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn row(&self, r: usize) -> &[T] {
        let start = r * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [T] {
        let start = r * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Row `r` for writing together with row `r + 1` for reading.
    pub fn row_with_next(&mut self, r: usize) -> (&mut [T], &[T]) {
        let split = (r + 1) * self.cols;
        let (head, tail) = self.data.split_at_mut(split);
        (&mut head[r * self.cols..], &tail[..self.cols])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks(self.cols.max(1)).take(self.rows)
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (r, c): (usize, usize)) -> &T {
        assert!(c < self.cols, "column {c} out of bounds ({} cols)", self.cols);
        &self.data[r * self.cols + c]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut T {
        assert!(c < self.cols, "column {c} out of bounds ({} cols)", self.cols);
        &mut self.data[r * self.cols + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_layout() {
        let mut m: Matrix<usize> = Matrix::new(2, 3);
        m[(0, 2)] = 7;
        m[(1, 0)] = 9;

        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.row(0), &[0, 0, 7]);
        assert_eq!(m.row(1), &[9, 0, 0]);
        assert_eq!(m.rows().count(), 2);
    }

    #[test]
    fn row_with_next_splits_adjacent_rows() {
        let mut m: Matrix<f64> = Matrix::new(3, 2);
        m.row_mut(2).copy_from_slice(&[1.0, 2.0]);

        let (row, next) = m.row_with_next(1);
        row[0] = next[1] * 10.0;

        assert_eq!(m.row(1), &[20.0, 0.0]);
    }

    #[test]
    #[should_panic]
    fn column_overflow_panics() {
        let m: Matrix<f64> = Matrix::new(2, 2);
        let _ = m[(0, 2)];
    }
}

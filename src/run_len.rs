use std::ops::{Index, IndexMut};

/// Column-indexed storage with a variable number of entries per column.
///
/// All values live in one flat buffer; `pos[c]..pos[c + 1]` is the range
/// belonging to column `c`. The offsets are the same `col_cellpos` array
/// the [`crate::topology::ColumnTopology`] carries, so a `RunLenData` built
/// from a topology has exactly one slot per fine cell of every column.
#[derive(Clone, Debug, PartialEq)]
pub struct RunLenData<T> {
    data: Vec<T>,
    pos: Vec<usize>,
}

impl<T: Clone + Default> RunLenData<T> {
    /// Allocate default-filled storage for `num_cols` columns laid out by `pos`
    pub fn new(num_cols: usize, pos: &[usize]) -> Self {
        let pos = pos[..=num_cols].to_vec();
        let len = pos[num_cols];
        Self {
            data: vec![T::default(); len],
            pos,
        }
    }
}

impl<T> RunLenData<T> {
    pub fn num_cols(&self) -> usize {
        self.pos.len() - 1
    }

    /// Number of entries in column `col`
    pub fn size(&self, col: usize) -> usize {
        self.pos[col + 1] - self.pos[col]
    }

    pub fn col(&self, col: usize) -> &[T] {
        &self.data[self.pos[col]..self.pos[col + 1]]
    }

    pub fn col_mut(&mut self, col: usize) -> &mut [T] {
        &mut self.data[self.pos[col]..self.pos[col + 1]]
    }

    /// The whole flat buffer, columns back to back
    pub fn all(&self) -> &[T] {
        &self.data
    }
}

impl<T> Index<usize> for RunLenData<T> {
    type Output = [T];

    fn index(&self, col: usize) -> &[T] {
        self.col(col)
    }
}

impl<T> IndexMut<usize> for RunLenData<T> {
    fn index_mut(&mut self, col: usize) -> &mut [T] {
        self.col_mut(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let pos = [0, 3, 3, 5];
        let mut data: RunLenData<f64> = RunLenData::new(3, &pos);

        assert_eq!(data.num_cols(), 3);
        assert_eq!(data.size(0), 3);
        assert_eq!(data.size(1), 0);
        assert_eq!(data.size(2), 2);
        assert_eq!(data.all().len(), 5);

        data[2][1] = 7.5;
        data.col_mut(0).copy_from_slice(&[1.0, 2.0, 3.0]);

        assert_eq!(data[0], [1.0, 2.0, 3.0]);
        assert!(data[1].is_empty());
        assert_eq!(data.col(2), &[0.0, 7.5]);
        assert_eq!(data.all(), &[1.0, 2.0, 3.0, 0.0, 7.5]);
    }
}

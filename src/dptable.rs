/// A dense dynamic programming table. It is a serialized 2-d array.
/// Reading outside of the table returns `outside`, writing outside is ignored.
#[derive(Debug, Clone)]
pub struct DPTable<T> {
    // Total memory
    mem: Vec<T>,
    rows: usize,
    cols: usize,
    // The value of the cells outside of the table.
    outside: T,
}

impl<T: Copy> DPTable<T> {
    pub fn new(rows: usize, cols: usize, fill: T, outside: T) -> Self {
        Self {
            mem: vec![fill; rows * cols],
            rows,
            cols,
            outside,
        }
    }
    pub fn with_capacity(rows: usize, cols: usize, outside: T) -> Self {
        Self {
            mem: Vec::with_capacity(rows * cols),
            rows: 0,
            cols: 0,
            outside,
        }
    }
    /// Re-shape the table into `rows` x `cols` and fill every cell.
    /// The memory is reused when it is large enough.
    pub fn initialize(&mut self, rows: usize, cols: usize, fill: T) {
        let total_cells = rows * cols;
        self.mem.truncate(total_cells);
        self.mem.iter_mut().for_each(|x| *x = fill);
        if self.mem.len() < total_cells {
            let len = total_cells - self.mem.len();
            self.mem.extend(std::iter::repeat(fill).take(len));
        }
        self.rows = rows;
        self.cols = cols;
    }
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn outside(&self) -> T {
        self.outside
    }
    pub fn fill(&mut self, val: T) {
        self.mem.iter_mut().for_each(|x| *x = val);
    }
    pub fn get(&self, i: usize, j: usize) -> T {
        if i < self.rows && j < self.cols {
            self.mem[i * self.cols + j]
        } else {
            self.outside
        }
    }
    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut T> {
        if i < self.rows && j < self.cols {
            self.mem.get_mut(i * self.cols + j)
        } else {
            None
        }
    }
    pub fn set(&mut self, i: usize, j: usize, target: T) {
        if let Some(slot) = self.get_mut(i, j) {
            *slot = target;
        }
    }
    /// The i-th row. Empty if the row is out of range.
    pub fn row(&self, i: usize) -> &[T] {
        match i < self.rows {
            true => &self.mem[i * self.cols..(i + 1) * self.cols],
            false => &self.mem[0..0],
        }
    }
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        match i < self.rows {
            true => &mut self.mem[i * self.cols..(i + 1) * self.cols],
            false => &mut self.mem[0..0],
        }
    }
    /// Two distinct rows at once, `i` read-only and `k` writable.
    pub fn row_pair_mut(&mut self, i: usize, k: usize) -> (&[T], &mut [T]) {
        assert!(i != k && i < self.rows && k < self.rows);
        let cols = self.cols;
        if i < k {
            let (upper, lower) = self.mem.split_at_mut(k * cols);
            (&upper[i * cols..(i + 1) * cols], &mut lower[..cols])
        } else {
            let (upper, lower) = self.mem.split_at_mut(i * cols);
            (&lower[..cols], &mut upper[k * cols..(k + 1) * cols])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn get_set() {
        let mut table = DPTable::new(3, 4, 0u8, 9);
        table.set(1, 2, 5);
        assert_eq!(table.get(1, 2), 5);
        assert_eq!(table.get(3, 0), 9);
        assert_eq!(table.get(0, 4), 9);
        table.set(10, 10, 7);
        assert_eq!(table.row(1), &[0, 0, 5, 0]);
        assert!(table.row(3).is_empty());
    }
    #[test]
    fn initialize_reuses() {
        let mut table = DPTable::with_capacity(10, 10, -1f64);
        table.initialize(2, 3, 1f64);
        assert_eq!((table.rows(), table.cols()), (2, 3));
        assert!(table.row(1).iter().all(|&x| x == 1f64));
        table.set(1, 1, 4f64);
        table.initialize(3, 2, 0f64);
        assert!((0..3).all(|i| table.row(i).iter().all(|&x| x == 0f64)));
        assert_eq!(table.get(3, 0), -1f64);
    }
    #[test]
    fn row_pair() {
        let mut table = DPTable::new(3, 2, 0i32, 0);
        table.set(0, 1, 3);
        let (prev, curr) = table.row_pair_mut(0, 1);
        curr[1] = prev[1] + 1;
        assert_eq!(table.get(1, 1), 4);
        let (next, curr) = table.row_pair_mut(2, 1);
        curr[0] = next[0] - 1;
        assert_eq!(table.get(1, 0), -1);
    }
}

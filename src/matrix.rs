//! Matrices shared between the decoder and its caller: the backtrace matrix, holding the
//! excluded ("cell off") flags and the predecessors of the MAC algorithm, and the posterior matrix.
use crate::dptable::DPTable;
use crate::lanes::LANES;
use crate::op::Op;

const CELL_OFF: u8 = 0b1000_0000;
const PREDECESSOR_MASK: u8 = 0b0000_0011;

/// The predecessor of a cell in the MAC matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predecessor {
    /// The alignment starts at this cell.
    Stop = 0,
    /// From (i-1, j-1).
    Match = 1,
    /// From (i-1, j).
    Up = 2,
    /// From (i, j-1).
    Left = 3,
}

impl Predecessor {
    fn from_bits(bits: u8) -> Self {
        match bits & PREDECESSOR_MASK {
            0 => Predecessor::Stop,
            1 => Predecessor::Match,
            2 => Predecessor::Up,
            _ => Predecessor::Left,
        }
    }
    /// The operation of the cell reached by this predecessor.
    pub fn op(self) -> Op {
        match self {
            Predecessor::Stop | Predecessor::Match => Op::Match,
            Predecessor::Up => Op::Ins,
            Predecessor::Left => Op::Del,
        }
    }
}

/// Per-cell flags of a query/template pair, 1-based.
/// Cells outside of the matrix are always off.
/// One matrix should be used per template, and by one thread at a time.
#[derive(Debug, Clone)]
pub struct BacktraceMatrix {
    cells: DPTable<u8>,
    q_len: usize,
    t_len: usize,
}

impl BacktraceMatrix {
    pub fn new(q_len: usize, t_len: usize) -> Self {
        Self {
            cells: DPTable::new(q_len + 1, t_len + 1, 0, CELL_OFF),
            q_len,
            t_len,
        }
    }
    /// Re-shape to `q_len` x `t_len`. All cells are turned on.
    pub fn resize(&mut self, q_len: usize, t_len: usize) {
        self.cells.initialize(q_len + 1, t_len + 1, 0);
        self.q_len = q_len;
        self.t_len = t_len;
    }
    pub fn q_len(&self) -> usize {
        self.q_len
    }
    pub fn t_len(&self) -> usize {
        self.t_len
    }
    pub fn is_cell_off(&self, i: usize, j: usize) -> bool {
        if i == 0 || j == 0 {
            return true;
        }
        self.cells.get(i, j) & CELL_OFF == CELL_OFF
    }
    pub fn set_cell_off(&mut self, i: usize, j: usize, off: bool) {
        if i == 0 || j == 0 {
            return;
        }
        if let Some(cell) = self.cells.get_mut(i, j) {
            match off {
                true => *cell |= CELL_OFF,
                false => *cell &= !CELL_OFF,
            }
        }
    }
    /// Turn all the cells on.
    pub fn clear_cell_off(&mut self) {
        self.cells.fill(0);
    }
    pub fn count_cell_off(&self) -> usize {
        (1..=self.q_len)
            .map(|i| (1..=self.t_len).filter(|&j| self.is_cell_off(i, j)).count())
            .sum()
    }
    pub fn predecessor(&self, i: usize, j: usize) -> Predecessor {
        Predecessor::from_bits(self.cells.get(i, j))
    }
    pub fn set_predecessor(&mut self, i: usize, j: usize, pred: Predecessor) {
        if let Some(cell) = self.cells.get_mut(i, j) {
            *cell = (*cell & !PREDECESSOR_MASK) | pred as u8;
        }
    }
}

/// Posterior probabilities of match pairs, 1-based.
/// Each row is padded so that a full lane can be read at any column of the row.
#[derive(Debug, Clone)]
pub struct PosteriorMatrix {
    values: DPTable<f64>,
    q_len: usize,
    t_len: usize,
}

impl PosteriorMatrix {
    pub fn new(q_len: usize, t_len: usize) -> Self {
        Self {
            values: DPTable::new(q_len + 2, t_len + 2 + LANES, 0f64, 0f64),
            q_len,
            t_len,
        }
    }
    /// Re-shape to `q_len` x `t_len`, filled with zeros.
    pub fn resize(&mut self, q_len: usize, t_len: usize) {
        self.values.initialize(q_len + 2, t_len + 2 + LANES, 0f64);
        self.q_len = q_len;
        self.t_len = t_len;
    }
    pub fn q_len(&self) -> usize {
        self.q_len
    }
    pub fn t_len(&self) -> usize {
        self.t_len
    }
    pub fn clear(&mut self) {
        self.values.fill(0f64);
    }
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values.get(i, j)
    }
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values.set(i, j, value);
    }
    pub fn row(&self, i: usize) -> &[f64] {
        self.values.row(i)
    }
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        self.values.row_mut(i)
    }
}

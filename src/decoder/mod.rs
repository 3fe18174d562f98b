//! Posterior decoding of a query/template pair.
//! The decoder runs, in this order, the preparation of the exclusion mask, the forward and the backward algorithm,
//! the maximum accuracy (MAC) algorithm and its backtrace, and finally writes the result back into the hit.
//! The statistics of the hit are snapshotted at the beginning and restored at the end of each call,
//! so that only the alignment fields of the hit are changed.
//!
//! As in the other dynamic programmings of this crate, we do not take logarithm of the forward/backward values.
//! Instead, each row is scaled by the reciprocal of its total mass, and the scale factors are shared by the forward
//! and the backward algorithm.
mod backtrace;
mod backward;
mod forward;
mod mac;
mod prepare;
mod restore;

use crate::dptable::DPTable;
use crate::error::{DecodeError, Result};
use crate::hit::{Alignment, Hit, HitSnapshot};
use crate::lanes::{Lane, LaneKernel, LANES};
use crate::matrix::{BacktraceMatrix, PosteriorMatrix};
use crate::profile::{ProfileHmm, NUM_AMINO_ACIDS};
use crate::RealignConfig;
pub use forward::ForwardPass;

/// The rectangle of the cells which are not excluded. 1-based, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub i_min: usize,
    pub i_max: usize,
    pub j_min: usize,
    pub j_max: usize,
}

/// One row of the five channels.
#[derive(Debug, Clone, Default)]
struct RowBuffers {
    mm: Vec<f64>,
    gd: Vec<f64>,
    im: Vec<f64>,
    dg: Vec<f64>,
    mi: Vec<f64>,
}

impl RowBuffers {
    fn with_len(len: usize) -> Self {
        Self {
            mm: vec![0f64; len],
            gd: vec![0f64; len],
            im: vec![0f64; len],
            dg: vec![0f64; len],
            mi: vec![0f64; len],
        }
    }
    fn reset(&mut self) {
        for channel in [
            &mut self.mm,
            &mut self.gd,
            &mut self.im,
            &mut self.dg,
            &mut self.mi,
        ] {
            channel.iter_mut().for_each(|x| *x = 0f64);
        }
    }
    /// Sum of all the channels over `start..=end`.
    fn mass(&self, start: usize, end: usize) -> f64 {
        (start..=end)
            .map(|j| self.mm[j] + self.gd[j] + self.im[j] + self.dg[j] + self.mi[j])
            .sum()
    }
    fn scale(&mut self, start: usize, end: usize, factor: f64) {
        for channel in [
            &mut self.mm,
            &mut self.gd,
            &mut self.im,
            &mut self.dg,
            &mut self.mi,
        ] {
            channel[start..=end].iter_mut().for_each(|x| *x *= factor);
        }
    }
}

/// Previous and current rows. Swapped after each row.
#[derive(Debug, Clone, Default)]
struct RollingRows {
    prev: RowBuffers,
    curr: RowBuffers,
}

impl RollingRows {
    fn with_len(len: usize) -> Self {
        Self {
            prev: RowBuffers::with_len(len),
            curr: RowBuffers::with_len(len),
        }
    }
    fn reset(&mut self) {
        self.prev.reset();
        self.curr.reset();
    }
    fn swap(&mut self) {
        std::mem::swap(&mut self.prev, &mut self.curr);
    }
}

/// The template profile in structure-of-arrays layout, so that `LANES` consecutive columns can be read at once.
/// 1-based. Column 0 and the columns after the end are zeros.
#[derive(Debug, Clone)]
struct TemplateLanes {
    odds: Vec<Vec<f64>>,
    m2m: Vec<f64>,
    m2i: Vec<f64>,
    m2d: Vec<f64>,
    i2m: Vec<f64>,
    i2i: Vec<f64>,
    d2m: Vec<f64>,
    d2d: Vec<f64>,
}

impl TemplateLanes {
    fn with_len(len: usize) -> Self {
        Self {
            odds: vec![vec![0f64; len]; NUM_AMINO_ACIDS],
            m2m: vec![0f64; len],
            m2i: vec![0f64; len],
            m2d: vec![0f64; len],
            i2m: vec![0f64; len],
            i2i: vec![0f64; len],
            d2m: vec![0f64; len],
            d2d: vec![0f64; len],
        }
    }
    fn load(&mut self, template: &ProfileHmm) {
        let mut fields = [
            &mut self.m2m,
            &mut self.m2i,
            &mut self.m2d,
            &mut self.i2m,
            &mut self.i2i,
            &mut self.d2m,
            &mut self.d2d,
        ];
        fields
            .iter_mut()
            .for_each(|xs| xs.iter_mut().for_each(|x| *x = 0f64));
        self.odds
            .iter_mut()
            .for_each(|xs| xs.iter_mut().for_each(|x| *x = 0f64));
        for (j, column) in template.columns().iter().enumerate().map(|(j, c)| (j + 1, c)) {
            for (a, &x) in column.emission.iter().enumerate() {
                self.odds[a][j] = x;
            }
            let tr = &column.transitions;
            self.m2m[j] = tr.m2m;
            self.m2i[j] = tr.m2i;
            self.m2d[j] = tr.m2d;
            self.i2m[j] = tr.i2m;
            self.i2i[j] = tr.i2i;
            self.d2m[j] = tr.d2m;
            self.d2d[j] = tr.d2d;
        }
    }
}

/// e[j] = factor * sum_a q[a] * t_j[a]
struct EmissionKernel<'a> {
    query: &'a [f64; NUM_AMINO_ACIDS],
    template: &'a TemplateLanes,
    factor: f64,
    out: &'a mut [f64],
}

impl<'a> LaneKernel for EmissionKernel<'a> {
    fn apply<V: Lane>(&mut self, j: usize) {
        let mut acc = V::splat(0f64);
        for (&q, odds) in self.query.iter().zip(self.template.odds.iter()) {
            acc = acc + V::splat(q) * V::load(&odds[j..]);
        }
        (acc * V::splat(self.factor)).store(&mut self.out[j..]);
    }
}

/// Posterior decoder. The buffers are allocated for profiles up to `max_res` columns,
/// and reused across calls. A decoder should be used by one thread at a time.
#[derive(Debug, Clone)]
pub struct PosteriorDecoder {
    max_res: usize,
    local: bool,
    rows: RollingRows,
    template: TemplateLanes,
    emission: Vec<f64>,
    // 1 or 0 for each cell of the current row.
    mask_mul: Vec<f64>,
    // 0 or -inf for each cell of the current row.
    mask_add: Vec<f64>,
    // Candidates of the MAC recurrence.
    diag: Vec<f64>,
    up: Vec<f64>,
    stop: Vec<f64>,
    mac: DPTable<f64>,
    scale: Vec<f64>,
}

impl PosteriorDecoder {
    /// Create a decoder for profiles with up to `max_res` columns.
    /// If `local` is true, alignments may start and end anywhere,
    /// otherwise they start at the first row/column and end at the last row/column.
    pub fn new(max_res: usize, local: bool) -> Self {
        let len = max_res + 2 + LANES;
        Self {
            max_res,
            local,
            rows: RollingRows::with_len(len),
            template: TemplateLanes::with_len(len),
            emission: vec![0f64; len],
            mask_mul: vec![0f64; len],
            mask_add: vec![f64::NEG_INFINITY; len],
            diag: vec![f64::NEG_INFINITY; len],
            up: vec![f64::NEG_INFINITY; len],
            stop: vec![f64::NEG_INFINITY; len],
            mac: DPTable::with_capacity(max_res + 2, max_res + 2, f64::NEG_INFINITY),
            scale: vec![1f64; max_res + 2],
        }
    }
    /// Realign `hit` between `query` and `template` by posterior decoding.
    /// `template` should be converted into odds beforehand (see [ProfileHmm::to_template_odds]).
    /// `matrix` and `posteriors` should be sized to the pair. `matrix` keeps the excluded cells
    /// between calls on the same template, and the new alignment is excluded from it on success.
    /// Cells already off in `matrix`, such as the ones seeded by [Self::exclude_mac_alignment], are never aligned.
    ///
    /// On success, the alignment fields of `hit` are replaced. Its statistics are kept as they were, success or not.
    /// `DecodeError::NoAlignment` means there is no alignment to report for this hit.
    pub fn realign(
        &mut self,
        query: &ProfileHmm,
        template: &ProfileHmm,
        hit: &mut Hit,
        posteriors: &mut PosteriorMatrix,
        matrix: &mut BacktraceMatrix,
        config: &RealignConfig,
    ) -> Result<()> {
        let snapshot = HitSnapshot::capture(hit);
        let result = self.realign_inner(query, template, hit, posteriors, matrix, config);
        snapshot.restore(hit);
        result
    }
    fn realign_inner(
        &mut self,
        query: &ProfileHmm,
        template: &ProfileHmm,
        hit: &mut Hit,
        posteriors: &mut PosteriorMatrix,
        matrix: &mut BacktraceMatrix,
        config: &RealignConfig,
    ) -> Result<()> {
        let window = self.prepare(query, template, hit, posteriors, matrix, config)?;
        debug!("REALIGN\t{}\t{}\t{:?}", hit.name, hit.irep, window);
        let pass = self.forward(query, hit, posteriors, matrix, config, &window)?;
        self.backward(query, posteriors, matrix, config, &window, &pass);
        let result = match self.mac(posteriors, matrix, config, &window, &pass) {
            Ok(best) => Ok(self.backtrace(query, template, posteriors, matrix, config, best)),
            Err(why) => Err(why),
        };
        self.scale = pass.into_scale();
        let trace = result?;
        restore::write_back(hit, posteriors, trace, &window);
        Self::exclude_mac_alignment(matrix, &hit.alignment);
        Ok(())
    }
    /// Exclude `alignment` from the following realignments with `matrix`.
    /// For each cell (i,j) of the alignment, the cells (i-2..=i+2, j) and (i, j-2..=j+2) are turned off.
    pub fn exclude_mac_alignment(matrix: &mut BacktraceMatrix, alignment: &Alignment) {
        let (q_len, t_len) = (matrix.q_len(), matrix.t_len());
        for (i, j) in alignment.cells() {
            if !(1..=q_len).contains(&i) || !(1..=t_len).contains(&j) {
                continue;
            }
            for ii in i.saturating_sub(2).max(1)..=(i + 2).min(q_len) {
                matrix.set_cell_off(ii, j, true);
            }
            for jj in j.saturating_sub(2).max(1)..=(j + 2).min(t_len) {
                matrix.set_cell_off(i, jj, true);
            }
        }
    }
    /// Fill the masks of the i-th row over the window.
    fn fill_masks(&mut self, matrix: &BacktraceMatrix, i: usize, window: &Window) {
        for j in window.j_min..=window.j_max {
            let off = matrix.is_cell_off(i, j);
            self.mask_mul[j] = if off { 0f64 } else { 1f64 };
            self.mask_add[j] = if off { f64::NEG_INFINITY } else { 0f64 };
        }
    }
    /// Fill the emission row of the i-th query column over the window.
    fn fill_emission(&mut self, query: &ProfileHmm, i: usize, window: &Window, factor: f64) {
        let mut kernel = EmissionKernel {
            query: &query.column(i).emission,
            template: &self.template,
            factor,
            out: &mut self.emission,
        };
        crate::lanes::sweep(&mut kernel, window.j_min, window.j_max);
        self.emission[window.j_max + 1] = 0f64;
    }
    fn check_capacity(&self, which: &'static str, length: usize) -> Result<()> {
        if self.max_res < length {
            Err(DecodeError::CapacityExceeded {
                which,
                length,
                capacity: self.max_res,
            })
        } else {
            Ok(())
        }
    }
    /// Whether an alignment can start at (i,j).
    fn start_allowed(&self, i: usize, j: usize) -> bool {
        self.local || i == 1 || j == 1
    }
}

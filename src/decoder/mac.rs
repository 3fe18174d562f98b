//! Maximum accuracy (MAC) alignment.
//! S(i,j) = max{ S(i-1,j-1) + P(i,j) - mact, P(i,j) - mact, S(i-1,j) - mact/2, S(i,j-1) - mact/2 },
//! where P(i,j) is the posterior probability of the match (i,j).
use super::{ForwardPass, PosteriorDecoder, Window};
use crate::error::{DecodeError, Result};
use crate::lanes::{sweep, Lane, LaneKernel};
use crate::matrix::{BacktraceMatrix, PosteriorMatrix, Predecessor};
use crate::RealignConfig;

/// The best of the four candidates and its predecessor.
/// Ties are broken in this order: diagonal, start, up, left.
pub(super) fn choose_predecessor(diag: f64, stop: f64, up: f64, left: f64) -> (f64, Predecessor) {
    let mut best = (diag, Predecessor::Match);
    if stop > best.0 {
        best = (stop, Predecessor::Stop);
    }
    if up > best.0 {
        best = (up, Predecessor::Up);
    }
    if left > best.0 {
        best = (left, Predecessor::Left);
    }
    best
}

// Normalize the posterior row and fill the candidates which do not depend on the current row.
struct MacKernel<'a> {
    post: &'a mut [f64],
    prev: &'a [f64],
    mask_add: &'a [f64],
    inv_total: f64,
    mact: f64,
    // 0 if an alignment can start in this row, -inf otherwise.
    start: f64,
    diag: &'a mut [f64],
    up: &'a mut [f64],
    stop: &'a mut [f64],
}

impl<'a> LaneKernel for MacKernel<'a> {
    fn apply<V: Lane>(&mut self, j: usize) {
        let p = V::load(&self.post[j..]) * V::splat(self.inv_total);
        p.store(&mut self.post[j..]);
        let gain = p - V::splat(self.mact) + V::load(&self.mask_add[j..]);
        (gain + V::splat(self.start)).store(&mut self.stop[j..]);
        (V::load(&self.prev[j - 1..]) + gain).store(&mut self.diag[j..]);
        (V::load(&self.prev[j..]) - V::splat(self.mact / 2f64)).store(&mut self.up[j..]);
    }
}

impl PosteriorDecoder {
    /// Normalize the posterior probabilities, fill the MAC matrix and the predecessors,
    /// and return the cell to start the backtrace from.
    pub(super) fn mac(
        &mut self,
        posteriors: &mut PosteriorMatrix,
        matrix: &mut BacktraceMatrix,
        config: &RealignConfig,
        window: &Window,
        pass: &ForwardPass,
    ) -> Result<(usize, usize)> {
        let (q_len, t_len) = (matrix.q_len(), matrix.t_len());
        let (mact, half) = (config.mact, config.mact / 2f64);
        self.mac.initialize(q_len + 2, t_len + 2, f64::NEG_INFINITY);
        let inv_total = 1f64 / pass.total();
        let mut best_score = f64::NEG_INFINITY;
        let mut best = None;
        for i in window.i_min..=window.i_max {
            self.fill_masks(matrix, i, window);
            let row_start = self.local || i == 1;
            let (prev, curr) = self.mac.row_pair_mut(i - 1, i);
            let post = posteriors.row_mut(i);
            let mut kernel = MacKernel {
                post: &mut post[..],
                prev,
                mask_add: &self.mask_add,
                inv_total,
                mact,
                start: if row_start { 0f64 } else { f64::NEG_INFINITY },
                diag: &mut self.diag,
                up: &mut self.up,
                stop: &mut self.stop,
            };
            sweep(&mut kernel, window.j_min, window.j_max);
            for j in window.j_min..=window.j_max {
                if matrix.is_cell_off(i, j) {
                    curr[j] = f64::NEG_INFINITY;
                    matrix.set_predecessor(i, j, Predecessor::Stop);
                    continue;
                }
                let start = row_start || j == 1;
                if !post[j].is_finite() {
                    warn!("MAC\tPosterior at ({},{}) is {}. Set to zero.", i, j, post[j]);
                    post[j] = 0f64;
                    self.diag[j] = prev[j - 1] - mact;
                    self.stop[j] = -mact;
                }
                let stop = match (row_start, start) {
                    (true, _) => self.stop[j],
                    (false, true) => post[j] - mact,
                    (false, false) => f64::NEG_INFINITY,
                };
                let left = curr[j - 1] - half;
                let (score, pred) = choose_predecessor(self.diag[j], stop, self.up[j], left);
                curr[j] = score;
                matrix.set_predecessor(i, j, pred);
                let is_end = self.local || i == q_len || j == t_len;
                if is_end && best_score < score {
                    best_score = score;
                    best = Some((i, j));
                }
            }
        }
        match best {
            Some((i, j)) => {
                debug!("MAC\tBest cell ({},{}) {:.4}", i, j, best_score);
                Ok((i, j))
            }
            None => Err(DecodeError::no_alignment("no cell is reachable by a MAC alignment")),
        }
    }
}

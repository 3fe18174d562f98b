//! Forward algorithm.
//! MM, DG, and MI of the i-th row only depend on the (i-1)-th row, so they are computed by lanes.
//! GD and IM depend on the cell on the left, so they are computed column by column afterwards.
use super::{PosteriorDecoder, RowBuffers, TemplateLanes, Window};
use crate::error::{DecodeError, Result};
use crate::hit::Hit;
use crate::lanes::{sweep, Lane, LaneKernel};
use crate::matrix::{BacktraceMatrix, PosteriorMatrix};
use crate::profile::{ProfileHmm, Transitions};
use crate::RealignConfig;

/// Rows with smaller mass are scaled as if they had this mass.
const MIN_ROW_MASS: f64 = 1e-290;
/// The begin probability is flushed to zero below this value.
const FLUSH_THRESHOLD: f64 = 100f64 * f64::MIN_POSITIVE;

/// Scale factors and the total probability computed by the forward algorithm.
/// The backward algorithm should use these factors, not its own.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    // 1-based. 1 for the rows outside of the window.
    scale: Vec<f64>,
    // In the scale of the last row of the window.
    total: f64,
    log2_likelihood: f64,
}

impl ForwardPass {
    /// The scale factor of the i-th row.
    pub fn scale(&self, i: usize) -> f64 {
        self.scale.get(i).copied().unwrap_or(1f64)
    }
    /// The total probability, scaled by the product of all the scale factors.
    pub fn total(&self) -> f64 {
        self.total
    }
    pub fn log2_likelihood(&self) -> f64 {
        self.log2_likelihood
    }
    pub(super) fn into_scale(self) -> Vec<f64> {
        self.scale
    }
    #[cfg(test)]
    pub(super) fn unscaled(total: f64, q_len: usize) -> Self {
        Self {
            scale: vec![1f64; q_len + 2],
            total,
            log2_likelihood: total.log2(),
        }
    }
}

struct ForwardKernel<'a> {
    prev: &'a RowBuffers,
    curr: &'a mut RowBuffers,
    emission: &'a [f64],
    mask: &'a [f64],
    template: &'a TemplateLanes,
    // Transitions out of the previous query column.
    qp: Transitions,
    begin: f64,
}

impl<'a> LaneKernel for ForwardKernel<'a> {
    fn apply<V: Lane>(&mut self, j: usize) {
        let (prev, t, qp) = (self.prev, self.template, &self.qp);
        let mask = V::load(&self.mask[j..]);
        let k = j - 1;
        let t_m2m = V::load(&t.m2m[k..]);
        let from_mm = V::load(&prev.mm[k..]) * V::splat(qp.m2m) * t_m2m;
        let from_gd = V::load(&prev.gd[k..]) * V::splat(qp.m2m) * V::load(&t.d2m[k..]);
        let from_im = V::load(&prev.im[k..]) * V::splat(qp.i2m) * t_m2m;
        let from_dg = V::load(&prev.dg[k..]) * V::splat(qp.d2m) * t_m2m;
        let from_mi = V::load(&prev.mi[k..]) * V::splat(qp.m2m) * V::load(&t.i2m[k..]);
        let mm = V::load(&self.emission[j..])
            * mask
            * (V::splat(self.begin) + from_mm + from_gd + from_im + from_dg + from_mi);
        mm.store(&mut self.curr.mm[j..]);
        let up_mm = V::load(&prev.mm[j..]);
        let dg = mask * (up_mm * V::splat(qp.m2d) + V::load(&prev.dg[j..]) * V::splat(qp.d2d));
        dg.store(&mut self.curr.dg[j..]);
        let mi = mask
            * V::splat(qp.m2m)
            * (up_mm * V::load(&t.m2i[j..]) + V::load(&prev.mi[j..]) * V::load(&t.i2i[j..]));
        mi.store(&mut self.curr.mi[j..]);
    }
}

impl PosteriorDecoder {
    /// Fill the forward values of the window row by row, store the scaled F_MM into `posteriors`,
    /// and write the log2 likelihood into `hit`.
    pub(super) fn forward(
        &mut self,
        query: &ProfileHmm,
        hit: &mut Hit,
        posteriors: &mut PosteriorMatrix,
        matrix: &BacktraceMatrix,
        config: &RealignConfig,
        window: &Window,
    ) -> Result<ForwardPass> {
        let (q_len, t_len) = (matrix.q_len(), matrix.t_len());
        let (j_min, j_max) = (window.j_min, window.j_max);
        let factor = 2f64.powf(config.shift);
        let mut scale = std::mem::take(&mut self.scale);
        scale.iter_mut().for_each(|x| *x = 1f64);
        self.rows.reset();
        posteriors.clear();
        // Probability to begin an alignment, in the scale of the previous row.
        let mut begin = 1f64;
        // Local alignments include the empty one.
        let mut total = if self.local { 1f64 } else { 0f64 };
        for i in window.i_min..=window.i_max {
            self.fill_masks(matrix, i, window);
            self.fill_emission(query, i, window, factor);
            let mut kernel = ForwardKernel {
                prev: &self.rows.prev,
                curr: &mut self.rows.curr,
                emission: &self.emission,
                mask: &self.mask_mul,
                template: &self.template,
                qp: query.transitions(i - 1),
                begin: if self.local || i == 1 { begin } else { 0f64 },
            };
            sweep(&mut kernel, j_min, j_max);
            let curr = &mut self.rows.curr;
            if !self.local && i > 1 && j_min == 1 {
                curr.mm[1] += self.emission[1] * self.mask_mul[1] * begin;
            }
            let qi = query.transitions(i);
            let t = &self.template;
            for j in j_min..=j_max {
                let (mask, k) = (self.mask_mul[j], j - 1);
                curr.gd[j] = mask * (curr.mm[k] * t.m2d[k] + curr.gd[k] * t.d2d[k]);
                curr.im[j] = mask * t.m2m[k] * (curr.mm[k] * qi.m2i + curr.im[k] * qi.i2i);
            }
            let mass = curr.mass(j_min, j_max);
            let s = if mass > 0f64 {
                1f64 / mass.max(MIN_ROW_MASS)
            } else {
                1f64
            };
            curr.scale(j_min, j_max, s);
            scale[i] = s;
            trace!("FORWARD\t{}\t{}\t{}", i, mass, s);
            posteriors.row_mut(i)[j_min..=j_max].copy_from_slice(&curr.mm[j_min..=j_max]);
            let ends = if self.local || i == q_len {
                curr.mm[j_min..=j_max].iter().sum()
            } else if j_max == t_len {
                curr.mm[t_len]
            } else {
                0f64
            };
            total = total * s + ends;
            begin *= s;
            if begin < FLUSH_THRESHOLD {
                begin = 0f64;
            }
            self.rows.swap();
        }
        if !(0f64 < total && total.is_finite()) {
            debug!("FORWARD\tTotal probability is {}", total);
            self.scale = scale;
            return Err(DecodeError::no_alignment("zero total probability"));
        }
        let log_scale: f64 = scale[window.i_min..=window.i_max]
            .iter()
            .map(|s| s.log2())
            .sum();
        let log2_likelihood = total.log2() - log_scale;
        debug!("FORWARD\t{}\t{:.4}", hit.name, log2_likelihood);
        hit.forward_log2 = log2_likelihood;
        // Scratch. Restored from the snapshot at the end.
        hit.stats.score = log2_likelihood;
        Ok(ForwardPass {
            scale,
            total,
            log2_likelihood,
        })
    }
}

//! Backward algorithm. It runs on the rows of the window in reverse order,
//! with the scale factors of the forward algorithm.
use super::{ForwardPass, PosteriorDecoder, RowBuffers, TemplateLanes, Window};
use crate::lanes::{sweep, Lane, LaneKernel};
use crate::matrix::{BacktraceMatrix, PosteriorMatrix};
use crate::profile::{ProfileHmm, Transitions};
use crate::RealignConfig;

struct BackwardKernel<'a> {
    next: &'a RowBuffers,
    curr: &'a mut RowBuffers,
    // Emission of the next row.
    emission: &'a [f64],
    mask: &'a [f64],
    template: &'a TemplateLanes,
    // Transitions out of the current query column.
    qi: Transitions,
    // Scale factor of the next row.
    s_next: f64,
    end: f64,
}

impl<'a> LaneKernel for BackwardKernel<'a> {
    fn apply<V: Lane>(&mut self, j: usize) {
        let (next, t, qi) = (self.next, self.template, &self.qi);
        let mask = V::load(&self.mask[j..]);
        let s_next = V::splat(self.s_next);
        let diag = V::load(&next.mm[j + 1..]) * V::load(&self.emission[j + 1..]) * s_next;
        let down_dg = V::load(&next.dg[j..]) * s_next;
        let down_mi = V::load(&next.mi[j..]) * s_next;
        let t_m2m = V::load(&t.m2m[j..]);
        let mm = V::splat(self.end)
            + diag * V::splat(qi.m2m) * t_m2m
            + down_dg * V::splat(qi.m2d)
            + down_mi * V::splat(qi.m2m) * V::load(&t.m2i[j..]);
        (mask * mm).store(&mut self.curr.mm[j..]);
        let gd = diag * V::splat(qi.m2m) * V::load(&t.d2m[j..]);
        (mask * gd).store(&mut self.curr.gd[j..]);
        let im = diag * V::splat(qi.i2m) * t_m2m;
        (mask * im).store(&mut self.curr.im[j..]);
        let dg = diag * V::splat(qi.d2m) * t_m2m + down_dg * V::splat(qi.d2d);
        (mask * dg).store(&mut self.curr.dg[j..]);
        let mi = V::splat(qi.m2m) * (diag * V::load(&t.i2m[j..]) + down_mi * V::load(&t.i2i[j..]));
        (mask * mi).store(&mut self.curr.mi[j..]);
    }
}

impl PosteriorDecoder {
    /// Multiply the forward values in `posteriors` by the backward values B_MM.
    /// The products are proportional to the posterior probabilities.
    pub(super) fn backward(
        &mut self,
        query: &ProfileHmm,
        posteriors: &mut PosteriorMatrix,
        matrix: &BacktraceMatrix,
        config: &RealignConfig,
        window: &Window,
        pass: &ForwardPass,
    ) {
        let (q_len, t_len) = (matrix.q_len(), matrix.t_len());
        let (j_min, j_max) = (window.j_min, window.j_max);
        let factor = 2f64.powf(config.shift);
        self.rows.reset();
        // Probability to end an alignment, scaled by the factors of the rows below.
        let mut end = 1f64;
        let mut s_next = 1f64;
        for i in (window.i_min..=window.i_max).rev() {
            if i < window.i_max {
                self.fill_emission(query, i + 1, window, factor);
            } else {
                self.emission.iter_mut().for_each(|x| *x = 0f64);
            }
            self.fill_masks(matrix, i, window);
            let mut kernel = BackwardKernel {
                next: &self.rows.prev,
                curr: &mut self.rows.curr,
                emission: &self.emission,
                mask: &self.mask_mul,
                template: &self.template,
                qi: query.transitions(i),
                s_next,
                end: if self.local || i == q_len { end } else { 0f64 },
            };
            sweep(&mut kernel, j_min, j_max);
            let curr = &mut self.rows.curr;
            if !self.local && i < q_len && j_max == t_len {
                curr.mm[t_len] += self.mask_mul[t_len] * end;
            }
            let qi = query.transitions(i);
            let t = &self.template;
            for j in (j_min..=j_max).rev() {
                let mask = self.mask_mul[j];
                curr.gd[j] += mask * curr.gd[j + 1] * t.d2d[j];
                curr.im[j] += mask * curr.im[j + 1] * qi.i2i * t.m2m[j];
                curr.mm[j] +=
                    mask * (curr.gd[j + 1] * t.m2d[j] + curr.im[j + 1] * qi.m2i * t.m2m[j]);
            }
            posteriors.row_mut(i)[j_min..=j_max]
                .iter_mut()
                .zip(curr.mm[j_min..=j_max].iter())
                .for_each(|(p, b)| *p *= b);
            s_next = pass.scale(i);
            end *= s_next;
            self.rows.swap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen_seq;
    use crate::hit::{Alignment, Hit};
    use crate::profile::UNIFORM_BACKGROUND;
    #[test]
    fn posterior_mass_of_a_single_column() {
        // With one template column, each query column is either matched to it or not.
        let query = gen_seq::profile_from_residues("query", &[3, 7, 3], 0.95);
        let template =
            gen_seq::profile_from_residues("template", &[3], 0.95).to_template_odds(&UNIFORM_BACKGROUND);
        let config = RealignConfig::default();
        let mut posteriors = PosteriorMatrix::new(3, 1);
        let mut matrix = BacktraceMatrix::new(3, 1);
        let mut hit = Hit::new("template", 1, Alignment::new());
        let mut decoder = PosteriorDecoder::new(10, true);
        let window = decoder
            .prepare(&query, &template, &hit, &posteriors, &mut matrix, &config)
            .unwrap();
        let pass = decoder
            .forward(&query, &mut hit, &mut posteriors, &matrix, &config, &window)
            .unwrap();
        decoder.backward(&query, &mut posteriors, &matrix, &config, &window, &pass);
        let factor = 2f64.powf(config.shift);
        let probs: Vec<_> = (1..=3)
            .map(|i| factor * query.match_probability(i, &template, 1))
            .collect();
        // The empty alignment and the three single-cell alignments.
        let total = 1f64 + probs.iter().sum::<f64>();
        for i in 1..=3 {
            let p = posteriors.get(i, 1) / pass.total();
            assert!((p - probs[i - 1] / total).abs() < 0.000001, "{}", p);
        }
        assert!((pass.log2_likelihood() - total.log2()).abs() < 0.000001);
    }
}

//! Preparation of the exclusion mask and the window of the decoding.
use super::{PosteriorDecoder, Window};
use crate::error::{DecodeError, Result};
use crate::hit::Hit;
use crate::matrix::{BacktraceMatrix, PosteriorMatrix};
use crate::profile::ProfileHmm;
use crate::RealignConfig;

/// Number of cells on the diagonal through (i,j).
fn diagonal_length(q_len: usize, t_len: usize, i: usize, j: usize) -> usize {
    i.min(j) + (q_len - i).min(t_len - j)
}

fn check_dims(which: &'static str, rows: usize, cols: usize, q_len: usize, t_len: usize) -> Result<()> {
    if rows == q_len && cols == t_len {
        Ok(())
    } else {
        Err(DecodeError::DimensionMismatch {
            which,
            rows,
            cols,
            q_len,
            t_len,
        })
    }
}

impl PosteriorDecoder {
    /// Validate the inputs, exclude the cells which should not be aligned, and load the template.
    /// Returns the window of the cells still allowed.
    pub(super) fn prepare(
        &mut self,
        query: &ProfileHmm,
        template: &ProfileHmm,
        hit: &Hit,
        posteriors: &PosteriorMatrix,
        matrix: &mut BacktraceMatrix,
        config: &RealignConfig,
    ) -> Result<Window> {
        config.validate()?;
        let (q_len, t_len) = (query.len(), template.len());
        self.check_capacity("query", q_len)?;
        self.check_capacity("template", t_len)?;
        check_dims("backtrace matrix", matrix.q_len(), matrix.t_len(), q_len, t_len)?;
        check_dims(
            "posterior matrix",
            posteriors.q_len(),
            posteriors.t_len(),
            q_len,
            t_len,
        )?;
        if q_len == 0 || t_len == 0 {
            return Err(DecodeError::no_alignment("empty profile"));
        }
        if q_len.min(t_len) < config.min_overlap {
            return Err(DecodeError::no_alignment("profiles shorter than the minimum overlap"));
        }
        if hit.is_self {
            for i in 1..=q_len {
                for j in 1..=(i + 3).min(t_len) {
                    matrix.set_cell_off(i, j, true);
                }
            }
        }
        for &(start, end) in config.excluded_query.iter() {
            for i in start.max(1)..=end.min(q_len) {
                (1..=t_len).for_each(|j| matrix.set_cell_off(i, j, true));
            }
        }
        for &(start, end) in config.excluded_template.iter() {
            for j in start.max(1)..=end.min(t_len) {
                (1..=q_len).for_each(|i| matrix.set_cell_off(i, j, true));
            }
        }
        if self.local && 0 < config.min_overlap {
            for i in 1..=q_len {
                for j in 1..=t_len {
                    if diagonal_length(q_len, t_len, i, j) < config.min_overlap {
                        matrix.set_cell_off(i, j, true);
                    }
                }
            }
        }
        for alignment in hit.alternatives.iter() {
            Self::exclude_mac_alignment(matrix, alignment);
        }
        // The alignment found by the search.
        for (i, j) in hit.alignment.cells() {
            matrix.set_cell_off(i, j, true);
        }
        let window = (1..=q_len)
            .flat_map(|i| (1..=t_len).map(move |j| (i, j)))
            .filter(|&(i, j)| !matrix.is_cell_off(i, j))
            .fold(None, |window: Option<Window>, (i, j)| match window {
                None => Some(Window {
                    i_min: i,
                    i_max: i,
                    j_min: j,
                    j_max: j,
                }),
                Some(w) => Some(Window {
                    i_min: w.i_min.min(i),
                    i_max: w.i_max.max(i),
                    j_min: w.j_min.min(j),
                    j_max: w.j_max.max(j),
                }),
            });
        match window {
            Some(window) => {
                self.template.load(template);
                Ok(window)
            }
            None => Err(DecodeError::no_alignment("every cell is excluded")),
        }
    }
}

//! Backtrace of the MAC matrix.
use super::mac::choose_predecessor;
use super::PosteriorDecoder;
use crate::hit::Alignment;
use crate::matrix::{BacktraceMatrix, PosteriorMatrix, Predecessor};
use crate::op::Op;
use crate::profile::ProfileHmm;
use crate::RealignConfig;

/// Number of the following columns correlated with a column.
const CORRELATION_SPAN: usize = 4;

/// The alignment traced back from the MAC matrix, in path order.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Trace {
    pub alignment: Alignment,
    /// Posterior probability of each step, 0 for gaps.
    pub posteriors: Vec<f64>,
    /// log2 score of each step, 0 for gaps.
    pub scores: Vec<f64>,
    pub mac_score: f64,
}

/// sum_k sum_{d=1..=4} S_k * S_{k+d}
fn correlation_score(scores: &[f64]) -> f64 {
    scores
        .iter()
        .enumerate()
        .map(|(k, s)| {
            let following = scores.iter().skip(k + 1).take(CORRELATION_SPAN);
            following.map(|t| s * t).sum::<f64>()
        })
        .sum()
}

impl PosteriorDecoder {
    /// Trace the MAC matrix back from `best`.
    ///
    /// While the path keeps matching along a diagonal, the predecessor of each cell is
    /// re-chosen with the bonus `corr * P(cell) * P(next cell)` on the candidates which keep the cell matched.
    /// # Panics
    /// Panics if the path visits an excluded cell.
    pub(super) fn backtrace(
        &self,
        query: &ProfileHmm,
        template: &ProfileHmm,
        posteriors: &PosteriorMatrix,
        matrix: &BacktraceMatrix,
        config: &RealignConfig,
        best: (usize, usize),
    ) -> Trace {
        let (mut i, mut j) = best;
        let mut alignment = Alignment::new();
        let (mut probs, mut scores) = (vec![], vec![]);
        // Posterior of the cell visited just before, if it is the diagonal successor of the current cell.
        let mut successor: Option<f64> = None;
        loop {
            assert!(
                !matrix.is_cell_off(i, j),
                "MAC path visits an excluded cell ({},{})",
                i,
                j
            );
            let prob = posteriors.get(i, j);
            let pred = match successor {
                Some(next) if config.corr != 0f64 => {
                    self.rescore(i, j, prob, config.corr * prob * next, config)
                }
                _ => matrix.predecessor(i, j),
            };
            let op = pred.op();
            alignment.push(i, j, op);
            match op {
                Op::Match => {
                    probs.push(prob);
                    scores.push(query.column_score(i, template, j));
                }
                Op::Ins | Op::Del => {
                    probs.push(0f64);
                    scores.push(0f64);
                }
            }
            successor = None;
            match pred {
                Predecessor::Stop => break,
                Predecessor::Match => {
                    successor = Some(prob);
                    i -= 1;
                    j -= 1;
                }
                Predecessor::Up => i -= 1,
                Predecessor::Left => j -= 1,
            }
        }
        alignment.reverse();
        probs.reverse();
        scores.reverse();
        let mac_score = scores.iter().sum::<f64>() + config.corr * correlation_score(&scores);
        debug!(
            "BACKTRACE\t{}\t{}\t{:.4}",
            alignment.len(),
            alignment.matched(),
            mac_score
        );
        Trace {
            alignment,
            posteriors: probs,
            scores,
            mac_score,
        }
    }
    // The predecessor of (i,j) when the diagonal candidates get `bonus`.
    fn rescore(&self, i: usize, j: usize, prob: f64, bonus: f64, config: &RealignConfig) -> Predecessor {
        let gain = prob - config.mact + bonus;
        let half = config.mact / 2f64;
        let diag = self.mac.get(i - 1, j - 1) + gain;
        let stop = match self.start_allowed(i, j) {
            true => gain,
            false => f64::NEG_INFINITY,
        };
        let up = self.mac.get(i - 1, j) - half;
        let left = self.mac.get(i, j - 1) - half;
        choose_predecessor(diag, stop, up, left).1
    }
}

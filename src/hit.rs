//! The alignment result container.
use crate::op::Op;
use serde::{Deserialize, Serialize};

/// An alignment path between a query and a template, as parallel sequences
/// of 1-based column indices and operations, from the start to the end of the alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub i: Vec<usize>,
    pub j: Vec<usize>,
    pub ops: Vec<Op>,
}

impl Alignment {
    pub fn new() -> Self {
        Self::default()
    }
    /// A gapless alignment from (i, j) of length `len`.
    pub fn diagonal(i: usize, j: usize, len: usize) -> Self {
        Self {
            i: (i..i + len).collect(),
            j: (j..j + len).collect(),
            ops: vec![Op::Match; len],
        }
    }
    pub fn push(&mut self, i: usize, j: usize, op: Op) {
        self.i.push(i);
        self.j.push(j);
        self.ops.push(op);
    }
    pub fn len(&self) -> usize {
        self.ops.len()
    }
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
    /// Iterate over (i, j, op).
    pub fn steps(&self) -> impl Iterator<Item = (usize, usize, Op)> + '_ {
        self.i
            .iter()
            .zip(self.j.iter())
            .zip(self.ops.iter())
            .map(|((&i, &j), &op)| (i, j, op))
    }
    /// Iterate over the cells (i, j) visited.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.i.iter().copied().zip(self.j.iter().copied())
    }
    pub fn reverse(&mut self) {
        self.i.reverse();
        self.j.reverse();
        self.ops.reverse();
    }
    /// Number of matched column pairs.
    pub fn matched(&self) -> usize {
        self.ops.iter().filter(|&&op| op == Op::Match).count()
    }
}

/// Scores and statistics of a hit found by the search.
/// They are snapshotted before the realignment and restored afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStatistics {
    pub score: f64,
    pub score_sort: f64,
    pub score_aass: f64,
    pub score_ss: f64,
    pub pval: f64,
    pub log_pval: f64,
    pub pvalt: f64,
    pub log_pvalt: f64,
    pub eval: f64,
    pub log_eval: f64,
    pub probab: f64,
}

/// Saved hit statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitSnapshot(HitStatistics);

impl HitSnapshot {
    pub fn capture(hit: &Hit) -> Self {
        HitSnapshot(hit.stats)
    }
    pub fn restore(self, hit: &mut Hit) {
        hit.stats = self.0;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Name of the template.
    pub name: String,
    /// 1 for the first alignment with this template, 2 for the second, and so on.
    pub irep: usize,
    /// The query is compared with itself.
    pub is_self: bool,
    pub stats: HitStatistics,
    /// The alignment. Before the realignment, it is the alignment found by the search.
    pub alignment: Alignment,
    pub i1: usize,
    pub i2: usize,
    pub j1: usize,
    pub j2: usize,
    pub matched_cols: usize,
    /// Posterior probability of each step (zero for gaps).
    pub posteriors: Vec<f64>,
    /// Column score of each step (zero for gaps).
    pub column_scores: Vec<f64>,
    pub sum_of_probs: f64,
    /// log2 of the total probability of the pair, by the forward algorithm.
    pub forward_log2: f64,
    /// Sum of the column scores, corrected by the correlation of neighboring columns.
    pub mac_score: f64,
    /// Pr{query column i is aligned}, 1-based (index 0 is unused).
    pub query_profile: Vec<f64>,
    /// Pr{template column j is aligned}, 1-based (index 0 is unused).
    pub template_profile: Vec<f64>,
    /// Alignments already found with this template. They are excluded from the realignment.
    pub alternatives: Vec<Alignment>,
}

impl Hit {
    pub fn new(name: &str, irep: usize, alignment: Alignment) -> Self {
        let mut hit = Self {
            name: name.to_string(),
            irep,
            ..Default::default()
        };
        hit.set_alignment(alignment);
        hit
    }
    /// Replace the alignment and update the boundaries and the matched columns.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        let first = alignment.cells().next().unwrap_or((0, 0));
        let last = alignment.cells().last().unwrap_or((0, 0));
        self.i1 = first.0;
        self.j1 = first.1;
        self.i2 = last.0;
        self.j2 = last.1;
        self.matched_cols = alignment.matched();
        self.alignment = alignment;
    }
    pub fn nsteps(&self) -> usize {
        self.alignment.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn alignment_bounds() {
        let mut aln = Alignment::diagonal(2, 5, 3);
        aln.push(4, 8, Op::Del);
        let hit = Hit::new("t", 1, aln);
        assert_eq!((hit.i1, hit.j1, hit.i2, hit.j2), (2, 5, 4, 8));
        assert_eq!(hit.matched_cols, 3);
        assert_eq!(hit.nsteps(), 4);
        let cells: Vec<_> = hit.alignment.cells().collect();
        assert_eq!(cells, vec![(2, 5), (3, 6), (4, 7), (4, 8)]);
    }
    #[test]
    fn snapshot_restores_statistics() {
        let mut hit = Hit::new("t", 1, Alignment::new());
        hit.stats.eval = 0.001;
        hit.stats.score = 42f64;
        let snapshot = HitSnapshot::capture(&hit);
        hit.stats.score = -1f64;
        hit.stats.eval = 10f64;
        hit.mac_score = 3f64;
        snapshot.restore(&mut hit);
        assert_eq!(hit.stats.score, 42f64);
        assert_eq!(hit.stats.eval, 0.001);
        assert_eq!(hit.mac_score, 3f64);
    }
}

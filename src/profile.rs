//! Profile hidden Markov models, read-only during the decoding.
use serde::{Deserialize, Serialize};

/// Size of the alphabet (amino acids).
pub const NUM_AMINO_ACIDS: usize = 20;

/// Uniform background frequencies.
pub const UNIFORM_BACKGROUND: [f64; NUM_AMINO_ACIDS] = [1f64 / NUM_AMINO_ACIDS as f64; NUM_AMINO_ACIDS];

/// Linear transition probabilities out of one profile column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transitions {
    /// Pr{Mat->Mat}
    pub m2m: f64,
    /// Pr{Mat->Ins}
    pub m2i: f64,
    /// Pr{Mat->Del}
    pub m2d: f64,
    /// Pr{Ins->Mat}
    pub i2m: f64,
    /// Pr{Ins->Ins}
    pub i2i: f64,
    /// Pr{Del->Mat}
    pub d2m: f64,
    /// Pr{Del->Del}
    pub d2d: f64,
}

impl std::default::Default for Transitions {
    fn default() -> Self {
        Self::new((0.90, 0.05, 0.05), (0.6, 0.4), (0.6, 0.4))
    }
}

impl Transitions {
    /// Each group of out-going probabilities is normalized to sum up to one.
    pub fn new(
        (m2m, m2i, m2d): (f64, f64, f64),
        (i2m, i2i): (f64, f64),
        (d2m, d2d): (f64, f64),
    ) -> Self {
        assert!(0f64 <= m2m && 0f64 <= m2i && 0f64 <= m2d);
        assert!(0f64 <= i2m && 0f64 <= i2i);
        assert!(0f64 <= d2m && 0f64 <= d2d);
        let mat = m2m + m2i + m2d;
        let ins = i2m + i2i;
        let del = d2m + d2d;
        assert!(0f64 < mat && 0f64 < ins && 0f64 < del);
        Self {
            m2m: m2m / mat,
            m2i: m2i / mat,
            m2d: m2d / mat,
            i2m: i2m / ins,
            i2i: i2i / ins,
            d2m: d2m / del,
            d2d: d2d / del,
        }
    }
    /// All transitions are zero. Used as the transitions "before" the first column.
    pub fn zeros() -> Self {
        Self {
            m2m: 0f64,
            m2i: 0f64,
            m2d: 0f64,
            i2m: 0f64,
            i2i: 0f64,
            d2m: 0f64,
            d2d: 0f64,
        }
    }
}

/// A column of a profile HMM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub emission: [f64; NUM_AMINO_ACIDS],
    pub transitions: Transitions,
}

impl Column {
    /// The emission is normalized to sum up to one.
    pub fn new(emission: &[f64], transitions: Transitions) -> Self {
        assert_eq!(emission.len(), NUM_AMINO_ACIDS);
        assert!(emission.iter().all(|&x| 0f64 <= x));
        let sum: f64 = emission.iter().sum();
        assert!(0f64 < sum);
        let mut normed = [0f64; NUM_AMINO_ACIDS];
        normed
            .iter_mut()
            .zip(emission)
            .for_each(|(x, &y)| *x = y / sum);
        Self {
            emission: normed,
            transitions,
        }
    }
}

/// A profile HMM. Columns are 1-based, as in the alignment coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileHmm {
    pub name: String,
    /// Consensus residue of each column. Used only for display.
    pub consensus: Vec<u8>,
    columns: Vec<Column>,
}

impl ProfileHmm {
    pub fn new(name: &str, consensus: &[u8], columns: Vec<Column>) -> Self {
        assert_eq!(consensus.len(), columns.len());
        Self {
            name: name.to_string(),
            consensus: consensus.to_vec(),
            columns,
        }
    }
    pub fn len(&self) -> usize {
        self.columns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
    /// The i-th column (1-based).
    pub fn column(&self, i: usize) -> &Column {
        &self.columns[i - 1]
    }
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
    /// Transitions out of the i-th column, or zeros if there's no such column (i = 0, for example).
    pub fn transitions(&self, i: usize) -> Transitions {
        match i.checked_sub(1).and_then(|i| self.columns.get(i)) {
            Some(column) => column.transitions,
            None => Transitions::zeros(),
        }
    }
    /// Convert the emissions into odds against `background`. A template profile should be converted
    /// before the decoding, so that the dot product of a query column and a template column is the
    /// probability ratio of the two columns being aligned.
    pub fn to_template_odds(&self, background: &[f64; NUM_AMINO_ACIDS]) -> Self {
        assert!(background.iter().all(|&x| 0f64 < x));
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let mut emission = column.emission;
                emission
                    .iter_mut()
                    .zip(background.iter())
                    .for_each(|(x, bg)| *x /= bg);
                Column {
                    emission,
                    transitions: column.transitions,
                }
            })
            .collect();
        Self {
            name: self.name.clone(),
            consensus: self.consensus.clone(),
            columns,
        }
    }
    /// Pr{query column i and template column j are aligned} / background.
    pub fn match_probability(&self, i: usize, template: &Self, j: usize) -> f64 {
        let (q, t) = (&self.column(i).emission, &template.column(j).emission);
        q.iter().zip(t.iter()).map(|(x, y)| x * y).sum()
    }
    /// log2 of the match probability. It is the score of column pair (i,j).
    pub fn column_score(&self, i: usize, template: &Self, j: usize) -> f64 {
        self.match_probability(i, template, j).log2()
    }
}

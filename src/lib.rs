//! Realignment of profile HMM hits by posterior decoding and maximum accuracy (MAC) alignment.
//!
//! ```no_run
//! use macrealign::*;
//! let query = gen_seq::profile_from_residues("q", &[0, 1, 2, 3], 0.9);
//! let template = gen_seq::profile_from_residues("t", &[5, 0, 1, 2, 3], 0.9)
//!     .to_template_odds(&profile::UNIFORM_BACKGROUND);
//! let mut decoder = PosteriorDecoder::new(100, true);
//! let mut hit = Hit::new("t", 1, Alignment::new());
//! let mut posteriors = PosteriorMatrix::new(query.len(), template.len());
//! let mut matrix = BacktraceMatrix::new(query.len(), template.len());
//! let config = RealignConfig::default();
//! decoder
//!     .realign(&query, &template, &mut hit, &mut posteriors, &mut matrix, &config)
//!     .unwrap();
//! ```
#[macro_use]
extern crate log;
pub mod batch;
pub mod decoder;
pub mod dptable;
pub mod error;
pub mod gen_seq;
pub mod hit;
pub mod lanes;
pub mod matrix;
pub mod op;
pub mod profile;

pub use decoder::{ForwardPass, PosteriorDecoder, Window};
pub use error::{DecodeError, Result};
pub use hit::{Alignment, Hit, HitSnapshot, HitStatistics};
pub use matrix::{BacktraceMatrix, PosteriorMatrix, Predecessor};
pub use op::Op;
pub use profile::{Column, ProfileHmm, Transitions};
use serde::{Deserialize, Serialize};

/// Parameters of a realignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealignConfig {
    /// Minimum length of the diagonals to be aligned (local alignment only). 0 to disable.
    pub min_overlap: usize,
    /// Score offset per matched column, in bits.
    pub shift: f64,
    /// Trade-off between the precision and the sensitivity of the MAC alignment.
    /// Larger value gives shorter, more precise alignments.
    pub mact: f64,
    /// Weight of the correlation between neighboring columns.
    pub corr: f64,
    /// Ranges (1-based, inclusive) of the query columns not to be aligned.
    pub excluded_query: Vec<(usize, usize)>,
    /// Ranges (1-based, inclusive) of the template columns not to be aligned.
    pub excluded_template: Vec<(usize, usize)>,
}

impl std::default::Default for RealignConfig {
    fn default() -> Self {
        Self::new(0, -0.03, 0.3501, 0.1)
    }
}

impl RealignConfig {
    pub fn new(min_overlap: usize, shift: f64, mact: f64, corr: f64) -> Self {
        Self {
            min_overlap,
            shift,
            mact,
            corr,
            excluded_query: vec![],
            excluded_template: vec![],
        }
    }
    pub fn validate(&self) -> Result<()> {
        let params = [("shift", self.shift), ("mact", self.mact), ("corr", self.corr)];
        match params.iter().find(|(_, value)| !value.is_finite()) {
            Some(&(name, value)) => Err(DecodeError::InvalidParameter { name, value }),
            None => Ok(()),
        }
    }
}

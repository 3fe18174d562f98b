//! This module is to generate some random profiles to assess the performance.
//! Usually, it would not be used in the real-applications.
use crate::profile::{Column, ProfileHmm, Transitions, NUM_AMINO_ACIDS};
use rand::seq::SliceRandom;
use rand::Rng;

/// One-letter codes of the residues, in the order of the emission probabilities.
pub const AMINO_ACIDS: &[u8; NUM_AMINO_ACIDS] = b"ARNDCQEGHILKMFPSTWYV";

/// Rates of the mutations introduced into a residue sequence.
#[derive(Debug, Clone, Copy)]
pub struct MutationRates {
    pub sub: f64,
    pub del: f64,
    pub ins: f64,
}

pub const PROFILE: MutationRates = MutationRates {
    sub: 0.04,
    del: 0.04,
    ins: 0.07,
};

/// Distant homologs.
pub const REMOTE_PROFILE: MutationRates = MutationRates {
    sub: 0.3,
    del: 0.05,
    ins: 0.05,
};

#[derive(Debug, Clone, Copy)]
enum Op {
    Match,
    MisMatch,
    Del,
    In,
}
impl Op {
    fn weight(self, p: &MutationRates) -> f64 {
        match self {
            Op::Match => 1. - p.sub - p.del - p.ins,
            Op::MisMatch => p.sub,
            Op::Del => p.del,
            Op::In => p.ins,
        }
    }
}
const OPERATIONS: [Op; 4] = [Op::Match, Op::MisMatch, Op::Del, Op::In];

/// Mutate `seq`, a sequence of residue indices (0..20).
pub fn introduce_randomness<T: Rng>(seq: &[u8], rng: &mut T, p: &MutationRates) -> Vec<u8> {
    let mut res = vec![];
    let mut remainings: Vec<_> = seq.iter().copied().rev().collect();
    while let Some(&residue) = remainings.last() {
        match OPERATIONS.choose_weighted(rng, |e| e.weight(p)) {
            Ok(Op::Match) | Err(_) => res.push(residue),
            Ok(Op::MisMatch) => res.push(choose_residue(rng, residue)),
            Ok(Op::In) => {
                res.push(random_residue(rng));
                continue;
            }
            Ok(Op::Del) => {}
        }
        remainings.pop();
    }
    res
}

/// A random sequence of residue indices (0..20).
pub fn generate_residues<T: Rng>(rng: &mut T, len: usize) -> Vec<u8> {
    (0..len).map(|_| random_residue(rng)).collect()
}

fn choose_residue<T: Rng>(rng: &mut T, residue: u8) -> u8 {
    let shift = rng.gen_range(1..NUM_AMINO_ACIDS as u8);
    (residue + shift) % NUM_AMINO_ACIDS as u8
}

fn random_residue<T: Rng>(rng: &mut T) -> u8 {
    rng.gen_range(0..NUM_AMINO_ACIDS as u8)
}

/// A profile emitting residue `residues[i-1]` at the i-th column with probability `sharpness`,
/// and the other residues uniformly. The transitions are the default ones.
pub fn profile_from_residues(name: &str, residues: &[u8], sharpness: f64) -> ProfileHmm {
    assert!(0f64 < sharpness && sharpness < 1f64);
    let other = (1f64 - sharpness) / (NUM_AMINO_ACIDS - 1) as f64;
    let columns: Vec<_> = residues
        .iter()
        .map(|&r| {
            let mut emission = [other; NUM_AMINO_ACIDS];
            emission[r as usize] = sharpness;
            Column::new(&emission, Transitions::default())
        })
        .collect();
    let consensus: Vec<_> = residues.iter().map(|&r| AMINO_ACIDS[r as usize]).collect();
    ProfileHmm::new(name, &consensus, columns)
}

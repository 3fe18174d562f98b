//! Realign many templates in parallel.
//! Each job owns its template, its hits, and its matrices, so the jobs never share mutable state.
//! Hits of the same template are realigned one by one, in order, as each realignment excludes
//! the cells of the alignments found before.
use crate::error::DecodeError;
use crate::hit::Hit;
use crate::matrix::{BacktraceMatrix, PosteriorMatrix};
use crate::profile::ProfileHmm;
use crate::{PosteriorDecoder, RealignConfig};
use rayon::prelude::*;

/// A template, converted into odds, with the hits to be realigned against it.
#[derive(Debug, Clone)]
pub struct RealignJob {
    pub template: ProfileHmm,
    pub hits: Vec<Hit>,
    pub matrix: BacktraceMatrix,
    pub posteriors: PosteriorMatrix,
}

impl RealignJob {
    pub fn new(query: &ProfileHmm, template: ProfileHmm, hits: Vec<Hit>) -> Self {
        let matrix = BacktraceMatrix::new(query.len(), template.len());
        let posteriors = PosteriorMatrix::new(query.len(), template.len());
        Self {
            template,
            hits,
            matrix,
            posteriors,
        }
    }
}

/// Realign all the hits of `jobs`. Returns, for each job, the result of each hit.
/// A hit without alignment is not an error of the batch; see [DecodeError::is_no_alignment].
pub fn realign_all(
    query: &ProfileHmm,
    jobs: &mut [RealignJob],
    max_res: usize,
    local: bool,
    config: &RealignConfig,
) -> Vec<Vec<Result<(), DecodeError>>> {
    jobs.par_iter_mut()
        .map_init(
            || PosteriorDecoder::new(max_res, local),
            |decoder, job| {
                let RealignJob {
                    template,
                    hits,
                    matrix,
                    posteriors,
                } = job;
                hits.iter_mut()
                    .map(|hit| {
                        let result =
                            decoder.realign(query, template, hit, posteriors, matrix, config);
                        if let Err(why) = result.as_ref() {
                            debug!("BATCH\t{}\t{}\t{}", hit.name, hit.irep, why);
                        }
                        result
                    })
                    .collect()
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen_seq;
    use crate::hit::Alignment;
    use crate::profile::UNIFORM_BACKGROUND;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    fn jobs(query: &[u8], seed: u64) -> Vec<RealignJob> {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
        let query_profile = gen_seq::profile_from_residues("query", query, 0.8);
        (0..6)
            .map(|k| {
                let name = format!("template{}", k);
                let xs = gen_seq::introduce_randomness(query, &mut rng, &gen_seq::PROFILE);
                let ys = gen_seq::introduce_randomness(query, &mut rng, &gen_seq::PROFILE);
                let spacer = gen_seq::generate_residues(&mut rng, 10);
                let residues = [&xs[..], &spacer[..], &ys[..]].concat();
                let template = gen_seq::profile_from_residues(&name, &residues, 0.8)
                    .to_template_odds(&UNIFORM_BACKGROUND);
                let hits = (1..=2).map(|irep| Hit::new(&name, irep, Alignment::new())).collect();
                RealignJob::new(&query_profile, template, hits)
            })
            .collect()
    }
    #[test]
    fn batch_equals_sequential() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(392);
        let query = gen_seq::generate_residues(&mut rng, 40);
        let query_profile = gen_seq::profile_from_residues("query", &query, 0.8);
        let config = RealignConfig::default();
        let mut parallel = jobs(&query, 10);
        let results = realign_all(&query_profile, &mut parallel, 200, true, &config);
        let mut sequential = jobs(&query, 10);
        let mut decoder = PosteriorDecoder::new(200, true);
        for (job, results) in sequential.iter_mut().zip(results.iter()) {
            for (hit, result) in job.hits.iter_mut().zip(results.iter()) {
                let answer = decoder.realign(
                    &query_profile,
                    &job.template,
                    hit,
                    &mut job.posteriors,
                    &mut job.matrix,
                    &config,
                );
                assert_eq!(&answer, result);
            }
        }
        for (p, s) in parallel.iter().zip(sequential.iter()) {
            assert_eq!(p.hits, s.hits);
        }
        // The two copies are found one after another.
        for job in parallel.iter() {
            let (first, second) = (&job.hits[0].alignment, &job.hits[1].alignment);
            assert!(first.cells().all(|c| second.cells().all(|d| c != d)));
        }
    }
}

#![feature(test)]
extern crate test;
use macrealign::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
const SEED: u64 = 1293890;
const PROFILE_LEN: usize = 200;

fn pair(rng: &mut Xoshiro256StarStar) -> (ProfileHmm, ProfileHmm) {
    let query = gen_seq::generate_residues(rng, PROFILE_LEN);
    let template = gen_seq::introduce_randomness(&query, rng, &gen_seq::REMOTE_PROFILE);
    let query = gen_seq::profile_from_residues("query", &query, 0.7);
    let template = gen_seq::profile_from_residues("template", &template, 0.7)
        .to_template_odds(&profile::UNIFORM_BACKGROUND);
    (query, template)
}

fn realign_bench(b: &mut test::Bencher, local: bool) {
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(SEED);
    let (query, template) = pair(&mut rng);
    let config = RealignConfig::default();
    let mut decoder = PosteriorDecoder::new(2 * PROFILE_LEN, local);
    let mut posteriors = PosteriorMatrix::new(query.len(), template.len());
    let mut matrix = BacktraceMatrix::new(query.len(), template.len());
    b.iter(|| {
        matrix.resize(query.len(), template.len());
        let mut hit = Hit::new("template", 1, Alignment::new());
        let result = decoder.realign(&query, &template, &mut hit, &mut posteriors, &mut matrix, &config);
        test::black_box((result, hit.mac_score))
    });
}

#[bench]
fn realign_local(b: &mut test::Bencher) {
    realign_bench(b, true);
}

#[bench]
fn realign_global(b: &mut test::Bencher) {
    realign_bench(b, false);
}

#[bench]
fn realign_repeated(b: &mut test::Bencher) {
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(SEED);
    let (query, template) = pair(&mut rng);
    let config = RealignConfig::default();
    let mut decoder = PosteriorDecoder::new(2 * PROFILE_LEN, true);
    let mut posteriors = PosteriorMatrix::new(query.len(), template.len());
    let mut matrix = BacktraceMatrix::new(query.len(), template.len());
    b.iter(|| {
        matrix.resize(query.len(), template.len());
        let mut hit = Hit::new("template", 1, Alignment::new());
        for irep in 1..=3 {
            hit.irep = irep;
            let _ = decoder.realign(&query, &template, &mut hit, &mut posteriors, &mut matrix, &config);
        }
        test::black_box(hit.alternatives.len())
    });
}

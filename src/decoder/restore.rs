//! Write the result of the decoding back into the hit.
use super::backtrace::Trace;
use super::Window;
use crate::hit::Hit;
use crate::matrix::PosteriorMatrix;

/// Replace the alignment fields of `hit` by `trace`, and regenerate the posterior profiles,
/// Pr{query column i is aligned} and Pr{template column j is aligned}.
/// The new alignment is appended to the alternatives of the hit.
pub(super) fn write_back(hit: &mut Hit, posteriors: &PosteriorMatrix, trace: Trace, window: &Window) {
    let Trace {
        alignment,
        posteriors: probs,
        scores,
        mac_score,
    } = trace;
    hit.set_alignment(alignment.clone());
    hit.sum_of_probs = probs.iter().sum();
    hit.posteriors = probs;
    hit.column_scores = scores;
    hit.mac_score = mac_score;
    let (q_len, t_len) = (posteriors.q_len(), posteriors.t_len());
    hit.query_profile = vec![0f64; q_len + 1];
    hit.template_profile = vec![0f64; t_len + 1];
    for i in window.i_min..=window.i_max {
        let row = &posteriors.row(i)[window.j_min..=window.j_max];
        hit.query_profile[i] = row.iter().sum();
        for (j, p) in row.iter().enumerate() {
            hit.template_profile[j + window.j_min] += p;
        }
    }
    debug!(
        "RESTORE\t{}\t{}-{}\t{}-{}\t{:.3}\t{:.3}",
        hit.name, hit.i1, hit.i2, hit.j1, hit.j2, hit.sum_of_probs, hit.mac_score
    );
    hit.alternatives.push(alignment);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::Alignment;
    #[test]
    fn profiles_are_marginals() {
        let mut posteriors = PosteriorMatrix::new(2, 3);
        posteriors.set(1, 1, 0.5);
        posteriors.set(1, 2, 0.25);
        posteriors.set(2, 2, 0.5);
        posteriors.set(2, 3, 0.125);
        let trace = Trace {
            alignment: Alignment::diagonal(1, 1, 2),
            posteriors: vec![0.5, 0.5],
            scores: vec![1f64, 2f64],
            mac_score: 3.2,
        };
        let window = Window {
            i_min: 1,
            i_max: 2,
            j_min: 1,
            j_max: 3,
        };
        let mut hit = Hit::new("t", 1, Alignment::diagonal(2, 2, 1));
        write_back(&mut hit, &posteriors, trace, &window);
        assert_eq!(hit.query_profile, vec![0f64, 0.75, 0.625]);
        assert_eq!(hit.template_profile, vec![0f64, 0.5, 0.75, 0.125]);
        assert_eq!((hit.i1, hit.j1, hit.i2, hit.j2), (1, 1, 2, 2));
        assert_eq!(hit.sum_of_probs, 1f64);
        assert_eq!(hit.column_scores, vec![1f64, 2f64]);
        assert_eq!(hit.mac_score, 3.2);
        assert_eq!(hit.alternatives, vec![Alignment::diagonal(1, 1, 2)]);
    }
}

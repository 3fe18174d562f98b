use serde::{Deserialize, Serialize};

/// Alignment operation of a step, from the viewpoint of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Query column i is aligned to template column j.
    Match,
    /// Query column i is aligned to a gap.
    Ins,
    /// Template column j is aligned to a gap.
    Del,
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        let op = match self {
            Op::Match => 'M',
            Op::Ins => 'I',
            Op::Del => 'D',
        };
        f.write_char(op)
    }
}

/// Render an alignment path into three lines: query, match line, template.
/// `qs` and `ts` are the consensus sequences, `path` is a sequence of (i, j, op) with 1-based columns.
pub fn recover<I>(qs: &[u8], ts: &[u8], path: I) -> (Vec<u8>, Vec<u8>, Vec<u8>)
where
    I: std::iter::IntoIterator<Item = (usize, usize, Op)>,
{
    let (mut qr, mut tr, mut aln) = (vec![], vec![], vec![]);
    for (i, j, op) in path {
        match op {
            Op::Match => {
                qr.push(qs[i - 1]);
                tr.push(ts[j - 1]);
                if qs[i - 1].eq_ignore_ascii_case(&ts[j - 1]) {
                    aln.push(b'|');
                } else {
                    aln.push(b'+');
                }
            }
            Op::Ins => {
                qr.push(qs[i - 1]);
                aln.push(b' ');
                tr.push(b'-');
            }
            Op::Del => {
                qr.push(b'-');
                aln.push(b' ');
                tr.push(ts[j - 1]);
            }
        }
    }
    (qr, aln, tr)
}

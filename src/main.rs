use clap::{App, Arg};
use macrealign::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
#[macro_use]
extern crate log;

fn arguments() -> App<'static, 'static> {
    App::new("macrealign")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Realign a synthetic query against a template holding its mutated copies.")
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Debug mode"),
        )
        .arg(
            Arg::with_name("length")
                .long("length")
                .short("l")
                .takes_value(true)
                .default_value("100")
                .help("Length of the query."),
        )
        .arg(
            Arg::with_name("copies")
                .long("copies")
                .takes_value(true)
                .default_value("2")
                .help("Number of the copies of the query in the template."),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .default_value("32389")
                .help("Seed"),
        )
        .arg(
            Arg::with_name("mact")
                .long("mact")
                .takes_value(true)
                .default_value("0.3501")
                .help("Posterior probability threshold of the MAC alignment."),
        )
        .arg(
            Arg::with_name("shift")
                .long("shift")
                .takes_value(true)
                .default_value("-0.03")
                .help("Score offset per matched column, in bits."),
        )
        .arg(
            Arg::with_name("corr")
                .long("corr")
                .takes_value(true)
                .default_value("0.1")
                .help("Weight of the correlation of neighboring columns."),
        )
        .arg(
            Arg::with_name("min_overlap")
                .long("min_overlap")
                .takes_value(true)
                .default_value("0")
                .help("Minimum overlap of the local alignments."),
        )
        .arg(
            Arg::with_name("global")
                .long("global")
                .help("Global alignment instead of local alignment."),
        )
}

fn parse<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str) -> T {
    match matches.value_of(name).and_then(|e| e.parse().ok()) {
        Some(value) => value,
        None => {
            eprintln!("Invalid value for --{}", name);
            std::process::exit(1);
        }
    }
}

fn main() -> std::io::Result<()> {
    let matches = arguments().get_matches();
    let level = match matches.occurrences_of("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    let length: usize = parse(&matches, "length");
    let copies: usize = parse(&matches, "copies");
    let seed: u64 = parse(&matches, "seed");
    let config = RealignConfig::new(
        parse(&matches, "min_overlap"),
        parse(&matches, "shift"),
        parse(&matches, "mact"),
        parse(&matches, "corr"),
    );
    let local = !matches.is_present("global");
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
    let query = gen_seq::generate_residues(&mut rng, length);
    let mut template = vec![];
    for _ in 0..copies {
        let spacer = gen_seq::generate_residues(&mut rng, length / 5);
        template.extend(spacer);
        template.extend(gen_seq::introduce_randomness(&query, &mut rng, &gen_seq::PROFILE));
    }
    let query = gen_seq::profile_from_residues("query", &query, 0.8);
    let template = gen_seq::profile_from_residues("template", &template, 0.8)
        .to_template_odds(&profile::UNIFORM_BACKGROUND);
    debug!("Query:{}\tTemplate:{}", query.len(), template.len());
    let max_res = query.len().max(template.len());
    let mut decoder = PosteriorDecoder::new(max_res, local);
    let mut posteriors = PosteriorMatrix::new(query.len(), template.len());
    let mut matrix = BacktraceMatrix::new(query.len(), template.len());
    let mut hit = Hit::new(&template.name, 1, Alignment::new());
    use std::io::Write;
    let stdout = std::io::stdout();
    let mut wtr = std::io::BufWriter::new(stdout.lock());
    for irep in 1..=copies {
        hit.irep = irep;
        match decoder.realign(&query, &template, &mut hit, &mut posteriors, &mut matrix, &config) {
            Ok(_) => {}
            Err(why) if why.is_no_alignment() => {
                info!("{}", why);
                break;
            }
            Err(why) => {
                eprintln!("{}", why);
                std::process::exit(1);
            }
        }
        writeln!(
            &mut wtr,
            "No {}\tQuery {}-{}\tTemplate {}-{}\tCols {}\tSumProbs {:.2}\tMAC {:.2}\tForward {:.2}",
            irep,
            hit.i1,
            hit.i2,
            hit.j1,
            hit.j2,
            hit.matched_cols,
            hit.sum_of_probs,
            hit.mac_score,
            hit.forward_log2,
        )?;
        let (qr, aln, tr) = op::recover(&query.consensus, &template.consensus, hit.alignment.steps());
        for ((qr, aln), tr) in qr.chunks(80).zip(aln.chunks(80)).zip(tr.chunks(80)) {
            writeln!(&mut wtr, "{}", String::from_utf8_lossy(qr))?;
            writeln!(&mut wtr, "{}", String::from_utf8_lossy(aln))?;
            writeln!(&mut wtr, "{}\n", String::from_utf8_lossy(tr))?;
        }
    }
    Ok(())
}

//! CHSH game experiments: strategy comparison, noise sweep and optimal-angle
//! survey.
//!
//! ```text
//! chsh-sim [--quick] [--seed N] [--only comparison|sweep|survey] [OUT_DIR]
//! ```
//!
//! With `OUT_DIR` the reports go to `classicalComparison.txt`,
//! `imperfectPreparation.txt` and `optimalAngles.txt` inside it; otherwise
//! everything is written to stdout. Log level comes from `RUST_LOG`.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use chsh_game_sim::experiment::{self, ExperimentConfig};
use chsh_game_sim::report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Comparison,
    Sweep,
    Survey,
}

impl Section {
    const ALL: [Section; 3] = [Section::Survey, Section::Comparison, Section::Sweep];

    fn parse(name: &str) -> Result<Self> {
        match name {
            "comparison" => Ok(Section::Comparison),
            "sweep" => Ok(Section::Sweep),
            "survey" => Ok(Section::Survey),
            other => bail!("unknown section {:?} (expected comparison, sweep or survey)", other),
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            Section::Comparison => "classicalComparison.txt",
            Section::Sweep => "imperfectPreparation.txt",
            Section::Survey => "optimalAngles.txt",
        }
    }
}

struct Args {
    config: ExperimentConfig,
    sections: Vec<Section>,
    out_dir: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut config = ExperimentConfig::full();
    let mut sections = Section::ALL.to_vec();
    let mut out_dir = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--quick" => {
                let seed = config.seed;
                config = ExperimentConfig::quick();
                config.seed = seed;
            }
            "--seed" => {
                let value = args.next().context("--seed needs a value")?;
                config.seed = Some(value.parse().with_context(|| format!("bad seed {:?}", value))?);
            }
            "--only" => {
                let value = args.next().context("--only needs a section name")?;
                sections = vec![Section::parse(&value)?];
            }
            flag if flag.starts_with("--") => bail!("unknown flag {}", flag),
            dir => out_dir = Some(PathBuf::from(dir)),
        }
    }

    Ok(Args {
        config,
        sections,
        out_dir,
    })
}

fn open_output(out_dir: Option<&Path>, section: Section) -> Result<Box<dyn Write>> {
    match out_dir {
        Some(dir) => {
            let path = dir.join(section.file_name());
            let file = File::create(&path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn run_section(
    section: Section,
    config: &ExperimentConfig,
    rng: &mut StdRng,
    out: &mut dyn Write,
) -> Result<()> {
    match section {
        Section::Survey => {
            let entries = experiment::optimal_angle_survey(
                &config.survey_rates,
                config.search_games,
                config.games,
                &config.optimizer,
                rng,
            )?;
            report::write_angle_survey(out, &entries)?;
        }
        Section::Comparison => {
            let rows = experiment::compare_strategies(config.games, rng)?;
            report::write_comparison(out, &rows)?;
        }
        Section::Sweep => {
            let points =
                experiment::noise_sweep(config.sweep_angles, &config.sweep_rates, config.games, rng)?;
            if let Some(err) = experiment::estimate_break_even(&points, 0.75) {
                log::info!("quantum advantage over the classical bound lost near err = {:.4}", err);
            }
            report::write_noise_sweep(out, &points)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let seed = args.config.seed.unwrap_or_else(rand::random);
    log::info!(
        "seed {}, {} games per run, {} per objective evaluation",
        seed,
        args.config.games,
        args.config.search_games
    );
    let mut rng = StdRng::seed_from_u64(seed);

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }

    for &section in &args.sections {
        let start = Instant::now();
        let mut out = open_output(args.out_dir.as_deref(), section)?;
        run_section(section, &args.config, &mut rng, &mut *out)
            .with_context(|| format!("{:?} experiment failed", section))?;
        out.flush()?;
        log::info!("{:?} finished in {:.1?}", section, start.elapsed());
    }
    Ok(())
}

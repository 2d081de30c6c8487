use std::{
    collections::HashSet,
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::{Path, PathBuf},
    str::FromStr,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;

use refrain::codec::{encode, Problem};
use refrain::dot::write_dot;
use refrain::loader::{InputFormat, ProblemSource, ProblemTextLoader};
use refrain::{Refrain, SuffixAutomaton, SuffixIndex, SuffixTree};

/// Index used to find the refrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    Automaton,
    Tree,
}

impl Backend {
    fn other(self) -> Self {
        match self {
            Self::Automaton => Self::Tree,
            Self::Tree => Self::Automaton,
        }
    }
}

impl FromStr for Backend {
    type Err = &'static str;

    fn from_str(backend: &str) -> Result<Self, Self::Err> {
        match backend {
            "automaton" => Ok(Self::Automaton),
            "tree" => Ok(Self::Tree),
            _ => Err("Invalid backend, expected `automaton` or `tree`"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Problem files: `n m` followed by n symbols in 1..=m. Reads stdin when empty
    inputs: Vec<PathBuf>,

    /// Index to build: `automaton` or `tree`
    #[arg(short, long, default_value = "tree")]
    backend: Backend,

    /// Input format: `plain`, `gzip` or `zstd`. Inferred from the extension when omitted
    #[arg(short, long)]
    format: Option<InputFormat>,

    /// Print one JSON object per input instead of the problem format
    #[arg(long)]
    json: bool,

    /// Directory receiving a Graphviz rendering of each index
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Also solve with the other backend and fail if the values differ
    #[arg(long)]
    verify: bool,

    /// Verbose/info output (default: quiet)
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Debug output
    #[arg(long)]
    debug: bool,
}

/// A problem together with where it came from.
struct Input {
    name: String,
    problem: Problem,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug {
        log::LevelFilter::Debug
    } else if args.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Error
    };
    env_logger::Builder::new().filter_level(log_level).init();

    if let Err(error) = run(&args) {
        eprintln!("Error: {error:?}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    if let Some(dir) = &args.dot {
        check_dot_names(&args.inputs)?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    if args.inputs.is_empty() {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read stdin")?;
        let input = Input {
            name: "stdin".to_string(),
            problem: ProblemTextLoader::new(&buffer).load()?,
        };
        let refrain = solve(&input, args)?;
        return print(&input, &refrain, args.json);
    }

    let progress = if args.verbose && args.inputs.len() > 1 {
        let pb = ProgressBar::new(args.inputs.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("[{elapsed}/{eta}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
                .context("Invalid progress bar template")?,
        );
        Some(pb)
    } else {
        None
    };

    // Solve each file in parallel, then print in input order.
    let results: Vec<Result<(Input, Refrain)>> = args
        .inputs
        .par_iter()
        .map(|path| {
            let input = load(path, args.format)?;
            let refrain = solve(&input, args)?;
            if let Some(pb) = &progress {
                pb.inc(1);
                pb.set_message(input.name.clone());
            }
            Ok((input, refrain))
        })
        .collect();

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    for result in results {
        let (input, refrain) = result?;
        print(&input, &refrain, args.json)?;
    }
    Ok(())
}

fn load(path: &Path, format: Option<InputFormat>) -> Result<Input> {
    let format = format.unwrap_or_else(|| InputFormat::infer(path));
    debug!("Loading {} as {:?}", path.display(), format);

    Ok(Input {
        name: path.display().to_string(),
        problem: format.loader(path).load()?,
    })
}

fn solve(input: &Input, args: &Args) -> Result<Refrain> {
    let refrain = solve_with(input, args.backend, args.dot.as_deref())?;

    if args.verify {
        let other = solve_with(input, args.backend.other(), None)?;
        if other.value != refrain.value {
            bail!(
                "{}: {:?} found value {} but {:?} found {}",
                input.name,
                args.backend,
                refrain.value,
                args.backend.other(),
                other.value
            );
        }
        info!("{}: verified against {:?}", input.name, args.backend.other());
    }
    Ok(refrain)
}

fn solve_with(input: &Input, backend: Backend, dot: Option<&Path>) -> Result<Refrain> {
    let text = &input.problem.text;
    let start = Instant::now();

    let refrain = match backend {
        Backend::Automaton => {
            let automaton = SuffixAutomaton::from_text(text)?;
            export(&automaton, &input.name, dot)?;
            Refrain::find(&automaton)?
        }
        Backend::Tree => {
            let tree = SuffixTree::new(text)?;
            export(&tree, &input.name, dot)?;
            Refrain::find(&tree)?
        }
    };

    info!(
        "{}: {} symbols, {:?} refrain value {} (length {}) in {:?}",
        input.name,
        text.len(),
        backend,
        refrain.value,
        refrain.len(),
        start.elapsed()
    );
    Ok(refrain)
}

/// Write `<dir>/<input stem>.dot` when a directory is given.
fn export<I: SuffixIndex<u32>>(index: &I, name: &str, dir: Option<&Path>) -> Result<()> {
    let Some(dir) = dir else {
        return Ok(());
    };

    let path = dir.join(format!("{}.dot", dot_stem(Path::new(name))));
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    write_dot(index, &mut writer)?;
    writer.flush()?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn dot_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("stdin")
}

/// Inputs are exported in parallel, so two sharing a stem would write the
/// same file.
fn check_dot_names(inputs: &[PathBuf]) -> Result<()> {
    let mut seen = HashSet::new();
    for path in inputs {
        let stem = dot_stem(path);
        if !seen.insert(stem) {
            bail!(
                "{} would overwrite another input's {}.dot; rename one of them",
                path.display(),
                stem
            );
        }
    }
    Ok(())
}

fn print(input: &Input, refrain: &Refrain, json: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let row = serde_json::json!({
            "input": input.name,
            "alphabet_size": input.problem.alphabet_size,
            "value": refrain.value,
            "substring": refrain.substring,
        });
        writeln!(out, "{}", row)?;
    } else {
        encode(refrain, &mut out)?;
    }
    Ok(())
}

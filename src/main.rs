use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, error, info, warn};

use jackc::{Compiler, collect_units, output_path};

mod jackc;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// A .jack file or a directory of .jack files
    #[arg(value_name = "PATH", default_value = ".")]
    input: PathBuf,

    /// Turn debugging information on (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbosity: u8,

    /// Sets the output file, only valid for a single source file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Compile one unit into `output` and flush it. A compile error is reported
/// in preference to a failed flush.
fn compile_stream(
    compiler: &mut Compiler,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> Result<usize> {
    let result = compiler.compile_unit(input, output);
    let flushed = output.flush();

    let count = result?;
    flushed?;
    Ok(count)
}

fn compile_file(compiler: &mut Compiler, input: &Path, output: &Path) -> Result<usize> {
    let file = File::open(input).with_context(|| format!("cannot open {}", input.display()))?;
    let mut input_stream = BufReader::new(file);

    let file = File::create(output).with_context(|| format!("cannot create {}", output.display()))?;
    let mut output_stream = BufWriter::new(file);

    compile_stream(compiler, &mut input_stream, &mut output_stream)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbosity);

    let units = collect_units(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;

    if cli.output.is_some() && cli.input.is_dir() {
        bail!("--output can only be used with a single source file");
    }
    if units.is_empty() {
        warn!("no .jack files found in {}", cli.input.display());
        return Ok(());
    }

    let mut compiler = Compiler::new();
    let mut failed = 0;

    for unit in &units {
        let output = cli.output.clone().unwrap_or_else(|| output_path(unit));
        match compile_file(&mut compiler, unit, &output) {
            Ok(count) => info!(
                "{} -> {} compiled successfully ({} instructions)",
                unit.display(),
                output.display(),
                count
            ),
            Err(err) => {
                failed += 1;
                error!("{} compilation failed: {:#}", unit.display(), err);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} files failed to compile", failed, units.len());
    }
    Ok(())
}

//! burg command-line entry point.
//!
//! Reads a grammar specification and writes the generated matcher
//! module to the output file, or standard output by default.

use burg::codegen::BurgGenerator;
use burg::parser::parse_spec;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "burg")]
#[command(about = "Bottom-up rewrite system generator", long_about = None)]
struct Cli {
    /// Grammar specification file
    source: PathBuf,

    /// Output file (defaults to standard output)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(&cli.source)?;
    let system = parse_spec(&source)?;
    let code = BurgGenerator::new(&system).generate();

    match &cli.output {
        Some(path) => std::fs::write(path, code)?,
        None => print!("{code}"),
    }
    Ok(())
}

//! gridplot command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use gridplot::application::{self, ConvertRequest, autotest};
use gridplot::domain::graph::GraphOptions;
use gridplot::domain::phases::MarkerShape;
use gridplot::infra::layout::Layout;
use gridplot::infra::render::{PlotOptions, ShapePolicy};

const E_OK: u8 = 0;
const E_FAILED: u8 = 1;
const E_SYNTAX: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "gridplot")]
#[command(version)]
#[command(about = "Convert a GridLAB-D model to a network plot image")]
#[command(
    long_about = "Generate a network plot from a GLM or JSON model file. The power base \
sets the link width scale: a link carrying no power is drawn at width 1, and each \
factor of ten relative to the base adds one. Non-JSON inputs are converted with the \
external 'gridlabd' executable first. Without an input file, a 'autotest' folder under \
the working directory triggers batch validation into validate.txt."
)]
struct Args {
    /// Input model file (GLM or JSON)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output image file (defaults to the input file with a .png extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Power base used to scale link widths
    #[arg(short = 'B', long, default_value_t = 1e3)]
    base: f64,

    /// Layout method (kamada_kawai, spring, circular, shell, random)
    #[arg(short = 'L', long, default_value_t = Layout::KamadaKawai)]
    layout: Layout,

    /// Force a uniform node shape (round, triangle-up, triangle-down)
    #[arg(short = 'N', long)]
    nodeshape: Option<MarkerShape>,

    /// Node marker size
    #[arg(short = 'Z', long, default_value_t = 25)]
    nodesize: u32,

    /// Show the image after rendering
    #[arg(short = 'S', long)]
    show: bool,

    /// Activity timeout for the model converter, in seconds
    #[arg(short = 't', long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Add a plot title (the input file name unless TEXT is given)
    #[arg(short = 'T', long, value_name = "TEXT")]
    title: Option<Option<String>>,

    /// Working directory
    #[arg(short = 'W', long, default_value = ".")]
    workdir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("ERROR [gridplot]: {err:#}");
            ExitCode::from(E_FAILED)
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    anyhow::ensure!(
        args.base > 0.0 && args.base.is_finite(),
        "power base must be a positive number"
    );

    let graph = GraphOptions {
        power_base: args.base,
    };
    let plot = PlotOptions {
        layout: args.layout,
        node_size: args.nodesize,
        shape: match args.nodeshape {
            Some(marker) => ShapePolicy::Uniform(marker),
            None => ShapePolicy::PerNode,
        },
        ..PlotOptions::default()
    };
    let timeout = args.timeout.map(Duration::from_secs);

    let Some(input) = args.input else {
        let testdir = args.workdir.join("autotest");
        if testdir.is_dir() {
            println!("Validating in folder {}", testdir.display());
            let report = autotest::run(&args.workdir, timeout, &graph, &plot)?;
            let code = if report.failed > 0 { E_FAILED } else { E_OK };
            return Ok(ExitCode::from(code));
        }
        println!("Syntax: gridplot [OPTIONS ...]");
        return Ok(ExitCode::from(E_SYNTAX));
    };

    let title = args.title.map(|title| match title {
        Some(text) => text,
        None => input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    });

    application::convert(&ConvertRequest {
        input,
        output: args.output,
        show: args.show,
        workdir: args.workdir,
        timeout,
        graph,
        plot: PlotOptions { title, ..plot },
    })?;

    Ok(ExitCode::from(E_OK))
}

//! Batch validation over a folder of GLM models.
//!
//! With no input file and an `autotest` folder under the working
//! directory, every `.glm` file in it is converted to an image. Per-file
//! results, including captured converter output, land in `validate.txt`;
//! a summary with the pass percentage goes to stdout. Files that already
//! have an image are counted as tested and skipped.

use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::{ConvertRequest, convert};
use crate::domain::graph::GraphOptions;
use crate::infra::render::PlotOptions;

/// Name of the per-run report written into the working directory.
pub const REPORT_FILE: &str = "validate.txt";

/// Tally of one validation run.
#[derive(Debug, Default, Clone, Copy)]
pub struct Report {
    pub tested: usize,
    pub failed: usize,
}

impl Report {
    pub fn pass_rate(&self) -> f64 {
        if self.tested == 0 {
            100.0
        } else {
            100.0 - (100.0 * self.failed as f64) / self.tested as f64
        }
    }
}

/// Convert every GLM model under `<workdir>/autotest`.
pub fn run(
    workdir: &Path,
    timeout: Option<Duration>,
    graph: &GraphOptions,
    plot: &PlotOptions,
) -> Result<Report> {
    let testdir = workdir.join("autotest");
    let report_path = workdir.join(REPORT_FILE);
    let mut report_file = File::create(&report_path)
        .with_context(|| format!("creating '{}'", report_path.display()))?;

    let mut files: Vec<String> = std::fs::read_dir(&testdir)
        .with_context(|| format!("reading '{}'", testdir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".glm"))
        .collect();
    files.sort();

    let mut report = Report::default();
    for file in files {
        print!("Testing {file}... ");
        let _ = std::io::stdout().flush();

        let output = testdir.join(&file).with_extension("png");
        if output.exists() {
            println!("FOUND");
            report.tested += 1;
            continue;
        }

        let request = ConvertRequest {
            input: PathBuf::from(&file),
            output: Some(output),
            show: false,
            workdir: testdir.clone(),
            timeout,
            graph: graph.clone(),
            plot: plot.clone(),
        };

        match convert(&request) {
            Ok(outcome) => {
                println!("OK");
                writeln!(
                    report_file,
                    "*** TEST {file} OK\n{}",
                    outcome.converter_output.unwrap_or_default()
                )?;
            }
            Err(err) => {
                println!("FAILED");
                writeln!(report_file, "*** TEST {file} FAILED\n{err:#}")?;
                report.failed += 1;
            }
        }
        writeln!(report_file)?;
        report.tested += 1;
    }

    println!("{} tested", report.tested);
    println!("{} failed", report.failed);
    println!("{:.0}% passing", report.pass_rate());

    Ok(report)
}

//! Conversion orchestration: load, build, lay out, draw, save.

pub mod autotest;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::domain::graph::{self, GraphOptions};
use crate::infra::loader::Loader;
use crate::infra::render::{self, PlotOptions};
use crate::infra::viewer;

/// Everything one conversion needs, passed explicitly. There is no
/// process-wide configuration; two requests never interfere.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    /// Input model file, resolved against `workdir` when relative.
    pub input: PathBuf,
    /// Output image, used as given. Defaults to the input file with a
    /// `.png` extension when unset and not showing.
    pub output: Option<PathBuf>,
    /// Open the image with the platform viewer after rendering.
    pub show: bool,
    pub workdir: PathBuf,
    /// Activity timeout for the model converter.
    pub timeout: Option<Duration>,
    pub graph: GraphOptions,
    pub plot: PlotOptions,
}

/// What a conversion produced.
#[derive(Debug)]
pub struct ConvertOutcome {
    /// The image written, when one was.
    pub output: Option<PathBuf>,
    /// Captured converter output, when a GLM conversion ran.
    pub converter_output: Option<String>,
}

/// Run one model-to-image conversion.
pub fn convert(request: &ConvertRequest) -> Result<ConvertOutcome> {
    let loader = Loader::new(&request.workdir, request.timeout);
    let loaded = loader
        .load(&request.input)
        .with_context(|| format!("loading model '{}'", request.input.display()))?;

    let network = graph::build_graph(&loaded.model, &request.graph)
        .with_context(|| format!("building network graph for '{}'", request.input.display()))?;
    log::info!(
        "built graph with {} nodes and {} edges",
        network.node_count(),
        network.edge_count()
    );

    let positions = request.plot.layout.positions(&network);
    let svg = render::to_svg(&network, &positions, &request.plot)?;

    let output = match (&request.output, request.show) {
        (Some(path), _) => Some(path.clone()),
        (None, false) => Some(loaded.json_path.with_extension("png")),
        (None, true) => None,
    };

    if let Some(path) = &output {
        render::save_png(&svg, path).with_context(|| format!("writing '{}'", path.display()))?;
        log::info!("wrote {}", path.display());
    }

    if request.show {
        let shown = match &output {
            Some(path) => path.clone(),
            None => {
                // Showing without saving still needs a file for the viewer.
                let name = request
                    .input
                    .with_extension("png")
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("gridplot.png"));
                let path = std::env::temp_dir().join(name);
                render::save_png(&svg, &path)
                    .with_context(|| format!("writing '{}'", path.display()))?;
                path
            }
        };
        viewer::open(&shown).with_context(|| format!("showing '{}'", shown.display()))?;
    }

    Ok(ConvertOutcome {
        output,
        converter_output: loaded.converter_output,
    })
}

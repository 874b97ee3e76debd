//! Model loading.
//!
//! JSON documents are read directly; anything else is assumed to be a GLM
//! model and converted first by the external `gridlabd` executable
//! (`gridlabd -W <workdir> -I <input> -o <json>`). Converter output is
//! captured and returned so batch validation can log it per file.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::domain::model::ParsedModel;
use crate::infra::shell;

/// Name of the external model converter.
pub const CONVERTER: &str = "gridlabd";

/// Errors raised while loading a model document.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("'gridlabd' executable not found on PATH")]
    ConverterMissing,

    #[error("converting '{input}' failed:\n{output}")]
    ConverterFailed { input: String, output: String },

    #[error("converting '{input}' timed out after {seconds}s")]
    ConverterTimeout { input: String, seconds: u64 },

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not a valid model document: {source}")]
    BadDocument {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A loaded model plus the provenance the caller may want to report.
#[derive(Debug)]
pub struct LoadedModel {
    pub model: ParsedModel,
    /// The JSON document actually parsed (the conversion product for GLM
    /// inputs).
    pub json_path: PathBuf,
    /// Captured converter stdout/stderr, when a conversion ran.
    pub converter_output: Option<String>,
}

/// Loads model documents relative to a working directory, converting
/// non-JSON inputs with an optional activity timeout.
#[derive(Debug, Clone)]
pub struct Loader {
    workdir: PathBuf,
    timeout: Option<Duration>,
}

impl Loader {
    pub fn new(workdir: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            workdir: workdir.into(),
            timeout,
        }
    }

    pub fn load(&self, input: &Path) -> Result<LoadedModel, LoaderError> {
        let input_abs = self.resolve(input);

        let (json_path, converter_output) = if is_json(input) {
            (input_abs, None)
        } else {
            let json_path = input_abs.with_extension("json");
            let output = self.convert(input, &json_path)?;
            (json_path, Some(output))
        };

        let text = std::fs::read_to_string(&json_path).map_err(|source| LoaderError::Io {
            path: json_path.display().to_string(),
            source,
        })?;
        let model = serde_json::from_str(&text).map_err(|source| LoaderError::BadDocument {
            path: json_path.display().to_string(),
            source,
        })?;

        Ok(LoadedModel {
            model,
            json_path,
            converter_output,
        })
    }

    /// Relative inputs are resolved against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workdir.join(path)
        }
    }

    fn convert(&self, input: &Path, json_path: &Path) -> Result<String, LoaderError> {
        let bin = shell::find_bin(CONVERTER).ok_or(LoaderError::ConverterMissing)?;
        log::info!(
            "converting {} to {}",
            input.display(),
            json_path.display()
        );

        let child = Command::new(&bin)
            .arg("-W")
            .arg(&self.workdir)
            .arg("-I")
            .arg(input)
            .arg("-o")
            .arg(json_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| LoaderError::Io {
                path: bin.display().to_string(),
                source,
            })?;

        self.wait_for_converter(child, input)
    }

    fn wait_for_converter(&self, mut child: Child, input: &Path) -> Result<String, LoaderError> {
        // Both pipes are drained on reader threads so a chatty converter
        // cannot fill a pipe buffer and stall the wait loop.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let out_reader = std::thread::spawn(move || read_all(stdout));
        let err_reader = std::thread::spawn(move || read_all(stderr));

        let status = match self.timeout {
            None => child.wait().map_err(|source| LoaderError::Io {
                path: input.display().to_string(),
                source,
            })?,
            Some(limit) => {
                let deadline = Instant::now() + limit;
                loop {
                    let polled = child.try_wait().map_err(|source| LoaderError::Io {
                        path: input.display().to_string(),
                        source,
                    })?;
                    if let Some(status) = polled {
                        break status;
                    }
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(LoaderError::ConverterTimeout {
                            input: input.display().to_string(),
                            seconds: limit.as_secs(),
                        });
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
            }
        };

        let mut output = out_reader.join().unwrap_or_default();
        output.push_str(&err_reader.join().unwrap_or_default());

        if status.success() {
            Ok(output)
        } else {
            Err(LoaderError::ConverterFailed {
                input: input.display().to_string(),
                output,
            })
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn read_all(pipe: Option<impl Read>) -> String {
    let mut text = String::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_string(&mut text);
    }
    text
}

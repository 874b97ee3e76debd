//! End-to-end conversion tests over JSON model documents.

use std::path::{Path, PathBuf};

use serde_json::json;

use gridplot::application::{ConvertRequest, convert};
use gridplot::domain::graph::GraphOptions;
use gridplot::infra::layout::Layout;
use gridplot::infra::render::PlotOptions;

fn write_feeder(dir: &Path) -> PathBuf {
    let path = dir.join("feeder.json");
    std::fs::write(
        &path,
        json!({
            "objects": {
                "n1": {"id": 1, "phases": "ABC"},
                "n2": {"id": 2, "phases": "AN"},
                "n3": {"id": 3, "phases": "BS"},
                "line1": {"id": 4, "from": "n1", "to": "n2", "phases": "A",
                          "power_out": "5000+120j VA"},
                "line2": {"id": 5, "from": "n2", "to": "n3", "phases": "B",
                          "power_out": "-350.5 VA"}
            }
        })
        .to_string(),
    )
    .unwrap();
    path
}

fn request(workdir: &Path, input: &str) -> ConvertRequest {
    ConvertRequest {
        input: PathBuf::from(input),
        output: None,
        show: false,
        workdir: workdir.to_path_buf(),
        timeout: None,
        graph: GraphOptions::default(),
        plot: PlotOptions::default(),
    }
}

#[test]
fn converts_a_json_model_to_png() {
    let dir = tempfile::tempdir().unwrap();
    write_feeder(dir.path());

    let outcome = convert(&request(dir.path(), "feeder.json")).unwrap();

    let output = outcome.output.expect("an image is written by default");
    assert_eq!(output, dir.path().join("feeder.png"));
    assert!(outcome.converter_output.is_none());

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
}

#[test]
fn explicit_output_paths_are_honored() {
    let dir = tempfile::tempdir().unwrap();
    write_feeder(dir.path());

    let target = dir.path().join("plots").join("custom.png");
    std::fs::create_dir(dir.path().join("plots")).unwrap();

    let outcome = convert(&ConvertRequest {
        output: Some(target.clone()),
        ..request(dir.path(), "feeder.json")
    })
    .unwrap();

    assert_eq!(outcome.output, Some(target.clone()));
    assert!(target.exists());
    assert!(!dir.path().join("feeder.png").exists());
}

#[test]
fn every_layout_renders_the_same_model() {
    let dir = tempfile::tempdir().unwrap();
    write_feeder(dir.path());

    for layout in ["kamada_kawai", "spring", "circular", "shell", "random"] {
        let output = dir.path().join(format!("{layout}.png"));
        convert(&ConvertRequest {
            output: Some(output.clone()),
            plot: PlotOptions {
                layout: layout.parse::<Layout>().unwrap(),
                title: Some(layout.to_string()),
                ..PlotOptions::default()
            },
            ..request(dir.path(), "feeder.json")
        })
        .unwrap();
        assert!(output.exists(), "{layout} produced no image");
    }
}

#[test]
fn defective_models_abort_without_output() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("broken.json"),
        json!({
            "objects": {
                "n1": {"phases": "A"},
                "n2": {"id": 2, "phases": "A"},
                "l": {"id": 3, "from": "n1", "to": "n2", "phases": "A",
                      "power_out": "1 VA"}
            }
        })
        .to_string(),
    )
    .unwrap();

    let err = convert(&request(dir.path(), "broken.json")).unwrap_err();
    assert!(format!("{err:#}").contains("'n1' has no 'id' field"));
    assert!(!dir.path().join("broken.png").exists());
}

#[test]
fn missing_inputs_fail_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let err = convert(&request(dir.path(), "absent.json")).unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"));
}

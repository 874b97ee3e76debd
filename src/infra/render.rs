//! Drawing: SVG emission for a laid-out graph, and rasterization to PNG.
//!
//! Edges are drawn first so node markers sit on top of the lines, the way
//! network plots are usually read. Edge stroke width carries the power
//! weight; all other styling comes straight from the attributes the graph
//! builder attached.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use thiserror::Error;

use crate::domain::graph::NetworkGraph;
use crate::domain::phases::MarkerShape;
use crate::infra::layout::Layout;

/// Canvas border around the drawing, in pixels.
const MARGIN: f32 = 40.0;

/// Marker sizes and stroke widths are given in points; the canvas is laid
/// out at 100 dpi.
const PX_PER_POINT: f32 = 100.0 / 72.0;

/// How node markers are chosen at draw time.
///
/// The graph builder always attaches a phase-derived marker to every node;
/// this policy only decides whether the renderer honors it or applies one
/// marker uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapePolicy {
    /// Honor each node's phase-derived marker.
    #[default]
    PerNode,
    /// Draw every node with the same marker.
    Uniform(MarkerShape),
}

/// Rendering options, passed explicitly alongside the graph.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub layout: Layout,
    /// Marker size as an area in points squared.
    pub node_size: u32,
    pub shape: ShapePolicy,
    /// Title drawn above the plot.
    pub title: Option<String>,
    /// Canvas size in pixels.
    pub figsize: (u32, u32),
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            node_size: 25,
            shape: ShapePolicy::default(),
            title: None,
            figsize: (1000, 700),
        }
    }
}

/// Errors raised while drawing or saving the image.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("SVG generation failed: {0}")]
    Emit(String),

    #[error("SVG parsing error: {0}")]
    Parse(String),

    #[error("cannot allocate a {0}x{1} canvas")]
    Canvas(u32, u32),

    #[error("cannot write image: {0}")]
    Encode(String),
}

/// Emit the SVG document for a laid-out graph.
pub fn to_svg(
    graph: &NetworkGraph,
    positions: &[Vec2],
    options: &PlotOptions,
) -> Result<String, RenderError> {
    let (width, height) = options.figsize;
    let canvas = CanvasMap::new(positions, width as f32, height as f32);
    let mut out = String::new();

    writeln!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )
    .map_err(emit_err)?;
    writeln!(
        &mut out,
        r#"  <rect width="{width}" height="{height}" fill="white"/>"#
    )
    .map_err(emit_err)?;

    for edge in graph.edges() {
        let (Some(a), Some(b)) = (graph.index_of(&edge.from), graph.index_of(&edge.to)) else {
            continue;
        };
        let from = canvas.place(positions[a]);
        let to = canvas.place(positions[b]);
        writeln!(
            &mut out,
            r#"  <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.3}"/>"#,
            from.x,
            from.y,
            to.x,
            to.y,
            edge.color,
            edge.weight as f32 * PX_PER_POINT,
        )
        .map_err(emit_err)?;
    }

    let radius = (options.node_size as f32 / std::f32::consts::PI).sqrt() * PX_PER_POINT;
    for (node, position) in graph.nodes().iter().zip(positions) {
        let center = canvas.place(*position);
        let shape = match options.shape {
            ShapePolicy::PerNode => node.shape,
            ShapePolicy::Uniform(marker) => marker,
        };
        write_marker(&mut out, shape, center, radius, &node.color, node.edge_color)?;
    }

    if let Some(title) = &options.title {
        writeln!(
            &mut out,
            r#"  <text x="{:.1}" y="24" text-anchor="middle" font-family="sans-serif" font-size="16" fill="black">{}</text>"#,
            width as f32 / 2.0,
            escape_xml(title),
        )
        .map_err(emit_err)?;
    }

    writeln!(&mut out, "</svg>").map_err(emit_err)?;
    Ok(out)
}

/// Rasterize an SVG document and save it as PNG.
pub fn save_png(svg: &str, path: &Path) -> Result<(), RenderError> {
    let mut opts = usvg::Options::default();
    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();
    opts.fontdb = Arc::new(fontdb);

    let tree = usvg::Tree::from_str(svg, &opts).map_err(|e| RenderError::Parse(e.to_string()))?;
    let size = tree.size();
    let (width, height) = (size.width().ceil() as u32, size.height().ceil() as u32);

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(RenderError::Canvas(width, height))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    pixmap
        .save_png(path)
        .map_err(|e| RenderError::Encode(e.to_string()))
}

/// Maps abstract layout coordinates onto the pixel canvas. Axes are scaled
/// independently to fill the frame, with the y axis flipped for SVG.
struct CanvasMap {
    min: Vec2,
    scale: Vec2,
    offset: Vec2,
    height: f32,
}

impl CanvasMap {
    fn new(positions: &[Vec2], width: f32, height: f32) -> Self {
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for p in positions {
            min = min.min(*p);
            max = max.max(*p);
        }
        if positions.is_empty() {
            min = Vec2::ZERO;
            max = Vec2::ZERO;
        }

        let span = max - min;
        let frame = Vec2::new(width, height) - Vec2::splat(2.0 * MARGIN);
        let scale = Vec2::new(
            if span.x > f32::EPSILON { frame.x / span.x } else { 0.0 },
            if span.y > f32::EPSILON { frame.y / span.y } else { 0.0 },
        );
        // A zero span (single node, degenerate layout) collapses onto the
        // frame center.
        let offset = Vec2::new(
            if span.x > f32::EPSILON { 0.0 } else { frame.x / 2.0 },
            if span.y > f32::EPSILON { 0.0 } else { frame.y / 2.0 },
        );

        Self {
            min,
            scale,
            offset,
            height,
        }
    }

    fn place(&self, position: Vec2) -> Vec2 {
        let mapped = (position - self.min) * self.scale + self.offset + Vec2::splat(MARGIN);
        Vec2::new(mapped.x, self.height - mapped.y)
    }
}

fn write_marker(
    out: &mut String,
    shape: MarkerShape,
    center: Vec2,
    radius: f32,
    fill: &str,
    stroke: &str,
) -> Result<(), RenderError> {
    match shape {
        MarkerShape::Round => writeln!(
            out,
            r#"  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" stroke="{}" stroke-width="1"/>"#,
            center.x, center.y, radius, fill, stroke,
        )
        .map_err(emit_err),
        MarkerShape::TriangleUp | MarkerShape::TriangleDown => {
            // Vertices inscribed in the marker circle.
            let dy = if shape == MarkerShape::TriangleUp {
                radius
            } else {
                -radius
            };
            let half_width = radius * 3f32.sqrt() / 2.0;
            writeln!(
                out,
                r#"  <polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{}" stroke="{}" stroke-width="1"/>"#,
                center.x,
                center.y - dy,
                center.x - half_width,
                center.y + dy / 2.0,
                center.x + half_width,
                center.y + dy / 2.0,
                fill,
                stroke,
            )
            .map_err(emit_err)
        }
    }
}

fn emit_err(e: std::fmt::Error) -> RenderError {
    RenderError::Emit(e.to_string())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::{GraphOptions, build_graph};
    use crate::domain::model::ParsedModel;
    use serde_json::json;

    fn sample() -> NetworkGraph {
        let model: ParsedModel = serde_json::from_value(json!({
            "objects": {
                "n1": {"id": 1, "phases": "ABC"},
                "n2": {"id": 2, "phases": "ASN"},
                "link1": {"id": 3, "from": "n1", "to": "n2", "phases": "A",
                          "power_out": "5000 VA"}
            }
        }))
        .expect("valid model");
        build_graph(&model, &GraphOptions::default()).expect("valid graph")
    }

    fn assert_contains_all(text: &str, parts: &[&str]) {
        for part in parts {
            assert!(
                text.contains(part),
                "Expected output to contain '{part}', got:\n{text}"
            );
        }
    }

    #[test]
    fn svg_draws_every_node_and_edge() {
        let graph = sample();
        let positions = Layout::Circular.positions(&graph);
        let svg = to_svg(&graph, &positions, &PlotOptions::default()).unwrap();

        assert_eq!(svg.matches("<line ").count(), 1);
        // One triangle-down for n1, one circle for the service node n2.
        assert_eq!(svg.matches("<polygon ").count(), 1);
        assert_eq!(svg.matches("<circle ").count(), 1);
        assert_contains_all(
            &svg,
            &[
                r##"stroke="#ff0000""##,
                r#"fill="black""#,
                r##"fill="#ff0000""##,
                r#"stroke="white""#,
            ],
        );
    }

    #[test]
    fn uniform_shape_policy_overrides_markers() {
        let graph = sample();
        let positions = Layout::Circular.positions(&graph);
        let options = PlotOptions {
            shape: ShapePolicy::Uniform(MarkerShape::Round),
            ..PlotOptions::default()
        };
        let svg = to_svg(&graph, &positions, &options).unwrap();

        assert_eq!(svg.matches("<circle ").count(), 2);
        assert_eq!(svg.matches("<polygon ").count(), 0);
    }

    #[test]
    fn titles_are_escaped() {
        let graph = sample();
        let positions = Layout::Circular.positions(&graph);
        let options = PlotOptions {
            title: Some("feeder <13.2kV> & co".to_string()),
            ..PlotOptions::default()
        };
        let svg = to_svg(&graph, &positions, &options).unwrap();
        assert_contains_all(&svg, &["feeder &lt;13.2kV&gt; &amp; co"]);
    }

    #[test]
    fn edge_width_carries_the_weight() {
        let graph = sample();
        let positions = Layout::Circular.positions(&graph);
        let svg = to_svg(&graph, &positions, &PlotOptions::default()).unwrap();
        // weight = log10(15), drawn at 100/72 px per point.
        let expected = 15f64.log10() as f32 * PX_PER_POINT;
        assert_contains_all(&svg, &[&format!(r#"stroke-width="{expected:.3}""#)]);
    }

    #[test]
    fn rasterizes_to_png() {
        let graph = sample();
        let positions = Layout::KamadaKawai.positions(&graph);
        let svg = to_svg(&graph, &positions, &PlotOptions::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeder.png");
        save_png(&svg, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn empty_graphs_still_render() {
        let graph = NetworkGraph::default();
        let svg = to_svg(&graph, &[], &PlotOptions::default()).unwrap();
        assert_contains_all(&svg, &["<svg ", "</svg>"]);
    }
}

//! Visual encodings derived from phase strings.
//!
//! A phase string is a short string over the alphabet `{A,B,C,N,S,D}`:
//! phase letters A/B/C, neutral N, and the service markers S (single-phase
//! service) and D (delta). Nodes and links carry their own phase strings,
//! and every visual attribute of the plot is derived from them here.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fill color for a phase string.
///
/// Each phase letter contributes one full 8-bit channel: A → red, B →
/// green, C → blue. A fully-phased A+B+C string would come out white,
/// which is invisible on the canvas, so that single case reports the named
/// color "black" instead.
pub fn color(phases: &str) -> String {
    let r = if phases.contains('A') { 255 } else { 0 };
    let g = if phases.contains('B') { 255 } else { 0 };
    let b = if phases.contains('C') { 255 } else { 0 };
    if (r, g, b) == (255, 255, 255) {
        "black".to_string()
    } else {
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Outline color for a node marker: black when the node carries a neutral,
/// white otherwise.
pub fn edge_color(phases: &str) -> &'static str {
    if phases.contains('N') { "black" } else { "white" }
}

/// Marker drawn for a node. S takes precedence over D; plain phase nodes
/// fall back to the downward triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Round,
    TriangleUp,
    TriangleDown,
}

impl MarkerShape {
    pub fn for_phases(phases: &str) -> Self {
        if phases.contains('S') {
            MarkerShape::Round
        } else if phases.contains('D') {
            MarkerShape::TriangleUp
        } else {
            MarkerShape::TriangleDown
        }
    }
}

impl fmt::Display for MarkerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarkerShape::Round => "round",
            MarkerShape::TriangleUp => "triangle-up",
            MarkerShape::TriangleDown => "triangle-down",
        };
        f.write_str(name)
    }
}

/// Unrecognized marker name on the command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown node shape '{0}' (expected round, triangle-up, or triangle-down)")]
pub struct UnknownShape(String);

impl FromStr for MarkerShape {
    type Err = UnknownShape;

    /// Accepts both spelled-out names and the single-character marker codes
    /// GridLAB-D users know from matplotlib ("o", "^", "v").
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "o" | "round" | "circle" => Ok(MarkerShape::Round),
            "^" | "triangle-up" | "triangle_up" => Ok(MarkerShape::TriangleUp),
            "v" | "triangle-down" | "triangle_down" => Ok(MarkerShape::TriangleDown),
            _ => Err(UnknownShape(raw.to_string())),
        }
    }
}

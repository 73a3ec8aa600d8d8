//! Import a digitized outline from an SVG drawing.
//!
//! Points are read in document order from `<polyline>`/`<polygon>` `points`, from `M`/`L` commands in `<path d>`
//! (absolute or relative), and from `<circle>` centres, which is how a digitizer tends to mark individual dots.
//! SVG y grows downwards, so y is negated.

use std::fs::read_to_string;
use std::path::Path;

use log::debug;
use nalgebra::geometry::Point2;
use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{Error, Result};

pub fn load_outline(path: &Path) -> Result<Vec<Point2<f64>>> {
    let points = parse_outline(&read_to_string(path)?)?;
    debug!("Read {} outline points from {}", points.len(), path.display());
    Ok(points)
}

pub fn parse_outline(text: &str) -> Result<Vec<Point2<f64>>> {
    // Parse the svg xml using Roxmltree
    let doc = Document::parse_with_options(
        text,
        ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        },
    )?;

    let mut points = Vec::new();
    for n in doc.descendants().filter(|n| n.is_element()) {
        match n.tag_name().name() {
            "polyline" | "polygon" => {
                if let Some(attr) = n.attribute("points") {
                    points.extend(pairs(&numbers(attr)?)?);
                }
            }
            "path" => {
                if let Some(d) = n.attribute("d") {
                    points.extend(path_points(d)?);
                }
            }
            "circle" => points.push(Point2::new(number(&n, "cx")?, number(&n, "cy")?)),
            _ => {}
        }
    }

    if points.is_empty() {
        return Err(Error::NotEnoughPoints {
            operation: "outline import",
            needed: 1,
            found: 0,
        });
    }
    Ok(points.into_iter().map(|p| Point2::new(p.x, -p.y)).collect())
}

fn number(n: &Node, name: &str) -> Result<f64> {
    n.attribute(name)
        .unwrap_or("0")
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::Parse(format!("<{}> {name}: {e}", n.tag_name().name())))
}

fn numbers(s: &str) -> Result<Vec<f64>> {
    s.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f64>()
                .map_err(|e| Error::Parse(format!("bad coordinate '{t}': {e}")))
        })
        .collect()
}

fn pairs(values: &[f64]) -> Result<Vec<Point2<f64>>> {
    if values.len() % 2 != 0 {
        return Err(Error::Parse(format!(
            "odd number of coordinates ({})",
            values.len()
        )));
    }
    Ok(values
        .chunks_exact(2)
        .map(|c| Point2::new(c[0], c[1]))
        .collect())
}

/// Points visited by the move/line commands of a path. Anything else in the path is rejected.
fn path_points(d: &str) -> Result<Vec<Point2<f64>>> {
    // Separate command letters from numbers that follow them directly, e.g. "M10,20L30 40"
    let spaced: String = d
        .chars()
        .flat_map(|c| {
            if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
                vec![' ', c, ' ']
            } else {
                vec![c]
            }
        })
        .collect();

    let mut out = Vec::new();
    let mut relative = false;
    let mut current = Point2::new(0.0, 0.0);
    let mut pending: Option<f64> = None;
    for token in spaced.split(|c: char| c.is_whitespace() || c == ',') {
        match token {
            "" => {}
            "M" | "L" => relative = false,
            "m" | "l" => relative = true,
            "Z" | "z" => {}
            t => {
                let v = t
                    .parse::<f64>()
                    .map_err(|e| Error::Parse(format!("unsupported path token '{t}': {e}")))?;
                match pending.take() {
                    None => pending = Some(v),
                    Some(x) => {
                        let p = Point2::new(x, v);
                        current = if relative {
                            current + p.coords
                        } else {
                            p
                        };
                        out.push(current);
                    }
                }
            }
        }
    }
    if pending.is_some() {
        return Err(Error::Parse("path ends with a lone coordinate".into()));
    }
    Ok(out)
}

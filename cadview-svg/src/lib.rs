//! SVG drawing surface.
//!
//! Records the primitives emitted by a render pass and exports them as a
//! standalone SVG document. Intended for file output and inspection, not
//! pixel-perfect parity with a windowed canvas.

use std::fmt::Write as _;

use cadview_core::geometry::Point2;
use cadview_render::surface::{DrawSurface, Style};

#[derive(Debug, Clone)]
enum SvgPrimitive {
    Line {
        from: Point2,
        to: Point2,
        style: Style,
    },
    Ellipse {
        top_left: Point2,
        width: f64,
        height: f64,
        style: Style,
    },
    Polygon {
        points: Vec<Point2>,
        style: Style,
    },
    Polyline {
        points: Vec<Point2>,
        style: Style,
    },
    Arc {
        from: Point2,
        to: Point2,
        radius_x: f64,
        radius_y: f64,
        large_arc: bool,
        sweep_clockwise: bool,
        style: Style,
    },
}

/// A recording [`DrawSurface`] with a fixed view size.
#[derive(Debug)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    primitives: Vec<SvgPrimitive>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            primitives: Vec::new(),
        }
    }

    #[inline]
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Exports the recorded primitives as a complete SVG document.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = fmt_num(self.width),
            h = fmt_num(self.height),
        );
        for primitive in &self.primitives {
            let _ = writeln!(out, "  {}", render_primitive(primitive));
        }
        out.push_str("</svg>\n");
        out
    }
}

impl DrawSurface for SvgSurface {
    fn view_width(&self) -> f64 {
        self.width
    }

    fn view_height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self) {
        self.primitives.clear();
    }

    fn draw_line(&mut self, from: Point2, to: Point2, style: &Style) {
        self.primitives.push(SvgPrimitive::Line {
            from,
            to,
            style: style.clone(),
        });
    }

    fn draw_ellipse(&mut self, top_left: Point2, width: f64, height: f64, style: &Style) {
        self.primitives.push(SvgPrimitive::Ellipse {
            top_left,
            width,
            height,
            style: style.clone(),
        });
    }

    fn draw_polygon(&mut self, points: &[Point2], style: &Style) {
        self.primitives.push(SvgPrimitive::Polygon {
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    fn draw_polyline(&mut self, points: &[Point2], style: &Style) {
        self.primitives.push(SvgPrimitive::Polyline {
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    fn draw_arc(
        &mut self,
        from: Point2,
        to: Point2,
        radius_x: f64,
        radius_y: f64,
        large_arc: bool,
        sweep_clockwise: bool,
        style: &Style,
    ) {
        self.primitives.push(SvgPrimitive::Arc {
            from,
            to,
            radius_x,
            radius_y,
            large_arc,
            sweep_clockwise,
            style: style.clone(),
        });
    }
}

fn render_primitive(primitive: &SvgPrimitive) -> String {
    match primitive {
        SvgPrimitive::Line { from, to, style } => format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" {}/>",
            fmt_num(from.x()),
            fmt_num(from.y()),
            fmt_num(to.x()),
            fmt_num(to.y()),
            style_attrs(style),
        ),
        SvgPrimitive::Ellipse {
            top_left,
            width,
            height,
            style,
        } => format!(
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" {}/>",
            fmt_num(top_left.x() + width / 2.0),
            fmt_num(top_left.y() + height / 2.0),
            fmt_num(width / 2.0),
            fmt_num(height / 2.0),
            style_attrs(style),
        ),
        SvgPrimitive::Polygon { points, style } => format!(
            "<polygon points=\"{}\" {}/>",
            points_attr(points),
            style_attrs(style),
        ),
        SvgPrimitive::Polyline { points, style } => format!(
            "<polyline points=\"{}\" {}/>",
            points_attr(points),
            style_attrs(style),
        ),
        SvgPrimitive::Arc {
            from,
            to,
            radius_x,
            radius_y,
            large_arc,
            sweep_clockwise,
            style,
        } => format!(
            "<path d=\"M {} {} A {} {} 0 {} {} {} {}\" {}/>",
            fmt_num(from.x()),
            fmt_num(from.y()),
            fmt_num(*radius_x),
            fmt_num(*radius_y),
            u8::from(*large_arc),
            u8::from(*sweep_clockwise),
            fmt_num(to.x()),
            fmt_num(to.y()),
            style_attrs(style),
        ),
    }
}

fn style_attrs(style: &Style) -> String {
    format!(
        "stroke=\"{}\" stroke-width=\"{}\" fill=\"{}\"",
        style.stroke,
        fmt_num(style.stroke_width),
        style.fill.as_deref().unwrap_or("none"),
    )
}

fn points_attr(points: &[Point2]) -> String {
    points
        .iter()
        .map(|point| format!("{},{}", fmt_num(point.x()), fmt_num(point.y())))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trims trailing zeros so coordinates stay readable (`5` not `5.0000`).
fn fmt_num(value: f64) -> String {
    let formatted = format!("{value:.4}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use cadview_core::document::Document;
    use cadview_core::geometry::Point2;
    use cadview_render::projector::{RenderOptions, ViewProjector};

    use super::*;

    #[test]
    fn export_contains_one_element_per_primitive() {
        let mut doc = Document::new();
        doc.add_line(Point2::new(0.0, 0.0), Point2::new(10.0, 5.0), "0");
        doc.add_circle(Point2::new(5.0, 5.0), 5.0, "0");
        doc.add_polyline(
            [
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
            ],
            true,
            "0",
        );

        let mut surface = SvgSurface::new(100.0, 100.0);
        ViewProjector::new()
            .render(&doc, &mut surface, &RenderOptions::default())
            .expect("render");

        assert_eq!(surface.primitive_count(), 3);
        let svg = surface.to_svg();
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains("viewBox=\"0 0 100 100\""));
        assert!(svg.contains("<line "));
        assert!(svg.contains("<ellipse "));
        assert!(svg.contains("<polygon "));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn arc_exports_as_path_with_arc_segment() {
        let mut doc = Document::new();
        doc.add_arc(Point2::new(0.0, 0.0), 1.0, 0.0, std::f64::consts::PI, "0");

        let mut surface = SvgSurface::new(100.0, 100.0);
        ViewProjector::new()
            .render(&doc, &mut surface, &RenderOptions::default())
            .expect("render");

        let svg = surface.to_svg();
        assert!(svg.contains("<path d=\"M "));
        assert!(svg.contains(" A "));
        // Arcs keep their distinct styling: black stroke, red fill.
        assert!(svg.contains("stroke=\"#000000\""));
        assert!(svg.contains("fill=\"#ff0000\""));
    }

    #[test]
    fn clear_drops_recorded_primitives() {
        let mut surface = SvgSurface::new(50.0, 50.0);
        surface.draw_line(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            &Style::default(),
        );
        assert_eq!(surface.primitive_count(), 1);
        surface.clear();
        assert_eq!(surface.primitive_count(), 0);
        assert!(!surface.to_svg().contains("<line"));
    }

    #[test]
    fn numbers_are_trimmed() {
        assert_eq!(fmt_num(5.0), "5");
        assert_eq!(fmt_num(2.5), "2.5");
        assert_eq!(fmt_num(-0.125), "-0.125");
        assert_eq!(fmt_num(0.0), "0");
    }
}

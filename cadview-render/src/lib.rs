pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum RenderError {
        #[error("drawing surface reported an unusable view size {width}x{height}")]
        InvalidViewSize { width: f64, height: f64 },
    }
}

pub mod fit {
    use cadview_core::geometry::{Bounds2D, Point2};

    pub const DEFAULT_MARGIN_FACTOR: f64 = 0.5;
    pub const DEFAULT_FALLBACK_SCALE: f64 = 1.0;

    /// Knobs for the scale derivation.
    #[derive(Debug, Clone, Copy)]
    pub struct FitOptions {
        /// Multiplier on the fit scale reserving margin around the drawing.
        pub margin_factor: f64,
        /// Scale used when the drawing extent is degenerate.
        pub fallback_scale: f64,
    }

    impl Default for FitOptions {
        fn default() -> Self {
            Self {
                margin_factor: DEFAULT_MARGIN_FACTOR,
                fallback_scale: DEFAULT_FALLBACK_SCALE,
            }
        }
    }

    /// Uniform scale plus 2D offset mapping model space into the view.
    /// Derived once per render pass and applied read-only to every entity.
    ///
    /// The offsets anchor the drawing relative to its bounding box:
    /// `offset_x = min_x * scale`, `offset_y = max_y * scale`, and a point
    /// maps as `(x * scale + offset_x, -y * scale + offset_y)`. Y is
    /// flipped from model Y-up to view Y-down, so the model's maximum Y
    /// lands at view Y = 0.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct FitTransform {
        pub scale: f64,
        pub offset_x: f64,
        pub offset_y: f64,
    }

    impl FitTransform {
        /// Derives the transform for `bounds` inside a `view_width` x
        /// `view_height` region. Degenerate extents (empty box, zero span
        /// on either axis, non-finite fit) fall back to
        /// `options.fallback_scale` instead of propagating infinity.
        pub fn derive(
            bounds: Option<&Bounds2D>,
            view_width: f64,
            view_height: f64,
            options: &FitOptions,
        ) -> Self {
            let Some(bounds) = bounds.filter(|bounds| !bounds.is_empty()) else {
                return Self {
                    scale: options.fallback_scale,
                    offset_x: 0.0,
                    offset_y: 0.0,
                };
            };

            let drawing_width = bounds.width();
            let drawing_height = bounds.height();
            let scale = if drawing_width > 0.0 && drawing_height > 0.0 {
                let fit = (view_width / drawing_width).min(view_height / drawing_height)
                    * options.margin_factor;
                if fit.is_finite() && fit > 0.0 {
                    fit
                } else {
                    options.fallback_scale
                }
            } else {
                options.fallback_scale
            };

            Self {
                scale,
                offset_x: bounds.min().x() * scale,
                offset_y: bounds.max().y() * scale,
            }
        }

        /// Maps one model-space point into view space.
        #[inline]
        pub fn apply(&self, point: Point2) -> Point2 {
            Point2::new(
                point.x() * self.scale + self.offset_x,
                -point.y() * self.scale + self.offset_y,
            )
        }
    }
}

pub mod surface {
    use cadview_core::geometry::Point2;

    /// Stroke/fill styling attached to every primitive draw call.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Style {
        pub stroke: String,
        pub stroke_width: f64,
        pub fill: Option<String>,
    }

    impl Default for Style {
        fn default() -> Self {
            Self {
                stroke: "#ff0000".to_string(),
                stroke_width: 1.0,
                fill: None,
            }
        }
    }

    /// Target for view-space primitives. The projector queries nothing
    /// beyond the current view size, and clears before every pass so the
    /// surface is never left with a stale/new mix.
    pub trait DrawSurface {
        fn view_width(&self) -> f64;
        fn view_height(&self) -> f64;

        /// Drops every primitive drawn so far.
        fn clear(&mut self);

        fn draw_line(&mut self, from: Point2, to: Point2, style: &Style);

        /// Axis-aligned ellipse, positioned by its top-left corner.
        fn draw_ellipse(&mut self, top_left: Point2, width: f64, height: f64, style: &Style);

        /// Closed polygon; an implicit edge joins the last point to the first.
        fn draw_polygon(&mut self, points: &[Point2], style: &Style);

        /// Open vertex chain.
        fn draw_polyline(&mut self, points: &[Point2], style: &Style);

        /// Single elliptical-arc path segment from `from` to `to`.
        /// `sweep_clockwise` is in view-space (Y-down) terms.
        #[allow(clippy::too_many_arguments)]
        fn draw_arc(
            &mut self,
            from: Point2,
            to: Point2,
            radius_x: f64,
            radius_y: f64,
            large_arc: bool,
            sweep_clockwise: bool,
            style: &Style,
        );
    }
}

pub mod projector {
    use std::f64::consts::PI;

    use tracing::debug;

    use cadview_core::document::{Document, Entity};
    use cadview_core::geometry::Point2;

    use crate::errors::RenderError;
    use crate::fit::{FitOptions, FitTransform};
    use crate::surface::{DrawSurface, Style};

    /// Per-pass options: fit knobs plus the styles used for emission.
    /// Defaults match the classic viewer look (red outlines, arcs black
    /// with a red fill).
    #[derive(Debug, Clone)]
    pub struct RenderOptions {
        pub fit: FitOptions,
        pub outline: Style,
        pub arc: Style,
    }

    impl Default for RenderOptions {
        fn default() -> Self {
            Self {
                fit: FitOptions::default(),
                outline: Style::default(),
                arc: Style {
                    stroke: "#000000".to_string(),
                    stroke_width: 1.0,
                    fill: Some("#ff0000".to_string()),
                },
            }
        }
    }

    /// Summary of one completed render pass.
    #[derive(Debug, Clone, Copy)]
    pub struct RenderReport {
        pub transform: FitTransform,
        pub entity_count: usize,
        pub emitted: usize,
    }

    /// Maps a document into a drawing surface. Stateless: everything a
    /// pass needs is passed in, nothing survives between invocations.
    #[derive(Debug, Default)]
    pub struct ViewProjector;

    impl ViewProjector {
        pub fn new() -> Self {
            Self
        }

        /// Runs one full render pass: clear the surface, fold the document
        /// bounds, derive the fit transform, then transform and emit every
        /// entity in document order.
        pub fn render(
            &self,
            document: &Document,
            surface: &mut dyn DrawSurface,
            options: &RenderOptions,
        ) -> Result<RenderReport, RenderError> {
            let view_width = surface.view_width();
            let view_height = surface.view_height();
            if !(view_width.is_finite() && view_height.is_finite())
                || view_width <= 0.0
                || view_height <= 0.0
            {
                return Err(RenderError::InvalidViewSize {
                    width: view_width,
                    height: view_height,
                });
            }

            surface.clear();

            let bounds = document.bounds();
            let transform =
                FitTransform::derive(bounds.as_ref(), view_width, view_height, &options.fit);
            debug!(
                scale = transform.scale,
                offset_x = transform.offset_x,
                offset_y = transform.offset_y,
                "derived fit transform"
            );

            let mut entity_count = 0;
            let mut emitted = 0;
            for (_, entity) in document.entities() {
                entity_count += 1;
                if self.emit(entity, &transform, surface, options) {
                    emitted += 1;
                }
            }

            debug!(entity_count, emitted, "render pass complete");
            Ok(RenderReport {
                transform,
                entity_count,
                emitted,
            })
        }

        fn emit(
            &self,
            entity: &Entity,
            transform: &FitTransform,
            surface: &mut dyn DrawSurface,
            options: &RenderOptions,
        ) -> bool {
            match entity {
                Entity::Line(line) => {
                    surface.draw_line(
                        transform.apply(line.start),
                        transform.apply(line.end),
                        &options.outline,
                    );
                    true
                }
                Entity::Circle(circle) => {
                    let scale = transform.scale;
                    let diameter = 2.0 * circle.radius * scale;
                    let top_left = Point2::new(
                        circle.center.x() * scale - circle.radius * scale + transform.offset_x,
                        -(circle.center.y() * scale + circle.radius * scale) + transform.offset_y,
                    );
                    surface.draw_ellipse(top_left, diameter, diameter, &options.outline);
                    true
                }
                Entity::Arc(arc) => {
                    // Endpoints come from the true start/end angles; the
                    // model's counter-clockwise sweep reads clockwise in
                    // view space after the Y-flip.
                    let from = transform.apply(arc.start_point());
                    let to = transform.apply(arc.end_point());
                    let radius = arc.radius * transform.scale;
                    let large_arc = arc.sweep() > PI;
                    surface.draw_arc(from, to, radius, radius, large_arc, true, &options.arc);
                    true
                }
                Entity::Polyline(polyline) => {
                    if polyline.vertices.is_empty() {
                        return false;
                    }
                    let points: Vec<Point2> = polyline
                        .vertices
                        .iter()
                        .map(|vertex| transform.apply(*vertex))
                        .collect();
                    if polyline.is_closed {
                        surface.draw_polygon(&points, &options.outline);
                    } else {
                        surface.draw_polyline(&points, &options.outline);
                    }
                    true
                }
            }
        }
    }
}

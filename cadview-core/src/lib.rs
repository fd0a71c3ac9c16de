pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 2D point backed by `glam::DVec2`, double precision throughout.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 2D vector companion to [`Point2`].
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point2, end: Point2) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn length_squared(self) -> f64 {
            self.0.length_squared()
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// Axis-aligned bounding box. Starts at the infinite sentinel and only
    /// ever tightens under `include_point`.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: Point2, max: Point2) -> Self {
            Self { min, max }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        /// X span; negative only for the empty sentinel.
        #[inline]
        pub fn width(&self) -> f64 {
            self.max.x() - self.min.x()
        }

        /// Y span; negative only for the empty sentinel.
        #[inline]
        pub fn height(&self) -> f64 {
            self.max.y() - self.min.y()
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        pub fn include_bounds(&mut self, other: &Bounds2D) {
            if other.is_empty() {
                return;
            }
            self.include_point(other.min);
            self.include_point(other.max);
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            debug_assert!(!self.is_empty());
            let center = (self.min.as_vec2() + self.max.as_vec2()) * 0.5;
            Point2::from_vec(center)
        }

        #[inline]
        pub fn contains(&self, point: Point2) -> bool {
            point.x() >= self.min.x()
                && point.x() <= self.max.x()
                && point.y() >= self.min.y()
                && point.y() <= self.max.y()
        }
    }
}

pub mod document {
    use std::collections::HashMap;

    use serde::{Deserialize, Serialize};

    use crate::geometry::{Bounds2D, Point2};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EntityId(u64);

    impl EntityId {
        #[inline]
        pub fn new(raw: u64) -> Self {
            Self(raw)
        }

        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Layer {
        pub name: String,
        pub is_visible: bool,
    }

    impl Layer {
        #[inline]
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                is_visible: true,
            }
        }
    }

    /// Closed set of drawable entity kinds. Adding a variant forces every
    /// dispatch site (bounds, projection) to handle it at compile time.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub enum Entity {
        Line(Line),
        Circle(Circle),
        Arc(Arc),
        Polyline(Polyline),
    }

    impl Entity {
        #[inline]
        pub fn layer_name(&self) -> &str {
            match self {
                Entity::Line(line) => &line.layer,
                Entity::Circle(circle) => &circle.layer,
                Entity::Arc(arc) => &arc.layer,
                Entity::Polyline(polyline) => &polyline.layer,
            }
        }

        /// 2D axis-aligned extent of the entity. Arcs are covered by their
        /// full circle, a safe superset of the true sweep. Returns `None`
        /// for an empty polyline.
        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            match self {
                Entity::Line(line) => {
                    bounds.include_point(line.start);
                    bounds.include_point(line.end);
                }
                Entity::Circle(circle) => {
                    include_circle(&mut bounds, circle.center, circle.radius);
                }
                Entity::Arc(arc) => {
                    include_circle(&mut bounds, arc.center, arc.radius);
                }
                Entity::Polyline(polyline) => {
                    for vertex in &polyline.vertices {
                        bounds.include_point(*vertex);
                    }
                }
            }
            if bounds.is_empty() { None } else { Some(bounds) }
        }
    }

    fn include_circle(bounds: &mut Bounds2D, center: Point2, radius: f64) {
        let radius = radius.abs();
        bounds.include_point(Point2::new(center.x() - radius, center.y() - radius));
        bounds.include_point(Point2::new(center.x() + radius, center.y() + radius));
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Line {
        pub start: Point2,
        pub end: Point2,
        pub layer: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Circle {
        pub center: Point2,
        pub radius: f64,
        pub layer: String,
    }

    /// Circular arc. Angles are radians, counter-clockwise from the
    /// positive X axis (DXF convention, already converted from degrees).
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Arc {
        pub center: Point2,
        pub radius: f64,
        pub start_angle: f64,
        pub end_angle: f64,
        pub layer: String,
    }

    impl Arc {
        /// Point on the arc's circle at `angle`.
        #[inline]
        pub fn point_at(&self, angle: f64) -> Point2 {
            Point2::new(
                self.center.x() + self.radius * angle.cos(),
                self.center.y() + self.radius * angle.sin(),
            )
        }

        #[inline]
        pub fn start_point(&self) -> Point2 {
            self.point_at(self.start_angle)
        }

        #[inline]
        pub fn end_point(&self) -> Point2 {
            self.point_at(self.end_angle)
        }

        /// Counter-clockwise angular span, normalized to [0, τ).
        #[inline]
        pub fn sweep(&self) -> f64 {
            (self.end_angle - self.start_angle).rem_euclid(std::f64::consts::TAU)
        }
    }

    /// Lightweight polyline. Insertion order is drawing order; `is_closed`
    /// distinguishes a polygon outline from an open vertex chain.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Polyline {
        pub vertices: Vec<Point2>,
        pub is_closed: bool,
        pub layer: String,
    }

    /// In-memory result of parsing one drawing: layers plus an ordered
    /// entity list. Owned by the caller for the duration of a render pass.
    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    pub struct Document {
        layers: HashMap<String, Layer>,
        entities: Vec<(EntityId, Entity)>,
        next_entity_id: u64,
    }

    impl Document {
        pub fn new() -> Self {
            let mut doc = Self::default();
            doc.ensure_layer("0");
            doc
        }

        pub fn ensure_layer(&mut self, name: impl AsRef<str>) {
            let key = name.as_ref();
            self.layers
                .entry(key.to_string())
                .or_insert_with(|| Layer::new(key));
        }

        pub fn add_line(&mut self, start: Point2, end: Point2, layer: impl Into<String>) -> EntityId {
            let layer = layer.into();
            self.ensure_layer(&layer);
            let id = self.next_id();
            self.entities
                .push((id, Entity::Line(Line { start, end, layer })));
            id
        }

        pub fn add_circle(
            &mut self,
            center: Point2,
            radius: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            let layer = layer.into();
            self.ensure_layer(&layer);
            let id = self.next_id();
            self.entities.push((
                id,
                Entity::Circle(Circle {
                    center,
                    radius,
                    layer,
                }),
            ));
            id
        }

        pub fn add_arc(
            &mut self,
            center: Point2,
            radius: f64,
            start_angle: f64,
            end_angle: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            let layer = layer.into();
            self.ensure_layer(&layer);
            let id = self.next_id();
            self.entities.push((
                id,
                Entity::Arc(Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                    layer,
                }),
            ));
            id
        }

        pub fn add_polyline<I>(
            &mut self,
            vertices: I,
            is_closed: bool,
            layer: impl Into<String>,
        ) -> EntityId
        where
            I: IntoIterator<Item = Point2>,
        {
            let layer = layer.into();
            self.ensure_layer(&layer);
            let collected: Vec<Point2> = vertices.into_iter().collect();
            let id = self.next_id();
            self.entities.push((
                id,
                Entity::Polyline(Polyline {
                    vertices: collected,
                    is_closed,
                    layer,
                }),
            ));
            id
        }

        pub fn add_entity(&mut self, entity: Entity) -> EntityId {
            match entity {
                Entity::Line(line) => self.add_line(line.start, line.end, line.layer),
                Entity::Circle(circle) => {
                    self.add_circle(circle.center, circle.radius, circle.layer)
                }
                Entity::Arc(arc) => self.add_arc(
                    arc.center,
                    arc.radius,
                    arc.start_angle,
                    arc.end_angle,
                    arc.layer,
                ),
                Entity::Polyline(polyline) => {
                    self.add_polyline(polyline.vertices, polyline.is_closed, polyline.layer)
                }
            }
        }

        #[inline]
        pub fn layers(&self) -> impl Iterator<Item = &Layer> {
            self.layers.values()
        }

        #[inline]
        pub fn entities(&self) -> impl Iterator<Item = &(EntityId, Entity)> {
            self.entities.iter()
        }

        #[inline]
        pub fn entity(&self, id: EntityId) -> Option<&Entity> {
            self.entities
                .iter()
                .find(|(entity_id, _)| *entity_id == id)
                .map(|(_, entity)| entity)
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.entities.is_empty()
        }

        /// Extent of the whole document, `None` when nothing contributes.
        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            for (_, entity) in &self.entities {
                if let Some(entity_bounds) = entity.bounds() {
                    bounds.include_bounds(&entity_bounds);
                }
            }
            if bounds.is_empty() { None } else { Some(bounds) }
        }

        fn next_id(&mut self) -> EntityId {
            let id = EntityId::new(self.next_entity_id);
            self.next_entity_id += 1;
            id
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use crate::document::{Document, Entity};
    use crate::geometry::{Bounds2D, Point2};

    #[test]
    fn empty_bounds_sentinel_is_empty() {
        let bounds = Bounds2D::empty();
        assert!(bounds.is_empty());
        assert!(bounds.width() < 0.0);
        assert!(bounds.height() < 0.0);
    }

    #[test]
    fn include_point_tightens_monotonically() {
        let mut bounds = Bounds2D::empty();
        bounds.include_point(Point2::new(3.0, -1.0));
        assert!(!bounds.is_empty());
        assert_eq!(bounds.min().x(), 3.0);
        assert_eq!(bounds.max().x(), 3.0);

        bounds.include_point(Point2::new(-2.0, 4.0));
        assert_eq!(bounds.min().x(), -2.0);
        assert_eq!(bounds.min().y(), -1.0);
        assert_eq!(bounds.max().x(), 3.0);
        assert_eq!(bounds.max().y(), 4.0);

        // A point already inside must not loosen anything.
        bounds.include_point(Point2::new(0.0, 0.0));
        assert_eq!(bounds.width(), 5.0);
        assert_eq!(bounds.height(), 5.0);
    }

    #[test]
    fn line_bounds_cover_both_endpoints() {
        let mut doc = Document::new();
        let id = doc.add_line(Point2::new(10.0, -3.0), Point2::new(-5.0, 7.0), "0");
        let bounds = doc.entity(id).and_then(Entity::bounds).expect("line bounds");
        assert_eq!(bounds.min().x(), -5.0);
        assert_eq!(bounds.min().y(), -3.0);
        assert_eq!(bounds.max().x(), 10.0);
        assert_eq!(bounds.max().y(), 7.0);
    }

    #[test]
    fn circle_bounds_are_center_plus_minus_radius() {
        let mut doc = Document::new();
        doc.add_circle(Point2::new(5.0, 5.0), 5.0, "0");
        let bounds = doc.bounds().expect("circle bounds");
        assert_eq!(bounds.min().x(), 0.0);
        assert_eq!(bounds.min().y(), 0.0);
        assert_eq!(bounds.max().x(), 10.0);
        assert_eq!(bounds.max().y(), 10.0);
    }

    #[test]
    fn arc_bounds_use_full_circle_superset() {
        let mut doc = Document::new();
        doc.add_arc(Point2::new(0.0, 0.0), 2.0, 0.0, FRAC_PI_2, "0");
        let bounds = doc.bounds().expect("arc bounds");
        assert_eq!(bounds.min().x(), -2.0);
        assert_eq!(bounds.max().y(), 2.0);
    }

    #[test]
    fn document_bounds_contain_every_vertex() {
        let mut doc = Document::new();
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
        ];
        doc.add_polyline(points, false, "SKETCH");
        doc.add_line(Point2::new(-4.0, 2.0), Point2::new(3.0, -1.0), "GEOM");

        let bounds = doc.bounds().expect("document bounds");
        assert!(bounds.min().x() <= bounds.max().x());
        assert!(bounds.min().y() <= bounds.max().y());
        for point in points {
            assert!(bounds.contains(point));
        }
    }

    #[test]
    fn empty_polyline_contributes_no_bounds() {
        let mut doc = Document::new();
        doc.add_polyline(std::iter::empty(), false, "0");
        assert!(doc.bounds().is_none());
    }

    #[test]
    fn arc_endpoints_follow_angles() {
        let mut doc = Document::new();
        let id = doc.add_arc(Point2::new(1.0, 1.0), 2.0, 0.0, FRAC_PI_2, "0");
        let Some(Entity::Arc(arc)) = doc.entity(id) else {
            panic!("expected arc");
        };
        let start = arc.start_point();
        let end = arc.end_point();
        assert!((start.x() - 3.0).abs() < 1e-9);
        assert!((start.y() - 1.0).abs() < 1e-9);
        assert!((end.x() - 1.0).abs() < 1e-9);
        assert!((end.y() - 3.0).abs() < 1e-9);
        assert!((arc.sweep() - FRAC_PI_2).abs() < 1e-9);
    }
}

use std::f64::consts::FRAC_PI_2;
use std::path::PathBuf;

use cadview_core::document::Entity;
use cadview_io::{DocumentLoader, DxfFacade, FileFormat, IoError};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/data");
    path.push(name);
    path
}

#[test]
fn load_basic_entities() {
    let loader = DxfFacade::new();
    let doc = loader
        .load(&fixture("basic_entities.dxf"))
        .expect("load basic_entities.dxf");

    let entities: Vec<&Entity> = doc.entities().map(|(_, entity)| entity).collect();
    assert_eq!(entities.len(), 4);

    let Entity::Line(line) = entities[0] else {
        panic!("expected first entity to be a line");
    };
    assert!((line.start.x()).abs() < 1e-9);
    assert!((line.end.x() - 10.0).abs() < 1e-9);
    assert!((line.end.y() - 5.0).abs() < 1e-9);
    assert_eq!(line.layer, "GEOM");

    let Entity::Circle(circle) = entities[1] else {
        panic!("expected second entity to be a circle");
    };
    assert!((circle.center.x() - 5.0).abs() < 1e-9);
    assert!((circle.center.y() - 5.0).abs() < 1e-9);
    assert!((circle.radius - 5.0).abs() < 1e-9);

    let Entity::Arc(arc) = entities[2] else {
        panic!("expected third entity to be an arc");
    };
    assert!((arc.center.x() - 20.0).abs() < 1e-9);
    assert!((arc.radius - 7.5).abs() < 1e-9);
    // Angles arrive in degrees (group codes 50/51) and are stored in radians.
    assert!(arc.start_angle.abs() < 1e-9);
    assert!((arc.end_angle - FRAC_PI_2).abs() < 1e-9);
    assert_eq!(arc.layer, "ANNOT");

    let Entity::Polyline(polyline) = entities[3] else {
        panic!("expected fourth entity to be a polyline");
    };
    assert_eq!(polyline.vertices.len(), 3);
    assert!(polyline.is_closed);
    assert!((polyline.vertices[2].x() - 1.0).abs() < 1e-9);
    assert!((polyline.vertices[2].y() - 1.0).abs() < 1e-9);
}

#[test]
fn open_polyline_keeps_open_flag() {
    let loader = DxfFacade::new();
    let doc = loader
        .load(&fixture("open_polyline.dxf"))
        .expect("load open_polyline.dxf");

    let mut polylines = doc.entities().filter_map(|(_, entity)| match entity {
        Entity::Polyline(polyline) => Some(polyline),
        _ => None,
    });
    let polyline = polylines.next().expect("polyline entity");
    assert!(polylines.next().is_none(), "expected a single polyline");
    assert!(!polyline.is_closed);
    assert_eq!(polyline.vertices.len(), 3);
}

#[test]
fn unsupported_kinds_are_skipped_without_error() {
    let loader = DxfFacade::new();
    let doc = loader
        .load(&fixture("unsupported_mixed.dxf"))
        .expect("load unsupported_mixed.dxf");

    // TEXT and ELLIPSE are outside the supported set: the line survives alone.
    assert_eq!(doc.entities().count(), 1);
    let (_, entity) = doc.entities().next().expect("one entity");
    assert!(matches!(entity, Entity::Line(_)));
}

#[test]
fn truncated_file_is_an_invalid_document() {
    let loader = DxfFacade::new();
    let err = loader
        .load(&fixture("truncated.dxf"))
        .expect_err("truncated file must not parse");
    assert!(matches!(err, IoError::InvalidDocument(_)));
}

#[test]
fn missing_file_is_a_read_error() {
    let loader = DxfFacade::new();
    let err = loader
        .load(&fixture("does_not_exist.dxf"))
        .expect_err("missing file must not parse");
    assert!(matches!(err, IoError::ReadError { .. }));
}

#[test]
fn dwg_extension_is_rejected_as_unsupported_format() {
    let loader = DxfFacade::new();
    let err = loader
        .load(&fixture("drawing.dwg"))
        .expect_err("DWG must be rejected before any file access");
    assert!(matches!(err, IoError::UnsupportedFormat(_)));
}

#[test]
fn format_routing_by_extension() {
    assert_eq!(FileFormat::from_path(&fixture("a.dxf")), FileFormat::Dxf);
    assert_eq!(FileFormat::from_path(&fixture("a.DWG")), FileFormat::Dwg);
    // Unknown extensions fall through to the DXF reader.
    assert_eq!(FileFormat::from_path(&fixture("a.dat")), FileFormat::Dxf);
    assert_eq!(FileFormat::from_path(&fixture("noext")), FileFormat::Dxf);
}

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use cadview_core::document::{Arc, Circle, Document, Entity, Line, Polyline};
use cadview_core::geometry::Point2;

#[derive(Debug, Error)]
pub enum IoError {
    /// File exists in a format we recognize but cannot read (e.g. DWG).
    #[error("unsupported drawing format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

/// Drawing format, routed by file extension. Unknown extensions are
/// attempted as DXF; a wrong guess surfaces as a normal parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Dxf,
    Dwg,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        match extension.as_deref() {
            Some("dwg") => FileFormat::Dwg,
            _ => FileFormat::Dxf,
        }
    }
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

/// Entry point for reading a drawing file into a [`Document`].
pub struct DxfFacade;

impl DxfFacade {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DxfFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for DxfFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        if FileFormat::from_path(path) == FileFormat::Dwg {
            return Err(IoError::UnsupportedFormat(
                "DWG reading is not implemented; convert to DXF".to_string(),
            ));
        }
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let parser = DxfParser::new(&data);
        parser
            .parse()
            .map_err(|err| IoError::InvalidDocument(err.message))
    }
}

#[derive(Debug)]
struct DxfError {
    message: String,
}

impl DxfError {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

struct DxfParser<'a> {
    reader: DxfReader<'a>,
    skipped_entities: usize,
}

impl<'a> DxfParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            reader: DxfReader::new(source),
            skipped_entities: 0,
        }
    }

    fn parse(mut self) -> Result<Document, DxfError> {
        let mut document = Document::new();
        while let Some((code, value)) = self.reader.next_pair()? {
            if code != 0 {
                return Err(DxfError::invalid(format!(
                    "unexpected group code {code} (expected 0 for SECTION/EOF)"
                )));
            }
            match value.as_str() {
                "SECTION" => {
                    let (name_code, name) = self
                        .reader
                        .next_pair()?
                        .ok_or_else(|| DxfError::invalid("SECTION without a name (group code 2)"))?;
                    if name_code != 2 {
                        return Err(DxfError::invalid(format!(
                            "SECTION name carried group code {name_code} (expected 2)"
                        )));
                    }
                    match name.as_str() {
                        "ENTITIES" => self.parse_entities(&mut document)?,
                        _ => self.skip_section()?,
                    }
                }
                "EOF" => break,
                unexpected => {
                    return Err(DxfError::invalid(format!(
                        "unexpected marker {unexpected}, expected SECTION or EOF"
                    )));
                }
            }
        }
        if self.skipped_entities > 0 {
            debug!(
                skipped = self.skipped_entities,
                "skipped entity kinds outside the supported set"
            );
        }
        Ok(document)
    }

    fn parse_entities(&mut self, document: &mut Document) -> Result<(), DxfError> {
        loop {
            let (code, value) = match self.reader.next_pair()? {
                Some(pair) => pair,
                None => return Err(DxfError::invalid("ENTITIES section ended prematurely")),
            };
            if code != 0 {
                return Err(DxfError::invalid(format!(
                    "ENTITIES section hit group code {code} (expected 0 for an entity start)"
                )));
            }

            match value.as_str() {
                "ENDSEC" => break,
                "LINE" => {
                    let entity = self.parse_line()?;
                    document.add_entity(entity);
                }
                "CIRCLE" => {
                    let entity = self.parse_circle()?;
                    document.add_entity(entity);
                }
                "ARC" => {
                    let entity = self.parse_arc()?;
                    document.add_entity(entity);
                }
                "LWPOLYLINE" => {
                    let entity = self.parse_lwpolyline()?;
                    document.add_entity(entity);
                }
                other => {
                    // Incomplete coverage by design: unsupported kinds are
                    // skipped, never an error.
                    debug!(kind = other, "skipping unsupported entity kind");
                    self.skipped_entities += 1;
                    self.skip_entity_body()?;
                }
            }
        }
        Ok(())
    }

    fn parse_line(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut start_x = None;
        let mut start_y = None;
        let mut end_x = None;
        let mut end_y = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    10 => assign_coord(&mut start_x, &value, "LINE start X (group code 10)")?,
                    20 => assign_coord(&mut start_y, &value, "LINE start Y (group code 20)")?,
                    11 => assign_coord(&mut end_x, &value, "LINE end X (group code 11)")?,
                    21 => assign_coord(&mut end_y, &value, "LINE end Y (group code 21)")?,
                    30 | 31 => {} // Z coordinates ignored
                    _ => {}
                },
                None => return Err(DxfError::invalid("LINE not terminated")),
            }
        }

        let layer = layer.unwrap_or_else(|| "0".to_string());
        let sx = start_x.ok_or_else(|| DxfError::invalid("LINE missing start X (group code 10)"))?;
        let sy = start_y.ok_or_else(|| DxfError::invalid("LINE missing start Y (group code 20)"))?;
        let ex = end_x.ok_or_else(|| DxfError::invalid("LINE missing end X (group code 11)"))?;
        let ey = end_y.ok_or_else(|| DxfError::invalid("LINE missing end Y (group code 21)"))?;

        Ok(Entity::Line(Line {
            start: Point2::new(sx, sy),
            end: Point2::new(ex, ey),
            layer,
        }))
    }

    fn parse_circle(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut center_x = None;
        let mut center_y = None;
        let mut radius = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    10 => assign_coord(&mut center_x, &value, "CIRCLE center X (group code 10)")?,
                    20 => assign_coord(&mut center_y, &value, "CIRCLE center Y (group code 20)")?,
                    40 => assign_coord(&mut radius, &value, "CIRCLE radius (group code 40)")?,
                    30 => {}
                    _ => {}
                },
                None => return Err(DxfError::invalid("CIRCLE not terminated")),
            }
        }

        let layer = layer.unwrap_or_else(|| "0".to_string());
        let cx =
            center_x.ok_or_else(|| DxfError::invalid("CIRCLE missing center X (group code 10)"))?;
        let cy =
            center_y.ok_or_else(|| DxfError::invalid("CIRCLE missing center Y (group code 20)"))?;
        let radius =
            radius.ok_or_else(|| DxfError::invalid("CIRCLE missing radius (group code 40)"))?;
        if radius < 0.0 {
            return Err(DxfError::invalid(format!(
                "CIRCLE radius must be non-negative (got {radius})"
            )));
        }

        Ok(Entity::Circle(Circle {
            center: Point2::new(cx, cy),
            radius,
            layer,
        }))
    }

    fn parse_arc(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut center_x = None;
        let mut center_y = None;
        let mut radius = None;
        let mut start_angle = None;
        let mut end_angle = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    10 => assign_coord(&mut center_x, &value, "ARC center X (group code 10)")?,
                    20 => assign_coord(&mut center_y, &value, "ARC center Y (group code 20)")?,
                    40 => assign_coord(&mut radius, &value, "ARC radius (group code 40)")?,
                    50 => assign_coord(&mut start_angle, &value, "ARC start angle (group code 50)")?,
                    51 => assign_coord(&mut end_angle, &value, "ARC end angle (group code 51)")?,
                    30 => {}
                    _ => {}
                },
                None => return Err(DxfError::invalid("ARC not terminated")),
            }
        }

        let layer = layer.unwrap_or_else(|| "0".to_string());
        let cx = center_x.ok_or_else(|| DxfError::invalid("ARC missing center X (group code 10)"))?;
        let cy = center_y.ok_or_else(|| DxfError::invalid("ARC missing center Y (group code 20)"))?;
        let radius = radius.ok_or_else(|| DxfError::invalid("ARC missing radius (group code 40)"))?;
        if radius < 0.0 {
            return Err(DxfError::invalid(format!(
                "ARC radius must be non-negative (got {radius})"
            )));
        }
        let start_angle = start_angle
            .ok_or_else(|| DxfError::invalid("ARC missing start angle (group code 50)"))?
            .to_radians();
        let end_angle = end_angle
            .ok_or_else(|| DxfError::invalid("ARC missing end angle (group code 51)"))?
            .to_radians();

        Ok(Entity::Arc(Arc {
            center: Point2::new(cx, cy),
            radius,
            start_angle,
            end_angle,
            layer,
        }))
    }

    fn parse_lwpolyline(&mut self) -> Result<Entity, DxfError> {
        let mut layer = None;
        let mut is_closed = false;
        let mut vertices: Vec<Point2> = Vec::new();
        let mut pending_x: Option<f64> = None;
        let mut pending_y: Option<f64> = None;
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    break;
                }
                Some((code, value)) => match code {
                    8 => layer = Some(value.trim().to_string()),
                    70 => {
                        let flags = parse_i32(&value, "LWPOLYLINE flags (group code 70)")?;
                        is_closed = flags & 0x01 == 0x01;
                    }
                    90 => {} // declared vertex count; the 10/20 pairs are authoritative
                    10 => {
                        let x = parse_f64(&value, "LWPOLYLINE vertex X (group code 10)")?;
                        if let Some(y) = pending_y.take() {
                            vertices.push(Point2::new(x, y));
                        } else if pending_x.replace(x).is_some() {
                            return Err(DxfError::invalid(
                                "LWPOLYLINE vertex missing its Y (group code 20)",
                            ));
                        }
                    }
                    20 => {
                        let y = parse_f64(&value, "LWPOLYLINE vertex Y (group code 20)")?;
                        if let Some(x) = pending_x.take() {
                            vertices.push(Point2::new(x, y));
                        } else if pending_y.replace(y).is_some() {
                            return Err(DxfError::invalid(
                                "LWPOLYLINE vertex missing its X (group code 10)",
                            ));
                        }
                    }
                    30 | 42 => {} // elevation and bulge ignored
                    _ => {}
                },
                None => return Err(DxfError::invalid("LWPOLYLINE not terminated")),
            }
        }

        if pending_x.is_some() || pending_y.is_some() {
            return Err(DxfError::invalid(
                "LWPOLYLINE vertex coordinates come in 10/20 pairs; found an incomplete vertex",
            ));
        }

        let layer = layer.unwrap_or_else(|| "0".to_string());
        Ok(Entity::Polyline(Polyline {
            vertices,
            is_closed,
            layer,
        }))
    }

    fn skip_entity_body(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) => {
                    self.reader.put_back((0, value));
                    return Ok(());
                }
                Some(_) => {}
                None => return Ok(()),
            }
        }
    }

    fn skip_section(&mut self) -> Result<(), DxfError> {
        loop {
            match self.reader.next_pair()? {
                Some((0, value)) if value == "ENDSEC" => return Ok(()),
                Some(_) => {}
                None => return Err(DxfError::invalid("section not terminated with ENDSEC")),
            }
        }
    }
}

struct DxfReader<'a> {
    lines: std::str::Lines<'a>,
    buffer: Option<(i32, String)>,
    line_number: usize,
}

impl<'a> DxfReader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines(),
            buffer: None,
            line_number: 0,
        }
    }

    fn next_pair(&mut self) -> Result<Option<(i32, String)>, DxfError> {
        if let Some(pair) = self.buffer.take() {
            return Ok(Some(pair));
        }

        let code_line = match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                line
            }
            None => return Ok(None),
        };

        let value_line = match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                line
            }
            None => {
                return Err(DxfError::invalid(format!(
                    "file ended at line {}, missing the value line for a group code",
                    self.line_number
                )));
            }
        };

        let code = code_line.trim().parse::<i32>().map_err(|_| {
            DxfError::invalid(format!(
                "group code \"{}\" at line {} is not an integer",
                code_line.trim(),
                self.line_number - 1
            ))
        })?;
        let value = value_line.trim_end_matches('\r').to_string();
        Ok(Some((code, value)))
    }

    fn put_back(&mut self, pair: (i32, String)) {
        if self.buffer.is_some() {
            panic!("internal error: DXF pair pushed back twice");
        }
        self.buffer = Some(pair);
    }
}

fn assign_coord(slot: &mut Option<f64>, raw: &str, context: &str) -> Result<(), DxfError> {
    if slot.is_some() {
        return Err(DxfError::invalid(format!("duplicate value for {context}")));
    }
    *slot = Some(parse_f64(raw, context)?);
    Ok(())
}

fn parse_f64(raw: &str, context: &str) -> Result<f64, DxfError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DxfError::invalid(format!("{context} is not a number (value: \"{raw}\")")))
}

fn parse_i32(raw: &str, context: &str) -> Result<i32, DxfError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| DxfError::invalid(format!("{context} is not an integer (value: \"{raw}\")")))
}

use std::path::Path;

use thiserror::Error;
use tracing::info;

use cadview_config::AppConfig;
use cadview_io::{DocumentLoader, DxfFacade, IoError};
use cadview_render::errors::RenderError;
use cadview_render::fit::FitOptions;
use cadview_render::projector::{RenderOptions, RenderReport, ViewProjector};
use cadview_render::surface::Style;
use cadview_svg::SvgSurface;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Load(#[from] IoError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Outcome of one import: the exported SVG plus pass statistics.
#[derive(Debug)]
pub struct ImportOutcome {
    pub svg: String,
    pub report: RenderReport,
}

/// The "import drawing" command: parse the file, run one full render
/// pass into an SVG surface, return the export. Nothing is drawn if
/// parsing fails.
pub fn import_drawing(path: &Path, config: &AppConfig) -> Result<ImportOutcome, ImportError> {
    let loader = DxfFacade::new();
    let document = loader.load(path)?;
    info!(
        path = %path.display(),
        entities = document.entities().count(),
        layers = document.layers().count(),
        "loaded drawing"
    );

    let mut surface = SvgSurface::new(config.view.width, config.view.height);
    let report = ViewProjector::new().render(&document, &mut surface, &render_options(config))?;
    info!(
        emitted = report.emitted,
        scale = report.transform.scale,
        "render pass finished"
    );

    Ok(ImportOutcome {
        svg: surface.to_svg(),
        report,
    })
}

fn render_options(config: &AppConfig) -> RenderOptions {
    RenderOptions {
        fit: FitOptions {
            margin_factor: config.view.margin_factor,
            fallback_scale: config.view.fallback_scale,
        },
        outline: Style {
            stroke: config.style.stroke.clone(),
            stroke_width: config.style.stroke_width,
            fill: None,
        },
        arc: Style {
            stroke: config.style.arc_stroke.clone(),
            stroke_width: config.style.stroke_width,
            fill: Some(config.style.arc_fill.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_dxf(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".dxf")
            .tempfile()
            .expect("create temp dxf");
        file.write_all(content.as_bytes()).expect("write temp dxf");
        file
    }

    #[test]
    fn import_renders_supported_entities() {
        let file = write_dxf(
            "0\nSECTION\n2\nENTITIES\n\
             0\nLINE\n8\nGEOM\n10\n0.0\n20\n0.0\n11\n10.0\n21\n5.0\n\
             0\nCIRCLE\n8\nGEOM\n10\n5.0\n20\n5.0\n40\n2.5\n\
             0\nENDSEC\n0\nEOF\n",
        );

        let outcome =
            import_drawing(file.path(), &AppConfig::default()).expect("import succeeds");
        assert_eq!(outcome.report.entity_count, 2);
        assert_eq!(outcome.report.emitted, 2);
        assert!(outcome.svg.contains("<line "));
        assert!(outcome.svg.contains("<ellipse "));
    }

    #[test]
    fn import_fails_cleanly_on_unreadable_input() {
        let file = write_dxf("this is not a drawing");
        let err = import_drawing(file.path(), &AppConfig::default())
            .expect_err("garbage must not import");
        assert!(matches!(err, ImportError::Load(IoError::InvalidDocument(_))));
    }

    #[test]
    fn import_rejects_dwg_distinctly() {
        let file = tempfile::Builder::new()
            .suffix(".dwg")
            .tempfile()
            .expect("create temp dwg");
        let err = import_drawing(file.path(), &AppConfig::default())
            .expect_err("DWG must be rejected");
        assert!(matches!(
            err,
            ImportError::Load(IoError::UnsupportedFormat(_))
        ));
    }
}

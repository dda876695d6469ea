//! Drawing targets for the map renderer.
//!
//! A [`Backend`] allocates a [`Surface`] of exact pixel dimensions; the
//! renderer draws onto it and finally asks it to encode itself.

use serde::Serialize;

use crate::error::{RenderError, Result};
use crate::layout::{ImageSize, Point, RoomRect};
use crate::theme::Theme;

pub trait Surface {
    /// Unfilled rectangle outline.
    fn draw_rect(&mut self, rect: &RoomRect, stroke: &str, stroke_width: f32);
    fn draw_line(&mut self, from: Point, to: Point, stroke: &str, stroke_width: f32);
    /// Closed polygon, filled and then outlined.
    fn draw_polygon(&mut self, points: &[(f32, f32)], fill: &str, stroke: &str, stroke_width: f32);
    /// Single-line label centred on `center`.
    fn draw_text(&mut self, text: &str, center: Point, color: &str);
    fn encode(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

pub trait Backend {
    type Surface: Surface;

    fn allocate(&self, size: ImageSize) -> Result<Self::Surface>;
}

// ── Display list ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Rect {
        rect: RoomRect,
        stroke: String,
        stroke_width: f32,
    },
    Line {
        from: Point,
        to: Point,
        stroke: String,
        stroke_width: f32,
    },
    Polygon {
        points: Vec<(f32, f32)>,
        fill: String,
        stroke: String,
    },
    Text {
        text: String,
        center: Point,
        color: String,
    },
}

/// Records draw calls instead of rasterizing; encodes to JSON.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayList {
    pub size: ImageSize,
    pub ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn new(size: ImageSize) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = (Point, Point, &str)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Line { from, to, stroke, .. } => Some((*from, *to, stroke.as_str())),
            _ => None,
        })
    }

    pub fn polygons(&self) -> impl Iterator<Item = &[(f32, f32)]> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Polygon { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }
}

impl Surface for DisplayList {
    fn draw_rect(&mut self, rect: &RoomRect, stroke: &str, stroke_width: f32) {
        self.ops.push(DrawOp::Rect {
            rect: *rect,
            stroke: stroke.to_string(),
            stroke_width,
        });
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: &str, stroke_width: f32) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            stroke: stroke.to_string(),
            stroke_width,
        });
    }

    fn draw_polygon(&mut self, points: &[(f32, f32)], fill: &str, stroke: &str, _stroke_width: f32) {
        self.ops.push(DrawOp::Polygon {
            points: points.to_vec(),
            fill: fill.to_string(),
            stroke: stroke.to_string(),
        });
    }

    fn draw_text(&mut self, text: &str, center: Point, color: &str) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            center,
            color: color.to_string(),
        });
    }

    fn encode(self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self).map_err(|err| RenderError::Encode(err.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayListBackend;

impl Backend for DisplayListBackend {
    type Surface = DisplayList;

    fn allocate(&self, size: ImageSize) -> Result<DisplayList> {
        Ok(DisplayList::new(size))
    }
}

// ── SVG ─────────────────────────────────────────────────────────────

pub struct SvgSurface {
    svg: String,
    font_family: String,
    font_size: f32,
}

impl SvgSurface {
    pub fn new(size: ImageSize, theme: &Theme) -> Self {
        let width = size.width;
        let height = size.height;
        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        ));
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(&theme.background)
        ));
        Self {
            svg,
            font_family: theme.font_family.clone(),
            font_size: theme.font_size,
        }
    }

    pub fn into_svg(mut self) -> String {
        self.svg.push_str("</svg>");
        self.svg
    }
}

impl Surface for SvgSurface {
    fn draw_rect(&mut self, rect: &RoomRect, stroke: &str, stroke_width: f32) {
        self.svg.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            escape_xml(stroke),
            stroke_width
        ));
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: &str, stroke_width: f32) {
        self.svg.push_str(&format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            from.x,
            from.y,
            to.x,
            to.y,
            escape_xml(stroke),
            stroke_width
        ));
    }

    fn draw_polygon(&mut self, points: &[(f32, f32)], fill: &str, stroke: &str, stroke_width: f32) {
        if points.is_empty() {
            return;
        }
        let mut d = String::new();
        d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
        for point in points.iter().skip(1) {
            d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
        }
        d.push_str(" Z");
        self.svg.push_str(&format!(
            "<path d=\"{}\" fill=\"{}\" fill-rule=\"evenodd\" stroke=\"{}\" stroke-width=\"{}\"/>",
            d,
            escape_xml(fill),
            escape_xml(stroke),
            stroke_width
        ));
    }

    fn draw_text(&mut self, text: &str, center: Point, color: &str) {
        self.svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            center.x,
            center.y,
            escape_xml(&self.font_family),
            self.font_size,
            escape_xml(color),
            escape_xml(text)
        ));
    }

    fn encode(self) -> Result<Vec<u8>> {
        Ok(self.into_svg().into_bytes())
    }
}

#[derive(Debug, Clone)]
pub struct SvgBackend {
    theme: Theme,
}

impl SvgBackend {
    pub fn new(theme: &Theme) -> Self {
        Self {
            theme: theme.clone(),
        }
    }
}

impl Backend for SvgBackend {
    type Surface = SvgSurface;

    fn allocate(&self, size: ImageSize) -> Result<SvgSurface> {
        Ok(SvgSurface::new(size, &self.theme))
    }
}

// ── PNG ─────────────────────────────────────────────────────────────

#[cfg(feature = "png")]
pub use raster::{PngBackend, PngSurface};

#[cfg(feature = "png")]
mod raster {
    use std::sync::Arc;

    use resvg::tiny_skia;

    use super::{Backend, Surface, SvgSurface};
    use crate::config::RenderConfig;
    use crate::error::{RenderError, Result};
    use crate::layout::{ImageSize, Point, RoomRect};
    use crate::text_metrics::resolve_generic_family;
    use crate::theme::Theme;

    /// Rasterizes the SVG document with resvg into a PNG of exact size.
    #[derive(Clone)]
    pub struct PngBackend {
        theme: Theme,
        font_family: String,
        fontdb: Arc<usvg::fontdb::Database>,
    }

    impl PngBackend {
        pub fn new(theme: &Theme, render: &RenderConfig) -> Self {
            let mut fontdb = usvg::fontdb::Database::new();
            if render.load_system_fonts {
                fontdb.load_system_fonts();
            }
            let generics = render.generic_families();
            let resolve = |wanted: &str| {
                let known = fontdb
                    .faces()
                    .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str()));
                resolve_generic_family(wanted, known)
            };
            let sans = resolve(&generics.sans_serif);
            let serif = resolve(&generics.serif);
            let mono = resolve(&generics.monospace);
            if let Some(name) = sans.clone() {
                fontdb.set_sans_serif_family(name);
            }
            if let Some(name) = serif {
                fontdb.set_serif_family(name);
            }
            if let Some(name) = mono {
                fontdb.set_monospace_family(name);
            }
            tracing::debug!(sans_serif = ?sans, faces = fontdb.len(), "raster font database ready");
            Self {
                theme: theme.clone(),
                font_family: sans.unwrap_or_else(|| render.font_family.clone()),
                fontdb: Arc::new(fontdb),
            }
        }
    }

    impl Backend for PngBackend {
        type Surface = PngSurface;

        fn allocate(&self, size: ImageSize) -> Result<PngSurface> {
            if tiny_skia::IntSize::from_wh(size.width, size.height).is_none() {
                return Err(RenderError::SurfaceAllocation {
                    width: size.width,
                    height: size.height,
                });
            }
            Ok(PngSurface {
                svg: SvgSurface::new(size, &self.theme),
                size,
                font_family: self.font_family.clone(),
                fontdb: Arc::clone(&self.fontdb),
            })
        }
    }

    pub struct PngSurface {
        svg: SvgSurface,
        size: ImageSize,
        font_family: String,
        fontdb: Arc<usvg::fontdb::Database>,
    }

    impl Surface for PngSurface {
        fn draw_rect(&mut self, rect: &RoomRect, stroke: &str, stroke_width: f32) {
            self.svg.draw_rect(rect, stroke, stroke_width);
        }

        fn draw_line(&mut self, from: Point, to: Point, stroke: &str, stroke_width: f32) {
            self.svg.draw_line(from, to, stroke, stroke_width);
        }

        fn draw_polygon(
            &mut self,
            points: &[(f32, f32)],
            fill: &str,
            stroke: &str,
            stroke_width: f32,
        ) {
            self.svg.draw_polygon(points, fill, stroke, stroke_width);
        }

        fn draw_text(&mut self, text: &str, center: Point, color: &str) {
            self.svg.draw_text(text, center, color);
        }

        fn encode(self) -> Result<Vec<u8>> {
            let svg = self.svg.into_svg();
            let mut opt = usvg::Options::default();
            opt.font_family = self.font_family;
            opt.fontdb = self.fontdb;

            let tree = usvg::Tree::from_str(&svg, &opt)
                .map_err(|err| RenderError::Svg(err.to_string()))?;
            let ImageSize { width, height } = self.size;
            let mut pixmap = tiny_skia::Pixmap::new(width, height)
                .ok_or(RenderError::SurfaceAllocation { width, height })?;
            resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
            tracing::debug!(width, height, "rasterized area map");

            pixmap
                .encode_png()
                .map_err(|err| RenderError::Encode(err.to_string()))
        }
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_surface_escapes_labels() {
        let size = ImageSize {
            width: 64,
            height: 32,
        };
        let mut surface = SvgSurface::new(size, &Theme::classic());
        surface.draw_text("Tom & <Jerry>", Point::new(10, 10), "#000000");
        let svg = surface.into_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"64\" height=\"32\""));
        assert!(svg.contains("Tom &amp; &lt;Jerry&gt;"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn display_list_encodes_as_json() {
        let mut list = DisplayList::new(ImageSize {
            width: 10,
            height: 10,
        });
        list.draw_line(Point::new(0, 0), Point::new(5, 0), "#000000", 1.0);
        let bytes = list.encode().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["ops"][0]["op"], "line");
        assert_eq!(value["size"]["width"], 10);
    }
}

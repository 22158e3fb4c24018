use crate::canvas::{Command, Document, Page};
use crate::error::{QuoteDocError, Result};
use crate::font::{FontKey, FontRegistry};
use crate::types::{Color, Pt};
use rayon::prelude::*;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};
use ttf_parser::{GlyphId, OutlineBuilder};

pub const DEFAULT_DPI: u32 = 144;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterPage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, document: &Document, fonts: &FontRegistry) -> Result<Vec<RasterPage>>;
}

#[derive(Debug, Clone, Copy)]
pub struct SkiaRasterizer {
    dpi: u32,
}

impl Default for SkiaRasterizer {
    fn default() -> Self {
        Self { dpi: DEFAULT_DPI }
    }
}

impl SkiaRasterizer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }
}

impl Rasterizer for SkiaRasterizer {
    fn rasterize(&self, document: &Document, fonts: &FontRegistry) -> Result<Vec<RasterPage>> {
        let width = pt_milli_to_px_u32(document.page_size.width.to_milli_i64(), self.dpi)?;
        let height = pt_milli_to_px_u32(document.page_size.height.to_milli_i64(), self.dpi)?;
        let scale = self.dpi as f32 / 72.0;
        document
            .pages
            .par_iter()
            .map(|page| render_page(page, width, height, scale, fonts))
            .collect()
    }
}

#[derive(Clone)]
struct RasterState {
    fill_color: Color,
    stroke_color: Color,
    line_width: Pt,
    font: Option<(FontKey, Pt)>,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_width: Pt::from_f32(1.0),
            font: None,
        }
    }
}

fn render_page(
    page: &Page,
    width: u32,
    height: u32,
    scale: f32,
    fonts: &FontRegistry,
) -> Result<RasterPage> {
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        QuoteDocError::Raster(format!("invalid raster size {width}x{height}"))
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);
    let transform = Transform::from_scale(scale, scale);
    let mut state = RasterState::default();
    let mut faces = FaceCache::new(fonts);

    for command in &page.commands {
        match command {
            Command::Meta { .. } => {}
            Command::SetFillColor(color) => state.fill_color = *color,
            Command::SetStrokeColor(color) => state.stroke_color = *color,
            Command::SetLineWidth(width) => state.line_width = *width,
            Command::SetFont { key, size } => state.font = Some((*key, *size)),
            Command::FillRect {
                x,
                y,
                width,
                height,
                radius,
            } => {
                if let Some(path) = box_path(*x, *y, *width, *height, *radius) {
                    pixmap.fill_path(
                        &path,
                        &fill_paint(state.fill_color),
                        FillRule::Winding,
                        transform,
                        None,
                    );
                }
            }
            Command::StrokeRect {
                x,
                y,
                width,
                height,
                radius,
            } => {
                if let Some(path) = box_path(*x, *y, *width, *height, *radius) {
                    pixmap.stroke_path(
                        &path,
                        &fill_paint(state.stroke_color),
                        &build_stroke(&state),
                        transform,
                        None,
                    );
                }
            }
            Command::StrokeLine { x1, y1, x2, y2 } => {
                let mut pb = PathBuilder::new();
                pb.move_to(x1.to_f32(), y1.to_f32());
                pb.line_to(x2.to_f32(), y2.to_f32());
                if let Some(path) = pb.finish() {
                    pixmap.stroke_path(
                        &path,
                        &fill_paint(state.stroke_color),
                        &build_stroke(&state),
                        transform,
                        None,
                    );
                }
            }
            Command::DrawString { x, y, text } => {
                draw_string(&mut pixmap, &state, *x, *y, text, transform, &mut faces)?;
            }
        }
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
    }
    Ok(RasterPage { width, height, rgb })
}

// Faces parsed at most once per page.
struct FaceCache<'a> {
    fonts: &'a FontRegistry,
    parsed: HashMap<usize, ttf_parser::Face<'a>>,
}

impl<'a> FaceCache<'a> {
    fn new(fonts: &'a FontRegistry) -> Self {
        Self {
            fonts,
            parsed: HashMap::new(),
        }
    }

    fn get(&mut self, key: FontKey) -> Result<&ttf_parser::Face<'a>> {
        let fonts: &'a FontRegistry = self.fonts;
        let Some((index, font)) = fonts.resolve_indexed(key) else {
            return Err(QuoteDocError::Raster(
                "no font face registered; text cannot be drawn".to_string(),
            ));
        };
        match self.parsed.entry(index) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let face = ttf_parser::Face::parse(&font.data, 0).map_err(|err| {
                    QuoteDocError::Raster(format!("font {} failed to parse: {err}", font.name))
                })?;
                Ok(entry.insert(face))
            }
        }
    }
}

fn draw_string(
    pixmap: &mut Pixmap,
    state: &RasterState,
    x: Pt,
    y: Pt,
    text: &str,
    transform: Transform,
    faces: &mut FaceCache<'_>,
) -> Result<()> {
    let Some((key, size)) = state.font else {
        return Ok(());
    };
    let font_size = size.to_f32();
    if font_size <= 0.0 || text.trim().is_empty() {
        return Ok(());
    }
    let face = faces.get(key)?;
    let upem = face.units_per_em().max(1) as f32;
    let glyph_scale = font_size / upem;
    let paint = fill_paint(state.fill_color);
    let baseline = y.to_f32();
    let mut pen_x = x.to_f32();

    for ch in text.chars() {
        let gid = face.glyph_index(ch).unwrap_or(GlyphId(0));
        if gid.0 != 0 {
            let mut builder = GlyphPathBuilder::new(glyph_scale);
            if face.outline_glyph(gid, &mut builder).is_some() {
                if let Some(path) = builder.finish() {
                    // Font units grow upward; flip onto the y-down page.
                    let local = Transform::from_row(1.0, 0.0, 0.0, -1.0, pen_x, baseline);
                    pixmap.fill_path(
                        &path,
                        &paint,
                        FillRule::Winding,
                        transform.pre_concat(local),
                        None,
                    );
                }
            }
        }
        let advance = face
            .glyph_hor_advance(gid)
            .map(|w| w as f32 * glyph_scale)
            .unwrap_or(font_size * 0.5);
        pen_x += advance;
    }
    Ok(())
}

struct GlyphPathBuilder {
    builder: PathBuilder,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            scale,
        }
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x * self.scale, y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x * self.scale, y * self.scale);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder
            .quad_to(x1 * self.scale, y1 * self.scale, x * self.scale, y * self.scale);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            x1 * self.scale,
            y1 * self.scale,
            x2 * self.scale,
            y2 * self.scale,
            x * self.scale,
            y * self.scale,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn box_path(x: Pt, y: Pt, width: Pt, height: Pt, radius: Pt) -> Option<Path> {
    let (x, y, w, h) = (x.to_f32(), y.to_f32(), width.to_f32(), height.to_f32());
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = radius.to_f32().clamp(0.0, w.min(h) / 2.0);
    if r <= 0.0 {
        return Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect);
    }
    let (right, bottom) = (x + w, y + h);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.quad_to(right, y, right, y + r);
    pb.line_to(right, bottom - r);
    pb.quad_to(right, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.quad_to(x, bottom, x, bottom - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

fn build_stroke(state: &RasterState) -> Stroke {
    Stroke {
        width: state.line_width.to_f32().max(0.0),
        ..Stroke::default()
    }
}

fn fill_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    let [r, g, b] = color.to_rgb8();
    paint.set_color_rgba8(r, g, b, 255);
    paint.anti_alias = true;
    paint
}

fn pt_milli_to_px_u32(pt_milli: i64, dpi: u32) -> Result<u32> {
    if dpi == 0 {
        return Err(QuoteDocError::Raster("dpi must be > 0".to_string()));
    }
    let num = (pt_milli as i128).saturating_mul(dpi as i128);
    let den = 72_000_i128;
    let px = (num + den / 2) / den;
    if px <= 0 {
        return Err(QuoteDocError::Raster(format!(
            "invalid non-positive pixel dimension {px} for pt_milli={pt_milli} dpi={dpi}"
        )));
    }
    u32::try_from(px).map_err(|_| {
        QuoteDocError::Raster(format!(
            "pixel dimension out of range: {px} for pt_milli={pt_milli} dpi={dpi}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::font::test_registry;
    use crate::types::Size;

    fn pixel(page: &RasterPage, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * page.width + x) * 3) as usize;
        [page.rgb[i], page.rgb[i + 1], page.rgb[i + 2]]
    }

    #[test]
    fn a4_page_size_at_72_and_144_dpi() {
        let doc = Canvas::new(Size::a4()).finish();
        let fonts = FontRegistry::new();
        let pages = SkiaRasterizer::new(72).rasterize(&doc, &fonts).unwrap();
        assert_eq!((pages[0].width, pages[0].height), (595, 842));
        let pages = SkiaRasterizer::default().rasterize(&doc, &fonts).unwrap();
        assert_eq!((pages[0].width, pages[0].height), (1191, 1684));
        assert_eq!(pages[0].rgb.len(), 1191 * 1684 * 3);
    }

    #[test]
    fn filled_boxes_land_where_the_canvas_put_them() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_fill_color(Color::hex(0xdc2626));
        canvas.fill_rect(
            Pt::from_f32(10.0),
            Pt::from_f32(10.0),
            Pt::from_f32(20.0),
            Pt::from_f32(20.0),
            Pt::ZERO,
        );
        let doc = canvas.finish();
        let pages = SkiaRasterizer::new(72)
            .rasterize(&doc, &FontRegistry::new())
            .unwrap();
        assert_eq!(pixel(&pages[0], 20, 20), [0xdc, 0x26, 0x26]);
        assert_eq!(pixel(&pages[0], 50, 50), [255, 255, 255]);
    }

    #[test]
    fn zero_dpi_is_rejected() {
        let doc = Canvas::new(Size::a4()).finish();
        let err = SkiaRasterizer::new(0)
            .rasterize(&doc, &FontRegistry::new())
            .unwrap_err();
        assert!(matches!(err, QuoteDocError::Raster(_)));
    }

    fn hello_at(canvas: &mut Canvas) {
        canvas.set_font(
            FontKey::new(crate::style::FontFamily::Sans, 400, false),
            Pt::from_f32(24.0),
        );
        canvas.draw_string(Pt::from_f32(10.0), Pt::from_f32(40.0), "Hello");
    }

    #[test]
    fn text_without_any_face_is_an_error() {
        let mut canvas = Canvas::new(Size::a4());
        hello_at(&mut canvas);
        let doc = canvas.finish();
        let err = SkiaRasterizer::new(36)
            .rasterize(&doc, &FontRegistry::new())
            .unwrap_err();
        assert!(matches!(err, QuoteDocError::Raster(_)));
    }

    #[test]
    fn blank_text_needs_no_face() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_font(
            FontKey::new(crate::style::FontFamily::Sans, 400, false),
            Pt::from_f32(12.0),
        );
        canvas.draw_string(Pt::from_f32(10.0), Pt::from_f32(20.0), "  ");
        let doc = canvas.finish();
        let pages = SkiaRasterizer::new(36)
            .rasterize(&doc, &FontRegistry::new())
            .unwrap();
        assert!(pages[0].rgb.iter().all(|v| *v == 255));
    }

    #[test]
    fn registered_face_draws_glyphs_near_the_baseline() {
        let mut canvas = Canvas::new(Size::a4());
        hello_at(&mut canvas);
        let doc = canvas.finish();
        let pages = SkiaRasterizer::new(72)
            .rasterize(&doc, &test_registry())
            .unwrap();
        let page = &pages[0];
        let mut dark = 0;
        for y in 0..page.height {
            for x in 0..page.width {
                let [r, g, b] = pixel(page, x, y);
                if r < 128 && g < 128 && b < 128 {
                    dark += 1;
                    // Cap height of 24pt text sits between y=20 and the baseline.
                    assert!((15..=42).contains(&y), "ink at {x},{y}");
                    assert!((8..=100).contains(&x), "ink at {x},{y}");
                }
            }
        }
        assert!(dark > 50);
    }
}

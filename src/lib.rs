mod canvas;
mod debug;
mod doc_template;
mod download;
mod editor;
mod error;
mod export;
mod flowable;
mod font;
mod frame;
mod layout;
mod model;
mod notice;
mod page_template;
mod pdf;
mod raster;
mod render;
mod stage;
mod store;
mod style;
mod template;
mod types;
mod view;

pub use canvas::{Canvas, Command, Document as CanvasDocument, Page as CanvasPage};
pub use doc_template::{DocTemplate, META_PAGE_TEMPLATE_KEY};
pub use download::{DirectorySink, DownloadSink, MemorySink};
pub use editor::{EditorAction, EditorSession};
pub use error::{QuoteDocError, Result};
pub use export::{ExportOutcome, ExportReport, RenderedPdf};
pub use flowable::{
    Anchor, BreakAfter, BreakInside, ContainerFlowable, Flowable, Metrics, PageBreak, Pagination,
    Spacer, TextBlock,
};
pub use font::{FontKey, FontRegistry};
pub use frame::{AddResult, Frame};
pub use layout::{
    CONTENT_GAP_PX, LayoutSettings, META_LOGICAL_PAGE_KEY, META_PHYSICAL_PAGE_KEY,
    PAGE_PADDING_PX,
};
pub use model::{ContentItem, ContentType, Document, PAGE_COUNT, Page, Quotation, is_valid_page};
pub use notice::{EXPORT_FAILED_MESSAGE, LogNotifier, Notice, NoticeLevel, NoticeLog, Notifier};
pub use page_template::{OnPageCallback, PageContext, PageTemplate};
pub use pdf::{DEFAULT_JPEG_QUALITY, PdfInfo};
pub use raster::{DEFAULT_DPI, RasterPage, Rasterizer, SkiaRasterizer};
pub use render::{
    Brand, EMPTY_PAGE_MESSAGE, RenderTarget, editor_rows, export_views, item_body, render_editor,
    render_page,
};
pub use stage::{Container, Mounted, SHEET_WIDTH_PX, Stage};
pub use store::{JsonFileStore, MemoryStore, TemplateStore};
pub use style::{
    BannerStyle, BlockStyle, Border, BorderSides, EdgeSizes, FontFamily, TextAlign, banner_style,
    placeholder_style, resolve_style,
};
pub use types::{Color, Margins, Pt, Rect, Size};
pub use view::{Block, Body, ItemBlock, PageView};

use debug::DebugLogger;
use export::ExportJob;
use std::path::PathBuf;
use std::sync::Arc;

const MIN_DPI: u32 = 36;
const MAX_DPI: u32 = 600;
const DEFAULT_MARGIN_MM: f32 = 15.0;

pub struct QuoteDoc {
    brand: Brand,
    layout: LayoutSettings,
    rasterizer: Arc<dyn Rasterizer>,
    jpeg_quality: u8,
    debug: Option<DebugLogger>,
}

#[derive(Clone)]
pub struct QuoteDocBuilder {
    brand: Brand,
    page_size: Size,
    margins: Margins,
    dpi: u32,
    jpeg_quality: u8,
    font_dirs: Vec<PathBuf>,
    font_files: Vec<PathBuf>,
    system_fonts: bool,
    debug_path: Option<PathBuf>,
    rasterizer: Option<Arc<dyn Rasterizer>>,
}

impl Default for QuoteDocBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteDocBuilder {
    pub fn new() -> Self {
        Self {
            brand: Brand::default(),
            page_size: Size::a4(),
            margins: Margins::all_mm(DEFAULT_MARGIN_MM),
            dpi: DEFAULT_DPI,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            font_dirs: Vec::new(),
            font_files: Vec::new(),
            system_fonts: true,
            debug_path: None,
            rasterizer: None,
        }
    }

    pub fn organization(mut self, name: impl Into<String>) -> Self {
        self.brand.organization = name.into();
        self
    }

    pub fn tagline(mut self, tagline: impl Into<String>) -> Self {
        self.brand.tagline = tagline.into();
        self
    }

    pub fn page_size(mut self, size: Size) -> Self {
        self.page_size = size;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn margins_mm(mut self, mm: f32) -> Self {
        self.margins = Margins::all_mm(mm);
        self
    }

    /// Raster resolution of exported pages. Ignored when a custom rasterizer is set.
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn register_font_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(path.into());
        self
    }

    pub fn register_font_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_files.push(path.into());
        self
    }

    // Probe the platform font directories (plus QUOTEDOC_FONT_DIR) at build time.
    pub fn system_fonts(mut self, enabled: bool) -> Self {
        self.system_fonts = enabled;
        self
    }

    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.rasterizer = Some(Arc::new(rasterizer));
        self
    }

    pub fn build(self) -> Result<QuoteDoc> {
        if self.brand.organization.trim().is_empty() {
            return Err(QuoteDocError::InvalidConfiguration(
                "organization name cannot be empty".to_string(),
            ));
        }
        if self.rasterizer.is_none() && !(MIN_DPI..=MAX_DPI).contains(&self.dpi) {
            return Err(QuoteDocError::InvalidConfiguration(format!(
                "dpi must be within {MIN_DPI}..={MAX_DPI}, got {}",
                self.dpi
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(QuoteDocError::InvalidConfiguration(format!(
                "jpeg quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        let m = self.margins;
        if [m.top, m.right, m.bottom, m.left].iter().any(|v| *v < Pt::ZERO) {
            return Err(QuoteDocError::InvalidConfiguration(
                "margins cannot be negative".to_string(),
            ));
        }
        let content = m.content_rect(self.page_size);
        if content.width <= Pt::ZERO || content.height <= Pt::ZERO {
            return Err(QuoteDocError::InvalidConfiguration(
                "margins leave no room for content".to_string(),
            ));
        }
        let padding = content.width * (2.0 * PAGE_PADDING_PX / SHEET_WIDTH_PX);
        if content.height <= padding {
            return Err(QuoteDocError::InvalidConfiguration(
                "page is too short for the page padding".to_string(),
            ));
        }

        let mut registry = FontRegistry::new();
        for dir in &self.font_dirs {
            registry.register_dir(dir);
        }
        for file in &self.font_files {
            if !registry.register_file(file) {
                log::warn!("could not load font file {}", file.display());
            }
        }
        if self.system_fonts {
            registry.register_system_fonts();
        }
        log::debug!("{} fonts registered", registry.len());
        if registry.is_empty() && self.rasterizer.is_none() {
            log::warn!("no font faces registered; PDF export will fail until one is added");
        }

        let debug = match self.debug_path {
            Some(path) => Some(DebugLogger::new(path)?),
            None => None,
        };
        let rasterizer = self
            .rasterizer
            .unwrap_or_else(|| Arc::new(SkiaRasterizer::new(self.dpi)));

        Ok(QuoteDoc {
            brand: self.brand,
            layout: LayoutSettings {
                page_size: self.page_size,
                margins: self.margins,
                fonts: Arc::new(registry),
            },
            rasterizer,
            jpeg_quality: self.jpeg_quality,
            debug,
        })
    }
}

impl QuoteDoc {
    pub fn builder() -> QuoteDocBuilder {
        QuoteDocBuilder::new()
    }

    pub fn brand(&self) -> &Brand {
        &self.brand
    }

    pub fn layout_settings(&self) -> &LayoutSettings {
        &self.layout
    }

    pub fn open_template(&self, quotation: &Quotation) -> EditorSession {
        log::info!("opening quotation template for {}", quotation.id);
        EditorSession::new(Document::standard_template())
    }

    pub fn render_page_html(&self, number: u32, page: &Page, editing: bool) -> String {
        render_page(&self.brand, number, page, RenderTarget::Interactive { editing }).to_html()
    }

    pub fn render_editor_html(&self, session: &EditorSession) -> String {
        render_editor(&self.brand, session)
    }

    pub fn layout_document(&self, document: &Document) -> Result<CanvasDocument> {
        let views = export_views(&self.brand, document);
        layout::layout_views(&views, &self.layout, self.debug.as_ref())
    }

    pub fn render_pdf(&self, document: &Document) -> Result<RenderedPdf> {
        let mut stage = Stage::new();
        self.export_job().render(&mut stage, document)
    }

    /// Exports `document` and hands the PDF to `sink`.
    ///
    /// The document is snapshotted on entry. Failures are reported through
    /// `notifier` and the log; nothing reaches `sink` unless the PDF is complete.
    pub fn download_pdf(
        &self,
        quotation: &Quotation,
        document: &Document,
        stage: &mut Stage,
        sink: &mut dyn DownloadSink,
        notifier: &mut dyn Notifier,
    ) -> ExportOutcome {
        self.export_job()
            .download(quotation, document, stage, sink, notifier)
    }

    fn export_job(&self) -> ExportJob<'_> {
        ExportJob {
            brand: &self.brand,
            layout: &self.layout,
            rasterizer: self.rasterizer.as_ref(),
            jpeg_quality: self.jpeg_quality,
            debug: self.debug.as_ref(),
        }
    }
}

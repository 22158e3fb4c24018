use crate::debug::DebugLogger;
use crate::download::DownloadSink;
use crate::error::{QuoteDocError, Result};
use crate::layout::{self, LayoutSettings};
use crate::model::{Document, Quotation};
use crate::notice::{EXPORT_FAILED_MESSAGE, Notice, Notifier};
use crate::pdf::{self, PdfInfo};
use crate::raster::Rasterizer;
use crate::render::{Brand, export_views};
use crate::stage::Stage;
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub file_name: String,
    pub path: Option<PathBuf>,
    pub pdf_pages: usize,
    pub skipped_pages: Vec<u32>,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Downloaded(ExportReport),
    Failed,
}

impl ExportOutcome {
    pub fn is_downloaded(&self) -> bool {
        matches!(self, ExportOutcome::Downloaded(_))
    }

    pub fn report(&self) -> Option<&ExportReport> {
        match self {
            ExportOutcome::Downloaded(report) => Some(report),
            ExportOutcome::Failed => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub pdf_pages: usize,
    pub skipped_pages: Vec<u32>,
}

pub(crate) struct ExportJob<'a> {
    pub brand: &'a Brand,
    pub layout: &'a LayoutSettings,
    pub rasterizer: &'a dyn Rasterizer,
    pub jpeg_quality: u8,
    pub debug: Option<&'a DebugLogger>,
}

impl ExportJob<'_> {
    fn trace(&self, event: serde_json::Value) {
        if let Some(debug) = self.debug {
            debug.log(event);
        }
    }

    pub fn render(&self, stage: &mut Stage, document: &Document) -> Result<RenderedPdf> {
        let skipped_pages: Vec<u32> = document
            .pages()
            .filter(|(_, page)| page.is_empty())
            .map(|(number, _)| number)
            .collect();
        let views = export_views(self.brand, document);
        if views.is_empty() {
            return Err(QuoteDocError::InvalidDocument(
                "no page has content to export".to_string(),
            ));
        }
        let numbers: Vec<u32> = views.iter().map(|v| v.number).collect();
        self.trace(json!({
            "type": "export.views",
            "pages": numbers,
            "skipped": &skipped_pages,
        }));

        let mounted = stage.mount(views);
        let laid_out = layout::layout_views(mounted.views(), self.layout, self.debug)?;
        let rasters = self.rasterizer.rasterize(&laid_out, &self.layout.fonts)?;
        if rasters.len() != laid_out.pages.len() {
            return Err(QuoteDocError::Raster(format!(
                "rasterizer returned {} pages for {} laid out",
                rasters.len(),
                laid_out.pages.len()
            )));
        }
        let info = PdfInfo {
            title: format!("{} Quotation Template", self.brand.organization),
            author: self.brand.organization.clone(),
        };
        let bytes =
            pdf::assemble_image_pdf(&rasters, laid_out.page_size, self.jpeg_quality, &info)?;
        drop(mounted);

        Ok(RenderedPdf {
            bytes,
            pdf_pages: rasters.len(),
            skipped_pages,
        })
    }

    /// Full download flow. Never returns an error: failures become a notice.
    pub fn download(
        &self,
        quotation: &Quotation,
        document: &Document,
        stage: &mut Stage,
        sink: &mut dyn DownloadSink,
        notifier: &mut dyn Notifier,
    ) -> ExportOutcome {
        let snapshot = document.clone();
        let file_name = self.brand.export_file_name();
        log::info!("exporting quotation {} as {file_name}", quotation.id);

        let result = self.render(stage, &snapshot).and_then(|rendered| {
            let path = sink.deliver(&file_name, &rendered.bytes)?;
            Ok(ExportReport {
                file_name: file_name.clone(),
                path,
                pdf_pages: rendered.pdf_pages,
                skipped_pages: rendered.skipped_pages,
                bytes: rendered.bytes.len(),
            })
        });

        let outcome = match result {
            Ok(report) => {
                log::info!(
                    "exported {} pages for quotation {}",
                    report.pdf_pages,
                    quotation.id
                );
                self.trace(json!({
                    "type": "export.done",
                    "quotation": quotation.id,
                    "file": report.file_name,
                    "pdf_pages": report.pdf_pages,
                    "bytes": report.bytes,
                }));
                notifier.notify(Notice::info(format!("Downloaded {file_name}")));
                ExportOutcome::Downloaded(report)
            }
            Err(err) => {
                log::error!("PDF export failed for quotation {}: {err}", quotation.id);
                self.trace(json!({
                    "type": "export.failed",
                    "quotation": quotation.id,
                    "error": err.to_string(),
                }));
                notifier.notify(Notice::error(EXPORT_FAILED_MESSAGE));
                ExportOutcome::Failed
            }
        };
        if let Some(debug) = self.debug {
            debug.emit_summary("export");
            debug.flush();
        }
        outcome
    }
}

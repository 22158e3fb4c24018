use crate::canvas::Document as CanvasDocument;
use crate::debug::DebugLogger;
use crate::doc_template::DocTemplate;
use crate::error::Result;
use crate::flowable::{Anchor, ContainerFlowable, Flowable, Metrics, PageBreak, Spacer, TextBlock};
use crate::font::FontRegistry;
use crate::page_template::PageTemplate;
use crate::stage::SHEET_WIDTH_PX;
use crate::style::{self, BULLET_PREFIX};
use crate::types::{Margins, Rect, Size};
use crate::view::{Block, Body, PageView};
use std::sync::Arc;

pub const META_LOGICAL_PAGE_KEY: &str = "qd.logical_page";
pub const META_PHYSICAL_PAGE_KEY: &str = "qd.physical_page";
pub const PAGE_PADDING_PX: f32 = 40.0;
pub const CONTENT_GAP_PX: f32 = 20.0;

#[derive(Debug, Clone)]
pub struct LayoutSettings {
    pub page_size: Size,
    pub margins: Margins,
    pub fonts: Arc<FontRegistry>,
}

impl LayoutSettings {
    pub fn content_rect(&self) -> Rect {
        self.margins.content_rect(self.page_size)
    }

    pub fn pt_per_px(&self) -> f32 {
        self.content_rect().width.to_f32() / SHEET_WIDTH_PX
    }

    fn metrics(&self) -> Metrics {
        Metrics::new(self.fonts.clone(), self.pt_per_px())
    }
}

pub fn layout_views(
    views: &[PageView],
    settings: &LayoutSettings,
    debug: Option<&DebugLogger>,
) -> Result<CanvasDocument> {
    let metrics = settings.metrics();
    let padding = metrics.px(PAGE_PADDING_PX);
    let content = settings.content_rect();
    let frame = Rect {
        x: content.x + padding,
        y: content.y + padding,
        width: content.width - padding * 2,
        height: content.height - padding * 2,
    };
    let template = PageTemplate::new("quotation", settings.page_size)
        .with_frame(frame)
        .set_on_page(|canvas, ctx| {
            canvas.meta(META_PHYSICAL_PAGE_KEY, ctx.page_number.to_string());
        });

    let mut doc = DocTemplate::new(vec![template]).with_debug(debug.cloned());
    for view in views {
        for flowable in view_flowables(view, &metrics) {
            doc.add_flowable(flowable);
        }
    }
    doc.build()
}

fn view_flowables(view: &PageView, metrics: &Metrics) -> Vec<Box<dyn Flowable>> {
    let mut out: Vec<Box<dyn Flowable>> = Vec::with_capacity(view.blocks.len() + 4);
    out.push(Box::new(Anchor::new(
        META_LOGICAL_PAGE_KEY,
        view.number.to_string(),
    )));
    let mut content_started = false;
    for block in &view.blocks {
        match block {
            Block::Banner {
                organization,
                tagline,
                title,
            } => out.push(Box::new(banner(organization, tagline, title, metrics))),
            Block::Item(item) => {
                if !content_started {
                    out.push(Box::new(Spacer::new(metrics.px(CONTENT_GAP_PX))));
                    content_started = true;
                }
                let block = match &item.body {
                    Body::Text(text) => TextBlock::new(text.clone(), item.style, metrics.clone()),
                    Body::Bullet(text) => TextBlock::new(
                        format!("{BULLET_PREFIX}{text}"),
                        item.style,
                        metrics.clone(),
                    ),
                    Body::Columns(parts) => {
                        TextBlock::columns(parts.clone(), item.style, metrics.clone())
                    }
                    Body::Editor { text, .. } => {
                        TextBlock::new(text.clone(), item.style, metrics.clone())
                    }
                };
                out.push(Box::new(block));
            }
            Block::Placeholder(message) => out.push(Box::new(TextBlock::new(
                message.clone(),
                style::placeholder_style(),
                metrics.clone(),
            ))),
        }
    }
    if view.break_after {
        out.push(Box::new(PageBreak));
    }
    out
}

fn banner(organization: &str, tagline: &str, title: &str, metrics: &Metrics) -> ContainerFlowable {
    let styles = style::banner_style();
    let children: Vec<Box<dyn Flowable>> = vec![
        Box::new(TextBlock::new(organization, styles.organization, metrics.clone())),
        Box::new(TextBlock::new(tagline, styles.tagline, metrics.clone())),
        Box::new(TextBlock::new(title, styles.title, metrics.clone())),
    ];
    ContainerFlowable::new(children, styles.container, metrics.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentItem, ContentType, Document, Page};
    use crate::render::{Brand, export_views};

    fn settings() -> LayoutSettings {
        LayoutSettings {
            page_size: Size::a4(),
            margins: Margins::all_mm(15.0),
            fonts: Arc::new(FontRegistry::new()),
        }
    }

    fn logical_pages(doc: &CanvasDocument) -> Vec<Vec<String>> {
        doc.pages
            .iter()
            .map(|p| p.meta(META_LOGICAL_PAGE_KEY).map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn sheet_maps_onto_the_a4_content_box() {
        let s = settings();
        // 595.28 - 2 * 42.52 = 510.24pt across 794px.
        assert!((s.pt_per_px() - 510.24 / 794.0).abs() < 0.001);
    }

    #[test]
    fn each_logical_page_starts_a_physical_page() {
        let doc = Document::standard_template();
        let views = export_views(&Brand::default(), &doc);
        let laid_out = layout_views(&views, &settings(), None).unwrap();
        let starts: Vec<String> = logical_pages(&laid_out)
            .into_iter()
            .filter_map(|anchors| anchors.first().cloned())
            .collect();
        let expected: Vec<String> = (1..=14).map(|n| n.to_string()).collect();
        assert_eq!(starts, expected);
        assert!(laid_out.pages.len() >= 14);
    }

    #[test]
    fn long_pages_continue_on_extra_physical_pages() {
        let mut pages: Vec<Page> = Document::standard_template()
            .pages()
            .map(|(_, p)| p.clone())
            .collect();
        let items = (0..120)
            .map(|i| ContentItem::new(ContentType::Paragraph, format!("Clause {i}: terms apply.")))
            .collect();
        pages[0] = Page::new("Long", items);
        let doc = Document::new(pages).unwrap();
        let views = export_views(&Brand::default(), &doc);
        let laid_out = layout_views(&views[..2], &settings(), None).unwrap();
        let anchors = logical_pages(&laid_out);
        assert!(anchors.len() > 2);
        assert_eq!(anchors[0], vec!["1"]);
        assert!(anchors[1].is_empty());
        assert_eq!(anchors.last().unwrap(), &vec!["2".to_string()]);
    }

    #[test]
    fn banner_text_is_drawn_first() {
        let doc = Document::standard_template();
        let views = export_views(&Brand::default(), &doc);
        let laid_out = layout_views(&views[..1], &settings(), None).unwrap();
        let runs: Vec<&str> = laid_out.pages[0].text_runs().collect();
        assert_eq!(runs[0], "UK Power Networks");
        assert_eq!(runs[1], "Delivering your electricity");
    }
}

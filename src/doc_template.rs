use crate::canvas::{Canvas, Document};
use crate::debug::DebugLogger;
use crate::error::{QuoteDocError, Result};
use crate::flowable::{BreakAfter, Flowable};
use crate::frame::{AddResult, Frame};
use crate::page_template::{PageContext, PageTemplate};
use serde_json::json;
use std::collections::VecDeque;

pub const META_PAGE_TEMPLATE_KEY: &str = "qd.page_template";

pub struct DocTemplate {
    page_templates: Vec<PageTemplate>,
    story: Vec<Box<dyn Flowable>>,
    debug: Option<DebugLogger>,
}

// page n uses templates[min(n-1, len-1)]; the last template repeats.
fn select_template(page_templates: &[PageTemplate], page_number: usize) -> &PageTemplate {
    let idx = page_number
        .saturating_sub(1)
        .min(page_templates.len().saturating_sub(1));
    &page_templates[idx]
}

fn open_page(canvas: &mut Canvas, template: &PageTemplate, page_number: usize) -> Vec<Frame> {
    if let Some(callback) = template.on_page() {
        callback(
            canvas,
            &PageContext {
                page_number,
                template_name: template.name.clone(),
            },
        );
    }
    canvas.meta(META_PAGE_TEMPLATE_KEY, template.name.clone());
    template.instantiate_frames()
}

impl DocTemplate {
    pub fn new(page_templates: Vec<PageTemplate>) -> Self {
        Self {
            page_templates,
            story: Vec::new(),
            debug: None,
        }
    }

    pub(crate) fn with_debug(mut self, debug: Option<DebugLogger>) -> Self {
        self.debug = debug;
        self
    }

    pub fn add_flowable(&mut self, flowable: Box<dyn Flowable>) {
        self.story.push(flowable);
    }

    pub fn build(self) -> Result<Document> {
        if self.page_templates.is_empty() {
            return Err(QuoteDocError::Layout("no page template".into()));
        }
        if self.page_templates.iter().any(|t| t.frame_rects().is_empty()) {
            return Err(QuoteDocError::Layout("page template without frames".into()));
        }

        let debug = self.debug.clone();
        let log_page_break = |from_page: usize, reason: &str, flowable: &str| {
            let Some(logger) = debug.as_ref() else {
                return;
            };
            logger.log(json!({
                "type": "layout.page_break",
                "reason": reason,
                "from_page": from_page,
                "to_page": from_page + 1,
                "flowable": flowable,
            }));
            logger.increment("layout.page_break", 1);
        };

        let first = select_template(&self.page_templates, 1);
        let mut canvas = Canvas::new(first.page_size);
        let mut page_number = 1usize;
        let mut frames = open_page(&mut canvas, first, page_number);
        let mut frame_index = 0usize;
        let mut placed_on_page = false;

        let mut story: VecDeque<Box<dyn Flowable>> = self.story.into();
        while let Some(mut current) = story.pop_front() {
            loop {
                let name = current.debug_name();
                let pagination = current.pagination();
                if frame_index >= frames.len() {
                    log_page_break(page_number, "frame_exhausted", name);
                    canvas.show_page();
                    page_number += 1;
                    let template = select_template(&self.page_templates, page_number);
                    frames = open_page(&mut canvas, template, page_number);
                    frame_index = 0;
                    placed_on_page = false;
                }

                let is_last_frame = frame_index + 1 >= frames.len();
                match frames[frame_index].add(current, &mut canvas) {
                    AddResult::Placed => {
                        placed_on_page = true;
                        if pagination.break_after == BreakAfter::Page {
                            log_page_break(page_number, "break_after_page", name);
                            canvas.show_page();
                            page_number += 1;
                            let template = select_template(&self.page_templates, page_number);
                            frames = open_page(&mut canvas, template, page_number);
                            frame_index = 0;
                            placed_on_page = false;
                        }
                        break;
                    }
                    AddResult::Split(rest) => {
                        placed_on_page = true;
                        log_page_break(page_number, "flowable_split", name);
                        current = rest;
                        frame_index += 1;
                    }
                    AddResult::Overflow(rest) => {
                        if !placed_on_page && is_last_frame {
                            return Err(QuoteDocError::Layout(format!(
                                "{name} does not fit on page {page_number}"
                            )));
                        }
                        log_page_break(page_number, "frame_overflow", name);
                        current = rest;
                        frame_index += 1;
                    }
                }
            }
        }

        // A trailing forced break leaves an opened page with nothing placed on it.
        if !placed_on_page && page_number > 1 {
            canvas.discard_current();
        }
        let document = canvas.finish();
        if let Some(logger) = &self.debug {
            logger.log(json!({
                "type": "layout.done",
                "pages": document.pages.len(),
            }));
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowable::{Anchor, PageBreak, Spacer};
    use crate::types::{Margins, Pt, Size};

    struct Solid(Pt);

    impl Flowable for Solid {
        fn wrap(&self, avail_width: Pt, _: Pt) -> Size {
            Size {
                width: avail_width,
                height: self.0,
            }
        }

        fn split(&self, _: Pt, _: Pt) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
            None
        }

        fn draw(&self, _: &mut Canvas, _: Pt, _: Pt, _: Pt, _: Pt) {}
    }

    fn template() -> PageTemplate {
        PageTemplate::single_frame("body", Size::a4(), Margins::all_mm(15.0))
    }

    fn anchors(doc: &Document) -> Vec<Vec<String>> {
        doc.pages
            .iter()
            .map(|page| page.meta("page").map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn forced_breaks_start_new_pages() {
        let mut doc = DocTemplate::new(vec![template()]);
        doc.add_flowable(Box::new(Anchor::new("page", "1")));
        doc.add_flowable(Box::new(PageBreak));
        doc.add_flowable(Box::new(Anchor::new("page", "2")));
        doc.add_flowable(Box::new(PageBreak));
        let built = doc.build().unwrap();
        assert_eq!(anchors(&built), vec![vec!["1"], vec!["2"]]);
    }

    #[test]
    fn overflow_continues_on_the_next_page() {
        let mut doc = DocTemplate::new(vec![template()]);
        doc.add_flowable(Box::new(Anchor::new("page", "1")));
        for _ in 0..3 {
            doc.add_flowable(Box::new(Solid(Pt::from_f32(300.0))));
        }
        doc.add_flowable(Box::new(Anchor::new("page", "end")));
        let built = doc.build().unwrap();
        assert_eq!(built.pages.len(), 2);
        assert_eq!(anchors(&built)[1], vec!["end"]);
    }

    #[test]
    fn on_page_runs_for_every_page() {
        let template = template().set_on_page(|canvas, ctx| {
            canvas.meta("physical", ctx.page_number.to_string());
        });
        let mut doc = DocTemplate::new(vec![template]);
        doc.add_flowable(Box::new(PageBreak));
        doc.add_flowable(Box::new(Spacer::new(Pt::from_f32(10.0))));
        let built = doc.build().unwrap();
        let physical: Vec<Vec<&str>> = built
            .pages
            .iter()
            .map(|p| p.meta("physical").collect())
            .collect();
        assert_eq!(physical, vec![vec!["1"], vec!["2"]]);
    }

    #[test]
    fn missing_templates_are_a_layout_error() {
        let err = DocTemplate::new(Vec::new()).build().unwrap_err();
        assert!(matches!(err, QuoteDocError::Layout(_)));
    }
}

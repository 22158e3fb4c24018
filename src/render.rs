use crate::editor::EditorSession;
use crate::model::{ContentItem, ContentType, Document, PAGE_COUNT, Page};
use crate::style::resolve_style;
use crate::view::{Block, Body, ItemBlock, PageView, escape_html};

pub const EMPTY_PAGE_MESSAGE: &str = "No content on this page";
const EDITOR_CHARS_PER_ROW: usize = 80;
const EDITOR_MIN_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brand {
    pub organization: String,
    pub tagline: String,
}

impl Default for Brand {
    fn default() -> Self {
        Self {
            organization: "UK Power Networks".to_string(),
            tagline: "Delivering your electricity".to_string(),
        }
    }
}

impl Brand {
    pub fn export_file_name(&self) -> String {
        let stem: String = self
            .organization
            .trim()
            .chars()
            .map(|ch| {
                if ch.is_alphanumeric() || ch == '-' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        let stem = if stem.is_empty() { "Quotation" } else { &stem };
        format!("{stem}_Quotation_Template.pdf")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Interactive { editing: bool },
    Export,
}

pub fn render_page(brand: &Brand, number: u32, page: &Page, target: RenderTarget) -> PageView {
    let mut blocks = Vec::with_capacity(page.content().len() + 1);
    blocks.push(Block::Banner {
        organization: brand.organization.clone(),
        tagline: brand.tagline.clone(),
        title: page.title.clone(),
    });
    if page.is_empty() {
        blocks.push(Block::Placeholder(EMPTY_PAGE_MESSAGE.to_string()));
    }
    let editing = matches!(target, RenderTarget::Interactive { editing: true });
    for (index, item) in page.content().iter().enumerate() {
        let body = if editing {
            Body::Editor {
                page: number,
                index,
                text: item.text().to_string(),
                rows: editor_rows(item.text()),
            }
        } else {
            item_body(item)
        };
        blocks.push(Block::Item(ItemBlock {
            index,
            kind: item.kind(),
            style: resolve_style(item.kind(), item.bold(), item.italic()),
            body,
        }));
    }
    PageView {
        number,
        blocks,
        break_after: false,
    }
}

pub fn item_body(item: &ContentItem) -> Body {
    let text = item.text();
    if item.kind() == ContentType::Bullet {
        return Body::Bullet(text.to_string());
    }
    if text.contains('\t') {
        return Body::Columns(text.split('\t').map(str::to_string).collect());
    }
    Body::Text(text.to_string())
}

pub fn editor_rows(text: &str) -> usize {
    text.chars()
        .count()
        .div_ceil(EDITOR_CHARS_PER_ROW)
        .max(EDITOR_MIN_ROWS)
}

/// Export views of every non-empty page, each but the last forcing a page break.
pub fn export_views(brand: &Brand, document: &Document) -> Vec<PageView> {
    let mut views: Vec<PageView> = document
        .pages()
        .filter(|(number, page)| {
            if page.is_empty() {
                log::debug!("skipping empty page {number}");
            }
            !page.is_empty()
        })
        .map(|(number, page)| {
            let mut view = render_page(brand, number, page, RenderTarget::Export);
            view.break_after = true;
            view
        })
        .collect();
    if let Some(last) = views.last_mut() {
        last.break_after = false;
    }
    views
}

pub fn render_editor(brand: &Brand, session: &EditorSession) -> String {
    let (current, page) = session.current_view();
    let editing = session.editing();
    let organization = escape_html(&brand.organization);
    let mut out = String::from("<div class=\"qd-editor\">");

    out.push_str("<div class=\"qd-toolbar\"><div>");
    out.push_str(&format!(
        "<h2>{organization} Template - Page {current} of {PAGE_COUNT}</h2>"
    ));
    out.push_str(&format!("<p>{PAGE_COUNT}-Page Quotation Template</p></div>"));
    out.push_str("<div class=\"qd-actions\">");
    out.push_str("<button data-action=\"download\">Download PDF</button>");
    if editing {
        out.push_str("<button data-action=\"save\">Save Template</button>");
    }
    out.push_str(&format!(
        "<button data-action=\"toggle-edit\">{}</button>",
        if editing { "Cancel Edit" } else { "Edit Template" }
    ));
    out.push_str("</div></div>");

    out.push_str("<div class=\"qd-sheet\">");
    match page {
        Some(page) => {
            let view = render_page(brand, current, page, RenderTarget::Interactive { editing });
            out.push_str(&view.to_html());
        }
        None => out.push_str(&format!(
            "<p class=\"qd-missing\">Page {current} content not available</p>"
        )),
    }
    out.push_str("</div>");

    out.push_str("<nav class=\"qd-nav\">");
    out.push_str(&format!(
        "<button data-action=\"prev\"{}>Previous Page</button>",
        if current == 1 { " disabled" } else { "" }
    ));
    out.push_str("<span>Page</span><select data-action=\"select\">");
    for number in 1..=PAGE_COUNT {
        let selected = if number == current { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{number}\"{selected}>{number}</option>"
        ));
    }
    out.push_str(&format!("</select><span>of {PAGE_COUNT}</span>"));
    out.push_str(&format!(
        "<button data-action=\"next\"{}>Next Page</button>",
        if current == PAGE_COUNT { " disabled" } else { "" }
    ));
    out.push_str("</nav></div>");
    out
}

use crate::model::ContentType;
use crate::style::{self, BlockStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    Bullet(String),
    Columns(Vec<String>),
    /// Editable field routed back to the editor by `(page, index)`.
    Editor {
        page: u32,
        index: usize,
        text: String,
        rows: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemBlock {
    pub index: usize,
    pub kind: ContentType,
    pub style: BlockStyle,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Banner {
        organization: String,
        tagline: String,
        title: String,
    },
    Item(ItemBlock),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub number: u32,
    pub blocks: Vec<Block>,
    pub break_after: bool,
}

impl PageView {
    pub fn items(&self) -> impl Iterator<Item = &ItemBlock> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Item(item) => Some(item),
            _ => None,
        })
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let page_break = if self.break_after {
            " style=\"page-break-after:always;\""
        } else {
            ""
        };
        out.push_str(&format!(
            "<section class=\"qd-page\" data-page=\"{}\"{}>",
            self.number, page_break
        ));
        let mut in_content = false;
        for block in &self.blocks {
            match block {
                Block::Banner {
                    organization,
                    tagline,
                    title,
                } => write_banner(&mut out, organization, tagline, title),
                Block::Item(item) => {
                    if !in_content {
                        out.push_str("<div class=\"qd-content\" style=\"margin-top:20px;\">");
                        in_content = true;
                    }
                    write_item(&mut out, item);
                }
                Block::Placeholder(message) => {
                    out.push_str(&format!(
                        "<p class=\"qd-empty\" style=\"{}\">{}</p>",
                        style::placeholder_style().to_css(),
                        escape_html(message)
                    ));
                }
            }
        }
        if in_content {
            out.push_str("</div>");
        }
        out.push_str("</section>");
        out
    }
}

fn write_banner(out: &mut String, organization: &str, tagline: &str, title: &str) {
    let banner = style::banner_style();
    out.push_str(&format!(
        "<header class=\"qd-banner\" style=\"{}\">",
        banner.container.to_css()
    ));
    out.push_str(&format!(
        "<h1 style=\"{}\">{}</h1>",
        banner.organization.to_css(),
        escape_html(organization)
    ));
    out.push_str(&format!(
        "<p style=\"{}\">{}</p>",
        banner.tagline.to_css(),
        escape_html(tagline)
    ));
    out.push_str(&format!(
        "<h2 style=\"{}\">{}</h2>",
        banner.title.to_css(),
        escape_html(title)
    ));
    out.push_str("</header>");
}

fn write_item(out: &mut String, item: &ItemBlock) {
    let css = item.style.to_css();
    let kind = item.kind.as_str();
    match &item.body {
        Body::Text(text) => {
            out.push_str(&format!(
                "<div class=\"qd-item qd-{kind}\" style=\"{css}\">{}</div>",
                escape_html(text)
            ));
        }
        Body::Bullet(text) => {
            out.push_str(&format!(
                "<div class=\"qd-item qd-{kind}\" style=\"{css}\">{}{}</div>",
                style::BULLET_PREFIX,
                escape_html(text)
            ));
        }
        Body::Columns(parts) => {
            out.push_str(&format!(
                "<div class=\"qd-item qd-{kind}\" style=\"{css}\">"
            ));
            for part in parts {
                out.push_str(&format!(
                    "<span class=\"qd-col\" style=\"display:inline-block;min-width:{}px;vertical-align:top;padding-right:{}px;\">{}</span>",
                    style::COLUMN_MIN_WIDTH,
                    style::COLUMN_GAP,
                    escape_html(part)
                ));
            }
            out.push_str("</div>");
        }
        Body::Editor {
            page,
            index,
            text,
            rows,
        } => {
            out.push_str(&format!(
                "<textarea class=\"qd-item qd-{kind}\" data-page=\"{page}\" data-index=\"{index}\" rows=\"{rows}\" style=\"{css}width:100%;resize:none;\">{}</textarea>",
                escape_html(text)
            ));
        }
    }
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::resolve_style;

    fn item(kind: ContentType, body: Body) -> Block {
        Block::Item(ItemBlock {
            index: 0,
            kind,
            style: resolve_style(kind, false, false),
            body,
        })
    }

    #[test]
    fn escapes_markup_in_item_text() {
        let view = PageView {
            number: 3,
            blocks: vec![item(
                ContentType::Text,
                Body::Text("<b>Tom & \"Jerry\"</b>".to_string()),
            )],
            break_after: false,
        };
        let html = view.to_html();
        assert!(html.contains("&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn columns_render_in_segment_order() {
        let view = PageView {
            number: 2,
            blocks: vec![item(
                ContentType::TableRow,
                Body::Columns(vec!["left".into(), "middle".into(), "right".into()]),
            )],
            break_after: true,
        };
        let html = view.to_html();
        assert_eq!(html.matches("class=\"qd-col\"").count(), 3);
        let left = html.find(">left<").unwrap();
        let middle = html.find(">middle<").unwrap();
        let right = html.find(">right<").unwrap();
        assert!(left < middle && middle < right);
        assert!(html.contains("page-break-after:always"));
    }

    #[test]
    fn editor_body_carries_routing_attributes() {
        let view = PageView {
            number: 5,
            blocks: vec![item(
                ContentType::Paragraph,
                Body::Editor {
                    page: 5,
                    index: 0,
                    text: "draft".into(),
                    rows: 2,
                },
            )],
            break_after: false,
        };
        let html = view.to_html();
        assert!(html.contains("<textarea"));
        assert!(html.contains("data-page=\"5\" data-index=\"0\" rows=\"2\""));
        assert!(html.contains(">draft</textarea>"));
    }
}

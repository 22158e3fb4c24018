use crate::error::{QuoteDocError, Result};
use serde::{Deserialize, Serialize};

pub const PAGE_COUNT: u32 = 14;

pub fn is_valid_page(page: u32) -> bool {
    (1..=PAGE_COUNT).contains(&page)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    Header,
    Subheader,
    Paragraph,
    Text,
    Greeting,
    Address,
    Bullet,
    TableHeader,
    TableRow,
    Reference,
    /// Any type name outside the known set; styled like `Text`.
    #[serde(other)]
    Unknown,
}

impl ContentType {
    pub const ALL: [ContentType; 11] = [
        ContentType::Header,
        ContentType::Subheader,
        ContentType::Paragraph,
        ContentType::Text,
        ContentType::Greeting,
        ContentType::Address,
        ContentType::Bullet,
        ContentType::TableHeader,
        ContentType::TableRow,
        ContentType::Reference,
        ContentType::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Header => "header",
            ContentType::Subheader => "subheader",
            ContentType::Paragraph => "paragraph",
            ContentType::Text => "text",
            ContentType::Greeting => "greeting",
            ContentType::Address => "address",
            ContentType::Bullet => "bullet",
            ContentType::TableHeader => "table-header",
            ContentType::TableRow => "table-row",
            ContentType::Reference => "reference",
            ContentType::Unknown => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    kind: ContentType,
    text: String,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    italic: bool,
}

impl ContentItem {
    pub fn new(kind: ContentType, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn kind(&self) -> ContentType {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn italic(&self) -> bool {
        self.italic
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    #[serde(default)]
    content: Vec<ContentItem>,
}

impl Page {
    pub fn new(title: impl Into<String>, content: Vec<ContentItem>) -> Self {
        Self {
            title: title.into(),
            content,
        }
    }

    pub fn content(&self) -> &[ContentItem] {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quotation {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
}

impl Quotation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            customer: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Result<Self> {
        if pages.len() != PAGE_COUNT as usize {
            return Err(QuoteDocError::InvalidDocument(format!(
                "expected {} pages, found {}",
                PAGE_COUNT,
                pages.len()
            )));
        }
        Ok(Self { pages })
    }

    pub(crate) fn from_pages_unchecked(pages: Vec<Page>) -> Self {
        debug_assert_eq!(pages.len(), PAGE_COUNT as usize);
        Self { pages }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Document = serde_json::from_str(json)?;
        Self::new(raw.pages)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn page(&self, number: u32) -> Option<&Page> {
        if !is_valid_page(number) {
            return None;
        }
        self.pages.get(number as usize - 1)
    }

    pub fn item(&self, page: u32, index: usize) -> Option<&ContentItem> {
        self.page(page).and_then(|p| p.content.get(index))
    }

    pub fn pages(&self) -> impl Iterator<Item = (u32, &Page)> {
        self.pages
            .iter()
            .enumerate()
            .map(|(idx, page)| (idx as u32 + 1, page))
    }

    pub(crate) fn item_mut(&mut self, page: u32, index: usize) -> Option<&mut ContentItem> {
        if !is_valid_page(page) {
            return None;
        }
        self.pages
            .get_mut(page as usize - 1)
            .and_then(|p| p.content.get_mut(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_pages(count: usize) -> Vec<Page> {
        (0..count)
            .map(|idx| Page::new(format!("Page {}", idx + 1), Vec::new()))
            .collect()
    }

    #[test]
    fn valid_page_bounds() {
        assert!(!is_valid_page(0));
        assert!(is_valid_page(1));
        assert!(is_valid_page(14));
        assert!(!is_valid_page(15));
    }

    #[test]
    fn document_requires_fourteen_pages() {
        assert!(Document::new(blank_pages(14)).is_ok());
        let err = Document::new(blank_pages(13)).unwrap_err();
        assert!(matches!(err, QuoteDocError::InvalidDocument(_)));
    }

    #[test]
    fn page_lookup_is_one_based() {
        let doc = Document::new(blank_pages(14)).unwrap();
        assert_eq!(doc.page(1).unwrap().title, "Page 1");
        assert_eq!(doc.page(14).unwrap().title, "Page 14");
        assert!(doc.page(0).is_none());
        assert!(doc.page(15).is_none());
        let numbers: Vec<u32> = doc.pages().map(|(n, _)| n).collect();
        assert_eq!(numbers, (1..=14).collect::<Vec<_>>());
    }

    #[test]
    fn json_defaults_flags_and_maps_unknown_types() {
        let mut pages = vec![
            r#"{"title":"First","content":[{"type":"table-row","text":"a\tb"},{"type":"callout","text":"x","bold":true}]}"#
                .to_string(),
        ];
        for idx in 2..=14 {
            pages.push(format!(r#"{{"title":"P{idx}"}}"#));
        }
        let json = format!(r#"{{"pages":[{}]}}"#, pages.join(","));
        let doc = Document::from_json(&json).unwrap();
        assert!(doc.page(2).unwrap().is_empty());
        let first = doc.item(1, 0).unwrap();
        assert_eq!(first.kind(), ContentType::TableRow);
        assert!(!first.bold());
        assert_eq!(first.text(), "a\tb");
        let second = doc.item(1, 1).unwrap();
        assert_eq!(second.kind(), ContentType::Unknown);
        assert!(second.bold());
    }

    #[test]
    fn json_rejects_wrong_page_count() {
        let json = "{\"pages\":[{\"title\":\"Only\",\"content\":[]}]}";
        assert!(matches!(
            Document::from_json(json),
            Err(QuoteDocError::InvalidDocument(_))
        ));
    }
}

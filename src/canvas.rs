use crate::font::FontKey;
use crate::types::{Color, Pt, Size};

/// Drawing operations in page space: origin top-left, y grows downward, units are points.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Non-rendered metadata used for page-aware reporting. Ignored by the rasterizer.
    Meta {
        key: String,
        value: String,
    },
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(Pt),
    SetFont {
        key: FontKey,
        size: Pt,
    },
    FillRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        radius: Pt,
    },
    StrokeLine {
        x1: Pt,
        y1: Pt,
        x2: Pt,
        y2: Pt,
    },
    StrokeRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        radius: Pt,
    },
    /// `y` is the baseline.
    DrawString {
        x: Pt,
        y: Pt,
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub commands: Vec<Command>,
}

impl Page {
    pub fn meta(&self, key: &str) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(move |cmd| match cmd {
            Command::Meta { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn text_runs(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::DrawString { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub page_size: Size,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone)]
struct GraphicsState {
    fill_color: Color,
    stroke_color: Color,
    line_width: Pt,
    font: Option<(FontKey, Pt)>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_width: Pt::from_f32(1.0),
            font: None,
        }
    }
}

pub struct Canvas {
    page_size: Size,
    pages: Vec<Page>,
    current: Page,
    current_state: GraphicsState,
}

impl Canvas {
    pub fn new(page_size: Size) -> Self {
        Self {
            page_size,
            pages: Vec::new(),
            current: Page::default(),
            current_state: GraphicsState::default(),
        }
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn meta(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.current.commands.push(Command::Meta {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn set_fill_color(&mut self, color: Color) {
        if self.current_state.fill_color == color {
            return;
        }
        self.current_state.fill_color = color;
        self.current.commands.push(Command::SetFillColor(color));
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        if self.current_state.stroke_color == color {
            return;
        }
        self.current_state.stroke_color = color;
        self.current.commands.push(Command::SetStrokeColor(color));
    }

    pub fn set_line_width(&mut self, width: Pt) {
        let width = width.max(Pt::ZERO);
        if self.current_state.line_width == width {
            return;
        }
        self.current_state.line_width = width;
        self.current.commands.push(Command::SetLineWidth(width));
    }

    pub fn set_font(&mut self, key: FontKey, size: Pt) {
        if self.current_state.font == Some((key, size)) {
            return;
        }
        self.current_state.font = Some((key, size));
        self.current.commands.push(Command::SetFont { key, size });
    }

    pub fn fill_rect(&mut self, x: Pt, y: Pt, width: Pt, height: Pt, radius: Pt) {
        self.current.commands.push(Command::FillRect {
            x,
            y,
            width,
            height,
            radius,
        });
    }

    pub fn stroke_rect(&mut self, x: Pt, y: Pt, width: Pt, height: Pt, radius: Pt) {
        self.current.commands.push(Command::StrokeRect {
            x,
            y,
            width,
            height,
            radius,
        });
    }

    pub fn line(&mut self, x1: Pt, y1: Pt, x2: Pt, y2: Pt) {
        self.current
            .commands
            .push(Command::StrokeLine { x1, y1, x2, y2 });
    }

    pub fn draw_string(&mut self, x: Pt, y: Pt, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.current
            .commands
            .push(Command::DrawString { x, y, text });
    }

    pub fn is_current_empty(&self) -> bool {
        self.current.commands.is_empty()
    }

    pub fn current_command_count(&self) -> usize {
        self.current.commands.len()
    }

    pub fn discard_current(&mut self) {
        self.current.commands.clear();
        self.current_state = GraphicsState::default();
    }

    pub fn show_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.current_state = GraphicsState::default();
    }

    pub fn finish(mut self) -> Document {
        if !self.current.commands.is_empty() || self.pages.is_empty() {
            self.show_page();
        }
        Document {
            page_size: self.page_size,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::FontFamily;

    #[test]
    fn redundant_state_changes_are_elided() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_fill_color(Color::hex(0xdc2626));
        canvas.set_fill_color(Color::hex(0xdc2626));
        let key = FontKey::new(FontFamily::Sans, 400, false);
        canvas.set_font(key, Pt::from_f32(9.0));
        canvas.set_font(key, Pt::from_f32(9.0));
        canvas.draw_string(Pt::ZERO, Pt::ZERO, "");
        let doc = canvas.finish();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].commands.len(), 2);
    }

    #[test]
    fn show_page_resets_state() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_fill_color(Color::WHITE);
        canvas.show_page();
        canvas.set_fill_color(Color::WHITE);
        canvas.meta("page", "2");
        let doc = canvas.finish();
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[1].commands[0], Command::SetFillColor(Color::WHITE));
        assert_eq!(doc.pages[1].meta("page").collect::<Vec<_>>(), vec!["2"]);
    }

    #[test]
    fn finishing_an_unused_canvas_yields_one_blank_page() {
        let doc = Canvas::new(Size::a4()).finish();
        assert_eq!(doc.pages.len(), 1);
        assert!(doc.pages[0].commands.is_empty());
    }
}

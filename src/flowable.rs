use crate::canvas::Canvas;
use crate::font::{FontKey, FontRegistry};
use crate::style::{self, BlockStyle, BorderSides, TextAlign};
use crate::types::{Pt, Size};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakAfter {
    Auto,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakInside {
    Auto,
    Avoid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub break_after: BreakAfter,
    pub break_inside: BreakInside,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            break_after: BreakAfter::Auto,
            break_inside: BreakInside::Auto,
        }
    }
}

pub trait Flowable: Send + Sync {
    fn wrap(&self, avail_width: Pt, avail_height: Pt) -> Size;
    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)>;
    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, avail_height: Pt);

    fn pagination(&self) -> Pagination {
        Pagination::default()
    }

    fn debug_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[derive(Debug, Clone)]
pub struct Metrics {
    fonts: Arc<FontRegistry>,
    px: f32,
}

impl Metrics {
    pub fn new(fonts: Arc<FontRegistry>, pt_per_px: f32) -> Self {
        Self {
            fonts,
            px: pt_per_px,
        }
    }

    pub fn px(&self, value: f32) -> Pt {
        Pt::from_f32(value * self.px)
    }

    fn text_width(&self, key: FontKey, size: Pt, text: &str) -> Pt {
        self.fonts.measure_text_width(key, size, text)
    }

    fn ascent(&self, key: FontKey, size: Pt) -> Pt {
        match self.fonts.resolve(key) {
            Some(font) => font.ascent(size),
            None => size * 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    width: Pt,
    ends_paragraph: bool,
}

#[derive(Debug, Clone)]
enum Source {
    Columns(Vec<String>),
    // Pre-broken lines of a single column, produced by a split.
    Lines(Vec<Line>),
}

#[derive(Clone)]
pub struct TextBlock {
    source: Source,
    style: BlockStyle,
    metrics: Metrics,
    // Continuation pieces drop the box edge that sits on the split.
    open_top: bool,
    open_bottom: bool,
}

struct BoxEdges {
    margin_top: Pt,
    margin_bottom: Pt,
    margin_left: Pt,
    margin_right: Pt,
    inset_top: Pt,
    inset_bottom: Pt,
    inset_left: Pt,
    inset_right: Pt,
}

impl TextBlock {
    pub fn new(text: impl Into<String>, style: BlockStyle, metrics: Metrics) -> Self {
        Self::columns(vec![text.into()], style, metrics)
    }

    pub fn columns(columns: Vec<String>, style: BlockStyle, metrics: Metrics) -> Self {
        let columns = if columns.is_empty() {
            vec![String::new()]
        } else {
            columns
        };
        Self {
            source: Source::Columns(columns),
            style,
            metrics,
            open_top: false,
            open_bottom: false,
        }
    }

    fn font_key(&self) -> FontKey {
        FontKey::new(self.style.family, self.style.font_weight, self.style.italic)
    }

    fn font_size(&self) -> Pt {
        self.metrics.px(self.style.font_size)
    }

    fn line_box(&self) -> Pt {
        self.metrics.px(self.style.line_box())
    }

    fn edges(&self) -> BoxEdges {
        let m = &self.metrics;
        let s = &self.style;
        let (border_top, border_bottom, border_side) = match s.border {
            Some(border) if border.sides == BorderSides::All => {
                let w = m.px(border.width);
                (w, w, w)
            }
            Some(border) => (Pt::ZERO, m.px(border.width), Pt::ZERO),
            None => (Pt::ZERO, Pt::ZERO, Pt::ZERO),
        };
        let mut edges = BoxEdges {
            margin_top: m.px(s.margin.top),
            margin_bottom: m.px(s.margin.bottom),
            margin_left: m.px(s.margin.left),
            margin_right: m.px(s.margin.right),
            inset_top: border_top + m.px(s.padding.top),
            inset_bottom: border_bottom + m.px(s.padding.bottom),
            inset_left: border_side + m.px(s.padding.left),
            inset_right: border_side + m.px(s.padding.right),
        };
        if self.open_top {
            edges.margin_top = Pt::ZERO;
            edges.inset_top = Pt::ZERO;
        }
        if self.open_bottom {
            edges.margin_bottom = Pt::ZERO;
            edges.inset_bottom = Pt::ZERO;
        }
        edges
    }

    fn content_width(&self, avail_width: Pt) -> Pt {
        let e = self.edges();
        (avail_width - e.margin_left - e.margin_right - e.inset_left - e.inset_right).max(Pt::ZERO)
    }

    fn column_slots(&self, content_width: Pt, count: usize) -> Vec<(Pt, Pt)> {
        if count <= 1 {
            return vec![(Pt::ZERO, content_width)];
        }
        let gap = self.metrics.px(style::COLUMN_GAP);
        let min_slot = self.metrics.px(style::COLUMN_MIN_WIDTH + style::COLUMN_GAP);
        let n = count as i32;
        let mut slots = Vec::with_capacity(count);
        if min_slot * n <= content_width {
            for idx in 0..count {
                let x = min_slot * (idx as i32);
                let slot = if idx + 1 == count {
                    content_width - x
                } else {
                    min_slot
                };
                slots.push((x, (slot - gap).max(Pt::ZERO)));
            }
        } else {
            let slot = content_width / n;
            for idx in 0..count {
                slots.push((slot * (idx as i32), (slot - gap).max(Pt::ZERO)));
            }
        }
        slots
    }

    fn layout_columns(&self, avail_width: Pt) -> Vec<(Pt, Pt, Vec<Line>)> {
        let content_width = self.content_width(avail_width);
        match &self.source {
            Source::Lines(lines) => vec![(Pt::ZERO, content_width, lines.clone())],
            Source::Columns(columns) => {
                let slots = self.column_slots(content_width, columns.len());
                columns
                    .iter()
                    .zip(slots)
                    .map(|(text, (x, width))| (x, width, self.break_lines(text, width)))
                    .collect()
            }
        }
    }

    fn break_lines(&self, text: &str, max_width: Pt) -> Vec<Line> {
        let key = self.font_key();
        let size = self.font_size();
        let measure = |s: &str| self.metrics.text_width(key, size, s);
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = String::new();
            for word in paragraph.split(' ') {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if measure(&candidate) <= max_width || (current.is_empty() && word.is_empty()) {
                    current = candidate;
                    continue;
                }
                if !current.is_empty() {
                    let width = measure(&current);
                    lines.push(Line {
                        text: std::mem::take(&mut current),
                        width,
                        ends_paragraph: false,
                    });
                }
                // Words wider than the column break between characters.
                for ch in word.chars() {
                    let mut next = current.clone();
                    next.push(ch);
                    if !current.is_empty() && measure(&next) > max_width {
                        let width = measure(&current);
                        lines.push(Line {
                            text: std::mem::take(&mut current),
                            width,
                            ends_paragraph: false,
                        });
                        current.push(ch);
                    } else {
                        current = next;
                    }
                }
            }
            let width = measure(&current);
            lines.push(Line {
                text: current,
                width,
                ends_paragraph: true,
            });
        }
        lines
    }

    fn content_height(&self, columns: &[(Pt, Pt, Vec<Line>)]) -> Pt {
        let rows = columns
            .iter()
            .map(|(_, _, lines)| lines.len())
            .max()
            .unwrap_or(1)
            .max(1);
        self.line_box() * (rows as i32)
    }

    fn draw_line(&self, canvas: &mut Canvas, line: &Line, x: Pt, baseline: Pt, width: Pt) {
        let key = self.font_key();
        let size = self.font_size();
        match self.style.align {
            TextAlign::Center => {
                let offset = ((width - line.width) / 2).max(Pt::ZERO);
                canvas.draw_string(x + offset, baseline, line.text.clone());
            }
            TextAlign::Justify if !line.ends_paragraph && line.text.contains(' ') => {
                let words: Vec<&str> = line.text.split(' ').collect();
                let words_width: Pt = words
                    .iter()
                    .map(|w| self.metrics.text_width(key, size, w))
                    .sum();
                let gaps = (words.len() - 1) as i32;
                let gap = ((width - words_width) / gaps).max(Pt::ZERO);
                let mut cursor = x;
                for word in words {
                    canvas.draw_string(cursor, baseline, word);
                    cursor += self.metrics.text_width(key, size, word) + gap;
                }
            }
            _ => canvas.draw_string(x, baseline, line.text.clone()),
        }
    }
}

impl Flowable for TextBlock {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        let e = self.edges();
        let columns = self.layout_columns(avail_width);
        let height = e.margin_top
            + e.inset_top
            + self.content_height(&columns)
            + e.inset_bottom
            + e.margin_bottom;
        Size {
            width: avail_width,
            height,
        }
    }

    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        let columns = self.layout_columns(avail_width);
        if columns.len() != 1 {
            return None;
        }
        let lines = &columns[0].2;
        let e = self.edges();
        let usable = avail_height - e.margin_top - e.inset_top;
        let lh = self.line_box().to_milli_i64();
        if lh <= 0 || usable <= Pt::ZERO {
            return None;
        }
        let fit = (usable.to_milli_i64() / lh) as usize;
        if fit == 0 || fit >= lines.len() {
            return None;
        }
        let mut first = self.clone();
        first.source = Source::Lines(lines[..fit].to_vec());
        first.open_bottom = true;
        let mut second = self.clone();
        second.source = Source::Lines(lines[fit..].to_vec());
        second.open_top = true;
        Some((Box::new(first), Box::new(second)))
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        let e = self.edges();
        let columns = self.layout_columns(avail_width);
        let box_x = x + e.margin_left;
        let box_y = y + e.margin_top;
        let box_w = avail_width - e.margin_left - e.margin_right;
        let box_h = e.inset_top + self.content_height(&columns) + e.inset_bottom;
        let radius = self.metrics.px(self.style.radius);

        if let Some(background) = self.style.background {
            canvas.set_fill_color(background);
            canvas.fill_rect(box_x, box_y, box_w, box_h, radius);
        }
        if let Some(border) = self.style.border {
            let width = self.metrics.px(border.width);
            canvas.set_stroke_color(border.color);
            canvas.set_line_width(width);
            match border.sides {
                BorderSides::All => {
                    let half = width / 2;
                    canvas.stroke_rect(
                        box_x + half,
                        box_y + half,
                        box_w - width,
                        box_h - width,
                        radius,
                    );
                }
                BorderSides::Bottom if !self.open_bottom => {
                    let line_y = box_y + box_h - width / 2;
                    canvas.line(box_x, line_y, box_x + box_w, line_y);
                }
                BorderSides::Bottom => {}
            }
        }

        let key = self.font_key();
        let size = self.font_size();
        let line_box = self.line_box();
        let lead = (line_box - size) / 2 + self.metrics.ascent(key, size);
        canvas.set_fill_color(self.style.color);
        canvas.set_font(key, size);
        let content_x = box_x + e.inset_left;
        let content_y = box_y + e.inset_top;
        for (col_x, width, lines) in &columns {
            for (row, line) in lines.iter().enumerate() {
                let baseline = content_y + line_box * (row as i32) + lead;
                self.draw_line(canvas, line, content_x + *col_x, baseline, *width);
            }
        }
    }

    fn debug_name(&self) -> &'static str {
        "TextBlock"
    }
}

/// Stacks children inside a styled box. Never split.
pub struct ContainerFlowable {
    children: Vec<Box<dyn Flowable>>,
    style: BlockStyle,
    metrics: Metrics,
}

impl ContainerFlowable {
    pub fn new(children: Vec<Box<dyn Flowable>>, style: BlockStyle, metrics: Metrics) -> Self {
        Self {
            children,
            style,
            metrics,
        }
    }

    fn insets(&self) -> (Pt, Pt, Pt) {
        let m = &self.metrics;
        let border = self.style.border.map(|b| m.px(b.width)).unwrap_or(Pt::ZERO);
        (
            m.px(self.style.margin.top) + m.px(self.style.padding.top),
            m.px(self.style.padding.bottom) + border,
            m.px(self.style.margin.bottom),
        )
    }

    fn inner_width(&self, avail_width: Pt) -> Pt {
        let m = &self.metrics;
        (avail_width
            - m.px(self.style.margin.left + self.style.margin.right)
            - m.px(self.style.padding.left + self.style.padding.right))
        .max(Pt::ZERO)
    }
}

impl Flowable for ContainerFlowable {
    fn wrap(&self, avail_width: Pt, avail_height: Pt) -> Size {
        let (top, bottom, margin_bottom) = self.insets();
        let inner = self.inner_width(avail_width);
        let children: Pt = self
            .children
            .iter()
            .map(|child| child.wrap(inner, avail_height).height)
            .sum();
        Size {
            width: avail_width,
            height: top + children + bottom + margin_bottom,
        }
    }

    fn split(&self, _: Pt, _: Pt) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, avail_height: Pt) {
        let m = &self.metrics;
        let (top, bottom, margin_bottom) = self.insets();
        let box_x = x + m.px(self.style.margin.left);
        let box_w = avail_width - m.px(self.style.margin.left + self.style.margin.right);
        let box_y = y + m.px(self.style.margin.top);
        let size = self.wrap(avail_width, avail_height);
        let box_h = size.height - margin_bottom - m.px(self.style.margin.top);
        if let Some(background) = self.style.background {
            canvas.set_fill_color(background);
            canvas.fill_rect(box_x, box_y, box_w, box_h, m.px(self.style.radius));
        }
        let inner_x = box_x + m.px(self.style.padding.left);
        let inner = self.inner_width(avail_width);
        let mut cursor = y + top;
        for child in &self.children {
            let h = child.wrap(inner, avail_height).height;
            child.draw(canvas, inner_x, cursor, inner, h);
            cursor += h;
        }
        if let Some(border) = self.style.border {
            let width = m.px(border.width);
            canvas.set_stroke_color(border.color);
            canvas.set_line_width(width);
            let line_y = cursor + bottom - width / 2;
            canvas.line(box_x, line_y, box_x + box_w, line_y);
        }
    }

    fn pagination(&self) -> Pagination {
        Pagination {
            break_after: BreakAfter::Auto,
            break_inside: BreakInside::Avoid,
        }
    }

    fn debug_name(&self) -> &'static str {
        "ContainerFlowable"
    }
}

#[derive(Clone)]
pub struct Spacer {
    height: Pt,
}

impl Spacer {
    pub fn new(height: Pt) -> Self {
        Self { height }
    }
}

impl Flowable for Spacer {
    fn wrap(&self, avail_width: Pt, avail_height: Pt) -> Size {
        Size {
            width: avail_width,
            height: self.height.min(avail_height.max(Pt::ZERO)),
        }
    }

    fn split(&self, _: Pt, _: Pt) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, _: &mut Canvas, _: Pt, _: Pt, _: Pt, _: Pt) {}

    fn debug_name(&self) -> &'static str {
        "Spacer"
    }
}

#[derive(Clone)]
pub struct Anchor {
    key: String,
    value: String,
}

impl Anchor {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Flowable for Anchor {
    fn wrap(&self, avail_width: Pt, _: Pt) -> Size {
        Size {
            width: avail_width,
            height: Pt::ZERO,
        }
    }

    fn split(&self, _: Pt, _: Pt) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, canvas: &mut Canvas, _: Pt, _: Pt, _: Pt, _: Pt) {
        canvas.meta(self.key.clone(), self.value.clone());
    }

    fn debug_name(&self) -> &'static str {
        "Anchor"
    }
}

#[derive(Clone, Default)]
pub struct PageBreak;

impl Flowable for PageBreak {
    fn wrap(&self, avail_width: Pt, _: Pt) -> Size {
        Size {
            width: avail_width,
            height: Pt::ZERO,
        }
    }

    fn split(&self, _: Pt, _: Pt) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, _: &mut Canvas, _: Pt, _: Pt, _: Pt, _: Pt) {}

    fn pagination(&self) -> Pagination {
        Pagination {
            break_after: BreakAfter::Page,
            break_inside: BreakInside::Auto,
        }
    }

    fn debug_name(&self) -> &'static str {
        "PageBreak"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::model::ContentType;
    use crate::style::resolve_style;
    use crate::types::Size as PageSize;

    fn metrics() -> Metrics {
        Metrics::new(Arc::new(FontRegistry::new()), 1.0)
    }

    fn strings(canvas: Canvas) -> Vec<(f32, String)> {
        canvas.finish().pages[0]
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::DrawString { x, text, .. } => Some((x.to_f32(), text.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn text_height_counts_lines_and_box_edges() {
        // 12px text, 0.5em approximation: 6pt per char. 100pt holds 16 chars.
        let style = resolve_style(ContentType::Text, false, false);
        let block = TextBlock::new("aaaa bbbb cccc dddd eeee", style, metrics());
        let size = block.wrap(Pt::from_f32(100.0), Pt::from_f32(1000.0));
        // Two lines of 19.2 plus the 8px bottom margin.
        assert!((size.height.to_f32() - (2.0 * 19.2 + 8.0)).abs() < 0.01);
    }

    #[test]
    fn empty_text_keeps_one_blank_line() {
        let style = resolve_style(ContentType::Text, false, false);
        let block = TextBlock::new("", style, metrics());
        let size = block.wrap(Pt::from_f32(100.0), Pt::from_f32(1000.0));
        assert!((size.height.to_f32() - (19.2 + 8.0)).abs() < 0.01);
    }

    #[test]
    fn overlong_words_break_between_characters() {
        let style = resolve_style(ContentType::Text, false, false);
        let block = TextBlock::new("x".repeat(40), style, metrics());
        let lines = block.break_lines(&"x".repeat(40), Pt::from_f32(60.0));
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.text.chars().count() == 10));
    }

    #[test]
    fn columns_draw_left_to_right() {
        let style = resolve_style(ContentType::TableRow, false, false);
        let block = TextBlock::columns(
            vec!["one".into(), "two".into(), "three".into()],
            style,
            metrics(),
        );
        let mut canvas = Canvas::new(PageSize::a4());
        block.draw(&mut canvas, Pt::ZERO, Pt::ZERO, Pt::from_f32(900.0), Pt::from_f32(100.0));
        let drawn = strings(canvas);
        assert_eq!(
            drawn.iter().map(|(_, t)| t.as_str()).collect::<Vec<_>>(),
            vec!["one", "two", "three"]
        );
        assert!(drawn[0].0 < drawn[1].0 && drawn[1].0 < drawn[2].0);
        // Fixed-width slots: 270px apart once they fit.
        assert!((drawn[1].0 - drawn[0].0 - 270.0).abs() < 0.01);
    }

    #[test]
    fn narrow_rows_share_width_equally() {
        let style = resolve_style(ContentType::TableRow, false, false);
        let block = TextBlock::columns(vec!["a".into(), "b".into()], style, metrics());
        let mut canvas = Canvas::new(PageSize::a4());
        block.draw(&mut canvas, Pt::ZERO, Pt::ZERO, Pt::from_f32(420.0), Pt::from_f32(100.0));
        let drawn = strings(canvas);
        // 420 minus 20px horizontal padding leaves 400, split in two.
        assert!((drawn[1].0 - drawn[0].0 - 200.0).abs() < 0.01);
    }

    #[test]
    fn paragraph_splits_on_line_boundaries() {
        let style = resolve_style(ContentType::Paragraph, false, false);
        let text = vec!["word"; 60].join(" ");
        let block = TextBlock::new(text, style, metrics());
        let width = Pt::from_f32(120.0);
        let total = block.wrap(width, Pt::from_f32(10_000.0)).height;
        let (first, second) = block.split(width, Pt::from_f32(60.0)).unwrap();
        let first_h = first.wrap(width, Pt::from_f32(60.0)).height;
        assert!(first_h <= Pt::from_f32(60.0));
        let second_h = second.wrap(width, Pt::from_f32(10_000.0)).height;
        assert_eq!(
            (first_h + second_h).to_milli_i64(),
            total.to_milli_i64()
        );
    }

    #[test]
    fn multi_column_rows_do_not_split() {
        let style = resolve_style(ContentType::TableRow, false, false);
        let block = TextBlock::columns(vec!["a".into(), "b".into()], style, metrics());
        assert!(block.split(Pt::from_f32(600.0), Pt::from_f32(5.0)).is_none());
    }

    #[test]
    fn justified_lines_fill_the_width_except_the_last() {
        let style = resolve_style(ContentType::Paragraph, false, false);
        let block = TextBlock::new("aa bb cc dd ee ff gg", style, metrics());
        let mut canvas = Canvas::new(PageSize::a4());
        block.draw(&mut canvas, Pt::ZERO, Pt::ZERO, Pt::from_f32(60.0), Pt::from_f32(500.0));
        let drawn = strings(canvas);
        // "aa bb cc dd" is 66pt wide, so rows hold "aa bb cc" then the remainder.
        let first_row_last = drawn.iter().find(|(_, t)| t == "cc").unwrap();
        assert!((first_row_last.0 + 12.0 - 60.0).abs() < 0.01);
    }

    #[test]
    fn page_break_requests_a_new_page() {
        assert_eq!(PageBreak.pagination().break_after, BreakAfter::Page);
        assert_eq!(
            Spacer::new(Pt::from_f32(4.0)).pagination().break_after,
            BreakAfter::Auto
        );
    }
}

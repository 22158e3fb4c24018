use crate::model::ContentType;
use crate::types::Color;

pub const BODY_FONT_SIZE: f32 = 12.0;
pub const BODY_LINE_HEIGHT: f32 = 1.6;
pub const COLUMN_MIN_WIDTH: f32 = 250.0;
pub const COLUMN_GAP: f32 = 20.0;
pub const BULLET_PREFIX: &str = "\u{2022} ";

pub const WEIGHT_NORMAL: u16 = 400;
pub const WEIGHT_MEDIUM: u16 = 500;
pub const WEIGHT_SEMIBOLD: u16 = 600;
pub const WEIGHT_BOLD: u16 = 700;

const BRAND_RED: Color = Color::hex(0xdc2626);
const INK: Color = Color::hex(0x000000);
const INK_DARK: Color = Color::hex(0x333333);
const INK_MUTED: Color = Color::hex(0x666666);
const INK_SOFT: Color = Color::hex(0x6b7280);
const SHADE: Color = Color::hex(0xf9f9f9);
const SHADE_TABLE: Color = Color::hex(0xf3f4f6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Sans,
    Monospace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderSides {
    All,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub width: f32,
    pub color: Color,
    pub sides: BorderSides,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeSizes {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeSizes {
    pub const fn zero() -> Self {
        Self {
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
            left: 0.0,
        }
    }

    pub const fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub const fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStyle {
    pub font_size: f32,
    pub font_weight: u16,
    pub italic: bool,
    pub family: FontFamily,
    pub color: Color,
    pub line_height: f32,
    pub align: TextAlign,
    pub margin: EdgeSizes,
    pub padding: EdgeSizes,
    pub background: Option<Color>,
    pub border: Option<Border>,
    pub radius: f32,
}

impl Default for BlockStyle {
    fn default() -> Self {
        Self {
            font_size: BODY_FONT_SIZE,
            font_weight: WEIGHT_NORMAL,
            italic: false,
            family: FontFamily::Sans,
            color: INK,
            line_height: BODY_LINE_HEIGHT,
            align: TextAlign::Left,
            margin: EdgeSizes {
                bottom: 12.0,
                ..EdgeSizes::zero()
            },
            padding: EdgeSizes::zero(),
            background: None,
            border: None,
            radius: 0.0,
        }
    }
}

impl BlockStyle {
    pub fn is_bold(&self) -> bool {
        self.font_weight >= WEIGHT_BOLD
    }

    pub fn line_box(&self) -> f32 {
        self.font_size * self.line_height
    }

    pub fn to_css(&self) -> String {
        let mut out = format!(
            "font-size:{}px;font-weight:{};line-height:{};color:{};",
            fmt_px(self.font_size),
            self.font_weight,
            fmt_px(self.line_height),
            self.color.to_css()
        );
        if self.italic {
            out.push_str("font-style:italic;");
        }
        if self.family == FontFamily::Monospace {
            out.push_str("font-family:monospace;");
        }
        match self.align {
            TextAlign::Left => {}
            TextAlign::Center => out.push_str("text-align:center;"),
            TextAlign::Justify => out.push_str("text-align:justify;"),
        }
        if !self.margin.is_zero() {
            out.push_str(&format!("margin:{};", edges_css(&self.margin)));
        }
        if !self.padding.is_zero() {
            out.push_str(&format!("padding:{};", edges_css(&self.padding)));
        }
        if let Some(background) = self.background {
            out.push_str(&format!("background-color:{};", background.to_css()));
        }
        if let Some(border) = self.border {
            let prop = match border.sides {
                BorderSides::All => "border",
                BorderSides::Bottom => "border-bottom",
            };
            out.push_str(&format!(
                "{prop}:{}px solid {};",
                fmt_px(border.width),
                border.color.to_css()
            ));
        }
        if self.radius > 0.0 {
            out.push_str(&format!("border-radius:{}px;", fmt_px(self.radius)));
        }
        out
    }
}

/// Maps an item's type and emphasis flags to its presentation.
///
/// Total over every input: unknown types take the `text` preset, `bold`
/// forces weight 700, `italic` forces an italic face.
pub fn resolve_style(kind: ContentType, bold: bool, italic: bool) -> BlockStyle {
    let base = BlockStyle::default();
    let mut style = match kind {
        ContentType::Header => BlockStyle {
            font_size: 16.0,
            font_weight: WEIGHT_BOLD,
            color: BRAND_RED,
            margin: EdgeSizes {
                top: 20.0,
                bottom: 16.0,
                ..EdgeSizes::zero()
            },
            padding: EdgeSizes {
                bottom: 8.0,
                ..EdgeSizes::zero()
            },
            border: Some(Border {
                width: 2.0,
                color: Color::hex(0xcccccc),
                sides: BorderSides::Bottom,
            }),
            ..base
        },
        ContentType::Subheader => BlockStyle {
            font_size: 14.0,
            font_weight: WEIGHT_SEMIBOLD,
            color: INK_DARK,
            margin: EdgeSizes {
                top: 18.0,
                bottom: 10.0,
                ..EdgeSizes::zero()
            },
            ..base
        },
        ContentType::Paragraph => BlockStyle {
            align: TextAlign::Justify,
            ..base
        },
        ContentType::Greeting => BlockStyle {
            font_weight: WEIGHT_MEDIUM,
            margin: EdgeSizes {
                bottom: 15.0,
                ..EdgeSizes::zero()
            },
            ..base
        },
        ContentType::Address => BlockStyle {
            font_weight: WEIGHT_MEDIUM,
            background: Some(SHADE),
            padding: EdgeSizes::all(12.0),
            radius: 4.0,
            margin: EdgeSizes {
                bottom: 15.0,
                ..EdgeSizes::zero()
            },
            ..base
        },
        ContentType::Bullet => BlockStyle {
            margin: EdgeSizes {
                bottom: 12.0,
                left: 25.0,
                ..EdgeSizes::zero()
            },
            ..base
        },
        ContentType::TableHeader => BlockStyle {
            font_weight: WEIGHT_BOLD,
            background: Some(SHADE_TABLE),
            padding: EdgeSizes::all(10.0),
            border: Some(Border {
                width: 1.0,
                color: Color::hex(0xd1d5db),
                sides: BorderSides::All,
            }),
            radius: 4.0,
            ..base
        },
        ContentType::TableRow => BlockStyle {
            padding: EdgeSizes::symmetric(8.0, 10.0),
            border: Some(Border {
                width: 1.0,
                color: Color::hex(0xe5e7eb),
                sides: BorderSides::Bottom,
            }),
            ..base
        },
        ContentType::Reference => BlockStyle {
            font_size: 10.0,
            family: FontFamily::Monospace,
            color: INK_MUTED,
            background: Some(SHADE),
            padding: EdgeSizes::all(8.0),
            radius: 3.0,
            margin: EdgeSizes {
                top: 15.0,
                bottom: 12.0,
                ..EdgeSizes::zero()
            },
            ..base
        },
        ContentType::Text | ContentType::Unknown => BlockStyle {
            margin: EdgeSizes {
                bottom: 8.0,
                ..EdgeSizes::zero()
            },
            ..base
        },
    };
    if bold {
        style.font_weight = WEIGHT_BOLD;
    }
    if italic {
        style.italic = true;
    }
    style
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BannerStyle {
    pub container: BlockStyle,
    pub organization: BlockStyle,
    pub tagline: BlockStyle,
    pub title: BlockStyle,
}

pub fn banner_style() -> BannerStyle {
    let centered = BlockStyle {
        align: TextAlign::Center,
        line_height: 1.4,
        margin: EdgeSizes::zero(),
        ..BlockStyle::default()
    };
    BannerStyle {
        container: BlockStyle {
            margin: EdgeSizes {
                bottom: 30.0,
                ..EdgeSizes::zero()
            },
            padding: EdgeSizes {
                bottom: 20.0,
                ..EdgeSizes::zero()
            },
            border: Some(Border {
                width: 3.0,
                color: BRAND_RED,
                sides: BorderSides::Bottom,
            }),
            ..centered
        },
        organization: BlockStyle {
            font_size: 24.0,
            font_weight: WEIGHT_BOLD,
            color: BRAND_RED,
            margin: EdgeSizes {
                bottom: 5.0,
                ..EdgeSizes::zero()
            },
            ..centered
        },
        tagline: BlockStyle {
            color: INK_MUTED,
            margin: EdgeSizes {
                bottom: 15.0,
                ..EdgeSizes::zero()
            },
            ..centered
        },
        title: BlockStyle {
            font_size: 16.0,
            font_weight: WEIGHT_SEMIBOLD,
            color: INK_DARK,
            ..centered
        },
    }
}

pub fn placeholder_style() -> BlockStyle {
    BlockStyle {
        color: INK_SOFT,
        align: TextAlign::Center,
        ..BlockStyle::default()
    }
}

fn edges_css(edges: &EdgeSizes) -> String {
    format!(
        "{}px {}px {}px {}px",
        fmt_px(edges.top),
        fmt_px(edges.right),
        fmt_px(edges.bottom),
        fmt_px(edges.left)
    )
}

fn fmt_px(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_is_total_and_bold_always_wins() {
        for kind in ContentType::ALL {
            for bold in [false, true] {
                for italic in [false, true] {
                    let style = resolve_style(kind, bold, italic);
                    assert!(style.font_size > 0.0);
                    if bold {
                        assert_eq!(style.font_weight, WEIGHT_BOLD, "{kind:?}");
                    }
                    assert_eq!(style.italic, italic, "{kind:?}");
                }
            }
        }
    }

    #[test]
    fn resolution_is_pure() {
        for kind in ContentType::ALL {
            assert_eq!(resolve_style(kind, true, false), resolve_style(kind, true, false));
        }
    }

    #[test]
    fn unknown_type_falls_back_to_text_preset() {
        assert_eq!(
            resolve_style(ContentType::Unknown, false, true),
            resolve_style(ContentType::Text, false, true)
        );
    }

    #[test]
    fn header_preset_matches_brand() {
        let style = resolve_style(ContentType::Header, false, false);
        assert_eq!(style.font_size, 16.0);
        assert!(style.is_bold());
        assert_eq!(style.color, Color::hex(0xdc2626));
        let border = style.border.unwrap();
        assert_eq!(border.sides, BorderSides::Bottom);
        assert_eq!(border.width, 2.0);
    }

    #[test]
    fn reference_is_small_monospace_and_shaded() {
        let style = resolve_style(ContentType::Reference, false, false);
        assert_eq!(style.family, FontFamily::Monospace);
        assert_eq!(style.font_size, 10.0);
        assert!(style.background.is_some());
    }

    #[test]
    fn css_serialization_is_stable() {
        let css = resolve_style(ContentType::TableRow, true, true).to_css();
        assert_eq!(
            css,
            "font-size:12px;font-weight:700;line-height:1.6;color:#000000;font-style:italic;\
             margin:0px 0px 12px 0px;padding:8px 10px 8px 10px;border-bottom:1px solid #e5e7eb;"
        );
    }
}

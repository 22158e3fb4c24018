use crate::style::{FontFamily, WEIGHT_BOLD};
use crate::types::Pt;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use ttf_parser::GlyphId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontKey {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: FontFamily, weight: u16, italic: bool) -> Self {
        Self {
            family,
            bold: weight >= WEIGHT_BOLD,
            italic,
        }
    }
}

// Files probed under the system font directories, in preference order.
const SYSTEM_FONT_FILES: &[&str] = &[
    "LiberationSans-Regular.ttf",
    "LiberationSans-Bold.ttf",
    "LiberationSans-Italic.ttf",
    "LiberationSans-BoldItalic.ttf",
    "LiberationMono-Regular.ttf",
    "LiberationMono-Bold.ttf",
    "DejaVuSans.ttf",
    "DejaVuSans-Bold.ttf",
    "DejaVuSans-Oblique.ttf",
    "DejaVuSans-BoldOblique.ttf",
    "DejaVuSansMono.ttf",
    "DejaVuSansMono-Bold.ttf",
    "arial.ttf",
    "arialbd.ttf",
    "ariali.ttf",
    "arialbi.ttf",
    "cour.ttf",
    "Arial.ttf",
    "Arial Bold.ttf",
    "Arial Italic.ttf",
    "Courier New.ttf",
];

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct TextWidthKey {
    font_index: usize,
    size_milli: i64,
    text: String,
}

#[derive(Debug)]
struct TextWidthCache {
    map: HashMap<TextWidthKey, Pt>,
    order: VecDeque<TextWidthKey>,
    max_entries: usize,
}

impl TextWidthCache {
    fn new(max_entries: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            max_entries,
        }
    }

    fn get(&self, key: &TextWidthKey) -> Option<Pt> {
        self.map.get(key).copied()
    }

    fn insert(&mut self, key: TextWidthKey, value: Pt) {
        if self.map.contains_key(&key) {
            return;
        }
        self.map.insert(key.clone(), value);
        self.order.push_back(key);
        while self.map.len() > self.max_entries {
            if let Some(old) = self.order.pop_front() {
                self.map.remove(&old);
            } else {
                break;
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct RegisteredFont {
    pub(crate) name: String,
    pub(crate) data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    // Horizontal advances by character, read once from the unicode cmap.
    advances: HashMap<char, u16>,
    missing_advance: u16,
}

impl RegisteredFont {
    pub(crate) fn ascent(&self, font_size: Pt) -> Pt {
        if self.units_per_em == 0 {
            return font_size * 0.8;
        }
        font_size * (self.ascender as f32 / self.units_per_em as f32)
    }
}

#[derive(Debug)]
pub struct FontRegistry {
    fonts: Vec<RegisteredFont>,
    lookup: HashMap<FontKey, usize>,
    text_width_cache: Mutex<TextWidthCache>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        Self {
            fonts: Vec::new(),
            lookup: HashMap::new(),
            text_width_cache: Mutex::new(TextWidthCache::new(20_000)),
        }
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn register_dir(&mut self, path: impl AsRef<Path>) {
        let Ok(entries) = fs::read_dir(path.as_ref()) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                self.register_file(path);
            }
        }
    }

    /// Registers a TrueType/OpenType file. Unreadable or unparsable files are skipped.
    pub fn register_file(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let Some(ext) = path.extension().and_then(|v| v.to_str()) else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" {
            return false;
        }
        let Ok(data) = fs::read(path) else {
            return false;
        };
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("font")
            .to_string();
        self.register_bytes(data, &name)
    }

    pub fn register_bytes(&mut self, data: Vec<u8>, name: &str) -> bool {
        let (key, units_per_em, ascender, advances, missing_advance) = {
            let Ok(face) = ttf_parser::Face::parse(&data, 0) else {
                log::warn!("skipping unparsable font {name}");
                return false;
            };
            let family = if face.is_monospaced() {
                FontFamily::Monospace
            } else {
                FontFamily::Sans
            };
            let units_per_em = face.units_per_em();
            (
                FontKey {
                    family,
                    bold: face.is_bold(),
                    italic: face.is_italic() || face.is_oblique(),
                },
                units_per_em,
                face.ascender(),
                advance_table(&face),
                face.glyph_hor_advance(GlyphId(0)).unwrap_or(units_per_em / 2),
            )
        };
        let index = self.fonts.len();
        self.fonts.push(RegisteredFont {
            name: name.to_string(),
            data,
            units_per_em,
            ascender,
            advances,
            missing_advance,
        });
        self.lookup.entry(key).or_insert(index);
        true
    }

    pub fn register_system_fonts(&mut self) -> usize {
        let before = self.fonts.len();
        let wanted: HashMap<String, usize> = SYSTEM_FONT_FILES
            .iter()
            .enumerate()
            .map(|(rank, name)| (name.to_ascii_lowercase(), rank))
            .collect();
        let mut found: Vec<(usize, std::path::PathBuf)> = Vec::new();
        for dir in system_font_dirs() {
            for entry in walkdir::WalkDir::new(&dir)
                .max_depth(4)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let Some(file_name) = entry.file_name().to_str() else {
                    continue;
                };
                if let Some(rank) = wanted.get(&file_name.to_ascii_lowercase()) {
                    found.push((*rank, entry.path().to_path_buf()));
                }
            }
        }
        found.sort();
        for (_, path) in found {
            self.register_file(path);
        }
        let added = self.fonts.len() - before;
        if added == 0 {
            log::warn!("no system fonts found; text metrics are approximated");
        }
        added
    }

    pub(crate) fn resolve(&self, key: FontKey) -> Option<&RegisteredFont> {
        self.resolve_indexed(key).map(|(_, font)| font)
    }

    // Exact key, then the same family, then any sans face, then the first face.
    pub(crate) fn resolve_indexed(&self, key: FontKey) -> Option<(usize, &RegisteredFont)> {
        let candidates = [
            key,
            FontKey { bold: false, ..key },
            FontKey { italic: false, ..key },
            FontKey {
                bold: false,
                italic: false,
                ..key
            },
            FontKey {
                family: FontFamily::Sans,
                ..key
            },
            FontKey {
                family: FontFamily::Sans,
                bold: false,
                italic: false,
            },
        ];
        let index = candidates
            .iter()
            .find_map(|candidate| self.lookup.get(candidate).copied())
            .unwrap_or(0);
        self.fonts.get(index).map(|font| (index, font))
    }

    pub fn measure_text_width(&self, key: FontKey, font_size: Pt, text: &str) -> Pt {
        let Some((index, font)) = self.resolve_indexed(key) else {
            return approximate_width(key, font_size, text);
        };
        let cache_key = TextWidthKey {
            font_index: index,
            size_milli: font_size.to_milli_i64(),
            text: text.to_string(),
        };
        if let Ok(cache) = self.text_width_cache.lock() {
            if let Some(value) = cache.get(&cache_key) {
                return value;
            }
        }
        let value = measure_with_face(font, font_size, text)
            .unwrap_or_else(|| approximate_width(key, font_size, text));
        if let Ok(mut cache) = self.text_width_cache.lock() {
            cache.insert(cache_key, value);
        }
        value
    }
}

fn measure_with_face(font: &RegisteredFont, font_size: Pt, text: &str) -> Option<Pt> {
    if font.units_per_em == 0 {
        return None;
    }
    let units: i64 = text
        .chars()
        .map(|ch| {
            font.advances.get(&ch).copied().unwrap_or(font.missing_advance) as i64
        })
        .sum();
    Some(font_size * (units as f32 / font.units_per_em as f32))
}

fn advance_table(face: &ttf_parser::Face<'_>) -> HashMap<char, u16> {
    let mut advances = HashMap::new();
    let Some(cmap) = face.tables().cmap else {
        return advances;
    };
    for subtable in cmap.subtables {
        if !subtable.is_unicode() {
            continue;
        }
        subtable.codepoints(|codepoint| {
            let Some(ch) = char::from_u32(codepoint) else {
                return;
            };
            if advances.contains_key(&ch) {
                return;
            }
            if let Some(advance) = subtable
                .glyph_index(codepoint)
                .and_then(|gid| face.glyph_hor_advance(gid))
            {
                advances.insert(ch, advance);
            }
        });
    }
    advances
}

fn approximate_width(key: FontKey, font_size: Pt, text: &str) -> Pt {
    let em = match (key.family, key.bold) {
        (FontFamily::Monospace, _) => 0.6,
        (FontFamily::Sans, true) => 0.55,
        (FontFamily::Sans, false) => 0.5,
    };
    let char_width = (font_size * em).max(Pt::from_f32(1.0));
    char_width * (text.chars().count() as i32)
}

fn system_font_dirs() -> Vec<std::path::PathBuf> {
    let mut dirs = Vec::new();

    #[cfg(target_os = "windows")]
    {
        dirs.push(std::path::PathBuf::from(r"C:\Windows\Fonts"));
    }

    #[cfg(target_os = "linux")]
    {
        dirs.push(std::path::PathBuf::from("/usr/share/fonts"));
        dirs.push(std::path::PathBuf::from("/usr/local/share/fonts"));
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(std::path::PathBuf::from(home).join(".fonts"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        dirs.push(std::path::PathBuf::from("/System/Library/Fonts"));
        dirs.push(std::path::PathBuf::from("/Library/Fonts"));
    }

    if let Ok(extra) = std::env::var("QUOTEDOC_FONT_DIR") {
        for path in std::env::split_paths(&extra) {
            if !path.as_os_str().is_empty() {
                dirs.push(path);
            }
        }
    }

    dirs
}

#[cfg(test)]
pub(crate) const TEST_FONT: &[u8] =
    include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/fonts/DejaVuSans.ttf"));

#[cfg(test)]
pub(crate) fn test_registry() -> FontRegistry {
    let mut registry = FontRegistry::new();
    registry.register_bytes(TEST_FONT.to_vec(), "DejaVuSans");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    const SANS: FontKey = FontKey {
        family: FontFamily::Sans,
        bold: false,
        italic: false,
    };

    #[test]
    fn empty_registry_approximates_widths() {
        let registry = FontRegistry::new();
        let size = Pt::from_f32(10.0);
        assert_eq!(registry.measure_text_width(SANS, size, "abcd").to_milli_i64(), 20_000);
        let mono = FontKey {
            family: FontFamily::Monospace,
            ..SANS
        };
        assert_eq!(registry.measure_text_width(mono, size, "ab").to_milli_i64(), 12_000);
        assert_eq!(registry.measure_text_width(SANS, size, ""), Pt::ZERO);
        assert!(registry.resolve(SANS).is_none());
    }

    #[test]
    fn font_key_maps_weight_threshold() {
        assert!(!FontKey::new(FontFamily::Sans, 600, false).bold);
        assert!(FontKey::new(FontFamily::Sans, 700, true).bold);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let mut registry = FontRegistry::new();
        assert!(!registry.register_bytes(vec![0, 1, 2, 3], "junk"));
        assert!(registry.is_empty());
    }

    #[test]
    fn non_font_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        let mut registry = FontRegistry::new();
        registry.register_dir(dir.path());
        assert!(registry.is_empty());
    }

    #[test]
    fn registered_face_measures_from_its_advances() {
        let registry = test_registry();
        assert_eq!(registry.len(), 1);
        let size = Pt::from_f32(12.0);
        let a = registry.measure_text_width(SANS, size, "W");
        let b = registry.measure_text_width(SANS, size, "i");
        assert!(a > b);
        let ab = registry.measure_text_width(SANS, size, "Wi");
        assert!((ab.to_f32() - (a + b).to_f32()).abs() < 0.01);
        // Every key falls back to the only face.
        let bold_mono = FontKey {
            family: FontFamily::Monospace,
            bold: true,
            italic: false,
        };
        assert_eq!(registry.resolve_indexed(bold_mono).map(|(i, _)| i), Some(0));
    }
}

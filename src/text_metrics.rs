use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

use crate::config::{Config, GenericFamilies};
use crate::theme::Theme;

/// Width of a glyph the font lacks, as a fraction of the font size.
const FALLBACK_ADVANCE_RATIO: f32 = 0.56;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Pixel width of a single-line label in the active font.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> f32;
}

/// Measures with real glyph advances from an installed font, falling back to
/// an average advance when no face matches the family list.
#[derive(Debug, Clone)]
pub struct FontMeasurer {
    font_family: String,
    font_size: f32,
    generics: GenericFamilies,
}

impl FontMeasurer {
    pub fn new(font_family: impl Into<String>, font_size: f32) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
            generics: GenericFamilies::default(),
        }
    }

    pub fn from_theme(theme: &Theme) -> Self {
        Self::new(theme.font_family.clone(), theme.font_size)
    }

    /// Measures with the same generic-family mapping the PNG backend uses.
    pub fn from_config(config: &Config) -> Self {
        Self::from_theme(&config.theme).with_generic_families(config.render.generic_families())
    }

    pub fn with_generic_families(mut self, generics: GenericFamilies) -> Self {
        self.generics = generics;
        self
    }
}

impl TextMeasure for FontMeasurer {
    fn measure(&self, text: &str) -> f32 {
        measure_text_width(text, self.font_size, &self.font_family, &self.generics)
            .unwrap_or_else(|| FixedWidthMeasurer::for_font_size(self.font_size).measure(text))
    }
}

/// Every character advances by the same width. Deterministic across hosts.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthMeasurer {
    pub char_width: f32,
}

impl FixedWidthMeasurer {
    pub fn new(char_width: f32) -> Self {
        Self { char_width }
    }

    pub fn for_font_size(font_size: f32) -> Self {
        Self::new(font_size * FALLBACK_ADVANCE_RATIO)
    }
}

impl TextMeasure for FixedWidthMeasurer {
    fn measure(&self, text: &str) -> f32 {
        text.chars().filter(|ch| *ch != '\n').count() as f32 * self.char_width
    }
}

pub fn measure_text_width(
    text: &str,
    font_size: f32,
    font_family: &str,
    generics: &GenericFamilies,
) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family, generics)
}

/// Family a generic name should map to: the configured face when the
/// database has it, otherwise the first family it knows.
pub fn resolve_generic_family<'f, I>(wanted: &str, known: I) -> Option<String>
where
    I: IntoIterator<Item = &'f str>,
{
    let mut first = None;
    for name in known {
        if name.eq_ignore_ascii_case(wanted) {
            return Some(name.to_string());
        }
        if first.is_none() {
            first = Some(name);
        }
    }
    first.map(str::to_string)
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<(String, GenericFamilies), Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(
        &mut self,
        text: &str,
        font_size: f32,
        font_family: &str,
        generics: &GenericFamilies,
    ) -> Option<f32> {
        let key = (normalize_family_key(font_family), generics.clone());
        if !self.cache.contains_key(&key) {
            let face = self.load_face(font_family, generics);
            self.cache.insert(key.clone(), face);
        }
        let face = self.cache.get_mut(&key)?.as_mut()?;
        face.measure_width(&text.replace('\t', "    "), font_size)
    }

    fn load_face(&mut self, font_family: &str, generics: &GenericFamilies) -> Option<FontFace> {
        let mut families: Vec<Family<'_>> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            let family = match raw.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(raw),
            };
            families.push(family);
        }
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }
        self.apply_generic_families(generics);

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        tracing::trace!(family = font_family, face = ?id, "resolved measurement face");
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
            .flatten()
    }

    fn apply_generic_families(&mut self, generics: &GenericFamilies) {
        let resolve = |wanted: &str| {
            let known = self
                .db
                .faces()
                .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str()));
            resolve_generic_family(wanted, known)
        };
        let sans = resolve(&generics.sans_serif);
        let serif = resolve(&generics.serif);
        let mono = resolve(&generics.monospace);
        if let Some(name) = sans {
            self.db.set_sans_serif_family(name);
        }
        if let Some(name) = serif {
            self.db.set_serif_family(name);
        }
        if let Some(name) = mono {
            self.db.set_monospace_family(name);
        }
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let units_per_em = Face::parse(&data, index).ok()?.units_per_em().max(1);
        Some(Self {
            data,
            index,
            units_per_em,
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let face = Face::parse(&self.data, self.index).ok()?;
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * FALLBACK_ADVANCE_RATIO;
        let mut width = 0.0f32;

        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = *self.advance_cache.entry(ch).or_insert_with(|| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
            });
            match advance {
                Some(advance) if advance > 0 => width += advance as f32 * scale,
                _ => width += fallback,
            }
        }

        Some(width.max(0.0))
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_counts_characters() {
        let measurer = FixedWidthMeasurer::new(7.0);
        assert_eq!(measurer.measure("Hall"), 28.0);
        assert_eq!(measurer.measure(""), 0.0);
    }

    #[test]
    fn generic_family_prefers_configured_face() {
        let known = ["Noto Sans", "DejaVu Sans", "DejaVu Serif"];
        assert_eq!(
            resolve_generic_family("dejavu sans", known).as_deref(),
            Some("DejaVu Sans")
        );
        assert_eq!(
            resolve_generic_family("Arial", known).as_deref(),
            Some("Noto Sans")
        );
        assert_eq!(resolve_generic_family("Arial", std::iter::empty::<&str>()), None);
    }

    #[test]
    fn font_measurer_is_never_negative() {
        let measurer = FontMeasurer::new("sans-serif", 12.0);
        assert!(measurer.measure("Temple of Doom") > 0.0);
        assert_eq!(measurer.measure(""), 0.0);
    }
}

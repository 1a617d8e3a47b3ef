use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use fontdb::{Database, Family, Query, Source, Style, Weight};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use quill_config::QuillConfig;
use quill_core::{Error, FontDescriptor, FontSlant, FontWeight, Result};

use crate::face::FontFace;

static SHARED: Lazy<FontLibrary> = Lazy::new(|| FontLibrary::from_config(&QuillConfig::load()));

/// Font database plus a cache of loaded faces.
///
/// Lookups go through `fontdb`; the bytes of each matched face are read once and kept
/// for the lifetime of the library.
pub struct FontLibrary {
    db: Database,
    default_family: String,
    faces: Mutex<HashMap<fontdb::ID, Arc<FontFace>>>,
    /// Families already reported as missing.
    missing: Mutex<HashSet<String>>,
}

impl FontLibrary {
    /// An empty library with no fonts loaded.
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            default_family: "sans-serif".to_string(),
            faces: Mutex::new(HashMap::new()),
            missing: Mutex::new(HashSet::new()),
        }
    }

    pub fn from_config(config: &QuillConfig) -> Self {
        let mut lib = Self::new();
        lib.default_family = config.text.default_family.clone();
        if config.text.load_system_fonts {
            lib.db.load_system_fonts();
        }
        for dir in &config.text.font_dirs {
            lib.db.load_fonts_dir(dir);
        }
        log::debug!("font library loaded {} faces", lib.db.len());
        lib
    }

    /// Process-wide library configured from `quill.toml` and the environment.
    pub fn shared() -> &'static FontLibrary {
        &SHARED
    }

    /// Register a font from memory (TTF, OTF or a collection).
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Find the face best matching `font`.
    ///
    /// An empty family name means the configured default. When nothing matches the
    /// family, the generic sans-serif family is tried, then any installed face.
    pub fn resolve(&self, font: &FontDescriptor) -> Result<Arc<FontFace>> {
        let family = if font.family.is_empty() {
            self.default_family.as_str()
        } else {
            font.family.as_str()
        };
        let id = self
            .db
            .query(&query(&[generic_family(family)], font))
            .or_else(|| {
                self.report_missing(family);
                self.db.query(&query(&[Family::SansSerif], font))
            })
            .or_else(|| self.db.faces().next().map(|face| face.id))
            .ok_or_else(|| Error::FontNotFound(family.to_string()))?;

        self.load(id)
    }

    /// Warn the first time `family` falls back; later misses only log at debug level.
    /// Returns whether this call warned.
    fn report_missing(&self, family: &str) -> bool {
        let first = self.missing.lock().insert(family.to_string());
        if first {
            log::warn!("no font matches family {family:?}, falling back to sans-serif");
        } else {
            log::debug!("family {family:?} still missing, using sans-serif");
        }
        first
    }

    fn load(&self, id: fontdb::ID) -> Result<Arc<FontFace>> {
        let mut faces = self.faces.lock();
        if let Some(face) = faces.get(&id) {
            return Ok(face.clone());
        }

        let info = self
            .db
            .face(id)
            .ok_or_else(|| Error::FontNotFound(format!("{id:?}")))?;
        let bytes: Vec<u8> = match &info.source {
            Source::File(path) => std::fs::read(path)?,
            Source::Binary(data) => data.as_ref().as_ref().to_vec(),
            Source::SharedFile(_, data) => data.as_ref().as_ref().to_vec(),
        };
        log::debug!("loaded font face {:?} (index {})", info.post_script_name, info.index);

        let face = Arc::new(FontFace::from_vec(bytes, info.index)?);
        faces.insert(id, face.clone());
        Ok(face)
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn query<'a>(families: &'a [Family<'a>], font: &FontDescriptor) -> Query<'a> {
    Query {
        families,
        weight: match font.weight {
            FontWeight::Normal => Weight::NORMAL,
            FontWeight::Bold => Weight::BOLD,
        },
        style: match font.slant {
            FontSlant::Normal => Style::Normal,
            FontSlant::Italic => Style::Italic,
            FontSlant::Oblique => Style::Oblique,
        },
        ..Query::default()
    }
}

fn generic_family(name: &str) -> Family<'_> {
    match name {
        "sans-serif" | "sans" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" | "mono" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        other => Family::Name(other),
    }
}

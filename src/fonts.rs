use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::{Face, GlyphId};

use crate::config::{BOLD_FONT_FILE, FontWeight, REGULAR_FONT_FILE};
use crate::error::Error;

/// Horizontal text measurement used to center labels.
pub trait TextMeasure {
    /// Advance width of `text` at `font_size`, in points.
    fn text_width(&self, text: &str, font_size: f32) -> Result<f32, Error>;
}

/// A memory-mapped TrueType/OpenType face that parsed successfully.
pub struct LoadedFont {
    path: PathBuf,
    data: Mmap,
    face_index: u32,
    ps_name: String,
    units_per_em: f32,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("path", &self.path)
            .field("ps_name", &self.ps_name)
            .finish()
    }
}

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

fn postscript_name(face: &Face) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
        .find_map(|n| n.to_string())
}

impl LoadedFont {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let load_err = |reason: String| Error::FontLoad {
            path: path.to_path_buf(),
            reason,
        };
        let file = std::fs::File::open(path).map_err(|e| load_err(e.to_string()))?;
        let data = unsafe { Mmap::map(&file) }.map_err(|e| load_err(e.to_string()))?;

        let face_index = 0;
        let (ps_name, units_per_em) = {
            let face = Face::parse(&data, face_index).map_err(|e| load_err(e.to_string()))?;
            let fallback = || {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Font")
                    .to_string()
            };
            let name = postscript_name(&face)
                .or_else(|| font_family_name(&face))
                .unwrap_or_else(fallback);
            (name.replace(' ', ""), face.units_per_em() as f32)
        };

        log::debug!("Loaded font {} ({ps_name})", path.display());

        Ok(LoadedFont {
            path: path.to_path_buf(),
            data,
            face_index,
            ps_name,
            units_per_em,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn postscript_name(&self) -> &str {
        &self.ps_name
    }

    pub(crate) fn face(&self) -> Result<Face<'_>, Error> {
        Face::parse(&self.data, self.face_index).map_err(|e| Error::FontLoad {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Glyph for `ch`; characters that only map to `.notdef` count as missing.
    fn glyph_for(face: &Face, ch: char, label: &str) -> Result<GlyphId, Error> {
        face.glyph_index(ch)
            .filter(|gid| gid.0 != 0)
            .ok_or_else(|| Error::MissingGlyph {
                ch,
                label: label.to_string(),
            })
    }

    fn advance_1000(&self, face: &Face, gid: GlyphId) -> f32 {
        face.glyph_hor_advance(gid)
            .map(|adv| adv as f32 / self.units_per_em * 1000.0)
            .unwrap_or(0.0)
    }
}

impl TextMeasure for LoadedFont {
    fn text_width(&self, text: &str, font_size: f32) -> Result<f32, Error> {
        let face = self.face()?;
        let mut width_1000 = 0.0;
        for ch in text.chars() {
            let gid = Self::glyph_for(&face, ch, text)?;
            width_1000 += self.advance_1000(&face, gid);
        }
        Ok(width_1000 * font_size / 1000.0)
    }
}

/// The regular and bold faces shipped next to the executable.
#[derive(Debug)]
pub struct FontSet {
    pub regular: LoadedFont,
    pub bold: LoadedFont,
}

impl FontSet {
    /// Load both faces from `dir`. Either file missing or corrupt is an error.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let t0 = std::time::Instant::now();
        let regular = LoadedFont::open(&dir.join(REGULAR_FONT_FILE))?;
        let bold = LoadedFont::open(&dir.join(BOLD_FONT_FILE))?;
        log::debug!(
            "FontSet::load: {} → {:.1}ms",
            dir.display(),
            t0.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(FontSet { regular, bold })
    }

    pub fn select(&self, weight: FontWeight) -> &LoadedFont {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

/// Glyphs drawn so far, renumbered densely for the embedded subset.
pub(crate) struct GlyphUsage {
    remapper: subsetter::GlyphRemapper,
    char_to_gid: HashMap<char, u16>,
    widths_1000: BTreeMap<u16, f32>,
    to_unicode: BTreeMap<u16, char>,
}

impl GlyphUsage {
    pub(crate) fn new() -> Self {
        GlyphUsage {
            remapper: subsetter::GlyphRemapper::new(),
            char_to_gid: HashMap::new(),
            widths_1000: BTreeMap::new(),
            to_unicode: BTreeMap::new(),
        }
    }

    /// Encode `text` as big-endian 2-byte subset glyph IDs for an Identity-H content stream.
    pub(crate) fn encode(&mut self, font: &LoadedFont, text: &str) -> Result<Vec<u8>, Error> {
        let face = font.face()?;
        let mut out = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let new_gid = match self.char_to_gid.get(&ch) {
                Some(&gid) => gid,
                None => {
                    let gid = LoadedFont::glyph_for(&face, ch, text)?;
                    let new_gid = self.remapper.remap(gid.0);
                    self.char_to_gid.insert(ch, new_gid);
                    self.widths_1000.insert(new_gid, font.advance_1000(&face, gid));
                    self.to_unicode.entry(new_gid).or_insert(ch);
                    new_gid
                }
            };
            out.push((new_gid >> 8) as u8);
            out.push((new_gid & 0xFF) as u8);
        }
        Ok(out)
    }
}

/// Embed `font` as a CIDFont (Type0 composite) with Identity-H encoding,
/// subsetted to the glyphs recorded in `usage`.
pub(crate) fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    font: &LoadedFont,
    usage: &GlyphUsage,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<(), Error> {
    let face = font.face()?;
    let units = font.units_per_em;
    let descriptor_ref = alloc();
    let data_ref = alloc();

    let ascent = face.ascender() as f32 / units * 1000.0;
    let descent = face.descender() as f32 / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| h as f32 / units * 1000.0)
        .unwrap_or(700.0);

    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        bb.x_min as f32 / units * 1000.0,
        bb.y_min as f32 / units * 1000.0,
        bb.x_max as f32 / units * 1000.0,
        bb.y_max as f32 / units * 1000.0,
    );

    let subset_data = subsetter::subset(&font.data, font.face_index, &usage.remapper)
        .unwrap_or_else(|e| {
            log::warn!(
                "Font subsetting failed for {}: {e} — embedding full font",
                font.ps_name
            );
            font.data.to_vec()
        });

    let data_len = i32::try_from(subset_data.len())
        .map_err(|_| Error::Sink(format!("font {} is too large to embed", font.ps_name)))?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = font.ps_name.as_bytes();

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let cid_font_ref = alloc();
    let system_info = pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !usage.widths_1000.is_empty() {
            let mut w = cid.widths();
            for (&gid, &width) in &usage.widths_1000 {
                w.consecutive(gid, [width]);
            }
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{}-UTF16", font.ps_name);
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        },
    );
    for (&new_gid, &ch) in &usage.to_unicode {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Ok(())
}

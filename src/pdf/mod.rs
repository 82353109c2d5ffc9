pub(crate) mod layout;

use std::io::Write;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::error::Error;
use crate::fonts::{GlyphUsage, LoadedFont, embed_truetype};
use crate::model::{PageGeometry, TextDraw};

/// Consumer of rendered pages: draws, page breaks, and one final flush.
pub trait PageSink {
    fn draw_text(&mut self, draw: &TextDraw) -> Result<(), Error>;

    /// Close the current page and start a new one.
    fn show_page(&mut self) -> Result<(), Error>;

    /// Write out everything. Called exactly once, after the last page.
    fn finalize(&mut self) -> Result<(), Error>;
}

const FONT_RESOURCE: &str = "F1";

/// Writes pages as a PDF into `W`, embedding the glyphs of `font` that were drawn.
pub struct PdfSink<'f, W: Write> {
    out: W,
    font: &'f LoadedFont,
    page_width: f32,
    page_height: f32,
    usage: GlyphUsage,
    current: Content,
    current_is_empty: bool,
    pages: Vec<Vec<u8>>,
    finalized: bool,
}

impl<'f, W: Write> PdfSink<'f, W> {
    pub fn new(out: W, font: &'f LoadedFont, geometry: &PageGeometry) -> Self {
        PdfSink {
            out,
            font,
            page_width: geometry.page_width,
            page_height: geometry.page_height,
            usage: GlyphUsage::new(),
            current: Content::new(),
            current_is_empty: true,
            pages: Vec::new(),
            finalized: false,
        }
    }

    /// Pages committed so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.finalized {
            return Err(Error::Sink("PDF already finalized".into()));
        }
        Ok(())
    }

    fn assemble(&mut self) -> Result<Vec<u8>, Error> {
        let t0 = std::time::Instant::now();
        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let font_ref = alloc();

        let n = self.pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        for (i, raw) in self.pages.iter().enumerate() {
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw, 6);
            pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        for i in 0..n {
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, self.page_width, self.page_height))
                .parent(pages_id)
                .contents(content_ids[i]);
            page.resources()
                .fonts()
                .pair(Name(FONT_RESOURCE.as_bytes()), font_ref);
        }

        embed_truetype(&mut pdf, font_ref, self.font, &self.usage, &mut alloc)?;

        log::debug!(
            "PdfSink::assemble: {n} pages → {:.1}ms",
            t0.elapsed().as_secs_f64() * 1000.0,
        );

        Ok(pdf.finish())
    }
}

impl<W: Write> PageSink for PdfSink<'_, W> {
    fn draw_text(&mut self, draw: &TextDraw) -> Result<(), Error> {
        self.ensure_open()?;
        let bytes = self.usage.encode(self.font, &draw.text)?;
        self.current.begin_text();
        self.current
            .set_font(Name(FONT_RESOURCE.as_bytes()), draw.font_size);
        self.current.next_line(draw.x, draw.y);
        self.current.show(Str(&bytes));
        self.current.end_text();
        self.current_is_empty = false;
        Ok(())
    }

    fn show_page(&mut self) -> Result<(), Error> {
        self.ensure_open()?;
        let content = std::mem::replace(&mut self.current, Content::new());
        self.pages.push(content.finish().as_slice().to_vec());
        self.current_is_empty = true;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), Error> {
        self.ensure_open()?;
        // A PDF needs at least one page; drawn-but-unflushed content is kept too.
        if self.pages.is_empty() || !self.current_is_empty {
            self.show_page()?;
        }
        self.finalized = true;
        let bytes = self.assemble()?;
        self.out.write_all(&bytes)?;
        self.out.flush()?;
        Ok(())
    }
}

//! Layout reconstruction for PDF pages.
//!
//! Decodes a page content stream into positioned spans, groups spans that
//! share a baseline into lines, and groups lines into blocks by vertical
//! spacing, font size, and indentation changes.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{BBox, LayoutBlock, Line, PageLayout, Span};

use super::options::ParseOptions;

/// Default page size (US Letter) when the page has no MediaBox.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// A span in PDF user space (y grows upwards, `y` is the baseline).
#[derive(Debug, Clone)]
pub(crate) struct RawSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub font_name: String,
}

impl RawSpan {
    fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let width = estimate_width(&text, font_size);
        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
        }
    }

    /// Convert to a top-down [`Span`] on a page of the given height.
    fn into_span(self, page_height: f32) -> Span {
        let top = page_height - (self.y + self.font_size * 0.8);
        let bottom = page_height - (self.y - self.font_size * 0.2);
        let bbox = BBox::new(self.x, top, self.x + self.width, bottom);
        Span::new(self.text, self.font_size, self.font_name, bbox)
    }
}

/// Spans sharing a baseline, sorted left to right.
#[derive(Debug, Clone)]
struct RawLine {
    spans: Vec<RawSpan>,
    y: f32,
    x: f32,
    font_size: f32,
}

impl RawLine {
    fn from_spans(mut spans: Vec<RawSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

        // Dominant font size, weighted by text length
        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            spans.first().map(|s| s.font_size).unwrap_or(0.0)
        };

        let (x, y) = spans.first().map(|s| (s.x, s.y)).unwrap_or((0.0, 0.0));
        Self {
            spans,
            y,
            x,
            font_size,
        }
    }

    /// Convert to a [`Line`], inserting a space before spans separated by a visible gap.
    fn into_line(self, page_height: f32) -> Line {
        let mut spans: Vec<Span> = Vec::with_capacity(self.spans.len());
        let mut prev_end: Option<(f32, bool)> = None;

        for mut raw in self.spans {
            if let Some((end, prev_has_space)) = prev_end {
                let gap = raw.x - end;
                let threshold = raw.font_size * 0.1;
                let starts_with_space = raw.text.starts_with([' ', '\u{00A0}']);
                let cjk = raw.text.chars().next().is_some_and(is_spaceless_script_char);
                if gap > threshold && !prev_has_space && !starts_with_space && !cjk {
                    raw.text.insert(0, ' ');
                }
            }
            prev_end = Some((
                raw.x + raw.width,
                raw.text.ends_with([' ', '\u{00A0}']),
            ));
            spans.push(raw.into_span(page_height));
        }

        Line::new(spans)
    }
}

/// Read the positioned layout of one page.
pub(crate) fn page_layout(
    doc: &LopdfDocument,
    page_id: ObjectId,
    options: &ParseOptions,
) -> Result<PageLayout> {
    let (width, height) = page_dimensions(doc, page_id);
    let spans = extract_page_spans(doc, page_id)?;
    let lines = group_spans_into_lines(spans, options.line_tolerance);

    let mut page = PageLayout::new(width, height);
    for block in group_lines_into_blocks(lines, options.block_gap_factor) {
        let lines = block
            .into_iter()
            .map(|line| line.into_line(height))
            .collect();
        page.add_block(LayoutBlock::new(lines));
    }
    Ok(page)
}

/// Page width and height from the MediaBox, falling back to US Letter.
fn page_dimensions(doc: &LopdfDocument, page_id: ObjectId) -> (f32, f32) {
    let media_box = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"MediaBox").ok())
        .and_then(|obj| match obj {
            Object::Reference(r) => doc.get_object(*r).ok(),
            other => Some(other),
        })
        .and_then(|obj| obj.as_array().ok());

    match media_box {
        Some(array) if array.len() >= 4 => {
            let x0 = get_number(&array[0]).unwrap_or(0.0);
            let y0 = get_number(&array[1]).unwrap_or(0.0);
            let x1 = get_number(&array[2]).unwrap_or(DEFAULT_PAGE_SIZE.0);
            let y1 = get_number(&array[3]).unwrap_or(DEFAULT_PAGE_SIZE.1);
            ((x1 - x0).abs(), (y1 - y0).abs())
        }
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Decode the text-showing operators of a page into spans.
fn extract_page_spans(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<RawSpan>> {
    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;
    let content = page_content(doc, page_id)?;
    let content =
        lopdf::content::Content::decode(&content).map_err(|e| Error::PdfParse(e.to_string()))?;

    let mut state = TextState::new(doc, &fonts);
    for op in &content.operations {
        state.apply(&op.operator, &op.operands);
    }
    Ok(state.spans)
}

/// Raw (decompressed) content stream bytes of a page.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    let contents = match page_dict.get(b"Contents") {
        Ok(contents) => contents,
        // A page without content is blank, not broken.
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(r) => match doc.get_object(*r) {
            Ok(Object::Stream(s)) => Ok(stream_bytes(s)),
            Ok(Object::Array(arr)) => Ok(concat_streams(doc, arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        },
        Object::Array(arr) => Ok(concat_streams(doc, arr)),
        _ => Err(Error::PdfParse("Invalid content stream".to_string())),
    }
}

fn concat_streams(doc: &LopdfDocument, refs: &[Object]) -> Vec<u8> {
    let mut content = Vec::new();
    for obj in refs {
        if let Object::Reference(r) = obj {
            if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                content.extend_from_slice(&stream_bytes(s));
                content.push(b' ');
            }
        }
    }
    content
}

/// Stream data, decompressed when the stream declares a filter.
fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Text-object state while walking a content stream.
struct TextState<'a> {
    doc: &'a LopdfDocument,
    fonts: &'a BTreeMap<Vec<u8>, &'a lopdf::Dictionary>,
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    leading: f32,
    matrix: TextMatrix,
    in_text: bool,
    spans: Vec<RawSpan>,
}

impl<'a> TextState<'a> {
    fn new(doc: &'a LopdfDocument, fonts: &'a BTreeMap<Vec<u8>, &'a lopdf::Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 12.0,
            leading: 0.0,
            matrix: TextMatrix::default(),
            in_text: false,
            spans: Vec::new(),
        }
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "BT" => {
                self.in_text = true;
                self.matrix = TextMatrix::default();
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if let [Object::Name(key), size, ..] = operands {
                    self.font_key = key.clone();
                    self.font_name = self.base_font(key);
                    self.font_size = get_number(size).unwrap_or(12.0);
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(get_number) {
                    self.leading = leading;
                }
            }
            "Td" | "TD" => {
                if let [tx, ty, ..] = operands {
                    let tx = get_number(tx).unwrap_or(0.0);
                    let ty = get_number(ty).unwrap_or(0.0);
                    if operator == "TD" {
                        self.leading = -ty;
                    }
                    self.matrix.translate(tx, ty);
                }
            }
            "Tm" => {
                if operands.len() >= 6 {
                    let n: Vec<f32> = operands.iter().map(|o| get_number(o).unwrap_or(0.0)).collect();
                    self.matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                }
            }
            "T*" => self.matrix.next_line(self.leading),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = self.decode(bytes);
                    self.show(text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let text = self.decode_array(items);
                    self.show(text);
                }
            }
            "'" | "\"" => {
                self.matrix.next_line(self.leading);
                let index = if operator == "\"" { 2 } else { 0 };
                if let Some(Object::String(bytes, _)) = operands.get(index) {
                    let text = self.decode(bytes);
                    self.show(text);
                }
            }
            _ => {}
        }
    }

    fn base_font(&self, key: &[u8]) -> String {
        self.fonts
            .get(key)
            .and_then(|font| font.get(b"BaseFont").ok())
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| String::from_utf8_lossy(key).to_string())
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let encoding = self
            .fonts
            .get(&self.font_key)
            .and_then(|f| f.get_font_encoding(self.doc).ok());
        match encoding {
            Some(ref enc) => LopdfDocument::decode_text(enc, bytes)
                .unwrap_or_else(|_| decode_text_simple(bytes)),
            None => decode_text_simple(bytes),
        }
    }

    /// Decode a TJ array; large negative adjustments become word spaces.
    fn decode_array(&self, items: &[Object]) -> String {
        // 200 thousandths of an em, roughly a space in most fonts
        const SPACE_THRESHOLD: f32 = 200.0;

        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&self.decode(bytes)),
                other => {
                    let Some(adjustment) = get_number(other) else {
                        continue;
                    };
                    let ends_open = combined
                        .chars()
                        .last()
                        .is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c));
                    if -adjustment > SPACE_THRESHOLD && ends_open {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    fn show(&mut self, text: String) {
        if !self.in_text || text.is_empty() {
            return;
        }
        let (x, y) = self.matrix.position();
        let size = self.font_size * self.matrix.scale();
        let span = RawSpan::new(text, x, y, size, self.font_name.clone());
        self.matrix.advance(span.width);
        if !span.text.trim().is_empty() {
            self.spans.push(span);
        }
    }
}

/// Group spans into lines by baseline proximity, top of page first.
fn group_spans_into_lines(mut spans: Vec<RawSpan>, tolerance: f32) -> Vec<RawLine> {
    // PDF y grows upwards: sort by y descending, then x
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut current: Vec<RawSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        match current_y {
            Some(y) if (span.y - y).abs() <= span.font_size * tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(RawLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(RawLine::from_spans(current));
    }

    lines
}

/// Group consecutive lines into blocks.
fn group_lines_into_blocks(lines: Vec<RawLine>, gap_factor: f32) -> Vec<Vec<RawLine>> {
    let avg_spacing = average_line_spacing(&lines);

    let mut blocks: Vec<Vec<RawLine>> = Vec::new();
    let mut current: Vec<RawLine> = Vec::new();

    for line in lines {
        let should_break = current
            .last()
            .is_some_and(|prev| should_break_block(prev, &line, avg_spacing, gap_factor));
        if should_break {
            blocks.push(std::mem::take(&mut current));
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn average_line_spacing(lines: &[RawLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &RawLine, curr: &RawLine, avg_spacing: f32, gap_factor: f32) -> bool {
    // Large spacing indicates a new paragraph
    (prev.y - curr.y).abs() > avg_spacing * gap_factor
        // Significant font size change
        || (prev.font_size - curr.font_size).abs() > 1.0
        // Significant left margin change (indentation)
        || (prev.x - curr.x).abs() > 20.0
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    // Start of the current line, restored by Td/T*
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    fn next_line(&mut self, leading: f32) {
        let leading = if leading > 0.0 { leading } else { 12.0 };
        self.translate(0.0, -leading);
    }

    /// Move the pen right by a text-space width.
    fn advance(&mut self, width: f32) {
        self.e += width;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.b * self.b + self.d * self.d).sqrt()
    }
}

/// Rough advance width when glyph metrics are unavailable.
fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if a character is from a script that doesn't use word spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

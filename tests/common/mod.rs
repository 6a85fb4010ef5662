//! Shared fixtures: in-memory layouts and small generated PDFs.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as PdfDocument, Object, Stream};
use pdfoutline::{BBox, Document, LayoutBlock, Line, PageLayout, Span};

/// One line of text placed on a generated PDF page.
#[derive(Debug, Clone, Copy)]
pub struct TextLine {
    pub text: &'static str,
    pub size: f32,
    pub x: f32,
    /// Baseline in PDF coordinates (origin bottom-left)
    pub y: f32,
    pub bold: bool,
}

pub fn line(text: &'static str, size: f32, x: f32, y: f32) -> TextLine {
    TextLine {
        text,
        size,
        x,
        y,
        bold: false,
    }
}

/// Build a PDF with Helvetica text, one content stream per page.
pub fn build_pdf(pages: &[Vec<TextLine>]) -> Vec<u8> {
    let mut doc = PdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for l in lines {
            let font = if l.bold { "F2" } else { "F1" };
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec![font.into(), l.size.into()]));
            operations.push(Operation::new("Td", vec![l.x.into(), l.y.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(l.text)]));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Three-page report: title, numbered headings, and one-line body blocks.
///
/// Body lines alternate between two indents so that every line becomes
/// its own block, keeping the median font size at the body size.
pub fn report_pdf() -> Vec<u8> {
    let mut first = vec![
        line("Company Report", 24.0, 72.0, 720.0),
        line("1. Introduction", 16.0, 72.0, 680.0),
    ];
    first.extend(body_lines(&INTRO_BODY, 650.0));
    first.push(line("1.1 Background", 14.0, 72.0, 570.0));
    first.extend(body_lines(&BACKGROUND_BODY, 540.0));

    let second = body_lines(&MIDDLE_BODY, 720.0);

    let mut third = vec![line("2. Methods", 16.0, 72.0, 720.0)];
    third.extend(body_lines(&METHODS_BODY, 690.0));

    build_pdf(&[first, second, third])
}

const INTRO_BODY: [&str; 4] = [
    "this report covers the annual results",
    "of the regional offices and their teams",
    "across every quarter of the fiscal year",
    "with notes on hiring and retention",
];

const BACKGROUND_BODY: [&str; 4] = [
    "the company opened two new offices",
    "and moved its headquarters downtown",
    "which changed how teams collaborate",
    "during the second half of the year",
];

const MIDDLE_BODY: [&str; 6] = [
    "revenue grew steadily in every region",
    "while costs stayed within the budget",
    "the northern office led on new sales",
    "and the southern office on renewals",
    "customer churn dropped below target",
    "for the first time in three years",
];

const METHODS_BODY: [&str; 4] = [
    "figures come from the finance ledger",
    "and were reviewed by the audit team",
    "survey data was collected in march",
    "from all full time staff members",
];

fn body_lines(texts: &[&'static str], top: f32) -> Vec<TextLine> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let x = if i % 2 == 0 { 72.0 } else { 100.0 };
            line(text, 11.0, x, top - i as f32 * 14.0)
        })
        .collect()
}

/// A single-span block for in-memory layouts; `y` is top-down.
pub fn block(text: &str, size: f32, font: &str, y: f32) -> LayoutBlock {
    LayoutBlock::new(vec![Line::new(vec![Span::new(
        text,
        size,
        font,
        BBox::new(72.0, y, 540.0, y + size),
    )])])
}

/// Body-size filler block with unique text.
pub fn body(tag: &str, n: usize, y: f32) -> LayoutBlock {
    block(
        &format!("{} paragraph {} keeps the median at body size.", tag, n),
        11.0,
        "Times-Roman",
        y,
    )
}

/// In-memory document from pages of blocks.
pub fn document(pages: Vec<Vec<LayoutBlock>>) -> Document {
    Document::from_pages(
        pages
            .into_iter()
            .map(|blocks| {
                blocks
                    .into_iter()
                    .fold(PageLayout::letter(), |page, b| page.with_block(b))
            })
            .collect(),
    )
}

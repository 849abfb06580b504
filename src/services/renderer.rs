//! Invoice PDF renderer.
//!
//! Pure function of (invoice, company profile, logo bytes) to a finished
//! A4 document. Layout is a flow layout: a cursor walks down the page and
//! a page break starts a fresh page with the item-table header repeated,
//! so arbitrarily long item lists never overflow or truncate the stream.
//! A failure while laying out the body is caught here and replaced with a
//! visible error line; the document is always finalized cleanly.

use crate::error::AppError;
use crate::models::{CompanyProfile, Invoice, LineItem};
use crate::services::tax::TaxPolicy;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};
use rust_decimal::Decimal;
use std::io::{BufWriter, Cursor};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 195.0;
const TOP_Y: f32 = 282.0;
const BOTTOM_Y: f32 = 30.0;

const LOGO_BOX: f32 = 22.0;
const META_X: f32 = 120.0;

const ROW_H: f32 = 5.5;
const DESC_WRAP: usize = 40;
const ADDRESS_WRAP: usize = 42;

/// Hard cap on document length; an item list that paginates past this
/// aborts the layout and the caller serves the error document instead.
const MAX_PAGES: usize = 100;

/// Delivery disposition hint. Changes only the Content-Disposition header
/// the handler emits, never the rendered bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Download,
    Inline,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Download => "attachment",
            Disposition::Inline => "inline",
        }
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, AppError> {
        let add = |font: BuiltinFont| {
            doc.add_builtin_font(font)
                .map_err(|e| AppError::RenderError(anyhow::anyhow!("Failed to load font: {}", e)))
        };
        Ok(Self {
            regular: add(BuiltinFont::Helvetica)?,
            bold: add(BuiltinFont::HelveticaBold)?,
            oblique: add(BuiltinFont::HelveticaOblique)?,
        })
    }
}

/// Descending cursor over a growing sequence of pages.
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layers: Vec<PdfLayerReference>,
    layer: PdfLayerReference,
    y: f32,
}

impl<'a> PageCursor<'a> {
    fn new(doc: &'a PdfDocumentReference, first_layer: PdfLayerReference) -> Self {
        Self {
            doc,
            layers: vec![first_layer.clone()],
            layer: first_layer,
            y: TOP_Y,
        }
    }

    /// Start a new page when fewer than `needed` millimetres remain.
    /// Returns true when a page break happened.
    fn ensure_room(&mut self, needed: f32) -> bool {
        if self.y - needed >= BOTTOM_Y {
            return false;
        }
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.layers.push(self.layer.clone());
        self.y = TOP_Y;
        true
    }

    fn text(&self, font: &IndirectFontRef, size: f32, x: f32, text: &str) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn text_at(&self, font: &IndirectFontRef, size: f32, x: f32, y: f32, text: &str) {
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn rule(&self) {
        rule_on(&self.layer, self.y);
    }

    fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }
}

fn rule_on(layer: &PdfLayerReference, y: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN_LEFT), Mm(y)), false),
            (Point::new(Mm(MARGIN_RIGHT), Mm(y)), false),
        ],
        is_closed: false,
    });
}

pub fn render_invoice(
    invoice: &Invoice,
    company: &CompanyProfile,
    logo: Option<&[u8]>,
    policy: TaxPolicy,
) -> Result<Vec<u8>, AppError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        format!("Invoice {}", invoice.invoice_number()),
        Mm(PAGE_W),
        Mm(PAGE_H),
        "Layer 1",
    );
    let fonts = Fonts::load(&doc)?;

    let layers = {
        let mut cursor = PageCursor::new(&doc, doc.get_page(first_page).get_layer(first_layer));
        if let Err(err) = draw_body(&mut cursor, &fonts, invoice, company, logo, policy) {
            tracing::error!(
                invoice_id = %invoice.id,
                error = %err,
                "Invoice layout failed, emitting error document"
            );
            cursor.text_at(
                &fonts.bold,
                14.0,
                MARGIN_LEFT,
                150.0,
                "Error generating invoice PDF",
            );
        }
        cursor.layers
    };

    let page_count = layers.len();
    for (index, layer) in layers.iter().enumerate() {
        draw_footer(layer, &fonts, company, index + 1, page_count);
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)
        .map_err(|e| AppError::RenderError(anyhow::anyhow!("Failed to finalize PDF: {}", e)))?;
    writer
        .into_inner()
        .map_err(|e| AppError::RenderError(anyhow::anyhow!("Failed to flush PDF buffer: {}", e)))
}

fn draw_body(
    cursor: &mut PageCursor<'_>,
    fonts: &Fonts,
    invoice: &Invoice,
    company: &CompanyProfile,
    logo: Option<&[u8]>,
    policy: TaxPolicy,
) -> Result<(), anyhow::Error> {
    // Header band: logo + company block on the left.
    if let Some(bytes) = logo {
        embed_logo(&cursor.layer, bytes);
    }
    let company_x = MARGIN_LEFT + LOGO_BOX + 5.0;
    cursor.text(&fonts.bold, 11.0, company_x, &company.name);
    cursor.advance(5.5);
    for line in wrap_text(&company.address, ADDRESS_WRAP) {
        cursor.text(&fonts.regular, 9.0, company_x, &line);
        cursor.advance(4.5);
    }
    cursor.text(&fonts.regular, 9.0, company_x, &format!("GSTIN: {}", company.gstin));
    cursor.advance(4.5);
    cursor.text(&fonts.regular, 9.0, company_x, &format!("Email: {}", company.email));

    // Invoice meta block on the right.
    cursor.text_at(&fonts.bold, 14.0, META_X, TOP_Y, "Original Tax Invoice");
    let phone = if invoice.customer_phone.is_empty() {
        "N/A"
    } else {
        invoice.customer_phone.as_str()
    };
    let meta = [
        format!("Invoice Date: {}", invoice.issue_date.format("%d/%m/%Y")),
        format!("Invoice Number: {}", invoice.invoice_number()),
        format!("Customer Name: {}", invoice.customer_name),
        format!("Mobile Number: {}", phone),
    ];
    let mut meta_y = TOP_Y - 8.0;
    for line in &meta {
        cursor.text_at(&fonts.regular, 9.0, META_X, meta_y, line);
        meta_y -= 4.5;
    }

    // Both blocks end above this line regardless of address length cap.
    cursor.y = cursor.y.min(meta_y).min(TOP_Y - 32.0);
    cursor.rule();
    cursor.advance(8.0);

    draw_table_header(cursor, fonts, policy);
    for item in &invoice.items {
        draw_item_row(cursor, fonts, item, policy)?;
    }

    draw_totals(cursor, fonts, invoice, policy);

    cursor.ensure_room(20.0);
    cursor.advance(14.0);
    cursor.text(&fonts.regular, 10.0, MARGIN_LEFT, "Authorised Signatory");

    Ok(())
}

fn draw_table_header(cursor: &mut PageCursor<'_>, fonts: &Fonts, policy: TaxPolicy) {
    let columns = column_layout(policy);
    for (x, label) in columns {
        cursor.text(&fonts.bold, 9.0, x, label);
    }
    cursor.advance(2.5);
    cursor.rule();
    cursor.advance(5.5);
}

/// Column x positions. The Tax % column only exists under the per-item
/// policy; the flat variant has nothing per-item to show there.
fn column_layout(policy: TaxPolicy) -> Vec<(f32, &'static str)> {
    match policy {
        TaxPolicy::PerItem => vec![
            (MARGIN_LEFT, "Description"),
            (92.0, "Qty"),
            (112.0, "Unit Price"),
            (140.0, "Tax %"),
            (163.0, "Amount (INR)"),
        ],
        TaxPolicy::Flat { .. } => vec![
            (MARGIN_LEFT, "Description"),
            (92.0, "Qty"),
            (118.0, "Unit Price"),
            (163.0, "Amount (INR)"),
        ],
    }
}

fn draw_item_row(
    cursor: &mut PageCursor<'_>,
    fonts: &Fonts,
    item: &LineItem,
    policy: TaxPolicy,
) -> Result<(), anyhow::Error> {
    let description = if item.description.is_empty() {
        "-".to_string()
    } else {
        item.description.clone()
    };
    let desc_lines = wrap_text(&description, DESC_WRAP);
    let row_height = ROW_H * desc_lines.len() as f32 + 1.0;

    if cursor.ensure_room(row_height + 10.0) {
        if cursor.layers.len() > MAX_PAGES {
            anyhow::bail!(
                "Item table paginates past the {} page cap",
                MAX_PAGES
            );
        }
        draw_table_header(cursor, fonts, policy);
    }

    let line_amount = item.line_amount();
    cursor.text(&fonts.regular, 9.0, 92.0, &item.quantity.normalize().to_string());
    match policy {
        TaxPolicy::PerItem => {
            cursor.text(&fonts.regular, 9.0, 112.0, &fmt_money(item.unit_price));
            cursor.text(
                &fonts.regular,
                9.0,
                140.0,
                &format!("{}%", item.tax_rate.normalize()),
            );
        }
        TaxPolicy::Flat { .. } => {
            cursor.text(&fonts.regular, 9.0, 118.0, &fmt_money(item.unit_price));
        }
    }
    cursor.text(&fonts.regular, 9.0, 163.0, &fmt_money(line_amount));

    for line in desc_lines {
        cursor.text(&fonts.regular, 9.0, MARGIN_LEFT, &line);
        cursor.advance(ROW_H);
    }
    cursor.advance(1.0);
    Ok(())
}

fn draw_totals(cursor: &mut PageCursor<'_>, fonts: &Fonts, invoice: &Invoice, policy: TaxPolicy) {
    // Keep the whole totals block on one page.
    cursor.ensure_room(52.0);

    cursor.advance(2.0);
    cursor.rule();
    cursor.advance(8.0);

    let gst_label = match policy {
        TaxPolicy::PerItem => "GST".to_string(),
        TaxPolicy::Flat { rate } => format!("GST ({}%)", rate.normalize()),
    };
    let rows = [
        ("Subtotal".to_string(), invoice.subtotal),
        (gst_label, invoice.gst),
        ("CGST".to_string(), invoice.cgst),
        ("SGST".to_string(), invoice.sgst),
    ];
    for (label, amount) in &rows {
        cursor.text(&fonts.regular, 10.0, MARGIN_LEFT, label);
        cursor.text(&fonts.regular, 10.0, 163.0, &fmt_money(*amount));
        cursor.advance(7.0);
    }

    cursor.rule();
    cursor.advance(6.5);
    cursor.text(&fonts.bold, 11.0, MARGIN_LEFT, "Grand Total");
    cursor.text(&fonts.bold, 11.0, 163.0, &fmt_money(invoice.total));
    cursor.advance(3.5);
    cursor.rule();
}

/// Footer anchored near the bottom of every page, independent of how far
/// the flowing content reached.
fn draw_footer(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    company: &CompanyProfile,
    page: usize,
    page_count: usize,
) {
    let year = chrono::Utc::now().format("%Y");
    layer.use_text(
        format!("(c) {}, {}", company.name, year),
        9.0,
        Mm(80.0),
        Mm(16.0),
        &fonts.oblique,
    );
    layer.use_text(
        format!("Page {} of {}", page, page_count),
        9.0,
        Mm(80.0),
        Mm(11.0),
        &fonts.oblique,
    );
}

/// Builtin-font text is WinAnsi encoded, which has no rupee glyph, so
/// amounts carry a "Rs." marker instead.
fn fmt_money(amount: Decimal) -> String {
    format!("Rs. {:.2}", amount)
}

fn embed_logo(layer: &PdfLayerReference, bytes: &[u8]) {
    let image = match decode_logo(bytes) {
        Some(image) => image,
        None => {
            tracing::warn!("Logo file is not a decodable PNG or JPEG, omitting");
            return;
        }
    };

    let dpi: f32 = 300.0;
    let natural_w = image.image.width.0 as f32 / dpi * 25.4;
    let natural_h = image.image.height.0 as f32 / dpi * 25.4;
    if natural_w <= 0.0 || natural_h <= 0.0 {
        return;
    }
    let scale = (LOGO_BOX / natural_w).min(LOGO_BOX / natural_h);

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN_LEFT)),
            translate_y: Some(Mm(TOP_Y - LOGO_BOX + 2.0)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}

fn decode_logo(bytes: &[u8]) -> Option<Image> {
    use printpdf::image_crate::codecs::{jpeg::JpegDecoder, png::PngDecoder};

    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        let decoder = PngDecoder::new(Cursor::new(bytes)).ok()?;
        Image::try_from(decoder).ok()
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        let decoder = JpegDecoder::new(Cursor::new(bytes)).ok()?;
        Image::try_from(decoder).ok()
    } else {
        None
    }
}

/// Greedy word wrap by character budget; words longer than the budget are
/// hard-broken.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split_at = word
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(word.len());
            lines.push(word[..split_at].to_string());
            word = &word[split_at..];
        }
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

//! One-file PDF summary of a conformity analysis.

use std::io::{BufReader, Cursor};
use std::time::Instant;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::analysis::ReportResult;
use crate::error::Error;
use crate::fonts::{StandardFont, to_winansi_bytes};

use super::ChartImage;
use super::docx::CHART_HEADING;
use super::summary::{NAO_CONFORME_LABEL, proportions};

const PAGE_WIDTH: f32 = 595.28; // A4
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 56.7; // 2 cm
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const INDEX_COLUMN: f32 = 54.0;
const CHART_WIDTH: f32 = 360.0; // 5 inches
const BODY_SIZE: f32 = 10.0;
const LINE_FACTOR: f32 = 1.25;

pub const TITLE: &str = "Análise de Conformidades";

/// Greedy word wrap. Words wider than the line are split by character.
fn wrap_text(text: &str, font: &StandardFont, font_size: f32, max_width: f32) -> Vec<String> {
    let space = font.space_width(font_size);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_w = 0.0f32;

    for word in text.split_whitespace() {
        let word_w = font.word_width(word, font_size);
        if !line.is_empty() && line_w + space + word_w <= max_width {
            line.push(' ');
            line.push_str(word);
            line_w += space + word_w;
            continue;
        }
        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line_w = 0.0;
        }
        if word_w <= max_width {
            line.push_str(word);
            line_w = word_w;
            continue;
        }
        for ch in word.chars() {
            let ch_w = font.char_width_1000(ch) * font_size / 1000.0;
            if !line.is_empty() && line_w + ch_w > max_width {
                lines.push(std::mem::take(&mut line));
                line_w = 0.0;
            }
            line.push(ch);
            line_w += ch_w;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Top-down page filler. `y` is the next baseline's top edge.
struct PageFlow {
    pages: Vec<Content>,
    current: Content,
    y: f32,
}

impl PageFlow {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Content::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        let done = std::mem::replace(&mut self.current, Content::new());
        self.pages.push(done);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure(&mut self, height: f32) {
        if self.y - height < MARGIN && self.y < PAGE_HEIGHT - MARGIN {
            self.new_page();
        }
    }

    fn show(&mut self, font: &StandardFont, font_size: f32, x: f32, baseline: f32, text: &str) {
        self.current
            .begin_text()
            .set_font(Name(font.pdf_name.as_bytes()), font_size)
            .next_line(x, baseline);
        self.current.show(Str(&to_winansi_bytes(text)));
        self.current.end_text();
    }

    fn line(&mut self, font: &StandardFont, font_size: f32, x: f32, text: &str) {
        let line_h = font_size * LINE_FACTOR;
        self.ensure(line_h);
        let baseline = self.y - font_size;
        self.show(font, font_size, x, baseline, text);
        self.y -= line_h;
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn rule(&mut self) {
        let y = self.y - 2.0;
        self.current
            .set_line_width(0.5)
            .set_stroke_gray(0.6)
            .move_to(MARGIN, y)
            .line_to(PAGE_WIDTH - MARGIN, y)
            .stroke();
        self.y -= 6.0;
    }

    fn swatch(&mut self, color: [u8; 3], x: f32, size: f32) {
        let [r, g, b] = color.map(|c| c as f32 / 255.0);
        self.current
            .set_fill_rgb(r, g, b)
            .rect(x, self.y - size, size, size)
            .fill_nonzero()
            .set_fill_gray(0.0);
    }

    fn finish(mut self) -> Vec<Content> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Decoded chart ready to be written as an image XObject.
struct ChartXObject {
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
    width: u32,
    height: u32,
}

fn decode_chart(chart: &ChartImage) -> Result<ChartXObject, Error> {
    let reader = image::ImageReader::with_format(
        BufReader::new(Cursor::new(&chart.data)),
        image::ImageFormat::Png,
    );
    let rgba: image::RgbaImage = reader.decode()?.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let alpha = has_alpha.then(|| {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6)
    });

    Ok(ChartXObject {
        rgb: miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6),
        alpha,
        width,
        height,
    })
}

fn write_summary(flow: &mut PageFlow, result: &ReportResult, regular: &StandardFont, bold: &StandardFont) {
    flow.line(bold, 18.0, MARGIN, TITLE);
    flow.gap(8.0);

    flow.line(bold, 12.0, MARGIN, "Contagem");
    let swatch = 9.0;
    for p in proportions(&result.totals) {
        flow.ensure(12.0 * LINE_FACTOR);
        flow.swatch(p.color, MARGIN, swatch);
        let caption = if result.totals.total() > 0 {
            format!("{}: {}  ({})", p.label, p.count, p.caption())
        } else {
            format!("{}: {}", p.label, p.count)
        };
        flow.line(regular, 11.0, MARGIN + swatch + 6.0, &caption);
    }

    let mut warnings: Vec<String> = result.anomalies.iter().map(|a| a.to_string()).collect();
    if let Some(outcome) = &result.sanitize {
        if outcome.removed > 0 {
            warnings.push(format!("{} descrições vazias removidas", outcome.removed));
        } else if outcome.discrepancy != 0 {
            warnings.push(format!(
                "{NAO_CONFORME_LABEL}: {} marcações, {} descrições (diferença {})",
                result.totals.nao_conforme,
                outcome.non_empty + outcome.empty,
                outcome.discrepancy
            ));
        }
    }
    if !warnings.is_empty() {
        flow.gap(6.0);
        flow.line(bold, 11.0, MARGIN, "Avisos");
        for w in &warnings {
            for line in wrap_text(w, regular, BODY_SIZE, TEXT_WIDTH - 12.0) {
                flow.line(regular, BODY_SIZE, MARGIN + 12.0, &line);
            }
        }
    }
}

fn write_listing(flow: &mut PageFlow, result: &ReportResult, regular: &StandardFont, bold: &StandardFont) {
    flow.gap(12.0);
    flow.line(
        bold,
        14.0,
        MARGIN,
        &format!("Descrições encontradas ({})", result.extractions.len()),
    );
    flow.gap(4.0);

    let header_h = BODY_SIZE * LINE_FACTOR;
    flow.ensure(header_h * 2.0);
    let baseline = flow.y - BODY_SIZE;
    flow.show(bold, BODY_SIZE, MARGIN, baseline, "Tabela");
    flow.show(bold, BODY_SIZE, MARGIN + INDEX_COLUMN, baseline, "Descrição");
    flow.y -= header_h;
    flow.rule();

    let desc_width = TEXT_WIDTH - INDEX_COLUMN;
    for record in &result.extractions {
        let lines = wrap_text(&record.description, regular, BODY_SIZE, desc_width);
        let line_h = BODY_SIZE * LINE_FACTOR;
        // Keep short records on one page; long ones may still split.
        flow.ensure(line_h * lines.len().min(4) as f32);
        for (i, line) in lines.iter().enumerate() {
            flow.ensure(line_h);
            let baseline = flow.y - BODY_SIZE;
            if i == 0 {
                flow.show(
                    regular,
                    BODY_SIZE,
                    MARGIN,
                    baseline,
                    &record.source_table_index.to_string(),
                );
            }
            flow.show(regular, BODY_SIZE, MARGIN + INDEX_COLUMN, baseline, line);
            flow.y -= line_h;
        }
        flow.rule();
    }
}

/// Render the summary (and the chart, when given) as PDF bytes.
pub fn render(result: &ReportResult, chart: Option<&ChartImage>) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    let regular = StandardFont::helvetica();
    let bold = StandardFont::helvetica_bold();

    let mut flow = PageFlow::new();
    write_summary(&mut flow, result, &regular, &bold);
    write_listing(&mut flow, result, &regular, &bold);

    let chart_xobject = chart.map(decode_chart).transpose()?;
    if let Some(xobj) = &chart_xobject {
        flow.new_page();
        flow.line(&bold, 14.0, MARGIN, CHART_HEADING);
        flow.gap(12.0);
        let available = flow.y - MARGIN;
        let mut width = CHART_WIDTH;
        let mut height = width * xobj.height as f32 / xobj.width as f32;
        if height > available {
            width *= available / height;
            height = available;
        }
        let x = (PAGE_WIDTH - width) / 2.0;
        let y = flow.y - height;
        flow.current
            .save_state()
            .transform([width, 0.0, 0.0, height, x, y])
            .x_object(Name(b"Im1"))
            .restore_state();
        flow.y = y - 12.0;
        for p in proportions(&result.totals) {
            flow.ensure(11.0 * LINE_FACTOR);
            flow.swatch(p.color, x, 9.0);
            flow.line(&regular, 11.0, x + 15.0, &format!("{}: {}", p.label, p.caption()));
        }
    }
    let contents = flow.finish();

    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let pages_id = alloc.bump();
    let mut pdf = Pdf::new();

    let mut font_pairs = Vec::new();
    for font in [&regular, &bold] {
        let font_ref = alloc.bump();
        pdf.type1_font(font_ref)
            .base_font(Name(font.base_font.as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        font_pairs.push((font.pdf_name, font_ref));
    }

    let image_ref = chart_xobject.map(|xobj| {
        let smask_ref = xobj.alpha.as_ref().map(|alpha| {
            let mask_ref = alloc.bump();
            let mut mask = pdf.image_xobject(mask_ref, alpha);
            mask.filter(Filter::FlateDecode);
            mask.width(xobj.width as i32);
            mask.height(xobj.height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            mask_ref
        });
        let xobj_ref = alloc.bump();
        let mut image = pdf.image_xobject(xobj_ref, &xobj.rgb);
        image.filter(Filter::FlateDecode);
        image.width(xobj.width as i32);
        image.height(xobj.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        if let Some(mask_ref) = smask_ref {
            image.s_mask(mask_ref);
        }
        xobj_ref
    });

    let n = contents.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc.bump()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc.bump()).collect();

    for (i, c) in contents.into_iter().enumerate() {
        let raw = c.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut fonts = resources.fonts();
            for (name, font_ref) in &font_pairs {
                fonts.pair(Name(name.as_bytes()), *font_ref);
            }
        }
        if let Some(image_ref) = image_ref {
            resources.x_objects().pair(Name(b"Im1"), image_ref);
        }
    }

    let bytes = pdf.finish();
    log::info!(
        "PDF summary: {} pages, {} descriptions, {:.1}ms ({} bytes)",
        n,
        result.extractions.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
        bytes.len(),
    );
    Ok(bytes)
}

//! Regenerated Word documents carrying the conformity report.
//!
//! [`build_report`] writes a fresh document; [`append_report`] copies a
//! source DOCX and adds the same content at the end of its body.

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{Cursor, Read, Seek, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::analysis::ReportResult;
use crate::docx::{WML_NS, is_wml, open_archive, read_zip_text, wml};
use crate::error::Error;

use super::ChartImage;
use super::summary::{CONFORME_LABEL, NAO_CONFORME_LABEL, proportions};

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const WPD_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const DOCUMENT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

pub const SUMMARY_HEADING: &str = "Resumo Não Conformidades";
pub const CHART_HEADING: &str = "Gráfico de Análise Conformidades";
pub const TABLE_HEADERS: [&str; 3] = ["Descrição", "Tabela", "Situação"];

/// Display width of the embedded chart: 5 inches.
const CHART_WIDTH_EMU: u64 = 5 * 914_400;
/// Column widths in twips (description, table index, status).
const COLUMN_WIDTHS: [u32; 3] = [6000, 1200, 1800];

fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Where the chart picture lives inside the package.
struct ChartPart<'a> {
    image: &'a ChartImage,
    rel_id: String,
    doc_pr_id: u32,
}

fn run(text: &str, bold: bool, half_points: u32) -> String {
    let bold = if bold { "<w:b/>" } else { "" };
    format!(
        r#"<w:r><w:rPr>{bold}<w:sz w:val="{half_points}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape(text)
    )
}

fn heading(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/></w:pPr>{}</w:p>"#,
        run(text, true, 32)
    )
}

fn text_paragraph(text: &str) -> String {
    format!("<w:p>{}</w:p>", run(text, false, 22))
}

fn table_cell(width: u32, content: Option<(&str, bool)>) -> String {
    let para = match content {
        Some((text, bold)) if !text.is_empty() => format!("<w:p>{}</w:p>", run(text, bold, 20)),
        _ => "<w:p/>".to_string(),
    };
    format!(r#"<w:tc><w:tcPr><w:tcW w:w="{width}" w:type="dxa"/></w:tcPr>{para}</w:tc>"#)
}

fn report_table(result: &ReportResult) -> String {
    let border = r#"w:val="single" w:sz="4" w:space="0" w:color="000000""#;
    let mut xml = String::new();
    xml.push_str("<w:tbl><w:tblPr><w:tblW w:w=\"0\" w:type=\"auto\"/><w:tblBorders>");
    for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        xml.push_str(&format!("<w:{side} {border}/>"));
    }
    xml.push_str("</w:tblBorders></w:tblPr><w:tblGrid>");
    for width in COLUMN_WIDTHS {
        xml.push_str(&format!(r#"<w:gridCol w:w="{width}"/>"#));
    }
    xml.push_str("</w:tblGrid>");

    xml.push_str("<w:tr><w:trPr><w:tblHeader/></w:trPr>");
    for (header, width) in TABLE_HEADERS.iter().zip(COLUMN_WIDTHS) {
        xml.push_str(&table_cell(width, Some((*header, true))));
    }
    xml.push_str("</w:tr>");

    for record in &result.extractions {
        let index = record.source_table_index.to_string();
        xml.push_str("<w:tr>");
        xml.push_str(&table_cell(COLUMN_WIDTHS[0], Some((record.description.as_str(), false))));
        xml.push_str(&table_cell(COLUMN_WIDTHS[1], Some((index.as_str(), false))));
        xml.push_str(&table_cell(COLUMN_WIDTHS[2], None));
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

fn chart_paragraph(part: &ChartPart) -> String {
    let cx = CHART_WIDTH_EMU;
    let cy = (cx as f64 * part.image.pixel_height as f64 / part.image.pixel_width as f64).round()
        as u64;
    // Namespaces are declared inline so the fragment is valid in any host document.
    format!(
        concat!(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:drawing>"#,
            r#"<wp:inline xmlns:wp="{wpd}" distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="Chart {id}"/>"#,
            r#"<a:graphic xmlns:a="{dml}"><a:graphicData uri="{pic}">"#,
            r#"<pic:pic xmlns:pic="{pic}"><pic:nvPicPr><pic:cNvPr id="{id}" name="chart.png"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip xmlns:r="{rel}" r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
            r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
        ),
        wpd = WPD_NS,
        dml = DML_NS,
        pic = PIC_NS,
        rel = REL_NS,
        cx = cx,
        cy = cy,
        id = part.doc_pr_id,
        rid = escape(&part.rel_id),
    )
}

/// Body content shared by the standalone and the appended report.
fn report_body(result: &ReportResult, chart: Option<&ChartPart>) -> String {
    let mut xml = String::new();
    xml.push_str(&heading(SUMMARY_HEADING));
    xml.push_str(&text_paragraph(&format!(
        "{CONFORME_LABEL}: {}",
        result.totals.conforme
    )));
    xml.push_str(&text_paragraph(&format!(
        "{NAO_CONFORME_LABEL}: {}",
        result.totals.nao_conforme
    )));
    xml.push_str(&report_table(result));
    xml.push_str("<w:p/>");

    if let Some(part) = chart {
        xml.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
        xml.push_str(&heading(CHART_HEADING));
        xml.push_str(&chart_paragraph(part));
        for p in proportions(&result.totals) {
            xml.push_str(&text_paragraph(&format!("{}: {}", p.label, p.caption())));
        }
    }
    xml
}

fn content_types(with_png: bool) -> String {
    let png = if with_png {
        r#"<Default Extension="png" ContentType="image/png"/>"#
    } else {
        ""
    };
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>{png}"#,
            r#"<Override PartName="/word/document.xml" ContentType="{doc}"/>"#,
            r#"</Types>"#,
        ),
        png = png,
        doc = DOCUMENT_CONTENT_TYPE,
    )
}

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#,
);

fn image_relationship(rel_id: &str, target: &str) -> String {
    format!(
        r#"<Relationship Id="{}" Type="{IMAGE_REL_TYPE}" Target="{}"/>"#,
        escape(rel_id),
        escape(target)
    )
}

/// A new document holding only the report.
pub fn build_report(result: &ReportResult, chart: Option<&ChartImage>) -> Result<Vec<u8>, Error> {
    let part = chart.map(|image| ChartPart {
        image,
        rel_id: "rId1".to_string(),
        doc_pr_id: 1,
    });

    let document = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="{w}" xmlns:r="{r}"><w:body>{body}"#,
            r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
            r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/>"#,
            r#"</w:sectPr></w:body></w:document>"#,
        ),
        w = WML_NS,
        r = REL_NS,
        body = report_body(result, part.as_ref()),
    );

    let mut rels = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    ));
    if let Some(part) = &part {
        rels.push_str(&image_relationship(&part.rel_id, "media/chart.png"));
    }
    rels.push_str("</Relationships>");

    let options = SimpleFileOptions::default();
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types(part.is_some()).as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(PACKAGE_RELS.as_bytes())?;
    zip.start_file("word/document.xml", options)?;
    zip.write_all(document.as_bytes())?;
    zip.start_file("word/_rels/document.xml.rels", options)?;
    zip.write_all(rels.as_bytes())?;
    if let Some(image) = chart {
        zip.start_file("word/media/chart.png", options)?;
        zip.write_all(&image.data)?;
    }
    let bytes = zip.finish()?.into_inner();

    log::debug!(
        "Built report document: {} rows, chart={}, {} bytes",
        result.extractions.len(),
        chart.is_some(),
        bytes.len()
    );
    Ok(bytes)
}

/// Byte offset in `document.xml` where appended body content goes: before
/// the body-level `w:sectPr`, or before `</w:body>` when there is none.
fn body_insertion_point(xml_content: &str) -> Result<usize, Error> {
    let xml = roxmltree::Document::parse(xml_content)?;
    let body = wml(xml.root_element(), "body")
        .ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

    if let Some(sect_pr) = body.children().filter(|n| n.is_element()).last()
        && is_wml(sect_pr, "sectPr")
    {
        return Ok(sect_pr.range().start);
    }

    let range = body.range();
    let body_src = &xml_content[range.clone()];
    if body_src.ends_with("/>") {
        return Err(Error::InvalidDocx("w:body has no content".into()));
    }
    body_src
        .rfind("</")
        .map(|offset| range.start + offset)
        .ok_or_else(|| Error::InvalidDocx("unterminated w:body".into()))
}

fn max_doc_pr_id(xml_content: &str) -> u32 {
    roxmltree::Document::parse(xml_content)
        .map(|xml| {
            xml.descendants()
                .filter(|n| n.tag_name().name() == "docPr" && n.tag_name().namespace() == Some(WPD_NS))
                .filter_map(|n| n.attribute("id").and_then(|v| v.parse::<u32>().ok()))
                .max()
                .unwrap_or(0)
        })
        .unwrap_or(0)
}

fn relationship_ids(rels_xml: &str) -> HashSet<String> {
    let Ok(xml) = roxmltree::Document::parse(rels_xml) else {
        return HashSet::new();
    };
    xml.root_element()
        .children()
        .filter(|n| n.tag_name().name() == "Relationship")
        .filter_map(|n| n.attribute("Id").map(str::to_string))
        .collect()
}

fn insert_before_closing(xml: &str, closing_tag: &str, fragment: &str) -> Result<String, Error> {
    let pos = xml
        .rfind(closing_tag)
        .ok_or_else(|| Error::InvalidDocx(format!("missing {closing_tag}")))?;
    let mut out = String::with_capacity(xml.len() + fragment.len());
    out.push_str(&xml[..pos]);
    out.push_str(fragment);
    out.push_str(&xml[pos..]);
    Ok(out)
}

fn has_png_default(content_types_xml: &str) -> bool {
    let Ok(xml) = roxmltree::Document::parse(content_types_xml) else {
        return false;
    };
    xml.root_element().children().any(|n| {
        n.tag_name().name() == "Default"
            && n.attribute("Extension")
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
    })
}

fn unique_name(taken: impl Fn(&str) -> bool, make: impl Fn(u32) -> String) -> String {
    let mut n = 1;
    loop {
        let candidate = make(n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn copy_archive_with<R: Read + Seek>(
    source: &mut zip::ZipArchive<R>,
    replaced: &[(&str, &[u8])],
    added: &[(&str, &[u8])],
) -> Result<Vec<u8>, Error> {
    let mut out = ZipWriter::new(Cursor::new(Vec::new()));
    let mut written: HashSet<String> = HashSet::new();

    for i in 0..source.len() {
        let mut entry = source.by_index(i)?;
        let name = entry.name().to_string();
        let options = SimpleFileOptions::default().compression_method(entry.compression());
        if entry.is_dir() {
            out.add_directory(name.as_str(), options)?;
            continue;
        }
        out.start_file(name.as_str(), options)?;
        if let Some((_, data)) = replaced.iter().find(|(n, _)| *n == name) {
            out.write_all(data)?;
        } else {
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            out.write_all(&data)?;
        }
        written.insert(name);
    }

    for (name, data) in replaced.iter().chain(added) {
        if written.insert(name.to_string()) {
            out.start_file(*name, SimpleFileOptions::default())?;
            out.write_all(data)?;
        }
    }

    Ok(out.finish()?.into_inner())
}

/// Copy `source` and add the report at the end of its body.
pub fn append_report(
    source: &[u8],
    result: &ReportResult,
    chart: Option<&ChartImage>,
) -> Result<Vec<u8>, Error> {
    let mut zip = open_archive(Cursor::new(source))?;
    let document_xml = read_zip_text(&mut zip, "word/document.xml")
        .ok_or_else(|| Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into()))?;
    let content_types_xml = read_zip_text(&mut zip, "[Content_Types].xml")
        .ok_or_else(|| Error::InvalidDocx("missing [Content_Types].xml".into()))?;
    let rels_xml = read_zip_text(&mut zip, "word/_rels/document.xml.rels").unwrap_or_else(|| {
        String::from(concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#,
        ))
    });

    let existing_names: HashSet<String> = zip.file_names().map(str::to_string).collect();

    let part = chart.map(|image| {
        let ids = relationship_ids(&rels_xml);
        ChartPart {
            image,
            rel_id: unique_name(|id| ids.contains(id), |n| format!("rIdConformityChart{n}")),
            doc_pr_id: max_doc_pr_id(&document_xml) + 1,
        }
    });
    let media_name = unique_name(
        |name| existing_names.contains(name),
        |n| format!("word/media/conformity_chart{n}.png"),
    );

    let insert_at = body_insertion_point(&document_xml)?;
    let mut new_document = String::with_capacity(document_xml.len() + 4096);
    new_document.push_str(&document_xml[..insert_at]);
    new_document.push_str(&report_body(result, part.as_ref()));
    new_document.push_str(&document_xml[insert_at..]);

    let mut replaced: Vec<(&str, Vec<u8>)> = vec![("word/document.xml", new_document.into_bytes())];
    let mut added: Vec<(&str, Vec<u8>)> = Vec::new();

    if let (Some(part), Some(image)) = (&part, chart) {
        let target = media_name.trim_start_matches("word/");
        let rels = insert_before_closing(
            &rels_xml,
            "</Relationships>",
            &image_relationship(&part.rel_id, target),
        )?;
        replaced.push(("word/_rels/document.xml.rels", rels.into_bytes()));
        if !has_png_default(&content_types_xml) {
            let types = insert_before_closing(
                &content_types_xml,
                "</Types>",
                r#"<Default Extension="png" ContentType="image/png"/>"#,
            )?;
            replaced.push(("[Content_Types].xml", types.into_bytes()));
        }
        added.push((media_name.as_str(), image.data.clone()));
    }

    let replaced: Vec<(&str, &[u8])> = replaced.iter().map(|(n, d)| (*n, d.as_slice())).collect();
    let added: Vec<(&str, &[u8])> = added.iter().map(|(n, d)| (*n, d.as_slice())).collect();
    let bytes = copy_archive_with(&mut zip, &replaced, &added)?;

    log::debug!(
        "Appended report to document: {} rows, chart={}, {} bytes",
        result.extractions.len(),
        chart.is_some(),
        bytes.len()
    );
    Ok(bytes)
}

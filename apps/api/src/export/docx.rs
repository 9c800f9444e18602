//! WordprocessingML export.
//!
//! The package is assembled by hand: six XML parts written with `quick-xml`
//! and zipped with `zip`. Only the handful of paragraph and run properties
//! the CV layout needs are emitted.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::export::{contact_items, description_lines, outline, Block, ExportError};
use crate::models::cv::{CvData, Entity, Language};
use crate::render::dates::entity_range;
use crate::render::labels::labels;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const PAGE_MARGIN: &str = "1000";
const DATE_TAB: &str = "9000";
const BULLET_NUM_ID: &str = "1";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="40"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:style></w:styles>"#;

const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="•"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

/// `CV_<Full_Name>.docx`, or `CV_Draft.docx` without a name.
pub fn file_name(doc: &CvData) -> String {
    let name: Vec<String> = doc
        .personal_info
        .full_name
        .split_whitespace()
        .map(|part| {
            part.chars()
                .filter(|c| !matches!(c, '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|'))
                .collect::<String>()
        })
        .filter(|part| !part.is_empty())
        .collect();
    if name.is_empty() {
        "CV_Draft.docx".to_string()
    } else {
        format!("CV_{}.docx", name.join("_"))
    }
}

/// Builds the zipped `.docx` package.
pub fn render(doc: &CvData, language: Language) -> Result<Vec<u8>, ExportError> {
    let body = document_xml(doc, language)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let parts: [(&str, &[u8]); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", ROOT_RELS.as_bytes()),
        ("word/document.xml", body.as_slice()),
        ("word/styles.xml", STYLES.as_bytes()),
        ("word/numbering.xml", NUMBERING.as_bytes()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
    ];
    for (name, bytes) in parts {
        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
    }
    Ok(zip.finish()?.into_inner())
}

// ────────────────────────────────────────────────────────────────────────────
// document.xml
// ────────────────────────────────────────────────────────────────────────────

/// Run formatting used by the layout.
#[derive(Debug, Clone, Copy, Default)]
struct RunStyle {
    bold: bool,
    italic: bool,
    /// Half-points.
    size: Option<u32>,
}

impl RunStyle {
    fn sized(size: u32) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ParaStyle {
    style: Option<&'static str>,
    centered: bool,
    bottom_border: bool,
    right_tab: bool,
    bullet: bool,
    spacing_before: Option<u32>,
    spacing_after: Option<u32>,
}

struct Xml {
    writer: Writer<Vec<u8>>,
}

fn encode_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Encode(e.to_string())
}

impl Xml {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        self.writer.write_event(event).map_err(encode_err)
    }

    fn start(&mut self, tag: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        let mut start = BytesStart::new(tag);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.event(Event::Start(start))
    }

    fn end(&mut self, tag: &str) -> Result<(), ExportError> {
        self.event(Event::End(BytesEnd::new(tag)))
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        let mut start = BytesStart::new(tag);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.event(Event::Empty(start))
    }

    fn paragraph(&mut self, style: ParaStyle, runs: &[(&str, RunStyle)]) -> Result<(), ExportError> {
        self.start("w:p", &[])?;
        self.paragraph_properties(style)?;
        for (text, run) in runs {
            self.run(text, *run)?;
        }
        self.end("w:p")
    }

    fn paragraph_properties(&mut self, style: ParaStyle) -> Result<(), ExportError> {
        self.start("w:pPr", &[])?;
        if let Some(id) = style.style {
            self.empty("w:pStyle", &[("w:val", id)])?;
        }
        if style.bullet {
            self.start("w:numPr", &[])?;
            self.empty("w:ilvl", &[("w:val", "0")])?;
            self.empty("w:numId", &[("w:val", BULLET_NUM_ID)])?;
            self.end("w:numPr")?;
        }
        if style.bottom_border {
            self.start("w:pBdr", &[])?;
            self.empty(
                "w:bottom",
                &[("w:val", "single"), ("w:sz", "12"), ("w:space", "1"), ("w:color", "000000")],
            )?;
            self.end("w:pBdr")?;
        }
        if style.right_tab {
            self.start("w:tabs", &[])?;
            self.empty("w:tab", &[("w:val", "right"), ("w:pos", DATE_TAB)])?;
            self.end("w:tabs")?;
        }
        if style.spacing_before.is_some() || style.spacing_after.is_some() {
            let before = style.spacing_before.unwrap_or(0).to_string();
            let after = style.spacing_after.unwrap_or(0).to_string();
            self.empty("w:spacing", &[("w:before", before.as_str()), ("w:after", after.as_str())])?;
        }
        if style.centered {
            self.empty("w:jc", &[("w:val", "center")])?;
        }
        self.end("w:pPr")
    }

    /// One run. A leading `\t` becomes a tab element so the text after it
    /// aligns to the paragraph's tab stop.
    fn run(&mut self, text: &str, style: RunStyle) -> Result<(), ExportError> {
        self.start("w:r", &[])?;
        if style.bold || style.italic || style.size.is_some() {
            self.start("w:rPr", &[])?;
            if style.bold {
                self.empty("w:b", &[])?;
            }
            if style.italic {
                self.empty("w:i", &[])?;
            }
            if let Some(size) = style.size {
                self.empty("w:sz", &[("w:val", size.to_string().as_str())])?;
            }
            self.end("w:rPr")?;
        }
        let text = match text.strip_prefix('\t') {
            Some(rest) => {
                self.empty("w:tab", &[])?;
                rest
            }
            None => text,
        };
        self.start("w:t", &[("xml:space", "preserve")])?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end("w:t")?;
        self.end("w:r")
    }

    fn spacer(&mut self) -> Result<(), ExportError> {
        self.paragraph(
            ParaStyle {
                spacing_after: Some(200),
                ..ParaStyle::default()
            },
            &[],
        )
    }

    fn section_title(&mut self, title: &str) -> Result<(), ExportError> {
        let title = title.to_uppercase();
        self.paragraph(
            ParaStyle {
                style: Some("Heading2"),
                bottom_border: true,
                spacing_before: Some(200),
                spacing_after: Some(200),
                ..ParaStyle::default()
            },
            &[(title.as_str(), RunStyle::default())],
        )
    }

    fn bullets(&mut self, description: &str) -> Result<(), ExportError> {
        for line in description_lines(description) {
            self.paragraph(
                ParaStyle {
                    bullet: true,
                    spacing_after: Some(50),
                    ..ParaStyle::default()
                },
                &[(line, RunStyle::default())],
            )?;
        }
        Ok(())
    }

    /// Bold upper-cased title with the date range pushed to the right tab.
    fn title_line(
        &mut self,
        title: &str,
        extra: Option<(&str, RunStyle)>,
        dates: Option<String>,
    ) -> Result<(), ExportError> {
        let title = title.trim().to_uppercase();
        let dates = dates.map(|d| format!("\t{}", d.to_uppercase()));
        let mut runs = vec![(title.as_str(), RunStyle::sized(24).bold())];
        if let Some(extra) = extra {
            runs.push(extra);
        }
        if let Some(dates) = dates.as_deref() {
            runs.push((dates, RunStyle::sized(20).bold()));
        }
        self.paragraph(
            ParaStyle {
                right_tab: true,
                spacing_before: Some(100),
                ..ParaStyle::default()
            },
            &runs,
        )
    }
}

fn document_xml(doc: &CvData, language: Language) -> Result<Vec<u8>, ExportError> {
    let l = labels(language);
    let mut x = Xml::new();

    x.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    x.start("w:document", &[("xmlns:w", W_NS)])?;
    x.start("w:body", &[])?;

    let name = doc.personal_info.full_name.trim();
    let name = if name.is_empty() { l.placeholder_name } else { name }.to_uppercase();
    x.paragraph(
        ParaStyle {
            style: Some("Heading1"),
            centered: true,
            spacing_after: Some(200),
            ..ParaStyle::default()
        },
        &[(name.as_str(), RunStyle::default())],
    )?;

    let contacts = contact_items(doc, true).join(" | ");
    x.paragraph(
        ParaStyle {
            centered: true,
            spacing_after: Some(400),
            ..ParaStyle::default()
        },
        &[(contacts.as_str(), RunStyle::sized(20))],
    )?;

    for block in outline(doc) {
        x.section_title(l.section(block.section()))?;
        match block {
            Block::Summary(text) => {
                x.paragraph(
                    ParaStyle {
                        spacing_after: Some(300),
                        ..ParaStyle::default()
                    },
                    &[(text.trim(), RunStyle::default())],
                )?;
            }
            Block::Experience(items) => {
                for exp in items {
                    x.title_line(&exp.position, None, dates(exp, language))?;
                    x.paragraph(
                        ParaStyle {
                            spacing_after: Some(100),
                            ..ParaStyle::default()
                        },
                        &[(exp.company.trim(), RunStyle::sized(22).italic())],
                    )?;
                    x.bullets(&exp.description)?;
                    x.spacer()?;
                }
            }
            Block::Projects(items) => {
                for proj in items {
                    let link = proj.link.trim();
                    let link = (!link.is_empty()).then(|| format!(" ({link})"));
                    let extra = link.as_deref().map(|l| (l, RunStyle::sized(18).italic()));
                    x.title_line(&proj.name, extra, dates(proj, language))?;
                    x.bullets(&proj.description)?;
                    x.spacer()?;
                }
            }
            Block::Education(items) => {
                for edu in items {
                    x.title_line(&edu.institution, None, dates(edu, language))?;
                    x.paragraph(
                        ParaStyle {
                            spacing_after: Some(50),
                            ..ParaStyle::default()
                        },
                        &[(edu.degree.trim(), RunStyle::default())],
                    )?;
                    x.bullets(&edu.description)?;
                    x.spacer()?;
                }
            }
            Block::Skills(skills) => {
                let joined = skills
                    .iter()
                    .map(|s| s.to_uppercase())
                    .collect::<Vec<_>>()
                    .join(", ");
                x.paragraph(
                    ParaStyle {
                        spacing_after: Some(200),
                        ..ParaStyle::default()
                    },
                    &[(joined.as_str(), RunStyle::default())],
                )?;
            }
        }
    }

    x.start("w:sectPr", &[])?;
    x.empty(
        "w:pgMar",
        &[
            ("w:top", PAGE_MARGIN),
            ("w:right", PAGE_MARGIN),
            ("w:bottom", PAGE_MARGIN),
            ("w:left", PAGE_MARGIN),
        ],
    )?;
    x.end("w:sectPr")?;
    x.end("w:body")?;
    x.end("w:document")?;

    Ok(x.writer.into_inner())
}

fn dates<E: Entity>(entity: &E, language: Language) -> Option<String> {
    entity_range(entity, language)
}

//! HTML projection of a `VisualTree`.
//!
//! Editable slots carry `data-section` / `data-entity` / `data-field` so the
//! client can map a click back to its field address. The slot in Editing
//! renders as an input (or textarea) holding the draft.

use std::fmt::Write;

use crate::render::templates::TemplateKind;
use crate::render::tree::Node;
use crate::render::VisualTree;

const VOID_TAGS: &[&str] = &["img", "br", "input"];

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The `#cv-preview` fragment.
pub fn to_html(tree: &VisualTree) -> String {
    let mut out = String::new();
    write_node(&tree.root, &mut out);
    out
}

/// A standalone page: styles plus the preview fragment. Used for the preview
/// pane and as the capture source for raster exports.
pub fn page(tree: &VisualTree) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>CV</title>\n<style>{base}{accent}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        lang = match tree.language {
            crate::models::cv::Language::En => "en",
            crate::models::cv::Language::Vi => "vi",
        },
        base = BASE_CSS,
        accent = accent_css(tree.template),
        body = to_html(tree),
    )
}

fn write_attrs(out: &mut String, class: &str, attrs: &[(&'static str, String)]) {
    if !class.is_empty() {
        let _ = write!(out, " class=\"{}\"", escape(class));
    }
    for (name, value) in attrs {
        let _ = write!(out, " {name}=\"{}\"", escape(value));
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text { text } => out.push_str(&escape(text)),
        Node::Element {
            tag,
            class,
            attrs,
            children,
        } => {
            let _ = write!(out, "<{tag}");
            write_attrs(out, class, attrs);
            out.push('>');
            if VOID_TAGS.contains(tag) {
                return;
            }
            for child in children {
                write_node(child, out);
            }
            let _ = write!(out, "</{tag}>");
        }
        Node::Editable {
            address,
            multiline,
            draft,
            content,
        } => {
            let mut attrs = vec![("data-section", address.section().to_string())];
            if let Some(id) = address.entity_id() {
                attrs.push(("data-entity", id.to_string()));
            }
            attrs.push(("data-field", address.field().to_string()));

            match (draft, multiline) {
                (Some(draft), true) => {
                    out.push_str("<textarea");
                    write_attrs(out, "cv-input", &attrs);
                    out.push_str(" autofocus>");
                    out.push_str(&escape(draft));
                    out.push_str("</textarea>");
                }
                (Some(draft), false) => {
                    attrs.push(("value", draft.clone()));
                    out.push_str("<input type=\"text\"");
                    write_attrs(out, "cv-input", &attrs);
                    out.push_str(" autofocus>");
                }
                (None, _) => {
                    let tag = if *multiline { "div" } else { "span" };
                    let _ = write!(out, "<{tag}");
                    write_attrs(out, "cv-editable", &attrs);
                    out.push('>');
                    write_node(content, out);
                    let _ = write!(out, "</{tag}>");
                }
            }
        }
    }
}

const BASE_CSS: &str = "\
body{margin:0;background:#fff;}\
#cv-preview{background:#fff;color:#111;font-family:Helvetica,Arial,sans-serif;\
width:210mm;min-height:297mm;box-sizing:border-box;padding:15mm;}\
.cv-header{padding-bottom:12px;margin-bottom:16px;border-bottom:3px solid var(--accent);}\
.align-center{text-align:center;}\
.cv-photo{width:96px;height:96px;border-radius:50%;object-fit:cover;}\
.cv-name{font-size:32px;margin:0 0 8px;text-transform:uppercase;}\
.cv-contacts{display:flex;flex-wrap:wrap;gap:4px 16px;font-size:13px;}\
.align-center .cv-contacts{justify-content:center;}\
.cv-contacts a{color:inherit;text-decoration:none;}\
.cv-columns{display:grid;grid-template-columns:2fr 1fr;gap:24px;}\
.cv-section{margin-bottom:18px;}\
.cv-heading{font-size:16px;border-bottom:2px solid var(--accent);padding-bottom:2px;margin:0 0 8px;}\
.cv-entry{margin-bottom:10px;break-inside:avoid;}\
.cv-entry-head{display:flex;justify-content:space-between;align-items:baseline;gap:8px;}\
.cv-entry-title{font-size:14px;margin:0;}\
.cv-dates{font-size:12px;font-weight:bold;white-space:nowrap;}\
.cv-entry-subtitle{font-size:13px;font-style:italic;color:#444;}\
.cv-entry-description,.cv-summary{font-size:13px;line-height:1.45;margin:4px 0 0;}\
.pre-line{white-space:pre-line;}\
.cv-skills.chips{display:flex;flex-wrap:wrap;gap:6px;}\
.cv-chip{font-size:12px;border:1px solid var(--accent);padding:2px 6px;}\
.cv-skills.list{margin:0;padding-left:18px;font-size:13px;}\
.cv-skills.inline{font-size:13px;margin:0;}\
.cv-editable{cursor:text;}\
.cv-input{font:inherit;width:100%;box-sizing:border-box;}\
";

fn accent_css(template: TemplateKind) -> &'static str {
    match template {
        TemplateKind::Modern => "#cv-preview{--accent:#000;border:4px solid #000;}",
        TemplateKind::Classic => "#cv-preview{--accent:#333;font-family:Georgia,serif;}",
        TemplateKind::Minimal => "#cv-preview{--accent:#ddd;}.cv-name{text-transform:none;}",
        TemplateKind::Corporate => "#cv-preview{--accent:#1f2937;}",
        TemplateKind::Technical => {
            "#cv-preview{--accent:#2563eb;}.cv-heading,.cv-dates{font-family:monospace;}"
        }
        TemplateKind::Creative => "#cv-preview{--accent:#7e22ce;}.cv-chip{border-radius:999px;}",
        TemplateKind::Compact => {
            "#cv-preview{--accent:#111;padding:10mm;}.cv-section{margin-bottom:10px;}"
        }
    }
}

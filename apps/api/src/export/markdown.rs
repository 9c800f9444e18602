use std::fmt::Write;

use crate::export::{contact_items, entry_dates, outline, Block};
use crate::models::cv::{CvData, Entity, Language};
use crate::render::labels::labels;

pub const FILE_NAME: &str = "cv.md";

/// Connector words for entry headings: "<position> at <company>",
/// "<degree> from <institution>".
pub(crate) fn connectors(language: Language) -> (&'static str, &'static str) {
    match language {
        Language::En => ("at", "from"),
        Language::Vi => ("tại", "tại"),
    }
}

/// Joins two heading parts, dropping the connector when either side is blank.
pub(crate) fn joined(left: &str, connector: &str, right: &str) -> String {
    match (left.trim(), right.trim()) {
        ("", r) => r.to_string(),
        (l, "") => l.to_string(),
        (l, r) => format!("{l} {connector} {r}"),
    }
}

pub fn render(doc: &CvData, language: Language) -> String {
    let l = labels(language);
    let (at, from) = connectors(language);
    let mut out = String::new();

    let name = doc.personal_info.full_name.trim();
    let _ = writeln!(out, "# {}\n", if name.is_empty() { l.placeholder_name } else { name });

    let contacts = contact_items(doc, false);
    if !contacts.is_empty() {
        let _ = writeln!(out, "**{}**\n", contacts.join(" | "));
    }

    for block in outline(doc) {
        let _ = writeln!(out, "## {}\n", l.section(block.section()));
        match block {
            Block::Summary(text) => {
                let _ = writeln!(out, "{}\n", text.trim());
            }
            Block::Experience(items) => {
                for exp in items {
                    entry(&mut out, &joined(&exp.position, at, &exp.company), exp, &exp.description, language);
                }
            }
            Block::Education(items) => {
                for edu in items {
                    entry(&mut out, &joined(&edu.degree, from, &edu.institution), edu, &edu.description, language);
                }
            }
            Block::Projects(items) => {
                for proj in items {
                    entry(&mut out, proj.name.trim(), proj, &proj.description, language);
                    let link = proj.link.trim();
                    if !link.is_empty() {
                        let _ = writeln!(out, "[{link}]({link})\n");
                    }
                }
            }
            Block::Skills(skills) => {
                for skill in skills {
                    let _ = writeln!(out, "- {skill}");
                }
                out.push('\n');
            }
        }
    }

    out
}

fn entry<E: Entity>(out: &mut String, title: &str, entity: &E, description: &str, language: Language) {
    let _ = writeln!(out, "### {title}");
    if let Some(dates) = entry_dates(entity, language) {
        let _ = writeln!(out, "*{dates}*");
    }
    let description = description.trim();
    if !description.is_empty() {
        let _ = writeln!(out, "{description}");
    }
    out.push('\n');
}

use std::fmt::Write;

use crate::export::markdown::{connectors, joined};
use crate::export::{contact_items, description_lines, entry_dates, outline, Block};
use crate::models::cv::{CvData, Entity, Language};
use crate::render::labels::labels;

pub const FILE_NAME: &str = "cv.tex";

const PREAMBLE: &str = "\\documentclass[11pt,a4paper]{article}
\\usepackage[margin=0.6in]{geometry}
\\usepackage{enumitem}
\\usepackage{titlesec}
\\usepackage{xcolor}
\\usepackage{hyperref}
\\hypersetup{colorlinks=true, linkcolor=black, urlcolor=blue}
";

/// Escapes LaTeX special characters in user text.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

/// URLs go inside `\url{}`, which tolerates most specials but not braces
/// or a trailing backslash.
fn url_arg(url: &str) -> String {
    url.chars()
        .filter(|c| !matches!(c, '{' | '}' | '\\'))
        .collect()
}

pub fn render(doc: &CvData, language: Language) -> String {
    let l = labels(language);
    let (at, from) = connectors(language);
    let mut out = String::from(PREAMBLE);
    out.push_str("\n\\begin{document}\n\n");

    let name = doc.personal_info.full_name.trim();
    let name = if name.is_empty() { l.placeholder_name } else { name };
    out.push_str("\\begin{center}\n");
    let _ = writeln!(out, "\\textbf{{\\Huge {}}} \\vspace{{0.2cm}} \\\\", escape(name));
    let contacts: Vec<String> = contact_items(doc, false).into_iter().map(escape).collect();
    if !contacts.is_empty() {
        let _ = writeln!(out, "{{\\large {}}} \\\\", contacts.join(" $|$ "));
    }
    out.push_str("\\end{center}\n\n");

    for block in outline(doc) {
        let _ = writeln!(out, "\\section*{{{}}}", escape(l.section(block.section())));
        match block {
            Block::Summary(text) => {
                let _ = writeln!(out, "{}\n", escape(text.trim()));
            }
            Block::Experience(items) => {
                for exp in items {
                    let title = bold_pair(&exp.position, at, &exp.company);
                    entry(&mut out, &title, exp, &exp.description, language);
                    out.push('\n');
                }
            }
            Block::Education(items) => {
                for edu in items {
                    let title = bold_pair(&edu.degree, from, &edu.institution);
                    entry(&mut out, &title, edu, &edu.description, language);
                    out.push('\n');
                }
            }
            Block::Projects(items) => {
                for proj in items {
                    let title = format!("\\textbf{{{}}}", escape(proj.name.trim()));
                    entry(&mut out, &title, proj, &proj.description, language);
                    let link = proj.link.trim();
                    if !link.is_empty() {
                        let _ = writeln!(out, "\\url{{{}}}", url_arg(link));
                    }
                    out.push('\n');
                }
            }
            Block::Skills(skills) => {
                out.push_str("\\begin{itemize}[leftmargin=*]\n");
                for skill in skills {
                    let _ = writeln!(out, "\\item {}", escape(skill));
                }
                out.push_str("\\end{itemize}\n\n");
            }
        }
    }

    out.push_str("\\end{document}\n");
    out
}

fn bold_pair(left: &str, connector: &str, right: &str) -> String {
    let bold = |s: &str| {
        let s = s.trim();
        if s.is_empty() {
            String::new()
        } else {
            format!("\\textbf{{{}}}", escape(s))
        }
    };
    joined(&bold(left), connector, &bold(right))
}

fn entry<E: Entity>(out: &mut String, title: &str, entity: &E, description: &str, language: Language) {
    match entry_dates(entity, language) {
        Some(dates) => {
            let _ = writeln!(out, "{title} \\hfill {} \\\\", escape(&dates));
        }
        None => {
            let _ = writeln!(out, "{title} \\\\");
        }
    }
    let lines: Vec<String> = description_lines(description).map(escape).collect();
    if !lines.is_empty() {
        let _ = writeln!(out, "{}", lines.join(" \\\\\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::{Education, Experience, Project};

    #[test]
    fn test_escape_specials() {
        assert_eq!(escape("R&D 100% $5 #1 a_b {x}"), "R\\&D 100\\% \\$5 \\#1 a\\_b \\{x\\}");
        assert_eq!(escape("a\\b ~ ^"), "a\\textbackslash{}b \\textasciitilde{} \\textasciicircum{}");
    }

    #[test]
    fn test_document_structure() {
        let mut doc = CvData::empty();
        doc.personal_info.full_name = "Ada Lovelace".to_string();
        doc.personal_info.email = "ada@example.com".to_string();
        doc.personal_info.phone = "123".to_string();
        doc.experience.push(Experience {
            position: "Engineer".to_string(),
            company: "Analytical Engines".to_string(),
            start_date: "1842-01".to_string(),
            end_date: "1843-09".to_string(),
            current: true,
            description: "Wrote notes\nFound bugs".to_string(),
            ..Experience::default()
        });
        doc.skills = vec!["C++".to_string()];

        let tex = render(&doc, Language::En);
        assert!(tex.starts_with("\\documentclass[11pt,a4paper]{article}"));
        assert!(tex.contains("\\textbf{\\Huge Ada Lovelace} \\vspace{0.2cm} \\\\"));
        assert!(tex.contains("{\\large ada@example.com $|$ 123} \\\\"));
        assert!(tex.contains(
            "\\textbf{Engineer} at \\textbf{Analytical Engines} \\hfill JAN 1842 – Present \\\\"
        ));
        assert!(tex.contains("Wrote notes \\\\\nFound bugs"));
        assert!(tex.contains("\\begin{itemize}[leftmargin=*]\n\\item C++\n\\end{itemize}"));
        assert!(!tex.contains("1843"));
        assert!(tex.trim_end().ends_with("\\end{document}"));
    }

    #[test]
    fn test_sections_follow_export_order() {
        let mut doc = CvData::empty();
        doc.education.push(Education {
            degree: "BSc".to_string(),
            institution: "London".to_string(),
            ..Education::default()
        });
        doc.projects.push(Project {
            name: "Engine".to_string(),
            link: "https://example.com/{x}".to_string(),
            ..Project::default()
        });

        let tex = render(&doc, Language::En);
        let projects = tex.find("\\section*{Projects}").unwrap();
        let education = tex.find("\\section*{Education}").unwrap();
        assert!(projects < education);
        assert!(tex.contains("\\textbf{BSc} from \\textbf{London} \\\\"));
        assert!(tex.contains("\\url{https://example.com/x}"));
        assert!(!tex.contains("\\section*{Summary}"));
    }
}

use crate::assist::{EnhanceKind, SummaryContext};
use crate::models::cv::Language;

pub fn summary_prompt(ctx: &SummaryContext, language: Language) -> String {
    let mut prompt = format!(
        "Write a compelling, professional CV summary (approx. 3-4 sentences) in {}.",
        language.name()
    );

    match &ctx.job_title {
        Some(title) => prompt.push_str(&format!(
            " The candidate's target or most recent role is \"{title}\"."
        )),
        None => prompt.push_str(" The candidate is a professional seeking opportunities."),
    }

    if !ctx.skills.is_empty() {
        prompt.push_str(&format!(" Key skills include: {}.", ctx.skills.join(", ")));
    }

    if ctx.experience_count > 0 {
        prompt.push_str(&format!(
            " The candidate has {} relevant positions on record.",
            ctx.experience_count
        ));
    } else {
        prompt.push_str(" This is an entry-level candidate with foundational skills.");
    }

    prompt.push_str(
        "\n\nGuidelines:\n\
         - Highlight professional strengths, adaptability, and value contribution based on the skills and role.\n\
         - Use active, confident language.\n\
         - Avoid generic clichés like \"hard worker\" or \"team player\".\n\
         - Do not include introductory phrases or sentences about the document.\n\
         - Use specific, quantifiable language where possible.",
    );
    prompt
}

pub fn enhance_prompt(text: &str, kind: EnhanceKind, language: Language) -> String {
    let instruction = match kind {
        EnhanceKind::Project => {
            "technical project description for a CV. Focus on the technologies used, the \
             problem solved, scope, and measurable outcomes. Start with an action verb and \
             quantify achievements where possible."
        }
        EnhanceKind::Experience | EnhanceKind::Education => {
            "CV experience bullet point. Use strong action verbs at the beginning, focus on \
             responsibilities, quantifiable achievements, and specific results. Keep an active \
             voice and use metrics where available."
        }
    };
    format!(
        "Rewrite the following {instruction} Write it in {} to be more professional, \
         impactful, and relevant while staying concise. Keep one line per bullet. \
         Only return the enhanced version without any introductory text.\n\n\
         Original text: \"{text}\"\n\nEnhanced version:",
        language.name()
    )
}

pub fn skills_prompt(role_hint: &str, language: Language) -> String {
    format!(
        "Suggest 8-12 highly relevant hard and soft skills for a \"{role_hint}\" role, \
         written in {}. Consider both technical requirements and soft skills employers \
         typically value for this position. Return ONLY a JSON array of strings. \
         Example: [\"Skill 1\", \"Skill 2\"]",
        language.name()
    )
}

/// Which trailing phrase families count as a preamble line.
#[derive(Debug, Clone, Copy)]
pub enum Preamble {
    Summary,
    Description,
}

/// Drops blank lines and model preamble ("Here's ...", "Enhanced description:",
/// ...) from generated text.
pub fn strip_intro_lines(text: &str, preamble: Preamble) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !is_intro_line(line, preamble))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn is_intro_line(line: &str, preamble: Preamble) -> bool {
    let lower = line.trim().to_lowercase();
    if ["here's", "here is", "this is"]
        .iter()
        .any(|p| lower.starts_with(p))
    {
        return true;
    }
    let pairs: &[(&str, &str)] = match preamble {
        Preamble::Summary => &[("professional", "summary"), ("cv", "summary")],
        Preamble::Description => &[("enhanced", "description"), ("revised", "description")],
    };
    pairs.iter().any(|(first, then)| {
        lower
            .find(first)
            .is_some_and(|at| lower[at + first.len()..].contains(then))
    })
}

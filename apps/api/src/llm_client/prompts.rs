// Shared prompt fragments. Each feature that calls the LLM keeps its own
// prompt builders alongside it (see `assist::prompts`).

/// System prompt for free-text CV writing.
pub const CV_WRITER_SYSTEM: &str = "You are a professional CV writer. \
    Respond with the requested text only. \
    Do NOT include introductory phrases, headings, or sentences about the document itself. \
    Do NOT use markdown formatting.";

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

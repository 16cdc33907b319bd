// Shared prompt fragments used by model backends.
// The evaluation prompt itself lives in evaluation/prompts.rs.

/// System prompt that enforces JSON-only output for backends that accept one.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

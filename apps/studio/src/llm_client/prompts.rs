// Prompt fragments shared by every service that calls the LLM.
// Service-specific prompts live in a prompts.rs next to the service.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps rewrites faithful to what the user actually wrote.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Only rephrase, restructure and tighten the text you are given. \
    Do NOT invent employers, titles, dates, metrics, technologies or achievements \
    that are not present in the input.";

// Shared prompt fragments used by every letter template.
// Template-specific text lives next to the builder in letters::prompt_builder.

/// Plain-text output rule. Letters are rendered verbatim, so markdown leaks through.
pub const PLAIN_TEXT_INSTRUCTION: &str =
    "Use plain text only - no **bold**, no ### headings, no formatting";

/// Anti-hallucination rule for structured form input.
pub const NO_INVENTION_INSTRUCTION: &str =
    "Include only the information provided - do not invent details";

/// Two-tier length banding. The model judges input density, not the builder.
pub const LENGTH_BANDING_INSTRUCTION: &str = "Adjust length based on information provided: \
    aim for 300-400 words if detailed data is given, 100-200 words for basic information";

/// Message the model must emit for requests unrelated to recommendation letters.
pub const OFF_TOPIC_FALLBACK: &str = "I'm here to help you create professional letters of \
recommendation! Please provide details about the person you want to recommend, your \
relationship with them, their achievements, and the purpose of the recommendation \
(job, scholarship, etc.).";

//! Prompt Builder: turns a `GenerationRequest` into the single user message
//! sent to the completion model.
//!
//! Pure and deterministic for a given `today`. The caller supplies the date so
//! one build embeds one consistent value.

use chrono::NaiveDate;

use crate::letters::models::{FormRequest, GenerationRequest, PromptRequest};
use crate::llm_client::prompts::{
    LENGTH_BANDING_INSTRUCTION, NO_INVENTION_INSTRUCTION, OFF_TOPIC_FALLBACK,
    PLAIN_TEXT_INSTRUCTION,
};

/// `Month D, YYYY`, e.g. "March 7, 2025".
const DATE_FORMAT: &str = "%B %-d, %Y";

const FORM_PREAMBLE: &str = "Write a professional letter of recommendation in plain text format \
(no markdown, no bold text, no headings). Use only the information provided below. Do not add \
any information that is not provided, such as phone numbers, addresses, or company details that \
aren't specified.";

/// Free-text template.
/// Replace: {date}, {plain_text}, {length_banding}, {fallback}, then {user_prompt} last.
const PROMPT_TEMPLATE: &str = r#"You are a Letter of Recommendation (LOR) writing assistant. Your task is to generate professional letters of recommendation based on user prompts.

IMPORTANT: If the user's prompt is NOT related to generating a letter of recommendation, scholarship applications, job recommendations, or academic admissions, respond with a helpful message explaining that you can assist with creating professional letters of recommendation. Do not generate content unrelated to LOR writing.

For valid LOR requests, follow these instructions:

CRITICAL INSTRUCTIONS:
1. Do NOT add any names, companies, addresses, phone numbers, emails, or specific details that are not explicitly mentioned in the user's prompt.
2. If the prompt lacks specific details (like names, relationships, achievements), create a generic template letter but do not invent specific information.
3. Use today's date: {date}
4. {plain_text}.
5. {length_banding}.
6. If the prompt is too vague, generate a sample letter with placeholder text indicating what information is needed.

User's prompt: "{user_prompt}"

If this prompt is about generating a letter of recommendation, create the letter. Otherwise, respond with: "{fallback}""#;

/// Builds the completion prompt for either request variant.
pub fn build_prompt(request: &GenerationRequest, today: NaiveDate) -> String {
    let date = format_letter_date(today);
    match request {
        GenerationRequest::Form(form) => build_form_prompt(form, &date),
        GenerationRequest::Prompt(prompt) => build_free_text_prompt(prompt, &date),
    }
}

pub fn format_letter_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn build_free_text_prompt(request: &PromptRequest, date: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{date}", date)
        .replace("{plain_text}", PLAIN_TEXT_INSTRUCTION)
        .replace("{length_banding}", LENGTH_BANDING_INSTRUCTION)
        .replace("{fallback}", OFF_TOPIC_FALLBACK)
        .replace("{user_prompt}", &request.prompt)
}

fn build_form_prompt(form: &FormRequest, date: &str) -> String {
    let mut p = PromptWriter::default();

    p.raw(FORM_PREAMBLE);
    p.blank();

    p.section("APPLICANT INFORMATION");
    p.field("Name", &form.applicant_name);
    p.field("Current Role", &form.applicant_current_role);
    p.field("Current Institution", &form.applicant_institution);
    p.blank();

    p.section("RELATIONSHIP DETAILS");
    p.field("Relationship Type", &form.relationship);
    p.optional("Capacity", &form.relationship_capacity);
    p.field("Duration", &form.duration);
    p.field("Context", &form.context_of_relationship);
    p.blank();

    p.section("TARGET POSITION/PROGRAM");
    p.field("Target Program", &form.target_program);
    p.field("Target Institution", &form.target_institution);
    p.field("Application Type", &form.application_type);
    p.blank();

    p.section("ACADEMIC/PROFESSIONAL QUALIFICATIONS");
    p.field("Field of Study", &form.field_of_study);
    p.field("Key Skills", &form.key_skills);
    p.field("Notable Achievements", &form.notable_achievements);
    p.optional("Academic Performance", &form.academic_performance);
    p.blank();

    p.section("PERSONAL & PROFESSIONAL QUALITIES");
    p.optional("Technical Skills", &form.technical_skills);
    p.optional("Soft Skills", &form.soft_skills);
    p.optional("Leadership Qualities", &form.leadership_qualities);
    p.optional("Work Ethic", &form.work_ethic);
    p.blank();

    p.section("SPECIFIC EXAMPLES");
    p.field("Key Project", &form.key_project);
    p.optional("Achievement Metrics", &form.achievement_metrics);
    p.optional("Challenge Overcome", &form.challenge_overcome);
    p.optional("Unique Contribution", &form.unique_contribution);
    p.blank();

    p.section("OVERALL ASSESSMENT");
    p.field("Comparison to Peers", &form.comparison_to_peers);
    p.optional("Overall Assessment", &form.overall_assessment);
    p.blank();

    p.section("REFERRER INFORMATION");
    p.field("Name", &form.referrer_name);
    p.field("Title", &form.referrer_title);
    p.field("Institution", &form.referrer_institution);
    p.optional("Department", &form.referrer_department);
    p.field("Email", &form.referrer_email);
    p.optional("Phone", &form.referrer_phone);
    p.blank();

    p.section("LETTER STYLE");
    p.field("Tone", &form.tone);
    p.field("Recommendation Strength", &form.recommendation_strength);
    p.field("Letter Focus", &form.letter_focus);
    p.blank();

    p.section("INSTRUCTIONS");
    let instructions = [
        "Write the letter in proper business letter format".to_string(),
        format!("Start with the date (use today's date: {date})"),
        format!(
            "Address it appropriately based on application type ({})",
            form.application_type
        ),
        NO_INVENTION_INSTRUCTION.to_string(),
        LENGTH_BANDING_INSTRUCTION.to_string(),
        "Use the referrer's information for the signature".to_string(),
        PLAIN_TEXT_INSTRUCTION.to_string(),
        "Make it sound natural and professional".to_string(),
        format!(
            "Focus on {} aspects based on the letter focus preference",
            form.letter_focus
        ),
        "Do not include contact information at the end unless a phone number is specifically \
         provided in the referrer details"
            .to_string(),
    ];
    for (i, instruction) in instructions.iter().enumerate() {
        p.raw(&format!("{}. {instruction}", i + 1));
    }
    p.blank();

    p.raw("Generate the complete letter:");
    p.finish()
}

/// Line-oriented accumulator. Optional fields that are absent or blank emit
/// nothing, not even an empty line.
#[derive(Default)]
struct PromptWriter {
    lines: Vec<String>,
}

impl PromptWriter {
    fn raw(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn section(&mut self, heading: &str) {
        self.lines.push(format!("{heading}:"));
    }

    fn field(&mut self, label: &str, value: &str) {
        self.lines.push(format!("- {label}: {value}"));
    }

    fn optional(&mut self, label: &str, value: &Option<String>) {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            self.field(label, value);
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

//! Wire types for the generation endpoint.
//!
//! The request body is `{ "type": "form" | "prompt", "data": {...} }`. The tag is
//! parsed into `RequestKind` first, then `data` is decoded into the matching
//! variant, so an unknown tag never reaches the prompt builder.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// Discriminant of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Form,
    Prompt,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Form => "form",
            RequestKind::Prompt => "prompt",
        }
    }
}

impl FromStr for RequestKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "form" => Ok(RequestKind::Form),
            "prompt" => Ok(RequestKind::Prompt),
            _ => Err(AppError::InvalidType),
        }
    }
}

/// Raw request envelope, before the discriminant is checked.
/// `type` stays a raw value; any non-string tag is an invalid type.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    #[serde(rename = "type", default)]
    pub kind: Option<Value>,
    #[serde(default)]
    pub data: Value,
}

/// A validated generation request.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Form(FormRequest),
    Prompt(PromptRequest),
}

/// Structured input collected by the letter form.
///
/// Required fields are plain `String`s and must be non-blank; optional ones are
/// `Option<String>` and only reach the prompt when non-blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRequest {
    // Applicant
    pub applicant_name: String,
    pub applicant_current_role: String,
    pub applicant_institution: String,

    // Relationship
    pub relationship: String,
    pub relationship_capacity: Option<String>,
    pub duration: String,
    pub context_of_relationship: String,

    // Target
    pub target_program: String,
    pub target_institution: String,
    pub application_type: String,

    // Qualifications
    pub field_of_study: String,
    pub key_skills: String,
    pub notable_achievements: String,
    pub academic_performance: Option<String>,

    // Qualities
    pub technical_skills: Option<String>,
    pub soft_skills: Option<String>,
    pub leadership_qualities: Option<String>,
    pub work_ethic: Option<String>,

    // Examples
    pub key_project: String,
    pub achievement_metrics: Option<String>,
    pub challenge_overcome: Option<String>,
    pub unique_contribution: Option<String>,

    // Assessment
    pub comparison_to_peers: String,
    pub overall_assessment: Option<String>,

    // Referrer
    pub referrer_name: String,
    pub referrer_title: String,
    pub referrer_institution: String,
    pub referrer_department: Option<String>,
    pub referrer_email: String,
    pub referrer_phone: Option<String>,

    // Style
    pub tone: String,
    pub recommendation_strength: String,
    pub letter_focus: String,
}

impl FormRequest {
    /// Required fields paired with their JSON names, for validation messages.
    fn required_fields(&self) -> [(&'static str, &str); 21] {
        [
            ("applicantName", self.applicant_name.as_str()),
            ("applicantCurrentRole", self.applicant_current_role.as_str()),
            ("applicantInstitution", self.applicant_institution.as_str()),
            ("relationship", self.relationship.as_str()),
            ("duration", self.duration.as_str()),
            ("contextOfRelationship", self.context_of_relationship.as_str()),
            ("targetProgram", self.target_program.as_str()),
            ("targetInstitution", self.target_institution.as_str()),
            ("applicationType", self.application_type.as_str()),
            ("fieldOfStudy", self.field_of_study.as_str()),
            ("keySkills", self.key_skills.as_str()),
            ("notableAchievements", self.notable_achievements.as_str()),
            ("keyProject", self.key_project.as_str()),
            ("comparisonToPeers", self.comparison_to_peers.as_str()),
            ("referrerName", self.referrer_name.as_str()),
            ("referrerTitle", self.referrer_title.as_str()),
            ("referrerInstitution", self.referrer_institution.as_str()),
            ("referrerEmail", self.referrer_email.as_str()),
            ("tone", self.tone.as_str()),
            ("recommendationStrength", self.recommendation_strength.as_str()),
            ("letterFocus", self.letter_focus.as_str()),
        ]
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let blank: Vec<&str> = self
            .required_fields()
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if blank.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "required fields cannot be empty: {}",
                blank.join(", ")
            )))
        }
    }
}

/// Free-text request.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

impl GenerationRequest {
    /// Decodes `data` according to the `type` tag. A missing or unknown tag is
    /// `InvalidType`; a payload that does not fit its variant is `Validation`.
    pub fn from_parts(kind: Option<&str>, data: Value) -> Result<Self, AppError> {
        let kind: RequestKind = kind.ok_or(AppError::InvalidType)?.parse()?;

        match kind {
            RequestKind::Form => {
                let form: FormRequest = serde_json::from_value(data)
                    .map_err(|e| AppError::Validation(format!("invalid form data: {e}")))?;
                form.validate()?;
                Ok(GenerationRequest::Form(form))
            }
            RequestKind::Prompt => {
                let prompt: PromptRequest = serde_json::from_value(data)
                    .map_err(|e| AppError::Validation(format!("invalid prompt data: {e}")))?;
                if prompt.prompt.trim().is_empty() {
                    return Err(AppError::Validation("prompt cannot be empty".to_string()));
                }
                Ok(GenerationRequest::Prompt(prompt))
            }
        }
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            GenerationRequest::Form(_) => RequestKind::Form,
            GenerationRequest::Prompt(_) => RequestKind::Prompt,
        }
    }

    /// Display title stored alongside the generated letter.
    pub fn title(&self) -> String {
        match self {
            GenerationRequest::Form(form) => {
                format!("LOR for {} - {}", form.applicant_name, form.target_program)
            }
            GenerationRequest::Prompt(_) => "Custom LOR".to_string(),
        }
    }
}

impl TryFrom<GenerateBody> for GenerationRequest {
    type Error = AppError;

    fn try_from(body: GenerateBody) -> Result<Self, Self::Error> {
        GenerationRequest::from_parts(body.kind.as_ref().and_then(Value::as_str), body.data)
    }
}

/// Number of whitespace-delimited, non-empty tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Rough token estimate: one token per four characters, rounded up.
/// This is an approximation, not a tokenizer count.
pub fn approximate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

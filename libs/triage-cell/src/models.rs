use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use doctor_cell::models::DoctorProfile;

/// One record of the static symptom reference dataset. Several surface
/// phrasings share one treatment entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomEntry {
    pub symptoms: Vec<String>,
    pub treatment: String,
    pub complexity: Complexity,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Basic,
    Complex,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Basic => write!(f, "basic"),
            Complexity::Complex => write!(f, "complex"),
        }
    }
}

/// Keyword classification verdict for a free-text symptom report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub complexity: Complexity,
    pub is_complex: bool,
    pub is_basic: bool,
}

/// Full triage outcome returned from the chat flow.
#[derive(Debug, Clone, Serialize)]
pub struct TriageOutcome {
    pub complexity: Complexity,
    pub message: String,
    pub doctors: Vec<DoctorProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    pub should_see_doctor: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub message: String,
    pub complexity: Complexity,
    pub should_see_doctor: bool,
    pub doctors: Vec<DoctorProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymptomSearchQuery {
    pub query: String,
}

/// Spell-correction output for a single query term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellSuggestions {
    pub has_exact_match: bool,
    pub exact_matches: Vec<String>,
    pub suggestions: Vec<String>,
    pub original_query: String,
}

/// Dataset search result, possibly reached via corrected spellings.
#[derive(Debug, Clone, Serialize)]
pub struct SymptomSearchResult {
    pub matches: Vec<SymptomEntry>,
    pub spell_suggestions: Option<Vec<String>>,
    pub has_spelling_suggestions: bool,
    pub original_query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdviceRequest {
    pub symptom_query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrescriptionRequest {
    pub symptoms: String,
    pub age: Option<String>,
    pub weight: Option<String>,
    pub allergies: Option<String>,
    pub medications: Option<String>,
}

/// Contact card for the doctor recommended alongside a prescription.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedDoctor {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub hospital: String,
    pub location: String,
}

impl From<DoctorProfile> for RecommendedDoctor {
    fn from(profile: DoctorProfile) -> Self {
        Self {
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            specialization: profile.specialization,
            hospital: profile.hospital,
            location: profile.location,
        }
    }
}

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("{0}")]
    Validation(String),

    #[error("Symptom not found")]
    SymptomNotFound,

    #[error("AI service error: {0}")]
    Advice(String),

    #[error("Database error: {0}")]
    Database(String),
}

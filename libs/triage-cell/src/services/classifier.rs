use std::sync::Arc;
use tracing::warn;

use doctor_cell::services::directory::DirectoryService;
use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::{Classification, Complexity, TriageOutcome};

/// Conditions that need professional evaluation.
const COMPLEX_SYMPTOMS: &[&str] = &[
    "cancer", "tumor", "stroke", "heart attack", "diabetes", "hypertension",
    "pneumonia", "tuberculosis", "hepatitis", "kidney failure", "liver disease",
    "asthma", "epilepsy", "depression", "anxiety disorder", "bipolar",
    "arthritis", "osteoporosis", "fibromyalgia", "lupus", "multiple sclerosis",
    "alzheimer", "dementia", "parkinson", "migraine", "seizure",
    "blood clot", "aneurysm", "appendicitis", "gallstones", "kidney stones",
    "ulcer", "crohn", "colitis", "thyroid", "adrenal", "pituitary",
    "autoimmune", "chronic fatigue", "fibrosis", "cirrhosis", "jaundice",
    "anemia", "leukemia", "lymphoma", "sarcoma", "melanoma",
    "pregnancy complications", "miscarriage", "ectopic pregnancy",
    "mental health crisis", "suicidal thoughts", "panic attack",
    "severe pain", "unexplained weight loss", "unexplained weight gain",
    "chronic cough", "blood in urine", "blood in stool", "chest pain",
    "severe headache", "vision loss", "hearing loss", "paralysis",
    "numbness", "tingling", "memory loss", "confusion", "delirium",
];

/// Complaints that usually respond to self-care.
const BASIC_SYMPTOMS: &[&str] = &[
    "fever", "headache", "cold", "cough", "sore throat", "stomach pain",
    "diarrhea", "constipation", "vomiting", "nausea", "dizziness",
    "fatigue", "tiredness", "weakness", "insomnia", "stress",
    "minor cuts", "bruises", "sunburn", "allergies", "runny nose",
    "sneezing", "itchy eyes", "dry skin", "acne", "dandruff",
    "muscle ache", "back pain", "neck pain", "joint pain",
    "indigestion", "heartburn", "gas", "bloating", "hiccups",
    "dehydration", "hunger", "thirst", "sleepiness", "restlessness",
];

/// Keyword to specialization, evaluated in order. The first containment
/// match wins, so broader keywords deliberately sit after narrower ones.
const SPECIALIZATION_MAP: &[(&str, &str)] = &[
    ("cancer", "Oncologist"),
    ("tumor", "Oncologist"),
    ("heart", "Cardiologist"),
    ("stroke", "Neurologist"),
    ("diabetes", "Endocrinologist"),
    ("hypertension", "Cardiologist"),
    ("lung", "Pulmonologist"),
    ("pneumonia", "Pulmonologist"),
    ("tuberculosis", "Pulmonologist"),
    ("liver", "Hepatologist"),
    ("kidney", "Nephrologist"),
    ("asthma", "Pulmonologist"),
    ("epilepsy", "Neurologist"),
    ("depression", "Psychiatrist"),
    ("anxiety", "Psychiatrist"),
    ("mental health", "Psychiatrist"),
    ("arthritis", "Rheumatologist"),
    ("bone", "Orthopedist"),
    ("joint", "Orthopedist"),
    ("skin", "Dermatologist"),
    ("eye", "Ophthalmologist"),
    ("ear", "ENT Specialist"),
    ("throat", "ENT Specialist"),
    ("nose", "ENT Specialist"),
    ("stomach", "Gastroenterologist"),
    ("digestive", "Gastroenterologist"),
    ("thyroid", "Endocrinologist"),
    ("hormone", "Endocrinologist"),
    ("blood", "Hematologist"),
    ("immune", "Immunologist"),
    ("pregnancy", "Gynecologist"),
    ("women", "Gynecologist"),
    ("men", "Urologist"),
    ("child", "Pediatrician"),
    ("baby", "Pediatrician"),
];

const DEFAULT_SPECIALIZATION: &str = "General Practitioner";

const COMPLEX_MESSAGE_PREFIX: &str = "Based on your symptoms, I recommend consulting with a";
const BASIC_MESSAGE: &str = "This appears to be a common symptom that can often be managed with self-care. However, if symptoms persist or worsen, please consult a healthcare provider.";
const FALLBACK_MESSAGE: &str = "I understand you have health concerns. For the best care, I recommend consulting with a healthcare provider.";

/// Keyword-based symptom classifier. The word lists are injected at
/// construction so tests can run against small fixtures.
pub struct SymptomClassifier {
    complex: Vec<String>,
    basic: Vec<String>,
    specializations: Vec<(String, String)>,
}

impl Default for SymptomClassifier {
    fn default() -> Self {
        Self::new(
            COMPLEX_SYMPTOMS.iter().map(|s| s.to_string()).collect(),
            BASIC_SYMPTOMS.iter().map(|s| s.to_string()).collect(),
            SPECIALIZATION_MAP
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl SymptomClassifier {
    pub fn new(
        complex: Vec<String>,
        basic: Vec<String>,
        specializations: Vec<(String, String)>,
    ) -> Self {
        Self {
            complex,
            basic,
            specializations,
        }
    }

    /// Complex keywords take precedence over basic ones; text matching
    /// neither list classifies as basic.
    pub fn classify(&self, text: &str) -> Classification {
        let text = text.to_lowercase();

        let is_complex = self
            .complex
            .iter()
            .any(|keyword| text.contains(&keyword.to_lowercase()));
        let is_basic = self
            .basic
            .iter()
            .any(|keyword| text.contains(&keyword.to_lowercase()));

        let complexity = if is_complex {
            Complexity::Complex
        } else {
            Complexity::Basic
        };

        Classification {
            complexity,
            is_complex,
            is_basic,
        }
    }

    /// First containment match in table order wins.
    pub fn specialization_for(&self, text: &str) -> String {
        let text = text.to_lowercase();

        for (keyword, specialization) in &self.specializations {
            if text.contains(&keyword.to_lowercase()) {
                return specialization.clone();
            }
        }

        DEFAULT_SPECIALIZATION.to_string()
    }
}

/// Runs the full triage flow: classify, pick a specialization, and pull
/// up to three matching doctors from the directory.
pub struct TriageService {
    classifier: SymptomClassifier,
    directory: DirectoryService,
}

impl TriageService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            classifier: SymptomClassifier::default(),
            directory: DirectoryService::new(config),
        }
    }

    pub fn with_store(store: Arc<StoreClient>) -> Self {
        Self {
            classifier: SymptomClassifier::default(),
            directory: DirectoryService::with_store(store),
        }
    }

    pub fn classifier(&self) -> &SymptomClassifier {
        &self.classifier
    }

    /// Never fails: any lookup error degrades to a basic-complexity
    /// response that still points at professional care.
    pub async fn process(&self, text: &str) -> TriageOutcome {
        let classification = self.classifier.classify(text);

        if classification.complexity == Complexity::Complex {
            let specialization = self.classifier.specialization_for(text);

            let doctors = match self
                .directory
                .find_by_specialization(&specialization, 3)
                .await
            {
                Ok(doctors) => doctors
                    .into_iter()
                    .map(doctor_cell::models::DoctorProfile::from)
                    .collect(),
                Err(e) => {
                    warn!("Doctor lookup failed during triage: {}", e);
                    return TriageOutcome {
                        complexity: Complexity::Basic,
                        message: FALLBACK_MESSAGE.to_string(),
                        doctors: Vec::new(),
                        specialization: None,
                        should_see_doctor: true,
                    };
                }
            };

            TriageOutcome {
                complexity: Complexity::Complex,
                message: format!(
                    "{} {}. This appears to be a complex medical condition that requires professional evaluation.",
                    COMPLEX_MESSAGE_PREFIX, specialization
                ),
                doctors,
                specialization: Some(specialization),
                should_see_doctor: true,
            }
        } else {
            TriageOutcome {
                complexity: Complexity::Basic,
                message: BASIC_MESSAGE.to_string(),
                doctors: Vec::new(),
                specialization: None,
                should_see_doctor: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complex_keyword_classifies_complex() {
        let classifier = SymptomClassifier::default();
        let result = classifier.classify("I think I have diabetes");
        assert_eq!(result.complexity, Complexity::Complex);
        assert!(result.is_complex);
    }

    #[test]
    fn complex_takes_precedence_over_basic() {
        let classifier = SymptomClassifier::default();
        let result = classifier.classify("I have a headache and cancer");
        assert_eq!(result.complexity, Complexity::Complex);
        assert!(result.is_complex);
        assert!(result.is_basic);
    }

    #[test]
    fn unlisted_text_defaults_to_basic() {
        let classifier = SymptomClassifier::default();
        let result = classifier.classify("I feel weird");
        assert_eq!(result.complexity, Complexity::Basic);
        assert!(!result.is_complex);
        assert!(!result.is_basic);
    }

    #[test]
    fn basic_keyword_classifies_basic() {
        let classifier = SymptomClassifier::default();
        let result = classifier.classify("I caught a cold yesterday");
        assert_eq!(result.complexity, Complexity::Basic);
        assert!(result.is_basic);
    }

    #[test]
    fn classification_is_case_insensitive() {
        let classifier = SymptomClassifier::default();
        assert_eq!(
            classifier.classify("CHEST PAIN").complexity,
            Complexity::Complex
        );
    }

    #[test]
    fn cancer_maps_to_oncologist() {
        let classifier = SymptomClassifier::default();
        assert_eq!(
            classifier.specialization_for("worried this lump is cancer"),
            "Oncologist"
        );
    }

    #[test]
    fn unmapped_complex_text_defaults_to_general_practitioner() {
        let classifier = SymptomClassifier::default();
        assert_eq!(
            classifier.specialization_for("sudden paralysis episode"),
            "General Practitioner"
        );
    }

    #[test]
    fn first_table_entry_wins_on_multiple_matches() {
        // "cancer" precedes "blood" in the table.
        let classifier = SymptomClassifier::default();
        assert_eq!(
            classifier.specialization_for("blood cancer runs in the family"),
            "Oncologist"
        );
    }

    #[test]
    fn injected_fixture_lists_are_honored() {
        let classifier = SymptomClassifier::new(
            vec!["glitch".to_string()],
            vec!["hiccup".to_string()],
            vec![("glitch".to_string(), "Specialist".to_string())],
        );
        assert_eq!(classifier.classify("a glitch").complexity, Complexity::Complex);
        assert_eq!(classifier.classify("a hiccup").complexity, Complexity::Basic);
        assert_eq!(classifier.specialization_for("a glitch"), "Specialist");
        assert_eq!(classifier.specialization_for("a hiccup"), "General Practitioner");
    }

    #[test]
    fn mixed_case_table_keywords_still_match() {
        let classifier = SymptomClassifier::new(
            vec!["Glitch".to_string()],
            Vec::new(),
            vec![("Glitch".to_string(), "Specialist".to_string())],
        );
        assert_eq!(classifier.classify("a glitch").complexity, Complexity::Complex);
        assert_eq!(classifier.specialization_for("a glitch"), "Specialist");
    }
}

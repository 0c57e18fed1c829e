use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

use doctor_cell::models::DoctorProfile;
use doctor_cell::services::directory::DirectoryService;
use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::{Complexity, PrescriptionRequest, RecommendedDoctor, TriageError};
use crate::services::advice::GeminiAdviceProvider;
use crate::services::classifier::TriageService;

/// Search terms tried in order when recommending a doctor for a basic
/// complaint.
const GENERALIST_TERMS: &[&str] = &["general", "family", "primary"];

#[derive(Debug)]
pub struct PrescriptionOutcome {
    pub prescription: String,
    pub doctor: Option<RecommendedDoctor>,
    pub complexity: Complexity,
}

pub struct PrescriptionService {
    triage: TriageService,
    directory: DirectoryService,
    gemini: Option<GeminiAdviceProvider>,
}

impl PrescriptionService {
    pub fn new(config: &AppConfig) -> Self {
        let gemini = if config.is_advice_configured() {
            Some(GeminiAdviceProvider::new(config))
        } else {
            None
        };
        Self {
            triage: TriageService::new(config),
            directory: DirectoryService::new(config),
            gemini,
        }
    }

    pub fn with_store(store: Arc<StoreClient>, gemini: Option<GeminiAdviceProvider>) -> Self {
        Self {
            triage: TriageService::with_store(store.clone()),
            directory: DirectoryService::with_store(store),
            gemini,
        }
    }

    pub async fn generate(
        &self,
        request: PrescriptionRequest,
    ) -> Result<PrescriptionOutcome, TriageError> {
        let symptoms = request.symptoms.trim().to_string();
        if symptoms.is_empty() {
            return Err(TriageError::Validation(
                "Symptoms are required".to_string(),
            ));
        }

        let triage = self.triage.process(&symptoms).await;

        let doctor = if triage.complexity == Complexity::Complex && !triage.doctors.is_empty() {
            triage.doctors.first().cloned().map(RecommendedDoctor::from)
        } else {
            self.find_generalist().await.map(RecommendedDoctor::from)
        };

        let specialization = triage
            .specialization
            .clone()
            .unwrap_or_else(|| "General Practice".to_string());

        let prompt = prescription_prompt(
            &symptoms,
            request.age.as_deref().unwrap_or("Not specified"),
            request.weight.as_deref().unwrap_or("Not specified"),
            request.allergies.as_deref().unwrap_or("None reported"),
            request.medications.as_deref().unwrap_or("None reported"),
            triage.complexity,
            &specialization,
        );

        let prescription = match &self.gemini {
            Some(gemini) => match gemini.generate(&prompt, 1024).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Prescription generation failed, using template: {}", e);
                    fallback_prescription(&symptoms)
                }
            },
            None => fallback_prescription(&symptoms),
        };

        Ok(PrescriptionOutcome {
            prescription,
            doctor,
            complexity: triage.complexity,
        })
    }

    async fn find_generalist(&self) -> Option<DoctorProfile> {
        for term in GENERALIST_TERMS {
            match self.directory.find_by_specialization(term, 1).await {
                Ok(doctors) => {
                    if let Some(doctor) = doctors.into_iter().next() {
                        return Some(DoctorProfile::from(doctor));
                    }
                }
                Err(e) => {
                    warn!("Generalist lookup failed for {:?}: {}", term, e);
                    return None;
                }
            }
        }
        None
    }
}

fn prescription_prompt(
    symptoms: &str,
    age: &str,
    weight: &str,
    allergies: &str,
    medications: &str,
    complexity: Complexity,
    specialization: &str,
) -> String {
    let current_date = Utc::now().format("%Y-%m-%d");
    format!(
        r#"You are a licensed medical professional generating a structured prescription.

PATIENT INFORMATION:
- Symptoms: {symptoms}
- Age: {age}
- Weight: {weight}
- Known Allergies: {allergies}
- Current Medications: {medications}
- Condition Complexity: {complexity}
- Recommended Specialization: {specialization}

REQUIRED OUTPUT FORMAT:
Generate a medical prescription in EXACTLY this format:

PRESCRIPTION RECOMMENDATION
Generated: {current_date}

DIAGNOSIS: [Provide a professional medical assessment based on the symptoms]

MEDICATIONS:
- [Drug Name]: [Dosage & Duration]
  Instructions: [Specific instructions for taking the medication]

RECOMMENDATIONS:
- [Lifestyle recommendation 1]
- [Lifestyle recommendation 2]
- [Additional care instructions]

WARNINGS:
- [Important warning or red flag 1]
- [Important warning or red flag 2]

FOLLOW-UP:
- [When to revisit or consult doctor]

DISCLAIMER:
This is an AI-generated recommendation for informational purposes only.

IMPORTANT GUIDELINES:
1. Be clinically accurate and evidence-based
2. Consider patient's age, weight, allergies, and current medications
3. For complex conditions, emphasize the need for specialist consultation
4. Include appropriate warnings and red flags
5. Provide practical, actionable recommendations
6. Use professional medical terminology
7. Keep medications appropriate for the condition described
8. Always include the disclaimer

Generate the prescription now:"#
    )
}

/// Canned template returned when the AI service is unavailable.
fn fallback_prescription(symptoms: &str) -> String {
    let current_date = Utc::now().format("%Y-%m-%d");
    format!(
        r#"PRESCRIPTION RECOMMENDATION
Generated: {current_date}

DIAGNOSIS: Based on the symptoms described ({symptoms}), this appears to be a condition requiring medical evaluation.

MEDICATIONS:
- Symptom Management: As directed by healthcare provider
  Instructions: Follow dosage instructions carefully

RECOMMENDATIONS:
- Rest and maintain adequate hydration
- Monitor symptoms closely
- Avoid self-medication without professional guidance

WARNINGS:
- Seek immediate medical attention if symptoms worsen
- Consult healthcare provider for proper diagnosis and treatment

FOLLOW-UP:
- Schedule appointment with healthcare provider within 24-48 hours

DISCLAIMER:
This is an AI-generated recommendation for informational purposes only."#
    )
}

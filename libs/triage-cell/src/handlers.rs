use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{
    AdviceRequest, ChatRequest, ChatResponse, Complexity, PrescriptionRequest, SymptomSearchQuery,
    TriageError,
};
use crate::services::advice::{advice_provider, is_non_medical, OUT_OF_SCOPE_MESSAGE};
use crate::services::classifier::TriageService;
use crate::services::dataset::SymptomDataset;
use crate::services::prescription::PrescriptionService;
use crate::services::spell::{search_with_spell_check, SpellChecker, MAX_SUGGESTIONS, SIMILARITY_THRESHOLD};

impl From<TriageError> for AppError {
    fn from(err: TriageError) -> Self {
        match err {
            TriageError::Validation(msg) => AppError::BadRequest(msg),
            TriageError::SymptomNotFound => AppError::NotFound("Symptom not found".to_string()),
            TriageError::Advice(msg) => AppError::ExternalService(msg),
            TriageError::Database(msg) => AppError::Database(msg),
        }
    }
}

/// Symptom-triage chat. AI advice is attempted first; any failure there
/// falls back to the classifier's canned message so the chat always
/// answers.
#[axum::debug_handler]
pub async fn chat(
    State(state): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message is required".to_string()));
    }

    let advice = match advice_provider(&state).advise(&request.message).await {
        Ok(advice) => advice,
        Err(e) => {
            warn!("Advice service unavailable, using fallback: {}", e);
            None
        }
    };

    let triage = TriageService::new(&state).process(&request.message).await;

    let message = match advice {
        Some(mut advice_text) => {
            if triage.complexity == Complexity::Complex && !triage.doctors.is_empty() {
                if let Some(specialization) = &triage.specialization {
                    advice_text.push_str(&format!(
                        "\n\n**Doctor Recommendation:** Based on your symptoms, I recommend consulting with a {}. Here are some available doctors:",
                        specialization
                    ));
                }
            }
            advice_text
        }
        None => triage.message.clone(),
    };

    Ok(Json(ChatResponse {
        success: true,
        message,
        complexity: triage.complexity,
        should_see_doctor: triage.should_see_doctor,
        doctors: triage.doctors,
        specialization: triage.specialization,
        timestamp: Utc::now(),
    }))
}

#[axum::debug_handler]
pub async fn list_symptoms(State(_state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let dataset = SymptomDataset::bundled();
    let entries = dataset.entries().to_vec();
    let count = entries.len();

    Ok(Json(json!({
        "success": true,
        "symptoms": entries,
        "count": count
    })))
}

#[axum::debug_handler]
pub async fn search_symptoms(
    State(_state): State<Arc<AppConfig>>,
    Query(query): Query<SymptomSearchQuery>,
) -> Result<Json<Value>, AppError> {
    if query.query.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Query parameter is required".to_string(),
        ));
    }

    let dataset = SymptomDataset::bundled();
    let result = search_with_spell_check(&dataset, &query.query);

    Ok(Json(json!({
        "success": true,
        "matches": result.matches,
        "spell_suggestions": result.spell_suggestions,
        "has_spelling_suggestions": result.has_spelling_suggestions,
        "original_query": result.original_query
    })))
}

#[axum::debug_handler]
pub async fn symptom_suggestions(
    State(_state): State<Arc<AppConfig>>,
    Query(query): Query<SymptomSearchQuery>,
) -> Result<Json<Value>, AppError> {
    if query.query.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Query parameter is required".to_string(),
        ));
    }

    let dataset = SymptomDataset::bundled();
    let checker = SpellChecker::new(&dataset);
    let suggestions = checker.find_suggestions(&query.query, SIMILARITY_THRESHOLD, MAX_SUGGESTIONS);

    Ok(Json(json!({
        "success": true,
        "has_exact_match": suggestions.has_exact_match,
        "exact_matches": suggestions.exact_matches,
        "suggestions": suggestions.suggestions,
        "original_query": suggestions.original_query
    })))
}

#[axum::debug_handler]
pub async fn symptom_advice(
    State(_state): State<Arc<AppConfig>>,
    Path(symptom): Path<String>,
) -> Result<Json<Value>, AppError> {
    let dataset = SymptomDataset::bundled();
    let entry = dataset
        .find(&symptom)
        .ok_or(TriageError::SymptomNotFound)?
        .clone();

    Ok(Json(json!({
        "success": true,
        "symptom": entry
    })))
}

/// AI-written advice for a free-text query, with a scope guard for
/// clearly non-medical prompts.
#[axum::debug_handler]
pub async fn generate_advice(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<AdviceRequest>,
) -> Result<Json<Value>, AppError> {
    if request.symptom_query.trim().is_empty() {
        return Err(AppError::BadRequest(
            "symptom_query is required".to_string(),
        ));
    }

    if is_non_medical(&request.symptom_query) {
        return Ok(Json(json!({
            "success": true,
            "message": OUT_OF_SCOPE_MESSAGE
        })));
    }

    let advice = advice_provider(&state)
        .advise(&request.symptom_query)
        .await?
        .ok_or_else(|| {
            AppError::ExternalService("AI advice service is not configured".to_string())
        })?;

    Ok(Json(json!({
        "success": true,
        "message": advice
    })))
}

#[axum::debug_handler]
pub async fn generate_prescription(
    State(state): State<Arc<AppConfig>>,
    Extension(_user): Extension<AuthUser>,
    Json(request): Json<PrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    let outcome = PrescriptionService::new(&state).generate(request).await?;

    Ok(Json(json!({
        "success": true,
        "prescription": outcome.prescription,
        "doctor": outcome.doctor,
        "complexity": outcome.complexity,
        "timestamp": Utc::now()
    })))
}

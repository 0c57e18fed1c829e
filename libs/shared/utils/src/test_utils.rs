use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};

use crate::jwt::issue_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub store_url: String,
    pub store_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            store_url: "http://localhost:54321".to_string(),
            store_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_store_url(store_url: &str) -> Self {
        Self {
            store_url: store_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            store_url: self.store_url.clone(),
            store_api_key: self.store_api_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            gemini_api_key: String::new(),
            gemini_base_url: String::new(),
            email_api_url: String::new(),
            email_api_key: String::new(),
            email_from: "HelthBot <no-reply@helthbot.example>".to_string(),
            admin_email: "admin@helthbot.example".to_string(),
            admin_password: "admin-test-password".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", Role::Patient)
    }
}

impl TestUser {
    pub fn new(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Test User".to_string(),
            email: email.to_string(),
            role,
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, Role::Doctor)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, Role::Patient)
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, Role::Admin)
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            role: self.role,
            created_at: Some(chrono::Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str) -> String {
        issue_token(&user.id, &user.name, &user.email, user.role, secret)
            .expect("test token should be issued")
    }
}

/// Canned store rows for wiremock-backed tests.
pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn doctor_row(id: &str, specialization: &str) -> Value {
        json!({
            "id": id,
            "name": "Dr. Sarah Johnson",
            "email": "sarah.johnson@hospital.example",
            "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$dGVzdHNhbHQ$AAAA",
            "specialization": specialization,
            "experience": "15 years",
            "hospital": "City General Hospital",
            "phone": "5550101234",
            "location": "New York, NY",
            "is_email_verified": true,
            "status": "approved",
            "otp_code": null,
            "otp_expires_at": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn user_row(id: &str, email: &str) -> Value {
        json!({
            "id": id,
            "name": "Test Patient",
            "email": email,
            "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$dGVzdHNhbHQ$AAAA",
            "role": "patient",
            "is_email_verified": true,
            "otp_code": null,
            "otp_expires_at": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn appointment_row(id: &str, doctor_id: &str, time_slot: &str, status: &str) -> Value {
        json!({
            "id": id,
            "patient_id": null,
            "patient_name": "Test Patient",
            "patient_email": "patient@example.com",
            "patient_phone": "5550000000",
            "patient_age": 30,
            "patient_gender": "Female",
            "doctor_id": doctor_id,
            "doctor_name": "Dr. Sarah Johnson",
            "doctor_email": "sarah.johnson@hospital.example",
            "doctor_specialization": "Oncologist",
            "doctor_hospital": "City General Hospital",
            "appointment_date": "2024-06-01T00:00:00Z",
            "appointment_time": time_slot,
            "reason": "Checkup",
            "symptoms": "",
            "notes": "",
            "status": status,
            "is_urgent": false,
            "prescription": "",
            "diagnosis": "",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }
}

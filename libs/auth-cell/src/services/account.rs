use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use doctor_cell::models::Doctor;
use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_models::auth::Role;
use shared_utils::email::{generate_otp, EmailService};
use shared_utils::jwt::issue_token;

use crate::models::{
    AccountSummary, AuthError, LoginRequest, LoginResponse, ResendOtpRequest, SignupRequest,
    StoredUser, VerifyOtpRequest,
};

const OTP_VALIDITY_MINUTES: i64 = 10;

/// Registration, verification and login for patients, doctors and the
/// env-configured admin account.
pub struct AccountService {
    store: Arc<StoreClient>,
    email: EmailService,
    jwt_secret: String,
    admin_email: String,
    admin_password: String,
}

/// A registered account in either table, unified for the OTP flows.
enum Account {
    Patient(StoredUser),
    Doctor(Doctor),
}

impl Account {
    fn table(&self) -> &'static str {
        match self {
            Account::Patient(_) => "users",
            Account::Doctor(_) => "doctors",
        }
    }

    fn id(&self) -> Uuid {
        match self {
            Account::Patient(u) => u.id,
            Account::Doctor(d) => d.id,
        }
    }

    fn name(&self) -> &str {
        match self {
            Account::Patient(u) => &u.name,
            Account::Doctor(d) => &d.name,
        }
    }

    fn is_email_verified(&self) -> bool {
        match self {
            Account::Patient(u) => u.is_email_verified,
            Account::Doctor(d) => d.is_email_verified,
        }
    }

    fn otp(&self) -> (Option<&str>, Option<DateTime<Utc>>) {
        match self {
            Account::Patient(u) => (u.otp_code.as_deref(), u.otp_expires_at),
            Account::Doctor(d) => (d.otp_code.as_deref(), d.otp_expires_at),
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let email_regex = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    email_regex.is_match(email) && email.len() <= 254
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Database(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(StoreClient::new(config)),
            email: EmailService::new(config),
            jwt_secret: config.jwt_secret.clone(),
            admin_email: config.admin_email.clone(),
            admin_password: config.admin_password.clone(),
        }
    }

    async fn find_account(&self, email: &str, role: Role) -> Result<Option<Account>, AuthError> {
        let filter = format!("email=eq.{}", urlencoding::encode(email));

        match role {
            Role::Doctor => {
                let doctors: Vec<Doctor> = self
                    .store
                    .select("doctors", &[filter], None, Some(1))
                    .await
                    .map_err(|e| AuthError::Database(e.to_string()))?;
                Ok(doctors.into_iter().next().map(Account::Doctor))
            }
            _ => {
                let users: Vec<StoredUser> = self
                    .store
                    .select("users", &[filter], None, Some(1))
                    .await
                    .map_err(|e| AuthError::Database(e.to_string()))?;
                Ok(users.into_iter().next().map(Account::Patient))
            }
        }
    }

    async fn email_taken(&self, email: &str) -> Result<bool, AuthError> {
        let as_patient = self.find_account(email, Role::Patient).await?;
        let as_doctor = self.find_account(email, Role::Doctor).await?;
        Ok(as_patient.is_some() || as_doctor.is_some())
    }

    /// Register a patient or doctor. The account starts unverified; an OTP
    /// is emailed and the record is rolled back if delivery fails.
    pub async fn signup(&self, request: SignupRequest) -> Result<(String, Role), AuthError> {
        if request.role == Role::Admin {
            return Err(AuthError::Validation(
                "Invalid role. Must be patient or doctor.".to_string(),
            ));
        }
        if request.name.trim().is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }
        if !is_valid_email(&request.email) {
            return Err(AuthError::Validation(
                "Please provide a valid email address".to_string(),
            ));
        }
        if request.password.len() < 6 {
            return Err(AuthError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        if self.email_taken(&request.email).await? {
            return Err(AuthError::AlreadyRegistered);
        }

        let password_hash = hash_password(&request.password)?;
        let otp = generate_otp();
        let otp_expires_at = Utc::now() + Duration::minutes(OTP_VALIDITY_MINUTES);

        let (table, account_id) = match request.role {
            Role::Doctor => {
                let specialization = request.specialization.as_deref().unwrap_or("").trim().to_string();
                let experience = request.experience.as_deref().unwrap_or("").trim().to_string();
                let hospital = request.hospital.as_deref().unwrap_or("").trim().to_string();
                let phone = request.phone.as_deref().unwrap_or("").trim().to_string();
                let location = request.location.as_deref().unwrap_or("").trim().to_string();

                if specialization.is_empty()
                    || experience.is_empty()
                    || hospital.is_empty()
                    || phone.is_empty()
                    || location.is_empty()
                {
                    return Err(AuthError::Validation(
                        "Please provide all required doctor information: specialization, experience, hospital, phone, and location."
                            .to_string(),
                    ));
                }
                if !phone.chars().all(|c| c.is_ascii_digit()) || phone.len() != 10 {
                    return Err(AuthError::Validation("Phone must be 10 digits".to_string()));
                }

                let doctor: Doctor = self
                    .store
                    .insert(
                        "doctors",
                        json!({
                            "name": &request.name,
                            "email": &request.email,
                            "password_hash": password_hash,
                            "specialization": specialization,
                            "experience": experience,
                            "hospital": hospital,
                            "phone": phone,
                            "location": location,
                            "is_email_verified": false,
                            "status": "pending",
                            "otp_code": &otp,
                            "otp_expires_at": otp_expires_at,
                        }),
                    )
                    .await
                    .map_err(|e| AuthError::Database(e.to_string()))?;

                ("doctors", doctor.id)
            }
            _ => {
                let user: StoredUser = self
                    .store
                    .insert(
                        "users",
                        json!({
                            "name": &request.name,
                            "email": &request.email,
                            "password_hash": password_hash,
                            "role": "patient",
                            "is_email_verified": false,
                            "otp_code": &otp,
                            "otp_expires_at": otp_expires_at,
                        }),
                    )
                    .await
                    .map_err(|e| AuthError::Database(e.to_string()))?;

                ("users", user.id)
            }
        };

        if let Err(e) = self
            .email
            .send_otp_email(&request.email, &otp, &request.name)
            .await
        {
            error!("Failed to send OTP email: {}", e);

            // Roll the registration back so the email can be reused.
            if let Err(del_err) = self
                .store
                .delete(table, &[format!("id=eq.{}", account_id)])
                .await
            {
                error!("Failed to roll back registration: {}", del_err);
            }

            return Err(AuthError::EmailDelivery);
        }

        info!("Registered new {} account for {}", request.role, request.email);
        Ok((request.email, request.role))
    }

    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> Result<(), AuthError> {
        let account = self
            .find_account(&request.email, request.role)
            .await?
            .ok_or(AuthError::NotFound)?;

        if account.is_email_verified() {
            return Err(AuthError::Validation("Email is already verified.".to_string()));
        }

        let (code, expires_at) = account.otp();
        let code = code.ok_or_else(|| {
            AuthError::Validation("No OTP found. Please request a new one.".to_string())
        })?;

        if expires_at.map(|at| at < Utc::now()).unwrap_or(true) {
            return Err(AuthError::Validation(
                "OTP has expired. Please request a new one.".to_string(),
            ));
        }

        if code != request.otp {
            return Err(AuthError::Validation("Invalid OTP. Please try again.".to_string()));
        }

        let _: Vec<serde_json::Value> = self
            .store
            .update(
                account.table(),
                &[format!("id=eq.{}", account.id())],
                json!({
                    "is_email_verified": true,
                    "otp_code": null,
                    "otp_expires_at": null,
                    "updated_at": Utc::now(),
                }),
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        info!("Email verified for {}", request.email);
        Ok(())
    }

    pub async fn resend_otp(&self, request: ResendOtpRequest) -> Result<(), AuthError> {
        let account = self
            .find_account(&request.email, request.role)
            .await?
            .ok_or(AuthError::NotFound)?;

        if account.is_email_verified() {
            return Err(AuthError::Validation("Email is already verified.".to_string()));
        }

        let otp = generate_otp();
        let otp_expires_at = Utc::now() + Duration::minutes(OTP_VALIDITY_MINUTES);

        let _: Vec<serde_json::Value> = self
            .store
            .update(
                account.table(),
                &[format!("id=eq.{}", account.id())],
                json!({
                    "otp_code": &otp,
                    "otp_expires_at": otp_expires_at,
                    "updated_at": Utc::now(),
                }),
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        self.email
            .send_otp_email(&request.email, &otp, account.name())
            .await
            .map_err(|e| {
                error!("Failed to resend OTP email: {}", e);
                AuthError::EmailDelivery
            })?;

        Ok(())
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        // Admin login with env-configured credentials, no OTP flow.
        if request.role == Role::Admin {
            if self.admin_email.is_empty() {
                warn!("Admin login attempted but no admin account is configured");
                return Err(AuthError::InvalidCredentials);
            }
            if request.email != self.admin_email || request.password != self.admin_password {
                return Err(AuthError::InvalidCredentials);
            }

            let token = issue_token("admin", "Admin", &self.admin_email, Role::Admin, &self.jwt_secret)
                .map_err(AuthError::Database)?;

            return Ok(LoginResponse {
                success: true,
                message: "Admin login successful.".to_string(),
                user: AccountSummary {
                    id: "admin".to_string(),
                    name: "Admin".to_string(),
                    email: self.admin_email.clone(),
                    role: Role::Admin,
                    is_email_verified: true,
                },
                token,
            });
        }

        let account = self
            .find_account(&request.email, request.role)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.is_email_verified() {
            return Err(AuthError::EmailNotVerified);
        }

        let (name, email, role, password_hash) = match &account {
            Account::Doctor(doctor) => {
                if doctor.status != doctor_cell::models::DoctorStatus::Approved {
                    return Err(AuthError::PendingApproval);
                }
                (
                    doctor.name.clone(),
                    doctor.email.clone(),
                    Role::Doctor,
                    doctor.password_hash.clone(),
                )
            }
            Account::Patient(user) => (
                user.name.clone(),
                user.email.clone(),
                Role::Patient,
                user.password_hash.clone(),
            ),
        };

        if !verify_password(&request.password, &password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let id = account.id().to_string();
        let token = issue_token(&id, &name, &email, role, &self.jwt_secret)
            .map_err(AuthError::Database)?;

        info!("Login successful for {} ({})", email, role);

        Ok(LoginResponse {
            success: true,
            message: "Login successful.".to_string(),
            user: AccountSummary {
                id,
                name,
                email,
                role,
                is_email_verified: true,
            },
            token,
        })
    }
}

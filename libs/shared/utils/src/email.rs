use anyhow::{anyhow, Result};
use rand::Rng;
use reqwest::{header, Client};
use serde_json::json;
use tracing::{debug, error, info};

use shared_config::AppConfig;

/// Client for the transactional email HTTP API. Delivery failures are
/// reported as errors; callers decide whether they are fatal (OTP delivery)
/// or best-effort (status notifications).
pub struct EmailService {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

/// Generate a 6-digit one-time passcode.
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

impl EmailService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.email_api_url.clone(),
            api_key: config.email_api_key.clone(),
            from: config.email_from.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty() && !self.api_key.is_empty()
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        if !self.is_configured() {
            return Err(anyhow!("Email service is not configured"));
        }

        debug!("Sending email to {} with subject {:?}", to, subject);

        let body = json!({
            "from": self.from,
            "to": [to],
            "subject": subject,
            "html": html,
        });

        let response = self
            .client
            .post(&self.api_url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Email API error ({}): {}", status, error_text);
            return Err(anyhow!("Email API error ({}): {}", status, error_text));
        }

        info!("Email sent to {}", to);
        Ok(())
    }

    pub async fn send_otp_email(&self, to: &str, otp: &str, user_name: &str) -> Result<()> {
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: auto; padding: 20px;">
  <h1 style="color: #667eea;">HelthBot</h1>
  <h2>Hello {user_name},</h2>
  <p>Use the OTP below to verify your email address:</p>
  <div style="padding: 15px; border: 2px solid #667eea; border-radius: 8px; text-align: center; width: fit-content;">
    <h3 style="color: #667eea; font-size: 32px; margin: 0;">{otp}</h3>
  </div>
  <p>This OTP is valid for 10 minutes.</p>
</div>"#
        );

        self.send(to, "Email Verification - HelthBot", &html).await
    }

    pub async fn send_doctor_approval_email(&self, to: &str, doctor_name: &str) -> Result<()> {
        let html = format!(
            "<p>Dear {doctor_name},</p>\
             <p>Your HelthBot account has been approved by the administrator. \
             You can now log in and start receiving appointment requests.</p>"
        );

        self.send(to, "Account Approved - HelthBot", &html).await
    }

    pub async fn send_doctor_rejection_email(
        &self,
        to: &str,
        doctor_name: &str,
        reason: Option<&str>,
    ) -> Result<()> {
        let reason_line = reason
            .map(|r| format!("<p>Reason: {}</p>", r))
            .unwrap_or_default();

        let html = format!(
            "<p>Dear {doctor_name},</p>\
             <p>Unfortunately your HelthBot registration was not approved.</p>{reason_line}"
        );

        self.send(to, "Registration Update - HelthBot", &html).await
    }

    pub async fn send_appointment_status_email(
        &self,
        to: &str,
        patient_name: &str,
        doctor_name: &str,
        date: &str,
        time_slot: &str,
        status_line: &str,
    ) -> Result<()> {
        let html = appointment_status_body(patient_name, doctor_name, date, time_slot, status_line);
        self.send(to, "Appointment Update - HelthBot", &html).await
    }
}

// status_line is a sentence fragment ("has been approved").
fn appointment_status_body(
    patient_name: &str,
    doctor_name: &str,
    date: &str,
    time_slot: &str,
    status_line: &str,
) -> String {
    format!(
        "<p>Dear {patient_name},</p>\
         <p>Your appointment {status_line}.</p>\
         <ul>\
           <li>Doctor: {doctor_name}</li>\
           <li>Date: {date}</li>\
           <li>Time: {time_slot}</li>\
         </ul>"
    )
}

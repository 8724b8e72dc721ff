use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, StorageBackend};

/// Settings for tests: in-memory stores, UTC clinic clock, no webhook.
pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_key: "test-service-key".to_string(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            storage_backend: StorageBackend::Memory,
            notifier_webhook_url: None,
            clinic_utc_offset_minutes: 0,
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }

    /// Config pointing the Supabase stores at a mock server.
    pub fn with_supabase(&self, url: &str) -> AppConfig {
        let mut config = self.to_app_config();
        config.supabase_url = url.to_string();
        config.storage_backend = StorageBackend::Supabase;
        config
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Identity put into minted tokens. `role` is the raw claim string.
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn with_id(id: Uuid, email: &str, role: &str) -> Self {
        Self {
            id: id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn staff(email: &str) -> Self {
        Self::new(email, "staff")
    }

    pub fn uuid(&self) -> Uuid {
        Uuid::parse_str(&self.id).unwrap_or_else(|_| Uuid::nil())
    }
}

/// Mints HS256 tokens shaped like the ones Supabase Auth issues.
pub struct JwtTestUtils;

impl JwtTestUtils {
    /// Token for `user` expiring `exp_hours` from now (24 when `None`).
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let issued_at = Utc::now();
        let claims = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": issued_at.timestamp(),
            "exp": (issued_at + Duration::hours(exp_hours.unwrap_or(24))).timestamp(),
        });
        Self::sign(&claims, secret)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "not-the-clinic-secret", Some(24))
    }

    fn sign(claims: &serde_json::Value, secret: &str) -> String {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(json!({ "alg": "HS256", "typ": "JWT" }).to_string());
        let body = general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string());
        let signing_input = format!("{}.{}", header, body);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
        mac.update(signing_input.as_bytes());
        let signature = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signing_input, signature)
    }
}

/// Canned PostgREST rows for the tables the booking core reads.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_row(doctor_id: &str, user_id: &str, consultation_fee: &str, is_available: bool) -> serde_json::Value {
        json!({
            "id": doctor_id,
            "user_id": user_id,
            "name": "Test Doctor",
            "specialty": "cardiology",
            "consultation_fee": consultation_fee,
            "is_available": is_available,
            "average_rating": "0.00",
            "total_reviews": 0
        })
    }

    pub fn schedule_row(doctor_id: &str, day_of_week: &str, start_time: &str, end_time: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "day_of_week": day_of_week,
            "start_time": start_time,
            "end_time": end_time,
            "is_available": true,
            "max_appointments": 10
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code,
            "details": null,
            "hint": null
        })
    }
}

use std::env;
use tracing::warn;

/// Which persistence backend the API wires its stores to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Supabase,
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "supabase" => Some(StorageBackend::Supabase),
            "memory" | "in-memory" | "in_memory" => Some(StorageBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_key: String,
    pub supabase_jwt_secret: String,
    pub storage_backend: StorageBackend,
    pub notifier_webhook_url: Option<String>,
    /// Offset of the clinic's wall clock from UTC. Appointment dates and
    /// times are stored in clinic-local time.
    pub clinic_utc_offset_minutes: i32,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let supabase_url = env::var("SUPABASE_URL")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            });
        let supabase_anon_key = env::var("SUPABASE_ANON_PUBLIC_KEY")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                String::new()
            });
        let supabase_service_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_SERVICE_ROLE_KEY not set, falling back to anon key");
                supabase_anon_key.clone()
            });
        let supabase_jwt_secret = env::var("SUPABASE_JWT_SECRET")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_JWT_SECRET not set, using empty value");
                String::new()
            });

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => StorageBackend::parse(&value).unwrap_or_else(|| {
                warn!("Unknown STORAGE_BACKEND '{}', using in-memory storage", value);
                StorageBackend::Memory
            }),
            Err(_) if !supabase_url.is_empty() => StorageBackend::Supabase,
            Err(_) => StorageBackend::Memory,
        };

        let clinic_utc_offset_minutes = match env::var("CLINIC_UTC_OFFSET_MINUTES") {
            Ok(value) => value.parse::<i32>().unwrap_or_else(|_| {
                warn!("CLINIC_UTC_OFFSET_MINUTES '{}' is not an integer, using 0", value);
                0
            }),
            Err(_) => 0,
        };

        let config = Self {
            supabase_url,
            supabase_anon_key,
            supabase_service_key,
            supabase_jwt_secret,
            storage_backend,
            notifier_webhook_url: env::var("NOTIFIER_WEBHOOK_URL").ok().filter(|url| !url.is_empty()),
            clinic_utc_offset_minutes,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        match self.storage_backend {
            StorageBackend::Supabase => {
                !self.supabase_url.is_empty()
                    && !self.supabase_service_key.is_empty()
                    && !self.supabase_jwt_secret.is_empty()
            }
            StorageBackend::Memory => !self.supabase_jwt_secret.is_empty(),
        }
    }
}

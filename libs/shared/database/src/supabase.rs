use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::error::DbError;

/// Postgres error code PostgREST reports for unique violations.
const UNIQUE_VIOLATION: &str = "23505";

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.anon_key) {
            headers.insert("apikey", value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Auth token contains invalid header characters, sending without it"),
            }
        }

        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T, DbError>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         auth_token: Option<&str>, body: Option<Value>,
                                         extra_headers: Option<HeaderMap>)
                                         -> Result<T, DbError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token);
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(classify_error(status.as_u16(), error_text));
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Header asking PostgREST to echo written rows back.
    pub fn return_representation() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

fn classify_error(status: u16, error_text: String) -> DbError {
    let pg_code = serde_json::from_str::<Value>(&error_text)
        .ok()
        .and_then(|body| body.get("code").and_then(|c| c.as_str()).map(str::to_string));

    match status {
        409 => DbError::Conflict(error_text),
        _ if pg_code.as_deref() == Some(UNIQUE_VIOLATION) => DbError::Conflict(error_text),
        401 | 403 => DbError::Auth(error_text),
        404 => DbError::NotFound(error_text),
        _ => DbError::Api { status, message: error_text },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_is_a_conflict_regardless_of_status() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
        assert!(classify_error(400, body.to_string()).is_conflict());
        assert!(classify_error(409, "{}".to_string()).is_conflict());
    }

    #[test]
    fn other_statuses_map_to_their_kind() {
        assert!(matches!(classify_error(401, String::new()), DbError::Auth(_)));
        assert!(matches!(classify_error(404, String::new()), DbError::NotFound(_)));
        assert!(matches!(classify_error(500, "boom".into()), DbError::Api { status: 500, .. }));
    }
}

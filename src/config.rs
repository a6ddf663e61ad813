use std::env;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub locale: String,
    pub currency: String,
    pub request_timeout_seconds: u64,
    pub refresh_retry_once: bool,
    pub landlord_email: Option<String>,
    pub landlord_password: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_prefix: "/api/v2".to_string(),
            locale: "en".to_string(),
            currency: "EUR".to_string(),
            request_timeout_seconds: 30,
            refresh_retry_once: true,
            landlord_email: None,
            landlord_password: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: normalize_base_url(&env_or("RENTFOLIO_API_URL", "http://localhost:8080")),
            api_prefix: normalize_prefix(&env_or("RENTFOLIO_API_PREFIX", "/api/v2")),
            locale: env_or("RENTFOLIO_LOCALE", "en"),
            currency: env_or("RENTFOLIO_CURRENCY", "EUR"),
            request_timeout_seconds: env_parse_or("RENTFOLIO_REQUEST_TIMEOUT_SECONDS", 30),
            refresh_retry_once: env_parse_bool_or("RENTFOLIO_REFRESH_RETRY_ONCE", true),
            landlord_email: env_opt("RENTFOLIO_EMAIL"),
            landlord_password: env_opt("RENTFOLIO_PASSWORD"),
        }
    }

    /// Fully qualified URL for an API path, e.g. `endpoint("/tenants")`.
    pub fn endpoint(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    pub fn english_locale(&self) -> bool {
        self.locale.trim().to_ascii_lowercase().starts_with("en")
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    env_opt(key)
        .and_then(|raw| raw.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_parse_bool_or(key: &str, default: bool) -> bool {
    match env_opt(key).as_deref().map(str::to_ascii_lowercase) {
        Some(value) if value == "1" || value == "true" || value == "yes" || value == "on" => true,
        Some(value) if value == "0" || value == "false" || value == "no" || value == "off" => false,
        Some(_) => default,
        None => default,
    }
}

fn normalize_prefix(raw: &str) -> String {
    let mut prefix = raw.trim().to_string();
    if prefix.is_empty() {
        return "/api/v2".to_string();
    }
    if !prefix.starts_with('/') {
        prefix.insert(0, '/');
    }
    while prefix.ends_with('/') && prefix.len() > 1 {
        prefix.pop();
    }
    prefix
}

fn normalize_base_url(raw: &str) -> String {
    let mut base = raw.trim().to_string();
    if base.is_empty() {
        return "http://localhost:8080".to_string();
    }
    if !base.contains("://") {
        base = format!("http://{base}");
    }
    while base.ends_with('/') {
        base.pop();
    }
    base
}

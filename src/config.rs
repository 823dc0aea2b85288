use std::env;

/// Application settings read from the environment.
///
/// Rocket's own settings (address, port, secret key) stay in `Rocket.toml`
/// and `ROCKET_*` variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: String,
    pub app_env: String,
    /// Secret used to sign CSRF tokens.
    pub app_key: Vec<u8>,
    /// Set when `APP_KEY` was missing and a random key was generated.
    pub ephemeral_key: bool,
    pub verify_csrf: bool,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "data/postboard.db".to_string());
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "production".to_string());
        let (app_key, ephemeral_key) = match env::var("APP_KEY") {
            Ok(key) if !key.trim().is_empty() => (key.into_bytes(), false),
            _ => (random_key(), true),
        };
        let verify_csrf = env::var("VERIFY_CSRF")
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(app_env != "testing");
        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        Self {
            database_path,
            app_env,
            app_key,
            ephemeral_key,
            verify_csrf,
            allowed_origins,
        }
    }

    /// Settings for the `testing` environment: CSRF verification off.
    pub fn testing() -> Self {
        Self {
            database_path: ":memory:".to_string(),
            app_env: "testing".to_string(),
            app_key: b"testing-key".to_vec(),
            ephemeral_key: false,
            verify_csrf: false,
            allowed_origins: Vec::new(),
        }
    }

    pub fn with_csrf(mut self, verify: bool) -> Self {
        self.verify_csrf = verify;
        self
    }

    /// CORS fairing, only when origins are configured.
    pub fn cors(&self) -> Result<Option<rocket_cors::Cors>, rocket_cors::Error> {
        if self.allowed_origins.is_empty() {
            return Ok(None);
        }
        rocket_cors::CorsOptions::default()
            .allowed_origins(rocket_cors::AllowedOrigins::some_exact(&self.allowed_origins))
            .to_cors()
            .map(Some)
    }
}

fn random_key() -> Vec<u8> {
    let mut key = uuid::Uuid::new_v4().as_bytes().to_vec();
    key.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
    key
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_origins(v: &str) -> Vec<String> {
    v.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bool_flags() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn parses_origin_list() {
        assert_eq!(
            parse_origins("https://a.example, ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn cors_is_optional() {
        assert!(AppConfig::testing().cors().unwrap().is_none());
        let mut cfg = AppConfig::testing();
        cfg.allowed_origins = vec!["https://a.example".to_string()];
        assert!(cfg.cors().unwrap().is_some());
    }
}

// src/config.rs
use std::env;
use std::time::Duration;

pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";
pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Per-call upstream timeout.
pub const OPENAI_CALL_TIMEOUT: Duration = Duration::from_secs(12);
/// Hard cap for producing any response at all.
pub const OVERALL_DEADLINE: Duration = Duration::from_secs(13);

/// Application settings loaded from environment variables.
///
/// Every variable is optional; each one gates a single piece of behavior.
/// The upstream URL and the two deadlines are plain fields so tests can
/// point the client at a local socket with short budgets.
#[derive(Debug, Clone)]
pub struct Settings {
    pub frontend_origin: String,

    pub enable_supabase: bool,
    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub supabase_jwt_secret: Option<String>,

    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,

    pub call_timeout: Duration,
    pub overall_deadline: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frontend_origin: DEFAULT_FRONTEND_ORIGIN.to_string(),
            enable_supabase: false,
            supabase_url: None,
            supabase_service_role_key: None,
            supabase_anon_key: None,
            supabase_jwt_secret: None,
            openai_api_key: None,
            openai_model: OPENAI_DEFAULT_MODEL.to_string(),
            openai_base_url: OPENAI_CHAT_URL.to_string(),
            call_timeout: OPENAI_CALL_TIMEOUT,
            overall_deadline: OVERALL_DEADLINE,
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Self {
        Self {
            frontend_origin: env::var("FRONTEND_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGIN.to_string()),
            enable_supabase: env_bool("ENABLE_SUPABASE", false),
            supabase_url: env_opt("SUPABASE_URL"),
            supabase_service_role_key: env_opt("SUPABASE_SERVICE_ROLE_KEY"),
            supabase_anon_key: env_opt("SUPABASE_ANON_KEY"),
            supabase_jwt_secret: env_opt("SUPABASE_JWT_SECRET"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_model: env_opt("OPENAI_MODEL")
                .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            openai_base_url: OPENAI_CHAT_URL.to_string(),
            call_timeout: OPENAI_CALL_TIMEOUT,
            overall_deadline: OVERALL_DEADLINE,
        }
    }

    /// The upstream path is only taken when an API key is present.
    pub fn openai_is_configured(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Supabase counts as configured only when explicitly enabled, a URL is
    /// set, and at least one of the service-role or anon keys is present.
    pub fn supabase_is_configured(&self) -> bool {
        self.enable_supabase
            && self.supabase_url.is_some()
            && (self.supabase_service_role_key.is_some() || self.supabase_anon_key.is_some())
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_bool(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(val) => matches!(
            val.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_not_configured_without_key() {
        let settings = Settings::default();
        assert!(!settings.openai_is_configured());

        let settings = Settings {
            openai_api_key: Some("  ".to_string()),
            ..Settings::default()
        };
        assert!(!settings.openai_is_configured());

        let settings = Settings {
            openai_api_key: Some("sk-test".to_string()),
            ..Settings::default()
        };
        assert!(settings.openai_is_configured());
    }

    #[test]
    fn supabase_gating_requires_flag_url_and_key() {
        let base = Settings {
            enable_supabase: true,
            supabase_url: Some("https://proj.supabase.co".to_string()),
            supabase_anon_key: Some("anon".to_string()),
            ..Settings::default()
        };
        assert!(base.supabase_is_configured());

        let disabled = Settings {
            enable_supabase: false,
            ..base.clone()
        };
        assert!(!disabled.supabase_is_configured());

        let no_url = Settings {
            supabase_url: None,
            ..base.clone()
        };
        assert!(!no_url.supabase_is_configured());

        let no_keys = Settings {
            supabase_anon_key: None,
            supabase_service_role_key: None,
            ..base
        };
        assert!(!no_keys.supabase_is_configured());
    }
}

// src/services/supabase.rs
//
// Conditional Supabase client stub. Constructed only when the integration
// is explicitly enabled and minimally configured; otherwise it stays inert.
// No network calls are made and no documented behavior depends on it.

use crate::config::Settings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SupabaseAuth {
    ServiceRole,
    Anon,
}

#[derive(Clone, Debug)]
pub struct SupabaseClient {
    url: String,
    auth: SupabaseAuth,
}

impl SupabaseClient {
    /// Build the stub client if Supabase is enabled and configured.
    ///
    /// Requires `ENABLE_SUPABASE`, `SUPABASE_URL`, and at least one of the
    /// service-role or anon keys. The service-role key takes precedence.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        if !settings.supabase_is_configured() {
            return None;
        }
        let url = settings.supabase_url.clone()?;
        let auth = if settings.supabase_service_role_key.is_some() {
            SupabaseAuth::ServiceRole
        } else {
            SupabaseAuth::Anon
        };
        Some(Self { url, auth })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn auth(&self) -> SupabaseAuth {
        self.auth
    }
}

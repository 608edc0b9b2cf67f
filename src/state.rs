// src/state.rs
use std::sync::Arc;

use crate::config::Settings;
use crate::services::supabase::SupabaseClient;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub settings: Settings,
    pub http: reqwest::Client,
    /// Present only when Supabase is explicitly enabled and configured.
    /// No documented behavior depends on it.
    pub supabase: Option<SupabaseClient>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let http = reqwest::Client::builder()
            .timeout(settings.call_timeout)
            .build()
            .expect("failed to build http client");
        let supabase = SupabaseClient::from_settings(&settings);
        Self {
            settings,
            http,
            supabase,
        }
    }
}

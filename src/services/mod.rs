// src/services/mod.rs
pub mod chatbot;
pub mod fallback;
pub mod openai;
pub mod supabase;

// src/services/fallback.rs
//
// Deterministic local replies used when the upstream API is not configured.
// Same input always produces the same output: no randomness, no I/O.

use crate::message::{ChatMessage, MAX_INPUT_CHARS, ResponseStyle, Role};

pub const DEFAULT_GREETING: &str =
    "Hi! I'm your helpful AI Copilot. Ask me anything, and I'll provide a concise, friendly answer.";

const WATER_ANSWER: &str = "Water is H₂O, a molecule made of two hydrogen atoms and one oxygen \
atom. It's a colorless, tasteless liquid essential for life.";

const VEGETABLES: [&str; 7] = [
    "Carrots",
    "Broccoli",
    "Spinach",
    "Bell peppers",
    "Cauliflower",
    "Tomatoes",
    "Cucumbers",
];

const GENERIC_EXAMPLES: [&str; 3] = [
    "Carrots, broccoli, spinach",
    "Write a simple function that adds two numbers",
    "Organize tasks by priority and due date",
];

/// Compute a deterministic reply from the latest user message.
pub fn deterministic_reply(messages: &[ChatMessage], style: Option<ResponseStyle>) -> String {
    let Some(latest_user) = messages.iter().rev().find(|m| m.role == Role::User) else {
        return DEFAULT_GREETING.to_string();
    };

    let mut user_text = latest_user.content.trim().to_string();
    if user_text.chars().count() > MAX_INPUT_CHARS {
        user_text = user_text.chars().take(MAX_INPUT_CHARS).collect::<String>();
        user_text = format!("{}...", user_text.trim_end());
    }

    if user_text.is_empty() {
        return "Please share a bit more detail about what you need.".to_string();
    }

    let lower = user_text.to_lowercase();
    let wants_list = style == Some(ResponseStyle::List)
        || lower.contains("example")
        || lower.contains("list");

    if lower.contains("what is water") || lower.trim() == "water?" {
        return WATER_ANSWER.to_string();
    }

    if lower.contains("vegetable") {
        return if wants_list {
            bulleted(&VEGETABLES)
        } else {
            format!("{}.", VEGETABLES.join(", "))
        };
    }

    if lower.contains("example") {
        return if wants_list {
            bulleted(&GENERIC_EXAMPLES)
        } else {
            format!("{}.", GENERIC_EXAMPLES.join("; "))
        };
    }

    // Question-looking input without a specific handler gets a neutral,
    // concise nudge rather than a canned template.
    if lower.ends_with('?')
        || ["how", "what", "why", "where", "when"]
            .iter()
            .any(|p| lower.starts_with(p))
    {
        return "Here's a concise answer: please provide a bit more context so I can be precise."
            .to_string();
    }

    "Got it. Could you add a bit more detail so I can provide a precise, concise answer?"
        .to_string()
}

fn bulleted(items: &[&str]) -> String {
    items
        .iter()
        .map(|x| format!("- {x}"))
        .collect::<Vec<_>>()
        .join("\n")
}

//! UI language and display labels.
//!
//! The hosting page owns the active language; the widget only receives it
//! as a [`LanguageContext`] and uses it for two things: the `language` field
//! of each chat request and the handful of labels the transcript renderer
//! prints. Urdu is rendered right-to-left.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the backend can answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ur,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ur => "ur",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Ur)
    }

    pub fn labels(&self) -> &'static Labels {
        match self {
            Language::En => &EN_LABELS,
            Language::Ur => &UR_LABELS,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ur" => Ok(Language::Ur),
            other => Err(format!("unknown language '{}': must be en or ur", other)),
        }
    }
}

/// Ambient language signal injected into the widget controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageContext {
    pub language: Language,
    pub rtl: bool,
}

impl LanguageContext {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            rtl: language.is_rtl(),
        }
    }

    pub fn labels(&self) -> &'static Labels {
        self.language.labels()
    }
}

impl Default for LanguageContext {
    fn default() -> Self {
        Self::new(Language::En)
    }
}

/// Display strings used by the transcript renderer.
#[derive(Debug)]
pub struct Labels {
    pub chat_title: &'static str,
    pub placeholder: &'static str,
    pub clear: &'static str,
    pub thinking: &'static str,
    pub error: &'static str,
    pub greeting: &'static str,
    pub tip: &'static str,
    pub context: &'static str,
    pub sources: &'static str,
}

static EN_LABELS: Labels = Labels {
    chat_title: "Physical AI Assistant",
    placeholder: "Ask about Physical AI...",
    clear: "Clear",
    thinking: "Thinking...",
    error: "Error processing your request",
    greeting: "Hello! I'm the Physical AI Textbook Assistant. How can I help you today?",
    tip: "Tip: Select text in the book to ask questions about specific content.",
    context: "Context",
    sources: "Sources:",
};

static UR_LABELS: Labels = Labels {
    chat_title: "فزیکل AI معاون",
    placeholder: "فزیکل AI کے بارے میں پوچھیں...",
    clear: "صاف کریں",
    thinking: "سوچ رہا ہوں...",
    error: "آپ کی درخواست پر عمل کرنے میں خرابی",
    greeting: "السلام علیکم! میں فزیکل AI کتاب کا معاون ہوں۔ میں آج آپ کی کیسے مدد کر سکتا ہوں؟",
    tip: "ٹپ: مخصوص مواد کے بارے میں سوالات پوچھنے کے لیے کتاب میں متن منتخب کریں۔",
    context: "سیاق و سباق",
    sources: "ذرائع:",
};

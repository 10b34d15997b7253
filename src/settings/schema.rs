//! Settings schema
//! The validated shape of the persisted configuration: field registry,
//! coercion rules, completeness invariant, and secret masking.

use serde::{Deserialize, Serialize};

use super::SettingsError;

pub const DEFAULT_CONTEXT_WINDOW: u32 = 200_000;
pub const MIN_CONTEXT_WINDOW: u32 = 2;
pub const MAX_CONTEXT_WINDOW: u32 = 100_000_000;

/// Replacement character for the hidden part of a displayed secret.
const MASK_CHAR: char = '•';
/// Trailing characters of a secret left visible for identification.
const MASK_SUFFIX: usize = 4;

/// How a raw value is coerced before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Secret string, stored as-is and masked for display.
    Secret,
    /// Integer with range validation.
    Integer,
}

/// One entry of the settings field registry.
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Environment variable consulted for onboarding defaults only.
    pub env: &'static str,
    /// Human-readable prompt label.
    pub label: &'static str,
    /// Where to obtain the value, shown during onboarding.
    pub hint: Option<&'static str>,
}

/// Fields in their fixed onboarding order.
pub const SETTINGS_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "anthropic_api_key",
        kind: FieldKind::Secret,
        env: "ANTHROPIC_API_KEY",
        label: "Anthropic API key",
        hint: Some("https://console.anthropic.com/settings/keys"),
    },
    FieldSpec {
        name: "openai_api_key",
        kind: FieldKind::Secret,
        env: "OPENAI_API_KEY",
        label: "OpenAI API key",
        hint: Some("https://platform.openai.com/api-keys"),
    },
    FieldSpec {
        name: "openrouter_api_key",
        kind: FieldKind::Secret,
        env: "OPENROUTER_API_KEY",
        label: "OpenRouter API key",
        hint: Some("https://openrouter.ai/settings/keys"),
    },
    FieldSpec {
        name: "tavily_api_key",
        kind: FieldKind::Secret,
        env: "TAVILY_API_KEY",
        label: "Tavily API key (web search)",
        hint: Some("https://app.tavily.com/home"),
    },
    FieldSpec {
        name: "context_window",
        kind: FieldKind::Integer,
        env: "QUILL_CONTEXT_WINDOW",
        label: "Context window size (tokens)",
        hint: None,
    },
];

/// Look up a field spec by name.
pub fn field(name: &str) -> Result<&'static FieldSpec, SettingsError> {
    SETTINGS_FIELDS
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| SettingsError::UnknownField(name.to_string()))
}

/// True for the credential fields that satisfy the completeness invariant.
/// The tavily key only unlocks search and does not make the document usable.
pub fn is_model_credential(name: &str) -> bool {
    matches!(
        name,
        "anthropic_api_key" | "openai_api_key" | "openrouter_api_key"
    )
}

/// The persisted settings document. Empty string means unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub anthropic_api_key: String,

    #[serde(default)]
    pub openai_api_key: String,

    #[serde(default)]
    pub openrouter_api_key: String,

    #[serde(default)]
    pub tavily_api_key: String,

    #[serde(default = "default_context_window")]
    pub context_window: u32,
}

fn default_context_window() -> u32 {
    DEFAULT_CONTEXT_WINDOW
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            anthropic_api_key: String::new(),
            openai_api_key: String::new(),
            openrouter_api_key: String::new(),
            tavily_api_key: String::new(),
            context_window: DEFAULT_CONTEXT_WINDOW,
        }
    }
}

impl Settings {
    /// A document is usable once at least one model credential is set.
    pub fn is_complete(&self) -> bool {
        !self.anthropic_api_key.is_empty()
            || !self.openai_api_key.is_empty()
            || !self.openrouter_api_key.is_empty()
    }

    /// Range checks on an already-parsed document.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_context_window(i64::from(self.context_window))?;
        Ok(())
    }

    /// Read one field as its display-independent string form.
    pub fn get(&self, name: &str) -> Result<String, SettingsError> {
        match name {
            "anthropic_api_key" => Ok(self.anthropic_api_key.clone()),
            "openai_api_key" => Ok(self.openai_api_key.clone()),
            "openrouter_api_key" => Ok(self.openrouter_api_key.clone()),
            "tavily_api_key" => Ok(self.tavily_api_key.clone()),
            "context_window" => Ok(self.context_window.to_string()),
            other => Err(SettingsError::UnknownField(other.to_string())),
        }
    }

    /// Coerce and assign one field. The document is untouched on failure.
    pub fn apply(&mut self, name: &str, raw: &str) -> Result<(), SettingsError> {
        let spec = field(name)?;
        match coerce(spec, raw)? {
            FieldValue::Secret(value) => match spec.name {
                "anthropic_api_key" => self.anthropic_api_key = value,
                "openai_api_key" => self.openai_api_key = value,
                "openrouter_api_key" => self.openrouter_api_key = value,
                "tavily_api_key" => self.tavily_api_key = value,
                other => return Err(SettingsError::UnknownField(other.to_string())),
            },
            FieldValue::Integer(value) => match spec.name {
                "context_window" => self.context_window = value,
                other => return Err(SettingsError::UnknownField(other.to_string())),
            },
        }
        Ok(())
    }

    /// Rows for human-facing output, registry order, secrets masked.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        SETTINGS_FIELDS
            .iter()
            .map(|spec| {
                let value = match spec.name {
                    "anthropic_api_key" => mask_secret(&self.anthropic_api_key),
                    "openai_api_key" => mask_secret(&self.openai_api_key),
                    "openrouter_api_key" => mask_secret(&self.openrouter_api_key),
                    "tavily_api_key" => mask_secret(&self.tavily_api_key),
                    _ => self.context_window.to_string(),
                };
                (spec.name, value)
            })
            .collect()
    }
}

/// A coerced field value.
pub enum FieldValue {
    Secret(String),
    Integer(u32),
}

/// Shared coercion for `set` and onboarding.
pub fn coerce(spec: &FieldSpec, raw: &str) -> Result<FieldValue, SettingsError> {
    let raw = raw.trim();
    match spec.kind {
        FieldKind::Secret => Ok(FieldValue::Secret(raw.to_string())),
        FieldKind::Integer => {
            let parsed: i64 = raw.parse().map_err(|_| SettingsError::InvalidValue {
                field: spec.name,
                reason: format!("expected an integer, got {raw:?}"),
            })?;
            Ok(FieldValue::Integer(check_context_window(parsed)?))
        }
    }
}

fn check_context_window(value: i64) -> Result<u32, SettingsError> {
    if value < i64::from(MIN_CONTEXT_WINDOW) || value > i64::from(MAX_CONTEXT_WINDOW) {
        return Err(SettingsError::InvalidValue {
            field: "context_window",
            reason: format!("must be between {MIN_CONTEXT_WINDOW} and {MAX_CONTEXT_WINDOW}"),
        });
    }
    Ok(value as u32)
}

/// Mask a secret for display: last four characters visible, rest replaced.
/// Short values are masked entirely.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= MASK_SUFFIX {
        return MASK_CHAR.to_string().repeat(chars.len());
    }
    let hidden = MASK_CHAR.to_string().repeat(chars.len() - MASK_SUFFIX);
    let visible: String = chars[chars.len() - MASK_SUFFIX..].iter().collect();
    format!("{hidden}{visible}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_field_is_rejected() {
        assert!(matches!(
            field("model_name"),
            Err(SettingsError::UnknownField(_))
        ));
        let mut settings = Settings::default();
        assert!(settings.apply("model_name", "x").is_err());
        assert!(settings.get("model_name").is_err());
    }

    #[test]
    fn integer_coercion_parses_and_range_checks() {
        let spec = field("context_window").unwrap();
        assert!(matches!(
            coerce(spec, "150000").unwrap(),
            FieldValue::Integer(150_000)
        ));
        assert!(coerce(spec, "-5").is_err());
        assert!(coerce(spec, "0").is_err());
        assert!(coerce(spec, "not-a-number").is_err());
        assert!(coerce(spec, "999999999999").is_err());
    }

    #[test]
    fn apply_leaves_document_unchanged_on_failure() {
        let mut settings = Settings::default();
        settings.apply("context_window", "150000").unwrap();
        let before = settings.clone();
        assert!(settings.apply("context_window", "-5").is_err());
        assert_eq!(settings, before);
    }

    #[test]
    fn completeness_requires_a_model_credential() {
        let mut settings = Settings::default();
        assert!(!settings.is_complete());

        settings.tavily_api_key = "tvly-abc".into();
        assert!(!settings.is_complete());

        settings.openrouter_api_key = "sk-or-abc".into();
        assert!(settings.is_complete());
    }

    #[test]
    fn masking_keeps_only_a_short_suffix() {
        assert_eq!(mask_secret(""), "");
        assert_eq!(mask_secret("abcd"), "••••");
        assert_eq!(mask_secret("sk-test-12345678"), "••••••••••••5678");
    }

    #[test]
    fn display_rows_never_show_full_secrets() {
        let mut settings = Settings::default();
        settings.anthropic_api_key = "sk-ant-verysecret".into();
        let rows = settings.display_rows();
        let anthropic = &rows.iter().find(|(n, _)| *n == "anthropic_api_key").unwrap().1;
        assert!(!anthropic.contains("verysecret"));
        assert!(anthropic.ends_with("cret"));
    }
}

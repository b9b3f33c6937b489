//! Analyzer configuration
//!
//! Everything the analyzer needs besides the program itself is an explicit value:
//! the rule descriptor used for reporting, the representative-type policy and the
//! way observed types are read off exit points. Nothing is global.

use crate::error::ConfigError;
use crate::remediation::{RepresentativePolicy, API_CHANGE_WARNING};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RULE_ID: &str = "ResponseTypeConsistency";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Advice,
    #[default]
    Warning,
    Error,
}

impl From<Severity> for miette::Severity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Advice => miette::Severity::Advice,
            Severity::Warning => miette::Severity::Warning,
            Severity::Error => miette::Severity::Error,
        }
    }
}

/// Descriptor of the reported diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    pub id: String,
    pub title: String,
    /// `{0}` is replaced by the declared type, `{1}` by the real return type
    pub message_format: String,
    pub category: String,
    pub severity: Severity,
    pub enabled_by_default: bool,
    pub description: String,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            id: DEFAULT_RULE_ID.to_string(),
            title: "Response type annotation is inconsistent with returned values".to_string(),
            message_format:
                "Attribute return type '{0}' is not consistent with real return type '{1}'."
                    .to_string(),
            category: "Naming".to_string(),
            severity: Severity::Warning,
            enabled_by_default: true,
            description: "The type declared by a response type annotation should match the \
                          type every exit point of the method actually returns."
                .to_string(),
        }
    }
}

impl Rule {
    /// Substitute `{0}` with the expected name and `{1}` with the actual name.
    /// Substituted text is never rescanned; other braces are kept as written.
    pub fn format_message(&self, expected: &str, actual: &str) -> String {
        let mut message = String::with_capacity(self.message_format.len());
        let mut rest = self.message_format.as_str();

        while let Some(open) = rest.find('{') {
            message.push_str(&rest[..open]);
            rest = &rest[open..];
            if let Some(tail) = rest.strip_prefix("{0}") {
                message.push_str(expected);
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix("{1}") {
                message.push_str(actual);
                rest = tail;
            } else {
                message.push('{');
                rest = &rest[1..];
            }
        }

        message.push_str(rest);
        message
    }
}

/// How the observed type is read off what an exit point produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    /// The produced value wraps the payload as its single type argument (`Ok<Car>` -> `Car`)
    #[default]
    WrappedSingleArgument,
    /// The produced type is the payload
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Overrides `rule.enabled_by_default` when set
    pub enabled: Option<bool>,
    pub rule: Rule,
    pub representative: RepresentativePolicy,
    pub payload: PayloadShape,
    pub api_change_warning: String,
    /// Shown in place of the real return type when none was produced
    pub absent_type_label: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            rule: Rule::default(),
            representative: RepresentativePolicy::default(),
            payload: PayloadShape::default(),
            api_change_warning: API_CHANGE_WARNING.to_string(),
            absent_type_label: "No Return Type".to_string(),
        }
    }
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration. Missing fields keep their defaults.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rule.id.trim().is_empty() {
            return Err(ConfigError::InvalidRule {
                field: "id",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.rule.message_format.contains("{0}") {
            return Err(ConfigError::InvalidRule {
                field: "message_format",
                reason: "must reference the declared type as {0}".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(self.rule.enabled_by_default)
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_representative(mut self, policy: RepresentativePolicy) -> Self {
        self.representative = policy;
        self
    }

    pub fn with_payload(mut self, payload: PayloadShape) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_api_change_warning(mut self, warning: impl Into<String>) -> Self {
        self.api_change_warning = warning.into();
        self
    }
}

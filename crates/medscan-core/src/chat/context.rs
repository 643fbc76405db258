//! Scan context supplied with a chat question
//!
//! Clients send back what `/analyze` returned. Two shapes are accepted: the
//! whole scan result (`{"medications": [...], ...}`) or just the medication
//! array. Each entry must be an object naming the drug somehow.

use crate::{MedscanError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The parts of a medication entry the chat relies on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationSummary {
    #[serde(default)]
    pub drug_name: Option<String>,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub strength: Option<String>,
    #[serde(default)]
    pub form: Option<String>,
}

impl MedicationSummary {
    /// Best available name, generic first
    pub fn display_name(&self) -> Option<&str> {
        let non_blank = |n: &&str| !n.trim().is_empty();
        self.generic_name
            .as_deref()
            .filter(non_blank)
            .or_else(|| self.drug_name.as_deref().filter(non_blank))
    }
}

/// Validated chat context
#[derive(Debug, Clone)]
pub struct ChatContext {
    raw: Value,
    medications: Vec<MedicationSummary>,
}

impl ChatContext {
    /// Parse the JSON text sent by the client
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Validate an already-parsed value
    pub fn from_value(raw: Value) -> Result<Self> {
        let list = match &raw {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("medications") {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(MedscanError::invalid_input(
                        "context.medications must be an array",
                    ))
                }
                None => {
                    return Err(MedscanError::invalid_input(
                        "context has no medications list",
                    ))
                }
            },
            _ => {
                return Err(MedscanError::invalid_input(
                    "context must be a scan result or a medication list",
                ))
            }
        };

        let mut medications = Vec::with_capacity(list.len());
        for (idx, item) in list.iter().enumerate() {
            if !item.is_object() {
                return Err(MedscanError::invalid_input(format!(
                    "medication {} is not an object",
                    idx
                )));
            }
            let summary: MedicationSummary = serde_json::from_value(item.clone())?;
            if summary.display_name().is_none() {
                return Err(MedscanError::invalid_input(format!(
                    "medication {} has no drug_name or generic_name",
                    idx
                )));
            }
            medications.push(summary);
        }

        Ok(Self { raw, medications })
    }

    pub fn medications(&self) -> &[MedicationSummary] {
        &self.medications
    }

    /// The context exactly as the client sent it, re-serialised compactly
    pub fn to_prompt_json(&self) -> String {
        self.raw.to_string()
    }
}

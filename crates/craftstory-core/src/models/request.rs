use serde::{Deserialize, Serialize};

/// Free-text description of a craft item, as submitted by the artisan.
///
/// Every field is optional; blank values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationRequest {
    pub name: Option<String>,
    pub age: Option<String>,
    pub place: Option<String>,
    pub product_name: Option<String>,
    pub craft_type: Option<String>,
    pub materials: Option<String>,
    pub inspiration: Option<String>,
    pub audience: Option<String>,
    pub tone: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    /// Older clients send the description under this key.
    pub prompt: Option<String>,
}

impl GenerationRequest {
    /// `true` when no field carries any non-whitespace text.
    pub fn is_blank(&self) -> bool {
        [
            &self.name,
            &self.age,
            &self.place,
            &self.product_name,
            &self.craft_type,
            &self.materials,
            &self.inspiration,
            &self.audience,
            &self.tone,
            &self.language,
            &self.description,
            &self.prompt,
        ]
        .into_iter()
        .all(|field| trimmed(field).is_empty())
    }

    /// Trimmed description, falling back to `prompt` when `description` is blank.
    pub fn description_text(&self) -> &str {
        match trimmed(&self.description) {
            "" => trimmed(&self.prompt),
            text => text,
        }
    }
}

/// Trimmed view of an optional text field; `""` when absent.
pub fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

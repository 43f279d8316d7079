use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::record::normalize_tags;

/// A published craft story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedPost {
    pub id: Uuid,
    /// Subject of the verified identity token that published the post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ngo_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub place: String,
    pub product_name: String,
    #[serde(default)]
    pub craft_type: String,
    #[serde(default)]
    pub materials: String,
    #[serde(default)]
    pub inspiration: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub tone: String,
    pub story: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: jiff::Timestamp,
}

/// Text fields of a publish form, before validation.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub name: String,
    pub age: String,
    pub place: String,
    pub product_name: String,
    pub craft_type: String,
    pub materials: String,
    pub inspiration: String,
    pub audience: String,
    pub language: String,
    pub tone: String,
    pub story: String,
    /// Comma-separated tag list as typed by the user.
    pub tags: String,
}

impl PostDraft {
    /// Assign a form field by its wire name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        let slot = match name {
            "name" => &mut self.name,
            "age" => &mut self.age,
            "place" => &mut self.place,
            "productName" => &mut self.product_name,
            "craftType" => &mut self.craft_type,
            "materials" => &mut self.materials,
            "inspiration" => &mut self.inspiration,
            "audience" => &mut self.audience,
            "language" => &mut self.language,
            "tone" => &mut self.tone,
            "story" => &mut self.story,
            "tags" => &mut self.tags,
            _ => return,
        };
        *slot = value.trim().to_string();
    }

    /// Check that `name`, `productName` and `story` are present.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.is_empty() {
            return Err(CoreError::MissingField("name"));
        }
        if self.product_name.is_empty() {
            return Err(CoreError::MissingField("productName"));
        }
        if self.story.is_empty() {
            return Err(CoreError::MissingField("story"));
        }
        Ok(())
    }

    /// Validate and stamp the draft into a new post.
    pub fn into_post(
        self,
        ngo_id: Option<String>,
        image_url: Option<String>,
    ) -> Result<PublishedPost, CoreError> {
        self.validate()?;

        let tags = parse_tag_list(&self.tags);

        Ok(PublishedPost {
            id: Uuid::new_v4(),
            ngo_id,
            name: self.name,
            age: self.age,
            place: self.place,
            product_name: self.product_name,
            craft_type: self.craft_type,
            materials: self.materials,
            inspiration: self.inspiration,
            audience: self.audience,
            language: self.language,
            tone: self.tone,
            story: self.story,
            tags,
            image_url,
            created_at: jiff::Timestamp::now(),
        })
    }
}

/// Split a comma-separated tag string into normalized tags.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(','))
}

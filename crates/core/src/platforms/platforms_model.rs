//! Platform domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::platforms_constants::{DEFAULT_PLATFORM_COLOR, DEFAULT_PLATFORM_ICON};
use crate::errors::{Error, Result};
use crate::utils::text_utils::{normalize_hex_color, slugify};

/// Kind of platform a service is sold against.
///
/// Unknown tags found in storage read back as [`PlatformType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlatformType {
    #[default]
    Social,
    Video,
    Messaging,
    Other,
}

impl PlatformType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformType::Social => "social",
            PlatformType::Video => "video",
            PlatformType::Messaging => "messaging",
            PlatformType::Other => "other",
        }
    }
}

impl From<String> for PlatformType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "social" => PlatformType::Social,
            "video" => PlatformType::Video,
            "messaging" => PlatformType::Messaging,
            _ => PlatformType::Other,
        }
    }
}

impl From<PlatformType> for String {
    fn from(value: PlatformType) -> Self {
        value.as_str().to_string()
    }
}

fn default_icon() -> String {
    DEFAULT_PLATFORM_ICON.to_string()
}

fn default_color() -> String {
    DEFAULT_PLATFORM_COLOR.to_string()
}

fn default_active() -> bool {
    true
}

fn deserialize_color<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let color = Option::<String>::deserialize(deserializer)?;
    Ok(resolve_color(color.as_deref()))
}

/// Domain model representing a platform (Instagram, YouTube, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_color", deserialize_with = "deserialize_color")]
    pub color: String,
    #[serde(rename = "type", default)]
    pub platform_type: PlatformType,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Platform {
    /// Checks a stored or imported record before it is written back.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::invalid_input("Platform id cannot be empty"));
        }
        validate_name(&self.name)?;
        if normalize_hex_color(&self.color).is_none() {
            return Err(Error::invalid_input(format!(
                "Platform '{}' has an invalid color '{}'",
                self.id, self.color
            )));
        }
        Ok(())
    }
}

/// Input model for creating a new platform.
///
/// The id and both timestamps are generated by the repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlatform {
    pub name: String,
    pub slug: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "type")]
    pub platform_type: Option<PlatformType>,
    pub active: Option<bool>,
    pub website: Option<String>,
    pub description: Option<String>,
}

impl NewPlatform {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validates the new platform data.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }

    /// Builds the stored record, filling in every default.
    pub fn into_platform(self, id: String, now: DateTime<Utc>) -> Platform {
        let name = self.name.trim().to_string();
        let slug = resolve_slug(self.slug.as_deref(), &name, &id);
        Platform {
            slug,
            icon: resolve_icon(self.icon.as_deref()),
            color: resolve_color(self.color.as_deref()),
            platform_type: self.platform_type.unwrap_or_default(),
            active: self.active.unwrap_or(true),
            website: self.website,
            description: self.description,
            created_at: now,
            updated_at: now,
            id,
            name,
        }
    }
}

/// Input model for updating an existing platform.
///
/// Absent fields keep their stored value. `website` and `description` can be
/// cleared by sending an explicit `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "type")]
    pub platform_type: Option<PlatformType>,
    pub active: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub website: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub description: Option<Option<String>>,
}

impl PlatformUpdate {
    /// Validates the fields present in the update.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        Ok(())
    }

    /// Merges the update onto `platform`. The id never changes.
    pub fn apply_to(&self, platform: &mut Platform, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            platform.name = name.trim().to_string();
        }
        if let Some(slug) = &self.slug {
            platform.slug = resolve_slug(Some(slug.as_str()), &platform.name, &platform.id);
        }
        if let Some(icon) = &self.icon {
            platform.icon = resolve_icon(Some(icon.as_str()));
        }
        if let Some(color) = &self.color {
            platform.color = resolve_color(Some(color.as_str()));
        }
        if let Some(platform_type) = self.platform_type {
            platform.platform_type = platform_type;
        }
        if let Some(active) = self.active {
            platform.active = active;
        }
        if let Some(website) = &self.website {
            platform.website = website.clone();
        }
        if let Some(description) = &self.description {
            platform.description = description.clone();
        }
        platform.updated_at = now;
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_input("Platform name cannot be empty"));
    }
    Ok(())
}

/// Slug from the explicit value, else from the name, else the id.
fn resolve_slug(explicit: Option<&str>, name: &str, id: &str) -> String {
    explicit
        .map(slugify)
        .filter(|s| !s.is_empty())
        .or_else(|| Some(slugify(name)).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| id.to_string())
}

fn resolve_icon(icon: Option<&str>) -> String {
    icon.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(default_icon)
}

fn resolve_color(color: Option<&str>) -> String {
    color
        .and_then(normalize_hex_color)
        .unwrap_or_else(default_color)
}

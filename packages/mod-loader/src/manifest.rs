use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModLoaderError;

/// What a mod does and therefore how it is loaded.
///
/// The tag is kept verbatim when it is not one of the known kinds so the
/// runner has to handle it explicitly instead of falling through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModType {
    /// CSS appended to the style-mod container.
    Style,
    /// Theme payload broadcast to the UI.
    Theme,
    /// HTML wrapped in a standard HUD widget.
    Widget,
    /// Script executed in the UI's global scope.
    Script,
    /// Script that replaces most of the official UI. Loaded like `Script`.
    TotalConversion,
    Unknown(String),
}

impl ModType {
    pub fn as_str(&self) -> &str {
        match self {
            ModType::Style => "style",
            ModType::Theme => "theme",
            ModType::Widget => "widget",
            ModType::Script => "script",
            ModType::TotalConversion => "total-conversion",
            ModType::Unknown(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ModType::Unknown(_))
    }
}

impl From<String> for ModType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "style" => ModType::Style,
            "theme" => ModType::Theme,
            "widget" => ModType::Widget,
            "script" => ModType::Script,
            "total-conversion" => ModType::TotalConversion,
            _ => ModType::Unknown(tag),
        }
    }
}

impl From<ModType> for String {
    fn from(mod_type: ModType) -> Self {
        match mod_type {
            ModType::Unknown(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl Default for ModType {
    fn default() -> Self {
        ModType::Unknown(String::new())
    }
}

impl Display for ModType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manifest versions are free-form: authors write either `"1.0.0"` or `3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModVersion {
    Text(String),
    Number(serde_json::Number),
}

impl Default for ModVersion {
    fn default() -> Self {
        ModVersion::Text(String::new())
    }
}

impl Display for ModVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModVersion::Text(text) => f.write_str(text),
            ModVersion::Number(number) => write!(f, "{}", number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Descriptor of one mod, as provided by the game client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModManifest {
    /// Display name. The addon manager de-duplicates names before they reach us.
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub version: ModVersion,

    #[serde(rename = "type", default)]
    pub mod_type: ModType,

    /// Entry file path from the mods root, including the mod's own folder,
    /// e.g. `kill-tracker/js/main.js`.
    #[serde(default)]
    pub entry: String,

    /// Event the mod fires once it finished initializing. Following mods wait
    /// for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_event: Option<String>,

    /// Official interface elements this mod changes, e.g. `chat`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifies: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Person>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<Person>,
}

impl Display for ModManifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (v{}, {})", self.name, self.version, self.mod_type)
    }
}

/// Decode the manifest list sent with `loadMods`.
///
/// Only the envelope is checked: anything that is not a JSON array of objects
/// fails as a whole. Each manifest is then read field by field, so a wrong
/// field type in one manifest never costs the others their load. Missing or
/// mistyped fields fall back to empty values and show up later as fetch
/// failures or unknown-type skips.
pub fn parse_manifests(raw: &str) -> Result<Vec<ModManifest>, ModLoaderError> {
    let objects: Vec<Map<String, Value>> = serde_json::from_str(raw)?;
    Ok(objects.into_iter().map(ModManifest::from_fields).collect())
}

impl ModManifest {
    /// Build a manifest from a raw JSON object without failing on field types.
    pub fn from_fields(mut fields: Map<String, Value>) -> Self {
        Self {
            name: loose_string(fields.remove("name")),
            description: optional_string(fields.remove("description")),
            version: loose_version(fields.remove("version")),
            mod_type: loose_type(fields.remove("type")),
            entry: loose_string(fields.remove("entry")),
            ready_event: optional_string(fields.remove("readyEvent")),
            modifies: string_list(fields.remove("modifies")),
            homepage: optional_string(fields.remove("homepage")),
            author: fields.remove("author").and_then(loose_person),
            contributors: match fields.remove("contributors") {
                Some(Value::Array(items)) => items.into_iter().filter_map(loose_person).collect(),
                _ => Vec::new(),
            },
        }
    }
}

/// Strings as-is, `null` or absent as empty, anything else as its JSON text.
fn loose_string(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    }
}

fn optional_string(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text),
        _ => None,
    }
}

fn loose_version(value: Option<Value>) -> ModVersion {
    match value {
        Some(Value::Number(number)) => ModVersion::Number(number),
        other => ModVersion::Text(loose_string(other)),
    }
}

/// A non-string tag can never name a known kind; its JSON text is kept so the
/// warning shows what was sent.
fn loose_type(value: Option<Value>) -> ModType {
    match value {
        Some(Value::String(tag)) => ModType::from(tag),
        other => ModType::Unknown(loose_string(other)),
    }
}

fn string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| optional_string(Some(item)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Accepts the object form and the npm-style `"Name <email> (url)"` string,
/// kept whole as the name.
fn loose_person(value: Value) -> Option<Person> {
    match value {
        Value::String(name) => Some(Person {
            name,
            email: None,
            url: None,
        }),
        object @ Value::Object(_) => serde_json::from_value(object).ok(),
        _ => None,
    }
}

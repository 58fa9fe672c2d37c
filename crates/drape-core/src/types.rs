//! Core data types for an upload analysis.
//!
//! Tag and color data are kept exactly as the vision provider returned them
//! so the relay passes them through unmodified; typed views are derived on
//! demand for prompt building and display.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque identifier the vision provider assigns to an uploaded image.
///
/// Only meaningful within the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadHandle(pub String);

impl UploadHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UploadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single semantic tag with its confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub label: String,
    pub confidence: f64,
}

/// Ordered tag entries as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<Value>);

impl TagSet {
    pub fn new(entries: Vec<Value>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Typed view, in provider order. Entries without a label are skipped.
    pub fn tags(&self) -> Vec<Tag> {
        self.0
            .iter()
            .filter_map(|entry| {
                Some(Tag {
                    label: tag_label(entry)?,
                    confidence: entry
                        .get("confidence")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0),
                })
            })
            .collect()
    }

    /// Tag labels, in provider order.
    pub fn labels(&self) -> Vec<String> {
        self.0.iter().filter_map(tag_label).collect()
    }
}

/// Labels are localized (`{"tag": {"en": "jacket"}}`). English wins, then
/// any other language, then a bare string.
fn tag_label(entry: &Value) -> Option<String> {
    match entry.get("tag")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(langs) => langs
            .get("en")
            .or_else(|| langs.values().next())
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// One color measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSwatch {
    pub name: String,
    pub hex_code: Option<String>,
    pub percent: Option<f64>,
}

/// Color analysis as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorProfile(Map<String, Value>);

impl ColorProfile {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn dominant_colors(&self) -> Vec<ColorSwatch> {
        self.swatches("dominant_colors")
    }

    pub fn image_colors(&self) -> Vec<ColorSwatch> {
        self.swatches("image_colors")
    }

    pub fn dominant_names(&self) -> Vec<String> {
        self.names("dominant_colors")
    }

    pub fn image_names(&self) -> Vec<String> {
        self.names("image_colors")
    }

    fn entries(&self, key: &str) -> &[Value] {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn names(&self, key: &str) -> Vec<String> {
        self.entries(key)
            .iter()
            .filter_map(|c| c.get("color_name").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }

    fn swatches(&self, key: &str) -> Vec<ColorSwatch> {
        self.entries(key)
            .iter()
            .filter_map(|c| {
                let name = c
                    .get("color_name")
                    .or_else(|| c.get("closest_palette_color"))
                    .and_then(Value::as_str)?;
                Some(ColorSwatch {
                    name: name.to_string(),
                    hex_code: c.get("html_code").and_then(Value::as_str).map(str::to_string),
                    percent: c.get("percent").and_then(Value::as_f64),
                })
            })
            .collect()
    }
}

/// Normalized vision data handed to the language model.
///
/// Missing pieces are empty lists; the recommendation step is best-effort
/// and never blocked by partial vision data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyleBrief {
    pub tags: Vec<String>,
    pub dominant_colors: Vec<String>,
    pub image_colors: Vec<String>,
}

impl StyleBrief {
    pub fn from_vision(tags: &TagSet, colors: &ColorProfile) -> Self {
        Self {
            tags: tags.labels(),
            dominant_colors: colors.dominant_names(),
            image_colors: colors.image_names(),
        }
    }
}

/// The aggregate response for one analyzed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub tags: TagSet,
    pub colors: ColorProfile,
    #[serde(rename = "fashion_recommendations")]
    pub recommendations: Vec<String>,
}

//! Face attributes as returned by the detector, plus a derived summary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A value with an optional confidence, e.g. `{"value": "Male"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labeled<T> {
    pub value: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Age {
    pub value: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Beauty {
    pub male_score: f64,
    pub female_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceQuality {
    pub value: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hair {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bald: Option<f64>,
    pub color: BTreeMap<String, f64>,
}

/// Attributes of the first detected face.
///
/// Every attribute is optional: the detector only returns what was asked
/// for in `return_attributes`. Unknown attributes are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Labeled<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<Age>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethnicity: Option<Labeled<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skinstatus: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headpose: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beauty: Option<Beauty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facequality: Option<FaceQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hair: Option<Hair>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FaceAttributes {
    /// Static sample attributes for when the detector is unavailable.
    pub fn demo() -> Self {
        let value = serde_json::json!({
            "gender": { "value": "Male", "confidence": 95.2 },
            "age": { "value": 28, "range": { "my": 25, "My": 32 } },
            "ethnicity": { "value": "Asian", "confidence": 89.7 },
            "skinstatus": { "status": "Clear", "health": 85.3, "stain": 2.1, "acne": 1.8 },
            "headpose": {
                "pitch_angle": { "value": -2.3 },
                "roll_angle": { "value": 1.8 },
                "yaw_angle": { "value": 0.5 }
            },
            "beauty": { "male_score": 78.9, "female_score": 0.0 },
            "facequality": { "value": 0.92, "threshold": 0.7 },
            "emotion": {
                "anger": 2.1, "disgust": 1.5, "fear": 0.8, "happiness": 78.3,
                "neutral": 15.2, "sadness": 1.1, "surprise": 1.0
            },
            "hair": {
                "bald": 0.1,
                "color": { "black": 15.2, "blonde": 3.1, "brown": 78.9, "gray": 2.8 }
            }
        });
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Derive the human-facing summary.
    pub fn summary(&self) -> FaceSummary {
        FaceSummary {
            gender: self.gender.as_ref().map(|g| g.value.clone()),
            age: self.age.as_ref().map(|a| a.value),
            ethnicity: self
                .ethnicity
                .as_ref()
                .map(|e| e.value.clone())
                .filter(|e| !e.is_empty()),
            skin_status: self
                .skinstatus
                .as_ref()
                .and_then(|s| s.get("status"))
                .and_then(Value::as_str)
                .map(str::to_string),
            dominant_emotion: self.emotion.as_ref().and_then(strongest),
            hair_color: self.hair.as_ref().and_then(|h| strongest(&h.color)),
            quality: QualityRating::from_score(self.facequality.as_ref().map(|q| q.value)),
            beauty_score: self.beauty.as_ref().and_then(|b| {
                [b.male_score, b.female_score]
                    .into_iter()
                    .find(|s| *s != 0.0 && !s.is_nan())
            }),
        }
    }
}

/// Key with the highest score. Ties keep the first key in order.
fn strongest(scores: &BTreeMap<String, f64>) -> Option<String> {
    let mut best: Option<(&String, f64)> = None;
    for (name, score) in scores {
        if best.map_or(true, |(_, b)| *score > b) {
            best = Some((name, *score));
        }
    }
    best.map(|(name, _)| name.clone())
}

/// Face-quality bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityRating {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl QualityRating {
    /// `> 0.8` is excellent, `> 0.6` good; a missing score needs improvement.
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s > 0.8 => Self::Excellent,
            Some(s) if s > 0.6 => Self::Good,
            _ => Self::NeedsImprovement,
        }
    }
}

impl fmt::Display for QualityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::NeedsImprovement => "Needs Improvement",
        })
    }
}

/// What the presentation layer shows for a face.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceSummary {
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub ethnicity: Option<String>,
    pub skin_status: Option<String>,
    pub dominant_emotion: Option<String>,
    pub hair_color: Option<String>,
    pub quality: QualityRating,
    pub beauty_score: Option<f64>,
}

impl fmt::Display for FaceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_unknown(v: &Option<String>) -> &str {
            v.as_deref().unwrap_or("Unknown")
        }

        writeln!(f, "Gender:           {}", or_unknown(&self.gender))?;
        match self.age {
            Some(age) => writeln!(f, "Age:              {age}")?,
            None => writeln!(f, "Age:              Unknown")?,
        }
        writeln!(f, "Ethnicity:        {}", or_unknown(&self.ethnicity))?;
        writeln!(f, "Skin Status:      {}", or_unknown(&self.skin_status))?;
        writeln!(f, "Hair Color:       {}", or_unknown(&self.hair_color))?;
        writeln!(f, "Face Quality:     {}", self.quality)?;
        writeln!(f, "Dominant Emotion: {}", or_unknown(&self.dominant_emotion))?;
        match self.beauty_score {
            Some(score) => write!(f, "Beauty Score:     {score}"),
            None => write!(f, "Beauty Score:     N/A"),
        }
    }
}

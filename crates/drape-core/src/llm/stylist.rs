//! Fashion recommendation prompt and response parsing.

use serde::Deserialize;

use super::provider::LlmRequest;
use crate::error::RecommendationParseFailure;
use crate::types::StyleBrief;

/// Fixed system instruction for the recommendation call.
pub const STYLIST_PROMPT: &str = "You are a fashion assistant. Analyze image tags and colors, \
suggest fashion items, future design trends, and add color emojis for each color. \
Return JSON with key 'recommendations' (array of strings).";

impl LlmRequest {
    /// Build the recommendation request for normalized vision data.
    pub fn recommend(brief: &StyleBrief, json_mode: bool) -> Self {
        Self {
            system: STYLIST_PROMPT.to_string(),
            // Serializing a struct of string vectors cannot fail.
            user: serde_json::to_string(brief).unwrap_or_else(|_| "{}".to_string()),
            json_mode,
            temperature: None,
        }
    }
}

#[derive(Deserialize)]
struct Recommendations {
    recommendations: Vec<String>,
}

/// Parse completion content into a recommendation list.
///
/// Tolerates a Markdown code fence around the JSON, which some models add
/// even in JSON mode.
pub fn parse_recommendations(
    content: Option<&str>,
) -> Result<Vec<String>, RecommendationParseFailure> {
    let content = content.ok_or_else(|| RecommendationParseFailure {
        message: "completion has no content".to_string(),
    })?;

    let json = strip_code_fence(content);
    serde_json::from_str::<Recommendations>(json)
        .map(|r| r.recommendations)
        .map_err(|e| RecommendationParseFailure {
            message: e.to_string(),
        })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

//! Image-analysis path: mode detection, the analyzer collaborator contract,
//! and rendering of analysis results.
//!
//! The analyzer itself (a vision model behind HTTP) lives outside this
//! crate. It returns a JSON document whose shape is fixed per mode; any
//! field it leaves out renders as [`MISSING_FIELD`].

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gear::{self, GearBuckets};
use crate::types::SkillLevel;

/// Rendered in place of a field the analysis did not provide.
pub const MISSING_FIELD: &str = "Not available";

const TECHNIQUE_KEYWORDS: &[&str] = &["feedback", "critique", "improve", "better", "review"];

const LIGHTING_HINTS: &[&str] = &[
    "light", "flash", "strobe", "softbox", "speedlight", "reflector", "umbrella", "beauty dish",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What the user wants from an attached image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Recreate the look in someone else's photo.
    Inspiration,
    /// Critique the user's own photo.
    Technique,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inspiration => "inspiration",
            Self::Technique => "technique",
        }
    }
}

/// Reference to an uploaded image, already validated and stored by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl ImageRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_type: None,
        }
    }
}

/// Failure reported by an analyzer. The message is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("{0}")]
    Failed(String),
}

/// External collaborator that turns an image into a structured description.
pub trait ImageAnalyzer: Send + Sync {
    fn analyze(
        &self,
        image: &ImageRef,
        mode: AnalysisMode,
    ) -> impl Future<Output = Result<Value, AnalysisError>> + Send;
}

/// Analyzer used when no vision backend is configured. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalyzer;

impl ImageAnalyzer for NoopAnalyzer {
    async fn analyze(
        &self,
        _image: &ImageRef,
        _mode: AnalysisMode,
    ) -> Result<Value, AnalysisError> {
        Err(AnalysisError::Failed(
            "image analysis is not configured".to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Mode detection
// ---------------------------------------------------------------------------

/// Technique feedback if the message asks for critique, else inspiration.
pub fn detect_mode(message: &str) -> AnalysisMode {
    let lower = message.to_lowercase();
    if TECHNIQUE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        AnalysisMode::Technique
    } else {
        AnalysisMode::Inspiration
    }
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

/// Text at `path`, or [`MISSING_FIELD`]. Arrays are comma-joined; numbers
/// and bools are stringified.
pub fn field(analysis: &Value, path: &[&str]) -> String {
    let value = path.iter().try_fold(analysis, |v, key| v.get(key));
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            if parts.is_empty() {
                MISSING_FIELD.to_string()
            } else {
                parts.join(", ")
            }
        }
        _ => MISSING_FIELD.to_string(),
    }
}

/// List at `path`. A lone string becomes a one-item list; anything else is empty.
pub fn list(analysis: &Value, path: &[&str]) -> Vec<String> {
    match path.iter().try_fold(analysis, |v, key| v.get(key)) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn bullets(items: &[String]) -> String {
    if items.is_empty() {
        return format!("• {MISSING_FIELD}");
    }
    items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn numbered(items: &[String]) -> String {
    if items.is_empty() {
        return format!("1. {MISSING_FIELD}");
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Breakdown of an inspiration image, deeper for more experienced users.
pub fn render_inspiration(analysis: &Value, skill: SkillLevel, buckets: &GearBuckets) -> String {
    let mut sections = vec!["📸 **Inspiration Breakdown**".to_string()];

    sections.push(format!(
        "**Lighting**\n• Primary light: {}\n• Setup: {}\n• Quality: {}\n• Shadows: {}",
        field(analysis, &["lighting_analysis", "primary_light_source"]),
        field(analysis, &["lighting_analysis", "lighting_setup"]),
        field(analysis, &["lighting_analysis", "light_quality"]),
        field(analysis, &["lighting_analysis", "shadows"]),
    ));

    sections.push(format!(
        "**Composition**\n• Camera angle: {}\n• Framing: {}\n• Depth of field: {}\n• Focal length: {}",
        field(analysis, &["composition", "camera_angle"]),
        field(analysis, &["composition", "framing"]),
        field(analysis, &["composition", "depth_of_field"]),
        field(analysis, &["composition", "focal_length"]),
    ));

    sections.push(format!(
        "**Camera Settings**\n• Aperture: {}\n• Shutter speed: {}\n• ISO: {}\n• Focus point: {}",
        field(analysis, &["camera_settings", "estimated_aperture"]),
        field(analysis, &["camera_settings", "estimated_shutter_speed"]),
        field(analysis, &["camera_settings", "estimated_iso"]),
        field(analysis, &["camera_settings", "focus_point"]),
    ));

    if skill != SkillLevel::Beginner {
        sections.push(format!(
            "**Styling Notes**\n• Background: {}\n• Props: {}\n• Wardrobe: {}\n• Makeup & hair: {}",
            field(analysis, &["styling_notes", "background"]),
            field(analysis, &["styling_notes", "props"]),
            field(analysis, &["styling_notes", "clothing"]),
            field(analysis, &["styling_notes", "makeup_hair"]),
        ));
    }

    let steps = list(analysis, &["recreate_tips", "step_by_step"]);
    let equipment = list(analysis, &["recreate_tips", "equipment_needed"]);
    let mut recreate = format!(
        "**How to Recreate It**\n{}\n\n**Equipment Needed**\n{}",
        numbered(&steps),
        bullets(&equipment)
    );
    if skill == SkillLevel::Advanced {
        let challenges = list(analysis, &["recreate_tips", "key_challenges"]);
        recreate.push_str(&format!("\n\n**Key Challenges**\n{}", bullets(&challenges)));
    }
    sections.push(recreate);

    if let Some(kit) = kit_match(analysis, &equipment, buckets) {
        sections.push(kit);
    }

    sections.join("\n\n")
}

/// "From Your Kit": the user's camera, the lens nearest the estimated focal
/// length, and lighting when the analysis calls for lights.
fn kit_match(analysis: &Value, equipment: &[String], buckets: &GearBuckets) -> Option<String> {
    let mut lines = Vec::new();

    if let Some(camera) = buckets.cameras.first() {
        lines.push(format!("• Camera: your {}", camera.display_name()));
    }

    let focal = gear::parse_focal_length(&field(analysis, &["composition", "focal_length"]));
    match focal {
        Some(mm) => match gear::lens_for_focal_length(&buckets.lenses, mm) {
            Some(lens) => lines.push(format!(
                "• Lens: your {} covers ~{mm}mm",
                lens.display_name()
            )),
            None if !buckets.lenses.is_empty() => lines.push(format!(
                "• Lens: none of your lenses is close to ~{mm}mm; use your {} and adjust your distance to match the framing",
                buckets.lenses[0].display_name()
            )),
            None => {}
        },
        None => {
            if let Some(lens) = buckets.lenses.first() {
                lines.push(format!("• Lens: your {}", lens.display_name()));
            }
        }
    }

    let wants_lights = equipment.iter().any(|item| {
        let lower = item.to_lowercase();
        LIGHTING_HINTS.iter().any(|hint| lower.contains(hint))
    });
    if wants_lights {
        if let Some(light) = buckets.lighting.first() {
            lines.push(format!("• Lighting: your {}", light.display_name()));
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(format!("**From Your Kit**\n{}", lines.join("\n")))
    }
}

/// Critique of the user's own photo, deeper for more experienced users.
pub fn render_technique(analysis: &Value, skill: SkillLevel) -> String {
    let mut sections = vec!["🔍 **Technique Feedback**".to_string()];

    sections.push(format!(
        "**Strengths**\n{}",
        bullets(&list(analysis, &["strengths"]))
    ));

    sections.push(format!(
        "**Technical Assessment**\n• Exposure: {}\n• Focus: {}\n• Composition: {}\n• Lighting: {}",
        field(analysis, &["technical_assessment", "exposure"]),
        field(analysis, &["technical_assessment", "focus"]),
        field(analysis, &["technical_assessment", "composition"]),
        field(analysis, &["technical_assessment", "lighting"]),
    ));

    let mut improvements = format!(
        "**Improvements**\nQuick fixes:\n{}",
        bullets(&list(analysis, &["improvements", "immediate"]))
    );
    if skill != SkillLevel::Beginner {
        improvements.push_str(&format!(
            "\n\nTechnique to practice:\n{}",
            bullets(&list(analysis, &["improvements", "technique"]))
        ));
    }
    if skill == SkillLevel::Advanced {
        improvements.push_str(&format!(
            "\n\nEquipment:\n{}",
            bullets(&list(analysis, &["improvements", "equipment"]))
        ));
    }
    sections.push(improvements);

    if skill != SkillLevel::Beginner {
        sections.push(format!(
            "**Specific Tips**\n• Camera settings: {}\n• Positioning: {}\n• Timing: {}",
            field(analysis, &["specific_tips", "camera_settings"]),
            field(analysis, &["specific_tips", "positioning"]),
            field(analysis, &["specific_tips", "timing"]),
        ));
    }

    sections.push(format!(
        "**Overall Rating:** {}",
        field(analysis, &["overall_rating"])
    ));

    sections.join("\n\n")
}

/// User-facing message when analysis fails.
pub fn failure_message(error: &AnalysisError) -> String {
    format!(
        "I'm sorry, I couldn't analyze that image: {error}. Please try again, or describe \
         the look you're going for and I'll help you plan it."
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gear::{bucket, GearCategory, GearItem};
    use serde_json::json;

    fn inspiration() -> Value {
        json!({
            "lighting_analysis": {
                "primary_light_source": "Large softbox camera left",
                "lighting_setup": "One key light with a reflector",
                "light_quality": "Soft and warm",
                "shadows": "Gentle falloff"
            },
            "composition": {
                "camera_angle": "Eye level",
                "framing": "Head and shoulders",
                "depth_of_field": "Shallow",
                "focal_length": "approximately 85mm"
            },
            "camera_settings": {
                "estimated_aperture": "f/2",
                "estimated_shutter_speed": "1/200s",
                "estimated_iso": 100,
                "focus_point": "Near eye"
            },
            "styling_notes": {"background": "Grey paper"},
            "recreate_tips": {
                "equipment_needed": ["85mm lens", "Softbox"],
                "step_by_step": ["Place the softbox", "Meter the face"],
                "key_challenges": ["Controlling spill"]
            }
        })
    }

    #[test]
    fn detect_mode_keywords() {
        assert_eq!(detect_mode("Can you critique this?"), AnalysisMode::Technique);
        assert_eq!(detect_mode("how can I IMPROVE"), AnalysisMode::Technique);
        assert_eq!(detect_mode("I love this look"), AnalysisMode::Inspiration);
        assert_eq!(detect_mode(""), AnalysisMode::Inspiration);
    }

    #[test]
    fn field_handles_types_and_gaps() {
        let a = inspiration();
        assert_eq!(field(&a, &["camera_settings", "estimated_iso"]), "100");
        assert_eq!(field(&a, &["composition", "framing"]), "Head and shoulders");
        assert_eq!(field(&a, &["recreate_tips", "equipment_needed"]), "85mm lens, Softbox");
        assert_eq!(field(&a, &["styling_notes", "props"]), MISSING_FIELD);
        assert_eq!(field(&json!(null), &["anything"]), MISSING_FIELD);
    }

    #[test]
    fn list_accepts_string_or_array() {
        assert_eq!(list(&json!({"s": "one"}), &["s"]), vec!["one".to_string()]);
        assert_eq!(list(&json!({"s": ["a", 2]}), &["s"]).len(), 2);
        assert!(list(&json!({}), &["s"]).is_empty());
    }

    #[test]
    fn beginner_inspiration_is_lighter() {
        let text =
            render_inspiration(&inspiration(), SkillLevel::Beginner, &GearBuckets::default());
        assert!(text.contains("**Lighting**"));
        assert!(text.contains("**Composition**"));
        assert!(text.contains("**Camera Settings**"));
        assert!(text.contains("1. Place the softbox"));
        assert!(!text.contains("Styling Notes"));
        assert!(!text.contains("Key Challenges"));
        assert!(!text.contains("From Your Kit"));
    }

    #[test]
    fn advanced_inspiration_includes_everything() {
        let text =
            render_inspiration(&inspiration(), SkillLevel::Advanced, &GearBuckets::default());
        assert!(text.contains("Styling Notes"));
        assert!(text.contains(&format!("• Props: {MISSING_FIELD}")));
        assert!(text.contains("Controlling spill"));
    }

    #[test]
    fn inspiration_matches_kit() {
        let buckets = bucket(&[
            GearItem::new(GearCategory::CameraBody, "Sony", "A7 IV"),
            GearItem::new(GearCategory::Lens, "Sony", "FE 24-70mm GM"),
            GearItem::new(GearCategory::Lens, "Sony", "FE 85mm f/1.8"),
            GearItem::new(GearCategory::Lighting, "Godox", "AD200"),
        ]);
        let text = render_inspiration(&inspiration(), SkillLevel::Intermediate, &buckets);
        assert!(text.contains("• Camera: your Sony A7 IV"));
        assert!(text.contains("• Lens: your Sony FE 85mm f/1.8 covers ~85mm"));
        assert!(text.contains("• Lighting: your Godox AD200"));
    }

    #[test]
    fn inspiration_without_matching_lens_suggests_fallback() {
        let buckets = bucket(&[GearItem::new(GearCategory::Lens, "Canon", "RF 16mm")]);
        let text = render_inspiration(&inspiration(), SkillLevel::Beginner, &buckets);
        assert!(text.contains("none of your lenses is close to ~85mm"));
    }

    #[test]
    fn technique_depth_by_skill() {
        let analysis = json!({
            "technical_assessment": {"exposure": "Slightly under"},
            "strengths": ["Strong leading lines"],
            "improvements": {
                "immediate": ["Raise exposure by 1/3 stop"],
                "technique": ["Practice back-button focus"],
                "equipment": ["A reflector"]
            },
            "specific_tips": {"timing": "Shoot later in the day"},
            "overall_rating": "7/10 - good foundation"
        });

        let beginner = render_technique(&analysis, SkillLevel::Beginner);
        assert!(beginner.contains("Strong leading lines"));
        assert!(beginner.contains("Raise exposure"));
        assert!(!beginner.contains("back-button"));
        assert!(!beginner.contains("Specific Tips"));
        assert!(beginner.contains("**Overall Rating:** 7/10"));
        assert!(beginner.contains(&format!("• Focus: {MISSING_FIELD}")));

        let intermediate = render_technique(&analysis, SkillLevel::Intermediate);
        assert!(intermediate.contains("back-button"));
        assert!(!intermediate.contains("A reflector"));
        assert!(intermediate.contains("Shoot later in the day"));

        let advanced = render_technique(&analysis, SkillLevel::Advanced);
        assert!(advanced.contains("A reflector"));
    }

    #[test]
    fn technique_with_empty_analysis_uses_placeholders() {
        let text = render_technique(&json!({}), SkillLevel::Advanced);
        assert!(text.contains(&format!("**Overall Rating:** {MISSING_FIELD}")));
    }

    #[test]
    fn failure_message_embeds_reason() {
        let err = AnalysisError::Failed("quota exceeded".to_string());
        assert!(failure_message(&err)
            .starts_with("I'm sorry, I couldn't analyze that image: quota exceeded. "));
    }

    #[tokio::test]
    async fn noop_analyzer_fails() {
        let result = NoopAnalyzer
            .analyze(&ImageRef::new("/tmp/a.jpg"), AnalysisMode::Inspiration)
            .await;
        assert!(result.is_err());
    }
}

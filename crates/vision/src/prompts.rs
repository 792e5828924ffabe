//! Prompt contracts sent with each image. The JSON shapes here are what
//! `synthia_core::image_analysis` renders.

use synthia_core::AnalysisMode;

pub const SYSTEM_PROMPT: &str = "You are Synthia, an expert photography assistant. Analyze images to provide detailed technical photography advice. Always respond in JSON format with structured insights.";

pub const INSPIRATION_PROMPT: &str = r#"Analyze this photography image to help someone recreate a similar look. Provide a detailed technical breakdown in JSON format with these sections:

{
  "lighting_analysis": {
    "primary_light_source": "description of main light direction and quality",
    "lighting_setup": "suggested lighting equipment and positioning",
    "light_quality": "hard/soft, warm/cool temperature description",
    "shadows": "description of shadow characteristics"
  },
  "composition": {
    "camera_angle": "estimated camera position and angle",
    "framing": "description of how subject is framed",
    "depth_of_field": "estimated aperture and DOF characteristics",
    "focal_length": "estimated lens focal length"
  },
  "camera_settings": {
    "estimated_aperture": "f-stop estimate with reasoning",
    "estimated_shutter_speed": "shutter speed estimate",
    "estimated_iso": "ISO estimate",
    "focus_point": "where the focus appears to be"
  },
  "styling_notes": {
    "background": "description of background elements",
    "props": "any props or accessories used",
    "clothing": "wardrobe considerations if applicable",
    "makeup_hair": "styling notes if applicable"
  },
  "recreate_tips": {
    "equipment_needed": ["list of recommended equipment"],
    "step_by_step": ["ordered list of steps to recreate this look"],
    "key_challenges": ["potential difficulties and how to overcome them"]
  }
}"#;

pub const TECHNIQUE_PROMPT: &str = r#"Analyze this photograph to provide constructive feedback and improvement suggestions. Respond in JSON format:

{
  "technical_assessment": {
    "exposure": "evaluation of exposure quality and suggestions",
    "focus": "assessment of focus accuracy and sharpness",
    "composition": "composition strengths and areas for improvement",
    "lighting": "lighting quality and suggestions"
  },
  "strengths": ["list of what works well in this image"],
  "improvements": {
    "immediate": ["simple adjustments that could be made"],
    "technique": ["skill-based improvements to practice"],
    "equipment": ["equipment upgrades that might help"]
  },
  "specific_tips": {
    "camera_settings": "suggested setting adjustments",
    "positioning": "suggestions for camera or subject positioning",
    "timing": "timing considerations if applicable"
  },
  "overall_rating": "rating out of 10 with brief explanation"
}"#;

pub fn prompt_for(mode: AnalysisMode) -> &'static str {
    match mode {
        AnalysisMode::Inspiration => INSPIRATION_PROMPT,
        AnalysisMode::Technique => TECHNIQUE_PROMPT,
    }
}

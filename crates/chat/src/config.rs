use std::path::PathBuf;

use synthia_core::SkillLevel;

/// Default `tracing` filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "synthia_chat=info,synthia_core=info,synthia_vision=info";

/// Chat harness configuration loaded from environment variables.
#[derive(Debug, Clone, Default)]
pub struct ChatConfig {
    /// Knowledge-base JSON file. `None` uses the built-in knowledge base.
    pub knowledge_base_path: Option<PathBuf>,
    pub skill_level: SkillLevel,
    /// JSON array of gear items owned by the user.
    pub gear_profile_path: Option<PathBuf>,
    pub specialization: Option<String>,
    /// Fixed seed for general-advice selection.
    pub advice_seed: Option<u64>,
    /// Emit JSON log lines instead of human-readable ones.
    pub log_json: bool,
}

impl ChatConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default        |
    /// |-----------------------|----------------|
    /// | `KNOWLEDGE_BASE_PATH` | built-in       |
    /// | `SKILL_LEVEL`         | `Beginner`     |
    /// | `GEAR_PROFILE_PATH`   | no gear        |
    /// | `SPECIALIZATION`      | unset          |
    /// | `ADVICE_SEED`         | OS entropy     |
    /// | `LOG_FORMAT`          | `text`         |
    pub fn from_env() -> Self {
        let knowledge_base_path = non_empty_var("KNOWLEDGE_BASE_PATH").map(PathBuf::from);

        let skill_level = non_empty_var("SKILL_LEVEL")
            .map(|raw| {
                SkillLevel::from_str_db(&raw)
                    .expect("SKILL_LEVEL must be Beginner, Intermediate or Advanced")
            })
            .unwrap_or_default();

        let gear_profile_path = non_empty_var("GEAR_PROFILE_PATH").map(PathBuf::from);

        let specialization = non_empty_var("SPECIALIZATION");

        let advice_seed = non_empty_var("ADVICE_SEED").map(|raw| {
            raw.parse::<u64>()
                .expect("ADVICE_SEED must be a valid u64")
        });

        let log_json = non_empty_var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        Self {
            knowledge_base_path,
            skill_level,
            gear_profile_path,
            specialization,
            advice_seed,
            log_json,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

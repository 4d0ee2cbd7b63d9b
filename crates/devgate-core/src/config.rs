//! Project registry and process-wide settings (spec.md §3 "Project
//! registry", §6.5 "Configuration recognized").
//!
//! Grounded on `vtcode-core/src/config/loader/mod.rs`'s layered
//! file-then-env-then-default resolution, and `vtcode-commons/src/paths.rs`
//! for the `WorkspacePaths`-style root-directory accessors.

use devgate_commons::ident::is_valid_project_id;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One registered project: a stable id, a display name, and an absolute path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub path: PathBuf,
    #[serde(rename = "memoryPath")]
    pub memory_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProjectRegistryFile {
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// The project registry, reloaded from disk on demand (spec.md §3: "never
/// cached by the security layer (so new projects are picked up
/// immediately)").
#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    projects: Vec<Project>,
}

impl ProjectRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load `config.json` from `memory_root`. A missing file is treated as an
    /// empty registry, not an error — the gateway must still start cold.
    pub async fn load(memory_root: &Path) -> anyhow::Result<Self> {
        let config_path = memory_root.join("config.json");
        match tokio::fs::read(&config_path).await {
            Ok(bytes) => {
                let file: ProjectRegistryFile = serde_json::from_slice(&bytes)?;
                if !Self::is_valid_registry(&file) {
                    tracing::warn!(
                        path = %config_path.display(),
                        "config.json has one or more invalid project ids; dropping them"
                    );
                }
                Ok(Self {
                    projects: file.projects.into_iter().filter(|p| is_valid_project_id(&p.id)).collect(),
                })
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::empty()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn find(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Auto-detect the active project whose path is an ancestor of `cwd`,
    /// preferring the most specific (longest) match (spec.md §4.8: "used for
    /// later project auto-detection").
    pub fn detect_from_cwd(&self, cwd: &Path) -> Option<&Project> {
        self.projects
            .iter()
            .filter(|p| cwd.starts_with(&p.path))
            .max_by_key(|p| p.path.as_os_str().len())
    }

    pub fn is_valid_registry(file: &ProjectRegistryFile) -> bool {
        file.projects.iter().all(|p| is_valid_project_id(&p.id))
    }
}

/// Process-wide settings resolved from CLI flags, environment variables, and
/// built-in defaults, in that precedence order (spec.md §6.5, expanded with
/// the teacher's CLI-flag-overrides-env convention).
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub memory_root: PathBuf,
    pub ollama_url: String,
    pub ollama_chat_model: String,
    /// Directory holding the fixed set of helper executables invoked by the
    /// `memory_*` family and `smart_search` (spec.md §6.3). Not part of
    /// spec.md's configuration table; an ambient CLI/env knob in the
    /// teacher's style (`config/loader` flag-over-env-over-default).
    pub helpers_dir: PathBuf,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        let memory_root = default_memory_root();
        Self {
            helpers_dir: memory_root.join("bin"),
            memory_root,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_chat_model: "llama3".to_string(),
        }
    }
}

impl GatewaySettings {
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(root) = std::env::var("MEMORY_ROOT") {
            settings.memory_root = PathBuf::from(&root);
            settings.helpers_dir = PathBuf::from(root).join("bin");
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            settings.ollama_url = url;
        }
        if let Ok(model) = std::env::var("OLLAMA_CHAT_MODEL") {
            settings.ollama_chat_model = model;
        }
        if let Ok(dir) = std::env::var("DEVGATE_HELPERS_DIR") {
            settings.helpers_dir = PathBuf::from(dir);
        }
        settings
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.memory_root.join("cache")
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.memory_root.join("gateway").join("metrics.json")
    }

    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.memory_root.join("projects").join(project_id)
    }

    pub fn helper_path(&self, helper_name: &str) -> PathBuf {
        self.helpers_dir.join(helper_name)
    }
}

fn default_memory_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".claude-dash")
}

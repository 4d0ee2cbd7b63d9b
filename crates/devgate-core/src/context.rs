//! Shared server-context value passed to every handler (spec.md §9: "pass
//! them as a single server-context value to each handler rather than
//! importing module-level singletons").

use crate::cache::TtlCache;
use crate::config::{GatewaySettings, ProjectRegistry};
use crate::metrics::MetricsRecorder;
use crate::model_client::ModelClient;
use devgate_commons::paths::AllowedBases;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Everything a tool handler needs, bundled so it can be cloned cheaply
/// (every field is an `Arc`) and shared across concurrently-dispatched
/// request tasks.
#[derive(Clone)]
pub struct GatewayContext {
    pub settings: Arc<GatewaySettings>,
    pub cache: Arc<TtlCache>,
    pub metrics: Arc<MetricsRecorder>,
    pub model: Arc<ModelClient>,
    reachability_memo: Arc<Mutex<Option<(Instant, bool)>>>,
    /// The client's working directory, captured on `initialize` if provided,
    /// used for project auto-detection (spec.md §4.8).
    pub client_cwd: Arc<Mutex<Option<PathBuf>>>,
}

impl GatewayContext {
    pub async fn new(settings: GatewaySettings) -> Self {
        let metrics = MetricsRecorder::load(settings.metrics_path()).await;
        let model = ModelClient::new(settings.ollama_url.clone(), settings.ollama_chat_model.clone());
        Self {
            cache: Arc::new(TtlCache::new(settings.cache_dir())),
            metrics: Arc::new(metrics),
            model: Arc::new(model),
            settings: Arc::new(settings),
            reachability_memo: Arc::new(Mutex::new(None)),
            client_cwd: Arc::new(Mutex::new(None)),
        }
    }

    /// Reload the project registry from disk. Never cached by the security
    /// layer, per spec.md §3: "so new projects are picked up immediately for
    /// validation purposes".
    pub async fn load_registry(&self) -> ProjectRegistry {
        ProjectRegistry::load(&self.settings.memory_root)
            .await
            .unwrap_or_else(|_| ProjectRegistry::empty())
    }

    /// The active set of allowed base paths, recomputed from the current
    /// registry on every call (spec.md §3 invariant).
    pub fn allowed_bases(&self, registry: &ProjectRegistry) -> AllowedBases {
        let mut bases = vec![
            dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")),
            PathBuf::from("/tmp"),
            self.settings.memory_root.clone(),
        ];
        bases.extend(registry.projects().iter().map(|p| p.path.clone()));
        AllowedBases::new(bases)
    }

    /// Model reachability, memoized for 60s (spec.md §4.7, §5).
    pub async fn model_reachable(&self) -> bool {
        let mut memo = self.reachability_memo.lock().await;
        if let Some((checked_at, reachable)) = *memo {
            if checked_at.elapsed() < crate::ttl::MODEL_REACHABILITY_TTL {
                return reachable;
            }
        }
        let reachable = self.model.is_reachable().await;
        *memo = Some((Instant::now(), reachable));
        reachable
    }

    pub async fn set_client_cwd(&self, cwd: PathBuf) {
        *self.client_cwd.lock().await = Some(cwd);
    }

    pub async fn client_cwd(&self) -> Option<PathBuf> {
        self.client_cwd.lock().await.clone()
    }
}

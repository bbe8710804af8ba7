use crate::anchors::AnchorStore;
use crate::config::Config;
use crate::layout::engine::LayoutOptions;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Defaults for requests that do not send their own layout options.
    pub layout_options: LayoutOptions,
    /// Per-document anchor trackers. The only cross-request mutable state.
    pub anchors: AnchorStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            layout_options: config.layout_options(),
            anchors: AnchorStore::new(),
            config,
        }
    }
}

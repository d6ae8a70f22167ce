use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Config;
use crate::editor::{EditorError, Workspace};
use crate::errors::AppError;
use crate::export::ExportPipeline;
use crate::llm_client::LlmClient;
use crate::render::Renderer;
use crate::surface::image::{ImageFetcher, ImageLoader};
use crate::surface::{RenderTree, SharedSurface, SurfaceId};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single editing workspace. Locks are short-held and never span an await.
    pub workspace: Arc<RwLock<Workspace>>,
    pub render_tree: RenderTree,
    pub renderer: Renderer,
    pub exporter: ExportPipeline,
    /// `None` when no API key is configured; enhancement is then unavailable.
    pub llm: Option<LlmClient>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, llm: Option<LlmClient>, fetcher: Arc<dyn ImageFetcher>) -> Self {
        let render_tree = RenderTree::new();
        let renderer = Renderer::new(
            ImageLoader::new(fetcher),
            config.preview_viewport_width_px,
        );
        let exporter = ExportPipeline::new(render_tree.clone(), config.export_options());
        Self {
            workspace: Arc::new(RwLock::new(Workspace::default())),
            render_tree,
            renderer,
            exporter,
            llm,
            config,
        }
    }

    /// Re-renders the preview surface from the current workspace.
    /// Must be called from within a Tokio runtime.
    pub fn refresh_preview(&self) -> SharedSurface {
        let workspace = self.workspace.read();
        self.renderer.render_into(
            &self.render_tree,
            &SurfaceId::preview(),
            workspace.document(),
            workspace.personalization(),
            workspace.template(),
        )
    }

    /// The mounted preview surface, rendering it first if it is not mounted yet.
    pub fn preview_surface(&self) -> SharedSurface {
        self.render_tree
            .get(&SurfaceId::preview())
            .unwrap_or_else(|| self.refresh_preview())
    }

    /// Applies one workspace mutation and re-renders the preview.
    pub fn edit<T>(
        &self,
        mutate: impl FnOnce(&mut Workspace) -> Result<T, EditorError>,
    ) -> Result<T, AppError> {
        let result = {
            let mut workspace = self.workspace.write();
            mutate(&mut workspace)?
        };
        self.refresh_preview();
        Ok(result)
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use crate::surface::image::InlineOnlyFetcher;

    let config = Config {
        export_settle_delay: std::time::Duration::ZERO,
        ..Config::default()
    };
    AppState::new(config, None, Arc::new(InlineOnlyFetcher))
}

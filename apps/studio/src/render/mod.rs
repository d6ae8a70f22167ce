//! Turns a resume document into the node tree mounted on a preview surface.

pub mod classic;
pub mod format;
pub mod handlers;

use tracing::debug;

use crate::models::personalization::{PersonalizationConfig, TemplateId};
use crate::models::resume::ResumeDocument;
use crate::surface::image::ImageLoader;
use crate::surface::node::Node;
use crate::surface::{RenderTree, SharedSurface, Surface, SurfaceId};

#[derive(Clone)]
pub struct Renderer {
    images: ImageLoader,
    viewport_width: f32,
}

impl Renderer {
    pub fn new(images: ImageLoader, viewport_width: f32) -> Self {
        Self {
            images,
            viewport_width,
        }
    }

    /// Builds the node tree for `template`. Image loads referenced by the tree
    /// start here.
    pub fn render(
        &self,
        doc: &ResumeDocument,
        personalization: &PersonalizationConfig,
        template: TemplateId,
    ) -> Node {
        match template {
            TemplateId::Classic => classic::render(doc, personalization, &self.images),
        }
    }

    /// Renders into the surface `id`, mounting it on first use. An already
    /// mounted surface keeps its inline presentation attributes.
    pub fn render_into(
        &self,
        tree: &RenderTree,
        id: &SurfaceId,
        doc: &ResumeDocument,
        personalization: &PersonalizationConfig,
        template: TemplateId,
    ) -> SharedSurface {
        let root = self.render(doc, personalization, template);
        let font = personalization.resolved_font();

        match tree.get(id) {
            Some(surface) => {
                surface.lock().replace_content(root, font);
                debug!(surface = %id, template = template.id(), "preview re-rendered");
                surface
            }
            None => {
                debug!(surface = %id, template = template.id(), "preview mounted");
                tree.mount(Surface::new(id.clone(), root, font, self.viewport_width))
            }
        }
    }
}

/// Renderer whose image loads never touch the network.
#[cfg(test)]
pub(crate) fn offline_renderer() -> Renderer {
    use std::sync::Arc;

    use crate::surface::image::InlineOnlyFetcher;

    Renderer::new(ImageLoader::new(Arc::new(InlineOnlyFetcher)), 900.0)
}

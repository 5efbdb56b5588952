use std::collections::BTreeMap;
use std::time::Duration;

use crate::command::CommandRenderer;
use crate::error::RenderError;
use crate::format::ImageFormat;

/// Turns diagram source into image bytes.
pub trait Renderer {
    fn render(&self, source: &str, format: ImageFormat) -> Result<Vec<u8>, RenderError>;

    /// Format used when the block does not ask for one.
    fn default_format(&self) -> ImageFormat {
        ImageFormat::Svg
    }
}

impl<F> Renderer for F
where
    F: Fn(&str, ImageFormat) -> Result<Vec<u8>, RenderError>,
{
    fn render(&self, source: &str, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
        self(source, format)
    }
}

/// Maps language identifiers to renderers.
#[derive(Default)]
pub struct RendererRegistry {
    renderers: BTreeMap<String, Box<dyn Renderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        RendererRegistry::default()
    }

    /// Registry with the built-in `dot` and `plantuml` renderers.
    pub fn with_builtins(timeout: Option<Duration>) -> Self {
        let mut registry = RendererRegistry::new();
        registry.register("dot", CommandRenderer::graphviz().with_timeout(timeout));
        registry.register("plantuml", CommandRenderer::plantuml().with_timeout(timeout));
        registry
    }

    /// Register a renderer, replacing and returning any previous one for `language`.
    pub fn register(
        &mut self,
        language: impl Into<String>,
        renderer: impl Renderer + 'static,
    ) -> Option<Box<dyn Renderer>> {
        self.renderers.insert(language.into(), Box::new(renderer))
    }

    pub fn get(&self, language: &str) -> Option<&dyn Renderer> {
        self.renderers.get(language).map(|r| r.as_ref())
    }

    pub fn contains(&self, language: &str) -> bool {
        self.renderers.contains_key(language)
    }

    /// Registered languages, sorted.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("languages", &self.renderers.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub mod clean;
pub mod command;
pub mod error;
pub mod format;
pub mod processor;
pub mod registry;

pub use command::CommandRenderer;
pub use error::{ProcessError, RenderError};
pub use format::ImageFormat;
pub use processor::{FileReport, Processor, RenderedDocument, Settings, should_render};
pub use registry::{Renderer, RendererRegistry};

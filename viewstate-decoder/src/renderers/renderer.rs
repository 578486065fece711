use crate::app::{error::RuntimeError, runtime::Config};

/// Defines behavior for rendering a decoded stream and managing its output handle
pub trait Renderer<'a> {
    /// Create a new renderer with references to the decoded data
    fn new(config: &'a Config) -> Result<Self, RuntimeError>
    where
        Self: Sized;
    /// Write every graph the parse produced, the outer one first and any
    /// payloads decoded out of byte arrays after it
    fn render(&mut self) -> Result<(), RuntimeError>;
}

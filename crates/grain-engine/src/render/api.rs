use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::coords::Viewport;
use crate::paint::Color;

use super::buffer::{IndexBuffer, VertexBuffer};
use super::error::RenderError;
use super::shader::Shader;
use super::vertex_array::VertexArray;

/// Graphics backend a renderer (and every resource it creates) is bound to.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Backend {
    /// No backend selected. Creating anything against it is a programming error.
    #[default]
    None,
    /// Records commands without touching a GPU.
    Headless,
    /// wgpu on the platform's native API.
    Wgpu,
}

impl Backend {
    /// Panics unless a concrete backend is selected.
    pub fn require(self) -> Self {
        assert!(
            self != Backend::None,
            "no rendering backend selected (Backend::None is not supported)"
        );
        self
    }

    pub const fn name(self) -> &'static str {
        match self {
            Backend::None => "none",
            Backend::Headless => "headless",
            Backend::Wgpu => "wgpu",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("unknown rendering backend '{0}' (expected none, headless or wgpu)")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Backend::None),
            "headless" => Ok(Backend::Headless),
            "wgpu" => Ok(Backend::Wgpu),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

/// Capability interface implemented once per graphics backend.
///
/// Selected at startup and injected into the [`Renderer`](super::Renderer);
/// every resource factory goes through it, so a resource is always tied to
/// the backend that created it.
pub trait RendererApi {
    fn backend(&self) -> Backend;

    /// Backend-wide state setup (blending on, depth test off).
    fn init(&mut self);

    fn set_viewport(&mut self, viewport: Viewport);

    fn set_clear_color(&mut self, color: Color);

    fn clear(&mut self);

    fn bind_shader(&mut self, shader: &dyn Shader);

    fn bind_vertex_array(&mut self, vertex_array: &VertexArray);

    /// Draws the bound vertex array. `index_count == 0` draws everything, see
    /// [`VertexArray::draw_call`].
    fn draw_indexed(&mut self, vertex_array: &VertexArray, index_count: u32);

    fn create_vertex_buffer(&mut self, vertices: &[f32]) -> Box<dyn VertexBuffer>;

    /// Zero-filled buffer of `size` bytes, filled later through `set_data`.
    fn create_dynamic_vertex_buffer(&mut self, size: u64) -> Box<dyn VertexBuffer>;

    fn create_index_buffer(&mut self, indices: &[u32]) -> Box<dyn IndexBuffer>;

    fn create_vertex_array(&mut self) -> VertexArray {
        VertexArray::new(self.backend())
    }

    fn create_shader(
        &mut self,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Rc<dyn Shader>, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names_case_insensitively() {
        assert_eq!("wgpu".parse::<Backend>(), Ok(Backend::Wgpu));
        assert_eq!(" Headless ".parse::<Backend>(), Ok(Backend::Headless));
        assert_eq!("NONE".parse::<Backend>(), Ok(Backend::None));
        assert!("vulkan".parse::<Backend>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for b in [Backend::None, Backend::Headless, Backend::Wgpu] {
            assert_eq!(b.to_string().parse::<Backend>(), Ok(b));
        }
    }

    #[test]
    #[should_panic(expected = "no rendering backend")]
    fn require_rejects_none() {
        Backend::None.require();
    }
}

//! Renderer family.
//!
//! The [`Renderer`] front-end drives a [`RendererApi`] backend through
//! [`RenderCommand`]. Resources (buffers, vertex arrays, shaders) are created
//! through the same backend and carry its [`Backend`] tag; mixing resources
//! of different backends is a programming error and panics at bind time.
//!
//! Two backends ship with the engine:
//! - [`headless`] records commands into a [`CommandLog`](headless::CommandLog)
//!   and never touches a GPU.
//! - [`wgpu_backend`] records a frame plan that the window's graphics context
//!   executes at present time.

mod api;
mod buffer;
mod command;
mod error;
pub mod headless;
mod renderer;
mod shader;
mod vertex_array;
pub mod wgpu_backend;

pub use api::{Backend, RendererApi, UnknownBackend};
pub use buffer::{
    BaseType, BufferElement, BufferLayout, IndexBuffer, ShaderDataType, VertexBuffer,
};
pub use command::RenderCommand;
pub use error::RenderError;
pub use renderer::{Renderer, SCENE_CLEAR_COLOR};
pub use shader::{read_shader_file, split_stages, Shader, ShaderLibrary, ShaderSources};
pub use vertex_array::{DrawCall, VertexArray, VertexAttribute};

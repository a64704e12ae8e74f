use std::any::Any;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use super::api::Backend;
use super::error::RenderError;
use super::renderer::Renderer;

/// A compiled vertex + fragment program.
pub trait Shader: Any {
    fn name(&self) -> &str;

    fn backend(&self) -> Backend;

    fn as_any(&self) -> &dyn Any;
}

/// Vertex and fragment sources of one shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

const STAGE_MARKER: &str = "#type";

/// Splits a combined source on `#type vertex` / `#type fragment` lines
/// (`pixel` is accepted for fragment).
///
/// A source without any marker is used for both stages, which suits WGSL
/// modules that carry both entry points.
pub fn split_stages(name: &str, source: &str) -> Result<ShaderSources, RenderError> {
    if source.trim().is_empty() {
        return Err(RenderError::EmptySource { name: name.to_string() });
    }

    if !source.lines().any(|l| l.trim_start().starts_with(STAGE_MARKER)) {
        return Ok(ShaderSources {
            vertex: source.to_string(),
            fragment: source.to_string(),
        });
    }

    let mut vertex: Option<String> = None;
    let mut fragment: Option<String> = None;
    let mut in_vertex: Option<bool> = None;

    for line in source.lines() {
        if let Some(rest) = line.trim_start().strip_prefix(STAGE_MARKER) {
            let is_vertex = match rest.trim() {
                "vertex" => true,
                "fragment" | "pixel" => false,
                other => {
                    return Err(RenderError::UnknownStage {
                        name: name.to_string(),
                        stage: other.to_string(),
                    });
                }
            };
            let slot = if is_vertex { &mut vertex } else { &mut fragment };
            *slot = Some(String::new());
            in_vertex = Some(is_vertex);
            continue;
        }

        let buf = match in_vertex {
            Some(true) => vertex.as_mut(),
            Some(false) => fragment.as_mut(),
            None => None,
        };
        if let Some(buf) = buf {
            buf.push_str(line);
            buf.push('\n');
        }
    }

    let vertex = vertex.ok_or_else(|| RenderError::MissingStage {
        name: name.to_string(),
        stage: "vertex",
    })?;
    let fragment = fragment.ok_or_else(|| RenderError::MissingStage {
        name: name.to_string(),
        stage: "fragment",
    })?;

    Ok(ShaderSources { vertex, fragment })
}

/// Reads a shader file, returning its file stem (the default shader name)
/// and contents.
pub fn read_shader_file(path: &Path) -> Result<(String, String), RenderError> {
    let source = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((stem, source))
}

/// Name → shader registry.
///
/// Adding a name twice and fetching a missing name both panic; use
/// [`exists`](Self::exists) when absence is expected.
#[derive(Default)]
pub struct ShaderLibrary {
    shaders: HashMap<String, Rc<dyn Shader>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, shader: Rc<dyn Shader>) {
        let name = name.into();
        assert!(!self.exists(&name), "shader '{name}' already exists");
        self.shaders.insert(name, shader);
    }

    /// Registers `shader` under its own name.
    pub fn add_named(&mut self, shader: Rc<dyn Shader>) {
        let name = shader.name().to_string();
        self.add(name, shader);
    }

    /// Loads a shader file, registering it under the file stem.
    pub fn load(
        &mut self,
        renderer: &mut Renderer,
        path: impl AsRef<Path>,
    ) -> Result<Rc<dyn Shader>, RenderError> {
        let shader = renderer.create_shader_from_file(path)?;
        self.add_named(Rc::clone(&shader));
        Ok(shader)
    }

    /// Loads a shader file, registering it under `name`.
    pub fn load_as(
        &mut self,
        renderer: &mut Renderer,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Result<Rc<dyn Shader>, RenderError> {
        let (_, source) = read_shader_file(path.as_ref())?;
        let shader = renderer.create_shader_from_source(name, &source)?;
        self.add(name, Rc::clone(&shader));
        Ok(shader)
    }

    pub fn get(&self, name: &str) -> Rc<dyn Shader> {
        match self.shaders.get(name) {
            Some(shader) => Rc::clone(shader),
            None => panic!("shader '{name}' not found"),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.shaders.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::{CommandLog, HeadlessApi};

    fn renderer() -> Renderer {
        Renderer::new(Box::new(HeadlessApi::new(CommandLog::default())))
    }

    // ── split_stages ──────────────────────────────────────────────────────

    #[test]
    fn splits_vertex_and_fragment_sections() {
        let src = "#type vertex\nvs body\n#type fragment\nfs body\n";
        let s = split_stages("flat", src).unwrap();
        assert_eq!(s.vertex, "vs body\n");
        assert_eq!(s.fragment, "fs body\n");
    }

    #[test]
    fn pixel_is_an_alias_for_fragment() {
        let s = split_stages("flat", "#type vertex\na\n#type pixel\nb").unwrap();
        assert_eq!(s.fragment, "b\n");
    }

    #[test]
    fn unmarked_source_feeds_both_stages() {
        let s = split_stages("wgsl", "@vertex fn vs_main() {}").unwrap();
        assert_eq!(s.vertex, s.fragment);
    }

    #[test]
    fn missing_stage_is_an_error() {
        let err = split_stages("half", "#type vertex\nonly").unwrap_err();
        assert!(matches!(err, RenderError::MissingStage { stage: "fragment", .. }));
    }

    #[test]
    fn unknown_stage_is_an_error() {
        let err = split_stages("geo", "#type geometry\nx").unwrap_err();
        assert!(matches!(err, RenderError::UnknownStage { ref stage, .. } if stage == "geometry"));
    }

    #[test]
    fn blank_source_is_an_error() {
        assert!(matches!(split_stages("e", "  \n"), Err(RenderError::EmptySource { .. })));
    }

    // ── library ───────────────────────────────────────────────────────────

    #[test]
    fn add_get_exists() {
        let mut r = renderer();
        let mut lib = ShaderLibrary::new();
        let shader = r.create_shader("flat", "v", "f").unwrap();
        lib.add_named(shader);
        assert!(lib.exists("flat"));
        assert!(!lib.exists("textured"));
        assert_eq!(lib.get("flat").name(), "flat");
        assert_eq!(lib.len(), 1);
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn duplicate_name_is_fatal() {
        let mut r = renderer();
        let mut lib = ShaderLibrary::new();
        lib.add("a", r.create_shader("a", "v", "f").unwrap());
        lib.add("a", r.create_shader("b", "v", "f").unwrap());
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn missing_name_is_fatal() {
        ShaderLibrary::new().get("nope");
    }

    #[test]
    fn load_names_shader_after_file_stem() {
        let dir = std::env::temp_dir().join(format!("grain-shader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("checker.wgsl");
        std::fs::write(&path, "#type vertex\nv\n#type fragment\nf\n").unwrap();

        let mut r = renderer();
        let mut lib = ShaderLibrary::new();
        let shader = lib.load(&mut r, &path).unwrap();
        assert_eq!(shader.name(), "checker");
        assert!(lib.exists("checker"));

        lib.load_as(&mut r, "checker_alt", &path).unwrap();
        assert!(lib.exists("checker_alt"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_reports_missing_file() {
        let mut r = renderer();
        let mut lib = ShaderLibrary::new();
        let err = lib.load(&mut r, "/definitely/not/here.wgsl").err().unwrap();
        assert!(matches!(err, RenderError::Io { .. }));
        assert!(lib.is_empty());
    }
}

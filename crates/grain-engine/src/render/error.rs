use std::path::PathBuf;

/// Recoverable failures of the renderer family.
///
/// Misuse (unset backend, missing layout, registry collisions) is not an
/// error value: it panics at the call site.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to read shader source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader '{name}' has no {stage} stage")]
    MissingStage { name: String, stage: &'static str },

    #[error("shader '{name}' declares unknown stage '{stage}'")]
    UnknownStage { name: String, stage: String },

    #[error("shader '{name}' has an empty source")]
    EmptySource { name: String },

    #[error("shader '{name}' failed to compile: {message}")]
    Compile { name: String, message: String },
}

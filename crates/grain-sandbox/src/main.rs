mod stats;
mod triangle;

use anyhow::{Context, Result};
use grain_engine::core::{AppConfig, Application};
use grain_engine::logging::{init_logging, LoggingConfig};
use grain_engine::render::Backend;
use grain_engine::window::WindowProps;

use stats::StatsLayer;
use triangle::TriangleLayer;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = config_from_env()?;
    let mut app = Application::new(config)?;
    app.push_layer(TriangleLayer::new());
    app.push_overlay(StatsLayer::new());

    app.run();
    app.shutdown();
    Ok(())
}

/// `GRAIN_BACKEND` picks the backend (`wgpu` or `headless`);
/// `GRAIN_HEADLESS_FRAMES` bounds a headless run.
fn config_from_env() -> Result<AppConfig> {
    let backend = std::env::var("GRAIN_BACKEND").ok();
    let frames = std::env::var("GRAIN_HEADLESS_FRAMES").ok();
    parse_config(backend.as_deref(), frames.as_deref())
}

fn parse_config(backend: Option<&str>, frames: Option<&str>) -> Result<AppConfig> {
    let mut config = AppConfig::new(WindowProps::new("Grain Sandbox", 1280, 720));

    if let Some(name) = backend {
        config.backend = name
            .parse::<Backend>()
            .context("invalid GRAIN_BACKEND")?;
    }

    if let Some(frames) = frames {
        let count = frames
            .trim()
            .parse::<u64>()
            .with_context(|| format!("GRAIN_HEADLESS_FRAMES={frames:?} is not a frame count"))?;
        config.headless_frames = Some(count);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variables_keep_the_defaults() {
        let config = parse_config(None, None).unwrap();
        assert_eq!(config.backend, Backend::Wgpu);
        assert_eq!(config.headless_frames, None);
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn headless_run_with_a_frame_limit() {
        let config = parse_config(Some("headless"), Some(" 120 ")).unwrap();
        assert_eq!(config.backend, Backend::Headless);
        assert_eq!(config.headless_frames, Some(120));
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = parse_config(Some("vulkan"), None).unwrap_err();
        assert!(err.to_string().contains("GRAIN_BACKEND"));

        let err = parse_config(None, Some("-1")).unwrap_err();
        assert!(err.to_string().contains("GRAIN_HEADLESS_FRAMES"));
        assert!(parse_config(None, Some("")).is_err());
    }
}

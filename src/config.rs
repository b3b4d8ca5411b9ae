//! Session configuration read from the host page.

use std::str::FromStr;

use thiserror::Error;

/// URL the worker bootstrap script is served from unless overridden. The dev
/// server and the staged `dist/` tree both serve `static/` as the document
/// root, so paths here are rooted in that directory.
pub const DEFAULT_WORKER_URL: &str = "/emulator_worker.js";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown presenter backend {0:?} (expected \"webgl\" or \"canvas2d\")")]
    UnknownPresenter(String),
    #[error("canvas element {0:?} not found")]
    MissingCanvas(String),
    #[error("no usable {0} rendering context")]
    NoContext(&'static str),
}

/// Which presentation path drives the canvas. Exactly one presenter is active
/// per session; an enum makes selecting both unrepresentable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PresenterKind {
    WebGl,
    #[default]
    Canvas2d,
}

impl FromStr for PresenterKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "webgl" => Ok(PresenterKind::WebGl),
            "2d" | "canvas2d" => Ok(PresenterKind::Canvas2d),
            other => Err(ConfigError::UnknownPresenter(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub presenter: PresenterKind,
    pub worker_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            presenter: PresenterKind::default(),
            worker_url: DEFAULT_WORKER_URL.to_string(),
        }
    }
}

impl Config {
    /// Builds a config from the canvas element's `data-presenter` and
    /// `data-worker` attributes; absent attributes fall back to defaults.
    pub fn from_attrs(
        presenter: Option<&str>,
        worker_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(name) = presenter {
            config.presenter = name.parse()?;
        }
        if let Some(url) = worker_url {
            config.worker_url = url.to_string();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_presenters() {
        assert_eq!("webgl".parse(), Ok(PresenterKind::WebGl));
        assert_eq!("canvas2d".parse(), Ok(PresenterKind::Canvas2d));
        assert_eq!("2d".parse(), Ok(PresenterKind::Canvas2d));
    }

    #[test]
    fn rejects_unknown_presenters() {
        assert_eq!(
            PresenterKind::from_str("both"),
            Err(ConfigError::UnknownPresenter("both".to_string())),
        );
    }

    #[test]
    fn default_worker_url_resolves_under_the_served_root() {
        use std::path::Path;

        // `static/` is the document root, so the default URL must name a file
        // that actually ships there, and the page shell must agree.
        let static_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("static");
        let relative = DEFAULT_WORKER_URL.trim_start_matches('/');
        assert!(static_root.join(relative).is_file());

        let page = std::fs::read_to_string(static_root.join("index.html")).unwrap();
        assert!(page.contains(&format!("data-worker=\"{DEFAULT_WORKER_URL}\"")));
    }

    #[test]
    fn attrs_override_defaults() {
        let config = Config::from_attrs(Some("webgl"), Some("/w.js")).unwrap();
        assert_eq!(config.presenter, PresenterKind::WebGl);
        assert_eq!(config.worker_url, "/w.js");

        let config = Config::from_attrs(None, None).unwrap();
        assert_eq!(config, Config::default());
    }
}

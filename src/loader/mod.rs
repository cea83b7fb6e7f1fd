//! Loader descriptors and the fetch pipeline.
//!
//! A loader supplies the data of one namespace for one locale, optionally
//! only on some routes. Loaders are plain async functions; file-backed
//! loaders are provided for the settings file.

mod fetch;
mod route;

use std::fmt;
use std::future::Future;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use thiserror::Error;

pub use fetch::fetch_translations;
pub(crate) use fetch::landed_keys;
pub use route::{
    RoutePattern,
    route_applies,
};

use crate::locale::LocaleTag;
use crate::node::Node;

/// Errors a loader may fail with.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Failed to read translation file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse translation file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Message(String),
}

impl LoaderError {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Future returned by a loader invocation.
pub type LoaderFuture = BoxFuture<'static, Result<Node, LoaderError>>;

/// Zero-argument async function producing a nested payload.
#[derive(Clone)]
pub struct Loader(Arc<dyn Fn() -> LoaderFuture + Send + Sync>);

impl Loader {
    pub fn new<F, Fut>(load: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Node, LoaderError>> + Send + 'static,
    {
        Self(Arc::new(move || load().boxed()))
    }

    /// Loader that always yields a copy of `payload`.
    #[must_use]
    pub fn from_node(payload: Node) -> Self {
        Self::new(move || {
            let payload = payload.clone();
            async move { Ok(payload) }
        })
    }

    /// Loader reading a JSON file each time it is invoked.
    #[must_use]
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self::new(move || read_json_file(path.clone()))
    }

    /// Starts the loader.
    #[must_use]
    pub fn load(&self) -> LoaderFuture {
        (self.0)()
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Loader(<fn>)")
    }
}

/// Reads and parses a JSON payload from disk.
async fn read_json_file(path: PathBuf) -> Result<Node, LoaderError> {
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| LoaderError::Io { path: path.clone(), source })?;

    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| LoaderError::Parse { path, source })?;

    Ok(Node::from(value))
}

/// A registered loader.
#[derive(Debug, Clone)]
pub struct LoaderDescriptor {
    /// Namespace key. Must not contain `.`.
    pub key: String,
    pub locale: LocaleTag,
    /// Route restriction; `None` applies on every route.
    pub routes: Option<Vec<RoutePattern>>,
    pub loader: Loader,
}

impl LoaderDescriptor {
    /// Creates a descriptor; the locale is normalized.
    #[must_use]
    pub fn new(key: impl Into<String>, locale: &str, loader: Loader) -> Self {
        Self {
            key: key.into(),
            locale: LocaleTag::parse(locale).unwrap_or_default(),
            routes: None,
            loader,
        }
    }

    #[must_use]
    pub fn with_routes<I, R>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoutePattern>,
    {
        self.routes = Some(routes.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if this loader applies to `route`.
    #[must_use]
    pub fn applies_to(&self, route: &str) -> bool {
        route_applies(self.routes.as_deref(), route)
    }
}

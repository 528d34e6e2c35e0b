//! Algorithm resolution and invocation
//!
//! An [`AlgorithmSpec`] is either a well-known name or a caller-supplied
//! function. [`AlgorithmAdapter::new`] resolves it once, at configuration
//! time, into a uniform asynchronous callable; unknown names fail there and
//! never reach a compression pass.

use crate::algorithms::{Algorithm, AlgorithmImpl};
use futures::future::BoxFuture;
use serde_json::Value;
use squash_types::{Bytes, CompressionOptions, Error, Result};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Error type returned by custom algorithms
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Future returned by a custom algorithm
pub type CompressFuture = BoxFuture<'static, std::result::Result<AlgorithmOutput, BoxError>>;

type CompressFn = dyn Fn(Bytes, CompressionOptions) -> CompressFuture + Send + Sync;

/// Byte-like result of an algorithm, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmOutput {
    /// Already a shared buffer
    Buffer(Bytes),
    /// Owned byte vector
    Vec(Vec<u8>),
    /// Text result, taken as its UTF-8 bytes
    Text(String),
}

impl AlgorithmOutput {
    /// Normalize into the canonical buffer type
    pub fn into_buffer(self) -> Bytes {
        match self {
            Self::Buffer(buffer) => buffer,
            Self::Vec(bytes) => Bytes::from(bytes),
            Self::Text(text) => Bytes::from(text),
        }
    }
}

impl From<Bytes> for AlgorithmOutput {
    fn from(buffer: Bytes) -> Self {
        Self::Buffer(buffer)
    }
}

impl From<Vec<u8>> for AlgorithmOutput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Vec(bytes)
    }
}

impl From<String> for AlgorithmOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Caller-supplied compression function.
///
/// The `id` stands in for the function in cache identities and must change
/// whenever the function's behaviour changes.
#[derive(Clone)]
pub struct CustomAlgorithm {
    id: String,
    func: Arc<CompressFn>,
}

impl CustomAlgorithm {
    /// Wrap an async function `(buffer, options) -> Result<output, error>`
    pub fn new<F, Fut, O, E>(id: impl Into<String>, func: F) -> Self
    where
        F: Fn(Bytes, CompressionOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<O, E>> + Send + 'static,
        O: Into<AlgorithmOutput> + 'static,
        E: Into<BoxError> + 'static,
    {
        let func = move |input: Bytes, options: CompressionOptions| -> CompressFuture {
            let pending = func(input, options);
            Box::pin(async move { pending.await.map(Into::into).map_err(Into::into) })
        };
        Self {
            id: id.into(),
            func: Arc::new(func),
        }
    }

    /// Stable identifier of the function
    pub fn id(&self) -> &str {
        &self.id
    }

    async fn call(&self, input: Bytes, options: CompressionOptions) -> Result<Bytes> {
        (self.func)(input, options)
            .await
            .map(AlgorithmOutput::into_buffer)
            .map_err(|e| Error::compression(e.to_string()))
    }
}

impl fmt::Debug for CustomAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAlgorithm")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Algorithm selection as configured
#[derive(Debug, Clone)]
pub enum AlgorithmSpec {
    /// A well-known algorithm name such as `gzip`
    Named(String),
    /// A caller-supplied function
    Custom(CustomAlgorithm),
}

impl AlgorithmSpec {
    /// Select a well-known algorithm by name
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Check if the algorithm is a caller-supplied function
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// The configured name, for named algorithms
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Custom(_) => None,
        }
    }

    /// Serializable identity used in cache keys
    pub fn identity(&self) -> Value {
        match self {
            Self::Named(name) => Value::String(name.clone()),
            Self::Custom(custom) => serde_json::json!({ "custom": custom.id() }),
        }
    }

    /// Filename template used when none is configured
    pub fn default_filename(&self) -> &'static str {
        match self.name() {
            Some("brotliCompress") => "[path][base].br",
            Some("zstdCompress") => "[path][base].zst",
            _ => "[path][base].gz",
        }
    }
}

impl Default for AlgorithmSpec {
    fn default() -> Self {
        Self::named("gzip")
    }
}

impl From<&str> for AlgorithmSpec {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<CustomAlgorithm> for AlgorithmSpec {
    fn from(custom: CustomAlgorithm) -> Self {
        Self::Custom(custom)
    }
}

enum Backend {
    Builtin(Arc<dyn Algorithm>),
    Custom(CustomAlgorithm),
}

/// Resolved algorithm with its effective options
pub struct AlgorithmAdapter {
    spec: AlgorithmSpec,
    backend: Backend,
    options: CompressionOptions,
}

impl AlgorithmAdapter {
    /// Resolve an algorithm.
    ///
    /// For named algorithms the caller's options are shallow-merged over the
    /// algorithm defaults, caller keys winning. Custom algorithms receive the
    /// caller's options untouched.
    pub fn new(spec: AlgorithmSpec, options: CompressionOptions) -> Result<Self> {
        let (backend, options) = match &spec {
            AlgorithmSpec::Named(name) => {
                let algorithm =
                    AlgorithmImpl::create(name).ok_or_else(|| Error::unknown_algorithm(name))?;
                let mut merged = algorithm.default_options();
                merged.extend(options);
                (Backend::Builtin(algorithm), merged)
            }
            AlgorithmSpec::Custom(custom) => (Backend::Custom(custom.clone()), options),
        };

        let shown = Value::Object(options.clone());
        debug!("Resolved algorithm {} with options {}", spec.identity(), shown);

        Ok(Self {
            spec,
            backend,
            options,
        })
    }

    /// The configured algorithm
    pub fn spec(&self) -> &AlgorithmSpec {
        &self.spec
    }

    /// Effective options passed to every invocation
    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    /// Compress one buffer.
    ///
    /// Built-in codecs run on the blocking pool. The result is always a
    /// canonical [`Bytes`] buffer regardless of what the algorithm produced.
    pub async fn compress(&self, input: Bytes) -> Result<Bytes> {
        match &self.backend {
            Backend::Builtin(algorithm) => {
                let algorithm = Arc::clone(algorithm);
                let options = self.options.clone();
                tokio::task::spawn_blocking(move || algorithm.compress(&input, &options))
                    .await
                    .map_err(|e| Error::other(format!("Task join error: {}", e)))?
                    .map(Bytes::from)
            }
            Backend::Custom(custom) => custom.call(input, self.options.clone()).await,
        }
    }
}

impl fmt::Debug for AlgorithmAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmAdapter")
            .field("spec", &self.spec)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

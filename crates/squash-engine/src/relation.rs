//! Relation names linking originals to their compressed assets
//!
//! The name doubles as the "already processed" marker, so it only depends
//! on the configuration and is identical across runs.

use squash_compression::AlgorithmSpec;
use squash_config::FilenameTemplate;
use squash_types::extension_of;
use xxhash_rust::xxh3::xxh3_64;

/// Relation kind for a configuration.
///
/// - named `gzip`: `gzipped`
/// - any other named algorithm: `<name>ed`
/// - custom algorithm with a static filename: `<ext>ed`, `ext` taken from
///   the template with any query removed
/// - custom algorithm with a dynamic filename: `compression-function-<hash>`
///   of the template id
///
/// The hashed form is best effort: two dynamic templates whose ids collide
/// under xxh3 share a relation name.
pub fn relation_name(algorithm: &AlgorithmSpec, filename: &FilenameTemplate) -> String {
    match (algorithm, filename) {
        (AlgorithmSpec::Custom(_), FilenameTemplate::Dynamic { id, .. }) => {
            format!("compression-function-{:016x}", xxh3_64(id.as_bytes()))
        }
        (AlgorithmSpec::Custom(_), FilenameTemplate::Static(template)) => {
            let path = template.split('?').next().unwrap_or(template);
            let base = path.rsplit('/').next().unwrap_or(path);
            let ext = extension_of(base);
            format!("{}ed", ext.get(1..).unwrap_or(""))
        }
        (AlgorithmSpec::Named(name), _) if name == "gzip" => "gzipped".to_string(),
        (AlgorithmSpec::Named(name), _) => format!("{}ed", name),
    }
}

//! Shared constants.

/// Name of the implicit global namespace, always searched last.
pub const GLOBAL_NAMESPACE: &str = "";

/// Branch name selected when no other condition of a conditional property matches.
pub const CONDITIONS_DEFAULT: &str = "conditions_default";

/// Key used for the top-level package in external build package configuration.
pub const ROOT_PACKAGE_KEY: &str = ".";

/// Length of the truncated hash prefix used for resolved graph fingerprints.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Variation axis introduced by the `os` mutator.
pub const AXIS_OS: &str = "os";

/// Variation axis introduced by the `arch` mutator.
pub const AXIS_ARCH: &str = "arch";

/// Variation axis introduced by the `link` mutator.
pub const AXIS_LINK: &str = "link";

/// Properties that describe a module's relationship to defaults and visibility
/// rather than its build configuration. Defaults propagation never merges them.
pub const NON_MERGED_PROPERTIES: &[&str] = &["defaults", "visibility", "defaults_visibility"];

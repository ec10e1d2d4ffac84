//! Global constants used throughout the packsync codebase.

/// Scope label for hooks fired against a project repository.
pub const PROJECT_SCOPE: &str = "project";

/// Scope label for hooks fired against the system repository.
pub const SYSTEM_SCOPE: &str = "system";

/// File extension used when publishing package content into a repository.
pub const PACKAGE_FILE_EXTENSION: &str = "wrap";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "PACKSYNC_CONFIG_PATH";

/// Directory under the user's home holding the configuration file.
pub const CONFIG_DIR_NAME: &str = ".packsync";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Upper bound on selection passes performed by the default resolver.
///
/// Each pass re-reads requirements contributed by the packages selected in the
/// previous pass; a stable selection is normally reached in two or three.
pub const MAX_RESOLUTION_PASSES: usize = 16;

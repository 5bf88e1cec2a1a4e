/// Prefix of repository-generated platform ids (`platform-1`, `platform-2`, ...).
pub const PLATFORM_ID_PREFIX: &str = "platform-";

/// Icon used when a platform does not name one.
pub const DEFAULT_PLATFORM_ICON: &str = "globe";

/// Brand color used when a platform color is absent or malformed.
pub const DEFAULT_PLATFORM_COLOR: &str = "#3b82f6";

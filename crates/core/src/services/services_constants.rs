/// Prefix of repository-generated service ids (`service-1`, `service-2`, ...).
pub const SERVICE_ID_PREFIX: &str = "service-";

/// Minimum order quantity applied when a new service omits it.
pub const DEFAULT_MIN_QUANTITY: i64 = 100;

/// Maximum order quantity applied when a new service omits it.
pub const DEFAULT_MAX_QUANTITY: i64 = 10_000;

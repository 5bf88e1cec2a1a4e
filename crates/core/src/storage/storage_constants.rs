/// Key holding the JSON array of platform records.
pub const PLATFORMS_KEY: &str = "social_platforms";

/// Key holding the JSON array of service records.
pub const SERVICES_KEY: &str = "social_services";

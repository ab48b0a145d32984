// Env values used by luno.
pub const LUNO_API_KEY: &str = "LUNO_API_KEY";
pub const LUNO_SECRET_KEY: &str = "LUNO_SECRET_KEY";
pub const LUNO_HOST: &str = "LUNO_HOST";
pub const LUNO_API_VERSION: &str = "LUNO_API_VERSION";

pub const DEFAULT_HOST: &str = "api.luno.io";
pub const DEFAULT_VERSION: &str = "v1";

// Query parameters shared by several resources.
pub const EXPAND: &str = "expand";
pub const AUTO_NAME: &str = "auto_name";

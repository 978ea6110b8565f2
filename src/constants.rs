/// Cookie carrying the browser-context id.
pub const CONTEXT_COOKIE: &str = "portfolio_ctx";

/// Where a successful sign-in lands without an explicit target.
pub const DEFAULT_ADMIN_LANDING: &str = "/admin/blog";

pub const LOGIN_PATH: &str = "/login";

pub const HOME_RECENT_POSTS: usize = 3;
pub const HOME_RECENT_PROJECTS: usize = 5;

pub const SIGN_IN_FAILED: &str = "Failed to sign in. Please check your credentials.";

//! Client-facing response messages.
//!
//! Category messages go into the `message` field of every response body.
//! Detail messages narrow down what happened and go into `detail`.

// Categories
pub const OK: &str = "Request completed successfully.";
pub const CREATED: &str = "Resource created successfully.";
pub const BAD_REQUEST: &str = "The request is invalid.";
pub const UNAUTHORIZED: &str = "Authentication is required.";
pub const FORBIDDEN: &str = "Access to this resource is forbidden.";
pub const NOT_FOUND: &str = "The requested resource was not found.";
pub const CONFLICT: &str = "The resource already exists.";
pub const UNSUPPORTED_MEDIA_TYPE: &str = "The request media type is not supported.";
pub const INTERNAL_SERVER_ERROR: &str =
    "An internal server error occurred. Please try again later.";

// Authentication
pub const NOT_LOGGED_IN: &str = "You are not logged in.";
pub const ALREADY_LOGIN: &str = "You are already logged in.";
pub const ACCESS_DENIED: &str = "Access is denied.";
pub const CREDENTIALS_MISMATCH: &str = "The email or password does not match.";
pub const ONLY_SUPPORTED_APPLICATION_JSON: &str = "Only application/json is supported.";
pub const MALFORMED_BODY: &str = "The request body could not be parsed.";

// Accounts
pub const SUCCESS_SIGNUP: &str = "Signed up successfully.";
pub const DUPLICATE_EMAIL: &str = "This email is already registered.";
pub const DUPLICATE_USER_ID: &str = "This user id is already taken.";
pub const USER_NOT_FOUND: &str = "The account no longer exists.";

// Articles
pub const SUCCESS_CREATE: &str = "Article created successfully.";

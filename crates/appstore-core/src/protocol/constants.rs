//! Protocol constants for the configurator purchase API.
//!
//! The meaning of several of these values is opaque, but the server rejects
//! requests that omit them or change them.

// ============================================================================
// Endpoints
// ============================================================================

/// Account authentication endpoint.
pub const AUTHENTICATE_URL: &str =
    "https://p22-buy.itunes.apple.com/WebObjects/MZFinance.woa/wa/authenticate";

/// Volume-purchase download negotiation endpoint.
pub const DOWNLOAD_URL: &str =
    "https://p25-buy.itunes.apple.com/WebObjects/MZFinance.woa/wa/volumeStoreDownloadProduct";

/// Public catalog search endpoint (JSON, unauthenticated).
pub const SEARCH_URL: &str = "https://itunes.apple.com/search";

// ============================================================================
// Headers
// ============================================================================

/// User-Agent of the desktop configurator tool.
pub const USER_AGENT: &str =
    "Configurator/2.15 (Macintosh; OS X 11.0.0; 16G29) AppleWebKit/2603.3.8";

/// Content type of every plist request body.
pub const PLIST_CONTENT_TYPE: &str = "application/x-apple-plist";

/// Identity headers. The API historically required both names.
pub const HEADER_DSID: &str = "X-Dsid";
pub const HEADER_ICLOUD_DSID: &str = "iCloud-DSID";

// ============================================================================
// Query parameters
// ============================================================================

pub const QUERY_GUID: &str = "guid";
pub const QUERY_POD: &str = "Pod";
pub const QUERY_PRH: &str = "PRH";

/// Pod routing hint for the authentication endpoint.
pub const ROUTING_POD: &str = "22";
/// Partition routing hint for the authentication endpoint.
pub const ROUTING_PRH: &str = "22";

// ============================================================================
// Login payload
// ============================================================================

pub const FIELD_APPLE_ID: &str = "appleId";
pub const FIELD_ATTEMPT: &str = "attempt";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_CREATE_SESSION: &str = "createSession";
pub const FIELD_GUID: &str = "guid";
pub const FIELD_RMP: &str = "rmp";
pub const FIELD_WHY: &str = "why";

/// Attempt counter. Always "4", regardless of how many attempts were made.
pub const LOGIN_ATTEMPT: &str = "4";
/// Requests creation of a session on the server.
pub const LOGIN_CREATE_SESSION: &str = "true";
/// Risk-management placeholder.
pub const LOGIN_RMP: &str = "0";
/// Reason code for an interactive sign-in.
pub const LOGIN_WHY: &str = "signIn";

// Login response fields
pub const RESPONSE_ACCOUNT_INFO: &str = "accountInfo";
pub const RESPONSE_APPLE_ID: &str = "appleId";
pub const RESPONSE_PASSWORD_TOKEN: &str = "passwordToken";
pub const RESPONSE_DS_PERSON_ID: &str = "dsPersonId";

// ============================================================================
// Download payload
// ============================================================================

pub const FIELD_CREDIT_DISPLAY: &str = "creditDisplay";
pub const FIELD_SALABLE_ADAM_ID: &str = "salableAdamId";

// ============================================================================
// Catalog search
// ============================================================================

pub const SEARCH_TERM: &str = "term";
pub const SEARCH_COUNTRY: &str = "country";
pub const SEARCH_ENTITY: &str = "entity";
pub const SEARCH_MEDIA: &str = "media";
pub const SEARCH_LIMIT: &str = "limit";
pub const SEARCH_SOFTWARE: &str = "software";

// ============================================================================
// Defaults
// ============================================================================

/// Region used when none is supplied.
pub const DEFAULT_REGION: &str = "US";

/// Request timeout when the caller does not configure one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Search result limit when the caller does not set one.
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

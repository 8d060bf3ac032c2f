//! Fixed service paths on a Metaweb host

/// mqlread service.
pub const READ: &str = "/api/service/mqlread";
/// Search service.
pub const SEARCH: &str = "/api/service/search";
/// Raw content download service.
pub const DOWNLOAD: &str = "/api/trans/raw";
/// Document blurb service.
pub const BLURB: &str = "/api/trans/blurb";
/// Image thumbnail service.
pub const THUMBNAIL: &str = "/api/trans/image_thumb";
/// Login service.
pub const LOGIN: &str = "/api/account/login";
/// mqlwrite service.
pub const WRITE: &str = "/api/service/mqlwrite";
/// Content upload service.
pub const UPLOAD: &str = "/api/service/upload";
/// Cache-touch service.
pub const TOUCH: &str = "/api/service/touch";

/// Largest `limit` a resource listing accepts.
pub const MAX_LISTING_ELEMENTS: i32 = 200;

/// Largest file accepted by the upload endpoint.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Room for multipart boundaries and the non-file fields on top of [`MAX_UPLOAD_BYTES`].
pub const UPLOAD_BODY_OVERHEAD: usize = 1024 * 1024;

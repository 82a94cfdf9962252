/// Named content blobs (collections and settings), JSON values.
pub const CONTENT: &str = "content";

/// Schema bookkeeping.
pub const META: &str = "meta";

/// Opaque job identifier (12 lowercase hex characters when generated by
/// [`crate::clock::UuidJobIds`]).
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A single rendered pixel value: the averaged escape iteration count.
pub type Pixel = u32;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifiers are opaque strings: generated ids for form submissions,
/// UUIDs for rows in the hosted database.
pub type RecordId = String;

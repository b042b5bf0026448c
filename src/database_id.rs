//! Type alias for database row IDs.

/// Alias for the integer type used for mapping database IDs.
///
/// User IDs get their own newtype ([crate::UserID]) because they cross the
/// auth boundary; plain row IDs such as transaction IDs use this alias.
pub type DatabaseID = i64;

use drill_core::model::{Progress, UserId};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Maps unique-constraint violations to `Conflict`, everything else to `Connection`.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
    }
    conn(e)
}

pub(crate) fn user_id_to_i64(id: UserId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("user_id overflow".into()))
}

pub(crate) fn user_id_from_i64(v: i64) -> Result<UserId, StorageError> {
    u64::try_from(v)
        .map(UserId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid user_id: {v}")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn progress_from_i64(v: i64) -> Result<Progress, StorageError> {
    Progress::new(v).map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_ids_and_out_of_range_progress() {
        assert!(user_id_from_i64(-1).is_err());
        assert_eq!(user_id_from_i64(4).unwrap(), UserId::new(4));
        assert!(progress_from_i64(101).is_err());
        assert_eq!(u32_from_i64("level", 3).unwrap(), 3);
    }
}

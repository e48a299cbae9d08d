//! Core traits shared by the domain models and service layer

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::PulseResult;

/// Primary key type for all persisted entities
pub type Id = i64;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Option<Id>;

    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }

    fn is_new_record(&self) -> bool {
        !self.is_persisted()
    }
}

/// Trait for entities with created_at/updated_at timestamps
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

/// Trait for soft-deletable entities
///
/// Soft-deleted rows must never appear in list results.
pub trait SoftDeletable {
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// Trait for entities that track who created them
pub trait Auditable {
    fn created_by_id(&self) -> Option<Id>;
}

/// Base trait for all domain entities
pub trait Entity: Identifiable + Timestamped + Send + Sync {
    /// The database table name
    const TABLE_NAME: &'static str;

    /// Human-readable type name for error messages
    const TYPE_NAME: &'static str;
}

/// Trait for service objects encapsulating one business operation
#[async_trait]
pub trait Service<Input, Output> {
    async fn call(&self, input: Input) -> PulseResult<Output>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy {
        id: Option<Id>,
    }

    impl Identifiable for Dummy {
        fn id(&self) -> Option<Id> {
            self.id
        }
    }

    #[test]
    fn test_identifiable_defaults() {
        assert!(Dummy { id: Some(1) }.is_persisted());
        assert!(Dummy { id: None }.is_new_record());
    }
}

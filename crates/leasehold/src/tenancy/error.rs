use chrono::NaiveDate;

use super::domain::{EntityKind, LeaseId, LeaseStatus};
use super::repository::StoreError;

/// Error raised by tenancy operations.
///
/// The first four variants are recoverable domain outcomes the caller is
/// expected to surface to users. `Store` marks an infrastructure failure of the
/// underlying relational store; mutating calls must not be retried blindly
/// after one.
#[derive(Debug, thiserror::Error)]
pub enum TenancyError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: String },
    #[error("conflict: {0}")]
    Conflict(ConflictReason),
    #[error("lease '{lease_id}' cannot {action} while {from}: {reason}")]
    InvalidTransition {
        lease_id: LeaseId,
        from: LeaseStatus,
        action: &'static str,
        reason: String,
    },
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(StoreError),
}

impl TenancyError {
    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Validation(_) => "validation",
            Self::Store(_) => "store_unavailable",
        }
    }
}

impl From<StoreError> for TenancyError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::UniqueViolation(constraint)
            | StoreError::ForeignKeyViolation(constraint)
            | StoreError::ExclusionViolation(constraint) => {
                Self::Conflict(ConflictReason::Constraint(constraint))
            }
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            StoreError::Unavailable(_) => Self::Store(value),
        }
    }
}

/// Invariant that would have been broken by the rejected operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictReason {
    #[error("landlord still owns {count} propert(ies)")]
    LandlordOwnsProperties { count: usize },
    #[error("property has {count} pending or active lease(s)")]
    PropertyHasLiveLeases { count: usize },
    #[error("dates overlap live lease '{existing}'")]
    OverlappingLease { existing: LeaseId },
    #[error("tenant is already a co-tenant on this lease")]
    DuplicateCoTenant,
    #[error("tenant is the primary tenant on this lease")]
    PrimaryTenant,
    #[error("storage constraint '{0}' rejected the write")]
    Constraint(&'static str),
}

/// Malformed input rejected before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
    #[error("rent must not be negative (found {0})")]
    NegativeRent(i64),
    #[error("deposit must not be negative (found {0})")]
    NegativeDeposit(i64),
    #[error("{0} must not be blank")]
    BlankField(&'static str),
    #[error("unit '{unit_id}' does not belong to property '{property_id}'")]
    UnitOutsideProperty {
        unit_id: String,
        property_id: String,
    },
}

pub type TenancyResult<T> = Result<T, TenancyError>;

use thiserror::Error;

use licensedesk_core::DomainError;

use crate::store::StoreError;

/// Failure of a facade operation: bad input or a persistence problem.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

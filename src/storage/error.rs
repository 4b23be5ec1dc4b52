use thiserror::Error;

/// Errors from a single call against the bucket API.
#[derive(Debug, Error)]
pub enum BucketError {
    #[error("object not found")]
    NotFound,
    #[error("bucket API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("bucket request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected bucket response: {0}")]
    Decode(String),
}

/// A failed entity operation. Only the operation name reaches callers; the
/// backend cause is kept as the source. Whoever handles the error logs it.
#[derive(Debug, Error)]
#[error("Failed to {operation}")]
pub struct StoreError {
    pub operation: &'static str,
    #[source]
    pub source: BucketError,
}

impl StoreError {
    pub fn new(operation: &'static str, source: BucketError) -> Self {
        Self { operation, source }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Maps bucket results onto the read-path policy: not-found is an empty
/// result, anything else is a `StoreError`.
pub(crate) trait BucketResultExt<T> {
    fn or_empty(self, operation: &'static str) -> StoreResult<T>
    where
        T: Default;
    fn optional(self, operation: &'static str) -> StoreResult<Option<T>>;
    fn or_fail(self, operation: &'static str) -> StoreResult<T>;
}

impl<T> BucketResultExt<T> for Result<T, BucketError> {
    fn or_empty(self, operation: &'static str) -> StoreResult<T>
    where
        T: Default,
    {
        match self {
            Ok(value) => Ok(value),
            Err(BucketError::NotFound) => Ok(T::default()),
            Err(err) => Err(StoreError::new(operation, err)),
        }
    }

    fn optional(self, operation: &'static str) -> StoreResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(BucketError::NotFound) => Ok(None),
            Err(err) => Err(StoreError::new(operation, err)),
        }
    }

    fn or_fail(self, operation: &'static str) -> StoreResult<T> {
        self.map_err(|err| StoreError::new(operation, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_becomes_empty() {
        let res: Result<Vec<u8>, BucketError> = Err(BucketError::NotFound);
        assert_eq!(res.or_empty("fetch articles").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_not_found_becomes_none() {
        let res: Result<u8, BucketError> = Err(BucketError::NotFound);
        assert_eq!(res.optional("fetch user").unwrap(), None);
    }

    #[test]
    fn test_other_errors_carry_operation_name() {
        let res: Result<Vec<u8>, BucketError> = Err(BucketError::Status {
            status: 500,
            message: "boom".into(),
        });
        let err = res.or_empty("fetch articles").unwrap_err();
        assert_eq!(err.operation, "fetch articles");
        assert_eq!(err.to_string(), "Failed to fetch articles");
    }

    #[test]
    fn test_write_paths_fail_on_not_found() {
        let res: Result<u8, BucketError> = Err(BucketError::NotFound);
        let err = res.or_fail("delete article").unwrap_err();
        assert!(matches!(err.source, BucketError::NotFound));
    }
}

//! Explicit success/failure container for expected failure paths.

/// Outcome of an operation that may fail for an expected, domain-level reason.
///
/// A success optionally carries a value; a failure always carries an error.
/// Violating either rule at construction, or reading the value of a failure,
/// is a programming error and panics.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T, E = String> {
    /// The operation succeeded.
    Success(Option<T>),
    /// The operation failed with an error payload.
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    /// Builds an outcome from its raw parts.
    ///
    /// # Panics
    ///
    /// Panics if `is_success` is set together with an error, or if a failure
    /// is built without one.
    pub fn new(is_success: bool, error: Option<E>, value: Option<T>) -> Self {
        match (is_success, error) {
            (true, Some(_)) => {
                panic!("InvalidOperation: a result cannot be successful and contain an error")
            }
            (false, None) => {
                panic!("InvalidOperation: a failing result needs to contain an error")
            }
            (true, None) => Self::Success(value),
            (false, Some(error)) => Self::Failure(error),
        }
    }

    /// Creates a successful outcome carrying a value.
    pub fn ok(value: T) -> Self {
        Self::Success(Some(value))
    }

    /// Creates a successful outcome without a value.
    pub fn ok_empty() -> Self {
        Self::Success(None)
    }

    /// Creates a failed outcome.
    pub fn fail(error: impl Into<E>) -> Self {
        Self::Failure(error.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Returns the success value, if one was supplied.
    ///
    /// # Panics
    ///
    /// Panics when called on a failure. Check [`Outcome::is_failure`] first or
    /// use [`Outcome::error`].
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => value.as_ref(),
            Self::Failure(_) => {
                panic!("can't get the value of an error result, use `error` instead")
            }
        }
    }

    /// Consumes the outcome, returning the success value.
    ///
    /// # Panics
    ///
    /// Panics when called on a failure.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Success(value) => value,
            Self::Failure(_) => {
                panic!("can't get the value of an error result, use `error` instead")
            }
        }
    }

    /// Returns the error payload of a failure.
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Converts into a standard `Result` so callers can use `?`.
    pub fn into_result(self) -> Result<Option<T>, E> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(error) => Err(error),
        }
    }

    /// Maps the success value, leaving failures untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self {
            Self::Success(value) => Outcome::Success(value.map(f)),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }
}

impl<E: Clone> Outcome<(), E> {
    /// Returns the first failure among `results`, or an empty success.
    ///
    /// Results are scanned in order, so the earliest failing check wins.
    pub fn combine<'a, U: 'a>(results: impl IntoIterator<Item = &'a Outcome<U, E>>) -> Self
    where
        E: 'a,
    {
        results
            .into_iter()
            .find_map(|result| result.error().cloned())
            .map_or_else(Self::ok_empty, Self::Failure)
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(error) => Self::Failure(error),
        }
    }
}

//! Constructors and aggregation helpers for `ComposeError`.

use std::path::Path;
use std::sync::Arc;

use figment::Error as FigmentError;

use super::{AggregatedErrors, ComposeError};

impl ComposeError {
    /// Collapses the problems found in one registration attempt.
    ///
    /// Returns `None` for an empty batch. A single uniquely owned error is
    /// returned as itself; a single shared error, or several errors, become
    /// [`Self::Aggregate`] in report order.
    #[must_use]
    pub fn try_aggregate<I, E>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        let mut collected: Vec<Arc<Self>> = errors.into_iter().map(Into::into).collect();
        if collected.len() > 1 {
            return Some(Self::batch(collected));
        }
        let only = collected.pop()?;
        Some(Arc::try_unwrap(only).unwrap_or_else(|shared| Self::batch(vec![shared])))
    }

    /// Like [`Self::try_aggregate`] for callers that know at least one error
    /// occurred.
    ///
    /// # Panics
    ///
    /// Panics if `errors` is empty.
    #[must_use]
    #[track_caller]
    pub fn aggregate<I, E>(errors: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        let Some(err) = Self::try_aggregate(errors) else {
            panic!("aggregate requires at least one error");
        };
        err
    }

    fn batch(errors: Vec<Arc<Self>>) -> Self {
        Self::Aggregate(Box::new(AggregatedErrors::new(errors)))
    }

    /// Construct a settings error from a [`figment::Error`].
    ///
    /// # Examples
    ///
    /// ```
    /// use component_config::ComposeError;
    /// let fe = figment::Error::from("boom");
    /// let e = ComposeError::settings(fe);
    /// assert!(matches!(e, ComposeError::Settings(_)));
    /// ```
    #[must_use]
    pub fn settings(source: FigmentError) -> Self {
        Self::Settings(Box::new(source))
    }

    /// Construct a declaration error for `path` wrapped in an [`Arc`].
    #[must_use]
    pub fn declarations<E>(path: &Path, source: E) -> Arc<Self>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Arc::new(Self::Declarations {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }

    /// Construct an unknown-class error wrapped in an [`Arc`].
    #[must_use]
    pub fn unknown_class(name: &str) -> Arc<Self> {
        Arc::new(Self::UnknownClass {
            name: name.to_owned(),
        })
    }
}

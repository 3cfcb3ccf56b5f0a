//! Moving errors between `ComposeResult` and `figment` results.
//!
//! Settings extraction yields `figment::Error`; [`ComposeResultExt`] lifts it
//! into `ComposeResult<T>`. Tests running inside `figment::Jail` go the other
//! way with `ResultIntoFigment`.
//!
//! # Examples
//!
//! ```
//! use component_config::{ComposeResult, ComposeResultExt};
//!
//! fn extract() -> ComposeResult<u16> {
//!     let figment = figment::Figment::new();
//!     figment.extract_inner::<u16>("port").into_compose()
//! }
//! assert!(extract().is_err());
//! ```

use crate::{ComposeError, ComposeResult};
use std::sync::Arc;

/// Generic extension for mapping any `Result<T, E>` with `E: Into<ComposeError>`
/// into a `ComposeResult<T>`.
pub trait ComposeResultExt<T, E> {
    /// Convert `Result<T, E>` into `ComposeResult<T>` using `Into<ComposeError>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion into `Arc<ComposeError>`.
    fn into_compose(self) -> ComposeResult<T>;
}

impl<T, E> ComposeResultExt<T, E> for Result<T, E>
where
    E: Into<ComposeError>,
{
    fn into_compose(self) -> ComposeResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}

/// Extension to convert `Result<T, Arc<ComposeError>>` into
/// `Result<T, figment::Error>` for tests running inside `figment::Jail`.
#[cfg(test)]
#[expect(
    clippy::result_large_err,
    reason = "Jail closures must return figment::Error"
)]
pub(crate) trait ResultIntoFigment<T> {
    /// Map the shared error into a `figment::Error`.
    ///
    /// # Errors
    ///
    /// Returns the wrapped figment error for unshared settings failures and
    /// an error carrying the message otherwise.
    fn to_figment(self) -> Result<T, figment::Error>;
}

#[cfg(test)]
impl<T> ResultIntoFigment<T> for Result<T, Arc<ComposeError>> {
    fn to_figment(self) -> Result<T, figment::Error> {
        self.map_err(|shared| {
            Arc::try_unwrap(shared)
                .map_or_else(|err| figment::Error::from(err.to_string()), figment::Error::from)
        })
    }
}

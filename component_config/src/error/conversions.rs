//! Conversions between `figment::Error` and `ComposeError`.

use figment::Error as FigmentError;

use super::ComposeError;

impl From<FigmentError> for ComposeError {
    fn from(err: FigmentError) -> Self {
        Self::settings(err)
    }
}

impl From<ComposeError> for FigmentError {
    /// Lets settings code running inside `figment::Jail` use `?`.
    fn from(err: ComposeError) -> Self {
        if let ComposeError::Settings(source) = err {
            return *source;
        }
        Self::from(err.to_string())
    }
}

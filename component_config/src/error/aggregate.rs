//! Several composition errors reported together.

use std::{error::Error, fmt, sync::Arc};

use super::ComposeError;

/// Errors found while validating a batch of class declarations.
///
/// Registering a batch checks every declaration before any of them is
/// accepted, so one attempt can surface several duplicates, unknown parents,
/// and cycles at once.
///
/// # Examples
///
/// ```
/// use component_config::ComposeError;
///
/// let e = ComposeError::aggregate(vec![
///     ComposeError::DuplicateClass { name: "block".into() },
///     ComposeError::UnknownParent { class: "toggle".into(), parent: "field".into() },
/// ]);
/// let ComposeError::Aggregate(errors) = e else { unreachable!() };
/// assert_eq!(errors.len(), 2);
/// assert_eq!(errors.classes().collect::<Vec<_>>(), ["block", "toggle"]);
/// ```
#[derive(Debug, Default)]
pub struct AggregatedErrors {
    errors: Vec<Arc<ComposeError>>,
}

impl AggregatedErrors {
    /// Wraps `errors` in report order.
    #[must_use]
    pub const fn new(errors: Vec<Arc<ComposeError>>) -> Self {
        Self { errors }
    }

    /// The collected errors in report order.
    pub fn iter(&self) -> impl Iterator<Item = &ComposeError> {
        self.errors.iter().map(Arc::as_ref)
    }

    /// Names of the classes the errors refer to, in report order.
    ///
    /// Cycle errors name every class on the cycle once; errors that do not
    /// concern a single class are skipped.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.iter().flat_map(|err| -> Box<dyn Iterator<Item = &str> + '_> {
            match err {
                ComposeError::DuplicateClass { name } | ComposeError::UnknownClass { name } => {
                    Box::new(std::iter::once(name.as_str()))
                }
                ComposeError::UnknownParent { class, .. } => Box::new(std::iter::once(class.as_str())),
                ComposeError::CyclicInheritance { cycle } => {
                    let members: Vec<&str> = cycle.split(" -> ").collect();
                    let unique = members.len().saturating_sub(1).max(1);
                    Box::new(members.into_iter().take(unique))
                }
                ComposeError::Declarations { .. }
                | ComposeError::Settings(_)
                | ComposeError::Aggregate(_) => Box::new(std::iter::empty()),
            }
        })
    }

    /// Number of collected errors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` when nothing was collected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for AggregatedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for err in self.iter() {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "  - {err}")?;
        }
        Ok(())
    }
}

impl Error for AggregatedErrors {}

impl IntoIterator for AggregatedErrors {
    type Item = Arc<ComposeError>;
    type IntoIter = std::vec::IntoIter<Arc<ComposeError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

//! Fragment errors.

use anime_data::FetchError;

/// Every probe for a fragment failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load fragment {name}: {cause}")]
pub struct FragmentLoadError {
    /// Fragment name.
    pub name: String,
    /// Failure of the last probe.
    #[source]
    pub cause: FetchError,
}

impl FragmentLoadError {
    /// HTTP status of the last probe, if it got a response.
    pub fn status(&self) -> Option<u16> {
        self.cause.status()
    }
}

/// Errors from building a detached component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FragmentError {
    #[error(transparent)]
    Load(#[from] FragmentLoadError),

    /// The rendered markup has no element to return.
    #[error("fragment {name} rendered no element")]
    NoElement { name: String },
}

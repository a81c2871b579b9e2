//! Remote fetch errors

use super::ModpatchError;

/// Creates a fetch failure error
pub fn failed(
    module: impl Into<String>,
    revision: impl Into<String>,
    reason: impl Into<String>,
) -> ModpatchError {
    ModpatchError::FetchFailed {
        module: module.into(),
        revision: revision.into(),
        reason: reason.into(),
    }
}

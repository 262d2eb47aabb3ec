//! The compatibility checker: decides whether an object may be used from the
//! current context.

use crate::error::{GlError, GlResult};
use crate::object::{ContextBound, ContextId, Sharing};
use std::fmt;

/// Whether an object with the given owner and sharing may be used from
/// `current`. `shares_with` answers whether `current` shares with a context.
pub fn is_compatible(
    current: ContextId,
    owner: ContextId,
    sharing: Sharing,
    shares_with: impl FnOnce(ContextId) -> bool,
) -> bool {
    match sharing {
        Sharing::SharedAcrossContexts => owner == current || shares_with(owner),
        Sharing::BoundToSingleContext => owner == current,
    }
}

pub(crate) fn check<T>(
    current: ContextId,
    object: &T,
    shares_with: impl FnOnce(ContextId) -> bool,
) -> GlResult<()>
where
    T: ContextBound + fmt::Display + ?Sized,
{
    if is_compatible(current, object.owner(), object.sharing(), shares_with) {
        Ok(())
    } else {
        Err(GlError::WrongContext {
            object: object.to_string(),
            owner: object.owner(),
            current,
        })
    }
}

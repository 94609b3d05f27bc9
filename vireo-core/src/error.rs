//! Error signaling for native engine calls.
//!
//! Two failure channels, never conflated:
//!
//! - construction-time absence: a native factory returned a null handle and
//!   the wrapper constructor yields `None` (expected in normal operation,
//!   e.g. a bad media location);
//! - operation-time failure: a native return code matched the call's failure
//!   predicate and the wrapper yields a [`VlcError`] carrying that code plus
//!   the engine's last diagnostic message.
//!
//! Policy: no call in this crate aborts the process. Every failure travels
//! one of the two channels above; binaries decide severity themselves.

use std::ffi::c_int;

use thiserror::Error;

use crate::ffi::{self, LibvlcApi};

/// Structured failure from a native engine call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("engine call failed (code {code}): {message}")]
pub struct VlcError {
    /// The native return code, verbatim.
    pub code: i32,
    /// The engine's diagnostic message at the point of failure. Empty when
    /// the engine had nothing to say.
    pub message: String,
}

impl VlcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build an error from a failed return code, capturing the engine's
    /// last diagnostic immediately. The message buffer is overwritten by
    /// subsequent engine calls, so this must run before any other call on
    /// the failing thread.
    pub(crate) fn capture(api: &LibvlcApi, code: i32) -> Self {
        let message = unsafe { ffi::copy_cstr((api.errmsg)()) }.unwrap_or_default();
        Self { code, message }
    }
}

/// Check a native return code with the default predicate: negative means
/// failure.
pub(crate) fn check(api: &LibvlcApi, code: c_int) -> Result<c_int, VlcError> {
    check_with(api, code, |c| c < 0)
}

/// Check a native return code with a per-call failure predicate.
pub(crate) fn check_with(
    api: &LibvlcApi,
    code: c_int,
    failed: impl Fn(c_int) -> bool,
) -> Result<c_int, VlcError> {
    if failed(code) {
        Err(VlcError::capture(api, code))
    } else {
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_carries_code() {
        let err = VlcError::new(-1, "no access module matched");
        assert_eq!(err.code, -1);
        assert!(err.to_string().contains("code -1"));
        assert!(err.to_string().contains("no access module matched"));
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(VlcError::new(-2, "x"), VlcError::new(-2, "x"));
        assert_ne!(VlcError::new(-2, "x"), VlcError::new(-3, "x"));
    }
}

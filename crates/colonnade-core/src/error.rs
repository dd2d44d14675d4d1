//! Error taxonomy for the core (spec.md §7).
//!
//! Everything here is recovered locally: the orchestrator logs and continues,
//! it never unwinds across an animation tick or a refresh pass. `CoreError`
//! only exists so call sites can match on *which* of the six kinds happened
//! for logging purposes -- it is deliberately not used to abort a pipeline.

use thiserror::Error;

use crate::ids::WindowHandle;

/// One of the six recoverable error kinds named in spec.md §7.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Enumeration returned nothing unexpectedly, or a frame write was rejected.
    #[error("external window service failure: {0}")]
    ExternalServiceFailure(String),

    /// `ax_ref` was invalidated between enumeration and write.
    #[error("stale handle for window {0}")]
    StaleHandle(WindowHandle),

    /// Selection pointed at a missing node, or an index was out of range.
    ///
    /// Self-healed by the refresh pipeline; constructed only for logging.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The display-link for a monitor was invalidated because it disconnected.
    #[error("monitor {0} disconnected")]
    MonitorDisconnected(crate::ids::MonitorId),

    /// A command does not apply to the active layout kind (e.g. `move_column`
    /// in a binary-partition workspace). Always a silent no-op at the call site.
    #[error("command not applicable to the active layout")]
    CommandInapplicable,

    /// The window service reported no access; the system becomes disabled.
    #[error("permission denied by window service")]
    PermissionDenied,
}

/// The crate-wide result alias for engine and model operations that can fail.
pub type WindowResult<T> = Result<T, CoreError>;

//! Opaque, totally-ordered, process-lifetime-unique identifiers.
//!
//! Every cross-component reference in this crate (controller <-> engines <->
//! model) is one of these small `Copy` handles rather than a pointer or a
//! reference, per the "arena indices, not raw pointers" design note: nothing
//! here can dangle across an animation tick.

use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! opaque_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            fn next(counter: &AtomicU64) -> Self {
                Self(counter.fetch_add(1, Ordering::Relaxed))
            }

            /// Returns the raw numeric value, for logging and IPC framing only.
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

opaque_id!(MonitorId, "Identifies a physical display for the lifetime of the process.");
opaque_id!(WorkspaceId, "Identifies a workspace for the lifetime of the process.");
opaque_id!(NodeId, "Identifies a node in either layout engine's tree.");

static MONITOR_COUNTER: AtomicU64 = AtomicU64::new(1);
static WORKSPACE_COUNTER: AtomicU64 = AtomicU64::new(1);
static NODE_COUNTER: AtomicU64 = AtomicU64::new(1);

impl MonitorId {
    /// Allocates a fresh, process-unique monitor id.
    pub fn fresh() -> Self {
        Self::next(&MONITOR_COUNTER)
    }
}

impl WorkspaceId {
    /// Allocates a fresh, process-unique workspace id.
    pub fn fresh() -> Self {
        Self::next(&WORKSPACE_COUNTER)
    }
}

impl NodeId {
    /// Allocates a fresh, process-unique node id.
    pub fn fresh() -> Self {
        Self::next(&NODE_COUNTER)
    }
}

/// A process id as reported by the window service.
pub type Pid = u32;

/// The external window service's own opaque identifier for a window.
///
/// Reused by the OS across process lifetimes, which is why [`WindowHandle`]
/// pairs it with a [`Pid`] to recover uniqueness.
pub type ExternalWindowId = u64;

/// `(pid, opaque-window-id)`. Stable across refreshes; uniqueness is the pair,
/// not the external id alone, since the OS reuses window ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowHandle {
    pub pid: Pid,
    pub window_id: ExternalWindowId,
}

impl WindowHandle {
    pub fn new(pid: Pid, window_id: ExternalWindowId) -> Self {
        Self { pid, window_id }
    }
}

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.pid, self.window_id)
    }
}

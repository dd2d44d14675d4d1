//! Workspace/monitor model (C2, spec.md §4.2).

pub mod monitor;
pub mod store;
pub mod window;
pub mod workspace;

pub use monitor::{Monitor, Orientation};
pub use store::WorkspaceMonitorModel;
pub use window::{AxRef, LayoutReason, SizeConstraints, WindowEntry};
pub use workspace::{LayoutKind, ViewportState, WorkspaceDescriptor};

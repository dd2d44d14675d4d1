//! Platform-agnostic layout engine and orchestration core.
//!
//! This crate owns every piece of state and logic that does not require
//! talking to a real window system: the workspace/monitor model, the two
//! layout engines (scrolling columns and binary partitioning), focus
//! tracking, animation, and the single-threaded orchestrator that ties them
//! together. A platform crate only needs to supply a [`service::WindowService`]
//! implementation and drive [`orchestrator::Orchestrator::run`].

pub mod animation;
pub mod binary;
pub mod clock;
pub mod command;
pub mod config;
pub mod direction;
pub mod error;
pub mod events;
pub mod focus;
pub mod ids;
pub mod ipc;
pub mod log;
pub mod model;
pub mod notify;
pub mod orchestrator;
pub mod pid;
pub mod rect;
pub mod refresh;
pub mod scrolling;
pub mod service;
pub mod settings;
pub mod spatial;

pub use animation::{AlphaAnim, MoveAnim, OffsetAnim, Spring};
pub use binary::{BinaryEngine, BinaryWorkspace};
pub use clock::{AnimationClock, Seconds, SystemClock, VirtualClock};
pub use command::Command;
pub use direction::Direction;
pub use error::{CoreError, WindowResult};
pub use focus::{FocusController, FocusOutcome};
pub use ids::{ExternalWindowId, MonitorId, NodeId, Pid, WindowHandle, WorkspaceId};
pub use model::{
    AxRef, LayoutKind, LayoutReason, Monitor, Orientation, SizeConstraints, ViewportState,
    WindowEntry, WorkspaceDescriptor, WorkspaceMonitorModel,
};
pub use notify::{Notification, NotificationSink, NullSink, RecordingSink};
pub use orchestrator::Orchestrator;
pub use rect::Rect;
pub use refresh::{schedule_refresh, spawn_display_ticker, ControllerMsg, RefreshGeneration, RefreshTrigger};
pub use scrolling::{CenterMode, HideSide, ScrollSettings, ScrollWorkspace, WorkspaceSwitchAnim};
pub use service::{apply_frames_parallel, FrameWrite, WindowService, WindowServiceEvent, WindowSnapshot};
pub use settings::{BundleRule, Settings, Struts};

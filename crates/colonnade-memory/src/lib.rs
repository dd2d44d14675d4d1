//! In-memory [`WindowService`] reference implementation.
//!
//! Every real platform backend (an accessibility bridge, a compositor
//! protocol client, ...) has to satisfy the same contract spec.md §6 draws
//! around the core: enumerate, read/write frames, raise, focus, and stream
//! events. This crate is that contract's simplest possible inhabitant --
//! no process table, no display server, just a `Mutex`-guarded registry of
//! fake windows -- so the core, the CLI, and this crate's own tests can all
//! run the full orchestrator loop without a real window system underneath.
//!
//! Grounded on the `StubService` test doubles colonnade-core's own
//! `orchestrator`/`events`/`command` test modules hand-roll locally, lifted
//! into a reusable, controllable fixture with a spawn/destroy/move surface
//! a test or a demo CLI can drive directly.

pub mod daemon;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use colonnade_core::{
    AxRef, CoreError, ExternalWindowId, Pid, Rect, SizeConstraints, WindowResult, WindowService,
    WindowServiceEvent, WindowSnapshot,
};

/// One fake window's full mutable state.
#[derive(Debug, Clone)]
struct MemoryWindow {
    pid: Pid,
    frame: Rect,
    title: Option<String>,
    bundle_id: Option<String>,
    alpha: f32,
    fullscreen: bool,
    min_size: (i32, i32),
    max_size: Option<(i32, i32)>,
}

#[derive(Debug, Default)]
struct State {
    windows: HashMap<ExternalWindowId, MemoryWindow>,
    events: VecDeque<WindowServiceEvent>,
}

/// An in-memory stand-in for a real window system.
///
/// `window_id` and `AxRef` are the same number here (there is no separate
/// accessibility-object identity to go stale independently of the window
/// itself), which is also exactly what every `StubService` in
/// `colonnade-core`'s own tests assumes.
#[derive(Debug, Default)]
pub struct MemoryService {
    state: Mutex<State>,
    next_id: AtomicU64,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new window and queues a `Created` event for it, returning
    /// the id a caller can use with the rest of this type's control surface.
    pub fn spawn_window(&self, pid: Pid, frame: Rect) -> ExternalWindowId {
        self.spawn_window_with(pid, frame, None, None)
    }

    pub fn spawn_window_with(
        &self,
        pid: Pid,
        frame: Rect,
        title: Option<String>,
        bundle_id: Option<String>,
    ) -> ExternalWindowId {
        let window_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut state = self.state.lock().unwrap();
        state.windows.insert(
            window_id,
            MemoryWindow {
                pid,
                frame,
                title,
                bundle_id,
                alpha: 1.0,
                fullscreen: false,
                min_size: (0, 0),
                max_size: None,
            },
        );
        state.events.push_back(WindowServiceEvent::Created { window_id, pid });
        colonnade_core::log_info!("memory service: spawned window_id={window_id} pid={pid}");
        window_id
    }

    /// Removes a window and queues a `Destroyed` event, mirroring how a real
    /// backend would report a process tearing its window down.
    pub fn destroy_window(&self, window_id: ExternalWindowId) {
        let mut state = self.state.lock().unwrap();
        if state.windows.remove(&window_id).is_some() {
            state.events.push_back(WindowServiceEvent::Destroyed { window_id });
        }
    }

    /// Moves/resizes a window as if the user dragged it, queuing the matching
    /// `Moved`/`Resized` event(s) rather than going through `set_frame`
    /// (which is the orchestrator's own write path and queues nothing).
    pub fn user_move_resize(&self, window_id: ExternalWindowId, frame: Rect) {
        let mut state = self.state.lock().unwrap();
        let Some(window) = state.windows.get_mut(&window_id) else { return };
        let moved = window.frame.x != frame.x || window.frame.y != frame.y;
        let resized = window.frame.width != frame.width || window.frame.height != frame.height;
        window.frame = frame;
        if moved {
            state.events.push_back(WindowServiceEvent::Moved { window_id });
        }
        if resized {
            state.events.push_back(WindowServiceEvent::Resized { window_id });
        }
    }

    pub fn set_title(&self, window_id: ExternalWindowId, title: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        if let Some(window) = state.windows.get_mut(&window_id) {
            window.title = Some(title.into());
            state.events.push_back(WindowServiceEvent::TitleChanged { window_id });
        }
    }

    pub fn set_size_constraints(&self, window_id: ExternalWindowId, min_size: (i32, i32), max_size: Option<(i32, i32)>) {
        let mut state = self.state.lock().unwrap();
        if let Some(window) = state.windows.get_mut(&window_id) {
            window.min_size = min_size;
            window.max_size = max_size;
        }
    }

    /// Queues a `FrontAppChanged` event, simulating an app switch.
    pub fn activate_app(&self, pid: Pid) {
        self.state.lock().unwrap().events.push_back(WindowServiceEvent::FrontAppChanged { pid });
    }

    pub fn hide_app(&self, pid: Pid) {
        self.state.lock().unwrap().events.push_back(WindowServiceEvent::AppHidden { pid });
    }

    pub fn unhide_app(&self, pid: Pid) {
        self.state.lock().unwrap().events.push_back(WindowServiceEvent::AppUnhidden { pid });
    }

    /// Every window currently tracked, for assertions in tests that embed
    /// this service directly rather than going through the trait object.
    pub fn snapshot_of(&self, window_id: ExternalWindowId) -> Option<WindowSnapshot> {
        self.state.lock().unwrap().windows.get(&window_id).map(|w| to_snapshot(window_id, w))
    }
}

fn to_snapshot(window_id: ExternalWindowId, window: &MemoryWindow) -> WindowSnapshot {
    WindowSnapshot {
        window_id,
        pid: window.pid,
        ax_ref: AxRef(window_id),
        frame: window.frame,
        bundle_id: window.bundle_id.clone(),
        title: window.title.clone(),
    }
}

impl WindowService for MemoryService {
    fn query_all_visible(&self) -> WindowResult<Vec<WindowSnapshot>> {
        let state = self.state.lock().unwrap();
        let mut snapshots: Vec<WindowSnapshot> =
            state.windows.iter().map(|(id, w)| to_snapshot(*id, w)).collect();
        snapshots.sort_by_key(|s| s.window_id);
        Ok(snapshots)
    }

    fn window_info(&self, window_id: ExternalWindowId) -> Option<WindowSnapshot> {
        self.snapshot_of(window_id)
    }

    fn window_bounds(&self, ax_ref: AxRef) -> Option<Rect> {
        self.state.lock().unwrap().windows.get(&ax_ref.0).map(|w| w.frame)
    }

    fn window_title(&self, ax_ref: AxRef) -> Option<String> {
        self.state.lock().unwrap().windows.get(&ax_ref.0).and_then(|w| w.title.clone())
    }

    fn set_frame(&self, ax_ref: AxRef, rect: Rect) -> WindowResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.windows.get_mut(&ax_ref.0) {
            Some(window) => {
                window.frame = rect;
                Ok(())
            }
            None => Err(CoreError::StaleHandle(colonnade_core::WindowHandle::new(0, ax_ref.0))),
        }
    }

    fn set_origin_via_compositor(&self, window_id: ExternalWindowId, point: (i32, i32)) -> WindowResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.windows.get_mut(&window_id) {
            Some(window) => {
                window.frame.x = point.0;
                window.frame.y = point.1;
                Ok(())
            }
            None => Err(CoreError::ExternalServiceFailure(format!("unknown window {window_id}"))),
        }
    }

    fn set_alpha(&self, window_id: ExternalWindowId, alpha: f32) -> WindowResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.windows.get_mut(&window_id) {
            Some(window) => {
                window.alpha = alpha;
                Ok(())
            }
            None => Err(CoreError::ExternalServiceFailure(format!("unknown window {window_id}"))),
        }
    }

    fn raise(&self, ax_ref: AxRef) -> WindowResult<()> {
        if self.state.lock().unwrap().windows.contains_key(&ax_ref.0) {
            Ok(())
        } else {
            Err(CoreError::StaleHandle(colonnade_core::WindowHandle::new(0, ax_ref.0)))
        }
    }

    fn focus(&self, pid: Pid, window_id: ExternalWindowId, _ax_ref: AxRef) -> WindowResult<()> {
        if self.state.lock().unwrap().windows.contains_key(&window_id) {
            colonnade_core::log_debug!("memory service: focus window_id={window_id} pid={pid}");
            Ok(())
        } else {
            Err(CoreError::ExternalServiceFailure(format!("unknown window {window_id}")))
        }
    }

    fn is_fullscreen(&self, ax_ref: AxRef) -> bool {
        self.state.lock().unwrap().windows.get(&ax_ref.0).map(|w| w.fullscreen).unwrap_or(false)
    }

    fn set_native_fullscreen(&self, ax_ref: AxRef, enabled: bool) -> WindowResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.windows.get_mut(&ax_ref.0) {
            Some(window) => {
                window.fullscreen = enabled;
                Ok(())
            }
            None => Err(CoreError::StaleHandle(colonnade_core::WindowHandle::new(0, ax_ref.0))),
        }
    }

    fn size_constraints(&self, ax_ref: AxRef, _current_size: Option<(i32, i32)>) -> SizeConstraints {
        self.state
            .lock()
            .unwrap()
            .windows
            .get(&ax_ref.0)
            .map(|w| SizeConstraints { min_size: w.min_size, max_size: w.max_size })
            .unwrap_or(SizeConstraints { min_size: (0, 0), max_size: None })
    }

    fn poll_events(&self) -> Vec<WindowServiceEvent> {
        let mut state = self.state.lock().unwrap();
        state.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_window_is_visible_and_queues_a_created_event() {
        // Arrange
        let service = MemoryService::new();

        // Act
        let id = service.spawn_window(1, Rect::new(0, 0, 800, 600));

        // Assert
        let visible = service.query_all_visible().unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].window_id, id);
        assert_eq!(service.poll_events(), vec![WindowServiceEvent::Created { window_id: id, pid: 1 }]);
    }

    #[test]
    fn poll_events_drains_and_does_not_repeat() {
        // Arrange
        let service = MemoryService::new();
        let id = service.spawn_window(1, Rect::new(0, 0, 800, 600));
        service.poll_events();

        // Act
        service.destroy_window(id);
        let events = service.poll_events();

        // Assert
        assert_eq!(events, vec![WindowServiceEvent::Destroyed { window_id: id }]);
        assert!(service.poll_events().is_empty());
    }

    #[test]
    fn destroyed_window_disappears_from_enumeration() {
        // Arrange
        let service = MemoryService::new();
        let id = service.spawn_window(1, Rect::new(0, 0, 800, 600));

        // Act
        service.destroy_window(id);

        // Assert
        assert!(service.query_all_visible().unwrap().is_empty());
    }

    #[test]
    fn set_frame_on_an_unknown_handle_reports_a_stale_handle() {
        // Arrange
        let service = MemoryService::new();

        // Act
        let result = service.set_frame(AxRef(999), Rect::new(0, 0, 10, 10));

        // Assert
        assert!(matches!(result, Err(CoreError::StaleHandle(_))));
    }

    #[test]
    fn user_move_resize_queues_moved_and_resized_separately() {
        // Arrange
        let service = MemoryService::new();
        let id = service.spawn_window(1, Rect::new(0, 0, 800, 600));
        service.poll_events();

        // Act: only the origin changes
        service.user_move_resize(id, Rect::new(10, 0, 800, 600));
        let after_move = service.poll_events();

        // Act: only the size changes
        service.user_move_resize(id, Rect::new(10, 0, 900, 600));
        let after_resize = service.poll_events();

        // Assert
        assert_eq!(after_move, vec![WindowServiceEvent::Moved { window_id: id }]);
        assert_eq!(after_resize, vec![WindowServiceEvent::Resized { window_id: id }]);
    }

    #[test]
    fn fullscreen_flag_round_trips() {
        // Arrange
        let service = MemoryService::new();
        let id = service.spawn_window(1, Rect::new(0, 0, 800, 600));

        // Act
        service.set_native_fullscreen(AxRef(id), true).unwrap();

        // Assert
        assert!(service.is_fullscreen(AxRef(id)));
    }
}

//! Event handler (C7, spec.md §4.7).
//!
//! Grounded on the teacher's `tiling::event_handler`: a single large match
//! over the service's event enum, each arm logging then delegating into an
//! orchestrator method, with unhandled variants (none here) falling through
//! to a no-op.

use crate::orchestrator::Orchestrator;
use crate::refresh::RefreshTrigger;
use crate::service::WindowServiceEvent;

impl Orchestrator {
    pub fn handle_event(&mut self, event: WindowServiceEvent) {
        match event {
            WindowServiceEvent::Created { window_id, pid } => {
                crate::log_info!("window created: pid={pid} window_id={window_id}");
                self.request_refresh(RefreshTrigger::AxWindowCreated);
            }
            WindowServiceEvent::Destroyed { window_id } => {
                crate::log_info!("window destroyed: window_id={window_id}");
                self.forget_window_by_window_id(window_id);
                self.incremental_refresh();
            }
            WindowServiceEvent::Closed { window_id } => {
                crate::log_info!("window closed: window_id={window_id}");
                self.forget_window_by_window_id(window_id);
                self.incremental_refresh();
            }
            WindowServiceEvent::Moved { window_id } => {
                crate::log_debug!("window moved: window_id={window_id}");
                self.request_refresh(RefreshTrigger::AxWindowChanged);
            }
            WindowServiceEvent::Resized { window_id } => {
                crate::log_debug!("window resized: window_id={window_id}");
                self.request_refresh(RefreshTrigger::AxWindowChanged);
            }
            WindowServiceEvent::TitleChanged { window_id } => {
                crate::log_debug!("window title changed: window_id={window_id}");
            }
            WindowServiceEvent::FrontAppChanged { pid } => {
                crate::log_info!("front app changed: pid={pid}");
                self.handle_front_app_changed(pid);
            }
            WindowServiceEvent::AppHidden { pid } => {
                crate::log_info!("app hidden: pid={pid}");
                self.hide_app(pid);
                self.incremental_refresh();
            }
            WindowServiceEvent::AppUnhidden { pid } => {
                crate::log_info!("app unhidden: pid={pid}");
                self.unhide_app(pid);
                self.incremental_refresh();
            }
        }
    }

    /// spec.md §4.7 `front_app_changed`: refocuses the frontmost tiled window
    /// belonging to `pid` if one exists, otherwise records that focus has
    /// moved to an app the core does not manage.
    fn handle_front_app_changed(&mut self, pid: crate::ids::Pid) {
        let candidate = self.model().entries_for_pid(pid).first().map(|e| e.handle);
        match candidate {
            Some(handle) => {
                self.set_non_managed_focus(false);
                self.focus_window(handle);
            }
            None => {
                self.set_non_managed_focus(true);
                self.clear_focus();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use crate::error::WindowResult;
    use crate::ids::{ExternalWindowId, Pid, WindowHandle};
    use crate::model::{AxRef, SizeConstraints};
    use crate::model::Monitor;
    use crate::rect::Rect;
    use crate::service::{WindowService, WindowSnapshot};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct StubService {
        snapshots: Mutex<Vec<WindowSnapshot>>,
    }

    impl WindowService for StubService {
        fn query_all_visible(&self) -> WindowResult<Vec<WindowSnapshot>> {
            Ok(self.snapshots.lock().unwrap().clone())
        }
        fn window_info(&self, _window_id: ExternalWindowId) -> Option<WindowSnapshot> {
            None
        }
        fn window_bounds(&self, _ax_ref: AxRef) -> Option<Rect> {
            None
        }
        fn window_title(&self, _ax_ref: AxRef) -> Option<String> {
            None
        }
        fn set_frame(&self, _ax_ref: AxRef, _rect: Rect) -> WindowResult<()> {
            Ok(())
        }
        fn set_origin_via_compositor(&self, _window_id: ExternalWindowId, _point: (i32, i32)) -> WindowResult<()> {
            Ok(())
        }
        fn set_alpha(&self, _window_id: ExternalWindowId, _alpha: f32) -> WindowResult<()> {
            Ok(())
        }
        fn raise(&self, _ax_ref: AxRef) -> WindowResult<()> {
            Ok(())
        }
        fn focus(&self, _pid: Pid, _window_id: ExternalWindowId, _ax_ref: AxRef) -> WindowResult<()> {
            Ok(())
        }
        fn is_fullscreen(&self, _ax_ref: AxRef) -> bool {
            false
        }
        fn set_native_fullscreen(&self, _ax_ref: AxRef, _enabled: bool) -> WindowResult<()> {
            Ok(())
        }
        fn size_constraints(&self, _ax_ref: AxRef, _current_size: Option<(i32, i32)>) -> SizeConstraints {
            SizeConstraints { min_size: (0, 0), max_size: None }
        }
        fn poll_events(&self) -> Vec<WindowServiceEvent> {
            Vec::new()
        }
    }

    fn snapshot(pid: u32, window_id: u64, frame: Rect) -> WindowSnapshot {
        WindowSnapshot { window_id, pid, ax_ref: AxRef(window_id), frame, bundle_id: None, title: None }
    }

    #[test]
    fn destroyed_event_forgets_the_window_immediately() {
        let service = Box::new(StubService {
            snapshots: Mutex::new(vec![snapshot(1, 1, Rect::new(0, 0, 800, 600))]),
        });
        let (mut orchestrator, _rx) = Orchestrator::new(service, std::sync::Arc::new(VirtualClock::new()));
        orchestrator.add_monitor(Monitor::new(1, "Main", Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1080)));
        orchestrator.full_refresh();

        orchestrator.handle_event(WindowServiceEvent::Destroyed { window_id: 1 });

        assert_eq!(orchestrator.focused_handle(), None);
    }

    #[test]
    fn app_hidden_then_unhidden_round_trips_the_window_back_into_layout() {
        let service = Box::new(StubService {
            snapshots: Mutex::new(vec![snapshot(1, 1, Rect::new(0, 0, 800, 600))]),
        });
        let (mut orchestrator, _rx) = Orchestrator::new(service, std::sync::Arc::new(VirtualClock::new()));
        orchestrator.add_monitor(Monitor::new(1, "Main", Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1080)));
        orchestrator.full_refresh();
        let handle = WindowHandle::new(1, 1);

        orchestrator.handle_event(WindowServiceEvent::AppHidden { pid: 1 });
        assert_eq!(orchestrator.model().entry(handle).map(|e| e.is_standard()), Some(false));

        orchestrator.handle_event(WindowServiceEvent::AppUnhidden { pid: 1 });
        assert_eq!(orchestrator.model().entry(handle).map(|e| e.is_standard()), Some(true));
    }

    #[test]
    fn front_app_changed_to_an_untracked_pid_marks_non_managed_focus() {
        let service = Box::new(StubService::default());
        let (mut orchestrator, _rx) = Orchestrator::new(service, std::sync::Arc::new(VirtualClock::new()));
        orchestrator.add_monitor(Monitor::new(1, "Main", Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1080)));

        orchestrator.handle_event(WindowServiceEvent::FrontAppChanged { pid: 999 });

        assert_eq!(orchestrator.focused_handle(), None);
    }
}

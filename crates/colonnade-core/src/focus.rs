//! Focus controller (C5, spec.md §4.5).

use std::collections::HashMap;

use crate::clock::Seconds;
use crate::ids::{WindowHandle, WorkspaceId};

/// Minimum interval between two `focus_window` calls for the *same* handle
/// before the second is treated as a debounce no-op (spec.md §4.5).
const REFOCUS_DEBOUNCE: Seconds = 0.016;

/// Holds `focused_handle`, per-workspace `last_focused` memory, and the
/// non-managed-focus / app-fullscreen flags spec.md §4.5 names.
#[derive(Debug, Default)]
pub struct FocusController {
    focused_handle: Option<WindowHandle>,
    last_focused: HashMap<WorkspaceId, WindowHandle>,
    non_managed_focus: bool,
    app_fullscreen: bool,
    /// Set while `perform_focus` is in flight; any focus requested for a
    /// different handle while this is set is remembered in `deferred`.
    pending: Option<(WindowHandle, Seconds)>,
    deferred: Option<WindowHandle>,
}

/// What `focus_window` decided to do this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    /// Debounced: the same handle was just focused, ignore.
    Debounced,
    /// Another focus is in flight; this handle is now the deferred target.
    Deferred,
    /// `perform_focus` ran synchronously and succeeded.
    Applied,
    /// `perform_focus` ran synchronously and failed.
    Failed,
}

impl FocusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused_handle(&self) -> Option<WindowHandle> {
        self.focused_handle
    }

    pub fn last_focused(&self, ws: WorkspaceId) -> Option<WindowHandle> {
        self.last_focused.get(&ws).copied()
    }

    pub fn is_non_managed_focus(&self) -> bool {
        self.non_managed_focus
    }

    pub fn set_non_managed_focus(&mut self, value: bool) {
        self.non_managed_focus = value;
    }

    pub fn is_app_fullscreen(&self) -> bool {
        self.app_fullscreen
    }

    pub fn set_app_fullscreen(&mut self, value: bool) {
        self.app_fullscreen = value;
    }

    pub fn is_focus_operation_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the current focused handle without touching per-workspace memory.
    pub fn clear(&mut self) {
        self.focused_handle = None;
    }

    /// spec.md §4.5 `focus_window(handle, workspace, perform_focus, on_deferred)`.
    ///
    /// `perform_focus` is invoked synchronously here (the crate has no async
    /// runtime, see SPEC_FULL.md's concurrency model); its result never
    /// leaves `is_focus_operation_pending` set, even on failure.
    pub fn focus_window(
        &mut self,
        handle: WindowHandle,
        workspace: WorkspaceId,
        now: Seconds,
        perform_focus: impl FnOnce(WindowHandle) -> bool,
        on_deferred: impl FnOnce(WindowHandle),
    ) -> FocusOutcome {
        if let Some((pending_handle, pending_at)) = self.pending {
            if pending_handle == handle && now - pending_at < REFOCUS_DEBOUNCE {
                return FocusOutcome::Debounced;
            }
            self.deferred = Some(handle);
            return FocusOutcome::Deferred;
        }

        if self.focused_handle == Some(handle) && self.last_focus_at(handle).map(|at| now - at < REFOCUS_DEBOUNCE).unwrap_or(false) {
            return FocusOutcome::Debounced;
        }

        self.pending = Some((handle, now));
        let ok = perform_focus(handle);
        self.pending = None;

        if ok {
            self.focused_handle = Some(handle);
            self.last_focused.insert(workspace, handle);
            self.non_managed_focus = false;
        }

        if let Some(deferred) = self.deferred.take() {
            if deferred != handle {
                on_deferred(deferred);
            }
        }

        if ok { FocusOutcome::Applied } else { FocusOutcome::Failed }
    }

    fn last_focus_at(&self, handle: WindowHandle) -> Option<Seconds> {
        self.pending.filter(|(h, _)| *h == handle).map(|(_, at)| at)
    }

    /// spec.md §4.5 `ensure_focused_handle_valid`. `is_entry_in_workspace`
    /// and `first_entry_in_workspace` are thin queries into C2; `focus_fn`
    /// is the same `perform_focus` closure `focus_window` takes.
    pub fn ensure_focused_handle_valid(
        &mut self,
        ws: WorkspaceId,
        is_entry_in_workspace: impl Fn(WindowHandle, WorkspaceId) -> bool,
        first_entry_in_workspace: impl Fn(WorkspaceId) -> Option<WindowHandle>,
        focus_fn: impl FnOnce(WindowHandle) -> bool,
    ) {
        if let Some(current) = self.focused_handle {
            if is_entry_in_workspace(current, ws) {
                self.last_focused.insert(ws, current);
                return;
            }
        }

        if let Some(remembered) = self.last_focused.get(&ws).copied() {
            if is_entry_in_workspace(remembered, ws) {
                if focus_fn(remembered) {
                    self.focused_handle = Some(remembered);
                }
                return;
            }
        }

        if let Some(first) = first_entry_in_workspace(ws) {
            if focus_fn(first) {
                self.focused_handle = Some(first);
                self.last_focused.insert(ws, first);
            }
            return;
        }

        self.focused_handle = None;
    }

    /// spec.md §4.5 `handle_window_removed`.
    pub fn handle_window_removed(&mut self, handle: WindowHandle, ws: Option<WorkspaceId>) {
        if self.focused_handle == Some(handle) {
            self.focused_handle = None;
        }
        if let Some((pending_handle, _)) = self.pending {
            if pending_handle == handle {
                self.pending = None;
            }
        }
        if self.deferred == Some(handle) {
            self.deferred = None;
        }
        if let Some(ws) = ws {
            if self.last_focused.get(&ws) == Some(&handle) {
                self.last_focused.remove(&ws);
            }
        } else {
            self.last_focused.retain(|_, h| *h != handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(n: u64) -> WindowHandle {
        WindowHandle::new(1, n)
    }

    #[test]
    fn focus_window_applies_and_remembers_last_focused() {
        let mut focus = FocusController::new();
        let ws = WorkspaceId::fresh();

        let outcome = focus.focus_window(handle(1), ws, 0.0, |_| true, |_| {});

        assert_eq!(outcome, FocusOutcome::Applied);
        assert_eq!(focus.focused_handle(), Some(handle(1)));
        assert_eq!(focus.last_focused(ws), Some(handle(1)));
    }

    #[test]
    fn focus_window_never_leaves_pending_set_on_failure() {
        let mut focus = FocusController::new();
        let ws = WorkspaceId::fresh();

        let outcome = focus.focus_window(handle(1), ws, 0.0, |_| false, |_| {});

        assert_eq!(outcome, FocusOutcome::Failed);
        assert!(!focus.is_focus_operation_pending());
        assert_eq!(focus.focused_handle(), None);
    }

    #[test]
    fn ensure_focused_handle_valid_falls_back_to_last_focused() {
        let mut focus = FocusController::new();
        let ws = WorkspaceId::fresh();
        focus.focus_window(handle(1), ws, 0.0, |_| true, |_| {});
        focus.handle_window_removed(handle(1), None);
        // last_focused still says handle(1) until ensure_focused_handle_valid re-derives it.
        focus.last_focused.insert(ws, handle(1));

        let mut focused_target = None;
        focus.ensure_focused_handle_valid(
            ws,
            |h, _| h == handle(1),
            |_| None,
            |h| {
                focused_target = Some(h);
                true
            },
        );

        assert_eq!(focused_target, Some(handle(1)));
        assert_eq!(focus.focused_handle(), Some(handle(1)));
    }

    #[test]
    fn handle_window_removed_clears_matching_focus() {
        let mut focus = FocusController::new();
        let ws = WorkspaceId::fresh();
        focus.focus_window(handle(1), ws, 0.0, |_| true, |_| {});

        focus.handle_window_removed(handle(1), Some(ws));

        assert_eq!(focus.focused_handle(), None);
        assert_eq!(focus.last_focused(ws), None);
    }
}

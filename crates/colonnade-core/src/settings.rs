//! The orchestrator's live settings snapshot (spec.md §4.9).
//!
//! Read-only from the core's point of view -- an external store owns
//! persistence (spec.md §6 "Persisted state: None owned by the core").
//! Shaped with `serde` + `#[serde(default)]` the way the teacher's own
//! `config` module is, so a CLI-side loader can deserialize a TOML file
//! straight into this struct.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::LayoutKind;

/// Per-edge outer margin reserved on a monitor (spec.md glossary "Strut").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Struts {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Default for Struts {
    fn default() -> Self {
        Self { left: 10, top: 10, right: 10, bottom: 10 }
    }
}

impl Struts {
    pub fn as_tuple(&self) -> (i32, i32, i32, i32) {
        (self.left, self.top, self.right, self.bottom)
    }
}

/// Per-application-bundle rule (spec.md §4.9 "per-bundle rules").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleRule {
    pub always_float: bool,
    pub assign_to_workspace: Option<String>,
    pub min_width: Option<i32>,
    pub min_height: Option<i32>,
}

/// The live settings snapshot the orchestrator reads on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gap: i32,
    pub outer_struts: Struts,
    pub animations_enabled: bool,
    pub focus_follows_mouse: bool,
    pub infinite_loop: bool,
    pub always_center_single_column: bool,
    /// `layout_kind` assigned to workspaces created by name, keyed by name.
    pub workspace_layout_kind: HashMap<String, LayoutKind>,
    pub bundle_rules: HashMap<String, BundleRule>,
    /// Name of the workspace `resolve_workspace_for_new_window` falls back to
    /// (spec.md §4.9 step 4), resolved to an id at call time.
    pub fallback_workspace_name: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gap: 10,
            outer_struts: Struts::default(),
            animations_enabled: true,
            focus_follows_mouse: false,
            infinite_loop: false,
            always_center_single_column: true,
            workspace_layout_kind: HashMap::new(),
            bundle_rules: HashMap::new(),
            fallback_workspace_name: None,
        }
    }
}

impl Settings {
    pub fn bundle_rule(&self, bundle_id: &str) -> Option<&BundleRule> {
        self.bundle_rules.get(bundle_id)
    }

    pub fn layout_kind_for(&self, workspace_name: &str) -> LayoutKind {
        self.workspace_layout_kind.get(workspace_name).copied().unwrap_or_default()
    }
}

//! Generates the default `config.toml` contents with explanatory comments.
//!
//! Grounded on the teacher's `config::template_config::generate_config`:
//! a raw string literal documenting every field, used by `colonnade init`
//! to write a starter file a user can immediately edit.

/// Generates the default `config.toml` contents.
pub fn generate_config() -> String {
    r##"# Colonnade configuration
# Location: <platform config dir>/colonnade/config.toml

# Gap in pixels between windows and screen edges.
gap = 10

# Whether spring-based animations (window appear/move/resize, column
# focus shift) are enabled. Disable for an instant, no-animation layout.
animations_enabled = true

# Move focus to whatever window is under the cursor without clicking.
focus_follows_mouse = false

# Whether FocusDirection wraps around at the last column instead of
# stopping there.
infinite_loop = false

# Center the single remaining column on a workspace instead of pinning
# it to the left edge.
always_center_single_column = true

# Name of the workspace newly created windows fall back to when no
# bundle rule or existing-pid rule assigns one and the target monitor
# has no active workspace yet. Leave unset to always create a fresh
# per-monitor workspace instead.
# fallback_workspace_name = "main"

[outer_struts]
# Per-edge margin reserved on every monitor, in pixels.
left = 10
top = 10
right = 10
bottom = 10

# Per-application rules, keyed by bundle/app id. Example:
# [bundle_rules."com.example.app"]
# always_float = true
# assign_to_workspace = "chat"
# min_width = 400
# min_height = 300

# Layout kind assigned to workspaces created by name. Example:
# [workspace_layout_kind]
# main = "scroll"
# editor = "binary"
"##
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn generated_template_parses_back_into_default_settings() {
        // Arrange
        let text = generate_config();
        // Act
        let settings: Settings = toml::from_str(&text).expect("template must parse");
        // Assert: every line in the template is commented out except the
        // handful of top-level scalars and the outer_struts table, so the
        // round trip should equal plain defaults.
        assert_eq!(settings, Settings::default());
    }
}

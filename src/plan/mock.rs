//! Offline planner: a fixed, dependency-ordered template per feature.
//!
//! Used by `stagger plan --mock` to exercise the whole rollout without a
//! model. Output has the same raw shape a model would return, so it goes
//! through the same builder checks.

use serde_json::{json, Value};

const FEATURE_PREFIX: &str = "# Feature:";

/// Feature name from the first `# Feature:` line, or `Unknown Feature`.
#[must_use]
pub fn feature_name(spec: &str) -> String {
    spec.lines()
        .find_map(|line| line.strip_prefix(FEATURE_PREFIX))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown Feature")
        .to_string()
}

fn body(summary: &str, criteria: &[&str], done: &[&str]) -> String {
    let mut out = format!("## Description\n{summary}\n\n## Acceptance Criteria\n");
    for item in criteria {
        out.push_str(&format!("- [ ] {item}\n"));
    }
    out.push_str("\n## Definition of Done\n");
    for item in done {
        out.push_str(&format!("- [ ] {item}\n"));
    }
    out
}

/// Candidate tasks for the feature described by `spec`.
///
/// Schema, then service, then API, then UI; documentation waits on the API
/// and the UI and is left for a human.
#[must_use]
pub fn mock_plan(spec: &str) -> Vec<Value> {
    let feature = feature_name(spec);
    vec![
        json!({
            "title": format!("Update database schema for {feature}"),
            "body": body(
                &format!("Add the storage changes needed to support {feature}."),
                &["Write a migration", "Add indexes for the new queries", "Write database tests"],
                &["Migration runs cleanly", "All tests pass"],
            ),
            "labels": ["infra", "p2"],
            "assignees": [],
            "ai_ready": true,
            "dependencies": [],
        }),
        json!({
            "title": format!("Add service layer for {feature}"),
            "body": body(
                &format!("Implement the business logic for {feature}."),
                &["Implement the service", "Validate inputs", "Write unit tests"],
                &["All tests pass", "Errors are handled and logged"],
            ),
            "labels": ["api", "p2"],
            "assignees": [],
            "ai_ready": true,
            "dependencies": [1],
        }),
        json!({
            "title": format!("Create API endpoint for {feature}"),
            "body": body(
                &format!("Expose {feature} through the backend API."),
                &["Add routing and request validation", "Write integration tests", "Update the API reference"],
                &["All tests pass", "Endpoint documented"],
            ),
            "labels": ["api", "p1"],
            "assignees": [],
            "ai_ready": true,
            "dependencies": [2],
        }),
        json!({
            "title": format!("Create UI components for {feature}"),
            "body": body(
                &format!("Build the user-facing screens for {feature}."),
                &["Add the components", "Show loading and error states", "Write component tests"],
                &["All tests pass", "Accessibility requirements met"],
            ),
            "labels": ["ui", "p1"],
            "assignees": [],
            "ai_ready": true,
            "dependencies": [3],
        }),
        json!({
            "title": format!("Add documentation for {feature}"),
            "body": body(
                &format!("Document {feature} for users and developers."),
                &["Update the user guide", "Add examples", "Update the README if needed"],
                &["Examples work as written", "Reviewed by the team"],
            ),
            "labels": ["docs", "p3"],
            "assignees": [],
            "ai_ready": false,
            "dependencies": [3, 4],
        }),
    ]
}

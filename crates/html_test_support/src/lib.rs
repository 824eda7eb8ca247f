//! Test helpers shared by the workspace: DOM outlines for snapshot-style
//! assertions and TOML scenario manifests for end-to-end session tests.

pub mod outline;
pub mod scenario;

use std::fmt::Write;

pub use outline::{OutlineOptions, outline};
pub use scenario::{Expectation, Scenario, Step, load_scenarios};

/// Line-by-line report of where two outlines differ, for assertion messages.
/// Matching lines are elided; each differing line is shown as a `-`/`+` pair.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    let mut out = String::new();
    let len = expected.len().max(actual.len());
    let mut shown = 0;
    for line in 0..len {
        let left = expected.get(line);
        let right = actual.get(line);
        if left == right {
            continue;
        }
        shown += 1;
        let _ = writeln!(out, "@{}", line + 1);
        match left {
            Some(text) => {
                let _ = writeln!(out, "- {text}");
            }
            None => out.push_str("- (end)\n"),
        }
        match right {
            Some(text) => {
                let _ = writeln!(out, "+ {text}");
            }
            None => out.push_str("+ (end)\n"),
        }
    }
    let _ = write!(
        out,
        "{shown} differing line(s); expected {} line(s), got {}",
        expected.len(),
        actual.len()
    );
    out
}

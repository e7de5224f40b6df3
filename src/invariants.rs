use std::collections::HashSet;
use std::sync::Mutex;
use lazy_static::lazy_static;
use log::error;

lazy_static! {
    /// Descriptions of every invariant that has been asserted and held.
    static ref CHECKED_INVARIANTS: Mutex<HashSet<String>> = Mutex::new(HashSet::new());
}

pub const VERSION_NON_EMPTY: &str = "Resolved version must be non-empty";
pub const OUTPUT_DIR_EXISTS: &str = "Output directory must exist before export";
pub const ARCHIVE_OUTSIDE_OUTPUT: &str = "Archive must be written outside the output directory";

/// Asserts that a pipeline invariant holds.
///
/// A violation panics in debug and test builds and is logged in release builds.
/// A successful check is recorded so contract tests can confirm it ran.
///
/// # Arguments
/// * `condition` - The boolean result of the check.
/// * `description` - What must hold (e.g. "Output directory must exist before export").
/// * `component` - Optional component tag (e.g. "Orchestrator", "Archive").
pub fn assert_invariant(condition: bool, description: &str, component: Option<&str>) {
    if !condition {
        let msg = format!(
            "CRITICAL INVARIANT VIOLATION [{}]: {}",
            component.unwrap_or("General"),
            description
        );
        error!("{}", msg);

        if cfg!(debug_assertions) || cfg!(test) {
            panic!("{}", msg);
        }
    } else if let Ok(mut set) = CHECKED_INVARIANTS.lock() {
        set.insert(description.to_string());
    }
}

/// Verifies that each of `required_invariants` was asserted at least once.
///
/// Panics listing the missing ones.
#[cfg(test)]
pub fn contract_test(context: &str, required_invariants: &[&str]) {
    // Lock is released before any panic so one failed contract can't poison the rest.
    let missing: Vec<&str> = {
        let checked = CHECKED_INVARIANTS.lock().unwrap_or_else(|e| e.into_inner());
        required_invariants
            .iter()
            .copied()
            .filter(|req| !checked.contains(*req))
            .collect()
    };

    if !missing.is_empty() {
        panic!(
            "Contract Test Failed for '{}'. The following invariants were NOT checked:\n{:#?}",
            context, missing
        );
    }
    log::info!("Contract Test Passed: {}", context);
}

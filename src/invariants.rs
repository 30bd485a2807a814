//! # Invariants
//!
//! Runtime checks on the values the deploy builds before handing them to the
//! shell: the sed replacement must not contain a bare `/`, and the build
//! timestamp must stay on one line. A held invariant is remembered, so a test
//! can assert with `contract_test` that the code path really checked it.

use std::collections::HashSet;
use std::sync::Mutex;
use lazy_static::lazy_static;
use log::{error, info};

lazy_static! {
    /// Descriptions of every invariant that has been asserted and held.
    static ref CHECKED_INVARIANTS: Mutex<HashSet<String>> = Mutex::new(HashSet::new());
}

/// Asserts that a deploy invariant holds.
///
/// A violation is logged at `error` and panics in debug/test builds. A held
/// invariant is recorded so that `contract_test` can prove it was checked.
///
/// # Arguments
/// * `condition` - The boolean result of the check.
/// * `description` - What must be true (e.g. "logging.lua lives inside the destination").
/// * `component` - Optional component tag (e.g. "Paths", "Deploy").
pub fn assert_invariant(condition: bool, description: &str, component: Option<&str>) {
    if !condition {
        let msg = format!(
            "INVARIANT VIOLATION [{}]: {}",
            component.unwrap_or("General"),
            description
        );
        error!("{}", msg);

        if cfg!(debug_assertions) || cfg!(test) {
            panic!("{}", msg);
        }
    } else {
        let mut set = CHECKED_INVARIANTS.lock().unwrap_or_else(|e| e.into_inner());
        set.insert(description.to_string());
    }
}

/// Panics unless every one of `required_invariants` has been asserted.
#[allow(dead_code)]
pub fn contract_test(context: &str, required_invariants: &[&str]) {
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
    info!("Contract Test Passed: {}", context);
}

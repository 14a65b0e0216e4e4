//! Shared test utilities.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! // tmp/site holds a copy of fixtures/site
//! build(&options(&tmp), &BuildEnv::default()).unwrap();
//!
//! let home = read_output(&tmp, "index.html");
//! assert_region_once(&home, I18N_SEO);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::assemble::copy_dir_recursive;
use crate::html::Region;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to `<tmp>/site` and return the temp directory.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures. Outputs go next to it (`<tmp>/dist`, `<tmp>/temp`).
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, &tmp.path().join("site")).unwrap();
    tmp
}

// =========================================================================
// Output lookups
// =========================================================================

/// Read a file from `<tmp>/dist`. Panics with the missing path.
pub fn read_output(tmp: &TempDir, relative: &str) -> String {
    let path = tmp.path().join("dist").join(relative);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert that `region` occurs exactly once in `doc`.
pub fn assert_region_once(doc: &str, region: Region) {
    let count = region.count(doc);
    assert_eq!(
        count,
        1,
        "region '{}' found {count} times in:\n{doc}",
        region.name()
    );
}

/// Assert that `region` does not occur in `doc`.
pub fn assert_no_region(doc: &str, region: Region) {
    assert_eq!(
        region.count(doc),
        0,
        "region '{}' should be absent in:\n{doc}",
        region.name()
    );
}

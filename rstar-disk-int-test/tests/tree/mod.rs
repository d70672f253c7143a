//! R*-tree integration tests.
//!
//! These tests drive the public API against real directories and reopen
//! trees to check what actually reached the disk.

mod insert_search_test;
mod nearest_test;
mod persistence_test;
mod remove_test;
mod snapshot_test;

//! # junksweep
//!
//! A rule-driven junk file scanner and cleaner.
//!
//! junksweep walks one or more roots with a bounded worker pool, classifies
//! every entry against a platform-aware rule catalog, and deletes whatever
//! the caller approves, reporting per-item outcomes. It features:
//!
//! - **Data-driven rules**: exact names, extensions, globs, and whole junk
//!   directories, gated per platform; bring your own catalog as TOML
//! - **Concurrent scanning**: parallel subtree traversal with cooperative
//!   cancellation and incremental progress
//! - **Views, not copies**: sort and filter projections that never touch the
//!   underlying results or the totals
//! - **Isolated deletion**: one failed item never aborts the rest, and an
//!   unconfirmed clean is guaranteed to delete nothing
//! - **Audit journal**: every confirmed cleanup is recorded as JSON

pub mod catalog;
pub mod cleaner;
pub mod cli;
pub mod common;
pub mod report;
pub mod scanner;
pub mod selection;

//! # licenser
//!
//! Checks and maintains license headers at the top of Java, Kotlin and Scala
//! source files.
//!
//! A license header is described by a plain-text template. `${YEAR}` marks
//! where copyright years go, and trailing `;;key: value` lines carry
//! metadata such as which files the template applies to and how years are
//! displayed. A template compiles into a [`LicenseRule`]: a validator that
//! recognizes a correct header, an optional selector, and a formatter that
//! inserts or updates the header while keeping the years already present.
//!
//! ```rust
//! use licenser::rewrite::{FormatOutcome, Language};
//! use licenser::rule::LicenseRule;
//!
//! fn main() -> anyhow::Result<()> {
//!     let rule = LicenseRule::new("Copyright ${YEAR} Example Corp.\n")?;
//!
//!     let source = "package com.example;\n";
//!     assert!(!rule.validate(source));
//!
//!     let FormatOutcome::Changed(updated) = rule.format(source, Language::Java, 2024) else {
//!         unreachable!("a header is inserted");
//!     };
//!     assert!(rule.validate(&updated));
//!     assert!(updated.starts_with("/*\n * Copyright 2024 Example Corp.\n */\n"));
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`rule`] - Compiled license rules and ordered rule sets
//! * [`template`] - Template parsing and metadata
//! * [`year`] - Year display and selection modes, year list algebra
//! * [`rewrite`] - Header insertion and replacement per language
//! * [`processor`] - Concurrent check and apply passes over files
//! * [`config`] - `.licenser.toml` loading
//! * [`git`] - Modification years from git history
//!
//! [`LicenseRule`]: crate::rule::LicenseRule

pub mod backup;
pub mod comment;
pub mod config;
pub mod diff;
pub mod file_filter;
pub mod git;
pub mod logging;
pub mod output;
pub mod pattern;
pub mod processor;
pub mod report;
pub mod rewrite;
pub mod rule;
pub mod template;
pub mod workspace;
pub mod year;

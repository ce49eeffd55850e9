//! # reqs Core Library
//!
//! This crate contains the core logic of the `reqs` tool – an installer that reads
//! requirement files and `reqs.yml` manifests and hands the result to the machine's
//! package manager (`apt`, `dnf` or `brew`), and optionally to `pip`, `pip3` and `npm`.
//!
//! Resolution is deterministic: requirement files are merged in a fixed order,
//! duplicate lines are dropped, comments are stripped, and the outcome is a single
//! space-separated argument string per tool.
//!
//! ## Modules Overview
//! - [`merge`] – Deduplicating line merge of requirement text
//! - [`locate`] – Finding requirement files and npm package directories
//! - [`manifest`] – Decoding and rendering `reqs.yml`
//! - [`resolve`] – Turning a source into one requirement string per tool
//! - [`installed`] – Listing currently installed packages
//! - [`installer`] – Building and running package manager invocations
//! - [`platform`] – Host OS and package tool detection
//! - [`config`] – User configuration (`config.toml`)
//! - [`tool`] – Tool names and manifest keys
//! - [`error`] – Error type shared by all modules

pub mod config;
pub mod error;
pub mod installed;
pub mod installer;
pub mod locate;
pub mod manifest;
pub mod merge;
pub mod platform;
pub mod resolve;
pub mod tool;

pub use config::Config;
pub use error::{ReqsError, Result};
pub use manifest::Manifest;
pub use merge::{merge, Requirements};
pub use platform::{OsFamily, Platform};
pub use resolve::{EmptyPolicy, Resolver, Source};
pub use tool::{ManifestKey, SystemTool, Tool};

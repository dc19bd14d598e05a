//! # gwtree
//!
//! A git worktree manager for parallel feature development. `gwt` creates
//! worktrees as siblings of the repository (`<parent>/<repo>-<name>`), keeps a
//! record of the ones it created, and later shows their state, cleans up the
//! merged ones, or merges a branch back and removes its worktree.
//!
//! ## Quick Start
//!
//! ```bash
//! # Create ../demo-feature-x on a new branch feature-x
//! gwt feature-x
//!
//! # Create several at once, without prompts
//! gwt api ui docs
//!
//! # See what every worktree is doing
//! gwt status
//!
//! # Merge feature-x into main and remove its worktree
//! gwt merge feature-x
//! ```
//!
//! ## Module Structure
//!
//! - [`commands`] - One handler per command, all driven through a `Session`
//! - [`config`] - User settings stored as JSON in the config directory
//! - [`storage`] - Records of created worktrees in `~/.gwtree/worktrees.json`
//! - [`git`] - Runs the `git` binary and parses its output
//! - [`selection`] - Interactive prompts behind a trait, with a scripted mock
//! - [`traits`] - The seams commands depend on: runner and stores
//! - [`install`] and [`editor`] - Dependency install and editor launch helpers
//! - [`output`] - The step-by-step terminal transcript
//! - [`error`] - Error types shared by every layer

pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod git;
pub mod install;
pub mod output;
pub mod selection;
pub mod storage;
pub mod traits;

pub use anyhow::Result;

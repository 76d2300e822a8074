//! # Core Application Logic
//!
//! This module contains Quill's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (session data) │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • Notebook (domain)    │
//!                    │  • Store (sqlite + fts) │
//!                    └───────────┬─────────────┘
//!                                │
//!                  ┌─────────────┴─────────────┐
//!                  ▼                           ▼
//!           ┌────────────┐              ┌────────────┐
//!           │    TUI     │              │    CLI     │
//!           │  Adapter   │              │ (one-shot  │
//!           │ (ratatui)  │              │  commands) │
//!           └────────────┘              └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`model`]: Note, Folder, Template and their validation rules
//! - [`store`]: SQLite persistence with the FTS5 search index
//! - [`notebook`]: Domain operations over the store
//! - [`editor`]: The external editor handoff protocol
//! - [`state`]: The `App` struct, all session state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`session`]: Blocking work behind the reducer's effects

pub mod action;
pub mod config;
pub mod editor;
pub mod error;
pub mod model;
pub mod notebook;
pub mod seed;
pub mod session;
pub mod state;
pub mod store;
pub mod tree;

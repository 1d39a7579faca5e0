//! # Directory Watcher
//!
//! Watches a single directory and reports every newly created entry whose
//! file name matches a glob filter.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Directory Watcher                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  WatchConfig ──► DirectoryWatcher ──► EventStream              │
//! │       │                │                   │                    │
//! │       ▼                ▼                   ▼                    │
//! │   NameFilter     notify (OS facility)  FileCreatedEvent        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events are delivered in the order the OS reports them. A created event
//! may arrive while the producer is still writing the file.

pub mod config;
pub mod error;
pub mod event;
pub mod watcher;

pub use config::{NameFilter, WatchConfig};
pub use error::{Result, WatcherError};
pub use event::FileCreatedEvent;
pub use watcher::{DEFAULT_EVENT_CAPACITY, DirectoryWatcher, EventStream};

//! Version layer for new release detection
//!
//! This module provides the pieces the notifier drives on every check: fetching
//! package metadata, looking up the last known version, and comparing the two.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Registry  │────▶│   Checker   │◀────│    Cache    │
//! │  (fetch)    │     │  (compare)  │     │ (snapshot)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  Registries │
//! │    (npm)    │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Module registry snapshot loaded once at startup
//! - [`checker`]: Cached vs published comparison and notify/suppress decision
//! - [`registry`]: Registry trait for fetching metadata from remote sources
//! - [`registries`]: Concrete registry implementations (npm)
//! - [`error`]: Error types for registry, cache, transport and check failures
//! - [`semver`]: Version ordering helpers
//! - [`types`]: Common types like `PackageMetadata` and `VersionedModule`

pub mod cache;
pub mod checker;
pub mod error;
pub mod registries;
pub mod registry;
pub mod semver;
pub mod types;

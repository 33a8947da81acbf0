//! Announces new npm package releases over pub/sub
//!
//! - [`notifier`]: subscribes to check requests and publishes update events
//! - [`version`]: registry client, module registry cache and version comparison
//! - [`pubsub`]: transport traits and an in-process bus
//! - [`server`]: line-oriented input and output for a notifier
//! - [`config`]: configuration file and data directory
//! - [`log`]: tracing setup

pub mod config;
pub mod log;
pub mod notifier;
pub mod pubsub;
pub mod server;
pub mod version;

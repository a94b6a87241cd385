//! # Secret Synchronization
//!
//! The pull/push engine and the sinks that receive pulled values.

pub mod engine;
pub mod output;

pub use engine::{SyncEngine, SyncSummary};
pub use output::{env_var_name, EnvFileSink, OutputSink, PropertiesSink, StagedFile};

use std::collections::BTreeMap;

/// The caller's property set: property key to value.
pub type Properties = BTreeMap<String, String>;

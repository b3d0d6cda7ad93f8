#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # ward
//!
//! Filesystem access-control decisions for sandboxed processes.
//!
//! Every filesystem-mutating call a sandboxed process attempts is first
//! decided against a policy: the requested path is canonicalized through
//! the live filesystem (case, short names, `.`/`..`, symlinks, junctions,
//! mount points, device and stream syntax), and the result must lie inside
//! a writable root without touching a protected name. An allowed decision
//! is then re-checked immediately before the call.
//!
//! ## Core Types
//!
//! - [`CanonicalPath`] and [`Canonicalizer`]: path resolution and classification
//! - [`Policy`] and [`RootSet`]: what may be written
//! - [`DecisionEngine`], [`Operation`] and [`Verdict`]: decide, then commit
//! - [`Sandbox`]: all of the above for one working directory
//! - [`Error`] and [`Result`]: error handling types
//! - [`Logger`] and [`LogLevel`]: logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use ward::engine::{Decision, DenyReason, Operation};
//! use ward::path::MemoryProbe;
//! use ward::{Policy, Sandbox};
//!
//! let probe = MemoryProbe::new();
//! probe.mkdir_all(r"C:\ws\allowed").unwrap();
//!
//! let policy = Policy::parse(r#"{"mode":"workspace-write","workspace_roots":[".\\allowed"]}"#).unwrap();
//! let sandbox = Sandbox::new(policy, r"C:\ws", &probe).unwrap();
//!
//! assert_eq!(sandbox.decide(&Operation::write(r"allowed\f.txt")), Decision::Allow);
//! assert_eq!(
//!     sandbox.decide(&Operation::write(r"\\.\PhysicalDrive0")),
//!     Decision::Deny(DenyReason::DeviceOrPipe)
//! );
//! assert_eq!(
//!     sandbox.decide(&Operation::write(r"allowed\f.txt:hidden")),
//!     Decision::Deny(DenyReason::AlternateStream)
//! );
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod path;
pub mod policy;
pub mod roots;
pub mod sandbox;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigBuilder};
pub use engine::{Decision, DecisionEngine, DenyReason, Operation, OperationKind, Verdict};
pub use error::{AccessDenied, Error, PathError, ProbeError, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use path::{CanonicalPath, Canonicalizer, FilesystemProbe, PathClass, PathRelationship};
pub use policy::{Policy, PolicyDocument};
pub use roots::{AccessMode, Root, RootSet};
pub use sandbox::Sandbox;

//! Path handling: normalization, canonicalization and classification.
//!
//! Every access decision is made on a [`CanonicalPath`], never on the text a
//! caller supplied.
//!
//! # Key Concepts
//!
//! ## Normalization
//!
//! [`LexicalPath`] parses Windows path syntax without touching the
//! filesystem:
//! - Drive, UNC, verbatim (`\\?\`) and device (`\\.\`) prefixes
//! - Relative, rooted and drive-relative forms made absolute
//! - `.` and `..` resolved, clamped at the root
//! - Trailing dots and spaces stripped
//!
//! ## Canonicalization
//!
//! [`Canonicalizer`] then walks the path through a [`FilesystemProbe`],
//! replacing each component with its on-disk spelling and following
//! symlinks, junctions and mount points up to [`MAX_REPARSE_HOPS`].
//!
//! ## Classification
//!
//! Each result carries a [`PathClass`]. Device, named-pipe and
//! alternate-data-stream paths are never writable; UNC and long-path forms
//! are accepted only where their resolved target is.
//!
//! # Examples
//!
//! ```
//! use ward::path::{Canonicalizer, MemoryProbe, PathClass};
//!
//! let probe = MemoryProbe::new();
//! probe.mkdir_all(r"C:\Work").unwrap();
//!
//! let canonicalizer = Canonicalizer::new(&probe);
//! let a = canonicalizer.canonicalize(r"\\?\C:\WORK\f.txt", None).unwrap();
//! let b = canonicalizer.canonicalize(r"c:/work/./f.txt", None).unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.class(), PathClass::LongPathEscape);
//!
//! let stream = canonicalizer.canonicalize(r"C:\Work\f.txt:hidden", None).unwrap();
//! assert!(stream.class().is_never_permitted());
//! ```

pub mod canonicalize;
pub mod memory;
pub mod normalize;
pub mod os;
pub mod probe;
pub mod relationship;
mod types;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

// Re-export key types
pub use canonicalize::{Canonicalizer, MAX_REPARSE_HOPS};
pub use memory::MemoryProbe;
pub use normalize::LexicalPath;
pub use os::OsProbe;
pub use probe::{DirHandle, FileKind, FilesystemProbe, Metadata, ReparseKind};
pub use relationship::PathRelationship;
pub use types::{CanonicalPath, Component, PathClass, PathPrefix};

//! Core types for path handling.
//!
//! This module defines the canonical path representation that every access
//! decision is made on, together with the classification attached to it.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use crate::path::normalize::fold_key;

/// The syntactic class of a path after resolution.
///
/// Classification drives the first stage of every decision: some classes are
/// never writable regardless of policy.
///
/// # Examples
///
/// ```
/// use ward::path::PathClass;
///
/// assert!(PathClass::Device.is_never_permitted());
/// assert!(!PathClass::LongPathEscape.is_never_permitted());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathClass {
    /// An ordinary drive or root-relative filesystem path.
    Regular,
    /// A reserved DOS device name or a device-namespace path.
    Device,
    /// A named pipe (`\\.\pipe\...`).
    NamedPipe,
    /// A path naming an alternate data stream (`file:stream`).
    AlternateDataStream,
    /// A UNC share path (`\\host\share\...`).
    UncShare,
    /// A verbatim path using the `\\?\` or `\??\` prefix.
    LongPathEscape,
}

impl PathClass {
    /// Whether paths of this class are denied under every policy.
    #[must_use]
    pub fn is_never_permitted(self) -> bool {
        matches!(
            self,
            Self::Device | Self::NamedPipe | Self::AlternateDataStream
        )
    }
}

impl fmt::Display for PathClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Device => write!(f, "device"),
            Self::NamedPipe => write!(f, "named-pipe"),
            Self::AlternateDataStream => write!(f, "alternate-data-stream"),
            Self::UncShare => write!(f, "unc-share"),
            Self::LongPathEscape => write!(f, "long-path-escape"),
        }
    }
}

/// The anchor every absolute path hangs from.
///
/// Server and share names of UNC prefixes are stored case-folded; drive
/// letters are stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathPrefix {
    /// A drive letter such as `C:`.
    Disk(char),
    /// A UNC share `\\server\share`.
    Unc {
        /// Host name, case-folded.
        server: String,
        /// Share name, case-folded.
        share: String,
    },
    /// A device-namespace object such as `\\.\PhysicalDrive0`.
    Device(String),
    /// The `/` root of a Unix host.
    Posix,
}

impl PathPrefix {
    /// Build a UNC prefix, folding server and share for comparison.
    #[must_use]
    pub fn unc(server: &str, share: &str) -> Self {
        Self::Unc {
            server: fold_key(server),
            share: fold_key(share),
        }
    }

    /// Build a drive prefix from any-case letter.
    #[must_use]
    pub fn disk(letter: char) -> Self {
        Self::Disk(letter.to_ascii_uppercase())
    }
}

impl fmt::Display for PathPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disk(letter) => write!(f, "{letter}:"),
            Self::Unc { server, share } => write!(f, r"\\{server}\{share}"),
            Self::Device(name) => write!(f, r"\\.\{name}"),
            Self::Posix => Ok(()),
        }
    }
}

/// A single resolved path component.
///
/// `name` is the on-disk spelling reported by the filesystem (true case, long
/// name); `key` is the case-folded, NFC-normalized form used for comparison.
#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    key: String,
}

impl Component {
    /// Create a component from its on-disk spelling.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let key = fold_key(&name);
        Self { name, key }
    }

    /// The on-disk spelling.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The comparison key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Component {}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// An absolute, reparse-resolved, case-normalized path.
///
/// Two values are equal when they have the same prefix, the same component
/// keys and the same stream; the spelling and the [`PathClass`] do not take
/// part in equality, because `\\?\C:\ws` and `C:\WS` name the same object.
///
/// Values are produced fresh for every decision by
/// [`Canonicalizer`](crate::path::Canonicalizer) and must not be cached
/// across decisions.
///
/// # Examples
///
/// ```
/// use ward::path::{CanonicalPath, PathClass, PathPrefix};
///
/// let a = CanonicalPath::from_names(PathPrefix::disk('c'), ["Work", "Src"], PathClass::Regular);
/// let b = CanonicalPath::from_names(PathPrefix::disk('C'), ["work", "SRC"], PathClass::LongPathEscape);
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), r"C:\Work\Src");
/// ```
#[derive(Debug, Clone)]
pub struct CanonicalPath {
    prefix: PathPrefix,
    components: Vec<Component>,
    stream: Option<String>,
    class: PathClass,
}

impl CanonicalPath {
    /// Create the root of a prefix (for example `C:\`).
    #[must_use]
    pub fn root(prefix: PathPrefix, class: PathClass) -> Self {
        Self {
            prefix,
            components: Vec::new(),
            stream: None,
            class,
        }
    }

    /// Create a path from a prefix and a list of component spellings.
    #[must_use]
    pub fn from_names<I, S>(prefix: PathPrefix, names: I, class: PathClass) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix,
            components: names.into_iter().map(Component::new).collect(),
            stream: None,
            class,
        }
    }

    /// Attach an alternate data stream name.
    #[must_use]
    pub fn with_stream(mut self, stream: Option<String>) -> Self {
        self.stream = stream;
        self
    }

    /// Replace the classification.
    #[must_use]
    pub fn with_class(mut self, class: PathClass) -> Self {
        self.class = class;
        self
    }

    /// The prefix this path hangs from.
    #[must_use]
    pub fn prefix(&self) -> &PathPrefix {
        &self.prefix
    }

    /// The resolved components below the prefix.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// The alternate data stream, if the path names one.
    #[must_use]
    pub fn stream(&self) -> Option<&str> {
        self.stream.as_deref()
    }

    /// The path classification.
    #[must_use]
    pub fn class(&self) -> PathClass {
        self.class
    }

    /// Whether this is the bare prefix root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// The last component, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&Component> {
        self.components.last()
    }

    /// The containing directory. The root has no parent.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.components.is_empty() {
            return None;
        }
        let mut parent = self.clone();
        parent.components.pop();
        parent.stream = None;
        Some(parent)
    }

    /// Append a component.
    pub fn push(&mut self, component: Component) {
        self.components.push(component);
    }

    /// Remove the last component, returning whether one was removed.
    pub fn pop(&mut self) -> bool {
        self.components.pop().is_some()
    }

    /// Return a copy with `name` appended.
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        let mut joined = self.clone();
        joined.stream = None;
        joined.push(Component::new(name));
        joined
    }

    /// Component-wise containment: `self` equals `base` or lies below it.
    ///
    /// `C:\ws\sub` starts with `C:\ws`; `C:\workspace2` does not, even though
    /// `C:\work` is a textual prefix of both.
    #[must_use]
    pub fn starts_with(&self, base: &Self) -> bool {
        self.strip_prefix(base).is_some()
    }

    /// The components of `self` below `base`, if `self` is inside `base`.
    #[must_use]
    pub fn strip_prefix(&self, base: &Self) -> Option<&[Component]> {
        if self.prefix != base.prefix || base.stream.is_some() {
            return None;
        }
        if base.components.len() > self.components.len() {
            return None;
        }
        let matches = base
            .components
            .iter()
            .zip(&self.components)
            .all(|(a, b)| a == b);
        matches.then(|| &self.components[base.components.len()..])
    }

    /// Convert into a native host path, when the prefix exists on this host.
    ///
    /// Drive and UNC prefixes convert on Windows; the `Posix` prefix converts
    /// on every other host. Device prefixes never convert.
    #[must_use]
    pub fn to_native(&self) -> Option<PathBuf> {
        if self.stream.is_some() {
            return None;
        }
        match self.prefix {
            PathPrefix::Posix if !cfg!(windows) => {
                let mut native = PathBuf::from("/");
                native.extend(self.components.iter().map(Component::name));
                Some(native)
            }
            PathPrefix::Disk(_) | PathPrefix::Unc { .. } if cfg!(windows) => {
                let mut native = PathBuf::from(format!(r"{}\", self.prefix));
                native.extend(self.components.iter().map(Component::name));
                Some(native)
            }
            _ => None,
        }
    }
}

impl PartialEq for CanonicalPath {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix
            && self.components == other.components
            && self.stream.as_deref().map(fold_key) == other.stream.as_deref().map(fold_key)
    }
}

impl Eq for CanonicalPath {}

impl Hash for CanonicalPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.prefix.hash(state);
        self.components.hash(state);
        self.stream.as_deref().map(fold_key).hash(state);
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.prefix == PathPrefix::Posix {
            '/'
        } else {
            '\\'
        };
        write!(f, "{}", self.prefix)?;
        if self.components.is_empty() {
            write!(f, "{separator}")?;
        }
        for component in &self.components {
            write!(f, "{separator}{}", component.name)?;
        }
        if let Some(stream) = &self.stream {
            write!(f, ":{stream}")?;
        }
        Ok(())
    }
}

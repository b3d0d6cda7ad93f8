//! Lexical path normalization.
//!
//! This module turns raw path text into a [`LexicalPath`] without touching
//! the filesystem:
//! - Recognizing drive, UNC, verbatim (`\\?\`) and device (`\\.\`) prefixes
//! - Making relative, rooted and drive-relative paths absolute against a base
//! - Resolving `.` and `..` components (clamped at the root, as Win32 does)
//! - Stripping trailing dots and spaces from components
//! - Classifying reserved device names and alternate data streams
//!
//! It also provides the comparison folding used everywhere else and the
//! tilde/`%VAR%` expansion applied to policy root entries.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

use crate::error::PathError;
use crate::path::types::{CanonicalPath, Component, PathClass, PathPrefix};

/// Reserved DOS device names, matched case-insensitively with or without an
/// extension.
pub const RESERVED_DEVICE_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul", "conin$", "conout$", "com1", "com2", "com3", "com4", "com5",
    "com6", "com7", "com8", "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7",
    "lpt8", "lpt9",
];

/// Host names that address the local machine through a UNC path.
const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "[::1]", "::1", "."];

/// Fold a component for comparison: Unicode NFC, then lowercase.
///
/// # Examples
///
/// ```
/// use ward::path::normalize::fold_key;
///
/// assert_eq!(fold_key(".GiT"), ".git");
/// // Precomposed and decomposed forms fold identically.
/// assert_eq!(fold_key("Cafe\u{301}"), fold_key("caf\u{e9}"));
/// ```
#[must_use]
pub fn fold_key(name: &str) -> String {
    name.nfc().collect::<String>().to_lowercase()
}

/// Remove the trailing dots and spaces Win32 ignores in a component.
///
/// # Examples
///
/// ```
/// use ward::path::normalize::strip_trailing_dots_and_spaces;
///
/// assert_eq!(strip_trailing_dots_and_spaces(".git. . "), ".git");
/// assert_eq!(strip_trailing_dots_and_spaces("file.txt"), "file.txt");
/// ```
#[must_use]
pub fn strip_trailing_dots_and_spaces(name: &str) -> &str {
    name.trim_end_matches(|c| c == '.' || c == ' ')
}

/// The key used for protected-name matching.
///
/// This folds like [`fold_key`] but also ignores trailing dots and spaces, so
/// verbatim spellings such as `\\?\C:\ws\.git.` still match `.git`.
#[must_use]
pub fn protected_key(name: &str) -> String {
    let stripped = strip_trailing_dots_and_spaces(name);
    if stripped.is_empty() {
        fold_key(name)
    } else {
        fold_key(stripped)
    }
}

/// Whether a component names a reserved DOS device.
///
/// The base name before the first `.` is compared, ignoring trailing spaces,
/// so `CON`, `con.txt` and `Nul .log` all match.
///
/// # Examples
///
/// ```
/// use ward::path::normalize::is_reserved_device_name;
///
/// assert!(is_reserved_device_name("CON"));
/// assert!(is_reserved_device_name("lpt1.txt"));
/// assert!(!is_reserved_device_name("console.log"));
/// ```
#[must_use]
pub fn is_reserved_device_name(name: &str) -> bool {
    let stem = name.split(['.', ':']).next().unwrap_or(name);
    let stem = stem.trim_end_matches(' ').to_ascii_lowercase();
    RESERVED_DEVICE_NAMES.contains(&stem.as_str())
}

/// How a raw path is anchored before it is made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Anchor {
    /// Fully qualified with its own prefix.
    Prefix(PathPrefix),
    /// `C:foo`: relative to the working directory of drive `C`.
    DriveRelative(char),
    /// `\foo`: relative to the root of the base's prefix.
    Rooted,
    /// `foo`: relative to the base directory.
    Relative,
}

/// The result of splitting the anchor off a raw path.
struct Split<'a> {
    anchor: Anchor,
    rest: &'a str,
    class: PathClass,
    verbatim: bool,
}

/// An absolute path that has been normalized lexically but not resolved
/// against the filesystem.
///
/// # Examples
///
/// ```
/// use ward::path::{LexicalPath, PathClass};
///
/// let path = LexicalPath::parse(r"C:\ws\sub\..\.\f.txt", None).unwrap();
/// assert_eq!(path.names(), ["ws", "f.txt"]);
/// assert_eq!(path.class(), PathClass::Regular);
///
/// let stream = LexicalPath::parse(r"C:\ws\f.txt:hidden", None).unwrap();
/// assert_eq!(stream.class(), PathClass::AlternateDataStream);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalPath {
    prefix: PathPrefix,
    names: Vec<String>,
    stream: Option<String>,
    class: PathClass,
}

impl LexicalPath {
    /// Parse and normalize `raw`, resolving relative forms against `base`.
    ///
    /// Rooted paths without a drive (`\foo`, `/foo`) take the prefix of
    /// `base`, or the Unix root when there is no base.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Malformed`] if the text is empty, contains a NUL,
    /// names a UNC path without a share, is relative without a base, is
    /// drive-relative on a drive other than the base's, or contains a
    /// component that normalizes to nothing.
    pub fn parse(raw: &str, base: Option<&CanonicalPath>) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(malformed(raw, "path is empty"));
        }
        if raw.contains('\0') {
            return Err(malformed(raw, "path contains a NUL character"));
        }

        let text = raw.replace('/', "\\");
        let split = split_anchor(raw, &text)?;

        let (prefix, mut names, mut class) = match split.anchor {
            Anchor::Prefix(prefix) => (prefix, Vec::new(), split.class),
            Anchor::DriveRelative(letter) => match base {
                Some(base) if *base.prefix() == PathPrefix::Disk(letter) => {
                    (base.prefix().clone(), base_names(base), base.class())
                }
                _ => {
                    return Err(malformed(
                        raw,
                        "drive-relative path does not match the working directory drive",
                    ))
                }
            },
            Anchor::Rooted => match base.map(CanonicalPath::prefix) {
                Some(PathPrefix::Device(_)) => {
                    return Err(malformed(raw, "cannot root a path on a device"))
                }
                Some(prefix) => (prefix.clone(), Vec::new(), PathClass::Regular),
                None => (PathPrefix::Posix, Vec::new(), PathClass::Regular),
            },
            Anchor::Relative => match base {
                Some(base) => (base.prefix().clone(), base_names(base), base.class()),
                None => {
                    return Err(malformed(raw, "relative path without a working directory"))
                }
            },
        };

        for segment in split.rest.split('\\').filter(|s| !s.is_empty()) {
            match segment {
                "." | ".." if split.verbatim => {
                    return Err(malformed(raw, "verbatim path contains '.' or '..'"));
                }
                "." => {}
                ".." => {
                    // Win32 clamps excess parent references at the root.
                    names.pop();
                }
                _ => {
                    let name = if split.verbatim {
                        segment
                    } else {
                        strip_trailing_dots_and_spaces(segment)
                    };
                    if name.is_empty() {
                        return Err(malformed(raw, "component normalizes to an empty name"));
                    }
                    names.push(name.to_string());
                }
            }
        }

        let mut stream = None;
        if !class.is_never_permitted() {
            if names.iter().any(|n| is_reserved_device_name(n)) {
                class = PathClass::Device;
            } else if let Some(index) = names.iter().position(|n| n.contains(':')) {
                class = PathClass::AlternateDataStream;
                if index + 1 == names.len() {
                    if let Some((file, rest)) = names[index].clone().split_once(':') {
                        if !file.is_empty() {
                            names[index] = file.to_string();
                            stream = Some(rest.to_string());
                        }
                    }
                }
            }
        }

        Ok(Self {
            prefix,
            names,
            stream,
            class,
        })
    }

    /// Rebuild the lexical form of an already canonical path.
    #[must_use]
    pub fn from_canonical(path: &CanonicalPath) -> Self {
        Self {
            prefix: path.prefix().clone(),
            names: base_names(path),
            stream: path.stream().map(str::to_string),
            class: path.class(),
        }
    }

    /// The prefix.
    #[must_use]
    pub fn prefix(&self) -> &PathPrefix {
        &self.prefix
    }

    /// The normalized component names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The alternate data stream, if any.
    #[must_use]
    pub fn stream(&self) -> Option<&str> {
        self.stream.as_deref()
    }

    /// The classification derived from syntax alone.
    #[must_use]
    pub fn class(&self) -> PathClass {
        self.class
    }

    /// Split into prefix, names and class.
    #[must_use]
    pub fn into_parts(self) -> (PathPrefix, Vec<String>, Option<String>, PathClass) {
        (self.prefix, self.names, self.stream, self.class)
    }

    /// Convert without resolving anything against the filesystem.
    #[must_use]
    pub fn into_unresolved(self) -> CanonicalPath {
        CanonicalPath::from_names(self.prefix, self.names, self.class).with_stream(self.stream)
    }
}

fn base_names(base: &CanonicalPath) -> Vec<String> {
    base.components()
        .iter()
        .map(|c| Component::name(c).to_string())
        .collect()
}

fn malformed(raw: &str, reason: &str) -> PathError {
    PathError::Malformed {
        path: raw.to_string(),
        reason: reason.to_string(),
    }
}

/// Case-insensitive ASCII prefix strip.
fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

fn first_segment(text: &str) -> (&str, &str) {
    text.split_once('\\').unwrap_or((text, ""))
}

fn drive_letter(text: &str) -> Option<char> {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        Some(char::from(bytes[0]).to_ascii_uppercase())
    } else {
        None
    }
}

fn split_unc<'a>(raw: &str, text: &'a str) -> Result<(PathPrefix, &'a str), PathError> {
    let (server, rest) = first_segment(text);
    let (share, rest) = first_segment(rest);
    if server.is_empty() || share.is_empty() {
        return Err(malformed(raw, "UNC path must name a server and a share"));
    }

    // Loopback administrative shares (\\localhost\C$) are the local drive.
    let server_key = server.to_ascii_lowercase();
    let share_bytes = share.as_bytes();
    if LOOPBACK_HOSTS.contains(&server_key.as_str())
        && share_bytes.len() == 2
        && share_bytes[0].is_ascii_alphabetic()
        && share_bytes[1] == b'$'
    {
        return Ok((PathPrefix::disk(char::from(share_bytes[0])), rest));
    }

    Ok((PathPrefix::unc(server, share), rest))
}

fn split_anchor<'a>(raw: &str, text: &'a str) -> Result<Split<'a>, PathError> {
    let verbatim = strip_prefix_ci(text, r"\\?\").or_else(|| strip_prefix_ci(text, r"\??\"));
    if let Some(rest) = verbatim {
        if let Some(unc) = strip_prefix_ci(rest, r"UNC\") {
            let (prefix, rest) = split_unc(raw, unc)?;
            return Ok(Split {
                anchor: Anchor::Prefix(prefix),
                rest,
                class: PathClass::LongPathEscape,
                verbatim: true,
            });
        }
        if let Some(letter) = drive_letter(rest) {
            if rest.len() == 2 || rest.as_bytes()[2] == b'\\' {
                return Ok(Split {
                    anchor: Anchor::Prefix(PathPrefix::Disk(letter)),
                    rest: &rest[2..],
                    class: PathClass::LongPathEscape,
                    verbatim: true,
                });
            }
        }
        // GLOBALROOT, Volume{guid} and other object-manager names.
        let (name, rest) = first_segment(rest);
        if name.is_empty() {
            return Err(malformed(raw, "verbatim prefix without a target"));
        }
        return Ok(Split {
            anchor: Anchor::Prefix(PathPrefix::Device(name.to_string())),
            rest,
            class: PathClass::Device,
            verbatim: true,
        });
    }

    if let Some(rest) = strip_prefix_ci(text, r"\\.\") {
        let (name, tail) = first_segment(rest);
        if name.eq_ignore_ascii_case("pipe") {
            return Ok(Split {
                anchor: Anchor::Prefix(PathPrefix::Device("pipe".to_string())),
                rest: tail,
                class: PathClass::NamedPipe,
                verbatim: false,
            });
        }
        if name.eq_ignore_ascii_case("UNC") {
            let (prefix, rest) = split_unc(raw, tail)?;
            return Ok(Split {
                anchor: Anchor::Prefix(prefix),
                rest,
                class: PathClass::UncShare,
                verbatim: false,
            });
        }
        if name.is_empty() {
            return Err(malformed(raw, "device prefix without a device name"));
        }
        return Ok(Split {
            anchor: Anchor::Prefix(PathPrefix::Device(name.to_string())),
            rest: tail,
            class: PathClass::Device,
            verbatim: false,
        });
    }

    if let Some(rest) = text.strip_prefix(r"\\") {
        let (prefix, rest) = split_unc(raw, rest)?;
        return Ok(Split {
            anchor: Anchor::Prefix(prefix),
            rest,
            class: PathClass::UncShare,
            verbatim: false,
        });
    }

    if let Some(letter) = drive_letter(text) {
        let rest = &text[2..];
        let anchor = if rest.starts_with('\\') {
            Anchor::Prefix(PathPrefix::Disk(letter))
        } else {
            Anchor::DriveRelative(letter)
        };
        return Ok(Split {
            anchor,
            rest,
            class: PathClass::Regular,
            verbatim: false,
        });
    }

    if let Some(rest) = text.strip_prefix('\\') {
        return Ok(Split {
            anchor: Anchor::Rooted,
            rest,
            class: PathClass::Regular,
            verbatim: false,
        });
    }

    Ok(Split {
        anchor: Anchor::Relative,
        rest: text,
        class: PathClass::Regular,
        verbatim: false,
    })
}

/// Expand a leading tilde (`~`, `~\path`, `~/path`) to the home directory.
///
/// `~user` syntax is not supported.
///
/// # Errors
///
/// Returns [`PathError::Malformed`] if the home directory cannot be
/// determined or `~user` syntax is used.
///
/// # Examples
///
/// ```
/// use ward::path::normalize::expand_tilde;
///
/// assert_eq!(expand_tilde(r"C:\ws").unwrap(), r"C:\ws");
/// assert!(expand_tilde("~other/x").is_err());
/// ```
pub fn expand_tilde(raw: &str) -> Result<String, PathError> {
    if !raw.starts_with('~') {
        return Ok(raw.to_string());
    }

    let home = home::home_dir().ok_or_else(|| malformed(raw, "cannot determine home directory"))?;
    let home = home.to_string_lossy().into_owned();

    if raw == "~" {
        Ok(home)
    } else if raw.starts_with("~/") || raw.starts_with("~\\") {
        Ok(format!("{home}{}", &raw[1..]))
    } else {
        Err(malformed(raw, "~user syntax is not supported; use ~ or ~/path"))
    }
}

/// Expand `%NAME%` references using `env`. Names are matched
/// case-insensitively, as Windows does.
///
/// # Errors
///
/// Returns [`PathError::Malformed`] if a referenced variable is undefined or
/// a `%` is unterminated.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use ward::path::normalize::expand_env_vars;
///
/// let env = HashMap::from([("TEMP".to_string(), r"C:\Temp".to_string())]);
/// assert_eq!(expand_env_vars(r"%temp%\build", &env).unwrap(), r"C:\Temp\build");
/// assert!(expand_env_vars("%MISSING%", &env).is_err());
/// ```
pub fn expand_env_vars(raw: &str, env: &HashMap<String, String>) -> Result<String, PathError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('%')
            .ok_or_else(|| malformed(raw, "unterminated %VARIABLE% reference"))?;
        let name = &after[..end];
        let value = env
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
            .ok_or_else(|| malformed(raw, &format!("undefined environment variable {name}")))?;
        out.push_str(value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

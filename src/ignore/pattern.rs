//! Pattern compiler: one textual rule becomes one typed, compiled matcher.
//!
//! A rule string consists of optional modifier letters (`t` take, `i` ignore
//! case), then one of four bodies selected by prefix:
//!
//! - `./…` — a shell-style path glob, translated to an anchored regex
//! - `PCRE:…` — a raw regular expression, compiled verbatim
//! - `DEVICE:[<|<=|>|>=|=]major[:minor]` — a device-number predicate
//! - `INODE:major:minor:inode` — a single-inode predicate
//!
//! Compilation happens exactly once; the resulting [`Rule`] carries the
//! derived `path_depth` and `has_unbounded_wildcard` values used by the tree
//! propagator and is never recompiled.

use super::errors::IgnoreError;
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use tracing::debug;

/// The path separator rules and entry paths are written with.
pub const PATH_SEPARATOR: char = '/';

/// Whether a matching rule excludes the entry or explicitly keeps it.
///
/// A `Take` rule earlier in the list overrides a broader `Ignore` rule later
/// in the list (and vice versa): evaluation order is list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// Exclude the entry from version control.
    Ignore,
    /// Keep the entry, overriding any later ignore rule.
    Take,
}

/// Comparison operator of a `DEVICE:` rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceComparator {
    /// Strictly lower device numbers match.
    Less,
    /// Lower-or-equal device numbers match.
    LessEqual,
    /// Only the given device number matches.
    Equal,
    /// Greater-or-equal device numbers match.
    GreaterEqual,
    /// Strictly greater device numbers match.
    Greater,
}

impl DeviceComparator {
    /// Whether an entry whose device compares as `ord` against the rule's
    /// device satisfies this comparator.
    #[must_use]
    pub fn accepts(self, ord: Ordering) -> bool {
        match self {
            Self::Less => ord == Ordering::Less,
            Self::LessEqual => ord != Ordering::Greater,
            Self::Equal => ord == Ordering::Equal,
            Self::GreaterEqual => ord != Ordering::Less,
            Self::Greater => ord == Ordering::Greater,
        }
    }
}

/// The compiled body of a rule, one variant per rule language.
///
/// The evaluator matches on this exhaustively; adding a kind without teaching
/// the evaluator about it is a compile error, not a silent default.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Shell-style glob, translated to an anchored regex.
    PathGlob {
        /// The compiled matcher, tested against root-relative paths.
        matcher: Regex,
    },
    /// Raw regular expression, compiled as written (with start anchoring).
    RawRegex {
        /// The compiled matcher, tested against root-relative paths.
        matcher: Regex,
    },
    /// Device-number predicate.
    DeviceNumber {
        /// How the entry's device number is compared against the rule's.
        comparator: DeviceComparator,
        /// Device major number to compare against.
        major: u64,
        /// Optional minor number; `None` means "match on major only".
        minor: Option<u64>,
    },
    /// Exact (device, inode) predicate.
    InodeId {
        /// Combined device id (`makedev(major, minor)`).
        dev: u64,
        /// Inode number on that device.
        inode: u64,
    },
}

/// One compiled ignore/take directive.
///
/// Rules preserve strict insertion order inside a [`super::RuleList`];
/// `path_depth` and `has_unbounded_wildcard` are derived here, at compile
/// time, and never recomputed.
#[derive(Debug, Clone)]
pub struct Rule {
    /// The rule text as given (leading whitespace stripped, modifiers kept).
    raw_text: String,
    /// Compiled matcher body.
    kind: RuleKind,
    /// Ignore or take.
    sense: Sense,
    /// Case-insensitive matching (`i` modifier).
    case_insensitive: bool,
    /// Number of path separators in the matchable portion; the minimum
    /// directory depth at which this rule can start matching.
    path_depth: usize,
    /// True if the rule can match across directory levels, keeping it
    /// eligible at `path_depth` and deeper.
    has_unbounded_wildcard: bool,
    /// Builtin rules are never persisted or dumped.
    is_builtin: bool,
}

impl Rule {
    /// Compile one user rule from its textual form.
    ///
    /// # Errors
    ///
    /// Returns [`IgnoreError::InvalidRule`] for malformed modifier, prefix,
    /// or number syntax, and [`IgnoreError::PatternCompile`] when the regex
    /// engine rejects the translated matcher source.
    pub fn compile(text: &str) -> Result<Self, IgnoreError> {
        Self::compile_inner(text, false)
    }

    /// Compile a builtin rule. Builtins occupy a fixed prefix of the rule
    /// list and are excluded from persistence and dumps.
    ///
    /// # Errors
    /// Same failure modes as [`Rule::compile`].
    pub fn compile_builtin(text: &str) -> Result<Self, IgnoreError> {
        Self::compile_inner(text, true)
    }

    /// Shared compilation path for user and builtin rules.
    fn compile_inner(text: &str, is_builtin: bool) -> Result<Self, IgnoreError> {
        // Leading whitespace is not allowed to be part of a pattern; rule
        // strings sliced out of a load buffer carry the cosmetic newline of
        // the previous record.
        let trimmed = text.trim_start();
        if trimmed.is_empty() {
            return Err(IgnoreError::invalid_rule(text, "pattern has no pattern"));
        }

        let raw_text = trimmed.to_string();

        // Modifier letters, in any combination, until a non-modifier.
        let mut sense = Sense::Ignore;
        let mut case_insensitive = false;
        let mut rest = trimmed;
        loop {
            match rest.chars().next() {
                Some('t') => sense = Sense::Take,
                Some('i') => case_insensitive = true,
                Some(_) => break,
                None => {
                    return Err(IgnoreError::invalid_rule(&raw_text, "pattern ends prematurely"));
                }
            }
            rest = &rest[1..];
        }

        let (kind, path_depth, has_unbounded_wildcard) =
            if let Some(body) = rest.strip_prefix("DEVICE:") {
                (parse_device(&raw_text, body)?, 0, false)
            } else if let Some(body) = rest.strip_prefix("INODE:") {
                (parse_inode(&raw_text, body)?, 0, false)
            } else if let Some(body) = rest.strip_prefix("PCRE:") {
                check_min_length(&raw_text, body)?;
                let depth = body.matches(PATH_SEPARATOR).count();
                let matcher = compile_regex(&raw_text, body, case_insensitive)?;
                // A raw regex may cross directory levels in ways we cannot
                // see from its source; treat it as unbounded.
                (RuleKind::RawRegex { matcher }, depth, true)
            } else if rest.starts_with("./") {
                check_min_length(&raw_text, rest)?;
                // A trailing separator folds into the end anchor and does
                // not push the rule a level deeper.
                let mut depth = rest.matches(PATH_SEPARATOR).count();
                if rest.ends_with(PATH_SEPARATOR) {
                    depth -= 1;
                }
                let (source, unbounded) = translate_glob(rest);
                let matcher = compile_regex(&raw_text, &source, case_insensitive)?;
                (RuleKind::PathGlob { matcher }, depth, unbounded)
            } else {
                return Err(IgnoreError::invalid_rule(
                    &raw_text,
                    "pattern must start with `./`, `PCRE:`, `DEVICE:`, or `INODE:`",
                ));
            };

        Ok(Self {
            raw_text,
            kind,
            sense,
            case_insensitive,
            path_depth,
            has_unbounded_wildcard,
            is_builtin,
        })
    }

    /// The rule text as given by the user, modifiers included.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The compiled matcher body.
    #[must_use]
    pub const fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Ignore or take.
    #[must_use]
    pub const fn sense(&self) -> Sense {
        self.sense
    }

    /// Whether the `i` modifier was given.
    #[must_use]
    pub const fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Number of path separators in the matchable portion.
    #[must_use]
    pub const fn path_depth(&self) -> usize {
        self.path_depth
    }

    /// Whether the rule stays eligible below its `path_depth`.
    #[must_use]
    pub const fn has_unbounded_wildcard(&self) -> bool {
        self.has_unbounded_wildcard
    }

    /// Whether this is a builtin (never persisted) rule.
    #[must_use]
    pub const fn is_builtin(&self) -> bool {
        self.is_builtin
    }
}

/// Minimum matchable length: `./` plus at least one character (and the same
/// floor for raw regex sources).
fn check_min_length(raw: &str, matchable: &str) -> Result<(), IgnoreError> {
    if matchable.len() < 3 {
        return Err(IgnoreError::invalid_rule(raw, "pattern too short"));
    }
    Ok(())
}

/// Parse the body of a `DEVICE:` rule: comparator characters, major number,
/// optional `:minor`.
fn parse_device(raw: &str, body: &str) -> Result<RuleKind, IgnoreError> {
    let mut less = false;
    let mut equal = false;
    let mut greater = false;
    let mut rest = body;
    loop {
        match rest.chars().next() {
            Some('<') => less = true,
            Some('=') => equal = true,
            Some('>') => greater = true,
            _ => break,
        }
        rest = &rest[1..];
    }

    let comparator = match (less, equal, greater) {
        (false, false, false) | (false, true, false) => DeviceComparator::Equal,
        (true, false, false) => DeviceComparator::Less,
        (true, true, false) => DeviceComparator::LessEqual,
        (false, false, true) => DeviceComparator::Greater,
        (false, true, true) => DeviceComparator::GreaterEqual,
        _ => {
            return Err(IgnoreError::invalid_rule(
                raw,
                "contradictory device comparison operators",
            ));
        }
    };

    let (major, rest) = scan_unsigned(rest)
        .ok_or_else(|| IgnoreError::invalid_rule(raw, "no major number found"))?;

    let minor = if rest.is_empty() {
        None
    } else {
        let rest = rest.strip_prefix(':').ok_or_else(|| {
            IgnoreError::invalid_rule(raw, "expected ':' between major and minor number")
        })?;
        let (minor, rest) = scan_unsigned(rest)
            .ok_or_else(|| IgnoreError::invalid_rule(raw, "no minor number found"))?;
        if !rest.is_empty() {
            return Err(IgnoreError::invalid_rule(
                raw,
                "trailing characters after minor number",
            ));
        }
        Some(minor)
    };

    Ok(RuleKind::DeviceNumber {
        comparator,
        major,
        minor,
    })
}

/// Parse the body of an `INODE:` rule: `major:minor:inode`.
fn parse_inode(raw: &str, body: &str) -> Result<RuleKind, IgnoreError> {
    let (major, rest) =
        scan_unsigned(body).ok_or_else(|| IgnoreError::invalid_rule(raw, "no major number"))?;
    let rest = rest
        .strip_prefix(':')
        .ok_or_else(|| IgnoreError::invalid_rule(raw, "no minor number"))?;
    let (minor, rest) =
        scan_unsigned(rest).ok_or_else(|| IgnoreError::invalid_rule(raw, "no minor number"))?;
    let rest = rest
        .strip_prefix(':')
        .ok_or_else(|| IgnoreError::invalid_rule(raw, "no inode number"))?;
    let (inode, rest) =
        scan_unsigned(rest).ok_or_else(|| IgnoreError::invalid_rule(raw, "no inode number"))?;
    if !rest.is_empty() {
        return Err(IgnoreError::invalid_rule(raw, "garbage after inode number"));
    }

    #[allow(clippy::cast_possible_truncation)]
    let dev = libc::makedev(major as libc::c_uint, minor as libc::c_uint);
    Ok(RuleKind::InodeId {
        dev: dev as u64,
        inode,
    })
}

/// Scan an unsigned number with `strtoul`-style base detection: `0x` hex,
/// leading `0` octal, decimal otherwise. Returns the value and the unparsed
/// remainder, or `None` if no digits were found.
fn scan_unsigned(s: &str) -> Option<(u64, &str)> {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' && (bytes[1] == b'x' || bytes[1] == b'X') {
        let digits = &s[2..];
        let end = digits
            .find(|c: char| !c.is_ascii_hexdigit())
            .unwrap_or(digits.len());
        if end == 0 {
            return None;
        }
        let value = u64::from_str_radix(&digits[..end], 16).ok()?;
        return Some((value, &digits[end..]));
    }
    if bytes.first() == Some(&b'0') {
        let end = s
            .find(|c: char| !('0'..='7').contains(&c))
            .unwrap_or(s.len());
        // The leading zero alone is a valid (octal) zero.
        let value = u64::from_str_radix(&s[..end], 8).ok()?;
        return Some((value, &s[end..]));
    }
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

/// Translate a shell glob (including its leading `./`) into regex source.
///
/// Returns the translated source and whether a `**` wildcard was seen.
/// The translation is:
///
/// - `**` (two or more `*`) → `.*`
/// - `*` → `[^/]*`
/// - `?` → `.`
/// - `[…]` bracket expressions copied with `!`/`^` negation translation; a
///   `]` is literal as the first content character or when escaped
/// - `\` enters one-shot escape mode: the next character is copied verbatim
/// - alphanumerics, `/`, `-` copied through; everything else escaped
/// - end anchor `$`, turned into `(?:$|/)` when the glob ends in a separator
fn translate_glob(glob: &str) -> (String, bool) {
    let src: Vec<char> = glob.chars().collect();
    let mut out = String::with_capacity(glob.len() * 2 + 8);
    let mut unbounded = false;
    let mut backslashed = false;
    let mut i = 0;

    while i < src.len() {
        if backslashed {
            // Escaped mode; blindly copy the next character.
            out.push(src[i]);
            i += 1;
            backslashed = false;
            continue;
        }
        match src[i] {
            '*' => {
                if i + 1 < src.len() && src[i + 1] == '*' {
                    unbounded = true;
                    out.push_str(".*");
                    while i < src.len() && src[i] == '*' {
                        i += 1;
                    }
                } else {
                    // one directory level
                    out.push_str("[^/]*");
                    i += 1;
                }
            }
            '?' => {
                out.push('.');
                i += 1;
            }
            '[' => translate_bracketed_expr(&src, &mut i, &mut out),
            c if c.is_ascii_alphanumeric() || c == PATH_SEPARATOR || c == '-' => {
                out.push(c);
                i += 1;
            }
            '\\' => {
                backslashed = true;
                out.push('\\');
                i += 1;
            }
            c if c.is_ascii() => {
                // `.` and all other special characters get escaped.
                out.push('\\');
                out.push(c);
                i += 1;
            }
            c => {
                // Non-ASCII characters carry no regex meaning; copy as-is.
                out.push(c);
                i += 1;
            }
        }
    }

    if !src.is_empty() {
        if src[src.len() - 1] == PATH_SEPARATOR {
            // The glob names a bare directory path: the trailing separator
            // becomes "end-of-string or separator", so `./tmp/` matches the
            // directory itself and anything below it.
            out.pop();
            out.push_str("(?:$|/)");
        } else {
            out.push('$');
        }
    }

    (out, unbounded)
}

/// Translate one bracket expression, advancing `i` past it.
///
/// A leading `!` or `^` becomes regex negation; a `]` only closes the
/// expression after at least one content character, so `[]]` matches a
/// literal `]`. A backslash inside the brackets escapes the next character.
fn translate_bracketed_expr(src: &[char], i: &mut usize, out: &mut String) {
    // zero-based position inside the expression; -1 == outside
    let mut pos: i32 = -1;
    let mut backslashed = false;

    loop {
        let c = src[*i];
        if backslashed {
            out.push(c);
            backslashed = false;
        } else if pos == 0 && (c == '!' || c == '^') {
            // Negation markers do not count as content characters.
            out.push('^');
            *i += 1;
            if *i >= src.len() {
                return;
            }
            continue;
        } else {
            if c == ']' && pos > 0 {
                pos = -1;
            } else {
                // A `]` before any content character is literal; emit it
                // escaped so the engine cannot mistake it for the closer.
                if c == ']' {
                    out.push('\\');
                }
                pos += 1;
            }
            backslashed = c == '\\';
            out.push(c);
        }
        *i += 1;
        if *i >= src.len() || pos < 0 {
            return;
        }
    }
}

/// Compile matcher source with the engine options every rule relies on:
/// start anchoring, dot-matches-everything, prefer-shorter quantifiers, and
/// per-rule case folding.
fn compile_regex(raw: &str, source: &str, case_insensitive: bool) -> Result<Regex, IgnoreError> {
    let anchored = format!("^(?:{source})");
    let regex = RegexBuilder::new(&anchored)
        .case_insensitive(case_insensitive)
        .dot_matches_new_line(true)
        .swap_greed(true)
        .build()
        .map_err(|e| IgnoreError::PatternCompile {
            pattern: raw.to_string(),
            source: anchored.clone(),
            message: e.to_string(),
        })?;
    debug!(pattern = raw, source = %anchored, "compiled ignore rule");
    Ok(regex)
}

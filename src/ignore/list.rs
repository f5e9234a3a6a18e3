//! Ordered rule list with a builtin prefix and a persisted user suffix.
//!
//! The list owns every compiled [`Rule`] for the lifetime of one invocation.
//! It is mutated only at startup (load) and by explicit insert operations;
//! walks treat it as immutable. Builtin rules always occupy a contiguous
//! prefix and are invisible to persistence and dumps.
//!
//! # Persisted format
//!
//! ```text
//! <decimal-user-rule-count>\n
//! <rule-text>\0\n
//! <rule-text>\0\n
//! ```
//!
//! The NUL is the authoritative record terminator; the newline after it is
//! cosmetic so the file stays readable in a pager.

use super::errors::IgnoreError;
use super::pattern::Rule;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Where newly inserted rules land relative to the existing user rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Immediately after the last builtin rule (builtins are never displaced).
    Start,
    /// After the last user rule.
    End,
    /// At the k-th user rule, shifting later user rules down.
    Index(usize),
}

/// Ordered, mutable collection of compiled rules.
///
/// Evaluation order equals list order; insertion never reorders existing
/// rules, it only shifts a contiguous block.
#[derive(Debug, Clone, Default)]
pub struct RuleList {
    /// All rules, builtins first.
    rules: Vec<Rule>,
    /// Length of the builtin prefix.
    builtin_count: usize,
}

impl RuleList {
    /// Create an empty rule list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rules, builtins included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the list holds no rules at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of builtin rules (the fixed prefix).
    #[must_use]
    pub const fn builtin_count(&self) -> usize {
        self.builtin_count
    }

    /// Number of user rules (the persisted suffix).
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.rules.len() - self.builtin_count
    }

    /// Look up a rule by list index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// Iterate over all rules in list order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Grow backing storage to hold at least `additional` more rules.
    /// Used before bulk loads so a single reallocation suffices.
    pub fn reserve(&mut self, additional: usize) {
        self.rules.reserve(additional);
    }

    /// Append a builtin rule to the builtin prefix.
    ///
    /// Builtins are added before any user rules are loaded or inserted and
    /// keep their contiguous-prefix invariant here.
    pub fn add_builtin(&mut self, rule: Rule) {
        self.rules.insert(self.builtin_count, rule);
        self.builtin_count += 1;
    }

    /// Insert user rules at the given position.
    ///
    /// `Start` means "immediately after the last builtin rule"; `Index(k)`
    /// counts user rules from 0. Existing rules keep their relative order.
    ///
    /// # Errors
    ///
    /// Returns [`IgnoreError::InvalidRange`] when `Index(k)` lies beyond the
    /// current user-rule count.
    pub fn insert(&mut self, rules: Vec<Rule>, position: InsertPosition) -> Result<(), IgnoreError> {
        let user_count = self.user_count();
        let at = match position {
            InsertPosition::Start => self.builtin_count,
            InsertPosition::End => self.rules.len(),
            InsertPosition::Index(k) => {
                if k > user_count {
                    return Err(IgnoreError::InvalidRange {
                        index: k,
                        len: user_count,
                    });
                }
                self.builtin_count + k
            }
        };
        self.rules.splice(at..at, rules);
        Ok(())
    }

    /// Parse a persisted rule list from a loaded buffer, appending the rules
    /// it contains as user rules. Returns the number of rules loaded.
    ///
    /// A header count larger than the records actually present is a
    /// diagnostic, not an error: loading stops at the fewer of the two.
    /// Compilation failures abort the whole load; the list is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`IgnoreError::InvalidListFormat`] for an unparseable header
    /// and compilation errors for unparseable rules.
    pub fn load(&mut self, buffer: &[u8]) -> Result<usize, IgnoreError> {
        let Some(header_end) = buffer.iter().position(|&b| b == b'\n') else {
            // No header line means no entries.
            debug!("ignore list has no header line, treating as empty");
            return Ok(0);
        };

        let header = String::from_utf8_lossy(&buffer[..header_end]);
        let count = parse_header_count(header.trim_start())?;

        // All-or-nothing: compile into a scratch list first so a bad rule
        // cannot leave a partial list behind.
        let mut loaded = Vec::new();
        let mut cursor = header_end + 1;
        for _ in 0..count {
            if cursor >= buffer.len() {
                break;
            }
            let record = &buffer[cursor..];
            let (text, advance) = match record.iter().position(|&b| b == 0) {
                Some(nul) => (&record[..nul], nul + 1),
                None => (record, record.len()),
            };
            let text = String::from_utf8_lossy(text);
            loaded.push(Rule::compile(&text)?);
            cursor += advance;
        }

        if loaded.len() < count {
            warn!(
                declared = count,
                present = loaded.len(),
                "ignore list header count exceeds stored patterns"
            );
        }

        let n = loaded.len();
        self.reserve(n);
        self.insert(loaded, InsertPosition::End)?;
        Ok(n)
    }

    /// Load the persisted rule list from a file, memory-mapping it for the
    /// duration of the parse. A missing file is an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be mapped or its contents fail to
    /// parse or compile.
    pub fn load_from_path(&mut self, path: &Path) -> Result<usize> {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no ignore list found");
                return Ok(0);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to open ignore list {}", path.display()));
            }
        };
        // Bounded read: the map lives only for the duration of the parse.
        let map = unsafe { memmap2::Mmap::map(&file) }
            .with_context(|| format!("Failed to map ignore list {}", path.display()))?;
        let count = self.load(&map)?;
        Ok(count)
    }

    /// Write the user rules to `writer` in the persisted format. Builtin
    /// rules are never written.
    ///
    /// # Errors
    /// Returns an error if a write fails.
    pub fn save(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writeln!(writer, "{}", self.user_count())?;
        for rule in self.rules.iter().filter(|r| !r.is_builtin()) {
            writer.write_all(rule.raw_text().as_bytes())?;
            writer.write_all(b"\0\n")?;
        }
        Ok(())
    }

    /// Write the user rules to the given file path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to write ignore list {}", path.display()))?;
        self.save(&mut file)?;
        Ok(())
    }

    /// The ordered user rules with their user-relative positions, for
    /// display purposes only.
    #[must_use]
    pub fn dump(&self) -> Vec<(usize, &str)> {
        self.rules
            .iter()
            .filter(|r| !r.is_builtin())
            .enumerate()
            .map(|(i, r)| (i, r.raw_text()))
            .collect()
    }
}

/// Parse the decimal rule count at the start of the header line.
fn parse_header_count(header: &str) -> Result<usize, IgnoreError> {
    let digits = header
        .find(|c: char| !c.is_ascii_digit())
        .map_or(header, |end| &header[..end]);
    digits.parse().map_err(|_| IgnoreError::InvalidListFormat {
        detail: format!("expected a decimal rule count, found '{header}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_texts(list: &RuleList) -> Vec<&str> {
        list.dump().into_iter().map(|(_, t)| t).collect()
    }

    #[test]
    fn test_insert_append_and_prepend() {
        let mut list = RuleList::new();
        list.insert(vec![Rule::compile("./a").unwrap()], InsertPosition::End)
            .unwrap();
        list.insert(vec![Rule::compile("./b").unwrap()], InsertPosition::End)
            .unwrap();
        list.insert(vec![Rule::compile("./c").unwrap()], InsertPosition::Start)
            .unwrap();
        assert_eq!(user_texts(&list), vec!["./c", "./a", "./b"]);
    }

    #[test]
    fn test_builtins_never_displaced() {
        let mut list = RuleList::new();
        list.add_builtin(Rule::compile_builtin("./sys").unwrap());
        list.insert(vec![Rule::compile("./a").unwrap()], InsertPosition::Start)
            .unwrap();
        assert_eq!(list.builtin_count(), 1);
        assert_eq!(list.len(), 2);
        assert!(list.get(0).unwrap().is_builtin());
        assert_eq!(list.get(1).unwrap().raw_text(), "./a");
        // Dump shows only the user rule.
        assert_eq!(user_texts(&list), vec!["./a"]);
    }

    #[test]
    fn test_insert_at_index_shifts_block() {
        let mut list = RuleList::new();
        for text in ["./a", "./b", "./c"] {
            list.insert(vec![Rule::compile(text).unwrap()], InsertPosition::End)
                .unwrap();
        }
        list.insert(
            vec![
                Rule::compile("./x").unwrap(),
                Rule::compile("./y").unwrap(),
            ],
            InsertPosition::Index(1),
        )
        .unwrap();
        assert_eq!(user_texts(&list), vec!["./a", "./x", "./y", "./b", "./c"]);
    }

    #[test]
    fn test_insert_index_out_of_range() {
        let mut list = RuleList::new();
        list.insert(vec![Rule::compile("./a").unwrap()], InsertPosition::End)
            .unwrap();
        let err = list
            .insert(vec![Rule::compile("./b").unwrap()], InsertPosition::Index(2))
            .unwrap_err();
        assert!(matches!(err, IgnoreError::InvalidRange { index: 2, len: 1 }));
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut list = RuleList::new();
        list.add_builtin(Rule::compile_builtin("./sys").unwrap());
        for text in ["./tmp/**", "t./tmp/keep", "DEVICE:0"] {
            list.insert(vec![Rule::compile(text).unwrap()], InsertPosition::End)
                .unwrap();
        }

        let mut buffer = Vec::new();
        list.save(&mut buffer).unwrap();

        let mut reloaded = RuleList::new();
        let count = reloaded.load(&buffer).unwrap();
        assert_eq!(count, 3);
        assert_eq!(user_texts(&reloaded), vec!["./tmp/**", "t./tmp/keep", "DEVICE:0"]);
        // Builtins are excluded from persistence.
        assert_eq!(reloaded.builtin_count(), 0);
    }

    #[test]
    fn test_load_malformed_header() {
        let mut list = RuleList::new();
        let err = list.load(b"notanumber\n").unwrap_err();
        assert!(matches!(err, IgnoreError::InvalidListFormat { .. }));
    }

    #[test]
    fn test_load_empty_buffer_is_empty_list() {
        let mut list = RuleList::new();
        assert_eq!(list.load(b"").unwrap(), 0);
    }

    #[test]
    fn test_load_overcount_is_tolerated() {
        let mut list = RuleList::new();
        let count = list.load(b"5\n./a\0\n./b\0\n").unwrap();
        assert_eq!(count, 2);
        assert_eq!(user_texts(&list), vec!["./a", "./b"]);
    }

    #[test]
    fn test_load_bad_rule_leaves_list_unchanged() {
        let mut list = RuleList::new();
        list.insert(vec![Rule::compile("./keep").unwrap()], InsertPosition::End)
            .unwrap();
        let err = list.load(b"2\n./ok\0\nbadrule\0\n").unwrap_err();
        assert!(matches!(err, IgnoreError::InvalidRule { .. }));
        assert_eq!(user_texts(&list), vec!["./keep"]);
    }

    #[test]
    fn test_load_from_missing_path() {
        let mut list = RuleList::new();
        let dir = tempfile::tempdir().unwrap();
        let count = list.load_from_path(&dir.path().join("ignore")).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_save_to_path_and_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ignore");

        let mut list = RuleList::new();
        list.insert(vec![Rule::compile("./var/log/*").unwrap()], InsertPosition::End)
            .unwrap();
        list.save_to_path(&path).unwrap();

        let mut reloaded = RuleList::new();
        assert_eq!(reloaded.load_from_path(&path).unwrap(), 1);
        assert_eq!(user_texts(&reloaded), vec!["./var/log/*"]);
    }
}

//! Version numbers and version constraints used to pick application profiles.
//!
//! Versions follow the familiar `1.2.3`, `1.0rc1`, `2.0.post1`, `1.1.dev2`
//! grammar. Constraints are comma-separated clauses that must all hold, for
//! example `~=1.0.0` or `>=1.0, !=1.3.*, <2`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("empty version string")]
    Empty,
    #[error("version '{0}' does not start with a release number")]
    MissingRelease(String),
    #[error("number too large in version '{0}'")]
    NumberTooLarge(String),
    #[error("unexpected '{rest}' in version '{version}'")]
    TrailingText { version: String, rest: String },
    #[error("invalid local label in version '{0}'")]
    InvalidLocal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecifierError {
    #[error("empty clause in version constraint '{0}'")]
    EmptyClause(String),
    #[error("no comparison operator in '{0}'")]
    UnknownOperator(String),
    #[error("no version after the operator in '{0}'")]
    MissingVersion(String),
    #[error("'.*' is only allowed with '==' or '!=' in '{0}'")]
    MisplacedWildcard(String),
    #[error("'~=' needs at least two release segments in '{0}'")]
    CompatibleTooShort(String),
    #[error("invalid version in '{clause}'")]
    InvalidVersion {
        clause: String,
        #[source]
        source: VersionError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha,
    Beta,
    ReleaseCandidate,
}

/// Spellings accepted for each pre-release kind, longest first.
const PRE_RELEASE_TOKENS: [(&str, PreRelease); 8] = [
    ("preview", PreRelease::ReleaseCandidate),
    ("alpha", PreRelease::Alpha),
    ("beta", PreRelease::Beta),
    ("pre", PreRelease::ReleaseCandidate),
    ("rc", PreRelease::ReleaseCandidate),
    ("a", PreRelease::Alpha),
    ("b", PreRelease::Beta),
    ("c", PreRelease::ReleaseCandidate),
];

const POST_RELEASE_TOKENS: [&str; 3] = ["post", "rev", "r"];

/// A parsed version. Equality and ordering ignore trailing zero release
/// segments and any `+local` label, so `1.0`, `1.0.0` and `1.0+build5` are equal.
#[derive(Debug, Clone)]
pub struct Version {
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    text: String,
}

impl Version {
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// True for pre-releases and development releases.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    /// The text the version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    fn trimmed_release(&self) -> &[u64] {
        let end = self
            .release
            .iter()
            .rposition(|&n| n != 0)
            .map_or(0, |i| i + 1);
        &self.release[..end]
    }

    fn same_release(&self, other: &Version) -> bool {
        self.trimmed_release() == other.trimmed_release()
    }

    /// Release segments padded with zeros (or truncated) to `len`.
    fn release_prefix(&self, len: usize) -> impl Iterator<Item = u64> + '_ {
        self.release
            .iter()
            .copied()
            .chain(std::iter::repeat(0))
            .take(len)
    }

    fn starts_with(&self, prefix: &[u64]) -> bool {
        self.release_prefix(prefix.len()).eq(prefix.iter().copied())
    }

    fn sort_key(&self) -> (&[u64], PreKey, Option<u64>, DevKey) {
        let pre = match (self.pre, self.post, self.dev) {
            (Some((kind, n)), _, _) => PreKey::Pre(kind, n),
            (None, None, Some(_)) => PreKey::DevOnly,
            _ => PreKey::Final,
        };
        let dev = self.dev.map_or(DevKey::Release, DevKey::Dev);
        (self.trimmed_release(), pre, self.post, dev)
    }
}

/// `1.0.dev1 < 1.0a1 < 1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    DevOnly,
    Pre(PreRelease, u64),
    Final,
}

/// `1.0a1.dev1 < 1.0a1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DevKey {
    Dev(u64),
    Release,
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn eat(&mut self, token: &str) -> bool {
        let found = self.rest().starts_with(token);
        if found {
            self.pos += token.len();
        }
        found
    }

    fn eat_separator(&mut self) -> bool {
        self.eat(".") || self.eat("-") || self.eat("_")
    }

    fn next_is_digit(&self) -> bool {
        self.rest().starts_with(|c: char| c.is_ascii_digit())
    }

    /// Consume a run of digits. `Ok(None)` when there are none.
    fn number(&mut self) -> Result<Option<u64>, ()> {
        let digits = self
            .rest()
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            return Ok(None);
        }
        let n = self.rest()[..digits].parse().map_err(|_| ())?;
        self.pos += digits;
        Ok(Some(n))
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(VersionError::Empty);
        }
        let lower = text.to_ascii_lowercase();
        let unprefixed = lower.strip_prefix('v').unwrap_or(&lower);
        let public = match unprefixed.split_once('+') {
            Some((public, local)) => {
                let valid = !local.is_empty()
                    && local
                        .split(['.', '-', '_'])
                        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
                if !valid {
                    return Err(VersionError::InvalidLocal(text.to_string()));
                }
                public
            }
            None => unprefixed,
        };

        let too_large = |_| VersionError::NumberTooLarge(text.to_string());
        let mut cur = Cursor {
            text: public,
            pos: 0,
        };

        let mut release = match cur.number().map_err(too_large)? {
            Some(n) => vec![n],
            None => return Err(VersionError::MissingRelease(text.to_string())),
        };
        loop {
            let mark = cur.pos;
            if !cur.eat(".") {
                break;
            }
            match cur.number().map_err(too_large)? {
                Some(n) => release.push(n),
                None => {
                    cur.pos = mark;
                    break;
                }
            }
        }

        let mut pre = None;
        let mark = cur.pos;
        cur.eat_separator();
        if let Some(&(token, kind)) = PRE_RELEASE_TOKENS.iter().find(|(t, _)| cur.rest().starts_with(t)) {
            cur.eat(token);
            cur.eat_separator();
            pre = Some((kind, cur.number().map_err(too_large)?.unwrap_or(0)));
        } else {
            cur.pos = mark;
        }

        let mut post = None;
        let mark = cur.pos;
        if cur.eat("-") && cur.next_is_digit() {
            post = cur.number().map_err(too_large)?;
        } else {
            cur.pos = mark;
            cur.eat_separator();
            if let Some(token) = POST_RELEASE_TOKENS.iter().find(|t| cur.rest().starts_with(*t)) {
                cur.eat(token);
                cur.eat_separator();
                post = Some(cur.number().map_err(too_large)?.unwrap_or(0));
            } else {
                cur.pos = mark;
            }
        }

        let mut dev = None;
        let mark = cur.pos;
        cur.eat_separator();
        if cur.eat("dev") {
            dev = Some(cur.number().map_err(too_large)?.unwrap_or(0));
        } else {
            cur.pos = mark;
        }

        if !cur.rest().is_empty() {
            return Err(VersionError::TrailingText {
                version: text.to_string(),
                rest: cur.rest().to_string(),
            });
        }

        Ok(Version {
            release,
            pre,
            post,
            dev,
            text: text.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Compatible,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// Longest operators first so `<=` is not read as `<`.
const OPERATORS: [(&str, Option<Operator>); 8] = [
    ("===", None),
    ("~=", Some(Operator::Compatible)),
    ("==", Some(Operator::Equal)),
    ("!=", Some(Operator::NotEqual)),
    ("<=", Some(Operator::LessEqual)),
    (">=", Some(Operator::GreaterEqual)),
    ("<", Some(Operator::Less)),
    (">", Some(Operator::Greater)),
];

#[derive(Debug, Clone)]
enum Clause {
    Compare(Operator, Version),
    /// `==1.2.*` and `!=1.2.*`.
    Prefix { negate: bool, release: Vec<u64> },
    /// `===text`, a case-insensitive string comparison.
    Arbitrary(String),
}

impl Clause {
    fn parse(raw: &str, constraint: &str) -> Result<Self, SpecifierError> {
        let clause = raw.trim();
        if clause.is_empty() {
            return Err(SpecifierError::EmptyClause(constraint.to_string()));
        }
        let (op, target) = OPERATORS
            .iter()
            .find_map(|&(token, op)| clause.strip_prefix(token).map(|rest| (op, rest.trim())))
            .ok_or_else(|| SpecifierError::UnknownOperator(clause.to_string()))?;
        if target.is_empty() {
            return Err(SpecifierError::MissingVersion(clause.to_string()));
        }
        let Some(op) = op else {
            return Ok(Clause::Arbitrary(target.to_string()));
        };

        let (target, wildcard) = match target.strip_suffix(".*") {
            Some(prefix) => (prefix, true),
            None => (target, false),
        };
        let version: Version = target
            .parse()
            .map_err(|source| SpecifierError::InvalidVersion {
                clause: clause.to_string(),
                source,
            })?;

        if wildcard {
            let negate = match op {
                Operator::Equal => false,
                Operator::NotEqual => true,
                _ => return Err(SpecifierError::MisplacedWildcard(clause.to_string())),
            };
            return Ok(Clause::Prefix {
                negate,
                release: version.release,
            });
        }
        if op == Operator::Compatible && version.release.len() < 2 {
            return Err(SpecifierError::CompatibleTooShort(clause.to_string()));
        }
        Ok(Clause::Compare(op, version))
    }

    fn contains(&self, v: &Version) -> bool {
        match self {
            Clause::Arbitrary(text) => v.as_str().eq_ignore_ascii_case(text),
            Clause::Prefix { negate, release } => v.starts_with(release) != *negate,
            Clause::Compare(op, target) => match op {
                Operator::Compatible => {
                    let prefix = &target.release[..target.release.len() - 1];
                    v >= target && v.starts_with(prefix)
                }
                Operator::Equal => v == target,
                Operator::NotEqual => v != target,
                Operator::LessEqual => v <= target,
                Operator::GreaterEqual => v >= target,
                // `<1.0` excludes 1.0rc1 unless the bound is itself a pre-release.
                Operator::Less => {
                    v < target
                        && (target.is_prerelease() || !v.is_prerelease() || !v.same_release(target))
                }
                // `>1.0` excludes 1.0.post1 unless the bound is itself a post-release.
                Operator::Greater => {
                    v > target
                        && (target.is_postrelease()
                            || !v.is_postrelease()
                            || !v.same_release(target))
                }
            },
        }
    }

    /// Whether this clause asks for a pre-release, which opts the whole
    /// constraint in to matching pre-releases.
    fn names_prerelease(&self) -> bool {
        match self {
            Clause::Compare(
                Operator::Compatible
                | Operator::Equal
                | Operator::LessEqual
                | Operator::GreaterEqual,
                version,
            ) => version.is_prerelease(),
            Clause::Arbitrary(text) => text
                .parse::<Version>()
                .is_ok_and(|v| v.is_prerelease()),
            _ => false,
        }
    }
}

/// A parsed version constraint. The empty constraint matches every final
/// release.
#[derive(Debug, Clone)]
pub struct Specifier {
    clauses: Vec<Clause>,
}

impl Specifier {
    pub fn contains(&self, version: &Version) -> bool {
        if version.is_prerelease() && !self.clauses.iter().any(Clause::names_prerelease) {
            return false;
        }
        self.clauses.iter().all(|c| c.contains(version))
    }
}

impl FromStr for Specifier {
    type Err = SpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let constraint = s.trim();
        if constraint.is_empty() {
            return Ok(Specifier {
                clauses: Vec::new(),
            });
        }
        let clauses = constraint
            .split(',')
            .map(|raw| Clause::parse(raw, constraint))
            .collect::<Result<_, _>>()?;
        Ok(Specifier { clauses })
    }
}

//! Version-string validation and canonicalisation.
//!
//! The engine never parses versions itself; it asks a [`VersionScheme`].
//! [`NpmSemver`] is the default scheme and mirrors the contract of npm's
//! `semver` package:
//!
//! - **strict** parsing trims whitespace and accepts a single leading `v`;
//! - **loose** parsing additionally strips any run of leading `=`, `v` or
//!   whitespace;
//! - the canonical form is `MAJOR.MINOR.PATCH[-PRERELEASE]` with build
//!   metadata dropped.
//!
//! Numeric identifiers with leading zeros are rejected in both modes.

use std::cmp::Ordering;

use semver::Version;

/// How permissive version parsing should be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strictness {
    /// Optional leading `v`, nothing else.
    Strict,
    /// Any run of leading `=`, `v` or whitespace.
    Loose,
}

/// Validation and canonicalisation of version strings.
pub trait VersionScheme {
    /// Returns `true` if `raw` is a valid version under `mode`.
    fn is_valid(&self, raw: &str, mode: Strictness) -> bool;

    /// Canonical form of `raw` (loose parsing), or `None` if invalid.
    fn clean(&self, raw: &str) -> Option<String>;

    /// Precedence order of two versions, or `None` if either is invalid.
    fn compare(&self, a: &str, b: &str) -> Option<Ordering>;
}

// ---------------------------------------------------------------------------
// NpmSemver
// ---------------------------------------------------------------------------

/// npm-compatible SemVer 2.0 scheme backed by the `semver` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct NpmSemver;

impl NpmSemver {
    fn parse(raw: &str, mode: Strictness) -> Option<Version> {
        let trimmed = raw.trim();
        let stripped = match mode {
            Strictness::Strict => trimmed.strip_prefix('v').unwrap_or(trimmed),
            Strictness::Loose => {
                trimmed.trim_start_matches(|c: char| c == '=' || c == 'v' || c.is_whitespace())
            }
        };
        Version::parse(stripped).ok()
    }

    fn canonical(version: &Version) -> String {
        if version.pre.is_empty() {
            format!("{}.{}.{}", version.major, version.minor, version.patch)
        } else {
            format!(
                "{}.{}.{}-{}",
                version.major, version.minor, version.patch, version.pre
            )
        }
    }
}

impl VersionScheme for NpmSemver {
    fn is_valid(&self, raw: &str, mode: Strictness) -> bool {
        Self::parse(raw, mode).is_some()
    }

    fn clean(&self, raw: &str) -> Option<String> {
        Self::parse(raw, Strictness::Loose).map(|v| Self::canonical(&v))
    }

    fn compare(&self, a: &str, b: &str) -> Option<Ordering> {
        let a = Self::parse(a, Strictness::Loose)?;
        let b = Self::parse(b, Strictness::Loose)?;
        // Build metadata does not participate in precedence.
        Some(a.cmp_precedence(&b))
    }
}

impl<S: VersionScheme + ?Sized> VersionScheme for &S {
    fn is_valid(&self, raw: &str, mode: Strictness) -> bool {
        (**self).is_valid(raw, mode)
    }

    fn clean(&self, raw: &str) -> Option<String> {
        (**self).clean(raw)
    }

    fn compare(&self, a: &str, b: &str) -> Option<Ordering> {
        (**self).compare(a, b)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

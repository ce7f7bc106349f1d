//! Flake references
//!
//! A [`FlakeRef`] locates the source of an input. It is *immutable* when it
//! pins an exact revision; a reference naming only a branch or tag (or
//! nothing at all) floats and can resolve to different content over time.
//!
//! Accepted forms:
//!
//! - `github:<owner>/<repo>[/<ref-or-rev>]`
//! - `git+<https|http|ssh|file>://<url>[?ref=<ref>][&rev=<rev>]`
//! - `path:<absolute path>[?rev=<rev>]` or a bare absolute path
//! - `<id>[/<ref-or-rev>]` or `flake:<id>[/<ref-or-rev>]` for registry aliases
//!
//! A single trailing segment is a revision when it is exactly 40 lowercase
//! hex characters, otherwise a ref. [`FlakeRef`]'s `Display` output is the
//! canonical form and parses back to an equal reference.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::error::FlakeRefError;

const GITHUB_PREFIX: &str = "github:";
const GIT_PREFIX: &str = "git+";
const PATH_PREFIX: &str = "path:";
const ALIAS_PREFIX: &str = "flake:";

/// Transports allowed after `git+`
const GIT_SCHEMES: &[&str] = &["https", "http", "ssh", "file"];

fn is_rev(s: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9a-f]{40}$").unwrap())
        .is_match(s)
}

fn is_ref_name(s: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9@][a-zA-Z0-9_.\-/@]*$").unwrap())
        .is_match(s)
        && !s.contains("..")
        && !s.ends_with('/')
}

fn is_identifier(s: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_\-]*$").unwrap())
        .is_match(s)
}

/// Where a flake reference points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlakeSource {
    /// GitHub repository
    GitHub { owner: String, repo: String },
    /// Git repository reached over a URL (ref/rev query stripped)
    Git { url: String },
    /// Local directory
    Path { path: String },
    /// Registry alias, e.g. `nixpkgs`
    Alias { id: String },
}

/// A parsed, normalized flake reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlakeRef {
    source: FlakeSource,
    git_ref: Option<String>,
    rev: Option<String>,
}

impl FlakeRef {
    /// Whether this reference pins an exact, non-moving revision
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.rev.is_some()
    }

    /// Where the reference points
    #[must_use]
    pub fn source(&self) -> &FlakeSource {
        &self.source
    }

    /// Branch or tag, if any
    #[must_use]
    pub fn git_ref(&self) -> Option<&str> {
        self.git_ref.as_deref()
    }

    /// Pinned revision, if any
    #[must_use]
    pub fn rev(&self) -> Option<&str> {
        self.rev.as_deref()
    }

    fn invalid(reference: &str, reason: impl Into<String>) -> FlakeRefError {
        FlakeRefError::Invalid {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    /// Split a trailing `<ref-or-rev>` segment
    fn ref_or_rev(
        reference: &str,
        segment: Option<&str>,
    ) -> Result<(Option<String>, Option<String>), FlakeRefError> {
        match segment {
            None => Ok((None, None)),
            Some(s) if is_rev(s) => Ok((None, Some(s.to_string()))),
            Some(s) if is_ref_name(s) => Ok((Some(s.to_string()), None)),
            Some(s) => Err(Self::invalid(reference, format!("'{s}' is not a valid ref"))),
        }
    }

    /// Parse the `ref`/`rev` query parameters shared by git and path references
    fn query_ref_rev(
        reference: &str,
        pairs: impl Iterator<Item = (String, String)>,
        allow_ref: bool,
    ) -> Result<(Option<String>, Option<String>), FlakeRefError> {
        let mut git_ref = None;
        let mut rev = None;
        for (key, value) in pairs {
            match key.as_str() {
                "ref" if allow_ref => {
                    if !is_ref_name(&value) {
                        return Err(Self::invalid(reference, format!("'{value}' is not a valid ref")));
                    }
                    git_ref = Some(value);
                }
                "rev" => {
                    if !is_rev(&value) {
                        return Err(Self::invalid(
                            reference,
                            format!("'{value}' is not a 40-character commit hash"),
                        ));
                    }
                    rev = Some(value);
                }
                _ => {
                    return Err(Self::invalid(
                        reference,
                        format!("unsupported parameter '{key}'"),
                    ))
                }
            }
        }
        Ok((git_ref, rev))
    }

    fn parse_github(reference: &str, rest: &str) -> Result<Self, FlakeRefError> {
        let mut parts = rest.splitn(3, '/');
        let owner = parts.next().unwrap_or_default();
        let repo = parts.next().unwrap_or_default();
        if !is_identifier(owner) || !is_identifier(repo) {
            return Err(Self::invalid(reference, "expected github:<owner>/<repo>"));
        }
        let (git_ref, rev) = Self::ref_or_rev(reference, parts.next())?;
        Ok(Self {
            source: FlakeSource::GitHub {
                owner: owner.to_string(),
                repo: repo.to_string(),
            },
            git_ref,
            rev,
        })
    }

    fn parse_git(reference: &str, rest: &str) -> Result<Self, FlakeRefError> {
        let mut url =
            Url::parse(rest).map_err(|e| Self::invalid(reference, e.to_string()))?;
        if !GIT_SCHEMES.contains(&url.scheme()) {
            return Err(FlakeRefError::UnsupportedScheme {
                reference: reference.to_string(),
            });
        }
        if url.fragment().is_some() {
            return Err(Self::invalid(reference, "fragments are not supported"));
        }
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let (git_ref, rev) = Self::query_ref_rev(reference, pairs.into_iter(), true)?;
        url.set_query(None);
        Ok(Self {
            source: FlakeSource::Git {
                url: url.to_string(),
            },
            git_ref,
            rev,
        })
    }

    fn parse_path(reference: &str, rest: &str) -> Result<Self, FlakeRefError> {
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        if !path.starts_with('/') {
            return Err(Self::invalid(reference, "path must be absolute"));
        }
        let pairs = query
            .into_iter()
            .flat_map(|q| url::form_urlencoded::parse(q.as_bytes()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()));
        let (_, rev) = Self::query_ref_rev(reference, pairs, false)?;
        Ok(Self {
            source: FlakeSource::Path {
                path: path.to_string(),
            },
            git_ref: None,
            rev,
        })
    }

    fn parse_alias(reference: &str, rest: &str) -> Result<Self, FlakeRefError> {
        let mut parts = rest.splitn(2, '/');
        let id = parts.next().unwrap_or_default();
        if !is_identifier(id) {
            return Err(FlakeRefError::UnsupportedScheme {
                reference: reference.to_string(),
            });
        }
        let (git_ref, rev) = Self::ref_or_rev(reference, parts.next())?;
        Ok(Self {
            source: FlakeSource::Alias { id: id.to_string() },
            git_ref,
            rev,
        })
    }
}

impl FromStr for FlakeRef {
    type Err = FlakeRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(FlakeRefError::Empty);
        }

        if let Some(rest) = s.strip_prefix(GITHUB_PREFIX) {
            Self::parse_github(s, rest)
        } else if let Some(rest) = s.strip_prefix(GIT_PREFIX) {
            Self::parse_git(s, rest)
        } else if let Some(rest) = s.strip_prefix(PATH_PREFIX) {
            Self::parse_path(s, rest)
        } else if s.starts_with('/') {
            Self::parse_path(s, s)
        } else if let Some(rest) = s.strip_prefix(ALIAS_PREFIX) {
            Self::parse_alias(s, rest)
        } else {
            Self::parse_alias(s, s)
        }
    }
}

impl fmt::Display for FlakeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            FlakeSource::GitHub { owner, repo } => {
                write!(f, "{GITHUB_PREFIX}{owner}/{repo}")?;
                if let Some(segment) = self.rev.as_ref().or(self.git_ref.as_ref()) {
                    write!(f, "/{segment}")?;
                }
                Ok(())
            }
            FlakeSource::Alias { id } => {
                f.write_str(id)?;
                if let Some(segment) = self.rev.as_ref().or(self.git_ref.as_ref()) {
                    write!(f, "/{segment}")?;
                }
                Ok(())
            }
            FlakeSource::Git { url } => {
                write!(f, "{GIT_PREFIX}{url}")?;
                let mut separator = '?';
                if let Some(git_ref) = &self.git_ref {
                    write!(f, "{separator}ref={git_ref}")?;
                    separator = '&';
                }
                if let Some(rev) = &self.rev {
                    write!(f, "{separator}rev={rev}")?;
                }
                Ok(())
            }
            FlakeSource::Path { path } => {
                write!(f, "{PATH_PREFIX}{path}")?;
                if let Some(rev) = &self.rev {
                    write!(f, "?rev={rev}")?;
                }
                Ok(())
            }
        }
    }
}

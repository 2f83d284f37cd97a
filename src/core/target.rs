//! Run stamp and publish target
//!
//! A run captures the wall clock once; the branch name, artifact name,
//! artifact body and commit message all derive from that single stamp.

use super::config::{BranchStrategy, PublishConfig};
use crate::credentials::Credential;
use chrono::{Local, NaiveDate, NaiveDateTime};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

const COMPACT_FORMAT: &str = "%Y%m%d-%H%M%S";
const READABLE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The instant a run started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStamp(NaiveDateTime);

impl RunStamp {
    /// Capture the current local time
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    /// Build a stamp from calendar fields; `None` for an invalid date or time
    pub fn from_ymd_hms(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .map(Self)
    }

    /// `YYYYMMDD-HHMMSS`, used in branch and file names
    pub fn compact(&self) -> String {
        self.0.format(COMPACT_FORMAT).to_string()
    }

    /// `YYYY-MM-DD HH:MM:SS`, used in human-readable text
    pub fn readable(&self) -> String {
        self.0.format(READABLE_FORMAT).to_string()
    }
}

impl fmt::Display for RunStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact())
    }
}

/// Remote location and branch for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    pub remote_name: String,
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl PublishTarget {
    /// Resolve the target for a run; the branch name is fixed from here on
    pub fn for_run(config: &PublishConfig, stamp: &RunStamp) -> Self {
        let branch = match &config.branch {
            BranchStrategy::Static { name } => name.clone(),
            BranchStrategy::Timestamped { prefix } => format!("{}{}", prefix, stamp.compact()),
        };

        Self {
            remote_name: config.github.remote_name.clone(),
            host: config.github.host.clone(),
            owner: config.github.username.clone(),
            repo: config.github.repo.clone(),
            branch,
        }
    }

    /// `owner/repo`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// `https://<owner>:<token>@<host>/<owner>/<repo>.git`
    ///
    /// Kept inside a `SecretString` so the only way to see it is an explicit
    /// `expose_secret()` at the point where git receives it.
    pub fn authenticated_url(&self, credential: &Credential) -> SecretString {
        SecretString::from(format!(
            "https://{}:{}@{}/{}/{}.git",
            self.owner,
            credential.secret().expose_secret(),
            self.host,
            self.owner,
            self.repo
        ))
    }

    /// `https://<host>/<owner>/<repo>`
    pub fn repository_url(&self) -> String {
        format!("https://{}/{}/{}", self.host, self.owner, self.repo)
    }

    /// `https://<host>/<owner>/<repo>/tree/<branch>`
    pub fn branch_url(&self) -> String {
        format!("{}/tree/{}", self.repository_url(), self.branch)
    }
}

/// Check a name against git's ref naming rules (`git check-ref-format`)
pub fn is_valid_branch_name(name: &str) -> bool {
    if name.is_empty() || name == "@" {
        return false;
    }
    if name.starts_with(['-', '/', '.']) || name.ends_with(['/', '.']) {
        return false;
    }
    if name.ends_with(".lock") || name.contains("..") || name.contains("//") {
        return false;
    }
    if name.contains("@{") || name.contains("/.") {
        return false;
    }

    !name
        .chars()
        .any(|c| c.is_control() || matches!(c, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\'))
}

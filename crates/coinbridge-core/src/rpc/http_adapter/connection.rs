use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::CoreError;

/// How requests authenticate against the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Credentials {
    Anonymous,
    UserPass { user: String, pass: String },
    /// Re-read on every request: the daemon rewrites its cookie on restart.
    Cookie(PathBuf),
}

impl Credentials {
    /// Precedence: explicit `user` + `pass`, then `cookie_file`, then none.
    ///
    /// A configured cookie file is read once here so a bad path fails at
    /// startup rather than on the first call.
    pub(super) fn resolve(
        user: Option<&str>,
        pass: Option<&str>,
        cookie_file: Option<&Path>,
    ) -> Result<Self, CoreError> {
        match (user, pass) {
            (Some(u), Some(p)) => {
                return Ok(Self::UserPass {
                    user: u.to_owned(),
                    pass: p.to_owned(),
                })
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(CoreError::Config(
                    "both rpc user and rpc pass must be set together".to_owned(),
                ));
            }
            (None, None) => {}
        }

        match cookie_file {
            None => Ok(Self::Anonymous),
            Some(path) => {
                read_cookie(path)?;
                Ok(Self::Cookie(path.to_owned()))
            }
        }
    }

    /// Basic-auth pair for the next request, if any.
    pub(super) fn basic_auth(&self) -> Result<Option<(String, String)>, CoreError> {
        match self {
            Self::Anonymous => Ok(None),
            Self::UserPass { user, pass } => Ok(Some((user.clone(), pass.clone()))),
            Self::Cookie(path) => read_cookie(path).map(Some),
        }
    }
}

fn read_cookie(path: &Path) -> Result<(String, String), CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CoreError::Config(format!(
            "failed to read rpc cookie file {}: {e}",
            path.display()
        ))
    })?;
    let line = content
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| CoreError::Config(format!("rpc cookie file {} is empty", path.display())))?;

    match line.split_once(':') {
        Some((user, pass)) if !user.is_empty() && !pass.is_empty() => {
            Ok((user.to_owned(), pass.to_owned()))
        }
        _ => Err(CoreError::Config(format!(
            "rpc cookie file {} must contain non-empty `username:password`",
            path.display()
        ))),
    }
}

/// Validate the daemon endpoint; only plain HTTP(S) URLs are accepted.
pub(super) fn parse_connection(connection: &str) -> Result<String, CoreError> {
    let parsed = Url::parse(connection).map_err(|e| {
        CoreError::Config(format!(
            "invalid rpc url `{connection}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(connection.to_owned()),
        other => Err(CoreError::Config(format!(
            "unsupported rpc url scheme `{other}`; expected http or https"
        ))),
    }
}

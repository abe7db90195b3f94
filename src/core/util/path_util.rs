use std::env;
use std::path::{Path, PathBuf};

use crate::errors::{DeployError, DeployResult};

pub struct PathUtil;

impl PathUtil {
    /// Expands `~`, `$VAR` and `${VAR}`, then resolves the result to a canonical path.
    pub fn expand_file_path(raw: &Path) -> DeployResult<PathBuf> {
        let raw_str = raw.to_string_lossy();
        let expanded = Self::expand_vars(&Self::expand_user(&raw_str));
        std::fs::canonicalize(&expanded).map_err(|e| DeployError::io(expanded, e))
    }

    /// Splits a path into `(parent directory, file name)`.
    pub fn split_file_path(path: &Path) -> (String, String) {
        let parent = path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        (parent, name)
    }

    fn expand_user(raw: &str) -> String {
        if raw == "~" || raw.starts_with("~/") {
            if let Ok(home) = env::var("HOME") {
                return format!("{}{}", home, &raw[1..]);
            }
        }
        raw.to_string()
    }

    /// Unset variables are left untouched.
    fn expand_vars(raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
                match braced.find('}') {
                    Some(end) => (&braced[..end], end + 2),
                    None => ("", 0),
                }
            } else {
                let end = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                (&after[..end], end)
            };

            match (name.is_empty(), env::var(name)) {
                (false, Ok(value)) => out.push_str(&value),
                _ => out.push_str(&rest[pos..pos + 1 + consumed]),
            }
            rest = &after[consumed..];
        }

        out.push_str(rest);
        out
    }
}

//! Composing the free-text note: seed it from the day's commits, then let
//! the user edit it in their editor.

use std::io::Write;
use std::process::{Command, Stdio};

use chrono::{Days, NaiveDate};

use crate::error::{Error, Result};

pub const NOT_A_REPO: &str = "<not a git repo>";

pub fn is_git_repo() -> bool {
    Command::new("git")
        .arg("log")
        .arg("-1")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

fn git_user_name() -> Option<String> {
    let out = Command::new("git")
        .args(["config", "--get", "user.name"])
        .output()
        .ok()?;
    let name = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!name.is_empty()).then_some(name)
}

/// `git log` arguments selecting the user's own commits on `day`.
pub fn commit_log_args(day: NaiveDate, author: Option<&str>) -> Vec<String> {
    let next = day.checked_add_days(Days::new(1)).unwrap_or(day);
    let mut args = vec![
        "log".to_string(),
        "--all".to_string(),
        "--no-merges".to_string(),
        "--reverse".to_string(),
        "--pretty=format:%ad: %s%n%b".to_string(),
        format!("--since={} 00:00", day.format("%Y-%m-%d")),
        format!("--until={} 00:00", next.format("%Y-%m-%d")),
    ];
    if let Some(author) = author {
        args.push(format!("--author={}", author));
    }
    args
}

pub fn commit_messages(day: NaiveDate) -> Result<String> {
    let author = git_user_name();
    let out = Command::new("git")
        .args(commit_log_args(day, author.as_deref()))
        .output()?;
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// Seed text for the note on `day`.
pub fn seed(day: NaiveDate) -> Result<String> {
    if is_git_repo() {
        commit_messages(day)
    } else {
        Ok(NOT_A_REPO.to_string())
    }
}

/// Write `seed` to a temp file, open `editor` on it and return the result.
pub fn edit(seed: &str, editor: &str) -> Result<String> {
    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| Error::Io(std::io::Error::other("editor command is empty")))?;

    let mut file = tempfile::Builder::new().prefix("message").tempfile()?;
    writeln!(file, "{}", seed)?;
    file.flush()?;

    log::debug!("Opening {} on {}", program, file.path().display());
    let status = Command::new(program).args(parts).arg(file.path()).status()?;
    if !status.success() {
        return Err(Error::Io(std::io::Error::other(format!(
            "editor '{}' exited with {}",
            editor, status
        ))));
    }

    Ok(std::fs::read_to_string(file.path())?)
}

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory.
///
/// - `None` (or blank) falls back to `<user home>/<default_subdir>`.
/// - A leading `~` is expanded to the user home.
/// - Relative paths are made absolute against the current working directory.
///
/// When `create` is set the directory is created if missing.
pub fn resolve_home_dir(raw: Option<String>, default_subdir: &str, create: bool) -> Result<PathBuf> {
    let resolved = match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => user_home()?.join(default_subdir),
        Some(p) => expand(p)?,
    };

    let absolute = if resolved.is_absolute() {
        resolved
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(resolved)
    };

    if create {
        std::fs::create_dir_all(&absolute)
            .with_context(|| format!("cannot create home dir {}", absolute.display()))?;
    }
    Ok(absolute)
}

fn user_home() -> Result<PathBuf> {
    match dirs::home_dir() {
        Some(h) => Ok(h),
        None => bail!("user home directory is not available"),
    }
}

fn expand(p: &str) -> Result<PathBuf> {
    if p == "~" {
        return user_home();
    }
    if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }
    Ok(Path::new(p).to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested").join("home");
        let resolved =
            resolve_home_dir(Some(target.to_string_lossy().into_owned()), ".foodgram", true)
                .unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn tilde_is_expanded() {
        let resolved = resolve_home_dir(Some("~/.fg_tilde".into()), ".foodgram", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(!resolved.to_string_lossy().starts_with('~'));
        assert!(resolved.ends_with(".fg_tilde"));
    }

    #[test]
    fn blank_uses_default_subdir() {
        let resolved = resolve_home_dir(Some("   ".into()), ".foodgram", false).unwrap();
        assert!(resolved.ends_with(".foodgram"));
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let resolved = resolve_home_dir(Some("relative/home".into()), ".foodgram", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("relative/home"));
    }
}

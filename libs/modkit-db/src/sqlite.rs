//! SQLite specifics: DSN normalization and pool construction.

use std::path::{Path, PathBuf};

#[cfg(feature = "sqlite")]
use std::str::FromStr;

#[cfg(feature = "sqlite")]
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// True for `sqlite::memory:` style DSNs and `mode=memory` URLs.
pub fn is_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// File path addressed by a SQLite DSN, if it is file-backed.
pub fn file_path(dsn: &str) -> Option<PathBuf> {
    if is_memory_dsn(dsn) {
        return None;
    }
    let rest = dsn.strip_prefix("sqlite://").or_else(|| dsn.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    (!path.is_empty()).then(|| PathBuf::from(path))
}

/// Rewrite a relative file DSN so it points under `base`.
/// `sqlite://database/foodgram.db` + `/home/x` → `sqlite:///home/x/database/foodgram.db`.
pub fn absolutize_dsn(dsn: &str, base: &Path) -> String {
    let Some(path) = file_path(dsn) else {
        return dsn.to_string();
    };
    if path.is_absolute() {
        return dsn.to_string();
    }
    let query = dsn.split_once('?').map(|(_, q)| format!("?{q}")).unwrap_or_default();
    let abs = base.join(path);
    format!("sqlite://{}{}", abs.to_string_lossy().replace('\\', "/"), query)
}

#[cfg(feature = "sqlite")]
pub(crate) async fn connect_pool(
    dsn: &str,
    opts: &crate::ConnectOpts,
) -> crate::Result<SqlitePool> {
    let memory = is_memory_dsn(dsn);

    if opts.create_sqlite_dirs {
        if let Some(parent) = file_path(dsn).as_deref().and_then(Path::parent) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let connect = SqliteConnectOptions::from_str(dsn)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(opts.busy_timeout)
        .journal_mode(if memory {
            SqliteJournalMode::Memory
        } else {
            SqliteJournalMode::Wal
        });

    let mut o = SqlitePoolOptions::new();
    if memory {
        // Every connection to :memory: is a separate database; pin a single one.
        o = o.max_connections(1).idle_timeout(None).max_lifetime(None);
    } else if let Some(n) = opts.max_conns {
        o = o.max_connections(n);
    }
    if let Some(t) = opts.acquire_timeout {
        o = o.acquire_timeout(t);
    }

    Ok(o.connect_with(connect).await?)
}

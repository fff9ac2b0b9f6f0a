//! `.env` generation for the database container

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File written into the project root, read by docker compose
pub const ENV_FILE_NAME: &str = ".env";

/// MySQL's superuser; every other user is created by the container on first start
pub const ROOT_USER: &str = "root";

/// Connection and naming fields for the development database container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub container_name: String,
    pub database: String,
}

impl DatabaseSettings {
    /// Development defaults derived from the project name
    pub fn for_project(project_name: &str) -> Self {
        let slug = slugify(project_name);
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: ROOT_USER.to_string(),
            password: "password".to_string(),
            container_name: format!("{}-db", slug),
            database: slug.replace('-', "_"),
        }
    }

    /// The non-root account the container should create, if any
    pub fn app_user(&self) -> Option<&str> {
        (self.user != ROOT_USER).then_some(self.user.as_str())
    }

    /// Render as `KEY=value` lines with a trailing newline.
    ///
    /// `DB_APP_USER` / `DB_APP_PASSWORD` are left empty for the root user so
    /// the MySQL image only creates an extra account when one was asked for.
    pub fn render(&self) -> Result<String> {
        let (app_user, app_password) = match self.app_user() {
            Some(user) => (user.to_string(), self.password.clone()),
            None => (String::new(), String::new()),
        };
        let entries = [
            ("DB_HOST", self.host.clone()),
            ("DB_PORT", self.port.to_string()),
            ("DB_USER", self.user.clone()),
            ("DB_PASSWORD", self.password.clone()),
            ("DB_CONTAINER_NAME", self.container_name.clone()),
            ("DB_DATABASE", self.database.clone()),
            ("DB_APP_USER", app_user),
            ("DB_APP_PASSWORD", app_password),
        ];

        let mut out = String::new();
        for (key, value) in entries {
            let value = quote_value(&value)
                .with_context(|| format!("Cannot write {} to {}", key, ENV_FILE_NAME))?;
            out.push_str(key);
            out.push('=');
            out.push_str(&value);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Write `<dir>/.env`, replacing any existing file
pub async fn write_env_file(dir: &Path, settings: &DatabaseSettings) -> Result<PathBuf> {
    let path = dir.join(ENV_FILE_NAME);
    let content = settings.render()?;
    fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote env file");
    Ok(path)
}

/// Lowercase, keep `[a-z0-9-]`, collapse everything else to `-`
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "app".to_string()
    } else {
        slug.to_string()
    }
}

// Compose interpolates `$` in unquoted and double-quoted values. Single-quoted
// values are literal but have no escape for `'`.
fn quote_value(value: &str) -> Result<String> {
    if value.contains('$') {
        if value.contains('\'') || value.contains('\n') {
            bail!("values containing `$` cannot also contain `'` or a line break");
        }
        return Ok(format!("'{}'", value));
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\''))
    {
        Ok(format!(
            "\"{}\"",
            value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n")
        ))
    } else {
        Ok(value.to_string())
    }
}

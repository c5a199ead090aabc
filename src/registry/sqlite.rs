//! Registry store persisted in SQLite.
//!
//! Keys live in `registry_keys` (one row per key, linked through
//! `parent_path`); values live in `registry_values`.

use std::path::Path;
use std::rc::Rc;

use rusqlite::{params, OptionalExtension};

use super::{normalize_path, path_components, RegistryStore, RegistryValue};
use crate::database::Database;
use crate::types::errors::RegistryError;

/// Registry store backed by a [`Database`].
///
/// Several registries on one thread may share the same connection.
pub struct SqliteRegistry {
    db: Rc<Database>,
}

impl SqliteRegistry {
    pub fn new(db: Rc<Database>) -> Self {
        Self { db }
    }

    /// Opens (or creates) the database file and wraps it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        Ok(Self::new(Rc::new(Database::open(path)?)))
    }

    pub fn open_in_memory() -> Result<Self, RegistryError> {
        Ok(Self::new(Rc::new(Database::open_in_memory()?)))
    }

    pub fn database(&self) -> &Rc<Database> {
        &self.db
    }

    /// Returns the canonical path, failing when the key is absent.
    fn existing_key(&self, path: &str) -> Result<String, RegistryError> {
        let canonical = normalize_path(path)?;
        if !self.exists_canonical(&canonical)? {
            return Err(RegistryError::KeyNotFound(path.to_string()));
        }
        Ok(canonical)
    }

    fn exists_canonical(&self, canonical: &str) -> Result<bool, RegistryError> {
        let count: i64 = self.db.connection().query_row(
            "SELECT COUNT(*) FROM registry_keys WHERE path = ?1",
            params![canonical],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl RegistryStore for SqliteRegistry {
    fn create_key(&mut self, path: &str) -> Result<(), RegistryError> {
        let components = path_components(path)?;
        let tx = self.db.connection().unchecked_transaction()?;
        for depth in 1..=components.len() {
            let key_path = components[..depth].join("\\");
            let parent_path = (depth > 1).then(|| components[..depth - 1].join("\\"));
            tx.execute(
                "INSERT OR IGNORE INTO registry_keys (path, parent_path, name) VALUES (?1, ?2, ?3)",
                params![key_path, parent_path, components[depth - 1]],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn key_exists(&self, path: &str) -> Result<bool, RegistryError> {
        self.exists_canonical(&normalize_path(path)?)
    }

    fn set_value(&mut self, path: &str, name: &str, value: RegistryValue) -> Result<(), RegistryError> {
        let key_path = self.existing_key(path)?;
        let (kind, text_value, dword_value) = match value {
            RegistryValue::String(s) => ("string", Some(s), None),
            RegistryValue::Dword(d) => ("dword", None, Some(i64::from(d))),
        };
        self.db.connection().execute(
            "INSERT OR REPLACE INTO registry_values (key_path, name, kind, text_value, dword_value) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![key_path, name, kind, text_value, dword_value],
        )?;
        Ok(())
    }

    fn get_value(&self, path: &str, name: &str) -> Result<Option<RegistryValue>, RegistryError> {
        let key_path = self.existing_key(path)?;
        let row = self
            .db
            .connection()
            .query_row(
                "SELECT kind, text_value, dword_value FROM registry_values WHERE key_path = ?1 AND name = ?2",
                params![key_path, name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((kind, text_value, dword_value)) = row else {
            return Ok(None);
        };

        match kind.as_str() {
            "string" => Ok(Some(RegistryValue::String(text_value.unwrap_or_default()))),
            "dword" => {
                let raw = dword_value.unwrap_or_default();
                let dword = u32::try_from(raw).map_err(|_| {
                    RegistryError::TypeMismatch(format!("{}\\{} holds {} which is not a DWORD", key_path, name, raw))
                })?;
                Ok(Some(RegistryValue::Dword(dword)))
            }
            other => Err(RegistryError::TypeMismatch(format!(
                "{}\\{} has unknown kind '{}'",
                key_path, name, other
            ))),
        }
    }

    fn subkeys(&self, path: &str) -> Result<Vec<String>, RegistryError> {
        let key_path = self.existing_key(path)?;
        let conn = self.db.connection();
        let mut stmt = conn.prepare("SELECT name FROM registry_keys WHERE parent_path = ?1 ORDER BY name")?;
        let rows = stmt.query_map(params![key_path], |row| row.get::<_, String>(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    fn delete_key(&mut self, path: &str) -> Result<(), RegistryError> {
        let key_path = self.existing_key(path)?;
        // substr() rather than LIKE: key names routinely contain '_'.
        let prefix = format!("{}\\", key_path);
        let tx = self.db.connection().unchecked_transaction()?;
        tx.execute(
            "DELETE FROM registry_values WHERE key_path = ?1 OR substr(key_path, 1, length(?2)) = ?2",
            params![key_path, prefix],
        )?;
        tx.execute(
            "DELETE FROM registry_keys WHERE path = ?1 OR substr(path, 1, length(?2)) = ?2",
            params![key_path, prefix],
        )?;
        tx.commit()?;
        Ok(())
    }
}

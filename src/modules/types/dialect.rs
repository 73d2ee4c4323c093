//! SQL dialect definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL dialects understood by the engine layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL database
    Postgresql,
    /// MySQL / MariaDB database
    Mysql,
    /// SQLite embedded database
    Sqlite,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Dialect {
    /// Returns all supported dialects
    pub fn all() -> &'static [Dialect] {
        &[Dialect::Postgresql, Dialect::Mysql, Dialect::Sqlite]
    }

    /// Dialect name as it appears in driver identifiers
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgresql => "postgresql",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// URL scheme expected by the sqlx backend for this dialect
    pub fn engine_scheme(&self) -> &'static str {
        match self {
            Dialect::Postgresql => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Returns true if connections go over the network (host required)
    pub fn is_networked(&self) -> bool {
        !matches!(self, Dialect::Sqlite)
    }

    /// Returns true if positional placeholders are numbered (`$1`, `$2`, ...)
    /// rather than anonymous (`?`)
    pub fn numbered_placeholders(&self) -> bool {
        matches!(self, Dialect::Postgresql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_schemes() {
        assert_eq!(Dialect::Postgresql.engine_scheme(), "postgres");
        assert_eq!(Dialect::Mysql.engine_scheme(), "mysql");
        assert_eq!(Dialect::Sqlite.engine_scheme(), "sqlite");
    }

    #[test]
    fn test_dialect_flags() {
        assert!(Dialect::Postgresql.is_networked());
        assert!(!Dialect::Sqlite.is_networked());
        assert!(Dialect::Postgresql.numbered_placeholders());
        assert!(!Dialect::Mysql.numbered_placeholders());
    }
}

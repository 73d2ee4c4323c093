//! Driver identifier definitions
//!
//! The set of drivers is closed: every identifier maps to a fixed
//! [`DriverSpec`] entry and anything else is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dialect::Dialect;

/// Static description of a driver identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSpec {
    /// Canonical identifier, used as the URL scheme of rendered block URLs
    pub identifier: &'static str,
    /// Wire dialect
    pub dialect: Dialect,
    /// Backend module that implements the dialect
    pub module: &'static str,
    /// Whether the driver is used through the async connector
    pub asynchronous: bool,
}

const POSTGRESQL: DriverSpec = DriverSpec {
    identifier: "postgresql",
    dialect: Dialect::Postgresql,
    module: "sqlx::postgres",
    asynchronous: false,
};

const POSTGRESQL_ASYNC: DriverSpec = DriverSpec {
    identifier: "postgresql+async",
    dialect: Dialect::Postgresql,
    module: "sqlx::postgres",
    asynchronous: true,
};

const MYSQL: DriverSpec = DriverSpec {
    identifier: "mysql",
    dialect: Dialect::Mysql,
    module: "sqlx::mysql",
    asynchronous: false,
};

const MYSQL_ASYNC: DriverSpec = DriverSpec {
    identifier: "mysql+async",
    dialect: Dialect::Mysql,
    module: "sqlx::mysql",
    asynchronous: true,
};

const SQLITE: DriverSpec = DriverSpec {
    identifier: "sqlite",
    dialect: Dialect::Sqlite,
    module: "sqlx::sqlite",
    asynchronous: false,
};

const SQLITE_ASYNC: DriverSpec = DriverSpec {
    identifier: "sqlite+async",
    dialect: Dialect::Sqlite,
    module: "sqlx::sqlite",
    asynchronous: true,
};

/// Supported database drivers
///
/// A bare dialect name selects the blocking driver; the `+async` suffix
/// selects the async one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Driver {
    /// PostgreSQL through the blocking connector
    #[serde(rename = "postgresql", alias = "postgres")]
    Postgresql,
    /// PostgreSQL through the async connector
    #[serde(rename = "postgresql+async", alias = "postgres+async")]
    PostgresqlAsync,
    /// MySQL through the blocking connector
    #[serde(rename = "mysql")]
    Mysql,
    /// MySQL through the async connector
    #[serde(rename = "mysql+async")]
    MysqlAsync,
    /// SQLite through the blocking connector
    #[serde(rename = "sqlite")]
    Sqlite,
    /// SQLite through the async connector
    #[serde(rename = "sqlite+async")]
    SqliteAsync,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().identifier)
    }
}

impl FromStr for Driver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(Driver::Postgresql),
            "postgresql+async" | "postgres+async" => Ok(Driver::PostgresqlAsync),
            "mysql" => Ok(Driver::Mysql),
            "mysql+async" => Ok(Driver::MysqlAsync),
            "sqlite" => Ok(Driver::Sqlite),
            "sqlite+async" => Ok(Driver::SqliteAsync),
            _ => Err(format!("Unknown driver: {}", s)),
        }
    }
}

impl Driver {
    /// Returns all supported drivers
    pub fn all() -> &'static [Driver] {
        &[
            Driver::Postgresql,
            Driver::PostgresqlAsync,
            Driver::Mysql,
            Driver::MysqlAsync,
            Driver::Sqlite,
            Driver::SqliteAsync,
        ]
    }

    /// Lookup table entry for this driver
    pub const fn spec(self) -> DriverSpec {
        match self {
            Driver::Postgresql => POSTGRESQL,
            Driver::PostgresqlAsync => POSTGRESQL_ASYNC,
            Driver::Mysql => MYSQL,
            Driver::MysqlAsync => MYSQL_ASYNC,
            Driver::Sqlite => SQLITE,
            Driver::SqliteAsync => SQLITE_ASYNC,
        }
    }

    pub fn dialect(self) -> Dialect {
        self.spec().dialect
    }

    pub fn is_async(self) -> bool {
        self.spec().asynchronous
    }

    /// Canonical identifier
    pub fn identifier(self) -> &'static str {
        self.spec().identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_from_str() {
        assert_eq!(Driver::from_str("postgresql").unwrap(), Driver::Postgresql);
        assert_eq!(Driver::from_str("postgres").unwrap(), Driver::Postgresql);
        assert_eq!(
            Driver::from_str("PostgreSQL+Async").unwrap(),
            Driver::PostgresqlAsync
        );
        assert_eq!(Driver::from_str("mysql+async").unwrap(), Driver::MysqlAsync);
        assert_eq!(Driver::from_str("sqlite").unwrap(), Driver::Sqlite);
        assert!(Driver::from_str("oracle").is_err());
        assert!(Driver::from_str("sqlite+threaded").is_err());
    }

    #[test]
    fn test_driver_table_is_consistent() {
        for driver in Driver::all() {
            let spec = driver.spec();
            assert_eq!(Driver::from_str(spec.identifier).unwrap(), *driver);
            assert_eq!(spec.asynchronous, spec.identifier.ends_with("+async"));
            assert!(spec.identifier.starts_with(spec.dialect.name()));
            assert!(spec.module.ends_with(spec.dialect.engine_scheme()));
        }
    }

    #[test]
    fn test_driver_display() {
        assert_eq!(Driver::Postgresql.to_string(), "postgresql");
        assert_eq!(Driver::SqliteAsync.to_string(), "sqlite+async");
    }

    #[test]
    fn test_driver_serde() {
        let json = serde_json::to_string(&Driver::MysqlAsync).unwrap();
        assert_eq!(json, "\"mysql+async\"");

        let driver: Driver = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(driver, Driver::Postgresql);

        assert!(serde_json::from_str::<Driver>("\"mssql\"").is_err());
    }
}

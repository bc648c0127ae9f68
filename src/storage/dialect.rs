//! SQL dialect substitutions.
//!
//! Queries are written once and rendered for the target database by the
//! few helpers here. Only SQLite is executed by this crate; the other
//! dialects exist so that generated SQL can be inspected or handed to
//! another driver.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    #[default]
    Sqlite,
    Postgres,
    MySql,
    SqlServer,
    Oracle,
}

impl Dialect {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgresql",
            Self::MySql => "mysql",
            Self::SqlServer => "ms-sql",
            Self::Oracle => "oracle",
        }
    }

    /// Column expression for a documentation column in a select list.
    ///
    /// Oracle stores documentation as CLOB, which cannot be grouped or
    /// compared, so it is read through `TO_CHAR`.
    #[must_use]
    pub fn documentation(&self, column: &str) -> String {
        match self {
            Self::Oracle => {
                let bare = column.rsplit('.').next().unwrap_or(column);
                format!("TO_CHAR({column}) AS {bare}")
            }
            _ => match column.rsplit_once('.') {
                Some((_, bare)) => format!("{column} AS {bare}"),
                None => column.to_string(),
            },
        }
    }

    /// Case-insensitive LIKE predicate against a bound parameter.
    #[must_use]
    pub fn like_insensitive(&self, column: &str) -> String {
        match self {
            Self::Postgres => format!("{column} ILIKE ?"),
            _ => format!("UPPER({column}) LIKE UPPER(?)"),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "ms-sql" | "mssql" | "sqlserver" | "sql-server" => Ok(Self::SqlServer),
            "oracle" => Ok(Self::Oracle),
            other => Err(Error::Config(format!("unknown dialect '{other}'"))),
        }
    }
}

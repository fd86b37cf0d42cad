//! Back-end dialect selection.
//!
//! The dialect only affects how string literals are escaped and which
//! operator is used for case-insensitive search. Identifiers are never quoted.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Relational engine whose literal conventions apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "String")]
pub enum Dialect {
    /// PostgreSQL: quote doubling, `ILIKE`.
    #[default]
    Postgres,
    /// SQLite: quote doubling, `LIKE`.
    Sqlite,
    /// Anything else: strings are embedded verbatim, `LIKE`.
    Generic,
}

impl Dialect {
    /// Tag as used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite3",
            Dialect::Generic => "generic",
        }
    }

    /// Whether string literals get their single quotes doubled.
    pub fn escapes_quotes(self) -> bool {
        matches!(self, Dialect::Postgres | Dialect::Sqlite)
    }

    /// Operator used by search predicates.
    pub fn like_operator(self) -> &'static str {
        match self {
            Dialect::Postgres => "ILIKE",
            Dialect::Sqlite | Dialect::Generic => "LIKE",
        }
    }

    /// Escape the body of a string literal (without the surrounding quotes).
    pub fn escape_str(self, input: &str) -> String {
        if self.escapes_quotes() {
            input.replace('\'', "''")
        } else {
            input.to_string()
        }
    }
}

impl FromStr for Dialect {
    type Err = std::convert::Infallible;

    /// Unknown tags select [`Dialect::Generic`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Dialect::Postgres,
            "sqlite3" | "sqlite" => Dialect::Sqlite,
            _ => Dialect::Generic,
        })
    }
}

impl From<String> for Dialect {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(d) => d,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags() {
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("sqlite3".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::Generic);
        assert_eq!("".parse::<Dialect>().unwrap(), Dialect::Generic);
    }

    #[test]
    fn escaping_depends_on_dialect() {
        assert_eq!(Dialect::Postgres.escape_str("O'Brien"), "O''Brien");
        assert_eq!(Dialect::Sqlite.escape_str("O'Brien"), "O''Brien");
        assert_eq!(Dialect::Generic.escape_str("O'Brien"), "O'Brien");
    }

    #[test]
    fn like_operator_per_dialect() {
        assert_eq!(Dialect::Postgres.like_operator(), "ILIKE");
        assert_eq!(Dialect::Sqlite.like_operator(), "LIKE");
        assert_eq!(Dialect::Generic.like_operator(), "LIKE");
    }
}

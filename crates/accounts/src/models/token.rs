use chrono::{DateTime, Utc};
use querygen::{Entity, FromRow};
use serde::Serialize;

/// An issued access or refresh token. Rows are written once and never updated.
#[derive(Debug, Clone, Default, Serialize, Entity, FromRow)]
#[orm(table = "tokens")]
pub struct Token {
    #[orm(skip_insert, skip_update)]
    pub id: i64,
    #[orm(skip_update)]
    pub token: String,
    #[orm(skip_update)]
    pub is_refresh_token: bool,
    #[orm(skip_update)]
    #[serde(skip_serializing)]
    pub user_id: i64,
    #[orm(skip_update)]
    pub expires_at: DateTime<Utc>,
    #[orm(skip_update)]
    pub created_at: DateTime<Utc>,
}

impl Token {
    pub fn new(
        signed: impl Into<String>,
        is_refresh_token: bool,
        expires_at: DateTime<Utc>,
        user_id: i64,
    ) -> Self {
        Self {
            id: 0,
            token: signed.into(),
            is_refresh_token,
            user_id,
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// The value handed to clients: `<id>|<signed token>`.
    pub fn bearer(&self) -> String {
        format!("{}|{}", self.id, self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefixes_the_row_id() {
        let mut token = Token::new("abc.def", false, Utc::now(), 4);
        token.id = 12;
        assert_eq!(token.bearer(), "12|abc.def");
    }

    #[test]
    fn token_rows_are_never_updated() {
        assert!(Token::columns().iter().all(|c| !c.updatable()));
        assert!(!Token::columns()[0].insertable());
    }
}

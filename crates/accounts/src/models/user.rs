use chrono::{DateTime, Utc};
use querygen::{Entity, FromRow};
use serde::Serialize;

/// Public part of a user, as shown in listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Entity, FromRow)]
#[orm(table = "users")]
pub struct UserSummary {
    #[orm(skip_insert, skip_update)]
    pub id: i64,
    pub display_name: String,
    #[orm(skip_update)]
    pub created_at: DateTime<Utc>,
}

/// A full `users` row.
///
/// The password hash and permission flags are stored but never serialized.
#[derive(Debug, Clone, Default, Serialize, Entity, FromRow)]
#[orm(table = "users")]
pub struct User {
    #[orm(flatten, id)]
    #[serde(flatten)]
    pub summary: UserSummary,
    pub phone_number: String,
    #[orm(nil_on_empty)]
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub is_admin: bool,
    #[serde(skip_serializing)]
    pub is_superuser: bool,
}

impl User {
    /// An empty user whose `created_at` is now.
    pub fn new() -> Self {
        Self {
            summary: UserSummary {
                created_at: Utc::now(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// A user to load by id.
    pub fn with_id(id: i64) -> Self {
        let mut user = Self::default();
        user.summary.id = id;
        user
    }

    pub fn id(&self) -> i64 {
        self.summary.id
    }
}

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use querygen::{Entity, Filter, FromRow, Generator, Identified, SqlValue};

#[derive(Debug, Default, Entity, FromRow)]
#[orm(table = "users")]
struct User {
    #[orm(skip_insert)]
    id: i64,
    phone: String,
    active: bool,
}

#[derive(Debug, Default, Entity, FromRow)]
#[orm(table = "profiles")]
struct Profile {
    #[orm(id, skip_insert, skip_update)]
    profile_id: i64,
    #[orm(column = "display_name")]
    name: String,
    #[orm(nil_on_empty)]
    email: String,
    #[orm(nil_on_empty)]
    age: i32,
    #[orm(skip_update)]
    created_at: Option<DateTime<Utc>>,
    #[orm(skip)]
    cached_rank: u32,
}

#[derive(Debug, Default, Entity, FromRow)]
struct Audit {
    message: String,
}

#[derive(Debug, Default, Entity, FromRow)]
#[orm(table = "admins")]
struct Admin {
    #[orm(flatten, id)]
    user: User,
    level: i32,
}

#[test]
fn columns_follow_declaration_order() {
    let names: Vec<_> = Profile::columns().iter().map(|c| c.name).collect();
    assert_eq!(names, ["profile_id", "display_name", "email", "age", "created_at"]);

    let fields: Vec<_> = Profile::columns().iter().map(|c| c.field).collect();
    assert_eq!(fields[1], "name");
}

#[test]
fn flags_are_carried_per_column() {
    let columns = Profile::columns();
    assert!(!columns[0].insertable());
    assert!(columns[2].nil_on_empty);
    assert!(!columns[4].updatable());
    assert!(columns[1].insertable() && columns[1].updatable());
}

#[test]
fn identity_comes_from_name_or_attribute() {
    assert_eq!(User::ID_COLUMN, Some("id"));
    assert_eq!(Profile::ID_COLUMN, Some("profile_id"));
    assert_eq!(Audit::ID_COLUMN, None);

    let profile = Profile {
        profile_id: 9,
        ..Default::default()
    };
    assert_eq!(profile.id(), 9);
}

#[test]
fn default_table_name_is_plural() {
    assert_eq!(Audit::TABLE, "audits");
    assert_eq!(User::TABLE, "users");
}

#[test]
fn values_align_with_columns() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap();
    let profile = Profile {
        profile_id: 1,
        name: "Ann".into(),
        email: String::new(),
        age: 0,
        created_at: Some(at),
        cached_rank: 3,
    };
    let values = profile.values();
    assert_eq!(values.len(), Profile::columns().len());
    assert_eq!(values[1], SqlValue::Text("Ann".into()));
    assert_eq!(values[4], SqlValue::Timestamp(at));
}

#[test]
fn insert_statement_from_derived_entity() {
    let mut users = Generator::for_entity(User {
        id: 0,
        phone: "555".into(),
        active: true,
    });
    assert_eq!(
        users.insert_into().to_text(),
        "INSERT INTO users (phone, active) VALUES('555', TRUE);"
    );
}

#[test]
fn nil_on_empty_fields_insert_as_null() {
    let mut profiles = Generator::for_entity(Profile {
        name: "Ann".into(),
        ..Default::default()
    });
    assert_eq!(
        profiles.insert_into().to_text(),
        "INSERT INTO profiles (display_name, email, age, created_at) VALUES('Ann', NULL, NULL, NULL);"
    );
}

#[test]
fn identity_scoped_statements_use_the_identity_column() {
    let mut profiles = Generator::for_entity(Profile {
        profile_id: 4,
        name: "Ann".into(),
        age: 30,
        ..Default::default()
    });
    assert_eq!(
        profiles.delete_me().to_text(),
        "DELETE FROM profiles WHERE profile_id = 4;"
    );
    assert_eq!(
        profiles.update_me().unwrap().to_text(),
        "UPDATE profiles SET display_name = 'Ann', email = NULL, age = 30 WHERE profile_id = 4;"
    );
}

#[test]
fn flattened_entity_splices_columns_and_identity() {
    let names: Vec<_> = Admin::columns().iter().map(|c| c.name).collect();
    assert_eq!(names, ["id", "phone", "active", "level"]);
    assert_eq!(Admin::ID_COLUMN, Some("id"));

    let mut admin = Admin {
        user: User {
            id: 2,
            phone: "777".into(),
            active: true,
        },
        level: 5,
    };
    assert_eq!(admin.id(), 2);
    if let Some(slot) = admin.id_slot() {
        *slot = 8;
    }
    assert_eq!(admin.user.id, 8);

    let mut admins = Generator::for_entity(admin);
    assert_eq!(
        admins.select(Filter::new().eq("level", 5)).to_text(),
        "SELECT id, phone, active, level FROM admins WHERE level = 5;"
    );
}

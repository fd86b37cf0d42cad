use super::*;
use crate::entity::Column;
use crate::value::ToSqlValue;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct User {
    id: i64,
    phone: String,
    active: bool,
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const ID_COLUMN: Option<&'static str> = Some("id");

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("id", "id").skip_insert(),
            Column::new("phone", "phone"),
            Column::new("active", "active"),
        ];
        COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.to_sql_value(),
            self.phone.to_sql_value(),
            self.active.to_sql_value(),
        ]
    }

    fn id_slot(&mut self) -> Option<&mut i64> {
        Some(&mut self.id)
    }
}

impl Identified for User {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default)]
struct Profile {
    id: i64,
    bio: String,
    age: i32,
    nickname: Option<String>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Entity for Profile {
    const TABLE: &'static str = "profiles";

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("id", "id").skip_insert().skip_update(),
            Column::new("bio", "bio").nil_on_empty(),
            Column::new("age", "age").nil_on_empty(),
            Column::new("nickname", "nickname"),
            Column::new("created_at", "created_at").skip_update(),
        ];
        COLUMNS
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.to_sql_value(),
            self.bio.to_sql_value(),
            self.age.to_sql_value(),
            self.nickname.to_sql_value(),
            self.created_at.to_sql_value(),
        ]
    }
}

fn user() -> Generator<User> {
    Generator::for_entity(User {
        id: 0,
        phone: "555".into(),
        active: true,
    })
}

#[test]
fn insert_skips_skip_insert_columns() {
    let mut g = user();
    g.insert_into();
    assert_eq!(
        g.to_text(),
        "INSERT INTO users (phone, active) VALUES('555', TRUE);"
    );
    assert_eq!(g.pending_kind(), None);
}

#[test]
fn insert_pending_text_has_no_terminator() {
    let mut g = user();
    g.insert_into();
    assert_eq!(
        g.pending(),
        Some("INSERT INTO users (phone, active) VALUES('555', TRUE)")
    );
    assert_eq!(g.pending_kind(), Some(StatementKind::Insert));
}

#[test]
fn insert_applies_nil_on_empty_per_column() {
    let mut g = Generator::for_entity(Profile::default());
    g.insert_into();
    assert_eq!(
        g.to_text(),
        "INSERT INTO profiles (bio, age, nickname, created_at) VALUES(NULL, NULL, NULL, NULL);"
    );

    g.row_mut().bio = "hi".into();
    g.row_mut().age = 30;
    g.insert_into();
    assert_eq!(
        g.to_text(),
        "INSERT INTO profiles (bio, age, nickname, created_at) VALUES('hi', 30, NULL, NULL);"
    );
}

#[test]
fn insert_multi_emits_one_values_list() {
    let rows = vec![
        User { id: 0, phone: "1".into(), active: true },
        User { id: 0, phone: "2".into(), active: false },
    ];
    let mut g = user();
    g.insert_into_multi(&rows).unwrap();
    assert_eq!(
        g.to_text(),
        "INSERT INTO users (phone, active) VALUES ('1', TRUE), ('2', FALSE);"
    );
    assert!(g.insert_into_multi(&Vec::new()).unwrap_err().is_misuse());
}

#[test]
fn select_without_filter_has_no_where() {
    let mut g = user();
    g.select(Filter::new());
    assert_eq!(g.to_text(), "SELECT id, phone, active FROM users;");
}

#[test]
fn select_filter_renders_null_as_is_null() {
    let mut filter = HashMap::new();
    filter.insert("id", SqlValue::from(5));
    filter.insert("active", SqlValue::Null);

    let mut g = user();
    g.select(filter);
    let text = g.to_text();
    let predicate = text
        .strip_prefix("SELECT id, phone, active FROM users WHERE ")
        .and_then(|rest| rest.strip_suffix(';'))
        .expect("select with where");
    let mut clauses: Vec<_> = predicate.split(" AND ").collect();
    clauses.sort();
    assert_eq!(clauses, ["active IS NULL", "id = 5"]);
}

#[test]
fn select_where_uses_raw_predicate() {
    let mut g = user();
    g.select_where("phone LIKE '5%'");
    assert_eq!(
        g.to_text(),
        "SELECT id, phone, active FROM users WHERE phone LIKE '5%';"
    );
    g.select_where("");
    assert_eq!(g.to_text(), "SELECT id, phone, active FROM users;");
}

#[test]
fn select_count_matches_expected_text() {
    let mut g = user();
    g.select_count([("phone", "555")]);
    assert_eq!(
        g.to_text(),
        "SELECT COUNT(*) as count FROM users WHERE phone = '555';"
    );
    g.select_count(());
    assert_eq!(g.to_text(), "SELECT COUNT(*) as count FROM users;");
}

#[test]
fn select_count_where_takes_like_clause() {
    let mut g = user();
    let predicate = g.like_where_clause([("phone", "55"), ("display_name", "al")]);
    assert_eq!(predicate, "phone ILIKE '%55%' OR display_name ILIKE '%al%'");
    g.select_count_where(&predicate);
    assert_eq!(
        g.to_text(),
        "SELECT COUNT(*) as count FROM users WHERE phone ILIKE '%55%' OR display_name ILIKE '%al%';"
    );

    g.set_dialect(Dialect::Sqlite);
    assert_eq!(g.like_where_clause([("phone", "o'k")]), "phone LIKE '%o''k%'");
}

#[test]
fn order_by_and_paginate_append() {
    let mut g = user();
    g.select(())
        .order_by("phone", Order::Desc)
        .unwrap()
        .paginate(10, 3)
        .unwrap();
    assert_eq!(
        g.to_text(),
        "SELECT id, phone, active FROM users ORDER BY phone DESC LIMIT 10 OFFSET 20;"
    );
}

#[test]
fn paginate_first_page_and_non_positive_pages() {
    let mut g = user();
    g.select(()).paginate(5, 1).unwrap();
    assert!(g.to_text().ends_with("LIMIT 5 OFFSET 0;"));

    g.select(()).paginate(5, 0).unwrap();
    assert!(g.to_text().ends_with("LIMIT 5 OFFSET -5;"));
}

#[test]
fn order_by_and_paginate_need_a_pending_statement() {
    let mut g = user();
    let err = g.order_by("id", Order::Asc).unwrap_err();
    assert!(err.is_misuse());
    assert!(g.paginate(10, 1).unwrap_err().is_misuse());

    g.raw_query("");
    assert!(g.paginate(10, 1).unwrap_err().is_misuse());
}

#[test]
fn order_parses_only_asc_and_desc() {
    assert_eq!("asc".parse::<Order>().unwrap(), Order::Asc);
    assert_eq!("DESC".parse::<Order>().unwrap(), Order::Desc);
    assert!(matches!(
        "sideways".parse::<Order>(),
        Err(QueryError::Validation(_))
    ));
}

#[test]
fn delete_with_and_without_filter() {
    let mut g = user();
    g.delete([("id", 9)]);
    assert_eq!(g.to_text(), "DELETE FROM users WHERE id = 9;");
    g.delete(());
    assert_eq!(g.to_text(), "DELETE FROM users;");
}

#[test]
fn update_sets_updatable_non_null_fields() {
    let mut g = Generator::for_entity(Profile {
        id: 4,
        bio: String::new(),
        age: 31,
        nickname: None,
        created_at: Some(chrono::Utc::now()),
    });
    g.update([("id", 4)]).unwrap();
    assert_eq!(
        g.to_text(),
        "UPDATE profiles SET bio = NULL, age = 31 WHERE id = 4;"
    );
}

#[test]
fn update_specific_uses_explicit_set_list() {
    let mut g = user();
    g.update_specific(Filter::new().eq("active", false).eq("phone", "9"), [("id", 2)])
        .unwrap();
    assert_eq!(
        g.to_text(),
        "UPDATE users SET active = FALSE, phone = '9' WHERE id = 2;"
    );
    assert!(g.update_specific((), ()).unwrap_err().is_misuse());
}

#[test]
fn identity_scoped_statements() {
    let mut g = user();
    g.row_mut().id = 12;

    g.get_me();
    assert_eq!(g.to_text(), "SELECT * FROM users WHERE id = 12;");
    g.select_me();
    assert_eq!(g.to_text(), "SELECT * FROM users WHERE id = 12;");

    g.update_me().unwrap();
    assert_eq!(
        g.to_text(),
        "UPDATE users SET phone = '555', active = TRUE WHERE id = 12;"
    );

    g.delete_me();
    assert_eq!(g.to_text(), "DELETE FROM users WHERE id = 12;");
}

#[test]
fn one_to_many_singularizes_child_table() {
    let mut g = user();
    g.one_to_many("groups", 7);
    assert_eq!(
        g.to_text(),
        "SELECT DISTINCT main.id, main.phone, main.active FROM users main JOIN groups destination ON main.group_id = destination.id WHERE destination.id = 7;"
    );
}

#[test]
fn many_to_many_joins_through_middle_table() {
    let mut g = user();
    g.many_to_many("users_groups", "groups", 1);
    assert_eq!(
        g.to_text(),
        "SELECT DISTINCT main.id, main.phone, main.active FROM users main JOIN users_groups middle ON main.id = middle.user_id JOIN groups destination ON destination.id = middle.group_id WHERE destination.id = 1;"
    );
}

#[test]
fn many_to_many_writes() {
    let mut g = user();
    g.row_mut().id = 3;

    g.insert_many_to_many("users_groups", "groups", &[1, 2])
        .unwrap();
    assert_eq!(
        g.to_text(),
        "INSERT INTO users_groups (user_id, group_id) VALUES (3, 1), (3, 2);"
    );

    g.delete_many_to_many("users_groups", "groups", &[1, 2, 4])
        .unwrap();
    assert_eq!(
        g.to_text(),
        "DELETE FROM users_groups WHERE user_id = 3 AND group_id IN (1, 2, 4);"
    );

    assert!(g.insert_many_to_many("users_groups", "groups", &[]).is_err());
    assert!(g.delete_many_to_many("users_groups", "groups", &[]).is_err());
}

#[test]
fn wrap_atomic_is_textual() {
    let mut g = user();
    g.delete(()).wrap_atomic();
    assert_eq!(g.pending_kind(), Some(StatementKind::Atomic));
    assert_eq!(g.to_text(), "BEGIN;\nDELETE FROM users;\nEND;");
}

#[test]
fn to_text_adds_exactly_one_terminator_and_clears() {
    let mut g = user();
    g.raw_query("SELECT 1;");
    assert_eq!(g.to_text(), "SELECT 1;");
    g.raw_query("SELECT 1");
    assert_eq!(g.to_text(), "SELECT 1;");
    assert!(g.is_empty());
    assert_eq!(g.to_text(), ";");
    assert_eq!(g.to_text(), ";");
}

#[test]
fn building_overwrites_pending_statement() {
    let mut g = user();
    g.select(());
    g.delete([("id", 1)]);
    assert_eq!(g.to_text(), "DELETE FROM users WHERE id = 1;");
}

#[test]
fn dialect_controls_string_escaping() {
    let mut g = user();
    g.row_mut().phone = "5'5".into();
    g.insert_into();
    assert_eq!(
        g.to_text(),
        "INSERT INTO users (phone, active) VALUES('5''5', TRUE);"
    );

    g.set_dialect(Dialect::Generic);
    g.insert_into();
    assert_eq!(
        g.to_text(),
        "INSERT INTO users (phone, active) VALUES('5'5', TRUE);"
    );
}

#[test]
fn select_fields_with_prefix() {
    let g = user();
    assert_eq!(g.select_fields(None), "id, phone, active");
    assert_eq!(g.select_fields(Some("u")), "u.id, u.phone, u.active");
}

#[test]
fn table_override_and_row_access() {
    let mut g = Generator::new("archived_users", User::default());
    assert_eq!(g.table(), "archived_users");
    g.set_table("users");
    let old = g.set_row(User { id: 8, ..User::default() });
    assert_eq!(old.id, 0);
    assert_eq!(g.row().id, 8);
    assert_eq!(g.into_row().id, 8);
}

use osql::loader;
use osql::{OsqlError, Value};
use std::collections::HashMap;
use std::sync::Once;

static INIT: Once = Once::new();

fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .is_test(true)
            .try_init();
    });
}

// The registry is process-wide, so everything touching it runs in one test.
#[test]
fn test_load_find_and_clear() {
    init_logger();
    loader::load("tests/resources/queries/*.sql").unwrap();

    let get_user = loader::find_query("get_user").expect("get_user should be registered");
    assert!(get_user.is_static());
    assert_eq!(
        get_user.text(),
        Some("SELECT id, name, email\nFROM users\nWHERE id = $1")
    );

    let stmt = loader::find_query("orders_by_ids")
        .unwrap()
        .generate(&HashMap::from([(
            "ids",
            Value::List(vec![Value::I64(10), Value::I64(11)]),
        )]))
        .unwrap();
    assert_eq!(stmt.text, "SELECT * FROM orders WHERE id IN ($1, $2)");

    // A file with one clashing name registers nothing.
    let err = loader::load("tests/resources/conflicts/*.sql").unwrap_err();
    match err {
        OsqlError::DuplicateName(msg) => {
            assert!(msg.starts_with("get_user (Source: "));
            assert!(msg.contains("users_again.sql"));
        }
        other => panic!("Expected DuplicateName, got {:?}", other),
    }
    assert!(loader::find_query("brand_new").is_none());

    loader::clear();
    assert!(loader::find_query("get_user").is_none());
}

#[test]
fn test_invalid_glob_pattern() {
    let err = loader::load("tests/resources/[").unwrap_err();
    assert!(matches!(err, OsqlError::LoadError(_)));
}

#[test]
fn test_find_users_conditions() {
    init_logger();
    let source = std::fs::read_to_string("tests/resources/queries/users.sql").unwrap();
    let queries = loader::parse(&source).unwrap();
    assert_eq!(queries.len(), 3);

    let find_users = &queries["find_users"];
    assert!(!find_users.is_static());
    assert_eq!(
        find_users.keys(),
        ["name".to_string(), "email".to_string(), "active".to_string()]
    );

    let stmt = find_users
        .generate(&HashMap::from([("name", Value::Str("bob".to_string()))]))
        .unwrap();
    assert_eq!(
        stmt.text,
        "SELECT id, name, email\nFROM users\nWHERE name = $1 AND active = TRUE\nORDER BY id"
    );
    assert_eq!(stmt.values, vec![Value::Str("bob".to_string())]);

    let stmt = find_users
        .generate(&HashMap::from([("active", Value::Bool(false))]))
        .unwrap();
    assert_eq!(
        stmt.text,
        "SELECT id, name, email\nFROM users\nWHERE active = $1\nORDER BY id"
    );
    assert_eq!(stmt.values, vec![Value::Bool(false)]);
}

#[test]
fn test_recent_orders_else_branch() {
    let source = std::fs::read_to_string("tests/resources/queries/orders.sql").unwrap();
    let queries = loader::parse(&source).unwrap();
    let recent = &queries["recent_orders"];

    let stmt = recent
        .generate(&HashMap::from([
            ("since", Value::Str("2024-01-01".to_string())),
            ("user_id", Value::I64(3)),
        ]))
        .unwrap();
    assert_eq!(
        stmt.text,
        "SELECT * FROM orders\nWHERE created_at > $1 \nAND user_id = $2"
    );

    let stmt = recent
        .generate(&HashMap::from([("since", Value::Str("2024-01-01".to_string()))]))
        .unwrap();
    assert_eq!(
        stmt.text,
        "SELECT * FROM orders\nWHERE created_at > $1 \nAND user_id IS NOT NULL"
    );
    assert_eq!(stmt.values.len(), 1);
}

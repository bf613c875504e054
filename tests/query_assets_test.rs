use osql::loader;
use osql::query_assets;
use osql::Value;
use std::collections::HashMap;

// Registered at startup, before any test runs.
query_assets!("tests/resources/queries/*.sql");

#[test]
fn test_macro_assets() {
    let query = loader::find_query("get_user")
        .expect("Assets were not loaded automatically. The ctor-based registration failed.");
    assert!(query.source().contains("FROM users"));

    let stmt = query
        .generate(&HashMap::from([("id", Value::I64(7))]))
        .unwrap();
    assert_eq!(stmt.text, "SELECT id, name, email\nFROM users\nWHERE id = $1");
    assert_eq!(stmt.values, vec![Value::I64(7)]);
}

#[test]
fn test_every_embedded_file_is_registered() {
    for name in ["find_users", "update_user", "orders_by_ids", "recent_orders"] {
        assert!(loader::find_query(name).is_some(), "missing query {}", name);
    }
}

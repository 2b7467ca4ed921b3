//! Builder-level tests for the statement module.

use crate::config::{FluentConfig, Structure};
use crate::error::FluentError;
use crate::fluent::Fluent;
use crate::params::Parameters;
use crate::lexer;
use crate::statement::{Statement, StatementKind};
use crate::table::JoinKind;
use crate::value::{Literal, NamedArgs, Pairs, Value};

fn fluent() -> Fluent {
    Fluent::new()
}

fn positional(values: Vec<Value>) -> Parameters {
    Parameters::Positional(values)
}

/// Compiled SQL, after checking that its placeholders line up with the
/// bound parameters.
fn checked_sql(statement: &Statement) -> String {
    let compiled = statement.compile().unwrap();
    let found = lexer::placeholders(&compiled.sql);
    match &compiled.params {
        Parameters::Positional(values) => {
            assert!(found.named.is_empty(), "named placeholder in {}", compiled.sql);
            assert_eq!(found.positional, values.len(), "placeholder count in {}", compiled.sql);
        }
        Parameters::Named(pairs) => {
            assert_eq!(found.positional, 0, "positional placeholder in {}", compiled.sql);
            let mut names = found.named;
            names.sort();
            names.dedup();
            let mut keys: Vec<String> = pairs.iter().map(|(key, _)| key.clone()).collect();
            keys.sort();
            assert_eq!(names, keys, "named placeholders in {}", compiled.sql);
        }
    }
    compiled.sql
}

#[test]
fn test_select_basic() {
    let query = fluent()
        .from("user")
        .where_("id > ?", 0)
        .order_by("name")
        .where_("name = ?", "Marek");

    assert_eq!(
        checked_sql(&query),
        "SELECT user.* FROM user WHERE id > ? AND name = ? ORDER BY name"
    );
    assert_eq!(
        query.get_parameters().unwrap(),
        positional(vec![Value::Int(0), Value::from("Marek")])
    );
}

#[test]
fn test_select_having() {
    let query = fluent()
        .from("user")
        .clear_select()
        .select("type, count(id) AS type_count")
        .where_("id > ?", 1)
        .group_by("type")
        .having("type_count > ?", 1)
        .order_by("name");

    assert_eq!(
        checked_sql(&query),
        "SELECT type, count(id) AS type_count FROM user WHERE id > ? GROUP BY type \
         HAVING type_count > ? ORDER BY name"
    );
    assert_eq!(query.get_parameters().unwrap().len(), 2);
}

#[test]
fn test_by_id() {
    let query = fluent().from("user").by_id(2);
    assert_eq!(checked_sql(&query), "SELECT user.* FROM user WHERE user.id = ?");
    assert_eq!(query.get_parameters().unwrap(), positional(vec![Value::Int(2)]));

    let query = fluent().from("user AS author").by_id(1);
    assert_eq!(
        checked_sql(&query),
        "SELECT author.* FROM user AS author WHERE author.id = ?"
    );

    let query = fluent().update("user").set("type", "admin").by_id(1);
    assert_eq!(checked_sql(&query), "UPDATE user SET type = ? WHERE id = ?");
}

#[test]
fn test_by_id_uses_primary_key_override() {
    let config = FluentConfig::new().with_structure(Structure::default().with_primary_key("user", "user_pk"));
    let fluent = Fluent::with_config(config).unwrap();
    let query = fluent.delete_from("user").by_id(1);
    assert_eq!(checked_sql(&query), "DELETE FROM user WHERE user_pk = ?");
}

#[test]
fn test_where_shorthands() {
    let query = fluent().from("user").where_all(Pairs::new().with("id", 2).with("type", "author"));
    assert_eq!(
        checked_sql(&query),
        "SELECT user.* FROM user WHERE id = ? AND type = ?"
    );
    assert_eq!(
        query.get_parameters().unwrap(),
        positional(vec![Value::Int(2), Value::from("author")])
    );

    let query = fluent().from("user").where_("type", None::<&str>);
    assert_eq!(checked_sql(&query), "SELECT user.* FROM user WHERE type IS NULL");
    assert!(query.get_parameters().unwrap().is_empty());

    let query = fluent().from("article").where_("NOT id", vec![1, 2]);
    assert_eq!(
        checked_sql(&query),
        "SELECT article.* FROM article WHERE NOT id IN (1, 2)"
    );
    assert!(query.get_parameters().unwrap().is_empty());
}

#[test]
fn test_or_where() {
    let query = fluent()
        .from("user")
        .where_("type", "admin")
        .or_where("type", "author");
    assert_eq!(
        checked_sql(&query),
        "SELECT user.* FROM user WHERE type = ? OR type = ?"
    );
}

#[test]
fn test_named_parameters() {
    let query = fluent()
        .from("user")
        .where_("type = :type", NamedArgs::new().bind(":type", "author"))
        .where_(
            "id > :id AND name <> :name",
            NamedArgs::new().bind(":id", 1).bind(":name", "Marek"),
        );

    assert_eq!(
        checked_sql(&query),
        "SELECT user.* FROM user WHERE type = :type AND id > :id AND name <> :name"
    );
    assert_eq!(
        query.get_parameters().unwrap(),
        Parameters::Named(vec![
            (":type".to_string(), Value::from("author")),
            (":id".to_string(), Value::Int(1)),
            (":name".to_string(), Value::from("Marek")),
        ])
    );
}

#[test]
fn test_repeated_named_key_keeps_last_value() {
    let query = fluent()
        .from("article")
        .where_("id > :id", NamedArgs::new().bind("id", 1))
        .where_("id < :id", NamedArgs::new().bind("id", 5));
    let params = query.get_parameters().unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params.get("id"), Some(&Value::Int(5)));
}

#[test]
fn test_mixed_styles_are_rejected() {
    let query = fluent()
        .from("user")
        .where_("id = ?", 1)
        .where_("name = :name", NamedArgs::new().bind(":name", "Marek"));
    let err = query.compile().unwrap_err();
    assert!(matches!(err, FluentError::AmbiguousParameterStyle(_)));
    assert!(err.is_configuration());
}

#[test]
fn test_clear_where_keeps_select_params() {
    let query = fluent()
        .from("user")
        .select_with("? AS one", 1)
        .where_("id > ?", 0)
        .order_by("name")
        .clear_where()
        .where_("name = ?", "Marek");

    assert_eq!(
        checked_sql(&query),
        "SELECT user.*, ? AS one FROM user WHERE name = ? ORDER BY name"
    );
    assert_eq!(
        query.get_parameters().unwrap(),
        positional(vec![Value::Int(1), Value::from("Marek")])
    );
}

#[test]
fn test_clear_where_releases_style() {
    let query = fluent()
        .from("user")
        .where_("id = ?", 1)
        .clear_where()
        .where_("name = :name", NamedArgs::new().bind(":name", "Marek"));
    assert!(query.compile().is_ok());
}

#[test]
fn test_select_lists() {
    let query = fluent()
        .from("user")
        .clear_select()
        .select_many(&["id", "name"])
        .where_("id < ?", 2);
    assert_eq!(checked_sql(&query), "SELECT id, name FROM user WHERE id < ?");

    let query = fluent()
        .from("user")
        .clear_select()
        .select("count(*) AS total_count")
        .group_by_many(&["id", "name"]);
    assert_eq!(
        checked_sql(&query),
        "SELECT count(*) AS total_count FROM user GROUP BY id, name"
    );

    let query = fluent().from("user").clear_select();
    assert_eq!(checked_sql(&query), "SELECT * FROM user");
}

#[test]
fn test_limit_offset() {
    let query = fluent().from("article").order_by("id").limit(10).offset(20);
    assert_eq!(
        checked_sql(&query),
        "SELECT article.* FROM article ORDER BY id LIMIT 10 OFFSET 20"
    );
}

#[test]
fn test_inline_query() {
    let query = fluent()
        .from("user")
        .where_("name = ?", "O'Brien")
        .where_("id > ?", 3)
        .where_("title = '?'", ());
    assert_eq!(
        query.get_query(true).unwrap(),
        "SELECT user.* FROM user WHERE name = 'O''Brien' AND id > 3 AND title = '?'"
    );

    let query = fluent()
        .from("user")
        .where_("type = :type", NamedArgs::new().bind(":type", "author"));
    assert_eq!(
        query.get_query(true).unwrap(),
        "SELECT user.* FROM user WHERE type = 'author'"
    );
}

#[test]
fn test_compile_is_repeatable() {
    let query = fluent()
        .from("article")
        .select("user.name")
        .where_("comment:content <> ''", ());
    let first = query.compile().unwrap();
    let second = query.compile().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_insert() {
    let query = fluent().insert_into("article").values(
        Pairs::new()
            .with("user_id", 1)
            .with("updated_at", Literal::new("NOW()"))
            .with("title", "new title")
            .with("content", "new content"),
    );
    assert_eq!(
        checked_sql(&query),
        "INSERT INTO article (user_id, updated_at, title, content) VALUES (?, NOW(), ?, ?)"
    );
    assert_eq!(
        query.get_parameters().unwrap(),
        positional(vec![
            Value::Int(1),
            Value::from("new title"),
            Value::from("new content"),
        ])
    );
}

#[test]
fn test_insert_many_rows() {
    let query = fluent()
        .insert_into("country")
        .ignore()
        .values([("id", 2), ("code", 421)])
        .values([("id", 3), ("code", 420)]);
    assert_eq!(
        checked_sql(&query),
        "INSERT IGNORE INTO country (id, code) VALUES (?, ?), (?, ?)"
    );
    assert_eq!(query.get_parameters().unwrap().len(), 4);
}

#[test]
fn test_insert_rows_must_share_columns() {
    let query = fluent()
        .insert_into("country")
        .values([("id", 2)])
        .values([("name", "Czechia")]);
    assert!(query.compile().unwrap_err().is_configuration());

    let err = fluent().insert_into("country").compile().unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_on_duplicate_key_update() {
    let query = fluent()
        .insert_into("article")
        .values([("id", 1)])
        .on_duplicate_key_update(
            Pairs::new()
                .with("title", "new title")
                .with("content", Literal::new("abs(-1)")),
        );
    assert_eq!(
        checked_sql(&query),
        "INSERT INTO article (id) VALUES (?) ON DUPLICATE KEY UPDATE title = ?, content = abs(-1)"
    );
    assert_eq!(
        query.get_parameters().unwrap(),
        positional(vec![Value::Int(1), Value::from("new title")])
    );
}

#[test]
fn test_update() {
    let query = fluent()
        .update("user")
        .set_all(Pairs::new().with("name", "keraM").with("`type`", "author"))
        .where_("id", 1)
        .order_by("name")
        .limit(1);
    assert_eq!(
        checked_sql(&query),
        "UPDATE user SET name = ?, `type` = ? WHERE id = ? ORDER BY name LIMIT 1"
    );
    assert_eq!(
        query.get_parameters().unwrap(),
        positional(vec![Value::from("keraM"), Value::from("author"), Value::Int(1)])
    );

    let query = fluent()
        .update("article")
        .set("published_at", Literal::new("NOW()"))
        .where_("user_id", 1);
    assert_eq!(
        checked_sql(&query),
        "UPDATE article SET published_at = NOW() WHERE user_id = ?"
    );
    assert_eq!(query.get_parameters().unwrap().len(), 1);
}

#[test]
fn test_update_requires_set() {
    let err = fluent().update("user").where_("id", 1).compile().unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_delete() {
    let query = fluent().delete_from("user").ignore().where_("id", 1);
    assert_eq!(checked_sql(&query), "DELETE IGNORE FROM user WHERE id = ?");

    let query = fluent().delete("user").by_id(1).from("user");
    assert_eq!(checked_sql(&query), "DELETE user FROM user WHERE id = ?");
    assert_eq!(query.get_parameters().unwrap(), positional(vec![Value::Int(1)]));
}

#[test]
fn test_join_params_precede_where_params() {
    let query = fluent()
        .from("article")
        .join_with(
            JoinKind::Inner,
            "user ON user.id = article.user_id AND user.type = ?",
            "admin",
        )
        .join_with(
            JoinKind::Inner,
            "user ON user.id = article.user_id AND user.type = ?",
            "admin",
        )
        .where_("article.id", 1);
    assert_eq!(
        checked_sql(&query),
        "SELECT article.* FROM article INNER JOIN user ON user.id = article.user_id \
         AND user.type = ? WHERE article.id = ?"
    );
    assert_eq!(
        query.get_parameters().unwrap(),
        positional(vec![Value::from("admin"), Value::Int(1)])
    );
}

#[test]
fn test_invalid_clause_is_reported_by_terminal_call() {
    let query = fluent().delete_from("user").group_by("id").where_("id", 1);
    let err = query.compile().unwrap_err();
    assert!(matches!(
        err,
        FluentError::InvalidClause {
            clause: "GROUP BY",
            kind: StatementKind::Delete,
        }
    ));
    assert!(query.error().is_some());

    let err = fluent().insert_into("user").by_id(1).compile().unwrap_err();
    assert!(err.is_configuration());

    let err = fluent().from("user").set("name", "x").compile().unwrap_err();
    assert_eq!(err.to_string(), "SET is not valid for SELECT statements");
}

#[test]
fn test_first_error_wins() {
    let query = fluent()
        .from("user")
        .where_("a = ? AND b = ?", 1)
        .values([("id", 1)]);
    assert!(matches!(query.compile().unwrap_err(), FluentError::Configuration(_)));
}

#[test]
fn test_foreign_key_override() {
    let structure = Structure::default().with_foreign_key("article", "user", "author_id");
    let fluent = Fluent::with_config(FluentConfig::new().with_structure(structure)).unwrap();
    let query = fluent.from("article").select("user.name");
    assert_eq!(
        checked_sql(&query),
        "SELECT article.*, user.name FROM article LEFT JOIN user ON user.id = article.author_id"
    );

    let structure = Structure::default()
        .with_foreign_key("article", "user", "author_id")
        .with_foreign_key("article", "user", "editor_id");
    let fluent = Fluent::with_config(FluentConfig::new().with_structure(structure)).unwrap();
    let err = fluent.from("article").select("user.name").compile().unwrap_err();
    assert!(err.is_resolution());
}

#[test]
fn test_malformed_token_is_resolution_error() {
    let err = fluent()
        .from("user")
        .where_("user..name", "Marek")
        .compile()
        .unwrap_err();
    assert!(err.is_resolution());
}

#[test]
fn test_alias_conflict() {
    let err = fluent()
        .from("article")
        .inner_join("user AS author")
        .left_join("country AS author")
        .compile()
        .unwrap_err();
    assert!(matches!(err, FluentError::AmbiguousAlias { .. }));
}

#[test]
fn test_raw_clauses_reject_unbound_placeholders() {
    let err = fluent().from("user").order_by("FIELD(id, ?)").compile().unwrap_err();
    assert!(err.is_configuration());

    let err = fluent().from("user").select("IF(id > ?, 1, 0) AS big").compile().unwrap_err();
    assert!(err.is_configuration());

    let err = fluent()
        .from("user")
        .clear_select()
        .select_many(&["id", "name = ?"])
        .compile()
        .unwrap_err();
    assert!(err.is_configuration());

    let err = fluent().from("user").group_by(":g").compile().unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_select_with_binds_expression_placeholders() {
    let query = fluent()
        .from("user")
        .select_with("IF(id > ?, 1, 0) AS big", 3)
        .order_by("name DESC");
    assert_eq!(
        checked_sql(&query),
        "SELECT user.*, IF(id > ?, 1, 0) AS big FROM user ORDER BY name DESC"
    );
    assert_eq!(query.get_parameters().unwrap(), positional(vec![Value::Int(3)]));
}

#[test]
fn test_named_keys_line_up_across_clauses() {
    let query = fluent()
        .from("article")
        .select_with(":bonus AS bonus", NamedArgs::new().bind("bonus", 5))
        .where_("id > :min OR user_id = :min", NamedArgs::new().bind("min", 1))
        .order_by("published_at DESC");
    assert_eq!(
        checked_sql(&query),
        "SELECT article.*, :bonus AS bonus FROM article \
         WHERE id > :min OR user_id = :min ORDER BY published_at DESC"
    );
    assert_eq!(query.get_parameters().unwrap().len(), 2);
}

#[test]
fn test_literal_strings_hide_placeholders() {
    let query = fluent()
        .from("user")
        .where_(r"path = 'C:\' AND id = ?", 1)
        .where_("note <> 'why?' AND name = ?", "Marek")
        .order_by("name");
    assert_eq!(
        checked_sql(&query),
        r"SELECT user.* FROM user WHERE path = 'C:\' AND id = ? AND note <> 'why?' AND name = ? ORDER BY name"
    );
    assert_eq!(
        query.get_parameters().unwrap(),
        positional(vec![Value::Int(1), Value::from("Marek")])
    );
}

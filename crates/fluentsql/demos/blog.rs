//! Blog schema walkthrough for fluentsql
//!
//! Run with: cargo run --example blog -p fluentsql
//!
//! Uses an in-memory SQLite database, no setup required.

use anyhow::Result;
use fluentsql::{
    Fluent, InstrumentedClient, Literal, LoggingMonitor, MonitorConfig, NamedArgs, Pairs,
};
use rusqlite::Connection;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Article {
    id: i64,
    user_id: i64,
    title: String,
}

fn main() -> Result<()> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(
        "CREATE TABLE country (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE user (id INTEGER PRIMARY KEY, country_id INTEGER, type TEXT, name TEXT);
         CREATE TABLE article (id INTEGER PRIMARY KEY, user_id INTEGER, published_at TEXT, title TEXT);
         CREATE TABLE comment (id INTEGER PRIMARY KEY, article_id INTEGER, user_id INTEGER, content TEXT);",
    )?;

    let client = InstrumentedClient::new(&conn)
        .with_config(
            MonitorConfig::new()
                .with_slow_query_threshold(Duration::from_millis(50))
                .enable_monitoring(),
        )
        .with_monitor(LoggingMonitor::new());

    let fluent = Fluent::new();

    // ============================================
    // Insert
    // ============================================
    println!("=== Insert ===");

    fluent
        .insert_into("country")
        .values(Pairs::new().with("id", 1).with("name", "Slovakia"))
        .execute(&client)?;

    fluent
        .insert_into("user")
        .values_many([
            Pairs::new()
                .with("country_id", 1)
                .with("type", "admin")
                .with("name", "Marek"),
            Pairs::new()
                .with("country_id", 1)
                .with("type", "author")
                .with("name", "Robert"),
        ])
        .execute(&client)?;

    for (user_id, title) in [(1, "article 1"), (2, "article 2"), (1, "article 3")] {
        let id = fluent
            .insert_into("article")
            .values(
                Pairs::new()
                    .with("user_id", user_id)
                    .with("published_at", Literal::new("datetime('now')"))
                    .with("title", title),
            )
            .execute(&client)?
            .last_insert_id();
        println!("inserted article {id:?}");
    }

    fluent
        .insert_into("comment")
        .values(
            Pairs::new()
                .with("article_id", 1)
                .with("user_id", 2)
                .with("content", "comment 1.1"),
        )
        .execute(&client)?;

    // ============================================
    // Smart joins
    // ============================================
    println!("\n=== Smart joins ===");

    let query = fluent
        .from("article")
        .select("user.name AS author, user.country.name AS country")
        .where_("comment:content IS NOT NULL", ())
        .order_by("article.title");
    println!("{}", query.get_query(false)?);
    for row in query.iter(&client)? {
        println!("{}", row?.to_json());
    }

    // ============================================
    // Fetch family
    // ============================================
    println!("\n=== Fetch family ===");

    let names = fluent.from("user").fetch_pairs(&client, "id", "name")?;
    println!("pairs: {names:?}");

    let authors = fluent
        .from("user")
        .where_("type = :type", NamedArgs::new().bind("type", "author"))
        .fetch_all(&client)?;
    println!("authors: {}", authors.len());

    let by_marek = fluent
        .from("article")
        .where_("user.name", "Marek")
        .count(&client)?;
    println!("articles by Marek: {by_marek}");

    let articles: Vec<Article> = fluent
        .from("article")
        .order_by("id")
        .as_object::<Article>()
        .fetch_all(&client)?;
    println!("typed: {articles:?}");

    // ============================================
    // Update / delete
    // ============================================
    println!("\n=== Update / delete ===");

    // SQLite has no UPDATE ... JOIN, so this one is only printed
    let joined = fluent
        .update("user")
        .set("type", "author")
        .where_("country.name", "Slovakia");
    println!("{}", joined.get_query(true)?);

    let updated = fluent
        .update("user")
        .set("type", "author")
        .by_id(1)
        .execute(&client)?
        .rows_affected();
    println!("updated {updated}");

    let removed = fluent
        .delete_from("article")
        .where_("id", [2, 3])
        .execute(&client)?
        .rows_affected();
    println!("deleted {removed}");

    Ok(())
}

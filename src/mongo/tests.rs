#![cfg(test)]

use crate::filter::RecordTable;
use crate::mongo::connection;
use crate::mongo::records::{self, RecordCursor, RecordKind, RecordSource};
use crate::mongo::schema::{self, SchemaSource, SchemaTree};
use crate::settings::AppSettings;
use crate::{App, Message, WINDOW_TITLE};
use mongodb::bson::{Document, doc};
use std::env;

impl App {
    pub(crate) fn test_visible_column(&self, kind: RecordKind, column: usize) -> Vec<String> {
        self.tables
            .iter()
            .find(|table| table.kind() == kind)
            .map(|table| table.visible_rows().map(|row| row[column].clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn test_active_tab(&self) -> RecordKind {
        self.active_tab
    }

    pub(crate) fn test_schema(&self) -> &SchemaTree {
        &self.schema
    }

    pub(crate) fn test_total_count(&self, kind: RecordKind) -> Option<usize> {
        self.tables.iter().find(|table| table.kind() == kind).map(|table| table.total_count())
    }
}

/// In-memory stand-in for a database. Each tab query returns its documents,
/// optionally followed by a cursor error, or fails outright.
#[derive(Default)]
struct FakeDatabase {
    users: Vec<Document>,
    markets: Vec<Document>,
    products: Vec<Document>,
    failing_query: Option<RecordKind>,
    cursor_error_after: Option<(RecordKind, usize)>,
}

impl SchemaSource for FakeDatabase {
    fn collection_names(&self) -> Result<Vec<String>, String> {
        Ok(vec![String::from(records::USERS_COLLECTION)])
    }

    fn sample_document(&self, _collection: &str) -> Result<Option<Document>, String> {
        Ok(self.users.first().cloned())
    }
}

impl RecordSource for FakeDatabase {
    fn records(&self, kind: RecordKind) -> Result<RecordCursor<'_>, String> {
        if self.failing_query == Some(kind) {
            return Err(format!("{} query rejected", kind.title()));
        }

        let documents = match kind {
            RecordKind::Users => &self.users,
            RecordKind::Markets => &self.markets,
            RecordKind::Products => &self.products,
        };
        let results: Vec<Result<Document, String>> = match self.cursor_error_after {
            Some((failing, after)) if failing == kind => documents
                .iter()
                .take(after)
                .cloned()
                .map(Ok)
                .chain(std::iter::once(Err(String::from("cursor killed"))))
                .collect(),
            _ => documents.iter().cloned().map(Ok).collect(),
        };
        Ok(Box::new(results.into_iter()))
    }
}

fn fake_database() -> FakeDatabase {
    FakeDatabase {
        users: vec![
            doc! { "user_info": { "email": "kim@example.com", "name": "Kim" } },
            doc! { "user_info": { "email": "lee@example.com", "name": "Lee" } },
        ],
        markets: vec![doc! { "market": { "mallName": "Sunny Mall" } }],
        products: vec![
            doc! { "product": { "title": "Wool Scarf", "price": 12345 } },
            doc! { "product": { "title": "Linen Shirt", "price": 39000 } },
            doc! { "product": { "title": "Cotton Socks", "price": 5000 } },
        ],
        ..FakeDatabase::default()
    }
}

fn table(kind: RecordKind, documents: Vec<mongodb::bson::Document>) -> RecordTable {
    RecordTable::new(kind, records::collect_rows(kind, documents.into_iter().map(Ok)))
}

fn sample_app() -> App {
    let mut schema = SchemaTree::new("scraping_db");
    let users = schema.add_child(SchemaTree::ROOT, "users".into(), schema::NodeKind::Collection);
    schema.add_document(
        users,
        &doc! { "user_info": { "email": "kim@example.com" }, "collected_markets": [] },
    );

    let tables = vec![
        table(
            RecordKind::Users,
            vec![
                doc! { "user_info": { "email": "kim@example.com", "name": "Kim" } },
                doc! { "user_info": { "email": "lee@example.com", "name": "Lee" } },
            ],
        ),
        table(
            RecordKind::Markets,
            vec![
                doc! { "market": { "mallName": "Sunny Mall", "mallGrade": "Power" } },
                doc! { "market": { "mallName": "Moon Shop", "mallGrade": "Big Power" } },
            ],
        ),
        table(
            RecordKind::Products,
            vec![
                doc! { "product": { "title": "Wool Scarf", "price": 12345 } },
                doc! { "product": { "title": "Linen Shirt", "price": 39000 } },
            ],
        ),
    ];

    App::from_parts(schema, tables)
}

#[test]
fn search_only_affects_its_own_tab() {
    let mut app = sample_app();
    let _ = app.update(Message::SearchChanged(RecordKind::Markets, String::from("MOON")));

    assert_eq!(app.test_visible_column(RecordKind::Markets, 0), vec!["Moon Shop"]);
    assert_eq!(app.test_visible_column(RecordKind::Users, 0).len(), 2);
    assert_eq!(app.test_visible_column(RecordKind::Products, 0).len(), 2);
}

#[test]
fn search_matches_formatted_price() {
    let mut app = sample_app();
    let _ = app.update(Message::SearchChanged(RecordKind::Products, String::from("12,345원")));
    assert_eq!(app.test_visible_column(RecordKind::Products, 0), vec!["Wool Scarf"]);

    let _ = app.update(Message::SearchChanged(RecordKind::Products, String::new()));
    assert_eq!(app.test_visible_column(RecordKind::Products, 0), vec!["Wool Scarf", "Linen Shirt"]);
}

#[test]
fn tab_selection_switches_active_tab() {
    let mut app = sample_app();
    assert_eq!(app.test_active_tab(), RecordKind::Users);
    let _ = app.update(Message::TabSelected(RecordKind::Products));
    assert_eq!(app.test_active_tab(), RecordKind::Products);
}

#[test]
fn schema_toggle_collapses_node() {
    let mut app = sample_app();
    let before = app.test_schema().visible_rows().len();
    let _ = app.update(Message::SchemaToggle(SchemaTree::ROOT));
    assert_eq!(app.test_schema().visible_rows().len(), 1);
    let _ = app.update(Message::SchemaToggle(SchemaTree::ROOT));
    assert_eq!(app.test_schema().visible_rows().len(), before);
}

#[test]
fn failed_loader_does_not_stop_the_others() {
    let source = FakeDatabase { failing_query: Some(RecordKind::Markets), ..fake_database() };
    let app = App::load_from("scraping_db", &source);

    assert_eq!(app.test_total_count(RecordKind::Markets), Some(0));
    assert_eq!(app.test_visible_column(RecordKind::Users, 1), vec!["Kim", "Lee"]);
    assert_eq!(
        app.test_visible_column(RecordKind::Products, 1),
        vec!["12,345원", "39,000원", "5,000원"]
    );
}

#[test]
fn cursor_error_keeps_rows_read_so_far() {
    let source = FakeDatabase {
        cursor_error_after: Some((RecordKind::Products, 2)),
        ..fake_database()
    };

    let loaded = records::load(&source, RecordKind::Products);
    assert_eq!(loaded.rows.len(), 2);
    assert_eq!(loaded.error.as_deref(), Some("cursor killed"));

    let app = App::load_from("scraping_db", &source);
    assert_eq!(app.test_visible_column(RecordKind::Products, 0), vec!["Wool Scarf", "Linen Shirt"]);
    assert_eq!(app.test_total_count(RecordKind::Markets), Some(1));
}

#[test]
fn loaded_app_builds_schema_and_keeps_fixed_title() {
    let app = App::load_from("scraping_db", &fake_database());

    assert_eq!(app.title(), WINDOW_TITLE);
    assert_eq!(app.title(), "MongoDB Manager");
    assert_eq!(
        app.test_schema().node(SchemaTree::ROOT).map(|node| node.label.as_str()),
        Some("scraping_db")
    );
    assert_eq!(app.test_schema().visible_rows().len(), 5);
}

#[test]
fn load_flow_against_live_database() {
    let uri = match env::var("MONGO_MANAGER_TEST_URI") {
        Ok(value) => value,
        Err(_) => {
            eprintln!("skipping load_flow_against_live_database: MONGO_MANAGER_TEST_URI not provided");
            return;
        }
    };

    let settings = AppSettings { connection_uri: uri, ..AppSettings::default() };
    let connection = connection::connect(&settings).expect("connect to test database");

    let tree = schema::build_schema_tree(&connection.db_name, &connection.database);
    assert_eq!(
        tree.node(SchemaTree::ROOT).map(|node| node.label.as_str()),
        Some(connection.db_name.as_str())
    );

    for kind in RecordKind::ALL {
        let loaded = records::load(&connection.database, kind);
        assert!(loaded.error.is_none(), "{kind:?} failed: {:?}", loaded.error);
        for row in &loaded.rows {
            assert_eq!(row.len(), kind.columns().len());
        }
    }
}

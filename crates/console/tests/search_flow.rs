use console::cli::{run_search, seed, SearchCmd};
use console::settings::Settings;
use console::ConsoleError;
use mockall::{mock, predicate};
use models::mql::CompiledQuery;
use models::{ModelBackend, ModelDefinition, Record, SearchResult};
use serde_json::{json, Value as Json};
use std::fs;
use tempfile::tempdir;

mock! {
    pub Backend {}

    impl ModelBackend for Backend {
        fn create(&mut self, model: &ModelDefinition, data: Record) -> models::Result<Record>;
        fn retrieve(&self, model: &ModelDefinition, pk: &Json) -> models::Result<Option<Record>>;
        fn update(&mut self, model: &ModelDefinition, pk: &Json, partial: Record) -> models::Result<Record>;
        fn delete(&mut self, model: &ModelDefinition, pk: &Json) -> models::Result<()>;
        fn search(&self, model: &ModelDefinition, query: &CompiledQuery) -> models::Result<SearchResult>;
        fn dispose(&mut self) -> models::Result<()>;
    }
}

// ----- helpers -----------------------------------------------------------

const SETTINGS: &str = r#"
[log]
filter = "warn"

[model]
domain = "inventory"
plural_name = "items"
"#;

fn write_fixture(records: Json, query: Json) -> (tempfile::TempDir, SearchCmd) {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("settings.toml"), SETTINGS).expect("write settings");
    fs::write(dir.path().join("records.json"), records.to_string()).expect("write records");
    fs::write(dir.path().join("query.json"), query.to_string()).expect("write query");

    let cmd = SearchCmd {
        dir: dir.path().to_path_buf(),
        records: dir.path().join("records.json"),
        query: dir.path().join("query.json"),
    };
    (dir, cmd)
}

// ----- seed --------------------------------------------------------------

#[test]
fn seed_creates_each_record_in_order() {
    let model = ModelDefinition::new("inventory", "items");
    let mut backend = MockBackend::new();
    let mut seq = mockall::Sequence::new();

    for name in ["a", "b"] {
        backend
            .expect_create()
            .with(
                predicate::eq(model.clone()),
                predicate::function(move |r: &Record| r["name"] == json!(name)),
            )
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, data| Ok(data));
    }

    let created = seed(
        &mut backend,
        &model,
        vec![json!({ "name": "a" }), json!({ "name": "b" })],
    )
    .expect("seed");
    assert_eq!(created, 2);
}

#[test]
fn seed_rejects_non_object_records() {
    let model = ModelDefinition::new("inventory", "items");
    let mut backend = MockBackend::new();
    backend.expect_create().times(1).returning(|_, data| Ok(data));

    let err = seed(&mut backend, &model, vec![json!({ "ok": true }), json!([1, 2])]).unwrap_err();
    assert!(matches!(err, ConsoleError::Config(ref msg) if msg.contains("record 1")));
}

#[test]
fn seed_propagates_backend_failures() {
    let model = ModelDefinition::new("inventory", "items");
    let mut backend = MockBackend::new();
    backend
        .expect_create()
        .returning(|_, _| Err(models::Error::backend("disk full")));

    let err = seed(&mut backend, &model, vec![json!({})]).unwrap_err();
    assert!(matches!(err, ConsoleError::Models(models::Error::Backend(_))));
}

// ----- run_search --------------------------------------------------------

#[test]
fn run_search_end_to_end() {
    let (_dir, cmd) = write_fixture(
        json!([
            { "name": "Alice", "age": 25 },
            { "name": "Alice", "age": 35 },
            { "name": "Bob", "age": 40 }
        ]),
        json!({
            "query": [
                { "property": "name", "value": "Alice", "options": { "type": "string" } },
                "AND",
                { "property": "age", "value": 30, "options": { "type": "number", "equality_symbol": "gt" } }
            ],
            "sort": null,
            "take": null,
            "page": { "cursor": "abc" }
        }),
    );

    let settings = Settings::load(&cmd.dir).expect("settings");
    assert_eq!(settings.log_filter(), Some("warn"));

    let result = run_search(&cmd, &settings).expect("search");
    assert_eq!(result.instances.len(), 1);
    assert_eq!(result.instances[0]["id"], json!(2));
    assert_eq!(result.page, Some(json!({ "cursor": "abc" })));
}

#[test]
fn run_search_surfaces_structural_errors() {
    let (_dir, cmd) = write_fixture(
        json!([{ "name": "Alice" }]),
        json!({ "query": [{ "property": "name", "value": "Alice" }, "OR"] }),
    );
    let settings = Settings::load(&cmd.dir).expect("settings");

    let err = run_search(&cmd, &settings).unwrap_err();
    match err {
        ConsoleError::Models(e) => assert!(e.is_structural()),
        other => panic!("expected structural error, got {other}"),
    }
}

#[test]
fn run_search_reports_unreadable_query_file() {
    let (dir, cmd) = write_fixture(json!([]), json!({ "query": [] }));
    fs::remove_file(dir.path().join("query.json")).expect("remove query");
    let settings = Settings::load(&cmd.dir).expect("settings");

    let err = run_search(&cmd, &settings).unwrap_err();
    match err {
        ConsoleError::Io { path, source } => {
            assert!(path.ends_with("query.json"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected an I/O error, got {other}"),
    }
}

// ----- settings ----------------------------------------------------------

#[test]
fn settings_load_requires_file() {
    let dir = tempdir().expect("tempdir");
    let err = Settings::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConsoleError::Config(ref msg) if msg.contains("settings.toml not found")));
}

#[test]
fn settings_load_reports_invalid_toml() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("settings.toml"), "[model\n").expect("write");
    let err = Settings::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConsoleError::Config(ref msg) if msg.contains("Invalid settings.toml")));
}

//! Integration tests for the sync pipeline
//!
//! These tests use wiremock to stand in for the wiki's `api.php` and run
//! full syncs against a real dump file in a temp directory.

use bucket_sync::bucket::HttpTransport;
use bucket_sync::config::{ApiConfig, Config, FetchConfig, OutputConfig};
use bucket_sync::recipe::{ParsedRecipe, RecipeSource};
use bucket_sync::storage::{load_dump, DumpStorage, JsonDumpStore};
use bucket_sync::sync::{run_sync, Coordinator, RecordingSleeper, SyncOptions};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn query_at(page_size: u64, offset: u64) -> String {
    format!(
        "bucket('recipe').select('production_json').limit({}).offset({}).run()",
        page_size, offset
    )
}

fn recipe(output: &str, materials: &[&str]) -> Value {
    let materials: Vec<Value> = materials.iter().map(|m| json!({ "name": m })).collect();
    json!({
        "production_json": json!({
            "output": { "name": output, "quantity": "1" },
            "materials": materials,
            "ticks": "4"
        })
        .to_string()
    })
}

fn envelope(query: &str, rows: Vec<Value>) -> Value {
    json!({ "bucketQuery": query, "bucket": rows })
}

/// Serves `pages` in order at offsets 0, page_size, 2*page_size... and empty results after
async fn mount_pages(server: &MockServer, page_size: u64, pages: Vec<Vec<Value>>) {
    for (i, rows) in pages.into_iter().enumerate() {
        let query = query_at(page_size, i as u64 * page_size);
        Mock::given(method("GET"))
            .and(path("/api.php"))
            .and(query_param("action", "bucket"))
            .and(query_param("format", "json"))
            .and(query_param("query", query.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&query, rows)))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope("", vec![])))
        .mount(server)
        .await;
}

fn transport_for(server: &MockServer) -> HttpTransport {
    let config = ApiConfig {
        base_url: format!("{}/api.php", server.uri()),
        ..ApiConfig::default()
    };
    HttpTransport::from_config(&config).expect("Failed to build transport")
}

fn options(page_size: u64) -> SyncOptions {
    SyncOptions {
        page_size,
        ..SyncOptions::default()
    }
}

fn outputs(dump_path: &Path) -> Vec<String> {
    let dump = load_dump::<ParsedRecipe>(dump_path).expect("Dump missing");
    dump.items
        .iter()
        .map(|r| r.production_data.output_name().unwrap_or_default())
        .collect()
}

fn test_config(server: &MockServer, dump_path: &Path, page_size: u64) -> Config {
    Config {
        api: ApiConfig {
            base_url: format!("{}/api.php", server.uri()),
            ..ApiConfig::default()
        },
        fetch: FetchConfig {
            page_size,
            courtesy_delay_ms: 0,
            retry_backoff_ms: 0,
            ..FetchConfig::default()
        },
        output: OutputConfig {
            dump_path: dump_path.to_path_buf(),
        },
    }
}

#[tokio::test]
async fn test_full_sync_dedups_and_persists() {
    let server = MockServer::start().await;
    mount_pages(
        &server,
        2,
        vec![
            vec![recipe("A", &["x"]), recipe("B", &["y"])],
            vec![recipe("B", &["y"]), recipe("C", &["z"])],
        ],
    )
    .await;

    let dir = TempDir::new().unwrap();
    let dump_path = dir.path().join("data").join("recipes.json");

    let coordinator = Coordinator::new(
        RecipeSource,
        transport_for(&server),
        JsonDumpStore::new(&dump_path),
        RecordingSleeper::new(),
        options(2),
    );
    let report = coordinator.run().await.expect("Sync failed");

    assert_eq!(report.chunks_fetched, 5);
    assert_eq!(report.empty_chunks, 3);
    assert_eq!(report.total_items, 3);
    assert_eq!(report.duplicates, 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 5);

    assert_eq!(outputs(&dump_path), vec!["A", "B", "C"]);
    let dump = load_dump::<ParsedRecipe>(&dump_path).unwrap();
    assert_eq!(dump.metadata.total_items, 3);
    assert_eq!(dump.metadata.last_data_offset, 0);
    assert!(!dump_path.with_file_name("recipes.json.tmp").exists());
}

#[tokio::test]
async fn test_second_run_merges_into_existing_dump() {
    let dir = TempDir::new().unwrap();
    let dump_path = dir.path().join("recipes.json");

    let first = MockServer::start().await;
    mount_pages(&first, 10, vec![vec![recipe("A", &[]), recipe("B", &[])]]).await;
    let report = Coordinator::new(
        RecipeSource,
        transport_for(&first),
        JsonDumpStore::new(&dump_path),
        RecordingSleeper::new(),
        options(10),
    )
    .run()
    .await
    .unwrap();
    assert_eq!(report.new_items, 2);

    let second = MockServer::start().await;
    mount_pages(&second, 10, vec![vec![recipe("C", &[]), recipe("A", &[])]]).await;
    let report = Coordinator::new(
        RecipeSource,
        transport_for(&second),
        JsonDumpStore::new(&dump_path),
        RecordingSleeper::new(),
        options(10),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(report.initial_items, 2);
    assert_eq!(report.new_items, 1);
    assert_eq!(outputs(&dump_path), vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_server_errors_are_retried_at_same_offset() {
    let server = MockServer::start().await;
    let first_query = query_at(5, 0);

    Mock::given(method("GET"))
        .and(query_param("query", first_query.as_str()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_pages(&server, 5, vec![vec![recipe("A", &[])]]).await;

    let dir = TempDir::new().unwrap();
    let dump_path = dir.path().join("recipes.json");
    let coordinator = Coordinator::new(
        RecipeSource,
        transport_for(&server),
        JsonDumpStore::new(&dump_path),
        RecordingSleeper::new(),
        options(5),
    );
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.failed_attempts, 2);
    assert_eq!(report.total_items, 1);

    let requests = server.received_requests().await.unwrap();
    let first_three: Vec<String> = requests
        .iter()
        .take(3)
        .map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "query")
                .map(|(_, v)| v.into_owned())
                .unwrap()
        })
        .collect();
    assert_eq!(first_three, vec![first_query.clone(); 3]);

    let backoff = Duration::from_secs(5);
    let courtesy = Duration::from_millis(500);
    let calls = coordinator.sleeper().calls();
    assert_eq!(&calls[..4], &[backoff, courtesy, backoff, courtesy]);
    assert_eq!(outputs(&dump_path), vec!["A"]);
}

#[tokio::test]
async fn test_malformed_rows_are_skipped() {
    let server = MockServer::start().await;
    mount_pages(
        &server,
        3,
        vec![vec![
            json!({ "production_json": "not json" }),
            recipe("Kept", &[]),
            json!({ "something_else": true }),
        ]],
    )
    .await;

    let dir = TempDir::new().unwrap();
    let dump_path = dir.path().join("recipes.json");
    let report = Coordinator::new(
        RecipeSource,
        transport_for(&server),
        JsonDumpStore::new(&dump_path),
        RecordingSleeper::new(),
        options(3),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(report.decode_errors, 2);
    assert_eq!(outputs(&dump_path), vec!["Kept"]);
}

#[tokio::test]
async fn test_run_sync_from_config() {
    let server = MockServer::start().await;
    mount_pages(
        &server,
        2,
        vec![vec![recipe("A", &["x", "y"]), recipe("A", &["y", "x"])]],
    )
    .await;

    let dir = TempDir::new().unwrap();
    let dump_path = dir.path().join("recipes.json");
    let config = test_config(&server, &dump_path, 2);

    let report = run_sync(&config, false).await.unwrap();

    assert_eq!(report.total_items, 1);
    assert_eq!(report.duplicates, 1);
    let dump = load_dump::<ParsedRecipe>(&dump_path).unwrap();
    assert_eq!(dump.items[0].recipe_key, "A|x,y|||");
}

#[tokio::test]
async fn test_force_refresh_replaces_dump() {
    let dir = TempDir::new().unwrap();
    let dump_path = dir.path().join("recipes.json");
    let stale: Vec<ParsedRecipe> = vec![serde_json::from_value(json!({
        "production_data": { "output": { "name": "Removed" } },
        "recipe_key": "Removed||||"
    }))
    .unwrap()];
    JsonDumpStore::new(&dump_path).save(&stale, 0).unwrap();

    let server = MockServer::start().await;
    mount_pages(&server, 4, vec![vec![recipe("Fresh", &[])]]).await;
    let config = test_config(&server, &dump_path, 4);

    let report = run_sync(&config, true).await.unwrap();

    assert_eq!(report.initial_items, 0);
    assert_eq!(outputs(&dump_path), vec!["Fresh"]);
}

#[tokio::test]
async fn test_unreadable_dump_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let dump_path = dir.path().join("recipes.json");
    std::fs::write(&dump_path, "{ truncated").unwrap();

    let server = MockServer::start().await;
    mount_pages(&server, 4, vec![vec![recipe("A", &[])]]).await;
    let config = test_config(&server, &dump_path, 4);

    let report = run_sync(&config, false).await.unwrap();

    assert_eq!(report.initial_items, 0);
    assert_eq!(outputs(&dump_path), vec!["A"]);
}

#[tokio::test]
async fn test_bad_dump_item_keeps_the_rest() {
    let dir = TempDir::new().unwrap();
    let dump_path = dir.path().join("recipes.json");
    let existing = json!({
        "items": [
            {
                "production_data": { "output": { "name": "A" } },
                "recipe_key": "A||||"
            },
            { "production_data": 42, "recipe_key": "unknown||||" }
        ],
        "metadata": {
            "totalItems": 2,
            "lastDataOffset": 0,
            "lastFetchTime": "2025-06-01T12:30:00.000Z"
        }
    });
    std::fs::write(&dump_path, existing.to_string()).unwrap();

    let server = MockServer::start().await;
    mount_pages(&server, 4, vec![vec![recipe("B", &[])]]).await;
    let config = test_config(&server, &dump_path, 4);

    let report = run_sync(&config, false).await.unwrap();

    assert_eq!(report.initial_items, 1);
    assert_eq!(report.unreadable_items, 1);
    assert_eq!(report.new_items, 1);
    assert_eq!(outputs(&dump_path), vec!["A", "B"]);
}

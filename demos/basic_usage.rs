// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic meili-connector usage example.
//!
//! Demonstrates:
//! 1. Applying declarative index settings and waiting for the tasks
//! 2. Adding documents
//! 3. A filtered, sorted search
//! 4. A metadata-split search with per-column facet counts
//! 5. A random sample
//! 6. Displaying metrics
//!
//! # Prerequisites
//!
//! A local engine:
//! ```bash
//! docker run -p 7700:7700 -e MEILI_MASTER_KEY=masterKey getmeili/meilisearch:v1.9
//! ```
//!
//! # Run
//!
//! ```bash
//! MEILI_HOST=http://localhost:7700 MEILI_KEY=masterKey cargo run --example basic_usage
//! ```

use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use meili_connector::{
    Connector, ConnectorConfig, IndexSettings, PollConfig, WhereClauses,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║           meili-connector: Basic Usage Example                ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Connect and apply settings
    // ─────────────────────────────────────────────────────────────────────────
    let config = ConnectorConfig {
        host: std::env::var("MEILI_HOST").unwrap_or_else(|_| "http://localhost:7700".into()),
        api_key: std::env::var("MEILI_KEY").ok(),
        ..Default::default()
    };
    let connector = Connector::new(config)?;
    println!("🔌 Engine version {}", connector.version().await?.pkg_version);

    let settings = IndexSettings::default()
        .with_filters(["category", "color", "brand"])
        .with_sortable(["price"]);
    let tasks = connector
        .apply_index_settings("demo_products", &settings, &PollConfig::default())
        .await?;
    println!("⚙️  Applied settings ({} tasks)", tasks.len());

    // ─────────────────────────────────────────────────────────────────────────
    // 2. Add documents
    // ─────────────────────────────────────────────────────────────────────────
    let products = vec![
        json!({"id": 1, "title": "Phone X", "category": "phones", "color": "black", "brand": "acme", "price": 499}),
        json!({"id": 2, "title": "Phone Y", "category": "phones", "color": "white", "brand": "globex", "price": 399}),
        json!({"id": 3, "title": "Tab S", "category": "tablets", "color": "black", "brand": "acme", "price": 599}),
        json!({"id": 4, "title": "Tab M", "category": "tablets", "color": "silver", "brand": "initech", "price": 299}),
        json!({"id": 5, "title": "Phone Z", "category": "phones", "color": "black", "brand": "initech", "price": 199}),
    ];
    let task = connector.add_documents("demo_products", &products).await?;
    connector.wait_for_task(task).await?;
    println!("📝 Indexed {} documents", products.len());

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Filtered search
    // ─────────────────────────────────────────────────────────────────────────
    let query = connector
        .query("demo_products")
        .filter("price", "<", 500)?
        .filter_group(|g| g.filter("brand", "=", "acme")?.or_filter("brand", "=", "initech"))?
        .order_by("price")?
        .build()?;
    let results = connector.search(&query).await?;
    println!("\n🔍 Cheap acme/initech products: {}", results.len());
    for hit in &results.hits {
        println!("   {} ({})", hit["title"], hit["price"]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Facets that ignore their own filter
    // ─────────────────────────────────────────────────────────────────────────
    let query = connector
        .query("demo_products")
        .filter("category", "=", "phones")?
        .keep_facets_in_metadata(|q| q.filter("color", "=", "black"))?
        .set_facets(["category", "color"])
        .build()?;
    let results = connector.search(&query).await?;
    println!("\n📊 Black phones: {}", results.len());
    println!("   colors among phones: {:?}", results.facet("color"));
    println!("   categories among black: {:?}", results.facet("category"));

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Random sample
    // ─────────────────────────────────────────────────────────────────────────
    let query = connector.query("demo_products").in_random_order().limit(3).build()?;
    let sample = connector.search(&query).await?;
    let ids: Vec<_> = sample.hits.iter().map(|h| h["id"].clone()).collect();
    println!("\n🎲 Random sample: {:?}", ids);

    // ─────────────────────────────────────────────────────────────────────────
    // 6. Metrics
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📈 Metrics:");
    for (key, _, _, value) in snapshotter.snapshot().into_vec() {
        let rendered = match value {
            DebugValue::Counter(v) => v.to_string(),
            DebugValue::Gauge(v) => format!("{:.2}", v.into_inner()),
            DebugValue::Histogram(v) => format!("{} samples", v.len()),
        };
        println!("   {} = {}", key.key().name(), rendered);
    }

    let task = connector.delete_index("demo_products").await?;
    connector.wait_for_task(task).await?;
    println!("\n🧹 Cleaned up");
    Ok(())
}

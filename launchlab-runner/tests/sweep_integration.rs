//! End-to-end: fixture sqlite db → loader → grid sweep → artifacts.

use rusqlite::Connection;
use std::collections::BTreeMap;
use std::path::PathBuf;

use launchlab_core::domain::QuoteBook;
use launchlab_runner::{
    load_events, load_quotes, run_sweep, save_artifacts, ParamGrid, SweepConfig, SweepConstraints,
};

/// A tiny but complete recording: one mint with a clean take-profit path,
/// one mint that never gets quoted, and one event from an untracked venue.
fn fixture_db() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot.sqlite");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE events (
           mint TEXT, ts INTEGER, buyers INTEGER, unique_funders INTEGER,
           same_funder_ratio REAL, price_jumps INTEGER, depth_est REAL,
           origin TEXT
         );
         CREATE TABLE quotes (
           mint TEXT, ts INTEGER, size_sol REAL, est_fill_price_sol REAL
         );

         -- Scores 90 with defaults: Apex-grade evidence.
         INSERT INTO events VALUES ('MINTA', 1700000100, 8, 7, 0.0, 3, 3.0, 'pumpfun');
         -- Quoted venue we do not track.
         INSERT INTO events VALUES ('MINTB', 1700000100, 8, 7, 0.0, 3, 3.0, 'raydium');
         -- Tracked but never quoted.
         INSERT INTO events VALUES ('MINTC', 1700000100, 8, 7, 0.0, 3, 3.0, 'pumpfun');

         INSERT INTO quotes VALUES ('MINTA', 1700000090, 0.4, 1.0);
         INSERT INTO quotes VALUES ('MINTA', 1700000290, 0.4, 1.4);
         INSERT INTO quotes VALUES ('MINTA', 1700000090, 0.1, 1.0);
         INSERT INTO quotes VALUES ('MINTA', 1700000290, 0.1, 1.4);",
    )
    .unwrap();
    (dir, path)
}

#[test]
fn sweep_over_fixture_db_produces_artifacts() {
    let (_guard, db) = fixture_db();

    let config = SweepConfig::from_toml(&format!(
        r#"
[data]
db = "{}"

[sweep]
min_trades = 1

[grid]
ENTRY_MIN_SCORE = [60.0, 95.0]
"#,
        db.display()
    ))
    .unwrap();

    let events = load_events(&db, config.start_ts(), config.end_ts()).unwrap();
    // The raydium event is filtered; both pumpfun mints load.
    assert_eq!(events.len(), 2);
    assert!(events.contains_key("MINTA"));
    assert!(events.contains_key("MINTC"));

    let quotes = load_quotes(&db, &config.trade.size_tiers()).unwrap();
    let book = QuoteBook::from_quotes(quotes);
    assert_eq!(book.mint_count(), 1);

    let mut base = config.base_params();
    let grid = ParamGrid::from_spec(&config.grid, &mut base);
    let outcome = run_sweep(
        &grid,
        &base,
        &events,
        &book,
        &config.trade,
        &config.sweep,
        false,
    );

    assert_eq!(outcome.rows.len(), 2);
    // ENTRY_MIN_SCORE 60 → Apex trade on MINTA, pnl = 0.4 * 0.4.
    let hit = &outcome.rows[0];
    assert_eq!(hit.metrics.trades, 1);
    assert!((hit.metrics.total_pnl - 0.16).abs() < 1e-12);
    // ENTRY_MIN_SCORE 95 is above the snapshot's score: nothing trades.
    let miss = &outcome.rows[1];
    assert_eq!(miss.metrics.trades, 0);

    let best = outcome.best.as_ref().unwrap();
    assert_eq!(best.run_id, hit.run_id);

    let out_dir = _guard.path().join("out");
    let paths = save_artifacts(&out_dir, &outcome).unwrap();
    let summary = std::fs::read_to_string(paths.summary_csv).unwrap();
    assert_eq!(summary.lines().count(), 3);
    let best_json = std::fs::read_to_string(paths.best_json).unwrap();
    assert!(best_json.contains("\"trades\": 1"));
}

#[test]
fn empty_grid_still_evaluates_base_once() {
    let (_guard, db) = fixture_db();

    let config = SweepConfig::from_toml(&format!(
        r#"
[data]
db = "{}"
"#,
        db.display()
    ))
    .unwrap();

    let events = load_events(&db, None, None).unwrap();
    let book = QuoteBook::from_quotes(load_quotes(&db, &config.trade.size_tiers()).unwrap());

    let mut base = config.base_params();
    let grid = ParamGrid::from_spec(&BTreeMap::new(), &mut base);
    let outcome = run_sweep(
        &grid,
        &base,
        &events,
        &book,
        &config.trade,
        &SweepConstraints::default(),
        false,
    );

    assert_eq!(outcome.rows.len(), 1);
    assert_eq!(outcome.rows[0].params, base);
    // One trade < min_trades 10, so selection comes from the fallback path.
    assert!(outcome.best.is_some());
}

#[test]
fn scalar_grid_entry_pins_parameter_across_rows() {
    let (_guard, db) = fixture_db();

    let events = load_events(&db, None, None).unwrap();
    let config = SweepConfig::from_toml(&format!(
        r#"
[data]
db = "{}"

[grid]
COOLDOWN_SEC = 300.0
ENTRY_MIN_SCORE = [60.0, 65.0]
"#,
        db.display()
    ))
    .unwrap();
    let book = QuoteBook::from_quotes(load_quotes(&db, &config.trade.size_tiers()).unwrap());

    let mut base = config.base_params();
    let grid = ParamGrid::from_spec(&config.grid, &mut base);
    assert_eq!(base.cooldown_secs(), 300);

    let outcome = run_sweep(
        &grid,
        &base,
        &events,
        &book,
        &config.trade,
        &config.sweep,
        false,
    );
    assert_eq!(outcome.rows.len(), 2);
    for row in &outcome.rows {
        assert_eq!(row.params.cooldown_secs(), 300);
    }
}

use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use unit_selector::adapters::cache::NoopViews;
use unit_selector::app::commands::{self, AssignOps};
use unit_selector::core::{BlockCode, BlockKey};
use unit_selector::{DashboardCache, HttpUnitsApi, SelectionEditor};

fn mock_group(server: &MockServer) {
    let items = json!([
        {"id": 1, "name": "101", "developmentId": 1, "developmentName": "Residencial Ipê",
         "blockCode": "A", "blockName": "Quadra A", "status": "sold", "value": 120000.0,
         "typology": "Lote", "isOwned": true},
        {"id": 2, "name": "102", "developmentId": 1, "developmentName": "Residencial Ipê",
         "blockCode": "A", "blockName": "Quadra A", "status": "available", "value": null,
         "typology": null, "isOwned": false},
        {"id": 3, "name": "01", "developmentId": 2, "developmentName": "Casa Verde",
         "blockCode": null, "blockName": null, "status": "available", "value": 80000.0,
         "typology": "Casa", "isOwned": false}
    ]);
    server.mock(|when, then| {
        when.method(GET).path("/groups/5/units");
        then.status(200).json_body(json!({ "total": 3, "items": items }));
    });
}

fn editor(server: &MockServer) -> Result<SelectionEditor<HttpUnitsApi, NoopViews>> {
    let api = HttpUnitsApi::new(&server.base_url(), None, Duration::from_secs(5))?;
    Ok(SelectionEditor::new(api, NoopViews))
}

#[tokio::test]
async fn test_show_renders_tree_and_empty_states() -> Result<()> {
    let server = MockServer::start();
    mock_group(&server);
    let mut editor = editor(&server)?;

    let text = commands::show(&mut editor, 5, "", false).await?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "▾ Casa Verde (0/1)");
    assert_eq!(lines[1], "  ▾ (no block) (0/1)");
    assert_eq!(lines[3], "▾ Residencial Ipê (1/2)");
    assert_eq!(lines[4], "  ▾ Quadra A (1/2)");
    assert_eq!(lines[5], "    [x] 101 #1 sold Lote 120000.00");
    assert_eq!(lines.last().copied(), Some("Selected (1/3)"));

    let none = commands::show(&mut editor, 5, "xyz", false).await?;
    assert_eq!(none, "No units match 'xyz'\n");

    let collapsed = commands::show(&mut editor, 5, "", true).await?;
    assert_eq!(collapsed.lines().count(), 3);

    Ok(())
}

#[tokio::test]
async fn test_assign_dry_run_submits_nothing() -> Result<()> {
    let server = MockServer::start();
    mock_group(&server);
    let save = server.mock(|when, then| {
        when.method(PUT).path("/groups/5/units/ownership");
        then.status(200).json_body(json!({ "message": "ok" }));
    });
    let mut editor = editor(&server)?;
    let ops = AssignOps {
        select_block: vec![BlockKey::new(1, BlockCode::Code("A".to_string()))],
        toggle: vec![3],
        ..Default::default()
    };

    let report = commands::assign(&mut editor, 5, &ops, true).await?;

    assert_eq!(save.hits(), 0);
    assert_eq!(report.changes.added, vec![2, 3]);
    assert!(report.changes.removed.is_empty());
    assert_eq!((report.selected, report.total), (3, 3));
    assert!(report.saved.is_none());
    assert!(!editor.is_open());

    Ok(())
}

#[tokio::test]
async fn test_assign_submits_final_set() -> Result<()> {
    let server = MockServer::start();
    mock_group(&server);
    let save = server.mock(|when, then| {
        when.method(PUT)
            .path("/groups/5/units/ownership")
            .json_body(json!({ "unitIds": [3] }));
        then.status(200).json_body(json!({ "message": "1 unidade atualizada" }));
    });
    let mut editor = editor(&server)?;
    let ops = AssignOps {
        deselect_all: true,
        select_development: vec![2],
        ..Default::default()
    };

    let report = commands::assign(&mut editor, 5, &ops, false).await?;

    save.assert();
    assert_eq!(report.changes.removed, vec![1]);
    assert_eq!(report.saved.unwrap().message, "1 unidade atualizada");

    Ok(())
}

#[tokio::test]
async fn test_export_writes_csv() -> Result<()> {
    let server = MockServer::start();
    mock_group(&server);
    let dir = TempDir::new()?;
    let output = dir.path().join("units.csv");
    let output = output.to_str().unwrap();
    let mut editor = editor(&server)?;

    let written = commands::export(&mut editor, 5, "quadra", output).await?;

    assert_eq!(written, 2);
    let content = std::fs::read_to_string(output)?;
    assert!(content.starts_with("development_id,development,block_code"));
    assert!(content.contains("1,Residencial Ipê,A,Quadra A,1,101,sold,Lote,120000.0,true"));
    assert!(!content.contains("Casa Verde"));

    Ok(())
}

#[tokio::test]
async fn test_totals_are_computed_from_loaded_units() -> Result<()> {
    let server = MockServer::start();
    mock_group(&server);
    let cache = Arc::new(DashboardCache::new());
    let api = HttpUnitsApi::new(&server.base_url(), None, Duration::from_secs(5))?;
    let editor = SelectionEditor::new(api, cache.clone());

    let totals = commands::totals(&editor, &cache, 5).await?;
    let again = commands::totals(&editor, &cache, 5).await?;

    assert_eq!(totals, again);
    assert_eq!(totals.units, 3);
    assert_eq!(totals.owned_units, 1);
    assert_eq!(totals.owned_value, 120000.0);

    Ok(())
}

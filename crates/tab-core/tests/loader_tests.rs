mod common;

use common::shape;
use serde_json::json;
use tab_core::model::{ColumnShape, ResultStatus, Step, Tab, Table, Workflow};
use tab_core::render::{StoreTabOutputLoader, TabOutputLoader};
use tab_core::store::{encode_table, CachedRenderResult, InMemoryWorkflowStore, StagedResults, WorkflowStore};
use tab_core::RenderError;

fn ok_result(columns: &[&str], rows: Vec<Vec<serde_json::Value>>) -> CachedRenderResult {
    let table = Table::new(columns.iter().map(|c| ColumnShape::text(*c)).collect(), rows);
    CachedRenderResult { fingerprint: "fp".into(),
                         status: ResultStatus::Ok,
                         columns: table.columns.clone(),
                         message: None,
                         table: encode_table(&table).expect("encode") }
}

fn setup() -> (InMemoryWorkflowStore, uuid::Uuid) {
    let store = InMemoryWorkflowStore::new();
    let id = store.insert_workflow(Workflow::new("wf",
                                                 vec![Tab::new("tab-1",
                                                               "Data",
                                                               vec![Step::new("s0", "literal", json!({})),
                                                                    Step::new("s1", "literal", json!({}))]),
                                                      Tab::new("tab-empty", "Nothing", vec![])]));
    (store, id)
}

#[test]
fn loads_committed_output_of_last_step() {
    let (store, id) = setup();
    store.commit_render(id,
                        0,
                        vec![("s0".into(), ok_result(&["Z"], vec![])),
                             ("s1".into(), ok_result(&["A", "B"], vec![vec![json!(1), json!(2)]]))])
         .expect("commit");
    let lock = store.acquire_workflow_lock(id, None).expect("lock");
    let staged = StagedResults::new();
    let loader = StoreTabOutputLoader::new(&store, &lock, &staged);

    let out = loader.load("tab-1", &shape(&["A", "B"])).expect("load");
    assert_eq!(out.name, "Data");
    assert_eq!(out.columns, out.table.columns);
    assert_eq!(out.table.rows, vec![vec![json!(1), json!(2)]]);
}

#[test]
fn staged_results_win_over_committed_ones() {
    let (store, id) = setup();
    store.commit_render(id, 0, vec![("s1".into(), ok_result(&["OLD"], vec![]))]).expect("commit");
    let lock = store.acquire_workflow_lock(id, None).expect("lock");
    let mut staged = StagedResults::new();
    staged.stage("s1", ok_result(&["NEW"], vec![]));
    let loader = StoreTabOutputLoader::new(&store, &lock, &staged);
    assert!(loader.load("tab-1", &shape(&["NEW"])).is_ok());
    assert!(matches!(loader.load("tab-1", &shape(&["OLD"])), Err(RenderError::StaleExecution(_))));
}

#[test]
fn every_mismatch_is_stale() {
    let (store, id) = setup();
    let lock = store.acquire_workflow_lock(id, None).expect("lock");
    let staged = StagedResults::new();
    let loader = StoreTabOutputLoader::new(&store, &lock, &staged);

    // sin resultado cacheado
    assert!(matches!(loader.load("tab-1", &shape(&["A"])), Err(RenderError::StaleExecution(_))));
    // tab borrado
    assert!(matches!(loader.load("tab-9", &shape(&["A"])), Err(RenderError::StaleExecution(_))));
    // tab sin steps: no hay output
    assert_eq!(loader.load("tab-empty", &shape(&[])).unwrap_err(),
               RenderError::TabOutputUnreachable("tab-empty".into()));

    let mut corrupt = StagedResults::new();
    let mut bad = ok_result(&["A"], vec![]);
    bad.table = b"{not json".to_vec();
    corrupt.stage("s1", bad);
    let loader = StoreTabOutputLoader::new(&store, &lock, &corrupt);
    assert!(matches!(loader.load("tab-1", &shape(&["A"])), Err(RenderError::StaleExecution(_))));

    let mut failed = StagedResults::new();
    failed.stage("s1",
                 CachedRenderResult { fingerprint: "fp".into(),
                                      status: ResultStatus::Error,
                                      columns: vec![],
                                      message: Some("boom".into()),
                                      table: vec![] });
    let loader = StoreTabOutputLoader::new(&store, &lock, &failed);
    assert!(matches!(loader.load("tab-1", &shape(&[])), Err(RenderError::StaleExecution(_))));
}

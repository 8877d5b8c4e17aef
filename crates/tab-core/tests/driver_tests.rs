mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{base_catalog, catalog_with, literal_params, reftab, OnRender};
use serde_json::json;
use tab_core::engine::{RenderDriver, RenderSettings, RenderState};
use tab_core::event::EventStore;
use tab_core::model::{ResultStatus, Step, Tab, Workflow};
use tab_core::store::{InMemoryWorkflowStore, WorkflowStore};
use tab_core::{CoreEngineError, RenderValue};

fn literal(slug: &str, columns: &[&str]) -> Step {
    Step::new(slug, "literal", literal_params(columns, json!([["1", "2"]])))
}

fn reftab_step(slug: &str, tab: &str, cols: &str) -> Step {
    Step::new(slug, "reftab", json!({"tab": tab, "cols": cols}))
}

fn letters(driver: &RenderDriver<Arc<InMemoryWorkflowStore>>, id: uuid::Uuid) -> String {
    driver.events().list(id).iter().map(|e| e.kind.letter()).collect()
}

#[test]
fn renders_tabs_in_order_and_resolves_references() {
    let capture = reftab();
    let seen = Arc::clone(&capture.seen);
    let store = Arc::new(InMemoryWorkflowStore::new());
    let id = store.insert_workflow(Workflow::new("wf",
                                                 vec![Tab::new("tab-1", "Source", vec![literal("s1", &["A", "B"])]),
                                                      Tab::new("tab-2",
                                                               "Uses source",
                                                               vec![literal("s2", &["C"]),
                                                                    reftab_step("s3", "tab-1", "A,Q,B")])]));
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(catalog_with(capture)).build();

    let report = driver.render(id).expect("render");
    assert_eq!(report.attempts, 1);
    assert_eq!(report.tab("tab-1").map(|t| t.state), Some(RenderState::Ok));
    let tab2 = report.tab("tab-2").expect("tab-2 report");
    assert_eq!(tab2.state, RenderState::Ok);
    // reftab pasa su input: las columnas de tab-2 son las del step anterior
    assert_eq!(tab2.shape.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["C"]);

    let seen = seen.lock().expect("seen");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get("cols"), Some(&RenderValue::string("A,B")));
    let tab = seen[0].get("tab").and_then(RenderValue::as_tab).expect("tab output");
    assert_eq!((tab.slug.as_str(), tab.name.as_str()), ("tab-1", "Source"));
    assert_eq!(tab.table.rows, vec![vec![json!("1"), json!("2")]]);

    assert_eq!(letters(&driver, id), "PTStTSStC");
    let shapes = report.tab_shapes();
    assert_eq!(shapes.keys().map(String::as_str).collect::<Vec<_>>(), vec!["tab-1", "tab-2"]);
    assert_eq!(shapes["tab-2"].as_ref(), Some(&tab2.shape));
    let table = driver.tab_table(id, "tab-1").expect("read").expect("table");
    assert_eq!(table.num_rows(), 1);
}

#[test]
fn forward_reference_is_reported_as_cycle() {
    let store = Arc::new(InMemoryWorkflowStore::new());
    let id = store.insert_workflow(Workflow::new("wf",
                                                 vec![Tab::new("tab-1", "Early", vec![literal("s1", &["A"]),
                                                                                      reftab_step("s2", "tab-2", "")]),
                                                      Tab::new("tab-2", "Late", vec![literal("s3", &["B"])])]));
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(catalog_with(reftab()))
                                                              .build();
    let report = driver.render(id).expect("render");
    let tab1 = report.tab("tab-1").expect("tab-1");
    assert_eq!(tab1.state, RenderState::Error);
    let s2 = tab1.step("s2").expect("s2");
    assert_eq!(s2.status, ResultStatus::Error);
    assert!(s2.message.as_deref().is_some_and(|m| m.contains("tab-2")));
    assert_eq!(report.tab("tab-2").map(|t| t.state), Some(RenderState::Ok));
}

#[test]
fn true_cycle_errors_first_tab_and_makes_second_unreachable() {
    let store = Arc::new(InMemoryWorkflowStore::new());
    let id = store.insert_workflow(Workflow::new("wf",
                                                 vec![Tab::new("tab-1", "A", vec![reftab_step("a", "tab-2", "")]),
                                                      Tab::new("tab-2", "B", vec![reftab_step("b", "tab-1", "")])]));
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(catalog_with(reftab()))
                                                              .build();
    let report = driver.render(id).expect("render");
    assert_eq!(report.tab("tab-1").map(|t| t.state), Some(RenderState::Error));
    assert_eq!(report.tab("tab-2").map(|t| t.state), Some(RenderState::Unreachable));
}

#[test]
fn unreachable_is_contagious_across_tabs_and_steps() {
    let store = Arc::new(InMemoryWorkflowStore::new());
    let id = store.insert_workflow(Workflow::new("wf",
                                                 vec![Tab::new("tab-1",
                                                               "Broken",
                                                               vec![literal("s1", &["A"]),
                                                                    Step::new("s2", "fail", json!({})),
                                                                    literal("s3", &["A"])]),
                                                      Tab::new("tab-2", "Mid", vec![reftab_step("s4", "tab-1", "A")]),
                                                      Tab::new("tab-3", "End", vec![reftab_step("s5", "tab-2", "A")])]));
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(catalog_with(reftab()))
                                                              .build();
    let report = driver.render(id).expect("render");
    let tab1 = report.tab("tab-1").expect("tab-1");
    assert_eq!(tab1.state, RenderState::Error);
    let statuses: Vec<ResultStatus> = tab1.steps.iter().map(|s| s.status).collect();
    assert_eq!(statuses, vec![ResultStatus::Ok, ResultStatus::Error, ResultStatus::Unreachable]);
    assert_eq!(tab1.step("s2").and_then(|s| s.message.as_deref()), Some("boom"));
    assert!(tab1.shape.columns.is_empty());
    assert_eq!(report.tab("tab-2").map(|t| t.state), Some(RenderState::Unreachable));
    assert_eq!(report.tab("tab-3").map(|t| t.state), Some(RenderState::Unreachable));
}

#[test]
fn deleted_reference_resolves_to_null_and_empty_tab_is_unreachable() {
    let capture = reftab();
    let seen = Arc::clone(&capture.seen);
    let store = Arc::new(InMemoryWorkflowStore::new());
    let id = store.insert_workflow(Workflow::new("wf",
                                                 vec![Tab::new("tab-empty", "Empty", vec![]),
                                                      Tab::new("tab-1", "Gone", vec![reftab_step("s1", "tab-9", "A")]),
                                                      Tab::new("tab-2", "Empty ref", vec![reftab_step("s2", "tab-empty", "")])]));
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(catalog_with(capture)).build();
    let report = driver.render(id).expect("render");

    let empty = report.tab("tab-empty").expect("empty tab");
    assert_eq!(empty.state, RenderState::Ok);
    assert!(empty.shape.columns.is_empty());

    assert_eq!(report.tab("tab-1").map(|t| t.state), Some(RenderState::Ok));
    assert_eq!(seen.lock().expect("seen")[0].get("tab"), Some(&RenderValue::Null));
    assert_eq!(report.tab("tab-2").map(|t| t.state), Some(RenderState::Unreachable));
}

#[test]
fn unknown_module_fails_the_step() {
    let store = Arc::new(InMemoryWorkflowStore::new());
    let id = store.insert_workflow(Workflow::new("wf",
                                                 vec![Tab::new("tab-1", "X", vec![Step::new("s1", "nope", json!({}))])]));
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(base_catalog()).build();
    let report = driver.render(id).expect("render");
    let step = report.tab("tab-1").and_then(|t| t.step("s1")).expect("step");
    assert_eq!(step.status, ResultStatus::Error);
    assert_eq!(step.message.as_deref(), Some("module 'nope' does not exist"));
}

#[test]
fn second_render_reuses_cache_until_params_change() {
    let capture = reftab();
    let seen = Arc::clone(&capture.seen);
    let store = Arc::new(InMemoryWorkflowStore::new());
    let id = store.insert_workflow(Workflow::new("wf",
                                                 vec![Tab::new("tab-1", "Source", vec![literal("s1", &["A"])]),
                                                      Tab::new("tab-2", "Ref", vec![reftab_step("s2", "tab-1", "A")]),
                                                      Tab::new("tab-3", "Alone", vec![literal("s3", &["Z"])])]));
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(catalog_with(capture)).build();

    let first = driver.render(id).expect("first render");
    assert_eq!(first.cached_step_count(), 0);
    let second = driver.render(id).expect("second render");
    assert_eq!(second.cached_step_count(), second.step_count());
    assert_eq!(seen.lock().expect("seen").len(), 1);

    // cambiar tab-1 invalida también al step que lo referencia
    store.set_step_params(id, "s1", literal_params(&["A", "B"], json!([]))).expect("edit");
    let third = driver.render(id).expect("third render");
    let cached: Vec<(String, bool)> = third.tabs
                                           .values()
                                           .flat_map(|t| t.steps.iter().map(|s| (s.slug.clone(), s.cached)))
                                           .collect();
    assert_eq!(cached,
               vec![("s1".to_string(), false), ("s2".to_string(), false), ("s3".to_string(), true)]);
    assert_eq!(seen.lock().expect("seen").len(), 2);
}

#[test]
fn changed_secret_value_is_not_served_from_cache() {
    let secrets = json!({"rows": [["OLD"]]}).as_object().cloned().expect("object");
    let step = Step::new("s1", "literal", literal_params(&["x"], json!([]))).with_secrets(secrets);
    let store = Arc::new(InMemoryWorkflowStore::new());
    let id = store.insert_workflow(Workflow::new("wf", vec![Tab::new("tab-1", "Secret", vec![step])]));
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(base_catalog()).build();

    driver.render(id).expect("first render");
    let table = driver.tab_table(id, "tab-1").expect("read").expect("table");
    assert_eq!(table.rows, vec![vec![json!("OLD")]]);

    store.update_workflow(id, |wf| {
             if let Some(step) = wf.step_mut("s1") {
                 step.secrets.insert("rows".into(), json!([["NEW"]]));
             }
         })
         .expect("edit secret");
    let report = driver.render(id).expect("second render");
    assert_eq!(report.cached_step_count(), 0);
    let table = driver.tab_table(id, "tab-1").expect("read").expect("table");
    assert_eq!(table.rows, vec![vec![json!("NEW")]]);
}

#[test]
fn renaming_a_tab_invalidates_steps_that_see_its_name() {
    let capture = reftab();
    let seen = Arc::clone(&capture.seen);
    let store = Arc::new(InMemoryWorkflowStore::new());
    let id = store.insert_workflow(Workflow::new("wf",
                                                 vec![Tab::new("tab-1", "Source", vec![literal("s1", &["A"])]),
                                                      Tab::new("tab-2", "Ref", vec![reftab_step("s2", "tab-1", "A")])]));
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(catalog_with(capture)).build();
    driver.render(id).expect("first render");

    // el nombre del tab referenciado llega al módulo vía TabOutput
    store.update_workflow(id, |wf| {
             if let Some(tab) = wf.tab_mut("tab-1") {
                 tab.name = "Renamed".into();
             }
         })
         .expect("rename tab-1");
    let report = driver.render(id).expect("second render");
    assert_eq!(report.cached_step_count(), 0);
    {
        let seen = seen.lock().expect("seen");
        assert_eq!(seen.len(), 2);
        let tab = seen[1].get("tab").and_then(RenderValue::as_tab).expect("tab output");
        assert_eq!(tab.name, "Renamed");
    }

    // renombrar el propio tab sólo invalida sus steps (RenderExtra.tab_name)
    store.update_workflow(id, |wf| {
             if let Some(tab) = wf.tab_mut("tab-2") {
                 tab.name = "Ref 2".into();
             }
         })
         .expect("rename tab-2");
    let report = driver.render(id).expect("third render");
    assert_eq!(report.tab("tab-1").and_then(|t| t.step("s1")).map(|s| s.cached), Some(true));
    assert_eq!(report.tab("tab-2").and_then(|t| t.step("s2")).map(|s| s.cached), Some(false));
    assert_eq!(seen.lock().expect("seen").len(), 3);
}

#[test]
fn concurrent_edit_restarts_the_pass() {
    let store = Arc::new(InMemoryWorkflowStore::new());
    let wf = Workflow::new("wf",
                           vec![Tab::new("tab-1", "Edits", vec![Step::new("s1", "onrender", json!({}))]),
                                Tab::new("tab-2", "Victim", vec![literal("s2", &["A"])])]);
    let id = wf.id;
    let editor_store = Arc::clone(&store);
    let was_locked = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&was_locked);
    let on_render = OnRender::new(move || {
        flag.store(editor_store.locks().is_locked(id), Ordering::SeqCst);
        editor_store.delete_tab(id, "tab-2").expect("delete tab");
    });
    store.insert_workflow(wf);
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(catalog_with(on_render))
                                                              .build();

    let report = driver.render(id).expect("render");
    assert!(was_locked.load(Ordering::SeqCst), "pass must hold the workflow lock");
    assert_eq!(report.attempts, 2);
    assert!(report.tab("tab-2").is_none());
    let events = letters(&driver, id);
    assert!(events.contains('A'), "events: {events}");
    assert_eq!(events.matches('C').count(), 1);
    assert!(!store.locks().is_locked(id));
}

#[test]
fn stale_pass_gives_up_after_max_attempts() {
    let store = Arc::new(InMemoryWorkflowStore::new());
    let wf = Workflow::new("wf", vec![Tab::new("tab-1", "Edits", vec![Step::new("s1", "onrender", json!({}))])]);
    let id = wf.id;
    let editor_store = Arc::clone(&store);
    let on_render = OnRender::new(move || {
        editor_store.update_workflow(id, |wf| wf.name = "renamed".into()).expect("edit");
    });
    store.insert_workflow(wf);
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(catalog_with(on_render))
                                                              .settings(RenderSettings { max_attempts: 1,
                                                                                         lock_timeout: None })
                                                              .build();
    assert_eq!(driver.render(id).unwrap_err(), CoreEngineError::StaleExecution { attempts: 1 });
    // nada se confirmó
    assert_eq!(store.get_step_cached_result(id, "s1").expect("read"), None);
}

#[test]
fn unknown_workflow_and_lock_timeout() {
    let store = Arc::new(InMemoryWorkflowStore::new());
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(base_catalog())
                                                              .settings(RenderSettings { max_attempts: 3,
                                                                                         lock_timeout: Some(Duration::from_millis(20)) })
                                                              .build();
    let missing = uuid::Uuid::new_v4();
    assert_eq!(driver.render(missing).unwrap_err(), CoreEngineError::WorkflowNotFound(missing));

    let id = store.insert_workflow(Workflow::new("wf", vec![Tab::new("tab-1", "T", vec![literal("s1", &["A"])])]));
    let held = store.acquire_workflow_lock(id, None).expect("hold lock");
    assert!(matches!(driver.render(id), Err(CoreEngineError::Storage(_))));
    drop(held);
    assert!(driver.render(id).is_ok());
}

#[test]
fn renders_of_one_workflow_are_serialized_across_threads() {
    let store = Arc::new(InMemoryWorkflowStore::new());
    let id = store.insert_workflow(Workflow::new("wf", vec![Tab::new("tab-1", "T", vec![literal("s1", &["A"])])]));
    let handles: Vec<_> = (0..4).map(|_| {
                                    let store = Arc::clone(&store);
                                    std::thread::spawn(move || {
                                        let mut driver =
                                            RenderDriver::builder(store).catalog(base_catalog()).build();
                                        driver.render(id).map(|r| r.attempts)
                                    })
                                })
                                .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("thread"), Ok(1));
    }
    assert!(!store.locks().is_locked(id));
}

#[test]
fn modules_receive_input_columns() {
    // `extra.input_columns` refleja el output del step anterior
    #[derive(Debug)]
    struct Columns(tab_core::ParamDType, Arc<std::sync::Mutex<Vec<String>>>);
    impl tab_core::RenderModule for Columns {
        fn id(&self) -> &str {
            "columns"
        }
        fn param_schema(&self) -> &tab_core::ParamDType {
            &self.0
        }
        fn render(&self,
                  table: tab_core::Table,
                  _params: &tab_core::RenderParams,
                  extra: &tab_core::RenderExtra)
                  -> Result<tab_core::Table, tab_core::ModuleError> {
            self.1.lock().expect("names").extend(extra.input_columns.keys().cloned());
            Ok(table)
        }
    }
    let names = Arc::new(std::sync::Mutex::new(Vec::new()));
    let module = Columns(tab_core::ParamDType::dict([("x", tab_core::ParamDType::Primitive)]), Arc::clone(&names));
    let store = Arc::new(InMemoryWorkflowStore::new());
    let id = store.insert_workflow(Workflow::new("wf",
                                                 vec![Tab::new("tab-1",
                                                               "T",
                                                               vec![literal("s1", &["A", "B"]),
                                                                    Step::new("s2", "columns", json!({}))])]));
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(catalog_with(module)).build();
    driver.render(id).expect("render");
    assert_eq!(*names.lock().expect("names"), vec!["A".to_string(), "B".to_string()]);
}

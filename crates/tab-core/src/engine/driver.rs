//! `RenderDriver`: ejecuta pasadas de render de un workflow.
//!
//! Una pasada:
//! 1. toma el lock del workflow y lee su revisión;
//! 2. renderiza los tabs en orden de declaración, step por step, llenando el
//!    registro de shapes a medida que cada tab termina;
//! 3. confirma todos los resultados de una vez, sólo si la revisión no cambió.
//!
//! Si algo indica que el workflow cambió durante la pasada (tab borrado,
//! resultado cacheado que no coincide, revisión distinta al confirmar), la
//! pasada se descarta completa y se reintenta desde cero con el lock nuevo.

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde_json::Value;
use uuid::Uuid;

use super::pass::PassState;
use super::{RenderDriverBuilder, RenderReport, RenderSettings, RenderState, StepReport, TabReport};
use crate::constants::ENGINE_VERSION;
use crate::errors::{CoreEngineError, RenderError};
use crate::hashing::hash_value;
use crate::event::{EventStore, InMemoryEventStore, RenderEventKind};
use crate::model::{ResultShape, ResultStatus, Step, StepFingerprintInput, StepParams, Tab, Table};
use crate::module::{ModuleCatalog, RenderExtra};
use crate::render::{get_param_values, RenderContext, StoreTabOutputLoader};
use crate::store::{decode_table, encode_table, CachedRenderResult, StoreError, WorkflowLockGuard, WorkflowStore};

/// Motivo por el que una pasada no llegó a confirmarse.
#[derive(Debug)]
enum PassError {
    /// Estado obsoleto: la pasada se descarta y se reintenta.
    Stale(String),
    Engine(CoreEngineError),
}

impl From<StoreError> for PassError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::RevisionMismatch { .. } => PassError::Stale(e.to_string()),
            StoreError::WorkflowNotFound(id) => PassError::Engine(CoreEngineError::WorkflowNotFound(id)),
            other => PassError::Engine(CoreEngineError::Storage(other.to_string())),
        }
    }
}

impl From<RenderError> for PassError {
    fn from(e: RenderError) -> Self {
        // sólo se convierten errores con `is_pass_fatal()`; el resto se
        // resuelve como status del step
        match e {
            RenderError::StaleExecution(reason) => PassError::Stale(reason),
            RenderError::Storage(msg) => PassError::Engine(CoreEngineError::Storage(msg)),
            other => PassError::Engine(CoreEngineError::Internal(other.to_string())),
        }
    }
}

impl From<CoreEngineError> for PassError {
    fn from(e: CoreEngineError) -> Self {
        PassError::Engine(e)
    }
}

/// Input de un step: el output del step anterior (o una tabla vacía).
#[derive(Default)]
struct StepInput {
    table: Table,
    fingerprint: Option<String>,
}

struct StepOutcome {
    result: CachedRenderResult,
    table: Option<Table>,
    cached: bool,
}

impl StepOutcome {
    fn failed(status: ResultStatus, fingerprint: String, message: Option<String>) -> Self {
        Self { result: CachedRenderResult { fingerprint,
                                            status,
                                            columns: Vec::new(),
                                            message,
                                            table: Vec::new() },
               table: None,
               cached: false }
    }
}

pub struct RenderDriver<S, E = InMemoryEventStore>
    where S: WorkflowStore,
          E: EventStore
{
    store: S,
    events: E,
    catalog: ModuleCatalog,
    settings: RenderSettings,
}

impl<S: WorkflowStore> RenderDriver<S, InMemoryEventStore> {
    pub fn builder(store: S) -> RenderDriverBuilder<S> {
        RenderDriverBuilder::new(store)
    }
}

impl<S, E> RenderDriver<S, E>
    where S: WorkflowStore,
          E: EventStore
{
    pub fn new(store: S, events: E, catalog: ModuleCatalog, settings: RenderSettings) -> Self {
        Self { store,
               events,
               catalog,
               settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    /// Renderiza el workflow completo, reintentando pasadas obsoletas hasta
    /// `max_attempts` veces.
    pub fn render(&mut self, workflow_id: Uuid) -> Result<RenderReport, CoreEngineError> {
        let max_attempts = self.settings.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.render_pass(workflow_id, attempt) {
                Ok(report) => {
                    info!("render committed workflow={workflow_id} attempt={attempt} steps={} cached={}",
                          report.step_count(),
                          report.cached_step_count());
                    return Ok(report);
                }
                Err(PassError::Stale(reason)) => {
                    warn!("render pass aborted workflow={workflow_id} attempt={attempt}: {reason}");
                    self.events.append_kind(workflow_id, RenderEventKind::PassAborted { attempt, reason });
                }
                Err(PassError::Engine(e)) => return Err(e),
            }
        }
        Err(CoreEngineError::StaleExecution { attempts: max_attempts })
    }

    /// Tabla confirmada del último step de un tab (`None` si el tab no existe,
    /// no tiene steps o no terminó `ok`).
    pub fn tab_table(&self, workflow_id: Uuid, tab_slug: &str) -> Result<Option<Table>, CoreEngineError> {
        let cached = self.store
                         .get_cached_result(workflow_id, tab_slug)
                         .map_err(|e| CoreEngineError::Storage(e.to_string()))?;
        match cached {
            Some(result) if result.status_is_ok() => {
                let table = decode_table(&result.table).map_err(|e| CoreEngineError::Internal(e.to_string()))?;
                Ok(Some(table))
            }
            _ => Ok(None),
        }
    }

    fn render_pass(&mut self, workflow_id: Uuid, attempt: u32) -> Result<RenderReport, PassError> {
        let lock = self.store.acquire_workflow_lock(workflow_id, self.settings.lock_timeout)?;
        let revision = self.store.workflow_revision(workflow_id)?;
        let slugs = self.store.get_tab_slugs(workflow_id)?;
        debug!("render pass start workflow={workflow_id} attempt={attempt} revision={revision} tabs={}",
               slugs.len());
        self.events.append_kind(workflow_id,
                                RenderEventKind::PassStarted { attempt,
                                                               revision,
                                                               tab_count: slugs.len() });

        let mut pass = PassState::new(&slugs);
        let mut tabs = IndexMap::new();
        for slug in &slugs {
            let tab = self.store
                          .get_tab(workflow_id, slug)?
                          .ok_or_else(|| PassError::Stale(format!("tab '{slug}' was deleted during render")))?;
            let report = self.render_tab(&lock, &mut pass, &tab)?;
            tabs.insert(slug.clone(), report);
        }

        let committed_steps = pass.staged.len();
        self.store.commit_render(workflow_id, revision, pass.staged.into_vec())?;
        self.events.append_kind(workflow_id, RenderEventKind::PassCompleted { attempt, committed_steps });
        drop(lock);
        Ok(RenderReport { workflow_id,
                          attempts: attempt,
                          tabs })
    }

    fn render_tab(&mut self, lock: &WorkflowLockGuard, pass: &mut PassState, tab: &Tab) -> Result<TabReport, PassError> {
        let workflow_id = lock.workflow_id();
        self.events.append_kind(workflow_id, RenderEventKind::TabStarted { tab_slug: tab.slug.clone() });
        let state = RenderState::Pending.advance(RenderState::Rendering)?;

        let mut input = StepInput::default();
        let mut failed: Option<ResultStatus> = None;
        let mut steps = Vec::with_capacity(tab.steps.len());
        for step in &tab.steps {
            let outcome = if failed.is_some() {
                // después de un step no-ok, el resto no se ejecuta
                StepOutcome::failed(ResultStatus::Unreachable, String::new(), None)
            } else {
                self.render_step(lock, pass, tab, step, std::mem::take(&mut input))?
            };
            let status = outcome.result.status;
            let fingerprint = outcome.result.fingerprint.clone();
            match status {
                ResultStatus::Ok => {
                    self.events.append_kind(workflow_id,
                                            RenderEventKind::StepRendered { tab_slug: tab.slug.clone(),
                                                                            step_slug: step.slug.clone(),
                                                                            fingerprint: fingerprint.clone(),
                                                                            cached: outcome.cached });
                }
                _ => {
                    self.events.append_kind(workflow_id,
                                            RenderEventKind::StepFailed { tab_slug: tab.slug.clone(),
                                                                          step_slug: step.slug.clone(),
                                                                          status,
                                                                          message: outcome.result.message.clone() });
                }
            }
            steps.push(StepReport { slug: step.slug.clone(),
                                    module: step.module.clone(),
                                    status,
                                    cached: outcome.cached,
                                    message: outcome.result.message.clone(),
                                    fingerprint: fingerprint.clone() });
            match outcome.table {
                Some(table) if failed.is_none() && status == ResultStatus::Ok => {
                    input = StepInput { table,
                                        fingerprint: Some(fingerprint) };
                }
                _ => {
                    failed.get_or_insert(status);
                }
            }
            pass.staged.stage(step.slug.clone(), outcome.result);
        }

        let shape = match failed {
            Some(status) => ResultShape::with_status(status, Vec::new()),
            None => input.table.shape(),
        };
        let status = shape.status;
        pass.finish_tab(&tab.slug, &tab.name, shape.clone(), input.fingerprint.filter(|_| failed.is_none()));
        let state = state.advance(RenderState::from(status))?;
        self.events.append_kind(workflow_id,
                                RenderEventKind::TabFinished { tab_slug: tab.slug.clone(),
                                                               status });
        debug!("tab finished workflow={workflow_id} tab={} status={status:?}", tab.slug);
        Ok(TabReport { slug: tab.slug.clone(),
                       name: tab.name.clone(),
                       state,
                       shape,
                       steps })
    }

    fn render_step(&self,
                   lock: &WorkflowLockGuard,
                   pass: &PassState,
                   tab: &Tab,
                   step: &Step,
                   input: StepInput)
                   -> Result<StepOutcome, PassError> {
        let workflow_id = lock.workflow_id();
        let Some(module) = self.catalog.get(&step.module) else {
            warn!("unknown module '{}' in step {}", step.module, step.slug);
            return Ok(StepOutcome::failed(ResultStatus::Error,
                                          String::new(),
                                          Some(format!("module '{}' does not exist", step.module))));
        };

        let schema = module.param_schema();
        let referenced = schema.collect_tab_slugs(&step.params);
        let fingerprint = StepFingerprintInput { engine_version: ENGINE_VERSION,
                                                 module_id: module.id(),
                                                 module_version: module.version(),
                                                 params: &step.params,
                                                 secrets_hash: hash_value(&Value::Object(step.secrets.clone())),
                                                 tab_name: &tab.name,
                                                 input_fingerprint: input.fingerprint.as_deref(),
                                                 tab_fingerprints: pass.tab_markers_for(&referenced) }.fingerprint();

        if let Some(outcome) = self.reuse_cached(workflow_id, step, &fingerprint)? {
            return Ok(outcome);
        }

        let input_shape = input.table.shape();
        let resolved = {
            let loader = StoreTabOutputLoader::new(&self.store, lock, &pass.staged);
            let ctx = RenderContext::new(workflow_id, &input_shape, &pass.shapes, &loader);
            get_param_values(&StepParams::new(schema, step), &ctx)
        };
        let params = match resolved {
            Ok(params) => params,
            Err(e) if e.is_pass_fatal() => return Err(e.into()),
            Err(RenderError::TabOutputUnreachable(slug)) => {
                debug!("step {} depends on unreachable tab '{slug}'", step.slug);
                return Ok(StepOutcome::failed(ResultStatus::Unreachable, fingerprint, None));
            }
            Err(e) => {
                warn!("step {} cannot resolve its params: {e}", step.slug);
                return Ok(StepOutcome::failed(ResultStatus::Error, fingerprint, Some(e.to_string())));
            }
        };

        let extra = RenderExtra { workflow_id,
                                  tab_slug: tab.slug.clone(),
                                  tab_name: tab.name.clone(),
                                  input_columns: input_shape.columns_by_name() };
        match module.render(input.table, &params, &extra) {
            Ok(table) => {
                let bytes = encode_table(&table).map_err(|e| CoreEngineError::Internal(e.to_string()))?;
                debug!("step rendered {} module={} rows={}", step.slug, step.module, table.num_rows());
                Ok(StepOutcome { result: CachedRenderResult { fingerprint,
                                                              status: ResultStatus::Ok,
                                                              columns: table.columns.clone(),
                                                              message: None,
                                                              table: bytes },
                                 table: Some(table),
                                 cached: false })
            }
            Err(e) => {
                debug!("step {} failed: {e}", step.slug);
                Ok(StepOutcome::failed(ResultStatus::Error, fingerprint, Some(e.to_string())))
            }
        }
    }

    /// Reutiliza el resultado confirmado del step si su fingerprint coincide.
    fn reuse_cached(&self, workflow_id: Uuid, step: &Step, fingerprint: &str) -> Result<Option<StepOutcome>, PassError> {
        let Some(cached) = self.store.get_step_cached_result(workflow_id, &step.slug)? else {
            return Ok(None);
        };
        if cached.fingerprint != fingerprint {
            return Ok(None);
        }
        if !cached.status_is_ok() {
            return Ok(Some(StepOutcome { result: cached,
                                         table: None,
                                         cached: true }));
        }
        match decode_table(&cached.table) {
            Ok(table) => Ok(Some(StepOutcome { result: cached,
                                               table: Some(table),
                                               cached: true })),
            Err(e) => {
                debug!("cached table of step {} is unreadable, rendering again: {e}", step.slug);
                Ok(None)
            }
        }
    }
}


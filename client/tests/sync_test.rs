//! End-to-end tests for the capture/sync cycle against an in-memory remote.

use async_trait::async_trait;
use campo_client::closure;
use campo_client::remote::{
    AreaClosureSummary, BlockFinalizeRequest, BlockFinalizeResponse, ClosureUpload, PropertyUpload,
    RemoteApi, RemoteError, VisitUpload,
};
use campo_client::store::{BLOCKS, PROPERTIES, VISITS};
use campo_client::{
    ClosureEngine, FileStore, MutationRecorder, Reconciler, SnapshotLoader, SyncError, VisitDraft,
};
use campo_engine::{
    Block, Property, PropertyKind, PropertyPatch, PropertyStatus, SnapshotSource, Visit,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Configurable in-memory implementation of the remote service.
#[derive(Clone, Default)]
struct FakeRemote {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    blocks: Vec<Block>,
    properties: Vec<Property>,
    offline: bool,
    fail_visits_for_property: HashSet<String>,
    fail_updates_for: HashSet<String>,
    fail_close_for: HashSet<String>,
    finalize_updated: Option<u32>,
    pending_closures: Vec<AreaClosureSummary>,
    received_visits: Vec<VisitUpload>,
    received_updates: Vec<(String, PropertyUpload)>,
    received_closures: Vec<ClosureUpload>,
    visit_calls: usize,
    update_calls: usize,
}

impl FakeRemote {
    fn new() -> Self {
        Self::default()
    }

    fn serve(&self, blocks: Vec<Block>, properties: Vec<Property>) {
        let mut state = self.state.lock().unwrap();
        state.blocks = blocks;
        state.properties = properties;
    }

    fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    fn fail_visits_for(&self, property_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_visits_for_property
            .insert(property_id.to_string());
    }

    fn fail_close_for(&self, area_id: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_close_for
            .insert(area_id.to_string());
    }

    fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_visits_for_property.clear();
        state.fail_updates_for.clear();
        state.fail_close_for.clear();
    }

    fn set_finalize_updated(&self, updated: u32) {
        self.state.lock().unwrap().finalize_updated = Some(updated);
    }

    fn set_pending_closures(&self, summaries: Vec<AreaClosureSummary>) {
        self.state.lock().unwrap().pending_closures = summaries;
    }

    fn visit_calls(&self) -> usize {
        self.state.lock().unwrap().visit_calls
    }

    fn update_calls(&self) -> usize {
        self.state.lock().unwrap().update_calls
    }

    fn received_visits(&self) -> Vec<VisitUpload> {
        self.state.lock().unwrap().received_visits.clone()
    }

    fn received_updates(&self) -> Vec<(String, PropertyUpload)> {
        self.state.lock().unwrap().received_updates.clone()
    }

    fn received_closures(&self) -> Vec<ClosureUpload> {
        self.state.lock().unwrap().received_closures.clone()
    }
}

fn network_err() -> RemoteError {
    RemoteError::Network("connection refused".into())
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn fetch_blocks(&self, _agent_id: &str) -> Result<Vec<Block>, RemoteError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(network_err());
        }
        Ok(state.blocks.clone())
    }

    async fn fetch_properties(&self, _agent_id: &str) -> Result<Vec<Property>, RemoteError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(network_err());
        }
        Ok(state.properties.clone())
    }

    async fn create_visit(&self, visit: &VisitUpload) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.visit_calls += 1;
        if state.offline {
            return Err(network_err());
        }
        if state.fail_visits_for_property.contains(&visit.property_id) {
            return Err(RemoteError::Rejected {
                status: 500,
                message: "erro interno".into(),
            });
        }
        state.received_visits.push(visit.clone());
        Ok(())
    }

    async fn update_property(
        &self,
        property_id: &str,
        property: &PropertyUpload,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.update_calls += 1;
        if state.offline {
            return Err(network_err());
        }
        if state.fail_updates_for.contains(property_id) {
            return Err(RemoteError::Rejected {
                status: 500,
                message: "erro interno".into(),
            });
        }
        state
            .received_updates
            .push((property_id.to_string(), property.clone()));
        Ok(())
    }

    async fn finalize_blocks(
        &self,
        request: &BlockFinalizeRequest,
    ) -> Result<BlockFinalizeResponse, RemoteError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(network_err());
        }
        let updated = state.finalize_updated.unwrap_or(request.ids.len() as u32);
        Ok(BlockFinalizeResponse { updated })
    }

    async fn pending_closures(
        &self,
        _agent_id: &str,
        _period: u32,
    ) -> Result<Vec<AreaClosureSummary>, RemoteError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(network_err());
        }
        Ok(state.pending_closures.clone())
    }

    async fn close_area(&self, closure: &ClosureUpload) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        if state.offline {
            return Err(network_err());
        }
        if state.fail_close_for.contains(&closure.area_id) {
            return Err(RemoteError::Rejected {
                status: 422,
                message: "diário incompleto".into(),
            });
        }
        state.received_closures.push(closure.clone());
        Ok(())
    }
}

fn block(id: &str) -> Block {
    Block {
        id: id.into(),
        area_id: "a-1".into(),
        number: 10,
        total_properties: 2,
        responsible_agent_id: "agent-7".into(),
        finalized: false,
    }
}

fn property(id: &str, block_id: &str) -> Property {
    Property {
        id: id.into(),
        block_id: block_id.into(),
        position: 1,
        street: "Rua das Acácias".into(),
        number: "120".into(),
        kind: PropertyKind::Residential,
        inhabitants: 3,
        dogs: 1,
        cats: 0,
        observation: String::new(),
        status: PropertyStatus::Pending,
        edited_offline: false,
    }
}

fn draft(property_id: &str) -> VisitDraft {
    VisitDraft {
        property_id: property_id.into(),
        agent_id: "agent-7".into(),
        area_id: "a-1".into(),
        block_id: "q-1".into(),
        inspected_deposits: BTreeMap::from([("a1".to_string(), 2), ("b".to_string(), 1)]),
        inhabitants: 3,
        dogs: 1,
        cats: 0,
        samples_initial: 1,
        samples_final: 1,
        focus_count: 1,
        larvicide_grams: 10.0,
        treated_deposits: 1,
    }
}

fn summary(area_id: &str) -> AreaClosureSummary {
    AreaClosureSummary {
        area_id: area_id.into(),
        area_name: "Centro".into(),
        diary_count: 5,
        days_worked: 4,
    }
}

struct Harness {
    _dir: TempDir,
    store: Arc<FileStore>,
    remote: FakeRemote,
    recorder: MutationRecorder,
    reconciler: Reconciler<FakeRemote>,
}

async fn harness_with(properties: Vec<Property>, blocks: Vec<Block>) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    store.write(PROPERTIES, &properties).await.unwrap();
    store.write(BLOCKS, &blocks).await.unwrap();

    let remote = FakeRemote::new();
    let recorder = MutationRecorder::new(store.clone());
    let reconciler = Reconciler::new(remote.clone(), store.clone());

    Harness {
        _dir: dir,
        store,
        remote,
        recorder,
        reconciler,
    }
}

#[tokio::test]
async fn record_visit_marks_property_visited() {
    let h = harness_with(vec![property("i-1", "q-1")], vec![]).await;

    let visit = h.recorder.record_visit(draft("i-1")).await.unwrap();
    assert!(visit.is_pending());
    assert!(!visit.id.is_empty());
    assert!(visit.timestamp > 0);

    let stored: Vec<Property> = h.store.read(PROPERTIES).await.unwrap();
    assert_eq!(stored[0].status, PropertyStatus::Visited);
    assert!(stored[0].edited_offline);
}

#[tokio::test]
async fn visit_against_unknown_property_is_rejected() {
    let h = harness_with(vec![property("i-1", "q-1")], vec![]).await;

    let err = h.recorder.record_visit(draft("i-99")).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Engine(campo_engine::Error::PropertyNotFound(_))
    ));

    let visits: Vec<Visit> = h.store.read(VISITS).await.unwrap();
    assert!(visits.is_empty());
}

#[tokio::test]
async fn idempotent_resync() {
    let h = harness_with(
        vec![property("i-1", "q-1"), property("i-2", "q-1")],
        vec![block("q-1")],
    )
    .await;

    h.recorder.record_visit(draft("i-1")).await.unwrap();
    h.recorder
        .record_property_edit(
            "i-2",
            PropertyPatch {
                inhabitants: Some(4),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let first = h.reconciler.synchronize().await.unwrap();
    assert_eq!(first.visits_synced, 1);
    // the visited property plus the separately edited one
    assert_eq!(first.properties_synced, 2);
    assert!(first.is_clean());
    assert!(h.reconciler.pending_work().await.unwrap().is_clear());

    let calls = (h.remote.visit_calls(), h.remote.update_calls());
    let second = h.reconciler.synchronize().await.unwrap();
    assert_eq!(second.processed(), 0);
    assert_eq!((h.remote.visit_calls(), h.remote.update_calls()), calls);
}

#[tokio::test]
async fn partial_failure_isolation() {
    let h = harness_with(
        vec![property("i-1", "q-1"), property("i-2", "q-1")],
        vec![],
    )
    .await;

    let v1 = h.recorder.record_visit(draft("i-1")).await.unwrap();
    let v2 = h.recorder.record_visit(draft("i-2")).await.unwrap();

    h.remote.fail_visits_for("i-2");
    let report = h.reconciler.synchronize().await.unwrap();
    assert_eq!(report.visits_synced, 1);
    assert_eq!(report.visits_failed, 1);

    let stored: Vec<Visit> = h.store.read(VISITS).await.unwrap();
    let by_id = |id: &str| stored.iter().find(|v| v.id == id).unwrap();
    assert!(by_id(&v1.id).synced);
    assert!(!by_id(&v2.id).synced);

    // the next pass resends only the failed visit
    h.remote.clear_failures();
    let report = h.reconciler.synchronize().await.unwrap();
    assert_eq!(report.visits_synced, 1);
    assert_eq!(report.visits_failed, 0);

    let sent: Vec<String> = h
        .remote
        .received_visits()
        .iter()
        .map(|v| v.id.clone())
        .collect();
    assert_eq!(sent.iter().filter(|id| **id == v1.id).count(), 1);
    assert_eq!(sent.iter().filter(|id| **id == v2.id).count(), 1);
}

#[tokio::test]
async fn recorded_visits_survive_restart_before_sync() {
    let dir = TempDir::new().unwrap();

    {
        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        store
            .write(PROPERTIES, &[property("i-1", "q-1")])
            .await
            .unwrap();
        let recorder = MutationRecorder::new(store.clone());
        for _ in 0..3 {
            recorder.record_visit(draft("i-1")).await.unwrap();
        }
        // the process "crashes" here, before any synchronize call
    }

    let store = FileStore::open(dir.path()).unwrap();
    let visits: Vec<Visit> = store.read(VISITS).await.unwrap();
    assert_eq!(visits.len(), 3);
    assert!(visits.iter().all(|v| v.is_pending()));
}

#[tokio::test]
async fn offline_pass_leaves_everything_pending() {
    let h = harness_with(vec![property("i-1", "q-1")], vec![]).await;
    h.recorder.record_visit(draft("i-1")).await.unwrap();

    h.remote.set_offline(true);
    let report = h.reconciler.synchronize().await.unwrap();
    assert_eq!(report.visits_synced, 0);
    assert_eq!(report.visits_failed, 1);
    assert_eq!(report.properties_failed, 1);
    assert!(!report.is_clean());
    assert!(!h.reconciler.pending_work().await.unwrap().is_clear());
}

#[tokio::test]
async fn property_edit_syncs_and_clears_marker() {
    let h = harness_with(vec![property("i-1", "q-1")], vec![]).await;

    h.recorder
        .record_property_edit(
            "i-1",
            PropertyPatch {
                observation: Some("mudou de morador".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let report = h.reconciler.synchronize().await.unwrap();
    assert_eq!(report.properties_synced, 1);

    let stored: Vec<Property> = h.store.read(PROPERTIES).await.unwrap();
    assert!(!stored[0].edited_offline);
    assert_eq!(stored[0].observation, "mudou de morador");

    let updates = h.remote.received_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, "i-1");
    assert_eq!(updates[0].1.observation, "mudou de morador");
}

#[tokio::test]
async fn closure_blocked_until_pending_work_clears() {
    let h = harness_with(vec![property("i-1", "q-1")], vec![]).await;
    h.recorder.record_visit(draft("i-1")).await.unwrap();

    // the listing may still be consulted while work is pending
    h.remote.set_pending_closures(vec![summary("a-1")]);
    let engine = ClosureEngine::new(h.remote.clone());
    assert_eq!(engine.pending_areas("agent-7", 32).await.unwrap().len(), 1);

    // but the closure attempt itself is gated upstream
    let pending = h.reconciler.pending_work().await.unwrap();
    let err = closure::ensure_ready(&pending).unwrap_err();
    assert!(matches!(err, SyncError::ClosureBlocked(_)));
    assert!(err.to_string().contains("awaiting sync"));

    h.reconciler.synchronize().await.unwrap();
    let pending = h.reconciler.pending_work().await.unwrap();
    closure::ensure_ready(&pending).unwrap();

    let report = engine.close_areas("agent-7", 32, &["a-1".to_string()]).await;
    assert_eq!(report.succeeded, vec!["a-1".to_string()]);
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn close_areas_partitions_outcomes() {
    let remote = FakeRemote::new();
    remote.fail_close_for("a-2");
    let engine = ClosureEngine::new(remote.clone());

    let areas: Vec<String> = vec!["a-1".into(), "a-2".into(), "a-3".into()];
    let report = engine.close_areas("agent-7", 32, &areas).await;

    assert_eq!(report.succeeded, vec!["a-1".to_string(), "a-3".to_string()]);
    assert_eq!(report.failed, vec!["a-2".to_string()]);

    // every submission carried the fixed period-closure activity code
    assert!(remote
        .received_closures()
        .iter()
        .all(|c| c.activity == 4 && c.period == 32));
}

#[tokio::test]
async fn no_pending_closures_is_not_an_error() {
    let remote = FakeRemote::new();
    let engine = ClosureEngine::new(remote.clone());

    assert!(engine.pending_areas("agent-7", 32).await.unwrap().is_empty());

    remote.set_offline(true);
    let result = engine.pending_areas("agent-7", 32).await;
    assert!(matches!(
        result,
        Err(SyncError::Remote(RemoteError::Network(_)))
    ));
}

#[tokio::test]
async fn snapshot_falls_back_to_stored_copy() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let remote = FakeRemote::new();
    remote.serve(vec![block("q-1")], vec![property("i-1", "q-1")]);
    let loader = SnapshotLoader::new(remote.clone(), store.clone());

    let refresh = loader.refresh("agent-7").await.unwrap();
    assert_eq!(refresh.source, SnapshotSource::Remote);
    assert_eq!(refresh.snapshot.blocks.len(), 1);

    remote.set_offline(true);
    let refresh = loader.refresh("agent-7").await.unwrap();
    assert!(refresh.is_stale());
    assert_eq!(refresh.snapshot.blocks, vec![block("q-1")]);
    assert_eq!(refresh.snapshot.properties, vec![property("i-1", "q-1")]);
}

#[tokio::test]
async fn snapshot_empty_when_nothing_stored_and_offline() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let remote = FakeRemote::new();
    remote.set_offline(true);

    let loader = SnapshotLoader::new(remote, store);
    let refresh = loader.refresh("agent-7").await.unwrap();

    assert!(refresh.is_stale());
    assert!(refresh.snapshot.is_empty());
}

#[tokio::test]
async fn refresh_overwrites_unsynced_offline_edits() {
    // refresh-then-edit is the required protocol: an edit-then-refresh
    // session loses the pending edit, matching the original client
    let h = harness_with(vec![property("i-1", "q-1")], vec![block("q-1")]).await;
    h.recorder
        .record_property_edit(
            "i-1",
            PropertyPatch {
                inhabitants: Some(9),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    h.remote.serve(vec![block("q-1")], vec![property("i-1", "q-1")]);
    let loader = SnapshotLoader::new(h.remote.clone(), h.store.clone());
    loader.refresh("agent-7").await.unwrap();

    let stored: Vec<Property> = h.store.read(PROPERTIES).await.unwrap();
    assert!(!stored[0].edited_offline);
    assert_eq!(stored[0].inhabitants, property("i-1", "q-1").inhabitants);
}

#[tokio::test]
async fn finalize_blocks_flags_local_cache() {
    let h = harness_with(vec![], vec![block("q-1"), block("q-2")]).await;

    let result = h
        .reconciler
        .finalize_blocks(&["q-1".to_string(), "q-2".to_string()], "agent-7")
        .await
        .unwrap();
    assert!(result.is_complete());
    assert_eq!(result.updated, 2);

    let blocks: Vec<Block> = h.store.read(BLOCKS).await.unwrap();
    assert!(blocks.iter().all(|b| b.finalized));
}

#[tokio::test]
async fn finalize_blocks_short_count_leaves_local_flags() {
    let h = harness_with(vec![], vec![block("q-1"), block("q-2")]).await;
    h.remote.set_finalize_updated(1);

    let result = h
        .reconciler
        .finalize_blocks(&["q-1".to_string(), "q-2".to_string()], "agent-7")
        .await
        .unwrap();
    assert_eq!(result.requested, 2);
    assert_eq!(result.updated, 1);
    assert!(!result.is_complete());

    let blocks: Vec<Block> = h.store.read(BLOCKS).await.unwrap();
    assert!(blocks.iter().all(|b| !b.finalized));
}

#[tokio::test]
async fn visit_roundtrip_through_store() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    let visit = Visit {
        id: "v-1".into(),
        property_id: "i-1".into(),
        agent_id: "agent-7".into(),
        area_id: "a-1".into(),
        block_id: "q-1".into(),
        timestamp: 1754400000000,
        inspected_deposits: BTreeMap::from([("a1".to_string(), 2), ("b".to_string(), 1)]),
        inhabitants: 3,
        dogs: 1,
        cats: 0,
        samples_initial: 1,
        samples_final: 0,
        focus_count: 1,
        larvicide_grams: 0.0,
        treated_deposits: 0,
        synced: false,
    };

    store.write(VISITS, &[visit.clone()]).await.unwrap();
    let read: Vec<Visit> = store.read(VISITS).await.unwrap();

    assert_eq!(read, vec![visit]);
    assert_eq!(read[0].inspected_deposits.get("a1"), Some(&2));
    assert_eq!(read[0].inspected_deposits.get("b"), Some(&1));
}

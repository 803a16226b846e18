// ── ViewModel: snapshot ownership, refresh loop, change gating ──
//
// One ViewModel per session. The background refresh task writes the
// snapshot; the foreground explorer reads it when rebuilding. Both go
// through the same mutex, held for the whole "swap snapshot + rebuild
// tree + diff" critical section, so the reader never observes a torn
// update. The fetch itself always happens outside the lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rabbitscope_api::{ManagementClient, Topology, TopologyFilter};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::tree::{self, TreeNode};

/// State guarded by the ViewModel lock.
#[derive(Default)]
struct VmState {
    /// Latest good snapshot; `None` until the first successful fetch.
    topology: Option<Arc<Topology>>,
    /// Last tree handed to the renderer, used only for diffing. Updated
    /// by the change gate, not by every fetch, so repeated no-op polls
    /// never trigger redundant redraws.
    last_tree: Option<TreeNode>,
}

/// Owns the current topology snapshot, the periodic refresh loop, and
/// the update-notification channel consumed by the explorer.
pub struct ViewModel {
    client: ManagementClient,
    filter: TopologyFilter,
    state: Mutex<VmState>,
    updates: watch::Sender<u64>,
}

impl ViewModel {
    pub fn new(client: ManagementClient, filter: TopologyFilter) -> Self {
        let (updates, _) = watch::channel(0);
        Self {
            client,
            filter,
            state: Mutex::new(VmState::default()),
            updates,
        }
    }

    /// Subscribe to update notifications.
    ///
    /// The channel is a single-slot latest-value cell: signals coalesce
    /// while the consumer is busy, so a slow consumer still observes
    /// "at least one fetch completed since last drain" without unbounded
    /// buffering. Notifications carry no snapshot -- consumers must
    /// re-read the latest model state.
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.updates.subscribe()
    }

    /// Fetch a fresh snapshot, apply the session filter, and swap it in.
    ///
    /// On failure the error is returned, the current snapshot is left
    /// untouched, and no notification is emitted.
    pub async fn fetch_topology(&self) -> Result<(), CoreError> {
        let fetched = self.client.fetch_topology().await?;
        let topology = if self.filter.is_empty() {
            fetched
        } else {
            fetched.filter(&self.filter)
        };

        self.lock_state().topology = Some(Arc::new(topology));
        self.updates.send_modify(|generation| *generation += 1);
        Ok(())
    }

    /// Latest snapshot, if any fetch has succeeded yet.
    pub fn topology(&self) -> Option<Arc<Topology>> {
        self.lock_state().topology.clone()
    }

    /// Build the display tree for the current snapshot. A bare root
    /// before the first successful fetch.
    pub fn build_tree(&self) -> TreeNode {
        Self::tree_of(&self.lock_state())
    }

    /// Change gate for redraws.
    ///
    /// The first call after construction always reports a change. After
    /// that, a structurally identical tree reports `false` and leaves the
    /// stored tree untouched; any label or shape difference stores the
    /// new tree and reports `true`. Callers must skip rendering on
    /// `false`.
    pub fn has_changed(&self, new_tree: &TreeNode) -> bool {
        Self::gate(&mut self.lock_state(), new_tree)
    }

    /// Rebuild the tree from the latest snapshot and pass it through the
    /// change gate, all under one lock acquisition.
    ///
    /// Returns the new tree only when it differs from the last rendered
    /// one.
    pub fn rebuild_if_changed(&self) -> Option<TreeNode> {
        let mut state = self.lock_state();
        let new_tree = Self::tree_of(&state);
        Self::gate(&mut state, &new_tree).then_some(new_tree)
    }

    /// Run the periodic refresh loop until cancelled.
    ///
    /// Does nothing for a zero interval. Fetch errors are logged and
    /// swallowed -- a transient broker outage must not end the session.
    /// Cancellation is the only exit.
    pub async fn run_auto_refresh(&self, interval: Duration, cancel: CancellationToken) {
        if interval.is_zero() {
            return;
        }

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.fetch_topology().await {
                        warn!(error = %e, "periodic refresh failed");
                    }
                }
            }
        }
        debug!("auto-refresh stopped");
    }

    fn tree_of(state: &VmState) -> TreeNode {
        match state.topology.as_deref() {
            Some(topology) => tree::build_tree(topology),
            None => tree::build_tree(&Topology::default()),
        }
    }

    fn gate(state: &mut VmState, new_tree: &TreeNode) -> bool {
        if state
            .last_tree
            .as_ref()
            .is_some_and(|last| last.same_structure(new_tree))
        {
            return false;
        }
        state.last_tree = Some(new_tree.clone());
        true
    }

    fn lock_state(&self) -> MutexGuard<'_, VmState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use rabbitscope_api::TransportConfig;

    use super::*;
    use crate::tree::build_tree;

    fn offline_view_model() -> ViewModel {
        let client =
            ManagementClient::new("http://localhost:15672", &TransportConfig::default()).unwrap();
        ViewModel::new(client, TopologyFilter::default())
    }

    async fn mount_topology(server: &MockServer, exchanges: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/api/exchanges"))
            .respond_with(ResponseTemplate::new(200).set_body_json(exchanges))
            .mount(server)
            .await;
        for endpoint in ["queues", "bindings", "consumers"] {
            Mock::given(method("GET"))
                .and(path(format!("/api/{endpoint}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
                .mount(server)
                .await;
        }
    }

    async fn connected_view_model(server: &MockServer) -> ViewModel {
        let client = ManagementClient::new(&server.uri(), &TransportConfig::default()).unwrap();
        ViewModel::new(client, TopologyFilter::default())
    }

    #[test]
    fn change_gate_first_same_different() {
        let vm = offline_view_model();

        let empty = build_tree(&Topology::default());
        assert!(vm.has_changed(&empty), "first call must report a change");
        assert!(!vm.has_changed(&empty), "identical tree is a no-op");

        let mut grown = empty;
        grown.children.push(build_tree(&Topology::default()));
        assert!(vm.has_changed(&grown), "shape change must report");
    }

    #[tokio::test]
    async fn successful_fetch_swaps_snapshot_and_signals() {
        let server = MockServer::start().await;
        mount_topology(
            &server,
            json!([{ "name": "ex1", "type": "direct", "vhost": "vh1" }]),
        )
        .await;

        let vm = connected_view_model(&server).await;
        let mut updates = vm.updates();
        assert!(!updates.has_changed().unwrap());

        vm.fetch_topology().await.unwrap();

        assert!(updates.has_changed().unwrap());
        let topology = vm.topology().expect("snapshot present after fetch");
        assert_eq!(topology.exchanges[0].name, "ex1");
    }

    #[tokio::test]
    async fn failed_fetch_keeps_snapshot_and_stays_silent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/exchanges"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let vm = connected_view_model(&server).await;
        let mut updates = vm.updates();

        assert!(vm.fetch_topology().await.is_err());
        assert!(vm.topology().is_none());
        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test]
    async fn identical_refetch_does_not_pass_the_gate() {
        let server = MockServer::start().await;
        mount_topology(
            &server,
            json!([{ "name": "ex1", "type": "direct", "vhost": "vh1" }]),
        )
        .await;

        let vm = connected_view_model(&server).await;

        vm.fetch_topology().await.unwrap();
        assert!(vm.rebuild_if_changed().is_some(), "first rebuild renders");

        // Same broker content again: notification fires, gate holds.
        vm.fetch_topology().await.unwrap();
        assert!(vm.rebuild_if_changed().is_none(), "no-op poll must not redraw");
    }

    #[tokio::test]
    async fn notifications_coalesce_for_slow_consumers() {
        let server = MockServer::start().await;
        mount_topology(&server, json!([])).await;

        let vm = connected_view_model(&server).await;
        let mut updates = vm.updates();

        vm.fetch_topology().await.unwrap();
        vm.fetch_topology().await.unwrap();
        vm.fetch_topology().await.unwrap();

        // Three fetches, one pending observation.
        updates.changed().await.unwrap();
        assert_eq!(*updates.borrow_and_update(), 3);
        assert!(!updates.has_changed().unwrap());
    }

    #[tokio::test]
    async fn session_filter_is_applied_on_fetch() {
        let server = MockServer::start().await;
        mount_topology(
            &server,
            json!([
                { "name": "ex1", "type": "direct", "vhost": "vh1" },
                { "name": "ex2", "type": "fanout", "vhost": "other" }
            ]),
        )
        .await;

        let client = ManagementClient::new(&server.uri(), &TransportConfig::default()).unwrap();
        let vm = ViewModel::new(
            client,
            TopologyFilter {
                vhost: Some("vh1".into()),
                exchange: None,
            },
        );

        vm.fetch_topology().await.unwrap();
        let topology = vm.topology().unwrap();
        assert_eq!(topology.exchanges.len(), 1);
        assert_eq!(topology.exchanges[0].vhost, "vh1");
    }

    #[tokio::test]
    async fn cancellation_stops_the_refresh_loop() {
        let server = MockServer::start().await;
        mount_topology(&server, json!([])).await;

        let vm = Arc::new(connected_view_model(&server).await);
        let cancel = CancellationToken::new();

        let loop_vm = Arc::clone(&vm);
        let loop_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            loop_vm
                .run_auto_refresh(Duration::from_millis(10), loop_cancel)
                .await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        // The loop must exit within roughly one tick interval.
        tokio::time::timeout(Duration::from_millis(100), handle)
            .await
            .expect("refresh loop did not stop after cancellation")
            .unwrap();

        let fetches_at_cancel = request_count(&server, "/api/exchanges").await;
        assert!(fetches_at_cancel >= 1, "loop should have polled at least once");

        // No further fetch attempts after cancellation.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(request_count(&server, "/api/exchanges").await, fetches_at_cancel);
    }

    #[tokio::test]
    async fn refresh_loop_survives_fetch_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/exchanges"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let vm = Arc::new(connected_view_model(&server).await);
        let cancel = CancellationToken::new();

        let loop_vm = Arc::clone(&vm);
        let loop_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            loop_vm
                .run_auto_refresh(Duration::from_millis(10), loop_cancel)
                .await;
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        cancel.cancel();
        handle.await.unwrap();

        // Multiple failed ticks, loop kept running until cancelled.
        assert!(request_count(&server, "/api/exchanges").await >= 2);
    }

    async fn request_count(server: &MockServer, for_path: &str) -> usize {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|req| req.url.path() == for_path)
            .count()
    }
}

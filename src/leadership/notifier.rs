use crossbeam_channel::Receiver;
use parking_lot::RwLock;
use std::sync::Arc;

/// Leadership change callback. `true` - the node became the leader, `false` - it stepped down.
pub type LeadershipCallback = Arc<dyn Fn(bool) + Send + Sync + 'static>;

/// Shared registration point for the callback. Replaced at any time by the manager.
pub type LeadershipCallbackSlot = Arc<RwLock<Option<LeadershipCallback>>>;

pub struct LeadershipNotifierParams {
    pub node_address: String,
    pub leadership_event_rx: Receiver<bool>,
    pub callback: LeadershipCallbackSlot,
}

/// Delivers leadership edges to the registered callback in transition order. Runs apart from
/// the election worker, so the callback may query the manager.
pub fn run_leadership_notifier(params: LeadershipNotifierParams, terminate_worker_rx: Receiver<()>) {
    info!(
        "Node {} Leadership notifier worker started",
        params.node_address
    );
    loop {
        select!(
            recv(terminate_worker_rx) -> res  => {
                if res.is_err() {
                    error!("Abnormal exit for leadership notifier worker");
                }
                break
            },
            recv(params.leadership_event_rx) -> event_result => {
                match event_result {
                    Ok(is_leader) => notify(&params, is_leader),
                    Err(err) => {
                        error!("Invalid result from leadership_event_rx: {}", err);
                        break
                    }
                }
            }
        );
    }
    info!(
        "Node {} Leadership notifier worker stopped",
        params.node_address
    );
}

fn notify(params: &LeadershipNotifierParams, is_leader: bool) {
    let callback = params.callback.read().clone();

    match callback {
        Some(callback) => {
            debug!(
                "Node {} Notifying leadership change: is_leader={}",
                params.node_address, is_leader
            );
            callback(is_leader);
        }
        None => trace!(
            "Node {} Leadership changed (is_leader={}), no callback registered",
            params.node_address,
            is_leader
        ),
    }
}

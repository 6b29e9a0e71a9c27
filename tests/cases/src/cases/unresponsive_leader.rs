use crate::steps;

pub fn run() {
    let node_ids = steps::node_addresses(3);

    let peer_communicator = steps::get_slow_peer_communicator(node_ids.clone());
    assert!(steps::get_slow_peers_communication_timeout() > steps::get_election_config().heartbeat_interval());

    let mut cluster = steps::cluster::start_initial_cluster(
        node_ids.clone(),
        node_ids.clone(),
        peer_communicator,
        steps::create_node_inproc,
    );

    steps::sleep(2);

    let old_leader = cluster.find_a_leader();

    // every request to the old leader now hangs until the timeout
    cluster.crash_node(&old_leader);

    steps::sleep(2);

    let survivors: Vec<String> = node_ids
        .iter()
        .filter(|address| **address != old_leader)
        .cloned()
        .collect();
    let new_leader = cluster.find_a_leader_among(&survivors);
    assert_ne!(old_leader, new_leader);
    let new_term = cluster
        .manager(&new_leader)
        .current_term()
        .expect("can get term");

    // heartbeats to the live follower are not held up by the silent node
    for _ in 0..3 {
        steps::sleep(1);

        assert_eq!(new_leader, cluster.find_a_leader_among(&survivors));
        cluster.assert_leader_is_known(&new_leader, &survivors);
        for address in &survivors {
            assert_eq!(Ok(new_term), cluster.manager(address).current_term());
        }
    }

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_unresponsive_leader() {
        crate::cases::unresponsive_leader::run()
    }
}

use crate::steps;

pub fn run() {
    let node_ids = steps::node_addresses(3);

    let peer_communicator = steps::get_peer_communicator(node_ids.clone());
    let mut cluster = steps::cluster::start_initial_cluster(
        node_ids.clone(),
        node_ids.clone(),
        peer_communicator,
        steps::create_node_inproc,
    );

    steps::sleep(2);

    let old_leader = cluster.find_a_leader();
    let old_term = cluster
        .manager(&old_leader)
        .current_term()
        .expect("can get term");

    cluster.kill_node(&old_leader);

    steps::sleep(2);

    // the remaining two nodes still form a quorum
    let survivors: Vec<String> = node_ids
        .iter()
        .filter(|address| **address != old_leader)
        .cloned()
        .collect();
    let new_leader = cluster.find_a_leader_among(&survivors);
    assert_ne!(old_leader, new_leader);
    cluster.assert_leader_is_known(&new_leader, &survivors);

    let new_term = cluster
        .manager(&new_leader)
        .current_term()
        .expect("can get term");
    assert!(new_term > old_term);

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_leader_failover() {
        crate::cases::leader_failover::run()
    }
}

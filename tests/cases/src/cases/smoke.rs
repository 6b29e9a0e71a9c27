use crate::steps;

pub fn run() {
    let node_ids = steps::node_addresses(3);

    let peer_communicator = steps::get_peer_communicator(node_ids.clone());
    let cluster = steps::cluster::start_initial_cluster(
        node_ids.clone(),
        node_ids.clone(),
        peer_communicator,
        steps::create_node_inproc,
    );

    steps::sleep(2);

    //find elected leader
    let leader = cluster.find_a_leader();
    cluster.assert_leader_is_known(&leader, &node_ids);

    let leader_term = cluster
        .manager(&leader)
        .current_term()
        .expect("can get term");
    for address in &node_ids {
        assert_eq!(Ok(leader_term), cluster.manager(address).current_term());
    }

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_smoke() {
        crate::cases::smoke::run()
    }
}

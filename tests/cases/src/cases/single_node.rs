use crate::steps;

pub fn run() {
    let node_ids = steps::node_addresses(1);

    let peer_communicator = steps::get_peer_communicator(node_ids.clone());
    let cluster = steps::cluster::start_initial_cluster(
        node_ids.clone(),
        node_ids.clone(),
        peer_communicator,
        steps::create_node_inproc,
    );

    // no peers: the node elects itself on start
    let leader = cluster.find_a_leader();
    assert_eq!(node_ids[0], leader);
    assert_eq!(Ok(1), cluster.manager(&leader).current_term());

    steps::sleep(1);

    // nothing to contest the leadership
    assert_eq!(Ok(1), cluster.manager(&leader).current_term());
    cluster.assert_leader_is_known(&leader, &node_ids);

    cluster.terminate();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_single_node() {
        crate::cases::single_node::run()
    }
}

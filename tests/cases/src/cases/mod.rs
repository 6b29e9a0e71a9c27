pub mod leader_failover;
pub mod no_quorum;
pub mod partition;
pub mod restart;
pub mod single_node;
pub mod smoke;
pub mod unresponsive_leader;

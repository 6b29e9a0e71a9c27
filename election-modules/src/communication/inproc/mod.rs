pub mod inproc_peer_communicator;
pub mod request_processor;

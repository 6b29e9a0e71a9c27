#[macro_use]
extern crate log;
#[macro_use]
extern crate crossbeam_channel;
extern crate election;

mod communication;
mod election_timer;
mod node;

pub use communication::duplex_channel::{DuplexChannel, RequestEnvelope};
pub use communication::inproc::inproc_peer_communicator::InProcPeerCommunicator;
pub use communication::inproc::request_processor::{
    run_peer_request_processor, PeerRequestProcessorParams,
};
pub use election_timer::FixedElectionTimer;
pub use node::{MemoryNodeStateSaver, MockNodeStateSaver};

use std::error::Error;

/// Errors of the leader election subsystem.
#[derive(Clone, Debug, Eq, PartialEq, Display)]
pub enum ElectionError {
    /// Invalid tunables or membership. Fatal: such a node can never converge.
    #[display(fmt = "Invalid election configuration: {}", _0)]
    Configuration(String),

    /// Peer did not answer. Counted as "no response", never propagated to the state machine.
    #[display(fmt = "Peer communication failed. Peer: {} Cause: {}", peer, cause)]
    Communication { peer: String, cause: String },

    /// Election worker thread does not accept requests anymore.
    #[display(fmt = "Election worker is unavailable: {}", _0)]
    WorkerUnavailable(String),
}

impl Error for ElectionError {}

pub type Result<T> = std::result::Result<T, ElectionError>;

pub fn configuration_err<T>(text: String) -> Result<T> {
    Err(ElectionError::Configuration(text))
}

pub fn communication_err<T>(peer: &str, cause: String) -> Result<T> {
    Err(ElectionError::Communication {
        peer: peer.to_string(),
        cause,
    })
}

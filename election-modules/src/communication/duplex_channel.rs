use crossbeam_channel::{Receiver, Sender};

use std::time::Duration;

use election::{communication_err, Result};

/// Request paired with the channel for its response. Concurrent callers of the same
/// DuplexChannel never receive each other's responses.
#[derive(Debug)]
pub struct RequestEnvelope<Request, Response> {
    pub request: Request,
    pub response_tx: Sender<Response>,
}

impl<Request, Response> RequestEnvelope<Request, Response> {
    /// Sends the response back to the caller. The caller may have timed out already.
    pub fn respond(self, response: Response) {
        if self.response_tx.send(response).is_err() {
            trace!("Response dropped: the caller stopped waiting");
        }
    }
}

/// Create abstraction for the dual-end communication via channels.
#[derive(Clone, Debug)]
pub struct DuplexChannel<Request, Response> {
    name: String,
    timeout_duration: Duration,

    request_tx: Sender<RequestEnvelope<Request, Response>>,
    request_rx: Receiver<RequestEnvelope<Request, Response>>,
}

impl<Request, Response> DuplexChannel<Request, Response>
where
    Request: Send + 'static,
    Response: Send + 'static,
{
    /// Creates new DuplexChannel with the name and communication timeout on recv's and send's.
    pub fn new(name: String, timeout_duration: Duration) -> DuplexChannel<Request, Response> {
        let (request_tx, request_rx) = crossbeam_channel::bounded(0);

        DuplexChannel {
            name,
            timeout_duration,
            request_tx,
            request_rx,
        }
    }

    /// Returns the receiver channel for the request.
    pub fn request_rx(&self) -> Receiver<RequestEnvelope<Request, Response>> {
        self.request_rx.clone()
    }

    /// Sends request and gets response via channels. `destination` names the peer in errors.
    pub fn send_request(&self, destination: &str, request: Request) -> Result<Response> {
        let (response_tx, response_rx) = crossbeam_channel::bounded(1);
        let envelope = RequestEnvelope {
            request,
            response_tx,
        };

        if let Err(err) = self.request_tx.send_timeout(envelope, self.timeout_duration) {
            return communication_err(
                destination,
                format!("Cannot send request. Channel: {}. {}", self.name, err),
            );
        }

        match response_rx.recv_timeout(self.timeout_duration) {
            Ok(response) => Ok(response),
            Err(err) => communication_err(
                destination,
                format!("Cannot receive response. Channel: {}. {}", self.name, err),
            ),
        }
    }
}

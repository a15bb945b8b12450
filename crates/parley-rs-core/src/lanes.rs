//! Per-user request lanes.
//!
//! Requests from one user are handled strictly in arrival order by a single
//! worker task; different users run concurrently.

use crate::error::CoreError;
use crate::orchestrator::{Orchestrator, Reply};
use log::debug;
use parking_lot::Mutex;
use parley_rs_protocol::{InboundMessage, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

type Job = (InboundMessage, oneshot::Sender<Reply>);

/// Pending reply for an enqueued message.
pub struct ReplyHandle {
    user_id: UserId,
    receiver: oneshot::Receiver<Reply>,
}

impl ReplyHandle {
    /// Wait for the lane worker to finish the request.
    pub async fn wait(self) -> Result<Reply, CoreError> {
        self.receiver
            .await
            .map_err(|_| CoreError::LaneClosed(self.user_id))
    }
}

/// Serializes requests per user in front of an [`Orchestrator`].
pub struct UserLanes {
    orchestrator: Arc<Orchestrator>,
    lanes: Mutex<HashMap<UserId, mpsc::UnboundedSender<Job>>>,
}

impl UserLanes {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            lanes: Mutex::new(HashMap::new()),
        }
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    /// Number of user lanes started so far.
    pub fn lane_count(&self) -> usize {
        self.lanes.lock().len()
    }

    /// Queue `message` on its user's lane. Messages enqueued earlier for the
    /// same user finish first. Must be called inside a tokio runtime.
    pub fn enqueue(&self, message: InboundMessage) -> ReplyHandle {
        let user_id = message.user_id.clone();
        let (reply_tx, reply_rx) = oneshot::channel();
        let mut job = (message, reply_tx);

        let mut lanes = self.lanes.lock();
        if let Some(sender) = lanes.get(&user_id) {
            match sender.send(job) {
                Ok(()) => {
                    return ReplyHandle {
                        user_id,
                        receiver: reply_rx,
                    };
                }
                Err(mpsc::error::SendError(returned)) => {
                    debug!("lane worker gone; restarting (user_id={})", user_id);
                    job = returned;
                }
            }
        }
        let sender = self.spawn_lane(&user_id);
        // A fresh receiver is alive, so this send cannot fail.
        let _ = sender.send(job);
        lanes.insert(user_id.clone(), sender);
        ReplyHandle {
            user_id,
            receiver: reply_rx,
        }
    }

    /// Enqueue and wait for the reply.
    pub async fn submit(&self, message: InboundMessage) -> Result<Reply, CoreError> {
        self.enqueue(message).wait().await
    }

    fn spawn_lane(&self, user_id: &str) -> mpsc::UnboundedSender<Job> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let orchestrator = self.orchestrator.clone();
        let user_id = user_id.to_string();
        debug!("starting lane (user_id={})", user_id);
        tokio::spawn(async move {
            while let Some((message, reply_tx)) = receiver.recv().await {
                let reply = orchestrator.handle(message).await;
                if reply_tx.send(reply).is_err() {
                    debug!("reply receiver dropped (user_id={})", user_id);
                }
            }
            debug!("lane closed (user_id={})", user_id);
        });
        sender
    }
}

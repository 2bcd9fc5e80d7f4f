//! Turn-based chat session: transcript, draft and the in-flight guard.

use std::sync::Arc;

use shared::domain::Turn;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{config::ChatSettings, error::TransportError, transport::Transport};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Awaiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InFlight,
    EmptyDraft,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Rejected(RejectReason),
    Replied,
    Failed(TransportError),
}

impl SubmitOutcome {
    pub fn was_accepted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Change notifications for views that redraw on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TurnAppended(Turn),
    InFlightChanged(bool),
    DraftChanged,
}

/// Point-in-time copy of the session for rendering.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub transcript: Arc<Vec<Turn>>,
    pub draft: String,
    pub in_flight: bool,
}

impl SessionSnapshot {
    pub fn phase(&self) -> Phase {
        if self.in_flight {
            Phase::Awaiting
        } else {
            Phase::Idle
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.in_flight && !self.draft.trim().is_empty()
    }

    pub fn show_typing_indicator(&self) -> bool {
        self.in_flight
    }
}

struct SessionState {
    // Replaced wholesale on append; snapshots keep the list they were handed.
    transcript: Arc<Vec<Turn>>,
    draft: String,
    in_flight: bool,
}

impl SessionState {
    fn append(&mut self, turn: Turn) {
        Arc::make_mut(&mut self.transcript).push(turn);
    }
}

/// State shared between the controller and the task that waits on the transport.
struct Session {
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
    error_text: String,
}

impl Session {
    async fn complete(&self, result: Result<String, TransportError>) -> SubmitOutcome {
        let mut guard = self.inner.lock().await;
        let (turn, outcome) = match result {
            Ok(reply) => {
                info!(len = reply.len(), "chat reply received");
                (Turn::bot(reply), SubmitOutcome::Replied)
            }
            Err(err) => {
                warn!(error = %err, "chat request failed");
                (Turn::error(self.error_text.clone()), SubmitOutcome::Failed(err))
            }
        };
        guard.append(turn.clone());
        guard.in_flight = false;
        drop(guard);

        let _ = self.events.send(SessionEvent::TurnAppended(turn));
        let _ = self.events.send(SessionEvent::InFlightChanged(false));
        outcome
    }
}

pub struct ChatController<T: Transport> {
    transport: Arc<T>,
    session: Arc<Session>,
}

impl<T: Transport + 'static> ChatController<T> {
    pub fn new(transport: T, greeting: impl Into<String>, error_text: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            transport: Arc::new(transport),
            session: Arc::new(Session {
                inner: Mutex::new(SessionState {
                    transcript: Arc::new(vec![Turn::greeting(greeting)]),
                    draft: String::new(),
                    in_flight: false,
                }),
                events,
                error_text: error_text.into(),
            }),
        }
    }

    pub fn from_settings(transport: T, settings: &ChatSettings) -> Self {
        Self::new(
            transport,
            settings.greeting.clone(),
            settings.error_text.clone(),
        )
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.events.subscribe()
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        self.session.inner.lock().await.draft = text.into();
        let _ = self.session.events.send(SessionEvent::DraftChanged);
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let guard = self.session.inner.lock().await;
        SessionSnapshot {
            transcript: Arc::clone(&guard.transcript),
            draft: guard.draft.clone(),
            in_flight: guard.in_flight,
        }
    }

    /// Sends the current draft and appends the bot's answer once it arrives.
    ///
    /// A no-op while another submission is pending or when the draft is blank.
    /// The message goes out exactly as typed; only the emptiness check trims.
    /// Once accepted, the request runs on its own task: dropping the returned
    /// future does not stop the bot turn from being appended.
    pub async fn submit(&self) -> SubmitOutcome {
        let message = {
            let mut guard = self.session.inner.lock().await;
            if guard.in_flight {
                debug!("submit rejected: request already in flight");
                return SubmitOutcome::Rejected(RejectReason::InFlight);
            }
            if guard.draft.trim().is_empty() {
                debug!("submit rejected: draft is blank");
                return SubmitOutcome::Rejected(RejectReason::EmptyDraft);
            }

            let message = std::mem::take(&mut guard.draft);
            let turn = Turn::user(message.clone());
            guard.append(turn.clone());
            guard.in_flight = true;

            let events = &self.session.events;
            let _ = events.send(SessionEvent::TurnAppended(turn));
            let _ = events.send(SessionEvent::DraftChanged);
            let _ = events.send(SessionEvent::InFlightChanged(true));
            message
        };

        debug!(len = message.len(), "submit accepted");
        let transport = Arc::clone(&self.transport);
        let session = Arc::clone(&self.session);
        let request = tokio::spawn(async move {
            let result = transport.send(&message).await;
            session.complete(result).await
        });

        match request.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "chat request task ended abnormally");
                self.session
                    .complete(Err(TransportError::Interrupted))
                    .await
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

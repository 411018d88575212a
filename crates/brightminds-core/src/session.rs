use crate::error::{AssistantError, FailureKind};
use crate::gateway::{CompletionGateway, Message};
use crate::prompt;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Append-only, ordered record of the turns in one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    transcript: Transcript,
    pending: bool,
    last_error: Option<String>,
}

/// Point-in-time copy of the session, for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub transcript: Transcript,
    pub pending: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Text was empty or whitespace only.
    Empty,
    /// Another request is still outstanding.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(RejectReason),
    Replied(Message),
    Failed { kind: FailureKind, message: Message },
}

/// Events published while a submission moves through `Sending` and back to idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Pending,
    Settled {
        message: Message,
        failure: Option<FailureKind>,
    },
}

/// One visitor conversation: transcript plus the one-request-in-flight guard.
///
/// The state lock is never held across the gateway call, so the UI can keep
/// reading snapshots while a request is outstanding.
pub struct ChatSession {
    gateway: Arc<dyn CompletionGateway>,
    state: Arc<Mutex<SessionState>>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl ChatSession {
    pub fn new(gateway: Arc<dyn CompletionGateway>) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(SessionState::default())),
            events: None,
        }
    }

    pub fn with_events(mut self, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    /// Submit a visitor message and wait for the assistant turn.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let (history, text) = match self.begin(text) {
            Ok(turn) => turn,
            Err(reason) => return SubmitOutcome::Rejected(reason),
        };

        let mut in_flight = InFlight {
            state: &self.state,
            events: self.events.as_ref(),
            armed: true,
        };
        let result = self.gateway.complete(&history, &text).await;
        in_flight.armed = false;
        settle(&self.state, self.events.as_ref(), result)
    }

    /// Submit without waiting. The guard and the user turn are applied
    /// immediately; the reply is appended by a background task if the session
    /// still exists when it arrives, and silently discarded otherwise.
    pub fn spawn_submit(&self, text: &str) -> Result<JoinHandle<()>, RejectReason> {
        let (history, text) = self.begin(text)?;

        let gateway = Arc::clone(&self.gateway);
        let state: Weak<Mutex<SessionState>> = Arc::downgrade(&self.state);
        let events = self.events.clone();

        Ok(tokio::spawn(async move {
            let result = gateway.complete(&history, &text).await;
            match state.upgrade() {
                Some(state) => {
                    settle(&state, events.as_ref(), result);
                }
                None => tracing::debug!("session closed before reply arrived; discarding"),
            }
        }))
    }

    pub fn transcript(&self) -> Transcript {
        self.lock().transcript.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            transcript: state.transcript.clone(),
            pending: state.pending,
            last_error: state.last_error.clone(),
        }
    }

    /// Apply the submit guard and record the user turn. Returns the prior
    /// turns and the trimmed text to send.
    fn begin(&self, text: &str) -> Result<(Vec<Message>, String), RejectReason> {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("ignoring empty submission");
            return Err(RejectReason::Empty);
        }

        let history = {
            let mut state = self.lock();
            if state.pending {
                tracing::debug!("ignoring submission while a reply is pending");
                return Err(RejectReason::Pending);
            }
            let history = state.transcript.messages().to_vec();
            state.transcript.push(Message::user(text));
            state.pending = true;
            state.last_error = None;
            history
        };

        if let Some(tx) = &self.events {
            let _ = tx.send(SessionEvent::Pending);
        }
        Ok((history, text.to_string()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Settles an awaited submission whose future was dropped before the reply
/// arrived, so the session never stays pending.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
    events: Option<&'a mpsc::UnboundedSender<SessionEvent>>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("submission dropped before the reply arrived");
            settle(self.state, self.events, Err(AssistantError::Cancelled));
        }
    }
}

/// Turn the gateway result into exactly one assistant message and clear `pending`.
fn settle(
    state: &Mutex<SessionState>,
    events: Option<&mpsc::UnboundedSender<SessionEvent>>,
    result: Result<String, AssistantError>,
) -> SubmitOutcome {
    let (message, failure, error_text) = match result {
        Ok(raw) => (
            Message::assistant(prompt::finalize_reply(Some(&raw))),
            None,
            None,
        ),
        Err(e) => {
            let kind = e.kind();
            tracing::warn!(%kind, error = %e, "completion failed");
            (
                Message::assistant(kind.fallback_message()),
                Some(kind),
                Some(e.to_string()),
            )
        }
    };

    {
        let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
        state.transcript.push(message.clone());
        state.pending = false;
        state.last_error = error_text;
    }

    if let Some(tx) = events {
        let _ = tx.send(SessionEvent::Settled {
            message: message.clone(),
            failure,
        });
    }

    match failure {
        Some(kind) => SubmitOutcome::Failed { kind, message },
        None => SubmitOutcome::Replied(message),
    }
}

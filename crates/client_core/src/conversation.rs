//! Conversation session controller: message history, request sequencing and
//! failure surfacing for a single scenario chat.
//!
//! ```text
//! Created --initialize--> AwaitingStart --reply/failure--> Idle
//! Idle --submit(non-empty)--> AwaitingReply --reply/failure--> Idle
//! ```
//!
//! Submissions that arrive while a call is outstanding, or that carry only
//! whitespace, are dropped without touching the history. A call whose future
//! is dropped before the service answers returns the conversation to `Idle`.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::domain::{Message, MessageId, Scenario, Sender};
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::{error::ClientError, service::ScenarioChatService};

pub const START_FAILURE_NOTICE: &str =
    "⚠️ Error: Could not connect to PhishGuard Server.\nCheck the configured server URL!";
pub const SEND_FAILURE_NOTICE: &str = "Error: Message failed to send. Is the backend running?";

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    AwaitingStart,
    Idle,
    AwaitingReply,
}

impl Phase {
    pub fn is_pending(self) -> bool {
        matches!(self, Phase::AwaitingStart | Phase::AwaitingReply)
    }
}

#[derive(Debug, Clone)]
pub struct ConversationState {
    scenario: Scenario,
    messages: Vec<Message>,
    phase: Phase,
    draft: String,
    next_id: u64,
}

impl ConversationState {
    pub(crate) fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            messages: Vec::new(),
            phase: Phase::Created,
            draft: String::new(),
            next_id: 1,
        }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase.is_pending()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    fn append(&mut self, sender: Sender, text: impl Into<String>) -> Message {
        let message = Message {
            id: MessageId(self.next_id),
            text: text.into(),
            sender,
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    MessageAppended(Message),
    PendingChanged(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializeOutcome {
    Started,
    Failed,
    AlreadyStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyInput,
    Pending,
    NotStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Replied,
    Failed,
    Rejected(RejectReason),
}

pub struct ConversationController {
    service: Arc<dyn ScenarioChatService>,
    state: Mutex<ConversationState>,
    /// Set when an abandoned call could not reset the phase itself.
    abandoned: AtomicBool,
    events: broadcast::Sender<ConversationEvent>,
}

impl ConversationController {
    pub fn new(
        scenario: Scenario,
        service: Arc<dyn ScenarioChatService>,
    ) -> Result<Self, ClientError> {
        if !scenario.is_available() {
            return Err(ClientError::ScenarioUnavailable(scenario));
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            service,
            state: Mutex::new(ConversationState::new(scenario)),
            abandoned: AtomicBool::new(false),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ConversationEvent> {
        self.events.subscribe()
    }

    /// Fetches the opening message. Only the first call talks to the service.
    pub async fn initialize(&self) -> InitializeOutcome {
        let scenario = {
            let mut state = self.lock_state().await;
            if state.phase != Phase::Created {
                debug!(phase = ?state.phase, "conversation already initialized");
                return InitializeOutcome::AlreadyStarted;
            }
            self.set_phase(&mut state, Phase::AwaitingStart);
            state.scenario
        };
        let guard = PendingGuard::new(self);

        let result = self.service.start(scenario).await;

        let mut state = self.lock_state().await;
        guard.disarm();
        let outcome = match result {
            Ok(reply) => {
                info!(%scenario, "conversation started");
                self.append(&mut state, Sender::Bot, reply);
                InitializeOutcome::Started
            }
            Err(error) => {
                warn!(%scenario, %error, "failed to start conversation");
                self.append(&mut state, Sender::System, START_FAILURE_NOTICE);
                InitializeOutcome::Failed
            }
        };
        self.set_phase(&mut state, Phase::Idle);
        outcome
    }

    /// Appends `text` as a user message and forwards it to the service.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let scenario = {
            let mut state = self.lock_state().await;
            if let Some(reason) = rejection(&state, text) {
                debug!(?reason, "submission rejected");
                return SubmitOutcome::Rejected(reason);
            }
            self.append(&mut state, Sender::User, text);
            state.draft.clear();
            self.set_phase(&mut state, Phase::AwaitingReply);
            state.scenario
        };
        let guard = PendingGuard::new(self);

        let result = self.service.send(scenario, text).await;

        let mut state = self.lock_state().await;
        guard.disarm();
        let outcome = match result {
            Ok(reply) => {
                info!(%scenario, "received reply");
                self.append(&mut state, Sender::Bot, reply);
                SubmitOutcome::Replied
            }
            Err(error) => {
                warn!(%scenario, %error, "failed to send message");
                self.append(&mut state, Sender::System, SEND_FAILURE_NOTICE);
                SubmitOutcome::Failed
            }
        };
        self.set_phase(&mut state, Phase::Idle);
        outcome
    }

    /// Submits the current draft. The draft is kept when the submission is rejected.
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let draft = self.lock_state().await.draft.clone();
        self.submit(&draft).await
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        self.lock_state().await.draft = text.into();
    }

    pub async fn draft(&self) -> String {
        self.lock_state().await.draft.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.lock_state().await.messages.clone()
    }

    pub async fn is_pending(&self) -> bool {
        self.lock_state().await.is_pending()
    }

    pub async fn phase(&self) -> Phase {
        self.lock_state().await.phase
    }

    pub async fn scenario(&self) -> Scenario {
        self.lock_state().await.scenario
    }

    pub async fn snapshot(&self) -> ConversationState {
        self.lock_state().await.clone()
    }

    async fn lock_state(&self) -> MutexGuard<'_, ConversationState> {
        let mut state = self.state.lock().await;
        if self.abandoned.swap(false, Ordering::SeqCst) {
            self.settle_abandoned(&mut state);
        }
        state
    }

    fn settle_abandoned(&self, state: &mut ConversationState) {
        if state.is_pending() {
            debug!(phase = ?state.phase, "service call abandoned before completion");
            self.set_phase(state, Phase::Idle);
        }
    }

    fn append(&self, state: &mut ConversationState, sender: Sender, text: impl Into<String>) {
        let message = state.append(sender, text);
        let _ = self.events.send(ConversationEvent::MessageAppended(message));
    }

    fn set_phase(&self, state: &mut ConversationState, phase: Phase) {
        let was_pending = state.is_pending();
        state.phase = phase;
        if was_pending != phase.is_pending() {
            let _ = self
                .events
                .send(ConversationEvent::PendingChanged(phase.is_pending()));
        }
    }
}

/// Returns the conversation to `Idle` if the owning call is dropped mid-flight.
struct PendingGuard<'a> {
    controller: &'a ConversationController,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn new(controller: &'a ConversationController) -> Self {
        Self {
            controller,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.controller.state.try_lock() {
            Ok(mut state) => self.controller.settle_abandoned(&mut state),
            // Picked up by the next `lock_state`.
            Err(_) => self.controller.abandoned.store(true, Ordering::SeqCst),
        }
    }
}

fn rejection(state: &ConversationState, text: &str) -> Option<RejectReason> {
    if text.trim().is_empty() {
        return Some(RejectReason::EmptyInput);
    }
    match state.phase {
        Phase::Created => Some(RejectReason::NotStarted),
        Phase::AwaitingStart | Phase::AwaitingReply => Some(RejectReason::Pending),
        Phase::Idle => None,
    }
}

#[cfg(test)]
#[path = "tests/conversation_tests.rs"]
mod tests;

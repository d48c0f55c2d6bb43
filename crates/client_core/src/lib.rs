pub mod config;
pub mod conversation;
pub mod error;
pub mod service;

pub use config::{load_settings, Settings};
pub use conversation::{
    ConversationController, ConversationEvent, ConversationState, InitializeOutcome, Phase,
    RejectReason, SubmitOutcome, SEND_FAILURE_NOTICE, START_FAILURE_NOTICE,
};
pub use error::{ClientError, ServiceError};
pub use service::{HttpScenarioChatService, ScenarioChatService};

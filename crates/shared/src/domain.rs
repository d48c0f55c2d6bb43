use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(MessageId);

/// Simulated-attacker persona a conversation is held with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    Bank,
    Hr,
    /// Placeholder shown in the picker; conversations cannot be opened for it.
    ItSupport,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Bank, Scenario::Hr, Scenario::ItSupport];

    /// Identifier used in service paths and request bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Bank => "bank",
            Scenario::Hr => "hr",
            Scenario::ItSupport => "it-support",
        }
    }

    pub fn is_available(self) -> bool {
        !matches!(self, Scenario::ItSupport)
    }

    pub fn available() -> impl Iterator<Item = Scenario> {
        Self::ALL.into_iter().filter(|scenario| scenario.is_available())
    }

    pub fn chat_title(self) -> &'static str {
        match self {
            Scenario::Bank => "⚠️ Fraud Alert",
            Scenario::Hr => "📋 HR Update",
            Scenario::ItSupport => "🛠️ IT Support",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Scenario::Bank => "🏦",
            Scenario::Hr => "👥",
            Scenario::ItSupport => "🛠️",
        }
    }

    pub fn card_title(self) -> &'static str {
        match self {
            Scenario::Bank => "Bank Fraud Alert",
            Scenario::Hr => "HR Policy Update",
            Scenario::ItSupport => "IT Support (Locked)",
        }
    }

    pub fn card_description(self) -> &'static str {
        match self {
            Scenario::Bank => "Defend against urgent requests for PINs and passwords.",
            Scenario::Hr => "Identify phishing links disguised as mandatory employee forms.",
            Scenario::ItSupport => "Remote access scams. (Coming Soon)",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scenario '{0}'")]
pub struct ParseScenarioError(pub String);

impl FromStr for Scenario {
    type Err = ParseScenarioError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == normalized)
            .ok_or_else(|| ParseScenarioError(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
    /// Synthetic, locally generated notices. Never sent to the service.
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
}

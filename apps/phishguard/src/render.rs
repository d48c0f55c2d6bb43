//! Plain-terminal rendering of the picker and conversation bubbles.

use client_core::{RejectReason, SubmitOutcome};
use shared::domain::{Message, Scenario, Sender};

pub const TYPING_INDICATOR: &str = "Attacker is typing...";
pub const FOOTER: &str = "Powered by Chiza Labs @2025";
const BUBBLE_WIDTH: usize = 72;

pub fn picker() -> String {
    let mut out = String::from("PhishGuard AI\nSelect a Training Simulation\n\n");
    let mut number = 0;
    for scenario in Scenario::ALL {
        let label = if scenario.is_available() {
            number += 1;
            format!("[{number}]")
        } else {
            "[-]".to_string()
        };
        out.push_str(&format!(
            "{label} {} {} ({})\n    {}\n",
            scenario.icon(),
            scenario.card_title(),
            scenario.as_str(),
            scenario.card_description()
        ));
    }
    out.push('\n');
    out.push_str(FOOTER);
    out
}

/// Resolves a picker answer given either as a card number or a scenario identifier.
pub fn pick(answer: &str) -> Option<Scenario> {
    let answer = answer.trim();
    if let Ok(number) = answer.parse::<usize>() {
        return Scenario::available().nth(number.checked_sub(1)?);
    }
    answer
        .parse::<Scenario>()
        .ok()
        .filter(|scenario| scenario.is_available())
}

pub fn chat_header(scenario: Scenario) -> String {
    format!("== {} ==\nType your response, /quit to leave.", scenario.chat_title())
}

/// Blank input is dropped quietly, like the original send button.
pub fn rejection_notice(outcome: SubmitOutcome) -> Option<&'static str> {
    match outcome {
        SubmitOutcome::Rejected(RejectReason::Pending) => {
            Some("Wait for the attacker's reply before sending again.")
        }
        SubmitOutcome::Rejected(RejectReason::NotStarted) => {
            Some("The conversation has not started yet.")
        }
        _ => None,
    }
}

pub fn message(message: &Message) -> String {
    match message.sender {
        Sender::User => message
            .text
            .lines()
            .map(|line| format!("{:>width$}", format!("{line} <"), width = BUBBLE_WIDTH))
            .collect::<Vec<_>>()
            .join("\n"),
        Sender::Bot => message
            .text
            .lines()
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Sender::System => message
            .text
            .lines()
            .map(|line| format!("!! {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::MessageId;

    use super::*;

    fn msg(sender: Sender, text: &str) -> Message {
        Message {
            id: MessageId(1),
            text: text.to_string(),
            sender,
        }
    }

    #[test]
    fn picker_numbers_only_available_scenarios() {
        let rendered = picker();
        assert!(rendered.contains("[1] 🏦 Bank Fraud Alert (bank)"));
        assert!(rendered.contains("[2] 👥 HR Policy Update (hr)"));
        assert!(rendered.contains("[-] 🛠️ IT Support (Locked) (it-support)"));
        assert!(rendered.ends_with(FOOTER));
    }

    #[test]
    fn pick_accepts_numbers_and_identifiers() {
        assert_eq!(pick("1"), Some(Scenario::Bank));
        assert_eq!(pick(" 2 "), Some(Scenario::Hr));
        assert_eq!(pick("hr"), Some(Scenario::Hr));
        assert_eq!(pick("0"), None);
        assert_eq!(pick("3"), None);
        assert_eq!(pick("it-support"), None);
        assert_eq!(pick("nonsense"), None);
    }

    #[test]
    fn only_gated_rejections_are_reported() {
        assert!(rejection_notice(SubmitOutcome::Rejected(RejectReason::Pending)).is_some());
        assert!(rejection_notice(SubmitOutcome::Rejected(RejectReason::NotStarted)).is_some());
        assert_eq!(
            rejection_notice(SubmitOutcome::Rejected(RejectReason::EmptyInput)),
            None
        );
        assert_eq!(rejection_notice(SubmitOutcome::Replied), None);
        assert_eq!(rejection_notice(SubmitOutcome::Failed), None);
    }

    #[test]
    fn bubbles_are_tagged_by_sender() {
        assert_eq!(message(&msg(Sender::Bot, "Verify now.")), "> Verify now.");
        assert_eq!(
            message(&msg(Sender::System, "line one\nline two")),
            "!! line one\n!! line two"
        );
        let user = message(&msg(Sender::User, "no thanks"));
        assert_eq!(user.len(), BUBBLE_WIDTH);
        assert!(user.ends_with("no thanks <"));
    }
}

//! Request shaping shared by every gateway: the system instruction and the
//! canonical fallback wording.

use crate::gateway::Message;

/// Canonical assistant texts used in place of a real reply.
pub mod fallback {
    pub const EMPTY_REPLY: &str =
        "Sorry, I couldn't respond right now. Feel free to message us directly!";
    pub const RATE_LIMITED: &str = "High demand right now. Please try again in a minute!";
    pub const UNAUTHORIZED: &str =
        "The assistant has an API key configuration issue. Please contact the school directly.";
    pub const UNKNOWN: &str =
        "Oops! Something went wrong. You can reach us directly on WhatsApp or by phone!";
}

pub fn system_instruction(school_name: &str) -> String {
    format!(
        "You are a calm, warm, professional assistant for {school_name}.\n\
         Reply briefly, clearly, kindly. Use emojis sparingly.\n\
         When appropriate, suggest booking a tour or contacting admissions."
    )
}

/// Lay out the outbound conversation: instruction, prior turns, new turn.
pub fn build_messages(system: &str, history: &[Message], user_text: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system));
    messages.extend(history.iter().cloned());
    messages.push(Message::user(user_text));
    messages
}

/// Trim a raw reply; a missing or blank reply becomes the empty-reply fallback.
pub fn finalize_reply(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback::EMPTY_REPLY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Role;

    #[test]
    fn instruction_names_the_school() {
        let text = system_instruction("Test Academy");
        assert!(text.contains("Test Academy"));
        assert!(text.contains("booking a tour"));
    }

    #[test]
    fn messages_are_instruction_history_then_new_turn() {
        let history = vec![Message::user("Hi"), Message::assistant("Hello!")];
        let messages = build_messages("sys", &history, "Fees?");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].content, "Hi");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[3], Message::user("Fees?"));
    }

    #[test]
    fn finalize_trims_and_falls_back() {
        assert_eq!(finalize_reply(Some("  ok \n")), "ok");
        assert_eq!(finalize_reply(Some("   ")), fallback::EMPTY_REPLY);
        assert_eq!(finalize_reply(None), fallback::EMPTY_REPLY);
    }
}

//! AI assistant transcript.
//!
//! An append-only list of role-tagged, timestamped messages. Sending a
//! question appends the user message immediately; the answer (or a
//! synthetic error message) is appended when the request resolves.
//! Messages are never edited or removed individually; reset replaces the
//! whole transcript with the fixed welcome message.

use chrono::{DateTime, Utc};

use radar_core::types::AiAnswer;

/// Fixed opening message of a fresh transcript.
pub const WELCOME: &str = "Hello! I'm your AI compliance assistant. I can help you understand \
security findings, suggest remediation strategies, and answer questions about compliance \
frameworks like NIS2, ISO 27001, DORA, and RGPD. How can I help you today?";

/// Fixed suggestion list shown with the welcome message.
pub const SUGGESTIONS: [&str; 4] = [
    "What are the critical NIS2 requirements?",
    "How do I fix S3 bucket encryption issues?",
    "Explain RBAC best practices for Kubernetes",
    "Generate a remediation plan for my findings",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub suggestions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Ordered, append-only conversation transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// A fresh transcript: exactly the welcome message and its suggestions.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage {
                role: ChatRole::Assistant,
                content: WELCOME.to_string(),
                suggestions: SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
                timestamp: Utc::now(),
            }],
        }
    }

    /// Discard everything and reinstate the welcome message.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Suggestions of the most recent assistant message, if it carried any.
    pub fn current_suggestions(&self) -> &[String] {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Assistant)
            .map(|m| m.suggestions.as_slice())
            .unwrap_or(&[])
    }

    /// Append the user's question. The echo cannot fail, so there is no
    /// rollback path.
    pub fn push_user(&mut self, question: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: question.into(),
            suggestions: Vec::new(),
            timestamp: Utc::now(),
        });
    }

    /// Append a resolved assistant answer with its follow-up suggestions.
    pub fn push_answer(&mut self, answer: AiAnswer) {
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: answer.answer,
            suggestions: answer.suggestions,
            timestamp: Utc::now(),
        });
    }

    /// Append the synthetic assistant message for a failed ask.
    pub fn push_error(&mut self, error: &str) {
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: format!(
                "I apologize, but I encountered an error: {error}. Please try again."
            ),
            suggestions: Vec::new(),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_transcript_is_exactly_the_welcome() {
        let transcript = Transcript::new();
        assert_eq!(transcript.len(), 1);

        let first = &transcript.messages()[0];
        assert_eq!(first.role, ChatRole::Assistant);
        assert_eq!(first.content, WELCOME);
        assert_eq!(first.suggestions.len(), SUGGESTIONS.len());
        assert_eq!(transcript.current_suggestions().len(), 4);
    }

    #[test]
    fn answer_appends_after_user_message() {
        let mut transcript = Transcript::new();
        transcript.push_user("What is NIS2?");
        transcript.push_answer(AiAnswer {
            answer: "NIS2 is an EU directive.".to_string(),
            related_findings: Vec::new(),
            suggestions: vec!["Show me NIS2 controls".to_string()],
        });

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.messages()[1].role, ChatRole::User);
        assert_eq!(transcript.messages()[2].role, ChatRole::Assistant);
        assert_eq!(
            transcript.current_suggestions(),
            ["Show me NIS2 controls".to_string()]
        );
    }

    #[test]
    fn failed_ask_appends_exactly_one_apology() {
        let mut transcript = Transcript::new();
        transcript.push_user("Will this fail?");
        let before = transcript.len();

        transcript.push_error("connection refused");

        assert_eq!(transcript.len(), before + 1);
        // The user's original message is untouched.
        assert_eq!(transcript.messages()[1].content, "Will this fail?");

        let last = transcript.messages().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert!(last.content.contains("I apologize"));
        assert!(last.content.contains("connection refused"));
        assert!(last.suggestions.is_empty());
    }

    #[test]
    fn reset_restores_the_welcome_state() {
        let mut transcript = Transcript::new();
        transcript.push_user("one");
        transcript.push_error("boom");
        transcript.push_user("two");

        transcript.reset();

        assert_eq!(transcript.len(), 1);
        let only = &transcript.messages()[0];
        assert_eq!(only.role, ChatRole::Assistant);
        assert_eq!(only.content, WELCOME);
        assert_eq!(only.suggestions.len(), SUGGESTIONS.len());
    }
}

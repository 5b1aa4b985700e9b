//! Dashboard chat
//!
//! Questions go to a [`Responder`]: either the remote Q&A endpoint
//! ([`crate::client::AnalysisClient`]) or the offline [`KeywordResponder`].
//!
//! The keyword responder is a demo stand-in, not language understanding. It
//! lower-cases the question and returns the answer of the first rule with a
//! matching substring. Rules overlap ("rent" is tested before "move"), so
//! their order is part of the behavior.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bridge::{BridgeError, SessionId, SessionStore};
use crate::client::{ClientError, Responder};

/// Delay before the offline responder answers
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1000);

pub const PETS_ANSWER: &str = "According to your rental agreement, pets are not allowed without \
written consent from the landlord. There's also a non-refundable pet fee of $500. I recommend \
discussing this with your landlord if you have or plan to get pets.";

pub const RENT_ANSWER: &str = "Your rent is $1,500 per month, due on the 1st of each month. Late \
payments may incur additional fees as specified in the lease terms.";

pub const MOVE_ANSWER: &str = "To terminate your lease early, you need to provide 60 days written \
notice and pay a penalty of 2 months' rent. The standard lease term is 12 months.";

pub const DEPOSIT_ANSWER: &str = "Your security deposit is $3,000, which is 2x your monthly rent. \
This is higher than the typical state maximum of 1.5x monthly rent. You may want to negotiate \
this amount.";

pub const DEFAULT_ANSWER: &str = "I can help you understand any aspect of your rental agreement. \
Feel free to ask about specific clauses, terms, or conditions you'd like me to explain in simple \
terms.";

/// Suggested questions shown under the chat input
pub const SUGGESTED_QUESTIONS: [&str; 4] = [
    "Can I have pets?",
    "When is rent due?",
    "How do I move out early?",
    "Will I get my deposit back?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// `Idle -> AwaitingResponse -> Idle`.
///
/// Nothing stops a second question while one is pending, so answers can
/// arrive out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    Idle,
    AwaitingResponse,
}

/// One ordered rule: any trigger substring selects the answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub triggers: Vec<String>,
    pub answer: String,
}

impl KeywordRule {
    pub fn new(triggers: &[&str], answer: &str) -> Self {
        Self {
            triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
            answer: answer.to_string(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|t| lowered.contains(t.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct KeywordResponder {
    rules: Vec<KeywordRule>,
    default_answer: String,
    delay: Duration,
}

impl KeywordResponder {
    pub fn new(rules: Vec<KeywordRule>, default_answer: impl Into<String>) -> Self {
        Self {
            rules,
            default_answer: default_answer.into(),
            delay: DEFAULT_REPLY_DELAY,
        }
    }

    /// The rental-agreement demo rules
    pub fn lease_demo() -> Self {
        Self::new(
            vec![
                KeywordRule::new(&["pet"], PETS_ANSWER),
                KeywordRule::new(&["rent", "payment"], RENT_ANSWER),
                KeywordRule::new(&["move", "terminate", "leave"], MOVE_ANSWER),
                KeywordRule::new(&["deposit"], DEPOSIT_ANSWER),
            ],
            DEFAULT_ANSWER,
        )
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// First matching rule wins, otherwise the default answer
    pub fn answer(&self, question: &str) -> &str {
        let lowered = question.to_lowercase();
        self.rules
            .iter()
            .position(|rule| rule.matches(&lowered))
            .map(|idx| {
                debug!("Question matched rule {}", idx);
                self.rules[idx].answer.as_str()
            })
            .unwrap_or(&self.default_answer)
    }
}

impl Default for KeywordResponder {
    fn default() -> Self {
        Self::lease_demo()
    }
}

#[async_trait]
impl Responder for KeywordResponder {
    async fn respond(&self, question: &str, _context: &str) -> Result<String, ClientError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.answer(question).to_string())
    }
}

/// Ask a question in a session's chat.
///
/// The question is added to the transcript straight away. The answer is
/// appended when it arrives; a failed remote answer is logged and leaves the
/// transcript without a reply. Returns the answer, or `None` when the
/// question was blank or the responder failed.
pub async fn ask(
    store: &SessionStore,
    responder: &dyn Responder,
    id: &SessionId,
    question: &str,
) -> Result<Option<String>, BridgeError> {
    let question = question.trim();
    if question.is_empty() {
        return Ok(None);
    }

    let session = store.get(id)?;
    store.update(id, |s| {
        s.transcript.push(ChatMessage::user(question));
        s.pending_questions += 1;
    })?;

    let reply = responder
        .respond(question, &session.full_document_text)
        .await;

    let answer = match reply {
        Ok(answer) => Some(answer),
        Err(err) => {
            warn!("Chat error for session {}: {}", id, err);
            None
        }
    };

    store.update(id, |s| {
        s.pending_questions = s.pending_questions.saturating_sub(1);
        if let Some(answer) = &answer {
            s.transcript.push(ChatMessage::assistant(answer.clone()));
        }
    })?;

    Ok(answer)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A question containing "pet" always gets the pets answer
        #[test]
        fn pet_questions_always_match_first(prefix in "[a-z ]{0,20}", suffix in "[a-z ]{0,20}") {
            let question = format!("{}pet{}", prefix, suffix);
            let responder = KeywordResponder::lease_demo();
            prop_assert_eq!(responder.answer(&question), PETS_ANSWER);
        }

        /// Questions without any trigger fall back to the default
        #[test]
        fn untriggered_questions_get_default(question in "[xyzq ]{0,40}") {
            let responder = KeywordResponder::lease_demo();
            prop_assert_eq!(responder.answer(&question), DEFAULT_ANSWER);
        }
    }
}

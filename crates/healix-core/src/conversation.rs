//! The demographic slot-filling state machine.
//!
//!   AwaitingName → AwaitingAge → AwaitingGender → AwaitingSymptoms
//!
//! Each state is entered once. `AwaitingSymptoms` has no exit: every message
//! after the demographics are complete is a symptom description.

use healix_contracts::{
    conversation::{ConversationPhase, Demographics},
    report::DocumentHandle,
};

pub const NAME_PROMPT: &str = "Please enter your name:";
pub const AGE_PROMPT: &str = "Please enter your age:";
pub const GENDER_PROMPT: &str = "Please enter your gender:";
pub const SYMPTOMS_PROMPT: &str =
    "Now, please describe at least 3 of your symptoms with their intensity and duration.";

/// What the state machine decided to do with one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// A demographic slot was filled (or re-asked); reply with `reply`.
    Prompt {
        reply: &'static str,
        /// True exactly once: on the message that set the last slot.
        demographics_completed: bool,
    },
    /// Demographics are complete; run the message through the pipeline.
    Symptoms,
}

/// One conversation's state: its demographic slots and document handle.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    demographics: Demographics,
    document: Option<DocumentHandle>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ConversationPhase {
        self.demographics.phase()
    }

    pub fn demographics(&self) -> &Demographics {
        &self.demographics
    }

    pub fn document(&self) -> Option<&DocumentHandle> {
        self.document.as_ref()
    }

    pub fn attach_document(&mut self, handle: DocumentHandle) {
        self.document = Some(handle);
    }

    /// Feed one message into the state machine.
    ///
    /// A blank message leaves the current slot unset and repeats its prompt.
    pub fn advance(&mut self, message: &str) -> Turn {
        let phase = self.phase();
        let value = message.trim();

        let slot = match phase {
            ConversationPhase::AwaitingName => &mut self.demographics.name,
            ConversationPhase::AwaitingAge => &mut self.demographics.age,
            ConversationPhase::AwaitingGender => &mut self.demographics.gender,
            ConversationPhase::AwaitingSymptoms => return Turn::Symptoms,
        };
        if value.is_empty() {
            return Turn::Prompt { reply: prompt_for(phase), demographics_completed: false };
        }
        *slot = Some(value.to_string());

        Turn::Prompt {
            reply: prompt_for(self.phase()),
            demographics_completed: phase == ConversationPhase::AwaitingGender,
        }
    }
}

fn prompt_for(phase: ConversationPhase) -> &'static str {
    match phase {
        ConversationPhase::AwaitingName => NAME_PROMPT,
        ConversationPhase::AwaitingAge => AGE_PROMPT,
        ConversationPhase::AwaitingGender => GENDER_PROMPT,
        ConversationPhase::AwaitingSymptoms => SYMPTOMS_PROMPT,
    }
}

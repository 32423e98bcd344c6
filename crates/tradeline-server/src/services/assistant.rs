//! Virtual receptionist
//!
//! Each webhook invocation reloads the chat history for the call, adds the
//! caller's turn, asks the model for the next reply and stores the history
//! again. The model answers in JSON; once it includes an `enquiry` object
//! the turn is reported as finished and carries the collected details.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use tradeline::{
    AgentInput, AgentSessionStore, AgentTurn, CallContext, ChatMessage, CollectedEnquiry,
    CompletionOptions, ConversationAgent, CustomerDetails, DomainError, EnquirySummary,
    LlmProvider,
};

use super::strip_code_fence;

const SYSTEM_PROMPT: &str = "\
You are a friendly and professional phone receptionist for a tradie business. \
Your job is to collect enquiry details from callers over the phone.

Follow this conversation flow:
1. Greet the caller warmly using the business name provided below.
2. Ask what work they need done and listen for a description of the job.
3. Ask for their full name, best contact number, and the property address.
4. Ask if there's anything else they'd like to note.
5. Once you have ALL the required information (job description, name, phone, address), \
submit the enquiry and say a brief goodbye.

Rules:
- Keep responses concise and conversational. This is a phone call, not a text chat.
- Use Australian English.
- Do not make up or assume any information. Only use what the caller actually says.
- Messages wrapped in square brackets like [The caller was silent] are system \
annotations about what happened, not words the caller said. Respond naturally \
(e.g. gently prompt them to speak, or repeat your last question).
- If no business name is provided, the dialled number is unassigned. Politely let \
the caller know and offer to help them check the number.

Always reply with a single JSON object:
{\"say\": \"<what to say to the caller>\", \"enquiry\": null}
To submit the enquiry, fill in the enquiry object instead of null:
{\"job_description\": \"...\", \"customer_name\": \"...\", \"customer_phone\": \"...\", \
\"customer_address\": \"...\", \"additional_notes\": \"...\"}";

const CALL_STARTED_NOTE: &str = "[The call has just connected. Greet the caller.]";

/// One model reply
#[derive(Debug, Deserialize)]
struct AgentReply {
    say: String,
    #[serde(default)]
    enquiry: Option<SubmittedEnquiry>,
}

#[derive(Debug, Deserialize)]
struct SubmittedEnquiry {
    job_description: String,
    customer_name: String,
    customer_phone: String,
    customer_address: String,
    #[serde(default)]
    additional_notes: Option<String>,
}

impl SubmittedEnquiry {
    fn into_collected(self) -> CollectedEnquiry {
        CollectedEnquiry {
            summary: EnquirySummary {
                details: self.job_description,
                customerdetails: CustomerDetails {
                    name: Some(self.customer_name),
                    phone: Some(self.customer_phone),
                    address: Some(self.customer_address),
                    email: None,
                },
            },
            additional_notes: self.additional_notes,
        }
    }
}

pub struct LlmConversationAgent {
    llm: Arc<dyn LlmProvider>,
    sessions: Arc<dyn AgentSessionStore>,
}

impl LlmConversationAgent {
    pub fn new(llm: Arc<dyn LlmProvider>, sessions: Arc<dyn AgentSessionStore>) -> Self {
        Self { llm, sessions }
    }
}

fn system_prompt(business_name: Option<&str>) -> String {
    match business_name {
        Some(name) => format!("{SYSTEM_PROMPT}\n\nBusiness name: {name}"),
        None => format!("{SYSTEM_PROMPT}\n\nBusiness name: (none, this number is unassigned)"),
    }
}

fn input_text(input: &AgentInput) -> &str {
    match input {
        AgentInput::CallStarted => CALL_STARTED_NOTE,
        AgentInput::Utterance(text) => text,
        AgentInput::Silence => AgentInput::SILENCE_MARKER,
    }
}

fn parse_reply(text: &str) -> Result<AgentReply, DomainError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| DomainError::ExternalService(format!("Unparseable agent reply: {e}")))
}

#[async_trait]
impl ConversationAgent for LlmConversationAgent {
    async fn next_turn(
        &self,
        call: &CallContext,
        input: AgentInput,
    ) -> Result<AgentTurn, DomainError> {
        let mut history = self.sessions.load(&call.session_id).await?;
        if history.is_empty() {
            history.push(ChatMessage::system(system_prompt(
                call.business_name.as_deref(),
            )));
        }
        history.push(ChatMessage::user(input_text(&input)));

        let options = CompletionOptions::json().with_temperature(0.3);
        let response = self.llm.complete(&history, &options).await?;
        tracing::debug!(
            session_id = %call.session_id,
            model = %response.model,
            tokens = response.usage.total_tokens,
            "Assistant turn generated"
        );
        let reply = parse_reply(&response.content)?;
        history.push(ChatMessage::assistant(response.content));

        let turn = match reply.enquiry {
            None => AgentTurn::reply(reply.say),
            Some(enquiry) => {
                tracing::info!(session_id = %call.session_id, "Assistant collected enquiry");
                AgentTurn::finished(reply.say, enquiry.into_collected())
            }
        };

        self.sessions.save(&call.session_id, &history).await?;
        Ok(turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tradeline::CompletionResponse;

    use crate::adapters::InMemoryAgentSessionStore;

    /// Replies with the queued responses in order
    struct ScriptedLlm {
        replies: Mutex<Vec<String>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedLlm {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _options: &CompletionOptions,
        ) -> Result<CompletionResponse, DomainError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            let content = self
                .replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| DomainError::ExternalService("no reply queued".into()))?;
            Ok(CompletionResponse::text(content, "scripted"))
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    fn call() -> CallContext {
        CallContext::new("CA9", "+61411111111", "+61400555666").with_business("Tom's Plumbing")
    }

    #[tokio::test]
    async fn test_history_persists_across_turns() {
        let llm = Arc::new(ScriptedLlm::new(&[
            r#"{"say": "Hi, thanks for calling Tom's Plumbing. What can we help with?"}"#,
            r#"{"say": "Sure. Could I get your name?", "enquiry": null}"#,
        ]));
        let sessions = Arc::new(InMemoryAgentSessionStore::new());
        let agent = LlmConversationAgent::new(llm.clone(), sessions.clone());

        let first = agent.next_turn(&call(), AgentInput::CallStarted).await.unwrap();
        assert!(first.response_text.contains("Tom's Plumbing"));
        assert!(!first.enquiry_submitted);

        agent
            .next_turn(&call(), AgentInput::Silence)
            .await
            .unwrap();

        let seen = llm.seen.lock().unwrap();
        let second_call = &seen[1];
        assert!(second_call[0].content.contains("Business name: Tom's Plumbing"));
        assert_eq!(second_call.last().unwrap().content, AgentInput::SILENCE_MARKER);
        assert_eq!(sessions.load("CA9").await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_enquiry_finishes_the_turn_with_collected_details() {
        let llm = Arc::new(ScriptedLlm::new(&[
            r#"{"say": "Thanks Sam, we'll be in touch. Goodbye.", "enquiry": {"job_description": "switchboard upgrade", "customer_name": "Sam", "customer_phone": "0400", "customer_address": "42 Main St", "additional_notes": "dog in yard"}}"#,
        ]));
        let sessions = Arc::new(InMemoryAgentSessionStore::new());
        let agent = LlmConversationAgent::new(llm, sessions.clone());

        let turn = agent
            .next_turn(&call(), AgentInput::Utterance("that's everything".into()))
            .await
            .unwrap();

        assert!(turn.enquiry_submitted);
        assert_eq!(turn.response_text, "Thanks Sam, we'll be in touch. Goodbye.");
        let enquiry = turn.enquiry.unwrap();
        assert_eq!(enquiry.summary.details, "switchboard upgrade");
        assert_eq!(enquiry.summary.customerdetails.name.as_deref(), Some("Sam"));
        assert_eq!(
            enquiry.summary.customerdetails.address.as_deref(),
            Some("42 Main St")
        );
        assert_eq!(enquiry.additional_notes.as_deref(), Some("dog in yard"));
        assert_eq!(sessions.load("CA9").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_an_error() {
        let agent = LlmConversationAgent::new(
            Arc::new(ScriptedLlm::new(&["Hello there!"])),
            Arc::new(InMemoryAgentSessionStore::new()),
        );
        let result = agent.next_turn(&call(), AgentInput::CallStarted).await;
        assert!(matches!(result, Err(DomainError::ExternalService(_))));
    }

    #[test]
    fn test_unassigned_number_prompt() {
        assert!(system_prompt(None).contains("unassigned"));
    }
}

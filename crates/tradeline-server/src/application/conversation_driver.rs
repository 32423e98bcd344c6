//! Conversation Driver (Use Case)
//!
//! Decides the next call-control reply for every voice webhook. Nothing is
//! kept in process memory between callbacks: the state of a call is the
//! persisted CallRecord plus the `step` discriminator the previous reply
//! put into its gather action URL.

use std::sync::Arc;
use std::time::Duration;

use tradeline::{
    AgentInput, AgentTurn, BusinessDirectory, BusinessProfile, CallContext, CallRecordStore,
    CallStatus, CallerInput, ConversationAgent, ConversationStep, DomainError, EnquiryPayload,
    EnquiryPublisher, RecordUpdate, StepName, VoiceReply, CALLER_TURN_STEP, VOICEMAIL_STEP,
};

use crate::config::AppConfig;
use crate::models::CallbackForm;

const UNKNOWN_NUMBER: &str = "We could not connect your call. Please check the number.";
const FINAL_MESSAGE: &str = "Thank you for the details. We will be in touch shortly. Goodbye.";
const ERROR_MESSAGE: &str = "An error occurred. Goodbye.";
const AGENT_UNAVAILABLE: &str =
    "Sorry, we're having trouble taking your call right now. Please try again later. Goodbye.";
const ADDRESS_PROMPT: &str = "Thank you. To make sure we log your job with the correct details, please clearly state your full name, best contact number, and the property address.";
const FINAL_NOTES_PROMPT: &str = "Right. Anything else you want me to note ?";
const IVR_RECORD_PROMPT: &str =
    "Record your message after the beep. When you are done, hang up.";
const IVR_INVALID_CHOICE: &str = "Sorry, that's not a valid choice.";
const IVR_RECORDING_SAVED: &str = "Thank you, your message has been saved. Goodbye.";
const IVR_TRANSCRIPT_RECEIVED: &str = "Thank you, your message has been received. Goodbye.";

/// Speech hints that bias recognition towards trade vocabulary
const TRADE_HINTS: [&str; 6] = [
    "electrician",
    "power point",
    "switchboard",
    "lighting",
    "rewire",
    "safety switch",
];

/// Name spoken when the business is unknown
const FALLBACK_BUSINESS_NAME: &str = "the service";

/// Settings the driver needs from the server configuration
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub base_url: String,
    pub transcript_separator: String,
    pub publish_timeout: Duration,
}

impl DriverSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            transcript_separator: config.transcript_separator.clone(),
            publish_timeout: config.enquiries.timeout,
        }
    }

    fn voice_url(&self, path: &str) -> String {
        format!("{}/webhooks/voice/{}", self.base_url, path)
    }

    fn step_url(&self, path: &str, step: StepName) -> String {
        format!("{}?step={}", self.voice_url(path), step)
    }
}

pub struct ConversationDriver {
    store: Arc<dyn CallRecordStore>,
    directory: Arc<dyn BusinessDirectory>,
    agent: Arc<dyn ConversationAgent>,
    publisher: Arc<dyn EnquiryPublisher>,
    settings: DriverSettings,
}

impl ConversationDriver {
    pub fn new(
        store: Arc<dyn CallRecordStore>,
        directory: Arc<dyn BusinessDirectory>,
        agent: Arc<dyn ConversationAgent>,
        publisher: Arc<dyn EnquiryPublisher>,
        settings: DriverSettings,
    ) -> Self {
        Self {
            store,
            directory,
            agent,
            publisher,
            settings,
        }
    }

    // ============================================
    // Scripted intake
    // ============================================

    /// Inbound call on the scripted branch
    pub async fn scripted_incoming(&self, form: &CallbackForm) -> Result<VoiceReply, DomainError> {
        let Some(session_id) = form.call_sid() else {
            tracing::error!("Scripted call started without a CallSid");
            return Ok(error_reply());
        };

        let Some(business) = self.directory.find_by_number(form.to()).await? else {
            tracing::warn!(session_id = %session_id, to = %form.to(), "No business for dialled number");
            return Ok(VoiceReply::new().say(UNKNOWN_NUMBER).hangup());
        };

        self.store
            .upsert(
                session_id,
                RecordUpdate::new()
                    .addresses(form.from(), form.to())
                    .status(CallStatus::Received),
            )
            .await?;

        tracing::info!(
            session_id = %session_id,
            business = %business.name,
            "Scripted call received"
        );

        let reply = VoiceReply::new().start_recording(self.settings.voice_url("va-recording-post"));
        Ok(self.prompt_step(reply, StepName::first(), Some(&business)))
    }

    /// Gather callback for one scripted step
    pub async fn capture_step(&self, form: &CallbackForm) -> Result<VoiceReply, DomainError> {
        let Some(step) = form.step().and_then(|s| s.parse::<StepName>().ok()) else {
            tracing::warn!(step = ?form.step(), "Unrecognized intake step");
            return Ok(error_reply());
        };
        let Some(session_id) = form.call_sid() else {
            tracing::error!(step = %step, "Step callback without a CallSid");
            return Ok(error_reply());
        };

        let text = match form.speech() {
            CallerInput::Speech(text) => text,
            CallerInput::Absent | CallerInput::Empty => {
                tracing::info!(session_id = %session_id, step = %step, "No speech captured, re-prompting");
                let business = match step {
                    StepName::JobDetails => self.directory.find_by_number(form.to()).await?,
                    _ => None,
                };
                return Ok(self.prompt_step(VoiceReply::new(), step, business.as_ref()));
            }
        };

        tracing::info!(session_id = %session_id, step = %step, "Step captured");

        let record = self
            .store
            .upsert(
                session_id,
                RecordUpdate::new()
                    .append_step(ConversationStep::for_slot(step, text))
                    .status(CallStatus::Processing),
            )
            .await?;

        let Some(next) = step.next() else {
            if record.status.is_terminal() {
                // Re-delivered final step: the enquiry already went out with
                // the transcript it was built from.
                tracing::warn!(
                    session_id = %session_id,
                    steps = record.steps.len(),
                    "Duplicate final step, not republishing"
                );
                return Ok(VoiceReply::new().say(FINAL_MESSAGE).hangup());
            }

            let transcript = record.joined_steps(&self.settings.transcript_separator);
            let record = self
                .store
                .upsert(
                    session_id,
                    RecordUpdate::new()
                        .transcript(transcript)
                        .status(CallStatus::Processed),
                )
                .await?;

            tracing::info!(session_id = %session_id, steps = record.steps.len(), "Call processed");
            self.publish(EnquiryPayload::from_record(&record)).await;

            return Ok(VoiceReply::new().say(FINAL_MESSAGE).hangup());
        };

        Ok(self.prompt_step(VoiceReply::new(), next, None))
    }

    fn prompt_step(
        &self,
        reply: VoiceReply,
        step: StepName,
        business: Option<&BusinessProfile>,
    ) -> VoiceReply {
        let action = self.settings.step_url("transcription-available", step);
        match step {
            StepName::JobDetails => {
                let name = business
                    .map(|b| b.name.as_str())
                    .unwrap_or(FALLBACK_BUSINESS_NAME);
                reply.gather_speech(action, greeting(name), Some(speech_hints(business)))
            }
            StepName::AddressDetails => reply.gather_speech(action, ADDRESS_PROMPT, None),
            StepName::FinalNotes => reply.gather_speech(action, FINAL_NOTES_PROMPT, None),
        }
    }

    /// Publish after persistence; bounded, logged, never surfaced
    async fn publish(&self, payload: EnquiryPayload) {
        let session_id = payload.call_sid.clone();
        match tokio::time::timeout(
            self.settings.publish_timeout,
            self.publisher.publish(&payload),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(session_id = %session_id, "Enquiry publish failed: {}", e);
            }
            Err(_) => {
                tracing::warn!(session_id = %session_id, "Enquiry publish timed out");
            }
        }
    }

    // ============================================
    // Virtual assistant
    // ============================================

    /// Inbound call on the assistant branch
    pub async fn assistant_incoming(&self, form: &CallbackForm) -> Result<VoiceReply, DomainError> {
        let Some(session_id) = form.call_sid() else {
            tracing::error!("Assistant call started without a CallSid");
            return Ok(error_reply());
        };

        self.store
            .upsert(
                session_id,
                RecordUpdate::new()
                    .addresses(form.from(), form.to())
                    .status(CallStatus::Received),
            )
            .await?;

        let call = self.call_context(session_id, form).await?;
        tracing::info!(
            session_id = %session_id,
            business = ?call.business_name,
            "Assistant call received"
        );

        let reply = VoiceReply::new().start_recording(self.settings.voice_url("va-recording-post"));
        match self.agent.next_turn(&call, AgentInput::CallStarted).await {
            Ok(turn) => self.speak_turn(reply, session_id, turn).await,
            Err(e) => {
                tracing::warn!(session_id = %session_id, "Agent failed: {}", e);
                Ok(reply.say(AGENT_UNAVAILABLE).hangup())
            }
        }
    }

    /// Gather callback on the assistant branch
    pub async fn assistant_turn(&self, form: &CallbackForm) -> Result<VoiceReply, DomainError> {
        let Some(session_id) = form.call_sid() else {
            tracing::error!("Assistant turn without a CallSid");
            return Ok(error_reply());
        };

        let input = form.speech();
        if let CallerInput::Speech(text) = &input {
            self.store
                .upsert(
                    session_id,
                    RecordUpdate::new()
                        .append_step(ConversationStep::new(CALLER_TURN_STEP, text.clone()))
                        .status(CallStatus::Processing),
                )
                .await?;
        }

        let call = self.call_context(session_id, form).await?;
        match self
            .agent
            .next_turn(&call, AgentInput::from_caller(&input))
            .await
        {
            Ok(turn) => self.speak_turn(VoiceReply::new(), session_id, turn).await,
            Err(e) => {
                tracing::warn!(session_id = %session_id, "Agent failed: {}", e);
                Ok(VoiceReply::new().say(AGENT_UNAVAILABLE).hangup())
            }
        }
    }

    async fn call_context(
        &self,
        session_id: &str,
        form: &CallbackForm,
    ) -> Result<CallContext, DomainError> {
        let (from, to) = if form.to().is_empty() {
            match self.store.get(session_id).await? {
                Some(record) => (record.from_address, record.to_address),
                None => (form.from().to_string(), String::new()),
            }
        } else {
            (form.from().to_string(), form.to().to_string())
        };

        let business = self.directory.find_by_number(&to).await?;
        let call = CallContext::new(session_id, from, to);
        Ok(match business {
            Some(business) => call.with_business(business.name),
            None => call,
        })
    }

    async fn speak_turn(
        &self,
        reply: VoiceReply,
        session_id: &str,
        turn: AgentTurn,
    ) -> Result<VoiceReply, DomainError> {
        if !turn.enquiry_submitted {
            let action = self.settings.voice_url("va-transcription-available");
            return Ok(reply.gather_speech(action, turn.response_text, None));
        }

        let existing = self.store.get(session_id).await?;
        if existing.as_ref().is_some_and(|record| record.status.is_terminal()) {
            tracing::warn!(session_id = %session_id, "Enquiry already processed, not republishing");
            return Ok(reply.say(turn.response_text).hangup());
        }

        let transcript = existing
            .map(|record| record.joined_steps(&self.settings.transcript_separator))
            .unwrap_or_default();
        let record = self
            .store
            .upsert(
                session_id,
                RecordUpdate::new()
                    .transcript(transcript)
                    .status(CallStatus::Processed),
            )
            .await?;

        tracing::info!(session_id = %session_id, steps = record.steps.len(), "Assistant call processed");
        let payload = EnquiryPayload::from_record(&record);
        let payload = match turn.enquiry {
            Some(enquiry) => payload.with_collected(enquiry),
            None => payload,
        };
        self.publish(payload).await;

        Ok(reply.say(turn.response_text).hangup())
    }

    // ============================================
    // IVR menu
    // ============================================

    pub async fn ivr_incoming(&self, form: &CallbackForm) -> Result<VoiceReply, DomainError> {
        if let Some(session_id) = form.call_sid() {
            self.store
                .upsert(
                    session_id,
                    RecordUpdate::new()
                        .addresses(form.from(), form.to())
                        .status(CallStatus::Received),
                )
                .await?;
        }

        let business = self.directory.find_by_number(form.to()).await?;
        let name = business
            .as_ref()
            .map(|b| b.name.as_str())
            .unwrap_or("us");
        let menu = format!(
            "Thanks for calling {name}, please press 1 if you want to auto log a call, press 2 if you wish to speak to us directly"
        );

        Ok(VoiceReply::new()
            .gather_digits(self.settings.voice_url("ivr-selection"), menu, 1)
            .redirect(self.settings.voice_url("ivr-incoming")))
    }

    pub async fn ivr_selection(&self, form: &CallbackForm) -> Result<VoiceReply, DomainError> {
        match form.digits() {
            Some("1") => Ok(VoiceReply::new().say(IVR_RECORD_PROMPT).record(
                self.settings.voice_url("ivr-recording-completed"),
                self.settings.voice_url("va-recording-post"),
                self.settings.voice_url("ivr-transcription-completed"),
            )),
            Some("2") => {
                let forward = self
                    .directory
                    .find_by_number(form.to())
                    .await?
                    .map(|business| business.forward_number)
                    .unwrap_or_else(|| form.to().to_string());
                tracing::info!(session_id = ?form.call_sid(), "Forwarding call to business");
                Ok(VoiceReply::new().dial(forward))
            }
            other => {
                tracing::info!(digits = ?other, "Invalid IVR choice");
                Ok(VoiceReply::new()
                    .say(IVR_INVALID_CHOICE)
                    .redirect(self.settings.voice_url("ivr-incoming")))
            }
        }
    }

    pub async fn ivr_recording_completed(
        &self,
        form: &CallbackForm,
    ) -> Result<VoiceReply, DomainError> {
        match form.call_sid() {
            Some(session_id) => {
                self.store
                    .upsert(
                        session_id,
                        RecordUpdate::new().recording(form.recording_url(), form.recording_status()),
                    )
                    .await?;
            }
            None => tracing::error!("Voicemail recording completed without a CallSid"),
        }

        Ok(VoiceReply::new().say(IVR_RECORDING_SAVED).hangup())
    }

    pub async fn ivr_transcription_completed(
        &self,
        form: &CallbackForm,
    ) -> Result<VoiceReply, DomainError> {
        match (form.call_sid(), form.transcription_text()) {
            (Some(session_id), Some(text)) => {
                self.store
                    .upsert(
                        session_id,
                        RecordUpdate::new()
                            .append_step(ConversationStep::new(VOICEMAIL_STEP, text))
                            .transcript(text)
                            .status(CallStatus::Processed),
                    )
                    .await?;
                tracing::info!(session_id = %session_id, "Voicemail transcribed");
            }
            (Some(session_id), None) => {
                tracing::warn!(session_id = %session_id, "Voicemail transcription was empty");
            }
            (None, _) => tracing::error!("Voicemail transcription without a CallSid"),
        }

        Ok(VoiceReply::new().say(IVR_TRANSCRIPT_RECEIVED).hangup())
    }

    // ============================================
    // Recording status (both branches)
    // ============================================

    pub async fn recording_status(&self, form: &CallbackForm) -> Result<(), DomainError> {
        let Some(session_id) = form.call_sid() else {
            tracing::error!("CallSid not found in recording callback body");
            return Ok(());
        };

        self.store
            .upsert(
                session_id,
                RecordUpdate::new().recording(form.recording_url(), form.recording_status()),
            )
            .await?;

        tracing::info!(
            session_id = %session_id,
            recording_status = %form.recording_status(),
            "Recording status stored"
        );
        Ok(())
    }
}

fn greeting(business_name: &str) -> String {
    format!(
        "Hi, thanks for calling {business_name}. In a few words, please describe the work you want done."
    )
}

fn speech_hints(business: Option<&BusinessProfile>) -> String {
    let mut hints: Vec<&str> = TRADE_HINTS.to_vec();
    if let Some(business) = business {
        hints.push(&business.name);
    }
    hints.join(",")
}

/// Apology and hangup, for callbacks the driver cannot act on
pub fn error_reply() -> VoiceReply {
    VoiceReply::new().say(ERROR_MESSAGE).hangup()
}

//! TwiML - Rendering voice replies as Twilio markup

use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

use tradeline::{GatherInput, VoiceReply, VoiceVerb};

use crate::config::VoiceSettings;

/// Seconds of silence before a speech gather gives up
const SPEECH_TIMEOUT: &str = "3";

/// Rendered TwiML document, served as `text/xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Twiml(pub String);

impl Twiml {
    pub fn render(reply: &VoiceReply, voice: &VoiceSettings) -> Self {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);
        for verb in &reply.verbs {
            render_verb(&mut xml, verb, voice);
        }
        xml.push_str("</Response>");
        Self(xml)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl IntoResponse for Twiml {
    fn into_response(self) -> Response {
        ([(CONTENT_TYPE, "text/xml")], self.0).into_response()
    }
}

fn render_say(xml: &mut String, text: &str, voice: &VoiceSettings) {
    xml.push_str(&format!(
        r#"<Say voice="{}" language="{}">{}</Say>"#,
        escape(&voice.voice),
        escape(&voice.language),
        escape(text)
    ));
}

fn render_verb(xml: &mut String, verb: &VoiceVerb, voice: &VoiceSettings) {
    match verb {
        VoiceVerb::Say(text) => render_say(xml, text, voice),
        VoiceVerb::Gather {
            input,
            action,
            prompt,
            hints,
            action_on_empty_result,
        } => {
            xml.push_str("<Gather");
            match input {
                GatherInput::Speech => {
                    xml.push_str(&format!(
                        r#" input="speech" language="{}" speechModel="phone_call" enhanced="true" speechTimeout="{}""#,
                        escape(&voice.language),
                        SPEECH_TIMEOUT
                    ));
                }
                GatherInput::Digits { num_digits } => {
                    xml.push_str(&format!(r#" input="dtmf" numDigits="{}""#, num_digits));
                }
            }
            xml.push_str(&format!(r#" action="{}" method="POST""#, escape(action)));
            if *action_on_empty_result {
                xml.push_str(r#" actionOnEmptyResult="true""#);
            }
            if let Some(hints) = hints {
                xml.push_str(&format!(r#" hints="{}""#, escape(hints)));
            }
            match prompt {
                Some(prompt) => {
                    xml.push('>');
                    render_say(xml, prompt, voice);
                    xml.push_str("</Gather>");
                }
                None => xml.push_str("/>"),
            }
        }
        VoiceVerb::Record {
            action,
            recording_status_callback,
            transcribe_callback,
        } => {
            xml.push_str(&format!(
                r#"<Record action="{}" method="POST" playBeep="true" transcribe="true" transcribeCallback="{}" recordingStatusCallback="{}" recordingStatusCallbackEvent="completed" recordingStatusCallbackMethod="POST"/>"#,
                escape(action),
                escape(transcribe_callback),
                escape(recording_status_callback)
            ));
        }
        VoiceVerb::StartRecording { status_callback } => {
            xml.push_str(&format!(
                r#"<Start><Recording track="both" trim="do-not-trim" channels="dual" recordingStatusCallback="{}" recordingStatusCallbackEvent="in-progress completed absent"/></Start>"#,
                escape(status_callback)
            ));
        }
        VoiceVerb::Dial(number) => {
            xml.push_str(&format!("<Dial><Number>{}</Number></Dial>", escape(number)));
        }
        VoiceVerb::Redirect(url) => {
            xml.push_str(&format!(
                r#"<Redirect method="POST">{}</Redirect>"#,
                escape(url)
            ));
        }
        VoiceVerb::Hangup => xml.push_str("<Hangup/>"),
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_say_and_hangup() {
        let reply = VoiceReply::new().say("Goodbye.").hangup();
        let twiml = Twiml::render(&reply, &VoiceSettings::default());
        assert_eq!(
            twiml.as_str(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Response><Say voice="Google.en-AU-Neural2-C" language="en-AU">Goodbye.</Say><Hangup/></Response>"#
        );
    }

    #[test]
    fn test_render_escapes_text_and_urls() {
        let reply = VoiceReply::new().gather_speech(
            "https://x/webhooks/voice/transcription-available?step=job-details&a=1",
            "Hi, thanks for calling Tom's Plumbing & Gas.",
            Some("electrician,Tom's Plumbing".to_string()),
        );
        let xml = Twiml::render(&reply, &VoiceSettings::default()).0;

        assert!(xml.contains("step=job-details&amp;a=1"));
        assert!(xml.contains("Tom&apos;s Plumbing &amp; Gas."));
        assert!(xml.contains(r#"actionOnEmptyResult="true""#));
        assert!(xml.contains(r#"hints="electrician,Tom&apos;s Plumbing""#));
        assert!(xml.contains("</Say></Gather>"));
    }

    #[test]
    fn test_render_digit_gather_and_dial() {
        let reply = VoiceReply::new()
            .gather_digits("https://x/ivr-selection", "Press 1", 1)
            .dial("+61499888777");
        let xml = Twiml::render(&reply, &VoiceSettings::default()).0;

        assert!(xml.contains(r#"<Gather input="dtmf" numDigits="1" action="https://x/ivr-selection" method="POST">"#));
        assert!(xml.contains("<Dial><Number>+61499888777</Number></Dial>"));
    }
}

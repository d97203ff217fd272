//! Scripted dialog engine
//!
//! Drives a fixed sequence of prompts to a terminal state, one user action at
//! a time. The engine itself performs no I/O: confirming a submission returns
//! [`Transition::Submit`] carrying the collected [`Lead`] and parks the
//! conversation in [`DialogStatus::Submitting`] until the caller reports the
//! sink's answer through [`DialogEngine::finish_submission`].
//! [`DialogEngine::confirm_with`] does both in one call for callers that can
//! hold the engine across the await.

mod error;
mod script;
mod sink;

pub use error::{DialogError, DialogResult};
pub use script::{render, Choice, Field, InputKind, OptionAction, Script, Step, StepKind};
pub use sink::{LeadSink, MemorySink, SubmissionOutcome};

use crate::types::Lead;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, info, warn};

/// Who said a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The assistant
    Bot,
    /// The visitor
    User,
}

/// One transcript line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author
    pub speaker: Speaker,
    /// Rendered text
    pub text: String,
}

impl Message {
    fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }

    fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }
}

/// Lifecycle of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DialogStatus {
    /// Waiting for the visitor
    Active,
    /// A lead is with the sink; all input is refused
    Submitting,
    /// The lead submission finished, successfully or not
    Completed,
    /// The visitor declined
    Abandoned,
}

impl DialogStatus {
    /// Whether no further input is accepted until restart
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }
}

/// Effect of an accepted option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Moved to the next step
    Advanced,
    /// Conversation closed without a lead
    Declined,
    /// Rewound to the input step
    Rewound,
    /// The lead must now be handed to a sink
    Submit(Lead),
}

/// Snapshot of what the widget should render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogView {
    /// Full transcript
    pub transcript: Vec<Message>,
    /// Lifecycle state
    pub status: DialogStatus,
    /// Step awaiting input; absent while submitting and once terminal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Step>,
}

/// One conversation
#[derive(Debug, Clone)]
pub struct DialogEngine {
    script: Arc<Script>,
    transcript: Vec<Message>,
    step: usize,
    answers: BTreeMap<String, String>,
    status: DialogStatus,
}

impl DialogEngine {
    /// Start a conversation over a validated script
    ///
    /// # Errors
    ///
    /// Returns [`DialogError::InvalidScript`] when the script breaks a
    /// structural rule.
    pub fn new(script: Arc<Script>) -> DialogResult<Self> {
        script.validate()?;
        Ok(Self::start(script))
    }

    /// Start the built-in trade-in conversation
    #[must_use]
    pub fn trade_in() -> Self {
        Self::start(Arc::new(Script::trade_in()))
    }

    fn start(script: Arc<Script>) -> Self {
        let transcript = script
            .step(0)
            .map(|step| vec![Message::bot(step.prompt.clone())])
            .unwrap_or_default();
        Self {
            script,
            transcript,
            step: 0,
            answers: BTreeMap::new(),
            status: DialogStatus::Active,
        }
    }

    /// Transcript so far
    #[must_use]
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Lifecycle state
    #[must_use]
    pub const fn status(&self) -> DialogStatus {
        self.status
    }

    /// Whether no further input is accepted
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether a submission is in flight
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.status == DialogStatus::Submitting
    }

    /// Step awaiting input, if the conversation accepts any
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        (self.status == DialogStatus::Active)
            .then(|| self.script.step(self.step))
            .flatten()
    }

    /// Answers collected so far
    #[must_use]
    pub const fn answers(&self) -> &BTreeMap<String, String> {
        &self.answers
    }

    /// Lead built from the collected answers
    #[must_use]
    pub fn lead(&self) -> Lead {
        let get = |key: &str| self.answers.get(key).cloned().unwrap_or_default();
        Lead {
            company_name: get("companyName"),
            user_name: get("userName"),
            phone_number: get("phoneNumber"),
        }
    }

    /// Render snapshot
    #[must_use]
    pub fn view(&self) -> DialogView {
        DialogView {
            transcript: self.transcript.clone(),
            status: self.status,
            step: self.current_step().cloned(),
        }
    }

    fn ensure_active(&self) -> DialogResult<()> {
        match self.status {
            DialogStatus::Active => Ok(()),
            DialogStatus::Submitting => Err(DialogError::Busy),
            DialogStatus::Completed | DialogStatus::Abandoned => Err(DialogError::Terminal),
        }
    }

    /// Handle an option click
    ///
    /// # Errors
    ///
    /// Fails when the conversation is busy or over, when the current step is
    /// an input step, or when `value` is not offered.
    pub fn select_option(&mut self, value: &str) -> DialogResult<Transition> {
        self.ensure_active()?;
        let script = Arc::clone(&self.script);
        let step = step_at(&script, self.step)?;
        if step.is_input() {
            return Err(DialogError::NotAnOptionStep {
                step: step.id.clone(),
            });
        }
        let choice = step.choice(value).ok_or_else(|| DialogError::UnknownOption {
            step: step.id.clone(),
            value: value.to_string(),
        })?;
        let step_id = &step.id;
        debug!(step = %step_id, option = %choice.value, "Dialog option selected");

        match choice.action {
            OptionAction::Back => {
                let target = script.input_before(self.step).ok_or_else(|| {
                    DialogError::InvalidScript(format!("no input step before '{step_id}'"))
                })?;
                // Drop the confirm prompt and the answer summary before it.
                let keep = self.transcript.len().saturating_sub(2);
                self.transcript.truncate(keep);
                self.step = target;
                Ok(Transition::Rewound)
            }
            OptionAction::Decline => {
                self.transcript.push(Message::user(choice.label.clone()));
                self.transcript
                    .push(Message::bot(script.decline_message.clone()));
                self.status = DialogStatus::Abandoned;
                info!(step = %step_id, "Dialog declined");
                Ok(Transition::Declined)
            }
            OptionAction::Advance => {
                self.transcript.push(Message::user(choice.label.clone()));
                self.advance();
                Ok(Transition::Advanced)
            }
            OptionAction::Submit => {
                self.transcript.push(Message::user(choice.label.clone()));
                self.status = DialogStatus::Submitting;
                Ok(Transition::Submit(self.lead()))
            }
        }
    }

    /// Handle an input-step form submission
    ///
    /// Values are trimmed; a required field that is absent or blank rejects
    /// the whole submission and leaves the engine untouched.
    ///
    /// # Errors
    ///
    /// Fails when the conversation is busy or over, when the current step is
    /// an option step, or when a required field is missing.
    pub fn submit_details<K, V, I>(&mut self, values: I) -> DialogResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.ensure_active()?;
        let script = Arc::clone(&self.script);
        let step = step_at(&script, self.step)?;
        let StepKind::Input { fields } = &step.kind else {
            return Err(DialogError::NotAnInputStep {
                step: step.id.clone(),
            });
        };

        let submitted: BTreeMap<String, String> = values
            .into_iter()
            .map(|(key, value)| (key.into(), value.as_ref().trim().to_string()))
            .collect();

        let mut collected = Vec::with_capacity(fields.len());
        for field in fields {
            let value = submitted.get(&field.name).cloned().unwrap_or_default();
            if field.required && value.is_empty() {
                return Err(DialogError::MissingField {
                    field: field.name.clone(),
                    label: field.label.clone(),
                });
            }
            collected.push((field, value));
        }

        let summary = collected
            .iter()
            .map(|(field, value)| format!("{}: {value}", field.summary_label))
            .collect::<Vec<_>>()
            .join("\n");
        for (field, value) in collected {
            self.answers.insert(field.name.clone(), value);
        }

        debug!(step = %step.id, "Dialog details collected");
        self.transcript.push(Message::user(summary));
        self.advance();
        Ok(())
    }

    /// Record the sink's answer for the pending submission
    ///
    /// # Errors
    ///
    /// Returns [`DialogError::NotSubmitting`] when no submission is pending.
    pub fn finish_submission(&mut self, outcome: &SubmissionOutcome) -> DialogResult<()> {
        if self.status != DialogStatus::Submitting {
            return Err(DialogError::NotSubmitting);
        }

        let mut values = self.answers.clone();
        let template = match outcome {
            SubmissionOutcome::Accepted => {
                info!("Lead submission accepted");
                &self.script.accepted_template
            }
            SubmissionOutcome::Rejected { reason } => {
                warn!(%reason, "Lead submission rejected");
                values.insert("reason".to_string(), reason.clone());
                &self.script.rejected_template
            }
            SubmissionOutcome::Failed { error } => {
                warn!(%error, "Lead submission failed");
                values.insert("reason".to_string(), error.clone());
                &self.script.failed_template
            }
        };

        self.transcript.push(Message::bot(render(template, &values)));
        self.status = DialogStatus::Completed;
        Ok(())
    }

    /// Select an option and, when it submits, deliver the lead to `sink`
    ///
    /// # Errors
    ///
    /// Same as [`DialogEngine::select_option`].
    pub async fn confirm_with<S>(&mut self, value: &str, sink: &S) -> DialogResult<Transition>
    where
        S: LeadSink + ?Sized,
    {
        let transition = self.select_option(value)?;
        if let Transition::Submit(lead) = &transition {
            let outcome = sink.submit(lead).await;
            self.finish_submission(&outcome)?;
        }
        Ok(transition)
    }

    /// Throw the conversation away and start over
    ///
    /// # Errors
    ///
    /// Returns [`DialogError::Busy`] while a submission is in flight.
    pub fn restart(&mut self) -> DialogResult<()> {
        if self.is_submitting() {
            return Err(DialogError::Busy);
        }
        *self = Self::start(Arc::clone(&self.script));
        Ok(())
    }

    fn advance(&mut self) {
        let next = self.step + 1;
        if let Some(step) = self.script.step(next) {
            self.transcript.push(Message::bot(step.prompt.clone()));
            self.step = next;
        }
    }
}

fn step_at(script: &Script, index: usize) -> DialogResult<&Step> {
    script
        .step(index)
        .ok_or_else(|| DialogError::InvalidScript(format!("no step at index {index}")))
}

impl Default for DialogEngine {
    fn default() -> Self {
        Self::trade_in()
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn details(company: &str, name: &str, phone: &str) -> Vec<(&'static str, String)> {
        vec![
            ("companyName", company.to_string()),
            ("userName", name.to_string()),
            ("phoneNumber", phone.to_string()),
        ]
    }

    fn texts(engine: &DialogEngine) -> Vec<&str> {
        engine.transcript().iter().map(|m| m.text.as_str()).collect()
    }

    fn at_confirm() -> DialogEngine {
        let mut engine = DialogEngine::trade_in();
        engine.select_option("yes").unwrap();
        engine
            .submit_details(details("Acme", "Jo", "555"))
            .unwrap();
        engine
    }

    #[test]
    fn test_starts_on_first_prompt() {
        let engine = DialogEngine::trade_in();

        assert_eq!(texts(&engine), vec!["Would you like to trade in Recycled Plastic?"]);
        assert_eq!(engine.status(), DialogStatus::Active);
        assert_eq!(engine.current_step().unwrap().id, "initial");
    }

    #[test]
    fn test_decline_terminates_without_input_step() {
        let mut engine = DialogEngine::trade_in();

        let transition = engine.select_option("no").unwrap();

        assert_eq!(transition, Transition::Declined);
        assert!(engine.is_terminal());
        assert_eq!(engine.status(), DialogStatus::Abandoned);
        assert_eq!(
            texts(&engine),
            vec![
                "Would you like to trade in Recycled Plastic?",
                "No, thanks",
                "Thanks for stopping by!"
            ]
        );
        assert!(engine.current_step().is_none());
        assert_eq!(engine.select_option("yes"), Err(DialogError::Terminal));
    }

    #[test]
    fn test_explore_advances_to_details() {
        let mut engine = DialogEngine::trade_in();

        assert_eq!(engine.select_option("explore").unwrap(), Transition::Advanced);
        assert_eq!(engine.current_step().unwrap().id, "userDetails");
        assert_eq!(texts(&engine).last(), Some(&"Please enter your details"));
    }

    #[test]
    fn test_details_summary_and_confirm_prompt() {
        let engine = at_confirm();

        assert_eq!(
            texts(&engine),
            vec![
                "Would you like to trade in Recycled Plastic?",
                "Yes, I want to trade",
                "Please enter your details",
                "Company: Acme\nName: Jo\nPhone: 555",
                "Confirm submission?"
            ]
        );
        assert_eq!(engine.current_step().unwrap().id, "confirm");
    }

    #[test]
    fn test_blank_required_field_is_rejected() {
        let mut engine = DialogEngine::trade_in();
        engine.select_option("yes").unwrap();
        let before = engine.transcript().len();

        let err = engine
            .submit_details(details("Acme", "   ", "555"))
            .unwrap_err();

        assert_eq!(
            err,
            DialogError::MissingField {
                field: "userName".to_string(),
                label: "Your Name".to_string()
            }
        );
        assert_eq!(engine.transcript().len(), before);
        assert_eq!(engine.current_step().unwrap().id, "userDetails");
    }

    #[test]
    fn test_back_rewinds_to_input_step() {
        let mut engine = at_confirm();

        assert_eq!(engine.select_option("back").unwrap(), Transition::Rewound);
        assert_eq!(engine.current_step().unwrap().id, "userDetails");
        assert_eq!(
            texts(&engine),
            vec![
                "Would you like to trade in Recycled Plastic?",
                "Yes, I want to trade",
                "Please enter your details"
            ]
        );

        engine
            .submit_details(details("Acme Ltd", "Jo", "556"))
            .unwrap();
        assert_eq!(engine.lead().company_name, "Acme Ltd");
    }

    #[test]
    fn test_wrong_action_for_step() {
        let mut engine = DialogEngine::trade_in();
        assert!(matches!(
            engine.submit_details(details("a", "b", "c")),
            Err(DialogError::NotAnInputStep { .. })
        ));
        assert!(matches!(
            engine.select_option("confirm"),
            Err(DialogError::UnknownOption { .. })
        ));

        engine.select_option("yes").unwrap();
        assert!(matches!(
            engine.select_option("yes"),
            Err(DialogError::NotAnOptionStep { .. })
        ));
    }

    #[test]
    fn test_submitting_blocks_input() {
        let mut engine = at_confirm();

        let transition = engine.select_option("confirm").unwrap();
        assert_eq!(
            transition,
            Transition::Submit(Lead {
                company_name: "Acme".to_string(),
                user_name: "Jo".to_string(),
                phone_number: "555".to_string(),
            })
        );
        assert!(engine.is_submitting());
        assert!(engine.current_step().is_none());
        assert_eq!(engine.select_option("back"), Err(DialogError::Busy));
        assert_eq!(engine.restart(), Err(DialogError::Busy));

        engine.finish_submission(&SubmissionOutcome::Accepted).unwrap();
        assert_eq!(engine.status(), DialogStatus::Completed);
        assert_eq!(
            engine.finish_submission(&SubmissionOutcome::Accepted),
            Err(DialogError::NotSubmitting)
        );
    }

    #[tokio::test]
    async fn test_accepted_submission_mentions_phone() {
        let mut engine = at_confirm();
        let sink = MemorySink::accepting();

        engine.confirm_with("confirm", &sink).await.unwrap();

        assert!(engine.is_terminal());
        let last = engine.transcript().last().unwrap();
        assert_eq!(last.speaker, Speaker::Bot);
        assert!(last.text.contains("555"));
        assert_eq!(sink.received().len(), 1);
    }

    #[tokio::test]
    async fn test_placeholder_shaped_answers_are_not_expanded() {
        let mut engine = DialogEngine::trade_in();
        engine.select_option("yes").unwrap();
        engine
            .submit_details(details("Acme", "Jo", "{userName}"))
            .unwrap();

        engine
            .confirm_with("confirm", &MemorySink::accepting())
            .await
            .unwrap();

        assert_eq!(
            engine.transcript().last().unwrap().text,
            "✅ Alright! We'll contact you at {userName}."
        );
    }

    #[tokio::test]
    async fn test_rejected_submission_carries_server_reason() {
        let mut engine = at_confirm();
        let sink = MemorySink::new(SubmissionOutcome::Rejected {
            reason: "bad phone".to_string(),
        });

        engine.confirm_with("confirm", &sink).await.unwrap();

        assert!(engine.is_terminal());
        assert_eq!(
            engine.transcript().last().unwrap().text,
            "❌ Submission failed: bad phone"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported() {
        let mut engine = at_confirm();
        let sink = MemorySink::new(SubmissionOutcome::Failed {
            error: "connection refused".to_string(),
        });

        engine.confirm_with("confirm", &sink).await.unwrap();

        assert_eq!(
            engine.transcript().last().unwrap().text,
            "❌ Submission error: connection refused"
        );
        assert_eq!(engine.status(), DialogStatus::Completed);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut engine = DialogEngine::trade_in();
        engine.select_option("no").unwrap();

        engine.restart().unwrap();

        assert_eq!(engine.status(), DialogStatus::Active);
        assert_eq!(engine.transcript().len(), 1);
        assert!(engine.answers().is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_script() {
        let script = Script {
            steps: Vec::new(),
            ..Script::trade_in()
        };
        assert!(DialogEngine::new(Arc::new(script)).is_err());
    }

    #[test]
    fn test_view_serializes_current_step() {
        let engine = DialogEngine::trade_in();
        let json = serde_json::to_value(engine.view()).unwrap();

        assert_eq!(json["status"], "active");
        assert_eq!(json["step"]["id"], "initial");
        assert_eq!(json["step"]["type"], "options");
        assert_eq!(json["transcript"][0]["speaker"], "bot");
    }
}

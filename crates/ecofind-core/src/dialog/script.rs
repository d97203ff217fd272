//! Static step definitions driving the dialog
//!
//! A [`Script`] is read-only configuration: an ordered list of option and
//! input steps plus the message templates the engine renders at terminal
//! transitions. Templates substitute `{field}` with a collected answer and
//! `{reason}` with a submission failure text.

use super::error::{DialogError, DialogResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// What selecting an option does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionAction {
    /// Move to the next step
    Advance,
    /// Close the conversation without collecting anything
    Decline,
    /// Rewind to the closest preceding input step
    Back,
    /// Hand the collected lead to the submission sink
    Submit,
}

/// One selectable option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Machine value sent back by the client
    pub value: String,
    /// Label shown on the button and echoed into the transcript
    pub label: String,
    /// Transition triggered by the option
    pub action: OptionAction,
}

impl Choice {
    fn new(value: &str, label: &str, action: OptionAction) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            action,
        }
    }
}

/// HTML-ish input hint for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Free text
    Text,
    /// Telephone number
    Tel,
}

/// One field of an input step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Answer key
    pub name: String,
    /// Form label
    pub label: String,
    /// Short label used in the answer summary
    pub summary_label: String,
    /// Input hint
    pub kind: InputKind,
    /// Whether a blank value is rejected
    pub required: bool,
}

impl Field {
    fn required(name: &str, label: &str, summary_label: &str, kind: InputKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            summary_label: summary_label.to_string(),
            kind,
            required: true,
        }
    }
}

/// Body of a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StepKind {
    /// Enumerated choices
    Options {
        /// Offered choices, in display order
        choices: Vec<Choice>,
    },
    /// Free-text form
    Input {
        /// Fields, in display order
        fields: Vec<Field>,
    },
}

/// One prompt of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Stable step id
    pub id: String,
    /// Bot prompt
    pub prompt: String,
    /// Options or input fields
    #[serde(flatten)]
    pub kind: StepKind,
}

impl Step {
    /// Choice matching `value`, if this is an option step offering it
    #[must_use]
    pub fn choice(&self, value: &str) -> Option<&Choice> {
        match &self.kind {
            StepKind::Options { choices } => choices.iter().find(|c| c.value == value),
            StepKind::Input { .. } => None,
        }
    }

    /// Whether the step is a free-text form
    #[must_use]
    pub const fn is_input(&self) -> bool {
        matches!(self.kind, StepKind::Input { .. })
    }
}

/// Complete conversation definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    /// Ordered steps; the first one must be an option step
    pub steps: Vec<Step>,
    /// Closing bot message after a decline
    pub decline_message: String,
    /// Bot message after the sink accepted the lead
    pub accepted_template: String,
    /// Bot message after the sink reported a failure, `{reason}` is substituted
    pub rejected_template: String,
    /// Bot message after the sink could not be reached, `{reason}` is substituted
    pub failed_template: String,
}

impl Script {
    /// The recycled-plastic trade-in conversation
    #[must_use]
    pub fn trade_in() -> Self {
        Self {
            steps: vec![
                Step {
                    id: "initial".to_string(),
                    prompt: "Would you like to trade in Recycled Plastic?".to_string(),
                    kind: StepKind::Options {
                        choices: vec![
                            Choice::new("yes", "Yes, I want to trade", OptionAction::Advance),
                            Choice::new("explore", "Just exploring", OptionAction::Advance),
                            Choice::new("no", "No, thanks", OptionAction::Decline),
                        ],
                    },
                },
                Step {
                    id: "userDetails".to_string(),
                    prompt: "Please enter your details".to_string(),
                    kind: StepKind::Input {
                        fields: vec![
                            Field::required("companyName", "Company Name", "Company", InputKind::Text),
                            Field::required("userName", "Your Name", "Name", InputKind::Text),
                            Field::required("phoneNumber", "Phone Number", "Phone", InputKind::Tel),
                        ],
                    },
                },
                Step {
                    id: "confirm".to_string(),
                    prompt: "Confirm submission?".to_string(),
                    kind: StepKind::Options {
                        choices: vec![
                            Choice::new("confirm", "Yes, proceed", OptionAction::Submit),
                            Choice::new("back", "No, go back", OptionAction::Back),
                        ],
                    },
                },
            ],
            decline_message: "Thanks for stopping by!".to_string(),
            accepted_template: "✅ Alright! We'll contact you at {phoneNumber}.".to_string(),
            rejected_template: "❌ Submission failed: {reason}".to_string(),
            failed_template: "❌ Submission error: {reason}".to_string(),
        }
    }

    /// Step at `index`
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Index of the closest input step strictly before `index`
    #[must_use]
    pub fn input_before(&self, index: usize) -> Option<usize> {
        self.steps
            .iter()
            .take(index)
            .rposition(Step::is_input)
    }

    /// Check the structural rules the engine relies on
    ///
    /// # Errors
    ///
    /// Returns [`DialogError::InvalidScript`] naming the first violation.
    pub fn validate(&self) -> DialogResult<()> {
        let invalid = |msg: String| Err(DialogError::InvalidScript(msg));

        match self.steps.first() {
            None => return invalid("script has no steps".to_string()),
            Some(step) if step.is_input() => {
                return invalid(format!("first step '{}' must offer options", step.id));
            }
            Some(_) => {}
        }

        let mut ids = HashSet::new();
        for (index, step) in self.steps.iter().enumerate() {
            if !ids.insert(step.id.as_str()) {
                return invalid(format!("duplicate step id '{}'", step.id));
            }
            let is_last = index + 1 == self.steps.len();
            match &step.kind {
                StepKind::Options { choices } => {
                    if choices.is_empty() {
                        return invalid(format!("step '{}' offers no options", step.id));
                    }
                    let mut values = HashSet::new();
                    for choice in choices {
                        if !values.insert(choice.value.as_str()) {
                            return invalid(format!(
                                "step '{}' repeats option '{}'",
                                step.id, choice.value
                            ));
                        }
                        if choice.action == OptionAction::Advance && is_last {
                            return invalid(format!(
                                "option '{}' advances past the last step",
                                choice.value
                            ));
                        }
                        if choice.action == OptionAction::Back && self.input_before(index).is_none() {
                            return invalid(format!(
                                "option '{}' has no input step to return to",
                                choice.value
                            ));
                        }
                    }
                }
                StepKind::Input { fields } => {
                    if fields.is_empty() {
                        return invalid(format!("input step '{}' has no fields", step.id));
                    }
                    if is_last {
                        return invalid(format!("input step '{}' cannot be last", step.id));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::trade_in()
    }
}

/// Substitute `{key}` placeholders from `values`; unknown placeholders stay as-is
///
/// The template is scanned once, so substituted values are emitted verbatim
/// even when they look like placeholders themselves.
#[must_use]
pub fn render(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((before, after)) = rest.split_once('{') {
        out.push_str(before);
        let known = after
            .split_once('}')
            .and_then(|(key, tail)| values.get(key).map(|value| (value, tail)));
        if let Some((value, tail)) = known {
            out.push_str(value);
            rest = tail;
        } else {
            out.push('{');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormState {
    /// No order in progress.
    #[default]
    Idle,
    Name,
    Phone,
    Address,
    Items,
    Confirm,
    End,
}

impl FormState {
    /// True while a draft is being collected.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle | Self::End)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormEvent {
    /// The order button was pressed.
    Begin,
    /// Any text reply while a field is being collected.
    Text(String),
    ConfirmPressed,
    CancelPressed,
    /// Global cancel command.
    Abort,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DraftField {
    Name,
    Phone,
    Address,
    Items,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormAction {
    DiscardDraft,
    EnsurePriceList,
    RecordField(DraftField),
    PromptFor(DraftField),
    PriceItems,
    ShowSummary,
    PersistOrder,
    NotifyAdmin,
    ReportAccepted,
    ReportCancelled,
    ReportAborted,
    RepromptConfirmation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: FormState,
    pub to: FormState,
    pub event: FormEvent,
    pub actions: Vec<FormAction>,
}

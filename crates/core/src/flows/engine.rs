use thiserror::Error;

use crate::flows::states::{DraftField, FormAction, FormEvent, FormState, TransitionOutcome};

pub trait FormDefinition {
    fn initial_state(&self) -> FormState;
    fn transition(
        &self,
        current: &FormState,
        event: &FormEvent,
    ) -> Result<TransitionOutcome, FormTransitionError>;
}

/// The five-step order form: name, phone, address, items, confirmation.
#[derive(Clone, Debug, Default)]
pub struct OrderForm;

impl FormDefinition for OrderForm {
    fn initial_state(&self) -> FormState {
        FormState::Idle
    }

    fn transition(
        &self,
        current: &FormState,
        event: &FormEvent,
    ) -> Result<TransitionOutcome, FormTransitionError> {
        transition_order_form(current, event)
    }
}

pub struct FormEngine<F> {
    form: F,
}

impl<F> FormEngine<F>
where
    F: FormDefinition,
{
    pub fn new(form: F) -> Self {
        Self { form }
    }

    pub fn initial_state(&self) -> FormState {
        self.form.initial_state()
    }

    pub fn apply(
        &self,
        current: &FormState,
        event: &FormEvent,
    ) -> Result<TransitionOutcome, FormTransitionError> {
        self.form.transition(current, event)
    }
}

impl Default for FormEngine<OrderForm> {
    fn default() -> Self {
        Self::new(OrderForm)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormTransitionError {
    #[error("no order form is active")]
    NotActive,
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: FormState, event: FormEvent },
}

fn transition_order_form(
    current: &FormState,
    event: &FormEvent,
) -> Result<TransitionOutcome, FormTransitionError> {
    use FormAction::{
        DiscardDraft, EnsurePriceList, NotifyAdmin, PersistOrder, PriceItems, PromptFor,
        RecordField, ReportAborted, ReportAccepted, ReportCancelled, RepromptConfirmation,
        ShowSummary,
    };
    use FormEvent::{Abort, Begin, CancelPressed, ConfirmPressed, Text};
    use FormState::{Address, Confirm, End, Idle, Items, Name, Phone};

    let (to, actions) = match (current, event) {
        (Idle | End, Begin) => (Name, vec![DiscardDraft, EnsurePriceList, PromptFor(DraftField::Name)]),
        (Name, Text(_)) => {
            (Phone, vec![RecordField(DraftField::Name), PromptFor(DraftField::Phone)])
        }
        (Phone, Text(_)) => {
            (Address, vec![RecordField(DraftField::Phone), PromptFor(DraftField::Address)])
        }
        (Address, Text(_)) => {
            (Items, vec![RecordField(DraftField::Address), PromptFor(DraftField::Items)])
        }
        (Items, Text(_)) => (Confirm, vec![RecordField(DraftField::Items), PriceItems, ShowSummary]),
        (Confirm, ConfirmPressed) => {
            (End, vec![PersistOrder, NotifyAdmin, DiscardDraft, ReportAccepted])
        }
        (Confirm, CancelPressed) => (End, vec![DiscardDraft, ReportCancelled]),
        (Confirm, Text(_)) => (Confirm, vec![RepromptConfirmation]),
        (Idle | End, Abort) => return Err(FormTransitionError::NotActive),
        (_, Abort) => (End, vec![DiscardDraft, ReportAborted]),
        _ => {
            return Err(FormTransitionError::InvalidTransition {
                state: *current,
                event: event.clone(),
            });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: event.clone(), actions })
}

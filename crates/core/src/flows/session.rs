use serde::{Deserialize, Serialize};

use crate::domain::order::OrderDraft;
use crate::flows::states::{DraftField, FormState};

/// Per-chat form position plus the draft collected so far.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSession {
    pub state: FormState,
    pub draft: OrderDraft,
}

impl OrderSession {
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn record(&mut self, field: DraftField, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            DraftField::Name => self.draft.name = value,
            DraftField::Phone => self.draft.phone = value,
            DraftField::Address => self.draft.address = value,
            DraftField::Items => self.draft.items_text = value,
        }
    }

    pub fn discard_draft(&mut self) {
        self.draft = OrderDraft::default();
    }
}

pub mod engine;
pub mod session;
pub mod states;

pub use engine::{FormDefinition, FormEngine, FormTransitionError, OrderForm};
pub use session::OrderSession;
pub use states::{DraftField, FormAction, FormEvent, FormState, TransitionOutcome};

use thiserror::Error;

use crate::{flows::FormTransitionError, pricelist::PriceListError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    FormTransition(#[from] FormTransitionError),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    PriceList(#[from] PriceListError),
    #[error("order log append failed: {0}")]
    Persistence(String),
}

/// What a chat user is told when handling a message fails. The detailed
/// `message` stays in the logs.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "The message could not be processed. Please try again.",
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::Domain(error) => {
                InterfaceError::BadRequest { message: error.to_string(), correlation_id }
            }
            Self::PriceList(error) => {
                InterfaceError::ServiceUnavailable { message: error.to_string(), correlation_id }
            }
            Self::Persistence(message) => {
                InterfaceError::ServiceUnavailable { message, correlation_id }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError};
    use crate::flows::{FormEvent, FormState, FormTransitionError};
    use crate::pricelist::PriceListError;

    #[test]
    fn rejected_transition_is_a_bad_request_for_the_chat() {
        let rejected = FormTransitionError::InvalidTransition {
            state: FormState::Phone,
            event: FormEvent::Begin,
        };
        let interface =
            ApplicationError::from(DomainError::from(rejected)).into_interface("update-42");

        assert!(matches!(interface, InterfaceError::BadRequest { .. }));
        assert_eq!(interface.correlation_id(), "update-42");
        assert_eq!(
            interface.user_message(),
            "The message could not be processed. Please try again."
        );
    }

    #[test]
    fn unreachable_price_page_is_service_unavailable() {
        let interface = ApplicationError::from(PriceListError::Status { status: 502 })
            .into_interface("update-7");

        assert_eq!(
            interface,
            InterfaceError::ServiceUnavailable {
                message: "price list page returned HTTP 502".to_owned(),
                correlation_id: "update-7".to_owned(),
            }
        );
    }

    #[test]
    fn failed_order_append_keeps_details_out_of_the_user_message() {
        let interface = ApplicationError::Persistence("orders.csv is read-only".to_owned())
            .into_interface("update-3");

        assert!(interface.to_string().contains("orders.csv is read-only"));
        assert!(!interface.user_message().contains("orders.csv"));
        assert_eq!(
            interface.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
    }
}

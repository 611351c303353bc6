use crate::replies::{CANCEL_LABEL, CONFIRM_LABEL, ORDER_LABEL};

/// What an incoming text means before any session state is consulted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    Start,
    Price { query: Option<String> },
    Cancel,
    OrderButton,
    ConfirmButton,
    CancelButton,
    OtherCommand { name: String },
    Text(String),
}

/// Commands and labels are matched on the trimmed text; plain text is kept
/// verbatim.
pub fn classify(text: &str) -> Inbound {
    let trimmed = text.trim();
    match trimmed {
        ORDER_LABEL => return Inbound::OrderButton,
        CONFIRM_LABEL => return Inbound::ConfirmButton,
        CANCEL_LABEL => return Inbound::CancelButton,
        _ => {}
    }

    let Some((name, args)) = parse_command(trimmed) else {
        return Inbound::Text(text.to_owned());
    };

    match name.as_str() {
        "start" => Inbound::Start,
        "p" | "price" => {
            let query = args.split_whitespace().collect::<Vec<_>>().join(" ");
            Inbound::Price { query: (!query.is_empty()).then_some(query) }
        }
        "cancel" => Inbound::Cancel,
        _ => Inbound::OtherCommand { name },
    }
}

/// Splits `/name@bot args` into a lowercased name and the argument text.
pub fn parse_command(text: &str) -> Option<(String, &str)> {
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    let name = head.split_once('@').map_or(head, |(name, _bot)| name);
    if name.is_empty() {
        return None;
    }
    Some((name.to_ascii_lowercase(), args))
}

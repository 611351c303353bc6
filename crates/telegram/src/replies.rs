use pharmabot_core::config::BotProfile;
use pharmabot_core::domain::order::{OrderDraft, OrderRecord};
use pharmabot_core::domain::product::ProductRecord;
use pharmabot_core::flows::DraftField;
use pharmabot_core::pricing::{format_amount, OrderQuote};
use pharmabot_core::MatchStrategy;

pub const ORDER_LABEL: &str = "🛒 Order တင်မယ်";
pub const CONFIRM_LABEL: &str = "✅ Confirm";
pub const CANCEL_LABEL: &str = "❌ Cancel";

pub const ORDER_ACCEPTED: &str = "✅ အော်ဒါ လက်ခံပြီးပါပြီ 🙏";
pub const ORDER_CANCELLED: &str = "❌ အော်ဒါ Cancel လုပ်ခဲ့သည်။";
pub const ORDER_ABORTED: &str = "❌ Order flow cancelled.";
pub const NO_ACTIVE_ORDER: &str = "ℹ️ No active order to cancel.";
pub const PRICE_LIST_UNAVAILABLE: &str = "❌ Online pricelist ကို load မရနိုင်သေးပါ";
pub const PRICE_USAGE: &str = "Usage: /p amlodipine";
pub const CONFIRM_PROMPT: &str = "Confirm လုပ်မလား?\n✅ Confirm     ❌ Cancel";

pub const WHOLESALE_WELCOME: &str = "မင်္ဂလာပါ 🙏\n\
La Min Paing Pharmacy Wholesale AI Bot မှကြိုဆိုပါတယ်ခင်ဗျာ\n\n\
🛒 Order → 'Order တင်မယ်'\n\
💰 Price → /p name (ဥပမာ /p amlodipine)\n\
🤖 Q&A → တစ်ခြားမေးချင်တာ မြန်မာလို/English လို မေးပါ";

pub const ASSISTANT_WELCOME: &str = "မင်္ဂလာပါ 🙏\n\
ဒီမှာ La Min Paing Pharmacy Wholesale ရဲ့ AI Assistant ဖြစ်ပါတယ်။\n\n\
📌 မေးမြန်းလို့ရသည့် အရာများ:\n\
- ဆေးအကြောင်း ရှင်းပြပေးမည်\n\
- Order / Delivery / အလုပ်ချိန်\n\
- Retail pharmacy ဆိုင်ပိုင်ရှင်များအတွက် အကူအညီ\n\n\
မေးချင်တာကို စာရိုက်ပြီး မေးလိုက်ရင် ရ ပါပြီ 😊";

const SUMMARY_DISCLAIMER: &str = "စျေးနှုန်းများ အချိန်နှင့်အမျှ အပြောင်းအလဲ ရှိနိုင်ပါသည် \
သက်ဆိုင်ရာ way သမားမှ ပြန်လည်ဆက်သွယ် ပေးပါမည်ခင်ဗျာ\n\
ဘောက်ချာ ထွက်မှသာလျှင် စျေးနှုန်းနှင့် ရနိုင်မယ့် ပစ္စည်းအတည်ဖြစ်ပါမည်ခင်ဗျာ\n\
ဝယ်ယူအားပေးမှုအတွက် ကျေးဇူးအထူးတင်ရှိပါသည်ခင်ဗျာ\n";

/// Rows of reply-keyboard button labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
}

impl ReplyKeyboard {
    pub fn single(label: impl Into<String>) -> Self {
        Self { rows: vec![vec![label.into()]] }
    }

    pub fn row(mut self, labels: &[&str]) -> Self {
        self.rows.push(labels.iter().map(|label| (*label).to_owned()).collect());
        self
    }

    pub fn order() -> Self {
        Self::single(ORDER_LABEL)
    }

    pub fn confirm() -> Self {
        Self::single(CONFIRM_LABEL).row(&[CANCEL_LABEL])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<ReplyKeyboard>,
}

impl OutgoingMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self { chat_id, text: text.into(), keyboard: None }
    }

    pub fn with_keyboard(mut self, keyboard: ReplyKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

pub fn welcome(chat_id: i64, profile: BotProfile) -> OutgoingMessage {
    match profile {
        BotProfile::Wholesale => {
            OutgoingMessage::new(chat_id, WHOLESALE_WELCOME).with_keyboard(ReplyKeyboard::order())
        }
        BotProfile::Assistant => OutgoingMessage::new(chat_id, ASSISTANT_WELCOME),
    }
}

pub fn field_prompt(chat_id: i64, field: DraftField) -> OutgoingMessage {
    let text = match field {
        DraftField::Name => "👤 Customer Name :",
        DraftField::Phone => "📞 Phone :",
        DraftField::Address => "📍 Address ('မလို' ဆိုလည်းရ):",
        DraftField::Items => {
            "🧾 Items list ထည့်ပါ:\n- Amlodipine 5mg x 10 box\n- Euroamlo 10mg x 5 box"
        }
    };
    OutgoingMessage::new(chat_id, text)
}

pub fn order_summary(chat_id: i64, draft: &OrderDraft, quote: &OrderQuote) -> OutgoingMessage {
    let mut breakdown = String::new();
    if !quote.lines.is_empty() {
        breakdown.push_str("💰 Price breakdown:\n");
        breakdown.push_str(&quote.breakdown().join("\n"));
        breakdown.push_str("\n\n");
    }
    if !quote.unresolved.is_empty() {
        breakdown.push_str("⚠️ pricelist ထဲမတွေ့တဲ့ items:\n");
        breakdown.push_str(&quote.unresolved.join("\n"));
        breakdown.push_str("\n\n");
    }

    let text = format!(
        "📋 **Order Summary**\n------------------------\n👤 {}\n📞 {}\n📍 {}\n\n🧾 {}\n\n\
         {breakdown}💵 စုစုပေါင်း: {} Ks\n\n{SUMMARY_DISCLAIMER}{CONFIRM_PROMPT}",
        field(&draft.name),
        field(&draft.phone),
        field(&draft.address),
        field(&draft.items_text),
        format_amount(quote.total),
    );
    OutgoingMessage::new(chat_id, text).with_keyboard(ReplyKeyboard::confirm())
}

pub fn confirmation_reprompt(chat_id: i64) -> OutgoingMessage {
    OutgoingMessage::new(chat_id, CONFIRM_PROMPT).with_keyboard(ReplyKeyboard::confirm())
}

pub fn admin_notice(admin_chat_id: i64, record: &OrderRecord) -> OutgoingMessage {
    OutgoingMessage::new(
        admin_chat_id,
        format!(
            "🆕 NEW ORDER\n👤 {}\n📞 {}\n📍 {}\n🧾 {}\n💵 Total {} Ks",
            record.name, record.phone, record.address, record.items, record.total
        ),
    )
}

pub fn product_card(chat_id: i64, product: &ProductRecord) -> OutgoingMessage {
    let mut text = format!("📦 {}\n💰 Price: {}", product.name, product.price);
    if !product.unit.is_empty() {
        text.push_str(&format!("\n📦 Unit: {}", product.unit));
    }
    if !product.expiry.is_empty() {
        text.push_str(&format!("\n⌛ Exp: {}", product.expiry));
    }
    OutgoingMessage::new(chat_id, text)
}

pub fn price_results(
    chat_id: i64,
    query: &str,
    strategy: MatchStrategy,
    products: &[&ProductRecord],
) -> OutgoingMessage {
    let header = match strategy {
        MatchStrategy::Fuzzy => format!("✏️ '{query}' နဲ့ အနီးစပ်ဆုံး results:"),
        MatchStrategy::Substring => format!("'{query}' results:"),
    };
    let lines = products
        .iter()
        .enumerate()
        .map(|(index, product)| format!("{}. {} – {} Ks", index + 1, product.name, product.price));

    OutgoingMessage::new(chat_id, std::iter::once(header).chain(lines).collect::<Vec<_>>().join("\n"))
}

pub fn price_not_found(chat_id: i64, query: &str) -> OutgoingMessage {
    OutgoingMessage::new(chat_id, format!("'{query}' ကို မတွေ့ပါ ❌"))
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

use pharmabot_core::config::BotProfile;

const WHOLESALE_PROMPT: &str = "You are AI assistant for La Min Paing Pharmacy. \
Reply briefly in Burmese unless user uses English.";

const ASSISTANT_PROMPT: &str = "You are \u{201c}La Min Paing AI Assistant\u{201d}, the official assistant of
La Min Paing Pharmacy Wholesale, Mandalay, Myanmar.

Your users are retail pharmacy shops, wholesale shops, and internal staff.

Goals:
- Answer questions about medicines, usage, strengths, and packaging in clear,
  simple language (English and Myanmar).
- Help users with wholesale-related questions: stock, order process, delivery,
  working hours, contact info (if provided).
- Support marketing and customer communication in a friendly, professional tone.

Rules:
- If medical questions are asked, give general information only and ALWAYS say
  that patients must check with their own doctor or local healthcare
  professional before taking any medicine.
- If you don\u{2019}t know price or stock (because it is not in the uploaded files or
  given info), say you don\u{2019}t know and suggest contacting La Min Paing staff.
- If user is Myanmar pharmacy owner/staff, you may reply in Burmese,
  or mixed Burmese + English where helpful.
- Keep answers short, clear, and practical.
- Use polite Myanmar style for Burmese replies.
- Never claim you are a doctor or pharmacist.
- Never give final treatment decisions or prescriptions.";

/// How the relay frames a question for one bot profile.
#[derive(Clone, Debug, PartialEq)]
pub struct Persona {
    pub profile: BotProfile,
    pub model: String,
    pub system_prompt: &'static str,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Sent to the user instead of an error.
    pub failure_reply: &'static str,
}

impl Persona {
    pub fn for_profile(profile: BotProfile) -> Self {
        match profile {
            BotProfile::Wholesale => Self {
                profile,
                model: "gpt-4o-mini".to_owned(),
                system_prompt: WHOLESALE_PROMPT,
                temperature: None,
                max_tokens: Some(200),
                failure_reply: "❌ ChatGPT ကို ချိတ်ဆက်ရာမှာ ပြဿနာတစ်ခု ဖြစ်နေပါတယ်။",
            },
            BotProfile::Assistant => Self {
                profile,
                model: "gpt-4.1-mini".to_owned(),
                system_prompt: ASSISTANT_PROMPT,
                temperature: Some(0.5),
                max_tokens: None,
                failure_reply: "System error occurred. Please try again later.",
            },
        }
    }

    /// Replaces the default model when one is configured.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model.filter(|model| !model.trim().is_empty()) {
            self.model = model;
        }
        self
    }
}

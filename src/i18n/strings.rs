/// Built-in copy for every string the engine itself writes to the page.
///
/// The locale dictionary always wins; these are only used when the active
/// dictionary is missing (not loaded yet, failed to load) or lacks the key.
/// Each field documents the dictionary key it stands in for.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    // ==================== Theme Toggle ====================
    /// `theme.to_light`: accessible label while the dark theme is active
    pub theme_to_light: &'static str,

    /// `theme.to_dark`: accessible label while the light theme is active
    pub theme_to_dark: &'static str,

    // ==================== Chat Replies ====================
    /// `chat.reply_pending`: bot reply while no chat backend is configured
    pub chat_reply_pending: &'static str,

    /// `chat.reply_ack`: bot reply once a chat backend is configured
    pub chat_reply_ack: &'static str,

    // ==================== Contact Form ====================
    /// `contact.phone_invalid`: custom validity message for short phone numbers
    pub phone_invalid: &'static str,

    /// `contact.sent`: confirmation appended to the chat log after a submission
    pub contact_sent: &'static str,
}

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    theme_to_light: "Switch to light theme",
    theme_to_dark: "Switch to dark theme",

    chat_reply_pending: "Thanks for your message! Live chat is being connected. Meanwhile, leave your details in the contact form and we'll get back to you.",
    chat_reply_ack: "Thanks! A representative will reply shortly.",

    phone_invalid: "Please enter a valid phone number (at least 7 digits).",
    contact_sent: "Thanks! Your message was received. We'll be in touch soon.",
};

// ==================== Hebrew Strings ====================

pub const HEBREW_STRINGS: LanguageStrings = LanguageStrings {
    theme_to_light: "מעבר לתצוגה בהירה",
    theme_to_dark: "מעבר לתצוגה כהה",

    chat_reply_pending: "תודה על ההודעה! הצ'אט החי נמצא בתהליך חיבור. בינתיים אפשר להשאיר פרטים בטופס יצירת הקשר ונחזור אליכם.",
    chat_reply_ack: "תודה! נציג יחזור אליכם בהקדם.",

    phone_invalid: "נא להזין מספר טלפון תקין (לפחות 7 ספרות).",
    contact_sent: "תודה! ההודעה התקבלה. ניצור קשר בקרוב.",
};

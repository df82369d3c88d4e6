/// Identity keys are matched exactly after normalization, so every lookup
/// and every write goes through these.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn normalize_phone(phone: &str) -> String {
    phone.trim().to_string()
}

/// Bangladesh mobile format: `01XXXXXXXXX`.
pub fn is_valid_bd_phone(phone: &str) -> bool {
    phone.len() == 11 && phone.starts_with("01") && phone.chars().all(|c| c.is_ascii_digit())
}

/// `01712345678` -> `+8801712345678` for SMS delivery.
pub fn phone_to_e164(phone: &str) -> String {
    format!("+880{}", &phone[1..])
}

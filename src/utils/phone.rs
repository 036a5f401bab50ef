use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX.get_or_init(|| Regex::new(r"^[0-9]{8}$").expect("valid phone regex"))
}

/// 验证手机号格式（8 位 ASCII 数字），返回去除首尾空白后的号码
pub fn validate_phone(phone: &str) -> AppResult<String> {
    let phone = phone.trim();

    if !phone_regex().is_match(phone) {
        return Err(AppError::ValidationError(
            "Phone number must be exactly 8 digits".to_string(),
        ));
    }

    Ok(phone.to_string())
}

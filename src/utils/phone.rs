/// 转成 WhatsApp Cloud API 需要的号码格式：只保留数字，去掉国际前缀 00
pub fn normalize_whatsapp_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.strip_prefix("00") {
        Some(rest) => rest.to_string(),
        None => digits,
    }
}

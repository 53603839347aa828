// ==========================================
// 车辆租赁库存系统 - 值规范化器
// ==========================================
// 职责: 文本规范化 / 布尔 / 整数 / 价格 / URL 解析 / 标题派生
// 约束: 纯函数，不抛错；无法解析 → None
// ==========================================

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use url::Url;

// 仅 ASCII 数字（\d 会匹配其他文字的数字）
static INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+$").expect("integer pattern is valid"));

const TRUE_TOKENS: [&str; 4] = ["да", "yes", "true", "1"];
const FALSE_TOKENS: [&str; 4] = ["нет", "no", "false", "0"];

/// 文本规范化: NFKC + 去首尾空白 + 折叠内部空白
pub fn normalize_text(raw: &str) -> String {
    let composed: String = raw.nfkc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 去掉全部空白（用于数值解析）
fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// 布尔解析（"да"/"yes"/"true"/"1" 与 "нет"/"no"/"false"/"0"）
pub fn parse_boolean(raw: &str) -> Option<bool> {
    let value = normalize_text(raw).to_lowercase();
    if TRUE_TOKENS.contains(&value.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&value.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// 整数解析: 可选前导 '-' + 数字，不接受小数 / 科学计数 / 分组符
pub fn parse_integer(raw: &str) -> Option<i64> {
    let value = strip_whitespace(&normalize_text(raw));
    if !INTEGER_RE.is_match(&value) {
        return None;
    }
    value.parse::<i64>().ok()
}

/// 价格解析
///
/// # 规则
/// - 只保留数字、逗号、点、负号
/// - 同时存在 ',' 与 '.' → ',' 视为千分位，删除
/// - 仅有 ',' → 视为小数点
pub fn parse_price(raw: &str) -> Option<f64> {
    let compact = strip_whitespace(&normalize_text(raw));
    let mut value: String = compact
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if value.contains(',') && value.contains('.') {
        value = value.replace(',', "");
    } else if value.contains(',') {
        value = value.replace(',', ".");
    }

    if value.is_empty() {
        return None;
    }

    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// URL 规范化
///
/// # 规则
/// - 空 → None
/// - 无 http:// / https:// 前缀 → 补 https://
/// - 严格解析成功 → 规范序列化
/// - 解析失败 → 原样返回规范化文本（不丢弃）
pub fn normalize_url(raw: &str) -> Option<String> {
    let value = normalize_text(raw);
    if value.is_empty() {
        return None;
    }

    let lower = value.to_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        value.clone()
    } else {
        format!("https://{}", value)
    };

    match Url::parse(&candidate) {
        Ok(url) => Some(url.to_string()),
        Err(_) => Some(value),
    }
}

/// 标题派生: 品牌 + 型号 + 改款，全部为空时回退报价编码
pub fn build_title(brand: &str, model: &str, modification: &str, offer_code: &str) -> String {
    let parts: Vec<String> = [brand, model, modification]
        .iter()
        .map(|part| normalize_text(part))
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        normalize_text(offer_code)
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text_collapses_whitespace() {
        assert_eq!(normalize_text("  Toyota \t  Camry\n"), "Toyota Camry");
        assert_eq!(normalize_text(""), "");
        // NBSP 经 NFKC 转为普通空格
        assert_eq!(normalize_text("1\u{00A0}234"), "1 234");
        // 全角字符
        assert_eq!(normalize_text("ＡＢＣ１２"), "ABC12");
    }

    #[test]
    fn test_parse_boolean_tokens() {
        assert_eq!(parse_boolean("Да"), Some(true));
        assert_eq!(parse_boolean("Нет"), Some(false));
        assert_eq!(parse_boolean(" YES "), Some(true));
        assert_eq!(parse_boolean("0"), Some(false));
        assert_eq!(parse_boolean("maybe"), None);
        assert_eq!(parse_boolean(""), None);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("12 345"), Some(12345));
        assert_eq!(parse_integer("-7"), Some(-7));
        assert_eq!(parse_integer("12.5"), None);
        assert_eq!(parse_integer("1e5"), None);
        assert_eq!(parse_integer("1,000"), None);
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_price_separators() {
        assert_eq!(parse_price("1 234,56"), Some(1234.56));
        assert_eq!(parse_price("1,234.56"), Some(1234.56));
        assert_eq!(parse_price("2 500 000 ₽"), Some(2_500_000.0));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("договорная"), None);
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("disk.yandex.ru/d/abc"),
            Some("https://disk.yandex.ru/d/abc".to_string())
        );
        assert_eq!(
            normalize_url("HTTP://Example.com"),
            Some("http://example.com/".to_string())
        );
        assert_eq!(normalize_url("   "), None);
        // 无法解析时保留原文
        assert_eq!(
            normalize_url("not a url"),
            Some("not a url".to_string())
        );
    }

    #[test]
    fn test_normalize_url_idempotent() {
        for raw in ["example.com/path?q=1", "https://disk.yandex.ru/d/X", "http://a.b/c d"] {
            let once = normalize_url(raw).unwrap();
            let twice = normalize_url(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {}", raw);
        }
    }

    #[test]
    fn test_build_title() {
        assert_eq!(build_title("Toyota", "Camry", "", "OFR-1"), "Toyota Camry");
        assert_eq!(build_title("", "", "", "OFR-1"), "OFR-1");
        assert_eq!(build_title("", "", "", ""), "");
        assert_eq!(build_title(" Kia ", "", " 1.6 AT ", "X"), "Kia 1.6 AT");
    }
}

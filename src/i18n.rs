// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持俄文（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "ru";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"ru" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use lease_inventory::i18n::t;
/// let msg = t("validation.price_required");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数，替换 `%{name}` 占位符）
///
/// # 示例
/// ```no_run
/// use lease_inventory::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/offers.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // locale 为全局状态，相关测试串行执行
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");

        set_locale(DEFAULT_LOCALE);
        assert_eq!(current_locale(), "ru");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("ru");
        assert_eq!(t("validation.price_required"), "Не указана цена");

        set_locale("en");
        assert_eq!(t("validation.price_required"), "Price is required");

        set_locale(DEFAULT_LOCALE);
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let msg = t_with_args(
            "validation.year_out_of_range",
            &[("value", "1800"), ("min", "1950"), ("max", "2100")],
        );
        assert_eq!(msg, "Year 1800 is outside the allowed range 1950-2100");

        set_locale("ru");
        let msg = t_with_args("import.missing_column", &[("header", "Цена")]);
        assert!(msg.contains("«Цена»"));

        set_locale(DEFAULT_LOCALE);
    }
}

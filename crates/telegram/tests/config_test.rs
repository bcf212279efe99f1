use pretty_assertions::assert_eq;
use rstest::rstest;
use salon_telegram::TelegramConfig;
use salon_telegram::config::DEFAULT_API_BASE;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[rstest]
#[case(&[])]
#[case(&[("TELEGRAM_BOT_TOKEN", "  ")])]
fn missing_token_disables_delivery(#[case] pairs: &[(&str, &str)]) {
    let config = TelegramConfig::from_lookup(lookup_from(pairs)).unwrap();
    assert!(config.is_none());
}

#[test]
fn token_alone_uses_defaults() {
    let config = TelegramConfig::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", "123:abc")]))
        .unwrap()
        .unwrap();

    assert_eq!(config.admin_chat_id, None);
    assert_eq!(config.api_base, DEFAULT_API_BASE);
    assert_eq!(
        config.send_message_url(),
        "https://api.telegram.org/bot123:abc/sendMessage"
    );
}

#[test]
fn admin_chat_and_base_are_read() {
    let config = TelegramConfig::from_lookup(lookup_from(&[
        ("TELEGRAM_BOT_TOKEN", "t"),
        ("TELEGRAM_ADMIN_CHAT_ID", "-100200300"),
        ("TELEGRAM_API_BASE", "http://localhost:9999/"),
    ]))
    .unwrap()
    .unwrap();

    assert_eq!(config.admin_chat_id, Some(-100200300));
    assert_eq!(config.send_message_url(), "http://localhost:9999/bott/sendMessage");
}

#[test]
fn invalid_admin_chat_is_an_error() {
    let result = TelegramConfig::from_lookup(lookup_from(&[
        ("TELEGRAM_BOT_TOKEN", "t"),
        ("TELEGRAM_ADMIN_CHAT_ID", "not-a-number"),
    ]));
    assert!(result.is_err());
}

//! Messages reported through the process-wide logger.

#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use std::sync::{
    Arc,
    Mutex,
};

use googletest::prelude::*;
use routed_i18n::logger::{
    LogLevel,
    LogSettings,
    LogSink,
    Logger,
    set_logger,
};
use routed_i18n::{
    Config,
    I18n,
    Loader,
    LoaderDescriptor,
    LoaderError,
    LocaleTag,
    RoutePattern,
};
use serde_json::json;
use serial_test::serial;

#[derive(Debug, Default)]
struct Captured {
    messages: Mutex<Vec<(LogLevel, String)>>,
}

impl Captured {
    fn contains(&self, needle: &str) -> bool {
        self.messages.lock().unwrap().iter().any(|(_, message)| message.contains(needle))
    }

    fn count(&self, level: LogLevel) -> usize {
        self.messages.lock().unwrap().iter().filter(|(l, _)| *l == level).count()
    }
}

impl LogSink for Captured {
    fn log(&self, level: LogLevel, message: &str) {
        self.messages.lock().unwrap().push((level, message.to_string()));
    }
}

fn log_settings(level: LogLevel, prefix: &str, sink: &Arc<Captured>) -> LogSettings {
    let sink: Arc<dyn LogSink> = sink.clone();
    LogSettings { level, prefix: prefix.to_string(), sink: Some(sink) }
}

#[tokio::test]
#[serial]
async fn test_config_log_settings_replace_logger() {
    let sink = Arc::new(Captured::default());
    let config = Config::new()
        .with_log(log_settings(LogLevel::Debug, "[test]: ", &sink))
        .with_init_locale("en")
        .with_loader(LoaderDescriptor::new(
            "broken",
            "en",
            Loader::new(|| async { Err(LoaderError::message("network down")) }),
        ));
    let i18n = I18n::new();

    i18n.load_config(config).await;
    set_logger(Logger::default());

    assert_that!(sink.contains("[test]: Setting config."), eq(true));
    assert_that!(sink.contains("[test]: Setting 'en' locale."), eq(true));
    assert_that!(
        sink.contains("[test]: Failed to load translation. Verify your 'en' > 'broken' Loader."),
        eq(true)
    );
    assert_that!(sink.contains("[test]: network down"), eq(true));
}

#[tokio::test]
#[serial]
async fn test_warn_level_hides_debug_messages() {
    let sink = Arc::new(Captured::default());
    let config = Config::new().with_log(log_settings(LogLevel::Warn, "", &sink)).with_init_locale("en");
    let i18n = I18n::new();

    i18n.load_config(config).await;
    set_logger(Logger::default());

    assert_that!(sink.count(LogLevel::Debug), eq(0));
    assert_that!(sink.contains("Setting config."), eq(false));
}

#[rstest::rstest]
#[serial]
#[case("Not A Locale", "not a locale")]
#[case("EN-@@", "en-@@")]
fn test_non_standard_locale_warns_and_lowercases(#[case] input: &str, #[case] expected: &str) {
    let sink = Arc::new(Captured::default());
    set_logger(Logger::new(&log_settings(LogLevel::Warn, "", &sink)));

    let tag = LocaleTag::parse(input);
    set_logger(Logger::default());

    assert_that!(tag.as_ref().map(LocaleTag::as_str), some(eq(expected)));
    assert_that!(sink.contains(&format!("'{input}' locale is non-standard.")), eq(true));
}

#[rstest::rstest]
#[serial]
fn test_malformed_route_is_reported_and_never_matches() {
    let sink = Arc::new(Captured::default());
    set_logger(Logger::new(&log_settings(LogLevel::Error, "", &sink)));

    let descriptor = LoaderDescriptor::new("page", "en", Loader::from_node(json!({}).into()))
        .with_routes([RoutePattern::regex("(unclosed")]);
    let applies = descriptor.applies_to("/page");
    set_logger(Logger::default());

    assert_that!(applies, eq(false));
    assert_that!(sink.contains("Invalid route config! '(unclosed'"), eq(true));
}

#[tokio::test]
#[serial]
async fn test_empty_key_warns() {
    let sink = Arc::new(Captured::default());
    let config = Config::new()
        .with_log(log_settings(LogLevel::Warn, "", &sink))
        .with_init_locale("en")
        .with_translations(routed_i18n::node::translations_from_json(json!({ "en": { "a": "A" } })));
    let i18n = I18n::new();
    i18n.load_config(config).await;

    let output = i18n.t("", &[]);
    set_logger(Logger::default());

    assert_that!(output, eq(""));
    assert_that!(sink.count(LogLevel::Warn), eq(1));
}

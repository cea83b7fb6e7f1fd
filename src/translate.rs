//! Key resolution with fallback locale and fallback value.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::locale::LocaleTag;
use crate::logger;
use crate::node::{
    Node,
    Translations,
};
use crate::parser::Parser;
use crate::store::{
    Observable,
    Readable,
};

/// Inputs of one [`translate`] call.
#[derive(Debug, Clone, Copy)]
pub struct TranslateProps<'a> {
    pub parser: &'a dyn Parser,
    pub key: &'a str,
    pub params: &'a [Value],
    pub translations: &'a Translations,
    pub locale: Option<&'a LocaleTag>,
    pub fallback_locale: Option<&'a LocaleTag>,
    /// `Some(None)` is a configured empty fallback, distinct from `None`.
    pub fallback_value: Option<&'a Option<String>>,
}

/// Resolves `key` to a string.
///
/// The key is looked up in the locale's table, then in the fallback locale's
/// table. If neither has it and a fallback value is configured, that value is
/// returned without going through the parser. Otherwise the parser decides,
/// receiving `None` as text.
///
/// An empty key or a missing locale is reported and yields an empty string.
#[must_use]
pub fn translate(props: &TranslateProps<'_>) -> String {
    let TranslateProps { parser, key, params, translations, locale, fallback_locale, fallback_value } =
        *props;

    if key.is_empty() {
        logger::current().warn("No key provided to translate.");
        return String::new();
    }

    let Some(locale) = locale.filter(|locale| !locale.as_str().is_empty()) else {
        logger::current().warn(format!("No locale provided to translate '{key}'."));
        return String::new();
    };

    let text = lookup(translations, locale, key)
        .or_else(|| fallback_locale.and_then(|fallback| lookup(translations, fallback, key)));

    if text.is_none()
        && let Some(fallback_value) = fallback_value
    {
        return fallback_value.clone().unwrap_or_default();
    }

    parser.parse(text, params, locale, key)
}

/// Entry of `key` in the table of `locale`.
fn lookup<'a>(translations: &'a Translations, locale: &LocaleTag, key: &str) -> Option<&'a Node> {
    translations.get(locale).and_then(|table| table.get(key))
}

/// Handle on the translate functions of an instance.
///
/// `t` translates with the published locale and `l` takes the locale
/// explicitly. Both read the instance's current configuration and
/// translations on every call. Before any configuration is loaded both
/// return the key.
#[derive(Clone)]
pub struct Translator {
    /// Current configuration; `None` until one is loaded.
    config: Readable<Option<Arc<Config>>>,
    /// Preprocessed translations.
    translations: Readable<Translations>,
    /// Locale used by `t`.
    locale: Readable<Option<LocaleTag>>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(
            Observable::new(None).readable(),
            Observable::new(Translations::new()).readable(),
            Observable::new(None).readable(),
        )
    }
}

impl Translator {
    pub(crate) const fn new(
        config: Readable<Option<Arc<Config>>>,
        translations: Readable<Translations>,
        locale: Readable<Option<LocaleTag>>,
    ) -> Self {
        Self { config, translations, locale }
    }

    /// Translates `key` in the published locale.
    #[must_use]
    pub fn t(&self, key: &str, params: &[Value]) -> String {
        self.resolve(self.locale.get().as_ref(), key, params)
    }

    /// Translates `key` in `locale`.
    #[must_use]
    pub fn l(&self, locale: &str, key: &str, params: &[Value]) -> String {
        self.resolve(LocaleTag::parse(locale).as_ref(), key, params)
    }

    /// Locale used by [`Translator::t`].
    #[must_use]
    pub fn locale(&self) -> Option<LocaleTag> {
        self.locale.get()
    }

    /// Shared resolution of `t` and `l`.
    fn resolve(&self, locale: Option<&LocaleTag>, key: &str, params: &[Value]) -> String {
        let Some(config) = self.config.get() else {
            return key.to_string();
        };
        let translations = self.translations.get();

        translate(&TranslateProps {
            parser: config.parser.as_ref(),
            key,
            params,
            translations: &translations,
            locale,
            fallback_locale: config.fallback_locale.as_ref(),
            fallback_value: config.fallback_value.as_ref(),
        })
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("configured", &self.config.get().is_some())
            .field("locale", &self.locale.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use serde_json::json;
    use serial_test::serial;

    use super::*;
    use crate::logger::{
        LogLevel,
        LogSettings,
        Logger,
        set_logger,
    };
    use crate::node::translations_from_json;
    use crate::parser::BasicParser;
    use crate::test_utils::MemorySink;

    fn tag(locale: &str) -> LocaleTag {
        LocaleTag::parse(locale).unwrap()
    }

    #[fixture]
    fn translations() -> Translations {
        translations_from_json(json!({
            "en": { "common.greeting": "Hello {0}", "common.only_en": "English only" },
            "cs": { "common.greeting": "Ahoj {0}" },
        }))
    }

    fn run(
        translations: &Translations,
        key: &str,
        locale: Option<&str>,
        fallback_locale: Option<&str>,
        fallback_value: Option<&Option<String>>,
    ) -> String {
        let locale = locale.map(tag);
        let fallback_locale = fallback_locale.map(tag);
        translate(&TranslateProps {
            parser: &BasicParser,
            key,
            params: &[json!("Ann")],
            translations,
            locale: locale.as_ref(),
            fallback_locale: fallback_locale.as_ref(),
            fallback_value,
        })
    }

    #[rstest]
    fn resolves_primary_locale(translations: Translations) {
        assert_that!(run(&translations, "common.greeting", Some("cs"), Some("en"), None), eq("Ahoj Ann"));
    }

    #[rstest]
    fn falls_back_to_fallback_locale(translations: Translations) {
        assert_that!(
            run(&translations, "common.only_en", Some("cs"), Some("en"), None),
            eq("English only")
        );
    }

    #[rstest]
    fn missing_everywhere_uses_fallback_value(translations: Translations) {
        let fallback = Some("N/A".to_string());

        assert_that!(run(&translations, "missing.key", Some("cs"), Some("en"), Some(&fallback)), eq("N/A"));
    }

    #[rstest]
    fn configured_empty_fallback_value_is_returned(translations: Translations) {
        assert_that!(run(&translations, "missing.key", Some("cs"), None, Some(&None)), eq(""));
    }

    #[rstest]
    fn missing_without_fallback_value_goes_to_parser(translations: Translations) {
        assert_that!(run(&translations, "missing.key", Some("cs"), Some("en"), None), eq("missing.key"));
    }

    #[rstest]
    fn present_key_ignores_fallback_value(translations: Translations) {
        let fallback = Some("N/A".to_string());

        assert_that!(
            run(&translations, "common.greeting", Some("en"), None, Some(&fallback)),
            eq("Hello Ann")
        );
    }

    #[rstest]
    #[serial]
    #[case("", Some("en"), "No key provided")]
    #[case("common.greeting", None, "No locale provided to translate 'common.greeting'")]
    fn empty_key_or_locale_warns_and_returns_empty(
        translations: Translations,
        #[case] key: &str,
        #[case] locale: Option<&str>,
        #[case] warning: &str,
    ) {
        let sink = MemorySink::new();
        set_logger(Logger::new(&LogSettings {
            level: LogLevel::Warn,
            sink: Some(Arc::new(sink.clone())),
            ..LogSettings::default()
        }));

        let output = run(&translations, key, locale, Some("en"), Some(&Some("N/A".to_string())));

        set_logger(Logger::default());
        assert_that!(output, eq(""));
        assert_that!(sink.contains(warning), eq(true));
    }

    #[rstest]
    fn unconfigured_translator_echoes_key() {
        let translator = Translator::default();

        assert_that!(translator.t("common.greeting", &[]), eq("common.greeting"));
        assert_that!(translator.l("en", "common.greeting", &[]), eq("common.greeting"));
    }

    #[rstest]
    fn translator_t_and_l(translations: Translations) {
        let config = Observable::new(Some(Arc::new(Config::new().with_fallback_locale("en"))));
        let table = Observable::new(translations);
        let locale = Observable::new(Some(tag("cs")));
        let translator = Translator::new(config.readable(), table.readable(), locale.readable());

        assert_that!(translator.t("common.greeting", &[json!("Eva")]), eq("Ahoj Eva"));
        assert_that!(translator.l("EN", "common.greeting", &[json!("Eva")]), eq("Hello Eva"));
        assert_that!(translator.t("common.only_en", &[]), eq("English only"));
    }

    #[rstest]
    fn translator_reads_current_locale_and_tables(translations: Translations) {
        let config = Observable::new(Some(Arc::new(Config::new())));
        let table = Observable::new(Translations::new());
        let locale = Observable::new(Some(tag("en")));
        let translator = Translator::new(config.readable(), table.readable(), locale.readable());

        table.set(translations);
        assert_that!(translator.t("common.greeting", &[json!("Eva")]), eq("Hello Eva"));

        locale.set(Some(tag("cs")));
        assert_that!(translator.locale(), eq(&Some(tag("cs"))));
        assert_that!(translator.t("common.greeting", &[json!("Eva")]), eq("Ahoj Eva"));
    }
}

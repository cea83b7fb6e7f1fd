//! Resolves translation keys from a settings file.
//!
//! ```text
//! routed-i18n <settings.json> <locale> <route> <key>...
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use routed_i18n::config::ConfigManager;
use routed_i18n::{
    BasicParser,
    I18n,
};
use tracing_subscriber::EnvFilter;

/// Parsed command line.
struct Args {
    /// Settings file or directory containing `i18n.json`
    settings: PathBuf,
    /// Locale to load and translate in
    locale: String,
    /// Route passed to the loaders
    route: String,
    /// Keys to print
    keys: Vec<String>,
}

impl Args {
    /// Reads the positional arguments; `None` if any is missing.
    fn parse(mut args: impl Iterator<Item = String>) -> Option<Self> {
        let settings = PathBuf::from(args.next()?);
        let locale = args.next()?;
        let route = args.next()?;
        let keys: Vec<String> = args.collect();

        (!keys.is_empty()).then_some(Self { settings, locale, route, keys })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let Some(args) = Args::parse(std::env::args().skip(1)) else {
        tracing::error!("Usage: routed-i18n <settings.json> <locale> <route> <key>...");
        return ExitCode::FAILURE;
    };

    let mut manager = ConfigManager::new();
    if let Err(e) = manager.load_settings_file(&args.settings) {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }

    let i18n = I18n::new();
    i18n.load_config(manager.build_config(Arc::new(BasicParser))).await;
    i18n.load_translations(&args.locale, Some(&args.route)).await;

    let mut stdout = std::io::stdout().lock();
    for key in &args.keys {
        if let Err(e) = writeln!(stdout, "{key}\t{}", i18n.t(key, &[])) {
            tracing::error!("Failed to write output: {e}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

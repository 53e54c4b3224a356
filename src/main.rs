//! CommentPilot - AI comment assistant
//!
//! Command-line entry point: one-off generation, prompt preview, key
//! validation and settings editing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commentpilot_config::{Config, ConfigLoader, ConfigValidator, FileSettingsStore};
use commentpilot_core::{build_prompt, ActivationError};
use commentpilot_protocols::{LanguageStyle, Settings, SettingsStore, TextGenerator};
use commentpilot_provider_gemini::GeminiClient;

/// CommentPilot CLI.
#[derive(Parser)]
#[command(name = "commentpilot")]
#[command(about = "AI comment assistant for social-media comment boxes")]
#[command(version)]
struct Cli {
    /// Configuration file path (default: ~/.commentpilot/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Settings file path (default: ~/.commentpilot/settings.toml)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a comment for the given post text
    Generate {
        /// Post or comment text to reply to
        #[arg(long)]
        context: String,

        /// Tone (formal, casual, friendly, professional, humorous)
        #[arg(long)]
        style: Option<String>,
    },

    /// Print the prompt that would be sent, without calling the service
    Prompt {
        #[arg(long)]
        context: String,

        #[arg(long)]
        style: Option<String>,
    },

    /// Check that an API key is accepted by the service
    ValidateKey {
        /// Key to check (default: the saved key)
        #[arg(long)]
        key: Option<String>,
    },

    /// Settings management commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the current settings
    Show,

    /// Change and save settings
    Set {
        #[arg(long)]
        api_key: Option<String>,

        #[arg(long)]
        style: Option<String>,

        #[arg(long)]
        auto_love: Option<bool>,
    },
}

/// Initialize tracing with console (stderr) and daily rolling file output.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = ConfigLoader::home_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("commentpilot")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop; keep it for the whole run.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(ConfigLoader::default_path);
    let config = load_config(&config_path)?;

    let settings_path = cli
        .settings
        .unwrap_or_else(ConfigLoader::default_settings_path);
    let store = FileSettingsStore::new(settings_path);

    match cli.command {
        Commands::Generate { context, style } => {
            handle_generate(&config, &store, &context, style.as_deref()).await
        }
        Commands::Prompt { context, style } => {
            let settings = effective_settings(&config, &store).await?;
            let style = resolve_style(style.as_deref(), &settings);
            println!("{}", build_prompt(&context, style));
            Ok(())
        }
        Commands::ValidateKey { key } => handle_validate_key(&config, &store, key).await,
        Commands::Config { action } => handle_config_command(action, &config, &store).await,
    }
}

fn load_config(path: &std::path::Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(path)?;

    let result = ConfigValidator::validate(&config);
    for warning in &result.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if let Some(error) = result.into_error() {
        return Err(error.into());
    }

    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Saved settings when a settings file exists, otherwise the `[settings]`
/// table of the configuration file.
async fn effective_settings(
    config: &Config,
    store: &FileSettingsStore,
) -> Result<Settings, Box<dyn std::error::Error>> {
    if store.path().exists() {
        Ok(store.get_all().await?)
    } else {
        Ok(config.settings.clone())
    }
}

fn resolve_style(requested: Option<&str>, settings: &Settings) -> LanguageStyle {
    match requested {
        Some(name) => {
            let style = LanguageStyle::from_name(name);
            if style.as_str() != name.trim().to_ascii_lowercase() {
                warn!("Unknown style '{}', using {}", name, style);
            }
            style
        }
        None => settings.language_style,
    }
}

fn gemini_client(config: &Config) -> Result<GeminiClient, Box<dyn std::error::Error>> {
    Ok(GeminiClient::new(
        config.gemini.base_url.clone(),
        config.gemini.model.clone(),
    )?)
}

async fn handle_generate(
    config: &Config,
    store: &FileSettingsStore,
    context: &str,
    style: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = effective_settings(config, store).await?;
    if !settings.has_api_key() {
        return Err(ActivationError::MissingApiKey.user_message().into());
    }

    let prompt = build_prompt(context, resolve_style(style, &settings));
    let client = gemini_client(config)?;
    let text = client
        .generate(&prompt, &settings.api_key)
        .await
        .map_err(|e| ActivationError::from(e).user_message())?;

    println!("{}", text);
    Ok(())
}

async fn handle_validate_key(
    config: &Config,
    store: &FileSettingsStore,
    key: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = match key {
        Some(key) => key,
        None => effective_settings(config, store).await?.api_key,
    };
    if key.trim().is_empty() {
        return Err(ActivationError::MissingApiKey.user_message().into());
    }

    let client = gemini_client(config)?;
    if client.validate_key(&key).await? {
        println!("API key is valid");
        Ok(())
    } else {
        Err("Invalid API key".into())
    }
}

async fn handle_config_command(
    action: ConfigAction,
    config: &Config,
    store: &FileSettingsStore,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let settings = effective_settings(config, store).await?;
            println!("Settings file: {}", store.path().display());
            println!(
                "api_key        = {}",
                if settings.has_api_key() { "(set)" } else { "(not set)" }
            );
            println!("language_style = {}", settings.language_style);
            println!("auto_love      = {}", settings.auto_love);
            Ok(())
        }
        ConfigAction::Set {
            api_key,
            style,
            auto_love,
        } => {
            let mut settings = effective_settings(config, store).await?;
            if let Some(api_key) = api_key {
                settings.api_key = api_key.trim().to_string();
            }
            if let Some(style) = style {
                settings.language_style = style.parse::<LanguageStyle>()?;
            }
            if let Some(auto_love) = auto_love {
                settings.auto_love = auto_love;
            }

            settings.validate_for_save()?;
            store.set_all(settings).await?;
            println!("Settings saved to {}", store.path().display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_style() {
        let settings = Settings {
            language_style: LanguageStyle::Formal,
            ..Settings::default()
        };
        assert_eq!(resolve_style(None, &settings), LanguageStyle::Formal);
        assert_eq!(resolve_style(Some("Humorous"), &settings), LanguageStyle::Humorous);
        assert_eq!(resolve_style(Some("pirate"), &settings), LanguageStyle::Casual);
    }

    #[test]
    fn test_cli_parses_config_set() {
        let cli = Cli::try_parse_from([
            "commentpilot",
            "config",
            "set",
            "--api-key",
            "abc",
            "--auto-love",
            "true",
        ])
        .unwrap();
        match cli.command {
            Commands::Config {
                action: ConfigAction::Set {
                    api_key, auto_love, ..
                },
            } => {
                assert_eq!(api_key.as_deref(), Some("abc"));
                assert_eq!(auto_love, Some(true));
            }
            _ => panic!("unexpected command"),
        }
    }

    #[tokio::test]
    async fn test_effective_settings_falls_back_to_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileSettingsStore::new(dir.path().join("settings.toml"));
        let mut config = Config::default();
        config.settings.api_key = "from-config".to_string();

        let settings = effective_settings(&config, &store).await.unwrap();
        assert_eq!(settings.api_key, "from-config");
    }
}

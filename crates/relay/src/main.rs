mod config;

use config::RelayConfig;
use getstocks::{ApiConfig, GetStocksApi, PollSettings};
use telegram::{telegram as bot, BotContext};
use teloxide::prelude::*;
use tracing_subscriber::EnvFilter;
use webform::WebFormApi;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
    }
}

async fn run_bot(api: GetStocksApi, config: &RelayConfig) {
    let token = match std::env::var("TELOXIDE_TOKEN") {
        Ok(token) if !token.trim().is_empty() => token,
        _ => {
            tracing::error!("TELOXIDE_TOKEN must be set in the environment or .env file");
            return;
        }
    };

    let ctx = BotContext::new(api, config.chat);
    if let Err(e) = bot::run(Bot::new(token), ctx, config.webhook.clone()).await {
        tracing::error!("Telegram bot stopped with an error: {}", e);
    }
}

async fn run_web(api: GetStocksApi, config: &RelayConfig) {
    let server = WebFormApi::new(api, PollSettings::web());
    if let Err(e) = server.serve(&config.web_host, config.web_port, shutdown_signal()).await {
        tracing::error!("Web form stopped with an error: {}", e);
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    let _ = dotenv::dotenv();

    init_tracing();

    let api_config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return;
        }
    };

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return;
        }
    };

    let api = match GetStocksApi::new(api_config) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!("Failed to build GetStocks client: {}", e);
            return;
        }
    };

    if !config.telegram_enabled && !config.web_enabled {
        tracing::warn!("Both TELEGRAM_ENABLED and WEB_ENABLED are off, nothing to run");
        return;
    }

    tracing::info!(
        "Relay starting (telegram: {}, web: {})",
        config.telegram_enabled,
        config.web_enabled
    );

    let telegram = async {
        if config.telegram_enabled {
            run_bot(api.clone(), &config).await;
        }
    };
    let web = async {
        if config.web_enabled {
            run_web(api.clone(), &config).await;
        }
    };

    tokio::join!(telegram, web);

    tracing::info!("Relay stopped");
}

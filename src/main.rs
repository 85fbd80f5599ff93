use std::sync::Arc;

use anyhow::Error;
use teloxide::dptree;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;

use crate::commands::Command;
use crate::config::Config;
use crate::handlers::{PendingBroadcasts, callback_handler, command_handler, text_handler};
use crate::storage::Storage;

mod commands;
mod config;
mod handlers;
mod storage;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // --- Logging Setup ---
    use log::LevelFilter;
    use std::env;
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::sync::Mutex;

    // Console and file sinks are filtered independently, both driven by env.
    let console_level_str = env::var("CONSOLE_LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string());
    let console_level = match console_level_str.to_uppercase().as_str() {
        "ERROR" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    let file_level_str = env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "OFF".to_string());
    let file_level = match file_level_str.to_uppercase().as_str() {
        "ERROR" => Some(LevelFilter::Error),
        "ALL" | "INFO" => Some(LevelFilter::Info),
        _ => None, // OFF
    };

    let max_level = std::cmp::max(console_level, file_level.unwrap_or(LevelFilter::Off));

    let log_file = if file_level.is_some() {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open("bot_errors.log")?;
        Some(Arc::new(Mutex::new(file)))
    } else {
        None
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder
        .filter(None, max_level)
        .format(move |buf, record| {
            let line = format!(
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            );

            if record.level() <= console_level {
                writeln!(buf, "{}", line)?;
            }

            if let Some(level) = file_level {
                if record.level() <= level {
                    if let Some(handle) = &log_file {
                        if let Ok(mut guard) = handle.lock() {
                            let _ = writeln!(guard, "{}", line);
                        }
                    }
                }
            }
            Ok(())
        })
        .init();

    log::info!("Starting proxy shop bot...");
    let start_time = std::time::Instant::now();

    if let Err(e) = config::load_environment() {
        log::error!("Failed to load environment: {}", e);
        return Err(e);
    }

    let cfg = Arc::new(Config::from_env());
    if cfg.admin_id.is_none() && cfg.admin_username.is_none() {
        log::warn!("Neither ADMIN_ID nor ADMIN_USERNAME is set; all admin actions will be denied");
    }

    let storage = Arc::new(Storage::new(&cfg.data_dir)?);
    log::info!("Data directory: {:?}", cfg.data_dir);

    // Broadcast wait flags live only for the lifetime of the process.
    let pending = Arc::new(PendingBroadcasts::default());

    let bot = Bot::from_env();

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_message().endpoint(text_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler));

    log::info!("Bot initialization completed in {:.2?}", start_time.elapsed());
    log::info!("Starting to dispatch updates...");

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![storage, cfg, pending])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error occurred while handling an update",
        ))
        .enable_ctrlc_handler()
        .build();

    tokio::select! {
        _ = dispatcher.dispatch() => {},
        _ = tokio::signal::ctrl_c() => {
            log::info!("Received Ctrl+C, shutting down...");
        }
    }

    log::info!("Bot shutdown complete");
    Ok(())
}

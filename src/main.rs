//! cord-client - renders a channel's message history the way the desktop
//! client lays out its message list.
//!
//! Reads a JSON array of messages as returned by the channel messages
//! endpoint and prints a transcript with consecutive messages from the same
//! author grouped under one header.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;

use cord_client::buffer::load_channel;
use cord_client::config::{load_settings, save_settings, Overrides, Settings};
use cord_client::logging::Logger;
use cord_client::message::Message;
use cord_client::transcript::render_transcript;

#[derive(Parser, Debug)]
#[command(name = "cord-client", version, about)]
struct Args {
    /// JSON file holding an array of message objects
    file: PathBuf,

    /// The file is already in display order (the API returns newest first)
    #[arg(long)]
    oldest_first: bool,

    /// Give every message its own header
    #[arg(long)]
    no_group: bool,

    /// Omit times from headers
    #[arg(long)]
    no_timestamps: bool,

    /// Also append the messages to the chat log directory
    #[arg(long)]
    log: bool,

    /// Store the effective settings as the new defaults
    #[arg(long)]
    save_settings: bool,
}

fn main() -> cord_client::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings: Settings = load_settings().unwrap_or_default();
    settings.apply(Overrides {
        no_group: args.no_group,
        no_timestamps: args.no_timestamps,
        log: args.log,
    });
    if args.save_settings {
        save_settings(&settings)?;
    }

    let payload = fs::read_to_string(&args.file)?;
    let messages = Message::list_from_json(&payload)?;
    log::debug!("loaded {} messages from {}", messages.len(), args.file.display());
    let buffer = load_channel(messages, args.oldest_first, settings.max_buffer_messages);

    if settings.log_messages {
        let logger = Logger::new()?;
        for msg in &buffer.messages {
            logger.log(msg);
        }
        logger.close();
    }

    print!("{}", render_transcript(&buffer.messages, (&settings).into(), &Local));
    Ok(())
}

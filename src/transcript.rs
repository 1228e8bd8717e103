//! Plain-text rendering of a channel's message list.
//!
//! Mirrors the layout of the graphical message list: each group gets a
//! header with author and time, shrunk messages only contribute their
//! content, and channel notices are drawn as single lines.

use std::fmt::{self, Write};

use chrono::TimeZone;

use crate::buffer::{group_messages, MessageGroup};
use crate::config::Settings;
use crate::message::{Message, MessageType};

/// Indentation of message content under its group header
const CONTENT_INDENT: &str = "    ";

#[derive(Clone, Copy, Debug)]
pub struct TranscriptOptions {
    pub show_timestamps: bool,
    pub group_messages: bool,
}

impl Default for TranscriptOptions {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            group_messages: true,
        }
    }
}

impl From<&Settings> for TranscriptOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            show_timestamps: settings.show_timestamps,
            group_messages: settings.group_messages,
        }
    }
}

/// Render `messages` (oldest first) with header times shown in `tz`.
pub fn render_transcript<Tz>(messages: &[Message], options: TranscriptOptions, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let groups: Vec<MessageGroup<'_>> = if options.group_messages {
        group_messages(messages)
    } else {
        messages.iter().map(MessageGroup::single).collect()
    };

    let mut out = String::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_group(&mut out, group, options, tz).expect("writing to a String cannot fail");
    }
    out
}

fn render_group<Tz>(
    out: &mut String,
    group: &MessageGroup<'_>,
    options: TranscriptOptions,
    tz: &Tz,
) -> fmt::Result
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let head = group.head();

    if group.is_system {
        return writeln!(out, "-- {} --", system_notice(head));
    }

    if options.show_timestamps {
        let local = head.timestamp.with_timezone(tz);
        write!(out, "[{}] ", local.format("%Y-%m-%d %H:%M"))?;
    }
    write!(out, "{}", group.author.display_name())?;
    if group.author.bot {
        write!(out, " [BOT]")?;
    }
    if head.kind == MessageType::Reply {
        write!(out, " ↪ reply")?;
    }
    writeln!(out)?;

    for msg in group.messages() {
        render_content(out, msg)?;
    }
    Ok(())
}

fn render_content(out: &mut String, msg: &Message) -> fmt::Result {
    let mut lines = msg.content.lines().peekable();
    if lines.peek().is_none() {
        // Attachment-only or embed-only messages have no text
        write!(out, "{}(no text)", CONTENT_INDENT)?;
    }
    while let Some(line) = lines.next() {
        write!(out, "{}{}", CONTENT_INDENT, line)?;
        if lines.peek().is_some() {
            writeln!(out)?;
        }
    }
    if msg.is_edited() {
        write!(out, " (edited)")?;
    }
    writeln!(out)
}

/// One-line description of a channel notice
fn system_notice(msg: &Message) -> String {
    let name = msg.author.display_name();
    match msg.kind {
        MessageType::RecipientAdd => format!("{} added someone to the group", name),
        MessageType::RecipientRemove => format!("{} left the group", name),
        MessageType::Call => format!("{} started a call", name),
        MessageType::ChannelNameChange => {
            format!("{} changed the channel name: {}", name, msg.content)
        }
        MessageType::ChannelIconChange => format!("{} changed the channel icon", name),
        MessageType::ChannelPinnedMessage => {
            format!("{} pinned a message to this channel", name)
        }
        MessageType::GuildMemberJoin => format!("{} joined the server", name),
        MessageType::UserPremiumGuildSubscription => format!("{} boosted the server", name),
        MessageType::ChannelFollowAdd => {
            format!("{} added {} to this channel", name, msg.content)
        }
        MessageType::ThreadCreated => format!("{} started a thread: {}", name, msg.content),
        _ => msg.content.clone(),
    }
}

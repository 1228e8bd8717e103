use crate::message::{Message, Snowflake, User};

/// Default number of messages kept in a buffer before trimming
pub const DEFAULT_MAX_MESSAGES: usize = 2000;
/// Number of oldest messages to remove when trimming
pub const BUFFER_TRIM_COUNT: usize = 500;

/// Messages of a single channel, in display order (oldest first)
#[derive(Clone, Debug)]
pub struct ChannelBuffer {
    pub channel_id: Snowflake,
    pub messages: Vec<Message>,
    /// Number of unread messages
    pub unread_count: usize,
    /// Whether an unread message mentions the current user
    pub has_highlight: bool,
    /// Trim threshold, see `add_message`
    pub max_messages: usize,
}

impl ChannelBuffer {
    pub fn new(channel_id: Snowflake) -> Self {
        Self {
            channel_id,
            messages: Vec::new(),
            unread_count: 0,
            has_highlight: false,
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }

    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages.max(1);
        self
    }

    pub fn add_message(&mut self, msg: Message, is_active: bool, current_user: Snowflake) {
        if !is_active {
            self.unread_count += 1;
            if msg.author.id != current_user && msg.mentions_user(current_user) {
                self.has_highlight = true;
            }
        }
        self.messages.push(msg);
        // Trim old messages if buffer gets too large
        if self.messages.len() > self.max_messages {
            let excess = self.messages.len() - self.max_messages;
            let count = excess.max(BUFFER_TRIM_COUNT.min(self.max_messages / 4));
            self.messages.drain(0..count);
            log::debug!("trimmed {} messages from channel {}", count, self.channel_id);
        }
    }

    pub fn clear_unread(&mut self) {
        self.unread_count = 0;
        self.has_highlight = false;
    }

    /// For each message, whether it is drawn without its own header.
    pub fn shrunk_flags(&self) -> Vec<bool> {
        self.messages
            .iter()
            .enumerate()
            .map(|(i, msg)| i > 0 && msg.is_shrunk(&self.messages[i - 1]))
            .collect()
    }

    pub fn groups(&self) -> Vec<MessageGroup<'_>> {
        group_messages(&self.messages)
    }
}

/// Consecutive messages drawn under a single author header
#[derive(Debug)]
pub struct MessageGroup<'a> {
    pub author: &'a User,
    /// Never empty: groups are only built through `single` and extended
    pub(crate) messages: Vec<&'a Message>,
    pub is_system: bool,
}

impl<'a> MessageGroup<'a> {
    pub fn single(msg: &'a Message) -> Self {
        Self {
            author: &msg.author,
            messages: vec![msg],
            is_system: msg.kind.is_system(),
        }
    }

    /// The message that carries the header (author and timestamp).
    pub fn head(&self) -> &'a Message {
        self.messages[0]
    }

    pub fn messages(&self) -> &[&'a Message] {
        &self.messages
    }
}

/// Build the buffer for one channel from a page of history.
///
/// The API returns pages newest first; unless `oldest_first` is set the page
/// is reversed into display order. The channel is taken from the first
/// message in display order and messages from any other channel are skipped.
pub fn load_channel(
    mut messages: Vec<Message>,
    oldest_first: bool,
    max_messages: usize,
) -> ChannelBuffer {
    if !oldest_first {
        messages.reverse();
    }

    let channel_id = messages.first().map(|m| m.channel_id).unwrap_or_default();
    let mut buffer = ChannelBuffer::new(channel_id).with_max_messages(max_messages);
    for msg in messages {
        if msg.channel_id != channel_id {
            log::warn!("skipping message {} from another channel", msg.id);
            continue;
        }
        buffer.add_message(msg, true, Snowflake::default());
    }
    buffer
}

/// Split messages into header groups. A message joins the current group
/// when it is shrunk relative to the message right before it.
pub fn group_messages(messages: &[Message]) -> Vec<MessageGroup<'_>> {
    let mut groups: Vec<MessageGroup<'_>> = Vec::new();

    for msg in messages {
        // The last message of the open group is the one displayed right before `msg`
        match groups.last_mut() {
            Some(group) if group.messages.last().is_some_and(|prev| msg.is_shrunk(prev)) => {
                group.messages.push(msg)
            }
            _ => groups.push(MessageGroup::single(msg)),
        }
    }

    groups
}

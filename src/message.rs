//! Chat message model as delivered by the chat API.
//!
//! Messages, authors and identifiers mirror the JSON payloads of the REST
//! and gateway APIs, so a list fetched from a channel can be decoded directly
//! with [`Message::list_from_json`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Result;
use crate::mention;

/// Maximum gap (in seconds) between two messages from the same author for
/// the later one to be drawn without its own header.
pub const SHRINK_WINDOW_SECONDS: i64 = 400;

/// Milliseconds between the Unix epoch and the first second of 2015,
/// the origin of snowflake timestamps.
const SNOWFLAKE_EPOCH_MS: i64 = 1_420_070_400_000;

/// Unique 64-bit identifier for users, channels and messages.
///
/// On the wire snowflakes are decimal strings so that JavaScript clients do
/// not lose precision; plain numbers are accepted as well.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Snowflake(pub u64);

impl Snowflake {
    /// Creation time encoded in the upper 42 bits.
    pub fn created_at(self) -> Option<DateTime<Utc>> {
        let offset_ms = (self.0 >> 22) as i64;
        DateTime::from_timestamp_millis(SNOWFLAKE_EPOCH_MS + offset_ms)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Snowflake {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Snowflake)
    }
}

impl From<u64> for Snowflake {
    fn from(id: u64) -> Self {
        Snowflake(id)
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            Num(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Str(s) => s.parse().map_err(de::Error::custom),
            Repr::Num(n) => Ok(Snowflake(n)),
        }
    }
}

/// Author of a message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    pub fn new(id: impl Into<Snowflake>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            global_name: None,
            bot: false,
        }
    }

    /// Name shown in message headers: the global display name when set,
    /// otherwise the account username.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

/// Kind of a message, carried as an integer code in the `type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum MessageType {
    Default,
    RecipientAdd,
    RecipientRemove,
    Call,
    ChannelNameChange,
    ChannelIconChange,
    ChannelPinnedMessage,
    GuildMemberJoin,
    UserPremiumGuildSubscription,
    ChannelFollowAdd,
    ThreadCreated,
    Reply,
    ChatInputCommand,
    ThreadStarterMessage,
    ContextMenuCommand,
    AutoModerationAction,
    /// A code this client does not know about. Kept so it survives a
    /// decode/encode cycle.
    Unknown(u8),
}

impl MessageType {
    /// Membership and channel notices, drawn as a single italic line
    /// instead of a regular message.
    pub fn is_system(self) -> bool {
        matches!(
            self,
            MessageType::RecipientAdd
                | MessageType::RecipientRemove
                | MessageType::Call
                | MessageType::ChannelNameChange
                | MessageType::ChannelIconChange
                | MessageType::ChannelPinnedMessage
                | MessageType::GuildMemberJoin
                | MessageType::UserPremiumGuildSubscription
                | MessageType::ChannelFollowAdd
                | MessageType::ThreadCreated
        )
    }
}

impl From<u8> for MessageType {
    fn from(code: u8) -> Self {
        match code {
            0 => MessageType::Default,
            1 => MessageType::RecipientAdd,
            2 => MessageType::RecipientRemove,
            3 => MessageType::Call,
            4 => MessageType::ChannelNameChange,
            5 => MessageType::ChannelIconChange,
            6 => MessageType::ChannelPinnedMessage,
            7 => MessageType::GuildMemberJoin,
            8 => MessageType::UserPremiumGuildSubscription,
            12 => MessageType::ChannelFollowAdd,
            18 => MessageType::ThreadCreated,
            19 => MessageType::Reply,
            20 => MessageType::ChatInputCommand,
            21 => MessageType::ThreadStarterMessage,
            23 => MessageType::ContextMenuCommand,
            24 => MessageType::AutoModerationAction,
            other => MessageType::Unknown(other),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(kind: MessageType) -> Self {
        match kind {
            MessageType::Default => 0,
            MessageType::RecipientAdd => 1,
            MessageType::RecipientRemove => 2,
            MessageType::Call => 3,
            MessageType::ChannelNameChange => 4,
            MessageType::ChannelIconChange => 5,
            MessageType::ChannelPinnedMessage => 6,
            MessageType::GuildMemberJoin => 7,
            MessageType::UserPremiumGuildSubscription => 8,
            MessageType::ChannelFollowAdd => 12,
            MessageType::ThreadCreated => 18,
            MessageType::Reply => 19,
            MessageType::ChatInputCommand => 20,
            MessageType::ThreadStarterMessage => 21,
            MessageType::ContextMenuCommand => 23,
            MessageType::AutoModerationAction => 24,
            MessageType::Unknown(code) => code,
        }
    }
}

/// Pointer from a reply to the message it answers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageReference {
    #[serde(default)]
    pub message_id: Option<Snowflake>,
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

/// A single chat message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub author: User,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default)]
    pub mentions: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReference>,
}

impl Message {
    pub fn new(
        id: impl Into<Snowflake>,
        channel_id: impl Into<Snowflake>,
        author: User,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            author,
            content: content.into(),
            timestamp,
            edited_timestamp: None,
            kind: MessageType::Default,
            mentions: Vec::new(),
            message_reference: None,
        }
    }

    pub fn with_kind(mut self, kind: MessageType) -> Self {
        self.kind = kind;
        self
    }

    /// Turn the message into a reply to `target`.
    pub fn replying_to(mut self, target: &Message) -> Self {
        self.kind = MessageType::Reply;
        self.message_reference = Some(MessageReference {
            message_id: Some(target.id),
            channel_id: Some(target.channel_id),
            guild_id: None,
        });
        self
    }

    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn list_from_json(payload: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Whether this message should be drawn as a continuation of `prev`,
    /// without repeating the author header and timestamp.
    ///
    /// `prev` must be the message displayed immediately before `self`.
    /// Holds when both come from the same author, `prev` is a regular
    /// message or a reply, `self` is a regular message (a reply always
    /// gets its own header), and less than [`SHRINK_WINDOW_SECONDS`]
    /// elapsed between them. The elapsed time is not checked for being
    /// negative, so an out-of-order `prev` still counts as recent.
    pub fn is_shrunk(&self, prev: &Message) -> bool {
        prev.author.id == self.author.id
            && matches!(prev.kind, MessageType::Default | MessageType::Reply)
            && self.kind == MessageType::Default
            && self.timestamp.signed_duration_since(prev.timestamp)
                < Duration::seconds(SHRINK_WINDOW_SECONDS)
    }

    /// Whether the message pings `user_id`, either through the resolved
    /// `mentions` list or through raw `<@id>` markup in the content.
    pub fn mentions_user(&self, user_id: Snowflake) -> bool {
        self.mentions.iter().any(|u| u.id == user_id)
            || mention::mentioned_ids(&self.content).contains(&user_id)
    }

    pub fn is_edited(&self) -> bool {
        self.edited_timestamp.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn msg(author: u64, kind: MessageType, secs: i64) -> Message {
        Message::new(
            secs as u64 + 1,
            10u64,
            User::new(author, format!("user{}", author)),
            "hello",
            at(secs),
        )
        .with_kind(kind)
    }

    #[test]
    fn test_different_author_never_shrunk() {
        let prev = msg(1, MessageType::Default, 0);
        let cur = msg(2, MessageType::Default, 1);
        assert!(!cur.is_shrunk(&prev));
    }

    #[test]
    fn test_shrink_window_is_exclusive() {
        let prev = msg(1, MessageType::Default, 0);
        assert!(msg(1, MessageType::Default, 0).is_shrunk(&prev));
        assert!(msg(1, MessageType::Default, 399).is_shrunk(&prev));
        assert!(!msg(1, MessageType::Default, 400).is_shrunk(&prev));
        assert!(!msg(1, MessageType::Default, 4000).is_shrunk(&prev));
    }

    #[test]
    fn test_shrink_window_sub_second() {
        let prev = msg(1, MessageType::Default, 0);
        let mut cur = msg(1, MessageType::Default, 0);
        cur.timestamp = at(399) + Duration::milliseconds(999);
        assert!(cur.is_shrunk(&prev));
        cur.timestamp = at(400);
        assert!(!cur.is_shrunk(&prev));
    }

    #[test]
    fn test_reply_is_never_shrunk() {
        let prev = msg(1, MessageType::Default, 0);
        let cur = msg(1, MessageType::Reply, 10);
        assert!(!cur.is_shrunk(&prev));
    }

    #[test]
    fn test_message_after_reply_is_shrunk() {
        let prev = msg(1, MessageType::Reply, 0);
        let cur = msg(1, MessageType::Default, 100);
        assert!(cur.is_shrunk(&prev));
    }

    #[test]
    fn test_other_previous_kinds_break_grouping() {
        for kind in [
            MessageType::GuildMemberJoin,
            MessageType::ChannelPinnedMessage,
            MessageType::ChatInputCommand,
            MessageType::ThreadStarterMessage,
            MessageType::Unknown(99),
        ] {
            let prev = msg(1, kind, 0);
            let cur = msg(1, MessageType::Default, 5);
            assert!(!cur.is_shrunk(&prev), "{:?} should not group", kind);
        }
    }

    #[test]
    fn test_other_current_kinds_never_shrunk() {
        for kind in [
            MessageType::GuildMemberJoin,
            MessageType::ChannelPinnedMessage,
            MessageType::ChatInputCommand,
            MessageType::ThreadStarterMessage,
            MessageType::Unknown(99),
        ] {
            let prev = msg(1, MessageType::Default, 0);
            let cur = msg(1, kind, 5);
            assert!(!cur.is_shrunk(&prev), "{:?} should get its own header", kind);
        }
    }

    #[test]
    fn test_negative_elapsed_time_still_groups() {
        let prev = msg(1, MessageType::Default, 1000);
        let cur = msg(1, MessageType::Default, 0);
        assert!(cur.is_shrunk(&prev));
    }

    #[test]
    fn test_decode_api_payload() {
        let payload = r#"{
            "id": "1100000000000000001",
            "channel_id": "900000000000000000",
            "author": {"id": "80351110224678912", "username": "nelly", "global_name": "Nelly"},
            "content": "hi <@!1234>",
            "timestamp": "2023-11-14T22:13:20.123000+00:00",
            "edited_timestamp": null,
            "type": 19,
            "mentions": [],
            "message_reference": {"message_id": "1100000000000000000", "channel_id": "900000000000000000"}
        }"#;
        let message = Message::from_json(payload).unwrap();
        assert_eq!(message.id, Snowflake(1_100_000_000_000_000_001));
        assert_eq!(message.author.display_name(), "Nelly");
        assert_eq!(message.kind, MessageType::Reply);
        assert!(!message.is_edited());
        assert!(message.mentions_user(Snowflake(1234)));
        assert_eq!(
            message.message_reference.unwrap().message_id,
            Some(Snowflake(1_100_000_000_000_000_000))
        );
        assert_eq!(message.timestamp.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_decode_rejects_malformed_payload() {
        assert!(Message::from_json("{\"id\": \"abc\"}").is_err());
        assert!(Message::list_from_json("not json").is_err());
    }

    #[test]
    fn test_snowflake_accepts_numbers_and_encodes_strings() {
        let id: Snowflake = serde_json::from_str("42").unwrap();
        assert_eq!(id, Snowflake(42));
        let id: Snowflake = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
    }

    #[test]
    fn test_snowflake_created_at() {
        // Example from the API documentation.
        let id = Snowflake(175_928_847_299_117_063);
        let created = id.created_at().unwrap();
        assert_eq!(created.timestamp_millis(), 1_462_015_105_796);
    }

    #[test]
    fn test_unknown_message_type_survives_encoding() {
        assert_eq!(MessageType::from(19), MessageType::Reply);
        assert_eq!(MessageType::from(77), MessageType::Unknown(77));
        assert_eq!(u8::from(MessageType::Unknown(77)), 77);
        assert_eq!(serde_json::to_string(&MessageType::Reply).unwrap(), "19");
    }

    #[test]
    fn test_system_kinds() {
        assert!(MessageType::GuildMemberJoin.is_system());
        assert!(MessageType::ChannelPinnedMessage.is_system());
        assert!(!MessageType::Default.is_system());
        assert!(!MessageType::Reply.is_system());
        assert!(!MessageType::Unknown(99).is_system());
    }
}

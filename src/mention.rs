//! User mention markup in message content.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::message::Snowflake;

/// `<@id>` or the legacy nickname form `<@!id>`.
static USER_MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<@!?(\d{1,20})>").expect("mention pattern is valid")
});

/// Collect the ids of users mentioned in `content`, in order of first
/// appearance.
///
/// Ids that do not fit into 64 bits are skipped.
pub fn mentioned_ids(content: &str) -> Vec<Snowflake> {
    let mut ids: Vec<Snowflake> = Vec::new();
    for caps in USER_MENTION.captures_iter(content) {
        let Ok(id) = caps[1].parse::<Snowflake>() else {
            continue;
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

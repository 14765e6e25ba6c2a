use std::collections::HashMap;
use std::ops::Deref;

/// The IRCv3 tags attached to a message, e.g. `badge-info=;color=#FF0000;id=abc`.
///
/// Twitch does not use the backslash-escaping scheme from the IRCv3 spec in practice, so unlike
/// a general-purpose IRC tag parser this does not decode `\:`, `\s`, etc. Values are taken
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IrcTags(HashMap<String, String>);

impl IrcTags {
    pub fn new() -> IrcTags {
        IrcTags(HashMap::new())
    }

    /// Parse the portion of a line following a leading `@`, not including the `@` itself.
    pub fn parse(source: &str) -> IrcTags {
        let mut tags = HashMap::new();
        for pair in source.split(';') {
            if pair.is_empty() {
                continue;
            }
            match pair.split_once('=') {
                Some((key, value)) => {
                    tags.insert(key.to_owned(), value.to_owned());
                }
                None => {
                    tags.insert(pair.to_owned(), String::new());
                }
            }
        }
        IrcTags(tags)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

impl Deref for IrcTags {
    type Target = HashMap<String, String>;

    fn deref(&self) -> &HashMap<String, String> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;

    #[test]
    fn parses_simple_tags() {
        let tags = IrcTags::parse("badge-info=;color=#FF0000;id=abc");
        assert_eq!(
            tags.0,
            hashmap! {
                "badge-info".to_owned() => "".to_owned(),
                "color".to_owned() => "#FF0000".to_owned(),
                "id".to_owned() => "abc".to_owned(),
            }
        );
    }

    #[test]
    fn last_duplicate_key_wins() {
        let tags = IrcTags::parse("id=first;id=second");
        assert_eq!(tags.get("id"), Some("second"));
    }

    #[test]
    fn empty_source_yields_no_tags() {
        let tags = IrcTags::parse("");
        assert!(tags.is_empty());
    }
}

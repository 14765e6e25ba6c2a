/// The "source" part of an IRC message: `:nick!user@host` or just `:host` for server messages.
///
/// Twitch's source field is split on the first `!` or `@` it contains, without regard for which
/// came first; the split pieces fill `(nickname, username, host)` positionally:
/// one piece produces a host-only source, two produce nickname+host, three or more produce
/// nickname+username+host (any further pieces beyond the third are ignored).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Source {
    pub nickname: Option<String>,
    pub username: Option<String>,
    pub host: Option<String>,
}

impl Source {
    /// Parse the portion of a line following a leading `:`, not including the `:` itself.
    pub fn parse(source: &str) -> Source {
        let pieces: Vec<&str> = source.splitn(3, ['!', '@']).collect();
        match pieces.as_slice() {
            [host] => Source {
                nickname: None,
                username: None,
                host: Some((*host).to_owned()),
            },
            [nickname, host] => Source {
                nickname: Some((*nickname).to_owned()),
                username: None,
                host: Some((*host).to_owned()),
            },
            [nickname, username, host, ..] => Source {
                nickname: Some((*nickname).to_owned()),
                username: Some((*username).to_owned()),
                host: Some((*host).to_owned()),
            },
            [] => Source::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_only() {
        let source = Source::parse("tmi.twitch.tv");
        assert_eq!(source.nickname, None);
        assert_eq!(source.username, None);
        assert_eq!(source.host.as_deref(), Some("tmi.twitch.tv"));
    }

    #[test]
    fn nickname_and_host() {
        let source = Source::parse("ronni@ronni.tmi.twitch.tv");
        assert_eq!(source.nickname.as_deref(), Some("ronni"));
        assert_eq!(source.username, None);
        assert_eq!(source.host.as_deref(), Some("ronni.tmi.twitch.tv"));
    }

    #[test]
    fn full_triple() {
        let source = Source::parse("ronni!ronni@ronni.tmi.twitch.tv");
        assert_eq!(source.nickname.as_deref(), Some("ronni"));
        assert_eq!(source.username.as_deref(), Some("ronni"));
        assert_eq!(source.host.as_deref(), Some("ronni.tmi.twitch.tv"));
    }
}

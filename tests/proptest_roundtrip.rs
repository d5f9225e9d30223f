//! Property-based tests for IRC message parsing.
//!
//! Uses the crate's proptest strategies to verify that:
//! 1. Encoded messages decode back to an equal message (roundtrip)
//! 2. Tag values survive escaping whatever they contain
//! 3. The decoder never panics, even on junk
//!
//! Run with: `cargo test --features proptest`

#![cfg(feature = "proptest")]

use proptest::prelude::*;
use slirc_conn::message::tags::{escape_tag_value, unescape_tag_value};
use slirc_conn::strategies::{
    channel, hostname, message, nickname, tag_key, tag_value, text, username,
};
use slirc_conn::{Command, IrcEncode, Message, Prefix};

proptest! {
    /// The fundamental roundtrip property: encode → decode = identity
    #[test]
    fn message_roundtrip(msg in message()) {
        let serialized = msg.to_string();
        let parsed: Message = serialized.parse()
            .expect("Serialized message should be parseable");

        prop_assert_eq!(&msg, &parsed,
            "Roundtrip failed for serialized: {}", serialized);
    }

    /// Re-encoding a decoded message reproduces the same bytes
    #[test]
    fn reencode_is_stable(msg in message()) {
        let first: Message = msg.to_string().parse().expect("first decode");
        let second: Message = first.to_string().parse().expect("second decode");
        prop_assert_eq!(first.to_string(), second.to_string());
    }

    /// unescape(escape(v)) == v for every value without NUL
    #[test]
    fn tag_value_escape_roundtrip(value in tag_value()) {
        let mut escaped = String::new();
        escape_tag_value(&mut escaped, &value).expect("write to String");
        prop_assert!(!escaped.contains(|c: char| matches!(c, ' ' | ';' | '\r' | '\n')));
        prop_assert_eq!(unescape_tag_value(&escaped), value);
    }

    /// Tags should serialize in a way that can be parsed back
    #[test]
    fn tag_in_message_roundtrip(key in tag_key(), value in tag_value()) {
        let msg = Message::ping("test").with_tag(key.clone(), value.clone());

        let parsed: Message = msg.to_string().parse()
            .expect("Tagged message should parse");

        prop_assert!(parsed.tags.has(&key));
        prop_assert_eq!(parsed.tags.get(&key), value.as_str(),
            "Tag value mismatch for key '{}'", key);
    }

    /// PRIVMSG with arbitrary (valid) content should roundtrip
    #[test]
    fn privmsg_roundtrip(
        nick in nickname(),
        user in username(),
        host in hostname(),
        target in channel(),
        body in text()
    ) {
        let msg = Message::privmsg(target.clone(), body.clone())
            .with_source(Prefix::new(nick.clone(), user, host));

        let parsed: Message = msg.to_string().parse()
            .expect("PRIVMSG should parse");

        prop_assert_eq!(&parsed.command, &Command::PRIVMSG);
        prop_assert_eq!(parsed.target().expect("PRIVMSG has a target"), target.as_str());
        prop_assert_eq!(parsed.text().expect("PRIVMSG has text"), body.as_str());
        prop_assert_eq!(&parsed.source.nick, &nick);
    }

    /// Decoding arbitrary input returns instead of panicking
    #[test]
    fn parse_never_panics(line in "[^\r\n]{0,600}") {
        let _ = line.parse::<Message>();
    }

    /// Constructed messages carry no source on the wire
    #[test]
    fn constructed_messages_omit_source(target in channel(), body in text()) {
        let bytes = Message::notice(target, body).to_bytes().expect("encodes");
        prop_assert!(bytes.starts_with(b"NOTICE "));
    }
}

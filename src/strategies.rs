//! Proptest strategies for IRC components.
//!
//! Every generated [`Message`] encodes without error and decodes back to an
//! equal message, which makes these handy for testing code layered on top of
//! the codec.
//!
//! Enable with the `proptest` feature.

use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;
use proptest::string::string_regex;

use crate::message::Message;
use crate::prefix::Prefix;

/// Nicknames: no `.`, `!`, `@` or space, and never a leading `:`.
pub fn nickname() -> impl Strategy<Value = String> {
    string_regex("[a-zA-Z\\[\\]\\\\^_`{|}][a-zA-Z0-9\\-\\[\\]\\\\^_`{|}]{0,15}").expect("valid regex")
}

pub fn username() -> impl Strategy<Value = String> {
    string_regex("~?[a-zA-Z][a-zA-Z0-9]{0,9}").expect("valid regex")
}

pub fn hostname() -> impl Strategy<Value = String> {
    string_regex("[a-z0-9]+(\\.[a-z0-9]+){0,3}").expect("valid regex")
}

/// Server names always contain a dot; without one they would decode as a
/// nickname.
pub fn server_name() -> impl Strategy<Value = String> {
    string_regex("[a-z]+(\\.[a-z]+){1,3}").expect("valid regex")
}

pub fn channel() -> impl Strategy<Value = String> {
    string_regex("[#&][a-zA-Z0-9_\\-]{1,49}").expect("valid regex")
}

/// Free text for a trailing parameter; may be empty and may contain spaces
/// and colons.
pub fn text() -> impl Strategy<Value = String> {
    string_regex("[^\r\n\0]{0,200}").expect("valid regex")
}

/// A middle parameter.
pub fn word() -> impl Strategy<Value = String> {
    string_regex("[^\r\n\0 :][^\r\n\0 ]{0,20}").expect("valid regex")
}

pub fn tag_key() -> impl Strategy<Value = String> {
    string_regex("\\+?([a-z0-9.\\-]+/)?[a-zA-Z][a-zA-Z0-9\\-]{0,20}").expect("valid regex")
}

/// Tag values, including the characters that need escaping.
pub fn tag_value() -> impl Strategy<Value = String> {
    string_regex("[^\0]{0,60}").expect("valid regex")
}

pub fn prefix() -> impl Strategy<Value = Prefix> {
    prop_oneof![
        server_name().prop_map(Prefix::server),
        nickname().prop_map(|nick| Prefix::new(nick, "", "")),
        (nickname(), username(), hostname())
            .prop_map(|(nick, user, host)| Prefix::new(nick, user, host)),
    ]
}

/// Upper-case verbs and three-digit numerics.
pub fn command() -> impl Strategy<Value = String> {
    prop_oneof![
        string_regex("[A-Z]{3,12}").expect("valid regex"),
        string_regex("[0-9]{3}").expect("valid regex"),
    ]
}

/// Up to fourteen middle parameters and an optional trailing one.
pub fn params() -> impl Strategy<Value = Vec<String>> {
    (vec(word(), 0..14), option::of(text())).prop_map(|(mut params, trailing)| {
        params.extend(trailing);
        params
    })
}

pub fn message() -> impl Strategy<Value = Message> {
    (
        vec((tag_key(), tag_value()), 0..5),
        option::of(prefix()),
        command(),
        params(),
    )
        .prop_map(|(tags, source, command, params)| {
            let mut msg = Message::new(command, params);
            msg.tags = tags.into_iter().collect();
            match source {
                Some(source) => msg.with_source(source),
                None => msg,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::IrcEncode;

    proptest! {
        #[test]
        fn generated_messages_encode(msg in message()) {
            prop_assert!(msg.to_bytes().is_ok());
        }

        #[test]
        fn generated_prefixes_keep_their_shape(p in prefix()) {
            prop_assert_eq!(Prefix::parse(&p.to_string()), p);
        }
    }
}

use std::time::Duration;

use crate::util::MAX_INBOUND_LINE;

/// Default user name when none is configured.
pub const DEFAULT_USERNAME: &str = "guest";
/// Default real name when none is configured.
pub const DEFAULT_REALNAME: &str = "...";
/// Reason sent with the QUIT written on shutdown.
pub const DEFAULT_QUIT_MESSAGE: &str = "closing link";

/// Connection settings for a [`Client`](super::Client).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    /// Server address as `host:port`. Unused when a custom dialer is set,
    /// apart from naming the server before it identifies itself.
    pub addr: String,
    /// Nickname to register with (required).
    pub nickname: String,
    /// User name. Defaults to `guest` when empty.
    pub username: String,
    /// Real name / GECOS. Defaults to `...` when empty.
    pub realname: String,
    /// Connection password, if the network needs one.
    pub password: Option<String>,
    /// Capabilities to request when the server advertises them.
    pub request_caps: Vec<String>,
    /// Silence on the connection before a liveness probe is sent.
    pub idle_timeout: Duration,
    /// How long a liveness probe may go unanswered.
    pub ping_timeout: Duration,
    /// How long to wait for the server to close the link after QUIT.
    pub quit_grace: Duration,
    /// QUIT reason used on shutdown.
    pub quit_message: String,
    /// Longest inbound line accepted, terminator included.
    pub max_line_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            addr: String::new(),
            nickname: String::new(),
            username: String::new(),
            realname: String::new(),
            password: None,
            request_caps: Vec::new(),
            idle_timeout: Duration::from_secs(120),
            ping_timeout: Duration::from_secs(10),
            quit_grace: Duration::from_secs(3),
            quit_message: DEFAULT_QUIT_MESSAGE.to_owned(),
            max_line_len: MAX_INBOUND_LINE,
        }
    }
}

impl ClientConfig {
    /// Settings for `nickname` on `addr`, everything else defaulted.
    pub fn new(addr: impl Into<String>, nickname: impl Into<String>) -> Self {
        ClientConfig {
            addr: addr.into(),
            nickname: nickname.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    #[must_use]
    pub fn with_realname(mut self, realname: impl Into<String>) -> Self {
        self.realname = realname.into();
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Capabilities to request during negotiation.
    #[must_use]
    pub fn with_caps<I, S>(mut self, caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request_caps = caps.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_quit_grace(mut self, grace: Duration) -> Self {
        self.quit_grace = grace;
        self
    }

    #[must_use]
    pub fn with_quit_message(mut self, message: impl Into<String>) -> Self {
        self.quit_message = message.into();
        self
    }

    #[must_use]
    pub fn with_max_line_len(mut self, len: usize) -> Self {
        self.max_line_len = len;
        self
    }

    pub(crate) fn username_or_default(&self) -> &str {
        if self.username.is_empty() {
            DEFAULT_USERNAME
        } else {
            &self.username
        }
    }

    pub(crate) fn realname_or_default(&self) -> &str {
        if self.realname.is_empty() {
            DEFAULT_REALNAME
        } else {
            &self.realname
        }
    }

    /// Host part of `addr`, used as the server name until 004 arrives.
    pub(crate) fn server_host(&self) -> &str {
        let addr = self.addr.as_str();
        if let Some(rest) = addr.strip_prefix('[') {
            return rest.split(']').next().unwrap_or(rest);
        }
        match addr.rsplit_once(':') {
            Some((host, _)) if !host.contains(':') => host,
            _ => addr,
        }
    }
}

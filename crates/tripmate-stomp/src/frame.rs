// tripmate/tripmate-stomp
//
// Copyright: 2023, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

//! STOMP 1.2 text frames.
//!
//! A frame is a command line, a block of `name:value` header lines, an empty
//! line, an optional body and a terminating NUL octet. A lone EOL outside of
//! a frame is a heart-beat.

use std::fmt::Write;
use std::time::Duration;

use strum_macros::{Display, EnumString};

pub const ACCEPT_VERSION: &str = "1.2";

pub mod header {
    pub const ACCEPT_VERSION: &str = "accept-version";
    pub const ACK: &str = "ack";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const CONTENT_LENGTH: &str = "content-length";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const DESTINATION: &str = "destination";
    pub const HEART_BEAT: &str = "heart-beat";
    pub const HOST: &str = "host";
    pub const ID: &str = "id";
    pub const MESSAGE: &str = "message";
    pub const MESSAGE_ID: &str = "message-id";
    pub const SUBSCRIPTION: &str = "subscription";
    pub const VERSION: &str = "version";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Connect,
    Stomp,
    Connected,
    Send,
    Subscribe,
    Unsubscribe,
    Ack,
    Nack,
    Begin,
    Commit,
    Abort,
    Disconnect,
    Message,
    Receipt,
    Error,
}

impl Command {
    /// CONNECT and CONNECTED frames carry their headers unescaped for
    /// backwards compatibility with STOMP 1.0.
    fn escapes_headers(&self) -> bool {
        !matches!(self, Command::Connect | Command::Connected)
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum FrameError {
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),
    #[error("Malformed header line '{0}'")]
    MalformedHeader(String),
    #[error("Invalid escape sequence in '{0}'")]
    InvalidEscape(String),
    #[error("Invalid content-length '{0}'")]
    InvalidContentLength(String),
    #[error("Frame is not terminated by a NUL octet")]
    Unterminated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Frame {
            command,
            headers: vec![],
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the value of the first header named `name`. Repeated headers
    /// are legal in STOMP 1.2, only the first occurrence is significant.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl Frame {
    pub fn connect(host: &str, heart_beat: HeartBeat, authorization: Option<&str>) -> Self {
        let mut frame = Frame::new(Command::Connect)
            .with_header(header::ACCEPT_VERSION, ACCEPT_VERSION)
            .with_header(header::HOST, host)
            .with_header(header::HEART_BEAT, heart_beat.to_header_value());

        if let Some(authorization) = authorization {
            frame = frame.with_header(header::AUTHORIZATION, authorization);
        }
        frame
    }

    pub fn subscribe(id: &str, destination: &str) -> Self {
        Frame::new(Command::Subscribe)
            .with_header(header::ID, id)
            .with_header(header::DESTINATION, destination)
            .with_header(header::ACK, "auto")
    }

    pub fn unsubscribe(id: &str) -> Self {
        Frame::new(Command::Unsubscribe).with_header(header::ID, id)
    }

    pub fn send(destination: &str, body: impl Into<String>) -> Self {
        let body = body.into();
        Frame::new(Command::Send)
            .with_header(header::DESTINATION, destination)
            .with_header(header::CONTENT_TYPE, "application/json")
            .with_header(header::CONTENT_LENGTH, body.len().to_string())
            .with_body(body)
    }

    pub fn disconnect() -> Self {
        Frame::new(Command::Disconnect)
    }
}

impl Frame {
    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());

        out.push_str(&self.command.to_string());
        out.push('\n');

        for (name, value) in &self.headers {
            if escape {
                _ = write!(out, "{}:{}\n", escape_header(name), escape_header(value));
            } else {
                _ = write!(out, "{}:{}\n", name, value);
            }
        }

        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Decodes a single frame. Returns `Ok(None)` if `input` only consists of
    /// heart-beat EOLs.
    pub fn decode(input: &str) -> Result<Option<Frame>, FrameError> {
        let input = input.trim_start_matches(['\r', '\n']);
        if input.is_empty() {
            return Ok(None);
        }

        let (command_line, mut rest) = split_line(input);
        let command = command_line
            .parse::<Command>()
            .map_err(|_| FrameError::UnknownCommand(command_line.to_string()))?;
        let unescape = command.escapes_headers();

        let mut headers = vec![];
        loop {
            if rest.is_empty() {
                return Err(FrameError::Unterminated);
            }

            let (line, remainder) = split_line(rest);
            rest = remainder;

            if line.is_empty() {
                break;
            }

            let Some((name, value)) = line.split_once(':') else {
                return Err(FrameError::MalformedHeader(line.to_string()));
            };

            if unescape {
                headers.push((unescape_header(name)?, unescape_header(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let mut frame = Frame {
            command,
            headers,
            body: String::new(),
        };

        let body = match frame.header(header::CONTENT_LENGTH) {
            Some(length) => {
                let length = length
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| FrameError::InvalidContentLength(length.to_string()))?;
                let body = rest
                    .get(..length)
                    .ok_or_else(|| FrameError::InvalidContentLength(length.to_string()))?;
                if !rest[length..].starts_with('\0') {
                    return Err(FrameError::Unterminated);
                }
                body
            }
            None => {
                let Some(end) = rest.find('\0') else {
                    return Err(FrameError::Unterminated);
                };
                &rest[..end]
            }
        };

        frame.body = body.to_string();
        Ok(Some(frame))
    }
}

/// The `heart-beat` header value: `<outgoing>,<incoming>` in milliseconds.
/// Zero means "cannot send" respectively "does not want to receive".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeartBeat {
    pub outgoing: Duration,
    pub incoming: Duration,
}

impl HeartBeat {
    pub fn new(outgoing: Duration, incoming: Duration) -> Self {
        HeartBeat { outgoing, incoming }
    }

    pub fn to_header_value(&self) -> String {
        format!(
            "{},{}",
            self.outgoing.as_millis(),
            self.incoming.as_millis()
        )
    }

    pub fn parse(value: &str) -> Option<Self> {
        let (outgoing, incoming) = value.split_once(',')?;
        Some(HeartBeat {
            outgoing: Duration::from_millis(outgoing.trim().parse().ok()?),
            incoming: Duration::from_millis(incoming.trim().parse().ok()?),
        })
    }

    /// Combines our settings with the server's `heart-beat` from CONNECTED.
    /// The result describes what we send and what we expect to receive.
    pub fn negotiate(&self, server: &HeartBeat) -> HeartBeat {
        fn combine(ours: Duration, theirs: Duration) -> Duration {
            if ours.is_zero() || theirs.is_zero() {
                Duration::ZERO
            } else {
                ours.max(theirs)
            }
        }

        HeartBeat {
            outgoing: combine(self.outgoing, server.incoming),
            incoming: combine(self.incoming, server.outgoing),
        }
    }
}

fn split_line(input: &str) -> (&str, &str) {
    match input.find('\n') {
        Some(idx) => {
            let line = &input[..idx];
            (line.strip_suffix('\r').unwrap_or(line), &input[idx + 1..])
        }
        None => (input, ""),
    }
}

fn escape_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_header(value: &str) -> Result<String, FrameError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            _ => return Err(FrameError::InvalidEscape(value.to_string())),
        }
    }

    Ok(out)
}

use crate::helpers::{send_response, ControlWriter};
use log::warn;

/// One framed command line: upper-cased verb, untouched argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub verb: String,
    pub arg: String,
}

/// Telnet IAC sequences are not valid UTF-8 and decode to U+FFFD.
fn is_telnet_noise(c: char) -> bool {
    c == char::REPLACEMENT_CHARACTER || c.is_whitespace() || c.is_ascii_control()
}

/// Splits a raw control line into `(verb, argument)`. Leading Telnet noise
/// (e.g. the IAC IP/DM sequence some clients put before ABOR) is skipped;
/// anything else, including a verb that is not a word, is passed on as is.
/// Returns `None` only for blank lines.
pub fn parse_command_line(line: &str) -> Option<Request> {
    let line = line
        .trim_end_matches(['\r', '\n'])
        .trim_start_matches(is_telnet_noise);
    if line.is_empty() {
        return None;
    }

    let (verb, arg) = line.split_once(' ').unwrap_or((line, ""));
    Some(Request {
        verb: verb.to_ascii_uppercase(),
        arg: arg.to_string(),
    })
}

/// Replies 501 and returns `false` when a required argument is missing.
pub async fn ensure_argument(
    writer: &ControlWriter,
    verb: &str,
    arg: &str,
) -> Result<bool, std::io::Error> {
    if arg.trim().is_empty() {
        warn!("{} command received with no arguments", verb);
        send_response(writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
        return Ok(false);
    }
    Ok(true)
}

/// Quotes a path for 257 replies, doubling embedded quotes.
pub fn quote_path(path: &str) -> String {
    format!("\"{}\"", path.replace('"', "\"\""))
}

use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use log::{info, warn};
use regex::Regex;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;

fn port_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3})$").ok()
        })
        .as_ref()
}

/// Parses `h1,h2,h3,h4,p1,p2` into `h1.h2.h3.h4:(p1 << 8) + p2`.
pub fn parse_port_argument(arg: &str) -> Option<SocketAddr> {
    let captures = port_pattern()?.captures(arg.trim())?;
    let mut octets = [0u8; 6];
    for (i, octet) in octets.iter_mut().enumerate() {
        *octet = captures[i + 1].parse().ok()?;
    }

    let ip = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
    let port = (octets[4] as u16) << 8 | octets[5] as u16;
    Some(SocketAddr::V4(SocketAddrV4::new(ip, port)))
}

/// Handles the PORT (Active Mode) FTP command.
///
/// Only records where the client listens; the data connection itself is
/// opened by the command that needs it.
pub async fn handle_port_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let Some(endpoint) = parse_port_argument(&arg) else {
        warn!("Invalid PORT argument: {}", arg);
        return send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await;
    };

    info!("Received PORT command with endpoint: {}", endpoint);
    session.lock().await.state.data_endpoint = Some(endpoint);

    let response = format!("200 PORT command successful ({}).\r\n", endpoint);
    send_response(&writer, response.as_bytes()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_argument() {
        let endpoint = parse_port_argument("127,0,0,1,100,1").unwrap();
        assert_eq!(endpoint, "127.0.0.1:25601".parse().unwrap());

        let endpoint = parse_port_argument("192,168,1,20,0,21").unwrap();
        assert_eq!(endpoint, "192.168.1.20:21".parse().unwrap());
    }

    #[test]
    fn test_parse_port_rejects_malformed() {
        for arg in [
            "",
            "127,0,0,1,100",
            "127,0,0,1,100,1,5",
            "256,0,0,1,100,1",
            "127,0,0,1,100,300",
            "127.0.0.1,100,1",
            "a,b,c,d,e,f",
            "+1,0,0,1,100,1",
            "1234,0,0,1,1,1",
        ] {
            assert!(parse_port_argument(arg).is_none(), "{:?}", arg);
        }
    }
}

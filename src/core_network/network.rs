use crate::config::Config;
use crate::constants::{COMMAND_QUEUE_DEPTH, MAX_COMMAND_LINE};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::handlers::{initialize_command_handlers, CommandHandler};
use crate::core_ftpcommand::utils::{parse_command_line, Request};
use crate::helpers::{control_writer, load_banner, send_response, ControlWriter};
use crate::session::Session;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};

/// Everything a connection needs that is shared server-wide.
struct ServerContext {
    config: Arc<Config>,
    handlers: HashMap<FtpCommand, CommandHandler>,
    root: PathBuf,
    banner: Option<String>,
}

pub async fn start_server(config: Arc<Config>, root: PathBuf) -> Result<()> {
    let address = format!(
        "{}:{}",
        config.server.listen_address, config.server.listen_port
    );
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind control listener on {}", address))?;
    info!("Server listening on {}", address);

    serve(listener, config, root).await
}

/// Accepts control connections on `listener` forever, one task per client.
pub async fn serve(listener: TcpListener, config: Arc<Config>, root: PathBuf) -> Result<()> {
    let banner = config
        .server
        .banner_file
        .as_deref()
        .and_then(|path| match load_banner(Path::new(path)) {
            Ok(banner) => Some(banner),
            Err(e) => {
                warn!("Greeting without banner: {:#}", e);
                None
            }
        });

    let context = Arc::new(ServerContext {
        config,
        handlers: initialize_command_handlers(),
        root,
        banner,
    });

    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        info!("New connection from {:?}", addr);

        let context = Arc::clone(&context);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, context).await {
                error!("Connection error: {:?}", e);
            }
            info!("Connection closed for {:?}", addr);
        });
    }
}

fn greeting(banner: Option<&str>) -> String {
    let mut response = String::new();
    if let Some(banner) = banner {
        for line in banner.lines() {
            response.push_str(&format!("220-{}\r\n", line));
        }
    }
    response.push_str("220 Service ready for new user.\r\n");
    response
}

/// Drives one control connection.
///
/// A reader task frames command lines and queues them; this task executes
/// them strictly one at a time, so a command never starts before the previous
/// one (transfer included) has replied. ABOR is the exception: the reader
/// interrupts the running transfer as soon as it sees one, then queues it like
/// any other command.
async fn handle_connection(socket: TcpStream, context: Arc<ServerContext>) -> Result<()> {
    let (read_half, write_half) = socket.into_split();
    let writer = control_writer(write_half);
    let session = Arc::new(Mutex::new(Session::new(context.root.clone())));

    send_response(&writer, greeting(context.banner.as_deref()).as_bytes()).await?;

    let (queue, mut requests) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let reader = tokio::spawn(read_commands(read_half, Arc::clone(&session), queue));

    let result = process_requests(&mut requests, &writer, &session, &context).await;

    reader.abort();
    if session.lock().await.abort_transfer() {
        debug!("Aborted transfer left running at disconnect");
    }
    if let Err(e) = writer.lock().await.shutdown().await {
        debug!("Control connection already closed: {}", e);
    }
    result
}

async fn read_commands(
    read_half: OwnedReadHalf,
    session: Arc<Mutex<Session>>,
    queue: mpsc::Sender<Request>,
) {
    let mut reader = BufReader::new(read_half);
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = (&mut reader)
            .take(MAX_COMMAND_LINE as u64)
            .read_until(b'\n', &mut line)
            .await;
        let n = match read {
            Ok(0) => {
                info!("Client disconnected");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                warn!("Failed to read from control connection: {}", e);
                break;
            }
        };
        if n >= MAX_COMMAND_LINE && line.last() != Some(&b'\n') {
            warn!("Command line exceeds {} bytes, dropping client", MAX_COMMAND_LINE);
            break;
        }

        let Some(request) = parse_command_line(&String::from_utf8_lossy(&line)) else {
            continue;
        };
        if request.verb == "ABOR" && session.lock().await.interrupt_transfer() {
            info!("ABOR received, interrupting active transfer");
        }
        // A full queue blocks further reads; ABOR is checked above first.
        if queue.send(request).await.is_err() {
            break;
        }
    }

    // Nobody is left to read the outcome of a running transfer.
    session.lock().await.interrupt_transfer();
}

async fn process_requests(
    requests: &mut mpsc::Receiver<Request>,
    writer: &ControlWriter,
    session: &Arc<Mutex<Session>>,
    context: &ServerContext,
) -> Result<()> {
    while let Some(Request { verb, arg }) = requests.recv().await {
        if verb == "PASS" {
            info!("Received command: PASS ****");
        } else {
            info!("Received command: {} {}", verb, arg);
        }

        let command = FtpCommand::from_str(&verb);
        if command != Some(FtpCommand::RNTO) {
            session.lock().await.state.rename_from = None;
        }

        match command.and_then(|command| context.handlers.get(&command)) {
            Some(handler) => {
                handler(
                    Arc::clone(writer),
                    Arc::clone(&context.config),
                    Arc::clone(session),
                    arg,
                )
                .await
                .with_context(|| format!("Error handling command {}", verb))?;
            }
            None => {
                warn!("Unknown command: {}", verb);
                let response = format!("502 Command '{}' not implemented.\r\n", verb);
                send_response(writer, response.as_bytes()).await?;
            }
        }

        if command == Some(FtpCommand::QUIT) {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::net::tcp::OwnedWriteHalf;

    struct Client {
        reader: BufReader<OwnedReadHalf>,
        writer: OwnedWriteHalf,
    }

    impl Client {
        async fn connect(addr: SocketAddr) -> Self {
            let stream = TcpStream::connect(addr).await.unwrap();
            let (read_half, writer) = stream.into_split();
            let mut client = Client {
                reader: BufReader::new(read_half),
                writer,
            };
            assert!(client.reply().await.starts_with("220 "));
            client
        }

        async fn reply(&mut self) -> String {
            let mut line = String::new();
            self.reader.read_line(&mut line).await.unwrap();
            line
        }

        async fn send(&mut self, line: &str) {
            self.writer
                .write_all(format!("{}\r\n", line).as_bytes())
                .await
                .unwrap();
        }

        async fn command(&mut self, line: &str) -> String {
            self.send(line).await;
            self.reply().await
        }
    }

    async fn spawn_server(root: &Path) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let root = root.canonicalize().unwrap();
        tokio::spawn(serve(listener, Arc::new(Config::default()), root));
        addr
    }

    fn port_argument(addr: SocketAddr) -> String {
        format!("127,0,0,1,{},{}", addr.port() >> 8, addr.port() & 0xff)
    }

    #[test]
    fn test_greeting_with_banner() {
        assert_eq!(greeting(None), "220 Service ready for new user.\r\n");
        assert_eq!(
            greeting(Some("Welcome\nto the sandbox\n")),
            "220-Welcome\r\n220-to the sandbox\r\n220 Service ready for new user.\r\n"
        );
    }

    #[tokio::test]
    async fn test_login_sequence() {
        let tmp = tempfile::tempdir().unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        assert!(client.command("PASS secret").await.starts_with("503"));
        assert!(client.command("USER anonymous").await.starts_with("331"));
        assert!(client.command("PASS secret").await.starts_with("230"));
        assert!(client.command("SYST").await.starts_with("215 UNIX Type: L8"));
        assert!(client.command("noop").await.starts_with("200"));
        assert_eq!(client.command("PWD").await, "257 \"/\" is the current directory.\r\n");
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let tmp = tempfile::tempdir().unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        assert_eq!(
            client.command("PASV").await,
            "502 Command 'PASV' not implemented.\r\n"
        );
        assert!(client.command("NOOP").await.starts_with("200"));
    }

    #[tokio::test]
    async fn test_feat_multiline_reply() {
        let tmp = tempfile::tempdir().unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        assert_eq!(client.command("FEAT").await, "211-Features\r\n");
        let mut features = Vec::new();
        loop {
            let line = client.reply().await;
            if line.starts_with("211 ") {
                break;
            }
            features.push(line.trim_end().to_string());
        }
        assert!(features.contains(&"UTF8".to_string()));
        assert!(features.contains(&"REST STREAM".to_string()));
    }

    #[tokio::test]
    async fn test_data_commands_require_port() {
        let tmp = tempfile::tempdir().unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        assert!(client.command("LIST").await.starts_with("503"));
        assert!(client.command("RETR file.txt").await.starts_with("503"));
        assert!(client.command("STOR file.txt").await.starts_with("503"));
        assert!(!tmp.path().join("file.txt").exists());
    }

    #[tokio::test]
    async fn test_directory_navigation() {
        let tmp = tempfile::tempdir().unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        assert!(client.command("MKD sub").await.starts_with("257"));
        assert!(client.command("CWD sub").await.starts_with("250"));
        assert!(client.command("PWD").await.starts_with("257 \"/sub\""));
        assert!(client.command("CDUP").await.starts_with("250"));
        assert!(client.command("PWD").await.starts_with("257 \"/\""));
        assert!(client.command("CWD ..").await.starts_with("250"));
        assert!(client.command("PWD").await.starts_with("257 \"/\""));
        assert!(client.command("CWD ../../etc").await.starts_with("550"));
        assert!(client.command("CWD").await.starts_with("501"));
        assert!(client.command("RMD sub").await.starts_with("250"));
        assert!(!tmp.path().join("sub").exists());
    }

    #[tokio::test]
    async fn test_rename_sequence() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("old.txt"), b"data").unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        assert!(client.command("RNTO new.txt").await.starts_with("503"));
        assert!(client.command("RNFR old.txt").await.starts_with("350"));
        assert!(client.command("RNTO new.txt").await.starts_with("250"));
        assert!(client.command("DELE old.txt").await.starts_with("550"));
        assert!(tmp.path().join("new.txt").exists());

        assert!(client.command("RNFR new.txt").await.starts_with("350"));
        assert!(client.command("NOOP").await.starts_with("200"));
        assert!(client.command("RNTO other.txt").await.starts_with("503"));
        assert!(client.command("RNFR missing.txt").await.starts_with("550"));
    }

    #[tokio::test]
    async fn test_list_connect_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed_addr = closed.local_addr().unwrap();
        drop(closed);

        let port = format!("PORT {}", port_argument(closed_addr));
        assert!(client.command(&port).await.starts_with("200"));
        assert!(client.command("LIST").await.starts_with("425"));
        assert!(client.command("NOOP").await.starts_with("200"));
    }

    #[tokio::test]
    async fn test_list_over_data_connection() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("café.txt"), b"12345").unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;
        let data = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let port = format!("PORT {}", port_argument(data.local_addr().unwrap()));
        assert!(client.command(&port).await.starts_with("200"));
        assert!(client.command("LIST").await.starts_with("150"));
        let (mut stream, _) = data.accept().await.unwrap();
        let mut listing = Vec::new();
        stream.read_to_end(&mut listing).await.unwrap();
        assert!(client.reply().await.starts_with("250"));

        let listing = String::from_utf8(listing).unwrap();
        assert!(listing.starts_with("-"));
        assert!(listing.ends_with(" caf?.txt\r\n"));

        assert!(client.command("OPTS UTF8 ON").await.starts_with("200"));
        assert!(client.command("LIST").await.starts_with("150"));
        let (mut stream, _) = data.accept().await.unwrap();
        let mut listing = Vec::new();
        stream.read_to_end(&mut listing).await.unwrap();
        assert!(client.reply().await.starts_with("250"));
        assert!(String::from_utf8(listing).unwrap().ends_with(" café.txt\r\n"));
    }

    #[tokio::test]
    async fn test_retr_with_restart_offset() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("hello.txt"), b"hello world").unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;
        let data = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let port = format!("PORT {}", port_argument(data.local_addr().unwrap()));
        assert!(client.command(&port).await.starts_with("200"));
        assert!(client.command("TYPE I").await.starts_with("200"));
        assert!(client.command("REST 6").await.starts_with("350"));
        assert!(client.command("RETR hello.txt").await.starts_with("150"));

        let (mut stream, _) = data.accept().await.unwrap();
        let mut received = Vec::new();
        stream.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"world");
        assert!(client.reply().await.starts_with("226"));

        // The offset applies to one RETR only.
        assert!(client.command("RETR hello.txt").await.starts_with("150"));
        let (mut stream, _) = data.accept().await.unwrap();
        let mut received = Vec::new();
        stream.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"hello world");
        assert!(client.reply().await.starts_with("226"));

        assert!(client.command("RETR missing.txt").await.starts_with("550"));
    }

    #[tokio::test]
    async fn test_stor_and_appe() {
        let tmp = tempfile::tempdir().unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;
        let data = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let port = format!("PORT {}", port_argument(data.local_addr().unwrap()));
        assert!(client.command(&port).await.starts_with("200"));

        for (verb, payload) in [("STOR", &b"first"[..]), ("APPE", &b" second"[..])] {
            let command = format!("{} upload.txt", verb);
            assert!(client.command(&command).await.starts_with("150"));
            let (mut stream, _) = data.accept().await.unwrap();
            stream.write_all(payload).await.unwrap();
            stream.shutdown().await.unwrap();
            drop(stream);
            assert!(client.reply().await.starts_with("226"));
        }

        let stored = std::fs::read(tmp.path().join("upload.txt")).unwrap();
        assert_eq!(stored, b"first second");
        assert_eq!(client.command("SIZE upload.txt").await, "213 12\r\n");
    }

    #[tokio::test]
    async fn test_abor_interrupts_running_transfer() {
        let tmp = tempfile::tempdir().unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;
        let data = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let port = format!("PORT {}", port_argument(data.local_addr().unwrap()));
        assert!(client.command(&port).await.starts_with("200"));
        assert!(client.command("STOR stalled.txt").await.starts_with("150"));

        // The client never sends data; only ABOR can end this transfer.
        let (_stream, _) = data.accept().await.unwrap();
        let outcome = tokio::time::timeout(Duration::from_secs(5), async {
            client.send("ABOR").await;
            (client.reply().await, client.reply().await)
        })
        .await
        .unwrap();
        assert!(outcome.0.starts_with("426"));
        assert!(outcome.1.starts_with("226"));

        assert!(client.command("ABOR").await.starts_with("226"));
        assert!(client.command("NOOP").await.starts_with("200"));
    }

    #[tokio::test]
    async fn test_rein_resets_session() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        assert!(client.command("USER anonymous").await.starts_with("331"));
        assert!(client.command("PORT 127,0,0,1,100,1").await.starts_with("200"));
        assert!(client.command("CWD sub").await.starts_with("250"));
        assert!(client.command("REIN").await.starts_with("220"));
        assert!(client.command("PWD").await.starts_with("257 \"/\""));
        assert!(client.command("LIST").await.starts_with("503"));
        assert!(client.command("PASS secret").await.starts_with("503"));
    }

    #[tokio::test]
    async fn test_quit_closes_connection() {
        let tmp = tempfile::tempdir().unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        assert!(client.command("QUIT").await.starts_with("221"));
        let mut rest = String::new();
        let n = client.reader.read_line(&mut rest).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_oversized_line_drops_connection() {
        let tmp = tempfile::tempdir().unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        let long = format!("CWD {}", "a".repeat(MAX_COMMAND_LINE));
        client.send(&long).await;
        let mut rest = String::new();
        let n = client.reader.read_line(&mut rest).await.unwrap_or(0);
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_malformed_verbs_are_not_executed() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("victim.txt"), b"data").unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        assert_eq!(
            client.command("9DELE victim.txt").await,
            "502 Command '9DELE' not implemented.\r\n"
        );
        assert!(tmp.path().join("victim.txt").exists());

        for line in ["123", "$$"] {
            client.send(line).await;
            let reply = tokio::time::timeout(Duration::from_secs(2), client.reply())
                .await
                .unwrap();
            assert!(reply.starts_with("502"), "{:?} -> {:?}", line, reply);
        }
        assert!(client.command("NOOP").await.starts_with("200"));
    }

    #[tokio::test]
    async fn test_failed_stor_keeps_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("keep.txt"), b"precious").unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed_addr = closed.local_addr().unwrap();
        drop(closed);

        let port = format!("PORT {}", port_argument(closed_addr));
        assert!(client.command(&port).await.starts_with("200"));
        assert!(client.command("STOR keep.txt").await.starts_with("425"));
        assert_eq!(std::fs::read(tmp.path().join("keep.txt")).unwrap(), b"precious");

        assert!(client.command("STOR fresh.txt").await.starts_with("425"));
        assert!(!tmp.path().join("fresh.txt").exists());
    }

    #[tokio::test]
    async fn test_stor_replaces_longer_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("long.txt"), b"a much longer original").unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;
        let data = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let port = format!("PORT {}", port_argument(data.local_addr().unwrap()));
        assert!(client.command(&port).await.starts_with("200"));
        assert!(client.command("STOR long.txt").await.starts_with("150"));
        let (mut stream, _) = data.accept().await.unwrap();
        stream.write_all(b"short").await.unwrap();
        stream.shutdown().await.unwrap();
        drop(stream);
        assert!(client.reply().await.starts_with("226"));

        assert_eq!(std::fs::read(tmp.path().join("long.txt")).unwrap(), b"short");
    }

    #[tokio::test]
    async fn test_mkd_reports_created_path() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("a")).unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        assert!(client.command("CWD a").await.starts_with("250"));
        assert_eq!(
            client.command("MKD ../x").await,
            "257 \"/x\" directory created.\r\n"
        );
        assert!(tmp.path().join("x").is_dir());
        assert!(client.command("MKD sub").await.starts_with("257 \"/a/sub\""));
    }

    #[tokio::test]
    async fn test_pipelined_commands_beyond_queue_depth() {
        let tmp = tempfile::tempdir().unwrap();
        let mut client = Client::connect(spawn_server(tmp.path()).await).await;

        let count = COMMAND_QUEUE_DEPTH * 3;
        let burst = "NOOP\r\n".repeat(count);
        client.writer.write_all(burst.as_bytes()).await.unwrap();
        for _ in 0..count {
            assert!(client.reply().await.starts_with("200"));
        }
        assert!(client.command("PWD").await.starts_with("257"));
    }
}

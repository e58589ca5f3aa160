use crate::config::Config;
use crate::helpers::{send_response, ControlWriter};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_rein_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    session.lock().await.reset();
    send_response(&writer, b"220 Service ready for new user.\r\n").await
}

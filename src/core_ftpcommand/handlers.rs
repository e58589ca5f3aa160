use crate::config::Config;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{
    abor, allo, cdup, cwd, dele, feat, list, mdtm, mkd, mode, noop, opts, pass, pwd, quit, rein,
    rest, retr, rmd, rnfr, rnto, size, stor, syst, type_, user,
};
use crate::core_network::port;
use crate::helpers::ControlWriter;
use crate::session::Session;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;

pub type CommandHandler = Box<
    dyn Fn(
            ControlWriter,
            Arc<Config>,
            Arc<TokioMutex<Session>>,
            String, // Command argument
        ) -> Pin<Box<dyn Future<Output = Result<(), std::io::Error>> + Send>>
        + Send
        + Sync,
>;

fn handler<F, Fut>(f: F) -> CommandHandler
where
    F: Fn(ControlWriter, Arc<Config>, Arc<TokioMutex<Session>>, String) -> Fut
        + Send
        + Sync
        + 'static,
    Fut: Future<Output = Result<(), std::io::Error>> + Send + 'static,
{
    Box::new(move |writer, config, session, arg| Box::pin(f(writer, config, session, arg)))
}

pub fn initialize_command_handlers() -> HashMap<FtpCommand, CommandHandler> {
    let mut handlers: HashMap<FtpCommand, CommandHandler> = HashMap::new();

    // Session
    handlers.insert(FtpCommand::USER, handler(user::handle_user_command));
    handlers.insert(FtpCommand::PASS, handler(pass::handle_pass_command));
    handlers.insert(FtpCommand::SYST, handler(syst::handle_syst_command));
    handlers.insert(FtpCommand::FEAT, handler(feat::handle_feat_command));
    handlers.insert(FtpCommand::OPTS, handler(opts::handle_opts_command));
    handlers.insert(FtpCommand::NOOP, handler(noop::handle_noop_command));
    handlers.insert(FtpCommand::REIN, handler(rein::handle_rein_command));
    handlers.insert(FtpCommand::QUIT, handler(quit::handle_quit_command));

    // Transfer parameters
    handlers.insert(FtpCommand::TYPE, handler(type_::handle_type_command));
    handlers.insert(FtpCommand::MODE, handler(mode::handle_mode_command));
    handlers.insert(FtpCommand::PORT, handler(port::handle_port_command));
    handlers.insert(FtpCommand::REST, handler(rest::handle_rest_command));
    handlers.insert(FtpCommand::ALLO, handler(allo::handle_allo_command));

    // Filesystem
    handlers.insert(FtpCommand::PWD, handler(pwd::handle_pwd_command));
    handlers.insert(FtpCommand::CWD, handler(cwd::handle_cwd_command));
    handlers.insert(FtpCommand::CDUP, handler(cdup::handle_cdup_command));
    handlers.insert(FtpCommand::MKD, handler(mkd::handle_mkd_command));
    handlers.insert(FtpCommand::RMD, handler(rmd::handle_rmd_command));
    handlers.insert(FtpCommand::DELE, handler(dele::handle_dele_command));
    handlers.insert(FtpCommand::RNFR, handler(rnfr::handle_rnfr_command));
    handlers.insert(FtpCommand::RNTO, handler(rnto::handle_rnto_command));
    handlers.insert(FtpCommand::MDTM, handler(mdtm::handle_mdtm_command));
    handlers.insert(FtpCommand::SIZE, handler(size::handle_size_command));

    // Data connection
    handlers.insert(FtpCommand::LIST, handler(list::handle_list_command));
    handlers.insert(FtpCommand::RETR, handler(retr::handle_retr_command));
    handlers.insert(FtpCommand::STOR, handler(stor::handle_stor_command));
    handlers.insert(FtpCommand::APPE, handler(stor::handle_appe_command));
    handlers.insert(FtpCommand::ABOR, handler(abor::handle_abor_command));

    handlers
}

#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    SYST,
    FEAT,
    OPTS,
    NOOP,
    TYPE,
    MODE,
    PORT,
    PWD,
    CWD,
    CDUP,
    LIST,
    MKD,
    RMD,
    DELE,
    RNFR,
    RNTO,
    MDTM,
    SIZE,
    REST,
    RETR,
    STOR,
    APPE,
    ALLO,
    ABOR,
    REIN,
    QUIT,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "SYST" => Some(FtpCommand::SYST),
            "FEAT" => Some(FtpCommand::FEAT),
            "OPTS" => Some(FtpCommand::OPTS),
            "NOOP" => Some(FtpCommand::NOOP),
            "TYPE" => Some(FtpCommand::TYPE),
            "MODE" => Some(FtpCommand::MODE),
            "PORT" => Some(FtpCommand::PORT),
            "PWD" | "XPWD" => Some(FtpCommand::PWD),
            "CWD" | "XCWD" => Some(FtpCommand::CWD),
            "CDUP" | "XCUP" => Some(FtpCommand::CDUP),
            "LIST" => Some(FtpCommand::LIST),
            "MKD" | "XMKD" => Some(FtpCommand::MKD),
            "RMD" | "XRMD" => Some(FtpCommand::RMD),
            "DELE" => Some(FtpCommand::DELE),
            "RNFR" => Some(FtpCommand::RNFR),
            "RNTO" => Some(FtpCommand::RNTO),
            "MDTM" => Some(FtpCommand::MDTM),
            "SIZE" => Some(FtpCommand::SIZE),
            "REST" => Some(FtpCommand::REST),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "APPE" => Some(FtpCommand::APPE),
            "ALLO" => Some(FtpCommand::ALLO),
            "ABOR" => Some(FtpCommand::ABOR),
            "REIN" => Some(FtpCommand::REIN),
            "QUIT" => Some(FtpCommand::QUIT),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbs_are_case_insensitive() {
        assert_eq!(FtpCommand::from_str("retr"), Some(FtpCommand::RETR));
        assert_eq!(FtpCommand::from_str("Cdup"), Some(FtpCommand::CDUP));
        assert_eq!(FtpCommand::from_str("XPWD"), Some(FtpCommand::PWD));
        assert_eq!(FtpCommand::from_str("PASV"), None);
        assert_eq!(FtpCommand::from_str(""), None);
    }
}

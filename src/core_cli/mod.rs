use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "rouillevfsd",
    about = "An active-mode FTP server sandboxed to one directory."
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Control port, overrides `listen_port`
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Sandbox root, overrides `root_dir`
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut crate::config::Config) {
        if let Some(port) = self.port {
            config.server.listen_port = port;
        }
        if let Some(root) = &self.root {
            config.server.root_dir = Some(root.to_string_lossy().into_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["rouillevfsd", "-p", "2121", "--root", "/srv/ftp", "-v"]);
        assert!(cli.verbose);
        assert!(cli.config.is_none());

        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.server.listen_port, 2121);
        assert_eq!(config.server.root_dir.as_deref(), Some("/srv/ftp"));
    }

    #[test]
    fn test_cli_without_overrides() {
        let cli = Cli::parse_from(["rouillevfsd", "--config", "/tmp/test.conf"]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.server.listen_port, 2100);
        assert!(config.server.root_dir.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/test.conf")));
    }
}

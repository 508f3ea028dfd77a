mod app;
mod command;
mod config;
mod session_registry;

use std::io;
use std::path::PathBuf;

use clap::Parser;
use common::config::ConfigError;
use common::{LogLevel, log, logger};

use app::App;
use config::{Config, DEFAULT_CONFIG_FILE, Validate, get_config_manager};
use session_registry::SessionRegistry;

#[derive(Parser)]
#[command(name = "grid_adventure")]
#[command(about = "Turn-based grid board game played from the console")]
struct Args {
    /// YAML config file; missing file means built-in defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Map file used for new sessions.
    #[arg(long)]
    map: Option<PathBuf>,

    /// Number of players in new sessions.
    #[arg(long)]
    players: Option<usize>,

    /// Dice seed for new sessions.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    use_log_prefix: bool,

    /// Minimum log level: debug, info or warn.
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Log at debug level; shorthand for `--log-level debug`.
    #[arg(long)]
    verbose: bool,

    /// Save the effective config to the config file and exit.
    #[arg(long)]
    write_config: bool,
}

impl Args {
    fn apply_to(&self, config: &mut Config) {
        if let Some(ref map) = self.map {
            config.game.map_file = map.clone();
        }
        if let Some(players) = self.players {
            config.game.players = players;
        }
        if self.seed.is_some() {
            config.game.seed = self.seed;
        }
        if self.use_log_prefix {
            config.log.prefix = Some("Console".to_string());
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
        if self.verbose {
            config.log.level = LogLevel::Debug;
        }
    }
}


fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_manager = get_config_manager(&args.config);
    let mut config = config_manager.get_config()?;
    args.apply_to(&mut config);
    config.validate().map_err(ConfigError::Validation)?;

    if args.write_config {
        config_manager.set_config(&config)?;
        println!("Config written to {}", args.config.display());
        return Ok(());
    }

    logger::init_logger(config.log.prefix.clone(), config.log.level);
    log!(
        "Using map {} with {} players",
        config.game.map_file.display(),
        config.game.players
    );

    let mut app = App::new(SessionRegistry::new(config.game.session_settings()));
    app.run(io::stdin().lock(), io::stdout().lock())?;

    log!("Console closed");
    Ok(())
}

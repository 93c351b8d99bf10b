use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use emptydesk::common::config::{Config, ConfigCommand, DEFAULT_CONFIG, config_file};

#[derive(Parser)]
#[command(name = "emptydesk-cli")]
#[command(about = "Command-line interface for emptydesk preferences")]
struct Cli {
    /// Config file to operate on.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective config
    Show,
    /// Print the path of the config file
    Path,
    /// Print a single value
    Get { key: String },
    /// Change a single value and save the file
    Set { key: String, value: String },
    /// Overwrite the config file with the defaults
    Reset,
    /// List the keys accepted by get and set
    Keys,
}

fn main() {
    let cli = Cli::parse();
    let path = cli.config.unwrap_or_else(config_file);

    let Commands::Config { config_cmd } = cli.command;
    if let Err(e) = run(config_cmd, &path) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cmd: ConfigCommands, path: &std::path::Path) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let config = Config::read_or_default(path)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Get { key } => {
            println!("{}", Config::read_or_default(path)?.get(&key)?);
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::read_or_default(path)?;
            config.apply(ConfigCommand::parse(&key, &value)?);
            let issues = config.validate();
            if !issues.is_empty() {
                anyhow::bail!("refusing to save: {}", issues.join("; "));
            }
            config.save(path)?;
            println!("{key} = {}", config.get(&key)?);
        }
        ConfigCommands::Reset => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, DEFAULT_CONFIG)?;
            println!("wrote defaults to {}", path.display());
        }
        ConfigCommands::Keys => {
            for key in ConfigCommand::KEYS {
                println!("{key}");
            }
        }
    }
    Ok(())
}

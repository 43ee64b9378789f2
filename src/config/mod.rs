pub mod toml_config;

pub use toml_config::ServiceConfig;

#[cfg(feature = "cli")]
pub use cli::{ClientCommand, CliConfig, Command, ProgramCommand};

#[cfg(feature = "cli")]
mod cli {
    use super::ServiceConfig;
    use crate::core::Gender;
    use crate::utils::error::Result;
    use clap::{Parser, Subcommand};
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "enrollment-registry")]
    #[command(about = "Register clients, define health programs and manage enrollments")]
    pub struct CliConfig {
        /// Base URL of the registry service
        #[arg(long, global = true)]
        pub api_url: Option<String>,

        #[arg(long, global = true)]
        pub timeout_seconds: Option<u64>,

        /// TOML file with [server] and [client] sections
        #[arg(long, global = true)]
        pub config: Option<PathBuf>,

        #[arg(long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, help = "Emit logs as JSON lines")]
        pub json_logs: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Run the registry HTTP service over an in-memory store
        Serve {
            #[arg(long)]
            bind: Option<String>,
            /// Start with the demo clients, programs and enrollments
            #[arg(long)]
            sample_data: bool,
        },
        Clients {
            #[command(subcommand)]
            action: ClientCommand,
        },
        Programs {
            #[command(subcommand)]
            action: ProgramCommand,
        },
        /// Enroll a client in a program
        Enroll {
            client_id: String,
            program_id: String,
        },
        /// Show dashboard statistics
        Stats,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum ClientCommand {
        List,
        Search {
            query: String,
        },
        Show {
            id: String,
        },
        Create {
            #[arg(long)]
            name: String,
            #[arg(long)]
            age: u32,
            #[arg(long)]
            gender: Gender,
        },
        /// Clients enrolled in a program
        ByProgram {
            program_id: String,
        },
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum ProgramCommand {
        List,
        Create {
            #[arg(long)]
            name: String,
            #[arg(long)]
            description: Option<String>,
        },
    }

    impl CliConfig {
        /// Flags win over the config file, which wins over defaults.
        pub fn resolve(&self) -> Result<ServiceConfig> {
            let mut config = match &self.config {
                Some(path) => ServiceConfig::from_file(path)?,
                None => ServiceConfig::default(),
            };

            if let Some(api_url) = &self.api_url {
                config.client.api_url = api_url.clone();
            }
            if let Some(timeout) = self.timeout_seconds {
                config.client.timeout_seconds = timeout;
            }
            if let Command::Serve { bind, sample_data } = &self.command {
                if let Some(bind) = bind {
                    config.server.bind_address = bind.clone();
                }
                if *sample_data {
                    config.server.seed_sample_data = true;
                }
            }

            Ok(config)
        }
    }

}

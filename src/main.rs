use clap::Parser;
use enrollment_registry::config::{ClientCommand, Command, ProgramCommand};
use enrollment_registry::utils::error::ErrorCategory;
use enrollment_registry::utils::{logger, validation::Validate};
use enrollment_registry::{
    CliConfig, Client, EnrollOutcome, HttpRegistry, InMemoryRegistry, NewClient, NewProgram,
    Registry, RegistryError, ServiceConfig,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let result = match cli.command {
        Command::Serve { .. } => {
            if let Err(e) = serve(&config).await {
                tracing::error!("Server failed: {:#}", e);
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
            return;
        }
        command => run_remote(command, &config).await,
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => exit_with(&e),
    }
}

async fn serve(config: &ServiceConfig) -> anyhow::Result<()> {
    let registry = if config.server.seed_sample_data {
        tracing::info!("Seeding in-memory store with sample data");
        InMemoryRegistry::with_sample_data()
    } else {
        InMemoryRegistry::new()
    };

    tracing::info!(
        "Starting enrollment registry v{}",
        env!("CARGO_PKG_VERSION")
    );
    enrollment_registry::server::bind_and_serve(&config.server.bind_address, Arc::new(registry))
        .await
}

/// Runs one operation against the remote service and returns the exit code.
async fn run_remote(command: Command, config: &ServiceConfig) -> Result<i32, RegistryError> {
    let registry = HttpRegistry::from_config(config)?;
    tracing::debug!("Using registry service at {}", registry.base_url());

    match command {
        Command::Clients { action } => match action {
            ClientCommand::List => print_clients(&registry.list_clients().await?),
            ClientCommand::Search { query } => {
                print_clients(&registry.search_clients(&query).await?)
            }
            ClientCommand::Show { id } => match registry.get_client(&id).await? {
                Some(profile) => {
                    print_clients(std::slice::from_ref(&profile.client));
                    if profile.enrolled_programs.is_empty() {
                        println!("This client is not enrolled in any health programs");
                    }
                    for program in &profile.enrolled_programs {
                        println!("  - {} ({}): {}", program.name, program.id, program.description);
                    }
                }
                None => {
                    eprintln!("❌ Client not found");
                    return Ok(3);
                }
            },
            ClientCommand::Create { name, age, gender } => {
                let client = registry
                    .create_client(NewClient::new(name, age, gender))
                    .await?;
                println!("✅ Client created successfully");
                print_clients(&[client]);
            }
            ClientCommand::ByProgram { program_id } => {
                print_clients(&registry.clients_in_program(&program_id).await?)
            }
        },
        Command::Programs { action } => match action {
            ProgramCommand::List => {
                for program in registry.list_programs().await? {
                    println!("{}\t{}\t{}", program.id, program.name, program.description);
                }
            }
            ProgramCommand::Create { name, description } => {
                let program = registry
                    .create_program(NewProgram::new(name, description))
                    .await?;
                println!("✅ Program created successfully");
                println!("{}\t{}\t{}", program.id, program.name, program.description);
            }
        },
        Command::Enroll {
            client_id,
            program_id,
        } => {
            let outcome = registry.enroll_client(&client_id, &program_id).await?;
            return Ok(match outcome {
                EnrollOutcome::Enrolled(_) => {
                    println!("✅ {}", outcome.message());
                    0
                }
                EnrollOutcome::AlreadyEnrolled => {
                    println!("⚠️  {}", outcome.message());
                    0
                }
                EnrollOutcome::NotFound(_) => {
                    eprintln!("❌ {}", outcome.message());
                    3
                }
            });
        }
        Command::Stats => {
            let stats = registry.dashboard_stats().await?;
            println!("Total clients:     {}", stats.total_clients);
            println!("Total programs:    {}", stats.total_programs);
            println!("Total enrollments: {}", stats.total_enrollments);
            for stat in &stats.program_stats {
                println!("  {:<24} {}", stat.program, stat.count);
            }
        }
        Command::Serve { .. } => {
            return Err(RegistryError::ConfigError {
                message: "serve does not run against a remote registry".to_string(),
            })
        }
    }

    Ok(0)
}

fn print_clients(clients: &[Client]) {
    if clients.is_empty() {
        println!("No clients found");
        return;
    }
    for client in clients {
        println!(
            "{}\t{}\t{}\t{}",
            client.id, client.name, client.age, client.gender
        );
    }
}

fn exit_with(e: &RegistryError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    eprintln!("❌ {}", e.user_friendly_message());

    let exit_code = match e.category() {
        ErrorCategory::Transport => 1,
        ErrorCategory::Validation => 2,
        ErrorCategory::NotFound => 3,
        ErrorCategory::Configuration => 4,
    };
    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serve_is_not_a_remote_command() {
        let command = Command::Serve {
            bind: None,
            sample_data: false,
        };

        let err = run_remote(command, &ServiceConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }
}

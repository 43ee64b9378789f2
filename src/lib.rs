pub mod app;
pub mod config;
pub mod core;
pub mod domain;
#[cfg(feature = "server")]
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::app::backends::{HttpRegistry, InMemoryRegistry};
pub use crate::config::ServiceConfig;
pub use crate::core::{desk::EnrollmentDesk, store::MemoryStore, Registry};
pub use crate::domain::model::{
    Client, ClientProfile, DashboardStats, EnrollOutcome, Enrollment, Gender, MissingEntity,
    NewClient, NewProgram, Program, ProgramStat,
};
pub use crate::utils::error::{RegistryError, Result};

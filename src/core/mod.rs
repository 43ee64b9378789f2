pub mod desk;
pub mod store;

pub use crate::domain::model::{
    Client, ClientProfile, DashboardStats, EnrollOutcome, Enrollment, Gender, MissingEntity,
    NewClient, NewProgram, Program, ProgramStat,
};
pub use crate::domain::ports::{ConfigProvider, Registry};
pub use crate::utils::error::Result;

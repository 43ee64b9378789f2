use crate::domain::model::{
    Client, ClientProfile, DashboardStats, EnrollOutcome, NewClient, NewProgram, Program,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The data-access contract shared by every backend.
///
/// Business outcomes (not found, already enrolled) are part of the `Ok`
/// value. `Err` is reserved for rejected input and infrastructure failures.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn list_clients(&self) -> Result<Vec<Client>>;

    /// `Ok(None)` when no client has this id.
    async fn get_client(&self, id: &str) -> Result<Option<ClientProfile>>;

    /// Case-insensitive substring match on the client name. Blank queries match nothing.
    async fn search_clients(&self, query: &str) -> Result<Vec<Client>>;

    async fn create_client(&self, input: NewClient) -> Result<Client>;

    async fn list_programs(&self) -> Result<Vec<Program>>;

    async fn create_program(&self, input: NewProgram) -> Result<Program>;

    async fn enroll_client(&self, client_id: &str, program_id: &str) -> Result<EnrollOutcome>;

    async fn clients_in_program(&self, program_id: &str) -> Result<Vec<Client>>;

    async fn dashboard_stats(&self) -> Result<DashboardStats>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
}

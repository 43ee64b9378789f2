use crate::core::store::MemoryStore;
use crate::core::{
    Client, ClientProfile, DashboardStats, EnrollOutcome, NewClient, NewProgram, Program, Registry,
};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Registry backed by a process-local `MemoryStore`.
///
/// Clones share the same store.
#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: MemoryStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    pub fn with_sample_data() -> Self {
        Self::with_store(MemoryStore::with_sample_data())
    }

    pub async fn enrollment_count(&self) -> usize {
        self.store.read().await.enrollments().len()
    }

    fn next_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn list_clients(&self) -> Result<Vec<Client>> {
        Ok(self.store.read().await.clients().to_vec())
    }

    async fn get_client(&self, id: &str) -> Result<Option<ClientProfile>> {
        let profile = self.store.read().await.client_profile(id);
        if profile.is_none() {
            tracing::debug!("Client {} not found", id);
        }
        Ok(profile)
    }

    async fn search_clients(&self, query: &str) -> Result<Vec<Client>> {
        let hits = self.store.read().await.search_clients(query);
        tracing::debug!("Search '{}' matched {} clients", query, hits.len());
        Ok(hits)
    }

    async fn create_client(&self, input: NewClient) -> Result<Client> {
        input.validate()?;

        let client = input.into_client(Self::next_id());
        self.store.write().await.insert_client(client.clone());
        tracing::info!("Created client {} ({})", client.name, client.id);
        Ok(client)
    }

    async fn list_programs(&self) -> Result<Vec<Program>> {
        Ok(self.store.read().await.programs().to_vec())
    }

    async fn create_program(&self, input: NewProgram) -> Result<Program> {
        input.validate()?;

        let program = input.into_program(Self::next_id());
        self.store.write().await.insert_program(program.clone());
        tracing::info!("Created program {} ({})", program.name, program.id);
        Ok(program)
    }

    async fn enroll_client(&self, client_id: &str, program_id: &str) -> Result<EnrollOutcome> {
        // check and insert under one write guard
        let outcome = self.store.write().await.enroll(client_id, program_id);
        tracing::info!(
            "Enroll client {} in program {}: {}",
            client_id,
            program_id,
            outcome.message()
        );
        Ok(outcome)
    }

    async fn clients_in_program(&self, program_id: &str) -> Result<Vec<Client>> {
        Ok(self.store.read().await.clients_in_program(program_id))
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats> {
        Ok(self.store.read().await.dashboard_stats())
    }
}

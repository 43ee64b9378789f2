use crate::core::{
    Client, ClientProfile, DashboardStats, EnrollOutcome, Enrollment, Gender, MissingEntity,
    Program, ProgramStat,
};
use chrono::Utc;
use uuid::Uuid;

/// The three collections behind the in-memory backend.
///
/// All joins and aggregates are computed on read; nothing derived is stored.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    clients: Vec<Client>,
    programs: Vec<Program>,
    enrollments: Vec<Enrollment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Four clients, three programs and three enrollments for demos.
    pub fn with_sample_data() -> Self {
        let mut store = Self::new();

        for (id, name, age, gender) in [
            ("1", "John Doe", 35, Gender::Male),
            ("2", "Jane Smith", 28, Gender::Female),
            ("3", "Michael Johnson", 42, Gender::Male),
            ("4", "Sarah Williams", 31, Gender::Female),
        ] {
            store.insert_client(Client {
                id: id.to_string(),
                name: name.to_string(),
                age,
                gender,
            });
        }

        for (id, name, description) in [
            ("1", "Tuberculosis", "TB treatment and prevention program"),
            ("2", "HIV/AIDS", "HIV care and management program"),
            ("3", "Malaria", "Malaria prevention and treatment program"),
        ] {
            store.insert_program(Program {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
            });
        }

        for (client_id, program_id) in [("1", "1"), ("1", "2"), ("2", "3")] {
            store.enroll(client_id, program_id);
        }

        store
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    pub fn enrollments(&self) -> &[Enrollment] {
        &self.enrollments
    }

    pub fn insert_client(&mut self, client: Client) {
        self.clients.push(client);
    }

    pub fn insert_program(&mut self, program: Program) {
        self.programs.push(program);
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn program(&self, id: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.id == id)
    }

    pub fn client_profile(&self, id: &str) -> Option<ClientProfile> {
        let client = self.client(id)?.clone();
        let enrolled_programs = self
            .enrollments
            .iter()
            .filter(|e| e.client_id == id)
            .filter_map(|e| self.program(&e.program_id).cloned())
            .collect();

        Some(ClientProfile {
            client,
            enrolled_programs,
        })
    }

    pub fn search_clients(&self, query: &str) -> Vec<Client> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        self.clients
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn is_enrolled(&self, client_id: &str, program_id: &str) -> bool {
        self.enrollments
            .iter()
            .any(|e| e.client_id == client_id && e.program_id == program_id)
    }

    /// Checks both ids and the pair uniqueness, then appends.
    pub fn enroll(&mut self, client_id: &str, program_id: &str) -> EnrollOutcome {
        if self.client(client_id).is_none() {
            return EnrollOutcome::NotFound(MissingEntity::Client);
        }
        if self.program(program_id).is_none() {
            return EnrollOutcome::NotFound(MissingEntity::Program);
        }
        if self.is_enrolled(client_id, program_id) {
            return EnrollOutcome::AlreadyEnrolled;
        }

        let enrollment = Enrollment {
            id: Uuid::new_v4().to_string(),
            client_id: client_id.to_string(),
            program_id: program_id.to_string(),
            created_at: Utc::now(),
        };
        self.enrollments.push(enrollment.clone());
        EnrollOutcome::Enrolled(enrollment)
    }

    pub fn clients_in_program(&self, program_id: &str) -> Vec<Client> {
        self.enrollments
            .iter()
            .filter(|e| e.program_id == program_id)
            .filter_map(|e| self.client(&e.client_id).cloned())
            .collect()
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        let program_stats = self
            .programs
            .iter()
            .map(|program| ProgramStat {
                program: program.name.clone(),
                count: self
                    .enrollments
                    .iter()
                    .filter(|e| e.program_id == program.id)
                    .count(),
            })
            .collect();

        DashboardStats {
            total_clients: self.clients.len(),
            total_programs: self.programs.len(),
            total_enrollments: self.enrollments.len(),
            program_stats,
        }
    }
}

use crate::core::{Client, EnrollOutcome, NewClient, Registry};
use crate::utils::error::Result;

/// Result of registering a client and enrolling it in one go.
///
/// The two steps are separate calls, so the client may exist even when the
/// enrollment step failed.
#[derive(Debug)]
pub struct Registration {
    pub client: Client,
    pub enrollment: Result<EnrollOutcome>,
}

pub struct EnrollmentDesk<R: Registry> {
    registry: R,
}

impl<R: Registry> EnrollmentDesk<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Fails only when the client could not be created.
    pub async fn register_and_enroll(
        &self,
        input: NewClient,
        program_id: &str,
    ) -> Result<Registration> {
        let client = self.registry.create_client(input).await?;
        tracing::info!("Registered client {} ({})", client.name, client.id);

        let enrollment = self.registry.enroll_client(&client.id, program_id).await;
        match &enrollment {
            Ok(outcome) => {
                tracing::info!("Enrollment of {} in {}: {}", client.id, program_id, outcome.message())
            }
            Err(e) => tracing::warn!(
                "Client {} was registered but enrollment in {} failed: {}",
                client.id,
                program_id,
                e
            ),
        }

        Ok(Registration { client, enrollment })
    }
}

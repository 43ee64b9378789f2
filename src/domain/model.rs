use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};

/// Stored when a program is defined without a description.
pub const DEFAULT_PROGRAM_DESCRIPTION: &str = "No description provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!(
                "unknown gender '{}', expected Male, Female or Other",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
}

/// A client together with the programs it is enrolled in, resolved on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    #[serde(flatten)]
    pub client: Client,
    #[serde(default)]
    pub enrolled_programs: Vec<Program>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
}

impl NewClient {
    pub fn new(name: impl Into<String>, age: u32, gender: Gender) -> Self {
        Self {
            name: name.into(),
            age,
            gender,
        }
    }

    pub(crate) fn into_client(self, id: String) -> Client {
        Client {
            id,
            name: self.name.trim().to_string(),
            age: self.age,
            gender: self.gender,
        }
    }
}

impl Validate for NewClient {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_positive_number("age", self.age)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProgram {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewProgram {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }

    pub(crate) fn into_program(self, id: String) -> Program {
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_PROGRAM_DESCRIPTION.to_string());
        Program {
            id,
            name: self.name.trim().to_string(),
            description,
        }
    }
}

impl Validate for NewProgram {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub client_id: String,
    pub program_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRequest {
    pub client_id: String,
    pub program_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingEntity {
    Client,
    Program,
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingEntity::Client => f.write_str("Client"),
            MissingEntity::Program => f.write_str("Program"),
        }
    }
}

/// Result of an enroll request. Only `Enrolled` mutates state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollOutcome {
    Enrolled(Enrollment),
    AlreadyEnrolled,
    NotFound(MissingEntity),
}

impl EnrollOutcome {
    pub fn is_enrolled(&self) -> bool {
        matches!(self, EnrollOutcome::Enrolled(_))
    }

    pub fn message(&self) -> String {
        match self {
            EnrollOutcome::Enrolled(_) => "Enrollment successful".to_string(),
            EnrollOutcome::AlreadyEnrolled => {
                "Client already enrolled in this program".to_string()
            }
            EnrollOutcome::NotFound(entity) => format!("{} not found", entity),
        }
    }
}

/// Wire shape of an enrollment response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<Enrollment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<MissingEntity>,
}

impl From<&EnrollOutcome> for EnrollmentResponse {
    fn from(outcome: &EnrollOutcome) -> Self {
        let (enrollment, missing) = match outcome {
            EnrollOutcome::Enrolled(enrollment) => (Some(enrollment.clone()), None),
            EnrollOutcome::AlreadyEnrolled => (None, None),
            EnrollOutcome::NotFound(entity) => (None, Some(*entity)),
        };
        Self {
            message: outcome.message(),
            enrollment,
            missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramStat {
    pub program: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_clients: usize,
    pub total_programs: usize,
    pub total_enrollments: usize,
    pub program_stats: Vec<ProgramStat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::RegistryError;

    #[test]
    fn test_new_client_validation_names_field() {
        let blank = NewClient::new("  ", 30, Gender::Female);
        match blank.validate() {
            Err(RegistryError::ValidationError { field, .. }) => assert_eq!(field, "name"),
            other => panic!("expected name validation error, got {:?}", other),
        }

        let zero_age = NewClient::new("Jane Smith", 0, Gender::Female);
        match zero_age.validate() {
            Err(RegistryError::ValidationError { field, .. }) => assert_eq!(field, "age"),
            other => panic!("expected age validation error, got {:?}", other),
        }

        assert!(NewClient::new("Jane Smith", 28, Gender::Female)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_blank_description_gets_placeholder() {
        let program = NewProgram::new("Malaria", Some("   ".to_string())).into_program("p".into());
        assert_eq!(program.description, DEFAULT_PROGRAM_DESCRIPTION);

        let program = NewProgram::new("Malaria", None).into_program("p".into());
        assert_eq!(program.description, DEFAULT_PROGRAM_DESCRIPTION);

        let program = NewProgram::new("Malaria", Some("Bed nets".to_string()))
            .into_program("p".into());
        assert_eq!(program.description, "Bed nets");
    }

    #[test]
    fn test_client_profile_json_shape() {
        let profile = ClientProfile {
            client: Client {
                id: "1".to_string(),
                name: "John Doe".to_string(),
                age: 35,
                gender: Gender::Male,
            },
            enrolled_programs: vec![Program {
                id: "1".to_string(),
                name: "Tuberculosis".to_string(),
                description: "TB treatment and prevention program".to_string(),
            }],
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["name"], "John Doe");
        assert_eq!(json["gender"], "Male");
        assert_eq!(json["enrolledPrograms"][0]["name"], "Tuberculosis");

        let back: ClientProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_gender_parses_case_insensitively() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(" OTHER ".parse::<Gender>().unwrap(), Gender::Other);
        assert!("unknown".parse::<Gender>().is_err());
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(EnrollOutcome::AlreadyEnrolled.message(), "Client already enrolled in this program");
        assert_eq!(
            EnrollOutcome::NotFound(MissingEntity::Program).message(),
            "Program not found"
        );
    }
}

#![cfg(feature = "server")]

use enrollment_registry::server;
use enrollment_registry::{
    EnrollOutcome, EnrollmentDesk, Gender, HttpRegistry, InMemoryRegistry, MissingEntity,
    NewClient, NewProgram, ProgramStat, Registry, RegistryError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Starts the service on an ephemeral port and returns a remote registry for it.
async fn spawn_service(backing: InMemoryRegistry) -> HttpRegistry {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, Arc::new(backing)));

    HttpRegistry::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_create_then_fetch_over_http() {
    let remote = spawn_service(InMemoryRegistry::new()).await;

    let created = remote
        .create_client(NewClient::new("John Doe", 35, Gender::Male))
        .await
        .unwrap();
    assert!(!created.id.is_empty());

    let profile = remote.get_client(&created.id).await.unwrap().unwrap();
    assert_eq!(profile.client, created);
    assert!(profile.enrolled_programs.is_empty());

    assert!(remote.get_client("no-such-client").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_enrollment_scenario_over_http() {
    let remote = spawn_service(InMemoryRegistry::new()).await;

    let john = remote
        .create_client(NewClient::new("John Doe", 35, Gender::Male))
        .await
        .unwrap();
    remote
        .create_client(NewClient::new("Jane Smith", 28, Gender::Female))
        .await
        .unwrap();
    let tb = remote
        .create_program(NewProgram::new("Tuberculosis", None))
        .await
        .unwrap();
    let hiv = remote
        .create_program(NewProgram::new("HIV/AIDS", Some("HIV care".to_string())))
        .await
        .unwrap();

    assert!(remote.enroll_client(&john.id, &tb.id).await.unwrap().is_enrolled());
    assert_eq!(
        remote.enroll_client(&john.id, &tb.id).await.unwrap(),
        EnrollOutcome::AlreadyEnrolled
    );

    let stats = remote.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_clients, 2);
    assert_eq!(stats.total_programs, 2);
    assert_eq!(stats.total_enrollments, 1);
    assert_eq!(
        stats.program_stats,
        vec![
            ProgramStat {
                program: "Tuberculosis".to_string(),
                count: 1
            },
            ProgramStat {
                program: "HIV/AIDS".to_string(),
                count: 0
            },
        ]
    );

    assert_eq!(remote.clients_in_program(&tb.id).await.unwrap(), vec![john]);
    assert!(remote.clients_in_program(&hiv.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_ids_over_http() {
    let remote = spawn_service(InMemoryRegistry::with_sample_data()).await;
    let before = remote.dashboard_stats().await.unwrap().total_enrollments;

    assert_eq!(
        remote.enroll_client("404", "1").await.unwrap(),
        EnrollOutcome::NotFound(MissingEntity::Client)
    );
    assert_eq!(
        remote.enroll_client("1", "404").await.unwrap(),
        EnrollOutcome::NotFound(MissingEntity::Program)
    );

    let after = remote.dashboard_stats().await.unwrap().total_enrollments;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_search_semantics_over_http() {
    let remote = spawn_service(InMemoryRegistry::with_sample_data()).await;

    assert_eq!(remote.list_clients().await.unwrap().len(), 4);
    assert!(remote.search_clients("").await.unwrap().is_empty());

    let names: Vec<_> = remote
        .search_clients("JOHN")
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["John Doe", "Michael Johnson"]);
}

#[tokio::test]
async fn test_server_side_validation_reaches_caller() {
    let backing = InMemoryRegistry::new();
    let remote = spawn_service(backing.clone()).await;

    // bypass client-side checks with a raw request
    let response = reqwest::Client::new()
        .post(format!("{}clients", remote.base_url()))
        .json(&serde_json::json!({"name": "   ", "age": 30, "gender": "Other"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["field"], "name");

    assert!(backing.list_clients().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let backing = InMemoryRegistry::new();
    let remote = spawn_service(backing.clone()).await;
    let http = reqwest::Client::new();

    for (path, payload) in [
        ("clients", serde_json::json!({"name": "A", "age": -5, "gender": "Male"})),
        ("clients", serde_json::json!({"name": "A", "age": 30, "gender": "Robot"})),
        ("programs", serde_json::json!({"description": "no name"})),
        ("enrollments", serde_json::json!({"clientId": "1"})),
    ] {
        let response = http
            .post(format!("{}{}", remote.base_url(), path))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 422, "POST /{}", path);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["field"], "body");
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    assert!(backing.list_clients().await.unwrap().is_empty());
    assert!(backing.list_programs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_base_path_is_not_reported_as_missing_client() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(
        listener,
        Arc::new(InMemoryRegistry::with_sample_data()),
    ));
    let misrouted = HttpRegistry::new(
        &format!("http://{}/wrong-prefix/", addr),
        Duration::from_secs(5),
    )
    .unwrap();

    let err = misrouted.get_client("1").await.unwrap_err();
    assert!(matches!(err, RegistryError::UnexpectedStatus { status: 404, .. }));
    assert!(matches!(
        misrouted.list_clients().await.unwrap_err(),
        RegistryError::UnexpectedStatus { status: 404, .. }
    ));
}

#[tokio::test]
async fn test_desk_over_http_keeps_client_when_enrollment_fails() {
    let remote = spawn_service(InMemoryRegistry::new()).await;
    let desk = EnrollmentDesk::new(remote.clone());

    let registration = desk
        .register_and_enroll(NewClient::new("Amina Yusuf", 24, Gender::Female), "missing")
        .await
        .unwrap();

    assert_eq!(
        registration.enrollment.unwrap(),
        EnrollOutcome::NotFound(MissingEntity::Program)
    );
    assert!(remote
        .get_client(&registration.client.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_health_probe() {
    let remote = spawn_service(InMemoryRegistry::new()).await;

    let body: serde_json::Value = reqwest::get(format!("{}health", remote.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}

use habit_stacks::api::create_router;
use habit_stacks::client::{ClientError, HabitStacksClient};
use habit_stacks::db::Database;
use habit_stacks::models::*;
use tempfile::TempDir;

/// Start a server on an ephemeral port backed by a database file in a temp dir.
async fn spawn_server() -> (HabitStacksClient, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = Database::open(dir.path().join("habit-stacks.db")).expect("Failed to open database");
    db.migrate().expect("Failed to migrate");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, create_router(db))
            .await
            .expect("Server failed");
    });

    (HabitStacksClient::new(format!("http://{}/api", addr)), dir)
}

#[tokio::test]
async fn lists_routines() {
    let (client, _dir) = spawn_server().await;

    let routines = client.list_routines().await.expect("Failed to list routines");
    assert_eq!(routines.len(), 4);
}

#[tokio::test]
async fn creates_from_routine_with_fresh_habit_ids() {
    let (client, _dir) = spawn_server().await;

    let stack = client
        .create_from_routine("evening-routine", None, vec![])
        .await
        .expect("Failed to create from routine");

    assert_eq!(stack.name, "Evening Routine");
    let names: Vec<_> = stack.habits.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["Eat dinner", "Plan tomorrow", "Read for 30 minutes"]);
    assert!(stack.habits.iter().all(|h| h.id != "dinner" && h.id != "read"));
}

#[tokio::test]
async fn creates_from_routine_with_extra_habits_in_one_stack() {
    let (client, _dir) = spawn_server().await;

    let stack = client
        .create_from_routine(
            "evening-routine",
            Some("Wind down".to_string()),
            vec!["Journal".to_string(), "Lights out".to_string()],
        )
        .await
        .expect("Failed to create from routine");

    assert_eq!(stack.name, "Wind down");
    assert_eq!(stack.version, 0);
    let shape: Vec<_> = stack.habits.iter().map(|h| (h.name.as_str(), h.order)).collect();
    assert_eq!(
        shape,
        vec![
            ("Eat dinner", 0),
            ("Plan tomorrow", 1),
            ("Read for 30 minutes", 2),
            ("Journal", 3),
            ("Lights out", 4),
        ]
    );

    let stacks = client.list_stacks().await.expect("Failed to list");
    assert_eq!(stacks.len(), 1);
}

#[tokio::test]
async fn unknown_routine_is_not_found() {
    let (client, _dir) = spawn_server().await;

    let result = client
        .create_from_routine("nap-routine", None, vec![])
        .await;
    assert!(matches!(result, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn drives_the_full_stack_lifecycle() {
    let (client, _dir) = spawn_server().await;

    let stack = client
        .create_stack(&CreateStackInput {
            name: "Morning".to_string(),
            habits: vec![],
        })
        .await
        .expect("Failed to create");

    let stack = client
        .add_habit(
            &stack.id,
            &AddHabitInput {
                name: "Wake".to_string(),
                order: 0,
            },
        )
        .await
        .expect("Failed to add habit");
    let habit_id = stack.habits[0].id.clone();

    let stack = client
        .update_habit(
            &stack.id,
            &habit_id,
            &UpdateHabitInput {
                order: Patch::Set(4),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update habit");
    assert_eq!(stack.habits[0].order, 4);

    let renamed = client
        .update_stack(
            &stack.id,
            &UpdateStackInput {
                name: Patch::Set("Dawn".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to rename");
    assert_eq!(renamed.name, "Dawn");
    assert_eq!(renamed.habits, stack.habits);

    client
        .remove_habit(&stack.id, &habit_id)
        .await
        .expect("Failed to remove habit");
    assert!(client
        .get_stack(&stack.id)
        .await
        .expect("Failed to get")
        .habits
        .is_empty());

    let listed = client.list_stacks().await.expect("Failed to list");
    assert_eq!(listed.len(), 1);

    client.delete_stack(&stack.id).await.expect("Failed to delete");
    let result = client.get_stack(&stack.id).await;
    assert!(matches!(result, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn maps_stale_version_to_conflict() {
    let (client, _dir) = spawn_server().await;

    let stack = client
        .create_stack(&CreateStackInput {
            name: "Morning".to_string(),
            habits: vec![],
        })
        .await
        .expect("Failed to create");

    let input = UpdateStackInput {
        name: Patch::Set("Dawn".to_string()),
        habits: Patch::Absent,
        version: Some(stack.version + 1),
    };
    let result = client.update_stack(&stack.id, &input).await;
    assert!(matches!(result, Err(ClientError::Conflict(_))));
}

#[tokio::test]
async fn maps_blank_name_to_validation_error() {
    let (client, _dir) = spawn_server().await;

    let result = client
        .create_stack(&CreateStackInput {
            name: " ".to_string(),
            habits: vec![],
        })
        .await;
    assert!(matches!(result, Err(ClientError::Validation(_))));
}

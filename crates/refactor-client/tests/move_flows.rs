//! Move flows against a scripted server and editor.

mod common;

use common::{RecordingEditor, StubFileSystem, StubServer, client, code_action_params, edit, symbol, url};
use refactor_client::model::types::{MoveKind, RefactorWorkspaceEdit};
use refactor_client::sdk::services::edit_service::touched_documents;
use refactor_client::{MoveDestination, Outcome, RefactorError};
use serde_json::{Value, json};

const A: &str = "file:///workspace/src/com/example/a/A.java";
const B: &str = "file:///workspace/src/com/example/a/B.java";
const OTHER: &str = "file:///workspace/src/com/example/Other.java";
const TARGET: &str = "file:///workspace/src/com/example/b";

fn package_destinations() -> Value {
    json!({
        "destinations": [
            {
                "displayName": "com.example.a",
                "uri": "file:///workspace/src/com/example/a",
                "path": "src/com/example/a",
                "isParentOfSelectedFile": true,
            },
            {
                "displayName": "com.example.b",
                "uri": TARGET,
                "path": "src/com/example/b",
            },
        ],
    })
}

fn rename_into_target(file: &str) -> RefactorWorkspaceEdit {
    RefactorWorkspaceEdit::with_edit(edit(json!({
        "documentChanges": [
            {
                "kind": "rename",
                "oldUri": format!("file:///workspace/src/com/example/a/{}", file),
                "newUri": format!("{}/{}", TARGET, file),
            },
            {
                "textDocument": {"uri": OTHER, "version": null},
                "edits": [{
                    "range": {"start": {"line": 0, "character": 0}, "end": {"line": 0, "character": 0}},
                    "newText": "import com.example.b.A;\n",
                }],
            },
        ],
    })))
}

#[tokio::test]
async fn test_move_files_from_different_directories_is_rejected() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let err = client
        .service()
        .moves()
        .move_file(vec![url(A), url("file:///workspace/src/com/example/c/C.java")])
        .await
        .unwrap_err();

    assert!(matches!(err, RefactorError::DifferentDirectories));
    assert_eq!(
        editor.errors(),
        vec!["Moving files of different directories are not supported. Please make sure they are from the same directory."]
    );
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_single_destination_is_still_offered_in_picker() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(json!({
        "destinations": [{"displayName": "com.example.b", "uri": TARGET}],
    }));
    server.set_move_result(rename_into_target("A.java"));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let outcome = client.service().moves().move_file(vec![url(A)]).await.unwrap();

    assert_eq!(outcome, Outcome::Applied);
    let picks = editor.picks();
    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0].items.len(), 1);
    assert_eq!(picks[0].items[0].label, "com.example.b");
    assert_eq!(picks[0].items[0].description.as_deref(), Some("src/com/example/b"));
    assert_eq!(picks[0].placeholder, "Choose the target package for A.java.");
}

#[tokio::test]
async fn test_destination_query_and_move_request() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(package_destinations());
    server.set_move_result(rename_into_target("A.java"));
    editor.choose(Some(1));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    client.service().moves().move_file(vec![url(A), url(B)]).await.unwrap();

    let picks = editor.picks();
    assert_eq!(picks[0].placeholder, "Choose the target package for 2 selected files.");
    assert_eq!(picks[0].items[0].label, "* com.example.a");
    assert_eq!(picks[0].items[1].label, "com.example.b");

    let queries = server.destination_requests();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].move_kind, MoveKind::MoveResource);
    assert_eq!(queries[0].source_uris, vec![A.to_string(), B.to_string()]);
    assert!(queries[0].params.is_none());
    assert!(queries[0].destination.is_none());

    let moves = server.move_requests();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].update_references, Some(true));
    assert_eq!(
        moves[0].destination.as_ref().map(MoveDestination::display_name),
        Some("com.example.b")
    );
}

#[tokio::test]
async fn test_colliding_file_is_left_out_with_warning() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(package_destinations());
    server.set_move_result(rename_into_target("B.java"));
    editor.choose(Some(1));
    let fs = StubFileSystem::with_files(&["/workspace/src/com/example/b/A.java"]);
    let client = client(&server, &editor, fs);

    let outcome = client.service().moves().move_file(vec![url(A), url(B)]).await.unwrap();

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(
        editor.warnings(),
        vec!["The files 'A.java' already exist in the package 'com.example.b'. The move operation will ignore them."]
    );
    let moves = server.move_requests();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].source_uris, vec![B.to_string()]);
}

#[tokio::test]
async fn test_every_file_colliding_moves_nothing() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(package_destinations());
    editor.choose(Some(1));
    let fs = StubFileSystem::with_files(&["/workspace/src/com/example/b/A.java", "/workspace/src/com/example/b/B.java"]);
    let client = client(&server, &editor, fs);

    let outcome = client.service().moves().move_file(vec![url(A), url(B)]).await.unwrap();

    assert_eq!(outcome, Outcome::NothingToDo);
    assert_eq!(
        editor.warnings(),
        vec!["The files 'A.java,B.java' already exist in the package 'com.example.b'. The move operation will ignore them."]
    );
    assert!(server.move_requests().is_empty());
}

#[tokio::test]
async fn test_save_targets_renamed_uri() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(package_destinations());
    server.set_move_result(rename_into_target("A.java"));
    editor.choose(Some(1));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    client.service().moves().move_file(vec![url(A)]).await.unwrap();

    let saved = editor.saved();
    assert!(saved.contains(&url("file:///workspace/src/com/example/b/A.java")));
    assert!(!saved.contains(&url(A)));
}

#[tokio::test]
async fn test_saved_documents_match_touched_documents() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    let result = RefactorWorkspaceEdit::with_edit(edit(json!({
        "documentChanges": [
            {"kind": "rename", "oldUri": A, "newUri": format!("{}/A.java", TARGET)},
            {"kind": "create", "uri": format!("{}/package-info.java", TARGET)},
            {"kind": "delete", "uri": "file:///workspace/src/com/example/a/Stale.java"},
            {
                "textDocument": {"uri": OTHER, "version": 3},
                "edits": [],
            },
            {
                "textDocument": {"uri": "file:///workspace/src/com/example/a/Stale.java", "version": null},
                "edits": [],
            },
            {"kind": "delete", "uri": "file:///workspace/src/com/example/a/Stale.java"},
        ],
    })));
    let expected = touched_documents(result.edit.as_ref().unwrap());
    server.set_destinations(package_destinations());
    server.set_move_result(result);
    editor.choose(Some(1));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    client.service().moves().move_file(vec![url(A)]).await.unwrap();

    assert_eq!(
        expected,
        vec![
            url("file:///workspace/src/com/example/b/A.java"),
            url("file:///workspace/src/com/example/b/package-info.java"),
            url(OTHER),
        ]
    );
    assert_eq!(editor.saved(), expected);
}

#[tokio::test]
async fn test_documents_are_saved_before_a_failing_follow_up_command() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    let mut result = rename_into_target("A.java");
    result.command = Some(
        serde_json::from_value(json!({
            "title": "Organize imports",
            "command": "java.edit.organizeImports",
            "arguments": [OTHER],
        }))
        .unwrap(),
    );
    server.set_destinations(package_destinations());
    server.set_move_result(result);
    editor.choose(Some(1));
    editor.fail_commands();
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let err = client.service().moves().move_file(vec![url(A)]).await.unwrap_err();

    assert!(matches!(err, RefactorError::Editor(_)));
    assert_eq!(editor.applied().len(), 1);
    assert_eq!(editor.commands().len(), 1);
    assert_eq!(
        editor.saved(),
        vec![url("file:///workspace/src/com/example/b/A.java"), url(OTHER)]
    );
}

#[tokio::test]
async fn test_package_without_location_skips_collision_check() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(json!({
        "destinations": [{"displayName": "com.example.b", "path": "src/com/example/b"}],
    }));
    server.set_move_result(rename_into_target("A.java"));
    let fs = StubFileSystem::with_files(&["/workspace/src/com/example/b/A.java"]);
    let client = client(&server, &editor, fs);

    let outcome = client.service().moves().move_file(vec![url(A)]).await.unwrap();

    assert_eq!(outcome, Outcome::Applied);
    assert!(editor.warnings().is_empty());
    assert_eq!(server.move_requests()[0].source_uris, vec![A.to_string()]);
}

#[tokio::test]
async fn test_unopenable_document_is_skipped_on_save() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(package_destinations());
    server.set_move_result(rename_into_target("A.java"));
    editor.choose(Some(1));
    editor.mark_missing(&url(OTHER));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let outcome = client.service().moves().move_file(vec![url(A)]).await.unwrap();

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(editor.saved(), vec![url("file:///workspace/src/com/example/b/A.java")]);
    assert!(editor.errors().is_empty());
}

#[tokio::test]
async fn test_destination_error_is_shown_verbatim() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(json!({"errorMessage": "The project is not a Java project."}));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let err = client.service().moves().move_file(vec![url(A)]).await.unwrap_err();

    assert!(matches!(err, RefactorError::Server(message) if message == "The project is not a Java project."));
    assert_eq!(editor.errors(), vec!["The project is not a Java project."]);
    assert!(editor.picks().is_empty());
    assert!(server.move_requests().is_empty());
}

#[tokio::test]
async fn test_no_package_destinations() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(json!({"destinations": []}));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let err = client.service().moves().move_file(vec![url(A)]).await.unwrap_err();

    assert!(matches!(err, RefactorError::NoDestinations(_)));
    assert_eq!(
        editor.errors(),
        vec!["Cannot find available Java packages to move the selected files to."]
    );
}

#[tokio::test]
async fn test_dismissed_package_picker_cancels() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(package_destinations());
    editor.choose(None);
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let outcome = client.service().moves().move_file(vec![url(A)]).await.unwrap();

    assert_eq!(outcome, Outcome::Cancelled);
    assert!(server.move_requests().is_empty());
    assert!(editor.saved().is_empty());
}

#[tokio::test]
async fn test_move_file_through_apply_refactoring() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(package_destinations());
    server.set_move_result(rename_into_target("A.java"));
    editor.choose(Some(1));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let outcome = client
        .apply_refactoring("moveFile", json!(null), Some(json!({"uri": A})))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(server.move_requests()[0].source_uris, vec![A.to_string()]);
}

#[tokio::test]
async fn test_move_instance_method_to_field_type() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(json!({
        "destinations": [
            {"bindingKey": "Lcom/example/Foo;.repo", "name": "repo", "type": "Repository", "isField": true},
            {"bindingKey": "Lcom/example/Foo;.run(LLogger;)V#logger", "name": "logger", "type": "Logger", "isField": false},
        ],
    }));
    server.set_move_result(RefactorWorkspaceEdit::with_edit(edit(json!({"changes": {}}))));
    editor.choose(Some(1));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let outcome = client
        .apply_refactoring(
            "moveInstanceMethod",
            code_action_params(OTHER),
            Some(json!({"displayName": "save"})),
        )
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Applied);
    let picks = editor.picks();
    assert_eq!(picks[0].placeholder, "Select the new class for the instance method save.");
    assert_eq!(picks[0].items[0].label, "Repository repo");
    assert_eq!(picks[0].items[0].description.as_deref(), Some("Field"));
    assert_eq!(picks[0].items[1].label, "Logger logger");
    assert_eq!(picks[0].items[1].description.as_deref(), Some("Method Parameter"));

    let queries = server.destination_requests();
    assert_eq!(queries[0].move_kind, MoveKind::MoveInstanceMethod);
    assert!(queries[0].params.is_some());
    let moves = server.move_requests();
    assert_eq!(moves[0].move_kind, MoveKind::MoveInstanceMethod);
    assert_eq!(moves[0].destination.as_ref().map(MoveDestination::display_name), Some("logger"));
}

#[tokio::test]
async fn test_move_instance_method_without_targets() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(json!({"destinations": []}));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let err = client
        .apply_refactoring("moveInstanceMethod", code_action_params(OTHER), None)
        .await
        .unwrap_err();

    assert!(matches!(err, RefactorError::NoDestinations(_)));
    assert_eq!(
        editor.errors(),
        vec!["Cannot find possible class targets to move the selected method to."]
    );
    assert!(server.move_requests().is_empty());
}

#[tokio::test]
async fn test_move_static_member_excludes_enclosing_type() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_symbols(vec![
        symbol("Foo", Some("com.example"), 5),
        symbol("Bar", Some("com.example"), 5),
        symbol("Shape", Some("com.example"), 11),
        symbol("run", Some("com.example.Bar"), 6),
        symbol("Color", Some("com.example"), 10),
    ]);
    server.set_move_result(RefactorWorkspaceEdit::with_edit(edit(json!({"changes": {}}))));
    editor.choose(Some(1));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let outcome = client
        .apply_refactoring(
            "moveStaticMember",
            code_action_params(OTHER),
            Some(json!({
                "displayName": "COUNT",
                "enclosingTypeName": "com.example.Foo",
                "memberType": 23,
                "projectName": "demo",
            })),
        )
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Applied);
    let picks = editor.picks();
    assert_eq!(picks[0].placeholder, "Select the new class for the static member COUNT.");
    let labels: Vec<&str> = picks[0].items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["Bar", "Shape", "Color"]);
    assert_eq!(picks[0].items[0].description.as_deref(), Some("com.example"));

    let search = server
        .requests()
        .into_iter()
        .find_map(|request| match request {
            common::Request::SearchSymbols(params) => Some(params),
            _ => None,
        })
        .unwrap();
    assert_eq!(search.query, "*");
    assert_eq!(search.source_only, Some(true));
    assert_eq!(search.project_name.as_deref(), Some("demo"));

    let moves = server.move_requests();
    assert_eq!(moves[0].move_kind, MoveKind::MoveStaticMember);
    assert_eq!(moves[0].destination.as_ref().map(MoveDestination::display_name), Some("Shape"));
}

#[tokio::test]
async fn test_move_member_type_excludes_itself() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_symbols(vec![
        symbol("Foo", Some("com.example"), 5),
        symbol("Inner", Some("com.example.Foo"), 5),
        symbol("Bar", Some("com.example"), 5),
    ]);
    editor.choose(None);
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let outcome = client
        .apply_refactoring(
            "moveStaticMember",
            code_action_params(OTHER),
            Some(json!({
                "displayName": "Inner",
                "enclosingTypeName": "com.example.Foo",
                "memberType": 55,
            })),
        )
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Cancelled);
    let picks = editor.picks();
    assert_eq!(picks[0].placeholder, "Select the new class for the type Inner.");
    let labels: Vec<&str> = picks[0].items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["Bar"]);
    assert!(server.move_requests().is_empty());
}

#[tokio::test]
async fn test_move_static_member_without_classes() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_symbols(vec![symbol("Foo", Some("com.example"), 5)]);
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let err = client
        .apply_refactoring(
            "moveStaticMember",
            code_action_params(OTHER),
            Some(json!({"displayName": "COUNT", "enclosingTypeName": "com.example.Foo"})),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RefactorError::NoDestinations(_)));
    assert_eq!(editor.errors().len(), 1);
    assert!(editor.errors()[0].starts_with("Cannot find available"));
    assert!(editor.picks().is_empty());
}

#[tokio::test]
async fn test_move_type_to_another_package() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_destinations(package_destinations());
    server.set_move_result(rename_into_target("A.java"));
    editor.choose(Some(0));
    editor.choose(Some(1));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    let outcome = client
        .apply_refactoring(
            "moveType",
            code_action_params(A),
            Some(json!({"displayName": "A", "supportedDestinationKinds": ["package"]})),
        )
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Applied);
    let picks = editor.picks();
    assert_eq!(picks.len(), 2);
    assert_eq!(picks[0].items[0].label, "Move type to another package");
    assert_eq!(picks[1].placeholder, "Choose the target package for the type A.");

    let moves = server.move_requests();
    assert_eq!(moves[0].move_kind, MoveKind::MoveResource);
    assert_eq!(moves[0].source_uris, vec![A.to_string()]);
    assert!(moves[0].params.is_some());
    assert_eq!(moves[0].update_references, Some(true));
    assert_eq!(
        editor.saved(),
        vec![url("file:///workspace/src/com/example/b/A.java"), url(OTHER)]
    );
}

#[tokio::test]
async fn test_move_type_to_another_class() {
    let server = StubServer::new();
    let editor = RecordingEditor::new();
    server.set_symbols(vec![symbol("A", Some("com.example.a"), 5), symbol("Bar", Some("com.example"), 5)]);
    server.set_move_result(RefactorWorkspaceEdit::with_edit(edit(json!({"changes": {}}))));
    editor.choose(Some(0));
    let client = client(&server, &editor, StubFileSystem::with_files(&[]));

    client
        .apply_refactoring(
            "moveType",
            code_action_params(A),
            Some(json!({
                "displayName": "A",
                "enclosingTypeName": "com.example.a",
                "supportedDestinationKinds": ["class"],
            })),
        )
        .await
        .unwrap();

    let picks = editor.picks();
    assert_eq!(picks[1].placeholder, "Select the new class for the type A.");
    let labels: Vec<&str> = picks[1].items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["Bar"]);
    assert_eq!(server.move_requests()[0].move_kind, MoveKind::MoveTypeToClass);
}

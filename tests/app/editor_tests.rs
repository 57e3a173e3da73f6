use std::sync::Arc;

use serde_json::json;

use question_editor::app::{
    CommitKind, EditorError, EditorOptions, NotificationKind, NotificationLog, QuestionEditor,
    SaveBlocker, SchemaCoordinate, SessionPhase,
};
use question_editor::domain::{
    Answer, Concept, FormSchema, Question, QuestionType, Rendering, parse_form_schema,
};
use question_editor::form::FieldCommand;

fn host() -> Arc<FormSchema> {
    let document = json!({
        "name": "Intake",
        "encounterType": "e-1",
        "pages": [{
            "label": "Page 1",
            "sections": [
                {
                    "label": "Vitals",
                    "isExpanded": "true",
                    "questions": [
                        {"id": "q1", "type": "obs", "questionOptions": {"rendering": "number", "concept": "c-1"}},
                        {"id": "q2", "type": "obs", "questionOptions": {"rendering": "number", "concept": "c-2"}},
                        {
                            "id": "q3",
                            "type": "obs",
                            "questionOptions": {
                                "rendering": "select",
                                "concept": "c-3",
                                "answers": [{"concept": "a-1", "label": "One"}]
                            },
                            "validators": [{"type": "js_expression"}]
                        }
                    ]
                },
                {"label": "Notes", "questions": []}
            ]
        }]
    });
    Arc::new(parse_form_schema(&document).unwrap())
}

fn valid_new_question(editor: &mut QuestionEditor, id: &str) {
    editor.dispatch(FieldCommand::SetId(id.into())).unwrap();
    editor
        .dispatch(FieldCommand::SetRendering(Some(Rendering::Text)))
        .unwrap();
}

#[test]
fn created_question_is_appended_to_its_section() {
    let schema = host();
    let log = Arc::new(NotificationLog::new());
    let mut editor = QuestionEditor::create(Arc::clone(&schema), 0, 1).with_notifier(log.clone());
    valid_new_question(&mut editor, "remarks");

    let mut saved = Vec::new();
    let kind = editor.save(|updated| saved.push(updated)).unwrap();

    assert_eq!(kind, CommitKind::Created);
    assert_eq!(saved.len(), 1);
    let notes = &saved[0].pages[0].sections[1].questions;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, "remarks");
    assert_eq!(notes[0].kind, QuestionType::Control);

    let last = log.last().unwrap();
    assert_eq!(last.kind, NotificationKind::Success);
    assert_eq!(last.title, "Success!");
    assert_eq!(last.subtitle, "New question created");
    assert_eq!(editor.phase(), SessionPhase::Committed);
}

#[test]
fn edited_question_replaces_its_slot_and_leaves_input_untouched() {
    let schema = host();
    let before = (*schema).clone();
    let log = Arc::new(NotificationLog::new());
    let mut editor = QuestionEditor::edit(Arc::clone(&schema), SchemaCoordinate::at(0, 0, 2))
        .unwrap()
        .with_notifier(log.clone());
    assert!(!editor.is_new());
    editor
        .dispatch(FieldCommand::SetLabel(Some("Mood".into())))
        .unwrap();

    let mut saved = None;
    assert_eq!(
        editor.save(|updated| saved = Some(updated)).unwrap(),
        CommitKind::Updated
    );
    let saved = saved.unwrap();

    let questions = &saved.pages[0].sections[0].questions;
    assert_eq!(questions.len(), 3);
    assert_eq!(questions[2].label.as_deref(), Some("Mood"));
    assert_eq!(questions[2].extra["validators"], json!([{"type": "js_expression"}]));
    assert_eq!(*schema, before);
    assert_eq!(log.last().unwrap().subtitle, "Question updated");
}

#[test]
fn pending_additional_answers_are_saved() {
    let mut editor = QuestionEditor::edit(host(), SchemaCoordinate::at(0, 0, 2)).unwrap();
    editor
        .dispatch(FieldCommand::AddAdditionalAnswer(Answer::new("a-2", "Two")))
        .unwrap();

    let mut saved = None;
    editor.save(|updated| saved = Some(updated)).unwrap();
    let question = &saved.unwrap().pages[0].sections[0].questions[2];
    assert_eq!(
        question.answers(),
        [Answer::new("a-1", "One"), Answer::new("a-2", "Two")]
    );
}

#[test]
fn unknown_properties_survive_a_save() {
    let mut editor = QuestionEditor::edit(host(), SchemaCoordinate::at(0, 0, 0)).unwrap();
    editor
        .dispatch(FieldCommand::SetLabel(Some("Weight".into())))
        .unwrap();

    let mut saved = None;
    editor.save(|updated| saved = Some(updated)).unwrap();
    let value = serde_json::to_value(saved.unwrap()).unwrap();

    assert_eq!(value["encounterType"], json!("e-1"));
    assert_eq!(value["pages"][0]["sections"][0]["isExpanded"], json!("true"));
    assert_eq!(
        value["pages"][0]["sections"][0]["questions"][0]["questionOptions"]["concept"],
        json!("c-1")
    );
}

#[test]
fn save_gate_lists_every_blocker() {
    let mut editor = QuestionEditor::create(host(), 0, 0);
    editor
        .dispatch(FieldCommand::SetType(QuestionType::Obs))
        .unwrap();
    assert_eq!(
        editor.save_blockers(),
        [
            SaveBlocker::MissingId,
            SaveBlocker::MissingConcept,
            SaveBlocker::MissingRendering,
        ]
    );

    editor.dispatch(FieldCommand::SetId("q1".into())).unwrap();
    editor
        .dispatch(FieldCommand::SetRendering(Some(Rendering::Number)))
        .unwrap();
    editor
        .dispatch(FieldCommand::BindConcept(Some(Concept::new("c-9", "Nine"))))
        .unwrap();
    assert_eq!(
        editor.save_blockers(),
        [SaveBlocker::DuplicateId("q1".into())]
    );
    assert!(!editor.can_save());

    editor.dispatch(FieldCommand::SetId("q9".into())).unwrap();
    assert!(editor.can_save());
}

#[test]
fn editing_in_place_keeps_its_own_id() {
    let mut editor = QuestionEditor::edit(host(), SchemaCoordinate::at(0, 0, 1)).unwrap();
    assert!(editor.can_save());
    assert!(!editor.is_duplicate_id("q2"));

    editor.dispatch(FieldCommand::SetId("q3".into())).unwrap();
    assert!(editor.is_duplicate_id("q3"));
    assert!(!editor.can_save());
}

#[test]
fn blocked_save_notifies_nobody() {
    let log = Arc::new(NotificationLog::new());
    let mut editor = QuestionEditor::create(host(), 0, 0).with_notifier(log.clone());
    let mut called = false;

    let err = editor.save(|_| called = true).unwrap_err();
    assert!(matches!(err, EditorError::SaveBlocked(_)));
    assert!(!called);
    assert!(log.entries().is_empty());
    assert_eq!(editor.phase(), SessionPhase::Created);
}

#[test]
fn failed_write_is_notified_and_keeps_session_open() {
    let log = Arc::new(NotificationLog::new());
    let options = EditorOptions::default().with_failure_title("Could not save");
    let mut editor = QuestionEditor::create(host(), 0, 7)
        .with_notifier(log.clone())
        .with_options(options);
    valid_new_question(&mut editor, "orphan");

    let mut called = false;
    let err = editor.save(|_| called = true).unwrap_err();
    assert!(matches!(err, EditorError::Commit(_)));
    assert!(!called);

    let last = log.last().unwrap();
    assert_eq!(last.kind, NotificationKind::Error);
    assert_eq!(last.title, "Could not save");
    assert_eq!(last.subtitle, "section 7 does not exist");
    assert_eq!(editor.phase(), SessionPhase::Editing);
    assert!(editor.dispatch(FieldCommand::SetId("again".into())).is_ok());
}

#[test]
fn closed_sessions_reject_further_work() {
    let mut editor = QuestionEditor::edit(host(), SchemaCoordinate::at(0, 0, 0)).unwrap();
    editor.cancel().unwrap();
    assert_eq!(editor.phase(), SessionPhase::Discarded);
    assert_eq!(
        editor.dispatch(FieldCommand::SetId("late".into())),
        Err(EditorError::SessionClosed(SessionPhase::Discarded))
    );
    assert!(matches!(
        editor.save(|_| {}),
        Err(EditorError::SessionClosed(SessionPhase::Discarded))
    ));

    let mut editor = QuestionEditor::create(host(), 0, 1);
    valid_new_question(&mut editor, "once");
    editor.save(|_| {}).unwrap();
    assert!(editor.cancel().is_err());
}

#[test]
fn missing_question_cannot_be_opened() {
    let err = QuestionEditor::edit(host(), SchemaCoordinate::at(0, 0, 9)).err();
    assert_eq!(
        err,
        Some(EditorError::QuestionNotFound(SchemaCoordinate::at(0, 0, 9)))
    );
}

#[test]
fn group_member_edits_are_saved_with_the_group() {
    let mut editor = QuestionEditor::create(host(), 0, 1);
    valid_new_question(&mut editor, "bp");
    editor
        .dispatch(FieldCommand::SetType(QuestionType::ObsGroup))
        .unwrap();
    editor.dispatch(FieldCommand::AddGroupMember).unwrap();
    editor.dispatch(FieldCommand::AddGroupMember).unwrap();

    let field = editor.field_mut().unwrap();
    let mut systolic = field.open_group_member(0).unwrap();
    systolic.dispatch(FieldCommand::SetId("systolic".into()));
    let mut diastolic = field.open_group_member(1).unwrap();
    diastolic.dispatch(FieldCommand::SetId("diastolic".into()));
    assert_eq!(field.receive_group_updates(), 2);

    let mut saved = None;
    editor.save(|updated| saved = Some(updated)).unwrap();
    let group = &saved.unwrap().pages[0].sections[1].questions[0];
    let ids: Vec<&str> = group.members().iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, ["systolic", "diastolic"]);
}

#[test]
fn nested_duplicate_blocks_group_save() {
    let mut editor = QuestionEditor::create(host(), 0, 1);
    valid_new_question(&mut editor, "bp");
    editor.dispatch(FieldCommand::AddGroupMember).unwrap();

    let field = editor.field_mut().unwrap();
    let mut member = field.open_group_member(0).unwrap();
    member.dispatch(FieldCommand::SetId("bp".into()));
    field.receive_group_updates();

    assert!(editor.is_duplicate_id("bp"));
    assert!(!editor.can_save());
}

#[test]
fn open_member_edits_are_saved_without_explicit_splice() {
    let mut editor = QuestionEditor::create(host(), 0, 1);
    valid_new_question(&mut editor, "bp");
    editor
        .dispatch(FieldCommand::SetType(QuestionType::ObsGroup))
        .unwrap();
    editor.dispatch(FieldCommand::AddGroupMember).unwrap();

    let mut member = editor.field_mut().unwrap().open_group_member(0).unwrap();
    member.dispatch(FieldCommand::SetId("systolic".into()));

    let mut saved = None;
    editor.save(|updated| saved = Some(updated)).unwrap();
    let group = &saved.unwrap().pages[0].sections[1].questions[0];
    assert_eq!(group.members()[0].id, "systolic");
}

#[test]
fn open_member_duplicate_blocks_save() {
    let log = Arc::new(NotificationLog::new());
    let mut editor = QuestionEditor::create(host(), 0, 1).with_notifier(log.clone());
    valid_new_question(&mut editor, "bp");
    editor.dispatch(FieldCommand::AddGroupMember).unwrap();

    let mut member = editor.field_mut().unwrap().open_group_member(0).unwrap();
    member.dispatch(FieldCommand::SetId("q1".into()));

    let err = editor.save(|_| {}).unwrap_err();
    assert_eq!(
        err,
        EditorError::SaveBlocked(vec![SaveBlocker::DuplicateId("q1".into())])
    );
    assert!(log.entries().is_empty());
    assert_eq!(editor.field().question().members()[0].id, "q1");
}

#[test]
fn working_copy_can_start_from_an_external_question() {
    let schema = host();
    let original = schema.question(0, 0, 0).cloned();
    let mut working = Question::template();
    working.id = "q1".into();
    working.options_mut().rendering = Some(Rendering::Text);

    let mut editor = QuestionEditor::with_working_copy(
        schema,
        SchemaCoordinate::at(0, 0, 0),
        original,
        working,
    );
    assert!(editor.can_save());
    assert!(!editor.is_new());
}

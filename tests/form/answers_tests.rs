use question_editor::domain::{Answer, Concept, ConceptAnswer, Question};
use question_editor::form::{
    FieldCommand, QuestionFieldState, SelectedAnswer, dedup_answers, move_answer,
    reconcile_answers,
};

fn mood() -> Concept {
    Concept::coded(
        "c-mood",
        "Mood",
        [
            ConceptAnswer::new("a-happy", "Happy"),
            ConceptAnswer::new("a-sad", "Sad"),
            ConceptAnswer::new("a-calm", "Calm"),
        ],
    )
}

fn ids(answers: &[Answer]) -> Vec<&str> {
    answers.iter().map(|answer| answer.concept.as_str()).collect()
}

fn state_with(answers: Vec<Answer>) -> QuestionFieldState {
    let mut question = Question::template();
    question.set_answers(answers);
    QuestionFieldState::new(question)
}

#[test]
fn native_answers_lead_and_take_committed_labels() {
    let committed = vec![
        Answer::new("x-extra", "Extra"),
        Answer::new("a-sad", "Gloomy"),
    ];
    let display = reconcile_answers(Some(&mood()), &committed);
    assert_eq!(
        display,
        vec![
            Answer::new("a-happy", "Happy"),
            Answer::new("a-sad", "Gloomy"),
            Answer::new("a-calm", "Calm"),
            Answer::new("x-extra", "Extra"),
        ]
    );
}

#[test]
fn committed_list_is_shown_verbatim_without_native_answers() {
    let committed = vec![Answer::new("b", "B"), Answer::new("a", "A")];
    assert_eq!(reconcile_answers(None, &committed), committed);

    let plain = Concept::new("c-plain", "Plain");
    assert_eq!(reconcile_answers(Some(&plain), &committed), committed);
}

#[test]
fn empty_inputs_reconcile_to_native_answers_only() {
    assert!(reconcile_answers(None, &[]).is_empty());
    assert_eq!(ids(&reconcile_answers(Some(&mood()), &[])), ["a-happy", "a-sad", "a-calm"]);
}

#[test]
fn reconciled_list_has_unique_ids_and_is_stable_under_dedup() {
    let committed = vec![
        Answer::new("x", "First"),
        Answer::new("a-happy", "Glad"),
        Answer::new("x", "Second"),
    ];
    let display = reconcile_answers(Some(&mood()), &committed);
    assert_eq!(ids(&display), ["a-happy", "a-sad", "a-calm", "x"]);
    assert_eq!(display[3].label, "First");
    assert_eq!(dedup_answers(display.clone()), display);
}

#[test]
fn move_is_stable_for_other_elements() {
    let answers = vec![
        Answer::new("a", "A"),
        Answer::new("b", "B"),
        Answer::new("c", "C"),
        Answer::new("d", "D"),
    ];
    let forward = move_answer(&answers, "a", "c").unwrap();
    assert_eq!(ids(&forward), ["b", "c", "a", "d"]);
    let backward = move_answer(&answers, "d", "b").unwrap();
    assert_eq!(ids(&backward), ["a", "d", "b", "c"]);
}

#[test]
fn move_with_unknown_or_same_id_is_a_no_op() {
    let mut state = state_with(vec![Answer::new("a", "A"), Answer::new("b", "B")]);
    assert!(!state.dispatch(FieldCommand::MoveAnswer {
        source: "a".into(),
        target: "missing".into(),
    }));
    assert!(!state.dispatch(FieldCommand::MoveAnswer {
        source: "b".into(),
        target: "b".into(),
    }));
    assert_eq!(state.revision(), 0);

    assert!(state.dispatch(FieldCommand::MoveAnswer {
        source: "b".into(),
        target: "a".into(),
    }));
    assert_eq!(ids(state.question().answers()), ["b", "a"]);
}

#[test]
fn identical_selection_emits_nothing() {
    let mut state = state_with(vec![Answer::new("a", "A"), Answer::new("b", "B")]);
    let same = vec![SelectedAnswer::new("a", "A"), SelectedAnswer::new("b", "B")];
    assert!(!state.dispatch(FieldCommand::SelectAnswers(same)));
    assert_eq!(state.revision(), 0);

    let relabeled = vec![SelectedAnswer::new("a", "Alpha")];
    assert!(state.dispatch(FieldCommand::SelectAnswers(relabeled)));
    assert_eq!(state.question().answers(), [Answer::new("a", "Alpha")]);
}

#[test]
fn additional_answers_stay_in_both_lists() {
    let mut state = state_with(vec![Answer::new("a", "A")]);
    let extra = Answer::new("x", "Extra");

    assert!(state.dispatch(FieldCommand::AddAdditionalAnswer(extra.clone())));
    assert_eq!(state.additional_answers(), [extra.clone()]);
    assert_eq!(ids(state.question().answers()), ["a", "x"]);

    // already present in either list
    assert!(!state.dispatch(FieldCommand::AddAdditionalAnswer(extra.clone())));
    assert!(!state.dispatch(FieldCommand::AddAdditionalAnswer(Answer::new("a", "Again"))));
    assert_eq!(state.additional_answers().len(), 1);

    assert!(state.dispatch(FieldCommand::RemoveAdditionalAnswer("x".into())));
    assert!(state.additional_answers().is_empty());
    assert_eq!(ids(state.question().answers()), ["a"]);
}

#[test]
fn deselecting_an_additional_answer_drops_it() {
    let mut state = state_with(vec![Answer::new("a", "A")]);
    state.dispatch(FieldCommand::AddAdditionalAnswer(Answer::new("x", "Extra")));
    state.dispatch(FieldCommand::SelectAnswers(vec![SelectedAnswer::new("a", "A")]));
    assert!(state.additional_answers().is_empty());
    assert_eq!(ids(state.question().answers()), ["a"]);
}

#[test]
fn display_answers_follow_bound_concept() {
    let mut state = state_with(vec![Answer::new("a-calm", "Serene")]);
    assert_eq!(ids(&state.display_answers()), ["a-calm"]);

    state.dispatch(FieldCommand::BindConcept(Some(mood())));
    let display = state.display_answers();
    assert_eq!(ids(&display), ["a-happy", "a-sad", "a-calm"]);
    assert_eq!(display[2].label, "Serene");
}

//! End-to-end scenarios through the public `Tutor` API.

use std::collections::HashSet;
use tutor_core::{
    LanguageId, Strategy, StoryRequest, TestHarness, Tutor, TutorConfig, TutorError, VocabId,
    WordBound,
};

#[test]
fn test_ana_greetings_story() {
    let mut tutor = Tutor::new(TutorConfig::default().with_seed(1));

    let ana = tutor
        .create_user("Ana", "ana@example.com", "password1")
        .unwrap();
    let spanish = tutor
        .languages()
        .iter()
        .find(|l| l.name == "Spanish")
        .map(|l| l.id)
        .unwrap();
    let enrollment = tutor.enroll(ana.id, spanish).unwrap();

    let added = tutor
        .add_vocabulary(ana.id, enrollment.id, "hola, adios, gracias", None, None)
        .unwrap();
    assert!(added.iter().all(|item| item.meaning.is_none()));

    let request = StoryRequest::new(enrollment.id, Strategy::Manual)
        .with_manual_ids(added.iter().map(|item| item.id))
        .with_max_words(WordBound::from_input("5"))
        .with_theme("greetings");
    let story = tutor.generate_story(ana.id, &request).unwrap();

    assert!(story.text.contains("hola, adios, gracias"));
    let summary = story.text.split("\n\n").last().unwrap();
    assert!(summary.contains("Spanish"));
    assert!(summary.contains("greetings"));

    assert_eq!(story.metadata.word_count, 3);
    assert_eq!(story.metadata.strategy, Strategy::Manual);
    assert_eq!(story.metadata.language_name, "Spanish");
    assert_eq!(tutor.current_story(), Some(&story));
}

#[test]
fn test_login_is_case_insensitive_on_email() {
    let mut tutor = Tutor::new(TutorConfig::default());
    let created = tutor
        .create_user("Ana", "Ana@Example.COM", "password1")
        .unwrap();

    assert_eq!(tutor.authenticate("ana@example.com", "password1").unwrap(), created);
    assert_eq!(
        tutor.authenticate("ana@example.com", "PASSWORD1").unwrap_err(),
        TutorError::InvalidCredentials
    );
    assert!(matches!(
        tutor.create_user("Ana 2", "ANA@example.com", "password2"),
        Err(TutorError::DuplicateEmail(_))
    ));
}

#[test]
fn test_enroll_twice_is_a_no_op() {
    let mut harness = TestHarness::new();
    let again = harness
        .tutor
        .enroll(harness.user_id, LanguageId::new(2))
        .unwrap();
    assert_eq!(again.id, harness.enrollment_id);
    assert_eq!(harness.tutor.store().enrollments().len(), 1);
    assert_eq!(harness.tutor.list_enrollments(harness.user_id).len(), 1);
}

#[test]
fn test_list_vocabulary_by_proficiency() {
    let mut harness = TestHarness::new();
    harness.add_words("hola, adios", Some("Beginner"));
    harness.add_words("sin embargo", Some("advanced"));
    harness.add_words("gracias", None);

    let beginner = harness
        .tutor
        .list_vocabulary(harness.user_id, harness.enrollment_id, Some("beginner"))
        .unwrap();
    let words: Vec<_> = beginner.iter().map(|i| i.word.as_str()).collect();
    assert_eq!(words, vec!["hola", "adios"]);

    let all = harness
        .tutor
        .list_vocabulary(harness.user_id, harness.enrollment_id, Some("any"))
        .unwrap();
    assert_eq!(all.len(), 4);
}

#[test]
fn test_manual_regeneration_is_idempotent() {
    let mut harness = TestHarness::new();
    let ids = harness.add_words("sol, luna, estrella, cielo", None);

    let request = StoryRequest::new(harness.enrollment_id, Strategy::Manual)
        .with_manual_ids(ids[1..3].iter().copied())
        .with_theme("night sky");
    let first = harness
        .tutor
        .generate_story(harness.user_id, &request)
        .unwrap();
    let second = harness
        .tutor
        .generate_story(harness.user_id, &request)
        .unwrap();

    assert_eq!(first.text, second.text);
    assert_eq!(first.metadata.words, vec!["luna", "estrella"]);
}

#[test]
fn test_theme_story_prefers_matching_words() {
    let mut harness = TestHarness::new();
    harness.add_words_with_meaning("mercado", "market");
    harness.add_words("perro, gato, casa", None);

    let request =
        StoryRequest::new(harness.enrollment_id, Strategy::Theme).with_theme("market day");
    let story = harness
        .tutor
        .generate_story(harness.user_id, &request)
        .unwrap();

    assert!(!story.metadata.theme_fallback);
    assert_eq!(story.metadata.words, vec!["mercado"]);
}

#[test]
fn test_random_story_stays_within_pool_and_bound() {
    let mut harness = TestHarness::new();
    let words: Vec<String> = (1..=30).map(|i| format!("w{i}")).collect();
    let ids: HashSet<VocabId> = harness.add_words(&words.join("\n"), None).into_iter().collect();

    let request = StoryRequest::new(harness.enrollment_id, Strategy::Random)
        .with_max_words(WordBound::from_requested(12));
    let story = harness
        .tutor
        .generate_story(harness.user_id, &request)
        .unwrap();

    assert_eq!(story.metadata.word_count, 12);
    assert!(story.metadata.words.iter().all(|w| words.contains(w)));
    assert_eq!(ids.len(), 30);
}

#[test]
fn test_seeded_tutors_agree() {
    let build = || {
        let mut harness = TestHarness::new();
        let words: Vec<String> = (1..=25).map(|i| format!("w{i}")).collect();
        harness.add_words(&words.join(","), None);
        let request = StoryRequest::new(harness.enrollment_id, Strategy::Random)
            .with_max_words(WordBound::from_requested(5));
        harness
            .tutor
            .generate_story(harness.user_id, &request)
            .unwrap()
            .metadata
            .words
    };
    assert_eq!(build(), build());
}

#[test]
fn test_story_for_foreign_enrollment_rejected() {
    let mut harness = TestHarness::new();
    harness.add_words("hola", None);
    let ben = harness
        .tutor
        .create_user("Ben", "ben@example.com", "password2")
        .unwrap();

    let request = StoryRequest::new(harness.enrollment_id, Strategy::Random);
    assert_eq!(
        harness.tutor.generate_story(ben.id, &request).unwrap_err(),
        TutorError::EnrollmentNotFound(harness.enrollment_id)
    );
}

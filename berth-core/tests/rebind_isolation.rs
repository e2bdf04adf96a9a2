//! A single rebind checks one provider, reads one workspace, writes one
//! workspace, and nothing else.

mod common;

use berth_core::{rebind, ProviderName, RebindError, WorkspaceId};
use common::{binding, bindings, ctx, pairs, provider_names, seed, Call, FlakyStore};
use tempfile::TempDir;

fn fixture() -> TempDir {
    let home = TempDir::new().expect("tempdir");
    seed(home.path(), &["a", "b"], &[("w1", "a"), ("w2", "a"), ("w3", "b")]);
    home
}

#[test]
fn rebind_touches_exactly_one_record() {
    let home = fixture();
    let store = FlakyStore::new(home.path());

    let outcome = rebind(&store, &ctx(), &WorkspaceId::from("w1"), &ProviderName::from("b"))
        .expect("rebind");

    assert_eq!(outcome.previous, ProviderName::from("a"));
    assert_eq!(
        store.calls(),
        vec![
            Call::Exists("b".into()),
            Call::Load("w1".into()),
            Call::Save("w1".into()),
        ]
    );
    assert_eq!(
        bindings(home.path()),
        pairs(&[("w1", "b"), ("w2", "a"), ("w3", "b")])
    );
    assert_eq!(provider_names(home.path()), vec!["a", "b"]);
}

#[test]
fn missing_target_provider_writes_nothing() {
    let home = fixture();
    let store = FlakyStore::new(home.path());

    let err = rebind(&store, &ctx(), &WorkspaceId::from("w1"), &ProviderName::from("ghost"))
        .unwrap_err();

    assert!(
        matches!(err, RebindError::TargetProviderNotFound { .. }),
        "got: {err}"
    );
    assert_eq!(store.calls(), vec![Call::Exists("ghost".into())]);
    assert_eq!(binding(home.path(), "w1"), "a");
}

#[test]
fn save_failure_is_reported_and_record_unchanged() {
    let home = fixture();
    let store = FlakyStore::new(home.path());
    store.fail_save("w2", "b");

    let err = rebind(&store, &ctx(), &WorkspaceId::from("w2"), &ProviderName::from("b"))
        .unwrap_err();

    assert!(matches!(err, RebindError::Save(_)), "got: {err}");
    assert!(err.to_string().starts_with("saving workspace config"));
    assert_eq!(binding(home.path(), "w2"), "a");
}

#[test]
fn missing_workspace_is_a_load_error() {
    let home = fixture();
    let store = FlakyStore::new(home.path());

    let err = rebind(&store, &ctx(), &WorkspaceId::from("nope"), &ProviderName::from("b"))
        .unwrap_err();

    assert!(matches!(err, RebindError::Load(ref e) if e.is_not_found()), "got: {err}");
    assert_eq!(
        store.calls(),
        vec![Call::Exists("b".into()), Call::Load("nope".into())]
    );
}

#[test]
fn path_like_names_are_rejected_without_writes() {
    let home = fixture();
    let store = FlakyStore::new(home.path());

    let err = rebind(&store, &ctx(), &WorkspaceId::from("../w1"), &ProviderName::from("b"))
        .unwrap_err();
    assert!(matches!(err, RebindError::Load(_)), "got: {err}");

    let err = rebind(&store, &ctx(), &WorkspaceId::from("w1"), &ProviderName::from(".."))
        .unwrap_err();
    assert!(matches!(err, RebindError::ProviderLookup { .. }), "got: {err}");

    assert!(!store.calls().iter().any(|c| matches!(c, Call::Save(_))));
    assert_eq!(
        bindings(home.path()),
        pairs(&[("w1", "a"), ("w2", "a"), ("w3", "b")])
    );
}

//! Registration and login against the on-disk user table

use doorgate_core::test_utils::test_config;
use doorgate_core::*;
use doorgate_store::StorageEngine;
use std::sync::Arc;
use std::thread;

#[test]
fn concurrent_registrations_of_one_username_have_one_winner() {
    let (engine, _temp) = StorageEngine::temp().unwrap();
    let service = Arc::new(AuthService::new(&test_config(), engine.users().unwrap()).unwrap());

    let results: Vec<Result<String>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                scope.spawn(move || {
                    service.register(Credentials::new("racer01", format!("password-{}", i)))
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.kind() == ErrorKind::Conflict))
        .count();

    assert_eq!(winners, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(service.store().count().unwrap(), 1);
}

#[test]
fn concurrent_registrations_of_distinct_usernames_all_succeed() {
    let (engine, _temp) = StorageEngine::temp().unwrap();
    let service = Arc::new(AuthService::new(&test_config(), engine.users().unwrap()).unwrap());

    thread::scope(|scope| {
        for i in 0..8 {
            let service = service.clone();
            scope.spawn(move || {
                service
                    .register(Credentials::new(format!("user{:02}", i), "Secret1"))
                    .unwrap();
            });
        }
    });

    assert_eq!(service.store().count().unwrap(), 8);
    for i in 0..8 {
        let login = service.login(Credentials::new(format!("user{:02}", i), "Secret1"));
        assert!(login.is_ok());
    }
}

#[test]
fn racing_handles_on_one_engine_claim_a_username_once() {
    let (engine, _temp) = StorageEngine::temp().unwrap();
    let handles = [engine.users().unwrap(), engine.users().unwrap()];

    let outcomes: Vec<(usize, InsertOutcome)> = thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|i| {
                let users = handles[i % 2].clone();
                scope.spawn(move || {
                    let outcome = users.insert_user("racer01", &format!("hash-{}", i)).unwrap();
                    (i, outcome)
                })
            })
            .collect();

        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    let winners: Vec<usize> = outcomes
        .iter()
        .filter(|(_, outcome)| *outcome == InsertOutcome::Inserted)
        .map(|(i, _)| *i)
        .collect();
    assert_eq!(winners.len(), 1);

    // the winner's hash is the one that stuck
    let stored = handles[1].find_by_username("racer01").unwrap().unwrap();
    assert_eq!(stored.password_hash, format!("hash-{}", winners[0]));
    assert_eq!(handles[0].count().unwrap(), 1);
}

#[test]
fn store_level_duplicate_is_a_conflict() {
    // a row written behind the service's back still blocks registration
    let (engine, _temp) = StorageEngine::temp().unwrap();
    let users = engine.users().unwrap();
    users.insert_user("alice01", "$argon2id$stub").unwrap();

    let service = AuthService::new(&test_config(), users).unwrap();
    let err = service.register(Credentials::new("alice01", "Secret1")).unwrap_err();
    assert!(matches!(err, DoorgateError::Conflict { .. }));
}

#[test]
fn login_survives_reopen() {
    let temp = tempfile::tempdir().unwrap();

    {
        let engine = StorageEngine::new(temp.path()).unwrap();
        let service = AuthService::new(&test_config(), engine.users().unwrap()).unwrap();
        service.register(Credentials::new("alice01", "Secret1")).unwrap();
    }

    let engine = StorageEngine::new(temp.path()).unwrap();
    let service = AuthService::new(&test_config(), engine.users().unwrap()).unwrap();
    assert!(service.login(Credentials::new("alice01", "Secret1")).is_ok());
    assert!(service.login(Credentials::new("alice01", "Secret2")).is_err());
}

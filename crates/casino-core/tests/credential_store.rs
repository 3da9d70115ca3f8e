use std::fs;
use std::sync::Arc;
use std::thread;

use age::secrecy::SecretString;
use casino_core::crypto::cipher::{encrypt, is_age_payload};
use casino_core::crypto::{PasswordHasher, PasswordParams};
use casino_core::{CasinoError, CredentialStore, StoreOptions};
use tempfile::tempdir;

const PASSPHRASE: &str = "test-passphrase-secure-123";

fn fast_options() -> StoreOptions {
    StoreOptions {
        work_factor: 10,
        password: PasswordParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
    }
}

fn assert_sealed(path: &std::path::Path) {
    let on_disk = fs::read(path).expect("read should succeed");
    assert!(is_age_payload(&on_disk), "credential file must be ciphertext at rest");
    assert!(!String::from_utf8_lossy(&on_disk).contains("@example.com"));
}

#[test]
fn test_create_then_authenticate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("usuarios.txt");
    let store = CredentialStore::open(&path, PASSPHRASE, fast_options())
        .expect("open should succeed");

    assert!(store.create_user("ana@example.com", "Secret1").unwrap());
    assert!(store.find_user("ana@example.com").unwrap());
    assert!(store.authenticate("ana@example.com", "Secret1").unwrap());
    assert!(!store.authenticate("ana@example.com", "Wrong99").unwrap());
    assert!(!store.authenticate("bob@example.com", "Secret1").unwrap());
    assert_sealed(&path);
}

#[test]
fn test_duplicate_user_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("usuarios.txt");
    let store = CredentialStore::open(&path, PASSPHRASE, fast_options()).unwrap();

    assert!(store.create_user("ana@example.com", "Secret1").unwrap());
    assert!(!store.create_user("ana@example.com", "Other22").unwrap());

    assert_eq!(store.usernames().unwrap(), vec!["ana@example.com".to_string()]);
    // The original password still wins.
    assert!(store.authenticate("ana@example.com", "Secret1").unwrap());
    assert!(!store.authenticate("ana@example.com", "Other22").unwrap());
}

#[test]
fn test_usernames_are_case_sensitive() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("usuarios.txt");
    let store = CredentialStore::open(&path, PASSPHRASE, fast_options()).unwrap();

    store.create_user("ana@example.com", "Secret1").unwrap();
    assert!(!store.find_user("Ana@example.com").unwrap());
    assert!(store.create_user("Ana@example.com", "Secret2").unwrap());
    assert_eq!(store.usernames().unwrap().len(), 2);
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("usuarios.txt");

    {
        let store = CredentialStore::open(&path, PASSPHRASE, fast_options()).unwrap();
        store.create_user("ana@example.com", "Secret1").unwrap();
        store.create_user("bob@example.com", "Secret2").unwrap();
    }

    let store = CredentialStore::open(&path, PASSPHRASE, fast_options()).unwrap();
    assert_eq!(
        store.usernames().unwrap(),
        vec!["ana@example.com".to_string(), "bob@example.com".to_string()]
    );
    assert!(store.authenticate("bob@example.com", "Secret2").unwrap());
}

#[test]
fn test_file_stays_encrypted_between_operations() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("usuarios.txt");
    let store = CredentialStore::open(&path, PASSPHRASE, fast_options()).unwrap();
    assert_sealed(&path);

    store.create_user("ana@example.com", "Secret1").unwrap();
    assert!(store.is_encrypted().unwrap());
    assert_sealed(&path);

    store.authenticate("ana@example.com", "Secret1").unwrap();
    assert_sealed(&path);

    store.find_user("nobody@example.com").unwrap();
    assert_sealed(&path);
}

#[test]
fn test_open_with_wrong_passphrase_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("usuarios.txt");
    CredentialStore::open(&path, PASSPHRASE, fast_options()).unwrap();

    let result = CredentialStore::open(&path, "wrong-passphrase-456", fast_options());
    assert!(matches!(result, Err(CasinoError::IncorrectPassphrase)));
}

#[test]
fn test_weak_passphrase_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("usuarios.txt");

    let result = CredentialStore::open(&path, "short", fast_options());
    assert!(matches!(result, Err(CasinoError::InvalidInput(_))));
    assert!(!path.exists());
}

#[test]
fn test_invalid_username_is_rejected_before_write() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("usuarios.txt");
    let store = CredentialStore::open(&path, PASSPHRASE, fast_options()).unwrap();

    for username in ["", "ana:evil@example.com", "ana@example.com\nbob"] {
        let result = store.create_user(username, "Secret1");
        assert!(matches!(result, Err(CasinoError::InvalidInput(_))), "{:?}", username);
    }
    assert!(store.usernames().unwrap().is_empty());
    assert_sealed(&path);
}

#[test]
fn test_plaintext_left_by_crash_is_recovered() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("usuarios.txt");

    // A process died between decrypt and re-encrypt.
    let hasher = PasswordHasher::new(fast_options().password).unwrap();
    let line = format!("ana@example.com:{}\n", hasher.hash("Secret1").unwrap());
    fs::write(&path, line).unwrap();

    let store = CredentialStore::open(&path, PASSPHRASE, fast_options()).unwrap();
    assert_sealed(&path);
    assert!(store.authenticate("ana@example.com", "Secret1").unwrap());
}

#[test]
fn test_concurrent_create_and_authenticate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("usuarios.txt");
    let store = Arc::new(CredentialStore::open(&path, PASSPHRASE, fast_options()).unwrap());

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let username = format!("user{}@example.com", i);
                let password = format!("Secret{}", i);
                assert!(store.create_user(&username, &password).unwrap());
                assert!(store.authenticate(&username, &password).unwrap());
                assert!(!store.create_user(&username, &password).unwrap());
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker should not panic");
    }

    let mut names = store.usernames().unwrap();
    names.sort();
    let expected: Vec<String> = (0..6).map(|i| format!("user{}@example.com", i)).collect();
    assert_eq!(names, expected);
    assert_sealed(&path);
}

#[test]
fn test_failed_operation_reseals_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("usuarios.txt");
    let store = CredentialStore::open(&path, PASSPHRASE, fast_options()).unwrap();

    // Valid ciphertext under the right passphrase, but the plaintext is not UTF-8.
    let passphrase = SecretString::from(PASSPHRASE.to_string());
    let garbage = encrypt(&[0xff, 0xfe, b'\n'], &passphrase, 10).unwrap();
    fs::write(&path, &garbage).unwrap();

    assert!(matches!(
        store.find_user("ana@example.com"),
        Err(CasinoError::Storage(_))
    ));
    assert!(is_age_payload(&fs::read(&path).unwrap()));
    assert!(store.is_encrypted().unwrap());

    assert!(store.authenticate("ana@example.com", "Secret1").is_err());
    assert!(store.create_user("ana@example.com", "Secret1").is_err());
    assert!(is_age_payload(&fs::read(&path).unwrap()));
    assert!(store.is_encrypted().unwrap());
}

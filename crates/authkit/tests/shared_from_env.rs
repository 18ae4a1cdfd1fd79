//! The process-wide session built lazily from `AUTHKIT_*` variables. Kept
//! in its own binary so the environment and the singleton start clean.

use std::sync::Barrier;
use std::thread;

use authkit::{AuthSession, Error, shared};
use tempfile::TempDir;

const VARS: [&str; 5] = [
    "AUTHKIT_REGION",
    "AUTHKIT_USER_POOL_ID",
    "AUTHKIT_CLIENT_ID",
    "AUTHKIT_CLIENT_SECRET",
    "AUTHKIT_ENDPOINT",
];

#[test]
fn test_shared_is_built_once_from_env() {
    let pool = TempDir::new().unwrap();

    // SAFETY: this binary has a single test and no other threads exist yet.
    unsafe {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    let err = shared().unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    // SAFETY: as above; the failed build spawned no threads.
    unsafe {
        std::env::set_var("AUTHKIT_USER_POOL_ID", "us-east-1_EnvPool");
        std::env::set_var("AUTHKIT_CLIENT_ID", "env-client");
        std::env::set_var("AUTHKIT_ENDPOINT", format!("file://{}", pool.path().display()));
    }

    let barrier = Barrier::new(8);
    let addresses: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    shared().map(|session| session as *const AuthSession as usize)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect()
    });

    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));

    let session = shared().unwrap();
    assert_eq!(session as *const AuthSession as usize, addresses[0]);
    assert_eq!(session.config().user_pool_id().as_str(), "us-east-1_EnvPool");
    assert_eq!(session.config().client_id(), "env-client");
    assert!(session.config().endpoint().is_local());
    assert!(!session.is_signed_in());
}

mod common;

use common::{Fixture, GROUPS};
use gidremap::adapters::{FileLockManager, LockManager};
use gidremap::types::ApplyMode;
use gidremap::ApiError;

#[test]
fn held_lock_times_out_before_any_change() {
    let fx = Fixture::new();
    let f = fx.file("srv/a", 1000);
    let mut policy = fx.policy();
    policy.lock_timeout_ms = 50;
    let held = FileLockManager::new(policy.paths.lock_file.clone().unwrap())
        .acquire_process_lock(100)
        .unwrap();

    let err = fx.api_with(policy).remap("sv_admin", 197, ApplyMode::Commit).unwrap_err();
    assert!(matches!(err, ApiError::Locking(_)), "{err:?}");
    assert_eq!(fx.read("etc/group"), GROUPS);
    assert_eq!(fx.owners.gid(&f), 1000);
    assert_eq!(fx.facts.of("remap.summary")[0].1["error_id"], "E_LOCKING");
    drop(held);

    fx.api().remap("sv_admin", 197, ApplyMode::Commit).unwrap();
    assert_eq!(fx.owners.gid(&f), 197);
}

#[test]
fn dry_run_does_not_take_the_lock() {
    let fx = Fixture::new();
    let mut policy = fx.policy();
    policy.lock_timeout_ms = 10;
    let _held = FileLockManager::new(policy.paths.lock_file.clone().unwrap())
        .acquire_process_lock(100)
        .unwrap();
    fx.api_with(policy).remap("sv_admin", 197, ApplyMode::DryRun).unwrap();
}

#[test]
fn unprivileged_run_is_refused() {
    if rustix::process::geteuid().is_root() {
        return;
    }
    let fx = Fixture::new();
    let mut policy = fx.policy();
    policy.require_root = true;
    let err = fx.api_with(policy).repair("sv_admin", 1000, ApplyMode::Commit).unwrap_err();
    assert!(matches!(err, ApiError::Privilege(_)), "{err:?}");
    assert_eq!(err.exit_code(), 1);
}

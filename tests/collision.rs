mod common;

use common::{Fixture, GROUPS, USERS};
use gidremap::adapters::{GroupEntry, NameService};
use gidremap::types::errors::Result;
use gidremap::types::ApplyMode;
use gidremap::ApiError;

#[test]
fn local_collision_changes_nothing() {
    let fx = Fixture::new();
    let f = fx.file("srv/a", 1000);

    let err = fx.api().remap("sv_admin", 1001, ApplyMode::Commit).unwrap_err();
    match &err {
        ApiError::GidCollision { gid, owner } => {
            assert_eq!(*gid, 1001);
            assert_eq!(owner, "sv_web");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(err.exit_code(), 1);
    assert_eq!(fx.read("etc/group"), GROUPS);
    assert_eq!(fx.read("etc/passwd"), USERS);
    assert_eq!(fx.owners.calls(), 0);
    assert_eq!(fx.owners.gid(&f), 1000);
    assert!(!fx.marker_path("sv_admin").exists());

    let guard = fx.facts.of("guard");
    assert_eq!(guard[0].0, "failure");
    assert_eq!(guard[0].1["error_id"], "E_COLLISION");
    assert_eq!(fx.facts.of("remap.summary")[0].0, "failure");
    assert!(fx.facts.of("retarget").is_empty());
    assert!(fx.audit.contains(log::Level::Error, "already assigned to group 'sv_web'"));
}

/// Name-service that also knows a directory-only group at GID 5000.
struct Directory(gidremap::adapters::FlatFileNameService);

impl NameService for Directory {
    fn group_by_name(&self, name: &str) -> Result<Option<GroupEntry>> {
        self.0.group_by_name(name)
    }

    fn group_by_gid(&self, gid: u32) -> Result<Option<GroupEntry>> {
        if gid == 5000 {
            return Ok(Some(GroupEntry { name: "ldap_ops".into(), gid }));
        }
        self.0.group_by_gid(gid)
    }
}

#[test]
fn name_service_collision_is_detected() {
    let fx = Fixture::new();
    let ns = Directory(gidremap::adapters::FlatFileNameService::new(
        fx.root().join("etc/group"),
    ));
    let err = fx
        .api()
        .with_name_service(Box::new(ns))
        .remap("sv_admin", 5000, ApplyMode::Commit)
        .unwrap_err();
    assert!(matches!(err, ApiError::GidCollision { gid: 5000, ref owner } if owner == "ldap_ops"));
    assert_eq!(fx.read("etc/group"), GROUPS);
}

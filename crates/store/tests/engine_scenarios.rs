//! End-to-end decision behavior over the in-memory identity store.

use chrono::Utc;

use gatekeep_authz::{AuthorizationDecision, PermissionName, RoleName};
use gatekeep_core::{PermissionId, RoleId, UserId};
use gatekeep_store::{IdentityAdmin, InMemoryIdentityStore};

struct Fixture {
    store: InMemoryIdentityStore,
    editor: RoleId,
    holidays_read: PermissionId,
    holidays_create: PermissionId,
    users_read: PermissionId,
}

/// Role "Editor" grants {holidays:read, holidays:create}; "Admin" exists but
/// grants nothing relevant; users:read exists unattached to any role.
fn fixture() -> Fixture {
    let store = InMemoryIdentityStore::new();
    let editor = store.seed_role("Editor");
    store.seed_role("Admin");
    let holidays_read = store.seed_permission("holidays:read");
    let holidays_create = store.seed_permission("holidays:create");
    let users_read = store.seed_permission("users:read");
    store.link_role_permission(editor, holidays_read);
    store.link_role_permission(editor, holidays_create);

    Fixture {
        store,
        editor,
        holidays_read,
        holidays_create,
        users_read,
    }
}

fn perms(names: &[&'static str]) -> Vec<PermissionName> {
    names.iter().map(|n| PermissionName::new(*n)).collect()
}

#[tokio::test]
async fn user_with_no_assignments_has_nothing() {
    let f = fixture();
    let nobody = UserId::new();
    let mut decision = AuthorizationDecision::new(&f.store);

    for names in [
        perms(&["holidays:read"]),
        perms(&["holidays:read", "users:read"]),
        perms(&["holidays:create"]),
    ] {
        assert!(!decision.has_permission(nobody, &names, false).await.unwrap());
    }
}

#[tokio::test]
async fn role_linked_permission_is_effective() {
    let f = fixture();
    let user = UserId::new();
    f.store.assign_role(user, f.editor).await.unwrap();

    let mut decision = AuthorizationDecision::new(&f.store);
    let set = decision.effective_permissions(user).await.unwrap();
    assert!(set.is_effective(f.holidays_read));
    assert!(set.is_effective(f.holidays_create));
    assert!(!set.is_effective(f.users_read));
}

#[tokio::test]
async fn grant_override_is_additive() {
    let f = fixture();
    let user = UserId::new();
    // No roles at all; a grant override alone makes the permission effective.
    f.store.set_override(user, f.users_read, true).await.unwrap();

    let mut decision = AuthorizationDecision::new(&f.store);
    assert!(
        decision
            .has_permission(user, &perms(&["users:read"]), false)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn deny_override_beats_role_grant() {
    let f = fixture();
    let user = UserId::new();
    f.store.assign_role(user, f.editor).await.unwrap();
    f.store
        .set_override(user, f.holidays_create, false)
        .await
        .unwrap();

    let mut decision = AuthorizationDecision::new(&f.store);
    assert!(
        !decision
            .has_permission(user, &perms(&["holidays:create"]), false)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn removing_an_override_reverts_to_role_derived_membership() {
    let f = fixture();
    let user = UserId::new();
    f.store.assign_role(user, f.editor).await.unwrap();

    let mut decision = AuthorizationDecision::new(&f.store);
    let baseline = decision.effective_permissions(user).await.unwrap().effective();

    f.store
        .set_override(user, f.holidays_create, false)
        .await
        .unwrap();
    assert!(
        !decision
            .effective_permissions(user)
            .await
            .unwrap()
            .is_effective(f.holidays_create)
    );

    f.store
        .remove_override(user, f.holidays_create)
        .await
        .unwrap();
    let reverted = decision.effective_permissions(user).await.unwrap().effective();
    assert_eq!(reverted, baseline);
}

#[tokio::test]
async fn all_mode_with_only_unresolvable_names_fails_closed() {
    let f = fixture();
    let user = UserId::new();
    f.store.assign_role(user, f.editor).await.unwrap();

    let mut decision = AuthorizationDecision::new(&f.store);
    let ghosts = perms(&["ghosts:read", "ghosts:write"]);
    assert!(!decision.has_permission(user, &ghosts, true).await.unwrap());
    assert!(!decision.has_permission(user, &ghosts, false).await.unwrap());
}

#[tokio::test]
async fn unchanged_state_yields_identical_answers() {
    let f = fixture();
    let user = UserId::new();
    f.store.assign_role(user, f.editor).await.unwrap();
    f.store.set_override(user, f.users_read, true).await.unwrap();

    let mut decision = AuthorizationDecision::new(&f.store);
    let names = perms(&["holidays:read", "users:read"]);
    let first = decision.has_permission(user, &names, true).await.unwrap();
    for _ in 0..5 {
        assert_eq!(
            decision.has_permission(user, &names, true).await.unwrap(),
            first
        );
    }
}

#[tokio::test]
async fn editor_scenario_any_of() {
    // Scenario: Editor grants {holidays:read, holidays:create}; user holds
    // only Editor, no overrides.
    let f = fixture();
    let user = UserId::new();
    f.store.assign_role(user, f.editor).await.unwrap();

    let mut decision = AuthorizationDecision::new(&f.store);
    assert!(
        decision
            .has_permission(user, &perms(&["holidays:read"]), false)
            .await
            .unwrap()
    );
    assert!(
        !decision
            .has_permission(user, &perms(&["holidays:archive"]), false)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn editor_scenario_with_deny_override() {
    let f = fixture();
    let user = UserId::new();
    f.store.assign_role(user, f.editor).await.unwrap();
    f.store
        .set_override(user, f.holidays_create, false)
        .await
        .unwrap();

    let mut decision = AuthorizationDecision::new(&f.store);
    let both = perms(&["holidays:read", "holidays:create"]);

    assert!(
        !decision
            .has_permission(user, &perms(&["holidays:create"]), false)
            .await
            .unwrap()
    );
    assert!(!decision.has_all_permissions(user, &both).await.unwrap());
    // Any-of still passes through holidays:read.
    assert!(decision.has_permission(user, &both, false).await.unwrap());
}

#[tokio::test]
async fn roleless_user_with_grant_override() {
    let f = fixture();
    let user = UserId::new();
    f.store.set_override(user, f.users_read, true).await.unwrap();

    let mut decision = AuthorizationDecision::new(&f.store);
    assert!(
        !decision
            .has_any_role(user, &[RoleName::new("Admin")])
            .await
            .unwrap()
    );
    assert!(
        decision
            .has_permission(user, &perms(&["users:read"]), false)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn archived_permission_no_longer_satisfies_even_an_admin() {
    // Intended exclusion policy: once the permission row is soft-deleted its
    // name stops resolving, so the check fails for everyone.
    let store = InMemoryIdentityStore::new();
    let admin_role = store.seed_role("Admin");
    let roles_create = store.seed_permission("roles:create");
    store.link_role_permission(admin_role, roles_create);

    let admin_user = UserId::new();
    store.assign_role(admin_user, admin_role).await.unwrap();

    let mut decision = AuthorizationDecision::new(&store);
    assert!(
        decision
            .has_permission(admin_user, &perms(&["roles:create"]), false)
            .await
            .unwrap()
    );

    store.archive_permission(roles_create, Utc::now());
    assert!(
        !decision
            .has_permission(admin_user, &perms(&["roles:create"]), false)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn role_archival_revokes_transitively() {
    let f = fixture();
    let user = UserId::new();
    f.store.assign_role(user, f.editor).await.unwrap();

    let mut decision = AuthorizationDecision::new(&f.store);
    assert!(
        decision
            .has_any_role(user, &[RoleName::new("Editor")])
            .await
            .unwrap()
    );

    f.store.archive_role(f.editor, Utc::now());

    // The role name no longer resolves and its permissions stop flowing.
    assert!(
        !decision
            .has_any_role(user, &[RoleName::new("Editor")])
            .await
            .unwrap()
    );
    assert!(
        !decision
            .has_permission(user, &perms(&["holidays:read"]), false)
            .await
            .unwrap()
    );
}

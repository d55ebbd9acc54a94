use criterion::{Criterion, black_box, criterion_group, criterion_main};

use gatekeep_authz::{AuthorizationDecision, PermissionName};
use gatekeep_core::UserId;
use gatekeep_store::{IdentityAdmin, InMemoryIdentityStore};

/// Seed a store with `roles` roles of `perms_per_role` permissions each and
/// one user assigned to all of them.
fn seeded_store(roles: usize, perms_per_role: usize) -> (InMemoryIdentityStore, UserId) {
    let store = InMemoryIdentityStore::new();
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let user = UserId::new();

    for r in 0..roles {
        let role = store.seed_role(format!("role-{r}"));
        for p in 0..perms_per_role {
            let perm = store.seed_permission(format!("res{r}:act{p}"));
            store.link_role_permission(role, perm);
        }
        rt.block_on(store.assign_role(user, role)).unwrap();
    }

    (store, user)
}

fn decision_hot_path(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let (store, user) = seeded_store(8, 16);
    let required = [
        PermissionName::new("res3:act7"),
        PermissionName::new("res7:act15"),
    ];

    c.bench_function("has_permission_all_of", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut decision = AuthorizationDecision::new(&store);
                black_box(
                    decision
                        .has_all_permissions(black_box(user), &required)
                        .await
                        .unwrap(),
                )
            })
        })
    });

    c.bench_function("effective_permission_set", |b| {
        b.iter(|| {
            rt.block_on(async {
                let mut decision = AuthorizationDecision::new(&store);
                black_box(decision.effective_permissions(black_box(user)).await.unwrap())
            })
        })
    });
}

criterion_group!(benches, decision_hot_path);
criterion_main!(benches);

//! Postgres-backed checks of the request workflow and connection graph.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

use sqlx::PgPool;

use subseq_network::db;
use subseq_network::error::ErrorKind;
use subseq_network::invariants::RequestAction;
use subseq_network::models::{
    CanonicalPair, Patch, ProfilePatch, RequestId, RequestStatus, Role,
    SendConnectionRequestPayload, UserId,
};
use subseq_network::operations::{NetworkOperation, NetworkOperationResult, NetworkOperations};

/// Inserts a user without a profile row.
async fn insert_bare_user(pool: &PgPool, name: &str, role: Role) -> UserId {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO network.users (name, email, role)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(format!("{}@example.test", name.to_lowercase()))
    .bind(role.as_db_value())
    .fetch_one(pool)
    .await
    .expect("user insert should succeed");

    UserId(id)
}

async fn insert_user(pool: &PgPool, name: &str, role: Role) -> UserId {
    let user = insert_bare_user(pool, name, role).await;
    db::ensure_profile(pool, user)
        .await
        .expect("profile insert should succeed");
    user
}

async fn send(pool: &PgPool, from: UserId, to: UserId) -> RequestId {
    db::send_connection_request(
        pool,
        from,
        SendConnectionRequestPayload {
            to_user_id: Some(to),
            message: Some("Let's connect".to_string()),
        },
    )
    .await
    .expect("send should succeed")
    .id
}

async fn counter(pool: &PgPool, user: UserId) -> i32 {
    db::get_profile(pool, user)
        .await
        .expect("profile should load")
        .connections_count
}

async fn edge_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM network.connections")
        .fetch_one(pool)
        .await
        .expect("count should succeed");
    count
}

async fn request_status(pool: &PgPool, request_id: RequestId) -> String {
    let (status,): (String,) =
        sqlx::query_as("SELECT status FROM network.connection_requests WHERE id = $1")
            .bind(request_id.0)
            .fetch_one(pool)
            .await
            .expect("request should exist");
    status
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn accepted_request_connects_both_directions(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_user(&pool, "Bob", Role::Recruiter).await;

    // Bob has the larger id, so sending from him exercises the canonical swap.
    let request_id = send(&pool, bob, alice).await;
    let connection = db::accept_connection_request(&pool, alice, request_id)
        .await
        .expect("accept should succeed");

    assert!(connection.pair.user_a() < connection.pair.user_b());
    assert_eq!(connection.pair, CanonicalPair::new(alice, bob).expect("pair"));

    let forward = db::connection_status(&pool, alice, bob).await.expect("status");
    let backward = db::connection_status(&pool, bob, alice).await.expect("status");
    assert!(forward.is_connected);
    assert!(backward.is_connected);
    assert!(!forward.request_sent && !forward.request_received);

    assert_eq!(counter(&pool, alice).await, 1);
    assert_eq!(counter(&pool, bob).await, 1);
    assert_eq!(request_status(&pool, request_id).await, "accepted");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn self_request_never_writes(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;

    let err = db::send_connection_request(
        &pool,
        alice,
        SendConnectionRequestPayload {
            to_user_id: Some(alice),
            message: None,
        },
    )
    .await
    .expect_err("self request should fail");
    assert_eq!(err.kind, ErrorKind::InvalidInput);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM network.connection_requests")
        .fetch_one(&pool)
        .await
        .expect("count should succeed");
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_and_connected_requests_conflict(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_user(&pool, "Bob", Role::Employer).await;

    let request_id = send(&pool, alice, bob).await;
    let err = db::send_connection_request(
        &pool,
        alice,
        SendConnectionRequestPayload {
            to_user_id: Some(bob),
            message: None,
        },
    )
    .await
    .expect_err("second pending request should conflict");
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(err.public, "Connection request already sent");

    db::accept_connection_request(&pool, bob, request_id)
        .await
        .expect("accept should succeed");

    for (from, to) in [(alice, bob), (bob, alice)] {
        let err = db::send_connection_request(
            &pool,
            from,
            SendConnectionRequestPayload {
                to_user_id: Some(to),
                message: None,
            },
        )
        .await
        .expect_err("request between connected users should conflict");
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.public, "Already connected with this user");
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn request_to_unknown_user_is_not_found(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;

    let err = db::send_connection_request(
        &pool,
        alice,
        SendConnectionRequestPayload {
            to_user_id: Some(UserId(alice.0 + 1000)),
            message: None,
        },
    )
    .await
    .expect_err("unknown recipient should fail");
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn second_accept_is_not_found_and_counts_once(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_user(&pool, "Bob", Role::Employee).await;
    let request_id = send(&pool, alice, bob).await;

    db::accept_connection_request(&pool, bob, request_id)
        .await
        .expect("first accept should succeed");
    let err = db::accept_connection_request(&pool, bob, request_id)
        .await
        .expect_err("second accept should fail");

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(counter(&pool, alice).await, 1);
    assert_eq!(counter(&pool, bob).await, 1);
    assert_eq!(edge_count(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn transitions_are_limited_to_the_right_endpoint(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_user(&pool, "Bob", Role::Employee).await;
    let carol = insert_user(&pool, "Carol", Role::Recruiter).await;
    let request_id = send(&pool, alice, bob).await;

    let err = db::accept_connection_request(&pool, carol, request_id)
        .await
        .expect_err("stranger cannot accept");
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = db::accept_connection_request(&pool, alice, request_id)
        .await
        .expect_err("sender cannot accept");
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = db::reject_connection_request(&pool, alice, request_id)
        .await
        .expect_err("sender cannot reject");
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = db::withdraw_connection_request(&pool, bob, request_id)
        .await
        .expect_err("recipient cannot withdraw");
    assert_eq!(err.kind, ErrorKind::NotFound);

    let view = db::get_connection_request(&pool, bob, request_id)
        .await
        .expect("recipient can view");
    assert_eq!(
        view.allowed_actions,
        vec![RequestAction::Accept, RequestAction::Reject]
    );
    let err = db::get_connection_request(&pool, carol, request_id)
        .await
        .expect_err("stranger cannot view");
    assert_eq!(err.kind, ErrorKind::NotFound);

    let withdrawn = db::withdraw_connection_request(&pool, alice, request_id)
        .await
        .expect("sender can withdraw");
    assert_eq!(withdrawn.status, RequestStatus::Withdrawn);

    let err = db::reject_connection_request(&pool, bob, request_id)
        .await
        .expect_err("withdrawn request is terminal");
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(edge_count(&pool).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn rejected_request_allows_a_fresh_one(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_user(&pool, "Bob", Role::Employee).await;

    let first = send(&pool, alice, bob).await;
    let rejected = db::reject_connection_request(&pool, bob, first)
        .await
        .expect("reject should succeed");
    assert_eq!(rejected.status, RequestStatus::Rejected);

    let second = send(&pool, alice, bob).await;
    assert_ne!(first, second);
    assert_eq!(request_status(&pool, first).await, "rejected");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn remove_decrements_both_counters(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_user(&pool, "Bob", Role::Employee).await;
    let request_id = send(&pool, alice, bob).await;
    db::accept_connection_request(&pool, bob, request_id)
        .await
        .expect("accept should succeed");

    db::remove_connection(&pool, bob, alice)
        .await
        .expect("remove should succeed");

    let status = db::connection_status(&pool, alice, bob).await.expect("status");
    assert!(!status.is_connected);
    assert_eq!(counter(&pool, alice).await, 0);
    assert_eq!(counter(&pool, bob).await, 0);

    let err = db::remove_connection(&pool, alice, bob)
        .await
        .expect_err("second remove should fail");
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(counter(&pool, alice).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn remove_floors_drifted_counter_at_zero(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_user(&pool, "Bob", Role::Employee).await;
    let request_id = send(&pool, alice, bob).await;
    db::accept_connection_request(&pool, bob, request_id)
        .await
        .expect("accept should succeed");

    sqlx::query("UPDATE network.profiles SET connections_count = 0 WHERE user_id = $1")
        .bind(alice.0)
        .execute(&pool)
        .await
        .expect("drift injection should succeed");

    db::remove_connection(&pool, alice, bob)
        .await
        .expect("remove should succeed");
    assert_eq!(counter(&pool, alice).await, 0);
    assert_eq!(counter(&pool, bob).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_accepts_materialize_once(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_user(&pool, "Bob", Role::Employee).await;
    let request_id = send(&pool, alice, bob).await;

    let (first, second) = tokio::join!(
        db::accept_connection_request(&pool, bob, request_id),
        db::accept_connection_request(&pool, bob, request_id),
    );

    let outcomes = [first, second];
    let succeeded = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(succeeded, 1);
    let failure = outcomes
        .into_iter()
        .find_map(|outcome| outcome.err())
        .expect("one accept should fail");
    assert_eq!(failure.kind, ErrorKind::NotFound);

    assert_eq!(edge_count(&pool).await, 1);
    assert_eq!(counter(&pool, alice).await, 1);
    assert_eq!(counter(&pool, bob).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn crossed_requests_surface_both_and_second_accept_conflicts(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_user(&pool, "Bob", Role::Employee).await;

    let a_to_b = send(&pool, alice, bob).await;
    let b_to_a = send(&pool, bob, alice).await;

    let status = db::connection_status(&pool, alice, bob).await.expect("status");
    assert!(status.request_sent);
    assert!(status.request_received);
    assert_eq!(status.sent_request_id, Some(a_to_b));
    assert_eq!(status.received_request_id, Some(b_to_a));
    assert!(!status.is_connected);

    db::accept_connection_request(&pool, bob, a_to_b)
        .await
        .expect("accept should succeed");

    let err = db::accept_connection_request(&pool, alice, b_to_a)
        .await
        .expect_err("second edge should conflict");
    assert_eq!(err.kind, ErrorKind::Conflict);

    // The failed accept rolled back, so the crossed request is still pending.
    assert_eq!(request_status(&pool, b_to_a).await, "pending");
    assert_eq!(edge_count(&pool).await, 1);
    assert_eq!(counter(&pool, alice).await, 1);
    assert_eq!(counter(&pool, bob).await, 1);

    let withdrawn = db::withdraw_connection_request(&pool, bob, b_to_a)
        .await
        .expect("dangling request can be withdrawn");
    assert_eq!(withdrawn.status, RequestStatus::Withdrawn);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn suggestions_exclude_self_connected_and_pending(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let connected = insert_user(&pool, "Connected", Role::Employee).await;
    let outgoing = insert_user(&pool, "Outgoing", Role::Employer).await;
    let incoming = insert_user(&pool, "Incoming", Role::Recruiter).await;
    let stranger = insert_user(&pool, "Stranger", Role::Recruiter).await;
    let rejected = insert_user(&pool, "Rejected", Role::Employee).await;

    let request_id = send(&pool, alice, connected).await;
    db::accept_connection_request(&pool, connected, request_id)
        .await
        .expect("accept should succeed");
    send(&pool, alice, outgoing).await;
    send(&pool, incoming, alice).await;
    let request_id = send(&pool, rejected, alice).await;
    db::reject_connection_request(&pool, alice, request_id)
        .await
        .expect("reject should succeed");

    let suggestions = db::connection_suggestions(&pool, alice, 50)
        .await
        .expect("suggestions should load");
    let mut ids = suggestions
        .iter()
        .map(|suggestion| suggestion.user_id)
        .collect::<Vec<_>>();
    ids.sort();

    let mut expected = vec![stranger, rejected];
    expected.sort();
    assert_eq!(ids, expected);

    let limited = db::connection_suggestions(&pool, alice, 1)
        .await
        .expect("suggestions should load");
    assert_eq!(limited.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn lists_show_pending_and_connections(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_user(&pool, "Bob", Role::Employer).await;
    let carol = insert_user(&pool, "Carol", Role::Recruiter).await;
    let dave = insert_user(&pool, "Dave", Role::Employee).await;

    let from_bob = send(&pool, bob, alice).await;
    let from_carol = send(&pool, carol, alice).await;
    send(&pool, alice, dave).await;

    let pending = db::list_pending_requests(&pool, alice)
        .await
        .expect("pending should load");
    let ids = pending.iter().map(|request| request.id).collect::<Vec<_>>();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&from_bob) && ids.contains(&from_carol));
    assert!(pending.iter().any(|request| request.role == Role::Recruiter));

    db::accept_connection_request(&pool, alice, from_bob)
        .await
        .expect("accept should succeed");
    db::accept_connection_request(&pool, alice, from_carol)
        .await
        .expect("accept should succeed");

    let page = db::list_connections(&pool, alice, 50, 0)
        .await
        .expect("connections should load");
    assert_eq!(page.count, 2);
    let mut counterparts = page
        .items
        .iter()
        .map(|item| item.user_id)
        .collect::<Vec<_>>();
    counterparts.sort();
    assert_eq!(counterparts, vec![bob, carol]);

    let second_page = db::list_connections(&pool, alice, 1, 1)
        .await
        .expect("connections should load");
    assert_eq!(second_page.count, 1);
    assert_eq!(second_page.offset, 1);

    assert!(
        db::list_pending_requests(&pool, alice)
            .await
            .expect("pending should load")
            .is_empty()
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn reconcile_repairs_counter_drift(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_user(&pool, "Bob", Role::Employee).await;
    let request_id = send(&pool, alice, bob).await;
    db::accept_connection_request(&pool, bob, request_id)
        .await
        .expect("accept should succeed");

    sqlx::query("UPDATE network.profiles SET connections_count = 7 WHERE user_id = $1")
        .bind(bob.0)
        .execute(&pool)
        .await
        .expect("drift injection should succeed");

    let drifts = db::reconcile_connection_counts(&pool, None)
        .await
        .expect("reconcile should succeed");
    assert_eq!(drifts.len(), 1);
    assert_eq!(drifts[0].user_id, bob);
    assert_eq!(drifts[0].previous, 7);
    assert_eq!(drifts[0].actual, 1);
    assert_eq!(counter(&pool, bob).await, 1);

    let drifts = db::reconcile_connection_counts(&pool, Some(alice))
        .await
        .expect("reconcile should succeed");
    assert!(drifts.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn profile_patch_sets_clears_and_keeps_fields(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;

    let profile = db::update_profile(
        &pool,
        alice,
        ProfilePatch {
            headline: Patch::Set(Some("Rust engineer".to_string())),
            location: Patch::Set(Some("Lisbon".to_string())),
            avatar_url: Patch::Unchanged,
        },
    )
    .await
    .expect("update should succeed");
    assert_eq!(profile.headline.as_deref(), Some("Rust engineer"));
    assert_eq!(profile.location.as_deref(), Some("Lisbon"));

    let profile = db::update_profile(
        &pool,
        alice,
        ProfilePatch {
            headline: Patch::Set(None),
            ..ProfilePatch::default()
        },
    )
    .await
    .expect("update should succeed");
    assert_eq!(profile.headline, None);
    assert_eq!(profile.location.as_deref(), Some("Lisbon"));
    assert_eq!(profile.connections_count, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn accept_creates_missing_profiles_with_correct_counts(pool: PgPool) {
    let alice = insert_bare_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_bare_user(&pool, "Bob", Role::Employer).await;
    let carol = insert_user(&pool, "Carol", Role::Recruiter).await;

    let request_id = send(&pool, alice, bob).await;
    db::accept_connection_request(&pool, bob, request_id)
        .await
        .expect("accept should succeed");
    let request_id = send(&pool, carol, alice).await;
    db::accept_connection_request(&pool, alice, request_id)
        .await
        .expect("accept should succeed");

    assert_eq!(counter(&pool, alice).await, 2);
    assert_eq!(counter(&pool, bob).await, 1);
    assert_eq!(counter(&pool, carol).await, 1);

    let (profiles,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM network.profiles")
        .fetch_one(&pool)
        .await
        .expect("count should succeed");
    assert_eq!(profiles, 3);

    db::remove_connection(&pool, bob, alice)
        .await
        .expect("remove should succeed");
    assert_eq!(counter(&pool, alice).await, 1);
    assert_eq!(counter(&pool, bob).await, 0);

    let drifts = db::reconcile_connection_counts(&pool, None)
        .await
        .expect("reconcile should succeed");
    assert!(drifts.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn profileless_user_reports_live_edge_count(pool: PgPool) {
    let alice = insert_bare_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_bare_user(&pool, "Bob", Role::Employee).await;
    let pair = CanonicalPair::new(alice, bob).expect("pair");

    sqlx::query(
        r#"
        INSERT INTO network.connections (user_a, user_b, status)
        VALUES ($1, $2, 'accepted')
        "#,
    )
    .bind(pair.user_a().0)
    .bind(pair.user_b().0)
    .execute(&pool)
    .await
    .expect("edge insert should succeed");

    assert_eq!(counter(&pool, alice).await, 1);
    assert_eq!(counter(&pool, bob).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn execute_dispatches_each_operation(pool: PgPool) {
    let alice = insert_user(&pool, "Alice", Role::Employee).await;
    let bob = insert_user(&pool, "Bob", Role::Recruiter).await;
    let ops = NetworkOperations::from_pool(&pool);

    let result = ops
        .execute(
            alice,
            NetworkOperation::SendRequest {
                payload: SendConnectionRequestPayload {
                    to_user_id: Some(bob),
                    message: Some("  hello  ".to_string()),
                },
            },
        )
        .await
        .expect("send should succeed");
    let NetworkOperationResult::Request { request } = result else {
        panic!("expected request result, got {result:?}");
    };
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.message.as_deref(), Some("hello"));
    let first = request.id;

    let result = ops
        .execute(bob, NetworkOperation::ListPending)
        .await
        .expect("list should succeed");
    let NetworkOperationResult::PendingRequests { items } = result else {
        panic!("expected pending requests, got {result:?}");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, first);

    let result = ops
        .execute(bob, NetworkOperation::GetRequest { request_id: first })
        .await
        .expect("lookup should succeed");
    let NetworkOperationResult::RequestView { view } = result else {
        panic!("expected request view, got {result:?}");
    };
    assert_eq!(view.request.id, first);

    let result = ops
        .execute(bob, NetworkOperation::AcceptRequest { request_id: first })
        .await
        .expect("accept should succeed");
    let NetworkOperationResult::Connected { connection } = result else {
        panic!("expected connection, got {result:?}");
    };
    assert_eq!(connection.pair, CanonicalPair::new(alice, bob).expect("pair"));

    let result = ops
        .execute(bob, NetworkOperation::Status { other_user_id: alice })
        .await
        .expect("status should succeed");
    let NetworkOperationResult::Status { status } = result else {
        panic!("expected status, got {result:?}");
    };
    assert!(status.is_connected);

    let result = ops
        .execute(
            alice,
            NetworkOperation::ListConnections {
                query: Default::default(),
            },
        )
        .await
        .expect("list should succeed");
    let NetworkOperationResult::Connections { page } = result else {
        panic!("expected connections page, got {result:?}");
    };
    assert_eq!(page.count, 1);
    assert_eq!(page.items[0].user_id, bob);

    let result = ops
        .execute(alice, NetworkOperation::RemoveConnection { other_user_id: bob })
        .await
        .expect("remove should succeed");
    assert!(matches!(result, NetworkOperationResult::Removed));
    assert_eq!(edge_count(&pool).await, 0);

    // Only the recipient may reject, so routing reject through withdraw would fail here.
    let second = send(&pool, alice, bob).await;
    let result = ops
        .execute(bob, NetworkOperation::RejectRequest { request_id: second })
        .await
        .expect("reject should succeed");
    let NetworkOperationResult::Request { request } = result else {
        panic!("expected request result, got {result:?}");
    };
    assert_eq!(request.status, RequestStatus::Rejected);

    let third = send(&pool, alice, bob).await;
    let err = ops
        .execute(bob, NetworkOperation::WithdrawRequest { request_id: third })
        .await
        .expect_err("recipient cannot withdraw");
    assert_eq!(err.kind, ErrorKind::NotFound);
    let result = ops
        .execute(alice, NetworkOperation::WithdrawRequest { request_id: third })
        .await
        .expect("withdraw should succeed");
    let NetworkOperationResult::Request { request } = result else {
        panic!("expected request result, got {result:?}");
    };
    assert_eq!(request.status, RequestStatus::Withdrawn);

    let result = ops
        .execute(
            alice,
            NetworkOperation::Suggestions {
                query: Default::default(),
            },
        )
        .await
        .expect("suggestions should succeed");
    let NetworkOperationResult::Suggestions { items } = result else {
        panic!("expected suggestions, got {result:?}");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].user_id, bob);

    let result = ops
        .execute(
            alice,
            NetworkOperation::UpdateProfile {
                patch: ProfilePatch {
                    headline: Patch::Set(Some("Hiring Rust engineers".to_string())),
                    ..ProfilePatch::default()
                },
            },
        )
        .await
        .expect("update should succeed");
    let NetworkOperationResult::Profile { profile } = result else {
        panic!("expected profile, got {result:?}");
    };
    assert_eq!(profile.user_id, alice);

    let result = ops
        .execute(bob, NetworkOperation::GetProfile { user_id: alice })
        .await
        .expect("profile should load");
    let NetworkOperationResult::Profile { profile } = result else {
        panic!("expected profile, got {result:?}");
    };
    assert_eq!(profile.headline.as_deref(), Some("Hiring Rust engineers"));
    assert_eq!(profile.connections_count, 0);
}

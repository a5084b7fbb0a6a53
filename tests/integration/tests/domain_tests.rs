//! Service-level tests against the in-memory store
//!
//! Each test builds its own store, so they run in parallel without
//! interfering. Run with: cargo test -p integration-tests --test domain_tests

use band_core::entities::{Band, Event, Membership, Rsvp, User};
use band_core::{BandRole, DomainError, EventType, Page, RsvpStatus, Snowflake};
use band_service::dto::{
    CreateBandRequest, CreateEventRequest, InviteRequest, RenameBandRequest, SetRsvpRequest,
    UpdateEventRequest,
};
use band_service::{
    BandService, Departure, EventService, IdentityProfile, MembershipService, RsvpService,
    ServiceContext, ServiceError, UserService,
};
use chrono::{Duration, Utc};
use integration_tests::{memory_context, TestIdentity};

// ============================================================================
// Helpers
// ============================================================================

fn id(raw: &str) -> Snowflake {
    raw.parse().expect("snowflake id")
}

fn domain(err: ServiceError) -> DomainError {
    match err {
        ServiceError::Domain(e) => e,
        other => panic!("expected a domain error, got {other:?}"),
    }
}

async fn sign_up_as(ctx: &ServiceContext, identity: &TestIdentity) -> User {
    let claims = identity.claims();
    UserService::new(ctx)
        .sync_user(IdentityProfile::from(&claims))
        .await
        .unwrap()
}

async fn sign_up(ctx: &ServiceContext, first: &str) -> User {
    sign_up_as(ctx, &TestIdentity::unique(first)).await
}

async fn create_band(ctx: &ServiceContext, owner: &User) -> Snowflake {
    let band = BandService::new(ctx)
        .create_band(
            owner.id,
            CreateBandRequest {
                name: "The Snowflakes".to_string(),
            },
        )
        .await
        .unwrap();
    id(&band.id)
}

async fn invite(ctx: &ServiceContext, band_id: Snowflake, admin: &User, user: &User) -> Snowflake {
    let member = MembershipService::new(ctx)
        .invite(
            band_id,
            admin.id,
            InviteRequest {
                username: user.username.clone(),
            },
        )
        .await
        .unwrap();
    id(&member.membership_id)
}

/// Invite and accept; returns the membership id
async fn join(ctx: &ServiceContext, band_id: Snowflake, admin: &User, user: &User) -> Snowflake {
    let membership_id = invite(ctx, band_id, admin, user).await;
    MembershipService::new(ctx)
        .accept(membership_id, user.id)
        .await
        .unwrap();
    membership_id
}

async fn schedule(ctx: &ServiceContext, band_id: Snowflake, admin: &User, days: i64) -> Snowflake {
    let event = EventService::new(ctx)
        .create_event(
            band_id,
            admin.id,
            CreateEventRequest {
                name: Some(format!("Rehearsal {days}")),
                event_type: EventType::Rehearsal,
                start_time: Utc::now() + Duration::days(days),
                location: None,
                description: None,
            },
        )
        .await
        .unwrap();
    id(&event.id)
}

async fn rsvp(ctx: &ServiceContext, event_id: Snowflake, user: &User, status: RsvpStatus) {
    RsvpService::new(ctx)
        .set_status(event_id, user.id, SetRsvpRequest { status })
        .await
        .unwrap();
}

async fn load_band(ctx: &ServiceContext, band_id: Snowflake) -> Option<Band> {
    let mut uow = ctx.database().begin().await.unwrap();
    uow.bands().find_by_id(band_id).await.unwrap()
}

async fn load_roster(ctx: &ServiceContext, band_id: Snowflake) -> Vec<Membership> {
    let mut uow = ctx.database().begin().await.unwrap();
    uow.memberships().find_by_band(band_id).await.unwrap()
}

async fn load_event(ctx: &ServiceContext, event_id: Snowflake) -> Option<Event> {
    let mut uow = ctx.database().begin().await.unwrap();
    uow.events().find_by_id(event_id).await.unwrap()
}

async fn load_rsvps(ctx: &ServiceContext, event_id: Snowflake) -> Vec<Rsvp> {
    let mut uow = ctx.database().begin().await.unwrap();
    uow.rsvps().find_by_event(event_id).await.unwrap()
}

/// memberCount equals the number of non-invited memberships
async fn assert_member_count(ctx: &ServiceContext, band_id: Snowflake) {
    let band = load_band(ctx, band_id).await.expect("band exists");
    let active = load_roster(ctx, band_id)
        .await
        .iter()
        .filter(|m| m.role != BandRole::Invited)
        .count();
    assert_eq!(band.member_count as usize, active, "memberCount drifted");
}

/// rsvpCount and attendingCount match the RSVP rows, attending never above rsvps
async fn assert_event_counts(ctx: &ServiceContext, event_id: Snowflake) {
    let event = load_event(ctx, event_id).await.expect("event exists");
    let rsvps = load_rsvps(ctx, event_id).await;
    let attending = rsvps.iter().filter(|r| r.status == RsvpStatus::Yes).count();

    assert_eq!(event.rsvp_count as usize, rsvps.len());
    assert_eq!(event.attending_count as usize, attending);
    assert!(event.attending_count <= event.rsvp_count);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_sync_user_is_idempotent() {
    let ctx = memory_context();
    let identity = TestIdentity::unique("Ada");

    let first = sign_up_as(&ctx, &identity).await;
    let second = sign_up_as(&ctx, &identity).await;

    assert_eq!(first.id, second.id);
    assert_eq!(second.username, identity.nickname);
    assert_eq!(second.display_name, identity.display_name());
}

#[tokio::test]
async fn test_sync_user_follows_profile_changes() {
    let ctx = memory_context();
    let mut identity = TestIdentity::unique("Grace");
    let before = sign_up_as(&ctx, &identity).await;

    identity.nickname = format!("{}_renamed", identity.nickname);
    identity.given_name = "Gracie".to_string();
    let after = sign_up_as(&ctx, &identity).await;

    assert_eq!(before.id, after.id);
    assert_eq!(after.username, identity.nickname);
    assert_eq!(after.display_name, "Gracie Tester");
}

#[tokio::test]
async fn test_sync_user_username_collision() {
    let ctx = memory_context();
    let taken = TestIdentity::unique("Linus");
    let holder = sign_up_as(&ctx, &taken).await;

    // A newcomer asking for a held name gets it with their id appended
    let mut other = TestIdentity::unique("Ken");
    other.nickname.clone_from(&taken.nickname);
    let newcomer = sign_up_as(&ctx, &other).await;
    assert_eq!(newcomer.username, format!("{}_{}", taken.nickname, newcomer.id));
    assert_eq!(newcomer.display_name, "Ken Tester");

    // An existing user renaming onto a held name keeps theirs
    let mut renamer = TestIdentity::unique("Dennis");
    let before = sign_up_as(&ctx, &renamer).await;
    renamer.nickname.clone_from(&taken.nickname);
    renamer.given_name = "Dmr".to_string();
    let after = sign_up_as(&ctx, &renamer).await;
    assert_eq!(after.id, before.id);
    assert_eq!(after.username, before.username);
    assert_eq!(after.display_name, "Dmr Tester");

    let users = UserService::new(&ctx);
    assert_eq!(users.get_user(holder.id).await.unwrap().username, taken.nickname);
}

#[tokio::test]
async fn test_users_without_nickname_can_all_sign_in() {
    let ctx = memory_context();
    let users = UserService::new(&ctx);
    let anonymous = |subject| IdentityProfile {
        subject,
        nickname: None,
        given_name: None,
        family_name: None,
    };

    let first = users.sync_user(anonymous("idp|anon-1")).await.unwrap();
    let second = users.sync_user(anonymous("idp|anon-2")).await.unwrap();
    assert_eq!(first.username, "user");
    assert_eq!(second.username, format!("user_{}", second.id));
    assert_eq!(second.display_name, second.username);

    // Signing in again is stable
    let again = users.sync_user(anonymous("idp|anon-2")).await.unwrap();
    assert_eq!(again, second);
}

#[tokio::test]
async fn test_concurrent_first_sync_creates_one_user() {
    let ctx = memory_context();
    let identity = TestIdentity::unique("Racer");
    let claims = identity.claims();

    let (svc_a, svc_b) = (UserService::new(&ctx), UserService::new(&ctx));
    let (left, right) = tokio::join!(
        svc_a.sync_user(IdentityProfile::from(&claims)),
        svc_b.sync_user(IdentityProfile::from(&claims)),
    );
    let (left, right) = (left.unwrap(), right.unwrap());
    assert_eq!(left.id, right.id);
    assert_eq!(left.username, identity.nickname);
}

#[tokio::test]
async fn test_delete_user_cascades_through_memberships() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let identity = TestIdentity::unique("Drummer");
    let drummer = sign_up_as(&ctx, &identity).await;

    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &drummer).await;
    let event_id = schedule(&ctx, band_id, &admin, 3).await;
    rsvp(&ctx, event_id, &drummer, RsvpStatus::Yes).await;

    let users = UserService::new(&ctx);
    assert!(users.delete_user(&identity.subject).await.unwrap());
    assert!(!users.delete_user(&identity.subject).await.unwrap());

    assert_member_count(&ctx, band_id).await;
    assert_eq!(load_band(&ctx, band_id).await.unwrap().member_count, 1);
    assert_event_counts(&ctx, event_id).await;
    assert_eq!(load_event(&ctx, event_id).await.unwrap().attending_count, 0);

    let err = users.get_user(drummer.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::UserNotFound(_)));
}

#[tokio::test]
async fn test_delete_sole_admin_user_hands_band_over() {
    let ctx = memory_context();
    let identity = TestIdentity::unique("Founder");
    let founder = sign_up_as(&ctx, &identity).await;
    let bassist = sign_up(&ctx, "Bassist").await;

    let band_id = create_band(&ctx, &founder).await;
    join(&ctx, band_id, &founder, &bassist).await;

    UserService::new(&ctx)
        .delete_user(&identity.subject)
        .await
        .unwrap();

    let roster = load_roster(&ctx, band_id).await;
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].user_id, bassist.id);
    assert_eq!(roster[0].role, BandRole::Admin);
}

// ============================================================================
// Bands
// ============================================================================

#[tokio::test]
async fn test_create_band_makes_founder_admin() {
    let ctx = memory_context();
    let owner = sign_up(&ctx, "Owner").await;
    let band_id = create_band(&ctx, &owner).await;

    let roster = load_roster(&ctx, band_id).await;
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].role, BandRole::Admin);
    assert_member_count(&ctx, band_id).await;

    let bands = BandService::new(&ctx).list_bands_for_user(owner.id).await.unwrap();
    assert_eq!(bands.len(), 1);
    assert!(bands[0].is_admin);
    assert_eq!(bands[0].band.member_count, 1);
}

#[tokio::test]
async fn test_band_page_and_rename_permissions() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let member = sign_up(&ctx, "Member").await;
    let stranger = sign_up(&ctx, "Stranger").await;

    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &member).await;

    let bands = BandService::new(&ctx);
    let page = bands.get_band_page(band_id, member.id).await.unwrap();
    assert_eq!(page.members.len(), 2);
    assert!(!page.is_admin);
    assert_eq!(page.current_user_id, member.id.to_string());

    let err = bands.get_band_page(band_id, stranger.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::NotAMember));

    let rename = || RenameBandRequest {
        name: "Renamed".to_string(),
    };
    let err = bands.rename_band(band_id, member.id, rename()).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::NotAnAdmin));

    let renamed = bands.rename_band(band_id, admin.id, rename()).await.unwrap();
    assert_eq!(renamed.name, "Renamed");
}

#[tokio::test]
async fn test_delete_band_cascades() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let member = sign_up(&ctx, "Member").await;
    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &member).await;
    let event_id = schedule(&ctx, band_id, &admin, 2).await;

    let bands = BandService::new(&ctx);
    let err = bands.delete_band(band_id, member.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::NotAnAdmin));

    bands.delete_band(band_id, admin.id).await.unwrap();

    assert!(load_band(&ctx, band_id).await.is_none());
    assert!(load_roster(&ctx, band_id).await.is_empty());
    assert!(load_event(&ctx, event_id).await.is_none());
    assert!(load_rsvps(&ctx, event_id).await.is_empty());
}

// ============================================================================
// Membership state machine
// ============================================================================

#[tokio::test]
async fn test_member_count_tracks_every_transition() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let users = [
        sign_up(&ctx, "Alice").await,
        sign_up(&ctx, "Bob").await,
        sign_up(&ctx, "Carol").await,
        sign_up(&ctx, "Dave").await,
    ];
    let band_id = create_band(&ctx, &admin).await;
    let memberships = MembershipService::new(&ctx);

    let invites = [
        invite(&ctx, band_id, &admin, &users[0]).await,
        invite(&ctx, band_id, &admin, &users[1]).await,
        invite(&ctx, band_id, &admin, &users[2]).await,
        invite(&ctx, band_id, &admin, &users[3]).await,
    ];
    assert_member_count(&ctx, band_id).await;

    memberships.accept(invites[0], users[0].id).await.unwrap();
    assert_member_count(&ctx, band_id).await;

    memberships.accept(invites[1], users[1].id).await.unwrap();
    memberships.decline(invites[2], users[2].id).await.unwrap();
    assert_member_count(&ctx, band_id).await;

    memberships.leave(band_id, users[0].id).await.unwrap();
    assert_member_count(&ctx, band_id).await;

    memberships.kick(band_id, users[1].id, admin.id).await.unwrap();
    assert_member_count(&ctx, band_id).await;

    memberships.decline(invites[3], users[3].id).await.unwrap();
    assert_member_count(&ctx, band_id).await;

    assert_eq!(load_band(&ctx, band_id).await.unwrap().member_count, 1);
    assert_eq!(load_roster(&ctx, band_id).await.len(), 1);
}

#[tokio::test]
async fn test_invite_then_decline_leaves_nothing() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let guest = sign_up(&ctx, "Guest").await;
    let band_id = create_band(&ctx, &admin).await;
    let event_id = schedule(&ctx, band_id, &admin, 5).await;

    let membership_id = invite(&ctx, band_id, &admin, &guest).await;
    let pending = MembershipService::new(&ctx)
        .list_pending_invites(guest.id)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].band_id, band_id.to_string());

    MembershipService::new(&ctx)
        .decline(membership_id, guest.id)
        .await
        .unwrap();

    let roster = load_roster(&ctx, band_id).await;
    assert!(roster.iter().all(|m| m.user_id != guest.id));
    assert!(load_rsvps(&ctx, event_id)
        .await
        .iter()
        .all(|r| r.user_id != guest.id));
    assert!(MembershipService::new(&ctx)
        .list_pending_invites(guest.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_invite_errors() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let member = sign_up(&ctx, "Member").await;
    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &member).await;
    let memberships = MembershipService::new(&ctx);

    let err = memberships
        .invite(
            band_id,
            admin.id,
            InviteRequest {
                username: "nobody-by-this-name".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::UserNotFound(_)));

    let err = memberships
        .invite(
            band_id,
            admin.id,
            InviteRequest {
                username: member.username.clone(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::AlreadyInvitedOrMember));

    let outsider = sign_up(&ctx, "Outsider").await;
    let err = memberships
        .invite(
            band_id,
            member.id,
            InviteRequest {
                username: outsider.username.clone(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::NotAnAdmin));
}

#[tokio::test]
async fn test_accept_is_for_the_invitee_only() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let guest = sign_up(&ctx, "Guest").await;
    let band_id = create_band(&ctx, &admin).await;
    let membership_id = invite(&ctx, band_id, &admin, &guest).await;
    let memberships = MembershipService::new(&ctx);

    let err = memberships.accept(membership_id, admin.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::NotYours));

    memberships.accept(membership_id, guest.id).await.unwrap();

    let err = memberships.accept(membership_id, guest.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::InvalidTarget(_)));
    let err = memberships.decline(membership_id, guest.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::InvalidTarget(_)));

    let err = memberships
        .accept(Snowflake::new(1), guest.id)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::MembershipNotFound));
}

#[tokio::test]
async fn test_invitee_cannot_act_in_band() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let guest = sign_up(&ctx, "Guest").await;
    let band_id = create_band(&ctx, &admin).await;
    invite(&ctx, band_id, &admin, &guest).await;
    let event_id = schedule(&ctx, band_id, &admin, 1).await;

    let err = BandService::new(&ctx)
        .get_band_page(band_id, guest.id)
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::InviteNotAccepted));

    let err = RsvpService::new(&ctx)
        .set_status(
            event_id,
            guest.id,
            SetRsvpRequest {
                status: RsvpStatus::Yes,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::InviteNotAccepted));
}

#[tokio::test]
async fn test_accept_backfills_upcoming_events_only() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let guest = sign_up(&ctx, "Guest").await;
    let band_id = create_band(&ctx, &admin).await;
    let upcoming = schedule(&ctx, band_id, &admin, 4).await;
    let past = schedule(&ctx, band_id, &admin, -4).await;

    join(&ctx, band_id, &admin, &guest).await;

    let rsvps = load_rsvps(&ctx, upcoming).await;
    let mine = rsvps.iter().find(|r| r.user_id == guest.id).expect("backfilled");
    assert_eq!(mine.status, RsvpStatus::Pending);
    assert_event_counts(&ctx, upcoming).await;
    assert_eq!(load_event(&ctx, upcoming).await.unwrap().rsvp_count, 2);

    assert!(load_rsvps(&ctx, past).await.is_empty());
    assert_eq!(load_event(&ctx, past).await.unwrap().rsvp_count, 0);
}

#[tokio::test]
async fn test_promote() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let member = sign_up(&ctx, "Member").await;
    let guest = sign_up(&ctx, "Guest").await;
    let band_id = create_band(&ctx, &admin).await;
    let member_ship = join(&ctx, band_id, &admin, &member).await;
    let guest_ship = invite(&ctx, band_id, &admin, &guest).await;
    let memberships = MembershipService::new(&ctx);

    let err = memberships.promote(member_ship, member.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::NotAnAdmin));

    let err = memberships.promote(guest_ship, admin.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::InvalidTarget(_)));

    let promoted = memberships.promote(member_ship, admin.id).await.unwrap();
    assert_eq!(promoted.role, BandRole::Admin);

    // Promoting an admin again changes nothing
    let again = memberships.promote(member_ship, admin.id).await.unwrap();
    assert_eq!(again.role, BandRole::Admin);
    assert_member_count(&ctx, band_id).await;
}

#[tokio::test]
async fn test_last_admin_leaving_promotes_earliest_member() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let first = sign_up(&ctx, "First").await;
    let second = sign_up(&ctx, "Second").await;
    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &first).await;
    join(&ctx, band_id, &admin, &second).await;

    let departure = MembershipService::new(&ctx)
        .leave(band_id, admin.id)
        .await
        .unwrap();
    assert_eq!(departure, Departure::Succeeded { successor: first.id });

    let band = load_band(&ctx, band_id).await.expect("band survives");
    assert_eq!(band.member_count, 2);

    let roster = load_roster(&ctx, band_id).await;
    let role_of = |user: &User| roster.iter().find(|m| m.user_id == user.id).map(|m| m.role);
    assert_eq!(role_of(&first), Some(BandRole::Admin));
    assert_eq!(role_of(&second), Some(BandRole::Member));
}

#[tokio::test]
async fn test_admin_leaving_with_co_admin_promotes_nobody() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let co_admin = sign_up(&ctx, "CoAdmin").await;
    let member = sign_up(&ctx, "Member").await;
    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &member).await;
    let co_ship = join(&ctx, band_id, &admin, &co_admin).await;
    MembershipService::new(&ctx)
        .promote(co_ship, admin.id)
        .await
        .unwrap();

    let departure = MembershipService::new(&ctx)
        .leave(band_id, admin.id)
        .await
        .unwrap();
    assert_eq!(departure, Departure::Left);

    let roster = load_roster(&ctx, band_id).await;
    let admins: Vec<_> = roster.iter().filter(|m| m.is_admin()).collect();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].user_id, co_admin.id);
}

#[tokio::test]
async fn test_last_member_leaving_deletes_band() {
    let ctx = memory_context();
    let solo = sign_up(&ctx, "Solo").await;
    let band_id = create_band(&ctx, &solo).await;
    let event_id = schedule(&ctx, band_id, &solo, 2).await;

    let departure = MembershipService::new(&ctx)
        .leave(band_id, solo.id)
        .await
        .unwrap();
    assert_eq!(departure, Departure::BandDeleted);

    assert!(load_band(&ctx, band_id).await.is_none());
    assert!(load_roster(&ctx, band_id).await.is_empty());
    assert!(load_event(&ctx, event_id).await.is_none());
    assert!(load_rsvps(&ctx, event_id).await.is_empty());
}

#[tokio::test]
async fn test_pending_invite_keeps_band_alive() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let guest = sign_up(&ctx, "Guest").await;
    let band_id = create_band(&ctx, &admin).await;
    let event_id = schedule(&ctx, band_id, &admin, 2).await;
    let invite_id = invite(&ctx, band_id, &admin, &guest).await;

    let memberships = MembershipService::new(&ctx);
    let departure = memberships.leave(band_id, admin.id).await.unwrap();
    assert_eq!(departure, Departure::Left);

    let band = load_band(&ctx, band_id).await.expect("band kept");
    assert_eq!(band.member_count, 0);
    let roster = load_roster(&ctx, band_id).await;
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].role, BandRole::Invited);
    assert!(load_event(&ctx, event_id).await.is_some());

    // The first one back in runs the band
    let accepted = memberships.accept(invite_id, guest.id).await.unwrap();
    assert_eq!(accepted.role, BandRole::Admin);
    assert_member_count(&ctx, band_id).await;
    assert_event_counts(&ctx, event_id).await;
    assert_eq!(load_rsvps(&ctx, event_id).await.len(), 1);

    EventService::new(&ctx)
        .delete_event(event_id, guest.id)
        .await
        .unwrap();
    assert!(load_event(&ctx, event_id).await.is_none());
}

#[tokio::test]
async fn test_declining_last_invite_of_empty_band_deletes_it() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let first = sign_up(&ctx, "First").await;
    let second = sign_up(&ctx, "Second").await;
    let band_id = create_band(&ctx, &admin).await;
    let event_id = schedule(&ctx, band_id, &admin, 2).await;
    let first_invite = invite(&ctx, band_id, &admin, &first).await;
    let second_invite = invite(&ctx, band_id, &admin, &second).await;

    let memberships = MembershipService::new(&ctx);
    memberships.leave(band_id, admin.id).await.unwrap();

    memberships.decline(first_invite, first.id).await.unwrap();
    assert!(load_band(&ctx, band_id).await.is_some());

    memberships.decline(second_invite, second.id).await.unwrap();
    assert!(load_band(&ctx, band_id).await.is_none());
    assert!(load_roster(&ctx, band_id).await.is_empty());
    assert!(load_event(&ctx, event_id).await.is_none());
}

#[tokio::test]
async fn test_concurrent_leave_and_kick_of_same_member() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let member = sign_up(&ctx, "Member").await;
    let band_id = create_band(&ctx, &admin).await;
    let event_id = schedule(&ctx, band_id, &admin, 2).await;
    join(&ctx, band_id, &admin, &member).await;
    rsvp(&ctx, event_id, &member, RsvpStatus::Yes).await;

    let (svc_a, svc_b) = (MembershipService::new(&ctx), MembershipService::new(&ctx));
    let (left, kicked) = tokio::join!(
        svc_a.leave(band_id, member.id),
        svc_b.kick(band_id, member.id, admin.id),
    );
    assert_eq!(
        [left.is_ok(), kicked.is_ok()].iter().filter(|ok| **ok).count(),
        1,
        "exactly one removal wins"
    );

    let band = load_band(&ctx, band_id).await.expect("band kept");
    assert_eq!(band.member_count, 1);
    assert_member_count(&ctx, band_id).await;
    assert_event_counts(&ctx, event_id).await;
}

#[tokio::test]
async fn test_leave_drops_upcoming_rsvps_and_keeps_history() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let member = sign_up(&ctx, "Member").await;
    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &member).await;

    let upcoming = schedule(&ctx, band_id, &admin, 3).await;
    let past = schedule(&ctx, band_id, &admin, -3).await;
    rsvp(&ctx, upcoming, &member, RsvpStatus::Yes).await;
    rsvp(&ctx, past, &member, RsvpStatus::Yes).await;

    MembershipService::new(&ctx)
        .leave(band_id, member.id)
        .await
        .unwrap();

    assert!(load_rsvps(&ctx, upcoming)
        .await
        .iter()
        .all(|r| r.user_id != member.id));
    assert_event_counts(&ctx, upcoming).await;

    let history = load_rsvps(&ctx, past).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].user_id, member.id);
    assert_event_counts(&ctx, past).await;
}

#[tokio::test]
async fn test_kick_rules() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let co_admin = sign_up(&ctx, "CoAdmin").await;
    let member = sign_up(&ctx, "Member").await;
    let guest = sign_up(&ctx, "Guest").await;
    let band_id = create_band(&ctx, &admin).await;
    let co_ship = join(&ctx, band_id, &admin, &co_admin).await;
    join(&ctx, band_id, &admin, &member).await;
    invite(&ctx, band_id, &admin, &guest).await;
    let memberships = MembershipService::new(&ctx);
    memberships.promote(co_ship, admin.id).await.unwrap();

    let before = load_roster(&ctx, band_id).await;

    let err = memberships.kick(band_id, co_admin.id, admin.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::InvalidTarget(_)));

    let err = memberships.kick(band_id, guest.id, admin.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::InvalidTarget(_)));

    let err = memberships.kick(band_id, admin.id, member.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::NotAnAdmin));

    let after = load_roster(&ctx, band_id).await;
    assert_eq!(
        before.iter().map(|m| (m.id, m.role)).collect::<Vec<_>>(),
        after.iter().map(|m| (m.id, m.role)).collect::<Vec<_>>()
    );
    assert_eq!(load_band(&ctx, band_id).await.unwrap().member_count, 3);

    let departure = memberships.kick(band_id, member.id, admin.id).await.unwrap();
    assert_eq!(departure, Departure::Left);
    assert_member_count(&ctx, band_id).await;
}

// ============================================================================
// Events and RSVPs
// ============================================================================

#[tokio::test]
async fn test_create_event_seeds_pending_rsvps() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let member = sign_up(&ctx, "Member").await;
    let guest = sign_up(&ctx, "Guest").await;
    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &member).await;
    invite(&ctx, band_id, &admin, &guest).await;

    let event_id = schedule(&ctx, band_id, &admin, 7).await;

    let rsvps = load_rsvps(&ctx, event_id).await;
    assert_eq!(rsvps.len(), 2);
    assert!(rsvps.iter().all(|r| r.status == RsvpStatus::Pending));
    assert!(rsvps.iter().all(|r| r.user_id != guest.id));
    assert_event_counts(&ctx, event_id).await;

    let err = EventService::new(&ctx)
        .create_event(
            band_id,
            member.id,
            CreateEventRequest {
                name: None,
                event_type: EventType::Gig,
                start_time: Utc::now() + Duration::days(1),
                location: None,
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::NotAnAdmin));
}

#[tokio::test]
async fn test_yes_no_yes_counts_attending_once() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let member = sign_up(&ctx, "Member").await;
    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &member).await;
    let event_id = schedule(&ctx, band_id, &admin, 2).await;

    for status in [RsvpStatus::Yes, RsvpStatus::No, RsvpStatus::Yes] {
        rsvp(&ctx, event_id, &member, status).await;
        assert_event_counts(&ctx, event_id).await;
    }

    let event = load_event(&ctx, event_id).await.unwrap();
    assert_eq!((event.rsvp_count, event.attending_count), (2, 1));

    // Same answer twice is no change
    rsvp(&ctx, event_id, &member, RsvpStatus::Yes).await;
    assert_eq!(load_event(&ctx, event_id).await.unwrap().attending_count, 1);
}

#[tokio::test]
async fn test_concurrent_rsvps_keep_counts() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let member = sign_up(&ctx, "Member").await;
    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &member).await;
    let event_id = schedule(&ctx, band_id, &admin, 3).await;

    let yes = || SetRsvpRequest {
        status: RsvpStatus::Yes,
    };
    let (svc_a, svc_b) = (RsvpService::new(&ctx), RsvpService::new(&ctx));
    let (first, second) = tokio::join!(
        svc_a.set_status(event_id, admin.id, yes()),
        svc_b.set_status(event_id, member.id, yes()),
    );
    first.unwrap();
    second.unwrap();

    let event = load_event(&ctx, event_id).await.unwrap();
    assert_eq!((event.rsvp_count, event.attending_count), (2, 2));
    assert_event_counts(&ctx, event_id).await;
}

#[tokio::test]
async fn test_first_rsvp_on_past_event_is_created() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let band_id = create_band(&ctx, &admin).await;
    let event_id = schedule(&ctx, band_id, &admin, -1).await;
    assert!(load_rsvps(&ctx, event_id).await.is_empty());

    rsvp(&ctx, event_id, &admin, RsvpStatus::Maybe).await;

    let event = load_event(&ctx, event_id).await.unwrap();
    assert_eq!((event.rsvp_count, event.attending_count), (1, 0));
    assert_event_counts(&ctx, event_id).await;
}

#[tokio::test]
async fn test_reschedule_resets_rsvps() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let member = sign_up(&ctx, "Member").await;
    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &member).await;
    let event_id = schedule(&ctx, band_id, &admin, 2).await;
    rsvp(&ctx, event_id, &admin, RsvpStatus::Yes).await;
    rsvp(&ctx, event_id, &member, RsvpStatus::No).await;

    let later = Utc::now() + Duration::days(9);
    let updated = EventService::new(&ctx)
        .update_event(
            event_id,
            admin.id,
            UpdateEventRequest {
                start_time: Some(later),
                ..UpdateEventRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.attending_count, 0);
    assert_eq!(updated.rsvp_count, 2);

    let rsvps = load_rsvps(&ctx, event_id).await;
    assert!(rsvps.iter().all(|r| r.status == RsvpStatus::Pending));
    assert!(rsvps
        .iter()
        .all(|r| r.start_time.timestamp_millis() == later.timestamp_millis()));
    assert_event_counts(&ctx, event_id).await;
}

#[tokio::test]
async fn test_edit_without_new_time_keeps_answers() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let band_id = create_band(&ctx, &admin).await;
    let event_id = schedule(&ctx, band_id, &admin, 2).await;
    rsvp(&ctx, event_id, &admin, RsvpStatus::Yes).await;

    let updated = EventService::new(&ctx)
        .update_event(
            event_id,
            admin.id,
            UpdateEventRequest {
                location: Some("The Garage".to_string()),
                ..UpdateEventRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.location.as_deref(), Some("The Garage"));
    assert_eq!(updated.attending_count, 1);
}

#[tokio::test]
async fn test_delete_event_removes_rsvps() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let member = sign_up(&ctx, "Member").await;
    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &member).await;
    let event_id = schedule(&ctx, band_id, &admin, 2).await;

    let events = EventService::new(&ctx);
    let err = events.delete_event(event_id, member.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::NotAnAdmin));

    events.delete_event(event_id, admin.id).await.unwrap();
    assert!(load_event(&ctx, event_id).await.is_none());
    assert!(load_rsvps(&ctx, event_id).await.is_empty());

    let err = events.delete_event(event_id, admin.id).await.unwrap_err();
    assert!(matches!(domain(err), DomainError::EventNotFound(_)));
}

#[tokio::test]
async fn test_attendees_and_upcoming_feed() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let member = sign_up(&ctx, "Member").await;
    let band_id = create_band(&ctx, &admin).await;
    join(&ctx, band_id, &admin, &member).await;
    let soon = schedule(&ctx, band_id, &admin, 1).await;
    let later = schedule(&ctx, band_id, &admin, 6).await;
    rsvp(&ctx, soon, &member, RsvpStatus::Yes).await;

    let events = EventService::new(&ctx);
    let attendees = events.get_event_attendees(soon, admin.id).await.unwrap();
    assert_eq!(attendees.len(), 2);
    let member_row = attendees
        .iter()
        .find(|a| a.user_id == member.id.to_string())
        .unwrap();
    assert_eq!(member_row.status, RsvpStatus::Yes);

    let feed = events.list_upcoming_events_for_user(member.id).await.unwrap();
    assert_eq!(
        feed.iter().map(|c| c.event.id.clone()).collect::<Vec<_>>(),
        vec![soon.to_string(), later.to_string()]
    );
    assert_eq!(feed[0].my_status, Some(RsvpStatus::Yes));
    assert!(!feed[0].is_admin);

    let band_feed = events
        .list_upcoming_events_for_band(band_id, admin.id)
        .await
        .unwrap();
    assert_eq!(band_feed.len(), 2);

    let bands = BandService::new(&ctx).list_bands_for_user(member.id).await.unwrap();
    assert_eq!(bands[0].upcoming_events_count, 2);
}

#[tokio::test]
async fn test_past_events_are_paged() {
    let ctx = memory_context();
    let admin = sign_up(&ctx, "Admin").await;
    let band_id = create_band(&ctx, &admin).await;
    let mut past = Vec::new();
    for days in 1..=3 {
        let event_id = schedule(&ctx, band_id, &admin, -days).await;
        rsvp(&ctx, event_id, &admin, RsvpStatus::Yes).await;
        past.push(event_id.to_string());
    }
    schedule(&ctx, band_id, &admin, 3).await;

    let events = EventService::new(&ctx);
    let first = events
        .list_past_events_for_user(admin.id, Page::new(Some(2), None))
        .await
        .unwrap();
    assert!(first.has_more);
    assert_eq!(
        first.events.iter().map(|c| c.event.id.clone()).collect::<Vec<_>>(),
        past[..2]
    );

    let cursor = first.next_cursor.expect("cursor").parse().unwrap();
    let rest = events
        .list_past_events_for_user(admin.id, Page::new(Some(2), Some(cursor)))
        .await
        .unwrap();
    assert!(!rest.has_more);
    assert_eq!(
        rest.events.iter().map(|c| c.event.id.clone()).collect::<Vec<_>>(),
        past[2..]
    );

    let band_page = events
        .list_past_events_for_band(band_id, admin.id, Page::new(Some(10), None))
        .await
        .unwrap();
    assert_eq!(band_page.events.len(), 3);
    assert!(!band_page.has_more);
    assert!(band_page.next_cursor.is_none());
}

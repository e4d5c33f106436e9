use chrono::Utc;
use ledger::{Ledger, LedgerError, NewUser, ProfileUpdate, RoleKind, SessionUpsert};
use migration::MigratorTrait;
use sea_orm::Database;

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Ledger::builder().database(db).build()
}

fn alice() -> NewUser {
    NewUser {
        email: "alice@example.com".to_string(),
        password: "Secreta123".to_string(),
        nickname: "alice".to_string(),
    }
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let ledger = ledger_with_db().await;
    ledger.signup(alice()).await.unwrap();

    let err = ledger.signup(alice()).await.unwrap_err();
    assert_eq!(err, LedgerError::DuplicateEmail);
    assert_eq!(
        err.to_string(),
        "El correo electrónico ya está registrado"
    );
}

#[tokio::test]
async fn email_comparison_is_case_insensitive() {
    let ledger = ledger_with_db().await;
    ledger.signup(alice()).await.unwrap();

    let err = ledger
        .signup(NewUser {
            email: "Alice@Example.com".to_string(),
            ..alice()
        })
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::DuplicateEmail);

    let (user, role) = ledger
        .authenticate("ALICE@example.com", "Secreta123")
        .await
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(role, RoleKind::User);
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let ledger = ledger_with_db().await;
    ledger.signup(alice()).await.unwrap();

    let err = ledger
        .authenticate("alice@example.com", "otra")
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::InvalidCredentials);
}

#[tokio::test]
async fn soft_deleted_users_cannot_authenticate() {
    let ledger = ledger_with_db().await;
    let user = ledger.signup(alice()).await.unwrap();

    ledger.soft_delete_user(user.id).await.unwrap();
    let err = ledger
        .authenticate("alice@example.com", "Secreta123")
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::InvalidCredentials);
}

#[tokio::test]
async fn admin_authentication_requires_elevated_role() {
    let ledger = ledger_with_db().await;
    ledger.signup(alice()).await.unwrap();

    let err = ledger
        .authenticate_admin("alice@example.com", "Secreta123")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Forbidden(_)));

    ledger
        .create_admin(
            NewUser {
                email: "root@example.com".to_string(),
                password: "Secreta123".to_string(),
                nickname: "root".to_string(),
            },
            RoleKind::SuperAdmin,
        )
        .await
        .unwrap();
    let (_, role) = ledger
        .authenticate_admin("root@example.com", "Secreta123")
        .await
        .unwrap();
    assert_eq!(role, RoleKind::SuperAdmin);
}

#[tokio::test]
async fn login_upserts_one_session_per_device() {
    let ledger = ledger_with_db().await;
    let user = ledger.signup(alice()).await.unwrap();

    for round in 0..2 {
        ledger
            .record_login(SessionUpsert {
                user_id: user.id,
                device_id: "movil".to_string(),
                refresh_token: format!("token-{round}"),
                user_agent: Some("test-agent".to_string()),
                ip: None,
                expires_at: Utc::now() + chrono::Duration::days(30),
            })
            .await
            .unwrap();
    }

    let logs = ledger.login_logs().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].session.device_id, "movil");
    assert_eq!(logs[0].session.refresh_token, "token-1");
    assert_eq!(logs[0].email, "alice@example.com");
}

#[tokio::test]
async fn profile_update_merges_fields() {
    let ledger = ledger_with_db().await;
    let user = ledger.signup(alice()).await.unwrap();

    let updated = ledger
        .update_profile(
            user.id,
            ProfileUpdate {
                nickname: Some("alicia".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.nickname, "alicia");
    assert_eq!(updated.email, "alice@example.com");

    // The old password still works: only the nickname changed.
    ledger
        .authenticate("alice@example.com", "Secreta123")
        .await
        .unwrap();
}

#[tokio::test]
async fn reset_flow_is_single_use_and_enforces_strength() {
    let ledger = ledger_with_db().await;
    ledger.signup(alice()).await.unwrap();

    assert!(ledger.create_reset("nadie@example.com").await.unwrap().is_none());

    let (_, jti, _) = ledger
        .create_reset("alice@example.com")
        .await
        .unwrap()
        .unwrap();

    let weak = ledger.consume_reset(&jti, "corta").await.unwrap_err();
    assert!(matches!(weak, LedgerError::InvalidInput(_)));

    ledger.consume_reset(&jti, "NuevaClave123").await.unwrap();
    ledger
        .authenticate("alice@example.com", "NuevaClave123")
        .await
        .unwrap();

    // The row is spent.
    let reuse = ledger.consume_reset(&jti, "OtraClave123").await.unwrap_err();
    assert!(matches!(reuse, LedgerError::InvalidInput(_)));
}

#[tokio::test]
async fn hard_delete_cascades_to_owned_data() {
    let ledger = ledger_with_db().await;
    let user = ledger.signup(alice()).await.unwrap();
    let category = ledger.create_category("ahorro").await.unwrap();
    let account = ledger
        .create_account(
            user.id,
            ledger::NewAccount {
                name: "Principal".to_string(),
                money: 0,
                category_id: category.id,
            },
        )
        .await
        .unwrap();

    ledger.delete_profile(user.id).await.unwrap();

    let err = ledger.profile(user.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::KeyNotFound(_)));
    let err = ledger.list_accounts(user.id).await.unwrap();
    assert!(err.is_empty());
    let gone = ledger.user_owns_account(user.id, account.id).await.unwrap();
    assert!(!gone);
}

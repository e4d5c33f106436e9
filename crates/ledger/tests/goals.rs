use chrono::{Duration, Utc};
use ledger::{
    GoalTargetKind, GoalTargetSpec, GoalUpdate, Ledger, LedgerError, NewAccount, NewGoal,
    NewPocket, NewTransaction, NewUser,
};
use migration::MigratorTrait;
use sea_orm::Database;

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Ledger::builder().database(db).build()
}

struct Fixture {
    user_id: i32,
    account_id: i32,
    pocket_id: i32,
}

async fn seed(ledger: &Ledger, email: &str) -> Fixture {
    let user = ledger
        .signup(NewUser {
            email: email.to_string(),
            password: "Secreta123".to_string(),
            nickname: email.split('@').next().unwrap_or("x").to_string(),
        })
        .await
        .unwrap();
    let category = ledger.create_category(&format!("cat-{email}")).await.unwrap();
    let account = ledger
        .create_account(
            user.id,
            NewAccount {
                name: "Principal".to_string(),
                money: 0,
                category_id: category.id,
            },
        )
        .await
        .unwrap();
    let pocket = ledger
        .create_pocket(
            user.id,
            NewPocket {
                name: "vacaciones".to_string(),
                description: None,
                account_id: account.id,
            },
        )
        .await
        .unwrap();

    Fixture {
        user_id: user.id,
        account_id: account.id,
        pocket_id: pocket.id,
    }
}

fn pocket_goal(pocket_id: i32) -> NewGoal {
    NewGoal {
        description: "ahorrar para el verano".to_string(),
        start_date: Utc::now() - Duration::days(7),
        end_date: Utc::now() + Duration::days(30),
        max_money: 10_000,
        targets: vec![GoalTargetSpec {
            kind: GoalTargetKind::Pocket,
            target_id: pocket_id,
        }],
    }
}

#[tokio::test]
async fn goal_without_targets_is_invalid() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, "alice@example.com").await;

    let err = ledger
        .create_goal(
            fx.user_id,
            NewGoal {
                targets: vec![],
                ..pocket_goal(fx.pocket_id)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));
}

#[tokio::test]
async fn created_goal_comes_back_with_its_target() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, "alice@example.com").await;

    let created = ledger
        .create_goal(fx.user_id, pocket_goal(fx.pocket_id))
        .await
        .unwrap();

    let fetched = ledger.goal(fx.user_id, created.goal.id).await.unwrap();
    assert_eq!(fetched.targets.len(), 1);
    assert_eq!(fetched.targets[0].target_kind, "pocket");
    assert_eq!(fetched.targets[0].target_id, fx.pocket_id);
}

#[tokio::test]
async fn updating_the_target_replaces_all_previous_rows() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, "alice@example.com").await;

    let created = ledger
        .create_goal(
            fx.user_id,
            NewGoal {
                targets: vec![
                    GoalTargetSpec {
                        kind: GoalTargetKind::Pocket,
                        target_id: fx.pocket_id,
                    },
                    GoalTargetSpec {
                        kind: GoalTargetKind::Account,
                        target_id: fx.account_id,
                    },
                ],
                ..pocket_goal(fx.pocket_id)
            },
        )
        .await
        .unwrap();
    assert_eq!(created.targets.len(), 2);

    let updated = ledger
        .update_goal(
            fx.user_id,
            created.goal.id,
            GoalUpdate {
                target: Some(GoalTargetSpec {
                    kind: GoalTargetKind::Account,
                    target_id: fx.account_id,
                }),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.targets.len(), 1);
    assert_eq!(updated.targets[0].target_kind, "account");
    assert_eq!(updated.targets[0].target_id, fx.account_id);
}

#[tokio::test]
async fn goals_pointing_at_foreign_data_are_invisible() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, "alice@example.com").await;
    let other = seed(&ledger, "bob@example.com").await;

    let created = ledger
        .create_goal(fx.user_id, pocket_goal(fx.pocket_id))
        .await
        .unwrap();

    let err = ledger.goal(other.user_id, created.goal.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::KeyNotFound(_)));

    let visible = ledger.list_goals(other.user_id).await.unwrap();
    assert!(visible.is_empty());

    let err = ledger
        .create_goal(
            other.user_id,
            pocket_goal(fx.pocket_id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::KeyNotFound(_)));
}

#[tokio::test]
async fn progress_sums_signed_amounts_inside_the_range() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, "alice@example.com").await;

    // Inside the window: +500 -200. Outside: +900.
    for (amount, is_income, days_ago) in [(500, true, 1), (200, false, 2), (900, true, 60)] {
        ledger
            .create_transaction(
                fx.user_id,
                NewTransaction {
                    pocket_id: fx.pocket_id,
                    amount,
                    is_income,
                    date: Utc::now() - Duration::days(days_ago),
                    description: None,
                },
            )
            .await
            .unwrap();
    }

    let created = ledger
        .create_goal(fx.user_id, pocket_goal(fx.pocket_id))
        .await
        .unwrap();
    assert_eq!(created.goal.actual_progress, 0);

    let refreshed = ledger
        .goal_progress(fx.user_id, created.goal.id)
        .await
        .unwrap();
    assert_eq!(refreshed.goal.actual_progress, 300);

    // An account target covers every pocket of the account.
    let account_goal = ledger
        .create_goal(
            fx.user_id,
            NewGoal {
                targets: vec![GoalTargetSpec {
                    kind: GoalTargetKind::Account,
                    target_id: fx.account_id,
                }],
                ..pocket_goal(fx.pocket_id)
            },
        )
        .await
        .unwrap();
    let refreshed = ledger
        .goal_progress(fx.user_id, account_goal.goal.id)
        .await
        .unwrap();
    assert_eq!(refreshed.goal.actual_progress, 300);
}

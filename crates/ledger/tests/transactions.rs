use ledger::{
    Ledger, LedgerError, NewAccount, NewPocket, NewTransaction, NewUser, TransactionPatch,
};
use migration::MigratorTrait;
use sea_orm::Database;

use chrono::Utc;

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

async fn seed(ledger: &Ledger, opening_balance: i64) -> Fixture {
    let user = ledger
        .signup(NewUser {
            email: "alice@example.com".to_string(),
            password: "Secreta123".to_string(),
            nickname: "alice".to_string(),
        })
        .await
        .unwrap();
    let category = ledger.create_category("ahorro").await.unwrap();
    let account = ledger
        .create_account(
            user.id,
            NewAccount {
                name: "Principal".to_string(),
                money: opening_balance,
                category_id: category.id,
            },
        )
        .await
        .unwrap();
    let pocket = ledger
        .create_pocket(
            user.id,
            NewPocket {
                name: "mercado".to_string(),
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

async fn balance_of(ledger: &Ledger, user_id: i32, account_id: i32) -> i64 {
    ledger
        .list_accounts(user_id)
        .await
        .unwrap()
        .into_iter()
        .find(|a| a.id == account_id)
        .unwrap()
        .money
}

fn income(pocket_id: i32, amount: i64) -> NewTransaction {
    NewTransaction {
        pocket_id,
        amount,
        is_income: true,
        date: Utc::now(),
        description: None,
    }
}

fn expense(pocket_id: i32, amount: i64) -> NewTransaction {
    NewTransaction {
        pocket_id,
        amount,
        is_income: false,
        date: Utc::now(),
        description: None,
    }
}

#[tokio::test]
async fn income_increases_cached_balance() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, 0).await;

    ledger
        .create_transaction(fx.user_id, income(fx.pocket_id, 100))
        .await
        .unwrap();

    assert_eq!(balance_of(&ledger, fx.user_id, fx.account_id).await, 100);
}

#[tokio::test]
async fn overdraw_is_rejected_and_nothing_persists() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, 50).await;

    let err = ledger
        .create_transaction(fx.user_id, expense(fx.pocket_id, 100))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds(_)));

    assert_eq!(balance_of(&ledger, fx.user_id, fx.account_id).await, 50);
    let txs = ledger
        .list_transactions(fx.user_id, fx.pocket_id)
        .await
        .unwrap();
    assert!(txs.is_empty());
}

#[tokio::test]
async fn deleting_income_subtracts_deleting_expense_adds() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, 0).await;

    let inc = ledger
        .create_transaction(fx.user_id, income(fx.pocket_id, 300))
        .await
        .unwrap();
    let exp = ledger
        .create_transaction(fx.user_id, expense(fx.pocket_id, 100))
        .await
        .unwrap();
    assert_eq!(balance_of(&ledger, fx.user_id, fx.account_id).await, 200);

    ledger.delete_transaction(fx.user_id, exp.id).await.unwrap();
    assert_eq!(balance_of(&ledger, fx.user_id, fx.account_id).await, 300);

    ledger.delete_transaction(fx.user_id, inc.id).await.unwrap();
    assert_eq!(balance_of(&ledger, fx.user_id, fx.account_id).await, 0);
}

#[tokio::test]
async fn deleting_income_that_funds_the_balance_is_rejected() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, 0).await;

    let inc = ledger
        .create_transaction(fx.user_id, income(fx.pocket_id, 100))
        .await
        .unwrap();
    ledger
        .create_transaction(fx.user_id, expense(fx.pocket_id, 80))
        .await
        .unwrap();

    // Removing the income would leave 20 - 100 < 0.
    let err = ledger
        .delete_transaction(fx.user_id, inc.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds(_)));
    assert_eq!(balance_of(&ledger, fx.user_id, fx.account_id).await, 20);
}

#[tokio::test]
async fn update_reverses_old_effect_before_applying_new() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, 0).await;

    let inc = ledger
        .create_transaction(fx.user_id, income(fx.pocket_id, 100))
        .await
        .unwrap();

    let updated = ledger
        .update_transaction(
            fx.user_id,
            inc.id,
            TransactionPatch {
                amount: Some(40),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount, 40);
    assert_eq!(balance_of(&ledger, fx.user_id, fx.account_id).await, 40);

    // Flipping the kind re-signs the stored amount.
    let err = ledger
        .update_transaction(
            fx.user_id,
            inc.id,
            TransactionPatch {
                is_income: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds(_)));
    assert_eq!(balance_of(&ledger, fx.user_id, fx.account_id).await, 40);
}

#[tokio::test]
async fn update_merges_only_provided_fields() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, 0).await;

    let inc = ledger
        .create_transaction(
            fx.user_id,
            NewTransaction {
                pocket_id: fx.pocket_id,
                amount: 100,
                is_income: true,
                date: Utc::now(),
                description: Some("nómina".to_string()),
            },
        )
        .await
        .unwrap();

    let updated = ledger
        .update_transaction(
            fx.user_id,
            inc.id,
            TransactionPatch {
                description: Some("nómina de julio".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.amount, 100);
    assert!(updated.is_income);
    assert_eq!(updated.description.as_deref(), Some("nómina de julio"));
}

#[tokio::test]
async fn foreign_pockets_are_indistinguishable_from_missing() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, 0).await;

    let intruder = ledger
        .signup(NewUser {
            email: "bob@example.com".to_string(),
            password: "Secreta123".to_string(),
            nickname: "bob".to_string(),
        })
        .await
        .unwrap();

    let err = ledger
        .create_transaction(intruder.id, income(fx.pocket_id, 100))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::KeyNotFound(_)));
    assert_eq!(balance_of(&ledger, fx.user_id, fx.account_id).await, 0);
}

#[tokio::test]
async fn zero_and_negative_amounts_are_rejected() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, 0).await;

    for amount in [0, -10] {
        let err = ledger
            .create_transaction(fx.user_id, income(fx.pocket_id, amount))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }
}

#[tokio::test]
async fn deleting_a_pocket_reverses_its_net_effect() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, 0).await;

    ledger
        .create_transaction(fx.user_id, income(fx.pocket_id, 500))
        .await
        .unwrap();
    ledger
        .create_transaction(fx.user_id, expense(fx.pocket_id, 200))
        .await
        .unwrap();
    assert_eq!(balance_of(&ledger, fx.user_id, fx.account_id).await, 300);

    ledger.delete_pocket(fx.user_id, fx.pocket_id).await.unwrap();
    assert_eq!(balance_of(&ledger, fx.user_id, fx.account_id).await, 0);
}

#[tokio::test]
async fn date_range_listing_filters_inclusively() {
    let ledger = ledger_with_db().await;
    let fx = seed(&ledger, 0).await;

    let old = Utc::now() - chrono::Duration::days(30);
    let recent = Utc::now();

    ledger
        .create_transaction(
            fx.user_id,
            NewTransaction {
                pocket_id: fx.pocket_id,
                amount: 100,
                is_income: true,
                date: old,
                description: Some("viejo".to_string()),
            },
        )
        .await
        .unwrap();
    ledger
        .create_transaction(
            fx.user_id,
            NewTransaction {
                pocket_id: fx.pocket_id,
                amount: 200,
                is_income: true,
                date: recent,
                description: Some("nuevo".to_string()),
            },
        )
        .await
        .unwrap();

    let from = Utc::now() - chrono::Duration::days(7);
    let found = ledger
        .list_transactions_by_date(fx.user_id, fx.pocket_id, from, Utc::now())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].description.as_deref(), Some("nuevo"));

    let incomes = ledger
        .list_transactions_by_type_date(
            fx.user_id,
            fx.pocket_id,
            true,
            old - chrono::Duration::days(1),
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(incomes.len(), 2);

    let expenses = ledger
        .list_transactions_by_type_date(
            fx.user_id,
            fx.pocket_id,
            false,
            old - chrono::Duration::days(1),
            Utc::now(),
        )
        .await
        .unwrap();
    assert!(expenses.is_empty());
}

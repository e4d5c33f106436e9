use chrono::Utc;
use ledger::{Ledger, NewAccount, NewPocket, NewTransaction, NewUser, build_context};
use migration::MigratorTrait;
use sea_orm::Database;

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Ledger::builder().database(db).build()
}

async fn seed(ledger: &Ledger) -> (i32, i32) {
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
                money: 0,
                category_id: category.id,
            },
        )
        .await
        .unwrap();
    (user.id, account.id)
}

#[tokio::test]
async fn context_lists_balance_and_per_pocket_history() {
    let ledger = ledger_with_db().await;
    let (user_id, account_id) = seed(&ledger).await;

    let pocket = ledger
        .create_pocket(
            user_id,
            NewPocket {
                name: "mercado".to_string(),
                description: Some("compras de la semana".to_string()),
                account_id,
            },
        )
        .await
        .unwrap();
    ledger
        .create_transaction(
            user_id,
            NewTransaction {
                pocket_id: pocket.id,
                amount: 1500,
                is_income: true,
                date: Utc::now(),
                description: Some("nómina".to_string()),
            },
        )
        .await
        .unwrap();

    let statement = ledger.account_statement(user_id, account_id).await.unwrap();
    let context = build_context(&statement);

    assert!(context.contains("Cuenta \"Principal\""));
    assert!(context.contains("categoría: ahorro"));
    assert!(context.contains("Saldo actual: 1500"));
    assert!(context.contains("Bolsillo \"mercado\""));
    assert!(context.contains("ingreso de 1500"));
    assert!(context.contains("nómina"));
}

#[tokio::test]
async fn one_chat_per_account_and_history_in_insertion_order() {
    let ledger = ledger_with_db().await;
    let (user_id, account_id) = seed(&ledger).await;

    let first = ledger.find_or_create_chat(user_id, account_id).await.unwrap();
    let second = ledger.find_or_create_chat(user_id, account_id).await.unwrap();
    assert_eq!(first.id, second.id);

    ledger
        .record_exchange(first.id, "¿cuánto gasté?", "nada aún")
        .await
        .unwrap();
    ledger
        .record_exchange(first.id, "¿y mi saldo?", "cero")
        .await
        .unwrap();

    let history = ledger.chat_history(user_id, account_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].question, "¿cuánto gasté?");
    assert_eq!(history[1].question, "¿y mi saldo?");
}

//! Bootstrap utilities: create the first super-admin, promote users and
//! seed categories, straight against the database.

use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use ledger::{Ledger, NewUser, RoleKind};
use migration::MigratorTrait;
use sea_orm::Database;

#[derive(Parser, Debug)]
#[command(name = "alcancia_admin")]
#[command(about = "Admin utilities for Alcancía (bootstrap admins/categories)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./alcancia.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Admin(Admin),
    Category(Category),
}

#[derive(Args, Debug)]
struct Admin {
    #[command(subcommand)]
    command: AdminCommand,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Create an admin or super-admin; prompts for the password.
    Create(AdminCreateArgs),
    /// List users holding an elevated role.
    List,
}

#[derive(Args, Debug)]
struct AdminCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    nickname: String,
    /// Grant `super_admin` instead of `admin`.
    #[arg(long)]
    super_admin: bool,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// Seed a category by label.
    Create { tipo: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = Database::connect(&cli.database_url).await?;
    migration::Migrator::up(&db, None).await?;
    let ledger = Ledger::builder().database(db).build();

    match cli.command {
        Command::Admin(admin) => match admin.command {
            AdminCommand::Create(args) => {
                let password = prompt_password_twice()?;
                let role = if args.super_admin {
                    RoleKind::SuperAdmin
                } else {
                    RoleKind::Admin
                };
                let user = ledger
                    .create_admin(
                        NewUser {
                            email: args.email,
                            password,
                            nickname: args.nickname,
                        },
                        role,
                    )
                    .await?;
                println!("created {} ({})", user.email, role.as_str());
            }
            AdminCommand::List => {
                for (user, role) in ledger.list_admins().await? {
                    println!("{}\t{}\t{}", user.id, user.email, role.as_str());
                }
            }
        },
        Command::Category(category) => match category.command {
            CategoryCommand::Create { tipo } => {
                let created = ledger.create_category(&tipo).await?;
                println!("created category {} ({})", created.tipo, created.id);
            }
        },
    }

    Ok(())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let second = prompt_password("Confirm password: ")?;
        if first == second {
            return Ok(first);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

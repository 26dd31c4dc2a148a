use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, SettleSummary, SettleView, Tolerance};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "splitledger_admin")]
#[command(about = "Admin utilities for SplitLedger (bootstrap users/groups)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./splitledger.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Group(Group),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    /// Also read from `SPLITLEDGER_PASSWORD`.
    #[arg(long, env = "SPLITLEDGER_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct Group {
    #[command(subcommand)]
    command: GroupCommand,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Create(GroupCreateArgs),
    AddMember(GroupMemberArgs),
    Summary(GroupSummaryArgs),
}

#[derive(Args, Debug)]
struct GroupCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct GroupMemberArgs {
    #[arg(long)]
    group: Uuid,
    /// Existing member performing the invite.
    #[arg(long)]
    by: String,
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct GroupSummaryArgs {
    #[arg(long)]
    group: Uuid,
    #[arg(long)]
    user: String,
    /// Only show payments involving `--user`.
    #[arg(long)]
    mine: bool,
    #[arg(long, default_value = "0.01")]
    tolerance: Tolerance,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            if args.password.is_empty() {
                eprintln!("password must not be empty");
                std::process::exit(2);
            }
            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(args.password),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {}", args.username);
        }
        Command::Group(Group {
            command: GroupCommand::Create(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let group_id = engine.create_group(&args.name, &args.owner).await?;
            println!("created group: {} ({group_id})", args.name);
        }
        Command::Group(Group {
            command: GroupCommand::AddMember(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            engine
                .add_group_member(args.group, &args.username, &args.by)
                .await?;
            println!("added {} to {}", args.username, args.group);
        }
        Command::Group(Group {
            command: GroupCommand::Summary(args),
        }) => {
            let engine = Engine::builder()
                .database(db.clone())
                .tolerance(args.tolerance)
                .build()
                .await?;
            let view = if args.mine {
                SettleView::Mine
            } else {
                SettleView::All
            };
            match engine
                .group_settle_summary(args.group, &args.user, view)
                .await?
            {
                SettleSummary::All(settlements) => {
                    for s in settlements {
                        println!("{} -> {}: {}", s.from, s.to, s.amount);
                    }
                }
                SettleSummary::Mine(entries) => {
                    for e in entries {
                        println!("{}: {}", e.counterparty, e.signed_amount);
                    }
                }
            }
        }
    }

    Ok(())
}

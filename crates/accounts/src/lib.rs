//! # accounts
//!
//! User registration, login and listing on top of `querygen`.
//!
//! [`UserService`] covers lookups and paginated listings. [`AuthService`]
//! adds registration, login and bearer-token checks, with password hashing
//! and token signing supplied by the caller through [`PasswordHasher`] and
//! [`TokenSigner`]. Failures are [`ServiceError`]s carrying a status code, a
//! client action and a message key.
//!
//! The `accounts` binary wraps the read side for operators.

pub mod auth;
pub mod cli;
pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod service;
pub mod telemetry;

pub use auth::{Claims, CredentialError, PasswordHasher, TokenKind, TokenSigner};
pub use config::{AppConfig, ConfigError};
pub use dto::{LoginRequest, LoginTokens, Page, RegisterRequest, UsersParams};
pub use error::{Action, ErrorCode, ErrorResponse, ServiceError, ServiceResult};
pub use models::{Token, User, UserSummary};
pub use service::{AuthService, UserService};

use anyhow::Context;
use querygen::Generator;

/// Table definitions applied by `accounts init-db`.
pub const SCHEMA: &str = include_str!("../schema.sql");

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let (global, cmd) = match cli::parse_args(&args)? {
        cli::Command::Help => {
            cli::print_help();
            return Ok(());
        }
        cli::Command::InitDb(global) => (global, Op::InitDb),
        cli::Command::Users(global, params) => (global, Op::Users(params)),
        cli::Command::PhoneAvailable(global, phone) => (global, Op::PhoneAvailable(phone)),
        cli::Command::Me(global, id) => (global, Op::Me(id)),
    };

    let mut config = AppConfig::load(&global.config)
        .with_context(|| format!("loading {}", global.config.display()))?;
    if let Some(url) = global.database {
        config.database.url = url;
    }
    telemetry::init(&config.log.filter);

    let pool = querygen::create_pool_with_config(&config.database.url, config.database.pool_size)?;
    let client = pool.get().await.context("connecting to database")?;
    let users = UserService::new(&config);

    match cmd {
        Op::InitDb => {
            let mut schema = Generator::for_entity_with(User::default(), config.generator_config());
            schema
                .raw_query(SCHEMA)
                .wrap_atomic()
                .exec_mutation(&client)
                .await?;
            println!("schema ready");
        }
        Op::Users(params) => {
            let page = users.list_users(&client, &params).await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Op::PhoneAvailable(phone) => {
            let free = users.phone_is_unique(&client, &phone).await?;
            println!("{phone}: {}", if free { "available" } else { "taken" });
        }
        Op::Me(id) => {
            let user = users.me(&client, id).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
    }
    Ok(())
}

enum Op {
    InitDb,
    Users(UsersParams),
    PhoneAvailable(String),
    Me(i64),
}

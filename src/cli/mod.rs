//! CLI module for Warbler
//!
//! Administrative subcommands over the user directory:
//! - `migrate`: apply or revert the schema
//! - `signup`, `login`: create and check accounts
//! - `follow`, `unfollow`, `show`: manage and inspect the follow graph

pub mod migrate;
pub mod users;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Warbler - user directory administration
#[derive(Parser)]
#[command(name = "warbler")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database URL, overriding DATABASE_URL and config files
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply pending migrations, or revert the latest one
    Migrate(migrate::MigrateArgs),

    /// Create a user
    Signup(users::SignupArgs),

    /// Check a username and password
    Login(users::LoginArgs),

    /// Make one user follow another
    Follow(users::FollowArgs),

    /// Remove a follow
    Unfollow(users::FollowArgs),

    /// Print a user with follower, following and message counts
    Show(users::ShowArgs),
}

/// Load `.env` and configuration, apply the command-line override and start logging
pub fn load_config(database_url: Option<&str>) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load()?;
    if let Some(url) = database_url {
        config = config.with_database_url(url);
    }

    logging::init_logging(&config.logging);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_database_url() {
        let cli = Cli::try_parse_from([
            "warbler",
            "show",
            "--username",
            "testuser",
            "--database-url",
            "postgres:///other",
        ])
        .unwrap();

        assert_eq!(cli.database_url.as_deref(), Some("postgres:///other"));
        assert!(matches!(cli.command, Command::Show(ref args) if args.username == "testuser"));
    }

    #[test]
    fn test_parse_migrate_revert() {
        let cli = Cli::try_parse_from(["warbler", "migrate", "--revert"]).unwrap();

        assert!(cli.database_url.is_none());
        assert!(matches!(cli.command, Command::Migrate(ref args) if args.revert));
    }

    #[test]
    fn test_signup_email_is_optional() {
        let cli = Cli::try_parse_from([
            "warbler",
            "signup",
            "--username",
            "testuser",
            "--password",
            "password",
        ])
        .unwrap();

        match cli.command {
            Command::Signup(args) => {
                assert!(args.email.is_none());
                assert!(args.image_url.is_none());
            }
            _ => panic!("expected signup"),
        }
    }
}

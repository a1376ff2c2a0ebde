//! User commands - signup, login and follow management

use clap::Args;
use serde::Serialize;

use crate::config::AppConfig;
use crate::domain::User;
use crate::infrastructure::user::{Argon2Hasher, SignupRequest, UserDirectory};

/// Arguments for the signup command
#[derive(Args, Clone, Debug)]
pub struct SignupArgs {
    #[arg(long)]
    pub username: String,

    /// Omitting it fails on commit, as the store requires one
    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub image_url: Option<String>,
}

/// Arguments for the login command
#[derive(Args, Clone, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,
}

/// Arguments for the follow and unfollow commands
#[derive(Args, Clone, Debug)]
pub struct FollowArgs {
    /// Username of the user doing the following
    #[arg(long)]
    pub follower: String,

    /// Username of the user being followed
    #[arg(long)]
    pub followee: String,
}

/// Arguments for the show command
#[derive(Args, Clone, Debug)]
pub struct ShowArgs {
    #[arg(long)]
    pub username: String,
}

/// A user together with the sizes of their relationships
#[derive(Debug, Serialize)]
pub struct UserSummary {
    #[serde(flatten)]
    pub user: User,
    pub followers: usize,
    pub following: usize,
    pub messages: usize,
}

impl UserSummary {
    pub async fn load(
        directory: &UserDirectory<Argon2Hasher>,
        user: User,
    ) -> anyhow::Result<Self> {
        let followers = directory.followers(&user).await?.len();
        let following = directory.following(&user).await?.len();
        let messages = directory.messages(&user).await?.len();

        Ok(Self {
            user,
            followers,
            following,
            messages,
        })
    }
}

/// Sign up and commit a new user
pub async fn signup(config: &AppConfig, args: SignupArgs) -> anyhow::Result<()> {
    let directory = crate::create_directory(config).await?;
    let mut session = directory.session();

    let request = SignupRequest {
        username: args.username,
        email: args.email,
        password: args.password,
        image_url: args.image_url,
    };

    let staged = directory.signup(&mut session, request).await?;
    session.commit().await?;

    let user = directory
        .get(staged.id())
        .await?
        .ok_or_else(|| anyhow::anyhow!("User {} missing after commit", staged.id()))?;

    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}

/// Check credentials; fails if they are rejected
pub async fn login(config: &AppConfig, args: LoginArgs) -> anyhow::Result<()> {
    let directory = crate::create_directory(config).await?;

    let user = directory
        .authenticate(&args.username, &args.password)
        .await?
        .into_user()
        .ok_or_else(|| anyhow::anyhow!("Invalid credentials"))?;

    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}

/// Commit "`follower` follows `followee`"
pub async fn follow(config: &AppConfig, args: FollowArgs) -> anyhow::Result<()> {
    let directory = crate::create_directory(config).await?;
    let follower = directory.require_by_username(&args.follower).await?;
    let followee = directory.require_by_username(&args.followee).await?;

    let mut session = directory.session();
    directory.follow(&mut session, &follower, &followee)?;
    session.commit().await?;

    println!("{} now follows {}", follower.username(), followee.username());
    Ok(())
}

/// Commit removal of "`follower` follows `followee`"
pub async fn unfollow(config: &AppConfig, args: FollowArgs) -> anyhow::Result<()> {
    let directory = crate::create_directory(config).await?;
    let follower = directory.require_by_username(&args.follower).await?;
    let followee = directory.require_by_username(&args.followee).await?;

    let mut session = directory.session();
    directory.unfollow(&mut session, &follower, &followee)?;
    session.commit().await?;

    println!(
        "{} no longer follows {}",
        follower.username(),
        followee.username()
    );
    Ok(())
}

/// Print a user summary as JSON
pub async fn show(config: &AppConfig, args: ShowArgs) -> anyhow::Result<()> {
    let directory = crate::create_directory(config).await?;
    let user = directory.require_by_username(&args.username).await?;

    let summary = UserSummary::load(&directory, user).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::infrastructure::storage::InMemoryStore;

    #[tokio::test]
    async fn test_user_summary() {
        let directory = UserDirectory::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(Argon2Hasher::with_params(8, 1, 1).unwrap()),
        );
        let mut session = directory.session();

        directory
            .signup(&mut session, SignupRequest::new("u1", "u1@test.com", "password"))
            .await
            .unwrap();
        directory
            .signup(&mut session, SignupRequest::new("u2", "u2@test.com", "password"))
            .await
            .unwrap();
        session.commit().await.unwrap();

        let u1 = directory.require_by_username("u1").await.unwrap();
        let u2 = directory.require_by_username("u2").await.unwrap();

        directory.follow(&mut session, &u2, &u1).unwrap();
        directory.post_message(&mut session, &u1, "hello").await.unwrap();
        session.commit().await.unwrap();

        let summary = UserSummary::load(&directory, u1).await.unwrap();
        assert_eq!(summary.followers, 1);
        assert_eq!(summary.following, 0);
        assert_eq!(summary.messages, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["username"], "u1");
        assert_eq!(json["followers"], 1);
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_login_rejects_unknown_user() {
        let mut config = AppConfig::default().in_memory();
        config.password = crate::config::PasswordConfig {
            memory_cost_kib: 8,
            time_cost: 1,
            parallelism: 1,
        };

        let err = login(
            &config,
            LoginArgs {
                username: "ghost".to_string(),
                password: "password".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Invalid credentials");
    }
}

use clap::Parser;
use warbler::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::load_config(cli.database_url.as_deref())?;

    match cli.command {
        Command::Migrate(args) => cli::migrate::run(&config, args).await,
        Command::Signup(args) => cli::users::signup(&config, args).await,
        Command::Login(args) => cli::users::login(&config, args).await,
        Command::Follow(args) => cli::users::follow(&config, args).await,
        Command::Unfollow(args) => cli::users::unfollow(&config, args).await,
        Command::Show(args) => cli::users::show(&config, args).await,
    }
}

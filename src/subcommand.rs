use {super::*, anyhow::Context, settings::Settings};

mod mine;
mod spam;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
    #[command(about = "Mine a single block on the devnet")]
    Mine(mine::Mine),
    #[command(about = "Spam blocks between funded devnet accounts")]
    Spam(spam::Spam),
}

impl Subcommand {
    /// Settings given on the command line for this subcommand.
    pub(crate) fn settings(&self) -> Settings {
        match self {
            Self::Mine(mine) => mine.settings(),
            Self::Spam(spam) => spam.settings(),
        }
    }

    pub(crate) async fn run(self, settings: Settings, cancel_token: CancellationToken) -> Result {
        match self {
            Self::Mine(mine) => mine.run(settings, cancel_token).await,
            Self::Spam(spam) => spam.run(settings, cancel_token).await,
        }
    }
}

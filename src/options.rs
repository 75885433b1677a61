use super::*;

#[derive(Clone, Default, Debug, Parser)]
pub struct Options {
    #[arg(long, help = "Load configuration from <CONFIG>.")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Load configuration from <CONFIG_DIR>/spammer.toml.")]
    pub config_dir: Option<PathBuf>,

    #[arg(long, help = "Require a PoW score of at least <MIN_POW_SCORE> on the devnet.")]
    pub min_pow_score: Option<f64>,

    #[arg(long, help = "Allow at most <MAX_INPUTS> inputs per transaction.")]
    pub max_inputs: Option<usize>,

    #[arg(long, help = "Allow at most <MAX_OUTPUTS> outputs per transaction.")]
    pub max_outputs: Option<usize>,
}

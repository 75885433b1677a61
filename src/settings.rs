use {super::*, anyhow::Context, options::Options};

const CONFIG_FILE: &str = "spammer.toml";

/// TOML config file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub min_pow_score: Option<f64>,
    pub max_inputs: Option<usize>,
    pub max_outputs: Option<usize>,
    pub parallelism: Option<usize>,
    pub target_score: Option<f64>,

    pub spam: Option<SpamSection>,
    pub mine: Option<MineSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpamSection {
    pub mode: Option<Mode>,
    pub bps: Option<f64>,
    pub count: Option<u64>,
    pub refresh_tips_interval: Option<f64>,
    pub accounts: Option<usize>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MineSection {
    pub timeout: Option<f64>,
}

/// Unified settings struct with all resolved configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Settings {
    // Global
    pub config: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub min_pow_score: Option<f64>,
    pub max_inputs: Option<usize>,
    pub max_outputs: Option<usize>,
    pub parallelism: Option<usize>,
    pub target_score: Option<f64>,

    // Spam
    pub spam_mode: Option<Mode>,
    pub spam_bps: Option<f64>,
    pub spam_count: Option<u64>,
    pub spam_refresh_tips_interval: Option<f64>,
    pub spam_accounts: Option<usize>,
    pub spam_tag: Option<String>,

    // Mine
    pub mine_timeout: Option<f64>,
}

impl Settings {
    /// Load settings from all sources with proper priority
    pub fn load(options: Options, cli: Settings) -> Result<Self> {
        let mut env = BTreeMap::<String, String>::new();

        for (var, value) in env::vars_os() {
            let Some(var) = var.to_str() else {
                continue;
            };

            let Some(key) = var.strip_prefix("SPAMMER_") else {
                continue;
            };

            env.insert(
                key.into(),
                value.into_string().map_err(|value| {
                    anyhow!(
                        "environment variable `{var}` not valid unicode: `{}`",
                        value.to_string_lossy()
                    )
                })?,
            );
        }

        Self::merge(options, cli, env)
    }

    /// Merge all configuration sources: command line, environment, config
    /// file, defaults.
    pub fn merge(options: Options, cli: Settings, env: BTreeMap<String, String>) -> Result<Self> {
        let settings = cli.or(Self::from_options(&options));

        let settings = settings.or(Self::from_env(&env)?);

        let config = match Self::find_config_path(&settings) {
            Some(config_path) => toml::from_str(&fs::read_to_string(&config_path).context(
                anyhow!("failed to open config file `{}`", config_path.display()),
            )?)
            .context(anyhow!(
                "failed to deserialize config file `{}`",
                config_path.display()
            ))?,
            None => Config::default(),
        };

        let settings = settings.or(Self::from_config(&config)).or_defaults();

        settings.validate()?;

        Ok(settings)
    }

    fn find_config_path(settings: &Self) -> Option<PathBuf> {
        if let Some(path) = &settings.config {
            return Some(path.clone());
        }

        if let Some(dir) = &settings.config_dir {
            let path = dir.join(CONFIG_FILE);
            if path.exists() {
                return Some(path);
            }
        }

        if integration_test() {
            return None;
        }

        dirs::config_dir()
            .map(|dir| dir.join("spammer").join(CONFIG_FILE))
            .filter(|path| path.exists())
    }

    pub fn from_options(options: &Options) -> Self {
        Self {
            config: options.config.clone(),
            config_dir: options.config_dir.clone(),
            min_pow_score: options.min_pow_score,
            max_inputs: options.max_inputs,
            max_outputs: options.max_outputs,
            ..Default::default()
        }
    }

    pub fn from_env(env: &BTreeMap<String, String>) -> Result<Self> {
        fn parse<T: FromStr>(
            env: &BTreeMap<String, String>,
            key: &str,
            kind: &str,
        ) -> Result<Option<T>>
        where
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            env.get(key)
                .map(|value| value.parse::<T>())
                .transpose()
                .with_context(|| {
                    format!("failed to parse environment variable SPAMMER_{key} as {kind}")
                })
        }

        let get_path = |key: &str| env.get(key).map(PathBuf::from);

        let get_mode = |key: &str| -> Result<Option<Mode>> {
            env.get(key)
                .map(|mode| Mode::from_str(mode, true).map_err(|err| anyhow!(err)))
                .transpose()
                .with_context(|| format!("failed to parse environment variable SPAMMER_{key} as mode"))
        };

        Ok(Self {
            config: get_path("CONFIG"),
            config_dir: get_path("CONFIG_DIR"),
            min_pow_score: parse(env, "MIN_POW_SCORE", "f64")?,
            max_inputs: parse(env, "MAX_INPUTS", "usize")?,
            max_outputs: parse(env, "MAX_OUTPUTS", "usize")?,
            parallelism: parse(env, "PARALLELISM", "usize")?,
            target_score: parse(env, "TARGET_SCORE", "f64")?,

            spam_mode: get_mode("SPAM_MODE")?,
            spam_bps: parse(env, "SPAM_BPS", "f64")?,
            spam_count: parse(env, "SPAM_COUNT", "u64")?,
            spam_refresh_tips_interval: parse(env, "SPAM_REFRESH_TIPS_INTERVAL", "f64")?,
            spam_accounts: parse(env, "SPAM_ACCOUNTS", "usize")?,
            spam_tag: env.get("SPAM_TAG").cloned(),

            mine_timeout: parse(env, "MINE_TIMEOUT", "f64")?,
        })
    }

    pub fn from_config(config: &Config) -> Self {
        let spam = config.spam.as_ref();
        let mine = config.mine.as_ref();

        Self {
            config: None,
            config_dir: None,
            min_pow_score: config.min_pow_score,
            max_inputs: config.max_inputs,
            max_outputs: config.max_outputs,
            parallelism: config.parallelism,
            target_score: config.target_score,

            spam_mode: spam.and_then(|s| s.mode),
            spam_bps: spam.and_then(|s| s.bps),
            spam_count: spam.and_then(|s| s.count),
            spam_refresh_tips_interval: spam.and_then(|s| s.refresh_tips_interval),
            spam_accounts: spam.and_then(|s| s.accounts),
            spam_tag: spam.and_then(|s| s.tag.clone()),

            mine_timeout: mine.and_then(|m| m.timeout),
        }
    }

    /// Merge self with another Settings, self takes priority
    pub fn or(self, other: Self) -> Self {
        Self {
            config: self.config.or(other.config),
            config_dir: self.config_dir.or(other.config_dir),
            min_pow_score: self.min_pow_score.or(other.min_pow_score),
            max_inputs: self.max_inputs.or(other.max_inputs),
            max_outputs: self.max_outputs.or(other.max_outputs),
            parallelism: self.parallelism.or(other.parallelism),
            target_score: self.target_score.or(other.target_score),

            spam_mode: self.spam_mode.or(other.spam_mode),
            spam_bps: self.spam_bps.or(other.spam_bps),
            spam_count: self.spam_count.or(other.spam_count),
            spam_refresh_tips_interval: self
                .spam_refresh_tips_interval
                .or(other.spam_refresh_tips_interval),
            spam_accounts: self.spam_accounts.or(other.spam_accounts),
            spam_tag: self.spam_tag.or(other.spam_tag),

            mine_timeout: self.mine_timeout.or(other.mine_timeout),
        }
    }

    fn or_defaults(self) -> Self {
        let parameters = ProtocolParameters::default();

        Self {
            config: None,
            config_dir: None,
            min_pow_score: Some(self.min_pow_score.unwrap_or(parameters.min_pow_score)),
            max_inputs: Some(self.max_inputs.unwrap_or(parameters.max_inputs)),
            max_outputs: Some(self.max_outputs.unwrap_or(parameters.max_outputs)),
            parallelism: Some(system_utils::parallelism(self.parallelism)),
            target_score: self.target_score,

            spam_mode: Some(self.spam_mode.unwrap_or_default()),
            spam_bps: Some(self.spam_bps.unwrap_or(0.0)),
            spam_count: self.spam_count,
            spam_refresh_tips_interval: self.spam_refresh_tips_interval,
            spam_accounts: Some(self.spam_accounts.unwrap_or(2)),
            spam_tag: Some(self.spam_tag.unwrap_or_else(|| DEFAULT_TAG.into())),

            mine_timeout: self.mine_timeout,
        }
    }

    fn validate(&self) -> Result {
        fn positive(name: &str, value: Option<f64>) -> Result {
            if let Some(value) = value {
                ensure!(
                    value.is_finite() && value > 0.0,
                    "{name} must be a positive number, got {value}"
                );
            }
            Ok(())
        }

        fn seconds(name: &str, value: Option<f64>) -> Result {
            if let Some(value) = value {
                Duration::try_from_secs_f64(value)
                    .ok()
                    .filter(|duration| !duration.is_zero())
                    .with_context(|| format!("{name} must be a positive number of seconds, got {value}"))?;
            }
            Ok(())
        }

        positive("min PoW score", self.min_pow_score)?;
        positive("target score", self.target_score)?;
        seconds("refresh tips interval", self.spam_refresh_tips_interval)?;
        seconds("mine timeout", self.mine_timeout)?;

        if let (Some(target_score), Some(min_pow_score)) = (self.target_score, self.min_pow_score) {
            ensure!(
                target_score >= min_pow_score,
                "target score {target_score} is below the min PoW score {min_pow_score}"
            );
        }

        if let Some(bps) = self.spam_bps {
            spammer::throttle_period(bps)?;
        }

        ensure!(
            self.max_inputs.unwrap_or(1) >= 1,
            "transactions need at least one input"
        );

        ensure!(
            self.max_outputs.unwrap_or(1) >= 1,
            "transactions need at least one output"
        );

        if let Some(accounts) = self.spam_accounts {
            ensure!(
                accounts >= 2,
                "spamming needs at least two accounts, got {accounts}"
            );
        }

        if let Some(tag) = &self.spam_tag {
            ensure!(
                tag.len() <= TaggedData::MAX_TAG_LEN,
                "tag is {} bytes, at most {} allowed",
                tag.len(),
                TaggedData::MAX_TAG_LEN
            );
        }

        Ok(())
    }

    pub fn protocol_parameters(&self) -> ProtocolParameters {
        let defaults = ProtocolParameters::default();

        ProtocolParameters {
            min_pow_score: self.min_pow_score.unwrap_or(defaults.min_pow_score),
            max_inputs: self.max_inputs.unwrap_or(defaults.max_inputs),
            max_outputs: self.max_outputs.unwrap_or(defaults.max_outputs),
            ..defaults
        }
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism.unwrap_or(1)
    }

    pub fn spam_accounts(&self) -> usize {
        self.spam_accounts.unwrap_or(2)
    }

    pub fn mine_timeout(&self) -> Option<Duration> {
        self.mine_timeout
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub(crate) fn spam_config(&self) -> SpamConfig {
        SpamConfig {
            bps: self.spam_bps.unwrap_or_default(),
            count: self.spam_count,
            mode: self.spam_mode.unwrap_or_default(),
            parallelism: self.parallelism(),
            refresh_tips_interval: self
                .spam_refresh_tips_interval
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
            tag: self.spam_tag.clone().unwrap_or_else(|| DEFAULT_TAG.into()),
            target_score: self.target_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, tempfile::TempDir};

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn merge(options: Options, cli: Settings, env: BTreeMap<String, String>) -> Settings {
        Settings::merge(options, cli, env).unwrap()
    }

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn settings_from_empty_env() {
        let settings = Settings::from_env(&BTreeMap::new()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn settings_from_env() {
        let settings = Settings::from_env(&env(&[
            ("MIN_POW_SCORE", "0.5"),
            ("PARALLELISM", "3"),
            ("SPAM_MODE", "native-tokens"),
            ("SPAM_COUNT", "10"),
            ("SPAM_TAG", "hello"),
            ("MINE_TIMEOUT", "1.5"),
        ]))
        .unwrap();

        assert_eq!(settings.min_pow_score, Some(0.5));
        assert_eq!(settings.parallelism, Some(3));
        assert_eq!(settings.spam_mode, Some(Mode::NativeTokens));
        assert_eq!(settings.spam_count, Some(10));
        assert_eq!(settings.spam_tag, Some("hello".into()));
        assert_eq!(settings.mine_timeout, Some(1.5));
    }

    #[test]
    fn invalid_env_value_names_variable() {
        let err = Settings::from_env(&env(&[("SPAM_COUNT", "many")])).unwrap_err();
        assert!(
            err.to_string().contains("SPAMMER_SPAM_COUNT"),
            "unexpected error: {err}"
        );

        assert!(Settings::from_env(&env(&[("SPAM_MODE", "loud")])).is_err());
    }

    #[test]
    fn settings_merge_priority() {
        let high = Settings {
            spam_bps: Some(5.0),
            ..Default::default()
        };
        let low = Settings {
            spam_bps: Some(1.0),
            spam_count: Some(7),
            ..Default::default()
        };

        let merged = high.or(low);
        assert_eq!(merged.spam_bps, Some(5.0));
        assert_eq!(merged.spam_count, Some(7));
    }

    #[test]
    fn defaults_are_applied() {
        let settings = merge(Options::default(), Settings::default(), BTreeMap::new());

        assert_eq!(settings.min_pow_score, Some(1.0));
        assert_eq!(settings.max_inputs, Some(128));
        assert_eq!(settings.max_outputs, Some(128));
        assert_eq!(settings.spam_mode, Some(Mode::Basic));
        assert_eq!(settings.spam_bps, Some(0.0));
        assert_eq!(settings.spam_accounts, Some(2));
        assert_eq!(settings.spam_tag, Some(DEFAULT_TAG.into()));
        assert!(settings.parallelism() >= 1);
        assert_eq!(settings.spam_count, None);
        assert_eq!(settings.target_score, None);
    }

    #[test]
    fn cli_beats_env_beats_config() {
        let dir = TempDir::new().unwrap();
        let config = write_config(
            &dir,
            "min_pow_score = 0.1\n\n[spam]\nbps = 1.0\ncount = 1\naccounts = 3\n",
        );

        let settings = merge(
            Options {
                config: Some(config),
                ..Default::default()
            },
            Settings {
                spam_bps: Some(9.0),
                ..Default::default()
            },
            env(&[("SPAM_COUNT", "4")]),
        );

        assert_eq!(settings.spam_bps, Some(9.0));
        assert_eq!(settings.spam_count, Some(4));
        assert_eq!(settings.spam_accounts, Some(3));
        assert_eq!(settings.min_pow_score, Some(0.1));
    }

    #[test]
    fn config_dir_is_searched() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[mine]\ntimeout = 2.5\n");

        let settings = merge(
            Options {
                config_dir: Some(dir.path().into()),
                ..Default::default()
            },
            Settings::default(),
            BTreeMap::new(),
        );

        assert_eq!(settings.mine_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn config_sections_are_read() {
        let config: Config = toml::from_str(
            "target_score = 1.5\nparallelism = 2\n\n[spam]\nmode = \"mixed\"\ntag = \"load\"\n",
        )
        .unwrap();

        let settings = Settings::from_config(&config);
        assert_eq!(settings.target_score, Some(1.5));
        assert_eq!(settings.parallelism, Some(2));
        assert_eq!(settings.spam_mode, Some(Mode::Mixed));
        assert_eq!(settings.spam_tag, Some("load".into()));
        assert_eq!(settings.mine_timeout, None);
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, "[spam]\nloudness = 11\n");

        assert!(
            Settings::merge(
                Options {
                    config: Some(config),
                    ..Default::default()
                },
                Settings::default(),
                BTreeMap::new(),
            )
            .is_err()
        );
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = Settings::merge(
            Options {
                config: Some("/nonexistent/spammer.toml".into()),
                ..Default::default()
            },
            Settings::default(),
            BTreeMap::new(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("failed to open config file"));
    }

    #[test]
    fn validation_rejects_bad_values() {
        for cli in [
            Settings {
                spam_accounts: Some(1),
                ..Default::default()
            },
            Settings {
                target_score: Some(0.0),
                ..Default::default()
            },
            Settings {
                target_score: Some(0.5),
                ..Default::default()
            },
            Settings {
                spam_bps: Some(-1.0),
                ..Default::default()
            },
            Settings {
                spam_bps: Some(1e10),
                ..Default::default()
            },
            Settings {
                spam_bps: Some(1e-30),
                ..Default::default()
            },
            Settings {
                max_outputs: Some(0),
                ..Default::default()
            },
            Settings {
                mine_timeout: Some(f64::INFINITY),
                ..Default::default()
            },
            Settings {
                spam_tag: Some("x".repeat(TaggedData::MAX_TAG_LEN + 1)),
                ..Default::default()
            },
        ] {
            assert!(
                Settings::merge(Options::default(), cli.clone(), BTreeMap::new()).is_err(),
                "{cli:?} should be rejected"
            );
        }
    }

    #[test]
    fn spam_config_reflects_settings() {
        let settings = merge(
            Options::default(),
            Settings {
                spam_mode: Some(Mode::Mixed),
                spam_refresh_tips_interval: Some(0.5),
                parallelism: Some(1),
                ..Default::default()
            },
            BTreeMap::new(),
        );

        let config = settings.spam_config();
        assert_eq!(config.mode, Mode::Mixed);
        assert_eq!(config.parallelism, 1);
        assert_eq!(config.refresh_tips_interval, Some(Duration::from_millis(500)));
        assert_eq!(config.tag, DEFAULT_TAG);
    }

    #[test]
    fn protocol_parameters_reflect_settings() {
        let settings = merge(
            Options {
                min_pow_score: Some(0.25),
                max_inputs: Some(4),
                ..Default::default()
            },
            Settings::default(),
            BTreeMap::new(),
        );

        let parameters = settings.protocol_parameters();
        assert_eq!(parameters.min_pow_score, 0.25);
        assert_eq!(parameters.max_inputs, 4);
        assert_eq!(parameters.max_outputs, 128);
    }
}

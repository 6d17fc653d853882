use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_log_path")]
    pub log_path: String,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub stress: StressConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_steps: u64,
    pub start_price: f64,
    pub volatility: f64,
    pub spread_min: f64,
    pub spread_max: f64,
    pub price_decimals: u32,
    pub max_provider_quantity: u64,
    pub aggressor_probability: f64,
    pub max_aggressor_quantity: u64,
    pub imbalance_depth: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub confidence_level: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub levels: u64,
    pub tick: f64,
    pub level_quantity: u64,
    pub mid: f64,
    pub surviving_bids: usize,
    pub sell_volume: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            simulation: SimulationConfig::default(),
            risk: RiskConfig::default(),
            stress: StressConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_steps: 5000,
            start_price: 100.0,
            volatility: 0.2,
            spread_min: 0.1,
            spread_max: 0.5,
            price_decimals: 2,
            max_provider_quantity: 10,
            aggressor_probability: 0.3,
            max_aggressor_quantity: 5,
            imbalance_depth: 5,
            seed: None,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self { confidence_level: 0.95 }
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            levels: 20,
            tick: 0.1,
            level_quantity: 10,
            mid: 100.0,
            surviving_bids: 4,
            sell_volume: 60,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.volatility >= 0.0, "volatility must be non-negative");
        anyhow::ensure!(
            0.0 <= self.spread_min && self.spread_min <= self.spread_max,
            "spread_min must be within [0, spread_max]"
        );
        anyhow::ensure!(self.max_provider_quantity > 0, "max_provider_quantity must be positive");
        anyhow::ensure!(self.max_aggressor_quantity > 0, "max_aggressor_quantity must be positive");
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.aggressor_probability),
            "aggressor_probability must be within [0, 1]"
        );
        Ok(())
    }
}

fn default_log_path() -> String {
    "market_data.csv".to_string()
}

impl Settings {
    /// Reads `path` if it exists, then applies `LIQUID_RISK__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("LIQUID_RISK")
                    .separator("__")
                    .try_parsing(true),
            );
        Ok(builder.build()?.try_deserialize()?)
    }
}

//! Oracle App
//!
//! Unified initialization for oracle request clients: logging + keystore + settings,
//! plus the [`RequestConfig`] the demo driver reads.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use oracle_codec::{CodecError, TypedValue};
use oracle_crypto::{Address, SigningKeypair};
use oracle_logging::LogLevel;
use oracle_request::{
    BoxReference, Destination, NetworkParams, RequestArgs, RequestParams, RequestType,
    SourceSpec, TransactionParams,
};
use oracle_settings::{Settings, SettingsError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),
    #[error("Keystore error: {0}")]
    KeystoreError(#[from] oracle_keystore::KeystoreError),
    #[error("Invalid request config: {0}")]
    InvalidConfig(#[from] CodecError),
}

/// Ledger the client talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub endpoint: String,
    pub genesis_id: String,
    pub genesis_hash: String,
    /// Round the dry-run client reports as current.
    pub last_round: u64,
    pub min_fee: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://testnet-api.algonode.cloud".into(),
            genesis_id: "testnet-v1.0".into(),
            genesis_hash: "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=".into(),
            last_round: 30_000_000,
            min_fee: 1000,
        }
    }
}

impl LedgerConfig {
    pub fn transaction_params(&self) -> TransactionParams {
        TransactionParams {
            consensus_version: String::new(),
            fee: 0,
            genesis_hash: self.genesis_hash.clone(),
            genesis_id: self.genesis_id.clone(),
            last_round: self.last_round,
            min_fee: self.min_fee,
        }
    }
}

/// Data source the request asks the oracle network to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub source_id: u32,
    pub args: Vec<String>,
    pub max_age_seconds: u64,
}

impl From<&SourceConfig> for SourceSpec {
    fn from(source: &SourceConfig) -> Self {
        SourceSpec::new(
            source.source_id,
            source.args.iter().map(String::as_bytes),
            source.max_age_seconds,
        )
    }
}

/// Settings for the `oracle-request` driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub ledger: LedgerConfig,
    /// Oracle main contract.
    pub app_id: u64,
    pub destination_app_id: u64,
    pub destination_method: String,
    pub asset_refs: Vec<u64>,
    pub sources: Vec<SourceConfig>,
    pub aggregation_type: u32,
    pub user_data: String,
    pub request_type: u64,
    /// Rounds to wait for confirmation.
    pub wait_rounds: u64,
    /// Seconds to wait after submission before exiting.
    pub post_submit_wait_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            app_id: 228009344,
            destination_app_id: 162365438,
            destination_method: "test_endpoint".into(),
            asset_refs: vec![227418519],
            sources: vec![SourceConfig {
                source_id: 11,
                args: [
                    "005CbGKDn22fNWfXuWQu",
                    "Kenya",
                    "nairobi",
                    "metric",
                    "$.data.temparature",
                    "$.data.timestamp",
                ]
                .map(String::from)
                .to_vec(),
                max_age_seconds: 60,
            }],
            aggregation_type: 0,
            user_data: "test".into(),
            request_type: 1,
            wait_rounds: 5,
            post_submit_wait_secs: 60,
        }
    }
}

impl RequestConfig {
    pub fn request_args(&self) -> RequestArgs {
        RequestArgs::new(
            self.sources.iter().map(SourceSpec::from).collect(),
            self.aggregation_type,
            self.user_data.as_bytes(),
        )
    }

    pub fn destination(&self) -> Destination {
        Destination::new(self.destination_app_id, self.destination_method.as_bytes())
    }

    /// Request parameters for `keypair` under `request_key`.
    ///
    /// The sender is the only account reference; the main contract is the only app
    /// reference. `network_params` should be fetched right before this call.
    pub fn request_params(
        &self,
        keypair: &SigningKeypair,
        request_key: &[u8],
        network_params: NetworkParams,
    ) -> Result<RequestParams, AppError> {
        let sender: Address = keypair.address();
        Ok(RequestParams {
            app_id: self.app_id,
            destination: self.destination().encode()?,
            request_args: self.request_args().encode()?,
            request_type: RequestType::from(self.request_type),
            request_key: request_key.to_vec(),
            app_refs: vec![self.app_id],
            asset_refs: self.asset_refs.clone(),
            account_refs: vec![sender],
            box_refs: Vec::<BoxReference>::new(),
            sender,
            signer: Arc::new(keypair.clone()),
            network_params,
        })
    }
}

/// Initialized application context
pub struct App<T> {
    pub service: String,
    pub keypair: SigningKeypair,
    pub settings: Settings<T>,
}

/// Builder for constructing an App with configurable options.
pub struct AppBuilder<T> {
    service: String,
    log_level: LogLevel,
    skip_logging: bool,
    skip_banner: bool,
    config_path: Option<PathBuf>,
    key_path: Option<PathBuf>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned + Default> AppBuilder<T> {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            log_level: LogLevel::Info,
            skip_logging: false,
            skip_banner: false,
            config_path: None,
            key_path: None,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.log_level = LogLevel::from_verbose(verbose);
        self
    }

    pub fn skip_logging(mut self) -> Self {
        self.skip_logging = true;
        self
    }

    pub fn skip_banner(mut self) -> Self {
        self.skip_banner = true;
        self
    }

    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Key file to use instead of the service's default keystore location.
    pub fn key_path(mut self, path: impl AsRef<Path>) -> Self {
        self.key_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> Result<App<T>, AppError> {
        if !self.skip_logging {
            // A subscriber may already be installed by an embedding process.
            let _ = oracle_logging::try_init(self.log_level);
        }

        let key_path = self
            .key_path
            .unwrap_or_else(|| oracle_keystore::default_key_path_for(&self.service));
        let keypair = oracle_keystore::load_or_generate_keypair(&key_path)?;

        let settings = Settings::load_or_default(&self.service, self.config_path.as_deref())?;

        if !self.skip_banner {
            info!(
                "{} {} starting, account {} (settings: {})",
                self.service,
                env!("CARGO_PKG_VERSION"),
                keypair.address(),
                settings.path().display(),
            );
        }

        Ok(App {
            service: self.service,
            keypair,
            settings,
        })
    }
}

//! Configuration management for `kafka_bench`.
//!
//! Settings come from several layers merged in precedence order (lowest to
//! highest):
//!
//! 1. Built-in defaults
//! 2. User config (`~/.config/kbench/config.yaml`)
//! 3. Project config (`./kbench.yaml`, or the file given with `--config`)
//! 4. Environment variables (`KBENCH_*`)
//! 5. CLI flags
//!
//! Each layer is a flat map of normalized keys (`num-records`,
//! `bootstrap-servers`, ...). The topic matrix is carried separately because
//! it is a list of maps rather than a scalar.

use crate::error::{BenchError, OptionExt, Result};
use crate::model::{Acks, TestConfig};
use crate::runner::{DEFAULT_CONSUMER_COMMAND, DEFAULT_PRODUCER_COMMAND, DEFAULT_TIMEOUT};
use crate::suite::DEFAULT_COOLDOWN;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BOOTSTRAP_SERVERS: &str = "localhost:29092,localhost:39092,localhost:49092";
pub const DEFAULT_NUM_RECORDS: u64 = 1_000_000;
pub const DEFAULT_RECORD_SIZE: u64 = 1024;
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// File name looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "kbench.yaml";
const ENV_PREFIX: &str = "KBENCH_";

const KEY_BOOTSTRAP_SERVERS: &str = "bootstrap-servers";
const KEY_KAFKA_BIN: &str = "kafka-bin";
const KEY_OUTPUT_DIR: &str = "output-dir";
const KEY_NUM_RECORDS: &str = "num-records";
const KEY_RECORD_SIZE: &str = "record-size";
const KEY_SKIP_CONSUMER: &str = "skip-consumer";
const KEY_TIMEOUT: &str = "timeout";
const KEY_COOLDOWN: &str = "cooldown";
const KEY_PRODUCER_COMMAND: &str = "producer-command";
const KEY_CONSUMER_COMMAND: &str = "consumer-command";
const KEY_TOPICS: &str = "topics";

/// One entry of the topic matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub name: String,
    pub acks: Acks,
    /// Display prefix for test names. Derived from `name` when absent.
    pub label: Option<String>,
}

impl TopicSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, acks: Acks) -> Self {
        Self {
            name: name.into(),
            acks,
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// `p3-rf3` becomes `3P-RF3`; other names are used as-is.
    #[must_use]
    pub fn display_label(&self) -> String {
        if let Some(label) = self.label.as_deref().filter(|l| !l.trim().is_empty()) {
            return label.to_string();
        }
        derive_label(&self.name).unwrap_or_else(|| self.name.clone())
    }
}

fn derive_label(name: &str) -> Option<String> {
    let (partitions, replication) = name.strip_prefix('p')?.split_once("-rf")?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    (all_digits(partitions) && all_digits(replication))
        .then(|| format!("{partitions}P-RF{replication}"))
}

impl fmt::Display for TopicSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.acks)?;
        if let Some(label) = &self.label {
            write!(f, ":{label}")?;
        }
        Ok(())
    }
}

/// Compact form used in env vars and on the command line:
/// `name[:acks[:label]]`.
impl FromStr for TopicSpec {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().splitn(3, ':');
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(BenchError::Config(format!("topic entry '{s}' has no name")));
        }
        let acks = match parts.next().map(str::trim).filter(|a| !a.is_empty()) {
            Some(value) => value.parse()?,
            None => Acks::default(),
        };
        let label = parts
            .next()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        Ok(Self {
            name: name.to_string(),
            acks,
            label,
        })
    }
}

/// YAML shape of a topic entry. `acks` may be written as a number.
#[derive(Debug, Deserialize)]
struct RawTopic {
    name: String,
    #[serde(default)]
    acks: Option<serde_yaml::Value>,
    #[serde(default)]
    label: Option<String>,
}

impl TryFrom<RawTopic> for TopicSpec {
    type Error = BenchError;

    fn try_from(raw: RawTopic) -> Result<Self> {
        let acks = match raw.acks.as_ref().and_then(yaml_scalar_to_string) {
            Some(value) => value.parse()?,
            None => Acks::default(),
        };
        let spec = Self {
            name: raw.name.trim().to_string(),
            acks,
            label: raw.label,
        };
        if spec.name.is_empty() {
            return Err(BenchError::Config("topic entry has an empty name".to_string()));
        }
        Ok(spec)
    }
}

/// The standard five-topic matrix.
#[must_use]
pub fn default_topics() -> Vec<TopicSpec> {
    vec![
        TopicSpec::new("p1-rf1", Acks::Leader),
        TopicSpec::new("p1-rf3", Acks::All),
        TopicSpec::new("p3-rf3", Acks::All),
        TopicSpec::new("p12-rf3", Acks::All),
        TopicSpec::new("p30-rf3", Acks::All),
    ]
}

/// Parse a comma-separated list of compact topic entries.
///
/// # Errors
///
/// Returns an error if any entry is malformed.
pub fn parse_topic_list(value: &str) -> Result<Vec<TopicSpec>> {
    value
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(TopicSpec::from_str)
        .collect()
}

/// One configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
    pub topics: Option<Vec<TopicSpec>>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
        if let Some(topics) = &other.topics {
            self.topics = Some(topics.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let layer = Self::from_yaml_str(&contents)?;
        debug!(path = %path.display(), keys = layer.values.len(), "Loaded config file");
        Ok(layer)
    }

    /// Build a layer from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML or `topics` is
    /// malformed.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let mut value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        let mut layer = Self::default();

        if let serde_yaml::Value::Mapping(map) = &mut value {
            if let Some(topics) = map.remove(KEY_TOPICS) {
                layer.topics = Some(topics_from_yaml(topics)?);
            }
        }

        let mut flat = HashMap::new();
        flatten_yaml(&value, "", &mut flat);
        for (key, value) in flat {
            layer.set(&key, value);
        }
        Ok(layer)
    }

    /// Build a layer from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `KBENCH_TOPICS` is malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from `KBENCH_*` pairs; other variables are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if `KBENCH_TOPICS` is malformed.
    pub fn from_env_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            let Some(stripped) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let key = normalize_key(stripped);
            let value = value.into();
            if key == KEY_TOPICS {
                layer.topics = Some(parse_topic_list(&value)?);
            } else {
                layer.values.insert(key, value);
            }
        }
        Ok(layer)
    }
}

fn topics_from_yaml(value: serde_yaml::Value) -> Result<Vec<TopicSpec>> {
    match value {
        serde_yaml::Value::String(list) => parse_topic_list(&list),
        serde_yaml::Value::Sequence(entries) => entries
            .into_iter()
            .map(|entry| match entry {
                serde_yaml::Value::String(compact) => compact.parse(),
                other => {
                    let raw: RawTopic = serde_yaml::from_value(other)?;
                    TopicSpec::try_from(raw)
                }
            })
            .collect(),
        _ => Err(BenchError::Config(
            "'topics' must be a list of {name, acks, label} entries".to_string(),
        )),
    }
}

/// CLI overrides for config loading (highest precedence).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bootstrap_servers: Option<String>,
    pub kafka_bin: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub num_records: Option<u64>,
    pub record_size: Option<u64>,
    pub skip_consumer: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub cooldown_secs: Option<u64>,
    pub topics: Option<Vec<TopicSpec>>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(servers) = &self.bootstrap_servers {
            layer.set(KEY_BOOTSTRAP_SERVERS, servers.clone());
        }
        if let Some(dir) = &self.kafka_bin {
            layer.set(KEY_KAFKA_BIN, dir.to_string_lossy());
        }
        if let Some(dir) = &self.output_dir {
            layer.set(KEY_OUTPUT_DIR, dir.to_string_lossy());
        }
        if let Some(n) = self.num_records {
            layer.set(KEY_NUM_RECORDS, n.to_string());
        }
        if let Some(n) = self.record_size {
            layer.set(KEY_RECORD_SIZE, n.to_string());
        }
        if let Some(skip) = self.skip_consumer {
            layer.set(KEY_SKIP_CONSUMER, skip.to_string());
        }
        if let Some(secs) = self.timeout_secs {
            layer.set(KEY_TIMEOUT, secs.to_string());
        }
        if let Some(secs) = self.cooldown_secs {
            layer.set(KEY_COOLDOWN, secs.to_string());
        }
        layer.topics.clone_from(&self.topics);

        layer
    }
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.set(KEY_BOOTSTRAP_SERVERS, DEFAULT_BOOTSTRAP_SERVERS);
    layer.set(KEY_OUTPUT_DIR, DEFAULT_OUTPUT_DIR);
    layer.set(KEY_NUM_RECORDS, DEFAULT_NUM_RECORDS.to_string());
    layer.set(KEY_RECORD_SIZE, DEFAULT_RECORD_SIZE.to_string());
    layer.set(KEY_SKIP_CONSUMER, "false");
    layer.set(KEY_TIMEOUT, DEFAULT_TIMEOUT.as_secs().to_string());
    layer.set(KEY_COOLDOWN, DEFAULT_COOLDOWN.as_secs().to_string());
    layer.set(KEY_PRODUCER_COMMAND, DEFAULT_PRODUCER_COMMAND);
    layer.set(KEY_CONSUMER_COMMAND, DEFAULT_CONSUMER_COMMAND);
    layer.topics = Some(default_topics());
    layer
}

/// Path of the user config file, if a home directory is known.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    let home = env::var_os("HOME")?;
    Some(
        Path::new(&home)
            .join(".config")
            .join("kbench")
            .join("config.yaml"),
    )
}

/// Load user config (~/.config/kbench/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    user_config_path().map_or_else(|| Ok(ConfigLayer::default()), |p| ConfigLayer::from_yaml(&p))
}

/// Load project config: the explicit `--config` file, or `./kbench.yaml`.
///
/// # Errors
///
/// Returns an error if an explicit file is missing, or any file cannot be
/// read or parsed.
pub fn load_project_config(explicit: Option<&Path>) -> Result<ConfigLayer> {
    match explicit {
        Some(path) if !path.is_file() => Err(BenchError::Config(format!(
            "config file '{}' not found",
            path.display()
        ))),
        Some(path) => ConfigLayer::from_yaml(path),
        None => ConfigLayer::from_yaml(Path::new(PROJECT_CONFIG_FILE)),
    }
}

/// Load configuration with the full precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>, cli: &CliOverrides) -> Result<ConfigLayer> {
    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        load_user_config()?,
        load_project_config(explicit)?,
        ConfigLayer::from_env()?,
        cli.as_layer(),
    ]))
}

/// Fully resolved, typed settings for a benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchSettings {
    pub bootstrap_servers: String,
    pub kafka_bin: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub num_records: u64,
    pub record_size: u64,
    pub skip_consumer: bool,
    pub timeout: Duration,
    pub cooldown: Duration,
    pub producer_command: String,
    pub consumer_command: String,
    pub topics: Vec<TopicSpec>,
}

impl BenchSettings {
    /// Resolve a merged layer. Keys missing from `layer` fall back to the
    /// built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Config` for values that do not parse.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let mut merged = default_config_layer();
        merged.merge_from(layer);
        let layer = &merged;

        let bootstrap_servers = required(layer, KEY_BOOTSTRAP_SERVERS)?.to_string();
        if bootstrap_servers.split(',').all(|s| s.trim().is_empty()) {
            return Err(invalid(KEY_BOOTSTRAP_SERVERS, &bootstrap_servers));
        }

        let topics = layer.topics.clone().unwrap_or_else(default_topics);
        if topics.is_empty() {
            return Err(BenchError::Config("topic list is empty".to_string()));
        }

        Ok(Self {
            bootstrap_servers,
            kafka_bin: layer
                .get(KEY_KAFKA_BIN)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            output_dir: PathBuf::from(required(layer, KEY_OUTPUT_DIR)?),
            num_records: parse_positive(layer, KEY_NUM_RECORDS)?,
            record_size: parse_positive(layer, KEY_RECORD_SIZE)?,
            skip_consumer: parse_flag(layer, KEY_SKIP_CONSUMER)?,
            timeout: Duration::from_secs(parse_positive(layer, KEY_TIMEOUT)?),
            cooldown: Duration::from_secs(parse_u64(layer, KEY_COOLDOWN)?),
            producer_command: required(layer, KEY_PRODUCER_COMMAND)?.to_string(),
            consumer_command: required(layer, KEY_CONSUMER_COMMAND)?.to_string(),
            topics,
        })
    }

    /// One producer config per topic, named `<label> Producer`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty topic name.
    pub fn producer_configs(&self) -> Result<Vec<TestConfig>> {
        self.topics
            .iter()
            .map(|topic| {
                Ok(
                    TestConfig::producer(&topic.name, self.num_records, self.record_size, topic.acks)?
                        .with_name(format!("{} Producer", topic.display_label())),
                )
            })
            .collect()
    }

    /// One consumer config per topic, named `<label> Consumer`, or `None`
    /// when consumers are skipped.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty topic name.
    pub fn consumer_configs(&self) -> Result<Option<Vec<TestConfig>>> {
        if self.skip_consumer {
            return Ok(None);
        }
        self.topics
            .iter()
            .map(|topic| {
                Ok(TestConfig::consumer(&topic.name, self.num_records)?
                    .with_name(format!("{} Consumer", topic.display_label())))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, value: &str) -> BenchError {
    BenchError::Config(format!("invalid value for '{key}': '{value}'"))
}

fn required<'a>(layer: &'a ConfigLayer, key: &str) -> Result<&'a str> {
    layer
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_config(format!("missing value for '{key}'"))
}

fn parse_u64(layer: &ConfigLayer, key: &str) -> Result<u64> {
    let value = required(layer, key)?;
    value.parse::<u64>().map_err(|_| invalid(key, value))
}

fn parse_positive(layer: &ConfigLayer, key: &str) -> Result<u64> {
    match parse_u64(layer, key)? {
        0 => Err(invalid(key, "0")),
        n => Ok(n),
    }
}

fn parse_flag(layer: &ConfigLayer, key: &str) -> Result<bool> {
    let value = required(layer, key)?;
    parse_bool(value).ok_or_else(|| invalid(key, value))
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}

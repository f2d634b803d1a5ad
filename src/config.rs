//! Codec configuration and the configuration space sampler.
//!
//! A [`Config`] is chosen once per validation (per document in the worker
//! pool, per strategy in the sort-order validator) and every conversion in
//! that validation uses it, so all representations produced are mutually
//! comparable. [`sample`] draws each dimension independently and uniformly
//! from a caller-supplied RNG; a fixed seed gives a fixed sequence of
//! configurations.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// How numeric literals are interpreted when decoding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberKind {
    /// Integer literals become i64 (falling back to f64 on overflow),
    /// everything else f64.
    IntPreferring,
    /// Every number is an f64.
    Float64,
    /// Every number is parsed as f32 and widened.
    Float32,
}

impl NumberKind {
    /// All variants in sampling order.
    pub const ALL: [NumberKind; 3] = [
        NumberKind::IntPreferring,
        NumberKind::Float64,
        NumberKind::Float32,
    ];

    /// Short name used in reports and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberKind::IntPreferring => "smart",
            NumberKind::Float64 => "float64",
            NumberKind::Float32 => "float32",
        }
    }
}

impl FromStr for NumberKind {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smart" | "int" | "int-preferring" => Ok(NumberKind::IntPreferring),
            "float" | "float64" | "f64" => Ok(NumberKind::Float64),
            "float32" | "f32" => Ok(NumberKind::Float32),
            _ => Err(HarnessError::UnknownOption {
                option: "number-kind",
                value: s.to_string(),
            }),
        }
    }
}

/// Which characters count as insignificant whitespace in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhitespaceClass {
    /// Space, tab, LF and CR only.
    Ascii,
    /// Any Unicode `White_Space` character.
    Unicode,
}

impl WhitespaceClass {
    /// All variants in sampling order.
    pub const ALL: [WhitespaceClass; 2] = [WhitespaceClass::Ascii, WhitespaceClass::Unicode];

    /// Short name used in reports and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            WhitespaceClass::Ascii => "ansi",
            WhitespaceClass::Unicode => "unicode",
        }
    }
}

impl FromStr for WhitespaceClass {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ansi" | "ascii" => Ok(WhitespaceClass::Ascii),
            "unicode" => Ok(WhitespaceClass::Unicode),
            _ => Err(HarnessError::UnknownOption {
                option: "whitespace",
                value: s.to_string(),
            }),
        }
    }
}

/// How containers are framed in the compact binary form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerEncoding {
    /// Arrays and maps carry their item count up front.
    LengthPrefixed,
    /// Arrays and maps are self-delimiting (break-terminated).
    Streaming,
}

impl ContainerEncoding {
    /// All variants in sampling order.
    pub const ALL: [ContainerEncoding; 2] =
        [ContainerEncoding::LengthPrefixed, ContainerEncoding::Streaming];

    /// Short name used in reports and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerEncoding::LengthPrefixed => "lenprefix",
            ContainerEncoding::Streaming => "stream",
        }
    }
}

impl FromStr for ContainerEncoding {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lenprefix" | "length-prefixed" => Ok(ContainerEncoding::LengthPrefixed),
            "stream" | "streaming" => Ok(ContainerEncoding::Streaming),
            _ => Err(HarnessError::UnknownOption {
                option: "container-encoding",
                value: s.to_string(),
            }),
        }
    }
}

/// Immutable record of codec-affecting options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Config {
    /// Number interpretation.
    pub number_kind: NumberKind,
    /// Whitespace accepted between text tokens.
    pub whitespace: WhitespaceClass,
    /// Container framing in the binary form.
    pub container_encoding: ContainerEncoding,
    /// Order arrays by length before contents in the collation form.
    pub array_length_prefix: bool,
    /// Order objects by property count before contents in the collation form.
    pub property_count_prefix: bool,
    /// Recognize the missing-value literal in the collation form.
    pub support_missing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_kind: NumberKind::Float64,
            whitespace: WhitespaceClass::Unicode,
            container_encoding: ContainerEncoding::Streaming,
            array_length_prefix: false,
            property_count_prefix: true,
            support_missing: true,
        }
    }
}

impl Config {
    /// Return a copy with a different number kind.
    #[must_use]
    pub fn with_number_kind(mut self, kind: NumberKind) -> Self {
        self.number_kind = kind;
        self
    }

    /// Return a copy with a different whitespace class.
    #[must_use]
    pub fn with_whitespace(mut self, class: WhitespaceClass) -> Self {
        self.whitespace = class;
        self
    }

    /// Return a copy with a different container encoding.
    #[must_use]
    pub fn with_container_encoding(mut self, encoding: ContainerEncoding) -> Self {
        self.container_encoding = encoding;
        self
    }

    /// Return a copy with array-length prefix ordering toggled.
    #[must_use]
    pub fn with_array_length_prefix(mut self, on: bool) -> Self {
        self.array_length_prefix = on;
        self
    }

    /// Return a copy with property-count prefix ordering toggled.
    #[must_use]
    pub fn with_property_count_prefix(mut self, on: bool) -> Self {
        self.property_count_prefix = on;
        self
    }

    /// Return a copy with missing-value support toggled.
    #[must_use]
    pub fn with_missing(mut self, on: bool) -> Self {
        self.support_missing = on;
        self
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nk:{}, ws:{}, ct:{}, arrlenprefix:{}, proplenprefix:{}, missing:{}",
            self.number_kind.as_str(),
            self.whitespace.as_str(),
            self.container_encoding.as_str(),
            self.array_length_prefix,
            self.property_count_prefix,
            self.support_missing
        )
    }
}

/// Draw one configuration, each dimension independently and uniformly.
pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Config {
    let number_kind = NumberKind::ALL[rng.gen_range(0..NumberKind::ALL.len())];
    let whitespace = WhitespaceClass::ALL[rng.gen_range(0..WhitespaceClass::ALL.len())];
    let container_encoding = ContainerEncoding::ALL[rng.gen_range(0..ContainerEncoding::ALL.len())];
    let array_length_prefix = rng.gen::<bool>();
    let property_count_prefix = rng.gen::<bool>();
    let support_missing = rng.gen::<bool>();

    Config {
        number_kind,
        whitespace,
        container_encoding,
        array_length_prefix,
        property_count_prefix,
        support_missing,
    }
}

/// Deterministic RNG for a run seed.
pub fn seeded_rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Dimensions pinned from the command line.
///
/// Overrides are applied after sampling so the RNG stream consumed per
/// configuration is the same whether or not anything is pinned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Pinned number kind.
    pub number_kind: Option<NumberKind>,
    /// Pinned whitespace class.
    pub whitespace: Option<WhitespaceClass>,
    /// Pinned container encoding.
    pub container_encoding: Option<ContainerEncoding>,
    /// Pinned array-length prefix flag.
    pub array_length_prefix: Option<bool>,
    /// Pinned property-count prefix flag.
    pub property_count_prefix: Option<bool>,
    /// Pinned missing-value flag.
    pub support_missing: Option<bool>,
}

impl ConfigOverrides {
    /// Apply the pinned dimensions to a sampled configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(kind) = self.number_kind {
            config.number_kind = kind;
        }
        if let Some(class) = self.whitespace {
            config.whitespace = class;
        }
        if let Some(encoding) = self.container_encoding {
            config.container_encoding = encoding;
        }
        if let Some(on) = self.array_length_prefix {
            config.array_length_prefix = on;
        }
        if let Some(on) = self.property_count_prefix {
            config.property_count_prefix = on;
        }
        if let Some(on) = self.support_missing {
            config.support_missing = on;
        }
        config
    }

    /// Returns true if nothing is pinned.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_is_deterministic_for_seed() {
        let mut a = seeded_rng(42);
        let mut b = seeded_rng(42);
        for _ in 0..32 {
            assert_eq!(sample(&mut a), sample(&mut b));
        }
    }

    #[test]
    fn test_sample_covers_every_dimension() {
        let mut rng = seeded_rng(7);
        let configs: Vec<Config> = (0..512).map(|_| sample(&mut rng)).collect();

        let kinds: HashSet<_> = configs.iter().map(|c| c.number_kind).collect();
        let spaces: HashSet<_> = configs.iter().map(|c| c.whitespace).collect();
        let encodings: HashSet<_> = configs.iter().map(|c| c.container_encoding).collect();
        assert_eq!(kinds.len(), NumberKind::ALL.len());
        assert_eq!(spaces.len(), WhitespaceClass::ALL.len());
        assert_eq!(encodings.len(), ContainerEncoding::ALL.len());
        assert!(configs.iter().any(|c| c.array_length_prefix));
        assert!(configs.iter().any(|c| !c.array_length_prefix));
        assert!(configs.iter().any(|c| c.property_count_prefix));
        assert!(configs.iter().any(|c| c.support_missing));
    }

    #[test]
    fn test_option_names_parse() {
        assert_eq!("smart".parse::<NumberKind>().unwrap(), NumberKind::IntPreferring);
        assert_eq!("float".parse::<NumberKind>().unwrap(), NumberKind::Float64);
        assert_eq!("f32".parse::<NumberKind>().unwrap(), NumberKind::Float32);
        assert_eq!("ansi".parse::<WhitespaceClass>().unwrap(), WhitespaceClass::Ascii);
        assert_eq!(
            "stream".parse::<ContainerEncoding>().unwrap(),
            ContainerEncoding::Streaming
        );
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = "decimal".parse::<NumberKind>().unwrap_err();
        assert_eq!(err.name(), "UnknownOption");
        assert!("tabs".parse::<WhitespaceClass>().is_err());
        assert!("chunked".parse::<ContainerEncoding>().is_err());
    }

    #[test]
    fn test_overrides_pin_dimensions() {
        let overrides = ConfigOverrides {
            number_kind: Some(NumberKind::Float32),
            support_missing: Some(false),
            ..ConfigOverrides::default()
        };
        assert!(!overrides.is_empty());

        let config = overrides.apply(Config::default());
        assert_eq!(config.number_kind, NumberKind::Float32);
        assert!(!config.support_missing);
        assert_eq!(config.whitespace, Config::default().whitespace);
    }

    #[test]
    fn test_display_snapshot() {
        let text = Config::default().to_string();
        assert_eq!(
            text,
            "nk:float64, ws:unicode, ct:stream, arrlenprefix:false, proplenprefix:true, missing:true"
        );
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = Config::default().with_number_kind(NumberKind::IntPreferring);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"int-preferring\""));
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

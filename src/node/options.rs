//! Network selection and the options test networks accept
//!
//! Production networks take no options. Signet may swap its challenge and
//! seeds, regtest may move activation heights and version-bits schedules.

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::consensus::{BuriedDeployment, DeploymentPos, VersionBitsParameters};

use super::chainparams::ChainParamsError;

/// Bare network name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainType {
    #[serde(rename = "main")]
    Main,
    #[serde(rename = "test")]
    TestNet,
    #[serde(rename = "signet")]
    SigNet,
    #[serde(rename = "regtest")]
    RegTest,
}

impl ChainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainType::Main => "main",
            ChainType::TestNet => "test",
            ChainType::SigNet => "signet",
            ChainType::RegTest => "regtest",
        }
    }
}

impl FromStr for ChainType {
    type Err = ChainParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(ChainType::Main),
            "test" => Ok(ChainType::TestNet),
            "signet" => Ok(ChainType::SigNet),
            "regtest" => Ok(ChainType::RegTest),
            other => Err(ChainParamsError::UnknownChain(other.to_string())),
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signet construction options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigNetOptions {
    /// Custom block challenge script; `None` selects the default signet
    pub challenge: Option<Vec<u8>>,
    /// Replacement DNS seeds
    pub seeds: Option<Vec<String>>,
}

/// Regtest construction options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegTestOptions {
    pub activation_heights: BTreeMap<BuriedDeployment, i32>,
    pub version_bits_parameters: BTreeMap<DeploymentPos, VersionBitsParameters>,
    /// Prune aggressively (for pruning tests)
    pub fastprune: bool,
}

impl RegTestOptions {
    /// Build options from raw `-testactivationheight` and `-vbparams` values
    pub fn from_args(
        activation_heights: &[String],
        vbparams: &[String],
        fastprune: bool,
    ) -> Result<Self, ChainParamsError> {
        let mut options = RegTestOptions {
            fastprune,
            ..Default::default()
        };
        for arg in activation_heights {
            let (deployment, height) = parse_activation_height(arg)?;
            options.activation_heights.insert(deployment, height);
        }
        for arg in vbparams {
            let (deployment, params) = parse_vbparams(arg)?;
            options.version_bits_parameters.insert(deployment, params);
        }
        Ok(options)
    }
}

/// A network together with its construction options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Network {
    Main,
    TestNet,
    SigNet(SigNetOptions),
    RegTest(RegTestOptions),
}

impl Network {
    pub fn chain_type(&self) -> ChainType {
        match self {
            Network::Main => ChainType::Main,
            Network::TestNet => ChainType::TestNet,
            Network::SigNet(_) => ChainType::SigNet,
            Network::RegTest(_) => ChainType::RegTest,
        }
    }
}

impl From<ChainType> for Network {
    /// The network with default options
    fn from(chain: ChainType) -> Self {
        match chain {
            ChainType::Main => Network::Main,
            ChainType::TestNet => Network::TestNet,
            ChainType::SigNet => Network::SigNet(SigNetOptions::default()),
            ChainType::RegTest => Network::RegTest(RegTestOptions::default()),
        }
    }
}

/// Parse `name@height`
pub fn parse_activation_height(arg: &str) -> Result<(BuriedDeployment, i32), ChainParamsError> {
    let Some((name, value)) = arg.split_once('@') else {
        return Err(ChainParamsError::InvalidOption(format!(
            "Invalid format ({}) for -testactivationheight=name@height.",
            arg
        )));
    };

    let height = value
        .parse::<i32>()
        .ok()
        .filter(|height| (0..i32::MAX).contains(height))
        .ok_or_else(|| {
            ChainParamsError::InvalidOption(format!(
                "Invalid height value ({}) for -testactivationheight=name@height.",
                arg
            ))
        })?;

    let deployment = name.parse::<BuriedDeployment>().map_err(|_| {
        ChainParamsError::InvalidOption(format!(
            "Invalid name ({}) for -testactivationheight=name@height.",
            arg
        ))
    })?;

    Ok((deployment, height))
}

/// Parse `deployment:start:end[:min_activation_height]`
pub fn parse_vbparams(arg: &str) -> Result<(DeploymentPos, VersionBitsParameters), ChainParamsError> {
    let parts: Vec<&str> = arg.split(':').collect();
    if !(3..=4).contains(&parts.len()) {
        return Err(ChainParamsError::InvalidOption(
            "Version bits parameters malformed, expecting deployment:start:end[:min_activation_height]"
                .to_string(),
        ));
    }

    let start_time = parts[1]
        .parse::<i64>()
        .map_err(|_| ChainParamsError::InvalidOption(format!("Invalid nStartTime ({})", parts[1])))?;
    let timeout = parts[2]
        .parse::<i64>()
        .map_err(|_| ChainParamsError::InvalidOption(format!("Invalid nTimeout ({})", parts[2])))?;
    let min_activation_height = match parts.get(3) {
        Some(value) => value.parse::<i32>().map_err(|_| {
            ChainParamsError::InvalidOption(format!("Invalid min_activation_height ({})", value))
        })?,
        None => 0,
    };

    let deployment = parts[0]
        .parse::<DeploymentPos>()
        .map_err(ChainParamsError::InvalidOption)?;

    info!(
        "Setting version bits activation parameters for {} to start={}, timeout={}, min_activation_height={}",
        deployment, start_time, timeout, min_activation_height
    );

    Ok((
        deployment,
        VersionBitsParameters {
            start_time,
            timeout,
            min_activation_height,
        },
    ))
}

/// Parse a hex-encoded signet challenge
pub fn parse_signet_challenge(value: &str) -> Result<Vec<u8>, ChainParamsError> {
    hex::decode(value).map_err(|_| {
        ChainParamsError::InvalidOption(format!("-signetchallenge must be hex, not '{}'.", value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid(message: &str) -> ChainParamsError {
        ChainParamsError::InvalidOption(message.to_string())
    }

    #[test]
    fn test_chain_type_names() {
        for chain in [ChainType::Main, ChainType::TestNet, ChainType::SigNet, ChainType::RegTest] {
            assert_eq!(chain.to_string().parse::<ChainType>(), Ok(chain));
        }
        assert_eq!(
            "testnet".parse::<ChainType>(),
            Err(ChainParamsError::UnknownChain("testnet".to_string()))
        );
    }

    #[test]
    fn test_activation_height_parsing() {
        assert_eq!(parse_activation_height("segwit@0"), Ok((BuriedDeployment::Segwit, 0)));
        assert_eq!(parse_activation_height("bip34@500"), Ok((BuriedDeployment::HeightInCb, 500)));
        assert_eq!(
            parse_activation_height("segwit"),
            Err(invalid("Invalid format (segwit) for -testactivationheight=name@height."))
        );
        assert_eq!(
            parse_activation_height("segwit@-1"),
            Err(invalid("Invalid height value (segwit@-1) for -testactivationheight=name@height."))
        );
        assert_eq!(
            parse_activation_height("segwit@2147483647"),
            Err(invalid(
                "Invalid height value (segwit@2147483647) for -testactivationheight=name@height."
            ))
        );
        assert_eq!(
            parse_activation_height("taproot@10"),
            Err(invalid("Invalid name (taproot@10) for -testactivationheight=name@height."))
        );
    }

    #[test]
    fn test_vbparams_parsing() {
        assert_eq!(
            parse_vbparams("testdummy:0:100"),
            Ok((
                DeploymentPos::TestDummy,
                VersionBitsParameters {
                    start_time: 0,
                    timeout: 100,
                    min_activation_height: 0
                }
            ))
        );
        assert_eq!(
            parse_vbparams("taproot:-1:9223372036854775807:288").map(|(_, p)| p.min_activation_height),
            Ok(288)
        );
        assert!(parse_vbparams("taproot:1").is_err());
        assert!(parse_vbparams("taproot:1:2:3:4").is_err());
        assert_eq!(parse_vbparams("taproot:x:2"), Err(invalid("Invalid nStartTime (x)")));
        assert_eq!(parse_vbparams("segwit:1:2"), Err(invalid("Invalid deployment (segwit)")));
    }

    #[test]
    fn test_regtest_options_from_args() {
        let options = RegTestOptions::from_args(
            &["cltv@10".to_string(), "cltv@20".to_string()],
            &["testdummy:5:6".to_string()],
            true,
        )
        .unwrap();
        assert_eq!(options.activation_heights.get(&BuriedDeployment::Cltv), Some(&20));
        assert_eq!(
            options.version_bits_parameters[&DeploymentPos::TestDummy].start_time,
            5
        );
        assert!(options.fastprune);
    }

    #[test]
    fn test_signet_challenge_parsing() {
        assert_eq!(parse_signet_challenge("51"), Ok(vec![0x51]));
        assert_eq!(
            parse_signet_challenge("zz"),
            Err(invalid("-signetchallenge must be hex, not 'zz'."))
        );
    }

    #[test]
    fn test_network_defaults() {
        assert_eq!(Network::from(ChainType::SigNet), Network::SigNet(SigNetOptions::default()));
        assert_eq!(Network::from(ChainType::RegTest).chain_type(), ChainType::RegTest);
    }
}

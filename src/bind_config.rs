use crate::error::BindError;
use crate::units::validate_address;
use alloy_primitives::{Address, Bytes};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// JSON file describing the contract to deploy and who ends up owning it.
///
/// Older files only carry `contract_data`, so every other field is optional
/// here and checked by the command that needs it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BindConfig {
    pub contract_data: String,
    #[serde(default)]
    pub bep20_symbol: Option<String>,
    #[serde(default)]
    pub bep2_symbol: Option<String>,
    #[serde(default)]
    pub final_bep20_owner: Option<String>,
}

impl BindConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to open config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: BindConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.bytecode()?;
        if let Some(owner) = self.final_bep20_owner.as_deref() {
            validate_address("BEP20 owner account", owner)?;
        }
        Ok(())
    }

    pub fn bytecode(&self) -> Result<Bytes> {
        let trimmed = self.contract_data.trim();
        if trimmed.is_empty() {
            return Err(BindError::MissingValue("contract byte code").into());
        }
        let value = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(value).map_err(|err| anyhow!("invalid contract byte code: {err}"))?;
        Ok(Bytes::from(bytes))
    }

    pub fn bep2_symbol(&self) -> Result<&str> {
        self.bep2_symbol
            .as_deref()
            .filter(|symbol| !symbol.is_empty())
            .ok_or_else(|| BindError::MissingValue("bep2 token symbol").into())
    }

    pub fn final_owner(&self) -> Result<Option<Address>> {
        self.final_bep20_owner
            .as_deref()
            .map(|owner| validate_address("BEP20 owner account", owner))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = BindConfig::parse(
            r#"{
                "contract_data": "0x6080604052",
                "bep20_symbol": "ABC",
                "bep2_symbol": "ABC-1A2",
                "final_bep20_owner": "0x4E656459ed25bF986Eea1196Bc1B00665401645d"
            }"#,
        )
        .unwrap();
        assert_eq!(config.bytecode().unwrap().as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert_eq!(config.bep2_symbol().unwrap(), "ABC-1A2");
        assert!(config.final_owner().unwrap().is_some());
    }

    #[test]
    fn test_contract_data_only() {
        let config = BindConfig::parse(r#"{"contract_data": "6080"}"#).unwrap();
        assert!(config.final_owner().unwrap().is_none());
        assert!(config.bep2_symbol().is_err());
    }

    #[test]
    fn test_rejects_bad_hex() {
        let err = BindConfig::parse(r#"{"contract_data": "0xzz"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid contract byte code"));
    }

    #[test]
    fn test_rejects_bad_owner() {
        let err = BindConfig::parse(
            r#"{"contract_data": "6080", "final_bep20_owner": "0x1234"}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BindError>(),
            Some(BindError::InvalidAddress { .. })
        ));
    }
}

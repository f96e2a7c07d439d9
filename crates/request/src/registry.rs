//! Domain schemas and method resolution against a contract interface.

use oracle_codec::{Schema, UintWidth};
use thiserror::Error;

use crate::contract::{CallSignature, ContractInterface};

/// Interface of the oracle main contract, bundled with the crate.
pub const MAIN_CONTRACT_JSON: &str = include_str!("../contract/main-contract.json");

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unknown method: {0}")]
    UnknownMethod(String),
    #[error("Invalid contract interface: {0}")]
    InvalidInterface(#[from] serde_json::Error),
}

/// Owns the request schemas and the interface of the contract being called.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    contract: ContractInterface,
}

impl SchemaRegistry {
    pub fn new(contract: ContractInterface) -> Self {
        Self { contract }
    }

    /// Registry over the bundled main contract interface.
    pub fn main_contract() -> Result<Self, RegistryError> {
        Self::from_json(MAIN_CONTRACT_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Ok(Self::new(ContractInterface::from_json(json)?))
    }

    pub fn contract(&self) -> &ContractInterface {
        &self.contract
    }

    /// Resolve a method by exact name. Never falls back to a default.
    pub fn resolve_method(&self, name: &str) -> Result<&CallSignature, RegistryError> {
        self.contract
            .method(name)
            .ok_or_else(|| RegistryError::UnknownMethod(name.to_string()))
    }

    /// `(uint32 source_id, byte[][] args, uint64 max_age_seconds)`
    pub fn source_spec() -> Schema {
        Schema::tuple([
            Schema::Uint(UintWidth::U32),
            Schema::array(Schema::Bytes),
            Schema::Uint(UintWidth::U64),
        ])
    }

    /// `(SourceSpec[] sources, uint32 aggregation_type, byte[] user_data)`
    pub fn request_args() -> Schema {
        Schema::tuple([
            Schema::array(Self::source_spec()),
            Schema::Uint(UintWidth::U32),
            Schema::Bytes,
        ])
    }

    /// `(uint64 app_id, byte[] method_selector)`
    pub fn destination() -> Schema {
        Schema::tuple([Schema::Uint(UintWidth::U64), Schema::Bytes])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_type_strings() {
        assert_eq!(
            SchemaRegistry::source_spec().to_string(),
            "(uint32,byte[][],uint64)"
        );
        assert_eq!(
            SchemaRegistry::request_args().to_string(),
            "((uint32,byte[][],uint64)[],uint32,byte[])"
        );
        assert_eq!(SchemaRegistry::destination().to_string(), "(uint64,byte[])");
    }

    #[test]
    fn test_main_contract_request_method() {
        let registry = SchemaRegistry::main_contract().unwrap();
        let method = registry.resolve_method("request").unwrap();
        assert_eq!(
            method.signature(),
            "request(byte[],byte[],uint64,byte[],uint64[],uint64[],byte[][],(uint64,byte[])[])void"
        );
        assert_eq!(method.selector(), [0xe0, 0x2d, 0x50, 0x7c]);
    }

    #[test]
    fn test_unknown_method() {
        let registry = SchemaRegistry::main_contract().unwrap();
        let err = registry.resolve_method("nonexistent_method").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownMethod(ref name) if name == "nonexistent_method"));
    }

    #[test]
    fn test_case_sensitive() {
        let registry = SchemaRegistry::main_contract().unwrap();
        assert!(registry.resolve_method("Request").is_err());
    }

    #[test]
    fn test_invalid_interface() {
        assert!(matches!(
            SchemaRegistry::from_json("{\"name\": 1}"),
            Err(RegistryError::InvalidInterface(_))
        ));
    }
}

//! Contract interface descriptions.
//!
//! Interfaces are loaded from the JSON description a contract publishes:
//! `{"name", "methods": [{"name", "args": [{"type", "name"}], "returns": {"type"}}]}`.
//! Unknown fields (network deployments, docs) are ignored.

use std::fmt;
use std::str::FromStr;

use oracle_codec::{CodecError, Schema};
use oracle_crypto::hash;
use serde::{Deserialize, Serialize};

/// Length of a method selector.
pub const SELECTOR_LEN: usize = 4;

/// Return type of a contract method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReturnType {
    #[default]
    Void,
    Value(Schema),
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Value(schema) => write!(f, "{schema}"),
        }
    }
}

impl FromStr for ReturnType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "void" => Ok(Self::Void),
            other => other.parse().map(Self::Value),
        }
    }
}

impl TryFrom<String> for ReturnType {
    type Error = CodecError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ReturnType> for String {
    fn from(returns: ReturnType) -> Self {
        returns.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodArg {
    #[serde(rename = "type")]
    pub ty: Schema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodReturns {
    #[serde(rename = "type")]
    pub ty: ReturnType,
}

/// A contract method: name, typed arguments and return type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSignature {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default)]
    pub args: Vec<MethodArg>,
    #[serde(default)]
    pub returns: MethodReturns,
}

impl CallSignature {
    /// Canonical signature string, e.g. `request(byte[],uint64)void`.
    pub fn signature(&self) -> String {
        let args = self
            .args
            .iter()
            .map(|arg| arg.ty.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({}){}", self.name, args, self.returns.ty)
    }

    /// First 4 bytes of the SHA-512/256 digest of the signature string.
    pub fn selector(&self) -> [u8; SELECTOR_LEN] {
        let digest = hash(self.signature().as_bytes());
        let mut selector = [0u8; SELECTOR_LEN];
        selector.copy_from_slice(&digest[..SELECTOR_LEN]);
        selector
    }

    /// Declared argument schemas, in order.
    pub fn arg_schemas(&self) -> impl Iterator<Item = &Schema> {
        self.args.iter().map(|arg| &arg.ty)
    }
}

/// An ordered list of contract methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInterface {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub methods: Vec<CallSignature>,
}

impl ContractInterface {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Exact, case-sensitive lookup; the first matching entry wins.
    pub fn method(&self, name: &str) -> Option<&CallSignature> {
        self.methods.iter().find(|method| method.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_codec::UintWidth;

    const INTERFACE: &str = r#"{
        "name": "demo",
        "networks": { "default": { "appID": 1 } },
        "methods": [
            {
                "name": "add",
                "args": [
                    { "type": "uint64", "name": "a" },
                    { "type": "uint64", "name": "b" }
                ],
                "returns": { "type": "uint128" }
            }
        ]
    }"#;

    #[test]
    fn test_unsupported_return_type_rejected() {
        assert!(ContractInterface::from_json(INTERFACE).is_err());
    }

    #[test]
    fn test_signature_and_selector() {
        let interface =
            ContractInterface::from_json(&INTERFACE.replace("uint128", "uint64")).unwrap();
        let method = interface.method("add").unwrap();
        assert_eq!(method.signature(), "add(uint64,uint64)uint64");
        // Published selector for `add(uint64,uint64)uint64`.
        assert_eq!(method.selector(), [0xfe, 0x6b, 0xdf, 0x69]);
        assert_eq!(
            method.arg_schemas().cloned().collect::<Vec<_>>(),
            vec![Schema::Uint(UintWidth::U64); 2]
        );
    }

    #[test]
    fn test_returns_default_to_void() {
        let interface = ContractInterface::from_json(
            r#"{ "name": "x", "methods": [ { "name": "ping", "args": [] } ] }"#,
        )
        .unwrap();
        let method = interface.method("ping").unwrap();
        assert_eq!(method.returns.ty, ReturnType::Void);
        assert_eq!(method.signature(), "ping()void");
    }

    #[test]
    fn test_lookup_is_exact() {
        let interface =
            ContractInterface::from_json(&INTERFACE.replace("uint128", "void")).unwrap();
        assert!(interface.method("add").is_some());
        assert!(interface.method("Add").is_none());
        assert!(interface.method("ad").is_none());
    }
}

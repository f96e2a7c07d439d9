//! Oracle Request
//!
//! Client-side schemas, box name derivation and request composition for the
//! oracle main contract.
//!
//! This crate never talks to the network: it produces an [`OperationGroup`] that a
//! [`LedgerClient`] submits.

pub mod boxes;
pub mod client;
pub mod composer;
pub mod contract;
pub mod params;
pub mod registry;
pub mod types;

pub use boxes::{derive_box_name, derive_box_name_for, BoxReference};
pub use client::{ClientError, DryRunClient, ExecuteResult, LedgerClient};
pub use composer::{
    ComposeError, MethodCall, OperationGroup, RequestComposer, RequestParams, RequestType,
    TransactionSigner, MAX_GROUP_SIZE, REQUEST_METHOD,
};
pub use contract::{CallSignature, ContractInterface, MethodArg, ReturnType};
pub use params::{NetworkParams, TransactionParams, DEFAULT_VALIDITY_WINDOW};
pub use registry::{RegistryError, SchemaRegistry};
pub use types::{Destination, RequestArgs, SourceSpec};

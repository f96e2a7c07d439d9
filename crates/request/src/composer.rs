//! Request composition for the oracle main contract.
//!
//! [`RequestComposer::build_request`] produces an [`OperationGroup`] holding a single
//! `request` method call. Arguments are encoded against the argument types the
//! contract interface declares, so a payload that does not fit its schema is
//! rejected here rather than by the contract.

use std::fmt;
use std::sync::Arc;

use oracle_codec::{encode, CodecError, Schema, UintWidth, Value};
use oracle_crypto::{sign_data, Address, SigningKeypair};
use thiserror::Error;
use tracing::debug;

use crate::boxes::BoxReference;
use crate::contract::CallSignature;
use crate::params::NetworkParams;
use crate::registry::{RegistryError, SchemaRegistry};

/// Name of the method every oracle request calls.
pub const REQUEST_METHOD: &str = "request";

/// Maximum number of operations the ledger executes atomically.
pub const MAX_GROUP_SIZE: usize = 16;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Unresolved method {method}: {source}")]
    UnresolvedMethod {
        method: String,
        #[source]
        source: RegistryError,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Operation group is full ({0} operations)")]
    GroupFull(usize),
    #[error("Signer {signer} cannot sign for sender {sender}")]
    SignerMismatch { sender: Address, signer: Address },
}

/// Produces signatures for a sender.
pub trait TransactionSigner: Send + Sync {
    fn address(&self) -> Address;

    fn sign(&self, payload: &[u8]) -> [u8; 64];
}

impl TransactionSigner for SigningKeypair {
    fn address(&self) -> Address {
        SigningKeypair::address(self)
    }

    fn sign(&self, payload: &[u8]) -> [u8; 64] {
        sign_data(self, payload)
    }
}

/// Kind of request, passed to the contract as a `uint64`.
///
/// Equality follows [`RequestType::code`], so `Custom(1)` equals `Classic`.
#[derive(Debug, Clone, Copy)]
pub enum RequestType {
    /// Source-list request answered by the oracle network.
    Classic,
    Custom(u64),
}

impl PartialEq for RequestType {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
    }
}

impl Eq for RequestType {}

impl std::hash::Hash for RequestType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.code().hash(state);
    }
}

impl RequestType {
    pub fn code(&self) -> u64 {
        match self {
            Self::Classic => 1,
            Self::Custom(code) => *code,
        }
    }
}

impl From<u64> for RequestType {
    fn from(code: u64) -> Self {
        match code {
            1 => Self::Classic,
            other => Self::Custom(other),
        }
    }
}

/// Everything needed to compose one request call.
pub struct RequestParams {
    pub app_id: u64,
    /// Encoded [`Destination`](crate::Destination).
    pub destination: Vec<u8>,
    /// Encoded [`RequestArgs`](crate::RequestArgs).
    pub request_args: Vec<u8>,
    pub request_type: RequestType,
    /// Must be unique per outstanding request from `sender`.
    pub request_key: Vec<u8>,
    pub app_refs: Vec<u64>,
    pub asset_refs: Vec<u64>,
    pub account_refs: Vec<Address>,
    pub box_refs: Vec<BoxReference>,
    pub sender: Address,
    pub signer: Arc<dyn TransactionSigner>,
    pub network_params: NetworkParams,
}

/// One application call inside an [`OperationGroup`].
#[derive(Clone)]
pub struct MethodCall {
    pub app_id: u64,
    pub method: CallSignature,
    /// Arguments encoded in declared order.
    pub args: Vec<Vec<u8>>,
    /// Boxes the call may touch.
    pub boxes: Vec<BoxReference>,
    pub app_refs: Vec<u64>,
    pub asset_refs: Vec<u64>,
    pub account_refs: Vec<Address>,
    pub sender: Address,
    pub signer: Arc<dyn TransactionSigner>,
    pub network_params: NetworkParams,
}

impl MethodCall {
    /// Application arguments as sent: the selector followed by each encoded argument.
    pub fn app_args(&self) -> Vec<Vec<u8>> {
        let mut app_args = Vec::with_capacity(self.args.len() + 1);
        app_args.push(self.method.selector().to_vec());
        app_args.extend(self.args.iter().cloned());
        app_args
    }

    /// Bytes the signer commits to: app id, sender, fee, app args and validity window.
    pub fn signing_payload(&self) -> Result<Vec<u8>, CodecError> {
        let schema = Schema::tuple([
            Schema::Uint(UintWidth::U64),
            Schema::Bytes,
            Schema::Uint(UintWidth::U64),
            Schema::array(Schema::Bytes),
            Schema::Uint(UintWidth::U64),
            Schema::Uint(UintWidth::U64),
        ]);
        let value = Value::Tuple(vec![
            self.app_id.into(),
            self.sender.public_key().as_slice().into(),
            self.network_params.required_fee().into(),
            Value::Array(self.app_args().into_iter().map(Value::Bytes).collect()),
            self.network_params.first_valid.into(),
            self.network_params.last_valid.into(),
        ]);
        encode(&schema, &value)
    }

    pub fn sign(&self) -> Result<[u8; 64], CodecError> {
        Ok(self.signer.sign(&self.signing_payload()?))
    }
}

impl fmt::Debug for MethodCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodCall")
            .field("app_id", &self.app_id)
            .field("method", &self.method.signature())
            .field("args", &self.args.len())
            .field("boxes", &self.boxes)
            .field("app_refs", &self.app_refs)
            .field("asset_refs", &self.asset_refs)
            .field("account_refs", &self.account_refs)
            .field("sender", &self.sender)
            .field("signer", &self.signer.address())
            .field("network_params", &self.network_params)
            .finish()
    }
}

/// Operations executed all-or-nothing.
#[derive(Debug, Clone, Default)]
pub struct OperationGroup {
    calls: Vec<MethodCall>,
}

impl OperationGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_method_call(&mut self, call: MethodCall) -> Result<(), ComposeError> {
        if self.calls.len() >= MAX_GROUP_SIZE {
            return Err(ComposeError::GroupFull(self.calls.len()));
        }
        self.calls.push(call);
        Ok(())
    }

    pub fn calls(&self) -> &[MethodCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Builds request groups against a contract interface.
///
/// Holds no mutable state; one composer can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct RequestComposer {
    registry: SchemaRegistry,
}

impl RequestComposer {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Compose a group with a single `request` call.
    ///
    /// The box keyed by `(sender, request_key)` is always the first box reference;
    /// caller-supplied `box_refs` follow it. The signer must sign as `sender`.
    pub fn build_request(&self, params: RequestParams) -> Result<OperationGroup, ComposeError> {
        let signer = params.signer.address();
        if signer != params.sender {
            return Err(ComposeError::SignerMismatch {
                sender: params.sender,
                signer,
            });
        }

        let method = self
            .registry
            .resolve_method(REQUEST_METHOD)
            .map_err(|source| ComposeError::UnresolvedMethod {
                method: REQUEST_METHOD.to_string(),
                source,
            })?
            .clone();

        let values = vec![
            Value::Bytes(params.request_args),
            Value::Bytes(params.destination),
            params.request_type.code().into(),
            params.request_key.as_slice().into(),
            Value::Array(params.app_refs.iter().map(|id| Value::Uint(*id)).collect()),
            Value::Array(params.asset_refs.iter().map(|id| Value::Uint(*id)).collect()),
            Value::Array(
                params
                    .account_refs
                    .iter()
                    .map(|account| account.public_key().as_slice().into())
                    .collect(),
            ),
            Value::Array(params.box_refs.iter().map(BoxReference::to_value).collect()),
        ];
        if method.args.len() != values.len() {
            return Err(CodecError::SchemaMismatch {
                expected: method.signature(),
                found: format!("{} arguments", values.len()),
            }
            .into());
        }
        let args = method
            .arg_schemas()
            .zip(&values)
            .map(|(schema, value)| encode(schema, value))
            .collect::<Result<Vec<_>, _>>()?;

        let request_box = BoxReference::keyed(params.app_id, &params.sender, &params.request_key);
        let mut boxes = vec![request_box.clone()];
        boxes.extend(
            params
                .box_refs
                .into_iter()
                .filter(|reference| *reference != request_box),
        );

        debug!(
            app_id = params.app_id,
            method = %method.signature(),
            sender = %params.sender,
            request_box = %hex::encode(&request_box.name),
            boxes = boxes.len(),
            "composed request call"
        );

        let mut group = OperationGroup::new();
        group.add_method_call(MethodCall {
            app_id: params.app_id,
            method,
            args,
            boxes,
            app_refs: params.app_refs,
            asset_refs: params.asset_refs,
            account_refs: params.account_refs,
            sender: params.sender,
            signer: params.signer,
            network_params: params.network_params,
        })?;
        Ok(group)
    }
}

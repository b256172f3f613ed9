use crate::args::{decode_args, ArgsError, Method, PostArgs};
use devhub_data::near::{Action, ActionOperation, Block, FunctionCall};
use devhub_data::JsonValue;
use devhub_primitives::AccountId;
use std::fmt::{Display, Formatter};


/// Contract account and the calls of it worth indexing
#[derive(Debug, Clone)]
pub struct Contract {
    pub account_id: AccountId,
    pub methods: Vec<Method>
}


impl Contract {
    pub fn new(account_id: impl Into<AccountId>, methods: Vec<Method>) -> Self {
        Self {
            account_id: account_id.into(),
            methods
        }
    }
}


impl Default for Contract {
    fn default() -> Self {
        Self::new("devgovgigs.near", vec![Method::AddPost, Method::EditPost])
    }
}


/// Contract call selected for indexing
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub receipt_id: String,
    pub signer_id: AccountId,
    pub args: PostArgs,
    pub raw_args: JsonValue
}


impl Operation {
    pub fn method(&self) -> Method {
        self.args.method()
    }
}


#[derive(Debug)]
pub struct DecodeError {
    pub receipt_id: String,
    pub method: Method,
    pub error: ArgsError
}


impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to decode {} args of receipt {}: {}",
            self.method,
            self.receipt_id,
            self.error
        )
    }
}


impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}


/// Selects allow-listed calls to the contract, in block action order.
///
/// Calls with undecodable arguments are reported as errors in place.
pub fn extract_operations<'a>(
    block: &'a Block,
    contract: &'a Contract
) -> impl Iterator<Item = Result<Operation, DecodeError>> + 'a
{
    block.actions.iter()
        .filter(move |action| action.receiver_id == contract.account_id)
        .flat_map(|action| {
            action.operations.iter().filter_map(move |op| match op {
                ActionOperation::FunctionCall(call) => Some((action, call)),
                ActionOperation::Other(_) => None
            })
        })
        .filter_map(move |(action, call)| {
            let method = Method::from_name(&call.method_name)?;
            if contract.methods.contains(&method) {
                Some(decode_operation(action, call, method))
            } else {
                None
            }
        })
}


fn decode_operation(action: &Action, call: &FunctionCall, method: Method) -> Result<Operation, DecodeError> {
    let (args, raw_args) = decode_args(method, &call.args).map_err(|error| DecodeError {
        receipt_id: action.receipt_id.clone(),
        method,
        error
    })?;

    Ok(Operation {
        receipt_id: action.receipt_id.clone(),
        signer_id: action.signer_id.clone(),
        args,
        raw_args
    })
}

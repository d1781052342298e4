//! Introspection methods.

use serde_json::Value;

use crate::dispatch::{BoundArgs, HandlerError};

use super::{ApiContext, METHODS};

pub(super) fn echo(_: &ApiContext, args: &BoundArgs) -> Result<Value, HandlerError> {
    Ok(args.get("message").clone())
}

pub(super) fn list_methods(_: &ApiContext, _: &BoundArgs) -> Result<Value, HandlerError> {
    Ok(Value::Array(
        METHODS
            .iter()
            .map(|method| Value::from(vec![method.name, method.description]))
            .collect(),
    ))
}

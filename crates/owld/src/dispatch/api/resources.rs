//! Pool and scheduler inspection.

use serde_json::Value;
use tracing::debug;

use crate::dispatch::{BoundArgs, DISPATCH_TARGET, HandlerError};

use super::ApiContext;
use super::args::required_text;

pub(super) fn get_list(context: &ApiContext, _: &BoundArgs) -> Result<Value, HandlerError> {
    let machines = context.scheduler().pool()?;
    Ok(Value::Array(
        machines
            .iter()
            .filter_map(|ad| ad.name().map(Value::from))
            .collect(),
    ))
}

pub(super) fn get_info(context: &ApiContext, args: &BoundArgs) -> Result<Value, HandlerError> {
    let name = required_text(args.get("name"), "name")?;
    match context.scheduler().machine(name)? {
        Some(ad) => Ok(ad.into_value()),
        None => {
            debug!(target: DISPATCH_TARGET, machine = name, "machine not found");
            Ok(Value::Null)
        }
    }
}

pub(super) fn schedd_stats(context: &ApiContext, _: &BoundArgs) -> Result<Value, HandlerError> {
    Ok(context.scheduler().schedd_stats()?.into_value())
}

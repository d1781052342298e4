//! Blackboard queries and Condor job control.
//!
//! Control methods answer with an integer code instead of failing: 255 when
//! no target is given, 254 for an unparsable job id, 253 for a bad priority,
//! and otherwise the exit code of the Condor tool.

use serde_json::Value;
use tracing::info;

use crate::blackboard::{JobQuery, get_entry, list_entries, workflow_entries};
use crate::dispatch::{BoundArgs, DISPATCH_TARGET, HandlerError};
use crate::scheduler::{INVALID_PRIORITY, JobAction, JobId, JobTarget};

use super::ApiContext;
use super::args::{identifier, limit, offset, optional_text, priority, truthy};

pub(super) fn get_list(context: &ApiContext, args: &BoundArgs) -> Result<Value, HandlerError> {
    let query = JobQuery {
        owner: optional_text(args.get("owner"), "owner")?,
        dataset: optional_text(args.get("dataset"), "dataset")?,
        offset: offset(args.get("offset")),
        limit: limit(args.get("limit")),
        newest_first: truthy(args.get("newest_first")),
    };
    let records = list_entries(context.store(), &query, context.max_rows())?;
    Ok(serde_json::to_value(records)?)
}

pub(super) fn get_for_workflow(
    context: &ApiContext,
    args: &BoundArgs,
) -> Result<Value, HandlerError> {
    let Some(workflow_id) = identifier(args.get("workflow_id")) else {
        return Ok(Value::Null);
    };
    match workflow_entries(context.store(), &workflow_id)? {
        Some(workflow) => Ok(workflow.to_value()?),
        None => Ok(Value::Null),
    }
}

pub(super) fn get_info(context: &ApiContext, args: &BoundArgs) -> Result<Value, HandlerError> {
    let Some(job_id) = identifier(args.get("job_id")) else {
        return Ok(Value::Null);
    };
    match get_entry(context.store(), &job_id)? {
        Some(record) => Ok(serde_json::to_value(record)?),
        None => Ok(Value::Null),
    }
}

pub(super) fn suspend(context: &ApiContext, args: &BoundArgs) -> Result<Value, HandlerError> {
    control(context, args, JobAction::Hold)
}

pub(super) fn resume(context: &ApiContext, args: &BoundArgs) -> Result<Value, HandlerError> {
    control(context, args, JobAction::Release)
}

pub(super) fn kill(context: &ApiContext, args: &BoundArgs) -> Result<Value, HandlerError> {
    control(context, args, JobAction::Remove)
}

fn control(
    context: &ApiContext,
    args: &BoundArgs,
    action: JobAction,
) -> Result<Value, HandlerError> {
    let target = match target(args)? {
        Ok(target) => target,
        Err(code) => return Ok(Value::from(code)),
    };
    info!(
        target: DISPATCH_TARGET,
        program = action.program(),
        job_target = ?target,
        "controlling jobs"
    );
    Ok(Value::from(context.scheduler().control(action, &target)?))
}

pub(super) fn set_priority(context: &ApiContext, args: &BoundArgs) -> Result<Value, HandlerError> {
    let Some(priority) = priority(args.get("priority")) else {
        return Ok(Value::from(INVALID_PRIORITY));
    };
    let target = match target(args)? {
        Ok(target) => target,
        Err(code) => return Ok(Value::from(code)),
    };
    info!(
        target: DISPATCH_TARGET,
        priority,
        job_target = ?target,
        "setting job priority"
    );
    Ok(Value::from(
        context.scheduler().set_priority(priority, &target)?,
    ))
}

pub(super) fn get_priority(context: &ApiContext, args: &BoundArgs) -> Result<Value, HandlerError> {
    let Some(job) = identifier(args.get("job_id")).and_then(|text| text.parse::<JobId>().ok())
    else {
        return Ok(Value::Null);
    };
    Ok(context
        .scheduler()
        .priority(&job)?
        .map_or(Value::Null, Value::from))
}

/// The addressed jobs, or the code to reply with when there are none.
fn target(args: &BoundArgs) -> Result<Result<JobTarget, i64>, HandlerError> {
    if let Some(job_id) = identifier(args.get("job_id")) {
        return Ok(JobTarget::resolve(Some(&job_id), None));
    }
    let owner = optional_text(args.get("owner"), "owner")?;
    Ok(JobTarget::resolve(None, owner.as_deref()))
}

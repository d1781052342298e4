//! Blackboard queries used by the job API.

use serde_json::Value;

use crate::scheduler::JobId;

use super::errors::StoreError;
use super::record::JobRecord;
use super::JobStore;

/// Number of rows returned when the caller does not ask for a limit.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on the number of rows in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Every matching row, subject to the daemon's `max_rows` cap.
    Unbounded,
    /// At most this many rows.
    AtMost(usize),
}

/// Filters and pagination for [`list_entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    pub owner: Option<String>,
    pub dataset: Option<String>,
    pub offset: usize,
    pub limit: Limit,
    pub newest_first: bool,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            owner: None,
            dataset: None,
            offset: 0,
            limit: Limit::AtMost(DEFAULT_PAGE_SIZE),
            newest_first: true,
        }
    }
}

/// Lists records matching `query`, ordered by start date.
///
/// Records without a start date sort as the oldest. Records with equal start
/// dates keep their store order.
///
/// # Errors
///
/// Propagates store failures.
pub fn list_entries(
    store: &dyn JobStore,
    query: &JobQuery,
    max_rows: Option<usize>,
) -> Result<Vec<JobRecord>, StoreError> {
    let take = match query.limit {
        Limit::AtMost(0) => return Ok(Vec::new()),
        Limit::AtMost(limit) => Some(limit),
        Limit::Unbounded => max_rows,
    };

    let mut records: Vec<JobRecord> = store
        .records()?
        .into_iter()
        .filter(|record| matches_filter(record.owner.as_deref(), query.owner.as_deref()))
        .filter(|record| matches_filter(record.dataset.as_deref(), query.dataset.as_deref()))
        .collect();

    if query.newest_first {
        records.sort_by(|left, right| right.job_start_date.cmp(&left.job_start_date));
    } else {
        records.sort_by(|left, right| left.job_start_date.cmp(&right.job_start_date));
    }

    let page = records.into_iter().skip(query.offset);
    Ok(match take {
        Some(count) => page.take(count).collect(),
        None => page.collect(),
    })
}

fn matches_filter(value: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        None | Some("") => true,
        Some(wanted) => value == Some(wanted),
    }
}

/// Looks up a single record by its global job id.
///
/// # Errors
///
/// Propagates store failures.
pub fn get_entry(store: &dyn JobStore, global_job_id: &str) -> Result<Option<JobRecord>, StoreError> {
    Ok(store
        .records()?
        .into_iter()
        .find(|record| record.global_job_id == global_job_id))
}

/// All nodes of one DAGMan workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    pub dataset: Option<String>,
    pub owner: Option<String>,
    pub dagman_job_id: Option<String>,
    pub entries: Vec<JobRecord>,
}

impl Workflow {
    /// Wire form: `[dataset, owner, dagman_job_id, [record, ...]]`.
    ///
    /// # Errors
    ///
    /// Fails only if a record cannot be serialised.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value((
            &self.dataset,
            &self.owner,
            &self.dagman_job_id,
            &self.entries,
        ))
    }
}

/// Collects the records belonging to the DAGMan job `workflow_id`.
///
/// A global id restricts the match to records submitted from the same host
/// and compares against its cluster id; any other id must equal the stored
/// `DAGManJobId`. Nodes are ordered by `(ClusterId, ProcId)`.
///
/// # Errors
///
/// Propagates store failures.
pub fn workflow_entries(
    store: &dyn JobStore,
    workflow_id: &str,
) -> Result<Option<Workflow>, StoreError> {
    let workflow_id = workflow_id.trim();
    if workflow_id.is_empty() {
        return Ok(None);
    }

    let (dagman_id, submit_host) = match workflow_id.parse::<JobId>() {
        Ok(id) if id.is_global() => (id.cluster().to_string(), id.schedd().map(str::to_owned)),
        _ => (workflow_id.to_owned(), None),
    };

    let mut entries: Vec<JobRecord> = store
        .records()?
        .into_iter()
        .filter(|record| record.dagman_job_id.as_deref() == Some(dagman_id.as_str()))
        .filter(|record| {
            submit_host
                .as_deref()
                .is_none_or(|host| record.global_job_id.starts_with(host))
        })
        .collect();
    if entries.is_empty() {
        return Ok(None);
    }
    entries.sort_by_key(|record| (record.cluster_id, record.proc_id));

    let first = &entries[0];
    Ok(Some(Workflow {
        dataset: first.dataset.clone(),
        owner: first.owner.clone(),
        dagman_job_id: first.dagman_job_id.clone(),
        entries,
    }))
}

//! The daemon's public API.

mod args;
mod jobs;
mod meta;
mod resources;

use std::sync::Arc;

use owl_config::Config;

use crate::blackboard::{JobStore, store_from_config};
use crate::scheduler::{CondorScheduler, Scheduler};

use super::binding::Param;
use super::registry::ApiMethod;

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct ApiContext {
    scheduler: Arc<dyn Scheduler>,
    store: Arc<dyn JobStore>,
    max_rows: Option<usize>,
}

impl ApiContext {
    #[must_use]
    pub fn new(scheduler: Arc<dyn Scheduler>, store: Arc<dyn JobStore>) -> Self {
        Self {
            scheduler,
            store,
            max_rows: None,
        }
    }

    /// Caps the size of listings requested without a limit.
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Context backed by the Condor tools and the configured Blackboard.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(CondorScheduler::from_config(config)),
            store_from_config(config),
        )
        .with_max_rows(config.max_rows())
    }

    #[must_use]
    pub fn scheduler(&self) -> &dyn Scheduler {
        self.scheduler.as_ref()
    }

    #[must_use]
    pub fn store(&self) -> &dyn JobStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn max_rows(&self) -> Option<usize> {
        self.max_rows
    }
}

impl std::fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiContext")
            .field("max_rows", &self.max_rows)
            .finish_non_exhaustive()
    }
}

const JOB_TARGET: &[Param] = &[Param::optional("job_id"), Param::optional("owner")];

/// Every method the daemon answers, in `list_methods` order.
pub(crate) static METHODS: &[ApiMethod] = &[
    ApiMethod {
        name: "echo",
        description: "Return the given message unchanged.",
        params: &[Param::required("message")],
        handler: meta::echo,
    },
    ApiMethod {
        name: "list_methods",
        description: "List the available methods with their descriptions.",
        params: &[],
        handler: meta::list_methods,
    },
    ApiMethod {
        name: "resources_get_list",
        description: "Return the names of the machines in the Condor pool.",
        params: &[],
        handler: resources::get_list,
    },
    ApiMethod {
        name: "resources_get_info",
        description: "Return the ClassAd of the named machine.",
        params: &[Param::required("name")],
        handler: resources::get_info,
    },
    ApiMethod {
        name: "schedd_get_stats",
        description: "Return the ClassAd of the Condor scheduler.",
        params: &[],
        handler: resources::schedd_stats,
    },
    ApiMethod {
        name: "jobs_get_list",
        description: "Return Blackboard entries, optionally filtered by owner and dataset.",
        params: &[
            Param::optional("owner"),
            Param::optional("dataset"),
            Param::integer("offset", 0),
            Param::integer("limit", 20),
            Param::flag("newest_first", true),
        ],
        handler: jobs::get_list,
    },
    ApiMethod {
        name: "jobs_get_for_workflow",
        description: "Return the Blackboard entries of every node of a DAGMan workflow.",
        params: &[Param::required("workflow_id")],
        handler: jobs::get_for_workflow,
    },
    ApiMethod {
        name: "jobs_get_info",
        description: "Return the Blackboard entry of a job given its GlobalJobId.",
        params: &[Param::required("job_id")],
        handler: jobs::get_info,
    },
    ApiMethod {
        name: "jobs_suspend",
        description: "Hold a job, or every job of an owner.",
        params: JOB_TARGET,
        handler: jobs::suspend,
    },
    ApiMethod {
        name: "jobs_resume",
        description: "Release a held job, or every held job of an owner.",
        params: JOB_TARGET,
        handler: jobs::resume,
    },
    ApiMethod {
        name: "jobs_kill",
        description: "Remove a job, or every job of an owner, from the queue.",
        params: JOB_TARGET,
        handler: jobs::kill,
    },
    ApiMethod {
        name: "jobs_set_priority",
        description: "Set the priority of a job, or of every job of an owner.",
        params: &[
            Param::required("priority"),
            Param::optional("job_id"),
            Param::optional("owner"),
        ],
        handler: jobs::set_priority,
    },
    ApiMethod {
        name: "jobs_get_priority",
        description: "Return the priority of a queued job.",
        params: &[Param::required("job_id")],
        handler: jobs::get_priority,
    },
];

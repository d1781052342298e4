//! Blackboard job records.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// One Blackboard row: the last known ClassAd of a job plus pipeline metadata.
///
/// Attributes the daemon reasons about are typed; any other attribute is kept
/// verbatim in `extra` and written back out unchanged. Timestamps are read
/// from RFC 3339 strings or Unix seconds and always written as RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobRecord {
    pub global_job_id: String,
    #[serde(default)]
    pub cluster_id: Option<i64>,
    #[serde(default)]
    pub proc_id: Option<i64>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub dataset: Option<String>,
    #[serde(rename = "DAGManJobId", default, deserialize_with = "text_or_number")]
    pub dagman_job_id: Option<String>,
    #[serde(rename = "DAGNodeName", default)]
    pub dag_node_name: Option<String>,
    #[serde(default)]
    pub job_state: Option<String>,
    #[serde(default)]
    pub job_status: Option<i64>,
    #[serde(default)]
    pub exit_code: Option<i64>,
    #[serde(default)]
    pub job_prio: Option<i64>,
    #[serde(default, with = "timestamp")]
    pub job_start_date: Option<OffsetDateTime>,
    #[serde(default, with = "timestamp")]
    pub completion_date: Option<OffsetDateTime>,
    #[serde(default, with = "timestamp")]
    pub q_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub remote_host: Option<String>,
    #[serde(default)]
    pub cmd: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
    #[serde(default)]
    pub job_duration: Option<f64>,
    #[serde(default)]
    pub instances: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobRecord {
    /// A record with only its id set.
    #[must_use]
    pub fn new(global_job_id: impl Into<String>) -> Self {
        Self {
            global_job_id: global_job_id.into(),
            cluster_id: None,
            proc_id: None,
            owner: None,
            dataset: None,
            dagman_job_id: None,
            dag_node_name: None,
            job_state: None,
            job_status: None,
            exit_code: None,
            job_prio: None,
            job_start_date: None,
            completion_date: None,
            q_date: None,
            remote_host: None,
            cmd: None,
            arguments: None,
            job_duration: None,
            instances: None,
            extra: Map::new(),
        }
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Integer(number) => number.to_string(),
    }))
}

mod timestamp {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(i64),
        Text(String),
    }

    #[allow(
        clippy::ref_option,
        reason = "serde's `with` attribute passes the field by reference"
    )]
    pub(super) fn serialize<S>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(moment) => {
                let text = moment.format(&Rfc3339).map_err(S::Error::custom)?;
                serializer.serialize_some(&text)
            }
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Seconds(seconds)) => OffsetDateTime::from_unix_timestamp(seconds)
                .map(Some)
                .map_err(D::Error::custom),
            Some(Raw::Text(text)) => OffsetDateTime::parse(&text, &Rfc3339)
                .map(Some)
                .map_err(D::Error::custom),
        }
    }
}

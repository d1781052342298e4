//! Test suites for the OWL daemon.

pub(crate) mod support;

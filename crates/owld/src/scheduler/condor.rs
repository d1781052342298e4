//! [`Scheduler`] backed by the Condor command line tools.
//!
//! Each call spawns the relevant tool, captures its standard output in an
//! anonymous temporary file (pool listings can be large), and polls for exit.
//! A tool still running after the configured timeout is killed.

use std::ffi::OsString;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use owl_config::Config;

use super::classad::{ClassAd, parse_classads};
use super::errors::SchedulerError;
use super::jobid::{JobId, JobTarget};
use super::{JobAction, SCHEDULER_TARGET, Scheduler};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs Condor tools from `bin_dir` (or `PATH`) with a bounded run time.
#[derive(Debug, Clone)]
pub struct CondorScheduler {
    bin_dir: Option<Utf8PathBuf>,
    timeout: Duration,
}

struct Finished {
    status: ExitStatus,
    stdout: String,
}

impl Finished {
    fn code(&self) -> i64 {
        self.status.code().map_or(-1, i64::from)
    }
}

impl CondorScheduler {
    /// Builds a scheduler resolving tools on `PATH`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            bin_dir: None,
            timeout,
        }
    }

    /// Resolves tools inside `bin_dir` instead of `PATH`.
    #[must_use]
    pub fn with_bin_dir(mut self, bin_dir: impl Into<Utf8PathBuf>) -> Self {
        self.bin_dir = Some(bin_dir.into());
        self
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let scheduler = Self::new(config.command_timeout());
        match config.condor_bin_dir() {
            Some(dir) => scheduler.with_bin_dir(dir),
            None => scheduler,
        }
    }

    #[must_use]
    pub fn bin_dir(&self) -> Option<&Utf8Path> {
        self.bin_dir.as_deref()
    }

    fn executable(&self, program: &str) -> OsString {
        match &self.bin_dir {
            Some(dir) => OsString::from(dir.join(program)),
            None => OsString::from(program),
        }
    }

    fn run(&self, program: &str, args: &[String]) -> Result<Finished, SchedulerError> {
        let mut capture =
            tempfile::tempfile().map_err(|source| SchedulerError::io(program, source))?;
        let stdout = capture
            .try_clone()
            .map_err(|source| SchedulerError::io(program, source))?;

        debug!(
            target: SCHEDULER_TARGET,
            program,
            ?args,
            "running scheduler command"
        );
        let mut child = Command::new(self.executable(program))
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SchedulerError::spawn(program, source))?;

        let status = wait_with_timeout(program, &mut child, self.timeout)?;
        let stdout =
            read_capture(&mut capture).map_err(|source| SchedulerError::io(program, source))?;
        debug!(
            target: SCHEDULER_TARGET,
            program,
            ?status,
            stdout_bytes = stdout.len(),
            "scheduler command finished"
        );
        Ok(Finished { status, stdout })
    }

    fn query_ads(&self, program: &str, args: &[String]) -> Result<Vec<ClassAd>, SchedulerError> {
        let finished = self.run(program, args)?;
        if !finished.status.success() {
            return Err(SchedulerError::Failed {
                program: program.to_owned(),
                status: finished.status.code().unwrap_or(-1),
            });
        }
        parse_classads(&finished.stdout).map_err(|source| SchedulerError::ClassAd {
            program: program.to_owned(),
            source,
        })
    }

    fn run_job_command(
        &self,
        program: &str,
        extra: &[String],
        target: &JobTarget,
    ) -> Result<i64, SchedulerError> {
        let (mut args, subject) = target.command_args("-n");
        args.extend_from_slice(extra);
        args.push(subject);
        Ok(self.run(program, &args)?.code())
    }
}

impl Scheduler for CondorScheduler {
    fn pool(&self) -> Result<Vec<ClassAd>, SchedulerError> {
        self.query_ads("condor_status", &["-long".to_owned()])
    }

    fn machine(&self, name: &str) -> Result<Option<ClassAd>, SchedulerError> {
        let args = ["-long".to_owned(), name.to_owned()];
        Ok(self.query_ads("condor_status", &args)?.into_iter().next())
    }

    fn schedd_stats(&self) -> Result<ClassAd, SchedulerError> {
        let args = ["-long".to_owned(), "-schedd".to_owned()];
        self.query_ads("condor_status", &args)?
            .into_iter()
            .next()
            .ok_or_else(|| SchedulerError::NoClassAd {
                program: "condor_status".to_owned(),
            })
    }

    fn control(&self, action: JobAction, target: &JobTarget) -> Result<i64, SchedulerError> {
        self.run_job_command(action.program(), &[], target)
    }

    fn set_priority(&self, priority: u32, target: &JobTarget) -> Result<i64, SchedulerError> {
        let extra = ["-p".to_owned(), priority.to_string()];
        self.run_job_command("condor_prio", &extra, target)
    }

    fn priority(&self, job: &JobId) -> Result<Option<i64>, SchedulerError> {
        let mut args = Vec::new();
        if let Some(schedd) = job.schedd() {
            args.push("-name".to_owned());
            args.push(schedd.to_owned());
        }
        args.extend([
            "-format".to_owned(),
            "%d\\n".to_owned(),
            "JobPrio".to_owned(),
            job.local_id(),
        ]);
        let finished = self.run("condor_q", &args)?;
        if !finished.status.success() {
            return Ok(None);
        }
        Ok(finished
            .stdout
            .lines()
            .next()
            .and_then(|line| line.trim().parse::<i64>().ok()))
    }
}

fn wait_with_timeout(
    program: &str,
    child: &mut Child,
    timeout: Duration,
) -> Result<ExitStatus, SchedulerError> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if start.elapsed() > timeout {
                    warn!(
                        target: SCHEDULER_TARGET,
                        program,
                        timeout_secs = timeout.as_secs(),
                        "scheduler command timed out, killing process"
                    );
                    drop(child.kill());
                    drop(child.wait());
                    return Err(SchedulerError::Timeout {
                        program: program.to_owned(),
                        timeout_secs: timeout.as_secs(),
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => return Err(SchedulerError::io(program, source)),
        }
    }
}

fn read_capture(file: &mut File) -> std::io::Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

//! Workload parsing and binding.
//!
//! Workloads arrive as gem5-style strings: `cmd` holds `;`-separated invocations
//! (`"/bin/ls;/bin/echo hi"`) and `options` holds extra arguments, shared by every
//! invocation or given per invocation when `;`-separated. This module provides:
//! 1. **Parsing:** `WorkloadSpec::parse` turns the two strings into ordered invocations.
//! 2. **Binding:** `bind` pairs invocation `i` with CPU `i` and assigns synthetic PIDs
//!    from `PID_BASE`.
//!
//! Nothing here touches the filesystem; whether an executable exists is the engine
//! loader's concern.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::common::constants::{PID_BASE, WORKLOAD_DELIMITER};
use crate::common::error::{BuildError, ParamField};

/// One executable invocation: a path followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    executable: PathBuf,
    args: Vec<String>,
}

impl Invocation {
    /// Creates an invocation.
    pub fn new(executable: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            executable: executable.into(),
            args,
        }
    }

    /// Returns the executable path.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Returns the arguments, excluding the executable.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Ordered sequence of invocations, one per logical CPU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WorkloadSpec {
    invocations: Vec<Invocation>,
}

impl WorkloadSpec {
    /// Parses a workload command string and its per-process options.
    ///
    /// Each `;`-separated entry of `cmd` is trimmed and split on whitespace; the first
    /// token is the executable and the rest are its arguments. An `options` string
    /// without `;` is split the same way and appended to every invocation; with `;`,
    /// its `i`-th entry is appended to invocation `i` only.
    ///
    /// # Arguments
    ///
    /// * `cmd` - Invocations, e.g. `"/bin/ls;/bin/echo hi"`. Blank means no invocations.
    /// * `options` - Extra arguments for all invocations (`"-v"`) or per invocation
    ///   (`"-l;"`). Blank means none.
    ///
    /// # Returns
    ///
    /// The parsed workload, or `BuildError::InvalidParameter` for an empty entry in `cmd`
    /// or more per-invocation `options` entries than invocations.
    pub fn parse(cmd: &str, options: &str) -> Result<Self, BuildError> {
        let mut invocations = Vec::new();
        if !cmd.trim().is_empty() {
            for (i, entry) in cmd.split(WORKLOAD_DELIMITER).enumerate() {
                let mut tokens = entry.split_whitespace();
                let Some(executable) = tokens.next() else {
                    return Err(BuildError::invalid_parameter(
                        "workload",
                        ParamField::Workload,
                        cmd,
                        format!("invocation {i} is empty"),
                    ));
                };
                invocations.push(Invocation::new(executable, tokens.map(str::to_string).collect()));
            }
        }

        if options.contains(WORKLOAD_DELIMITER) {
            let entries: Vec<&str> = options.split(WORKLOAD_DELIMITER).collect();
            if entries.len() > invocations.len() {
                return Err(BuildError::invalid_parameter(
                    "workload",
                    ParamField::WorkloadOptions,
                    options,
                    format!(
                        "{} option entries for {} invocation(s)",
                        entries.len(),
                        invocations.len()
                    ),
                ));
            }
            for (invocation, entry) in invocations.iter_mut().zip(entries) {
                invocation.args.extend(entry.split_whitespace().map(str::to_string));
            }
        } else {
            let shared: Vec<&str> = options.split_whitespace().collect();
            for invocation in &mut invocations {
                invocation.args.extend(shared.iter().map(|arg| (*arg).to_string()));
            }
        }

        Ok(Self { invocations })
    }

    /// Returns the invocations in order.
    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    /// Returns the number of invocations.
    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    /// Returns whether there are no invocations.
    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    /// Binds this workload to `cpu_count` CPUs; see [`bind`].
    pub fn bind(&self, cpu_count: usize) -> Result<WorkloadBinding, BuildError> {
        bind(self, cpu_count)
    }
}

impl FromIterator<Invocation> for WorkloadSpec {
    fn from_iter<I: IntoIterator<Item = Invocation>>(iter: I) -> Self {
        Self {
            invocations: iter.into_iter().collect(),
        }
    }
}

/// A process bound to one CPU's execution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessDescriptor {
    pid: u32,
    executable: PathBuf,
    args: Vec<String>,
}

impl ProcessDescriptor {
    /// Returns the synthetic process identifier.
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Returns the executable path.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Returns the arguments, excluding the executable.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the full command line: the executable followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.executable.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Bijection from CPU index to the process it runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WorkloadBinding {
    processes: BTreeMap<usize, ProcessDescriptor>,
}

impl WorkloadBinding {
    /// Returns the process bound to `cpu`.
    pub fn get(&self, cpu: usize) -> Option<&ProcessDescriptor> {
        self.processes.get(&cpu)
    }

    /// Iterates over `(cpu, process)` pairs in CPU order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ProcessDescriptor)> {
        self.processes.iter().map(|(&cpu, process)| (cpu, process))
    }

    /// Returns the number of bound processes.
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Returns whether no process is bound.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

/// Binds invocation `i` of `spec` to CPU `i`.
///
/// # Arguments
///
/// * `spec` - Parsed workload.
/// * `cpu_count` - Number of CPUs in the system.
///
/// # Returns
///
/// The binding, with PIDs `PID_BASE + i`, or `BuildError::WorkloadCountMismatch`
/// when the invocation count differs from `cpu_count`. One workload is never
/// broadcast to several CPUs and surplus workloads are never dropped.
pub fn bind(spec: &WorkloadSpec, cpu_count: usize) -> Result<WorkloadBinding, BuildError> {
    if spec.len() != cpu_count {
        return Err(BuildError::WorkloadCountMismatch {
            expected: cpu_count,
            found: spec.len(),
        });
    }

    let mut processes = BTreeMap::new();
    for (cpu, invocation) in spec.invocations().iter().enumerate() {
        let pid = u32::try_from(cpu)
            .ok()
            .and_then(|offset| PID_BASE.checked_add(offset))
            .ok_or_else(|| {
                BuildError::invalid_parameter(
                    "workload",
                    ParamField::CoreCount,
                    cpu_count.to_string(),
                    "too many processes for the PID space",
                )
            })?;
        let process = ProcessDescriptor {
            pid,
            executable: invocation.executable.clone(),
            args: invocation.args.clone(),
        };
        debug!(cpu, pid, argv = ?process.argv(), "bound process");
        let _ = processes.insert(cpu, process);
    }
    Ok(WorkloadBinding { processes })
}

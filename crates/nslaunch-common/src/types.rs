//! Domain primitive types used across the nslaunch workspace.

use std::fmt;
use std::path::PathBuf;

use crate::constants::TMP_MOUNT_POINT;
use crate::error::{LaunchError, Result};

/// A kind of Linux namespace the launcher can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceKind {
    /// Network stack (interfaces, routes, sockets).
    Net,
    /// Process ID space.
    Pid,
    /// System V IPC and POSIX message queues.
    Ipc,
    /// Hostname and NIS domain name.
    Uts,
    /// Mount table.
    Mount,
}

impl NamespaceKind {
    /// Every kind, in the order they are reported.
    pub const ALL: [Self; 5] = [Self::Net, Self::Pid, Self::Ipc, Self::Uts, Self::Mount];

    const fn bit(self) -> u8 {
        match self {
            Self::Net => 1 << 0,
            Self::Pid => 1 << 1,
            Self::Ipc => 1 << 2,
            Self::Uts => 1 << 3,
            Self::Mount => 1 << 4,
        }
    }

    /// Entry name under `/proc/<pid>/ns/`.
    #[must_use]
    pub const fn proc_name(self) -> &'static str {
        match self {
            Self::Net => "net",
            Self::Pid => "pid",
            Self::Ipc => "ipc",
            Self::Uts => "uts",
            Self::Mount => "mnt",
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.proc_name())
    }
}

/// Set of namespace kinds requested for the child.
///
/// Built once per launch and never mutated afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IsolationProfile(u8);

impl IsolationProfile {
    /// Profile A: a fresh, unconfigured network namespace only.
    pub const NETWORK_ONLY: Self = Self::empty().with(NamespaceKind::Net);

    /// Profile B: PID, IPC, UTS, mount and network namespaces.
    pub const FULL: Self = Self::empty()
        .with(NamespaceKind::Pid)
        .with(NamespaceKind::Ipc)
        .with(NamespaceKind::Uts)
        .with(NamespaceKind::Mount)
        .with(NamespaceKind::Net);

    /// A profile that requests no namespaces.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns a copy of this profile with `kind` added.
    #[must_use]
    pub const fn with(self, kind: NamespaceKind) -> Self {
        Self(self.0 | kind.bit())
    }

    /// Whether `kind` is requested.
    #[must_use]
    pub const fn contains(self, kind: NamespaceKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Whether no namespace is requested.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Requested kinds in [`NamespaceKind::ALL`] order.
    pub fn kinds(self) -> impl Iterator<Item = NamespaceKind> {
        NamespaceKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }

    /// Derives the ordered setup actions the child must apply before exec.
    ///
    /// Mount changes are preceded by making the inherited mount tree private,
    /// `/proc` is only replaced when both the mount and PID namespaces are new,
    /// and the hostname is only set inside a new UTS namespace. Network and IPC
    /// namespaces need no in-child setup.
    #[must_use]
    pub fn setup_actions(self, hostname: &str) -> Vec<SetupAction> {
        let mut actions = Vec::new();
        if self.contains(NamespaceKind::Mount) {
            actions.push(SetupAction::PrivatizeMounts);
            actions.push(SetupAction::MountTmpfs {
                target: PathBuf::from(TMP_MOUNT_POINT),
            });
            if self.contains(NamespaceKind::Pid) {
                actions.push(SetupAction::RemountProc);
            }
        }
        if self.contains(NamespaceKind::Uts) {
            actions.push(SetupAction::SetHostname(hostname.to_owned()));
        }
        actions
    }
}

impl fmt::Debug for IsolationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}

impl fmt::Display for IsolationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.kinds().map(NamespaceKind::proc_name).collect();
        f.write_str(&names.join("+"))
    }
}

/// One privileged step of the child bootstrap sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupAction {
    /// Recursively mark every inherited mount private so nothing propagates to the host.
    PrivatizeMounts,
    /// Mount a fresh tmpfs over `target`.
    MountTmpfs {
        /// Mount point.
        target: PathBuf,
    },
    /// Detach the inherited `/proc` and mount one matching the new PID namespace.
    RemountProc,
    /// Set the UTS hostname.
    SetHostname(String),
}

impl SetupAction {
    /// Short name used in diagnostics and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PrivatizeMounts => "privatize-mounts",
            Self::MountTmpfs { .. } => "mount-tmpfs",
            Self::RemountProc => "remount-proc",
            Self::SetHostname(_) => "set-hostname",
        }
    }
}

impl fmt::Display for SetupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Progress of the child bootstrap, logged at every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapStage {
    /// The child exists inside its namespaces; nothing applied yet.
    Created,
    /// Inherited mounts no longer propagate to the host.
    MountsPrivate,
    /// A private tmpfs covers the scratch directory.
    TmpMounted,
    /// The stale `/proc` has been detached.
    ProcUnmounted,
    /// A `/proc` for the new PID namespace is mounted.
    ProcRemounted,
    /// The isolated hostname is in place.
    HostnameSet,
    /// The process image is being replaced.
    Execed,
    /// A step failed; the child exits without running the program.
    Failed,
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::MountsPrivate => write!(f, "mounts-private"),
            Self::TmpMounted => write!(f, "tmp-mounted"),
            Self::ProcUnmounted => write!(f, "proc-unmounted"),
            Self::ProcRemounted => write!(f, "proc-remounted"),
            Self::HostnameSet => write!(f, "hostname-set"),
            Self::Execed => write!(f, "execed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// What the launcher hands to the child: the program and its argument vector.
///
/// The child gets its own copy of this value when it is cloned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildExecutionContext {
    program: String,
    args: Vec<String>,
}

impl ChildExecutionContext {
    /// Validates and builds a context.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::InvalidArgument`] if `program` or `args` is
    /// empty, or if any string contains an interior NUL byte.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Result<Self> {
        let program = program.into();
        if program.is_empty() {
            return Err(LaunchError::InvalidArgument {
                message: "program path is empty".into(),
            });
        }
        if args.is_empty() {
            return Err(LaunchError::InvalidArgument {
                message: "argument vector is empty".into(),
            });
        }
        if let Some(bad) = std::iter::once(&program)
            .chain(&args)
            .find(|s| s.contains('\0'))
        {
            return Err(LaunchError::InvalidArgument {
                message: format!("argument contains a NUL byte: {bad:?}"),
            });
        }
        Ok(Self { program, args })
    }

    /// Builds a context from a command line whose first element is the program.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ChildExecutionContext::new`].
    pub fn from_command(command: Vec<String>) -> Result<Self> {
        let program = command.first().cloned().unwrap_or_default();
        Self::new(program, command)
    }

    /// Program path, resolved through `PATH` at exec time if not absolute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Argument vector; `args()[0]` is the displayed program name.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// How the child terminated, as observed by the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Exited normally with this status.
    Exited(i32),
    /// Killed by this signal number.
    Signaled(i32),
}

impl ExitOutcome {
    /// Exit code the launcher process reports for this outcome.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(signal) => crate::constants::SIGNAL_EXIT_BASE + signal,
        }
    }

    /// Whether the child exited with status 0.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with status {code}"),
            Self::Signaled(signal) => write!(f, "killed by signal {signal}"),
        }
    }
}

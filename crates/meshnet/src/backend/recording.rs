//! In-memory backend that records calls instead of running them.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{BackendCall, InterfaceOption, LinkState, NetworkBackend};
use crate::error::{Error, Result};
use crate::topology::ShapingSpec;

type FailurePredicate = Box<dyn Fn(&BackendCall) -> bool + Send + Sync>;

/// Backend that records every mutating call in order.
///
/// Tracks namespace existence so `namespace_exists`, `list_namespaces` and
/// duplicate creation behave like the real thing. Everything else always
/// succeeds unless a failure predicate matches.
///
/// # Example
///
/// ```ignore
/// let backend = RecordingBackend::new().fail_when(|call| {
///     matches!(call, BackendCall::CreateNamespace { name } if name == "ns-b")
/// });
/// let err = change(&old, &new, &backend, &ApplyOptions::default()).await.unwrap_err();
/// assert!(err.leaves_inconsistent_state());
/// ```
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
    namespaces: Mutex<BTreeSet<String>>,
    fail_when: Option<FailurePredicate>,
}

impl RecordingBackend {
    /// Create a backend with no namespaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with these namespaces already present.
    pub fn with_namespaces<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.namespaces).extend(names.into_iter().map(Into::into));
        self
    }

    /// Fail every call matching `predicate`.
    ///
    /// Failing calls are still recorded.
    pub fn fail_when(
        mut self,
        predicate: impl Fn(&BackendCall) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.calls).clone()
    }

    /// Calls recorded so far, rendered as command lines.
    pub fn commands(&self) -> Vec<String> {
        lock(&self.calls).iter().map(ToString::to_string).collect()
    }

    /// Number of calls recorded so far.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn record(&self, call: BackendCall) -> Result<()> {
        let failed = self.fail_when.as_ref().is_some_and(|f| f(&call));
        let operation = call.to_string();
        lock(&self.calls).push(call);
        if failed {
            return Err(Error::backend(operation, "injected failure"));
        }
        Ok(())
    }
}

impl fmt::Debug for RecordingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingBackend")
            .field("calls", &lock(&self.calls).len())
            .field("namespaces", &*lock(&self.namespaces))
            .field("fail_when", &self.fail_when.is_some())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl NetworkBackend for RecordingBackend {
    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        Ok(lock(&self.namespaces).contains(name))
    }

    async fn list_namespaces(&self) -> Result<Vec<String>> {
        Ok(lock(&self.namespaces).iter().cloned().collect())
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        let call = BackendCall::CreateNamespace { name: name.into() };
        self.record(call.clone())?;
        if !lock(&self.namespaces).insert(name.to_string()) {
            return Err(Error::backend(call.to_string(), "namespace already exists"));
        }
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        let call = BackendCall::DeleteNamespace { name: name.into() };
        self.record(call.clone())?;
        if !lock(&self.namespaces).remove(name) {
            return Err(Error::backend(call.to_string(), "no such namespace"));
        }
        Ok(())
    }

    async fn delete_all_namespaces(&self) -> Result<()> {
        self.record(BackendCall::DeleteAllNamespaces)?;
        lock(&self.namespaces).clear();
        Ok(())
    }

    async fn disable_ipv6(&self, ns: &str) -> Result<()> {
        self.record(BackendCall::DisableIpv6 { ns: ns.into() })
    }

    async fn create_bridge(&self, ns: &str, bridge: &str) -> Result<()> {
        self.record(BackendCall::CreateBridge {
            ns: ns.into(),
            bridge: bridge.into(),
        })
    }

    async fn delete_bridge(&self, ns: &str, bridge: &str) -> Result<()> {
        self.record(BackendCall::DeleteBridge {
            ns: ns.into(),
            bridge: bridge.into(),
        })
    }

    async fn create_cable_pair(&self, ns: &str, a: &str, b: &str) -> Result<()> {
        self.record(BackendCall::CreateCablePair {
            ns: ns.into(),
            a: a.into(),
            b: b.into(),
        })
    }

    async fn delete_cable_pair(&self, ns: &str, end: &str) -> Result<()> {
        self.record(BackendCall::DeleteCablePair {
            ns: ns.into(),
            end: end.into(),
        })
    }

    async fn move_to_namespace(&self, ns: &str, ifname: &str, target_ns: &str) -> Result<()> {
        self.record(BackendCall::MoveToNamespace {
            ns: ns.into(),
            ifname: ifname.into(),
            target_ns: target_ns.into(),
        })
    }

    async fn attach_to_bridge(&self, ns: &str, ifname: &str, bridge: &str) -> Result<()> {
        self.record(BackendCall::AttachToBridge {
            ns: ns.into(),
            ifname: ifname.into(),
            bridge: bridge.into(),
        })
    }

    async fn set_interface_state(&self, ns: &str, ifname: &str, state: LinkState) -> Result<()> {
        self.record(BackendCall::SetInterfaceState {
            ns: ns.into(),
            ifname: ifname.into(),
            state,
        })
    }

    async fn set_interface_option(
        &self,
        ns: &str,
        ifname: &str,
        option: InterfaceOption,
    ) -> Result<()> {
        self.record(BackendCall::SetInterfaceOption {
            ns: ns.into(),
            ifname: ifname.into(),
            option,
        })
    }

    async fn isolate_port(&self, ns: &str, ifname: &str) -> Result<()> {
        self.record(BackendCall::IsolatePort {
            ns: ns.into(),
            ifname: ifname.into(),
        })
    }

    async fn apply_shaping(&self, ns: &str, ifname: &str, spec: &ShapingSpec) -> Result<()> {
        self.record(BackendCall::ApplyShaping {
            ns: ns.into(),
            ifname: ifname.into(),
            spec: spec.as_str().into(),
        })
    }

    async fn clear_shaping(&self, ns: &str, ifname: &str) -> Result<()> {
        self.record(BackendCall::ClearShaping {
            ns: ns.into(),
            ifname: ifname.into(),
        })
    }
}

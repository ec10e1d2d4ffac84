//! Stream wrapper that fires hooks once the wrapped operation succeeded.

use anyhow::Result;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

use super::{HookFn, HookInvocation, HookRegistry, HookScope, PackageChange, diff_packages};
use crate::core::PackageError;
use crate::models::PackageInfo;
use crate::operation::{OperationResult, OperationStream};
use crate::version::Version;

/// Produces the package set hooks are diffed over.
pub type Snapshot<'a> = Box<dyn FnOnce() -> Result<Vec<PackageInfo>> + 'a>;

enum HookState<'a> {
    Pending {
        before: Snapshot<'a>,
        after: Snapshot<'a>,
    },
    Running {
        before: Vec<PackageInfo>,
        after: Snapshot<'a>,
        produced: usize,
        all_succeeded: bool,
    },
    Firing {
        calls: VecDeque<(HookFn, HookInvocation)>,
        outputs: VecDeque<Value>,
    },
    Done,
}

/// Forwards a base stream, then appends the outputs of the hooks its changes
/// triggered.
pub struct HookedStream<'a> {
    base: OperationStream<'a>,
    registry: Arc<HookRegistry>,
    scope: HookScope,
    repository: String,
    state: HookState<'a>,
}

impl<'a> HookedStream<'a> {
    /// Wraps `base`.
    ///
    /// `before` runs when the stream is first advanced, `after` only once the
    /// base stream has finished with at least one result, all successful.
    pub fn new(
        base: OperationStream<'a>,
        registry: Arc<HookRegistry>,
        scope: HookScope,
        repository: impl Into<String>,
        before: Snapshot<'a>,
        after: Snapshot<'a>,
    ) -> Self {
        Self {
            base,
            registry,
            scope,
            repository: repository.into(),
            state: HookState::Pending { before, after },
        }
    }

    /// Boxes the wrapper as an [`OperationStream`].
    #[must_use]
    pub fn into_stream(self) -> OperationStream<'a> {
        OperationStream::new(self)
    }

    fn plan_calls(
        &self,
        before: &[PackageInfo],
        after: Vec<PackageInfo>,
    ) -> VecDeque<(HookFn, HookInvocation)> {
        let diff = diff_packages(before, &after);
        let invocation = |name: &str,
                          change: PackageChange,
                          previous: Option<Version>,
                          current: Option<Version>| HookInvocation {
            scope: self.scope,
            repository: self.repository.clone(),
            name: name.to_string(),
            change,
            previous,
            current,
            // a removed package only exists in the snapshot taken before
            packages: if change == PackageChange::Removed {
                before.to_vec()
            } else {
                after.clone()
            },
        };

        // removed, then installed, then updated
        let mut invocations = Vec::new();
        for package in &diff.removed {
            invocations.push(invocation(&package.name, PackageChange::Removed, Some(package.version), None));
        }
        for package in &diff.added {
            invocations.push(invocation(&package.name, PackageChange::Installed, None, Some(package.version)));
        }
        for (old, new) in &diff.updated {
            invocations.push(invocation(
                &new.name,
                PackageChange::Updated,
                Some(old.version),
                Some(new.version),
            ));
        }

        let mut calls = VecDeque::new();
        for invocation in invocations {
            for callback in self.registry.callbacks(self.scope, invocation.change) {
                calls.push_back((Arc::clone(callback), invocation.clone()));
            }
        }
        tracing::debug!(
            scope = %self.scope,
            repository = %self.repository,
            added = diff.added.len(),
            removed = diff.removed.len(),
            updated = diff.updated.len(),
            calls = calls.len(),
            "Planned hook invocations"
        );
        calls
    }

    fn fail(&mut self, error: anyhow::Error) -> Option<Result<OperationResult>> {
        self.state = HookState::Done;
        Some(Err(error))
    }
}

impl Iterator for HookedStream<'_> {
    type Item = Result<OperationResult>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, HookState::Done) {
                HookState::Pending { before, after } => match before() {
                    Ok(before) => {
                        self.state = HookState::Running {
                            before,
                            after,
                            produced: 0,
                            all_succeeded: true,
                        };
                    }
                    Err(e) => return self.fail(e),
                },
                HookState::Running {
                    before,
                    after,
                    produced,
                    all_succeeded,
                } => match self.base.next() {
                    Some(Ok(result)) => {
                        let all_succeeded = all_succeeded && result.is_success();
                        self.state = HookState::Running {
                            before,
                            after,
                            produced: produced + 1,
                            all_succeeded,
                        };
                        return Some(Ok(result));
                    }
                    Some(Err(e)) => return self.fail(e),
                    None if produced > 0 && all_succeeded => match after() {
                        Ok(after) => {
                            let calls = self.plan_calls(&before, after);
                            self.state = HookState::Firing {
                                calls,
                                outputs: VecDeque::new(),
                            };
                        }
                        Err(e) => return self.fail(e),
                    },
                    None => {
                        tracing::debug!(
                            scope = %self.scope,
                            produced,
                            all_succeeded,
                            "Skipping hooks"
                        );
                        return None;
                    }
                },
                HookState::Firing {
                    mut calls,
                    mut outputs,
                } => {
                    if let Some(output) = outputs.pop_front() {
                        self.state = HookState::Firing { calls, outputs };
                        return Some(Ok(OperationResult::HookOutput(output)));
                    }
                    let (callback, invocation) = calls.pop_front()?;
                    tracing::debug!(
                        scope = %invocation.scope,
                        package = %invocation.name,
                        change = %invocation.change,
                        "Invoking hook"
                    );
                    match callback(&invocation) {
                        Ok(values) => {
                            outputs.extend(values);
                            self.state = HookState::Firing { calls, outputs };
                        }
                        Err(e) => {
                            return self.fail(
                                PackageError::HookFailed {
                                    scope: invocation.scope.to_string(),
                                    name: invocation.name,
                                    reason: format!("{e:#}"),
                                }
                                .into(),
                            );
                        }
                    }
                }
                HookState::Done => return None,
            }
        }
    }
}

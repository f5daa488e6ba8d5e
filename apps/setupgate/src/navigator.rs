//! # Navigator
//!
//! The async half of the navigation guard.
//!
//! The navigator owns the route table and the gate, fetches the setup status
//! when the gate asks for it, and turns the gate's decision into a
//! [`Resolution`]. Each navigation runs the gate once: redirect targets are
//! allow-listed, so a redirect is itself the landing route.
//!
//! Two entry points:
//! - [`Navigator::navigate`] / [`Navigator::navigate_path`]: session
//!   navigation. A newer call supersedes any in-flight one, and the landing
//!   route is committed as the current route.
//! - [`Navigator::resolve`] / [`Navigator::resolve_path`]: stateless
//!   resolution for independent clients (the gate server). Nothing is
//!   superseded and nothing is committed.

use crate::status_client::StatusSource;
use setupgate_core::{
    AbortReason, Decision, FetchFailure, GateCheck, GateError, GuardScope, NavigationAttempt,
    NavigationOutcome, Resolution, RouteName, RouteParams, RouteTable, SetupGate, StatusOutcome,
    Verdict, primitives::DEFAULT_STATUS_TIMEOUT_MS,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};

// =============================================================================
// NAVIGATOR
// =============================================================================

/// Router object built once at startup.
pub struct Navigator {
    table: RouteTable,
    gate: Option<SetupGate>,
    scope: GuardScope,
    source: Arc<dyn StatusSource>,
    timeout: Duration,
    /// Bumped by every session navigation; stale tickets abort.
    generation: watch::Sender<u64>,
    current: RwLock<Option<RouteName>>,
}

impl Navigator {
    /// Create a navigator. The gate's steps must all be registered routes.
    pub fn new(
        table: RouteTable,
        gate: Option<SetupGate>,
        source: Arc<dyn StatusSource>,
    ) -> Result<Self, GateError> {
        if let Some(gate) = &gate {
            gate.validate_against(&table)?;
        }
        let (generation, _) = watch::channel(0);
        Ok(Self {
            table,
            gate,
            scope: GuardScope::default(),
            source,
            timeout: Duration::from_millis(DEFAULT_STATUS_TIMEOUT_MS),
            generation,
            current: RwLock::new(None),
        })
    }

    /// Set which routes the gate runs for.
    #[must_use]
    pub fn with_scope(mut self, scope: GuardScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the status fetch timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn gate(&self) -> Option<&SetupGate> {
        self.gate.as_ref()
    }

    pub fn scope(&self) -> GuardScope {
        self.scope
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The last committed route.
    pub async fn current_route(&self) -> Option<RouteName> {
        self.current.read().await.clone()
    }

    // =========================================================================
    // SESSION NAVIGATION
    // =========================================================================

    /// Navigate to a named route. `from` defaults to the current route.
    pub async fn navigate(
        &self,
        to: &str,
        from: Option<&str>,
    ) -> Result<NavigationOutcome, GateError> {
        let attempt = self.attempt_by_name(to, from, RouteParams::new())?;
        self.navigate_attempt(attempt).await
    }

    /// Navigate to whatever route matches a concrete path.
    pub async fn navigate_path(&self, path: &str) -> Result<NavigationOutcome, GateError> {
        let found = self.table.match_path(path)?;
        let attempt = NavigationAttempt::new(found.record.name.clone()).with_params(found.params);
        self.navigate_attempt(attempt).await
    }

    async fn navigate_attempt(
        &self,
        mut attempt: NavigationAttempt,
    ) -> Result<NavigationOutcome, GateError> {
        let ticket = self.next_ticket();
        if attempt.from.is_none() {
            attempt.from = self.current_route().await;
        }

        let aborted = NavigationOutcome::Aborted {
            reason: AbortReason::Superseded,
        };
        let Some(resolution) = self.run(attempt, ticket).await? else {
            return Ok(aborted);
        };

        // Hold the lock across the staleness check so an older navigation
        // cannot commit after a newer one.
        let mut current = self.current.write().await;
        if *self.generation.borrow() != ticket {
            tracing::debug!(ticket, "navigation superseded before commit");
            return Ok(aborted);
        }
        tracing::debug!(route = %resolution.route(), "navigation committed");
        *current = Some(resolution.route().clone());
        Ok(resolution.into())
    }

    fn next_ticket(&self) -> u64 {
        let mut ticket = 0;
        self.generation.send_modify(|g| {
            *g = g.wrapping_add(1);
            ticket = *g;
        });
        ticket
    }

    /// Run the gate once for a session navigation. `None` means superseded.
    async fn run(
        &self,
        attempt: NavigationAttempt,
        ticket: u64,
    ) -> Result<Option<Resolution>, GateError> {
        let decision = match self.pending(&attempt)? {
            Pending::Unguarded => Decision::Allow,
            Pending::Settled(verdict) => decide(&attempt, verdict),
            Pending::NeedsStatus(gate) => {
                let rx = self.generation.subscribe();
                tokio::select! {
                    outcome = self.fetch_status() => decide(&attempt, gate.resolve(&outcome)),
                    () = superseded(rx, ticket) => {
                        tracing::debug!(ticket, "status fetch cancelled by newer navigation");
                        return Ok(None);
                    }
                }
            }
        };
        Ok(Some(land(attempt, decision)))
    }

    // =========================================================================
    // STATELESS RESOLUTION
    // =========================================================================

    /// Resolve an attempt without superseding or committing anything.
    pub async fn resolve(&self, attempt: NavigationAttempt) -> Result<Resolution, GateError> {
        let decision = match self.pending(&attempt)? {
            Pending::Unguarded => Decision::Allow,
            Pending::Settled(verdict) => decide(&attempt, verdict),
            Pending::NeedsStatus(gate) => decide(&attempt, gate.resolve(&self.fetch_status().await)),
        };
        Ok(land(attempt, decision))
    }

    /// Resolve a concrete path without superseding or committing anything.
    pub async fn resolve_path(&self, path: &str) -> Result<Resolution, GateError> {
        let found = self.table.match_path(path)?;
        let attempt = NavigationAttempt::new(found.record.name.clone()).with_params(found.params);
        self.resolve(attempt).await
    }

    /// Build an attempt from route names, validating both.
    pub fn attempt_by_name(
        &self,
        to: &str,
        from: Option<&str>,
        params: RouteParams,
    ) -> Result<NavigationAttempt, GateError> {
        let to = self.table.require(to)?.name.clone();
        let from = from
            .map(|f| self.table.require(f).map(|r| r.name.clone()))
            .transpose()?;
        Ok(NavigationAttempt::new(to).from_route(from).with_params(params))
    }

    // =========================================================================
    // GUARD EVALUATION
    // =========================================================================

    /// First phase of the gate: everything that needs no status.
    fn pending(&self, attempt: &NavigationAttempt) -> Result<Pending<'_>, GateError> {
        let record = self.table.require(attempt.to.as_str())?;
        let gate = match &self.gate {
            Some(gate) if self.scope.applies_to(record) => gate,
            _ => return Ok(Pending::Unguarded),
        };
        Ok(match gate.check(&attempt.to) {
            GateCheck::Settled(verdict) => Pending::Settled(verdict),
            GateCheck::NeedsStatus => Pending::NeedsStatus(gate),
        })
    }

    /// Fetch once with the timeout applied.
    async fn fetch_status(&self) -> StatusOutcome {
        let outcome = match tokio::time::timeout(self.timeout, self.source.fetch()).await {
            Ok(result) => StatusOutcome::from_result(result.map_err(FetchFailure::from)),
            Err(_) => StatusOutcome::Failed(FetchFailure::Timeout),
        };
        if let StatusOutcome::Failed(failure) = &outcome {
            tracing::warn!(
                source = %self.source.describe(),
                %failure,
                "setup status fetch failed"
            );
        }
        outcome
    }
}

enum Pending<'a> {
    /// The gate does not run for this route.
    Unguarded,
    Settled(Verdict),
    NeedsStatus(&'a SetupGate),
}

fn decide(attempt: &NavigationAttempt, verdict: Verdict) -> Decision {
    tracing::debug!(
        to = %attempt.to,
        from = ?attempt.from,
        state = %verdict.state,
        "setup gate evaluated"
    );
    verdict.decision
}

/// Turn a decision into where the attempt lands.
fn land(attempt: NavigationAttempt, decision: Decision) -> Resolution {
    match decision {
        Decision::Allow => Resolution::Committed {
            route: attempt.to,
            params: attempt.params,
        },
        Decision::Redirect { to, reason } => {
            tracing::info!(
                requested = %attempt.to,
                from = ?attempt.from,
                to = %to,
                %reason,
                "setup gate redirect"
            );
            Resolution::Redirected {
                requested: attempt.to,
                route: to,
                reason,
            }
        }
    }
}

/// Resolves once the generation moves past `ticket`.
async fn superseded(mut rx: watch::Receiver<u64>, ticket: u64) {
    loop {
        if *rx.borrow_and_update() != ticket {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender dropped: nothing can supersede us any more.
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status_client::FetchError;
    use async_trait::async_trait;
    use setupgate_core::{
        Layout, RedirectReason, RouteRecord, SetupStep, StatusEnvelope, UnknownStepPolicy,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl StatusSource for Fixed {
        fn describe(&self) -> String {
            "fixed".to_string()
        }

        async fn fetch(&self) -> Result<StatusEnvelope, FetchError> {
            Ok(match self.0 {
                Some(v) => StatusEnvelope::with_value(v),
                None => StatusEnvelope::empty(),
            })
        }
    }

    struct Counting {
        value: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl Counting {
        fn new(value: Option<&'static str>) -> Self {
            Self {
                value,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for Counting {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        async fn fetch(&self) -> Result<StatusEnvelope, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Fixed(self.value).fetch().await
        }
    }

    fn name(s: &str) -> RouteName {
        RouteName::new(s).expect("valid")
    }

    fn navigator(layout: Layout, status: Option<&'static str>) -> Navigator {
        Navigator::new(
            layout.route_table().expect("table"),
            layout.gate().expect("gate"),
            Arc::new(Fixed(status)),
        )
        .expect("navigator")
    }

    #[tokio::test]
    async fn commit_updates_current_route() {
        let nav = navigator(Layout::Wizard, Some("Root"));
        assert_eq!(nav.current_route().await, None);
        let outcome = nav.navigate("Root", None).await.expect("navigate");
        assert!(matches!(outcome, NavigationOutcome::Committed { .. }));
        assert_eq!(nav.current_route().await.as_ref().map(RouteName::as_str), Some("Root"));
    }

    #[tokio::test]
    async fn resolve_does_not_commit() {
        let nav = navigator(Layout::Wizard, Some("Root"));
        let resolution = nav.resolve_path("/").await.expect("resolve");
        assert!(matches!(resolution, Resolution::Committed { .. }));
        assert_eq!(nav.current_route().await, None);
    }

    #[tokio::test]
    async fn redirect_location_is_step_path() {
        let nav = navigator(Layout::Wizard, Some("site"));
        let resolution = nav.resolve_path("/").await.expect("resolve");
        assert_eq!(resolution.location(nav.table()).expect("location"), "/site");
    }

    #[tokio::test]
    async fn redirect_lands_in_one_evaluation() {
        let table = RouteTable::new(vec![
            RouteRecord::new("a", "/a", "A").expect("route").guarded(),
            RouteRecord::new("b", "/b", "B").expect("route").guarded(),
            RouteRecord::new("Home", "/", "Home").expect("route").guarded(),
        ])
        .expect("table");
        let gate = SetupGate::new(vec![
            SetupStep::same("a").expect("step"),
            SetupStep::same("b").expect("step"),
        ])
        .expect("gate")
        .with_policy(UnknownStepPolicy::Strict);
        let source = Arc::new(Counting::new(Some("bogus")));
        let nav = Navigator::new(table, Some(gate), source.clone())
            .expect("navigator")
            .with_scope(GuardScope::PerRoute);

        let outcome = nav.navigate("Home", None).await.expect("navigate");
        assert_eq!(
            outcome,
            NavigationOutcome::Redirected {
                requested: name("Home"),
                route: name("a"),
                reason: RedirectReason::UnrecognizedStep,
            }
        );
        assert_eq!(source.calls(), 1);
        assert_eq!(nav.current_route().await, Some(name("a")));
    }

    #[tokio::test]
    async fn unknown_route_is_an_error() {
        let nav = navigator(Layout::Wizard, None);
        assert!(matches!(
            nav.navigate("Nowhere", None).await,
            Err(GateError::UnknownRoute(_))
        ));
    }

    #[test]
    fn gate_steps_must_be_registered() {
        let result = Navigator::new(
            Layout::Pages.route_table().expect("table"),
            Layout::Wizard.gate().expect("gate"),
            Arc::new(Fixed(None)),
        );
        assert!(matches!(result, Err(GateError::StepRouteMissing { .. })));
    }
}

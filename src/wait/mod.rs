// This file is part of the terraform-provider-ncloud project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Polling of cloud-side asynchronous operations.
//!
//! Every resource that provisions asynchronously is awaited through
//! [`Waiter::wait`]: a fetch closure performs one round trip and classifies
//! the answer into a phase label, and the waiter keeps calling it until the
//! phase is one of the targets. Any phase that is neither pending nor target
//! aborts immediately, and the whole wait is bounded by its timeout.

use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::utils::DisplayJoinable;

pub mod phase;

/// Result of a single refresh: the fetched snapshot, if the resource still
/// exists, and the phase it was classified into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refresh<T> {
    pub snapshot: Option<T>,
    pub phase: Cow<'static, str>,
}

impl<T> Refresh<T> {
    pub fn found(snapshot: T, phase: impl Into<Cow<'static, str>>) -> Self {
        Self {
            snapshot: Some(snapshot),
            phase: phase.into(),
        }
    }

    /// The resource is absent from the API response.
    pub fn gone() -> Self {
        Self {
            snapshot: None,
            phase: Cow::Borrowed(phase::DELETED),
        }
    }
}

/// Phases and timing of a wait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitConfig {
    /// Phases meaning "keep waiting"
    pub pending: &'static [&'static str],
    /// Phases meaning "done"
    pub target: &'static [&'static str],
    /// Delay between two fetches
    pub poll_interval: Duration,
    /// Floor applied to every delay, jitter included
    pub min_poll_interval: Duration,
    /// Random extra delay, as a fraction of `poll_interval`
    pub jitter: f64,
    /// Total wall-clock budget of the wait
    pub timeout: Duration,
}

impl WaitConfig {
    pub const fn new(pending: &'static [&'static str], target: &'static [&'static str]) -> Self {
        Self {
            pending,
            target,
            poll_interval: Duration::from_secs(3),
            min_poll_interval: Duration::ZERO,
            jitter: 0.0,
            timeout: Duration::from_secs(5 * 60),
        }
    }

    pub const fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub const fn with_poll_interval(self, poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..self
        }
    }

    pub const fn with_min_poll_interval(self, min_poll_interval: Duration) -> Self {
        Self {
            min_poll_interval,
            ..self
        }
    }

    pub fn with_jitter(self, jitter: f64) -> Self {
        Self {
            jitter: jitter.clamp(0.0, 0.99),
            ..self
        }
    }

    fn next_delay(&self) -> Duration {
        let delay = if self.jitter > 0.0 {
            let extra = rand::thread_rng().gen_range(0.0..self.jitter);
            self.poll_interval.mul_f64(1.0 + extra)
        } else {
            self.poll_interval
        };
        delay.max(self.min_poll_interval)
    }

    fn expected(&self) -> String {
        self.pending
            .iter()
            .chain(self.target.iter())
            .join_with(", ")
            .to_string()
    }
}

fn contains(phases: &[&str], phase: &str) -> bool {
    phases.iter().any(|p| *p == phase)
}

#[derive(Debug, Error)]
pub enum WaitError<E> {
    #[error(
        "timed out after {timeout:?} waiting for {resource} (last phase: {})",
        .last_phase.as_deref().unwrap_or("none")
    )]
    Timeout {
        resource: String,
        last_phase: Option<String>,
        timeout: Duration,
    },
    #[error("{resource} reached unexpected phase `{phase}` (expected one of: {expected})")]
    UnexpectedPhase {
        resource: String,
        phase: String,
        expected: String,
    },
    #[error("failed to refresh {resource}: {source}")]
    Fetch { resource: String, source: E },
    #[error("wait for {resource} was cancelled")]
    Cancelled { resource: String },
}

impl<E> WaitError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

struct NotFound<E> {
    matches: fn(&E) -> bool,
    phase: &'static str,
}

/// A single wait on one resource.
pub struct Waiter<'a, E> {
    resource: Cow<'a, str>,
    config: WaitConfig,
    cancel: Option<&'a CancellationToken>,
    not_found: Option<NotFound<E>>,
}

impl<'a, E> Waiter<'a, E> {
    pub fn new(resource: impl Into<Cow<'a, str>>, config: WaitConfig) -> Self {
        Self {
            resource: resource.into(),
            config,
            cancel: None,
            not_found: None,
        }
    }

    /// Abort the wait as soon as `token` is cancelled.
    pub fn cancel_on(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Treat fetch errors matching `matches` as an absent resource in `phase`
    /// instead of aborting.
    pub fn not_found_as(mut self, phase: &'static str, matches: fn(&E) -> bool) -> Self {
        self.not_found = Some(NotFound { matches, phase });
        self
    }

    /// Poll `fetch` until it reports a target phase.
    ///
    /// Returns the snapshot of the last fetch, `None` when the target was
    /// reached through the absence of the resource.
    pub async fn wait<T, F, Fut>(self, mut fetch: F) -> Result<Option<T>, WaitError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Refresh<T>, E>>,
    {
        let config = self.config;
        let deadline = Instant::now() + config.timeout;
        let mut last_phase: Option<Cow<'static, str>> = None;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let fetched = tokio::select! {
                biased;
                _ = cancelled(self.cancel) => return Err(self.cancelled()),
                fetched = tokio::time::timeout_at(deadline, fetch()) => match fetched {
                    Ok(fetched) => fetched,
                    Err(_) => return Err(self.timed_out(last_phase)),
                },
            };

            let Refresh { snapshot, phase } = match fetched {
                Ok(refresh) => refresh,
                Err(err) => match &self.not_found {
                    Some(not_found) if (not_found.matches)(&err) => {
                        debug!(resource = %self.resource, attempt, phase = not_found.phase, "resource not found");
                        Refresh {
                            snapshot: None,
                            phase: Cow::Borrowed(not_found.phase),
                        }
                    }
                    _ => {
                        return Err(WaitError::Fetch {
                            resource: self.resource.into_owned(),
                            source: err,
                        })
                    }
                },
            };

            if contains(config.target, &phase) {
                info!(resource = %self.resource, attempt, %phase, "wait complete");
                return Ok(snapshot);
            }
            if !contains(config.pending, &phase) {
                warn!(resource = %self.resource, attempt, %phase, "unexpected phase");
                return Err(WaitError::UnexpectedPhase {
                    resource: self.resource.into_owned(),
                    phase: phase.into_owned(),
                    expected: config.expected(),
                });
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(self.timed_out(Some(phase)));
            }
            let delay = config.next_delay().min(deadline - now);
            debug!(
                resource = %self.resource,
                attempt,
                %phase,
                delay_ms = delay.as_millis() as u64,
                "still pending"
            );
            last_phase = Some(phase);

            tokio::select! {
                biased;
                _ = cancelled(self.cancel) => return Err(self.cancelled()),
                _ = tokio::time::sleep(delay) => {}
            }
            if Instant::now() >= deadline {
                return Err(self.timed_out(last_phase));
            }
        }
    }

    fn timed_out(self, last_phase: Option<Cow<'static, str>>) -> WaitError<E> {
        warn!(resource = %self.resource, timeout = ?self.config.timeout, "wait timed out");
        WaitError::Timeout {
            resource: self.resource.into_owned(),
            last_phase: last_phase.map(Cow::into_owned),
            timeout: self.config.timeout,
        }
    }

    fn cancelled(self) -> WaitError<E> {
        WaitError::Cancelled {
            resource: self.resource.into_owned(),
        }
    }
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::phase::{CREATING, DELETED, DELETING, RUNNING, SETTING_UP};
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    enum StubError {
        #[error("{{\"returnCode\": \"5001017\", \"returnMessage\": \"not found\"}}")]
        NotFound,
        #[error("connection reset")]
        Reset,
    }

    impl StubError {
        fn is_not_found(&self) -> bool {
            matches!(self, Self::NotFound)
        }
    }

    type Step = Result<Refresh<u32>, StubError>;

    /// Replays its steps in order, repeating the last one forever.
    struct Script {
        steps: Mutex<VecDeque<Step>>,
        calls: AtomicUsize,
    }

    impl Script {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn next(&self) -> Step {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut steps = self.steps.lock().unwrap();
            if steps.len() > 1 {
                steps.pop_front().unwrap()
            } else {
                steps.front().cloned().unwrap()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn phase(n: u32, phase: &'static str) -> Step {
        Ok(Refresh::found(n, phase))
    }

    const CREATE: WaitConfig = WaitConfig::new(&[CREATING, SETTING_UP], &[RUNNING])
        .with_poll_interval(Duration::from_secs(2))
        .with_timeout(Duration::from_secs(10));

    const DELETE: WaitConfig = WaitConfig::new(&[DELETING], &[DELETED])
        .with_poll_interval(Duration::from_secs(2))
        .with_timeout(Duration::from_secs(10));

    async fn run(
        config: WaitConfig,
        script: &Arc<Script>,
        not_found: Option<&'static str>,
    ) -> Result<Option<u32>, WaitError<StubError>> {
        let mut waiter = Waiter::new("instance 1234", config);
        if let Some(phase) = not_found {
            waiter = waiter.not_found_as(phase, StubError::is_not_found);
        }
        waiter
            .wait(|| {
                let script = script.clone();
                async move { script.next() }
            })
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn creation_converges_after_pending_phases() {
        let script = Script::new(vec![
            phase(1, CREATING),
            phase(2, CREATING),
            phase(3, SETTING_UP),
            phase(4, RUNNING),
        ]);
        let start = Instant::now();

        let snapshot = run(CREATE, &script, None).await.unwrap();

        assert_eq!(snapshot, Some(4));
        assert_eq!(script.calls(), 4);
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn converges_after_exactly_n_plus_one_fetches() {
        for pending in 0..5 {
            let mut steps: Vec<Step> = (0..pending).map(|n| phase(n, CREATING)).collect();
            steps.push(phase(pending, RUNNING));
            let script = Script::new(steps);
            let config = CREATE.with_timeout(Duration::from_secs(60));

            let snapshot = run(config, &script, None).await.unwrap();

            assert_eq!(snapshot, Some(pending));
            assert_eq!(script.calls(), pending as usize + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_shorter_than_interval() {
        let script = Script::new(vec![phase(1, CREATING)]);
        let config = CREATE.with_timeout(Duration::from_secs(1));
        let start = Instant::now();

        let err = run(config, &script, None).await.unwrap_err();

        assert!(err.is_timeout(), "{err}");
        assert_eq!(script.calls(), 1);
        assert!(start.elapsed() <= config.timeout + config.poll_interval);
        match err {
            WaitError::Timeout {
                resource,
                last_phase,
                ..
            } => {
                assert_eq!(resource, "instance 1234");
                assert_eq!(last_phase.as_deref(), Some(CREATING));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn never_waits_past_the_timeout() {
        let script = Script::new(vec![phase(1, SETTING_UP)]);
        let start = Instant::now();

        let err = run(CREATE, &script, None).await.unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(start.elapsed(), CREATE.timeout);
        // Fetches at 0, 2, 4, 6 and 8 seconds
        assert_eq!(script.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_is_bounded_by_the_deadline() {
        let config = CREATE.with_timeout(Duration::from_secs(5));
        let start = Instant::now();

        let err = Waiter::<StubError>::new("slow instance", config)
            .wait(|| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Refresh::found(0u32, RUNNING))
            })
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn absent_resource_is_deleted() {
        let script = Script::new(vec![Ok(Refresh::gone())]);

        let snapshot = run(DELETE, &script, None).await.unwrap();

        assert_eq!(snapshot, None);
        assert_eq!(script.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn benign_not_found_is_deleted() {
        let script = Script::new(vec![Err(StubError::NotFound)]);

        let snapshot = run(DELETE, &script, Some(DELETED)).await.unwrap();

        assert_eq!(snapshot, None);
        assert_eq!(script.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deletion_completes_on_not_found_error() {
        let script = Script::new(vec![phase(1, DELETING), Err(StubError::NotFound)]);
        let start = Instant::now();

        let snapshot = run(DELETE, &script, Some(DELETED)).await.unwrap();

        assert_eq!(snapshot, None);
        assert_eq!(script.calls(), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_mapped_to_pending_keeps_polling() {
        let script = Script::new(vec![Err(StubError::NotFound), phase(2, RUNNING)]);

        let snapshot = run(CREATE, &script, Some(CREATING)).await.unwrap();

        assert_eq!(snapshot, Some(2));
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_phase_aborts_immediately() {
        let script = Script::new(vec![Ok(Refresh::found(1, "FAIL/CREAT"))]);

        let err = run(CREATE, &script, None).await.unwrap_err();

        assert_eq!(script.calls(), 1);
        match err {
            WaitError::UnexpectedPhase {
                phase, expected, ..
            } => {
                assert_eq!(phase, "FAIL/CREAT");
                assert_eq!(expected, "creating, settingUp, running");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_is_surfaced() {
        let script = Script::new(vec![Err(StubError::Reset)]);

        let err = run(DELETE, &script, Some(DELETED)).await.unwrap_err();

        assert_eq!(script.calls(), 1);
        assert_eq!(
            err.to_string(),
            "failed to refresh instance 1234: connection reset"
        );
        match err {
            WaitError::Fetch { source, .. } => assert_eq!(source, StubError::Reset),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_without_predicate_is_fatal() {
        let script = Script::new(vec![Err(StubError::NotFound)]);

        let err = run(DELETE, &script, None).await.unwrap_err();

        assert!(matches!(err, WaitError::Fetch { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_wait() {
        let script = Script::new(vec![phase(1, CREATING)]);
        let config = CREATE.with_timeout(Duration::from_secs(3600));
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let fetch_script = script.clone();
        let err = Waiter::new("instance 1234", config)
            .cancel_on(&token)
            .wait(|| {
                let script = fetch_script.clone();
                async move { script.next() }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::Cancelled { .. }));
        assert_eq!(script.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn min_poll_interval_is_a_floor() {
        let script = Script::new(vec![phase(1, CREATING), phase(2, RUNNING)]);
        let config = CREATE
            .with_poll_interval(Duration::from_secs(1))
            .with_min_poll_interval(Duration::from_secs(3));
        let start = Instant::now();

        run(config, &script, None).await.unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let config = CREATE.with_jitter(0.5);
        for _ in 0..100 {
            let delay = config.next_delay();
            assert!(delay >= Duration::from_secs(2));
            assert!(delay < Duration::from_secs(3));
        }
        assert_eq!(CREATE.next_delay(), Duration::from_secs(2));
    }
}

//! Submission dispatch: classification, the signed-out short-circuit, and
//! the generation guard that keeps the displayed state consistent when
//! outcomes arrive out of submission order.

use std::sync::Arc;

use crate::classify::{classify, Submission};
use crate::gateway::{GatewayError, RequestGateway};
use crate::links::Reference;
use crate::session::SessionContext;

/// What the UI currently shows. A newly created reference and a search
/// result list are never current at the same time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DisplayState {
    #[default]
    Empty,
    Reference(Reference),
    Results(Vec<Reference>),
}

/// Outcome of [`InputDispatcher::submit`].
#[derive(Debug)]
pub enum Dispatch {
    /// Submission accepted; run the job, then settle its outcome.
    Started(Job),
    /// A URL was submitted while signed out: no request is issued, control
    /// goes to the login redirect at this URL.
    LoginRedirect(String),
    /// Empty or whitespace-only input; nothing to do.
    EmptyInput,
}

/// An accepted submission, tagged with the generation that was current when
/// it was accepted.
#[derive(Debug, Clone)]
pub struct Job {
    generation: u64,
    submission: Submission,
}

impl Job {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }
}

/// A completed gateway call, still carrying its generation tag.
#[derive(Debug)]
pub struct JobOutcome {
    generation: u64,
    result: Result<DisplayState, GatewayError>,
}

pub struct InputDispatcher {
    gateway: Arc<RequestGateway>,
    session: SessionContext,
    generation: u64,
    in_flight: bool,
    display: DisplayState,
    notice: Option<String>,
}

impl InputDispatcher {
    pub fn new(gateway: Arc<RequestGateway>, session: SessionContext) -> InputDispatcher {
        InputDispatcher {
            gateway,
            session,
            generation: 0,
            in_flight: false,
            display: DisplayState::Empty,
            notice: None,
        }
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Transient failure notice from the last settled submission, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// True while a submission is awaiting its outcome. UIs use this for
    /// the disable-while-loading affordance.
    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Replaces the injected session context, e.g. after a fresh `auth/me`
    /// lookup.
    pub fn set_session(&mut self, session: SessionContext) {
        self.session = session;
    }

    /// Accepts a submission. Classification runs exactly once, before any
    /// network call. A submit while an earlier one is still in flight
    /// supersedes it: the generation moves on and the stale outcome is
    /// discarded at settle time.
    pub fn submit(&mut self, text: &str) -> Dispatch {
        let Some(submission) = classify(text) else {
            return Dispatch::EmptyInput;
        };

        if matches!(submission, Submission::Reference(_)) && !self.session.authenticated() {
            // Signed-out URL save: no request, hand over to the login
            // redirect and stay idle.
            return Dispatch::LoginRedirect(self.gateway.login_url());
        }

        self.generation += 1;
        self.in_flight = true;
        self.notice = None;

        log::debug!("submission {} accepted: {:?}", self.generation, submission);
        Dispatch::Started(Job {
            generation: self.generation,
            submission,
        })
    }

    /// Performs the network call for an accepted job. Borrows `&self` so
    /// the outcomes of interleaved submissions can be settled in whatever
    /// order they complete.
    pub fn run(&self, job: &Job) -> JobOutcome {
        let result = match job.submission() {
            Submission::Reference(url) => self
                .gateway
                .create_reference(url)
                .map(DisplayState::Reference),
            Submission::Query(text) => self.gateway.search(text).map(DisplayState::Results),
        };

        JobOutcome {
            generation: job.generation,
            result,
        }
    }

    /// Applies a completed outcome to the displayed state. Returns false if
    /// the outcome was stale (superseded by a newer submission or by
    /// logout) and was discarded.
    pub fn settle(&mut self, outcome: JobOutcome) -> bool {
        if outcome.generation != self.generation {
            log::debug!(
                "discarding stale outcome (generation {}, current {})",
                outcome.generation,
                self.generation
            );
            return false;
        }

        self.in_flight = false;
        match outcome.result {
            Ok(state) => {
                self.notice = None;
                self.display = state;
            }
            Err(err) => {
                // The previous display survives a failed submission.
                log::error!("submission {} failed: {err}", outcome.generation);
                self.notice = Some("request failed, please try again".to_string());
            }
        }

        true
    }

    /// External logout event. Clears the displayed state unconditionally
    /// and bumps the generation so in-flight outcomes, which are allowed to
    /// complete, are discarded when they settle.
    pub fn logout(&mut self) {
        self.generation += 1;
        self.in_flight = false;
        self.display = DisplayState::Empty;
        self.notice = None;
        self.session = SessionContext::default();
    }
}

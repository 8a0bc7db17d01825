//! Runs the controller's fetches in the background.
//!
//! The session never awaits a fetch while handling an action. Finished
//! requests are picked up by [`Session::poll`] on the next tick.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::controller::{Action, Controller, Fetch, Ticket};
use crate::gateway::{fallback_reasons, fallback_wish, TextGateway};
use crate::state::Recipient;

/// A finished fetch, still tagged with the ticket it was issued under.
enum Completion {
    Wish(Ticket, String),
    Reasons(Ticket, Vec<String>),
}

impl Completion {
    /// What a fetch resolves to when its task never produced an answer.
    fn fallback(fetch: Fetch, recipient: &Recipient) -> Self {
        match fetch {
            Fetch::Wish { ticket, .. } => {
                Completion::Wish(ticket, fallback_wish(&recipient.name, recipient.age))
            }
            Fetch::Reasons { ticket } => Completion::Reasons(ticket, fallback_reasons(recipient.age)),
        }
    }
}

struct Pending {
    fetch: Fetch,
    handle: JoinHandle<Completion>,
}

pub struct Session<G: TextGateway + 'static> {
    controller: Controller,
    gateway: Arc<G>,
    pending: Vec<Pending>,
}

impl<G: TextGateway + 'static> Session<G> {
    pub fn new(controller: Controller, gateway: Arc<G>) -> Self {
        Self {
            controller,
            gateway,
            pending: Vec::new(),
        }
    }

    /// Apply an action and start whatever fetches it asks for.
    pub fn dispatch(&mut self, action: Action) {
        let fetches = self.controller.apply(action);
        self.spawn_all(fetches);
    }

    /// The click-budget watcher. Call it periodically.
    pub fn watch(&mut self) {
        let fetches = self.controller.enforce_click_budget();
        self.spawn_all(fetches);
    }

    /// Apply every fetch that has finished. Does not wait for running ones.
    pub async fn poll(&mut self) {
        let (finished, running): (Vec<Pending>, Vec<Pending>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.handle.is_finished());
        self.pending = running;

        for pending in finished {
            self.finish(pending).await;
        }
    }

    /// Wait for every running fetch and apply the results.
    pub async fn settle(&mut self) {
        for pending in std::mem::take(&mut self.pending) {
            self.finish(pending).await;
        }
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn spawn_all(&mut self, fetches: Vec<Fetch>) {
        for fetch in fetches {
            self.spawn(fetch);
        }
    }

    fn spawn(&mut self, fetch: Fetch) {
        let gateway = Arc::clone(&self.gateway);
        let recipient = self.controller.recipient().clone();

        tracing::debug!(?fetch, "starting fetch");
        let handle = tokio::spawn(async move {
            match fetch {
                Fetch::Wish { ticket, tone } => Completion::Wish(
                    ticket,
                    gateway
                        .generate_wish(&recipient.name, recipient.age, tone)
                        .await,
                ),
                Fetch::Reasons { ticket } => Completion::Reasons(
                    ticket,
                    gateway
                        .generate_reasons(&recipient.name, recipient.age)
                        .await,
                ),
            }
        });

        self.pending.push(Pending { fetch, handle });
    }

    async fn finish(&mut self, pending: Pending) {
        let completion = match pending.handle.await {
            Ok(completion) => completion,
            Err(e) => {
                // A panicking gateway still has to clear the loading flag.
                tracing::warn!(error = %e, "fetch task failed, using fallback");
                Completion::fallback(pending.fetch, self.controller.recipient())
            }
        };

        match completion {
            Completion::Wish(ticket, text) => {
                self.controller.complete_wish(ticket, text);
            }
            Completion::Reasons(ticket, reasons) => {
                self.controller.complete_reasons(ticket, reasons);
            }
        }
    }
}

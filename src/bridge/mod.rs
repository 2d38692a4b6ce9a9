use std::sync::mpsc::Sender;

use tracing::{debug, trace};

use crate::models::SessionFacet;
use crate::realtime::LoopEvent;
use crate::session::{ChangeHandler, MediaSession, SessionResult, Subscription};

/// Forwards the session's change notifications onto the driver's queue, one
/// `LoopEvent::Changed` per firing.
pub struct NotificationBridge {
    subscriptions: Vec<Subscription>,
}

impl NotificationBridge {
    pub fn register(session: &dyn MediaSession, queue: &Sender<LoopEvent>) -> SessionResult<Self> {
        let mut subscriptions = Vec::with_capacity(SessionFacet::ALL.len());

        for facet in SessionFacet::ALL {
            let tx = queue.clone();
            let handler: ChangeHandler = Box::new(move || {
                trace!("{facet} changed");
                // Fails only after the driver has exited.
                let _ = tx.send(LoopEvent::Changed(facet));
            });
            subscriptions.push(session.subscribe(facet, handler)?);
        }

        debug!("Listening for changes on {}", session.name());
        Ok(Self { subscriptions })
    }

    pub fn facets(&self) -> Vec<SessionFacet> {
        self.subscriptions.iter().map(Subscription::facet).collect()
    }
}

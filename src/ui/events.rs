//! Application event handling.
//!
//! Background tasks report back through `AppEvent`; this is where those
//! reports reach the feed store and the status line.

use crate::app::{App, AppEvent};

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Feed { generation, action } => {
            tracing::trace!(generation, kind = action.kind(), "Applying feed event");
            app.apply_feed_event(generation, action);
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.set_status(format!("Internal error in {}: {}", task, error));
        }
    }
}

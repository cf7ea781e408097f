//! Presenter that writes the setup code to the log.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use hkbridge_app::ports::Presenter;
use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::pairing::SetupMessage;

/// Logs setup messages and remembers which one is on display per context.
#[derive(Default)]
pub struct LogPresenter {
    displayed: Mutex<HashMap<String, SetupMessage>>,
}

impl LogPresenter {
    /// The message currently displayed for `context`, if any.
    #[must_use]
    pub fn displayed(&self, context: &str) -> Option<SetupMessage> {
        self.displayed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(context)
            .cloned()
    }
}

impl Presenter for LogPresenter {
    fn show_setup_message(
        &self,
        context: &str,
        message: &SetupMessage,
    ) -> Result<(), HkBridgeError> {
        tracing::info!(
            context,
            bridge = %message.bridge_name,
            pin = %message.pin,
            setup_uri = %message.setup_uri,
            "waiting for pairing"
        );
        self.displayed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(context.to_string(), message.clone());
        Ok(())
    }

    fn dismiss_setup_message(&self, context: &str) -> Result<(), HkBridgeError> {
        let removed = self
            .displayed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(context);
        if removed.is_some() {
            tracing::info!(context, "setup message dismissed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hkbridge_domain::accessory::Category;
    use hkbridge_domain::pairing::PairingState;

    fn message() -> SetupMessage {
        PairingState::new("031-45-154".parse().unwrap(), "HKBR".parse().unwrap())
            .setup_message("Demo", Category::Bridge)
    }

    #[test]
    fn should_remember_displayed_message_per_context() {
        let presenter = LogPresenter::default();
        presenter.show_setup_message("main", &message()).unwrap();

        assert_eq!(presenter.displayed("main"), Some(message()));
        assert!(presenter.displayed("other").is_none());
    }

    #[test]
    fn should_forget_dismissed_message() {
        let presenter = LogPresenter::default();
        presenter.show_setup_message("main", &message()).unwrap();
        presenter.dismiss_setup_message("main").unwrap();
        assert!(presenter.displayed("main").is_none());
    }

    #[test]
    fn should_allow_dismissing_nothing() {
        let presenter = LogPresenter::default();
        assert!(presenter.dismiss_setup_message("main").is_ok());
    }
}

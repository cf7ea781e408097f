//! Presenter port — where setup codes are shown to the user.
//!
//! Calls are fire-and-forget from the core's point of view: callers log
//! failures and carry on.

use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::pairing::SetupMessage;

pub trait Presenter {
    /// Show (or replace) the setup message for `context`.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::Presentation`] when the message could not be shown.
    fn show_setup_message(&self, context: &str, message: &SetupMessage)
    -> Result<(), HkBridgeError>;

    /// Remove the setup message for `context`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`HkBridgeError::Presentation`] when the message could not be removed.
    fn dismiss_setup_message(&self, context: &str) -> Result<(), HkBridgeError>;
}

impl<T: Presenter> Presenter for std::sync::Arc<T> {
    fn show_setup_message(
        &self,
        context: &str,
        message: &SetupMessage,
    ) -> Result<(), HkBridgeError> {
        (**self).show_setup_message(context, message)
    }

    fn dismiss_setup_message(&self, context: &str) -> Result<(), HkBridgeError> {
        (**self).dismiss_setup_message(context)
    }
}

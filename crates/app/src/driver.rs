//! Pairing-state driver — pair/unpair on top of the protocol peer.
//!
//! ```text
//! Unpaired ──pair──▶ Paired ──unpair (last client)──▶ Unpaired
//! ```
//!
//! The peer call happens first and its error is returned as-is. Only once
//! the peer agrees does [`PairingState`] change, followed by a best-effort
//! presenter update for this driver's context.

use hkbridge_domain::accessory::Category;
use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::id::ClientId;
use hkbridge_domain::pairing::{ClientPublicKey, PairingState};

use crate::ports::{Presenter, ProtocolPeer};

pub struct HomeDriver<P, S> {
    context: String,
    bridge_name: String,
    state: PairingState,
    peer: P,
    presenter: S,
}

impl<P, S> HomeDriver<P, S>
where
    P: ProtocolPeer,
    S: Presenter,
{
    /// `context` keys this driver's setup message on the presenter.
    pub fn new(
        context: impl Into<String>,
        bridge_name: impl Into<String>,
        state: PairingState,
        peer: P,
        presenter: S,
    ) -> Self {
        Self {
            context: context.into(),
            bridge_name: bridge_name.into(),
            state,
            peer,
            presenter,
        }
    }

    #[must_use]
    pub fn state(&self) -> &PairingState {
        &self.state
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    #[must_use]
    pub fn peer(&self) -> &P {
        &self.peer
    }

    #[must_use]
    pub fn presenter(&self) -> &S {
        &self.presenter
    }

    /// Pair `client`, then dismiss the setup message.
    ///
    /// # Errors
    ///
    /// Returns the protocol peer's error unchanged; pairing state is left
    /// untouched in that case.
    #[tracing::instrument(skip(self, key), fields(context = %self.context))]
    pub async fn pair(
        &mut self,
        client: ClientId,
        key: ClientPublicKey,
    ) -> Result<(), HkBridgeError> {
        self.peer.pair(&client, &key).await?;
        self.state.add_client(client, key);
        tracing::info!(clients = self.state.paired_clients().len(), "client paired");

        if let Err(err) = self.presenter.dismiss_setup_message(&self.context) {
            tracing::warn!(error = %err, "failed to dismiss setup message");
        }
        Ok(())
    }

    /// Unpair `client`, then show the setup message again with the
    /// current pin.
    ///
    /// # Errors
    ///
    /// Returns the protocol peer's error unchanged.
    #[tracing::instrument(skip(self), fields(context = %self.context))]
    pub async fn unpair(&mut self, client: ClientId) -> Result<(), HkBridgeError> {
        self.peer.unpair(&client).await?;
        if self.state.remove_client(&client).is_none() {
            tracing::debug!("client was not paired");
        }
        tracing::info!(clients = self.state.paired_clients().len(), "client unpaired");

        self.show_setup_message();
        Ok(())
    }

    /// Show the setup message for this driver's context. Failures are logged.
    pub fn show_setup_message(&self) {
        let message = self.state.setup_message(&self.bridge_name, Category::Bridge);
        if let Err(err) = self.presenter.show_setup_message(&self.context, &message) {
            tracing::warn!(error = %err, context = %self.context, "failed to show setup message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingPeer, RecordingPresenter};

    fn driver(peer: RecordingPeer, presenter: RecordingPresenter) -> HomeDriver<RecordingPeer, RecordingPresenter> {
        let state = PairingState::new("031-45-154".parse().unwrap(), "HKBR".parse().unwrap());
        HomeDriver::new("main", "Living Room", state, peer, presenter)
    }

    fn key() -> ClientPublicKey {
        ClientPublicKey::new([1_u8; 32])
    }

    #[tokio::test]
    async fn should_dismiss_setup_message_after_pairing() {
        let mut driver = driver(RecordingPeer::default(), RecordingPresenter::default());
        driver.show_setup_message();
        assert!(driver.presenter().shown("main").is_some());

        driver.pair(ClientId::new("phone"), key()).await.unwrap();

        assert!(driver.state().is_paired());
        assert!(driver.presenter().shown("main").is_none());
        assert_eq!(driver.peer().paired.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_show_original_pin_after_unpairing() {
        let mut driver = driver(RecordingPeer::default(), RecordingPresenter::default());
        driver.pair(ClientId::new("phone"), key()).await.unwrap();

        driver.unpair(ClientId::new("phone")).await.unwrap();

        assert!(!driver.state().is_paired());
        let shown = driver.presenter().shown("main").unwrap();
        assert_eq!(shown.pin.to_string(), "031-45-154");
        assert_eq!(shown.bridge_name, "Living Room");
    }

    #[tokio::test]
    async fn should_cycle_between_paired_and_unpaired() {
        let mut driver = driver(RecordingPeer::default(), RecordingPresenter::default());
        for _ in 0..2 {
            driver.pair(ClientId::new("phone"), key()).await.unwrap();
            assert!(driver.state().is_paired());
            driver.unpair(ClientId::new("phone")).await.unwrap();
            assert!(!driver.state().is_paired());
        }
    }

    #[tokio::test]
    async fn should_propagate_peer_failure_without_state_change() {
        let mut driver = driver(RecordingPeer::failing(), RecordingPresenter::default());
        driver.show_setup_message();

        let result = driver.pair(ClientId::new("phone"), key()).await;

        assert!(matches!(result, Err(HkBridgeError::Protocol(_))));
        assert!(!driver.state().is_paired());
        assert!(driver.presenter().shown("main").is_some());
    }

    #[tokio::test]
    async fn should_complete_pairing_when_presenter_fails() {
        let mut driver = driver(RecordingPeer::default(), RecordingPresenter::failing());

        driver.pair(ClientId::new("phone"), key()).await.unwrap();
        assert!(driver.state().is_paired());

        driver.unpair(ClientId::new("phone")).await.unwrap();
        assert!(!driver.state().is_paired());
    }
}

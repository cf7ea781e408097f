//! In-memory fakes for the ports, shared by the unit tests.

use std::collections::HashMap;
use std::future::{Future, ready};
use std::sync::Mutex;

use hkbridge_domain::accessory::CharacteristicChange;
use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::event::Event;
use hkbridge_domain::id::{AccessoryId, ClientId};
use hkbridge_domain::pairing::{ClientPublicKey, SetupMessage};
use hkbridge_domain::time::Timestamp;

use crate::ports::{Clock, EventPublisher, Presenter, ProtocolPeer};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FakeError(pub &'static str);

#[derive(Default)]
pub struct RecordingPresenter {
    fail: bool,
    shown: Mutex<HashMap<String, SetupMessage>>,
    show_count: Mutex<usize>,
}

impl RecordingPresenter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn shown(&self, context: &str) -> Option<SetupMessage> {
        self.shown.lock().unwrap().get(context).cloned()
    }

    pub fn show_count(&self) -> usize {
        *self.show_count.lock().unwrap()
    }
}

impl Presenter for RecordingPresenter {
    fn show_setup_message(
        &self,
        context: &str,
        message: &SetupMessage,
    ) -> Result<(), HkBridgeError> {
        if self.fail {
            return Err(HkBridgeError::Presentation(Box::new(FakeError("no display"))));
        }
        *self.show_count.lock().unwrap() += 1;
        self.shown
            .lock()
            .unwrap()
            .insert(context.to_string(), message.clone());
        Ok(())
    }

    fn dismiss_setup_message(&self, context: &str) -> Result<(), HkBridgeError> {
        if self.fail {
            return Err(HkBridgeError::Presentation(Box::new(FakeError("no display"))));
        }
        self.shown.lock().unwrap().remove(context);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingPeer {
    fail_pairing: bool,
    pub paired: Mutex<Vec<ClientId>>,
    pub unpaired: Mutex<Vec<ClientId>>,
    pub notified: Mutex<Vec<(AccessoryId, Vec<CharacteristicChange>)>>,
}

impl RecordingPeer {
    pub fn failing() -> Self {
        Self {
            fail_pairing: true,
            ..Self::default()
        }
    }

    pub fn notifications(&self) -> Vec<(AccessoryId, Vec<CharacteristicChange>)> {
        self.notified.lock().unwrap().clone()
    }
}

impl ProtocolPeer for RecordingPeer {
    fn pair(
        &self,
        client: &ClientId,
        _key: &ClientPublicKey,
    ) -> impl Future<Output = Result<(), HkBridgeError>> + Send {
        let result = if self.fail_pairing {
            Err(HkBridgeError::Protocol(Box::new(FakeError("pairing refused"))))
        } else {
            self.paired.lock().unwrap().push(client.clone());
            Ok(())
        };
        ready(result)
    }

    fn unpair(&self, client: &ClientId) -> impl Future<Output = Result<(), HkBridgeError>> + Send {
        let result = if self.fail_pairing {
            Err(HkBridgeError::Protocol(Box::new(FakeError("unpairing refused"))))
        } else {
            self.unpaired.lock().unwrap().push(client.clone());
            Ok(())
        };
        ready(result)
    }

    fn notify(
        &self,
        aid: AccessoryId,
        changes: &[CharacteristicChange],
    ) -> impl Future<Output = Result<(), HkBridgeError>> + Send {
        self.notified.lock().unwrap().push((aid, changes.to_vec()));
        ready(Ok(()))
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<Event>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HkBridgeError>> + Send {
        self.events.lock().unwrap().push(event);
        ready(Ok(()))
    }
}

pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap()
    }
}

//! Pairing state — setup code, setup id, and the set of paired clients.
//!
//! Only pair/unpair mutate [`PairingState`]; presentation consumers read it
//! to render the setup message.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::accessory::Category;
use crate::error::ValidationError;
use crate::id::ClientId;

/// Eight-digit setup code, displayed as `XXX-XX-XXX`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PinCode(String);

impl PinCode {
    const TRIVIAL: [&'static str; 2] = ["12345678", "87654321"];

    /// Generate a random, non-trivial code.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let raw: u32 = rng.gen_range(0..100_000_000);
            let digits = format!("{raw:08}");
            if !Self::is_trivial(&digits) {
                return Self(digits);
            }
        }
    }

    /// The code as a number, for the setup payload.
    #[must_use]
    pub fn as_number(&self) -> u32 {
        self.0.parse().unwrap_or_default()
    }

    fn is_trivial(digits: &str) -> bool {
        let first = digits.as_bytes()[0];
        digits.bytes().all(|b| b == first) || Self::TRIVIAL.contains(&digits)
    }
}

impl FromStr for PinCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = match s.len() {
            8 => s.bytes().all(|b| b.is_ascii_digit()),
            10 => s.bytes().enumerate().all(|(i, b)| match i {
                3 | 6 => b == b'-',
                _ => b.is_ascii_digit(),
            }),
            _ => false,
        };
        if !well_formed {
            return Err(ValidationError::InvalidPinCode(s.to_string()));
        }
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();
        if Self::is_trivial(&digits) {
            return Err(ValidationError::TrivialPinCode(s.to_string()));
        }
        Ok(Self(digits))
    }
}

impl TryFrom<String> for PinCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PinCode> for String {
    fn from(value: PinCode) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", &self.0[..3], &self.0[3..5], &self.0[5..])
    }
}

/// Four-character setup id appended to the setup URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SetupId(String);

impl SetupId {
    const ALPHABET: &'static [u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let id = (0..4)
            .map(|_| char::from(Self::ALPHABET[rng.gen_range(0..Self::ALPHABET.len())]))
            .collect();
        Self(id)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SetupId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 4 && s.bytes().all(|b| Self::ALPHABET.contains(&b)) {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::InvalidSetupId(s.to_string()))
        }
    }
}

impl TryFrom<String> for SetupId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SetupId> for String {
    fn from(value: SetupId) -> Self {
        value.0
    }
}

/// Long-term public key a client presented while pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientPublicKey(Vec<u8>);

impl ClientPublicKey {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// What the presenter shows while the bridge is waiting to be paired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupMessage {
    pub bridge_name: String,
    pub pin: PinCode,
    pub setup_uri: String,
}

/// Setup code, setup id, and the clients currently paired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingState {
    pin: PinCode,
    setup_id: SetupId,
    paired_clients: BTreeMap<ClientId, ClientPublicKey>,
}

impl PairingState {
    #[must_use]
    pub fn new(pin: PinCode, setup_id: SetupId) -> Self {
        Self {
            pin,
            setup_id,
            paired_clients: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn pin(&self) -> &PinCode {
        &self.pin
    }

    #[must_use]
    pub fn setup_id(&self) -> &SetupId {
        &self.setup_id
    }

    #[must_use]
    pub fn is_paired(&self) -> bool {
        !self.paired_clients.is_empty()
    }

    #[must_use]
    pub fn paired_clients(&self) -> &BTreeMap<ClientId, ClientPublicKey> {
        &self.paired_clients
    }

    pub fn add_client(&mut self, client: ClientId, key: ClientPublicKey) {
        self.paired_clients.insert(client, key);
    }

    pub fn remove_client(&mut self, client: &ClientId) -> Option<ClientPublicKey> {
        self.paired_clients.remove(client)
    }

    /// `X-HM://` setup URI encoding category, transport flag and setup code.
    #[must_use]
    pub fn setup_uri(&self, category: Category) -> String {
        const IP_TRANSPORT_FLAG: u64 = 2;
        let payload = (u64::from(category.code()) << 31)
            | (IP_TRANSPORT_FLAG << 27)
            | u64::from(self.pin.as_number() & 0x07FF_FFFF);
        format!("X-HM://{:0>9}{}", to_base36(payload), self.setup_id.as_str())
    }

    #[must_use]
    pub fn setup_message(&self, bridge_name: &str, category: Category) -> SetupMessage {
        SetupMessage {
            bridge_name: bridge_name.to_string(),
            pin: self.pin.clone(),
            setup_uri: self.setup_uri(category),
        }
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[usize::try_from(value % 36).unwrap_or_default()]);
        value /= 36;
        if value == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PairingState {
        PairingState::new("031-45-154".parse().unwrap(), "HKBR".parse().unwrap())
    }

    #[test]
    fn should_parse_dashed_and_plain_pin() {
        let dashed: PinCode = "031-45-154".parse().unwrap();
        let plain: PinCode = "03145154".parse().unwrap();
        assert_eq!(dashed, plain);
        assert_eq!(plain.to_string(), "031-45-154");
    }

    #[test]
    fn should_reject_malformed_pin() {
        assert!(matches!(
            PinCode::from_str("0314-5154"),
            Err(ValidationError::InvalidPinCode(_))
        ));
        assert!(PinCode::from_str("0314515").is_err());
        assert!(PinCode::from_str("03a-45-154").is_err());
    }

    #[test]
    fn should_reject_trivial_pin() {
        assert!(matches!(
            PinCode::from_str("111-11-111"),
            Err(ValidationError::TrivialPinCode(_))
        ));
        assert!(PinCode::from_str("123-45-678").is_err());
        assert!(PinCode::from_str("87654321").is_err());
    }

    #[test]
    fn should_generate_parseable_pin() {
        let pin = PinCode::generate();
        let parsed: PinCode = pin.to_string().parse().unwrap();
        assert_eq!(parsed, pin);
    }

    #[test]
    fn should_generate_valid_setup_id() {
        let id = SetupId::generate();
        assert!(SetupId::from_str(id.as_str()).is_ok());
    }

    #[test]
    fn should_generate_well_formed_values_every_time() {
        for _ in 0..200 {
            let pin = PinCode::generate();
            assert_eq!(pin.to_string().len(), 10);
            assert!(!PinCode::is_trivial(&pin.to_string().replace('-', "")));

            let id = SetupId::generate();
            assert_eq!(id.as_str().len(), 4);
        }
    }

    #[test]
    fn should_reject_lowercase_setup_id() {
        assert!(SetupId::from_str("hkbr").is_err());
        assert!(SetupId::from_str("HKB").is_err());
    }

    #[test]
    fn should_track_paired_clients() {
        let mut state = state();
        assert!(!state.is_paired());

        let client = ClientId::new("client-1");
        state.add_client(client.clone(), ClientPublicKey::new([7_u8; 32]));
        assert!(state.is_paired());

        assert!(state.remove_client(&client).is_some());
        assert!(!state.is_paired());
    }

    #[test]
    fn should_encode_setup_uri() {
        assert_eq!(state().setup_uri(Category::Bridge), "X-HM://0023ISYWYHKBR");
    }

    #[test]
    fn should_build_setup_message_with_current_pin() {
        let msg = state().setup_message("Living Room Bridge", Category::Bridge);
        assert_eq!(msg.bridge_name, "Living Room Bridge");
        assert_eq!(msg.pin.to_string(), "031-45-154");
        assert!(msg.setup_uri.starts_with("X-HM://"));
    }

    #[test]
    fn should_encode_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
    }
}

use serde::{Deserialize, Serialize};

use crate::address::{Principal, Target};
use crate::selector::{Selector, SELECTOR_LEN};

/// An action proposed to the relay.
///
/// The selector is the leading fixed-width prefix of `payload`; everything
/// after it is argument data forwarded verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub caller: Principal,
    pub target: Target,
    #[serde(with = "crate::hex_bytes")]
    pub payload: Vec<u8>,
}

impl ActionRequest {
    pub fn new(caller: Principal, target: Target, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            caller,
            target,
            payload: payload.into(),
        }
    }

    /// Selector prefix, or `None` for a payload too short to carry one.
    pub fn selector(&self) -> Option<Selector> {
        Selector::from_payload(&self.payload)
    }

    /// Argument bytes following the selector.
    pub fn args(&self) -> &[u8] {
        self.payload.get(SELECTOR_LEN..).unwrap_or(&[])
    }
}

/// How the vault should perform a forwarded call.
///
/// The relay only ever issues `Call`; `DelegateCall` exists so vault
/// backends can represent (and refuse) it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    #[default]
    Call,
    DelegateCall,
}

impl CallType {
    /// Numeric operation code used on the vault wire.
    pub fn as_u8(self) -> u8 {
        match self {
            CallType::Call => 0,
            CallType::DelegateCall => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;

    fn request(payload: Vec<u8>) -> ActionRequest {
        ActionRequest::new(
            Principal::new(Address::repeat_byte(2)),
            Target::new(Address::repeat_byte(3)),
            payload,
        )
    }

    #[test]
    fn splits_selector_and_args() {
        let req = request(vec![0xaa, 0xaa, 0xaa, 0xaa, 1, 2, 3]);
        assert_eq!(req.selector().unwrap().to_string(), "0xaaaaaaaa");
        assert_eq!(req.args(), &[1, 2, 3]);
    }

    #[test]
    fn selector_only_payload_has_empty_args() {
        let req = request(vec![0xa3, 0x08, 0x02, 0x5c]);
        assert!(req.selector().is_some());
        assert!(req.args().is_empty());
    }

    #[test]
    fn short_payload() {
        let req = request(vec![0x01]);
        assert!(req.selector().is_none());
        assert!(req.args().is_empty());
    }

    #[test]
    fn payload_serializes_as_hex() {
        let req = request(vec![0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["payload"], "0xdeadbeef");
    }

    #[test]
    fn call_type_wire_codes() {
        assert_eq!(CallType::Call.as_u8(), 0);
        assert_eq!(CallType::DelegateCall.as_u8(), 1);
        assert_eq!(CallType::default(), CallType::Call);
    }
}

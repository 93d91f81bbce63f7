use super::protocol::ContactFields;

const CONTACT_PRESSED: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub pressed: bool,
}

pub fn decode_contact(fields: ContactFields) -> ContactEvent {
    ContactEvent {
        pressed: fields.1 & CONTACT_PRESSED != 0,
    }
}

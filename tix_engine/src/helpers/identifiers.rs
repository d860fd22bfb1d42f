use rand::Rng;

pub const ORDER_NUMBER_PREFIX: &str = "ORD-";
pub const TICKET_NUMBER_PREFIX: &str = "TKT-";

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn random_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char).collect()
}

/// A fresh, human-shareable order number, e.g. `ORD-7K2Q9XBM4T`.
pub fn new_order_number() -> String {
    format!("{ORDER_NUMBER_PREFIX}{}", random_code(10))
}

pub fn new_ticket_number() -> String {
    format!("{TICKET_NUMBER_PREFIX}{}", random_code(12))
}

/// The payload encoded in a ticket's QR code.
///
/// The random nonce makes the payload impossible to derive from the ticket number, event and order alone.
pub fn qr_code_data(ticket_number: &str, event_id: i64, order_id: i64) -> String {
    let nonce: u64 = rand::thread_rng().gen();
    format!("{ticket_number}|{event_id}|{order_id}|{nonce:016x}")
}

mod identifiers;

pub use identifiers::{new_order_number, new_ticket_number, qr_code_data, ORDER_NUMBER_PREFIX, TICKET_NUMBER_PREFIX};

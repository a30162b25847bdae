//! Rule-based field extractors for proforma invoice templates.

pub mod amounts;
pub mod contacts;
pub mod dates;
pub mod identifiers;
pub mod patterns;
pub mod units;

pub use amounts::{cleanup_amount, detect_currency, find_total_amount};
pub use contacts::{billing_name, normalize_phone, shipping_fields};
pub use dates::{find_date, parse_date_token};
pub use identifiers::{
    find_order_number_from_rows, find_order_number_text, find_order_reference, same_row_right_value,
};
pub use patterns::PatternSet;
pub use units::find_units;

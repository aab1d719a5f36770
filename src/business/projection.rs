use serde_json::Value;

use crate::domain::lenient::format_number;
use crate::domain::{Order, StoreNote, STORE_PICKUP_METHOD};

/// Display columns, one cell each, in sheet order.
pub const DISPLAY_COLUMNS: [&str; 23] = [
    "Order Date (time zone GST)",
    "Order ID",
    "Order number",
    "Status",
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "SKU",
    "Quantity",
    "Item Price",
    "Billing Address",
    "Shipping Method",
    "Shipping Address",
    "Discount code",
    "Order Value",
    "Paid Amount",
    "Due Amount",
    "Payment Transaction ID",
    "Payment method",
    "Gift Message",
    "Fulfillment Status",
    "Stock Checking",
];

/// Trailing columns: fingerprint, then the operator-owned store note.
pub const NOTE_COLUMNS: [&str; 4] = [
    "Note Fingerprint",
    "Store Note Status",
    "Store Note",
    "Erply Invoice IDs",
];

/// Full header row.
pub fn header_row() -> Vec<Value> {
    DISPLAY_COLUMNS
        .iter()
        .chain(NOTE_COLUMNS.iter())
        .map(|name| Value::from(*name))
        .collect()
}

/// One sheet row derived from one order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub entity_id: i64,
    pub cells: Vec<Value>,
    pub fingerprint: String,
    pub note: StoreNote,
}

impl ExportRow {
    /// Cells in sheet order, display columns first.
    pub fn into_values(self) -> Vec<Value> {
        let mut values = self.cells;
        values.reserve(NOTE_COLUMNS.len());
        values.push(Value::from(self.fingerprint));
        values.push(Value::from(self.note.status));
        values.push(Value::from(self.note.note));
        values.push(Value::from(self.note.erply_invoice_ids));
        values
    }
}

/// Flattens orders into export rows.
pub struct RowProjector {
    pickup_method: String,
}

impl Default for RowProjector {
    fn default() -> Self {
        Self::new()
    }
}

impl RowProjector {
    pub fn new() -> Self {
        Self::with_pickup_method(STORE_PICKUP_METHOD)
    }

    /// Use a different shipping method code for in-store pickup.
    pub fn with_pickup_method(method: impl Into<String>) -> Self {
        Self {
            pickup_method: method.into(),
        }
    }

    /// Project an order into a row with an empty fingerprint and note.
    pub fn project(&self, order: &Order) -> ExportRow {
        let (skus, quantities, prices) = item_columns(order);

        let cells = vec![
            Value::from(order.created_at.clone()),
            Value::from(order.entity_id),
            Value::from(order.increment_id.clone()),
            Value::from(order.status.clone()),
            Value::from(order.customer_firstname.clone()),
            Value::from(order.customer_lastname.clone()),
            Value::from(order.customer_email.clone()),
            Value::from(order.billing_address.telephone.clone()),
            Value::from(skus),
            Value::from(quantities),
            Value::from(prices),
            Value::from(billing_address(order)),
            Value::from(order.shipping_description.clone()),
            Value::from(self.shipping_address(order)),
            Value::from(order.coupon_code.clone()),
            amount(order.grand_total),
            amount(order.total_paid),
            amount(order.total_due),
            Value::from(order.payment.transaction_id.clone()),
            Value::from(order.payment.method.clone()),
            Value::from(gift_message(order)),
            Value::from(order.extension_attributes.fulfillment_status.clone()),
            Value::from(order.extension_attributes.stock_checking.clone()),
        ];

        ExportRow {
            entity_id: order.entity_id,
            cells,
            fingerprint: String::new(),
            note: StoreNote::default(),
        }
    }

    /// Pickup orders show the pickup location (the shipping company); all
    /// others show street, city, region and phone.
    pub fn shipping_address(&self, order: &Order) -> String {
        let Some(shipping) = order.primary_shipping() else {
            return String::new();
        };
        let address = &shipping.address;

        if shipping.method == self.pickup_method {
            return address.company.clone();
        }

        format!(
            "{}, {}, {} (Phone: {})",
            address.street.join(", "),
            address.city,
            address.region,
            address.telephone
        )
    }
}

/// Comma-joined SKU, quantity and price lists over the sellable items, index-aligned.
pub fn item_columns(order: &Order) -> (String, String, String) {
    let mut skus = Vec::new();
    let mut quantities = Vec::new();
    let mut prices = Vec::new();

    for item in order.sellable_items() {
        skus.push(item.sku.clone());
        quantities.push(format_number(item.qty_ordered));
        prices.push(format_number(item.price));
    }

    (skus.join(","), quantities.join(","), prices.join(","))
}

pub fn billing_address(order: &Order) -> String {
    let billing = &order.billing_address;
    format!(
        "First Name: {}, Last Name: {}, Phone: {} \nAddress: {}, {}, {}",
        billing.firstname,
        billing.lastname,
        billing.telephone,
        billing.street.join(", "),
        billing.city,
        billing.region
    )
}

pub fn gift_message(order: &Order) -> String {
    match &order.extension_attributes.gift_message {
        Some(gift) => format!(
            "From: {}\nTo: {}\nMessage: {}\n",
            gift.sender, gift.recipient, gift.message
        ),
        None => String::new(),
    }
}

// Totals go to the sheet unchanged; integral values stay integers.
fn amount(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

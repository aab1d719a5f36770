use serde::{Deserialize, Serialize};

use crate::domain::lenient;

/// Product type of a top-level line item that is sold as-is.
pub const SIMPLE_PRODUCT_TYPE: &str = "simple";

/// Shipping method code of the in-store pickup carrier.
pub const STORE_PICKUP_METHOD: &str = "smilestoredelivery_smilestoredelivery";

/// An order as returned by the store's order search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    #[serde(deserialize_with = "lenient::integer")]
    pub entity_id: i64,
    #[serde(deserialize_with = "lenient::text")]
    pub increment_id: String,
    #[serde(deserialize_with = "lenient::text")]
    pub created_at: String,
    #[serde(deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(deserialize_with = "lenient::number")]
    pub grand_total: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub total_paid: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub total_due: f64,
    #[serde(deserialize_with = "lenient::text")]
    pub customer_firstname: String,
    #[serde(deserialize_with = "lenient::text")]
    pub customer_lastname: String,
    #[serde(deserialize_with = "lenient::text")]
    pub customer_email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub coupon_code: String,
    #[serde(deserialize_with = "lenient::text")]
    pub shipping_description: String,
    #[serde(deserialize_with = "nullable")]
    pub items: Vec<OrderItem>,
    #[serde(deserialize_with = "nullable")]
    pub payment: Payment,
    #[serde(deserialize_with = "nullable")]
    pub extension_attributes: ExtensionAttributes,
    #[serde(deserialize_with = "nullable")]
    pub billing_address: BillingAddress,
}

impl Order {
    /// Line items that appear in the export: child items of configurable
    /// products plus top-level simple products.
    pub fn sellable_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(|item| item.is_sellable())
    }

    /// The first shipping assignment, which drives the displayed address.
    pub fn primary_shipping(&self) -> Option<&Shipping> {
        self.extension_attributes
            .shipping_assignments
            .first()
            .map(|assignment| &assignment.shipping)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderItem {
    #[serde(deserialize_with = "lenient::text")]
    pub sku: String,
    #[serde(deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub qty_ordered: f64,
    #[serde(deserialize_with = "lenient::text")]
    pub product_type: String,
    #[serde(deserialize_with = "lenient::integer")]
    pub parent_item_id: i64,
}

impl OrderItem {
    pub fn is_sellable(&self) -> bool {
        self.parent_item_id > 0
            || (self.parent_item_id == 0 && self.product_type == SIMPLE_PRODUCT_TYPE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payment {
    #[serde(deserialize_with = "lenient::text")]
    pub method: String,
    #[serde(rename = "last_trans_id", deserialize_with = "lenient::text")]
    pub transaction_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingAddress {
    #[serde(deserialize_with = "lenient::text")]
    pub firstname: String,
    #[serde(deserialize_with = "lenient::text")]
    pub lastname: String,
    #[serde(deserialize_with = "lenient::text")]
    pub city: String,
    #[serde(deserialize_with = "lenient::text")]
    pub region: String,
    #[serde(deserialize_with = "lenient::text_list")]
    pub street: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub telephone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionAttributes {
    #[serde(deserialize_with = "nullable")]
    pub shipping_assignments: Vec<ShippingAssignment>,
    pub gift_message: Option<GiftMessage>,
    #[serde(deserialize_with = "lenient::text")]
    pub fulfillment_status: String,
    #[serde(deserialize_with = "lenient::text")]
    pub stock_checking: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingAssignment {
    #[serde(deserialize_with = "nullable")]
    pub shipping: Shipping,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shipping {
    #[serde(deserialize_with = "nullable")]
    pub address: ShippingAddress,
    #[serde(deserialize_with = "lenient::text")]
    pub method: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingAddress {
    #[serde(deserialize_with = "lenient::text")]
    pub city: String,
    #[serde(deserialize_with = "lenient::text")]
    pub company: String,
    #[serde(deserialize_with = "lenient::text")]
    pub country: String,
    #[serde(deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub region: String,
    #[serde(deserialize_with = "lenient::text_list")]
    pub street: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub telephone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GiftMessage {
    #[serde(deserialize_with = "lenient::text")]
    pub sender: String,
    #[serde(deserialize_with = "lenient::text")]
    pub recipient: String,
    #[serde(deserialize_with = "lenient::text")]
    pub message: String,
}

// `null` for a nested object or list decodes to its default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

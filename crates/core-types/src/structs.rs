use serde::{Deserialize, Serialize};

/// The billing address of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// A line of a purchase: a catalog product plus the quantity bought.
///
/// `quantity` belongs to the purchase line, not to the catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
}

/// A single purchase made by a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// Kept as stored; never parsed into a calendar type.
    pub date: String,
    pub items: Vec<Product>,
    pub total_amount: f64,
}

impl Purchase {
    /// Total number of units across every line of the purchase.
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

fn enabled() -> bool {
    true
}

/// Which channels the customer accepts messages on. Every channel is opted in
/// unless the record says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationPreferences {
    #[serde(default = "enabled")]
    pub email: bool,
    #[serde(default = "enabled")]
    pub sms: bool,
    #[serde(default = "enabled")]
    pub push_notifications: bool,
}

impl Default for CommunicationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            sms: true,
            push_notifications: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenProfile {
    #[serde(rename = "type")]
    pub garden_type: String,
    pub size: String,
    pub sun_exposure: String,
    pub soil_type: String,
    /// Ordered as stored.
    #[serde(default)]
    pub interests: Vec<String>,
}

/// The aggregate root: a customer with everything nested under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub account_number: String,
    pub customer_id: String,
    #[serde(rename = "customer_first_name")]
    pub first_name: String,
    #[serde(rename = "customer_last_name")]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(rename = "customer_start_date")]
    pub start_date: String,
    pub years_as_customer: i64,
    pub billing_address: Address,
    #[serde(default)]
    pub purchase_history: Vec<Purchase>,
    #[serde(default)]
    pub loyalty_points: i64,
    pub preferred_store: String,
    #[serde(default)]
    pub communication_preferences: CommunicationPreferences,
    #[serde(default)]
    pub garden_profile: Option<GardenProfile>,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_garden_profile(&self) -> bool {
        self.garden_profile.is_some()
    }

    /// Sum of `total_amount` over the whole purchase history.
    pub fn lifetime_spend(&self) -> f64 {
        self.purchase_history.iter().map(|p| p.total_amount).sum()
    }
}

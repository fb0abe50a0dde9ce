use serde::{Deserialize, Serialize};

/// Created exactly once per ended rental. Immutable after construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub rental_id: String,
    pub base_amount: f64,
    pub surcharges: f64,
    pub total: f64,
    pub description: String,
}

impl Payment {
    pub fn new(id: impl Into<String>, rental_id: impl Into<String>, base_amount: f64, surcharges: f64, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rental_id: rental_id.into(),
            base_amount,
            surcharges,
            total: base_amount + surcharges,
            description: description.into(),
        }
    }
}

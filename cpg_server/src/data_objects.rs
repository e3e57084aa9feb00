use serde::{Deserialize, Serialize};

/// The body of `PUT /api/cart/items`. The id is kept as a raw string so that the validator can reject it with a
/// helpful message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub course_id: String,
}

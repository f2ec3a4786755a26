//! Plan catalog handler.

use axum::Json;
use serde::Serialize;

use redecor_core::Plan;

/// One purchasable plan.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    /// Plan identifier, as accepted by purchase confirmation.
    pub id: Plan,
    /// Display name.
    pub name: &'static str,
    /// Price in US dollars.
    pub price_usd: u32,
    /// Credits granted.
    pub credits: i64,
    /// Feature list.
    pub features: &'static [&'static str],
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        Self {
            id: plan,
            name: plan.name(),
            price_usd: plan.price_usd(),
            credits: plan.credits(),
            features: plan.features(),
        }
    }
}

/// Plan catalog response.
#[derive(Debug, Serialize)]
pub struct ListPlansResponse {
    /// Plans, cheapest first.
    pub plans: Vec<PlanResponse>,
}

/// List purchasable plans.
pub async fn list_plans() -> Json<ListPlansResponse> {
    Json(ListPlansResponse {
        plans: Plan::all().into_iter().map(PlanResponse::from).collect(),
    })
}

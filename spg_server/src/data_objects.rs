use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spg_engine::{
    db_types::BasketSnapshot,
    offers::{BenefitType, DigitalBookBenefit},
    SpgatewayResponse,
};
use spgateway_tools::MpgResult;

/// The reply to the gateway's server-to-server notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyResponse {
    pub success: bool,
}

impl NotifyResponse {
    pub fn success() -> Self {
        Self { success: true }
    }

    pub fn failure() -> Self {
        Self { success: false }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutParams {
    pub email: Option<String>,
}

/// Optional discount to price into a bundle eligibility check, e.g. `?benefit=percentage&value=20`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenefitParams {
    pub benefit: Option<BenefitType>,
    pub value: Option<Decimal>,
}

impl BenefitParams {
    pub fn to_benefit(&self) -> Result<Option<DigitalBookBenefit>, String> {
        let benefit = match (self.benefit, self.value) {
            (None, None) => return Ok(None),
            (Some(BenefitType::Percentage), Some(v)) => DigitalBookBenefit::percentage(v),
            (Some(BenefitType::Fixed), Some(v)) => DigitalBookBenefit::fixed(v),
            _ => return Err("A benefit needs both a type and a value".to_string()),
        };
        benefit.map(Some).map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketLineSummary {
    pub title: String,
    pub sku: Option<String>,
    pub quantity: i64,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketSummary {
    pub id: i64,
    pub order_number: String,
    pub currency: String,
    pub total: Decimal,
    pub lines: Vec<BasketLineSummary>,
}

impl From<&BasketSnapshot> for BasketSummary {
    fn from(basket: &BasketSnapshot) -> Self {
        let lines = basket
            .lines
            .iter()
            .map(|l| BasketLineSummary {
                title: l.product_title.clone(),
                sku: l.partner_sku.clone(),
                quantity: l.quantity,
                unit_price: l.unit_price_incl_tax,
            })
            .collect();
        Self {
            id: basket.id(),
            order_number: basket.order_number().to_string(),
            currency: basket.currency().to_string(),
            total: basket.total_incl_tax(),
            lines,
        }
    }
}

/// What the customer callback shows the payer: the verified payment result and what it paid for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerPaymentResult {
    pub status: String,
    pub message: String,
    pub result: MpgResult,
    pub basket: BasketSummary,
}

impl CustomerPaymentResult {
    pub fn new(response: SpgatewayResponse, basket: &BasketSnapshot) -> Self {
        let trade_info = response.trade_info;
        Self {
            status: trade_info.status,
            message: trade_info.message,
            result: trade_info.result,
            basket: BasketSummary::from(basket),
        }
    }
}

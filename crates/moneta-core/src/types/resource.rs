//! Financial resource kinds.

use serde::{Deserialize, Serialize};

/// The kinds of financial data that can be shared and that emit activity
/// events: expenses, budgets, bills, categories, and payment methods.
///
/// The same enum is used as the `resource_type` of a shared resource and
/// as the `entity_type` of an activity event, so shares and events agree
/// on naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-types", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx-types",
    sqlx(type_name = "resource_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// An itemized expense record.
    Expense,
    /// A budget envelope.
    Budget,
    /// A recurring or one-off bill.
    Bill,
    /// A spending category.
    Category,
    /// A stored payment method.
    PaymentMethod,
}

impl ResourceKind {
    /// Return the kind as a lowercase snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Budget => "budget",
            Self::Bill => "bill",
            Self::Category => "category",
            Self::PaymentMethod => "payment_method",
        }
    }

    /// Human-readable noun used when rendering activity descriptions.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Budget => "budget",
            Self::Bill => "bill",
            Self::Category => "category",
            Self::PaymentMethod => "payment method",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = crate::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "budget" => Ok(Self::Budget),
            "bill" => Ok(Self::Bill),
            "category" => Ok(Self::Category),
            "payment_method" => Ok(Self::PaymentMethod),
            _ => Err(crate::AppError::validation(format!(
                "Invalid resource kind: '{s}'"
            ))),
        }
    }
}

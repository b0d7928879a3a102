use crate::models::TransactionType;

/// Render a transaction value with the sign its direction implies.
pub fn signed_value(kind: TransactionType, value: f64) -> String {
    match kind {
        TransactionType::Income => format!("{value:.2}"),
        TransactionType::Outcome => format!("-{value:.2}"),
    }
}

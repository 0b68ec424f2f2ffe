//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/categories/{category_id}', use [format_endpoint].

/// The root route which greets API clients.
pub const ROOT: &str = "/";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories/";
/// [CATEGORIES] without the trailing slash.
pub const CATEGORIES_NO_SLASH: &str = "/api/categories";
/// The route to delete a category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions/";
/// [TRANSACTIONS] without the trailing slash.
pub const TRANSACTIONS_NO_SLASH: &str = "/api/transactions";
/// The route to delete a transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the income and expense totals of one month.
pub const MONTHLY_SUMMARY: &str = "/api/transactions/summary/{month}";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/categories/{category_id}', '{category_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}

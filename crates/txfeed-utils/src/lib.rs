//! Formatting helpers for rendering the feed

use txfeed_core::{Employee, Transaction};

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    let grouped: String = result.chars().rev().collect();
    format!("{}{}", sign, grouped)
}

/// Format an amount as dollars, e.g. `-$1,234.50`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, format_number(cents / 100), cents % 100)
}

/// Picker label; the "All Employees" sentinel keeps its plain name
pub fn employee_label(employee: &Employee) -> String {
    if employee.is_all_employees() {
        employee.display_name()
    } else {
        format!("{} ({})", employee.display_name(), employee.id)
    }
}

/// One fixed-width row of the transaction table
pub fn transaction_row(transaction: &Transaction) -> String {
    format!(
        "{:<10} {:<10} {:>12}  {:<20} {:<24} {}",
        transaction.id,
        transaction.date,
        format_currency(transaction.amount),
        transaction.merchant,
        transaction.employee.display_name(),
        if transaction.approved { "approved" } else { "pending" }
    )
}

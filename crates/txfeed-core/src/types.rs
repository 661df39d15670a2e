//! Data model shared by the data source, the source caches and the feed

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Id carried by the "All Employees" pseudo-employee
pub const ALL_EMPLOYEES_ID: &str = "";

/// First page requested from the paginated transaction endpoint
pub const FIRST_PAGE: u32 = 1;

/// Employee record as served by the data source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    pub fn new(id: impl Into<String>, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// The sentinel that stands for "no employee filter"
    pub fn all_employees() -> Self {
        Self::new(ALL_EMPLOYEES_ID, "All", "Employees")
    }

    /// Whether this is the "All Employees" sentinel
    pub fn is_all_employees(&self) -> bool {
        self.id == ALL_EMPLOYEES_ID
    }

    /// Label shown in the employee picker
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Transaction record. `id` is the dedup key across every source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub employee: Employee,
    pub merchant: String,
    /// Transaction date (YYYY-MM-DD format)
    pub date: String,
    pub approved: bool,
}

impl Transaction {
    /// Get the transaction date as NaiveDate
    pub fn date_naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Whether this transaction belongs to the given employee
    pub fn belongs_to(&self, employee_id: &str) -> bool {
        self.employee.id == employee_id
    }
}

/// One page of the "all transactions" endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub data: Vec<Transaction>,
    /// `None` means this was the last page
    pub next_page: Option<u32>,
}

impl PageResult {
    pub fn new(data: Vec<Transaction>, next_page: Option<u32>) -> Self {
        Self { data, next_page }
    }

    /// Whether the endpoint has no page after this one
    pub fn is_last(&self) -> bool {
        self.next_page.is_none()
    }
}

/// Which transaction source is live
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "employeeId", rename_all = "snake_case")]
pub enum Selection {
    /// Browse every transaction, page by page
    AllEmployees,
    /// Every transaction of one employee, fetched in one call
    Employee(String),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::AllEmployees
    }
}

impl Selection {
    /// Map a picker value onto a selection. `None` and the sentinel both mean "all".
    pub fn from_employee(employee: Option<&Employee>) -> Self {
        match employee {
            Some(employee) if !employee.is_all_employees() => Selection::Employee(employee.id.clone()),
            _ => Selection::AllEmployees,
        }
    }

    pub fn employee_id(&self) -> Option<&str> {
        match self {
            Selection::AllEmployees => None,
            Selection::Employee(id) => Some(id),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::AllEmployees)
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::AllEmployees => write!(f, "all"),
            Selection::Employee(id) => write!(f, "employee:{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_employees_sentinel() {
        let all = Employee::all_employees();
        assert!(all.is_all_employees());
        assert_eq!(all.display_name(), "All Employees");
        assert!(!Employee::new("e1", "Ada", "Lovelace").is_all_employees());
    }

    #[test]
    fn test_selection_from_employee() {
        let ada = Employee::new("e1", "Ada", "Lovelace");
        assert_eq!(Selection::from_employee(None), Selection::AllEmployees);
        assert_eq!(Selection::from_employee(Some(&Employee::all_employees())), Selection::AllEmployees);
        assert_eq!(Selection::from_employee(Some(&ada)), Selection::Employee("e1".to_string()));
        assert_eq!(Selection::Employee("e1".to_string()).employee_id(), Some("e1"));
        assert!(Selection::default().is_all());
    }

    #[test]
    fn test_transaction_json_shape() {
        let json = r#"{
            "id": "t1",
            "amount": 12.5,
            "employee": { "id": "e1", "firstName": "Ada", "lastName": "Lovelace" },
            "merchant": "Coffee Shop",
            "date": "2024-06-15",
            "approved": false
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.employee.first_name, "Ada");
        assert!(tx.belongs_to("e1"));
        assert_eq!(tx.date_naive(), NaiveDate::from_ymd_opt(2024, 6, 15));

        let page: PageResult = serde_json::from_str(r#"{ "data": [], "nextPage": null }"#).unwrap();
        assert!(page.is_last());
    }
}

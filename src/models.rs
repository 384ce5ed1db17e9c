// Data models for EmployeeStore

use serde::{Deserialize, Serialize};

/// Column names of the employee table, in export order
pub const COLUMNS: [&str; 3] = ["id", "name", "email"];

/// A single employee row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Employee {
    /// Assigned by the store on creation, never reused
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl Employee {
    pub fn new(id: i64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Fields as strings, in the same order as [`COLUMNS`]
    pub fn to_fields(&self) -> [String; 3] {
        [self.id.to_string(), self.name.clone(), self.email.clone()]
    }
}

impl std::fmt::Display for Employee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} <{}>", self.id, self.name, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_fields_follow_column_order() {
        let employee = Employee::new(7, "Alice", "a@x.com");
        assert_eq!(employee.to_fields(), ["7", "Alice", "a@x.com"]);
        assert_eq!(COLUMNS, ["id", "name", "email"]);
    }

    #[test]
    fn test_employee_display() {
        let employee = Employee::new(1, "Bob", "b@x.com");
        assert_eq!(employee.to_string(), "1: Bob <b@x.com>");
    }

    #[test]
    fn test_employee_serialization() {
        let employee = Employee::new(3, "Carol", "c@x.com");
        let json = serde_json::to_string(&employee).unwrap();
        assert_eq!(json, r#"{"id":3,"name":"Carol","email":"c@x.com"}"#);

        let deserialized: Employee = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, employee);
    }
}

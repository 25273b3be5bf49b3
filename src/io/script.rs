use anyhow::{Context, Result};
use std::io::Read;

use crate::application::Request;
use crate::domain::{CartLine, Role};

/// Read a session script: a JSON array of gateway requests.
pub fn read_script<R: Read>(reader: R) -> Result<Vec<Request>> {
    serde_json::from_reader(reader).context("Invalid request script (expected a JSON array of requests)")
}

/// The walkthrough session: an admin looks at stock, a cashier rings up a
/// sale and is refused the bill history, then an admin reads it.
pub fn demo_script() -> Vec<Request> {
    vec![
        Request::Login {
            username: "Lucky".to_string(),
            role: Role::Admin,
        },
        Request::Inventory,
        Request::Login {
            username: "Bob".to_string(),
            role: Role::Cashier,
        },
        Request::Checkout {
            bill_id: 1001,
            total: 6000,
            date: None,
            items: vec![CartLine::new(1, 2), CartLine::new(3, 1)],
        },
        Request::Bills,
        Request::Login {
            username: "SuperAdmin".to_string(),
            role: Role::Admin,
        },
        Request::Bills,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_script() {
        let script = r#"[
            {"op": "login", "username": "Bob", "role": "cashier"},
            {"op": "low_stock"},
            {"op": "restock", "product_id": 3, "quantity": 5}
        ]"#;
        let requests = read_script(script.as_bytes()).unwrap();

        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1], Request::LowStock { threshold: None });
        assert_eq!(
            requests[2],
            Request::Restock {
                product_id: 3,
                quantity: 5
            }
        );
    }

    #[test]
    fn test_unknown_op_is_an_error() {
        let err = read_script(r#"[{"op": "refund"}]"#.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Invalid request script"));
    }
}

// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use stockroom::application::{Gateway, PosService, ServiceConfig};
use stockroom::domain::{CartLine, CheckoutRequest, Operator, ProductId, TotalPolicy};

/// Helper to create a service over the built-in demo stock
pub fn test_service() -> Result<PosService> {
    Ok(PosService::seeded(ServiceConfig::default())?)
}

/// Helper to create a seeded service with a specific total policy
pub fn test_service_with_policy(total_policy: TotalPolicy) -> Result<PosService> {
    Ok(PosService::seeded(ServiceConfig {
        total_policy,
        ..ServiceConfig::default()
    })?)
}

/// Helper to create a gateway with nobody logged in
pub fn test_gateway() -> Result<Gateway> {
    Ok(Gateway::new(Arc::new(test_service()?), parse_date("2023-11-21")))
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Build a checkout request dated 2023-11-21
pub fn cart(bill_id: u64, total: i64, lines: &[(ProductId, i64)]) -> CheckoutRequest {
    CheckoutRequest {
        bill_id,
        asserted_total: total,
        date: parse_date("2023-11-21"),
        cart: lines
            .iter()
            .map(|&(product_id, quantity)| CartLine::new(product_id, quantity))
            .collect(),
    }
}

/// Stock of a product, panicking if it is missing
pub async fn stock_of(service: &PosService, id: ProductId) -> u32 {
    service.product(id).await.unwrap().stock
}

pub fn admin() -> Operator {
    Operator::admin("Lucky")
}

pub fn cashier() -> Operator {
    Operator::cashier("Bob")
}

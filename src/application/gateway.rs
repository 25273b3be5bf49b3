//! Request/response front door for scripted sessions.
//!
//! A [`Gateway`] holds the current operator and turns JSON-shaped
//! [`Request`]s into [`Response`]s. Every failure becomes a
//! [`Response::Error`], so a script keeps running after a refused step.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info};

use crate::domain::{
    Bill, BillId, CartLine, Cents, CheckoutOutcome, CheckoutRequest, LineFailure, Operator,
    Product, ProductId, Role, money,
};

use super::{AppError, PosService, SalesSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Login {
        username: String,
        role: Role,
    },
    Logout,
    Inventory,
    Search {
        term: String,
    },
    LowStock {
        #[serde(default)]
        threshold: Option<u32>,
    },
    Checkout {
        bill_id: BillId,
        #[serde(with = "money::decimal")]
        total: Cents,
        #[serde(default)]
        date: Option<NaiveDate>,
        items: Vec<CartLine>,
    },
    Bills,
    Summary,
    AddProduct {
        #[serde(flatten)]
        product: Product,
    },
    SetPrice {
        product_id: ProductId,
        #[serde(with = "money::decimal")]
        price: Cents,
    },
    Restock {
        product_id: ProductId,
        quantity: u32,
    },
}

impl Request {
    pub fn op(&self) -> &'static str {
        match self {
            Request::Login { .. } => "login",
            Request::Logout => "logout",
            Request::Inventory => "inventory",
            Request::Search { .. } => "search",
            Request::LowStock { .. } => "low_stock",
            Request::Checkout { .. } => "checkout",
            Request::Bills => "bills",
            Request::Summary => "summary",
            Request::AddProduct { .. } => "add_product",
            Request::SetPrice { .. } => "set_price",
            Request::Restock { .. } => "restock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Operator {
        username: String,
        role: Role,
        banner: String,
    },
    LoggedOut,
    Inventory {
        products: Vec<Product>,
    },
    Committed {
        bill: Bill,
    },
    Rejected {
        bill_id: BillId,
        failed_product_ids: BTreeSet<ProductId>,
        failures: Vec<LineFailure>,
    },
    Bills {
        bills: Vec<Bill>,
    },
    Summary {
        summary: SalesSummary,
    },
    Product {
        product: Product,
    },
    Error {
        message: String,
    },
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

impl From<CheckoutOutcome> for Response {
    fn from(outcome: CheckoutOutcome) -> Self {
        match outcome {
            CheckoutOutcome::Committed(bill) => Response::Committed { bill },
            CheckoutOutcome::Rejected(rejection) => Response::Rejected {
                bill_id: rejection.bill_id,
                failed_product_ids: rejection.failed_product_ids(),
                failures: rejection.failures,
            },
        }
    }
}

pub struct Gateway {
    service: Arc<PosService>,
    operator: Option<Operator>,
    default_date: NaiveDate,
}

impl Gateway {
    /// `default_date` stamps bills whose request carries no date.
    pub fn new(service: Arc<PosService>, default_date: NaiveDate) -> Self {
        Self {
            service,
            operator: None,
            default_date,
        }
    }

    pub fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    pub async fn handle(&mut self, request: Request) -> Response {
        let span = tracing::info_span!("request", op = request.op());
        async move {
            match self.dispatch(request).await {
                Ok(response) => response,
                Err(err) => Response::Error {
                    message: err.to_string(),
                },
            }
        }
        .instrument(span)
        .await
    }

    /// Handle a batch of requests in order, one response per request.
    pub async fn run_script(&mut self, requests: Vec<Request>) -> Vec<Response> {
        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            responses.push(self.handle(request).await);
        }
        responses
    }

    async fn dispatch(&mut self, request: Request) -> Result<Response, AppError> {
        match request {
            Request::Login { username, role } => {
                let operator = Operator::new(username, role);
                info!(username = %operator.username, %role, "Operator logged in");
                let response = Response::Operator {
                    username: operator.username.clone(),
                    role,
                    banner: operator.describe(),
                };
                self.operator = Some(operator);
                Ok(response)
            }

            Request::Logout => {
                self.operator = None;
                Ok(Response::LoggedOut)
            }

            Request::Inventory => Ok(Response::Inventory {
                products: self.service.inventory_snapshot().await,
            }),

            Request::Search { term } => Ok(Response::Inventory {
                products: self.service.search_products(&term).await,
            }),

            Request::LowStock { threshold } => Ok(Response::Inventory {
                products: self.service.low_stock(threshold).await,
            }),

            Request::Checkout {
                bill_id,
                total,
                date,
                items,
            } => {
                self.current_operator()?;
                let request = CheckoutRequest {
                    bill_id,
                    asserted_total: total,
                    date: date.unwrap_or(self.default_date),
                    cart: items,
                };
                Ok(self.service.checkout(request).await?.into())
            }

            Request::Bills => {
                let bills = self.service.bill_history(self.current_operator()?).await?;
                Ok(Response::Bills { bills })
            }

            Request::Summary => {
                let summary = self.service.sales_summary(self.current_operator()?).await?;
                Ok(Response::Summary { summary })
            }

            Request::AddProduct { product } => {
                let product = self
                    .service
                    .add_product(self.current_operator()?, product)
                    .await?;
                Ok(Response::Product { product })
            }

            Request::SetPrice { product_id, price } => {
                let product = self
                    .service
                    .set_price(self.current_operator()?, product_id, price)
                    .await?;
                Ok(Response::Product { product })
            }

            Request::Restock {
                product_id,
                quantity,
            } => {
                let product = self
                    .service
                    .restock(self.current_operator()?, product_id, quantity)
                    .await?;
                Ok(Response::Product { product })
            }
        }
    }

    fn current_operator(&self) -> Result<&Operator, AppError> {
        self.operator.as_ref().ok_or(AppError::NotLoggedIn)
    }
}

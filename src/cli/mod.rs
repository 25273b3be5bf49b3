mod logging;

pub use logging::setup_tracing;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, Write, stdin, stdout};
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::{
    DEFAULT_LOW_STOCK_THRESHOLD, Gateway, PosService, Request, Response, ServiceConfig,
};
use crate::domain::{
    CartLine, Catalog, CheckoutOutcome, CheckoutRequest, Operator, Product, ProductId, Role,
    TotalPolicy, demo_catalog, format_cents, parse_cents,
};
use crate::io::{
    StoreExport, demo_script, export_bills_csv, export_inventory_csv, export_json,
    load_catalog_csv, read_script,
};

/// Stockroom - inventory and point-of-sale ledger
#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "An in-memory inventory and point-of-sale ledger")]
#[command(version)]
pub struct Cli {
    /// Catalog CSV file (id,name,price,stock,category); built-in stock when omitted
    #[arg(short, long, global = true)]
    pub catalog: Option<PathBuf>,

    /// How bill totals are settled: asserted, recompute, verify
    #[arg(long, global = true, default_value = "asserted")]
    pub total_policy: TotalPolicy,

    /// Products with stock below this count are reported as low
    #[arg(long, global = true, default_value_t = DEFAULT_LOW_STOCK_THRESHOLD)]
    pub low_stock_threshold: u32,

    /// Date stamped on bills (YYYY-MM-DD, defaults to today)
    #[arg(long, global = true)]
    pub date: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the inventory
    Inventory {
        /// Only products whose name contains this text
        #[arg(long)]
        search: Option<String>,

        /// Only products below the low-stock threshold
        #[arg(long)]
        low: bool,

        /// Output format: table, json
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Process a single checkout against the catalog
    Checkout {
        /// Bill number (must be unique)
        #[arg(long)]
        bill_id: u64,

        /// Bill total (e.g., "60.00")
        #[arg(long)]
        total: String,

        /// Cart line as PRODUCT_ID:QUANTITY (repeatable)
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,

        /// Operator name
        #[arg(long, default_value = "cashier")]
        user: String,

        /// Operator role: admin, cashier
        #[arg(long, default_value = "cashier")]
        role: String,

        /// Output format: table, json
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Replay the walkthrough session (admin, cashier sale, reports)
    Demo,

    /// Run a JSON request script and print one JSON response per line
    Run {
        /// Script file (stdin if omitted or "-")
        script: Option<String>,
    },

    /// Export data to CSV or JSON
    Export {
        /// What to export: inventory, bills, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Format: csv, json (default: csv for inventory and bills, json for full)
        #[arg(short, long)]
        format: Option<String>,

        /// Request script to run before exporting
        #[arg(long)]
        script: Option<String>,

        /// Operator name
        #[arg(long, default_value = "admin")]
        user: String,

        /// Operator role: admin, cashier (exports need admin)
        #[arg(long, default_value = "admin")]
        role: String,
    },
}

impl Cli {
    fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open catalog file: {}", path.display()))?;
                load_catalog_csv(BufReader::new(file))
                    .with_context(|| format!("Failed to load catalog: {}", path.display()))
            }
            None => Ok(demo_catalog()?),
        }
    }

    fn service(&self) -> Result<Arc<PosService>> {
        let config = ServiceConfig {
            total_policy: self.total_policy,
            low_stock_threshold: self.low_stock_threshold,
        };
        Ok(Arc::new(PosService::new(self.load_catalog()?, config)))
    }

    fn bill_date(&self) -> Result<NaiveDate> {
        match &self.date {
            Some(date_str) => parse_date(date_str)
                .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)),
            None => Ok(Utc::now().date_naive()),
        }
    }

    pub async fn run(self) -> Result<()> {
        setup_tracing(self.verbose);

        let service = self.service()?;
        let date = self.bill_date()?;

        match self.command {
            Commands::Inventory {
                search,
                low,
                format,
            } => {
                let products = match (search, low) {
                    (Some(term), _) => service.search_products(&term).await,
                    (None, true) => service.low_stock(None).await,
                    (None, false) => service.inventory_snapshot().await,
                };
                match format.as_str() {
                    "json" => export_json(&products, stdout())?,
                    "table" => print_inventory(&products, self.low_stock_threshold),
                    other => bail!("Unknown format '{}'. Use table or json", other),
                }
            }

            Commands::Checkout {
                bill_id,
                total,
                items,
                user,
                role,
                format,
            } => {
                let role = parse_role(&role)?;
                let asserted_total =
                    parse_cents(&total).context("Invalid total format. Use '60.00' or '60'")?;
                let cart = items
                    .iter()
                    .map(|item| parse_cart_line(item))
                    .collect::<Result<Vec<_>>>()?;

                run_checkout_command(
                    &service,
                    Operator::new(user, role),
                    CheckoutRequest {
                        bill_id,
                        asserted_total,
                        date,
                        cart,
                    },
                    &format,
                )
                .await?;
            }

            Commands::Demo => {
                run_demo_command(service, date).await?;
            }

            Commands::Run { script } => {
                let requests = read_requests(script.as_deref())?;
                let mut gateway = Gateway::new(service, date);
                let mut out = stdout().lock();
                for request in requests {
                    let response = gateway.handle(request).await;
                    serde_json::to_writer(&mut out, &response)?;
                    writeln!(out)?;
                }
            }

            Commands::Export {
                export_type,
                output,
                format,
                script,
                user,
                role,
            } => {
                let operator = Operator::new(user, parse_role(&role)?);
                if let Some(script) = script {
                    let requests = read_requests(Some(&script))?;
                    let mut gateway = Gateway::new(service.clone(), date);
                    let failed = gateway
                        .run_script(requests)
                        .await
                        .iter()
                        .filter(|r| r.is_error())
                        .count();
                    if failed > 0 {
                        eprintln!("Warning: {} scripted request(s) failed", failed);
                    }
                }
                run_export_command(
                    &service,
                    &operator,
                    &export_type,
                    output.as_deref(),
                    format.as_deref(),
                )
                .await?;
            }
        }

        Ok(())
    }
}

async fn run_checkout_command(
    service: &PosService,
    operator: Operator,
    request: CheckoutRequest,
    format: &str,
) -> Result<()> {
    let outcome = service.checkout(request).await?;

    if format == "json" {
        return export_json(&Response::from(outcome), stdout());
    }

    println!("{}", operator.describe());
    match outcome {
        CheckoutOutcome::Committed(bill) => {
            println!(
                "Bill #{} saved: {} ({} line(s), {})",
                bill.id,
                format_cents(bill.total),
                bill.items.len(),
                bill.date
            );
            println!();
            println!("{:<20} {:>10} {:>5} {:>10} {:>7}", "PRODUCT", "PRICE", "QTY", "AMOUNT", "LEFT");
            println!("{}", "-".repeat(56));
            for item in &bill.items {
                let left = service.product(item.product_id).await?.stock;
                println!(
                    "{:<20} {:>10} {:>5} {:>10} {:>7}",
                    truncate(&item.product_name, 20),
                    format_cents(item.unit_price),
                    item.quantity,
                    item.line_total().map(format_cents).unwrap_or_default(),
                    left
                );
            }
        }
        CheckoutOutcome::Rejected(rejection) => {
            println!(
                "Bill #{} cancelled due to stock issues. No stock was changed.",
                rejection.bill_id
            );
            for failure in &rejection.failures {
                println!(
                    "  line {}: product {}: {}",
                    failure.line + 1,
                    failure.product_id,
                    failure.error
                );
            }
        }
    }
    Ok(())
}

async fn run_demo_command(service: Arc<PosService>, date: NaiveDate) -> Result<()> {
    let mut gateway = Gateway::new(service, date);

    for request in demo_script() {
        println!(">>> {}", describe_request(&request));
        let response = gateway.handle(request).await;
        match &response {
            Response::Operator { banner, .. } => println!("{}", banner),
            Response::Error { message } => println!("[DENIED] {}", message),
            other => println!("{}", serde_json::to_string_pretty(other)?),
        }
        println!();
    }
    Ok(())
}

async fn run_export_command(
    service: &PosService,
    operator: &Operator,
    export_type: &str,
    output: Option<&str>,
    format: Option<&str>,
) -> Result<()> {
    let snapshot = service.snapshot(operator).await?;

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let format = format.unwrap_or(if export_type == "full" { "json" } else { "csv" });
    let count = match (export_type, format) {
        ("inventory", "csv") => export_inventory_csv(&snapshot.products, writer)?,
        ("inventory", "json") => {
            export_json(&snapshot.products, writer)?;
            snapshot.products.len()
        }
        ("bills", "csv") => export_bills_csv(&snapshot.bills, writer)?,
        ("bills", "json") => {
            export_json(&snapshot.bills, writer)?;
            snapshot.bills.len()
        }
        ("full", "json") => {
            let count = snapshot.products.len() + snapshot.bills.len();
            export_json(&StoreExport::new(snapshot.products, snapshot.bills), writer)?;
            count
        }
        ("inventory" | "bills" | "full", other) => {
            bail!("Format '{}' is not supported for '{}' exports", other, export_type)
        }
        (other, _) => bail!(
            "Unknown export type '{}'. Use inventory, bills or full",
            other
        ),
    };

    if let Some(path) = output {
        eprintln!("Exported {} record(s) to {}", count, path);
    }
    Ok(())
}

fn print_inventory(products: &[Product], low_stock_threshold: u32) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }

    println!(
        "{:>4}  {:<20} {:<12} {:>10} {:>7}",
        "ID", "NAME", "CATEGORY", "PRICE", "STOCK"
    );
    println!("{}", "-".repeat(58));
    for product in products {
        let marker = if product.is_out_of_stock() {
            "  out"
        } else if product.is_low_stock(low_stock_threshold) {
            "  low"
        } else {
            ""
        };
        println!(
            "{:>4}  {:<20} {:<12} {:>10} {:>7}{}",
            product.id,
            truncate(&product.name, 20),
            truncate(&product.category, 12),
            format_cents(product.price),
            product.stock,
            marker
        );
    }
}

fn describe_request(request: &Request) -> String {
    match request {
        Request::Login { username, role } => format!("login {} ({})", username, role),
        Request::Checkout { bill_id, items, .. } => {
            format!("checkout bill #{} ({} line(s))", bill_id, items.len())
        }
        other => other.op().replace('_', " "),
    }
}

fn read_requests(path: Option<&str>) -> Result<Vec<Request>> {
    match path {
        None | Some("-") => read_script(stdin().lock()),
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script file: {}", path))?;
            read_script(BufReader::new(file))
        }
    }
}

fn parse_role(role: &str) -> Result<Role> {
    Role::from_str(role)
        .ok_or_else(|| anyhow!("Invalid role '{}'. Valid roles: admin, cashier", role))
}

/// Parse a `PRODUCT_ID:QUANTITY` cart argument.
fn parse_cart_line(item: &str) -> Result<CartLine> {
    let (id, quantity) = item
        .split_once(':')
        .ok_or_else(|| anyhow!("Invalid cart item '{}'. Use PRODUCT_ID:QUANTITY", item))?;
    let product_id: ProductId = id
        .trim()
        .parse()
        .with_context(|| format!("Invalid product id in '{}'", item))?;
    let quantity: i64 = quantity
        .trim()
        .parse()
        .with_context(|| format!("Invalid quantity in '{}'", item))?;
    Ok(CartLine::new(product_id, quantity))
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cart_line() {
        assert_eq!(parse_cart_line("1:2").unwrap(), CartLine::new(1, 2));
        assert_eq!(parse_cart_line(" 3 : -1 ").unwrap(), CartLine::new(3, -1));
        assert!(parse_cart_line("1").is_err());
        assert!(parse_cart_line("x:2").is_err());
        assert!(parse_cart_line("1:two").is_err());
    }

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("Admin").unwrap(), Role::Admin);
        assert!(parse_role("manager").is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Desk Lamp", 20), "Desk Lamp");
        assert_eq!(truncate("Pastel Notebook Deluxe Edition", 10), "Pastel ...");
    }

    #[test]
    fn test_cli_parses_export_operator() {
        let cli = Cli::try_parse_from(["stockroom", "export", "bills"]).unwrap();
        let Commands::Export { user, role, .. } = cli.command else {
            panic!("expected export");
        };
        assert_eq!((user.as_str(), role.as_str()), ("admin", "admin"));

        let cli =
            Cli::try_parse_from(["stockroom", "export", "bills", "--user", "Bob", "--role", "cashier"])
                .unwrap();
        let Commands::Export { user, role, .. } = cli.command else {
            panic!("expected export");
        };
        assert_eq!((user.as_str(), role.as_str()), ("Bob", "cashier"));
    }

    #[tokio::test]
    async fn test_export_is_gated_by_operator_role() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("inventory.csv");
        let path = path.to_str().unwrap();
        let service = PosService::new(demo_catalog().unwrap(), ServiceConfig::default());

        let err = run_export_command(
            &service,
            &Operator::cashier("Bob"),
            "inventory",
            Some(path),
            None,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Access denied"));
        assert!(!std::path::Path::new(path).exists());

        run_export_command(&service, &Operator::admin("Lucky"), "inventory", Some(path), None)
            .await
            .unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 8);
    }

    #[test]
    fn test_cli_parses_checkout() {
        let cli = Cli::try_parse_from([
            "stockroom",
            "--total-policy",
            "verify",
            "checkout",
            "--bill-id",
            "1001",
            "--total",
            "60.00",
            "-i",
            "1:2",
            "-i",
            "3:1",
        ])
        .unwrap();

        assert_eq!(cli.total_policy, TotalPolicy::Verify);
        let Commands::Checkout { bill_id, items, .. } = cli.command else {
            panic!("expected checkout");
        };
        assert_eq!(bill_id, 1001);
        assert_eq!(items, vec!["1:2", "3:1"]);
    }
}

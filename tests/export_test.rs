mod common;

use std::fs::File;
use std::io::BufReader;

use anyhow::Result;
use common::{admin, cart, test_service};
use stockroom::application::{PosService, ServiceConfig};
use stockroom::io::{StoreExport, export_bills_csv, export_inventory_csv, export_json, load_catalog_csv};
use tempfile::TempDir;

#[tokio::test]
async fn test_exported_inventory_loads_back_as_catalog() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("inventory.csv");
    let service = test_service()?;
    service.checkout(cart(1001, 6000, &[(1, 2), (3, 1)])).await?;

    let snapshot = service.snapshot(&admin()).await?;
    let count = export_inventory_csv(&snapshot.products, File::create(&path)?)?;
    assert_eq!(count, 7);

    let catalog = load_catalog_csv(BufReader::new(File::open(&path)?))?;
    let reloaded = PosService::new(catalog, ServiceConfig::default());

    assert_eq!(reloaded.inventory_snapshot().await, snapshot.products);
    assert_eq!(reloaded.product(1).await?.stock, 43);
    assert_eq!(reloaded.product(3).await?.price, 3500);
    Ok(())
}

#[tokio::test]
async fn test_bills_export_to_csv_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("bills.csv");
    let service = test_service()?;
    service.checkout(cart(1001, 6000, &[(1, 2), (3, 1)])).await?;
    service.checkout(cart(1002, 350, &[(7, 1)])).await?;

    let snapshot = service.snapshot(&admin()).await?;
    let rows = export_bills_csv(&snapshot.bills, File::create(&path)?)?;
    assert_eq!(rows, 3);

    let text = std::fs::read_to_string(&path)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[3], "1002,2023-11-21,3.50,7,Energy Bar,3.50,1,3.50");
    Ok(())
}

#[tokio::test]
async fn test_full_json_export_reads_back() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("store.json");
    let service = test_service()?;
    service.checkout(cart(1001, 6000, &[(1, 2), (3, 1)])).await?;

    let snapshot = service.snapshot(&admin()).await?;
    let export = StoreExport::new(snapshot.products.clone(), snapshot.bills.clone());
    export_json(&export, File::create(&path)?)?;

    let read: StoreExport = serde_json::from_reader(BufReader::new(File::open(&path)?))?;
    assert_eq!(read.products, snapshot.products);
    assert_eq!(read.bills, snapshot.bills);

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(raw["bills"][0]["total"], "60.00");
    Ok(())
}

#[tokio::test]
async fn test_bad_catalog_file_reports_every_row() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("catalog.csv");
    std::fs::write(
        &path,
        "id,name,price,stock,category\n\
         1,Pastel Notebook,12.50,45,Stationery\n\
         2,Gel Pen Set,eight,12,Stationery\n\
         3,,35.00,8,Electronics\n",
    )?;

    let err = load_catalog_csv(BufReader::new(File::open(&path)?)).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("line 3"));
    assert!(message.contains("line 4"));
    Ok(())
}

#[tokio::test]
async fn test_cashier_cannot_export() -> Result<()> {
    let service = test_service()?;
    assert!(service.snapshot(&common::cashier()).await.is_err());
    Ok(())
}

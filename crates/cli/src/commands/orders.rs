//! Order inspection commands.
//!
//! # Usage
//!
//! ```bash
//! ss-cli orders list
//! ss-cli orders list -e runner@example.com -l 5
//! ss-cli orders show SNK1234567
//! ```

use sneaker_store_core::{Email, OrderNumber};
use sneaker_store_storefront::db::{OrderRepository, OrderStore};

use super::{CliError, connect};

/// Print the most recent orders, newest first.
///
/// # Errors
///
/// Returns an error if `email` is invalid or the query fails.
pub async fn list(email: Option<&str>, limit: u32) -> Result<(), CliError> {
    let email = email
        .map(Email::parse)
        .transpose()
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    let pool = connect().await?;
    let orders = OrderRepository::new(pool);
    let summaries = orders.list_recent(email.as_ref(), limit).await?;

    #[allow(clippy::print_stdout)]
    {
        if summaries.is_empty() {
            println!("No orders found");
        }
        for order in &summaries {
            println!(
                "{}  {}  {:<28}  {:<10}  {:<4}  {:>3} item(s)  {}",
                order.number,
                order.order_date.format("%Y-%m-%d %H:%M"),
                order.email,
                order.status.as_str(),
                order.payment_method.as_str(),
                order.item_count,
                order.total_amount,
            );
        }
    }
    Ok(())
}

/// Print one order with its address and line items.
///
/// # Errors
///
/// Returns an error if the number is malformed, the order does not exist,
/// or the query fails.
pub async fn show(number: &str) -> Result<(), CliError> {
    let number =
        OrderNumber::parse(number).map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    let pool = connect().await?;
    let orders = OrderRepository::new(pool);
    let order = orders
        .get_by_number(&number)
        .await?
        .ok_or_else(|| CliError::NotFound(format!("order {number}")))?;

    #[allow(clippy::print_stdout)]
    {
        println!("Order {}", order.number);
        println!("  Placed:   {}", order.order_date.to_rfc3339());
        println!("  Email:    {}", order.email);
        println!("  Status:   {}", order.status);
        println!(
            "  Payment:  {} (paid: {})",
            order.payment_method.label(),
            order.payment_status
        );
        if let Some(transaction_id) = &order.transaction_id {
            println!("  Txn:      {transaction_id}");
        }
        let a = &order.address;
        println!("  Ship to:  {} {} ({})", a.first_name, a.last_name, a.phone);
        println!("            {}, {}, {} {}", a.address, a.city, a.state, a.pincode);
        if !a.landmark.is_empty() {
            println!("            Near {}", a.landmark);
        }
        println!("  Items:");
        for item in &order.items {
            println!(
                "    {} x {} ({})  {}",
                item.quantity,
                item.product_name,
                item.brand,
                item.line_total()
            );
        }
        println!("  Total:    {}", order.total_amount);
    }
    Ok(())
}

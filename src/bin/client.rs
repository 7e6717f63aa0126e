use std::env;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

/// Staff client for the back-office server
#[derive(Parser, Debug)]
#[command(name = "tavola")]
#[command(about = "client cli used by restaurant staffs to interact with the server", version, long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// show the bill of an order
    #[command(arg_required_else_help = true)]
    Order { order_id: String },
    /// show an invoice with its order details
    #[command(arg_required_else_help = true)]
    Invoice { invoice_id: String },
    /// list foods page by page
    Foods(FoodsArgs),
}

#[derive(Debug, Args)]
struct FoodsArgs {
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
    #[arg(short = 'n', long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    per_page: u32,
}

const DEFAULT_SERVER_HOST: &str = "http://localhost:8080";

#[derive(Debug, Deserialize)]
struct OrderLine {
    food_name: Option<String>,
    price: Option<f64>,
    quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OrderView {
    table_number: Option<i64>,
    payment_due: f64,
    total_count: u64,
    order_items: Vec<OrderLine>,
}

#[derive(Debug, Deserialize)]
struct InvoiceView {
    invoice_id: String,
    order_id: String,
    payment_method: Option<String>,
    payment_status: String,
    payment_due_date: String,
    payment_due: f64,
    table_number: Option<i64>,
    order_details: Vec<OrderLine>,
}

#[derive(Debug, Deserialize)]
struct Food {
    food_id: String,
    name: String,
    price: f64,
}

#[derive(Debug, Deserialize)]
struct FoodsPage {
    total_count: usize,
    food_items: Vec<Food>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

fn print_lines(lines: &[OrderLine]) {
    for line in lines {
        println!(
            "  {:<30} {:>8} x{}",
            line.food_name.as_deref().unwrap_or("<removed>"),
            line.price.map_or("-".to_string(), |p| format!("{p:.2}")),
            line.quantity.unwrap_or(0),
        );
    }
}

fn table_label(table_number: Option<i64>) -> String {
    table_number.map_or("takeaway".to_string(), |n| format!("table {n}"))
}

async fn report_failure(res: Response) -> Result<(), anyhow::Error> {
    match res.status() {
        StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST | StatusCode::INTERNAL_SERVER_ERROR => {
            let status = res.status();
            let body = res.json::<ErrorBody>().await?;
            println!("request failed ({}), {}", status, body.error);
        }
        unexpected => {
            println!("got unexpected status code, {}", unexpected);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();
    let host = env::var("SERVER_HOST").unwrap_or(DEFAULT_SERVER_HOST.to_string());
    let client = Client::new();

    match args.command {
        Commands::Order { order_id } => {
            let res = client
                .get(format!("{}/orderItems-order/{}", host, order_id))
                .send()
                .await?;
            if res.status() != StatusCode::OK {
                return report_failure(res).await;
            }
            let view = res
                .json::<OrderView>()
                .await
                .context("failed to get response, aborting")?;
            println!(
                "order {} at {}, {} items, due {:.2}",
                order_id,
                table_label(view.table_number),
                view.total_count,
                view.payment_due
            );
            print_lines(&view.order_items);
        }
        Commands::Invoice { invoice_id } => {
            let res = client
                .get(format!("{}/invoices/{}", host, invoice_id))
                .send()
                .await?;
            if res.status() != StatusCode::OK {
                return report_failure(res).await;
            }
            let invoice = res
                .json::<InvoiceView>()
                .await
                .context("failed to get response, aborting")?;
            println!(
                "invoice {} for order {} at {}",
                invoice.invoice_id,
                invoice.order_id,
                table_label(invoice.table_number)
            );
            println!(
                "status {} via {}, due {:.2} by {}",
                invoice.payment_status,
                invoice.payment_method.as_deref().unwrap_or("-"),
                invoice.payment_due,
                invoice.payment_due_date
            );
            print_lines(&invoice.order_details);
        }
        Commands::Foods(FoodsArgs { page, per_page }) => {
            let res = client
                .get(format!("{}/foods", host))
                .query(&[("page", page), ("recordPerPage", per_page)])
                .send()
                .await?;
            if res.status() != StatusCode::OK {
                return report_failure(res).await;
            }
            let foods = res
                .json::<FoodsPage>()
                .await
                .context("failed to get response, aborting")?;
            println!("page {} of {} foods", page, foods.total_count);
            for food in foods.food_items {
                println!("  {} {:<30} {:>8.2}", food.food_id, food.name, food.price);
            }
        }
    };
    Ok(())
}

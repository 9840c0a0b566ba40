use anyhow::anyhow;
use clap::Subcommand;
use propshare_core::notifications::Notification;
use propshare_core::portfolio::{
    Investment, PortfolioSummary, Transaction, TransactionType, DEFAULT_TRANSACTION_LIMIT,
};
use propshare_core::properties::{Property, PropertyFilter, PropertyType};
use propshare_core::utils::{format_currency, format_percent, format_shares, format_signed_currency};
use propshare_core::watchlist::WatchlistItem;
use propshare_core::ClientContext;
use rust_decimal::Decimal;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List properties open for investment
    Properties {
        /// Match against name, city or address
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long = "type", value_parser = parse_property_type)]
        property_type: Option<PropertyType>,
    },
    /// Show one property and your position in it
    Property { id: String },
    /// Portfolio summary and holdings
    Portfolio,
    /// Recent buys and sells
    Transactions {
        #[arg(long, default_value_t = DEFAULT_TRANSACTION_LIMIT)]
        limit: usize,
    },
    /// Buy shares of a property
    Buy { id: String, shares: i64 },
    /// Sell shares of a property
    Sell { id: String, shares: i64 },
    /// Add a property to the watchlist, or remove it if already watched
    Watch { id: String },
    /// List watched properties
    Watchlist,
    /// Show the notification inbox
    Notifications,
    /// Mark every notification as read
    ReadAll,
}

fn parse_property_type(value: &str) -> Result<PropertyType, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "residential" => Ok(PropertyType::Residential),
        "commercial" => Ok(PropertyType::Commercial),
        "industrial" => Ok(PropertyType::Industrial),
        "mixed" => Ok(PropertyType::Mixed),
        other => Err(format!(
            "unknown property type '{}' (residential, commercial, industrial, mixed)",
            other
        )),
    }
}

/// Surfaces the user-facing message; details go to the log.
fn user_facing(err: propshare_core::Error) -> anyhow::Error {
    tracing::debug!("Command failed: {:?}", err);
    anyhow!(err.user_message())
}

pub async fn run(command: Command, ctx: &ClientContext) -> anyhow::Result<()> {
    match command {
        Command::Properties {
            search,
            city,
            property_type,
        } => {
            let filter = PropertyFilter {
                search,
                city,
                property_type,
                ..PropertyFilter::default()
            };
            let properties = ctx
                .property_service
                .list_properties(&filter)
                .await
                .map_err(user_facing)?;
            if properties.is_empty() {
                println!("No properties match.");
            }
            for property in &properties {
                println!("{}", property_line(property));
            }
        }
        Command::Property { id } => {
            let property = ctx
                .property_service
                .get_property(&id)
                .await
                .map_err(user_facing)?;
            println!("{}", property_detail(&property));
            if ctx.session.is_authenticated() {
                let position = ctx
                    .portfolio_service
                    .investment_for_property(&id)
                    .await
                    .map_err(user_facing)?;
                if let Some(investment) = position.filter(|i| i.shares_owned > 0) {
                    println!("{}", position_line(&investment, property.share_price));
                }
                let watched = ctx
                    .watchlist_service
                    .is_watched(&id)
                    .await
                    .map_err(user_facing)?;
                if watched {
                    println!("On your watchlist");
                }
            }
        }
        Command::Portfolio => {
            let summary = ctx.portfolio_service.summary().await.map_err(user_facing)?;
            println!("{}", summary_block(&summary));
            let investments = ctx
                .portfolio_service
                .investments()
                .await
                .map_err(user_facing)?;
            for investment in &investments {
                let price = investment
                    .property
                    .as_ref()
                    .map(|p| p.share_price)
                    .unwrap_or(investment.average_purchase_price);
                println!("{}", position_line(investment, price));
            }
        }
        Command::Transactions { limit } => {
            let transactions = ctx
                .portfolio_service
                .transactions(limit)
                .await
                .map_err(user_facing)?;
            if transactions.is_empty() {
                println!("No transactions yet.");
            }
            for transaction in &transactions {
                println!("{}", transaction_line(transaction));
            }
        }
        Command::Buy { id, shares } => {
            let confirmation = ctx
                .trades
                .initiate_buy(&id, shares)
                .await
                .map_err(user_facing)?;
            println!("{}\n{}", confirmation.title(), confirmation.message());
        }
        Command::Sell { id, shares } => {
            let confirmation = ctx
                .trades
                .initiate_sell(&id, shares)
                .await
                .map_err(user_facing)?;
            println!("{}\n{}", confirmation.title(), confirmation.message());
        }
        Command::Watch { id } => {
            let watched = ctx.watchlist_service.toggle(&id).await.map_err(user_facing)?;
            if watched {
                println!("Added {} to your watchlist", id);
            } else {
                println!("Removed {} from your watchlist", id);
            }
        }
        Command::Watchlist => {
            let items = ctx
                .watchlist_service
                .watchlist()
                .await
                .map_err(user_facing)?;
            if items.is_empty() {
                println!("Your watchlist is empty.");
            }
            for item in &items {
                println!("{}", watchlist_line(item));
            }
        }
        Command::Notifications => {
            let unread = ctx
                .notification_service
                .unread_count()
                .await
                .map_err(user_facing)?;
            let notifications = ctx
                .notification_service
                .notifications()
                .await
                .map_err(user_facing)?;
            println!("{} unread", unread);
            for notification in &notifications {
                println!("{}", notification_line(notification));
            }
        }
        Command::ReadAll => {
            ctx.notification_service
                .mark_all_read()
                .await
                .map_err(user_facing)?;
            println!("All notifications marked as read");
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

fn property_line(property: &Property) -> String {
    format!(
        "{:<22} {:<28} {:<12} {:>10}/share  {:>9} available  {}",
        property.id,
        property.name,
        property.city,
        format_currency(property.share_price),
        format_shares(property.available_shares),
        property.status
    )
}

fn property_detail(property: &Property) -> String {
    let mut lines = vec![
        property.name.clone(),
        format!("{}, {}", property.address, property.city),
        format!(
            "{} | {} | {}/share",
            property.property_type,
            property.status,
            format_currency(property.share_price)
        ),
        format!(
            "{} of {} shares available ({} funded)",
            format_shares(property.available_shares),
            format_shares(property.total_shares),
            format_percent(property.funded_percentage()).trim_start_matches('+')
        ),
    ];
    if let Some(rate) = property.annual_return_rate {
        lines.push(format!(
            "Projected annual return {}",
            format_percent(rate).trim_start_matches('+')
        ));
    }
    lines.join("\n")
}

fn position_line(investment: &Investment, share_price: Decimal) -> String {
    let name = investment
        .property
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or(investment.property_id.as_str());
    format!(
        "{:<28} {:>7} shares  avg {:>10}  value {:>12}  {}",
        name,
        format_shares(investment.shares_owned),
        format_currency(investment.average_purchase_price),
        format_currency(investment.current_value(share_price)),
        format_signed_currency(investment.unrealized_return(share_price))
    )
}

fn summary_block(summary: &PortfolioSummary) -> String {
    format!(
        "Invested {}  Value {}  Return {} ({})  Properties {}",
        format_currency(summary.total_invested),
        format_currency(summary.current_value),
        format_signed_currency(summary.total_return),
        format_percent(summary.return_percentage),
        summary.total_properties
    )
}

fn transaction_line(transaction: &Transaction) -> String {
    let name = transaction
        .property
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or(transaction.property_id.as_str());
    format!(
        "{}  {:<4} {:>6} x {:>10}  {:>12}  {}",
        transaction.created_at.format("%Y-%m-%d %H:%M"),
        match transaction.transaction_type {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
        },
        format_shares(transaction.shares),
        format_currency(transaction.price_per_share),
        format_currency(transaction.total_amount),
        name
    )
}

fn watchlist_line(item: &WatchlistItem) -> String {
    match &item.property {
        Some(property) => property_line(property),
        None => item.property_id.clone(),
    }
}

fn notification_line(notification: &Notification) -> String {
    format!(
        "{} {}  {}: {}",
        if notification.is_read { " " } else { "*" },
        notification.created_at.format("%Y-%m-%d"),
        notification.title,
        notification.message
    )
}

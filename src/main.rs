use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use ulid::Ulid;

use classlot::board::AvailabilityBoard;
use classlot::calendar::CivilCalendar;
use classlot::context::{AppContext, Config};
use classlot::source::{InMemorySource, ReservationRecord};

const USAGE: &str = "usage: classlot <reservations.json> <YYYY-MM-DD> [classroom-id] [duration-blocks]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(path), Some(date)) = (args.next(), args.next()) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")?;

    let config = Config::from_env();
    let ctx = Arc::new(AppContext::from_config(&config)?);
    info!("classlot");
    info!("  hours: {:02}:00-{:02}:00 (Sat until {:02}:00)", config.open_hour, config.close_hour, config.saturday_close_hour);
    info!("  slot: {} min", config.slot_minutes);
    info!("  tz: {}", config.timezone.as_deref().unwrap_or("local"));

    let records: Vec<ReservationRecord> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    let source = InMemorySource::from_records(records)?;

    let classroom = match args.next() {
        Some(id) => id.parse::<Ulid>()?,
        None => match source.classroom_ids().into_iter().min() {
            Some(id) => id,
            None => {
                eprintln!("{path}: no reservations, pass a classroom id");
                std::process::exit(2);
            }
        },
    };
    let blocks = args.next().map(|s| s.parse::<u32>()).transpose()?.unwrap_or(1);
    source.add_classroom(classroom);

    let mut board = AvailabilityBoard::new(ctx.clone());
    board.set_classroom(Some(classroom))?;
    board.set_date(Some(date))?;
    board.set_duration_blocks(blocks)?;
    board.refresh(&source).await?;

    println!("{classroom} on {date}");
    if board.slots().is_empty() {
        println!("  no bookable slots");
    }
    for slot in board.slots() {
        let status = match (&slot.busy, &slot.booked_by) {
            (false, _) => "free".to_string(),
            (true, Some(purpose)) => format!("busy ({purpose})"),
            (true, None) => "busy".to_string(),
        };
        println!(
            "  {}-{}  {status}",
            ctx.calendar.label(slot.span.start),
            ctx.calendar.label(slot.span.end)
        );
    }
    Ok(())
}

use dailydose_core::IntakeRecord;

use super::Context;

fn format_row(record: &IntakeRecord) -> String {
    let status = if record.taken { "taken" } else { "missed" };
    let time = record
        .time
        .map(|t| t.to_string())
        .unwrap_or_else(|| "--:--".into());
    match &record.notes {
        Some(notes) => format!("{}  {status:<6}  {time}  {notes}", record.date),
        None => format!("{}  {status:<6}  {time}", record.date),
    }
}

pub fn run(ctx: &Context, days: Option<u32>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = ctx.tracker()?;
    let days = days.unwrap_or(ctx.config.history.default_days);
    let history = tracker.recent_history(days);

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
    } else {
        for record in &history {
            println!("{}", format_row(record));
        }
    }
    Ok(())
}

use dailydose_core::clock::{local_now, parse_date};
use dailydose_core::IntakeOutcome;
use serde_json::json;

use super::Context;

fn print_outcome(outcome: &IntakeOutcome) {
    let status = if outcome.record.taken { "taken" } else { "missed" };
    println!(
        "{} marked {status}. Current streak: {} (best {}, total {})",
        outcome.record.date,
        outcome.streak.current_streak,
        outcome.streak.best_streak,
        outcome.streak.total_days_taken,
    );
}

pub fn record_today(
    ctx: &Context,
    taken: bool,
    notes: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = ctx.tracker()?;
    let outcome = tracker.record_intake_for_today(taken, notes)?;
    print_outcome(&outcome);
    Ok(())
}

pub fn record_date(
    ctx: &Context,
    date: &str,
    taken: bool,
    notes: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let date = parse_date(date)?;
    let tracker = ctx.tracker()?;
    let outcome = tracker.record_intake_for_date(date, taken, notes, local_now())?;
    print_outcome(&outcome);
    Ok(())
}

pub fn status(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = ctx.tracker()?;
    let today = local_now().date();
    let report = json!({
        "date": today,
        "takenToday": tracker.today_status_at(today),
        "streak": tracker.streak(),
        "weeklyProgress": tracker.weekly_progress_at(today),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn streak(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = ctx.tracker()?;
    println!("{}", serde_json::to_string_pretty(&tracker.streak())?);
    Ok(())
}

pub fn reconcile(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = ctx.tracker()?;
    let report = tracker.reconcile()?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

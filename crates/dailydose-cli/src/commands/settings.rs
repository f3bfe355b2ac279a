use clap::{Subcommand, ValueEnum};
use dailydose_core::{UserSettings, WallTime};

use super::Context;

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print current settings as JSON
    Show,
    /// Set the daily reminder time
    Reminder {
        /// Time as HH:MM (24-hour)
        time: String,
    },
    /// Turn reminders on or off
    Notifications { state: Toggle },
    /// Set how many days per week count as meeting the goal
    Goal {
        /// Days per week (1-7)
        days: u8,
    },
}

pub fn run(ctx: &Context, action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = ctx.tracker()?;
    let current = tracker.settings();

    let updated = match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&current)?);
            return Ok(());
        }
        SettingsAction::Reminder { time } => {
            let time: WallTime = time.parse()?;
            UserSettings {
                reminder_time: time.to_string(),
                ..current
            }
        }
        SettingsAction::Notifications { state } => UserSettings {
            notifications_enabled: matches!(state, Toggle::On),
            ..current
        },
        SettingsAction::Goal { days } => UserSettings {
            weekly_goal: days,
            ..current
        },
    };

    match tracker.update_settings(&updated)? {
        Some(time) => println!("ok (reminder at {time})"),
        None => println!("ok (no reminder scheduled)"),
    }
    Ok(())
}

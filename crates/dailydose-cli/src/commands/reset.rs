use super::Context;

pub fn run(ctx: &Context, yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !yes {
        return Err("refusing to delete all data without --yes".into());
    }
    ctx.tracker()?.reset()?;
    println!("all tracking data has been reset");
    Ok(())
}

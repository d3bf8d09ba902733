//! `commentctl stats`

use anyhow::Result;

use crate::app::App;
use crate::stats;
use crate::ui;

/// Print the statistics table.
pub async fn execute(app: &App) -> Result<()> {
    let stats = stats::collect(&app.store).await?;
    ui::print_header("Comment Statistics");
    print!("{stats}");
    Ok(())
}

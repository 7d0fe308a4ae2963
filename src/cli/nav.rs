use super::ui;
use crate::core::config::FundConfig;
use crate::core::{PeriodMode, PricePoint, PriceSeriesSource, SeriesRequest};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;
use tracing::info;

pub fn display_as_table(points: &[PricePoint]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("NAV")]);
    for point in points {
        table.add_row(vec![
            Cell::new(point.date.to_string()),
            ui::price_cell(point.price),
        ]);
    }
    table.to_string()
}

/// Prints the NAV series of a fund as published by the source.
pub async fn run(
    source: &dyn PriceSeriesSource,
    fund: &FundConfig,
    start: NaiveDate,
    end: NaiveDate,
    period: PeriodMode,
) -> Result<()> {
    info!("Fetching NAV for {} from {} to {}", fund.name, start, end);
    let request = SeriesRequest::new(fund.pid, start, end).with_period(period);

    let pb = ui::new_spinner("Fetching NAV history...");
    let series = source.fetch_series(&request).await;
    pb.finish_and_clear();
    let series = series?;

    let points = series.parse_points();
    println!(
        "Fund: {}\n",
        ui::style_text(&series.product_name, ui::StyleType::Title)
    );
    println!("{}", display_as_table(&points));

    let skipped = series.points.len() - points.len();
    if skipped > 0 {
        println!(
            "{}",
            ui::style_text(
                &format!("{skipped} unparsable or duplicate rows skipped"),
                ui::StyleType::Subtle
            )
        );
    }

    Ok(())
}

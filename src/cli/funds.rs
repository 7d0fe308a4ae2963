use super::ui;
use crate::core::config::FundConfig;
use comfy_table::Cell;

pub fn display_as_table(funds: &[FundConfig]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Source ID"),
        ui::header_cell("Name"),
        ui::header_cell("Minimum Investment"),
        ui::header_cell("Management Fee"),
        ui::header_cell("Custodian Fee"),
        ui::header_cell("Switching Fee"),
        ui::header_cell("Investment Manager"),
    ]);

    let optional = |value: &Option<String>| match value {
        Some(text) => Cell::new(text),
        None => ui::na_cell(false),
    };

    for fund in funds {
        table.add_row(vec![
            Cell::new(fund.id),
            Cell::new(fund.pid),
            Cell::new(&fund.name),
            optional(&fund.minimum_investment),
            optional(&fund.management_fee),
            optional(&fund.custodian_fee),
            optional(&fund.switching_fee),
            optional(&fund.investment_manager),
        ]);
    }

    table.to_string()
}

pub fn run(funds: &[FundConfig]) {
    if funds.is_empty() {
        println!("No funds configured.");
        return;
    }
    println!("{}", display_as_table(funds));
}

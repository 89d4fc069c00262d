//! Table rendering and value formatting for terminal output.

use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, Table};
use owo_colors::OwoColorize;

use tally_core::model::{ClientView, LedgerStats};

/// Group digits of a whole amount: `-12500` becomes `-12 500`.
pub fn fmt_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn fmt_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.to_string(),
        None => "—".to_string(),
    }
}

fn balance_cell(balance: i64) -> Cell {
    let text = fmt_amount(balance);
    let styled = if balance > 0 {
        text.red().to_string()
    } else if balance < 0 {
        text.green().to_string()
    } else {
        text.dimmed().to_string()
    };
    Cell::new(styled).set_alignment(CellAlignment::Right)
}

/// The client overview table shown by `list`.
pub fn client_table(views: &[ClientView]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Client", "Balance", "Last activity", "Entries"]);
    for view in views {
        table.add_row(vec![
            Cell::new(&view.client.name),
            balance_cell(view.balance),
            Cell::new(fmt_date(view.last_date)),
            Cell::new(view.entries.len()).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// The per-client history table shown by `show`.
pub fn history_table(view: &ClientView) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Date", "Amount", "Comment", "Id"]);
    for entry in &view.entries {
        table.add_row(vec![
            Cell::new(entry.date),
            balance_cell(entry.amount),
            Cell::new(&entry.comment),
            Cell::new(&entry.id),
        ]);
    }
    table
}

/// One-line aggregate summary shown under the overview.
pub fn stats_line(stats: &LedgerStats) -> String {
    format!(
        "Clients: {} • Owed to you: {}",
        stats.clients,
        fmt_amount(stats.total_owed)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_amount_groups_digits() {
        assert_eq!(fmt_amount(0), "0");
        assert_eq!(fmt_amount(500), "500");
        assert_eq!(fmt_amount(12500), "12 500");
        assert_eq!(fmt_amount(-1234567), "-1 234 567");
    }

    #[test]
    fn test_fmt_date_absent() {
        assert_eq!(fmt_date(None), "—");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
        assert_eq!(fmt_date(Some(date)), "2024-03-01");
    }
}

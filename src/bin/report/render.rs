// Console tables for the pricing report
// Dollar columns go through the Decimal cents adapter

use stadium_engine::money::format_dollars;
use stadium_engine::scenarios::{CeilingSweepRow, ComparativeStaticsRow, SummaryStatistics};
use stadium_engine::ScenarioTable;

const RULE_WIDTH: usize = 118;

fn price(value: Option<f64>) -> String {
    value.map(format_dollars).unwrap_or_else(|| "n/a".to_string())
}

// ─── Scenario Table ─────────────────────────────────────────────────────────

pub fn scenario_table(table: &ScenarioTable) {
    println!(
        "  {:<26} {:>9} {:>9} {:>10} {:>7} {:>16} {:>16} {:>16}",
        "Scenario", "Ticket", "Beer", "Attend", "Units", "Profit", "Externality", "Welfare"
    );
    println!("  {}", "-".repeat(RULE_WIDTH));
    for record in table.iter() {
        let o = &record.outcome;
        println!(
            "  {:<26} {:>9} {:>9} {:>10.0} {:>7.2} {:>16} {:>16} {:>16}",
            record.scenario,
            format_dollars(record.ticket_price),
            price(record.concession_price),
            o.attendance,
            o.units_per_fan,
            format_dollars(o.profit),
            format_dollars(o.externality_cost),
            format_dollars(o.social_welfare),
        );
    }
    println!();
}

// ─── Comparative Statics ────────────────────────────────────────────────────

const STATICS_METRICS: [&str; 5] = [
    "attendance",
    "total_units",
    "profit",
    "consumer_surplus",
    "social_welfare",
];

pub fn comparative_statics(rows: &[ComparativeStaticsRow]) {
    print!("  {:<26}", "Change vs baseline");
    for metric in STATICS_METRICS {
        print!(" {metric:>17}");
    }
    println!();
    println!("  {}", "-".repeat(RULE_WIDTH));
    for row in rows {
        print!("  {:<26}", row.scenario);
        for metric in STATICS_METRICS {
            let cell = match row.delta(metric).and_then(|d| d.pct_change) {
                Some(pct) => format!("{pct:+.1}%"),
                None => "n/a".to_string(),
            };
            print!(" {cell:>17}");
        }
        println!();
    }
    println!();
}

// ─── Summary ────────────────────────────────────────────────────────────────

pub fn summary(summary: &SummaryStatistics) {
    println!("  Summary across scenarios:");
    println!(
        "    Attendance:      mean {:>10.0}  sd {:>10.0}",
        summary.attendance.mean, summary.attendance.std_dev
    );
    println!(
        "    Units sold:      mean {:>10.0}  sd {:>10.0}",
        summary.total_units.mean, summary.total_units.std_dev
    );
    println!(
        "    Profit:          mean {:>16}  sd {:>16}",
        format_dollars(summary.profit.mean),
        format_dollars(summary.profit.std_dev)
    );
    println!(
        "    Social welfare:  mean {:>16}  sd {:>16}",
        format_dollars(summary.social_welfare.mean),
        format_dollars(summary.social_welfare.std_dev)
    );
    println!("    Highest profit:       {}", summary.profit_maximizing_scenario);
    println!("    Highest welfare:      {}", summary.welfare_maximizing_scenario);
    println!("    Lowest externality:   {}\n", summary.lowest_externality_scenario);
}

// ─── Ceiling Sweep ──────────────────────────────────────────────────────────

pub fn ceiling_sweep(rows: &[CeilingSweepRow]) {
    println!(
        "  {:>9} {:>8} {:>9} {:>9} {:>10} {:>16} {:>16}",
        "Ceiling", "Binding", "Ticket", "Beer", "Attend", "Profit", "Welfare"
    );
    println!("  {}", "-".repeat(84));
    for row in rows {
        println!(
            "  {:>9} {:>8} {:>9} {:>9} {:>10.0} {:>16} {:>16}",
            format_dollars(row.ceiling),
            if row.binding { "yes" } else { "no" },
            format_dollars(row.ticket_price),
            format_dollars(row.concession_price),
            row.attendance,
            format_dollars(row.profit),
            format_dollars(row.welfare.social_welfare),
        );
    }
    println!();
}

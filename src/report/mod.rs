mod format;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{error, info};

use crate::core::{
    Comparison, ExpenseBreakdown, ExpenseCategory, ModelPolicy, ScenarioInput,
    SpendingIncreaseScope, StateTaxBasis,
};
use crate::error::CalcError;

pub use format::{format_currency, format_percent, format_rate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub description: String,
    pub amount: String,
    pub value: Decimal,
}

impl ReportRow {
    fn currency(description: &str, value: Decimal) -> Self {
        Self {
            description: description.to_string(),
            amount: format_currency(value),
            value,
        }
    }

    fn percent(description: &str, value: Decimal) -> Self {
        Self {
            description: description.to_string(),
            amount: format_percent(value),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryComparison {
    pub category: &'static str,
    pub current: Decimal,
    pub new: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: &'static str,
    pub amount: Decimal,
    pub share_pct: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub policy: ModelPolicy,
    pub results: Vec<ReportRow>,
    pub breakdown: Vec<ReportRow>,
    pub calculation_steps: Vec<String>,
    pub category_comparison: Vec<CategoryComparison>,
    pub new_expense_shares: Vec<CategoryShare>,
}

impl Report {
    pub fn from_comparison(comparison: &Comparison, policy: ModelPolicy) -> Self {
        let raise = &comparison.raise;
        let results = vec![
            ReportRow::currency(
                "Current Annual Expenses",
                comparison.current.total_annual_expenses,
            ),
            ReportRow::currency("New Annual Expenses", comparison.new.total_annual_expenses),
            ReportRow::currency("Additional Expenses", raise.additional_expenses),
            ReportRow::currency("Needed Annual Salary", raise.required_new_salary),
            ReportRow::currency("Needed Monthly Salary", raise.monthly_required_salary),
            ReportRow::percent("Percentage Increase", raise.percentage_increase),
        ];

        let categories = charted_categories(comparison);
        let breakdown = categories
            .iter()
            .map(|category| {
                ReportRow::currency(
                    breakdown_label(*category),
                    comparison.new.amount(*category),
                )
            })
            .collect();

        let mut calculation_steps = scenario_steps(
            "Current",
            &comparison.current_input,
            &comparison.current,
            policy,
        );
        calculation_steps.extend(scenario_steps(
            "New",
            &comparison.new_input,
            &comparison.new,
            policy,
        ));
        calculation_steps.extend(raise_steps(comparison));

        let category_comparison = categories
            .iter()
            .map(|category| CategoryComparison {
                category: category.label(),
                current: comparison.current.amount(*category),
                new: comparison.new.amount(*category),
            })
            .collect();

        let new_total = comparison.new.total_annual_expenses;
        let new_expense_shares = categories
            .iter()
            .map(|category| {
                let amount = comparison.new.amount(*category);
                let share_pct = if new_total.is_zero() {
                    Decimal::ZERO
                } else {
                    (amount / new_total * Decimal::ONE_HUNDRED)
                        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                };
                CategoryShare {
                    category: category.label(),
                    amount,
                    share_pct,
                }
            })
            .collect();

        Self {
            policy,
            results,
            breakdown,
            calculation_steps,
            category_comparison,
            new_expense_shares,
        }
    }
}

fn charted_categories(comparison: &Comparison) -> Vec<ExpenseCategory> {
    ExpenseCategory::ALL
        .into_iter()
        .filter(|category| {
            *category != ExpenseCategory::SubtotalIncrease
                || !comparison.current.subtotal_increase.is_zero()
                || !comparison.new.subtotal_increase.is_zero()
        })
        .collect()
}

fn breakdown_label(category: ExpenseCategory) -> &'static str {
    match category {
        ExpenseCategory::HousePayment => "New Annual House Payment",
        ExpenseCategory::PropertyTax => "New Annual Property Tax",
        ExpenseCategory::StateTax => "New Annual State Tax",
        ExpenseCategory::CommonExpenses => "New Annual Common Expenses",
        ExpenseCategory::SubtotalIncrease => "New Spending Increase",
    }
}

fn scenario_steps(
    prefix: &str,
    input: &ScenarioInput,
    breakdown: &ExpenseBreakdown,
    policy: ModelPolicy,
) -> Vec<String> {
    let mut steps = Vec::with_capacity(6);
    steps.push(format!(
        "{prefix} Annual House Payment: {} (monthly house payment) * 12 = {}",
        format_currency(input.monthly_house_payment()),
        format_currency(breakdown.annual_house_payment)
    ));
    steps.push(format!(
        "{prefix} Annual Property Tax: {}",
        format_currency(breakdown.annual_property_tax)
    ));

    let rate = format_rate(input.state_tax_rate());
    let tax_base = match policy.state_tax_basis {
        StateTaxBasis::Salary => format!("{} (salary)", format_currency(input.salary())),
        StateTaxBasis::HousingCost => format!(
            "({} (house payment) + {} (property tax))",
            format_currency(breakdown.annual_house_payment),
            format_currency(breakdown.annual_property_tax)
        ),
    };
    steps.push(format!(
        "{prefix} Annual State Income Tax: {tax_base} * {rate} = {}",
        format_currency(breakdown.annual_state_tax)
    ));

    let increase = input.spending_increase_pct();
    let monthly_common = format_currency(input.monthly_common_expenses());
    let common_step = match policy.spending_increase_scope {
        SpendingIncreaseScope::CommonExpenses if !increase.is_zero() => format!(
            "{prefix} Annual Common Expenses: {monthly_common} (monthly common expenses) * 12 * (1 + {}) = {}",
            format_rate(increase),
            format_currency(breakdown.annual_common_expenses)
        ),
        _ => format!(
            "{prefix} Annual Common Expenses: {monthly_common} (monthly common expenses) * 12 = {}",
            format_currency(breakdown.annual_common_expenses)
        ),
    };
    steps.push(common_step);

    if !breakdown.subtotal_increase.is_zero() {
        let subtotal = breakdown.total_annual_expenses - breakdown.subtotal_increase;
        steps.push(format!(
            "{prefix} Spending Increase: {} (subtotal) * {} = {}",
            format_currency(subtotal),
            format_rate(increase),
            format_currency(breakdown.subtotal_increase)
        ));
    }

    let mut terms = vec![
        format!(
            "{} (House Payment)",
            format_currency(breakdown.annual_house_payment)
        ),
        format!(
            "{} (Property Tax)",
            format_currency(breakdown.annual_property_tax)
        ),
        format!("{} (State Tax)", format_currency(breakdown.annual_state_tax)),
        format!(
            "{} (Common Expenses)",
            format_currency(breakdown.annual_common_expenses)
        ),
    ];
    if !breakdown.subtotal_increase.is_zero() {
        terms.push(format!(
            "{} (Spending Increase)",
            format_currency(breakdown.subtotal_increase)
        ));
    }
    steps.push(format!(
        "{prefix} Total Annual Expenses: {} = {}",
        terms.join(" + "),
        format_currency(breakdown.total_annual_expenses)
    ));

    steps
}

fn raise_steps(comparison: &Comparison) -> Vec<String> {
    let raise = &comparison.raise;
    let salary = format_currency(comparison.current_salary());
    vec![
        format!(
            "Additional Expenses: {} (new total) - {} (current total) = {}",
            format_currency(comparison.new.total_annual_expenses),
            format_currency(comparison.current.total_annual_expenses),
            format_currency(raise.additional_expenses)
        ),
        format!(
            "Needed Annual Salary: {salary} (current salary) + {} (additional expenses) = {}",
            format_currency(raise.additional_expenses),
            format_currency(raise.required_new_salary)
        ),
        format!(
            "Needed Monthly Salary: {} / 12 = {}",
            format_currency(raise.required_new_salary),
            format_currency(raise.monthly_required_salary)
        ),
        format!(
            "Percentage Increase: {} / {salary} * 100 = {}",
            format_currency(raise.additional_expenses),
            format_percent(raise.percentage_increase)
        ),
    ]
}

pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    push_table(&mut out, "Results", &report.results);
    out.push('\n');
    push_table(&mut out, "Breakdown of New Annual Expenses", &report.breakdown);
    out.push('\n');
    out.push_str("Detailed Calculations\n");
    for step in &report.calculation_steps {
        out.push_str("  ");
        out.push_str(step);
        out.push('\n');
    }
    out
}

fn push_table(out: &mut String, title: &str, rows: &[ReportRow]) {
    out.push_str(title);
    out.push('\n');
    for row in rows {
        out.push_str(&format!("  {:<32} {:>16}\n", row.description, row.amount));
    }
}

#[derive(Serialize)]
struct ExportedReport<'a> {
    #[serde(rename = "Results")]
    results: &'a [ReportRow],
    #[serde(rename = "Breakdown")]
    breakdown: &'a [ReportRow],
    #[serde(rename = "Detailed Calculations")]
    calculation_steps: &'a [String],
}

impl<'a> From<&'a Report> for ExportedReport<'a> {
    fn from(report: &'a Report) -> Self {
        Self {
            results: &report.results,
            breakdown: &report.breakdown,
            calculation_steps: &report.calculation_steps,
        }
    }
}

pub fn export_report(report: &Report, path: &Path) -> Result<(), CalcError> {
    write_report(report, path).inspect_err(|err| {
        error!(path = %path.display(), error = %err, "report export failed");
    })?;
    info!(path = %path.display(), "report exported");
    Ok(())
}

fn write_report(report: &Report, path: &Path) -> Result<(), CalcError> {
    let export_failure = |e: &dyn std::fmt::Display| {
        CalcError::ExportFailure(format!("{}: {e}", path.display()))
    };

    let file = File::create(path).map_err(|e| export_failure(&e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &ExportedReport::from(report))
        .map_err(|e| export_failure(&e))?;
    writer.write_all(b"\n").map_err(|e| export_failure(&e))?;
    writer.flush().map_err(|e| export_failure(&e))
}

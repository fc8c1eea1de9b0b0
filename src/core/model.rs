use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::types::{
    Comparison, ExpenseBreakdown, ModelPolicy, RaiseResult, ScenarioInput, SpendingIncreaseScope,
    StateTaxBasis,
};
use crate::error::CalcError;

const MONTHS_PER_YEAR: Decimal = dec!(12);

fn percent(value: Decimal) -> Decimal {
    value / Decimal::ONE_HUNDRED
}

fn too_large(value: Option<Decimal>, field: &'static str) -> Result<Decimal, CalcError> {
    value.ok_or_else(|| CalcError::invalid(field, "is too large"))
}

fn checked_sum(terms: &[Decimal], field: &'static str) -> Result<Decimal, CalcError> {
    terms.iter().try_fold(Decimal::ZERO, |acc, term| {
        too_large(acc.checked_add(*term), field)
    })
}

pub fn compute_breakdown(
    input: &ScenarioInput,
    policy: ModelPolicy,
) -> Result<ExpenseBreakdown, CalcError> {
    input.validate()?;

    let annual_house_payment = too_large(
        input.monthly_house_payment().checked_mul(MONTHS_PER_YEAR),
        "monthly_house_payment",
    )?;
    let annual_property_tax = input.annual_property_tax();
    let tax_rate = percent(input.state_tax_rate());
    let annual_state_tax = match policy.state_tax_basis {
        StateTaxBasis::Salary => too_large(input.salary().checked_mul(tax_rate), "salary")?,
        StateTaxBasis::HousingCost => {
            let housing_cost = checked_sum(
                &[annual_house_payment, annual_property_tax],
                "annual_property_tax",
            )?;
            too_large(housing_cost.checked_mul(tax_rate), "annual_property_tax")?
        }
    };

    let base_common_expenses = too_large(
        input.monthly_common_expenses().checked_mul(MONTHS_PER_YEAR),
        "monthly_common_expenses",
    )?;
    let increase = percent(input.spending_increase_pct());
    let (annual_common_expenses, subtotal_increase) = match policy.spending_increase_scope {
        SpendingIncreaseScope::CommonExpenses => (
            too_large(
                base_common_expenses.checked_mul(Decimal::ONE + increase),
                "monthly_common_expenses",
            )?,
            Decimal::ZERO,
        ),
        SpendingIncreaseScope::FullSubtotal => {
            let subtotal = checked_sum(
                &[
                    annual_house_payment,
                    annual_property_tax,
                    annual_state_tax,
                    base_common_expenses,
                ],
                "total_annual_expenses",
            )?;
            (
                base_common_expenses,
                too_large(subtotal.checked_mul(increase), "total_annual_expenses")?,
            )
        }
    };

    let total_annual_expenses = checked_sum(
        &[
            annual_house_payment,
            annual_property_tax,
            annual_state_tax,
            annual_common_expenses,
            subtotal_increase,
        ],
        "total_annual_expenses",
    )?;

    debug!(
        %annual_house_payment,
        %annual_state_tax,
        %annual_common_expenses,
        %total_annual_expenses,
        "computed expense breakdown"
    );

    Ok(ExpenseBreakdown {
        annual_house_payment,
        annual_property_tax,
        annual_state_tax,
        annual_common_expenses,
        subtotal_increase,
        total_annual_expenses,
    })
}

pub fn compute_raise(
    current: &ExpenseBreakdown,
    new: &ExpenseBreakdown,
    current_salary: Decimal,
) -> Result<RaiseResult, CalcError> {
    if current_salary < Decimal::ZERO {
        return Err(CalcError::invalid("current_salary", "must be >= 0"));
    }
    if current_salary.is_zero() {
        return Err(CalcError::DivisionByZero);
    }

    let additional_expenses = too_large(
        new.total_annual_expenses
            .checked_sub(current.total_annual_expenses),
        "total_annual_expenses",
    )?;
    let required_new_salary = too_large(
        current_salary.checked_add(additional_expenses),
        "current_salary",
    )?;
    let monthly_required_salary = too_large(
        required_new_salary.checked_div(MONTHS_PER_YEAR),
        "current_salary",
    )?;
    let percentage_increase = too_large(
        additional_expenses
            .checked_div(current_salary)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED)),
        "current_salary",
    )?;

    Ok(RaiseResult {
        additional_expenses,
        required_new_salary,
        monthly_required_salary,
        percentage_increase,
    })
}

pub fn compare_scenarios(
    current_input: &ScenarioInput,
    new_input: &ScenarioInput,
    policy: ModelPolicy,
) -> Result<Comparison, CalcError> {
    let current = compute_breakdown(current_input, policy)?;
    let new = compute_breakdown(new_input, policy)?;
    let raise = compute_raise(&current, &new, current_input.salary())?;

    Ok(Comparison {
        current_input: *current_input,
        new_input: *new_input,
        current,
        new,
        raise,
    })
}

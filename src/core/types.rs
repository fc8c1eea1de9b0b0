use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateTaxBasis {
    #[default]
    Salary,
    HousingCost,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpendingIncreaseScope {
    #[default]
    CommonExpenses,
    FullSubtotal,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPolicy {
    pub state_tax_basis: StateTaxBasis,
    pub spending_increase_scope: SpendingIncreaseScope,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    monthly_house_payment: Decimal,
    annual_property_tax: Decimal,
    state_tax_rate: Decimal,
    monthly_common_expenses: Decimal,
    spending_increase_pct: Decimal,
    salary: Decimal,
}

impl ScenarioInput {
    pub fn new(
        monthly_house_payment: Decimal,
        annual_property_tax: Decimal,
        state_tax_rate: Decimal,
        monthly_common_expenses: Decimal,
        spending_increase_pct: Decimal,
        salary: Decimal,
    ) -> Result<Self, CalcError> {
        let input = Self {
            monthly_house_payment,
            annual_property_tax,
            state_tax_rate,
            monthly_common_expenses,
            spending_increase_pct,
            salary,
        };
        input.validate()?;
        Ok(input)
    }

    pub fn with_spending_increase(self, spending_increase_pct: Decimal) -> Result<Self, CalcError> {
        Self::new(
            self.monthly_house_payment,
            self.annual_property_tax,
            self.state_tax_rate,
            self.monthly_common_expenses,
            spending_increase_pct,
            self.salary,
        )
    }

    pub fn validate(&self) -> Result<(), CalcError> {
        for (field, value) in [
            ("monthly_house_payment", self.monthly_house_payment),
            ("annual_property_tax", self.annual_property_tax),
            ("monthly_common_expenses", self.monthly_common_expenses),
            ("salary", self.salary),
        ] {
            if value < Decimal::ZERO {
                return Err(CalcError::invalid(field, "must be >= 0"));
            }
        }

        for (field, value) in [
            ("state_tax_rate", self.state_tax_rate),
            ("spending_increase_pct", self.spending_increase_pct),
        ] {
            if value < Decimal::ZERO || value > HUNDRED {
                return Err(CalcError::invalid(field, "must be between 0 and 100"));
            }
        }

        Ok(())
    }

    pub fn monthly_house_payment(&self) -> Decimal {
        self.monthly_house_payment
    }

    pub fn annual_property_tax(&self) -> Decimal {
        self.annual_property_tax
    }

    pub fn state_tax_rate(&self) -> Decimal {
        self.state_tax_rate
    }

    pub fn monthly_common_expenses(&self) -> Decimal {
        self.monthly_common_expenses
    }

    pub fn spending_increase_pct(&self) -> Decimal {
        self.spending_increase_pct
    }

    pub fn salary(&self) -> Decimal {
        self.salary
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExpenseCategory {
    HousePayment,
    PropertyTax,
    StateTax,
    CommonExpenses,
    SubtotalIncrease,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::HousePayment,
        ExpenseCategory::PropertyTax,
        ExpenseCategory::StateTax,
        ExpenseCategory::CommonExpenses,
        ExpenseCategory::SubtotalIncrease,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::HousePayment => "House Payment",
            ExpenseCategory::PropertyTax => "Property Tax",
            ExpenseCategory::StateTax => "State Tax",
            ExpenseCategory::CommonExpenses => "Common Expenses",
            ExpenseCategory::SubtotalIncrease => "Spending Increase",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBreakdown {
    pub annual_house_payment: Decimal,
    pub annual_property_tax: Decimal,
    pub annual_state_tax: Decimal,
    pub annual_common_expenses: Decimal,
    // zero unless the increase applies to the full subtotal
    pub subtotal_increase: Decimal,
    pub total_annual_expenses: Decimal,
}

impl ExpenseBreakdown {
    pub fn amount(&self, category: ExpenseCategory) -> Decimal {
        match category {
            ExpenseCategory::HousePayment => self.annual_house_payment,
            ExpenseCategory::PropertyTax => self.annual_property_tax,
            ExpenseCategory::StateTax => self.annual_state_tax,
            ExpenseCategory::CommonExpenses => self.annual_common_expenses,
            ExpenseCategory::SubtotalIncrease => self.subtotal_increase,
        }
    }

    pub fn components_sum(&self) -> Decimal {
        ExpenseCategory::ALL
            .iter()
            .map(|category| self.amount(*category))
            .sum()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaiseResult {
    pub additional_expenses: Decimal,
    pub required_new_salary: Decimal,
    pub monthly_required_salary: Decimal,
    pub percentage_increase: Decimal,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub current_input: ScenarioInput,
    pub new_input: ScenarioInput,
    pub current: ExpenseBreakdown,
    pub new: ExpenseBreakdown,
    pub raise: RaiseResult,
}

impl Comparison {
    pub fn current_salary(&self) -> Decimal {
        self.current_input.salary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample(rate: Decimal, increase: Decimal) -> Result<ScenarioInput, CalcError> {
        ScenarioInput::new(dec!(2000), dec!(3000), rate, dec!(800), increase, dec!(80000))
    }

    #[test]
    fn new_accepts_boundary_percentages() {
        assert!(sample(dec!(0), dec!(0)).is_ok());
        assert!(sample(dec!(100), dec!(100)).is_ok());
    }

    #[test]
    fn new_rejects_out_of_range_rate() {
        let err = sample(dec!(100.01), dec!(0)).expect_err("rate above 100");
        assert_eq!(
            err,
            CalcError::invalid("state_tax_rate", "must be between 0 and 100")
        );
    }

    #[test]
    fn new_rejects_negative_amounts() {
        let err = ScenarioInput::new(dec!(-1), dec!(0), dec!(5), dec!(0), dec!(0), dec!(0))
            .expect_err("negative house payment");
        assert!(err.to_string().contains("monthly_house_payment"));

        let err = ScenarioInput::new(dec!(0), dec!(0), dec!(5), dec!(0), dec!(-5), dec!(0))
            .expect_err("negative increase");
        assert!(err.to_string().contains("spending_increase_pct"));
    }

    #[test]
    fn negative_zero_is_accepted() {
        let negative_zero = -Decimal::ZERO;
        assert!(ScenarioInput::new(negative_zero, dec!(0), dec!(0), dec!(0), dec!(0), dec!(0)).is_ok());
    }

    #[test]
    fn with_spending_increase_keeps_other_fields() {
        let input = sample(dec!(5), dec!(10)).expect("valid");
        let current = input.with_spending_increase(Decimal::ZERO).expect("valid");
        assert_eq!(current.spending_increase_pct(), Decimal::ZERO);
        assert_eq!(current.salary(), dec!(80000));
        assert_eq!(current.monthly_house_payment(), dec!(2000));
    }

    #[test]
    fn category_labels_match_chart_keys() {
        let labels: Vec<&str> = ExpenseCategory::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            [
                "House Payment",
                "Property Tax",
                "State Tax",
                "Common Expenses",
                "Spending Increase"
            ]
        );
    }
}

mod model;
mod types;

pub use model::{compare_scenarios, compute_breakdown, compute_raise};
pub use types::{
    Comparison, ExpenseBreakdown, ExpenseCategory, ModelPolicy, RaiseResult, ScenarioInput,
    SpendingIncreaseScope, StateTaxBasis,
};
